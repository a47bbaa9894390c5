//! Study-oriented enrichment of a merged result.

use std::collections::HashSet;
use std::sync::LazyLock;

#[cfg(feature = "config")]
use clap::ValueEnum;
use regex::Regex;
use scholia_core::types::{ChunkedProcessingResult, QuizQuestion, count_words};
use serde::{Deserialize, Serialize};
use strum::{AsRefStr, Display, EnumString};

const MAX_KEY_POINTS: usize = 5;
const MAX_CONCEPTS: usize = 10;
const MAX_RELATED_TOPICS: usize = 5;
const WORDS_PER_MINUTE: usize = 200;

const SUBJECTS: &[&str] = &[
    "mathematics",
    "physics",
    "chemistry",
    "biology",
    "history",
    "literature",
    "science",
    "economics",
    "psychology",
    "philosophy",
];

static RE_SENTENCE_END: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"[.!?]+").expect("sentence pattern is valid"));

static RE_CONCEPTS: LazyLock<Vec<Regex>> = LazyLock::new(|| {
    ["concept", "definition", "theory", "principle"]
        .into_iter()
        .map(|kind| {
            Regex::new(&format!(r"(?i){kind} of ([^.!?]+)")).expect("concept pattern is valid")
        })
        .collect()
});

/// Depth requested for generated explanations.
#[derive(
    Debug,
    Clone,
    Copy,
    Default,
    PartialEq,
    Eq,
    Hash,
    Serialize,
    Deserialize,
    AsRefStr,
    Display,
    EnumString
)]
#[cfg_attr(feature = "config", derive(ValueEnum))]
#[serde(rename_all = "lowercase")]
#[strum(serialize_all = "lowercase")]
pub enum ExplanationLevel {
    Beginner,
    #[default]
    Intermediate,
    Advanced,
}

/// Summary plus reading aids.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SummaryDigest {
    pub summary: String,
    pub key_points: Vec<String>,
    pub word_count: usize,
    pub reading_time_minutes: usize,
}

/// Explanation plus the concepts and subjects it touches.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ExplanationDigest {
    pub explanation: String,
    pub concepts_explained: Vec<String>,
    pub difficulty_level: ExplanationLevel,
    pub related_topics: Vec<String>,
}

/// Quiz plus timing and topic coverage.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct QuizDigest {
    pub questions: Vec<QuizQuestion>,
    pub total_questions: usize,
    pub estimated_time_minutes: usize,
    pub topics_covered: Vec<String>,
}

/// Per-section digests of a merged result. Sections absent from the result are `None`.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct StudyDigest {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub summary: Option<SummaryDigest>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub explanation: Option<ExplanationDigest>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub quiz: Option<QuizDigest>,
}

impl StudyDigest {
    /// Builds the digest of a merged result.
    pub fn from_result(result: &ChunkedProcessingResult, level: ExplanationLevel) -> Self {
        Self {
            summary: result.summary.as_deref().map(SummaryDigest::new),
            explanation: result
                .explanation
                .as_deref()
                .map(|explanation| ExplanationDigest::new(explanation, level)),
            quiz: (!result.quiz.is_empty()).then(|| QuizDigest::new(&result.quiz)),
        }
    }
}

impl SummaryDigest {
    fn new(summary: &str) -> Self {
        let word_count = count_words(summary);
        Self {
            summary: summary.to_string(),
            key_points: key_points(summary),
            word_count,
            reading_time_minutes: word_count.div_ceil(WORDS_PER_MINUTE),
        }
    }
}

impl ExplanationDigest {
    fn new(explanation: &str, level: ExplanationLevel) -> Self {
        Self {
            explanation: explanation.to_string(),
            concepts_explained: concepts(explanation),
            difficulty_level: level,
            related_topics: related_topics(explanation),
        }
    }
}

impl QuizDigest {
    fn new(questions: &[QuizQuestion]) -> Self {
        let mut seen = HashSet::new();
        let topics_covered = questions
            .iter()
            .filter_map(|q| q.topic.as_deref())
            .filter(|topic| !topic.is_empty() && seen.insert(*topic))
            .map(str::to_string)
            .collect();

        Self {
            questions: questions.to_vec(),
            total_questions: questions.len(),
            // 1.5 minutes per question, rounded up.
            estimated_time_minutes: (questions.len() * 3).div_ceil(2),
            topics_covered,
        }
    }
}

/// First sentences of the summary, ignoring markdown heading lines.
fn key_points(summary: &str) -> Vec<String> {
    let body: Vec<&str> = summary
        .lines()
        .filter(|line| !line.trim_start().starts_with('#'))
        .collect();

    RE_SENTENCE_END
        .split(&body.join("\n"))
        .map(str::trim)
        .filter(|sentence| !sentence.is_empty())
        .take(MAX_KEY_POINTS)
        .map(str::to_string)
        .collect()
}

fn concepts(explanation: &str) -> Vec<String> {
    RE_CONCEPTS
        .iter()
        .flat_map(|pattern| pattern.captures_iter(explanation))
        .filter_map(|captures| captures.get(1))
        .map(|m| m.as_str().trim().to_string())
        .take(MAX_CONCEPTS)
        .collect()
}

fn related_topics(text: &str) -> Vec<String> {
    let lowered = text.to_lowercase();
    SUBJECTS
        .iter()
        .filter(|subject| lowered.contains(*subject))
        .take(MAX_RELATED_TOPICS)
        .map(|subject| subject.to_string())
        .collect()
}

#[cfg(test)]
mod tests {
    use scholia_core::QuestionType;

    use super::*;

    fn merged(
        summary: Option<&str>,
        explanation: Option<&str>,
        quiz: Vec<QuizQuestion>,
    ) -> ChunkedProcessingResult {
        ChunkedProcessingResult {
            chunks: Vec::new(),
            total_chunks: 0,
            total_characters: 0,
            processing_time_ms: 0,
            summary: summary.map(str::to_string),
            explanation: explanation.map(str::to_string),
            quiz,
            extracted_text: String::new(),
            failed_chunks: Vec::new(),
        }
    }

    #[test]
    fn test_summary_digest() {
        let result = merged(
            Some("## Document Summary\n\nCells divide. Energy flows!\n\nDNA replicates? Yes."),
            None,
            Vec::new(),
        );
        let digest = StudyDigest::from_result(&result, ExplanationLevel::default());
        let summary = digest.summary.unwrap();

        assert_eq!(
            summary.key_points,
            ["Cells divide", "Energy flows", "DNA replicates", "Yes"]
        );
        assert_eq!(summary.word_count, 10);
        assert_eq!(summary.reading_time_minutes, 1);
        assert!(digest.explanation.is_none());
        assert!(digest.quiz.is_none());
    }

    #[test]
    fn test_key_points_are_capped() {
        let points = key_points("One. Two. Three. Four. Five. Six. Seven.");
        assert_eq!(points, ["One", "Two", "Three", "Four", "Five"]);
    }

    #[test]
    fn test_explanation_digest() {
        let explanation = "## Detailed Explanation\n\nThe Concept of entropy links physics \
            and Chemistry. The principle of least action follows. A theory of everything remains open.";
        let result = merged(None, Some(explanation), Vec::new());
        let digest = StudyDigest::from_result(&result, ExplanationLevel::Advanced);
        let explanation = digest.explanation.unwrap();

        assert_eq!(
            explanation.concepts_explained,
            [
                "entropy links physics and Chemistry",
                "everything remains open",
                "least action follows"
            ]
        );
        assert_eq!(explanation.related_topics, ["physics", "chemistry"]);
        assert_eq!(explanation.difficulty_level, ExplanationLevel::Advanced);
    }

    #[test]
    fn test_quiz_digest() {
        let quiz = vec![
            QuizQuestion::new("Q1?", QuestionType::TrueFalse, "true").with_topic("Cells"),
            QuizQuestion::new("Q2?", QuestionType::TrueFalse, "false").with_topic("Cells"),
            QuizQuestion::new("Q3?", QuestionType::ShortAnswer, "x").with_topic("Energy"),
        ];
        let result = merged(None, None, quiz);
        let digest = StudyDigest::from_result(&result, ExplanationLevel::default());
        let quiz = digest.quiz.unwrap();

        assert_eq!(quiz.total_questions, 3);
        assert_eq!(quiz.estimated_time_minutes, 5);
        assert_eq!(quiz.topics_covered, ["Cells", "Energy"]);
    }

    #[test]
    fn test_level_parses_lowercase() {
        assert_eq!(
            "beginner".parse::<ExplanationLevel>().unwrap(),
            ExplanationLevel::Beginner
        );
        assert_eq!(ExplanationLevel::default().as_ref(), "intermediate");
    }
}
