//! Quiz question types.

use serde::{Deserialize, Serialize};
use strum::{AsRefStr, Display, EnumString};

/// Kind of assessment item.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, AsRefStr, Display, EnumString,
)]
#[serde(rename_all = "snake_case")]
#[strum(serialize_all = "snake_case")]
pub enum QuestionType {
    MultipleChoice,
    ShortAnswer,
    TrueFalse,
    FillInBlank,
}

/// Difficulty of an assessment item.
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
    EnumString,
)]
#[serde(rename_all = "snake_case")]
#[strum(serialize_all = "snake_case")]
pub enum Difficulty {
    Easy,
    #[default]
    Medium,
    Hard,
}

/// One assessment item produced for a chunk.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct QuizQuestion {
    /// Prompt text. Questions are deduplicated on exact equality of this field.
    pub question: String,
    /// Kind of question.
    pub question_type: QuestionType,
    /// Candidate answers (multiple choice only).
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub options: Option<Vec<String>>,
    /// Expected answer.
    pub correct_answer: String,
    /// Rationale for the answer.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub explanation: Option<String>,
    /// Difficulty level.
    pub difficulty: Difficulty,
    /// Free-text label used for grouping.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub topic: Option<String>,
}

impl QuizQuestion {
    /// Creates a question without options, explanation or topic.
    pub fn new(
        question: impl Into<String>,
        question_type: QuestionType,
        correct_answer: impl Into<String>,
    ) -> Self {
        Self {
            question: question.into(),
            question_type,
            options: None,
            correct_answer: correct_answer.into(),
            explanation: None,
            difficulty: Difficulty::default(),
            topic: None,
        }
    }

    /// Sets the candidate answers.
    pub fn with_options<I, S>(mut self, options: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.options = Some(options.into_iter().map(Into::into).collect());
        self
    }

    /// Sets the rationale.
    pub fn with_explanation(mut self, explanation: impl Into<String>) -> Self {
        self.explanation = Some(explanation.into());
        self
    }

    /// Sets the difficulty.
    pub fn with_difficulty(mut self, difficulty: Difficulty) -> Self {
        self.difficulty = difficulty;
        self
    }

    /// Sets the topic label.
    pub fn with_topic(mut self, topic: impl Into<String>) -> Self {
        self.topic = Some(topic.into());
        self
    }
}
