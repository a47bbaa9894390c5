//! Simulated chunk handler for testing and local runs.
//!
//! [`SimulatedHandler`] stands in for a remote AI backend. It derives a
//! summary, an explanation and up to two fill-in-the-blank questions from the
//! chunk text itself, optionally after an artificial latency, and can be told
//! to fail for selected chunks.
//!
//! # Feature Flag
//!
//! This module is only available when the `test-utils` feature is enabled:
//!
//! ```toml
//! [dev-dependencies]
//! scholia-core = { version = "...", features = ["test-utils"] }
//! ```

use std::collections::HashSet;
use std::time::Duration;

use crate::handler::ChunkHandler;
use crate::types::{
    ChunkOutput, Difficulty, DocumentChunk, QuestionType, QuizQuestion, chunk_id,
};
use crate::{Error, Result, TRACING_TARGET_HANDLER};

/// Maximum questions generated per chunk.
const QUESTIONS_PER_CHUNK: usize = 2;

/// Minimum length (exclusive) of a word eligible as a blank.
const MIN_KEYWORD_LEN: usize = 3;

/// Handler producing deterministic output from the chunk text.
#[derive(Debug, Clone, Default)]
pub struct SimulatedHandler {
    latency: Duration,
    failing: HashSet<String>,
}

impl SimulatedHandler {
    /// Creates a handler with no latency and no failures.
    pub fn new() -> Self {
        Self::default()
    }

    /// Sets the artificial latency applied to every chunk.
    pub fn with_latency(mut self, latency: Duration) -> Self {
        self.latency = latency;
        self
    }

    /// Makes the handler fail for the chunk at `index`.
    pub fn with_failure(mut self, index: usize) -> Self {
        self.failing.insert(chunk_id(index));
        self
    }

    /// Makes the handler fail for every chunk in `indices`.
    pub fn with_failures(mut self, indices: impl IntoIterator<Item = usize>) -> Self {
        self.failing.extend(indices.into_iter().map(chunk_id));
        self
    }
}

#[async_trait::async_trait]
impl ChunkHandler for SimulatedHandler {
    async fn handle(&self, chunk: &DocumentChunk) -> Result<ChunkOutput> {
        if !self.latency.is_zero() {
            tokio::time::sleep(self.latency).await;
        }

        if self.failing.contains(&chunk.id) {
            tracing::debug!(
                target: TRACING_TARGET_HANDLER,
                chunk_id = %chunk.id,
                "simulated failure"
            );
            return Err(Error::handler().with_message(format!("simulated failure for {}", chunk.id)));
        }

        let sentences = sentences(&chunk.content);
        let lead = sentences.first().copied().unwrap_or("Content summary");

        Ok(ChunkOutput::default()
            .with_summary(format!("Summary for chunk {}: {lead}...", chunk.id))
            .with_explanation(format!(
                "Detailed explanation of concepts in chunk {}...",
                chunk.id
            ))
            .with_quiz(fill_in_blank_questions(&chunk.id, &sentences)))
    }
}

/// Splits text on sentence terminators, dropping blank pieces.
fn sentences(text: &str) -> Vec<&str> {
    text.split(['.', '!', '?'])
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .collect()
}

fn fill_in_blank_questions(chunk_id: &str, sentences: &[&str]) -> Vec<QuizQuestion> {
    sentences
        .iter()
        .take(QUESTIONS_PER_CHUNK)
        .filter_map(|sentence| {
            let words: Vec<&str> = sentence
                .split_whitespace()
                .filter(|w| w.chars().count() > MIN_KEYWORD_LEN)
                .collect();
            if words.len() < 3 {
                return None;
            }

            let keyword = words[words.len() / 2];
            let prompt = sentence.replacen(keyword, "______", 1);

            Some(
                QuizQuestion::new(
                    format!("Fill in the blank: {prompt}"),
                    QuestionType::FillInBlank,
                    keyword,
                )
                .with_options([keyword, "option1", "option2", "option3"])
                .with_explanation(format!(
                    "The correct answer is \"{keyword}\" based on the context."
                ))
                .with_difficulty(Difficulty::Medium)
                .with_topic(format!("Content from {chunk_id}")),
            )
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::detect::ContentFeatures;

    fn chunk(index: usize, content: &str) -> DocumentChunk {
        let len = content.chars().count();
        DocumentChunk::new(index, content.to_string(), 0, len, 0, ContentFeatures::default())
    }

    #[tokio::test]
    async fn test_generates_summary_and_quiz() {
        let handler = SimulatedHandler::new();
        let output = handler
            .handle(&chunk(
                0,
                "Photosynthesis converts light energy into chemical energy. Plants need water!",
            ))
            .await
            .unwrap();

        assert_eq!(
            output.summary.as_deref(),
            Some(
                "Summary for chunk chunk-0: Photosynthesis converts light energy into chemical energy..."
            )
        );

        let quiz = output.quiz.unwrap();
        assert_eq!(quiz.len(), 2);
        assert_eq!(quiz[0].question_type, QuestionType::FillInBlank);
        assert_eq!(quiz[0].correct_answer, "energy");
        assert_eq!(
            quiz[0].question,
            "Fill in the blank: Photosynthesis converts light ______ into chemical energy"
        );
        assert_eq!(quiz[0].topic.as_deref(), Some("Content from chunk-0"));
        assert_eq!(quiz[1].correct_answer, "need");
    }

    #[tokio::test]
    async fn test_empty_chunk_uses_placeholder_summary() {
        let output = SimulatedHandler::new().handle(&chunk(3, "")).await.unwrap();
        assert_eq!(
            output.summary.as_deref(),
            Some("Summary for chunk chunk-3: Content summary...")
        );
        assert!(output.quiz.unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_configured_failure() {
        let handler = SimulatedHandler::new().with_failures([1]);
        assert!(handler.handle(&chunk(0, "fine")).await.is_ok());
        assert!(handler.handle(&chunk(1, "broken")).await.is_err());
    }
}
