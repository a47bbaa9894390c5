//! Per-chunk and merged processing results.

use serde::{Deserialize, Serialize};

use super::{DocumentChunk, QuizQuestion};

/// Output of the per-chunk handler.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ChunkOutput {
    /// Summary fragment for the chunk.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub summary: Option<String>,
    /// Explanation fragment for the chunk.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub explanation: Option<String>,
    /// Quiz questions generated for the chunk.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub quiz: Option<Vec<QuizQuestion>>,
    /// Text extracted from the chunk.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub extracted_text: Option<String>,
}

impl ChunkOutput {
    /// Creates an output carrying only extracted text.
    pub fn extracted(text: impl Into<String>) -> Self {
        Self {
            extracted_text: Some(text.into()),
            ..Default::default()
        }
    }

    /// Sets the summary fragment.
    pub fn with_summary(mut self, summary: impl Into<String>) -> Self {
        self.summary = Some(summary.into());
        self
    }

    /// Sets the explanation fragment.
    pub fn with_explanation(mut self, explanation: impl Into<String>) -> Self {
        self.explanation = Some(explanation.into());
        self
    }

    /// Sets the quiz questions.
    pub fn with_quiz(mut self, quiz: Vec<QuizQuestion>) -> Self {
        self.quiz = Some(quiz);
        self
    }
}

/// Outcome of running the per-chunk handler on one chunk.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ChunkResult {
    /// Position of the chunk in the original ordering.
    pub chunk_index: usize,
    /// Handler output, or the chunk content when the handler failed.
    pub result: ChunkOutput,
    /// Whether the handler completed without error.
    pub success: bool,
    /// Failure message, present only when `success` is false.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

impl ChunkResult {
    /// Creates a successful result.
    pub fn succeeded(chunk_index: usize, result: ChunkOutput) -> Self {
        Self {
            chunk_index,
            result,
            success: true,
            error: None,
        }
    }

    /// Creates a failed result that falls back to the chunk's own content.
    pub fn failed(chunk_index: usize, chunk: &DocumentChunk, error: impl Into<String>) -> Self {
        Self {
            chunk_index,
            result: ChunkOutput::extracted(chunk.content.clone()),
            success: false,
            error: Some(error.into()),
        }
    }
}

/// Merged, document-level output.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ChunkedProcessingResult {
    /// The full ordered chunk sequence.
    pub chunks: Vec<DocumentChunk>,
    /// Number of chunks.
    pub total_chunks: usize,
    /// Character length of `extracted_text`.
    pub total_characters: usize,
    /// Wall-clock milliseconds spent merging.
    pub processing_time_ms: u64,
    /// Concatenated summary with a `## Document Summary` heading.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub summary: Option<String>,
    /// Concatenated explanation with a `## Detailed Explanation` heading.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub explanation: Option<String>,
    /// Deduplicated, size-bounded quiz.
    pub quiz: Vec<QuizQuestion>,
    /// Chunk contents joined with blank lines. Overlapping text appears twice.
    pub extracted_text: String,
    /// Ids of the chunks whose handler failed.
    #[serde(default)]
    pub failed_chunks: Vec<String>,
}

impl ChunkedProcessingResult {
    /// Returns the number of chunks whose handler failed.
    pub fn partial_failure_count(&self) -> usize {
        self.failed_chunks.len()
    }

    /// Returns true if at least one chunk failed.
    pub fn is_partial(&self) -> bool {
        !self.failed_chunks.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::detect::ContentFeatures;

    #[test]
    fn test_failed_result_falls_back_to_content() {
        let chunk = DocumentChunk::new(
            2,
            "raw text".to_string(),
            10,
            18,
            0,
            ContentFeatures::default(),
        );
        let result = ChunkResult::failed(2, &chunk, "backend unavailable");

        assert!(!result.success);
        assert_eq!(result.error.as_deref(), Some("backend unavailable"));
        assert_eq!(result.result.extracted_text.as_deref(), Some("raw text"));
        assert!(result.result.summary.is_none());
    }

    #[test]
    fn test_successful_result_omits_error() {
        let result = ChunkResult::succeeded(0, ChunkOutput::default().with_summary("short"));
        let json = serde_json::to_value(&result).unwrap();
        assert!(json.get("error").is_none());
        assert_eq!(json["result"]["summary"], "short");
    }
}
