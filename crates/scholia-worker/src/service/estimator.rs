//! Processing time and complexity estimation.

use scholia_core::Result;
use scholia_core::types::ProcessingOptions;
use serde::{Deserialize, Serialize};
use strum::{AsRefStr, Display, EnumString};

use super::TextChunker;
use crate::TRACING_TARGET_ESTIMATOR;

/// Base cost of one chunk, in seconds.
const SECONDS_PER_CHUNK: f64 = 3.0;

/// Cost multiplier for documents with mathematical or chemical content.
const FEATURE_MULTIPLIER: f64 = 1.5;

/// Cost multiplier for large documents.
const SIZE_MULTIPLIER: f64 = 1.3;

/// Documents longer than this many characters are high complexity.
const HIGH_COMPLEXITY_CHARS: usize = 10_000;

/// Documents needing more chunks than this are high complexity.
const HIGH_COMPLEXITY_CHUNKS: usize = 5;

/// Complexity tier of a document.
#[derive(
    Debug,
    Clone,
    Copy,
    Default,
    PartialEq,
    Eq,
    PartialOrd,
    Ord,
    Hash,
    Serialize,
    Deserialize,
    AsRefStr,
    Display,
    EnumString
)]
#[serde(rename_all = "lowercase")]
#[strum(serialize_all = "lowercase")]
pub enum Complexity {
    /// Plain prose of modest size.
    #[default]
    Low,
    /// Contains equations, formulas or notation.
    Medium,
    /// Long document or many chunks.
    High,
}

/// Predicted cost of processing a document.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct ProcessingEstimate {
    /// Estimated wall-clock seconds.
    pub estimated_time_seconds: u64,
    /// Number of chunks the document splits into.
    pub chunks_required: usize,
    /// Complexity tier.
    pub complexity: Complexity,
}

/// Estimate plus the chunking recommendation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct ProcessingPlan {
    /// Cost estimate.
    pub estimate: ProcessingEstimate,
    /// Whether the document should go through chunked processing.
    pub recommend_chunking: bool,
    /// Character length of the document.
    pub total_characters: usize,
}

/// Read-only estimator over raw text.
#[derive(Debug, Clone)]
pub struct ProcessingEstimator {
    chunker: TextChunker,
}

impl ProcessingEstimator {
    /// Creates an estimator for the given options.
    ///
    /// # Errors
    ///
    /// Returns a configuration error if the options are invalid.
    pub fn new(options: ProcessingOptions) -> Result<Self> {
        Ok(Self::from_chunker(TextChunker::new(options)?))
    }

    /// Creates an estimator sharing an existing chunker and its detector.
    pub fn from_chunker(chunker: TextChunker) -> Self {
        Self { chunker }
    }

    /// Estimates the processing time and complexity of `text`.
    ///
    /// Feature detection always runs over the full text, regardless of
    /// `enable_math_detection`.
    #[tracing::instrument(
        skip_all,
        fields(text_len = text.len()),
        target = TRACING_TARGET_ESTIMATOR
    )]
    pub fn estimate(&self, text: &str) -> ProcessingEstimate {
        let options = self.chunker.options();
        let chunks_required = self.chunker.count(text);
        let total_characters = text.chars().count();

        let mut multiplier = 1.0;
        let mut complexity = Complexity::Low;

        if self.chunker.detector().detect(text).any() {
            multiplier = FEATURE_MULTIPLIER;
            complexity = Complexity::Medium;
        }

        if total_characters > HIGH_COMPLEXITY_CHARS || chunks_required > HIGH_COMPLEXITY_CHUNKS {
            multiplier *= SIZE_MULTIPLIER;
            complexity = Complexity::High;
        }

        let seconds = chunks_required as f64 * SECONDS_PER_CHUNK * multiplier
            / options.max_concurrency as f64;
        let estimated_time_seconds = seconds.ceil() as u64;

        tracing::debug!(
            target: TRACING_TARGET_ESTIMATOR,
            chunks_required,
            complexity = %complexity,
            estimated_time_seconds,
            "estimated processing time"
        );

        ProcessingEstimate {
            estimated_time_seconds,
            chunks_required,
            complexity,
        }
    }

    /// Estimates `text` and decides whether chunked processing is warranted.
    pub fn plan(&self, text: &str) -> ProcessingPlan {
        let estimate = self.estimate(text);
        let total_characters = text.chars().count();
        let recommend_chunking =
            total_characters > self.chunker.options().chunk_size || estimate.chunks_required > 1;

        ProcessingPlan {
            estimate,
            recommend_chunking,
            total_characters,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn estimator(chunk_size: usize) -> ProcessingEstimator {
        ProcessingEstimator::new(ProcessingOptions::new(chunk_size).with_overlap_size(0)).unwrap()
    }

    #[test]
    fn test_plain_short_text_is_low() {
        let estimate = estimator(4000).estimate("123 456 789");

        assert_eq!(estimate.chunks_required, 1);
        assert_eq!(estimate.complexity, Complexity::Low);
        assert_eq!(estimate.estimated_time_seconds, 1);
    }

    #[test]
    fn test_math_content_is_medium() {
        let estimate = estimator(4000).estimate("E = mc^2");

        assert_eq!(estimate.complexity, Complexity::Medium);
        // ceil(1 * 3 * 1.5 / 3)
        assert_eq!(estimate.estimated_time_seconds, 2);
    }

    #[test]
    fn test_many_chunks_is_high() {
        let text = "1234567890 ".repeat(545);
        let estimate = estimator(1000).estimate(&text);

        assert_eq!(estimate.chunks_required, 6);
        assert_eq!(estimate.complexity, Complexity::High);
        // ceil(6 * 3 * 1.3 / 3)
        assert_eq!(estimate.estimated_time_seconds, 8);
    }

    #[test]
    fn test_long_text_with_features_is_high() {
        let text = "x^2 + y^2 = z^2. ".repeat(700);
        let estimate = estimator(4000).estimate(&text);

        assert!(text.chars().count() > HIGH_COMPLEXITY_CHARS);
        assert_eq!(estimate.complexity, Complexity::High);
    }

    #[test]
    fn test_detection_flag_does_not_affect_estimate() {
        let options = ProcessingOptions::default().with_math_detection(false);
        let estimate = ProcessingEstimator::new(options).unwrap().estimate("E = mc^2");
        assert_eq!(estimate.complexity, Complexity::Medium);
    }

    #[test]
    fn test_longer_text_never_estimates_less() {
        let estimator = estimator(500);
        let mut previous = 0;
        for repeats in [1, 10, 50, 100, 400, 1000] {
            let text = "The quick brown fox. ".repeat(repeats);
            let seconds = estimator.estimate(&text).estimated_time_seconds;
            assert!(seconds >= previous, "{repeats} repeats estimated {seconds}s");
            previous = seconds;
        }
    }

    #[test]
    fn test_plan_recommends_chunking() {
        let estimator = estimator(100);

        let short = estimator.plan("Short enough.");
        assert!(!short.recommend_chunking);
        assert_eq!(short.total_characters, 13);

        let long = estimator.plan(&"word ".repeat(50));
        assert!(long.recommend_chunking);
        assert!(long.estimate.chunks_required > 1);
    }

    #[test]
    fn test_complexity_serializes_lowercase() {
        assert_eq!(Complexity::High.as_ref(), "high");
        assert_eq!(Complexity::Medium.to_string(), "medium");
    }
}
