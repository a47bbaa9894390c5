//! Pipeline configuration.

#[cfg(feature = "config")]
use clap::Args;
use scholia_core::types::ProcessingOptions;
use serde::{Deserialize, Serialize};

use crate::service::ExplanationLevel;

/// Default pause between scheduler batches, in milliseconds.
pub const DEFAULT_BATCH_DELAY_MS: u64 = 1000;

/// Complete pipeline configuration.
///
/// Embeds the chunking [`ProcessingOptions`] and adds the settings that only
/// matter once a document runs end to end.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[cfg_attr(feature = "config", derive(Args))]
#[serde(default)]
pub struct PipelineConfig {
    /// Chunking and scheduling options.
    #[cfg_attr(feature = "config", command(flatten))]
    #[serde(flatten)]
    pub options: ProcessingOptions,

    /// Cleans up OCR artifacts before chunking.
    #[cfg_attr(
        feature = "config",
        arg(long = "preprocess", env = "PREPROCESS_TEXT", default_value_t = false)
    )]
    pub preprocess: bool,

    /// Pause between scheduler batches, in milliseconds.
    #[cfg_attr(
        feature = "config",
        arg(
            long = "batch-delay-ms",
            env = "BATCH_DELAY_MS",
            default_value_t = DEFAULT_BATCH_DELAY_MS
        )
    )]
    pub batch_delay_ms: u64,

    /// Explanation depth reported in the study digest.
    #[cfg_attr(
        feature = "config",
        arg(
            long = "explanation-level",
            env = "EXPLANATION_LEVEL",
            value_enum,
            default_value_t = ExplanationLevel::default()
        )
    )]
    pub explanation_level: ExplanationLevel,
}

impl Default for PipelineConfig {
    fn default() -> Self {
        Self {
            options: ProcessingOptions::default(),
            preprocess: false,
            batch_delay_ms: DEFAULT_BATCH_DELAY_MS,
            explanation_level: ExplanationLevel::default(),
        }
    }
}

impl PipelineConfig {
    /// Creates a configuration around the given options.
    pub fn new(options: ProcessingOptions) -> Self {
        Self {
            options,
            ..Default::default()
        }
    }

    /// Enables or disables OCR cleanup.
    pub fn with_preprocess(mut self, preprocess: bool) -> Self {
        self.preprocess = preprocess;
        self
    }

    /// Sets the pause between batches.
    pub fn with_batch_delay_ms(mut self, batch_delay_ms: u64) -> Self {
        self.batch_delay_ms = batch_delay_ms;
        self
    }

    /// Sets the explanation level reported in the digest.
    pub fn with_explanation_level(mut self, explanation_level: ExplanationLevel) -> Self {
        self.explanation_level = explanation_level;
        self
    }
}
