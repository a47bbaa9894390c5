//! Chunking and scheduling options.

#[cfg(feature = "config")]
use clap::Args;
use serde::{Deserialize, Serialize};

use crate::{Error, Result};

/// Default maximum characters per chunk.
pub const DEFAULT_CHUNK_SIZE: usize = 4000;

/// Default characters of trailing context carried into the next chunk.
pub const DEFAULT_OVERLAP_SIZE: usize = 200;

/// Default maximum number of chunks processed simultaneously.
pub const DEFAULT_MAX_CONCURRENCY: usize = 3;

/// Options shared by the chunker, the scheduler and the estimator.
///
/// Sizes are measured in characters (Unicode scalar values), not bytes.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[cfg_attr(feature = "config", derive(Args))]
#[serde(default)]
pub struct ProcessingOptions {
    /// Maximum characters per chunk.
    #[cfg_attr(
        feature = "config",
        arg(long = "chunk-size", env = "CHUNK_SIZE", default_value_t = DEFAULT_CHUNK_SIZE)
    )]
    pub chunk_size: usize,

    /// Characters of trailing context carried into the next chunk.
    #[cfg_attr(
        feature = "config",
        arg(long = "overlap-size", env = "OVERLAP_SIZE", default_value_t = DEFAULT_OVERLAP_SIZE)
    )]
    pub overlap_size: usize,

    /// Maximum chunks processed simultaneously.
    #[cfg_attr(
        feature = "config",
        arg(
            long = "max-concurrency",
            env = "MAX_CONCURRENCY",
            default_value_t = DEFAULT_MAX_CONCURRENCY
        )
    )]
    pub max_concurrency: usize,

    /// Keeps formula tokens intact during preprocessing.
    #[cfg_attr(
        feature = "config",
        arg(
            long = "preserve-equations",
            env = "PRESERVE_EQUATIONS",
            default_value_t = true,
            action = clap::ArgAction::Set
        )
    )]
    pub preserve_equations: bool,

    /// Tags each chunk with content feature flags.
    #[cfg_attr(
        feature = "config",
        arg(
            long = "math-detection",
            env = "ENABLE_MATH_DETECTION",
            default_value_t = true,
            action = clap::ArgAction::Set
        )
    )]
    pub enable_math_detection: bool,
}

impl Default for ProcessingOptions {
    fn default() -> Self {
        Self {
            chunk_size: DEFAULT_CHUNK_SIZE,
            overlap_size: DEFAULT_OVERLAP_SIZE,
            max_concurrency: DEFAULT_MAX_CONCURRENCY,
            preserve_equations: true,
            enable_math_detection: true,
        }
    }
}

impl ProcessingOptions {
    /// Creates options with the given chunk size and defaults elsewhere.
    pub fn new(chunk_size: usize) -> Self {
        Self {
            chunk_size,
            ..Default::default()
        }
    }

    /// Sets the overlap between chunks.
    pub fn with_overlap_size(mut self, overlap_size: usize) -> Self {
        self.overlap_size = overlap_size;
        self
    }

    /// Sets the maximum number of concurrently processed chunks.
    pub fn with_max_concurrency(mut self, max_concurrency: usize) -> Self {
        self.max_concurrency = max_concurrency;
        self
    }

    /// Sets whether formula tokens are preserved during preprocessing.
    pub fn with_preserve_equations(mut self, preserve_equations: bool) -> Self {
        self.preserve_equations = preserve_equations;
        self
    }

    /// Sets whether chunks are tagged with content features.
    pub fn with_math_detection(mut self, enable_math_detection: bool) -> Self {
        self.enable_math_detection = enable_math_detection;
        self
    }

    /// Validates the options.
    ///
    /// # Errors
    ///
    /// Returns a configuration error if `chunk_size` or `max_concurrency` is
    /// zero, or if the overlap is not smaller than the chunk size.
    pub fn validate(&self) -> Result<()> {
        if self.chunk_size == 0 {
            return Err(Error::configuration().with_message("chunk_size must be greater than 0"));
        }

        if self.max_concurrency == 0 {
            return Err(
                Error::configuration().with_message("max_concurrency must be greater than 0")
            );
        }

        if self.overlap_size >= self.chunk_size {
            return Err(Error::configuration().with_message(format!(
                "overlap_size ({}) must be less than chunk_size ({})",
                self.overlap_size, self.chunk_size
            )));
        }

        Ok(())
    }
}
