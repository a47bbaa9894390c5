#![forbid(unsafe_code)]
#![cfg_attr(docsrs, feature(doc_cfg))]
#![doc = include_str!("../README.md")]

/// Tracing target for content detection.
pub const TRACING_TARGET_DETECT: &str = "scholia_core::detect";

/// Tracing target for chunk handlers.
pub const TRACING_TARGET_HANDLER: &str = "scholia_core::handler";

mod error;
mod handler;

pub mod detect;
#[cfg(any(test, feature = "test-utils"))]
#[cfg_attr(docsrs, doc(cfg(feature = "test-utils")))]
pub mod mock;
pub mod types;

pub use detect::{ContentDetector, ContentFeatures, MathContentReport, PatternDetector};
pub use error::{BoxedError, Error, ErrorKind, Result};
pub use handler::{BoxedChunkHandler, ChunkHandler, FnHandler, handler_fn};
pub use types::{
    ChunkOutput, ChunkResult, ChunkedProcessingResult, Difficulty, DocumentChunk,
    ProcessingOptions, QuestionType, QuizQuestion,
};
