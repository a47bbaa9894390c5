//! Pipeline stages.
//!
//! ## Services
//!
//! - [`TextChunker`] - Context-preserving text chunking
//! - [`BatchScheduler`] - Paced, bounded-concurrency chunk processing
//! - [`merge_chunk_results`] - Document-level result assembly
//! - [`ProcessingEstimator`] - Time and complexity estimation
//! - [`StudyDigest`] - Key points, concepts and quiz metadata
//! - [`preprocess_document_text`] - OCR text cleanup

mod chunker;
mod digest;
mod estimator;
mod merger;
mod preprocess;
mod progress;
mod scheduler;

pub use chunker::TextChunker;
pub use digest::{ExplanationDigest, ExplanationLevel, QuizDigest, StudyDigest, SummaryDigest};
pub use estimator::{Complexity, ProcessingEstimate, ProcessingEstimator, ProcessingPlan};
pub use merger::{MAX_QUIZ_QUESTIONS, merge_chunk_results};
pub use preprocess::preprocess_document_text;
pub use progress::{ChunkProcessor, ProgressCallback};
pub use scheduler::{BatchScheduler, DEFAULT_BATCH_DELAY, FixedDelay, NoDelay, Pacing};
