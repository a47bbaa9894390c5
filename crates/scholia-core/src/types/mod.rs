//! Data model exchanged between pipeline stages.

mod chunk;
mod options;
mod quiz;
mod result;

pub use chunk::{DocumentChunk, chunk_id, count_words};
pub use options::{
    DEFAULT_CHUNK_SIZE, DEFAULT_MAX_CONCURRENCY, DEFAULT_OVERLAP_SIZE, ProcessingOptions,
};
pub use quiz::{Difficulty, QuestionType, QuizQuestion};
pub use result::{ChunkOutput, ChunkResult, ChunkedProcessingResult};
