#![forbid(unsafe_code)]
#![cfg_attr(docsrs, feature(doc_cfg))]
#![doc = include_str!("../README.md")]

/// Tracing target for chunking.
pub const TRACING_TARGET_CHUNKER: &str = "scholia_worker::chunker";

/// Tracing target for batch scheduling.
pub const TRACING_TARGET_SCHEDULER: &str = "scholia_worker::scheduler";

/// Tracing target for result merging.
pub const TRACING_TARGET_MERGER: &str = "scholia_worker::merger";

/// Tracing target for estimation.
pub const TRACING_TARGET_ESTIMATOR: &str = "scholia_worker::estimator";

/// Tracing target for the end-to-end pipeline.
pub const TRACING_TARGET_PIPELINE: &str = "scholia_worker::pipeline";

pub mod pipeline;
pub mod service;

pub use pipeline::{DocumentPipeline, PipelineConfig, PipelineOutput};
pub use service::{
    BatchScheduler, ChunkProcessor, Complexity, ExplanationLevel, FixedDelay, NoDelay, Pacing,
    ProcessingEstimate, ProcessingEstimator, ProcessingPlan, StudyDigest, TextChunker,
    merge_chunk_results, preprocess_document_text,
};
