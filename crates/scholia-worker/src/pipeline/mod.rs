//! End-to-end document processing.
//!
//! [`DocumentPipeline`] wires the stages together: optional OCR cleanup,
//! chunking, paced batch processing through a [`ChunkHandler`], merging, and
//! the study digest. The math report is computed over the whole (cleaned) text.

mod config;

use std::borrow::Cow;
use std::time::{Duration, Instant};

use jiff::Timestamp;
use scholia_core::detect::{MathContentReport, analyze_math_content};
use scholia_core::types::{ChunkedProcessingResult, DocumentChunk};
use scholia_core::{ChunkHandler, Result};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

pub use self::config::{DEFAULT_BATCH_DELAY_MS, PipelineConfig};
use crate::TRACING_TARGET_PIPELINE;
use crate::service::{
    BatchScheduler, ChunkProcessor, FixedDelay, Pacing, ProcessingEstimator, ProcessingPlan,
    ProgressCallback, StudyDigest, TextChunker, merge_chunk_results, preprocess_document_text,
};

/// Everything produced by one pipeline run.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PipelineOutput {
    /// Unique, time-ordered run identifier.
    pub run_id: Uuid,
    /// When the run started.
    pub created_at: Timestamp,
    /// Whether the document exceeded a single chunk.
    pub is_chunked: bool,
    /// Merged document-level result.
    pub result: ChunkedProcessingResult,
    /// Study-oriented digest of `result`.
    pub digest: StudyDigest,
    /// Mathematical content of the processed text.
    pub math: MathContentReport,
    /// End-to-end wall-clock milliseconds.
    pub elapsed_ms: u64,
}

/// Chunk, schedule and merge pipeline.
#[derive(Debug, Clone)]
pub struct DocumentPipeline {
    config: PipelineConfig,
    chunker: TextChunker,
    scheduler: BatchScheduler,
    estimator: ProcessingEstimator,
}

impl DocumentPipeline {
    /// Creates a pipeline pacing batches with a [`FixedDelay`] of `batch_delay_ms`.
    ///
    /// # Errors
    ///
    /// Returns a configuration error if the processing options are invalid.
    pub fn new(config: PipelineConfig) -> Result<Self> {
        let chunker = TextChunker::new(config.options.clone())?;
        let scheduler = BatchScheduler::new(&config.options)?
            .with_pacing(FixedDelay::new(Duration::from_millis(config.batch_delay_ms)));
        let estimator = ProcessingEstimator::from_chunker(chunker.clone());

        Ok(Self {
            config,
            chunker,
            scheduler,
            estimator,
        })
    }

    /// Replaces the pacing policy between batches.
    pub fn with_pacing(mut self, pacing: impl Pacing + 'static) -> Self {
        self.scheduler = self.scheduler.with_pacing(pacing);
        self
    }

    /// Returns the configuration.
    pub fn config(&self) -> &PipelineConfig {
        &self.config
    }

    /// Returns true if `text` is longer than one chunk.
    pub fn should_chunk(&self, text: &str) -> bool {
        text.chars().count() > self.config.options.chunk_size
    }

    /// Estimates the cost of processing `text`.
    pub fn plan(&self, text: &str) -> ProcessingPlan {
        self.estimator.plan(&self.prepare(text))
    }

    /// Splits `text`, after optional cleanup, into chunks.
    pub fn chunk(&self, text: &str) -> Vec<DocumentChunk> {
        self.chunker.chunk(&self.prepare(text))
    }

    /// Runs the whole pipeline over `text`.
    pub async fn run<H>(&self, text: &str, handler: &H) -> PipelineOutput
    where
        H: ChunkHandler + ?Sized,
    {
        self.run_with_progress(text, handler, None).await
    }

    /// Runs the whole pipeline, reporting every completed chunk to `on_progress`.
    #[tracing::instrument(
        skip_all,
        fields(text_len = text.len()),
        target = TRACING_TARGET_PIPELINE
    )]
    pub async fn run_with_progress<H>(
        &self,
        text: &str,
        handler: &H,
        on_progress: Option<ProgressCallback>,
    ) -> PipelineOutput
    where
        H: ChunkHandler + ?Sized,
    {
        let started = Instant::now();
        let run_id = Uuid::now_v7();
        let created_at = Timestamp::now();

        let text = self.prepare(text);
        let is_chunked = self.should_chunk(&text);
        let chunks = self.chunker.chunk(&text);

        tracing::info!(
            target: TRACING_TARGET_PIPELINE,
            %run_id,
            chunk_count = chunks.len(),
            is_chunked,
            preprocess = self.config.preprocess,
            "pipeline run started"
        );

        let mut progress = ChunkProcessor::new(chunks.len()).with_boxed_callback(on_progress);
        let results = self
            .scheduler
            .process_with_progress(&chunks, handler, Some(&mut progress))
            .await;

        let result = merge_chunk_results(chunks, &results);
        let digest = StudyDigest::from_result(&result, self.config.explanation_level);
        let math = analyze_math_content(&text);
        let elapsed_ms = started.elapsed().as_millis() as u64;

        if result.is_partial() {
            tracing::warn!(
                target: TRACING_TARGET_PIPELINE,
                %run_id,
                failed = result.partial_failure_count(),
                total = result.total_chunks,
                "pipeline run completed with failed chunks"
            );
        } else {
            tracing::info!(
                target: TRACING_TARGET_PIPELINE,
                %run_id,
                total = result.total_chunks,
                elapsed_ms,
                "pipeline run completed"
            );
        }

        PipelineOutput {
            run_id,
            created_at,
            is_chunked,
            result,
            digest,
            math,
            elapsed_ms,
        }
    }

    fn prepare<'a>(&self, text: &'a str) -> Cow<'a, str> {
        if self.config.preprocess {
            Cow::Owned(preprocess_document_text(
                text,
                self.config.options.preserve_equations,
            ))
        } else {
            Cow::Borrowed(text)
        }
    }
}
