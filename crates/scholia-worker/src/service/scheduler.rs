//! Bounded-concurrency batch scheduling of chunk handlers.
//!
//! Chunks are processed in consecutive batches of `max_concurrency`. All
//! handlers in a batch run concurrently and the batch is awaited as a whole
//! before the [`Pacing`] policy is consulted and the next batch starts. A
//! failing (or panicking) handler only fails its own chunk.

use std::any::Any;
use std::panic::AssertUnwindSafe;
use std::sync::Arc;
use std::time::Duration;

use futures::FutureExt;
use futures::future::join_all;
use scholia_core::types::{ChunkResult, DocumentChunk, ProcessingOptions};
use scholia_core::{ChunkHandler, Result};

use super::ChunkProcessor;
use crate::TRACING_TARGET_SCHEDULER;

/// Default cool-down between batches.
pub const DEFAULT_BATCH_DELAY: Duration = Duration::from_secs(1);

/// Policy deciding how long to wait between batches.
#[async_trait::async_trait]
pub trait Pacing: Send + Sync {
    /// Suspends after batch `batch_index` finished and before the next one starts.
    async fn wait(&self, batch_index: usize);
}

/// Waits a fixed duration between batches.
#[derive(Debug, Clone, Copy)]
pub struct FixedDelay {
    delay: Duration,
}

impl FixedDelay {
    /// Creates a fixed delay.
    pub fn new(delay: Duration) -> Self {
        Self { delay }
    }

    /// Returns the delay.
    pub fn delay(&self) -> Duration {
        self.delay
    }
}

impl Default for FixedDelay {
    fn default() -> Self {
        Self::new(DEFAULT_BATCH_DELAY)
    }
}

#[async_trait::async_trait]
impl Pacing for FixedDelay {
    async fn wait(&self, batch_index: usize) {
        tracing::trace!(
            target: TRACING_TARGET_SCHEDULER,
            batch_index,
            delay_ms = self.delay.as_millis() as u64,
            "pacing before next batch"
        );
        tokio::time::sleep(self.delay).await;
    }
}

/// Starts the next batch immediately.
#[derive(Debug, Clone, Copy, Default)]
pub struct NoDelay;

#[async_trait::async_trait]
impl Pacing for NoDelay {
    async fn wait(&self, _batch_index: usize) {}
}

/// Runs a [`ChunkHandler`] over chunks in paced, fixed-size batches.
#[derive(Clone)]
pub struct BatchScheduler {
    max_concurrency: usize,
    pacing: Arc<dyn Pacing>,
}

impl std::fmt::Debug for BatchScheduler {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("BatchScheduler")
            .field("max_concurrency", &self.max_concurrency)
            .finish_non_exhaustive()
    }
}

impl BatchScheduler {
    /// Creates a scheduler with the default one second [`FixedDelay`].
    ///
    /// # Errors
    ///
    /// Returns a configuration error if the options are invalid.
    pub fn new(options: &ProcessingOptions) -> Result<Self> {
        options.validate()?;
        Ok(Self {
            max_concurrency: options.max_concurrency,
            pacing: Arc::new(FixedDelay::default()),
        })
    }

    /// Replaces the pacing policy.
    pub fn with_pacing(mut self, pacing: impl Pacing + 'static) -> Self {
        self.pacing = Arc::new(pacing);
        self
    }

    /// Returns the batch size.
    pub fn max_concurrency(&self) -> usize {
        self.max_concurrency
    }

    /// Processes every chunk and returns results aligned with `chunks`.
    pub async fn process<H>(&self, chunks: &[DocumentChunk], handler: &H) -> Vec<ChunkResult>
    where
        H: ChunkHandler + ?Sized,
    {
        self.process_with_progress(chunks, handler, None).await
    }

    /// Processes every chunk, reporting each completed chunk to `progress`.
    ///
    /// The returned vector is index-aligned with `chunks`: `results[i].chunk_index == i`
    /// regardless of the order in which handlers completed.
    #[tracing::instrument(
        skip_all,
        fields(chunk_count = chunks.len(), max_concurrency = self.max_concurrency),
        target = TRACING_TARGET_SCHEDULER
    )]
    pub async fn process_with_progress<H>(
        &self,
        chunks: &[DocumentChunk],
        handler: &H,
        mut progress: Option<&mut ChunkProcessor>,
    ) -> Vec<ChunkResult>
    where
        H: ChunkHandler + ?Sized,
    {
        let mut results: Vec<Option<ChunkResult>> = vec![None; chunks.len()];
        let batch_count = chunks.len().div_ceil(self.max_concurrency);

        for (batch_index, batch) in chunks.chunks(self.max_concurrency).enumerate() {
            let offset = batch_index * self.max_concurrency;

            tracing::debug!(
                target: TRACING_TARGET_SCHEDULER,
                batch_index,
                batch_count,
                batch_size = batch.len(),
                "processing batch"
            );

            let batch_results = join_all(
                batch
                    .iter()
                    .enumerate()
                    .map(|(position, chunk)| run_chunk(handler, offset + position, chunk)),
            )
            .await;

            for result in batch_results {
                let chunk_index = result.chunk_index;
                if let Some(progress) = progress.as_deref_mut() {
                    progress.report_progress(chunk_index);
                }
                results[chunk_index] = Some(result);
            }

            if batch_index + 1 < batch_count {
                self.pacing.wait(batch_index).await;
            }
        }

        let results: Vec<ChunkResult> = results.into_iter().flatten().collect();

        tracing::info!(
            target: TRACING_TARGET_SCHEDULER,
            total = results.len(),
            successful = results.iter().filter(|r| r.success).count(),
            "batch processing completed"
        );

        results
    }
}

/// Runs the handler on one chunk, converting errors and panics into a failed result.
async fn run_chunk<H>(handler: &H, chunk_index: usize, chunk: &DocumentChunk) -> ChunkResult
where
    H: ChunkHandler + ?Sized,
{
    let outcome = AssertUnwindSafe(handler.handle(chunk)).catch_unwind().await;

    let message = match outcome {
        Ok(Ok(output)) => return ChunkResult::succeeded(chunk_index, output),
        Ok(Err(err)) => err.to_string(),
        Err(panic) => panic_message(panic.as_ref()),
    };

    tracing::warn!(
        target: TRACING_TARGET_SCHEDULER,
        chunk_id = %chunk.id,
        chunk_index,
        error = %message,
        "chunk processing failed"
    );

    ChunkResult::failed(chunk_index, chunk, message)
}

fn panic_message(panic: &(dyn Any + Send)) -> String {
    if let Some(message) = panic.downcast_ref::<&str>() {
        format!("handler panicked: {message}")
    } else if let Some(message) = panic.downcast_ref::<String>() {
        format!("handler panicked: {message}")
    } else {
        "handler panicked".to_string()
    }
}

#[cfg(test)]
mod tests {
    use std::sync::atomic::{AtomicUsize, Ordering};

    use scholia_core::mock::SimulatedHandler;
    use scholia_core::{ChunkOutput, ContentFeatures, Error, handler_fn};

    use super::*;

    fn chunks(count: usize) -> Vec<DocumentChunk> {
        (0..count)
            .map(|index| {
                let content = index.to_string();
                let len = content.len();
                DocumentChunk::new(index, content, 0, len, 0, ContentFeatures::default())
            })
            .collect()
    }

    fn scheduler(max_concurrency: usize) -> BatchScheduler {
        let options = ProcessingOptions::default().with_max_concurrency(max_concurrency);
        BatchScheduler::new(&options).unwrap().with_pacing(NoDelay)
    }

    #[tokio::test(start_paused = true)]
    async fn test_results_follow_chunk_order() {
        // Later chunks finish first within each batch.
        let handler = handler_fn(|chunk: DocumentChunk| async move {
            let index: u64 = chunk.content.parse().unwrap();
            tokio::time::sleep(Duration::from_millis(100 - index * 7)).await;
            Ok(ChunkOutput::default().with_summary(chunk.content))
        });

        let results = scheduler(4).process(&chunks(10), &handler).await;

        assert_eq!(results.len(), 10);
        for (index, result) in results.iter().enumerate() {
            assert_eq!(result.chunk_index, index);
            assert!(result.success);
            assert_eq!(result.result.summary, Some(index.to_string()));
        }
    }

    #[tokio::test]
    async fn test_single_failure_is_isolated() {
        let handler = SimulatedHandler::new().with_failure(3);
        let input = chunks(7);
        let results = scheduler(3).process(&input, &handler).await;

        for (index, result) in results.iter().enumerate() {
            if index == 3 {
                assert!(!result.success);
                assert_eq!(
                    result.error.as_deref(),
                    Some("handler: simulated failure for chunk-3")
                );
                assert_eq!(result.result.extracted_text.as_deref(), Some("3"));
                assert!(result.result.summary.is_none());
            } else {
                assert!(result.success, "chunk {index} should succeed");
                assert!(result.error.is_none());
            }
        }
    }

    #[tokio::test]
    async fn test_panicking_handler_fails_only_its_chunk() {
        let handler = handler_fn(|chunk: DocumentChunk| async move {
            if chunk.id == "chunk-1" {
                panic!("backend exploded");
            }
            Ok(ChunkOutput::default())
        });

        let results = scheduler(2).process(&chunks(3), &handler).await;

        assert!(results[0].success);
        assert!(!results[1].success);
        assert_eq!(
            results[1].error.as_deref(),
            Some("handler panicked: backend exploded")
        );
        assert!(results[2].success);
    }

    #[tokio::test]
    async fn test_batches_never_exceed_concurrency() {
        let in_flight = Arc::new(AtomicUsize::new(0));
        let peak = Arc::new(AtomicUsize::new(0));

        let handler = {
            let in_flight = Arc::clone(&in_flight);
            let peak = Arc::clone(&peak);
            handler_fn(move |_chunk: DocumentChunk| {
                let in_flight = Arc::clone(&in_flight);
                let peak = Arc::clone(&peak);
                async move {
                    let now = in_flight.fetch_add(1, Ordering::SeqCst) + 1;
                    peak.fetch_max(now, Ordering::SeqCst);
                    tokio::task::yield_now().await;
                    in_flight.fetch_sub(1, Ordering::SeqCst);
                    Ok(ChunkOutput::default())
                }
            })
        };

        let results = scheduler(3).process(&chunks(8), &handler).await;

        assert_eq!(results.len(), 8);
        assert!(peak.load(Ordering::SeqCst) <= 3);
    }

    #[tokio::test(start_paused = true)]
    async fn test_fixed_delay_between_batches_only() {
        let options = ProcessingOptions::default().with_max_concurrency(3);
        let scheduler = BatchScheduler::new(&options).unwrap();
        let handler = SimulatedHandler::new();

        let started = tokio::time::Instant::now();
        scheduler.process(&chunks(7), &handler).await;
        // Three batches, two pauses.
        assert_eq!(started.elapsed(), Duration::from_secs(2));

        let started = tokio::time::Instant::now();
        scheduler.process(&chunks(3), &handler).await;
        assert_eq!(started.elapsed(), Duration::ZERO);
    }

    #[tokio::test]
    async fn test_reports_progress_for_every_chunk() {
        let mut progress = ChunkProcessor::new(5);
        let handler = handler_fn(|_chunk: DocumentChunk| async move {
            Err::<ChunkOutput, _>(Error::handler().with_message("offline"))
        });

        let results = scheduler(2)
            .process_with_progress(&chunks(5), &handler, Some(&mut progress))
            .await;

        assert_eq!(results.len(), 5);
        assert!(results.iter().all(|r| !r.success));
        assert!(progress.is_complete());
        assert_eq!(progress.progress(), 100.0);
    }

    #[tokio::test]
    async fn test_empty_input() {
        let results = scheduler(3).process(&[], &SimulatedHandler::new()).await;
        assert!(results.is_empty());
    }
}
