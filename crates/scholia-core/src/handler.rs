//! Per-chunk handler abstraction.
//!
//! A handler is the injected collaborator that enhances one chunk, usually by
//! calling a remote AI backend. The pipeline only decides how work is split,
//! scheduled and merged; it never performs inference itself.

use std::future::Future;
use std::sync::Arc;

use crate::types::{ChunkOutput, DocumentChunk};
use crate::Result;

/// Type alias for a shared, dynamically dispatched chunk handler.
pub type BoxedChunkHandler = Arc<dyn ChunkHandler>;

/// Core trait for per-chunk processing.
#[async_trait::async_trait]
pub trait ChunkHandler: Send + Sync {
    /// Processes one chunk.
    ///
    /// Returning an error marks the chunk as failed; it never aborts the
    /// surrounding batch.
    async fn handle(&self, chunk: &DocumentChunk) -> Result<ChunkOutput>;
}

#[async_trait::async_trait]
impl<T: ChunkHandler + ?Sized> ChunkHandler for Arc<T> {
    async fn handle(&self, chunk: &DocumentChunk) -> Result<ChunkOutput> {
        (**self).handle(chunk).await
    }
}

/// Handler backed by an async closure. Created with [`handler_fn`].
#[derive(Debug, Clone)]
pub struct FnHandler<F> {
    f: F,
}

/// Wraps an async closure taking an owned chunk into a [`ChunkHandler`].
///
/// ```rust
/// use scholia_core::{ChunkOutput, handler_fn};
///
/// let handler = handler_fn(|chunk| async move {
///     Ok(ChunkOutput::default().with_summary(format!("{} words", chunk.word_count)))
/// });
/// # let _ = handler;
/// ```
pub fn handler_fn<F, Fut>(f: F) -> FnHandler<F>
where
    F: Fn(DocumentChunk) -> Fut + Send + Sync + 'static,
    Fut: Future<Output = Result<ChunkOutput>> + Send + 'static,
{
    FnHandler { f }
}

#[async_trait::async_trait]
impl<F, Fut> ChunkHandler for FnHandler<F>
where
    F: Fn(DocumentChunk) -> Fut + Send + Sync + 'static,
    Fut: Future<Output = Result<ChunkOutput>> + Send + 'static,
{
    async fn handle(&self, chunk: &DocumentChunk) -> Result<ChunkOutput> {
        (self.f)(chunk.clone()).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::detect::ContentFeatures;
    use crate::Error;

    fn chunk(content: &str) -> DocumentChunk {
        let len = content.chars().count();
        DocumentChunk::new(0, content.to_string(), 0, len, 0, ContentFeatures::default())
    }

    #[tokio::test]
    async fn test_closure_handler() {
        let handler = handler_fn(|chunk: DocumentChunk| async move {
            Ok(ChunkOutput::default().with_summary(chunk.content.to_uppercase()))
        });

        let output = handler.handle(&chunk("abc")).await.unwrap();
        assert_eq!(output.summary.as_deref(), Some("ABC"));
    }

    #[tokio::test]
    async fn test_boxed_handler_forwards_errors() {
        let handler: BoxedChunkHandler = Arc::new(handler_fn(|_chunk: DocumentChunk| async move {
            Err::<ChunkOutput, _>(Error::handler().with_message("rate limited"))
        }));

        let err = handler.handle(&chunk("abc")).await.unwrap_err();
        assert_eq!(err.to_string(), "handler: rate limited");
    }
}
