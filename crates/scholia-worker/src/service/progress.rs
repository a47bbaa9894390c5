//! Chunk progress tracking.

/// Callback invoked with `(percent_complete, chunk_index)`.
pub type ProgressCallback = Box<dyn FnMut(f64, usize) + Send>;

/// Counts processed chunks and reports completion percentage.
///
/// Updated through `&mut self`; share it behind a lock if several tasks need
/// to report.
pub struct ChunkProcessor {
    total_chunks: usize,
    processed_chunks: usize,
    on_progress: Option<ProgressCallback>,
}

impl std::fmt::Debug for ChunkProcessor {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ChunkProcessor")
            .field("total_chunks", &self.total_chunks)
            .field("processed_chunks", &self.processed_chunks)
            .field("has_callback", &self.on_progress.is_some())
            .finish()
    }
}

impl ChunkProcessor {
    /// Creates a tracker for `total_chunks` chunks without a callback.
    pub fn new(total_chunks: usize) -> Self {
        Self {
            total_chunks,
            processed_chunks: 0,
            on_progress: None,
        }
    }

    /// Sets the progress callback.
    pub fn with_callback(mut self, callback: impl FnMut(f64, usize) + Send + 'static) -> Self {
        self.on_progress = Some(Box::new(callback));
        self
    }

    /// Sets an already boxed progress callback.
    pub fn with_boxed_callback(mut self, callback: Option<ProgressCallback>) -> Self {
        self.on_progress = callback;
        self
    }

    /// Records that the chunk at `chunk_index` finished and notifies the callback.
    pub fn report_progress(&mut self, chunk_index: usize) {
        self.processed_chunks += 1;
        let progress = self.progress();
        if let Some(callback) = self.on_progress.as_mut() {
            callback(progress, chunk_index);
        }
    }

    /// Returns the completion percentage.
    ///
    /// A tracker with no chunks is complete.
    pub fn progress(&self) -> f64 {
        if self.total_chunks == 0 {
            return 100.0;
        }
        self.processed_chunks as f64 / self.total_chunks as f64 * 100.0
    }

    /// Returns the number of chunks reported so far.
    pub fn processed_chunks(&self) -> usize {
        self.processed_chunks
    }

    /// Returns the total number of chunks.
    pub fn total_chunks(&self) -> usize {
        self.total_chunks
    }

    /// Returns true once every chunk has been reported.
    pub fn is_complete(&self) -> bool {
        self.processed_chunks >= self.total_chunks
    }
}

#[cfg(test)]
mod tests {
    use std::sync::{Arc, Mutex};

    use super::*;

    #[test]
    fn test_reports_percentages() {
        let seen = Arc::new(Mutex::new(Vec::new()));
        let sink = Arc::clone(&seen);
        let mut processor = ChunkProcessor::new(4)
            .with_callback(move |progress, index| sink.lock().unwrap().push((progress, index)));

        assert_eq!(processor.progress(), 0.0);
        processor.report_progress(2);
        processor.report_progress(0);

        assert_eq!(processor.progress(), 50.0);
        assert_eq!(processor.processed_chunks(), 2);
        assert!(!processor.is_complete());
        assert_eq!(*seen.lock().unwrap(), vec![(25.0, 2), (50.0, 0)]);
    }

    #[test]
    fn test_without_callback() {
        let mut processor = ChunkProcessor::new(1);
        processor.report_progress(0);
        assert_eq!(processor.progress(), 100.0);
        assert!(processor.is_complete());
    }

    #[test]
    fn test_zero_chunks_is_complete() {
        let processor = ChunkProcessor::new(0);
        assert_eq!(processor.progress(), 100.0);
        assert!(processor.is_complete());
    }
}
