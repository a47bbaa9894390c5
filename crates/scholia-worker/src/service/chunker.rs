//! Context-preserving text chunking.
//!
//! Splits a document into chunks of at most `chunk_size` characters, snapping
//! each cut to the nearest paragraph, line or sentence boundary in the last
//! 30% of the window. Every chunk after the first repeats the trailing
//! `overlap_size` characters of its predecessor so the handler sees context.

use std::sync::Arc;

use scholia_core::types::{DocumentChunk, ProcessingOptions};
use scholia_core::{ContentDetector, PatternDetector, Result};

use crate::TRACING_TARGET_CHUNKER;

/// Break points in order of preference; the rightmost acceptable one wins.
const BREAK_PATTERNS: &[&str] = &["\n\n", "\n", ". ", "! ", "? "];

/// Fraction of the window a chunk must fill before a break point is accepted.
const MIN_FILL_RATIO: f64 = 0.7;

/// Splits text into [`DocumentChunk`]s.
#[derive(Clone)]
pub struct TextChunker {
    options: ProcessingOptions,
    detector: Arc<dyn ContentDetector>,
}

impl std::fmt::Debug for TextChunker {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("TextChunker")
            .field("options", &self.options)
            .finish_non_exhaustive()
    }
}

impl TextChunker {
    /// Creates a chunker using the [`PatternDetector`].
    ///
    /// # Errors
    ///
    /// Returns a configuration error if the options are invalid.
    pub fn new(options: ProcessingOptions) -> Result<Self> {
        options.validate()?;
        Ok(Self {
            options,
            detector: Arc::new(PatternDetector::new()),
        })
    }

    /// Replaces the content detector.
    pub fn with_detector(mut self, detector: impl ContentDetector + 'static) -> Self {
        self.detector = Arc::new(detector);
        self
    }

    /// Returns the options.
    pub fn options(&self) -> &ProcessingOptions {
        &self.options
    }

    /// Returns the content detector.
    pub fn detector(&self) -> &dyn ContentDetector {
        self.detector.as_ref()
    }

    /// Splits `text` into an ordered, non-empty sequence of chunks.
    ///
    /// Concatenating [`DocumentChunk::primary_text`] over the result
    /// reproduces `text` exactly.
    #[tracing::instrument(
        skip(self, text),
        fields(text_len = text.len()),
        target = TRACING_TARGET_CHUNKER
    )]
    pub fn chunk(&self, text: &str) -> Vec<DocumentChunk> {
        let offsets = CharOffsets::new(text);
        let len = offsets.char_len();
        let chunk_size = self.options.chunk_size;

        if len <= chunk_size {
            tracing::debug!(target: TRACING_TARGET_CHUNKER, len, "text fits in a single chunk");
            return vec![self.build_chunk(0, text.to_string(), 0, len, 0)];
        }

        let mut chunks = Vec::with_capacity(len.div_ceil(chunk_size) + 1);
        let mut start = 0;

        while start < len {
            let end = (start + chunk_size).min(len);
            let actual_end = if end < len {
                self.find_break(text, &offsets, start, end).unwrap_or(end)
            } else {
                end
            };

            let index = chunks.len();
            let content_start = if index > 0 {
                start.saturating_sub(self.options.overlap_size)
            } else {
                start
            };

            let content = text[offsets.byte(content_start)..offsets.byte(actual_end)].to_string();
            chunks.push(self.build_chunk(index, content, start, actual_end, start - content_start));

            start = actual_end;
        }

        tracing::debug!(
            target: TRACING_TARGET_CHUNKER,
            chunk_count = chunks.len(),
            chunk_size,
            overlap_size = self.options.overlap_size,
            "split text into chunks"
        );

        chunks
    }

    /// Returns the number of chunks `text` would be split into.
    pub fn count(&self, text: &str) -> usize {
        self.chunk(text).len()
    }

    fn build_chunk(
        &self,
        index: usize,
        content: String,
        start: usize,
        end: usize,
        overlap: usize,
    ) -> DocumentChunk {
        let features = self
            .detector
            .detect_if(&content, self.options.enable_math_detection);
        DocumentChunk::new(index, content, start, end, overlap, features)
    }

    /// Finds the character offset just past the best break point in `(start, end]`.
    fn find_break(
        &self,
        text: &str,
        offsets: &CharOffsets,
        start: usize,
        end: usize,
    ) -> Option<usize> {
        let threshold = start as f64 + self.options.chunk_size as f64 * MIN_FILL_RATIO;
        let search_start = offsets.byte(start);
        let byte_end = offsets.byte(end);

        BREAK_PATTERNS
            .iter()
            .filter_map(|pattern| {
                // A match may start at `end` and run past it.
                let mut window_end = (byte_end + pattern.len()).min(text.len());
                while !text.is_char_boundary(window_end) {
                    window_end -= 1;
                }

                text[search_start..window_end]
                    .rfind(pattern)
                    .map(|pos| offsets.char_index(search_start + pos))
            })
            .filter(|&position| position as f64 > threshold)
            .max()
            .map(|position| position + 1)
    }
}

/// Maps character indices to byte offsets.
struct CharOffsets {
    bytes: Vec<usize>,
}

impl CharOffsets {
    fn new(text: &str) -> Self {
        let mut bytes: Vec<usize> = text.char_indices().map(|(offset, _)| offset).collect();
        bytes.push(text.len());
        Self { bytes }
    }

    fn char_len(&self) -> usize {
        self.bytes.len() - 1
    }

    fn byte(&self, char_index: usize) -> usize {
        self.bytes[char_index]
    }

    fn char_index(&self, byte_offset: usize) -> usize {
        self.bytes.partition_point(|&offset| offset < byte_offset)
    }
}
