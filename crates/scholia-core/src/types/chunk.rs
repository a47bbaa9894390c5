//! Document chunk type.

use serde::{Deserialize, Serialize};

use crate::detect::ContentFeatures;

/// A contiguous, possibly overlapping slice of a document.
///
/// `start_index` and `end_index` are character offsets of the chunk's primary
/// span in the original text. `content` additionally starts with `overlap`
/// characters of trailing context taken from the previous chunk.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DocumentChunk {
    /// Identifier unique within one chunking pass (`chunk-0`, `chunk-1`, ...).
    pub id: String,
    /// Chunk text, including the leading overlap.
    pub content: String,
    /// Start character offset of the primary span.
    pub start_index: usize,
    /// End character offset (exclusive) of the primary span.
    pub end_index: usize,
    /// Number of characters at the start of `content` repeated from the previous chunk.
    #[serde(default)]
    pub overlap: usize,
    /// Whitespace-delimited token count of `content`.
    pub word_count: usize,
    /// Content feature flags.
    #[serde(flatten)]
    pub features: ContentFeatures,
}

impl DocumentChunk {
    /// Creates a chunk, deriving its id and word count.
    pub fn new(
        index: usize,
        content: String,
        start_index: usize,
        end_index: usize,
        overlap: usize,
        features: ContentFeatures,
    ) -> Self {
        let word_count = count_words(&content);
        Self {
            id: chunk_id(index),
            content,
            start_index,
            end_index,
            overlap,
            word_count,
            features,
        }
    }

    /// Returns the content without the leading overlap.
    pub fn primary_text(&self) -> &str {
        match self.content.char_indices().nth(self.overlap) {
            Some((offset, _)) => &self.content[offset..],
            None if self.overlap == 0 => &self.content,
            None => "",
        }
    }

    /// Returns the character length of the primary span.
    pub fn primary_len(&self) -> usize {
        self.end_index - self.start_index
    }

    /// Returns the character length of the full content.
    pub fn char_len(&self) -> usize {
        self.content.chars().count()
    }
}

/// Returns the identifier of the chunk at `index`.
pub fn chunk_id(index: usize) -> String {
    format!("chunk-{index}")
}

/// Counts the pieces produced by splitting `text` on whitespace runs.
///
/// Leading and trailing whitespace yield empty pieces that are counted too,
/// so `""` counts as 1 and `" a "` as 3.
pub fn count_words(text: &str) -> usize {
    let mut count = 1;
    let mut in_whitespace = false;

    for c in text.chars() {
        if c.is_whitespace() {
            if !in_whitespace {
                count += 1;
                in_whitespace = true;
            }
        } else {
            in_whitespace = false;
        }
    }

    count
}
