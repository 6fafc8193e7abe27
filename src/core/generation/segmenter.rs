//! Sentence-aware text segmentation.
//!
//! The provider caps the input size of a single synthesis call, so long texts
//! are split into windows of at most `limit` characters. Within each window the
//! cut point moves back to just after the last period when one exists far
//! enough into the window; otherwise the window is cut at the raw limit.

use serde::Serialize;

/// Character that terminates a sentence for boundary selection.
const SENTENCE_TERMINATOR: char = '.';

/// One ordered piece of the input text.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Chunk {
    /// Zero-based position of the chunk in the original text
    pub index: usize,
    /// Trimmed, non-empty chunk text
    pub content: String,
}

/// Splits text into chunks of at most `limit` characters.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct TextSegmenter {
    limit: usize,
    min_cut_ratio: f32,
}

impl TextSegmenter {
    /// Create a segmenter that accepts any sentence boundary after the window start.
    ///
    /// A zero limit is treated as 1 so segmentation always makes progress.
    pub fn new(limit: usize) -> Self {
        Self {
            limit: limit.max(1),
            min_cut_ratio: 0.0,
        }
    }

    /// Only accept sentence boundaries at least `ratio * limit` characters into
    /// the window, so a period right after the window start does not produce a
    /// tiny chunk.
    pub fn with_min_cut_ratio(mut self, ratio: f32) -> Self {
        self.min_cut_ratio = ratio.clamp(0.0, 1.0);
        self
    }

    pub fn limit(&self) -> usize {
        self.limit
    }

    /// Split `text` into ordered, trimmed, non-empty chunks.
    pub fn segment(&self, text: &str) -> Vec<Chunk> {
        let chars: Vec<char> = text.chars().collect();
        let min_offset = (self.limit as f32 * self.min_cut_ratio).floor() as usize;

        let mut chunks = Vec::new();
        let mut pos = 0;

        while pos < chars.len() {
            let mut end = (pos + self.limit).min(chars.len());

            if end < chars.len()
                && let Some(dot) = chars[pos..end]
                    .iter()
                    .rposition(|c| *c == SENTENCE_TERMINATOR)
            {
                // `dot` is relative to `pos`; it must lie strictly after the start
                if dot > 0 && dot >= min_offset {
                    end = pos + dot + 1;
                }
            }

            let content: String = chars[pos..end].iter().collect();
            let content = content.trim();
            if !content.is_empty() {
                chunks.push(Chunk {
                    index: chunks.len(),
                    content: content.to_string(),
                });
            }

            pos = end;
        }

        chunks
    }
}

/// Convenience wrapper around [`TextSegmenter::segment`].
pub fn segment(text: &str, limit: usize) -> Vec<Chunk> {
    TextSegmenter::new(limit).segment(text)
}
