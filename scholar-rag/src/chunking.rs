//! Document chunking.
//!
//! This module provides the [`Chunker`] trait and [`ParagraphChunker`], which
//! splits a submitted document on blank lines and drops fragments too short
//! to give a reliable similarity score (titles, lone headings, sign-offs).

use std::sync::LazyLock;

use regex::Regex;

use crate::source::Chunk;

/// Default minimum chunk length in characters.
pub const DEFAULT_MIN_CHUNK_CHARS: usize = 50;

/// Two or more line breaks, optionally separated by horizontal whitespace.
static PARAGRAPH_BREAK: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?:\r?\n[ \t]*){2,}").expect("paragraph break regex is valid"));

/// A strategy for splitting a document into evaluable chunks.
///
/// The result is fully materialized and in document order. Identical input
/// must always produce an identical sequence.
pub trait Chunker: Send + Sync {
    /// Split `text` into chunks.
    ///
    /// Returns an empty `Vec` if nothing in the document is long enough.
    fn chunk(&self, text: &str) -> Vec<Chunk>;
}

/// Splits text into paragraphs on blank lines.
///
/// Each paragraph is trimmed; paragraphs with fewer than `min_chars`
/// characters are discarded. Chunks are disjoint and keep their byte offset
/// into the original text.
///
/// # Example
///
/// ```rust,ignore
/// use scholar_rag::{Chunker, ParagraphChunker};
///
/// let chunks = ParagraphChunker::new(50).chunk(&essay);
/// ```
#[derive(Debug, Clone, Copy)]
pub struct ParagraphChunker {
    min_chars: usize,
}

impl ParagraphChunker {
    /// Create a chunker that keeps paragraphs of at least `min_chars` characters.
    pub fn new(min_chars: usize) -> Self {
        Self { min_chars }
    }

    pub fn min_chars(&self) -> usize {
        self.min_chars
    }
}

impl Default for ParagraphChunker {
    fn default() -> Self {
        Self::new(DEFAULT_MIN_CHUNK_CHARS)
    }
}

/// Byte ranges of the paragraphs in `text`, separators excluded.
fn paragraph_spans(text: &str) -> Vec<(usize, usize)> {
    let mut spans = Vec::new();
    let mut start = 0;
    for separator in PARAGRAPH_BREAK.find_iter(text) {
        spans.push((start, separator.start()));
        start = separator.end();
    }
    spans.push((start, text.len()));
    spans
}

impl Chunker for ParagraphChunker {
    fn chunk(&self, text: &str) -> Vec<Chunk> {
        let mut chunks = Vec::new();

        for (start, end) in paragraph_spans(text) {
            let raw = &text[start..end];
            let trimmed = raw.trim();
            if trimmed.is_empty() || trimmed.chars().count() < self.min_chars {
                continue;
            }
            let leading = raw.len() - raw.trim_start().len();
            chunks.push(Chunk {
                index: chunks.len(),
                offset: start + leading,
                text: trimmed.to_string(),
            });
        }

        chunks
    }
}
