//! Overlapping word-window chunker.
//!
//! Splits extracted text into [`Chunk`]s of at most `chunk_size`
//! whitespace-delimited words. Consecutive windows share `chunk_overlap`
//! words, so chunk *k* starts at word `k * (chunk_size - chunk_overlap)`.
//!
//! # Algorithm
//!
//! 1. Split text on Unicode whitespace; no words means no chunks.
//! 2. Emit `words[start..start + chunk_size]` rejoined with single spaces.
//! 3. Stop after the first window that reaches the last word; otherwise
//!    advance `start` by the stride and repeat.
//!
//! For `W > 0` words this yields `max(1, ceil((W - O) / (C - O)))` chunks
//! and every word lands in at least one of them.
//!
//! # Example
//!
//! ```rust
//! use rag_store::chunk::WordChunker;
//! use rag_store::models::Metadata;
//!
//! let chunker = WordChunker::new(4, 1).unwrap();
//! let chunks = chunker.chunk("a b c d e f g", &Metadata::new());
//! assert_eq!(chunks.len(), 2);
//! assert_eq!(chunks[1].text, "d e f g");
//! ```

use crate::error::{Error, Result};
use crate::models::{Chunk, Metadata};

pub const DEFAULT_CHUNK_SIZE: usize = 1000;
pub const DEFAULT_CHUNK_OVERLAP: usize = 200;

/// Word-window chunker with validated size and overlap.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct WordChunker {
    chunk_size: usize,
    chunk_overlap: usize,
}

impl Default for WordChunker {
    fn default() -> Self {
        Self {
            chunk_size: DEFAULT_CHUNK_SIZE,
            chunk_overlap: DEFAULT_CHUNK_OVERLAP,
        }
    }
}

impl WordChunker {
    /// Fails with [`Error::InvalidChunking`] unless `chunk_overlap < chunk_size`.
    pub fn new(chunk_size: usize, chunk_overlap: usize) -> Result<Self> {
        if chunk_overlap >= chunk_size {
            return Err(Error::InvalidChunking {
                size: chunk_size,
                overlap: chunk_overlap,
            });
        }
        Ok(Self {
            chunk_size,
            chunk_overlap,
        })
    }

    pub fn chunk_size(&self) -> usize {
        self.chunk_size
    }

    pub fn chunk_overlap(&self) -> usize {
        self.chunk_overlap
    }

    /// Words the window advances per chunk.
    pub fn stride(&self) -> usize {
        self.chunk_size - self.chunk_overlap
    }

    /// Split `text` into overlapping word windows, attaching a copy of
    /// `metadata` to each.
    pub fn chunk(&self, text: &str, metadata: &Metadata) -> Vec<Chunk> {
        let words: Vec<&str> = text.split_whitespace().collect();
        if words.is_empty() {
            return Vec::new();
        }

        let mut chunks = Vec::with_capacity(self.chunk_count(words.len()));
        let mut start = 0;
        loop {
            let end = (start + self.chunk_size).min(words.len());
            chunks.push(make_chunk(chunks.len(), &words[start..end], metadata));
            if end == words.len() {
                break;
            }
            start += self.stride();
        }
        chunks
    }

    /// Number of chunks [`chunk`](Self::chunk) produces for `word_count` words.
    pub fn chunk_count(&self, word_count: usize) -> usize {
        if word_count == 0 {
            return 0;
        }
        word_count
            .saturating_sub(self.chunk_overlap)
            .div_ceil(self.stride())
            .max(1)
    }
}

fn make_chunk(index: usize, words: &[&str], metadata: &Metadata) -> Chunk {
    let text = words.join(" ");
    Chunk {
        chunk_index: index,
        word_count: words.len(),
        char_count: text.chars().count(),
        text,
        metadata: metadata.clone(),
    }
}
