//! Line-based chunking with overlap
//!
//! Oversized section text is split on line boundaries into chunks of at most
//! `max_chunk_size` characters. Each chunk after the first starts with trailing
//! lines of its predecessor, at most `chunk_overlap` characters of them, so the
//! enhancement step sees context across the cut.
//!
//! A single line longer than `max_chunk_size` becomes a chunk on its own and is
//! never truncated.

use crate::config::ChunkingConfig;
use crate::domain::{DelilahError, Result};
use serde::Serialize;

/// One bounded slice of a section
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Chunk {
    /// Position in the chunk sequence
    pub index: usize,
    /// Chunk text, lines joined with `\n`
    pub text: String,
    /// Leading characters repeated from the previous chunk
    pub overlap_chars: usize,
}

impl Chunk {
    /// Length in characters
    pub fn char_len(&self) -> usize {
        self.text.chars().count()
    }
}

/// Splits text into overlapping, size-bounded chunks
#[derive(Debug, Clone, Copy)]
pub struct Chunker {
    max_chunk_size: usize,
    chunk_overlap: usize,
}

impl Chunker {
    /// Create a chunker
    ///
    /// # Errors
    ///
    /// Returns [`DelilahError::Validation`] unless `0 <= chunk_overlap < max_chunk_size`.
    pub fn new(max_chunk_size: usize, chunk_overlap: usize) -> Result<Self> {
        if max_chunk_size == 0 {
            return Err(DelilahError::Validation(
                "max_chunk_size must be greater than zero".to_string(),
            ));
        }
        if chunk_overlap >= max_chunk_size {
            return Err(DelilahError::Validation(format!(
                "chunk_overlap ({chunk_overlap}) must be smaller than max_chunk_size ({max_chunk_size})"
            )));
        }
        Ok(Self {
            max_chunk_size,
            chunk_overlap,
        })
    }

    /// Create a chunker from configuration
    pub fn from_config(config: &ChunkingConfig) -> Result<Self> {
        Self::new(config.max_chunk_size, config.chunk_overlap)
    }

    /// Largest chunk length in characters
    pub fn max_chunk_size(&self) -> usize {
        self.max_chunk_size
    }

    /// Overlap budget in characters
    pub fn chunk_overlap(&self) -> usize {
        self.chunk_overlap
    }

    /// Whether `text` is longer than one chunk
    pub fn needs_split(&self, text: &str) -> bool {
        text.chars().count() > self.max_chunk_size
    }

    /// Split text into chunks
    ///
    /// Text within the limit, including the empty string, comes back as a single
    /// chunk.
    pub fn split(&self, text: &str) -> Vec<Chunk> {
        if !self.needs_split(text) {
            return vec![Chunk {
                index: 0,
                text: text.to_string(),
                overlap_chars: 0,
            }];
        }

        let mut chunks = Vec::new();
        let mut current = LineBuffer::default();
        let mut overlap_chars = 0;

        for line in text.split('\n') {
            let line_len = line.chars().count();

            if !current.is_empty() && current.len_with(line_len) > self.max_chunk_size {
                let seed = self.overlap_seed(&current, line_len);
                chunks.push(Chunk {
                    index: chunks.len(),
                    text: current.join(),
                    overlap_chars,
                });
                overlap_chars = seed.len();
                current = seed;
            }

            current.push(line, line_len);
        }

        if !current.is_empty() {
            chunks.push(Chunk {
                index: chunks.len(),
                text: current.join(),
                overlap_chars,
            });
        }

        chunks
    }

    /// Split text and return only the chunk strings
    pub fn split_text(&self, text: &str) -> Vec<String> {
        self.split(text).into_iter().map(|c| c.text).collect()
    }

    /// Trailing lines of `closed` that fit the overlap budget and leave room for the
    /// incoming line
    fn overlap_seed<'a>(&self, closed: &LineBuffer<'a>, incoming_len: usize) -> LineBuffer<'a> {
        let mut seed = LineBuffer::default();
        for &(line, len) in closed.lines.iter().rev() {
            if seed.len_with(len) > self.chunk_overlap {
                break;
            }
            seed.push_front(line, len);
        }
        while !seed.is_empty() && seed.len_with(incoming_len) > self.max_chunk_size {
            seed.pop_front();
        }
        // Blank-only seeds are dropped
        if seed.len() == 0 {
            return LineBuffer::default();
        }
        seed
    }
}

/// Lines of a chunk under construction with their character lengths
#[derive(Debug, Default)]
struct LineBuffer<'a> {
    lines: std::collections::VecDeque<(&'a str, usize)>,
    chars: usize,
}

impl<'a> LineBuffer<'a> {
    fn is_empty(&self) -> bool {
        self.lines.is_empty()
    }

    /// Joined length in characters
    fn len(&self) -> usize {
        self.chars + self.lines.len().saturating_sub(1)
    }

    /// Joined length after appending a line of `line_len` characters
    fn len_with(&self, line_len: usize) -> usize {
        if self.is_empty() {
            line_len
        } else {
            self.len() + 1 + line_len
        }
    }

    fn push(&mut self, line: &'a str, len: usize) {
        self.lines.push_back((line, len));
        self.chars += len;
    }

    fn push_front(&mut self, line: &'a str, len: usize) {
        self.lines.push_front((line, len));
        self.chars += len;
    }

    fn pop_front(&mut self) {
        if let Some((_, len)) = self.lines.pop_front() {
            self.chars -= len;
        }
    }

    fn join(&self) -> String {
        let mut out = String::with_capacity(self.chars + self.lines.len());
        for (i, (line, _)) in self.lines.iter().enumerate() {
            if i > 0 {
                out.push('\n');
            }
            out.push_str(line);
        }
        out
    }
}

/// Join enhanced chunks into one narrative
///
/// Chunks are separated by a blank line; runs of three or more newlines collapse to
/// two.
pub fn combine_chunks(chunks: &[String]) -> String {
    let joined = chunks.join("\n\n");
    let mut combined = String::with_capacity(joined.len());
    let mut newlines = 0;
    for c in joined.chars() {
        if c == '\n' {
            newlines += 1;
            if newlines > 2 {
                continue;
            }
        } else {
            newlines = 0;
        }
        combined.push(c);
    }
    combined
}
