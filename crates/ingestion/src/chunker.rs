//! Text chunking module
//!
//! Splits document text into overlapping, size-bounded chunks for embedding.
//! Boundaries prefer paragraph breaks, then spaces, then a hard cut.
//! All positions are counted in chars, never bytes.

use crate::errors::IngestionError;
use regex_lite::Regex;
use resumeforge_common::types::{Chunk, Document};
use std::sync::OnceLock;
use tracing::debug;

/// Configuration for text chunking
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ChunkingConfig {
    /// Maximum chunk size in characters
    pub chunk_size: usize,
    /// Overlap between consecutive chunks in characters
    pub chunk_overlap: usize,
}

impl ChunkingConfig {
    pub fn new(chunk_size: usize, chunk_overlap: usize) -> Result<Self, IngestionError> {
        let config = Self {
            chunk_size,
            chunk_overlap,
        };
        config.validate()?;
        Ok(config)
    }

    pub fn validate(&self) -> Result<(), IngestionError> {
        if self.chunk_size == 0 {
            return Err(IngestionError::InvalidChunking(
                "chunk_size must be greater than 0".to_string(),
            ));
        }
        if self.chunk_overlap >= self.chunk_size {
            return Err(IngestionError::InvalidChunking(format!(
                "chunk_overlap ({}) must be smaller than chunk_size ({})",
                self.chunk_overlap, self.chunk_size
            )));
        }
        Ok(())
    }
}

impl Default for ChunkingConfig {
    fn default() -> Self {
        Self {
            chunk_size: 1200,
            chunk_overlap: 200,
        }
    }
}

fn blank_lines() -> &'static Regex {
    static BLANK_LINES: OnceLock<Regex> = OnceLock::new();
    BLANK_LINES.get_or_init(|| Regex::new(r"\n{3,}").expect("static regex is valid"))
}

/// Collapse runs of three or more newlines to a single blank line and trim
pub fn normalize_text(text: &str) -> String {
    blank_lines().replace_all(text, "\n\n").trim().to_string()
}

/// Split text into chunks of at most `chunk_size` chars
pub fn chunk_text(text: &str, config: &ChunkingConfig) -> Result<Vec<String>, IngestionError> {
    config.validate()?;

    let normalized = normalize_text(text);
    let chars: Vec<char> = normalized.chars().collect();
    let total_len = chars.len();

    if total_len == 0 {
        return Ok(Vec::new());
    }
    if total_len <= config.chunk_size {
        return Ok(vec![normalized]);
    }

    let size = config.chunk_size;
    let min_break = size / 3;
    let mut chunks = Vec::new();
    let mut start = 0;

    loop {
        let mut end = (start + size).min(total_len);

        if end < total_len {
            if let Some(pos) = rfind_paragraph_break(&chars, start, end).filter(|&p| p > start + min_break) {
                end = pos;
            } else if let Some(pos) = rfind_space(&chars, start, end).filter(|&p| p > start + min_break) {
                end = pos;
            }
        }

        if end <= start {
            end = (start + size).min(total_len);
        }

        let piece: String = chars[start..end].iter().collect();
        let piece = piece.trim();
        if !piece.is_empty() {
            chunks.push(piece.to_string());
        }

        if end >= total_len {
            break;
        }

        // Start strictly advances even when the overlap would reach back past it
        let next = end.saturating_sub(config.chunk_overlap);
        start = if next <= start { end } else { next };
    }

    debug!(
        input_chars = total_len,
        chunk_count = chunks.len(),
        chunk_size = config.chunk_size,
        chunk_overlap = config.chunk_overlap,
        "Text chunked"
    );

    Ok(chunks)
}

/// Position of the last `"\n\n"` lying wholly inside `[start, end)`
fn rfind_paragraph_break(chars: &[char], start: usize, end: usize) -> Option<usize> {
    if end < start + 2 {
        return None;
    }
    (start..=end - 2)
        .rev()
        .find(|&i| chars[i] == '\n' && chars[i + 1] == '\n')
}

/// Position of the last `' '` inside `[start, end)`
fn rfind_space(chars: &[char], start: usize, end: usize) -> Option<usize> {
    (start..end).rev().find(|&i| chars[i] == ' ')
}

/// Chunk every document, assigning `{source}::chunk::{ordinal}` ids
pub fn build_chunks(documents: &[Document], config: &ChunkingConfig) -> Result<Vec<Chunk>, IngestionError> {
    let mut chunks = Vec::new();

    for document in documents {
        let pieces = chunk_text(&document.text, config)?;
        debug!(source = %document.source, chunks = pieces.len(), "Document chunked");
        chunks.extend(
            pieces
                .into_iter()
                .enumerate()
                .map(|(ordinal, text)| Chunk::new(&document.source, ordinal, text)),
        );
    }

    Ok(chunks)
}
