//! Embedding-based retrieval
//!
//! Provides:
//! - A dense unit-vector matrix with a compact binary encoding
//! - `EmbeddingIndex`: build, cosine top-k search, save and load
//! - Formatting of retrieval hits into a prompt context block

mod index;
mod matrix;
mod store;

pub use index::{corpus_fingerprint, EmbeddingIndex};
pub use matrix::EmbeddingMatrix;
pub use store::{index_paths, read_metadata, IndexMetadata};

use resumeforge_common::types::RetrievalHit;

/// Render hits as numbered, source-labelled blocks in hit order
pub fn format_retrieval_context(hits: &[RetrievalHit]) -> String {
    hits.iter()
        .enumerate()
        .map(|(i, hit)| format!("[{}] Source: {}\n{}\n", i + 1, hit.chunk.source, hit.chunk.text))
        .collect::<Vec<_>>()
        .join("\n")
        .trim()
        .to_string()
}
