//! ResumeForge Search
//!
//! Local vector retrieval over candidate material:
//! - Unit-normalized embedding matrix
//! - Exact cosine top-k search
//! - Two-file on-disk snapshot with model and consistency checks

pub mod retrieval;

pub use retrieval::{format_retrieval_context, EmbeddingIndex, IndexMetadata};
