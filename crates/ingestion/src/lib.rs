//! ResumeForge Ingestion
//!
//! Turns candidate material into indexable chunks:
//! - Document discovery across files and directories
//! - Text extraction for markdown, plain text, PDF and DOCX
//! - Overlapping, boundary-aware chunking

pub mod chunker;
pub mod docx;
pub mod errors;
pub mod loader;
pub mod pdf;

pub use chunker::{build_chunks, chunk_text, ChunkingConfig};
pub use errors::IngestionError;
pub use loader::{load_documents, read_job_description};
