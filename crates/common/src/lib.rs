//! ResumeForge Common Library
//!
//! Shared code for all ResumeForge crates including:
//! - Core domain types (documents, chunks, judgments)
//! - Embedding client abstraction
//! - Text generation providers and dispatch
//! - Error types and handling
//! - Configuration management
//! - Metrics and observability

pub mod config;
pub mod embeddings;
pub mod errors;
pub mod llm;
pub mod metrics;
pub mod types;

// Re-export commonly used types
pub use config::{AgentConfig, Settings};
pub use embeddings::Embedder;
pub use errors::{AppError, Result};
pub use llm::{GenerationConfig, ProviderRegistry, TextGenerator};
pub use types::{Chunk, Document, RetrievalHit, ReviewFeedback, SupervisorDecision, Verdict};

/// Application version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
