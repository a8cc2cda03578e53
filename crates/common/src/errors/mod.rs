//! Error types for ResumeForge
//!
//! Provides a single error enum for every crate in the workspace with:
//! - Distinct variants for configuration, retrieval and generation failures
//! - Machine-readable error codes for logs and the CLI exit report

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Result type alias using AppError
pub type Result<T> = std::result::Result<T, AppError>;

/// Error codes for machine-readable error identification
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum ErrorCode {
    // Configuration errors (1xxx)
    ConfigurationError,
    InvalidInput,

    // Document errors (2xxx)
    DocumentLoadError,
    UnsupportedDocument,

    // Retrieval errors (3xxx)
    IndexNotReady,
    EmptyIndexInput,
    EmbeddingModelMismatch,
    IndexFilesMissing,
    CorruptIndex,
    InvalidTopK,
    DimensionMismatch,

    // External service errors (4xxx)
    EmbeddingError,
    GenerationError,
    EmptyGeneration,
    UnsupportedProvider,
    UpstreamError,

    // Internal errors (9xxx)
    InternalError,
    SerializationError,
    IoError,
}

impl ErrorCode {
    /// Get the numeric code for this error
    pub fn as_code(&self) -> u16 {
        match self {
            // Configuration (1xxx)
            ErrorCode::ConfigurationError => 1001,
            ErrorCode::InvalidInput => 1002,

            // Documents (2xxx)
            ErrorCode::DocumentLoadError => 2001,
            ErrorCode::UnsupportedDocument => 2002,

            // Retrieval (3xxx)
            ErrorCode::IndexNotReady => 3001,
            ErrorCode::EmptyIndexInput => 3002,
            ErrorCode::EmbeddingModelMismatch => 3003,
            ErrorCode::IndexFilesMissing => 3004,
            ErrorCode::CorruptIndex => 3005,
            ErrorCode::InvalidTopK => 3006,
            ErrorCode::DimensionMismatch => 3007,

            // External (4xxx)
            ErrorCode::EmbeddingError => 4001,
            ErrorCode::GenerationError => 4002,
            ErrorCode::EmptyGeneration => 4003,
            ErrorCode::UnsupportedProvider => 4004,
            ErrorCode::UpstreamError => 4005,

            // Internal (9xxx)
            ErrorCode::InternalError => 9001,
            ErrorCode::SerializationError => 9002,
            ErrorCode::IoError => 9003,
        }
    }
}

/// Application error types
#[derive(Error, Debug)]
pub enum AppError {
    // Configuration errors
    #[error("Configuration error: {message}")]
    Configuration { message: String },

    #[error("Invalid input: {message}")]
    InvalidInput { message: String },

    // Document errors
    #[error("Failed to load document {path}: {message}")]
    DocumentLoad { path: String, message: String },

    #[error("Unsupported document type: {path}")]
    UnsupportedDocument { path: String },

    // Retrieval errors
    #[error("{message}")]
    IndexNotReady { message: String },

    #[error("Cannot build index from empty chunks.")]
    EmptyIndexInput,

    #[error("Embedding model mismatch. Index model is `{index_model}` but runtime model is `{runtime_model}`.")]
    EmbeddingModelMismatch {
        index_model: String,
        runtime_model: String,
    },

    #[error("Index files not found: {vectors_path} / {metadata_path}")]
    IndexFilesMissing {
        vectors_path: String,
        metadata_path: String,
    },

    #[error("Corrupt index: {message}")]
    CorruptIndex { message: String },

    #[error("`top_k` must be greater than 0.")]
    InvalidTopK,

    #[error("Embedding dimension mismatch: expected {expected}, got {actual}")]
    DimensionMismatch { expected: usize, actual: usize },

    // External service errors
    #[error("Embedding service error: {message}")]
    EmbeddingError { message: String },

    #[error("Generation failed for {provider}/{model}: {message}")]
    Generation {
        provider: String,
        model: String,
        message: String,
    },

    #[error("Model `{model}` returned an empty response.")]
    EmptyGeneration { model: String },

    #[error("Unsupported provider: {provider}")]
    UnsupportedProvider { provider: String },

    #[error("HTTP client error: {0}")]
    HttpClient(#[from] reqwest::Error),

    // Internal errors
    #[error("Internal error: {message}")]
    Internal { message: String },

    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

impl AppError {
    /// Get the error code for this error
    pub fn code(&self) -> ErrorCode {
        match self {
            AppError::Configuration { .. } => ErrorCode::ConfigurationError,
            AppError::InvalidInput { .. } => ErrorCode::InvalidInput,
            AppError::DocumentLoad { .. } => ErrorCode::DocumentLoadError,
            AppError::UnsupportedDocument { .. } => ErrorCode::UnsupportedDocument,
            AppError::IndexNotReady { .. } => ErrorCode::IndexNotReady,
            AppError::EmptyIndexInput => ErrorCode::EmptyIndexInput,
            AppError::EmbeddingModelMismatch { .. } => ErrorCode::EmbeddingModelMismatch,
            AppError::IndexFilesMissing { .. } => ErrorCode::IndexFilesMissing,
            AppError::CorruptIndex { .. } => ErrorCode::CorruptIndex,
            AppError::InvalidTopK => ErrorCode::InvalidTopK,
            AppError::DimensionMismatch { .. } => ErrorCode::DimensionMismatch,
            AppError::EmbeddingError { .. } => ErrorCode::EmbeddingError,
            AppError::Generation { .. } => ErrorCode::GenerationError,
            AppError::EmptyGeneration { .. } => ErrorCode::EmptyGeneration,
            AppError::UnsupportedProvider { .. } => ErrorCode::UnsupportedProvider,
            AppError::HttpClient(_) => ErrorCode::UpstreamError,
            AppError::Internal { .. } => ErrorCode::InternalError,
            AppError::Serialization(_) => ErrorCode::SerializationError,
            AppError::Io(_) => ErrorCode::IoError,
        }
    }

    /// Check if this error comes from the retrieval engine
    pub fn is_retrieval_error(&self) -> bool {
        (3000..4000).contains(&self.code().as_code())
    }

    /// Check if this error comes from an external model provider
    pub fn is_upstream_error(&self) -> bool {
        (4000..5000).contains(&self.code().as_code())
    }
}

impl From<config::ConfigError> for AppError {
    fn from(err: config::ConfigError) -> Self {
        AppError::Configuration {
            message: err.to_string(),
        }
    }
}
