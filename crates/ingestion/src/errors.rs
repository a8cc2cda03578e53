//! Ingestion error types

use resumeforge_common::errors::AppError;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum IngestionError {
    #[error("PDF parse error for {path}: {message}")]
    PdfParseError { path: String, message: String },

    #[error("DOCX parse error for {path}: {message}")]
    DocxParseError { path: String, message: String },

    #[error("Invalid chunking parameters: {0}")]
    InvalidChunking(String),

    #[error("Input path not found: {0}")]
    FileNotFound(String),

    #[error("Unsupported file type: {0}")]
    UnsupportedFileType(String),

    #[error("No supported documents (.md, .txt, .pdf, .docx) found in the given inputs")]
    NoDocuments,

    #[error("Document is empty: {0}")]
    EmptyDocument(String),

    #[error("Failed to read {path}: {source}")]
    Io {
        path: String,
        #[source]
        source: std::io::Error,
    },
}

impl From<IngestionError> for AppError {
    fn from(e: IngestionError) -> Self {
        match e {
            IngestionError::InvalidChunking(message) => AppError::Configuration { message },
            IngestionError::UnsupportedFileType(path) => AppError::UnsupportedDocument { path },
            IngestionError::PdfParseError { path, message }
            | IngestionError::DocxParseError { path, message } => AppError::DocumentLoad { path, message },
            IngestionError::Io { path, source } => AppError::DocumentLoad {
                path,
                message: source.to_string(),
            },
            IngestionError::FileNotFound(path) => AppError::DocumentLoad {
                path,
                message: "file not found".to_string(),
            },
            IngestionError::EmptyDocument(path) => AppError::InvalidInput {
                message: format!("Document is empty: {}", path),
            },
            IngestionError::NoDocuments => AppError::InvalidInput {
                message: IngestionError::NoDocuments.to_string(),
            },
        }
    }
}
