//! Index persistence
//!
//! An index is stored as two companion files sharing a base path:
//! - `<base>.bin`: the embedding matrix (see `matrix` for the layout)
//! - `<base>.json`: embedding model, corpus fingerprint and the ordered chunks

use super::index::{corpus_fingerprint, EmbeddingIndex, IndexState};
use super::matrix::EmbeddingMatrix;
use resumeforge_common::errors::{AppError, Result};
use resumeforge_common::metrics;
use resumeforge_common::types::Chunk;
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};
use tracing::info;

/// Metadata companion of a persisted index
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct IndexMetadata {
    /// Model the vectors were produced with. Older files may omit it.
    #[serde(default)]
    pub embedding_model: Option<String>,

    #[serde(default)]
    pub fingerprint: Option<String>,

    pub chunks: Vec<Chunk>,
}

/// Paths of the matrix and metadata files for a base path
pub fn index_paths(base: &Path) -> (PathBuf, PathBuf) {
    (base.with_extension("bin"), base.with_extension("json"))
}

/// Read only the metadata file of a persisted index
pub fn read_metadata(base: &Path) -> Result<IndexMetadata> {
    let (_, metadata_path) = index_paths(base);
    let bytes = fs::read(&metadata_path)?;
    serde_json::from_slice(&bytes).map_err(|e| AppError::CorruptIndex {
        message: format!("unreadable metadata {}: {}", metadata_path.display(), e),
    })
}

impl EmbeddingIndex {
    /// Write the index to `<base>.bin` and `<base>.json`, creating parent directories
    pub fn save(&self, base: &Path) -> Result<()> {
        let state = self.state.as_ref().ok_or_else(|| AppError::IndexNotReady {
            message: "No index to save. Build or load first.".to_string(),
        })?;

        let (vectors_path, metadata_path) = index_paths(base);
        if let Some(parent) = vectors_path.parent().filter(|p| !p.as_os_str().is_empty()) {
            fs::create_dir_all(parent)?;
        }

        let metadata = IndexMetadata {
            embedding_model: Some(self.embedding_model().to_string()),
            fingerprint: Some(corpus_fingerprint(&state.chunks)),
            chunks: state.chunks.clone(),
        };

        fs::write(&vectors_path, state.matrix.encode())?;
        fs::write(&metadata_path, serde_json::to_vec_pretty(&metadata)?)?;

        info!(
            path = %base.display(),
            chunks = state.chunks.len(),
            model = self.embedding_model(),
            "Index saved"
        );
        Ok(())
    }

    /// Restore an index saved with [`EmbeddingIndex::save`].
    ///
    /// Fails without touching the current state when files are missing, the
    /// recorded model differs from this index's model, counts disagree or the
    /// recorded fingerprint no longer matches the stored chunks.
    pub fn load(&mut self, base: &Path) -> Result<()> {
        let (vectors_path, metadata_path) = index_paths(base);
        if !vectors_path.exists() || !metadata_path.exists() {
            return Err(AppError::IndexFilesMissing {
                vectors_path: vectors_path.display().to_string(),
                metadata_path: metadata_path.display().to_string(),
            });
        }

        let matrix = EmbeddingMatrix::decode(&fs::read(&vectors_path)?)?;
        let metadata = read_metadata(base)?;

        let runtime_model = self.embedding_model();
        if let Some(index_model) = metadata.embedding_model.as_deref().filter(|m| !m.is_empty()) {
            if index_model != runtime_model {
                return Err(AppError::EmbeddingModelMismatch {
                    index_model: index_model.to_string(),
                    runtime_model: runtime_model.to_string(),
                });
            }
        }

        if metadata.chunks.len() != matrix.rows() {
            return Err(AppError::CorruptIndex {
                message: "Chunk count does not match embedding count in loaded index.".to_string(),
            });
        }
        if matrix.rows() == 0 {
            return Err(AppError::CorruptIndex {
                message: "Loaded index contains no chunks.".to_string(),
            });
        }

        if let Some(stored) = metadata.fingerprint.as_deref() {
            if stored != corpus_fingerprint(&metadata.chunks) {
                return Err(AppError::CorruptIndex {
                    message: "Stored fingerprint does not match the indexed chunks.".to_string(),
                });
            }
        }

        let expected_dim = self.embedder().dimension();
        if expected_dim != 0 && expected_dim != matrix.dim() {
            return Err(AppError::DimensionMismatch {
                expected: expected_dim,
                actual: matrix.dim(),
            });
        }

        let state = IndexState::new(metadata.chunks, matrix)?;
        info!(
            path = %base.display(),
            chunks = state.chunks.len(),
            dimension = state.matrix.dim(),
            "Index loaded"
        );
        metrics::record_index_size(state.chunks.len());
        self.state = Some(state);
        Ok(())
    }
}
