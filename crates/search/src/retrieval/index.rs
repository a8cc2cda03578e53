//! In-memory embedding index
//!
//! Holds the chunk list and a parallel matrix of unit vectors. State is replaced
//! wholesale by `build` or `load`, and only after every consistency check passed.

use super::matrix::EmbeddingMatrix;
use resumeforge_common::embeddings::{normalize, Embedder};
use resumeforge_common::errors::{AppError, Result};
use resumeforge_common::metrics;
use resumeforge_common::types::{Chunk, RetrievalHit};
use sha2::{Digest, Sha256};
use std::sync::Arc;
use std::time::Instant;
use tracing::{debug, info};

/// Chunks plus their embeddings; `matrix.rows() == chunks.len()` always holds
#[derive(Debug, Clone)]
pub(crate) struct IndexState {
    pub(crate) chunks: Vec<Chunk>,
    pub(crate) matrix: EmbeddingMatrix,
}

impl IndexState {
    pub(crate) fn new(chunks: Vec<Chunk>, matrix: EmbeddingMatrix) -> Result<Self> {
        if chunks.len() != matrix.rows() {
            return Err(AppError::CorruptIndex {
                message: format!(
                    "Chunk count does not match embedding count ({} chunks, {} rows)",
                    chunks.len(),
                    matrix.rows()
                ),
            });
        }
        Ok(Self { chunks, matrix })
    }
}

/// Queryable vector index over chunks
pub struct EmbeddingIndex {
    embedder: Arc<dyn Embedder>,
    pub(crate) state: Option<IndexState>,
}

impl EmbeddingIndex {
    /// Create an empty index bound to one embedding model
    pub fn new(embedder: Arc<dyn Embedder>) -> Self {
        Self {
            embedder,
            state: None,
        }
    }

    /// Identifier of the embedding model queries and builds use
    pub fn embedding_model(&self) -> &str {
        self.embedder.model_name()
    }

    pub(crate) fn embedder(&self) -> &dyn Embedder {
        self.embedder.as_ref()
    }

    /// Number of indexed chunks
    pub fn len(&self) -> usize {
        self.state.as_ref().map(|s| s.chunks.len()).unwrap_or(0)
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Vector width, once built or loaded
    pub fn dimension(&self) -> Option<usize> {
        self.state.as_ref().map(|s| s.matrix.dim())
    }

    /// Indexed chunks in row order
    pub fn chunks(&self) -> &[Chunk] {
        self.state.as_ref().map(|s| s.chunks.as_slice()).unwrap_or(&[])
    }

    /// Stored unit vector for the chunk at `index`
    pub fn vector(&self, index: usize) -> Option<&[f32]> {
        self.state.as_ref().and_then(|s| s.matrix.row(index))
    }

    /// Fingerprint of the indexed corpus, see [`corpus_fingerprint`]
    pub fn fingerprint(&self) -> Option<String> {
        self.state.as_ref().map(|s| corpus_fingerprint(&s.chunks))
    }

    /// Embed every chunk and replace the index contents
    pub async fn build(&mut self, chunks: Vec<Chunk>) -> Result<()> {
        if chunks.is_empty() {
            return Err(AppError::EmptyIndexInput);
        }

        let texts: Vec<String> = chunks.iter().map(|c| c.text.clone()).collect();
        let start = Instant::now();
        let vectors = self.embedder.embed_batch(&texts).await?;
        metrics::record_embedding(start.elapsed().as_secs_f64(), self.embedding_model(), texts.len());

        if vectors.len() != chunks.len() {
            return Err(AppError::EmbeddingError {
                message: format!(
                    "Embedder returned {} vectors for {} chunks",
                    vectors.len(),
                    chunks.len()
                ),
            });
        }

        let mut matrix = EmbeddingMatrix::from_rows(vectors)?;
        matrix.normalize_rows();

        let state = IndexState::new(chunks, matrix)?;
        info!(
            chunks = state.chunks.len(),
            dimension = state.matrix.dim(),
            model = self.embedding_model(),
            "Index built"
        );
        metrics::record_index_size(state.chunks.len());
        self.state = Some(state);
        Ok(())
    }

    /// Return the `top_k` chunks most similar to `query`, best first.
    ///
    /// `top_k` larger than the index is clamped. Equal scores keep row order.
    pub async fn search(&self, query: &str, top_k: usize) -> Result<Vec<RetrievalHit>> {
        let state = self
            .state
            .as_ref()
            .filter(|s| !s.chunks.is_empty())
            .ok_or_else(|| AppError::IndexNotReady {
                message: "Index is empty. Build or load before searching.".to_string(),
            })?;
        if top_k == 0 {
            return Err(AppError::InvalidTopK);
        }

        let start = Instant::now();
        let mut query_vector = self.embedder.embed(query).await?;
        if query_vector.len() != state.matrix.dim() {
            return Err(AppError::DimensionMismatch {
                expected: state.matrix.dim(),
                actual: query_vector.len(),
            });
        }
        normalize(&mut query_vector);

        let scores = state.matrix.scores(&query_vector);
        let mut order: Vec<usize> = (0..scores.len()).collect();
        order.sort_by(|&a, &b| scores[b].total_cmp(&scores[a]));
        order.truncate(top_k.min(state.chunks.len()));

        let hits: Vec<RetrievalHit> = order
            .into_iter()
            .map(|i| RetrievalHit {
                chunk: state.chunks[i].clone(),
                score: scores[i],
            })
            .collect();

        metrics::record_search(start.elapsed().as_secs_f64());
        debug!(
            top_k = top_k,
            hits = hits.len(),
            best_score = hits.first().map(|h| h.score),
            "Search complete"
        );

        Ok(hits)
    }
}

/// SHA-256 over ordered chunk ids and texts, hex encoded.
///
/// Identical chunk lists always give identical fingerprints, so a persisted index
/// can be checked against freshly chunked documents before reuse.
pub fn corpus_fingerprint(chunks: &[Chunk]) -> String {
    let mut hasher = Sha256::new();
    for chunk in chunks {
        hasher.update(chunk.chunk_id.as_bytes());
        hasher.update([0u8]);
        hasher.update(chunk.text.as_bytes());
        hasher.update([0u8]);
    }
    hex::encode(hasher.finalize())
}
