//! Feature-hashing embedder
//!
//! Maps lowercase word tokens into a fixed number of signed buckets using SHA-256,
//! then normalizes to unit length. Deterministic across platforms and runs, needs
//! no model server, and gives usable lexical similarity for offline runs and tests.

use super::{normalize, Embedder};
use crate::errors::Result;
use async_trait::async_trait;
use sha2::{Digest, Sha256};

/// Deterministic offline embedder
pub struct HashingEmbedder {
    model: String,
    dimension: usize,
}

impl HashingEmbedder {
    pub fn new(dimension: usize) -> Self {
        Self::with_model_name(format!("feature-hash-{}", dimension), dimension)
    }

    /// Use a custom identifier, e.g. the configured embedding model name
    pub fn with_model_name(model: impl Into<String>, dimension: usize) -> Self {
        Self {
            model: model.into(),
            dimension: dimension.max(1),
        }
    }

    fn embed_text(&self, text: &str) -> Vec<f32> {
        let mut embedding = vec![0.0f32; self.dimension];

        for token in text
            .split(|c: char| !c.is_alphanumeric())
            .filter(|t| !t.is_empty())
        {
            let digest = Sha256::digest(token.to_lowercase().as_bytes());
            let bucket = u64::from_le_bytes([
                digest[0], digest[1], digest[2], digest[3], digest[4], digest[5], digest[6], digest[7],
            ]);
            let idx = (bucket % self.dimension as u64) as usize;
            let sign = if digest[8] & 1 == 0 { 1.0 } else { -1.0 };
            embedding[idx] += sign;
        }

        normalize(&mut embedding);
        embedding
    }
}

#[async_trait]
impl Embedder for HashingEmbedder {
    async fn embed_batch(&self, texts: &[String]) -> Result<Vec<Vec<f32>>> {
        Ok(texts.iter().map(|t| self.embed_text(t)).collect())
    }

    fn model_name(&self) -> &str {
        &self.model
    }

    fn dimension(&self) -> usize {
        self.dimension
    }
}
