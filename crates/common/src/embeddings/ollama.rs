//! Ollama embedding client (`POST /api/embed`)

use super::{with_retry, Embedder};
use crate::errors::{AppError, Result};
use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use std::time::Duration;
use tracing::debug;

/// Embedder backed by a local Ollama server
pub struct OllamaEmbedder {
    client: reqwest::Client,
    base_url: String,
    model: String,
    max_retries: u32,
    batch_size: usize,
}

#[derive(Serialize)]
struct OllamaEmbedRequest<'a> {
    model: &'a str,
    input: &'a [String],
}

#[derive(Deserialize)]
struct OllamaEmbedResponse {
    embeddings: Vec<Vec<f32>>,
}

impl OllamaEmbedder {
    pub fn new(
        model: String,
        base_url: String,
        timeout: Duration,
        max_retries: u32,
        batch_size: usize,
    ) -> Result<Self> {
        let client = reqwest::Client::builder().timeout(timeout).build()?;

        Ok(Self {
            client,
            base_url: base_url.trim_end_matches('/').to_string(),
            model,
            max_retries,
            batch_size: batch_size.max(1),
        })
    }

    async fn make_request(&self, texts: &[String]) -> Result<Vec<Vec<f32>>> {
        let url = format!("{}/api/embed", self.base_url);
        let request = OllamaEmbedRequest {
            model: &self.model,
            input: texts,
        };

        let response = self
            .client
            .post(&url)
            .json(&request)
            .send()
            .await
            .map_err(|e| AppError::EmbeddingError {
                message: format!("Ollama HTTP error: {}", e),
            })?;

        if !response.status().is_success() {
            let status = response.status();
            let body = response.text().await.unwrap_or_default();
            return Err(AppError::EmbeddingError {
                message: format!("Ollama returned {}: {}", status, body),
            });
        }

        let resp: OllamaEmbedResponse = response.json().await.map_err(|e| AppError::EmbeddingError {
            message: format!("Ollama JSON parse error: {}", e),
        })?;

        if resp.embeddings.len() != texts.len() {
            return Err(AppError::EmbeddingError {
                message: format!(
                    "Ollama returned {} embeddings for {} inputs",
                    resp.embeddings.len(),
                    texts.len()
                ),
            });
        }

        debug!(model = %self.model, count = texts.len(), "Ollama embeddings received");
        Ok(resp.embeddings)
    }
}

#[async_trait]
impl Embedder for OllamaEmbedder {
    async fn embed_batch(&self, texts: &[String]) -> Result<Vec<Vec<f32>>> {
        let mut all_embeddings = Vec::with_capacity(texts.len());

        for batch in texts.chunks(self.batch_size) {
            let embeddings = with_retry(self.max_retries, "ollama", || self.make_request(batch)).await?;
            all_embeddings.extend(embeddings);
        }

        Ok(all_embeddings)
    }

    fn model_name(&self) -> &str {
        &self.model
    }

    fn dimension(&self) -> usize {
        0
    }
}
