//! OpenAI-compatible embedding client

use super::{with_retry, Embedder};
use crate::errors::{AppError, Result};
use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use std::time::Duration;

/// OpenAI embedding client
pub struct OpenAIEmbedder {
    client: reqwest::Client,
    api_key: String,
    model: String,
    dimension: usize,
    base_url: String,
    max_retries: u32,
    batch_size: usize,
}

#[derive(Serialize)]
struct OpenAIRequest<'a> {
    input: &'a [String],
    model: &'a str,
}

#[derive(Deserialize)]
struct OpenAIResponse {
    data: Vec<OpenAIEmbedding>,
}

#[derive(Deserialize)]
struct OpenAIEmbedding {
    index: Option<usize>,
    embedding: Vec<f32>,
}

impl OpenAIEmbedder {
    /// Create a new OpenAI embedder
    pub fn new(
        api_key: String,
        model: String,
        base_url: String,
        timeout: Duration,
        max_retries: u32,
        batch_size: usize,
    ) -> Result<Self> {
        let dimension = match model.as_str() {
            "text-embedding-ada-002" => 1536,
            "text-embedding-3-small" => 1536,
            "text-embedding-3-large" => 3072,
            _ => 0,
        };

        let client = reqwest::Client::builder().timeout(timeout).build()?;

        Ok(Self {
            client,
            api_key,
            model,
            dimension,
            base_url: base_url.trim_end_matches('/').to_string(),
            max_retries,
            batch_size: batch_size.max(1),
        })
    }

    async fn make_request(&self, texts: &[String]) -> Result<Vec<Vec<f32>>> {
        let url = format!("{}/embeddings", self.base_url);

        let request = OpenAIRequest {
            input: texts,
            model: &self.model,
        };

        let response = self
            .client
            .post(&url)
            .bearer_auth(&self.api_key)
            .json(&request)
            .send()
            .await
            .map_err(|e| AppError::EmbeddingError {
                message: format!("Request failed: {}", e),
            })?;

        if !response.status().is_success() {
            let status = response.status();
            let body = response.text().await.unwrap_or_default();
            return Err(AppError::EmbeddingError {
                message: format!("API error {}: {}", status, body),
            });
        }

        let mut result: OpenAIResponse = response.json().await.map_err(|e| AppError::EmbeddingError {
            message: format!("Failed to parse response: {}", e),
        })?;

        // The API may return items out of order
        result.data.sort_by_key(|item| item.index.unwrap_or(usize::MAX));

        if result.data.len() != texts.len() {
            return Err(AppError::EmbeddingError {
                message: format!("Expected {} embeddings, got {}", texts.len(), result.data.len()),
            });
        }

        Ok(result.data.into_iter().map(|e| e.embedding).collect())
    }
}

#[async_trait]
impl Embedder for OpenAIEmbedder {
    async fn embed_batch(&self, texts: &[String]) -> Result<Vec<Vec<f32>>> {
        let mut all_embeddings = Vec::with_capacity(texts.len());

        for batch in texts.chunks(self.batch_size) {
            let embeddings = with_retry(self.max_retries, "openai", || self.make_request(batch)).await?;
            all_embeddings.extend(embeddings);
        }

        Ok(all_embeddings)
    }

    fn model_name(&self) -> &str {
        &self.model
    }

    fn dimension(&self) -> usize {
        self.dimension
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_known_model_dimensions() {
        let embedder = OpenAIEmbedder::new(
            "sk-test".to_string(),
            "text-embedding-3-large".to_string(),
            "https://api.openai.com/v1/".to_string(),
            Duration::from_secs(5),
            1,
            16,
        )
        .unwrap();
        assert_eq!(embedder.dimension(), 3072);
        assert_eq!(embedder.base_url, "https://api.openai.com/v1");
    }
}
