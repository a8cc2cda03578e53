//! Embedding service abstraction
//!
//! Provides a unified interface for multiple embedding providers:
//! - Ollama (`/api/embed`, local models)
//! - OpenAI-compatible `/embeddings` endpoints
//! - Feature hashing (deterministic, offline)

mod hashing;
mod ollama;
mod openai;

pub use hashing::HashingEmbedder;
pub use ollama::OllamaEmbedder;
pub use openai::OpenAIEmbedder;

use crate::config::Settings;
use crate::errors::{AppError, Result};
use async_trait::async_trait;
use std::future::Future;
use std::sync::Arc;
use std::time::Duration;

/// Trait for embedding generation
#[async_trait]
pub trait Embedder: Send + Sync {
    /// Generate embedding for a single text
    async fn embed(&self, text: &str) -> Result<Vec<f32>> {
        let embeddings = self.embed_batch(&[text.to_string()]).await?;
        embeddings.into_iter().next().ok_or_else(|| AppError::EmbeddingError {
            message: "Empty response".to_string(),
        })
    }

    /// Generate embeddings for multiple texts (batch), one vector per input in order
    async fn embed_batch(&self, texts: &[String]) -> Result<Vec<Vec<f32>>>;

    /// Get the model name
    fn model_name(&self) -> &str;

    /// Get the embedding dimension, 0 when only known after the first response
    fn dimension(&self) -> usize;
}

/// Scale a vector to unit length in place. Zero vectors are left untouched.
pub fn normalize(vector: &mut [f32]) {
    let norm: f32 = vector.iter().map(|x| x * x).sum::<f32>().sqrt();
    if norm > 0.0 {
        for x in vector.iter_mut() {
            *x /= norm;
        }
    }
}

/// Dot product; equals cosine similarity when both inputs are unit vectors
pub fn dot(a: &[f32], b: &[f32]) -> f32 {
    a.iter().zip(b.iter()).map(|(x, y)| x * y).sum()
}

/// Run a request, retrying with exponential backoff
pub(crate) async fn with_retry<T, F, Fut>(max_attempts: u32, provider: &str, mut request: F) -> Result<T>
where
    F: FnMut() -> Fut,
    Fut: Future<Output = Result<T>>,
{
    let max_attempts = max_attempts.max(1);
    let mut last_error = None;

    for attempt in 0..max_attempts {
        if attempt > 0 {
            let delay = Duration::from_millis(100 * 2_u64.pow(attempt));
            tokio::time::sleep(delay).await;
        }

        match request().await {
            Ok(value) => return Ok(value),
            Err(e) => {
                tracing::warn!(
                    provider = provider,
                    attempt = attempt + 1,
                    max_attempts = max_attempts,
                    error = %e,
                    "Embedding request failed, retrying"
                );
                last_error = Some(e);
            }
        }
    }

    Err(last_error.unwrap_or_else(|| AppError::EmbeddingError {
        message: "Unknown error after retries".to_string(),
    }))
}

/// Create an embedder based on configuration
pub fn create_embedder(settings: &Settings) -> Result<Arc<dyn Embedder>> {
    let config = &settings.embedding;
    let model = settings.embeddings_model.clone();

    let embedder: Arc<dyn Embedder> = match config.provider.trim().to_lowercase().as_str() {
        "ollama" => {
            let base_url = config
                .api_base
                .clone()
                .unwrap_or_else(|| settings.providers.ollama_base_url.clone());
            Arc::new(OllamaEmbedder::new(
                model,
                base_url,
                settings.embedding_timeout(),
                config.max_retries,
                config.batch_size,
            )?)
        }
        "openai" => {
            let key = config
                .api_key
                .clone()
                .or_else(|| settings.providers.openai_api_key.clone())
                .ok_or_else(|| AppError::Configuration {
                    message: "OpenAI embeddings require embedding.api_key or OPENAI_API_KEY".to_string(),
                })?;
            let base_url = config
                .api_base
                .clone()
                .unwrap_or_else(|| settings.providers.openai_base_url.clone());
            Arc::new(OpenAIEmbedder::new(
                key,
                model,
                base_url,
                settings.embedding_timeout(),
                config.max_retries,
                config.batch_size,
            )?)
        }
        "hashing" => Arc::new(HashingEmbedder::with_model_name(model, config.hashing_dimension)),
        other => {
            return Err(AppError::UnsupportedProvider {
                provider: format!("embedding provider `{}`", other),
            })
        }
    };

    tracing::info!(
        provider = %config.provider,
        model = embedder.model_name(),
        "Embedder created"
    );
    Ok(embedder)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_normalize_unit_length() {
        let mut v = vec![3.0, 4.0];
        normalize(&mut v);
        assert!((v[0] - 0.6).abs() < 1e-6);
        assert!((v[1] - 0.8).abs() < 1e-6);
        assert!((dot(&v, &v) - 1.0).abs() < 1e-6);
    }

    #[test]
    fn test_normalize_zero_vector() {
        let mut v = vec![0.0; 4];
        normalize(&mut v);
        assert!(v.iter().all(|x| *x == 0.0));
    }

    #[test]
    fn test_create_hashing_embedder() {
        let mut settings = Settings::default();
        settings.embedding.provider = "hashing".to_string();
        settings.embedding.hashing_dimension = 64;
        let embedder = create_embedder(&settings).unwrap();
        assert_eq!(embedder.model_name(), "BAAI/bge-small-en-v1.5");
        assert_eq!(embedder.dimension(), 64);
    }

    #[test]
    fn test_unknown_provider_rejected() {
        let mut settings = Settings::default();
        settings.embedding.provider = "carrier-pigeon".to_string();
        let err = create_embedder(&settings).err().unwrap();
        assert!(matches!(err, AppError::UnsupportedProvider { .. }));
    }

    #[test]
    fn test_openai_requires_key() {
        let mut settings = Settings::default();
        settings.embedding.provider = "openai".to_string();
        settings.embedding.api_key = None;
        settings.providers.openai_api_key = None;
        let err = create_embedder(&settings).err().unwrap();
        assert!(matches!(err, AppError::Configuration { .. }));
    }

    #[tokio::test]
    async fn test_retry_returns_last_error() {
        let mut calls = 0;
        let result: Result<()> = with_retry(2, "test", || {
            calls += 1;
            async {
                Err(AppError::EmbeddingError {
                    message: "down".to_string(),
                })
            }
        })
        .await;
        assert!(result.is_err());
        assert_eq!(calls, 2);
    }
}
