//! Text generation abstraction
//!
//! Provides:
//! - `TextGenerator`, the single call the agents depend on
//! - `ChatProvider`, one implementation per model backend
//! - `ProviderRegistry`, a dispatch table from provider id to backend

mod ollama;
mod openai;

pub use ollama::OllamaProvider;
pub use openai::OpenAIProvider;

use crate::config::{AgentConfig, Settings};
use crate::errors::{AppError, Result};
use crate::metrics;
use async_trait::async_trait;
use std::collections::HashMap;
use std::sync::Arc;
use std::time::Instant;
use tracing::{debug, info, warn};

/// Provider, model and temperature for a single generation call
pub type GenerationConfig = AgentConfig;

/// A single system + user chat turn sent to a provider
#[derive(Debug, Clone, Copy)]
pub struct ChatRequest<'a> {
    pub system: &'a str,
    pub user: &'a str,
    pub model: &'a str,
    pub temperature: f64,
}

/// Backend able to answer one chat turn
#[async_trait]
pub trait ChatProvider: Send + Sync {
    /// Provider identifier used in configuration
    fn name(&self) -> &str;

    /// Return the raw assistant message content
    async fn chat(&self, request: &ChatRequest<'_>) -> Result<String>;
}

/// Generate text given a system instruction and a user instruction
#[async_trait]
pub trait TextGenerator: Send + Sync {
    async fn generate(&self, system: &str, user: &str, config: &GenerationConfig) -> Result<String>;
}

/// Dispatch table mapping provider identifiers to chat backends
#[derive(Default, Clone)]
pub struct ProviderRegistry {
    providers: HashMap<String, Arc<dyn ChatProvider>>,
}

impl ProviderRegistry {
    /// Create an empty registry
    pub fn new() -> Self {
        Self::default()
    }

    /// Build the registry from settings.
    ///
    /// Ollama is always registered. OpenAI is registered when an API key is configured.
    pub fn from_settings(settings: &Settings) -> Result<Self> {
        let mut registry = Self::new();
        let timeout = settings.provider_timeout();

        registry.register(
            "ollama",
            Arc::new(OllamaProvider::new(&settings.providers.ollama_base_url, timeout)?),
        );

        if let Some(key) = settings.providers.openai_api_key.as_deref().filter(|k| !k.is_empty()) {
            registry.register(
                "openai",
                Arc::new(OpenAIProvider::new(&settings.providers.openai_base_url, key, timeout)?),
            );
        }

        info!(providers = ?registry.provider_ids(), "Generation providers registered");
        Ok(registry)
    }

    /// Register a backend under an identifier, returning any backend it replaced
    pub fn register(&mut self, id: &str, provider: Arc<dyn ChatProvider>) -> Option<Arc<dyn ChatProvider>> {
        self.providers.insert(normalize_id(id), provider)
    }

    /// Look up a backend by identifier (case-insensitive)
    pub fn get(&self, id: &str) -> Option<Arc<dyn ChatProvider>> {
        self.providers.get(&normalize_id(id)).cloned()
    }

    /// Registered identifiers, sorted
    pub fn provider_ids(&self) -> Vec<String> {
        let mut ids: Vec<String> = self.providers.keys().cloned().collect();
        ids.sort();
        ids
    }

    /// Check every agent role points at a registered provider
    pub fn ensure_supports(&self, settings: &Settings) -> Result<()> {
        for (role, agent) in settings.agents() {
            if self.get(&agent.provider).is_none() {
                return Err(AppError::UnsupportedProvider {
                    provider: format!("{} (configured for {})", agent.provider, role),
                });
            }
        }
        Ok(())
    }
}

fn normalize_id(id: &str) -> String {
    id.trim().to_lowercase()
}

#[async_trait]
impl TextGenerator for ProviderRegistry {
    async fn generate(&self, system: &str, user: &str, config: &GenerationConfig) -> Result<String> {
        let provider = self.get(&config.provider).ok_or_else(|| AppError::UnsupportedProvider {
            provider: config.provider.clone(),
        })?;

        let request = ChatRequest {
            system,
            user,
            model: &config.model,
            temperature: config.temperature,
        };

        debug!(
            provider = provider.name(),
            model = %config.model,
            prompt_chars = user.len(),
            "Generation request"
        );

        let start = Instant::now();
        let result = provider.chat(&request).await;
        let elapsed = start.elapsed().as_secs_f64();

        let content = match result {
            Ok(content) => content,
            Err(e) => {
                metrics::record_generation(provider.name(), elapsed, false);
                warn!(provider = provider.name(), model = %config.model, error = %e, "Generation failed");
                return Err(e);
            }
        };

        let content = content.trim();
        if content.is_empty() {
            metrics::record_generation(provider.name(), elapsed, false);
            return Err(AppError::EmptyGeneration {
                model: config.model.clone(),
            });
        }

        metrics::record_generation(provider.name(), elapsed, true);
        info!(
            provider = provider.name(),
            model = %config.model,
            latency_ms = (elapsed * 1000.0) as u64,
            response_chars = content.len(),
            "Generation complete"
        );

        Ok(content.to_string())
    }
}
