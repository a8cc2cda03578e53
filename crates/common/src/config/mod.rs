//! Configuration management for ResumeForge
//!
//! Supports loading configuration from:
//! - Configuration files (YAML, TOML or JSON, chosen by extension)
//! - Environment variables (prefixed with RESUMEFORGE__)
//! - Default values

use crate::errors::{AppError, Result};
use config::{Config, Environment, File};
use serde::{Deserialize, Serialize};
use std::path::Path;
use std::time::Duration;

/// Path used when no configuration file is named explicitly
pub const DEFAULT_CONFIG_PATH: &str = "configs/default.yaml";

/// Environment variable prefix, e.g. `RESUMEFORGE__TOP_K=4`
pub const ENV_PREFIX: &str = "RESUMEFORGE";

/// Main application settings
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct Settings {
    /// Identifier of the embedding model; recorded in persisted indexes
    #[serde(default = "default_embeddings_model")]
    pub embeddings_model: String,

    /// Maximum chunk length in characters
    #[serde(default = "default_chunk_size")]
    pub chunk_size: usize,

    /// Characters shared between consecutive chunks
    #[serde(default = "default_chunk_overlap")]
    pub chunk_overlap: usize,

    /// Number of evidence chunks retrieved for the job description
    #[serde(default = "default_top_k")]
    pub top_k: usize,

    /// Review rounds before the supervisor is forced to accept
    #[serde(default = "default_max_revision_rounds")]
    pub max_revision_rounds: u32,

    /// Arbiter model
    #[serde(default = "default_supervisor")]
    pub supervisor: AgentConfig,

    /// Drafting model
    #[serde(default = "default_intern")]
    pub intern: AgentConfig,

    /// Critique model
    #[serde(default = "default_reviewer")]
    pub reviewer: AgentConfig,

    /// Embedding backend
    #[serde(default)]
    pub embedding: EmbeddingConfig,

    /// Provider endpoints and credentials
    #[serde(default)]
    pub providers: ProviderConfig,

    /// Logging configuration
    #[serde(default)]
    pub observability: ObservabilityConfig,
}

/// Generation settings for one agent role
#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
pub struct AgentConfig {
    /// Provider identifier: ollama, openai
    pub provider: String,

    /// Model name understood by the provider
    pub model: String,

    /// Sampling temperature
    pub temperature: f64,
}

impl AgentConfig {
    pub fn new(provider: &str, model: &str, temperature: f64) -> Self {
        Self {
            provider: provider.to_string(),
            model: model.to_string(),
            temperature,
        }
    }
}

#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct EmbeddingConfig {
    /// Embedding provider: ollama, openai, hashing
    #[serde(default = "default_embedding_provider")]
    pub provider: String,

    /// API key for embedding service (falls back to the provider key)
    pub api_key: Option<String>,

    /// API base URL (falls back to the provider endpoint)
    pub api_base: Option<String>,

    /// Request timeout in seconds
    #[serde(default = "default_embedding_timeout")]
    pub timeout_secs: u64,

    /// Maximum attempts per batch request
    #[serde(default = "default_embedding_retries")]
    pub max_retries: u32,

    /// Texts sent per embedding request
    #[serde(default = "default_batch_size")]
    pub batch_size: usize,

    /// Vector width of the offline hashing embedder
    #[serde(default = "default_hashing_dimension")]
    pub hashing_dimension: usize,
}

#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct ProviderConfig {
    /// Ollama server, defaults to `OLLAMA_BASE_URL`
    #[serde(default = "default_ollama_base_url")]
    pub ollama_base_url: String,

    /// OpenAI-compatible API base URL
    #[serde(default = "default_openai_base_url")]
    pub openai_base_url: String,

    /// OpenAI API key, defaults to `OPENAI_API_KEY`
    #[serde(default = "default_openai_api_key")]
    pub openai_api_key: Option<String>,

    /// Generation request timeout in seconds
    #[serde(default = "default_provider_timeout")]
    pub timeout_secs: u64,
}

#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct ObservabilityConfig {
    /// Log level (debug, info, warn, error)
    #[serde(default = "default_log_level")]
    pub log_level: String,

    /// Enable JSON logging
    #[serde(default = "default_json_logging")]
    pub json_logging: bool,
}

// Default value functions
fn default_embeddings_model() -> String { "BAAI/bge-small-en-v1.5".to_string() }
fn default_chunk_size() -> usize { 1200 }
fn default_chunk_overlap() -> usize { 200 }
fn default_top_k() -> usize { 8 }
fn default_max_revision_rounds() -> u32 { 2 }
fn default_supervisor() -> AgentConfig { AgentConfig::new("ollama", "qwen2.5:14b", 0.1) }
fn default_intern() -> AgentConfig { AgentConfig::new("ollama", "llama3.1:8b", 0.4) }
fn default_reviewer() -> AgentConfig { AgentConfig::new("ollama", "deepseek-r1:14b", 0.1) }
fn default_embedding_provider() -> String { "ollama".to_string() }
fn default_embedding_timeout() -> u64 { 60 }
fn default_embedding_retries() -> u32 { 3 }
fn default_batch_size() -> usize { 32 }
fn default_hashing_dimension() -> usize { 384 }
fn default_ollama_base_url() -> String {
    std::env::var("OLLAMA_BASE_URL").unwrap_or_else(|_| "http://localhost:11434".to_string())
}
fn default_openai_base_url() -> String { "https://api.openai.com/v1".to_string() }
fn default_openai_api_key() -> Option<String> { std::env::var("OPENAI_API_KEY").ok() }
fn default_provider_timeout() -> u64 { 300 }
fn default_log_level() -> String { "info".to_string() }
fn default_json_logging() -> bool { false }

impl Settings {
    /// Load settings from a file plus `RESUMEFORGE__*` environment overrides.
    ///
    /// When `required` is false a missing file is skipped and defaults apply.
    pub fn load(path: &Path, required: bool) -> Result<Self> {
        if required && !path.exists() {
            return Err(AppError::Configuration {
                message: format!("Config file not found: {}", path.display()),
            });
        }

        let builder = Config::builder();
        let builder = agent_defaults(builder, "supervisor", &default_supervisor())?;
        let builder = agent_defaults(builder, "intern", &default_intern())?;
        let builder = agent_defaults(builder, "reviewer", &default_reviewer())?;

        let config = builder
            .add_source(File::from(path).required(required))
            // e.g., RESUMEFORGE__REVIEWER__MODEL=qwen2.5:32b
            .add_source(
                Environment::with_prefix(ENV_PREFIX)
                    .separator("__")
                    .try_parsing(true),
            )
            .build()?;

        let settings: Settings = config.try_deserialize()?;
        tracing::debug!(
            path = %path.display(),
            embeddings_model = %settings.embeddings_model,
            "Settings loaded"
        );
        Ok(settings)
    }

    /// Reject settings the pipeline cannot run with
    pub fn validate(&self) -> Result<()> {
        if self.embeddings_model.trim().is_empty() {
            return Err(invalid("embeddings_model must not be empty"));
        }
        if self.chunk_size == 0 {
            return Err(invalid("chunk_size must be greater than 0"));
        }
        if self.chunk_overlap >= self.chunk_size {
            return Err(invalid("chunk_overlap must be smaller than chunk_size"));
        }
        if self.top_k == 0 {
            return Err(invalid("top_k must be greater than 0"));
        }
        if self.max_revision_rounds == 0 {
            return Err(invalid("max_revision_rounds must be greater than 0"));
        }

        for (role, agent) in self.agents() {
            if agent.provider.trim().is_empty() {
                return Err(invalid(&format!("{}.provider must not be empty", role)));
            }
            if agent.model.trim().is_empty() {
                return Err(invalid(&format!("{}.model must not be empty", role)));
            }
            if !(0.0..=2.0).contains(&agent.temperature) {
                return Err(invalid(&format!(
                    "{}.temperature must be within [0, 2], got {}",
                    role, agent.temperature
                )));
            }
        }

        if self.embedding.batch_size == 0 {
            return Err(invalid("embedding.batch_size must be greater than 0"));
        }

        Ok(())
    }

    /// The three agent roles with their names
    pub fn agents(&self) -> [(&'static str, &AgentConfig); 3] {
        [
            ("supervisor", &self.supervisor),
            ("intern", &self.intern),
            ("reviewer", &self.reviewer),
        ]
    }

    /// Get generation request timeout as Duration
    pub fn provider_timeout(&self) -> Duration {
        Duration::from_secs(self.providers.timeout_secs)
    }

    /// Get embedding request timeout as Duration
    pub fn embedding_timeout(&self) -> Duration {
        Duration::from_secs(self.embedding.timeout_secs)
    }
}

fn agent_defaults(
    builder: config::ConfigBuilder<config::builder::DefaultState>,
    role: &str,
    agent: &AgentConfig,
) -> Result<config::ConfigBuilder<config::builder::DefaultState>> {
    Ok(builder
        .set_default(format!("{}.provider", role), agent.provider.clone())?
        .set_default(format!("{}.model", role), agent.model.clone())?
        .set_default(format!("{}.temperature", role), agent.temperature)?)
}

fn invalid(message: &str) -> AppError {
    AppError::Configuration {
        message: message.to_string(),
    }
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            embeddings_model: default_embeddings_model(),
            chunk_size: default_chunk_size(),
            chunk_overlap: default_chunk_overlap(),
            top_k: default_top_k(),
            max_revision_rounds: default_max_revision_rounds(),
            supervisor: default_supervisor(),
            intern: default_intern(),
            reviewer: default_reviewer(),
            embedding: EmbeddingConfig::default(),
            providers: ProviderConfig::default(),
            observability: ObservabilityConfig::default(),
        }
    }
}

impl Default for EmbeddingConfig {
    fn default() -> Self {
        Self {
            provider: default_embedding_provider(),
            api_key: None,
            api_base: None,
            timeout_secs: default_embedding_timeout(),
            max_retries: default_embedding_retries(),
            batch_size: default_batch_size(),
            hashing_dimension: default_hashing_dimension(),
        }
    }
}

impl Default for ProviderConfig {
    fn default() -> Self {
        Self {
            ollama_base_url: default_ollama_base_url(),
            openai_base_url: default_openai_base_url(),
            openai_api_key: default_openai_api_key(),
            timeout_secs: default_provider_timeout(),
        }
    }
}

impl Default for ObservabilityConfig {
    fn default() -> Self {
        Self {
            log_level: default_log_level(),
            json_logging: default_json_logging(),
        }
    }
}
