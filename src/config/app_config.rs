use serde::Deserialize;

use crate::domain::retrieval::{DiversityConfig, RerankConfig};
use crate::domain::verification::VerificationConfig;
use crate::domain::DomainError;
use crate::infrastructure::observability::ObservabilityConfig;

/// Application configuration
#[derive(Debug, Clone, Default, Deserialize)]
pub struct AppConfig {
    #[serde(default)]
    pub logging: LoggingConfig,
    #[serde(default)]
    pub ai: AiConfig,
    #[serde(default)]
    pub database: DatabaseConfig,
    #[serde(default)]
    pub retrieval: RetrievalConfig,
    #[serde(default)]
    pub rerank: RerankConfig,
    #[serde(default)]
    pub diversity: DiversityConfig,
    #[serde(default)]
    pub verification: VerificationConfig,
    #[serde(default)]
    pub observability: ObservabilityConfig,
}

#[derive(Debug, Clone, Deserialize)]
pub struct LoggingConfig {
    #[serde(default = "default_log_level")]
    pub level: String,
    #[serde(default)]
    pub format: LogFormat,
}

#[derive(Debug, Clone, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum LogFormat {
    #[default]
    Pretty,
    Json,
}

/// Which family of collaborators backs the pipeline
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum AiProvider {
    /// Deterministic, offline implementations
    #[default]
    Fake,
    OpenAi,
}

impl AiProvider {
    pub fn parse(raw: &str) -> Result<Self, DomainError> {
        match raw.trim().to_lowercase().as_str() {
            "fake" => Ok(AiProvider::Fake),
            "openai" => Ok(AiProvider::OpenAi),
            other => Err(DomainError::configuration(format!(
                "Unknown AI provider '{}', expected 'fake' or 'openai'",
                other
            ))),
        }
    }
}

/// Chat and embedding model settings
#[derive(Debug, Clone, Deserialize)]
pub struct AiConfig {
    #[serde(default = "default_ai_provider")]
    pub provider: String,
    #[serde(default = "default_chat_model")]
    pub model: String,
    #[serde(default = "default_embed_model")]
    pub embed_model: String,
    /// Falls back to `OPENAI_API_KEY` when unset
    #[serde(default)]
    pub api_key: Option<String>,
    #[serde(default)]
    pub base_url: Option<String>,
    #[serde(default = "default_request_timeout_secs")]
    pub request_timeout_secs: u64,
    #[serde(default = "default_embed_max_attempts")]
    pub embed_max_attempts: u32,
    #[serde(default = "default_embed_backoff_min_ms")]
    pub embed_backoff_min_ms: u64,
    #[serde(default = "default_embed_backoff_max_ms")]
    pub embed_backoff_max_ms: u64,
    /// Dimension of vectors produced by the fake embedder
    #[serde(default = "default_fake_embedding_dim")]
    pub fake_embedding_dim: usize,
}

impl AiConfig {
    pub fn provider(&self) -> Result<AiProvider, DomainError> {
        AiProvider::parse(&self.provider)
    }

    /// Configured API key, else the `OPENAI_API_KEY` environment variable
    pub fn resolve_api_key(&self) -> Result<String, DomainError> {
        self.api_key
            .clone()
            .filter(|k| !k.trim().is_empty())
            .or_else(|| std::env::var("OPENAI_API_KEY").ok())
            .filter(|k| !k.trim().is_empty())
            .ok_or_else(|| {
                DomainError::configuration("OpenAI provider selected but no API key is configured")
            })
    }
}

/// Connection to the chunk store
#[derive(Debug, Clone, Deserialize)]
pub struct DatabaseConfig {
    #[serde(default)]
    pub url: Option<String>,
    #[serde(default = "default_max_connections")]
    pub max_connections: u32,
}

/// Candidate limits for the hybrid retrieval stage
#[derive(Debug, Clone, Deserialize)]
pub struct RetrievalConfig {
    #[serde(default = "default_stream_limit")]
    pub vector_limit: usize,
    #[serde(default = "default_stream_limit")]
    pub lexical_limit: usize,
    /// Per-source cap, used only for grouped queries scoped to sources
    #[serde(default = "default_per_source_limit")]
    pub per_source_limit: usize,
    #[serde(default = "default_max_chunks_per_query")]
    pub max_chunks_per_query: usize,
}

fn default_log_level() -> String {
    "info".to_string()
}

fn default_ai_provider() -> String {
    "fake".to_string()
}

fn default_chat_model() -> String {
    "gpt-4o-mini".to_string()
}

fn default_embed_model() -> String {
    "text-embedding-3-small".to_string()
}

fn default_request_timeout_secs() -> u64 {
    60
}

fn default_embed_max_attempts() -> u32 {
    3
}

fn default_embed_backoff_min_ms() -> u64 {
    1_000
}

fn default_embed_backoff_max_ms() -> u64 {
    20_000
}

fn default_fake_embedding_dim() -> usize {
    1536
}

fn default_max_connections() -> u32 {
    5
}

fn default_stream_limit() -> usize {
    30
}

fn default_per_source_limit() -> usize {
    10
}

fn default_max_chunks_per_query() -> usize {
    8
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: default_log_level(),
            format: LogFormat::default(),
        }
    }
}

impl Default for AiConfig {
    fn default() -> Self {
        Self {
            provider: default_ai_provider(),
            model: default_chat_model(),
            embed_model: default_embed_model(),
            api_key: None,
            base_url: None,
            request_timeout_secs: default_request_timeout_secs(),
            embed_max_attempts: default_embed_max_attempts(),
            embed_backoff_min_ms: default_embed_backoff_min_ms(),
            embed_backoff_max_ms: default_embed_backoff_max_ms(),
            fake_embedding_dim: default_fake_embedding_dim(),
        }
    }
}

impl Default for DatabaseConfig {
    fn default() -> Self {
        Self {
            url: None,
            max_connections: default_max_connections(),
        }
    }
}

impl Default for RetrievalConfig {
    fn default() -> Self {
        Self {
            vector_limit: default_stream_limit(),
            lexical_limit: default_stream_limit(),
            per_source_limit: default_per_source_limit(),
            max_chunks_per_query: default_max_chunks_per_query(),
        }
    }
}

impl AppConfig {
    pub fn load() -> Result<Self, config::ConfigError> {
        let config = config::Config::builder()
            .add_source(config::File::with_name("config/default").required(false))
            .add_source(config::File::with_name("config/local").required(false))
            .add_source(
                config::Environment::with_prefix("APP")
                    .separator("__")
                    .try_parsing(true),
            )
            .build()?;

        config.try_deserialize()
    }
}
