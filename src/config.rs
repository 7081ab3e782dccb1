use std::path::Path;

use serde::Deserialize;
use serde::Serialize;

use crate::embeddings::EmbeddingProvider;
use crate::errors::AgriSenseError;
use crate::rag::GenerationMode;
use crate::store::DistanceMetric;

/// Environment variable that overrides `llm.api_key`
pub const LLM_API_KEY_ENV: &str = "GROQ_API_KEY";

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ServerConfig {
    #[serde(default = "default_host")]
    pub host: String,
    #[serde(default = "default_port")]
    pub port: u16,
    #[serde(default = "default_true")]
    pub cors: bool,
}

fn default_host() -> String {
    "127.0.0.1".to_string()
}

fn default_port() -> u16 {
    8000
}

fn default_true() -> bool {
    true
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: default_host(),
            port: default_port(),
            cors: true,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LoggingConfig {
    #[serde(default = "default_log_level")]
    pub level: String,
    #[serde(default = "default_log_directory")]
    pub directory: String,
}

fn default_log_level() -> String {
    "info".to_string()
}

fn default_log_directory() -> String {
    "logs".to_string()
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: default_log_level(),
            directory: default_log_directory(),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EmbeddingsConfig {
    #[serde(default)]
    pub provider: EmbeddingProvider,
    #[serde(default = "default_embedding_endpoint")]
    pub endpoint: String,
    #[serde(default)]
    pub api_key: Option<String>,
    #[serde(default = "default_embedding_model")]
    pub model: String,
    #[serde(default = "default_dimension")]
    pub dimension: usize,
    #[serde(default = "default_embedding_timeout")]
    pub timeout_secs: u64,
    /// Texts longer than this are cut at a word boundary before embedding
    #[serde(default = "default_max_text_chars")]
    pub max_text_chars: usize,
}

fn default_embedding_endpoint() -> String {
    "http://localhost:11434".to_string()
}

fn default_embedding_model() -> String {
    "all-minilm".to_string()
}

fn default_dimension() -> usize {
    384
}

fn default_embedding_timeout() -> u64 {
    30
}

fn default_max_text_chars() -> usize {
    2000
}

impl Default for EmbeddingsConfig {
    fn default() -> Self {
        Self {
            provider: EmbeddingProvider::default(),
            endpoint: default_embedding_endpoint(),
            api_key: None,
            model: default_embedding_model(),
            dimension: default_dimension(),
            timeout_secs: default_embedding_timeout(),
            max_text_chars: default_max_text_chars(),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StoreConfig {
    #[serde(default = "default_store_path")]
    pub path: String,
    #[serde(default = "default_collection")]
    pub collection: String,
    #[serde(default)]
    pub metric: DistanceMetric,
}

fn default_store_path() -> String {
    "./chroma_db".to_string()
}

fn default_collection() -> String {
    "farmer_contexts".to_string()
}

impl Default for StoreConfig {
    fn default() -> Self {
        Self {
            path: default_store_path(),
            collection: default_collection(),
            metric: DistanceMetric::default(),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CacheConfig {
    #[serde(default = "default_true")]
    pub enabled: bool,
    /// Nearest-neighbour distance must be strictly below this to count as a hit
    #[serde(default = "default_cache_threshold")]
    pub threshold: f32,
    /// Restrict the lookup to `type=interaction` documents
    #[serde(default = "default_true")]
    pub interactions_only: bool,
}

fn default_cache_threshold() -> f32 {
    0.3
}

impl Default for CacheConfig {
    fn default() -> Self {
        Self {
            enabled: true,
            threshold: default_cache_threshold(),
            interactions_only: true,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RetrievalConfig {
    #[serde(default = "default_retrieval_limit")]
    pub limit: usize,
    #[serde(default = "default_prompt_contexts")]
    pub prompt_contexts: usize,
}

fn default_retrieval_limit() -> usize {
    5
}

fn default_prompt_contexts() -> usize {
    3
}

impl Default for RetrievalConfig {
    fn default() -> Self {
        Self {
            limit: default_retrieval_limit(),
            prompt_contexts: default_prompt_contexts(),
        }
    }
}

/// Sampling parameters for one generation mode
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct ModelParams {
    pub model: String,
    pub temperature: f32,
    pub max_tokens: u32,
}

fn default_grounded_params() -> ModelParams {
    ModelParams {
        model: "llama-3.3-70b-versatile".to_string(),
        temperature: 0.7,
        max_tokens: 1024,
    }
}

fn default_fast_params() -> ModelParams {
    ModelParams {
        model: "llama-3.1-8b-instant".to_string(),
        temperature: 0.6,
        max_tokens: 300,
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LlmConfig {
    #[serde(default = "default_llm_endpoint")]
    pub endpoint: String,
    #[serde(default)]
    pub api_key: String,
    #[serde(default)]
    pub mode: GenerationMode,
    #[serde(default = "default_llm_timeout")]
    pub timeout_secs: u64,
    #[serde(default = "default_grounded_params")]
    pub grounded: ModelParams,
    #[serde(default = "default_fast_params")]
    pub fast: ModelParams,
}

fn default_llm_endpoint() -> String {
    "https://api.groq.com/openai/v1".to_string()
}

fn default_llm_timeout() -> u64 {
    60
}

impl Default for LlmConfig {
    fn default() -> Self {
        Self {
            endpoint: default_llm_endpoint(),
            api_key: String::new(),
            mode: GenerationMode::default(),
            timeout_secs: default_llm_timeout(),
            grounded: default_grounded_params(),
            fast: default_fast_params(),
        }
    }
}

impl LlmConfig {
    /// Sampling parameters for the given mode
    pub fn params(&self, mode: GenerationMode) -> &ModelParams {
        match mode {
            GenerationMode::Grounded => &self.grounded,
            GenerationMode::Fast => &self.fast,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct HistoryConfig {
    #[serde(default = "default_true")]
    pub enabled: bool,
    #[serde(default = "default_history_messages")]
    pub max_messages: usize,
}

fn default_history_messages() -> usize {
    10
}

impl Default for HistoryConfig {
    fn default() -> Self {
        Self {
            enabled: true,
            max_messages: default_history_messages(),
        }
    }
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct AppConfig {
    #[serde(default)]
    pub server: ServerConfig,
    #[serde(default)]
    pub logging: LoggingConfig,
    #[serde(default)]
    pub embeddings: EmbeddingsConfig,
    #[serde(default)]
    pub store: StoreConfig,
    #[serde(default)]
    pub cache: CacheConfig,
    #[serde(default)]
    pub retrieval: RetrievalConfig,
    #[serde(default)]
    pub llm: LlmConfig,
    #[serde(default)]
    pub history: HistoryConfig,
}

impl AppConfig {
    /// Load configuration from a TOML file
    pub fn from_file<P: AsRef<Path>>(path: P) -> crate::Result<Self> {
        let content = std::fs::read_to_string(path)?;
        Self::from_toml_str(&content)
    }

    /// Parse configuration from TOML text, then apply environment overrides
    pub fn from_toml_str(content: &str) -> crate::Result<Self> {
        let mut config: AppConfig = toml::from_str(content)?;
        config.apply_env_overrides();
        config.validate()?;
        Ok(config)
    }

    /// Load configuration from default config file path
    pub fn load() -> crate::Result<Self> {
        // Try to load from config.toml first, then fall back to config.example.toml
        if Path::new("config.toml").exists() {
            Self::from_file("config.toml")
        } else if Path::new("config.example.toml").exists() {
            tracing::warn!(
                "Using config.example.toml. Please create config.toml for production use."
            );
            Self::from_file("config.example.toml")
        } else {
            Err(AgriSenseError::Io(std::io::Error::new(
                std::io::ErrorKind::NotFound,
                "No config file found. Please create config.toml or config.example.toml",
            )))
        }
    }

    /// Pull secrets from the environment when present
    pub fn apply_env_overrides(&mut self) {
        if let Ok(key) = std::env::var(LLM_API_KEY_ENV) {
            if !key.trim().is_empty() {
                self.llm.api_key = key;
            }
        }
    }

    /// Reject configurations that cannot produce a working pipeline
    pub fn validate(&self) -> crate::Result<()> {
        if !(self.cache.threshold > 0.0) {
            return Err(AgriSenseError::ConfigError(format!(
                "cache.threshold must be positive, got {}",
                self.cache.threshold
            )));
        }
        if self.embeddings.dimension == 0 {
            return Err(AgriSenseError::ConfigError(
                "embeddings.dimension must be greater than zero".to_string(),
            ));
        }
        if self.embeddings.max_text_chars == 0 {
            return Err(AgriSenseError::ConfigError(
                "embeddings.max_text_chars must be greater than zero".to_string(),
            ));
        }
        if self.retrieval.prompt_contexts > self.retrieval.limit {
            return Err(AgriSenseError::ConfigError(format!(
                "retrieval.prompt_contexts ({}) exceeds retrieval.limit ({})",
                self.retrieval.prompt_contexts, self.retrieval.limit
            )));
        }
        url::Url::parse(&self.llm.endpoint).map_err(|e| {
            AgriSenseError::ConfigError(format!("invalid llm.endpoint '{}': {e}", self.llm.endpoint))
        })?;
        if self.embeddings.provider != EmbeddingProvider::Hashing {
            url::Url::parse(&self.embeddings.endpoint).map_err(|e| {
                AgriSenseError::ConfigError(format!(
                    "invalid embeddings.endpoint '{}': {e}",
                    self.embeddings.endpoint
                ))
            })?;
        }
        Ok(())
    }

    /// Check whether a generation API key is available
    pub fn has_llm_key(&self) -> bool {
        !self.llm.api_key.trim().is_empty()
    }

    /// Get the server bind address
    pub fn bind_address(&self) -> String {
        format!("{}:{}", self.server.host, self.server.port)
    }
}
