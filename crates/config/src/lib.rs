//! Configuration loading, validation, and management for crabdesk.
//!
//! Loads configuration from `~/.crabdesk/config.toml` with environment
//! variable overrides. Validates all settings at startup.

use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use std::time::Duration;

/// The root configuration structure.
///
/// Maps directly to `~/.crabdesk/config.toml`.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct AppConfig {
    /// Inference backend settings
    #[serde(default)]
    pub inference: InferenceConfig,

    /// Classification engine weights
    #[serde(default)]
    pub classifier: ClassifierConfig,

    /// Agent workflow settings
    #[serde(default)]
    pub agent: AgentConfig,

    /// Knowledge index settings
    #[serde(default)]
    pub knowledge: KnowledgeConfig,

    /// Tool host connection settings
    #[serde(default)]
    pub host: HostConfig,
}

/// Settings for the external inference backend.
#[derive(Clone, Serialize, Deserialize)]
pub struct InferenceConfig {
    /// Chat-completions endpoint base URL
    #[serde(default = "default_endpoint")]
    pub endpoint: String,

    /// Model identifier
    #[serde(default = "default_model")]
    pub model: String,

    /// API key; also read from `CRABDESK_API_KEY` / `HF_TOKEN`
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub api_key: Option<String>,

    /// HTTP timeout per inference request
    #[serde(default = "default_timeout_secs")]
    pub timeout_secs: u64,

    /// Maximum tokens per completion
    #[serde(default = "default_max_tokens")]
    pub max_tokens: u32,

    /// Sampling temperature
    #[serde(default = "default_temperature")]
    pub temperature: f32,
}

fn default_endpoint() -> String {
    "https://router.huggingface.co/v1".into()
}
fn default_model() -> String {
    "meta-llama/Llama-3.2-3B-Instruct".into()
}
fn default_timeout_secs() -> u64 {
    30
}
fn default_max_tokens() -> u32 {
    500
}
fn default_temperature() -> f32 {
    0.7
}

impl Default for InferenceConfig {
    fn default() -> Self {
        Self {
            endpoint: default_endpoint(),
            model: default_model(),
            api_key: None,
            timeout_secs: default_timeout_secs(),
            max_tokens: default_max_tokens(),
            temperature: default_temperature(),
        }
    }
}

impl InferenceConfig {
    pub fn timeout(&self) -> Duration {
        Duration::from_secs(self.timeout_secs)
    }
}

/// Redact a secret string for Debug output.
fn redact(s: &Option<String>) -> &'static str {
    match s {
        Some(_) => "[REDACTED]",
        None => "None",
    }
}

impl std::fmt::Debug for InferenceConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("InferenceConfig")
            .field("endpoint", &self.endpoint)
            .field("model", &self.model)
            .field("api_key", &redact(&self.api_key))
            .field("timeout_secs", &self.timeout_secs)
            .field("max_tokens", &self.max_tokens)
            .field("temperature", &self.temperature)
            .finish()
    }
}

/// Scoring weights for the keyword/example classifier.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ClassifierConfig {
    #[serde(default = "default_keyword_weight")]
    pub keyword_weight: f32,

    #[serde(default = "default_example_weight")]
    pub example_weight: f32,
}

fn default_keyword_weight() -> f32 {
    1.0
}
fn default_example_weight() -> f32 {
    1.0
}

impl Default for ClassifierConfig {
    fn default() -> Self {
        Self {
            keyword_weight: default_keyword_weight(),
            example_weight: default_example_weight(),
        }
    }
}

/// Workflow tuning for the orchestration agent.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AgentConfig {
    /// Classification confidence below this routes knowledge-only
    #[serde(default = "default_support_threshold")]
    pub support_threshold: f32,

    /// Knowledge passages retrieved per query
    #[serde(default = "default_top_k")]
    pub top_k: usize,
}

fn default_support_threshold() -> f32 {
    0.1
}
fn default_top_k() -> usize {
    3
}

impl Default for AgentConfig {
    fn default() -> Self {
        Self {
            support_threshold: default_support_threshold(),
            top_k: default_top_k(),
        }
    }
}

/// Chunking parameters and optional external document directory.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct KnowledgeConfig {
    /// Chunk size in words
    #[serde(default = "default_chunk_size")]
    pub chunk_size: usize,

    /// Overlap between consecutive chunks, in words
    #[serde(default = "default_chunk_overlap")]
    pub chunk_overlap: usize,

    /// Directory of .md/.txt documents; built-in corpus when unset
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub docs_dir: Option<PathBuf>,
}

fn default_chunk_size() -> usize {
    80
}
fn default_chunk_overlap() -> usize {
    16
}

impl Default for KnowledgeConfig {
    fn default() -> Self {
        Self {
            chunk_size: default_chunk_size(),
            chunk_overlap: default_chunk_overlap(),
            docs_dir: None,
        }
    }
}

/// Timeouts for the tool host connection.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct HostConfig {
    /// Bound on the initialize handshake
    #[serde(default = "default_startup_timeout_secs")]
    pub startup_timeout_secs: u64,

    /// Bound on each tool call
    #[serde(default = "default_request_timeout_secs")]
    pub request_timeout_secs: u64,
}

fn default_startup_timeout_secs() -> u64 {
    10
}
fn default_request_timeout_secs() -> u64 {
    30
}

impl Default for HostConfig {
    fn default() -> Self {
        Self {
            startup_timeout_secs: default_startup_timeout_secs(),
            request_timeout_secs: default_request_timeout_secs(),
        }
    }
}

impl HostConfig {
    pub fn startup_timeout(&self) -> Duration {
        Duration::from_secs(self.startup_timeout_secs)
    }

    pub fn request_timeout(&self) -> Duration {
        Duration::from_secs(self.request_timeout_secs)
    }
}

impl AppConfig {
    /// Load configuration from the default path (~/.crabdesk/config.toml).
    ///
    /// Also checks environment variables for the API key:
    /// - `CRABDESK_API_KEY` (highest priority)
    /// - `HF_TOKEN`
    pub fn load() -> Result<Self, ConfigError> {
        let config_path = Self::config_dir().join("config.toml");
        let mut config = Self::load_from(&config_path)?;

        // Environment variable overrides (highest priority)
        if config.inference.api_key.is_none() {
            config.inference.api_key = std::env::var("CRABDESK_API_KEY")
                .ok()
                .or_else(|| std::env::var("HF_TOKEN").ok());
        }

        // Allow env var to override the model
        if let Ok(model) = std::env::var("CRABDESK_MODEL") {
            config.inference.model = model;
        }

        Ok(config)
    }

    /// Load configuration from a specific file path.
    pub fn load_from(path: &Path) -> Result<Self, ConfigError> {
        if !path.exists() {
            tracing::info!("No config file found at {}, using defaults", path.display());
            return Ok(Self::default());
        }

        let content = std::fs::read_to_string(path).map_err(|e| ConfigError::ReadError {
            path: path.to_path_buf(),
            reason: e.to_string(),
        })?;

        let config: Self = toml::from_str(&content).map_err(|e| ConfigError::ParseError {
            path: path.to_path_buf(),
            reason: e.to_string(),
        })?;

        config.validate()?;
        Ok(config)
    }

    /// Get the configuration directory path.
    pub fn config_dir() -> PathBuf {
        dirs_home().join(".crabdesk")
    }

    /// Validate the configuration.
    fn validate(&self) -> Result<(), ConfigError> {
        if self.inference.temperature < 0.0 || self.inference.temperature > 2.0 {
            return Err(ConfigError::ValidationError(
                "inference.temperature must be between 0.0 and 2.0".into(),
            ));
        }

        if self.classifier.keyword_weight + self.classifier.example_weight <= 0.0 {
            return Err(ConfigError::ValidationError(
                "keyword_weight + example_weight must be > 0".into(),
            ));
        }

        if !(0.0..=1.0).contains(&self.agent.support_threshold) {
            return Err(ConfigError::ValidationError(
                "agent.support_threshold must be between 0.0 and 1.0".into(),
            ));
        }

        if self.knowledge.chunk_size == 0 {
            return Err(ConfigError::ValidationError(
                "knowledge.chunk_size must be > 0".into(),
            ));
        }

        if self.knowledge.chunk_overlap >= self.knowledge.chunk_size {
            return Err(ConfigError::ValidationError(
                "knowledge.chunk_overlap must be smaller than chunk_size".into(),
            ));
        }

        Ok(())
    }

    /// Check if an API key is available (from config or environment).
    pub fn has_api_key(&self) -> bool {
        self.inference.api_key.is_some()
    }

    /// Generate a default config TOML string (for `onboard` command).
    pub fn default_toml() -> String {
        let config = Self::default();
        toml::to_string_pretty(&config).unwrap_or_default()
    }
}

/// Get the user's home directory.
fn dirs_home() -> PathBuf {
    #[cfg(target_os = "windows")]
    {
        std::env::var("USERPROFILE")
            .map(PathBuf::from)
            .unwrap_or_else(|_| PathBuf::from("C:\\Users\\Default"))
    }
    #[cfg(not(target_os = "windows"))]
    {
        std::env::var("HOME")
            .map(PathBuf::from)
            .unwrap_or_else(|_| PathBuf::from("/tmp"))
    }
}

/// Configuration errors.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("Failed to read config file at {path}: {reason}")]
    ReadError { path: PathBuf, reason: String },

    #[error("Failed to parse config file at {path}: {reason}")]
    ParseError { path: PathBuf, reason: String },

    #[error("Configuration validation failed: {0}")]
    ValidationError(String),
}
