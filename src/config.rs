use std::path::{Path, PathBuf};

use figment::providers::{Env, Format, Serialized, Toml};
use figment::Figment;
use serde::{Deserialize, Serialize};

/// Placeholder credential shipped in sample configs; never sent to a backend.
pub const DEMO_API_KEY: &str = "demo-key";

/// Prefix for environment overrides, e.g. `CONFLICT_COACH_AI__MODEL`.
pub const ENV_PREFIX: &str = "CONFLICT_COACH_";

/// Top-level application configuration.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct AppConfig {
    pub ai: AiConfig,
    pub cache: CacheConfig,
    pub logging: LoggingConfig,
}

/// Model backend configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct AiConfig {
    /// Allow the engine to use the live model backend at all.
    pub use_live_backend: bool,
    /// Backend credential (bearer token).
    pub api_key: String,
    pub model: String,
    /// OpenAI-compatible API root, without the trailing `/chat/completions`.
    pub base_url: String,
    /// Per-attempt timeout for every backend call.
    pub request_timeout_secs: u64,
    /// Retries after the first failed attempt. Only retryable errors are retried.
    pub max_retries: u32,
    pub probe_max_tokens: u32,
    pub analysis_max_tokens: u32,
    pub dialogue_max_tokens: u32,
}

/// Conversation cache configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct CacheConfig {
    /// Maximum number of cached sessions before LRU eviction.
    pub capacity: usize,
    /// Time-to-live for a cached session. 0 disables expiry.
    pub ttl_seconds: u64,
}

/// Logging configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct LoggingConfig {
    /// Fallback filter directive when `RUST_LOG` is unset.
    pub level: String,
    /// Directory for the rolling JSON log file. No file layer when unset.
    pub log_dir: Option<PathBuf>,
    pub json_file: bool,
}

/// Configuration loading failure.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("invalid configuration: {0}")]
    Invalid(#[from] Box<figment::Error>),
}

impl Default for AiConfig {
    fn default() -> Self {
        Self {
            use_live_backend: false,
            api_key: DEMO_API_KEY.to_string(),
            model: "gpt-3.5-turbo".to_string(),
            base_url: "https://api.openai.com/v1".to_string(),
            request_timeout_secs: 5,
            max_retries: 1,
            probe_max_tokens: 10,
            analysis_max_tokens: 1024,
            dialogue_max_tokens: 150,
        }
    }
}

impl AiConfig {
    /// Whether the configuration permits a live backend at all.
    ///
    /// A missing or placeholder credential disables live mode even when
    /// `use_live_backend` is set.
    pub fn live_enabled(&self) -> bool {
        self.use_live_backend && !self.api_key.trim().is_empty() && self.api_key != DEMO_API_KEY
    }

    pub fn request_timeout(&self) -> std::time::Duration {
        std::time::Duration::from_secs(self.request_timeout_secs.max(1))
    }
}

impl Default for CacheConfig {
    fn default() -> Self {
        Self {
            capacity: 256,
            ttl_seconds: 3600,
        }
    }
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: "info".to_string(),
            log_dir: None,
            json_file: true,
        }
    }
}

impl AppConfig {
    /// Load configuration from `~/.config/conflict-coach/config.toml` plus
    /// environment overrides. Returns `Default` if extraction fails.
    pub fn load() -> Self {
        let config_path = Self::config_path();
        match Self::load_from(&config_path) {
            Ok(config) => {
                log::info!("Loaded config (file: {})", config_path.display());
                config
            }
            Err(e) => {
                log::warn!(
                    "Failed to load config at {}: {e} - using defaults",
                    config_path.display()
                );
                Self::default()
            }
        }
    }

    /// Load configuration layered as defaults, then `path` (if it exists),
    /// then `CONFLICT_COACH_*` variables, then `OPENAI_API_KEY`.
    pub fn load_from(path: &Path) -> Result<Self, ConfigError> {
        Self::figment(path)
            .merge(Env::prefixed(ENV_PREFIX).split("__"))
            .merge(Env::raw().only(&["OPENAI_API_KEY"]).map(|_| "ai.api_key".into()))
            .extract()
            .map_err(|e| ConfigError::Invalid(Box::new(e)))
    }

    /// Load from a file only, ignoring the environment.
    pub fn load_file(path: &Path) -> Result<Self, ConfigError> {
        Self::figment(path)
            .extract()
            .map_err(|e| ConfigError::Invalid(Box::new(e)))
    }

    fn figment(path: &Path) -> Figment {
        Figment::from(Serialized::defaults(Self::default())).merge(Toml::file(path))
    }

    fn config_path() -> PathBuf {
        dirs::config_dir()
            .map(|d| d.join("conflict-coach").join("config.toml"))
            .unwrap_or_else(|| PathBuf::from("config.toml"))
    }
}
