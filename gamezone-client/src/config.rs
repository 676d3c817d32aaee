//! Configuration loading for the GameZone client.
//!
//! Read from a TOML file named by `--config <path>` or `GAMEZONE_CONFIG`.
//! Every field has a default matching the storefront's production values, so
//! a config file only needs to name what it overrides.

use gamezone_core::RetryConfig;
use serde::Deserialize;
use std::path::{Path, PathBuf};
use std::time::Duration;

pub const DEFAULT_API_BASE_URL: &str = "http://localhost:8080";
pub const DEFAULT_REQUEST_TIMEOUT_MS: u64 = 10_000;

#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(deny_unknown_fields, default)]
pub struct ClientConfig {
    pub api_base_url: String,
    pub request_timeout_ms: u64,
    pub retry: RetryConfig,
    /// File holding the persisted identity and credential.
    pub session_path: PathBuf,
    pub cache: CacheSettings,
    pub log_format: LogFormat,
}

#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(deny_unknown_fields, default)]
pub struct CacheSettings {
    pub max_entries: usize,
    pub default_stale_after_ms: u64,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum LogFormat {
    Pretty,
    Json,
}

impl Default for ClientConfig {
    fn default() -> Self {
        Self {
            api_base_url: DEFAULT_API_BASE_URL.to_string(),
            request_timeout_ms: DEFAULT_REQUEST_TIMEOUT_MS,
            retry: RetryConfig::default(),
            session_path: PathBuf::from(".gamezone/session.json"),
            cache: CacheSettings::default(),
            log_format: LogFormat::Pretty,
        }
    }
}

impl Default for CacheSettings {
    fn default() -> Self {
        Self {
            max_entries: 512,
            default_stale_after_ms: 0,
        }
    }
}

#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("Failed to read config file: {0}")]
    Io(#[from] std::io::Error),
    #[error("Failed to parse config TOML: {0}")]
    Parse(#[from] toml::de::Error),
    #[error("Invalid config value for {field}: {reason}")]
    InvalidValue { field: &'static str, reason: String },
}

impl ClientConfig {
    /// Load from `--config` / `GAMEZONE_CONFIG`, falling back to defaults
    /// when neither is given.
    pub fn load() -> Result<Self, ConfigError> {
        let config = match config_path_from_args().or_else(config_path_from_env) {
            Some(path) => Self::from_path(&path)?,
            None => Self::default(),
        };
        config.validate()?;
        Ok(config)
    }

    pub fn from_path(path: &Path) -> Result<Self, ConfigError> {
        let contents = std::fs::read_to_string(path)?;
        Self::from_toml(&contents)
    }

    pub fn from_toml(contents: &str) -> Result<Self, ConfigError> {
        Ok(toml::from_str(contents)?)
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        let base = self.api_base_url.trim();
        if base.is_empty() {
            return Err(ConfigError::InvalidValue {
                field: "api_base_url",
                reason: "must not be empty".to_string(),
            });
        }
        if !(base.starts_with("http://") || base.starts_with("https://")) {
            return Err(ConfigError::InvalidValue {
                field: "api_base_url",
                reason: "must start with http:// or https://".to_string(),
            });
        }
        if self.request_timeout_ms == 0 {
            return Err(ConfigError::InvalidValue {
                field: "request_timeout_ms",
                reason: "must be > 0".to_string(),
            });
        }
        if self.retry.initial_ms == 0 {
            return Err(ConfigError::InvalidValue {
                field: "retry.initial_ms",
                reason: "must be > 0".to_string(),
            });
        }
        if self.retry.max_ms < self.retry.initial_ms {
            return Err(ConfigError::InvalidValue {
                field: "retry.max_ms",
                reason: "must be >= initial_ms".to_string(),
            });
        }
        if self.retry.multiplier < 1.0 {
            return Err(ConfigError::InvalidValue {
                field: "retry.multiplier",
                reason: "must be >= 1.0".to_string(),
            });
        }
        if self.session_path.as_os_str().is_empty() {
            return Err(ConfigError::InvalidValue {
                field: "session_path",
                reason: "must not be empty".to_string(),
            });
        }
        if self.cache.max_entries == 0 {
            return Err(ConfigError::InvalidValue {
                field: "cache.max_entries",
                reason: "must be > 0".to_string(),
            });
        }
        Ok(())
    }

    pub fn request_timeout(&self) -> Duration {
        Duration::from_millis(self.request_timeout_ms)
    }

    pub fn base_url(&self) -> &str {
        self.api_base_url.trim().trim_end_matches('/')
    }
}

fn config_path_from_env() -> Option<PathBuf> {
    std::env::var("GAMEZONE_CONFIG").ok().map(PathBuf::from)
}

fn config_path_from_args() -> Option<PathBuf> {
    let mut args = std::env::args().skip(1);
    while let Some(arg) = args.next() {
        if arg == "--config" {
            return args.next().map(PathBuf::from);
        }
    }
    None
}
