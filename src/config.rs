use serde::{Deserialize, Serialize};
use std::fs;
use std::path::Path;
use std::time::Duration;
use thiserror::Error;

use crate::history::worker::PollerConfig;

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Failed to read config file {path}: {source}")]
    Io {
        path: String,
        source: std::io::Error,
    },

    #[error("Failed to parse config yaml: {0}")]
    Parse(#[from] serde_yaml::Error),

    #[error("Invalid config: {0}")]
    Invalid(String),
}

#[derive(Debug, Serialize, Deserialize, Clone, Default)]
#[serde(default)]
pub struct AppConfig {
    pub log: LogConfig,
    pub bridge: BridgeConfig,
    pub history: HistoryConfig,
}

#[derive(Debug, Serialize, Deserialize, Clone)]
#[serde(default)]
pub struct LogConfig {
    pub log_level: String,
    pub log_dir: String,
    pub log_file: String,
    pub use_json: bool,
    /// hourly | daily | never
    pub rotation: String,
    /// Keep debug output of the HTTP client stack
    pub verbose_http: bool,
}

impl Default for LogConfig {
    fn default() -> Self {
        Self {
            log_level: "info".to_string(),
            log_dir: "./logs".to_string(),
            log_file: "bridge.log".to_string(),
            use_json: false,
            rotation: "daily".to_string(),
            verbose_http: false,
        }
    }
}

#[derive(Debug, Serialize, Deserialize, Clone)]
#[serde(default)]
pub struct BridgeConfig {
    /// Symbol of the ERC-20 wrapping the EVM native asset
    pub wrapped_native_symbol: String,
}

impl Default for BridgeConfig {
    fn default() -> Self {
        Self {
            wrapped_native_symbol: "WETH".to_string(),
        }
    }
}

#[derive(Debug, Serialize, Deserialize, Clone)]
#[serde(default)]
pub struct HistoryConfig {
    pub poll_interval_secs: u64,
    /// Pending transfers older than this are evicted (4 hours)
    pub staleness_window_secs: u64,
    pub page_size: u32,
    pub max_pages: u32,
    pub pending_store_path: String,
    /// Indexer endpoint; without it only the pending set is maintained
    pub feed_url: Option<String>,
    pub accounts: Vec<String>,
}

impl Default for HistoryConfig {
    fn default() -> Self {
        Self {
            poll_interval_secs: 30,
            staleness_window_secs: 14_400,
            page_size: 100,
            max_pages: 5,
            pending_store_path: "./data/pending_transfers.json".to_string(),
            feed_url: None,
            accounts: Vec::new(),
        }
    }
}

impl HistoryConfig {
    pub fn stale_after(&self) -> Duration {
        Duration::from_secs(self.staleness_window_secs)
    }

    pub fn poller_config(&self) -> PollerConfig {
        PollerConfig {
            poll_interval: Duration::from_secs(self.poll_interval_secs),
            stale_after: self.stale_after(),
            page_size: self.page_size,
            max_pages: self.max_pages,
            accounts: self.accounts.clone(),
        }
    }
}

impl AppConfig {
    pub fn from_file(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let path = path.as_ref();
        let content = fs::read_to_string(path).map_err(|source| ConfigError::Io {
            path: path.display().to_string(),
            source,
        })?;
        Self::from_yaml(&content)
    }

    pub fn from_yaml(content: &str) -> Result<Self, ConfigError> {
        let config: AppConfig = serde_yaml::from_str(content)?;
        config.validate()?;
        Ok(config)
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.history.poll_interval_secs == 0 {
            return Err(ConfigError::Invalid(
                "history.poll_interval_secs must be > 0".into(),
            ));
        }
        if self.history.staleness_window_secs == 0 {
            return Err(ConfigError::Invalid(
                "history.staleness_window_secs must be > 0".into(),
            ));
        }
        if self.history.page_size == 0 {
            return Err(ConfigError::Invalid("history.page_size must be > 0".into()));
        }
        if self.history.max_pages == 0 {
            return Err(ConfigError::Invalid("history.max_pages must be > 0".into()));
        }
        if self.bridge.wrapped_native_symbol.trim().is_empty() {
            return Err(ConfigError::Invalid(
                "bridge.wrapped_native_symbol must not be empty".into(),
            ));
        }
        Ok(())
    }
}
