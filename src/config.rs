use serde::Deserialize;
use std::path::PathBuf;
use std::time::Duration;

/// Client configuration
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct Config {
    /// Device address as `host:port` (the stock devices listen on port 1280)
    pub addr: String,
    /// Delay before retrying after a failed fetch, in milliseconds
    pub retry_backoff_ms: u64,
    /// Per-request deadline in seconds; must exceed the device's ~10 s
    /// long-poll hold or every quiet poll times out
    pub request_timeout_secs: u64,
    /// Idle timeout of the single pooled connection, in seconds
    pub pool_idle_timeout_secs: u64,
    /// Event channel capacity; the watcher blocks once it is full
    pub event_buffer: usize,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            addr: "localhost:1280".to_string(),
            retry_backoff_ms: 3000,
            request_timeout_secs: 45,
            pool_idle_timeout_secs: 30,
            event_buffer: 1,
        }
    }
}

impl Config {
    /// Load configuration with priority: env vars > config file > defaults
    pub fn load(config_path: Option<PathBuf>) -> Result<Self, ConfigError> {
        // Start with defaults
        let mut config = Self::default();

        // Try to load from config file
        let path = config_path.unwrap_or_else(Self::default_config_path);
        if path.exists() {
            let contents = std::fs::read_to_string(&path)
                .map_err(|e| ConfigError::ReadError(path.clone(), e))?;
            config = serde_yaml::from_str(&contents)
                .map_err(|e| ConfigError::ParseError(path.clone(), e))?;
        }

        // Apply environment variable overrides
        if let Ok(addr) = std::env::var("MOTU_ADDR") {
            config.addr = addr;
        }
        if let Some(ms) = env_number("MOTU_RETRY_BACKOFF_MS") {
            config.retry_backoff_ms = ms;
        }
        if let Some(secs) = env_number("MOTU_REQUEST_TIMEOUT_SECS") {
            config.request_timeout_secs = secs;
        }
        if let Some(n) = env_number("MOTU_EVENT_BUFFER") {
            config.event_buffer = n as usize;
        }

        Ok(config)
    }

    /// Default config file path: ~/.config/motu-avb/config.yaml
    pub fn default_config_path() -> PathBuf {
        dirs::config_dir()
            .unwrap_or_else(|| PathBuf::from("."))
            .join("motu-avb")
            .join("config.yaml")
    }

    pub fn retry_backoff(&self) -> Duration {
        Duration::from_millis(self.retry_backoff_ms)
    }

    pub fn request_timeout(&self) -> Duration {
        Duration::from_secs(self.request_timeout_secs)
    }

    pub fn pool_idle_timeout(&self) -> Duration {
        Duration::from_secs(self.pool_idle_timeout_secs)
    }
}

fn env_number(name: &str) -> Option<u64> {
    std::env::var(name).ok().and_then(|v| v.parse().ok())
}

#[derive(Debug)]
pub enum ConfigError {
    ReadError(PathBuf, std::io::Error),
    ParseError(PathBuf, serde_yaml::Error),
}

impl std::fmt::Display for ConfigError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ConfigError::ReadError(path, e) => {
                write!(f, "Failed to read config file '{}': {}", path.display(), e)
            }
            ConfigError::ParseError(path, e) => {
                write!(f, "Failed to parse config file '{}': {}", path.display(), e)
            }
        }
    }
}

impl std::error::Error for ConfigError {}
