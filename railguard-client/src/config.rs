//! Configuration loading for the RailGuard client.
//!
//! All fields are required. Deployment targets (local vs. remote host)
//! differ only in the two endpoint URLs, so switching targets is a
//! config-file change, never a code change.

use serde::Deserialize;
use std::path::{Path, PathBuf};
use std::time::Duration;

#[derive(Debug, Clone, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct ClientConfig {
    /// Telemetry endpoint, e.g. `ws://localhost:8000/ws/updates`.
    pub updates_url: String,
    /// Conversational endpoint, e.g. `ws://localhost:8000/ws/chat`.
    pub chat_url: String,
    /// Fixed delay between reconnection attempts, applied identically
    /// to both channels.
    pub reconnect_delay_ms: u64,
}

#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("Missing configuration file path (use --config or RAILGUARD_CONFIG)")]
    MissingConfigPath,
    #[error("Failed to read config file: {0}")]
    Io(#[from] std::io::Error),
    #[error("Failed to parse config TOML: {0}")]
    Parse(#[from] toml::de::Error),
    #[error("Invalid config value for {field}: {reason}")]
    InvalidValue { field: &'static str, reason: String },
}

impl ClientConfig {
    pub fn load() -> Result<Self, ConfigError> {
        let path = config_path_from_args().or_else(config_path_from_env);
        let path = path.ok_or(ConfigError::MissingConfigPath)?;
        let config = Self::from_path(&path)?;
        config.validate()?;
        Ok(config)
    }

    pub fn from_path(path: &Path) -> Result<Self, ConfigError> {
        let contents = std::fs::read_to_string(path)?;
        let config: ClientConfig = toml::from_str(&contents)?;
        Ok(config)
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        validate_endpoint("updates_url", &self.updates_url)?;
        validate_endpoint("chat_url", &self.chat_url)?;
        if self.reconnect_delay_ms == 0 {
            return Err(ConfigError::InvalidValue {
                field: "reconnect_delay_ms",
                reason: "must be > 0".to_string(),
            });
        }
        Ok(())
    }

    pub fn reconnect_delay(&self) -> Duration {
        Duration::from_millis(self.reconnect_delay_ms)
    }
}

fn validate_endpoint(field: &'static str, url: &str) -> Result<(), ConfigError> {
    if url.trim().is_empty() {
        return Err(ConfigError::InvalidValue {
            field,
            reason: "must not be empty".to_string(),
        });
    }
    if !url.starts_with("ws://") && !url.starts_with("wss://") {
        return Err(ConfigError::InvalidValue {
            field,
            reason: "must be a ws:// or wss:// URL".to_string(),
        });
    }
    Ok(())
}

fn config_path_from_env() -> Option<PathBuf> {
    std::env::var("RAILGUARD_CONFIG").ok().map(PathBuf::from)
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
