//! Configuration file parsing for the Router.
//!
//! Loads the bind address, database location and the optional
//! `[delete_after_delay]` expiry section from TOML.

use lapse_janitor::{ExpiryConfig, ExpirySettings, JanitorError};
use serde::Deserialize;
use std::path::Path;
use thiserror::Error;

/// Router configuration error
#[derive(Debug, Error)]
pub enum ConfigError {
    /// Failed to read config file
    #[error("Failed to read config file: {0}")]
    FileRead(#[from] std::io::Error),

    /// Failed to parse TOML
    #[error("Failed to parse config TOML: {0}")]
    TomlParse(#[from] toml::de::Error),

    /// Missing required section
    #[error("You need to configure [{0}] in your config file")]
    MissingSection(String),

    /// Invalid expiry settings
    #[error("Invalid [delete_after_delay] settings: {0}")]
    InvalidValue(String),
}

/// Router configuration loaded from TOML
#[derive(Debug, Clone, Deserialize)]
pub struct RouterConfig {
    /// Bind address (e.g., "127.0.0.1")
    #[serde(default = "default_bind_address")]
    pub bind_address: String,

    /// Bind port (default: 9001)
    #[serde(default = "default_bind_port")]
    pub bind_port: u16,

    /// SQLite database path (default: "lapse.db")
    #[serde(default = "default_database_path")]
    pub database_path: String,

    /// Expiry settings; the sweep is disabled when absent
    #[serde(default)]
    pub delete_after_delay: Option<ExpirySettings>,
}

fn default_bind_address() -> String {
    "127.0.0.1".to_string()
}

fn default_bind_port() -> u16 {
    9001
}

fn default_database_path() -> String {
    "lapse.db".to_string()
}

impl RouterConfig {
    /// Load configuration from a TOML file
    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self, ConfigError> {
        let contents = std::fs::read_to_string(path)?;
        Self::from_toml(&contents)
    }

    /// Parse configuration from a TOML string
    pub fn from_toml(contents: &str) -> Result<Self, ConfigError> {
        Ok(toml::from_str(contents)?)
    }

    /// Create a default configuration for testing
    pub fn default_test_config() -> Self {
        RouterConfig {
            bind_address: default_bind_address(),
            bind_port: default_bind_port(),
            database_path: ":memory:".to_string(),
            delete_after_delay: Some(ExpirySettings {
                delay: Some(86_400),
                ..Default::default()
            }),
        }
    }

    /// Get the full bind address (address:port)
    pub fn bind_addr(&self) -> String {
        format!("{}:{}", self.bind_address, self.bind_port)
    }

    /// Validate the expiry section
    ///
    /// Any error here disables the sweep for the lifetime of the process.
    pub fn expiry(&self) -> Result<ExpiryConfig, ConfigError> {
        let settings = self
            .delete_after_delay
            .clone()
            .ok_or_else(|| ConfigError::MissingSection("delete_after_delay".to_string()))?;

        settings.validate().map_err(|e| match e {
            JanitorError::Config(msg) => ConfigError::InvalidValue(msg),
            other => ConfigError::InvalidValue(other.to_string()),
        })
    }
}
