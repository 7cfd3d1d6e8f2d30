//! Application configuration management.
//!
//! This module handles loading and saving the library configuration,
//! which includes the verification endpoint, the optional login-submission
//! endpoint, navigation targets for the route guard, and the persistence
//! mode for the credential store.
//!
//! Configuration is stored at `~/.config/tokengate/config.json`.

use std::path::PathBuf;

use anyhow::Result;
use serde::{Deserialize, Serialize};

/// Application name used for config/storage directory paths
const APP_NAME: &str = "tokengate";

/// Config file name
const CONFIG_FILE: &str = "config.json";

/// Default HTTP request timeout in seconds.
/// 30s allows for slow authority responses while failing fast enough for good UX.
pub const DEFAULT_TIMEOUT_SECS: u64 = 30;

/// Default redirect target for unauthenticated navigation
const DEFAULT_LOGIN_PATH: &str = "/login";

/// Default landing target after a successful login
const DEFAULT_LANDING_PATH: &str = "/";

/// Lifetime policy for the persisted credential.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum Persistence {
    /// Token survives process restarts (stored on disk)
    #[default]
    Durable,
    /// Token lives only as long as this context (memory only)
    Ephemeral,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Config {
    /// Verification endpoint, called with `Authorization: Bearer <token>`
    pub verify_url: String,
    /// Optional login-submission endpoint (form-encoded POST variant)
    pub login_url: Option<String>,
    /// Where the route guard redirects unauthenticated navigation
    pub login_path: String,
    /// Default target after a successful login
    pub landing_path: String,
    /// Credential store lifetime policy
    pub persistence: Persistence,
    /// HTTP request timeout in seconds
    pub timeout_secs: u64,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            verify_url: String::new(),
            login_url: None,
            login_path: DEFAULT_LOGIN_PATH.to_string(),
            landing_path: DEFAULT_LANDING_PATH.to_string(),
            persistence: Persistence::Durable,
            timeout_secs: DEFAULT_TIMEOUT_SECS,
        }
    }
}

impl Config {
    /// Create a config with the given verification endpoint and defaults elsewhere
    pub fn new(verify_url: impl Into<String>) -> Self {
        Self {
            verify_url: verify_url.into(),
            ..Self::default()
        }
    }

    pub fn load() -> Result<Self> {
        let path = Self::config_path()?;
        if path.exists() {
            let contents = std::fs::read_to_string(&path)?;
            Ok(serde_json::from_str(&contents)?)
        } else {
            Ok(Self::default())
        }
    }

    pub fn save(&self) -> Result<()> {
        let path = Self::config_path()?;
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)?;
        }
        let contents = serde_json::to_string_pretty(self)?;
        std::fs::write(path, contents)?;
        Ok(())
    }

    fn config_path() -> Result<PathBuf> {
        let config_dir = dirs::config_dir()
            .ok_or_else(|| anyhow::anyhow!("Could not find config directory"))?;
        Ok(config_dir.join(APP_NAME).join(CONFIG_FILE))
    }

    /// Directory for the durable credential store
    pub fn storage_dir(&self) -> Result<PathBuf> {
        let cache_dir = dirs::cache_dir()
            .ok_or_else(|| anyhow::anyhow!("Could not find cache directory"))?;
        Ok(cache_dir.join(APP_NAME))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_paths() {
        let config = Config::new("http://localhost:3000/v1/uuid");
        assert_eq!(config.login_path, "/login");
        assert_eq!(config.landing_path, "/");
        assert_eq!(config.persistence, Persistence::Durable);
        assert_eq!(config.timeout_secs, DEFAULT_TIMEOUT_SECS);
        assert!(config.login_url.is_none());
    }

    #[test]
    fn test_persistence_serde_round_trip() {
        let config = Config {
            verify_url: "https://auth.example.com/v1/uuid".to_string(),
            login_url: Some("https://auth.example.com/login".to_string()),
            persistence: Persistence::Ephemeral,
            ..Config::default()
        };

        let json = serde_json::to_string(&config).expect("Failed to serialize config");
        assert!(json.contains("\"ephemeral\""));

        let parsed: Config = serde_json::from_str(&json).expect("Failed to parse config");
        assert_eq!(parsed.persistence, Persistence::Ephemeral);
        assert_eq!(parsed.verify_url, config.verify_url);
        assert_eq!(parsed.login_url, config.login_url);
    }
}
