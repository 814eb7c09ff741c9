//! Configuration management for tether.
//!
//! Loads configuration from ${TETHER_HOME}/config.toml with sensible defaults.

use std::fs;
use std::path::Path;
use std::time::Duration;

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};

pub mod paths {
    //! Path resolution for tether configuration.
    //!
    //! TETHER_HOME resolution order:
    //! 1. TETHER_HOME environment variable (if set)
    //! 2. ~/.config/tether (default)

    use std::path::PathBuf;

    /// Returns the tether home directory.
    ///
    /// Checks TETHER_HOME env var first, falls back to ~/.config/tether
    pub fn tether_home() -> PathBuf {
        if let Ok(home) = std::env::var("TETHER_HOME") {
            return PathBuf::from(home);
        }

        dirs::home_dir()
            .map(|h| h.join(".config").join("tether"))
            .expect("Could not determine home directory")
    }

    /// Returns the path to the config.toml file.
    pub fn config_path() -> PathBuf {
        tether_home().join("config.toml")
    }
}

/// Main configuration structure.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    /// Base URL of the agent backend.
    pub base_url: String,

    /// Timeout for request/response calls in seconds (0 disables).
    /// Never applied to the streaming channel, which is long-lived.
    pub request_timeout_secs: u32,

    /// Delay before the post-completion workspace refresh, in milliseconds.
    ///
    /// The backend's file-system side effects may lag the completion
    /// signal; the refresh waits this long as a best-effort reconciliation.
    pub refresh_delay_ms: u64,
}

impl Config {
    pub const DEFAULT_BASE_URL: &str = "http://127.0.0.1:8030";
    const DEFAULT_REQUEST_TIMEOUT_SECS: u32 = 30;
    const DEFAULT_REFRESH_DELAY_MS: u64 = 1000;

    /// Loads configuration from the default config path.
    pub fn load() -> Result<Self> {
        Self::load_from(&paths::config_path())
    }

    /// Loads configuration from a specific path.
    /// Returns defaults if file doesn't exist.
    pub fn load_from(path: &Path) -> Result<Self> {
        if path.exists() {
            let contents = fs::read_to_string(path)
                .with_context(|| format!("Failed to read config from {}", path.display()))?;
            toml::from_str(&contents)
                .with_context(|| format!("Failed to parse config from {}", path.display()))
        } else {
            Ok(Config::default())
        }
    }

    /// Resolves the base URL with precedence: env > config.
    ///
    /// # Errors
    /// Returns an error if the winning value is not a well-formed URL.
    pub fn resolve_base_url(&self) -> Result<String> {
        if let Ok(env_url) = std::env::var("TETHER_BASE_URL") {
            let trimmed = env_url.trim();
            if !trimmed.is_empty() {
                validate_url(trimmed)?;
                return Ok(trimmed.to_string());
            }
        }
        validate_url(&self.base_url)?;
        Ok(self.base_url.clone())
    }

    /// Request timeout as a `Duration`; `None` when disabled.
    pub fn request_timeout(&self) -> Option<Duration> {
        (self.request_timeout_secs > 0)
            .then(|| Duration::from_secs(u64::from(self.request_timeout_secs)))
    }

    /// Post-completion workspace refresh delay.
    pub fn refresh_delay(&self) -> Duration {
        Duration::from_millis(self.refresh_delay_ms)
    }
}

impl Default for Config {
    fn default() -> Self {
        Self {
            base_url: Self::DEFAULT_BASE_URL.to_string(),
            request_timeout_secs: Self::DEFAULT_REQUEST_TIMEOUT_SECS,
            refresh_delay_ms: Self::DEFAULT_REFRESH_DELAY_MS,
        }
    }
}

fn validate_url(url: &str) -> Result<()> {
    url::Url::parse(url).with_context(|| format!("Invalid backend base URL: {url}"))?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use std::io::Write;

    use super::*;

    #[test]
    fn missing_file_yields_defaults() {
        let dir = tempfile::tempdir().unwrap();
        let config = Config::load_from(&dir.path().join("config.toml")).unwrap();
        assert_eq!(config.base_url, Config::DEFAULT_BASE_URL);
        assert_eq!(config.refresh_delay_ms, 1000);
    }

    #[test]
    fn partial_file_fills_in_defaults() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("config.toml");
        let mut file = fs::File::create(&path).unwrap();
        writeln!(file, "base_url = \"http://backend.example:9000\"").unwrap();

        let config = Config::load_from(&path).unwrap();
        assert_eq!(config.base_url, "http://backend.example:9000");
        assert_eq!(config.request_timeout_secs, 30);
        assert_eq!(config.refresh_delay_ms, 1000);
    }

    #[test]
    fn zero_timeout_disables_request_timeout() {
        let config = Config {
            request_timeout_secs: 0,
            ..Config::default()
        };
        assert_eq!(config.request_timeout(), None);
    }

    #[test]
    fn malformed_base_url_is_rejected() {
        let config = Config {
            base_url: "not a url".to_string(),
            ..Config::default()
        };
        assert!(config.resolve_base_url().is_err());
    }
}
