//! Client configuration, loadable from TOML.
//!
//! ```toml
//! base_url = "http://mis.nyiso.com/public/csv"
//! timeout_secs = 30
//! user_agent = "gridfeed/0.1"
//! ```
//!
//! Every key is optional.

use serde::{Deserialize, Serialize};
use std::path::Path;
use thiserror::Error;

pub const DEFAULT_BASE_URL: &str = "http://mis.nyiso.com/public/csv";

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("read config file {path}: {reason}")]
    Read { path: String, reason: String },

    #[error("parse config TOML: {0}")]
    Parse(#[from] toml::de::Error),

    #[error("build HTTP client: {0}")]
    Client(String),
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ClientConfig {
    /// Root of the public CSV tree, without trailing slash.
    pub base_url: String,
    pub timeout_secs: u64,
    pub user_agent: String,
}

impl Default for ClientConfig {
    fn default() -> Self {
        Self {
            base_url: DEFAULT_BASE_URL.to_string(),
            timeout_secs: 30,
            user_agent: concat!("gridfeed/", env!("CARGO_PKG_VERSION")).to_string(),
        }
    }
}

impl ClientConfig {
    /// Load a config from a TOML file.
    pub fn from_file(path: &Path) -> Result<Self, ConfigError> {
        let content = std::fs::read_to_string(path).map_err(|e| ConfigError::Read {
            path: path.display().to_string(),
            reason: e.to_string(),
        })?;
        Self::from_toml(&content)
    }

    /// Parse a config from a TOML string.
    pub fn from_toml(content: &str) -> Result<Self, ConfigError> {
        let mut config: ClientConfig = toml::from_str(content)?;
        config.base_url = config.base_url.trim_end_matches('/').to_string();
        Ok(config)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn empty_toml_gives_defaults() {
        assert_eq!(ClientConfig::from_toml("").unwrap(), ClientConfig::default());
    }

    #[test]
    fn partial_toml_overrides_only_given_keys() {
        let config = ClientConfig::from_toml("base_url = \"http://mirror.local/csv/\"\n").unwrap();
        assert_eq!(config.base_url, "http://mirror.local/csv");
        assert_eq!(config.timeout_secs, 30);
    }

    #[test]
    fn bad_toml_is_parse_error() {
        assert!(matches!(
            ClientConfig::from_toml("timeout_secs = \"soon\""),
            Err(ConfigError::Parse(_))
        ));
    }

    #[test]
    fn from_file_reads_disk() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("gridfeed.toml");
        std::fs::write(&path, "timeout_secs = 5\n").unwrap();
        assert_eq!(ClientConfig::from_file(&path).unwrap().timeout_secs, 5);
        assert!(matches!(
            ClientConfig::from_file(&dir.path().join("missing.toml")),
            Err(ConfigError::Read { .. })
        ));
    }
}
