//! Client configuration
//!
//! Settings come from built-in defaults, then an optional JSON file, then
//! environment variables:
//!
//! | Variable | Field |
//! |----------|-------|
//! | `SCHOOL_PORTAL_API_URL` | `api_url` |
//! | `SCHOOL_PORTAL_DATA_DIR` | `data_dir` |
//! | `SCHOOL_PORTAL_LOG` | `log_filter` |

use portal_client::types::Platform;
use portal_client::ApiClientConfig;
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use std::time::Duration;
use storage::KvConfig;
use thiserror::Error;

/// Environment variable overriding [`PortalConfig::api_url`]
pub const ENV_API_URL: &str = "SCHOOL_PORTAL_API_URL";
/// Environment variable overriding [`PortalConfig::data_dir`]
pub const ENV_DATA_DIR: &str = "SCHOOL_PORTAL_DATA_DIR";
/// Environment variable overriding [`PortalConfig::log_filter`]
pub const ENV_LOG: &str = "SCHOOL_PORTAL_LOG";

/// Configuration errors
#[derive(Debug, Error)]
pub enum ConfigError {
    /// The config file could not be read
    #[error("Failed to read config file {path}: {source}")]
    Io {
        /// File that was read
        path: PathBuf,
        /// Underlying error
        #[source]
        source: std::io::Error,
    },

    /// The config file is not valid JSON for this schema
    #[error("Failed to parse config file: {0}")]
    Parse(#[from] serde_json::Error),

    /// A value is out of range
    #[error("Invalid configuration: {0}")]
    Invalid(String),
}

/// Result type for configuration
pub type Result<T> = std::result::Result<T, ConfigError>;

/// Client configuration
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct PortalConfig {
    /// Base URL of the portal API
    pub api_url: String,
    /// Request timeout in seconds
    pub timeout_secs: u64,
    /// Directory holding the local store
    pub data_dir: PathBuf,
    /// `tracing` filter directive used when `RUST_LOG` is unset
    pub log_filter: String,
    /// Platform reported during push registration
    pub platform: Platform,
}

impl Default for PortalConfig {
    fn default() -> Self {
        Self {
            api_url: ApiClientConfig::default().base_url,
            timeout_secs: 30,
            data_dir: PathBuf::from("school_portal_data"),
            log_filter: "info".to_string(),
            platform: Platform::current(),
        }
    }
}

impl PortalConfig {
    /// Defaults, then `path` if given, then the environment
    pub fn load(path: Option<&Path>) -> Result<Self> {
        let config = match path {
            Some(path) => Self::from_file(path)?,
            None => Self::default(),
        };
        let config = config.with_env_overrides(|key| std::env::var(key).ok());
        config.validate()?;
        Ok(config)
    }

    /// Read a JSON file; missing fields take their defaults
    pub fn from_file(path: &Path) -> Result<Self> {
        let raw = std::fs::read_to_string(path).map_err(|source| ConfigError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        Self::from_json(&raw)
    }

    /// Parse JSON; missing fields take their defaults
    pub fn from_json(raw: &str) -> Result<Self> {
        Ok(serde_json::from_str(raw)?)
    }

    /// Apply overrides looked up through `lookup`; empty values are ignored
    pub fn with_env_overrides<F>(mut self, lookup: F) -> Self
    where
        F: Fn(&str) -> Option<String>,
    {
        let lookup = |key: &str| lookup(key).filter(|v| !v.trim().is_empty());

        if let Some(url) = lookup(ENV_API_URL) {
            self.api_url = url;
        }
        if let Some(dir) = lookup(ENV_DATA_DIR) {
            self.data_dir = PathBuf::from(dir);
        }
        if let Some(filter) = lookup(ENV_LOG) {
            self.log_filter = filter;
        }
        self
    }

    /// Set the API base URL
    pub fn with_api_url(mut self, url: impl Into<String>) -> Self {
        self.api_url = url.into();
        self
    }

    /// Set the data directory
    pub fn with_data_dir(mut self, dir: impl Into<PathBuf>) -> Self {
        self.data_dir = dir.into();
        self
    }

    /// Check value ranges
    pub fn validate(&self) -> Result<()> {
        let url = self.api_url.trim();
        if !(url.starts_with("http://") || url.starts_with("https://")) {
            return Err(ConfigError::Invalid(format!(
                "api_url must be an http(s) URL, got '{}'",
                self.api_url
            )));
        }
        if self.timeout_secs == 0 {
            return Err(ConfigError::Invalid("timeout_secs must be positive".to_string()));
        }
        Ok(())
    }

    /// HTTP client settings
    pub fn api_client_config(&self) -> ApiClientConfig {
        ApiClientConfig::new(self.api_url.trim_end_matches('/'))
            .with_timeout(Duration::from_secs(self.timeout_secs))
    }

    /// Local store settings
    pub fn kv_config(&self) -> KvConfig {
        KvConfig::new(self.data_dir.join("portal.db").to_string_lossy())
    }
}
