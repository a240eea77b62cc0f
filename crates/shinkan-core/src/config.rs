//! Configuration for shinkan-core
//!
//! Catalog endpoint and credential, request pacing, the rolling date windows,
//! and where the collections live on disk.

use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Rakuten Books search endpoint
pub const DEFAULT_ENDPOINT: &str =
    "https://app.rakuten.co.jp/services/api/BooksBook/Search/20170404";

/// Environment variable that overrides `catalog.application_id`
pub const APPLICATION_ID_ENV: &str = "RAKUTEN_APP_ID";

/// Upper bound the catalog accepts for `hits`
const MAX_HITS: u32 = 30;

/// Top-level configuration
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ShinkanConfig {
    /// Catalog search settings
    pub catalog: CatalogConfig,
    /// Rolling date windows
    pub retention: RetentionConfig,
    /// Persistence settings
    pub storage: StorageConfig,
}

/// Catalog search settings
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct CatalogConfig {
    /// Search endpoint URL
    pub endpoint: String,
    /// Application credential sent as `applicationId`
    pub application_id: String,
    /// Page size per keyword filter
    pub hits: u32,
    /// Pause between consecutive keyword filters, in milliseconds
    pub request_delay_ms: u64,
    /// Per-request timeout in seconds
    pub timeout_secs: u64,
    /// User-Agent header
    pub user_agent: String,
}

impl Default for CatalogConfig {
    fn default() -> Self {
        Self {
            endpoint: DEFAULT_ENDPOINT.to_string(),
            application_id: String::new(),
            hits: 5,
            request_delay_ms: 1000,
            timeout_secs: 30,
            user_agent: concat!("shinkan/", env!("CARGO_PKG_VERSION")).to_string(),
        }
    }
}

/// Rolling date windows, in calendar months
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct RetentionConfig {
    /// Fetched books released before `today - recency_window_months` are ignored
    pub recency_window_months: u32,
    /// Tracked books released on or before `today - retention_window_months` are pruned
    pub retention_window_months: u32,
}

impl Default for RetentionConfig {
    fn default() -> Self {
        Self {
            recency_window_months: 3,
            retention_window_months: 3,
        }
    }
}

/// Persistence settings
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct StorageConfig {
    /// Directory holding one JSON file per collection
    pub data_dir: Option<PathBuf>,
}

impl StorageConfig {
    /// Configured directory, or `<platform data dir>/shinkan`
    pub fn resolved_data_dir(&self) -> Option<PathBuf> {
        self.data_dir
            .clone()
            .or_else(|| dirs::data_dir().map(|d| d.join("shinkan")))
    }
}

impl ShinkanConfig {
    /// Create a new configuration with defaults
    pub fn new() -> Self {
        Self::default()
    }

    /// Load configuration from a TOML string
    pub fn from_toml(toml_str: &str) -> Result<Self, ConfigError> {
        toml::from_str(toml_str).map_err(|e| ConfigError::Parse(e.to_string()))
    }

    /// Serialize configuration to TOML
    pub fn to_toml(&self) -> Result<String, ConfigError> {
        toml::to_string_pretty(self).map_err(|e| ConfigError::Parse(e.to_string()))
    }

    /// Load configuration from a JSON string
    pub fn from_json(json_str: &str) -> Result<Self, ConfigError> {
        serde_json::from_str(json_str).map_err(|e| ConfigError::Parse(e.to_string()))
    }

    /// Serialize configuration to JSON
    pub fn to_json(&self) -> Result<String, ConfigError> {
        serde_json::to_string_pretty(self).map_err(|e| ConfigError::Parse(e.to_string()))
    }

    /// Read a TOML file, apply environment overrides, and validate
    pub fn load(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let path = path.as_ref();
        let content = std::fs::read_to_string(path)
            .map_err(|e| ConfigError::Io(format!("{}: {}", path.display(), e)))?;
        let config = Self::from_toml(&content)?.with_env_overrides();
        config.validate()?;
        Ok(config)
    }

    /// Apply `RAKUTEN_APP_ID` if it is set and non-empty
    pub fn with_env_overrides(mut self) -> Self {
        if let Ok(app_id) = std::env::var(APPLICATION_ID_ENV) {
            if !app_id.trim().is_empty() {
                self.catalog.application_id = app_id;
            }
        }
        self
    }

    /// Validate configuration values
    pub fn validate(&self) -> Result<(), ConfigError> {
        url::Url::parse(&self.catalog.endpoint)
            .map_err(|e| ConfigError::InvalidEndpoint(format!("{}: {}", self.catalog.endpoint, e)))?;

        if self.catalog.hits == 0 || self.catalog.hits > MAX_HITS {
            return Err(ConfigError::OutOfRange(format!(
                "hits must be between 1 and {}",
                MAX_HITS
            )));
        }

        if self.catalog.request_delay_ms == 0 {
            return Err(ConfigError::OutOfRange(
                "request_delay_ms must be positive".to_string(),
            ));
        }

        if self.catalog.timeout_secs == 0 {
            return Err(ConfigError::OutOfRange(
                "timeout_secs must be positive".to_string(),
            ));
        }

        if self.retention.recency_window_months == 0 || self.retention.retention_window_months == 0
        {
            return Err(ConfigError::OutOfRange(
                "retention windows must be at least one month".to_string(),
            ));
        }

        Ok(())
    }
}

/// Configuration error
#[derive(Debug, Clone, Error)]
pub enum ConfigError {
    /// Config file could not be read
    #[error("IO error: {0}")]
    Io(String),
    /// Config text is not valid TOML/JSON for this schema
    #[error("Parse error: {0}")]
    Parse(String),
    /// Endpoint is not a URL
    #[error("Invalid endpoint: {0}")]
    InvalidEndpoint(String),
    /// Value is out of valid range
    #[error("Value out of range: {0}")]
    OutOfRange(String),
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config() {
        let config = ShinkanConfig::default();
        assert!(config.validate().is_ok());
        assert_eq!(config.catalog.hits, 5);
        assert_eq!(config.catalog.request_delay_ms, 1000);
        assert_eq!(config.retention.recency_window_months, 3);
    }

    #[test]
    fn test_partial_toml_uses_defaults() {
        let config = ShinkanConfig::from_toml(
            r#"
            [catalog]
            application_id = "abc123"

            [storage]
            data_dir = "/tmp/shinkan"
            "#,
        )
        .unwrap();

        assert_eq!(config.catalog.application_id, "abc123");
        assert_eq!(config.catalog.endpoint, DEFAULT_ENDPOINT);
        assert_eq!(config.retention.retention_window_months, 3);
        assert_eq!(
            config.storage.resolved_data_dir(),
            Some(PathBuf::from("/tmp/shinkan"))
        );
    }

    #[test]
    fn test_json_serialization() {
        let config = ShinkanConfig::default();
        let json = config.to_json().unwrap();
        let parsed = ShinkanConfig::from_json(&json).unwrap();
        assert_eq!(config, parsed);
    }

    #[test]
    fn test_invalid_hits() {
        let mut config = ShinkanConfig::default();
        config.catalog.hits = 0;
        assert!(matches!(config.validate(), Err(ConfigError::OutOfRange(_))));

        config.catalog.hits = 31;
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_invalid_endpoint() {
        let mut config = ShinkanConfig::default();
        config.catalog.endpoint = "not a url".to_string();
        assert!(matches!(
            config.validate(),
            Err(ConfigError::InvalidEndpoint(_))
        ));
    }

    #[test]
    fn test_zero_window_rejected() {
        let mut config = ShinkanConfig::default();
        config.retention.retention_window_months = 0;
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_load_from_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("shinkan.toml");
        std::fs::write(&path, "[catalog]\nhits = 10\n").unwrap();

        let config = ShinkanConfig::load(&path).unwrap();
        assert_eq!(config.catalog.hits, 10);
    }

    #[test]
    fn test_load_missing_file() {
        let result = ShinkanConfig::load("/nonexistent/shinkan.toml");
        assert!(matches!(result, Err(ConfigError::Io(_))));
    }
}
