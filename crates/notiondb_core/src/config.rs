//! Collection sync configuration.
//!
//! # Responsibility
//! - Parse and validate the JSON settings a driving program supplies.
//!
//! # Invariants
//! - A loaded config always has a non-empty collection id and key field.
//! - `page_size` stays within the remote listing limit.
//! - `log_level` is one the logging bootstrap accepts.
//! - Credentials are never part of this config.

use crate::logging::{default_log_level, normalize_level};
use serde::Deserialize;
use std::error::Error;
use std::fmt::{Display, Formatter};
use std::path::{Path, PathBuf};

const DEFAULT_KEY_FIELD: &str = "ID";
const MAX_PAGE_SIZE: usize = 100;
const DEFAULT_LOG_DIR_NAME: &str = "notiondb-logs";

#[derive(Debug)]
pub enum ConfigError {
    Io(std::io::Error),
    Parse(serde_json::Error),
    Invalid(String),
}

impl Display for ConfigError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Io(err) => write!(f, "failed to read config: {err}"),
            Self::Parse(err) => write!(f, "failed to parse config: {err}"),
            Self::Invalid(message) => write!(f, "invalid config: {message}"),
        }
    }
}

impl Error for ConfigError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            Self::Io(err) => Some(err),
            Self::Parse(err) => Some(err),
            Self::Invalid(_) => None,
        }
    }
}

/// Settings for synchronizing one remote collection.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct SyncConfig {
    /// Remote collection (database) id.
    pub collection_id: String,
    /// Field whose value identifies a record in the local cache.
    #[serde(default = "default_key_field")]
    pub key_field: String,
    /// Documents per listing page, 1..=100.
    #[serde(default = "default_page_size")]
    pub page_size: usize,
    #[serde(default = "default_level")]
    pub log_level: String,
    /// Absolute directory for rolling log files.
    #[serde(default)]
    pub log_dir: Option<String>,
}

impl SyncConfig {
    /// Builds a config for `collection_id` with defaults elsewhere.
    pub fn new(collection_id: impl Into<String>) -> Self {
        Self {
            collection_id: collection_id.into(),
            key_field: default_key_field(),
            page_size: default_page_size(),
            log_level: default_level(),
            log_dir: None,
        }
    }

    /// Returns `log_dir`, or a directory under the system temp dir when unset.
    pub fn resolved_log_dir(&self) -> PathBuf {
        match &self.log_dir {
            Some(dir) => PathBuf::from(dir.trim()),
            None => std::env::temp_dir().join(DEFAULT_LOG_DIR_NAME),
        }
    }

    pub fn from_json_str(raw: &str) -> Result<Self, ConfigError> {
        let config: Self = serde_json::from_str(raw).map_err(ConfigError::Parse)?;
        config.validate()?;
        Ok(config)
    }

    pub fn load(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let raw = std::fs::read_to_string(path).map_err(ConfigError::Io)?;
        Self::from_json_str(&raw)
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.collection_id.trim().is_empty() {
            return Err(ConfigError::Invalid(
                "collection_id cannot be empty".to_string(),
            ));
        }
        if self.key_field.trim().is_empty() {
            return Err(ConfigError::Invalid("key_field cannot be empty".to_string()));
        }
        if !(1..=MAX_PAGE_SIZE).contains(&self.page_size) {
            return Err(ConfigError::Invalid(format!(
                "page_size must be within 1..={MAX_PAGE_SIZE}, got {}",
                self.page_size
            )));
        }
        normalize_level(&self.log_level).map_err(|err| ConfigError::Invalid(err.to_string()))?;
        if let Some(dir) = &self.log_dir {
            if !Path::new(dir.trim()).is_absolute() {
                return Err(ConfigError::Invalid(format!(
                    "log_dir must be an absolute path, got `{dir}`"
                )));
            }
        }
        Ok(())
    }
}

fn default_key_field() -> String {
    DEFAULT_KEY_FIELD.to_string()
}

fn default_page_size() -> usize {
    MAX_PAGE_SIZE
}

fn default_level() -> String {
    default_log_level().to_string()
}

#[cfg(test)]
mod tests {
    use super::{ConfigError, SyncConfig};
    use std::io::Write;

    #[test]
    fn defaults_fill_optional_fields() {
        let config = SyncConfig::from_json_str(r#"{"collection_id": "db-1"}"#).unwrap();
        assert_eq!(config.key_field, "ID");
        assert_eq!(config.page_size, 100);
        assert!(!config.log_level.is_empty());
    }

    #[test]
    fn empty_collection_is_invalid() {
        let error = SyncConfig::from_json_str(r#"{"collection_id": "  "}"#).unwrap_err();
        assert!(matches!(error, ConfigError::Invalid(_)));
    }

    #[test]
    fn page_size_out_of_range_is_invalid() {
        let error =
            SyncConfig::from_json_str(r#"{"collection_id": "db", "page_size": 0}"#).unwrap_err();
        assert!(error.to_string().contains("page_size"));
    }

    #[test]
    fn unsupported_log_level_is_invalid() {
        let error =
            SyncConfig::from_json_str(r#"{"collection_id": "db", "log_level": "loud"}"#)
                .unwrap_err();
        assert!(matches!(error, ConfigError::Invalid(_)));
        assert!(error.to_string().contains("loud"));
    }

    #[test]
    fn log_dir_must_be_absolute_and_defaults_to_temp() {
        let error =
            SyncConfig::from_json_str(r#"{"collection_id": "db", "log_dir": "logs/dev"}"#)
                .unwrap_err();
        assert!(matches!(error, ConfigError::Invalid(_)));

        let config = SyncConfig::new("db");
        assert!(config.resolved_log_dir().is_absolute());
        assert!(config.resolved_log_dir().ends_with("notiondb-logs"));

        let dir = tempfile::tempdir().unwrap();
        let raw = serde_json::json!({
            "collection_id": "db",
            "log_level": "WARN",
            "log_dir": dir.path().to_str().unwrap(),
        })
        .to_string();
        let config = SyncConfig::from_json_str(&raw).unwrap();
        assert_eq!(config.resolved_log_dir(), dir.path());
    }

    #[test]
    fn unknown_fields_are_rejected() {
        let error =
            SyncConfig::from_json_str(r#"{"collection_id": "db", "token": "x"}"#).unwrap_err();
        assert!(matches!(error, ConfigError::Parse(_)));
    }

    #[test]
    fn load_reads_file() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        write!(file, r#"{{"collection_id": "db-9", "key_field": "Code"}}"#).unwrap();

        let config = SyncConfig::load(file.path()).unwrap();
        assert_eq!(config.collection_id, "db-9");
        assert_eq!(config.key_field, "Code");
    }
}
