//! Sink configuration via `eventsink.toml`
//!
//! All fields are optional; an empty file yields the defaults
//! (keyspace and table `logstash`, reserved fields `@version` and
//! `@timestamp`). Connection options are an opaque string table handed to
//! whatever builds the store session.

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::path::Path;

use eventsink_core::{Error, Result, TIMESTAMP_FIELD, VERSION_FIELD};
use eventsink_storage::cql::is_plain_identifier;

/// Conventional config file name.
pub const CONFIG_FILE_NAME: &str = "eventsink.toml";

/// Default keyspace name.
pub const DEFAULT_KEYSPACE: &str = "logstash";

/// Default table name.
pub const DEFAULT_TABLE: &str = "logstash";

/// Sink configuration loaded from `eventsink.toml`.
///
/// # Example
///
/// ```toml
/// keyspace = "logstash"
/// table = "events"
///
/// [options]
/// hosts = "10.0.0.1,10.0.0.2"
/// ```
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SinkConfig {
    /// Target keyspace, created if missing.
    #[serde(default = "default_keyspace")]
    pub keyspace: String,
    /// Target table, created with the baseline schema if missing.
    #[serde(default = "default_table")]
    pub table: String,
    /// Input field remapped to the `version` column.
    #[serde(default = "default_version_field")]
    pub version_field: String,
    /// Input field remapped to the `timestamp` column.
    #[serde(default = "default_timestamp_field")]
    pub timestamp_field: String,
    /// Connection options for the store session.
    #[serde(default, skip_serializing_if = "BTreeMap::is_empty")]
    pub options: BTreeMap<String, String>,
}

fn default_keyspace() -> String {
    DEFAULT_KEYSPACE.to_string()
}

fn default_table() -> String {
    DEFAULT_TABLE.to_string()
}

fn default_version_field() -> String {
    VERSION_FIELD.to_string()
}

fn default_timestamp_field() -> String {
    TIMESTAMP_FIELD.to_string()
}

impl Default for SinkConfig {
    fn default() -> Self {
        Self {
            keyspace: default_keyspace(),
            table: default_table(),
            version_field: default_version_field(),
            timestamp_field: default_timestamp_field(),
            options: BTreeMap::new(),
        }
    }
}

impl SinkConfig {
    /// Check names before they are spliced into DDL.
    ///
    /// # Errors
    ///
    /// Returns [`Error::Config`] if the keyspace or table is not a plain CQL
    /// identifier, or the reserved field names are empty or equal.
    pub fn validate(&self) -> Result<()> {
        for (what, name) in [("keyspace", &self.keyspace), ("table", &self.table)] {
            if !is_plain_identifier(name) {
                return Err(Error::Config(format!(
                    "invalid {} name '{}': expected [A-Za-z_][A-Za-z0-9_]*",
                    what, name
                )));
            }
        }
        if self.version_field.is_empty() || self.timestamp_field.is_empty() {
            return Err(Error::Config(
                "reserved field names must not be empty".to_string(),
            ));
        }
        if self.version_field == self.timestamp_field {
            return Err(Error::Config(format!(
                "version_field and timestamp_field are both '{}'",
                self.version_field
            )));
        }
        Ok(())
    }

    /// Returns the default config file content with comments.
    pub fn default_toml() -> &'static str {
        r#"# Eventsink configuration
#
# Keyspace and table receiving events. Both are created on startup if
# missing; the keyspace uses SimpleStrategy with replication factor 1.
keyspace = "logstash"
table = "logstash"

# Input fields remapped to the `version` and `timestamp` columns.
version_field = "@version"
timestamp_field = "@timestamp"

# Connection options handed to the store session.
# [options]
# hosts = "127.0.0.1"
"#
    }

    /// Read and parse config from a file path.
    ///
    /// # Errors
    ///
    /// Returns an error if the file cannot be read, parsed or validated.
    pub fn from_file(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path).map_err(|e| {
            Error::Config(format!(
                "Failed to read config file '{}': {}",
                path.display(),
                e
            ))
        })?;
        let config: SinkConfig = toml::from_str(&content).map_err(|e| {
            Error::Config(format!(
                "Failed to parse config file '{}': {}",
                path.display(),
                e
            ))
        })?;
        config.validate()?;
        Ok(config)
    }

    /// Write the default config file if it does not already exist.
    ///
    /// Returns `Ok(())` whether the file was created or already existed.
    pub fn write_default_if_missing(path: &Path) -> Result<()> {
        if !path.exists() {
            std::fs::write(path, Self::default_toml()).map_err(|e| {
                Error::Config(format!(
                    "Failed to write default config file '{}': {}",
                    path.display(),
                    e
                ))
            })?;
        }
        Ok(())
    }

    /// Serialize this config to TOML and write it to the given path.
    pub fn write_to_file(&self, path: &Path) -> Result<()> {
        let content = toml::to_string_pretty(self)
            .map_err(|e| Error::Config(format!("Failed to serialize config: {}", e)))?;
        std::fs::write(path, content).map_err(|e| {
            Error::Config(format!(
                "Failed to write config file '{}': {}",
                path.display(),
                e
            ))
        })
    }
}
