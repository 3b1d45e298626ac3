//! Configuration file loading.
//!
//! A config file names the two databases, the schema to read tables from,
//! the schema to create them in, and the table mapping. TOML is the default
//! format; a `.yaml` or `.yml` extension selects YAML and `.json` selects
//! JSON.
//!
//! ```toml
//! schema = "public"
//! target_schema = "public"
//! tables = "*"
//!
//! [source]
//! host = "localhost"
//! user = "postgres"
//! password = "postgres"
//! dbname = "app"
//!
//! [target]
//! host = "replica"
//! user = "postgres"
//! dbname = "app_copy"
//!
//! [server]
//! listen = "0.0.0.0:8000"
//! ```
//!
//! Explicit pairs are written as `[[tables]]` entries with `source` and an
//! optional `target`.

use pg_table_sync_postgresql::{ColumnMode, ConnectionConfig};
use serde::Deserialize;
use std::fs;
use std::path::{Path, PathBuf};
use sync_core::{MappingEntry, MappingError, TableMapping, WILDCARD};
use thiserror::Error;

pub const DEFAULT_SCHEMA: &str = "public";
pub const DEFAULT_LISTEN: &str = "0.0.0.0:8000";

fn default_schema() -> String {
    DEFAULT_SCHEMA.to_string()
}

fn default_listen() -> String {
    DEFAULT_LISTEN.to_string()
}

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Failed to read config file {}: {source}", path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Failed to parse TOML config: {0}")]
    Toml(#[from] toml::de::Error),

    #[error("Failed to parse YAML config: {0}")]
    Yaml(#[from] serde_yaml::Error),

    #[error("Failed to parse JSON config: {0}")]
    Json(#[from] serde_json::Error),

    #[error("Invalid table mapping: {0}")]
    Mapping(#[from] MappingError),

    #[error("Invalid tables value '{0}': expected \"*\" or a list of {{ source, target }} entries")]
    InvalidTables(String),

    #[error("Schema name must not be empty")]
    EmptySchema,
}

/// The `tables` setting: the wildcard string or a list of entries.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(untagged)]
pub enum TablesConfig {
    Wildcard(String),
    Entries(Vec<MappingEntry>),
}

#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct ServerConfig {
    #[serde(default = "default_listen")]
    pub listen: String,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            listen: default_listen(),
        }
    }
}

/// Contents of a config file.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct AppConfig {
    pub source: ConnectionConfig,
    pub target: ConnectionConfig,
    /// Source schema tables are discovered in and read from
    #[serde(default = "default_schema")]
    pub schema: String,
    /// Target schema tables are created in and written to
    #[serde(default = "default_schema")]
    pub target_schema: String,
    pub tables: TablesConfig,
    /// `first_row` (default) or `per_row`
    #[serde(default)]
    pub column_mode: ColumnMode,
    #[serde(default)]
    pub server: ServerConfig,
}

/// Everything one sync run needs, validated.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SyncConfig {
    pub source: ConnectionConfig,
    pub target: ConnectionConfig,
    pub schema: String,
    pub target_schema: String,
    pub mapping: TableMapping,
    pub column_mode: ColumnMode,
}

impl AppConfig {
    /// Load a config file, picking the format from its extension.
    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self, ConfigError> {
        let path = path.as_ref();
        let content = fs::read_to_string(path).map_err(|source| ConfigError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        match path.extension().and_then(|e| e.to_str()) {
            Some("yaml") | Some("yml") => Self::from_yaml(&content),
            Some("json") => Self::from_json(&content),
            _ => Self::from_toml(&content),
        }
    }

    pub fn from_toml(content: &str) -> Result<Self, ConfigError> {
        Ok(toml::from_str(content)?)
    }

    pub fn from_yaml(content: &str) -> Result<Self, ConfigError> {
        Ok(serde_yaml::from_str(content)?)
    }

    pub fn from_json(content: &str) -> Result<Self, ConfigError> {
        Ok(serde_json::from_str(content)?)
    }

    pub fn table_mapping(&self) -> Result<TableMapping, ConfigError> {
        match &self.tables {
            TablesConfig::Wildcard(value) if value.trim() == WILDCARD => Ok(TableMapping::All),
            TablesConfig::Wildcard(value) => Err(ConfigError::InvalidTables(value.clone())),
            TablesConfig::Entries(entries) => Ok(TableMapping::from_entries(entries)?),
        }
    }

    pub fn sync_config(&self) -> Result<SyncConfig, ConfigError> {
        let schema = self.schema.trim();
        let target_schema = self.target_schema.trim();
        if schema.is_empty() || target_schema.is_empty() {
            return Err(ConfigError::EmptySchema);
        }
        Ok(SyncConfig {
            source: self.source.clone(),
            target: self.target.clone(),
            schema: schema.to_string(),
            target_schema: target_schema.to_string(),
            mapping: self.table_mapping()?,
            column_mode: self.column_mode,
        })
    }
}

/// Read and validate the config file at `path` for one run.
pub fn load_sync_config<P: AsRef<Path>>(path: P) -> Result<SyncConfig, ConfigError> {
    AppConfig::from_file(path)?.sync_config()
}
