//! Configuration types and parsing for sqllineage.yml

use crate::error::{CoreError, CoreResult};
use serde::{Deserialize, Serialize};
use sl_sql::LineageOptions;
use std::path::Path;

/// File looked up in the working directory when no config path is given
pub const DEFAULT_CONFIG_FILE: &str = "sqllineage.yml";

/// Main configuration from sqllineage.yml
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct Config {
    /// Parser dialects and traversal limits
    #[serde(default)]
    pub lineage: LineageOptions,

    /// Keys used to find view queries inside metadata documents
    #[serde(default)]
    pub metadata: MetadataConfig,

    /// HTTP server binding
    #[serde(default)]
    pub server: ServerConfig,
}

/// Metadata document field names
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct MetadataConfig {
    /// Field holding the SQL text
    #[serde(default = "default_sql_key")]
    pub sql_key: String,

    /// Field holding the view name
    #[serde(default = "default_view_key")]
    pub view_key: String,
}

impl Default for MetadataConfig {
    fn default() -> Self {
        Self {
            sql_key: default_sql_key(),
            view_key: default_view_key(),
        }
    }
}

/// HTTP server settings
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct ServerConfig {
    #[serde(default = "default_host")]
    pub host: String,

    #[serde(default = "default_port")]
    pub port: u16,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: default_host(),
            port: default_port(),
        }
    }
}

fn default_sql_key() -> String {
    "sql_query".to_string()
}

fn default_view_key() -> String {
    "view_name".to_string()
}

fn default_host() -> String {
    "127.0.0.1".to_string()
}

fn default_port() -> u16 {
    8080
}

impl Config {
    /// Load configuration from a file path
    pub fn load(path: &Path) -> CoreResult<Self> {
        if !path.exists() {
            return Err(CoreError::ConfigNotFound {
                path: path.display().to_string(),
            });
        }

        let content = std::fs::read_to_string(path).map_err(|e| CoreError::IoWithPath {
            path: path.display().to_string(),
            source: e,
        })?;
        let config = Self::from_yaml(&content)?;
        log::debug!("Loaded config from {}", path.display());
        Ok(config)
    }

    /// Load `path` when given, else `sqllineage.yml` from the working
    /// directory when present, else defaults
    pub fn load_or_default(path: Option<&Path>) -> CoreResult<Self> {
        match path {
            Some(path) => Self::load(path),
            None => {
                let local = Path::new(DEFAULT_CONFIG_FILE);
                if local.exists() {
                    Self::load(local)
                } else {
                    Ok(Self::default())
                }
            }
        }
    }

    /// Parse and validate configuration text
    pub fn from_yaml(content: &str) -> CoreResult<Self> {
        // An empty file is a valid all-defaults config
        if content.trim().is_empty() {
            return Ok(Self::default());
        }
        let config: Config =
            serde_yaml::from_str(content).map_err(|e| CoreError::ConfigParseError {
                message: e.to_string(),
            })?;
        config.validate()?;
        Ok(config)
    }

    /// Validate the configuration
    fn validate(&self) -> CoreResult<()> {
        if self.lineage.max_depth == 0 {
            return Err(CoreError::ConfigInvalid {
                message: "lineage.max_depth must be at least 1".to_string(),
            });
        }

        if self.metadata.sql_key.trim().is_empty() {
            return Err(CoreError::ConfigInvalid {
                message: "metadata.sql_key cannot be empty".to_string(),
            });
        }

        if self.server.host.trim().is_empty() {
            return Err(CoreError::ConfigInvalid {
                message: "server.host cannot be empty".to_string(),
            });
        }

        Ok(())
    }
}

#[cfg(test)]
#[path = "config_test.rs"]
mod tests;
