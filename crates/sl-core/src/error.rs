//! Error types for sl-core

use thiserror::Error;

/// Core error type for sqllineage
#[derive(Error, Debug)]
pub enum CoreError {
    /// E001: Configuration file not found
    #[error("[E001] Config file not found: {path}")]
    ConfigNotFound { path: String },

    /// E002: Failed to parse configuration file
    #[error("[E002] Failed to parse config: {message}")]
    ConfigParseError { message: String },

    /// E003: Invalid configuration value
    #[error("[E003] Invalid config: {message}")]
    ConfigInvalid { message: String },

    /// E004: IO error with file path context
    #[error("[E004] Failed to read '{path}': {source}")]
    IoWithPath {
        path: String,
        source: std::io::Error,
    },

    /// E005: Metadata document is not valid JSON
    #[error("[E005] Failed to parse metadata: {0}")]
    MetadataParse(#[source] serde_json::Error),

    /// E006: Required request field missing or blank
    #[error("[E006] Missing required field '{field}'")]
    MissingField { field: &'static str },

    /// JSON serialization/deserialization error
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

/// Result type alias for CoreError
pub type CoreResult<T> = Result<T, CoreError>;
