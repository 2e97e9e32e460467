//! Error types for the fallible, non-render entry points.
//!
//! Rendering itself never fails; these cover loading schema documents and
//! configuration files.

use std::path::PathBuf;

/// Failure to read a schema document as a whole.
#[derive(Debug, thiserror::Error)]
pub enum SchemaError {
    #[error("schema document must be a JSON object, found {found}")]
    NotAnObject { found: &'static str },
    #[error("parse schema json: {0}")]
    Json(#[from] serde_json::Error),
}

/// Failure to load or validate engine configuration.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("read config {path}: {source}")]
    Read {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("parse config {path}: {source}")]
    Parse {
        path: PathBuf,
        #[source]
        source: serde_yaml::Error,
    },
    #[error("invalid config: {0}")]
    Invalid(String),
}
