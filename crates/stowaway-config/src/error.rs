//! Error types for configuration and report loading.

use std::path::PathBuf;

use thiserror::Error;

pub type Result<T> = std::result::Result<T, ConfigError>;

#[derive(Debug, Error)]
pub enum ConfigError {
    // Config content errors
    #[error("no external modules configured")]
    NoModules,

    #[error("invalid module spec '{spec}': {reason}")]
    InvalidSpec { spec: String, reason: String },

    /// A spec names a module that isn't installed anywhere in the tree
    #[error("external module '{name}' is not installed")]
    UnknownModule { name: String },

    // Config parsing/loading errors
    #[error("config not found")]
    NotFound,

    #[error("invalid config value for '{field}': {hint}")]
    InvalidValue { field: String, hint: String },

    #[error("invalid JSON in {}: {source}", .path.display())]
    Json {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },

    #[error("{} is not an externals report (missing `isReport: true`)", .0.display())]
    NotAReport(PathBuf),

    #[error("failed to read {}: {source}", .path.display())]
    Read {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    // I/O errors
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}
