//! Error types for graph loading and construction.

use std::path::PathBuf;

use thiserror::Error;

pub type Result<T> = std::result::Result<T, GraphError>;

#[derive(Debug, Error)]
pub enum GraphError {
    /// No `package-lock.json` or `npm-shrinkwrap.json` next to the root
    #[error("no lockfile found in {}", .0.display())]
    LockfileNotFound(PathBuf),

    #[error("unsupported lockfileVersion {0}")]
    UnsupportedLockfile(u64),

    /// A dependency tree entry has a shape we don't understand. The install
    /// tree is corrupted or was written by an unsupported npm version.
    #[error("malformed dependency tree entry at '{location}': {reason}")]
    Format { location: String, reason: String },

    #[error("invalid JSON in {}: {source}", .path.display())]
    Json {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },

    #[error("a workspace needs at least one root")]
    NoRoots,

    #[error("graph loading task failed: {0}")]
    Join(String),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

impl GraphError {
    pub(crate) fn format(location: impl Into<String>, reason: impl Into<String>) -> Self {
        Self::Format {
            location: location.into(),
            reason: reason.into(),
        }
    }
}
