//! CLI error types.
//!
//! Library errors convert into [`CliError`] through `#[from]`; `main` turns
//! the final error into a miette report.

mod miette;

use std::path::PathBuf;

use thiserror::Error;

pub use self::miette::cli_error_to_miette;

pub type Result<T> = std::result::Result<T, CliError>;

#[derive(Debug, Error)]
pub enum CliError {
    /// Closure, graph or import resolution failure
    #[error(transparent)]
    Core(#[from] stowaway::Error),

    #[error(transparent)]
    Config(#[from] stowaway_config::ConfigError),

    #[error(transparent)]
    Graph(#[from] stowaway_graph::GraphError),

    #[error("{0}")]
    Resolve(#[from] stowaway::ResolveError),

    #[error("Invalid argument: {0}")]
    InvalidArgument(String),

    #[error("File not found: {}", .0.display())]
    FileNotFound(PathBuf),

    /// `check` found problems; they were already printed
    #[error("{count} problem(s) found")]
    CheckFailed { count: usize },

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

impl CliError {
    /// Actionable hint for the user, if there is one.
    pub fn hint(&self) -> Option<String> {
        use stowaway_config::ConfigError;

        let config = match self {
            Self::Config(e) | Self::Core(stowaway::Error::Config(e)) => e,
            Self::Graph(stowaway_graph::GraphError::LockfileNotFound(_))
            | Self::Core(stowaway::Error::Graph(stowaway_graph::GraphError::LockfileNotFound(_))) => {
                return Some("Run `npm install` to create package-lock.json".to_string());
            }
            _ => return None,
        };
        match config {
            ConfigError::NotFound => Some(format!(
                "Create one of {} or add an `{}` field to package.json",
                stowaway_config::CONFIG_FILE_NAMES.join(", "),
                stowaway_config::PACKAGE_JSON_FIELD
            )),
            ConfigError::NoModules => {
                Some("List module names or `name@range` specs under `modules`".to_string())
            }
            ConfigError::UnknownModule { name } => Some(format!(
                "'{name}' has to be installed in one of the roots' node_modules"
            )),
            _ => None,
        }
    }
}
