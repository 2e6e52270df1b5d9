//! Error types for the closure engine and the import resolution hook.
//!
//! Only fatal conditions are errors. Missing edges, unresolvable report
//! entries and the like are reported as [`Diagnostic`](crate::Diagnostic)s and
//! shrink the result instead.

use std::path::PathBuf;

use stowaway_config::ConfigError;
use stowaway_graph::GraphError;
use thiserror::Error;

pub type Result<T> = std::result::Result<T, Error>;

#[derive(Debug, Error)]
pub enum Error {
    #[error(transparent)]
    Graph(#[from] GraphError),

    #[error(transparent)]
    Config(#[from] ConfigError),

    #[error(transparent)]
    Resolve(#[from] ResolveError),
}

/// The import graph and the installed tree disagree about an import.
#[derive(Debug, Error)]
pub enum ResolveError {
    #[error("couldn't find package dir for {}", .0.display())]
    NoPackageDir(PathBuf),

    /// A named `package.json` that isn't part of the loaded tree, e.g. one
    /// shipped inside a module's build output.
    #[error("module's package.json doesn't belong to current node_modules tree: {}", .0.display())]
    ForeignDescriptor(PathBuf),

    #[error("no installed module for '{importee}' imported from {}", .importer.display())]
    NoTarget { importee: String, importer: PathBuf },
}
