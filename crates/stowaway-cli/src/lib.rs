//! Stowaway CLI.
//!
//! Command-line access to the externals closure of an installed
//! `node_modules` tree:
//!
//! - [`cli`] - argument definitions
//! - `commands` - one module per subcommand
//! - [`error`] - error types and their miette rendering
//! - [`logger`] - tracing setup
//! - [`ui`] - status messages on stderr
//!
//! Results go to stdout, everything else to stderr, so output can be piped
//! into a packager config.

pub mod cli;
pub mod commands;
pub mod error;
pub mod logger;
pub mod ui;

pub use error::{CliError, Result};
