//! Command-line interface definition.
//!
//! - `stowaway closure` - print the external closure
//! - `stowaway patterns` - print packager include/exclude patterns
//! - `stowaway report` - write a report from a list of used imports
//! - `stowaway resolve` - decide a single import
//! - `stowaway check` - validate configuration against the installed tree

mod commands;

use std::path::PathBuf;

use clap::Parser;

pub use commands::{CheckArgs, ClosureArgs, Command, PatternsArgs, ReportArgs, ResolveArgs};

/// Stowaway - ship the node_modules your bundle leaves external
#[derive(Parser, Debug)]
#[command(
    name = "stowaway",
    version,
    about = "Compute which node_modules ship next to a bundle",
    long_about = "Stowaway finds every installed module a list of external module specs\n\
                  pulls in at runtime, decides per import whether it stays external, and\n\
                  turns the result into include/exclude patterns for a packager."
)]
pub struct Cli {
    /// Enable verbose logging (debug level)
    #[arg(short, long, global = true)]
    pub verbose: bool,

    /// Suppress all output except errors
    #[arg(short, long, global = true, conflicts_with = "verbose")]
    pub quiet: bool,

    /// Disable colored output
    #[arg(long, global = true)]
    pub no_color: bool,

    /// Project root with a package-lock.json. Repeat for workspace members;
    /// the first one is the main root and shadows the others.
    #[arg(long = "root", value_name = "DIR", global = true)]
    pub roots: Vec<PathBuf>,

    /// Config file instead of stowaway.toml / stowaway.json / package.json
    #[arg(short, long, value_name = "FILE", global = true)]
    pub config: Option<PathBuf>,

    #[command(subcommand)]
    pub command: Command,
}

/// Options every command shares.
#[derive(Debug, Clone)]
pub struct GlobalArgs {
    pub roots: Vec<PathBuf>,
    pub config: Option<PathBuf>,
}

impl Cli {
    /// Global options, with the current directory as the root when none
    /// was given.
    pub fn global(&self) -> GlobalArgs {
        let roots = if self.roots.is_empty() {
            vec![PathBuf::from(".")]
        } else {
            self.roots.clone()
        };
        GlobalArgs {
            roots,
            config: self.config.clone(),
        }
    }
}
