use std::path::PathBuf;

use clap::{Args, Subcommand};

#[derive(Subcommand, Debug)]
pub enum Command {
    /// Print the external closure
    ///
    /// Lists every installed module kept external as `location@version`,
    /// followed by packages that ship in more than one version.
    Closure(ClosureArgs),

    /// Print packager patterns
    ///
    /// Patterns come from the live config, or from a report written during
    /// bundling when `--report` is given.
    Patterns(PatternsArgs),

    /// Write a report from the imports a bundle kept external
    Report(ReportArgs),

    /// Decide a single import: `external <id>` or `default`
    Resolve(ResolveArgs),

    /// Validate the configuration against the installed tree
    Check(CheckArgs),
}

#[derive(Args, Debug)]
pub struct ClosureArgs {
    /// Print the closure as JSON
    #[arg(long)]
    pub json: bool,
}

#[derive(Args, Debug)]
pub struct PatternsArgs {
    /// Replay this report instead of matching the config
    #[arg(short, long, value_name = "FILE")]
    pub report: Option<PathBuf>,

    /// Print the patterns as a JSON array
    #[arg(long)]
    pub json: bool,
}

#[derive(Args, Debug)]
pub struct ReportArgs {
    /// File with one import id per line, `-` for stdin
    #[arg(short, long, value_name = "FILE")]
    pub imports: PathBuf,

    /// Output file; defaults to the config's report name in the main root
    #[arg(short, long, value_name = "FILE")]
    pub output: Option<PathBuf>,
}

#[derive(Args, Debug)]
pub struct ResolveArgs {
    /// Bare specifier or absolute path being imported
    pub importee: String,

    /// Absolute path of the importing file; omitted for entry points
    #[arg(long, value_name = "PATH")]
    pub importer: Option<PathBuf>,
}

#[derive(Args, Debug)]
pub struct CheckArgs {
    /// Treat warnings (missing or invalid edges, filtered roots) as errors
    #[arg(long)]
    pub strict: bool,
}
