//! Stowaway CLI entry point: argument parsing, logging setup and command
//! dispatch.

use clap::Parser;
use miette::Result;
use stowaway_cli::{cli, commands, error, logger, ui};

#[tokio::main]
async fn main() -> Result<()> {
    let args = cli::Cli::parse();

    logger::init_logger(args.verbose, args.quiet, args.no_color);
    ui::init_colors(args.no_color);

    let global = args.global();
    let result = match args.command {
        cli::Command::Closure(cmd) => commands::closure_execute(&global, cmd).await,
        cli::Command::Patterns(cmd) => commands::patterns_execute(&global, cmd).await,
        cli::Command::Report(cmd) => commands::report_execute(&global, cmd).await,
        cli::Command::Resolve(cmd) => commands::resolve_execute(&global, cmd).await,
        cli::Command::Check(cmd) => commands::check_execute(&global, cmd).await,
    };

    result.map_err(error::cli_error_to_miette)
}
