//! Logging setup for the CLI.
//!
//! Verbosity comes from the global flags: `--verbose` for debug output of
//! the stowaway crates, `--quiet` for errors only, otherwise `RUST_LOG` or
//! info level. Diagnostics from the closure engine arrive here as `warn!`
//! and `info!` events.

use tracing_subscriber::{EnvFilter, fmt, layer::SubscriberExt, util::SubscriberInitExt};

const VERBOSE_FILTER: &str =
    "stowaway=debug,stowaway_graph=debug,stowaway_config=debug,stowaway_cli=debug";
const QUIET_FILTER: &str = "error";
const DEFAULT_FILTER: &str =
    "warn,stowaway=info,stowaway_graph=info,stowaway_config=info,stowaway_cli=info";

/// Install the global subscriber. Call once, before anything logs.
///
/// `verbose` wins over `quiet`; `RUST_LOG` only applies when neither is set.
pub fn init_logger(verbose: bool, quiet: bool, no_color: bool) {
    init_logger_with_filter(filter_for(verbose, quiet), no_color);
}

/// Install the global subscriber with an explicit filter.
pub fn init_logger_with_filter(filter: EnvFilter, no_color: bool) {
    let fmt_layer = fmt::layer()
        .with_writer(std::io::stderr)
        .with_target(false)
        .with_level(true)
        .with_ansi(!no_color)
        .compact();

    // a second init (tests) keeps the first subscriber
    let _ = tracing_subscriber::registry()
        .with(filter)
        .with(fmt_layer)
        .try_init();
}

fn filter_for(verbose: bool, quiet: bool) -> EnvFilter {
    if verbose {
        EnvFilter::new(VERBOSE_FILTER)
    } else if quiet {
        EnvFilter::new(QUIET_FILTER)
    } else {
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(DEFAULT_FILTER))
    }
}
