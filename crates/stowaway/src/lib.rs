//! # stowaway
//!
//! Decides which installed `node_modules` packages ship next to a bundle
//! instead of being inlined into it, and turns that decision into packager
//! patterns.
//!
//! ## Overview
//!
//! - **Closure engine**: from a list of module specs (`knex`, `pg@^8`), find
//!   every installed instance they match and everything those instances
//!   depend on at runtime ([`ClosureBuilder`]).
//! - **Import hook**: per bundler import, answer "external, at this id" or
//!   "inline it" ([`ImportResolver`]).
//! - **Report protocol**: persist the externals the bundle really imported
//!   ([`generate_report`]) and replay them later without spec matching
//!   ([`ClosureBuilder::from_report`]).
//! - **Patterns**: include/exclude globs for the packager ([`to_patterns`]).
//!
//! ## Flow
//!
//! ```text
//!   bundling                                  packaging
//!  ┌───────────────────────┐                 ┌──────────────────────┐
//!  │ ExternalsPlugin       │  report.json    │ package_from_report  │
//!  │  build_start          ├────────────────▶│  replay closure      │
//!  │  resolve_id (per imp.)│                 │  to_patterns         │
//!  │  generate_bundle      │                 └──────────────────────┘
//!  └───────────────────────┘
//! ```
//!
//! ## Quick start
//!
//! ```rust,no_run
//! use std::sync::Arc;
//! use stowaway::{CollectingSink, ExternalsConfig, LockfileLoader, TracingSink};
//! use stowaway::{ExternalsPlugin, render};
//!
//! # async fn demo() -> stowaway::Result<()> {
//! let sink = Arc::new(CollectingSink::forwarding(TracingSink));
//! let plugin = ExternalsPlugin::build_start(
//!     Arc::new(LockfileLoader::new()),
//!     &["./my-service".into()],
//!     ExternalsConfig::with_modules(["knex", "pg"]),
//!     sink.clone(),
//! )
//! .await?;
//! print!("{}", plugin.summary());
//! let patterns = stowaway::to_patterns(plugin.workspace(), plugin.closure());
//! println!("{:#?}", render(&patterns));
//! # Ok(())
//! # }
//! ```

pub mod builtins;
mod closure;
mod diagnostics;
mod error;
pub mod filter;
mod packaging;
mod patterns;
mod plugin;
mod report;
pub mod resolve;
mod spec;
mod summary;

pub use closure::{Closure, ClosureBuilder};
pub use diagnostics::{CollectingSink, Diagnostic, DiagnosticSink, Severity, TracingSink};
pub use error::{Error, ResolveError, Result};
pub use filter::{EdgeFilter, KeepAll, KindFilter, NodeFilter};
pub use packaging::{package_from_config, package_from_report};
pub use patterns::{Pattern, render, to_patterns};
pub use plugin::ExternalsPlugin;
pub use report::{generate_report, report_from_closure};
pub use resolve::{ImportResolver, PackageDirCache, Resolution};
pub use spec::{ModuleSpec, SpecSet};
pub use summary::ClosureSummary;

pub use stowaway_config::{ConfigError, ExternalsConfig, ExternalsReport};
pub use stowaway_graph::{GraphLoader, LockfileLoader, NodeRef, Workspace};
