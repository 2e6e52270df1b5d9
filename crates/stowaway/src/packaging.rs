//! Packaging phase: turn a closure into the patterns a packager appends to
//! its own include/exclude list.

use stowaway_config::{ExternalsConfig, ExternalsReport, resolve_config};
use stowaway_graph::Workspace;

use crate::closure::ClosureBuilder;
use crate::diagnostics::DiagnosticSink;
use crate::error::Result;
use crate::patterns::{Pattern, to_patterns};

/// Patterns from a live config. The config's `file` is resolved against the
/// main root first.
pub fn package_from_config(
    workspace: &Workspace,
    config: ExternalsConfig,
    sink: &dyn DiagnosticSink,
) -> Result<Vec<Pattern>> {
    let config = resolve_config(config, workspace.main_root())?;
    let closure = ClosureBuilder::new(workspace, sink).from_config(&config)?;
    Ok(to_patterns(workspace, &closure))
}

/// Patterns replayed from a report written by the bundling phase.
pub fn package_from_report(
    workspace: &Workspace,
    report: &ExternalsReport,
    sink: &dyn DiagnosticSink,
) -> Vec<Pattern> {
    let closure = ClosureBuilder::new(workspace, sink).from_report(report);
    to_patterns(workspace, &closure)
}
