//! Recoverable anomalies found while computing or replaying a closure.
//!
//! Every diagnostic goes through an injected [`DiagnosticSink`] rather than
//! straight to the log, so callers decide where warnings end up and tests
//! can assert on them.

use std::fmt;

use parking_lot::Mutex;
use serde::{Deserialize, Serialize};
use stowaway_graph::EdgeKind;

/// Diagnostic severity level.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Severity {
    Info,
    Warning,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum Diagnostic {
    /// A required dependency isn't installed.
    MissingEdge {
        from: String,
        name: String,
        spec: String,
    },
    /// The installed version violates the declared range.
    InvalidEdge {
        from: String,
        name: String,
        spec: String,
        installed: String,
    },
    /// A module matching the config is only reachable through an edge kind
    /// the traversal skips (usually a devDependency).
    RootFiltered { location: String, edge_kind: EdgeKind },
    /// A report or forced module root that isn't in the current tree.
    UnresolvedModuleRoot { location: String },
    /// The report was generated for a different set of roots.
    TreePathsMismatch {
        report: Vec<String>,
        current: Vec<String>,
    },
    /// A bundled import with no installed module behind it.
    UnknownImport { import: String },
    /// A bare import the importing package declares no dependency for.
    NoEdge { module_id: String, importee: String },
    /// An external outside any `node_modules` folder.
    OutsideNodeModules { location: String },
    /// Closure summary.
    KeptExternal { count: usize },
}

impl Diagnostic {
    pub fn severity(&self) -> Severity {
        match self {
            Self::KeptExternal { .. } => Severity::Info,
            _ => Severity::Warning,
        }
    }

    pub fn is_warning(&self) -> bool {
        self.severity() == Severity::Warning
    }
}

impl fmt::Display for Diagnostic {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::MissingEdge { from, name, spec } => {
                write!(f, "dependency is missing, skipping: {name}@{spec} (from {from})")
            }
            Self::InvalidEdge {
                from,
                name,
                spec,
                installed,
            } => write!(
                f,
                "dependency is invalid, skipping: {name}@{spec} resolved to {installed} (from {from})"
            ),
            Self::RootFiltered {
                location,
                edge_kind,
            } => write!(
                f,
                "root external module will be filtered out: {location} (only reachable as a {edge_kind} dependency)"
            ),
            Self::UnresolvedModuleRoot { location } => {
                write!(f, "can't find {location} in tree, it will not be packaged")
            }
            Self::TreePathsMismatch { report, current } => write!(
                f,
                "report was generated for node_modules trees [{}] but the current trees are [{}]",
                report.join(", "),
                current.join(", ")
            ),
            Self::UnknownImport { import } => write!(f, "no module found for: {import}"),
            Self::NoEdge {
                module_id,
                importee,
            } => write!(f, "no edge found for: {module_id} (from {importee})"),
            Self::OutsideNodeModules { location } => {
                write!(f, "external location doesn't start with node_modules/: {location}")
            }
            Self::KeptExternal { count } => write!(f, "{count} modules kept external"),
        }
    }
}

/// Receives diagnostics.
pub trait DiagnosticSink: Send + Sync {
    fn emit(&self, diagnostic: Diagnostic);
}

/// Forwards diagnostics to `tracing`.
#[derive(Debug, Clone, Copy, Default)]
pub struct TracingSink;

impl DiagnosticSink for TracingSink {
    fn emit(&self, diagnostic: Diagnostic) {
        match diagnostic.severity() {
            Severity::Info => tracing::info!("{diagnostic}"),
            Severity::Warning => tracing::warn!("{diagnostic}"),
        }
    }
}

/// Keeps every diagnostic, optionally forwarding to another sink.
#[derive(Default)]
pub struct CollectingSink {
    diagnostics: Mutex<Vec<Diagnostic>>,
    forward: Option<Box<dyn DiagnosticSink>>,
}

impl CollectingSink {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn forwarding(sink: impl DiagnosticSink + 'static) -> Self {
        Self {
            diagnostics: Mutex::new(Vec::new()),
            forward: Some(Box::new(sink)),
        }
    }

    pub fn diagnostics(&self) -> Vec<Diagnostic> {
        self.diagnostics.lock().clone()
    }

    pub fn warnings(&self) -> Vec<Diagnostic> {
        self.diagnostics
            .lock()
            .iter()
            .filter(|d| d.is_warning())
            .cloned()
            .collect()
    }

    pub fn warning_count(&self) -> usize {
        self.diagnostics.lock().iter().filter(|d| d.is_warning()).count()
    }

    pub fn take(&self) -> Vec<Diagnostic> {
        std::mem::take(&mut *self.diagnostics.lock())
    }
}

impl fmt::Debug for CollectingSink {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("CollectingSink")
            .field("diagnostics", &self.diagnostics.lock().len())
            .finish()
    }
}

impl DiagnosticSink for CollectingSink {
    fn emit(&self, diagnostic: Diagnostic) {
        if let Some(forward) = &self.forward {
            forward.emit(diagnostic.clone());
        }
        self.diagnostics.lock().push(diagnostic);
    }
}

impl<T: DiagnosticSink + ?Sized> DiagnosticSink for std::sync::Arc<T> {
    fn emit(&self, diagnostic: Diagnostic) {
        (**self).emit(diagnostic);
    }
}
