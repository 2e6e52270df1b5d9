//! Bundling phase: the closure is computed once when the build starts, every
//! import is answered from it, and the report is produced when the bundle
//! is written.

use std::path::{Path, PathBuf};
use std::sync::Arc;

use indexmap::IndexSet;
use parking_lot::Mutex;
use stowaway_config::{ExternalsConfig, ExternalsReport, resolve_config};
use stowaway_graph::{GraphLoader, Workspace};

use crate::closure::{Closure, ClosureBuilder};
use crate::diagnostics::DiagnosticSink;
use crate::error::{ResolveError, Result};
use crate::report::generate_report;
use crate::resolve::{ImportResolver, Resolution};
use crate::summary::ClosureSummary;

pub struct ExternalsPlugin {
    config: ExternalsConfig,
    resolver: ImportResolver,
    sink: Arc<dyn DiagnosticSink>,
    externals: Mutex<IndexSet<String>>,
}

impl ExternalsPlugin {
    /// Load every root's graph, resolve the config against the main root and
    /// compute the closure.
    pub async fn build_start(
        loader: Arc<dyn GraphLoader>,
        roots: &[PathBuf],
        config: ExternalsConfig,
        sink: Arc<dyn DiagnosticSink>,
    ) -> Result<Self> {
        let workspace = Workspace::load(loader, roots).await?;
        Self::with_workspace(workspace, config, sink)
    }

    /// Same as [`build_start`](Self::build_start) for an already loaded
    /// workspace.
    pub fn with_workspace(
        workspace: Workspace,
        config: ExternalsConfig,
        sink: Arc<dyn DiagnosticSink>,
    ) -> Result<Self> {
        let config = resolve_config(config, workspace.main_root())?;
        let closure = ClosureBuilder::new(&workspace, &*sink).from_config(&config)?;
        tracing::info!(
            roots = closure.roots().len(),
            modules = closure.len(),
            "computed external closure"
        );
        let resolver = ImportResolver::new(Arc::new(workspace), Arc::new(closure), sink.clone());
        Ok(Self {
            config,
            resolver,
            sink,
            externals: Mutex::new(IndexSet::new()),
        })
    }

    /// Import hook. External answers are remembered for the report.
    pub fn resolve_id(
        &self,
        importee: &str,
        importer: Option<&Path>,
    ) -> std::result::Result<Resolution, ResolveError> {
        let resolution = self.resolver.resolve(importee, importer)?;
        if let Resolution::External { id } = &resolution {
            self.externals.lock().insert(id.clone());
        }
        Ok(resolution)
    }

    /// Ids answered as external so far.
    pub fn external_ids(&self) -> Vec<String> {
        self.externals.lock().iter().cloned().collect()
    }

    /// Report file name and content for the ids the bundle output still
    /// imports. `None` when reporting is disabled.
    pub fn generate_bundle<I, S>(&self, used_imports: I) -> Option<(String, ExternalsReport)>
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let file_name = self.config.report_file_name()?.to_string();
        let report = generate_report(
            self.resolver.workspace(),
            &self.config,
            used_imports,
            &*self.sink,
        );
        Some((file_name, report))
    }

    pub fn summary(&self) -> ClosureSummary {
        ClosureSummary::new(self.resolver.workspace(), self.resolver.closure())
    }

    pub fn closure(&self) -> &Closure {
        self.resolver.closure()
    }

    pub fn workspace(&self) -> &Workspace {
        self.resolver.workspace()
    }

    /// The config with its `file` merged in.
    pub fn config(&self) -> &ExternalsConfig {
        &self.config
    }
}
