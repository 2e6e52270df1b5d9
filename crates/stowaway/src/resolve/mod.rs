//! Per-import decisions during bundling.
//!
//! The bundler asks, for each `(importee, importer)` pair, whether the
//! import stays a runtime reference to an external module or gets inlined.
//! Answers depend only on the closure and the read-only workspace, so one
//! [`ImportResolver`] can serve concurrent calls.

mod pkg_dir;

use std::path::{Path, PathBuf};
use std::sync::Arc;

use stowaway_graph::location::{self, split_specifier};
use stowaway_graph::{NodeRef, Workspace};

pub use pkg_dir::PackageDirCache;

use crate::builtins::is_builtin;
use crate::closure::Closure;
use crate::diagnostics::{Diagnostic, DiagnosticSink};
use crate::error::ResolveError;

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Resolution {
    /// Keep as a runtime import of this id, e.g. `pkg2/node_modules/pkg3/x`.
    External { id: String },
    /// Leave it to the bundler's own resolution.
    Default,
}

pub struct ImportResolver {
    workspace: Arc<Workspace>,
    closure: Arc<Closure>,
    sink: Arc<dyn DiagnosticSink>,
    package_dirs: PackageDirCache,
}

impl ImportResolver {
    pub fn new(
        workspace: Arc<Workspace>,
        closure: Arc<Closure>,
        sink: Arc<dyn DiagnosticSink>,
    ) -> Self {
        Self {
            workspace,
            closure,
            sink,
            package_dirs: PackageDirCache::new(),
        }
    }

    /// Decide one import.
    ///
    /// `importee` is a bare specifier (`pkg3/stuff`) or an absolute path as
    /// resolved by the bundler; `importer` is the absolute path of the
    /// importing file, `None` for entry points.
    pub fn resolve(
        &self,
        importee: &str,
        importer: Option<&Path>,
    ) -> Result<Resolution, ResolveError> {
        // `\0`-prefixed ids are bundler-internal virtual modules
        if importee.starts_with('\0')
            || importer.is_some_and(|p| p.as_os_str().to_string_lossy().starts_with('\0'))
        {
            return Ok(Resolution::Default);
        }
        // relative imports inside node_modules arrive as absolute paths
        if importee.starts_with('.') {
            return Ok(Resolution::Default);
        }

        let is_path = Path::new(importee).is_absolute();
        let (target, subpath) = if is_path {
            match self.resolve_path(Path::new(importee))? {
                Some(target) => (target, ""),
                None => return Ok(Resolution::Default),
            }
        } else {
            let Some(importer) = importer else {
                return Ok(Resolution::Default);
            };
            match self.resolve_bare(importee, importer)? {
                Some(found) => found,
                None => return Ok(Resolution::Default),
            }
        };

        if !self.closure.contains(target) {
            return Ok(Resolution::Default);
        }

        let location = format!("{}{subpath}", self.workspace.node(target).location);
        let id = match location.strip_prefix("node_modules/") {
            Some(id) => id.to_string(),
            None => {
                self.sink.emit(Diagnostic::OutsideNodeModules {
                    location: location.clone(),
                });
                location
            }
        };
        tracing::debug!(importee, id = %id, "external import");
        Ok(Resolution::External { id })
    }

    /// Node behind an absolute file path. `None` for files of the main
    /// root itself (entry points and application code).
    fn resolve_path(&self, path: &Path) -> Result<Option<NodeRef>, ResolveError> {
        let dir = self.package_dir(path)?;
        if dir == self.workspace.main_root() {
            return Ok(None);
        }
        self.workspace
            .node_for_dir(&dir)
            .map(Some)
            .ok_or_else(|| ResolveError::ForeignDescriptor(path.to_path_buf()))
    }

    /// Node a bare specifier resolves to from `importer`, through the
    /// importing package's dependency edge.
    fn resolve_bare<'i>(
        &self,
        importee: &'i str,
        importer: &Path,
    ) -> Result<Option<(NodeRef, &'i str)>, ResolveError> {
        let (module_id, subpath) = split_specifier(importee);
        if is_builtin(importee) {
            return Ok(None);
        }

        let dir = self.package_dir(importer)?;
        let from = self
            .workspace
            .node_for_dir(&dir)
            .ok_or_else(|| ResolveError::ForeignDescriptor(importer.to_path_buf()))?;

        let Some(edge) = self.workspace.edge_out(from, module_id) else {
            // packages importing themselves by name have no edge for it
            if self.workspace.node(from).name != module_id {
                self.sink.emit(Diagnostic::NoEdge {
                    module_id: module_id.to_string(),
                    importee: importee.to_string(),
                });
            }
            return Ok(None);
        };

        let target = self
            .workspace
            .edge_target(edge)
            .ok_or_else(|| ResolveError::NoTarget {
                importee: importee.to_string(),
                importer: importer.to_path_buf(),
            })?;
        Ok(Some((target, subpath)))
    }

    fn package_dir(&self, file: &Path) -> Result<PathBuf, ResolveError> {
        self.package_dirs
            .find(file)
            .ok_or_else(|| ResolveError::NoPackageDir(file.to_path_buf()))
    }

    pub fn workspace(&self) -> &Workspace {
        &self.workspace
    }

    pub fn closure(&self) -> &Closure {
        &self.closure
    }
}

/// `pkg2/node_modules/pkg3/stuff` → module root `pkg2/node_modules/pkg3`,
/// looked up as `node_modules/<root>`.
pub(crate) fn import_location(import: &str) -> String {
    location::join(location::NODE_MODULES, location::module_root_of_import(import))
}
