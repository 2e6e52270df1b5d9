//! Report generation at the end of bundling.
//!
//! A report records which top-level externals the bundle actually imports,
//! not every module the config matched, so packaging ships no more than the
//! bundle needs.

use indexmap::IndexSet;
use stowaway_config::{ExternalsConfig, ExternalsReport};
use stowaway_graph::{Workspace, location};

use crate::builtins::is_builtin;
use crate::closure::Closure;
use crate::diagnostics::{Diagnostic, DiagnosticSink};
use crate::resolve::import_location;

/// Build a report from the ids the bundler left external.
///
/// `used_imports` are the import ids as they appear in the bundle output,
/// e.g. `knex` or `pkg2/node_modules/pkg3/lib/x.js`.
pub fn generate_report<I, S>(
    workspace: &Workspace,
    config: &ExternalsConfig,
    used_imports: I,
    sink: &dyn DiagnosticSink,
) -> ExternalsReport
where
    I: IntoIterator<Item = S>,
    S: AsRef<str>,
{
    let mut roots: IndexSet<String> = config
        .packaging
        .force_include_module_roots
        .iter()
        .cloned()
        .collect();
    let main_root = workspace.main_root_node();

    for import in used_imports {
        let import = import.as_ref();
        if import.starts_with('/') || import.starts_with('.') || is_builtin(import) {
            continue;
        }
        let location = import_location(import);
        if config.is_excluded(location::package_name(&location)) {
            continue;
        }
        let Some(node) = workspace.lookup(&location) else {
            sink.emit(Diagnostic::UnknownImport {
                import: import.to_string(),
            });
            continue;
        };
        if workspace.owner(node) == main_root {
            continue;
        }
        roots.insert(workspace.relative_location(node));
    }

    tracing::debug!(roots = roots.len(), "generated externals report");
    ExternalsReport::new(
        roots.into_iter().collect(),
        config.clone(),
        workspace.tree_paths(),
    )
}

/// Report naming every root of `closure`, for callers that never saw the
/// bundle's imports.
pub fn report_from_closure(
    workspace: &Workspace,
    closure: &Closure,
    config: &ExternalsConfig,
) -> ExternalsReport {
    let roots = closure
        .roots()
        .iter()
        .map(|&root| workspace.relative_location(root))
        .collect();
    ExternalsReport::new(roots, config.clone(), workspace.tree_paths())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::diagnostics::CollectingSink;
    use stowaway_graph::{EdgeKind, GraphBuilder};

    fn workspace() -> Workspace {
        let mut builder = GraphBuilder::new("/p");
        builder
            .package("node_modules/knex", "knex", "3.1.0")
            .package("node_modules/pkg2", "pkg2", "1.0.0")
            .package("node_modules/pkg2/node_modules/pkg3", "pkg3", "2.0.0")
            .package("node_modules/aws-sdk", "aws-sdk", "2.0.0")
            .dependency("", "knex", "^3.0.0", EdgeKind::Prod)
            .dependency("", "pkg2", "^1.0.0", EdgeKind::Prod)
            .dependency("", "aws-sdk", "^2.0.0", EdgeKind::Prod)
            .dependency("node_modules/pkg2", "pkg3", "^2.0.0", EdgeKind::Prod);
        Workspace::single(builder.build().unwrap())
    }

    #[test]
    fn records_module_roots_of_used_imports() {
        let ws = workspace();
        let sink = CollectingSink::new();
        let mut config = ExternalsConfig::with_modules(["knex", "pkg3", "aws-sdk"]);
        config.packaging.exclude = vec!["aws-sdk".into()];
        config.packaging.force_include_module_roots = vec!["node_modules/pkg2".into()];

        let report = generate_report(
            &ws,
            &config,
            [
                "knex",
                "knex/lib/index.js",
                "pkg2/node_modules/pkg3/x.js",
                "aws-sdk/clients/s3",
                "fs",
                "./local",
                "/abs/file.js",
            ],
            &sink,
        );

        assert!(report.is_report);
        assert_eq!(
            report.imported_module_roots,
            [
                "node_modules/pkg2",
                "node_modules/knex",
                "node_modules/pkg2/node_modules/pkg3",
            ]
        );
        assert_eq!(report.node_modules_tree_paths, ["node_modules"]);
        assert_eq!(report.config, config);
        assert_eq!(sink.warning_count(), 0);
    }

    #[test]
    fn unknown_import_warns() {
        let ws = workspace();
        let sink = CollectingSink::new();
        let report = generate_report(&ws, &ExternalsConfig::default(), ["left-pad"], &sink);
        assert!(report.imported_module_roots.is_empty());
        assert_eq!(
            sink.warnings(),
            [Diagnostic::UnknownImport {
                import: "left-pad".into()
            }]
        );
    }
}
