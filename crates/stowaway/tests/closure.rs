//! Closure computation, report replay and pattern output over built graphs

use stowaway::{
    ClosureBuilder, ClosureSummary, CollectingSink, Diagnostic, ExternalsConfig, ExternalsReport,
    Workspace, package_from_report, render, report_from_closure, to_patterns,
};
use stowaway_graph::{EdgeKind, GraphBuilder};

fn locations(ws: &Workspace, closure: &stowaway::Closure) -> Vec<String> {
    let mut locations: Vec<_> = closure.iter().map(|n| ws.relative_location(n)).collect();
    locations.sort();
    locations
}

#[test]
fn only_matched_module_and_its_dependencies() {
    // root → pkg2 → pkg3 → pkg4; only pkg3 is configured
    let mut builder = GraphBuilder::new("/code/app");
    builder
        .package("node_modules/pkg2", "pkg2", "1.0.0")
        .package("node_modules/pkg3", "pkg3", "1.0.0")
        .package("node_modules/pkg4", "pkg4", "1.0.0")
        .dependency("", "pkg2", "^1.0.0", EdgeKind::Prod)
        .dependency("node_modules/pkg2", "pkg3", "^1.0.0", EdgeKind::Prod)
        .dependency("node_modules/pkg3", "pkg4", "^1.0.0", EdgeKind::Prod);
    let ws = Workspace::single(builder.build().unwrap());
    let sink = CollectingSink::new();

    let closure = ClosureBuilder::new(&ws, &sink)
        .from_config(&ExternalsConfig::with_modules(["pkg3"]))
        .unwrap();

    assert_eq!(locations(&ws, &closure), ["node_modules/pkg3", "node_modules/pkg4"]);
    assert_eq!(closure.roots().len(), 1);
    assert_eq!(sink.warning_count(), 0);
    assert!(
        sink.diagnostics()
            .contains(&Diagnostic::KeptExternal { count: 2 })
    );
}

#[test]
fn two_versions_are_two_externals() {
    let mut builder = GraphBuilder::new("/code/app");
    builder
        .package("node_modules/pkg2", "pkg2", "1.0.0")
        .package("node_modules/pkg2/node_modules/pkg3", "pkg3", "2.0.0")
        .package("node_modules/pkg3", "pkg3", "1.0.0")
        .dependency("", "pkg2", "^1.0.0", EdgeKind::Prod)
        .dependency("", "pkg3", "^1.0.0", EdgeKind::Prod)
        .dependency("node_modules/pkg2", "pkg3", "^2.0.0", EdgeKind::Prod);
    let ws = Workspace::single(builder.build().unwrap());
    let sink = CollectingSink::new();

    let closure = ClosureBuilder::new(&ws, &sink)
        .from_config(&ExternalsConfig::with_modules(["pkg3"]))
        .unwrap();

    assert_eq!(closure.len(), 2);
    let patterns = render(&to_patterns(&ws, &closure));
    assert_eq!(
        patterns,
        [
            "!./node_modules/**",
            "./node_modules/pkg2/node_modules/pkg3/**",
            "!./node_modules/pkg2/node_modules/pkg3/node_modules",
            "./node_modules/pkg3/**",
            "!./node_modules/pkg3/node_modules",
        ]
    );
    let summary = ClosureSummary::new(&ws, &closure);
    assert_eq!(
        summary.multiple_versions["pkg3"],
        ["node_modules/pkg2/node_modules/pkg3@2.0.0", "node_modules/pkg3@1.0.0"]
    );
}

#[test]
fn unresolved_optional_edges_are_silent() {
    let mut builder = GraphBuilder::new("/code/app");
    builder
        .package("node_modules/ui", "ui", "1.0.0")
        .dependency("", "ui", "^1.0.0", EdgeKind::Prod)
        .dependency("node_modules/ui", "react", "^18.0.0", EdgeKind::PeerOptional)
        .dependency("node_modules/ui", "fsevents", "^2.0.0", EdgeKind::Optional);
    let ws = Workspace::single(builder.build().unwrap());
    let sink = CollectingSink::new();

    let closure = ClosureBuilder::new(&ws, &sink)
        .from_config(&ExternalsConfig::with_modules(["ui"]))
        .unwrap();

    assert_eq!(locations(&ws, &closure), ["node_modules/ui"]);
    assert!(sink.warnings().is_empty());
}

#[test]
fn missing_and_invalid_edges_warn_and_shrink() {
    let mut builder = GraphBuilder::new("/code/app");
    builder
        .package("node_modules/ui", "ui", "1.0.0")
        .package("node_modules/react", "react", "17.0.2")
        .dependency("", "ui", "^1.0.0", EdgeKind::Prod)
        .dependency("node_modules/ui", "react", "^18.0.0", EdgeKind::Peer)
        .dependency("node_modules/ui", "scheduler", "^0.23.0", EdgeKind::Prod);
    let ws = Workspace::single(builder.build().unwrap());
    let sink = CollectingSink::new();

    let closure = ClosureBuilder::new(&ws, &sink)
        .from_config(&ExternalsConfig::with_modules(["ui"]))
        .unwrap();

    assert_eq!(locations(&ws, &closure), ["node_modules/ui"]);
    assert_eq!(
        sink.warnings(),
        // the peer edge is only verified when closing over `ui`
        [
            Diagnostic::MissingEdge {
                from: "node_modules/ui".into(),
                name: "scheduler".into(),
                spec: "^0.23.0".into(),
            },
            Diagnostic::InvalidEdge {
                from: "node_modules/ui".into(),
                name: "react".into(),
                spec: "^18.0.0".into(),
                installed: "17.0.2".into(),
            },
        ]
    );
}

#[test]
fn cycles_terminate_with_each_member_once() {
    let mut builder = GraphBuilder::new("/code/app");
    builder
        .package("node_modules/a", "a", "1.0.0")
        .package("node_modules/b", "b", "1.0.0")
        .package("node_modules/c", "c", "1.0.0")
        .dependency("", "a", "*", EdgeKind::Prod)
        .dependency("node_modules/a", "b", "*", EdgeKind::Prod)
        .dependency("node_modules/b", "c", "*", EdgeKind::Prod)
        .dependency("node_modules/c", "a", "*", EdgeKind::Prod);
    let ws = Workspace::single(builder.build().unwrap());
    let sink = CollectingSink::new();

    let closure = ClosureBuilder::new(&ws, &sink)
        .from_config(&ExternalsConfig::with_modules(["a"]))
        .unwrap();

    assert_eq!(
        locations(&ws, &closure),
        ["node_modules/a", "node_modules/b", "node_modules/c"]
    );
    assert_eq!(sink.warning_count(), 0);
}

#[test]
fn linked_workspace_member_ships_with_its_target() {
    let mut builder = GraphBuilder::new("/code/app");
    builder
        .package("packages/lib", "lib", "0.3.0")
        .link("node_modules/lib", "packages/lib")
        .package("node_modules/left-pad", "left-pad", "1.3.0")
        .package("node_modules/vitest", "vitest", "1.6.0")
        .dependency("", "lib", "file:packages/lib", EdgeKind::Workspace)
        .dependency("packages/lib", "left-pad", "^1.0.0", EdgeKind::Prod)
        .dependency("packages/lib", "vitest", "^1.0.0", EdgeKind::Dev);
    let ws = Workspace::single(builder.build().unwrap());
    let sink = CollectingSink::new();

    let closure = ClosureBuilder::new(&ws, &sink)
        .from_config(&ExternalsConfig::with_modules(["lib"]))
        .unwrap();

    // the member's devDependencies stay behind
    assert_eq!(
        locations(&ws, &closure),
        ["node_modules/left-pad", "node_modules/lib", "packages/lib"]
    );
}

#[test]
fn dev_root_also_reachable_at_runtime_is_not_reported() {
    // chalk is a root devDependency, but prod dependency `logger` needs it too
    let mut builder = GraphBuilder::new("/code/app");
    builder
        .package("node_modules/logger", "logger", "1.0.0")
        .package("node_modules/chalk", "chalk", "5.3.0")
        .dependency("", "logger", "^1.0.0", EdgeKind::Prod)
        .dependency("", "chalk", "^5.0.0", EdgeKind::Dev)
        .dependency("node_modules/logger", "chalk", "^5.0.0", EdgeKind::Prod);
    let ws = Workspace::single(builder.build().unwrap());
    let sink = CollectingSink::new();

    let closure = ClosureBuilder::new(&ws, &sink)
        .from_config(&ExternalsConfig::with_modules(["chalk"]))
        .unwrap();

    assert_eq!(locations(&ws, &closure), ["node_modules/chalk"]);
    assert!(sink.warnings().is_empty());
}

#[test]
fn replay_matches_the_computed_closure() {
    let mut builder = GraphBuilder::new("/code/app");
    builder
        .package("node_modules/knex", "knex", "3.1.0")
        .package("node_modules/pg", "pg", "8.11.0")
        .package("node_modules/knex/node_modules/debug", "debug", "4.3.4")
        .package("node_modules/debug", "debug", "2.6.9")
        .dependency("", "knex", "^3.0.0", EdgeKind::Prod)
        .dependency("", "pg", "^8.0.0", EdgeKind::Prod)
        .dependency("", "debug", "^2.0.0", EdgeKind::Prod)
        .dependency("node_modules/knex", "debug", "^4.0.0", EdgeKind::Prod);
    let ws = Workspace::single(builder.build().unwrap());
    let sink = CollectingSink::new();

    let config = ExternalsConfig::with_modules(["knex", "pg"]);
    let original = ClosureBuilder::new(&ws, &sink).from_config(&config).unwrap();
    let report = report_from_closure(&ws, &original, &config);

    // through the file format, as the packaging phase would see it
    let path = std::path::Path::new("node-externals-report.json");
    let report = ExternalsReport::from_json(&report.to_json(), path).unwrap();
    let replayed = ClosureBuilder::new(&ws, &sink).from_report(&report);

    assert_eq!(replayed, original);
    assert_eq!(
        package_from_report(&ws, &report, &sink),
        to_patterns(&ws, &original)
    );
    assert_eq!(sink.warning_count(), 0);
}

#[test]
fn replay_falls_back_to_secondary_trees() {
    let mut main = GraphBuilder::new("/code/service");
    main.package("node_modules/knex", "knex", "3.1.0")
        .dependency("", "knex", "^3.0.0", EdgeKind::Prod);
    let mut member = GraphBuilder::new("/code/shared");
    member
        .package("node_modules/lodash", "lodash", "4.17.21")
        .dependency("", "lodash", "^4.0.0", EdgeKind::Prod);
    let ws = Workspace::new(vec![main.build().unwrap(), member.build().unwrap()]).unwrap();
    let sink = CollectingSink::new();

    let report = ExternalsReport::new(
        vec!["node_modules/knex".into(), "node_modules/lodash".into()],
        ExternalsConfig::with_modules(["knex", "lodash"]),
        ws.tree_paths(),
    );
    let closure = ClosureBuilder::new(&ws, &sink).from_report(&report);

    assert_eq!(
        locations(&ws, &closure),
        ["../shared/node_modules/lodash", "node_modules/knex"]
    );
    assert_eq!(
        render(&to_patterns(&ws, &closure)),
        [
            "!./node_modules/**",
            "!../shared/node_modules/**",
            "../shared/node_modules/lodash/**",
            "!../shared/node_modules/lodash/node_modules",
            "./node_modules/knex/**",
            "!./node_modules/knex/node_modules",
        ]
    );
    assert_eq!(sink.warning_count(), 0);
}

#[test]
fn stale_report_entries_warn() {
    let mut builder = GraphBuilder::new("/code/app");
    builder
        .package("node_modules/knex", "knex", "3.1.0")
        .dependency("", "knex", "^3.0.0", EdgeKind::Prod);
    let ws = Workspace::single(builder.build().unwrap());
    let sink = CollectingSink::new();

    let report = ExternalsReport::new(
        vec!["node_modules/knex".into(), "node_modules/gone".into()],
        ExternalsConfig::with_modules(["knex"]),
        vec!["node_modules".into(), "../old/node_modules".into()],
    );
    let closure = ClosureBuilder::new(&ws, &sink).from_report(&report);

    assert_eq!(locations(&ws, &closure), ["node_modules/knex"]);
    assert_eq!(
        sink.warnings(),
        [
            Diagnostic::TreePathsMismatch {
                report: vec!["node_modules".into(), "../old/node_modules".into()],
                current: vec!["node_modules".into()],
            },
            Diagnostic::UnresolvedModuleRoot {
                location: "node_modules/gone".into(),
            },
        ]
    );
}

#[test]
fn forced_roots_join_the_closure() {
    let mut builder = GraphBuilder::new("/code/app");
    builder
        .package("node_modules/knex", "knex", "3.1.0")
        .package("node_modules/react-dom", "react-dom", "18.2.0")
        .dependency("", "knex", "^3.0.0", EdgeKind::Prod);
    let ws = Workspace::single(builder.build().unwrap());
    let sink = CollectingSink::new();

    let mut config = ExternalsConfig::with_modules(["knex"]);
    config.packaging.force_include_module_roots =
        vec!["node_modules/react-dom".into(), "node_modules/missing".into()];
    let closure = ClosureBuilder::new(&ws, &sink).from_config(&config).unwrap();

    assert_eq!(
        locations(&ws, &closure),
        ["node_modules/knex", "node_modules/react-dom"]
    );
    assert_eq!(
        sink.warnings(),
        [Diagnostic::UnresolvedModuleRoot {
            location: "node_modules/missing".into(),
        }]
    );
}
