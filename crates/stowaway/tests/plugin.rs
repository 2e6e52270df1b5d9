//! The bundling phase end to end: lockfile on disk, imports, report, replay

use std::fs;
use std::path::Path;
use std::sync::Arc;

use stowaway::{
    CollectingSink, Diagnostic, ExternalsConfig, ExternalsPlugin, ExternalsReport, LockfileLoader,
    Resolution, Workspace, package_from_config, package_from_report, render,
};
use stowaway_graph::EdgeKind;
use tempfile::TempDir;

const LOCK: &str = r#"{
    "name": "service",
    "lockfileVersion": 3,
    "packages": {
        "": {
            "name": "service",
            "version": "1.0.0",
            "dependencies": { "knex": "^3.0.0", "pg": "^8.0.0", "lodash": "^4.0.0" },
            "devDependencies": { "jest": "^29.0.0" }
        },
        "node_modules/knex": {
            "version": "3.1.0",
            "dependencies": { "debug": "^4.0.0", "pg-connection-string": "^2.6.0" },
            "peerDependencies": { "mysql": "*" },
            "peerDependenciesMeta": { "mysql": { "optional": true } }
        },
        "node_modules/debug": { "version": "4.3.4", "dependencies": { "ms": "2.1.2" } },
        "node_modules/ms": { "version": "2.1.2" },
        "node_modules/pg-connection-string": { "version": "2.6.2" },
        "node_modules/pg": { "version": "8.11.0" },
        "node_modules/lodash": { "version": "4.17.21" },
        "node_modules/jest": { "version": "29.7.0", "dev": true }
    }
}"#;

fn write_package(dir: &Path, name: &str) {
    fs::create_dir_all(dir).unwrap();
    fs::write(dir.join("package.json"), format!(r#"{{ "name": "{name}" }}"#)).unwrap();
    fs::write(dir.join("index.js"), "").unwrap();
}

fn project() -> TempDir {
    let dir = TempDir::new().unwrap();
    let root = dir.path();
    write_package(root, "service");
    fs::write(root.join("package-lock.json"), LOCK).unwrap();
    fs::write(root.join("externals.json"), r#"["pg"]"#).unwrap();
    for name in ["knex", "debug", "ms", "pg-connection-string", "pg", "lodash", "jest"] {
        write_package(&root.join("node_modules").join(name), name);
    }
    dir
}

fn config() -> ExternalsConfig {
    serde_json::from_str(r#"{ "modules": ["knex"], "file": "externals.json" }"#).unwrap()
}

#[tokio::test]
async fn bundling_writes_a_report_packaging_can_replay() {
    let dir = project();
    let root = dir.path();
    let sink = Arc::new(CollectingSink::new());

    let plugin = ExternalsPlugin::build_start(
        Arc::new(LockfileLoader::new()),
        &[root.to_path_buf()],
        config(),
        sink.clone(),
    )
    .await
    .unwrap();

    assert_eq!(plugin.config().modules, ["knex", "pg"]);
    assert_eq!(
        plugin.summary().modules,
        [
            "node_modules/debug@4.3.4",
            "node_modules/knex@3.1.0",
            "node_modules/ms@2.1.2",
            "node_modules/pg@8.11.0",
            "node_modules/pg-connection-string@2.6.2",
        ]
    );

    let entry = root.join("src/handler.js");
    assert_eq!(
        plugin.resolve_id("knex", Some(&entry)).unwrap(),
        Resolution::External { id: "knex".into() }
    );
    assert_eq!(
        plugin.resolve_id("lodash", Some(&entry)).unwrap(),
        Resolution::Default
    );
    assert_eq!(plugin.external_ids(), ["knex"]);

    // the bundle only kept knex
    let (file_name, report) = plugin.generate_bundle(plugin.external_ids()).unwrap();
    assert_eq!(file_name, "node-externals-report.json");
    assert_eq!(report.imported_module_roots, ["node_modules/knex"]);

    let path = root.join(&file_name);
    report.save(&path).unwrap();
    let report = ExternalsReport::load(&path).unwrap();

    let patterns = render(&package_from_report(plugin.workspace(), &report, &*sink));
    assert_eq!(
        patterns,
        [
            "!./node_modules/**",
            "./node_modules/debug/**",
            "!./node_modules/debug/node_modules",
            "./node_modules/knex/**",
            "!./node_modules/knex/node_modules",
            "./node_modules/ms/**",
            "!./node_modules/ms/node_modules",
            "./node_modules/pg-connection-string/**",
            "!./node_modules/pg-connection-string/node_modules",
        ]
    );
    assert_eq!(sink.warning_count(), 0);
}

#[tokio::test]
async fn report_can_be_disabled() {
    let dir = project();
    let mut config = config();
    config.report = Some(stowaway_config::ReportSetting::Enabled(false));

    let plugin = ExternalsPlugin::build_start(
        Arc::new(LockfileLoader::new()),
        &[dir.path().to_path_buf()],
        config,
        Arc::new(CollectingSink::new()),
    )
    .await
    .unwrap();
    assert!(plugin.generate_bundle(["knex"]).is_none());
}

#[tokio::test]
async fn packaging_from_live_config() {
    let dir = project();
    let workspace = Workspace::load(Arc::new(LockfileLoader::new()), &[dir.path().to_path_buf()])
        .await
        .unwrap();
    let sink = CollectingSink::new();

    let patterns = package_from_config(&workspace, config(), &sink).unwrap();
    let rendered = render(&patterns);
    assert!(rendered.contains(&"./node_modules/pg/**".to_string()));
    assert!(rendered.contains(&"./node_modules/knex/**".to_string()));
    assert!(!rendered.contains(&"./node_modules/lodash/**".to_string()));
    assert!(!rendered.contains(&"./node_modules/jest/**".to_string()));
}

#[tokio::test]
async fn dev_only_module_is_reported_not_shipped() {
    let dir = project();
    let sink = Arc::new(CollectingSink::new());

    let plugin = ExternalsPlugin::build_start(
        Arc::new(LockfileLoader::new()),
        &[dir.path().to_path_buf()],
        ExternalsConfig::with_modules(["jest"]),
        sink.clone(),
    )
    .await
    .unwrap();

    assert!(plugin.closure().is_empty());
    assert_eq!(
        sink.warnings(),
        [Diagnostic::RootFiltered {
            location: "node_modules/jest".into(),
            edge_kind: EdgeKind::Dev,
        }]
    );
}
