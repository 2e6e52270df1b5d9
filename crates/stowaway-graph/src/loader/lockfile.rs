//! npm lockfile reader.
//!
//! `lockfileVersion` 2 and 3 describe the installed tree as a flat
//! `packages` map keyed by location. Version 1 nests `dependencies` the way
//! folders nest on disk and leaves root dependency kinds to `package.json`.

use std::path::Path;

use async_trait::async_trait;
use indexmap::IndexMap;
use serde::Deserialize;
use serde_json::Value;

use super::{GraphLoader, absolute_root};
use crate::builder::GraphBuilder;
use crate::edge::EdgeKind;
use crate::error::{GraphError, Result};
use crate::graph::Graph;
use crate::location::{self, NODE_MODULES};
use crate::package_json::PackageJson;

/// Lockfile names in lookup order; a shrinkwrap takes precedence.
pub const LOCKFILE_NAMES: &[&str] = &["npm-shrinkwrap.json", "package-lock.json"];

/// Loads a graph from the lockfile next to a root's `package.json`.
///
/// `devDependencies` of the root and of linked workspace packages are
/// recorded as [`EdgeKind::Dev`] edges; traversal policies decide whether
/// to follow them.
#[derive(Debug, Clone, Copy, Default)]
pub struct LockfileLoader;

/// One entry of the v2/v3 `packages` map.
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct PackageEntry {
    #[serde(default)]
    link: bool,
    resolved: Option<String>,
    #[serde(default)]
    workspaces: Option<Value>,
    #[serde(flatten)]
    manifest: PackageJson,
}

/// One entry of the v1 nested `dependencies` tree.
#[derive(Debug, Deserialize)]
struct TreeEntry {
    version: String,
    #[serde(default)]
    requires: IndexMap<String, String>,
    #[serde(default)]
    dev: bool,
    #[serde(default)]
    optional: bool,
}

impl LockfileLoader {
    pub fn new() -> Self {
        Self
    }

    /// Build a graph from lockfile `content` for the project at `root`.
    ///
    /// `package_json` is the root descriptor; v1 lockfiles need it to know
    /// which dependencies the root declares and with which kind.
    pub fn parse(&self, root: &Path, content: &str, package_json: Option<&str>) -> Result<Graph> {
        let lock_path = root.join("package-lock.json");
        let document: Value = serde_json::from_str(content).map_err(|source| GraphError::Json {
            path: lock_path.clone(),
            source,
        })?;
        let manifest = package_json
            .map(|content| PackageJson::parse(content, &root.join("package.json")))
            .transpose()?;

        let version = document
            .get("lockfileVersion")
            .and_then(Value::as_u64)
            .unwrap_or(1);

        let mut builder = GraphBuilder::new(root);
        match version {
            1 => self.parse_v1(&mut builder, &document, manifest.as_ref())?,
            2 | 3 => self.parse_packages(&mut builder, &document)?,
            other => return Err(GraphError::UnsupportedLockfile(other)),
        }

        let graph = builder.build()?;
        tracing::debug!(
            root = %root.display(),
            lockfile_version = version,
            nodes = graph.len(),
            "loaded dependency graph"
        );
        Ok(graph)
    }

    fn parse_packages(&self, builder: &mut GraphBuilder, document: &Value) -> Result<()> {
        let packages = document
            .get("packages")
            .and_then(Value::as_object)
            .ok_or_else(|| GraphError::format("", "lockfile has no `packages` map"))?;

        let mut entries: IndexMap<String, PackageEntry> = IndexMap::new();
        for (key, value) in packages {
            if !value.is_object() {
                return Err(GraphError::format(key.clone(), "entry is not an object"));
            }
            let entry: PackageEntry = serde_json::from_value(value.clone())
                .map_err(|e| GraphError::format(key.clone(), e.to_string()))?;
            entries.insert(location::normalize(key), entry);
        }

        // links may point at entries that come later in the map
        for (loc, entry) in &entries {
            if loc.is_empty() {
                let root = &entry.manifest;
                builder.root(
                    root.name.clone().unwrap_or_default(),
                    root.version.clone().unwrap_or_default(),
                );
            } else if entry.link {
                let target = entry.resolved.as_deref().ok_or_else(|| {
                    GraphError::format(loc.clone(), "link entry without `resolved` target")
                })?;
                builder.link(loc, target);
            } else {
                let name = entry
                    .manifest
                    .name
                    .clone()
                    .unwrap_or_else(|| location::package_name(loc).to_string());
                builder.package(loc, name, entry.manifest.version.clone().unwrap_or_default());
            }
        }

        let has_workspaces = entries
            .get("")
            .is_some_and(|root| root.workspaces.is_some());
        if has_workspaces {
            for (loc, entry) in &entries {
                if !entry.link || location::parent_package(loc) != "" {
                    continue;
                }
                let Some(target) = entry.resolved.as_deref() else {
                    continue;
                };
                if !target.split('/').any(|segment| segment == NODE_MODULES) {
                    builder.dependency(
                        "",
                        location::package_name(loc),
                        format!("file:{target}"),
                        EdgeKind::Workspace,
                    );
                }
            }
        }

        for (loc, entry) in &entries {
            if entry.link {
                continue;
            }
            // installed packages never have their devDependencies on disk
            let outside_node_modules = !loc.split('/').any(|segment| segment == NODE_MODULES);
            for (name, spec, kind) in entry.manifest.declared_dependencies(outside_node_modules) {
                builder.dependency(loc, name, spec, kind);
            }
        }
        Ok(())
    }

    fn parse_v1(
        &self,
        builder: &mut GraphBuilder,
        document: &Value,
        manifest: Option<&PackageJson>,
    ) -> Result<()> {
        let name = document
            .get("name")
            .and_then(Value::as_str)
            .or_else(|| manifest.and_then(|m| m.name.as_deref()))
            .unwrap_or_default();
        let version = document
            .get("version")
            .and_then(Value::as_str)
            .or_else(|| manifest.and_then(|m| m.version.as_deref()))
            .unwrap_or_default();
        builder.root(name, version);

        let mut top_level: Vec<(String, TreeEntry)> = Vec::new();
        if let Some(dependencies) = document.get("dependencies") {
            let dependencies = dependencies
                .as_object()
                .ok_or_else(|| GraphError::format("", "`dependencies` is not an object"))?;
            let mut pending: Vec<(String, String, &Value)> = dependencies
                .iter()
                .map(|(name, value)| (String::new(), name.clone(), value))
                .collect();

            while let Some((parent, name, value)) = pending.pop() {
                let loc = location::join(&parent, &format!("{NODE_MODULES}/{name}"));
                if !value.is_object() {
                    return Err(GraphError::format(loc, "entry is not an object"));
                }
                let entry: TreeEntry = serde_json::from_value(value.clone())
                    .map_err(|e| GraphError::format(loc.clone(), e.to_string()))?;

                match entry.version.strip_prefix("file:") {
                    Some(target) => {
                        if !builder.has_package(&location::normalize(target)) {
                            builder.package(target, name.clone(), "");
                        }
                        builder.link(&loc, target);
                    }
                    None => {
                        builder.package(&loc, name.clone(), entry.version.clone());
                    }
                }
                for (dep, spec) in &entry.requires {
                    builder.dependency(&loc, dep.clone(), spec.clone(), EdgeKind::Prod);
                }
                if let Some(children) = value.get("dependencies") {
                    let children = children.as_object().ok_or_else(|| {
                        GraphError::format(loc.clone(), "`dependencies` is not an object")
                    })?;
                    pending.extend(
                        children
                            .iter()
                            .map(|(child, value)| (loc.clone(), child.clone(), value)),
                    );
                }
                if parent.is_empty() {
                    top_level.push((name, entry));
                }
            }
        }

        match manifest {
            Some(manifest) => {
                for (name, spec, kind) in manifest.declared_dependencies(true) {
                    builder.dependency("", name, spec, kind);
                }
            }
            None => {
                // without a descriptor the top level of the tree is all we know
                for (name, entry) in &top_level {
                    let kind = if entry.dev {
                        EdgeKind::Dev
                    } else if entry.optional {
                        EdgeKind::Optional
                    } else {
                        EdgeKind::Prod
                    };
                    builder.dependency("", name.clone(), entry.version.clone(), kind);
                }
            }
        }
        Ok(())
    }
}

#[async_trait]
impl GraphLoader for LockfileLoader {
    async fn load(&self, root: &Path) -> Result<Graph> {
        let root = absolute_root(root)?;

        let mut content = None;
        for name in LOCKFILE_NAMES {
            match tokio::fs::read_to_string(root.join(name)).await {
                Ok(text) => {
                    content = Some(text);
                    break;
                }
                Err(e) if e.kind() == std::io::ErrorKind::NotFound => continue,
                Err(e) => return Err(e.into()),
            }
        }
        let content = content.ok_or_else(|| GraphError::LockfileNotFound(root.clone()))?;

        let package_json = match tokio::fs::read_to_string(root.join("package.json")).await {
            Ok(text) => Some(text),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => None,
            Err(e) => return Err(e.into()),
        };

        self.parse(&root, &content, package_json.as_deref())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::edge::EdgeState;

    const V3: &str = r#"{
        "name": "project",
        "version": "1.0.0",
        "lockfileVersion": 3,
        "packages": {
            "": {
                "name": "project",
                "version": "1.0.0",
                "dependencies": { "pkg2": "^1.0.0" },
                "devDependencies": { "jest": "^29.0.0" }
            },
            "node_modules/pkg2": {
                "version": "1.0.0",
                "dependencies": { "pkg3": "^2.0.0" }
            },
            "node_modules/pkg2/node_modules/pkg3": { "version": "2.0.0" },
            "node_modules/pkg3": { "version": "1.0.0" },
            "node_modules/jest": { "version": "29.1.0", "dev": true }
        }
    }"#;

    #[test]
    fn v3_packages_map() {
        let graph = LockfileLoader::new().parse(Path::new("/p"), V3, None).unwrap();
        assert_eq!(graph.root_node().name, "project");
        assert_eq!(graph.len(), 5);

        let pkg2 = graph.get("node_modules/pkg2").unwrap();
        let edge = graph.edge(graph.edge_out(pkg2, "pkg3").unwrap());
        assert_eq!(edge.to(), graph.get("node_modules/pkg2/node_modules/pkg3"));
    }

    #[test]
    fn v3_root_dev_dependencies_are_dev_edges() {
        let graph = LockfileLoader::new().parse(Path::new("/p"), V3, None).unwrap();
        let jest = graph.edge(graph.edge_out(graph.root(), "jest").unwrap());
        assert_eq!(jest.kind, EdgeKind::Dev);
        assert_eq!(jest.to(), graph.get("node_modules/jest"));
    }

    #[test]
    fn v3_installed_packages_skip_dev_dependencies() {
        let lock = r#"{
            "lockfileVersion": 3,
            "packages": {
                "": { "name": "app", "dependencies": { "a": "^1.0.0" } },
                "node_modules/a": {
                    "version": "1.0.0",
                    "devDependencies": { "mocha": "^10.0.0" }
                }
            }
        }"#;
        let graph = LockfileLoader::new().parse(Path::new("/app"), lock, None).unwrap();
        let a = graph.get("node_modules/a").unwrap();
        assert!(graph.edge_out(a, "mocha").is_none());
    }

    #[test]
    fn v3_workspace_links() {
        let lock = r#"{
            "lockfileVersion": 3,
            "packages": {
                "": { "name": "mono", "workspaces": ["packages/*"] },
                "node_modules/ws": { "resolved": "packages/ws", "link": true },
                "packages/ws": { "name": "ws", "version": "0.1.0", "dependencies": { "dep": "^1.0.0" } },
                "node_modules/dep": { "version": "1.3.0" }
            }
        }"#;
        let graph = LockfileLoader::new().parse(Path::new("/mono"), lock, None).unwrap();
        let link = graph.get("node_modules/ws").unwrap();
        let edge = graph.edge(graph.edge_out(graph.root(), "ws").unwrap());
        assert_eq!(edge.kind, EdgeKind::Workspace);
        assert_eq!(edge.state, EdgeState::Resolved(link));

        let target = graph.owner(link);
        let dep = graph.edge(graph.edge_out(target, "dep").unwrap());
        assert_eq!(dep.to(), graph.get("node_modules/dep"));
    }

    #[test]
    fn v1_nested_tree() {
        let lock = r#"{
            "name": "project",
            "version": "1.0.0",
            "lockfileVersion": 1,
            "dependencies": {
                "pkg2": {
                    "version": "1.0.0",
                    "requires": { "pkg3": "^2.0.0" },
                    "dependencies": { "pkg3": { "version": "2.0.0" } }
                },
                "pkg3": { "version": "1.0.0" },
                "jest": { "version": "29.0.0", "dev": true }
            }
        }"#;
        let package_json = r#"{
            "name": "project",
            "dependencies": { "pkg2": "^1.0.0", "pkg3": "^1.0.0" },
            "devDependencies": { "jest": "^29.0.0" }
        }"#;
        let graph = LockfileLoader::new()
            .parse(Path::new("/p"), lock, Some(package_json))
            .unwrap();

        let nested = graph.get("node_modules/pkg2/node_modules/pkg3").unwrap();
        assert_eq!(graph.node(nested).version, "2.0.0");
        let pkg2 = graph.get("node_modules/pkg2").unwrap();
        assert_eq!(graph.edge(graph.edge_out(pkg2, "pkg3").unwrap()).to(), Some(nested));
        assert_eq!(graph.root_node().out_degree(), 3);
        let jest = graph.edge(graph.edge_out(graph.root(), "jest").unwrap());
        assert_eq!(jest.kind, EdgeKind::Dev);
    }

    #[test]
    fn v1_without_descriptor_uses_top_level() {
        let lock = r#"{
            "lockfileVersion": 1,
            "dependencies": {
                "a": { "version": "1.0.0" },
                "b": { "version": "1.0.0", "dev": true }
            }
        }"#;
        let graph = LockfileLoader::new().parse(Path::new("/p"), lock, None).unwrap();
        assert_eq!(graph.edge(graph.edge_out(graph.root(), "a").unwrap()).kind, EdgeKind::Prod);
        assert_eq!(graph.edge(graph.edge_out(graph.root(), "b").unwrap()).kind, EdgeKind::Dev);
    }

    #[test]
    fn malformed_entries_are_format_errors() {
        let string_entry = r#"{ "lockfileVersion": 1, "dependencies": { "a": "1.0.0" } }"#;
        let err = LockfileLoader::new()
            .parse(Path::new("/p"), string_entry, None)
            .unwrap_err();
        assert!(matches!(err, GraphError::Format { ref location, .. } if location == "node_modules/a"));

        let object_version = r#"{
            "lockfileVersion": 3,
            "packages": { "": {}, "node_modules/a": { "version": { "major": 1 } } }
        }"#;
        let err = LockfileLoader::new()
            .parse(Path::new("/p"), object_version, None)
            .unwrap_err();
        assert!(matches!(err, GraphError::Format { .. }));
    }

    #[test]
    fn unsupported_version() {
        let err = LockfileLoader::new()
            .parse(Path::new("/p"), r#"{ "lockfileVersion": 9 }"#, None)
            .unwrap_err();
        assert!(matches!(err, GraphError::UnsupportedLockfile(9)));
    }
}
