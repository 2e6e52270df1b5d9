//! Graph construction with Node-style dependency resolution.

use std::path::PathBuf;

use deno_semver::{Version, VersionReq};
use indexmap::IndexMap;
use path_clean::PathClean;

use crate::edge::{Edge, EdgeKind, EdgeState};
use crate::error::{GraphError, Result};
use crate::graph::{EdgeId, Graph, NodeId};
use crate::location;
use crate::node::Node;

#[derive(Debug)]
struct PendingNode {
    name: String,
    version: String,
    location: String,
    link_to: Option<String>,
}

#[derive(Debug)]
struct PendingDependency {
    from: String,
    name: String,
    spec: String,
    kind: EdgeKind,
}

/// Collects packages, links and declared dependencies, then resolves every
/// dependency the way Node's `require` would find it on disk.
///
/// ```
/// use stowaway_graph::{EdgeKind, GraphBuilder};
///
/// let mut builder = GraphBuilder::new("/code/project");
/// builder
///     .package("node_modules/pkg2", "pkg2", "1.0.0")
///     .package("node_modules/pkg3", "pkg3", "2.1.0")
///     .dependency("", "pkg2", "^1.0.0", EdgeKind::Prod)
///     .dependency("node_modules/pkg2", "pkg3", "^2.0.0", EdgeKind::Prod);
/// let graph = builder.build().unwrap();
///
/// let pkg2 = graph.get("node_modules/pkg2").unwrap();
/// let edge = graph.edge(graph.edge_out(pkg2, "pkg3").unwrap());
/// assert_eq!(edge.to(), graph.get("node_modules/pkg3"));
/// ```
#[derive(Debug)]
pub struct GraphBuilder {
    root_path: PathBuf,
    nodes: Vec<PendingNode>,
    by_location: IndexMap<String, usize>,
    dependencies: Vec<PendingDependency>,
}

impl GraphBuilder {
    pub fn new(root_path: impl Into<PathBuf>) -> Self {
        let root_path = root_path.into().clean();
        let name = root_path
            .file_name()
            .map(|name| name.to_string_lossy().into_owned())
            .unwrap_or_default();
        let mut by_location = IndexMap::new();
        by_location.insert(String::new(), 0);
        Self {
            root_path,
            nodes: vec![PendingNode {
                name,
                version: String::new(),
                location: String::new(),
                link_to: None,
            }],
            by_location,
            dependencies: Vec::new(),
        }
    }

    /// Set the root package's own name and version.
    pub fn root(&mut self, name: impl Into<String>, version: impl Into<String>) -> &mut Self {
        let root = &mut self.nodes[0];
        root.name = name.into();
        root.version = version.into();
        self
    }

    /// Add an installed package. Re-adding a location replaces it.
    pub fn package(
        &mut self,
        location: &str,
        name: impl Into<String>,
        version: impl Into<String>,
    ) -> &mut Self {
        self.insert(PendingNode {
            name: name.into(),
            version: version.into(),
            location: location::normalize(location),
            link_to: None,
        });
        self
    }

    /// Add a symlink at `location` pointing at the package folder at
    /// `target` (both relative to the root).
    pub fn link(&mut self, location: &str, target: &str) -> &mut Self {
        let location = location::normalize(location);
        self.insert(PendingNode {
            name: location::package_name(&location).to_string(),
            version: String::new(),
            location,
            link_to: Some(location::normalize(target)),
        });
        self
    }

    /// Declare that the package at `from` depends on `name` with `spec`.
    /// Declaring the same name twice on one package keeps the last one.
    pub fn dependency(
        &mut self,
        from: &str,
        name: impl Into<String>,
        spec: impl Into<String>,
        kind: EdgeKind,
    ) -> &mut Self {
        self.dependencies.push(PendingDependency {
            from: location::normalize(from),
            name: name.into(),
            spec: spec.into(),
            kind,
        });
        self
    }

    pub fn has_package(&self, location: &str) -> bool {
        self.by_location.contains_key(location)
    }

    fn insert(&mut self, node: PendingNode) {
        match self.by_location.get(&node.location) {
            Some(&idx) => self.nodes[idx] = node,
            None => {
                self.by_location.insert(node.location.clone(), self.nodes.len());
                self.nodes.push(node);
            }
        }
    }

    /// Probe `<from>/node_modules/<name>`, then each enclosing package up to
    /// the root.
    fn resolve(&self, from: &str, name: &str) -> Option<usize> {
        let needle = format!("{}/{name}", location::NODE_MODULES);
        let mut base = from;
        loop {
            let candidate = location::join(base, &needle);
            if let Some(&idx) = self.by_location.get(&candidate) {
                return Some(idx);
            }
            if base.is_empty() {
                return None;
            }
            base = location::parent_package(base);
        }
    }

    pub fn build(self) -> Result<Graph> {
        let mut nodes: Vec<Node> = self
            .nodes
            .iter()
            .enumerate()
            .map(|(idx, pending)| Node {
                name: pending.name.clone(),
                version: pending.version.clone(),
                location: pending.location.clone(),
                path: self.root_path.join(&pending.location).clean(),
                is_root: idx == 0,
                is_link: pending.link_to.is_some(),
                link_target: None,
                edges_out: IndexMap::new(),
                edges_in: Vec::new(),
            })
            .collect();

        for (idx, pending) in self.nodes.iter().enumerate() {
            let Some(target) = &pending.link_to else {
                continue;
            };
            match self.by_location.get(target) {
                Some(&target_idx) if target_idx != idx => {
                    nodes[idx].link_target = Some(NodeId(target_idx as u32));
                    nodes[idx].version = nodes[target_idx].version.clone();
                }
                _ => {
                    tracing::warn!(
                        link = %pending.location,
                        target = %target,
                        "link target is not part of the installed tree"
                    );
                }
            }
        }

        let mut edges: Vec<Edge> = Vec::with_capacity(self.dependencies.len());
        for dependency in &self.dependencies {
            let from = *self.by_location.get(&dependency.from).ok_or_else(|| {
                GraphError::format(
                    dependency.from.clone(),
                    format!("dependency '{}' declared by an unknown package", dependency.name),
                )
            })?;

            let state = match self.resolve(&dependency.from, &dependency.name) {
                Some(target) => {
                    let owner = nodes[target].link_target.map_or(target, NodeId::index);
                    if spec_satisfied(&dependency.spec, &nodes[owner].version) {
                        EdgeState::Resolved(NodeId(target as u32))
                    } else {
                        EdgeState::Invalid(NodeId(target as u32))
                    }
                }
                None if dependency.kind.is_optional() => EdgeState::Unresolved,
                None => EdgeState::Missing,
            };

            let edge = Edge {
                from: NodeId(from as u32),
                name: dependency.name.clone(),
                spec: dependency.spec.clone(),
                kind: dependency.kind,
                state,
            };

            match nodes[from].edges_out.get(&dependency.name) {
                Some(existing) => edges[existing.index()] = edge,
                None => {
                    let id = EdgeId(edges.len() as u32);
                    nodes[from].edges_out.insert(dependency.name.clone(), id);
                    edges.push(edge);
                }
            }
        }

        for (idx, edge) in edges.iter().enumerate() {
            if let Some(to) = edge.to() {
                nodes[to.index()].edges_in.push(EdgeId(idx as u32));
            }
        }

        let inventory = self
            .by_location
            .iter()
            .map(|(location, &idx)| (location.clone(), NodeId(idx as u32)))
            .collect();

        Ok(Graph {
            root_path: self.root_path,
            root: NodeId(0),
            nodes,
            edges,
            inventory,
        })
    }
}

/// Whether an installed `version` satisfies a declared `spec`.
///
/// Specs that are not semver ranges (`file:`, `link:`, git URLs, dist-tags)
/// are always satisfied; so are versions we can't parse.
pub fn spec_satisfied(spec: &str, version: &str) -> bool {
    let range = match spec.strip_prefix("npm:") {
        // `npm:@scope/name@^1.0.0`, the first `@` may belong to the scope
        Some(alias) => alias
            .get(1..)
            .and_then(|rest| rest.find('@'))
            .map_or("*", |at| &alias[at + 2..]),
        None => spec,
    };
    if !looks_like_range(range) {
        return true;
    }
    let Ok(req) = VersionReq::parse_from_npm(range) else {
        return true;
    };
    let Ok(version) = Version::parse_from_npm(version) else {
        return true;
    };
    req.matches(&version)
}

fn looks_like_range(spec: &str) -> bool {
    spec.trim()
        .chars()
        .next()
        .is_some_and(|c| c.is_ascii_digit() || "^~<>=*vxX".contains(c))
}
