//! The external closure: every installed module that has to ship because a
//! configured module (or a report entry) is kept external.
//!
//! Computation runs in two stages. The first stage walks the dependency
//! tree from the root through the edges the [`EdgeFilter`] allows and
//! collects the nodes matching the config; those are the closure's roots.
//! The second stage adds everything reachable from a root through any edge
//! kind, since an external module resolves its own dependencies at runtime.
//! Report replay skips the first stage and takes its roots from the report.

use indexmap::IndexSet;
use rustc_hash::FxHashSet;
use stowaway_config::{ConfigError, ExternalsConfig, ExternalsReport};
use stowaway_graph::{EdgeKind, EdgeRef, EdgeState, NodeRef, Workspace, location};

use crate::diagnostics::{Diagnostic, DiagnosticSink};
use crate::error::Result;
use crate::filter::{EdgeFilter, KeepAll, KindFilter, NodeFilter};
use crate::spec::SpecSet;

/// A computed closure. Members are node identities, so two installed
/// versions of one package are two members.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Closure {
    roots: IndexSet<NodeRef>,
    nodes: IndexSet<NodeRef>,
}

impl Closure {
    pub fn contains(&self, node: NodeRef) -> bool {
        self.nodes.contains(&node)
    }

    /// Top-level externals the closure was grown from.
    pub fn roots(&self) -> &IndexSet<NodeRef> {
        &self.roots
    }

    pub fn nodes(&self) -> &IndexSet<NodeRef> {
        &self.nodes
    }

    pub fn iter(&self) -> impl Iterator<Item = NodeRef> + '_ {
        self.nodes.iter().copied()
    }

    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }
}

/// Where the closure's roots come from.
enum RootSource<'c> {
    Config(&'c SpecSet),
    Report(&'c ExternalsReport),
}

pub struct ClosureBuilder<'a> {
    workspace: &'a Workspace,
    sink: &'a dyn DiagnosticSink,
    edge_filter: Box<dyn EdgeFilter + 'a>,
    node_filter: Box<dyn NodeFilter + 'a>,
}

impl<'a> ClosureBuilder<'a> {
    /// Builder with the default policy: runtime dependency edges only, every
    /// node kept.
    pub fn new(workspace: &'a Workspace, sink: &'a dyn DiagnosticSink) -> Self {
        Self {
            workspace,
            sink,
            edge_filter: Box::new(KindFilter::dependencies()),
            node_filter: Box::new(KeepAll),
        }
    }

    pub fn edge_filter(mut self, filter: impl EdgeFilter + 'a) -> Self {
        self.edge_filter = Box::new(filter);
        self
    }

    pub fn node_filter(mut self, filter: impl NodeFilter + 'a) -> Self {
        self.node_filter = Box::new(filter);
        self
    }

    /// Closure of a resolved config (its `file` already merged in).
    pub fn from_config(&self, config: &ExternalsConfig) -> Result<Closure> {
        if config.modules.is_empty() {
            return Err(ConfigError::NoModules.into());
        }
        let specs = SpecSet::parse(&config.modules)?;
        for spec in specs.iter() {
            if !self.workspace.contains_package(spec.name()) {
                return Err(ConfigError::UnknownModule {
                    name: spec.name().to_string(),
                }
                .into());
            }
        }
        Ok(self.build(RootSource::Config(&specs), config))
    }

    /// Closure replayed from a report. No spec matching happens; the roots
    /// are the report's locations.
    pub fn from_report(&self, report: &ExternalsReport) -> Closure {
        let current = self.workspace.tree_paths();
        if !report.node_modules_tree_paths.is_empty() && report.node_modules_tree_paths != current
        {
            self.sink.emit(Diagnostic::TreePathsMismatch {
                report: report.node_modules_tree_paths.clone(),
                current,
            });
        }
        self.build(RootSource::Report(report), &report.config)
    }

    fn build(&self, source: RootSource<'_>, config: &ExternalsConfig) -> Closure {
        let mut walk = Walk::new(self.workspace, self.sink);

        let mut roots = match source {
            RootSource::Config(specs) => self.match_roots(&mut walk, specs),
            RootSource::Report(report) => {
                let mut roots = IndexSet::new();
                for location in &report.imported_module_roots {
                    match self.lookup_report_entry(location, &report.node_modules_tree_paths) {
                        Some(node) => {
                            roots.insert(node);
                        }
                        None => self.sink.emit(Diagnostic::UnresolvedModuleRoot {
                            location: location.clone(),
                        }),
                    }
                }
                roots
            }
        };

        for location in &config.packaging.force_include_module_roots {
            match self.workspace.lookup_relative(location) {
                Some(node) => {
                    roots.insert(node);
                }
                None => self.sink.emit(Diagnostic::UnresolvedModuleRoot {
                    location: location.clone(),
                }),
            }
        }

        let mut nodes = IndexSet::new();
        for &root in &roots {
            walk.close_over(root, &mut nodes);
        }

        let nodes: IndexSet<NodeRef> = nodes
            .into_iter()
            .filter(|&node| {
                let node = self.workspace.node(node);
                self.node_filter.keep(node) && !config.is_excluded(&node.name)
            })
            .collect();
        let roots = roots.into_iter().filter(|root| nodes.contains(root)).collect();

        self.sink.emit(Diagnostic::KeptExternal { count: nodes.len() });
        Closure { roots, nodes }
    }

    /// First stage: depth-first over filtered edges from the main root,
    /// collecting every target a spec matches.
    fn match_roots(&self, walk: &mut Walk<'_>, specs: &SpecSet) -> IndexSet<NodeRef> {
        let workspace = self.workspace;

        let mut roots = IndexSet::new();
        let mut seen: FxHashSet<NodeRef> = FxHashSet::default();
        let main_root = workspace.main_root_node();
        seen.insert(main_root);
        let mut stack = vec![main_root];

        while let Some(node) = stack.pop() {
            for edge in workspace.edges_out(node) {
                if !self.edge_filter.allows(workspace.edge(edge)) {
                    continue;
                }
                let Some(target) = walk.verify(edge) else {
                    continue;
                };
                if specs.matches(workspace.node(target)) {
                    roots.insert(target);
                }
                if seen.insert(target) {
                    stack.push(target);
                }
            }
        }

        // matches only the filter keeps out, e.g. a module installed as a
        // devDependency
        for (_, &edge) in workspace.root_edges() {
            let edge_data = workspace.edge(edge);
            if self.edge_filter.allows(edge_data) {
                continue;
            }
            let Some(target) = workspace.edge_target(edge) else {
                continue;
            };
            if specs.matches(workspace.node(target)) && !roots.contains(&target) {
                self.sink.emit(Diagnostic::RootFiltered {
                    location: workspace.relative_location(target),
                    edge_kind: edge_data.kind,
                });
            }
        }

        tracing::debug!(roots = roots.len(), "matched root externals");
        roots
    }

    /// Resolve a report location, retrying under each recorded tree path.
    fn lookup_report_entry(&self, location: &str, tree_paths: &[String]) -> Option<NodeRef> {
        if let Some(node) = self.workspace.lookup_relative(location) {
            return Some(node);
        }
        let inside = location
            .strip_prefix(location::NODE_MODULES)
            .and_then(|rest| rest.strip_prefix('/'))?;
        tree_paths.iter().find_map(|tree| {
            let candidate = location::join(tree, inside);
            let node = self.workspace.lookup_relative(&candidate)?;
            tracing::debug!(location, candidate = %candidate, "resolved report entry via tree path");
            Some(node)
        })
    }
}

/// Traversal state shared by both stages: edge verification, with each
/// anomaly reported once.
struct Walk<'w> {
    workspace: &'w Workspace,
    sink: &'w dyn DiagnosticSink,
    reported: FxHashSet<EdgeRef>,
}

struct Frame {
    node: NodeRef,
    edges: Vec<EdgeRef>,
    next: usize,
}

impl<'w> Walk<'w> {
    fn new(workspace: &'w Workspace, sink: &'w dyn DiagnosticSink) -> Self {
        Self {
            workspace,
            sink,
            reported: FxHashSet::default(),
        }
    }

    /// Target of a usable edge. Missing and invalid edges are skipped with a
    /// warning, unresolved optional edges silently.
    fn verify(&mut self, edge: EdgeRef) -> Option<NodeRef> {
        let data = self.workspace.edge(edge);
        let diagnostic = match data.state {
            EdgeState::Resolved(_) => return self.workspace.edge_target(edge),
            EdgeState::Unresolved => return None,
            EdgeState::Missing => Diagnostic::MissingEdge {
                from: self.from_location(edge),
                name: data.name.clone(),
                spec: data.spec.clone(),
            },
            EdgeState::Invalid(to) => Diagnostic::InvalidEdge {
                from: self.from_location(edge),
                name: data.name.clone(),
                spec: data.spec.clone(),
                installed: self.workspace.graph(edge.graph).node(to).version.clone(),
            },
        };
        if self.reported.insert(edge) {
            self.sink.emit(diagnostic);
        }
        None
    }

    fn from_location(&self, edge: EdgeRef) -> String {
        let from = NodeRef {
            graph: edge.graph,
            node: self.workspace.edge(edge).from,
        };
        let location = self.workspace.relative_location(from);
        if location.is_empty() { ".".to_string() } else { location }
    }

    /// Second stage: add `root` and everything reachable from it through
    /// any runtime edge kind.
    ///
    /// `on_path` holds the current descent path and stops cycles; `nodes`
    /// doubles as the global visited set, so a node shared by many parents
    /// is expanded once.
    fn close_over(&mut self, root: NodeRef, nodes: &mut IndexSet<NodeRef>) {
        if !self.add(root, nodes) {
            return;
        }
        let mut on_path: FxHashSet<NodeRef> = FxHashSet::default();
        on_path.insert(root);
        let mut stack = vec![self.frame(root)];

        while let Some(frame) = stack.last_mut() {
            let Some(&edge) = frame.edges.get(frame.next) else {
                on_path.remove(&frame.node);
                stack.pop();
                continue;
            };
            frame.next += 1;

            // devDependencies of a linked package don't ship with it
            if self.workspace.edge(edge).kind == EdgeKind::Dev {
                continue;
            }
            let Some(target) = self.verify(edge) else {
                continue;
            };
            if on_path.contains(&target) {
                tracing::debug!(
                    location = %self.workspace.relative_location(target),
                    "dependency cycle"
                );
                continue;
            }
            if !self.add(target, nodes) {
                continue;
            }
            on_path.insert(target);
            stack.push(self.frame(target));
        }
    }

    /// Insert a node, and the install behind it when it's a link. Returns
    /// whether the node was new.
    fn add(&self, node: NodeRef, nodes: &mut IndexSet<NodeRef>) -> bool {
        if !nodes.insert(node) {
            return false;
        }
        let owner = self.workspace.owner(node);
        if owner != node {
            nodes.insert(owner);
        }
        true
    }

    fn frame(&self, node: NodeRef) -> Frame {
        Frame {
            node,
            edges: self.workspace.edges_out(node),
            next: 0,
        }
    }
}
