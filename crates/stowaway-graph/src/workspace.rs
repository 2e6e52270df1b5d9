//! Several package roots merged into one addressable space.
//!
//! The first root is the main root. Every lookup table is merged with
//! [`merge_maps`], so the main root's view of a location or dependency name
//! shadows what a secondary root says about the same key.

use std::path::{Path, PathBuf};
use std::sync::Arc;

use indexmap::IndexMap;
use tokio::task::JoinSet;

use crate::edge::Edge;
use crate::error::{GraphError, Result};
use crate::graph::{EdgeId, Graph, NodeId};
use crate::loader::GraphLoader;
use crate::location;
use crate::merge::merge_maps;
use crate::node::Node;

/// A node addressed across roots: which graph, and which node inside it.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct NodeRef {
    pub graph: usize,
    pub node: NodeId,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct EdgeRef {
    pub graph: usize,
    pub edge: EdgeId,
}

#[derive(Debug, Clone)]
pub struct Workspace {
    graphs: Vec<Graph>,
    /// Each root's location relative to the main root (`""` for the main root)
    prefixes: Vec<String>,
    root_edges: IndexMap<String, EdgeRef>,
    inventory: IndexMap<String, NodeRef>,
    relative_inventory: IndexMap<String, NodeRef>,
}

impl Workspace {
    /// Merge already loaded graphs, main root first.
    pub fn new(graphs: Vec<Graph>) -> Result<Self> {
        let main_root = graphs.first().ok_or(GraphError::NoRoots)?.root_path().to_path_buf();

        let prefixes: Vec<String> = graphs
            .iter()
            .map(|graph| {
                location::relative(&main_root, graph.root_path())
                    .unwrap_or_else(|| location::to_location(graph.root_path()))
            })
            .collect();

        let root_edges = merge_maps(
            graphs.iter().enumerate().map(|(idx, graph)| {
                graph
                    .root_edges()
                    .iter()
                    .map(|(name, &edge)| {
                        let target = graph.edge(edge).to();
                        (name.clone(), (EdgeRef { graph: idx, edge }, target.is_none()))
                    })
                    .collect::<IndexMap<_, _>>()
            }),
            |(_, no_target)| *no_target,
        )
        .into_iter()
        .map(|(name, (edge, _))| (name, edge))
        .collect();

        let inventory = merge_maps(
            graphs.iter().enumerate().map(|(idx, graph)| {
                graph
                    .inventory()
                    .iter()
                    .map(|(location, &node)| (location.clone(), NodeRef { graph: idx, node }))
                    .collect::<IndexMap<_, _>>()
            }),
            |_| false,
        );

        let relative_inventory = merge_maps(
            graphs.iter().enumerate().map(|(idx, graph)| {
                let prefix = &prefixes[idx];
                graph
                    .inventory()
                    .iter()
                    .map(|(location, &node)| {
                        (location::join(prefix, location), NodeRef { graph: idx, node })
                    })
                    .collect::<IndexMap<_, _>>()
            }),
            |_| false,
        );

        tracing::debug!(
            roots = graphs.len(),
            locations = relative_inventory.len(),
            "merged workspace"
        );

        Ok(Self {
            graphs,
            prefixes,
            root_edges,
            inventory,
            relative_inventory,
        })
    }

    pub fn single(graph: Graph) -> Self {
        Self::new(vec![graph]).unwrap_or_else(|_| unreachable!("one graph is never empty"))
    }

    /// Load every root concurrently, then merge them in the given order.
    pub async fn load(loader: Arc<dyn GraphLoader>, roots: &[PathBuf]) -> Result<Self> {
        if roots.is_empty() {
            return Err(GraphError::NoRoots);
        }

        let mut tasks = JoinSet::new();
        for (idx, root) in roots.iter().enumerate() {
            let loader = Arc::clone(&loader);
            let root = root.clone();
            tasks.spawn(async move { (idx, loader.load(&root).await) });
        }

        let mut graphs: Vec<Option<Graph>> = vec![None; roots.len()];
        while let Some(joined) = tasks.join_next().await {
            let (idx, graph) = joined.map_err(|e| GraphError::Join(e.to_string()))?;
            graphs[idx] = Some(graph?);
        }

        Self::new(graphs.into_iter().flatten().collect())
    }

    pub fn main_root(&self) -> &Path {
        self.graphs[0].root_path()
    }

    pub fn graphs(&self) -> &[Graph] {
        &self.graphs
    }

    pub fn graph(&self, idx: usize) -> &Graph {
        &self.graphs[idx]
    }

    pub fn node(&self, node: NodeRef) -> &Node {
        self.graphs[node.graph].node(node.node)
    }

    pub fn edge(&self, edge: EdgeRef) -> &Edge {
        self.graphs[edge.graph].edge(edge.edge)
    }

    pub fn edge_target(&self, edge: EdgeRef) -> Option<NodeRef> {
        self.edge(edge).to().map(|node| NodeRef {
            graph: edge.graph,
            node,
        })
    }

    /// Install that backs `node`: the link target for links.
    pub fn owner(&self, node: NodeRef) -> NodeRef {
        NodeRef {
            graph: node.graph,
            node: self.graphs[node.graph].owner(node.node),
        }
    }

    /// Outbound edges of a node. Links expose their target's edges, root
    /// nodes of any graph expose the merged root edges.
    pub fn edges_out(&self, node: NodeRef) -> Vec<EdgeRef> {
        if self.node(node).is_root {
            return self.root_edges.values().copied().collect();
        }
        let owner = self.owner(node);
        self.graphs[owner.graph]
            .edges_out(owner.node)
            .map(|edge| EdgeRef {
                graph: owner.graph,
                edge,
            })
            .collect()
    }

    pub fn edge_out(&self, node: NodeRef, name: &str) -> Option<EdgeRef> {
        if self.node(node).is_root {
            return self.root_edge(name);
        }
        let owner = self.owner(node);
        self.graphs[owner.graph]
            .edge_out(owner.node, name)
            .map(|edge| EdgeRef {
                graph: owner.graph,
                edge,
            })
    }

    /// Merged outbound edges of all roots, keyed by dependency name.
    pub fn root_edges(&self) -> &IndexMap<String, EdgeRef> {
        &self.root_edges
    }

    pub fn root_edge(&self, name: &str) -> Option<EdgeRef> {
        self.root_edges.get(name).copied()
    }

    pub fn main_root_node(&self) -> NodeRef {
        NodeRef {
            graph: 0,
            node: self.graphs[0].root(),
        }
    }

    /// Look a location up as its own root reports it (`node_modules/pkg3`).
    pub fn lookup(&self, location: &str) -> Option<NodeRef> {
        self.inventory.get(location).copied()
    }

    /// Look a location up relative to the main root (`../pkg2/node_modules/x`).
    pub fn lookup_relative(&self, location: &str) -> Option<NodeRef> {
        self.relative_inventory.get(location).copied()
    }

    pub fn inventory(&self) -> &IndexMap<String, NodeRef> {
        &self.inventory
    }

    pub fn relative_inventory(&self) -> &IndexMap<String, NodeRef> {
        &self.relative_inventory
    }

    /// Location of `node` relative to the main root.
    pub fn relative_location(&self, node: NodeRef) -> String {
        location::join(&self.prefixes[node.graph], &self.node(node).location)
    }

    /// `node_modules` directory of every root relative to the main root, in
    /// precedence order.
    pub fn tree_paths(&self) -> Vec<String> {
        self.prefixes
            .iter()
            .map(|prefix| location::join(prefix, location::NODE_MODULES))
            .collect()
    }

    pub fn nodes(&self) -> impl Iterator<Item = (NodeRef, &Node)> + '_ {
        self.graphs.iter().enumerate().flat_map(|(graph, g)| {
            g.nodes()
                .map(move |(node, n)| (NodeRef { graph, node }, n))
        })
    }

    /// Whether any installed node carries `name`.
    pub fn contains_package(&self, name: &str) -> bool {
        self.nodes().any(|(_, node)| node.name == name)
    }

    /// Node installed at `dir`, an absolute package directory.
    pub fn node_for_dir(&self, dir: &Path) -> Option<NodeRef> {
        let key = location::relative(self.main_root(), dir)?;
        self.lookup_relative(&key)
    }
}
