use std::path::{Path, PathBuf};

use indexmap::IndexMap;

use crate::edge::Edge;
use crate::node::Node;

/// Index of a node inside one [`Graph`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct NodeId(pub(crate) u32);

/// Index of an edge inside one [`Graph`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct EdgeId(pub(crate) u32);

impl NodeId {
    pub fn index(self) -> usize {
        self.0 as usize
    }
}

impl EdgeId {
    pub fn index(self) -> usize {
        self.0 as usize
    }
}

/// An installed dependency tree: the root node, every node below it, the
/// edges between them and the inventory keyed by location.
///
/// Nodes and edges live in arenas owned by the graph; everything else refers
/// to them by index.
#[derive(Debug, Clone)]
pub struct Graph {
    pub(crate) root_path: PathBuf,
    pub(crate) root: NodeId,
    pub(crate) nodes: Vec<Node>,
    pub(crate) edges: Vec<Edge>,
    pub(crate) inventory: IndexMap<String, NodeId>,
}

impl Graph {
    pub fn root_path(&self) -> &Path {
        &self.root_path
    }

    pub fn root(&self) -> NodeId {
        self.root
    }

    pub fn root_node(&self) -> &Node {
        self.node(self.root)
    }

    pub fn node(&self, id: NodeId) -> &Node {
        &self.nodes[id.index()]
    }

    pub fn edge(&self, id: EdgeId) -> &Edge {
        &self.edges[id.index()]
    }

    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }

    pub fn nodes(&self) -> impl Iterator<Item = (NodeId, &Node)> {
        self.nodes
            .iter()
            .enumerate()
            .map(|(idx, node)| (NodeId(idx as u32), node))
    }

    /// Outbound edges declared by `id` itself, in declaration order.
    pub fn edges_out(&self, id: NodeId) -> impl Iterator<Item = EdgeId> + '_ {
        self.node(id).edges_out.values().copied()
    }

    pub fn edge_out(&self, id: NodeId, name: &str) -> Option<EdgeId> {
        self.node(id).edges_out.get(name).copied()
    }

    pub fn edges_in(&self, id: NodeId) -> impl Iterator<Item = EdgeId> + '_ {
        self.node(id).edges_in.iter().copied()
    }

    /// The node that owns the install behind `id`: the link target for
    /// links, `id` otherwise.
    pub fn owner(&self, id: NodeId) -> NodeId {
        self.node(id).link_target.unwrap_or(id)
    }

    pub fn inventory(&self) -> &IndexMap<String, NodeId> {
        &self.inventory
    }

    pub fn get(&self, location: &str) -> Option<NodeId> {
        self.inventory.get(location).copied()
    }

    /// Root outbound edges keyed by dependency name.
    pub fn root_edges(&self) -> &IndexMap<String, EdgeId> {
        &self.node(self.root).edges_out
    }
}
