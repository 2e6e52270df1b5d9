use std::path::PathBuf;

use indexmap::IndexMap;

use crate::graph::{EdgeId, NodeId};

/// A resolved module instance in an installed tree.
///
/// Several nodes can share a `name` with different `version`s and
/// `location`s; each is its own node.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Node {
    pub name: String,
    pub version: String,
    /// Location relative to the graph root, `""` for the root itself.
    pub location: String,
    /// Absolute path on disk.
    pub path: PathBuf,
    pub is_root: bool,
    /// Symlinked alias (workspace member, `file:` link). The install it points
    /// at is owned by `link_target`.
    pub is_link: bool,
    pub link_target: Option<NodeId>,
    pub(crate) edges_out: IndexMap<String, EdgeId>,
    pub(crate) edges_in: Vec<EdgeId>,
}

impl Node {
    pub fn out_degree(&self) -> usize {
        self.edges_out.len()
    }
}
