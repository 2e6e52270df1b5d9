//! Traversal policies: which edges the first stage follows and which
//! nodes survive into the final closure.

use stowaway_graph::{Edge, EdgeKind, Node};

pub trait EdgeFilter: Send + Sync {
    fn allows(&self, edge: &Edge) -> bool;
}

impl<F> EdgeFilter for F
where
    F: Fn(&Edge) -> bool + Send + Sync,
{
    fn allows(&self, edge: &Edge) -> bool {
        self(edge)
    }
}

pub trait NodeFilter: Send + Sync {
    fn keep(&self, node: &Node) -> bool;
}

impl<F> NodeFilter for F
where
    F: Fn(&Node) -> bool + Send + Sync,
{
    fn keep(&self, node: &Node) -> bool {
        self(node)
    }
}

/// Follows edges of the listed kinds only.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct KindFilter {
    kinds: Vec<EdgeKind>,
}

impl KindFilter {
    pub fn new(kinds: impl IntoIterator<Item = EdgeKind>) -> Self {
        Self {
            kinds: kinds.into_iter().collect(),
        }
    }

    /// Runtime dependencies: `prod` and `workspace` edges. Dev, peer and
    /// optional edges are left to whoever installs them.
    pub fn dependencies() -> Self {
        Self::new([EdgeKind::Prod, EdgeKind::Workspace])
    }

    pub fn all() -> Self {
        Self::new([
            EdgeKind::Prod,
            EdgeKind::Dev,
            EdgeKind::Optional,
            EdgeKind::Peer,
            EdgeKind::PeerOptional,
            EdgeKind::Workspace,
        ])
    }
}

impl Default for KindFilter {
    fn default() -> Self {
        Self::dependencies()
    }
}

impl EdgeFilter for KindFilter {
    fn allows(&self, edge: &Edge) -> bool {
        self.kinds.contains(&edge.kind)
    }
}

/// Keeps every node.
#[derive(Debug, Clone, Copy, Default)]
pub struct KeepAll;

impl NodeFilter for KeepAll {
    fn keep(&self, _node: &Node) -> bool {
        true
    }
}
