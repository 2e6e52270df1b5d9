use std::fmt;

use serde::{Deserialize, Serialize};

use crate::graph::NodeId;

/// Classification of a dependency relation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum EdgeKind {
    Prod,
    Dev,
    Optional,
    Peer,
    PeerOptional,
    Workspace,
}

impl EdgeKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Prod => "prod",
            Self::Dev => "dev",
            Self::Optional => "optional",
            Self::Peer => "peer",
            Self::PeerOptional => "peerOptional",
            Self::Workspace => "workspace",
        }
    }

    /// Optional kinds are expected to go unresolved now and then.
    pub fn is_optional(&self) -> bool {
        matches!(self, Self::Optional | Self::PeerOptional)
    }
}

impl fmt::Display for EdgeKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Outcome of resolving an edge, decided once when the graph is built.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum EdgeState {
    /// Target installed and satisfies the declared spec.
    Resolved(NodeId),
    /// Target installed but its version violates the declared range.
    Invalid(NodeId),
    /// Nothing installed for a required dependency.
    Missing,
    /// Nothing installed for an optional or optional-peer dependency.
    Unresolved,
}

/// A directed dependency relation `from → to`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Edge {
    pub from: NodeId,
    /// Dependency name as declared (an alias for `npm:` specs).
    pub name: String,
    /// Declared spec, e.g. `^1.2.0` or `file:../pkg`.
    pub spec: String,
    pub kind: EdgeKind,
    pub state: EdgeState,
}

impl Edge {
    /// Installed target, if any. Invalid edges still point somewhere.
    pub fn to(&self) -> Option<NodeId> {
        match self.state {
            EdgeState::Resolved(id) | EdgeState::Invalid(id) => Some(id),
            EdgeState::Missing | EdgeState::Unresolved => None,
        }
    }

    pub fn is_missing(&self) -> bool {
        self.state == EdgeState::Missing
    }

    pub fn is_invalid(&self) -> bool {
        matches!(self.state, EdgeState::Invalid(_))
    }
}

impl fmt::Display for Edge {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} {}@{}", self.kind, self.name, self.spec)
    }
}
