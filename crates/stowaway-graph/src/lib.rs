//! # stowaway-graph
//!
//! The installed dependency tree of a Node.js project as a graph: one node
//! per installed module instance, one edge per declared dependency, and an
//! inventory keyed by location relative to the root.
//!
//! Two versions of the same package installed at different locations are
//! two nodes. Edges carry their resolution outcome
//! ([`EdgeState`]), decided once when the graph is built, so consumers never
//! have to re-inspect raw lockfile shapes.
//!
//! ## Loading
//!
//! ```no_run
//! use std::path::Path;
//! use stowaway_graph::{GraphLoader, LockfileLoader};
//!
//! # async fn demo() -> stowaway_graph::Result<()> {
//! let graph = LockfileLoader::new().load(Path::new("./my-service")).await?;
//! println!("{} installed modules", graph.len() - 1);
//! # Ok(())
//! # }
//! ```
//!
//! Several roots (a service plus workspace members) merge into a
//! [`Workspace`], where the first root's view shadows the others.

mod builder;
mod edge;
mod error;
mod graph;
pub mod loader;
pub mod location;
mod merge;
mod node;
mod package_json;
mod workspace;

pub use builder::{GraphBuilder, spec_satisfied};
pub use edge::{Edge, EdgeKind, EdgeState};
pub use error::{GraphError, Result};
pub use graph::{EdgeId, Graph, NodeId};
pub use loader::{GraphLoader, LockfileLoader};
pub use merge::merge_maps;
pub use node::Node;
pub use package_json::{PackageJson, PeerDependencyMeta, extract_package_name};
pub use workspace::{EdgeRef, NodeRef, Workspace};
