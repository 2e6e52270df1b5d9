//! Graph loading.
//!
//! A [`GraphLoader`] turns a root directory into a [`Graph`]. The lockfile
//! loader is the one shipped here; anything else that can describe an
//! installed tree (a registry-backed resolver, a test double) plugs in
//! through the same trait.

mod lockfile;

use std::path::{Path, PathBuf};

use async_trait::async_trait;
use path_clean::PathClean;

use crate::error::Result;
use crate::graph::Graph;

pub use lockfile::{LOCKFILE_NAMES, LockfileLoader};

#[async_trait]
pub trait GraphLoader: Send + Sync {
    async fn load(&self, root: &Path) -> Result<Graph>;
}

/// Absolute, cleaned form of `root`.
pub fn absolute_root(root: &Path) -> Result<PathBuf> {
    if root.is_absolute() {
        Ok(root.clean())
    } else {
        Ok(std::env::current_dir()?.join(root).clean())
    }
}
