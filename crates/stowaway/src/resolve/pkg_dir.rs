use std::fs;
use std::path::{Path, PathBuf};

use dashmap::DashMap;
use serde::Deserialize;

#[derive(Deserialize)]
struct NameOnly {
    name: Option<String>,
}

/// Finds the nearest directory whose `package.json` has a `name`.
///
/// Descriptors without a name (`{"type": "module"}` markers inside a
/// package's build output) are skipped. Answers are cached per directory,
/// and the cache is safe to share between concurrent lookups.
#[derive(Debug, Default)]
pub struct PackageDirCache {
    dirs: DashMap<PathBuf, Option<PathBuf>>,
}

impl PackageDirCache {
    pub fn new() -> Self {
        Self::default()
    }

    /// Package directory of `file`, which may itself be a directory.
    pub fn find(&self, file: &Path) -> Option<PathBuf> {
        let start = if file.is_dir() { file } else { file.parent()? };
        self.find_from(start)
    }

    fn find_from(&self, dir: &Path) -> Option<PathBuf> {
        if let Some(cached) = self.dirs.get(dir) {
            return cached.clone();
        }
        let found = if has_named_descriptor(dir) {
            Some(dir.to_path_buf())
        } else {
            dir.parent().and_then(|parent| self.find_from(parent))
        };
        self.dirs.insert(dir.to_path_buf(), found.clone());
        found
    }

    pub fn len(&self) -> usize {
        self.dirs.len()
    }

    pub fn is_empty(&self) -> bool {
        self.dirs.is_empty()
    }
}

fn has_named_descriptor(dir: &Path) -> bool {
    let path = dir.join("package.json");
    let Ok(content) = fs::read_to_string(&path) else {
        return false;
    };
    match serde_json::from_str::<NameOnly>(&content) {
        Ok(descriptor) => descriptor.name.is_some_and(|name| !name.is_empty()),
        Err(e) => {
            tracing::debug!(path = %path.display(), error = %e, "unreadable package.json");
            false
        }
    }
}
