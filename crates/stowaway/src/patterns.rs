//! Packager include/exclude patterns for a closure.
//!
//! Every root's `node_modules` is excluded wholesale first. Each external
//! then gets `./<location>/**` followed by `!./<location>/node_modules`, so
//! including a package never drags its nested installs along; nested
//! externals come with their own pair.

use std::fmt;

use stowaway_graph::{Workspace, location};

use crate::closure::Closure;

#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum Pattern {
    Include(String),
    Exclude(String),
}

impl Pattern {
    pub fn path(&self) -> &str {
        match self {
            Self::Include(path) | Self::Exclude(path) => path,
        }
    }

    pub fn is_include(&self) -> bool {
        matches!(self, Self::Include(_))
    }
}

impl fmt::Display for Pattern {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if !self.is_include() {
            f.write_str("!")?;
        }
        // paths of secondary roots already start with `../`
        if self.path().starts_with("../") {
            f.write_str(self.path())
        } else {
            write!(f, "./{}", self.path())
        }
    }
}

/// Patterns for `closure`, relative to the main root. Externals are ordered
/// by location so a package's nested installs follow it.
pub fn to_patterns(workspace: &Workspace, closure: &Closure) -> Vec<Pattern> {
    let mut patterns: Vec<Pattern> = workspace
        .tree_paths()
        .into_iter()
        .map(|tree| Pattern::Exclude(format!("{tree}/**")))
        .collect();

    let mut locations: Vec<String> = closure
        .iter()
        .filter(|&node| !workspace.node(node).is_root)
        .map(|node| workspace.relative_location(node))
        .collect();
    // segment-wise, so `a/node_modules/x` sorts right after `a` and before `a-b`
    locations.sort_by(|a, b| a.split('/').cmp(b.split('/')));
    locations.dedup();

    for loc in locations {
        let nested = location::join(&loc, location::NODE_MODULES);
        patterns.push(Pattern::Include(format!("{loc}/**")));
        patterns.push(Pattern::Exclude(nested));
    }
    patterns
}

/// Render patterns the way packagers take them.
pub fn render(patterns: &[Pattern]) -> Vec<String> {
    patterns.iter().map(ToString::to_string).collect()
}
