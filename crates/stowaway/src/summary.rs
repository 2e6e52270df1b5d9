use std::fmt;

use indexmap::{IndexMap, IndexSet};
use stowaway_graph::{Node, Workspace};

use crate::closure::Closure;

/// Human-readable view of a closure: what ships, and which packages ship in
/// more than one version.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ClosureSummary {
    /// `location@version`, sorted by location
    pub modules: Vec<String>,
    /// package name → `location@version` of each install, for names that
    /// ship in more than one version
    pub multiple_versions: IndexMap<String, Vec<String>>,
}

impl ClosureSummary {
    pub fn new(workspace: &Workspace, closure: &Closure) -> Self {
        let mut entries: Vec<(String, &Node)> = closure
            .iter()
            .filter(|&node| !workspace.node(node).is_root)
            .map(|node| (workspace.relative_location(node), workspace.node(node)))
            .collect();
        entries.sort_by(|a, b| a.0.split('/').cmp(b.0.split('/')));

        let modules: Vec<String> = entries
            .iter()
            .map(|(location, node)| format!("{location}@{}", node.version))
            .collect();

        let mut by_name: IndexMap<&str, (IndexSet<&str>, Vec<String>)> = IndexMap::new();
        for ((_, node), module) in entries.iter().zip(&modules) {
            let (versions, installs) = by_name.entry(node.name.as_str()).or_default();
            versions.insert(node.version.as_str());
            installs.push(module.clone());
        }
        let mut multiple_versions: IndexMap<String, Vec<String>> = by_name
            .into_iter()
            .filter(|(_, (versions, _))| versions.len() > 1)
            .map(|(name, (_, installs))| (name.to_string(), installs))
            .collect();
        multiple_versions.sort_keys();

        Self {
            modules,
            multiple_versions,
        }
    }

    pub fn is_empty(&self) -> bool {
        self.modules.is_empty()
    }
}

impl fmt::Display for ClosureSummary {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "Modules that will be kept external:")?;
        for module in &self.modules {
            writeln!(f, "- {module}")?;
        }
        for (name, installs) in &self.multiple_versions {
            writeln!(f, "Multiple versions will be external for {name}:")?;
            for install in installs {
                writeln!(f, "- {install}")?;
            }
        }
        Ok(())
    }
}
