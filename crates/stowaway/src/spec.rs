//! Module spec matching.
//!
//! A spec is `name` or `name@range`. Scoped names keep their leading `@`:
//! `@org/pkg@^2.0.0` is `@org/pkg` with range `^2.0.0`.

use std::fmt;

use deno_semver::{Version, VersionReq};
use stowaway_config::ConfigError;
use stowaway_graph::{Node, extract_package_name};

#[derive(Debug, Clone)]
pub struct ModuleSpec {
    raw: String,
    name: String,
    range: Option<VersionReq>,
}

impl ModuleSpec {
    pub fn parse(spec: &str) -> Result<Self, ConfigError> {
        let invalid = |reason: &str| ConfigError::InvalidSpec {
            spec: spec.to_string(),
            reason: reason.to_string(),
        };

        let trimmed = spec.trim();
        // the first `@` past position 0 separates name from range
        let (name_part, range_part) = match trimmed.get(1..).and_then(|rest| rest.find('@')) {
            Some(at) => (&trimmed[..at + 1], Some(&trimmed[at + 2..])),
            None => (trimmed, None),
        };

        let name = extract_package_name(name_part);
        if name.is_empty() || name == "@" || (name.starts_with('@') && !name.contains('/')) {
            return Err(invalid("expected a package name"));
        }
        if name.len() != name_part.len() {
            tracing::debug!(spec, name, "ignoring subpath in module spec");
        }

        let range = match range_part.map(str::trim).filter(|r| !r.is_empty()) {
            Some(range) => Some(
                VersionReq::parse_from_npm(range)
                    .map_err(|e| invalid(&format!("invalid version range: {e}")))?,
            ),
            None => None,
        };

        Ok(Self {
            raw: spec.to_string(),
            name: name.to_string(),
            range,
        })
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn has_range(&self) -> bool {
        self.range.is_some()
    }

    /// Same name, and when a range is given the installed version satisfies it.
    pub fn matches(&self, node: &Node) -> bool {
        if node.name != self.name {
            return false;
        }
        let Some(range) = &self.range else {
            return true;
        };
        Version::parse_from_npm(&node.version).is_ok_and(|version| range.matches(&version))
    }
}

impl fmt::Display for ModuleSpec {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.raw)
    }
}

/// All configured specs; a node matches when any one spec does.
#[derive(Debug, Clone, Default)]
pub struct SpecSet {
    specs: Vec<ModuleSpec>,
}

impl SpecSet {
    pub fn parse<S: AsRef<str>>(specs: &[S]) -> Result<Self, ConfigError> {
        let specs = specs
            .iter()
            .map(|spec| ModuleSpec::parse(spec.as_ref()))
            .collect::<Result<Vec<_>, _>>()?;
        Ok(Self { specs })
    }

    pub fn matches(&self, node: &Node) -> bool {
        self.specs.iter().any(|spec| spec.matches(node))
    }

    pub fn is_empty(&self) -> bool {
        self.specs.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = &ModuleSpec> {
        self.specs.iter()
    }
}
