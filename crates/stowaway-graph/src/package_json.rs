//! Package descriptor (`package.json`) parsing.
//!
//! Only the fields the dependency graph needs are kept; scripts, engines and
//! the rest are ignored.

use std::path::{Path, PathBuf};

use indexmap::IndexMap;
use serde::{Deserialize, Serialize};

use crate::edge::EdgeKind;
use crate::error::{GraphError, Result};

/// Parsed package.json structure.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PackageJson {
    /// Package name
    pub name: Option<String>,
    /// Package version
    pub version: Option<String>,
    /// Production dependencies
    #[serde(default)]
    pub dependencies: IndexMap<String, String>,
    /// Development dependencies
    #[serde(default)]
    pub dev_dependencies: IndexMap<String, String>,
    /// Peer dependencies
    #[serde(default)]
    pub peer_dependencies: IndexMap<String, String>,
    /// Optional dependencies
    #[serde(default)]
    pub optional_dependencies: IndexMap<String, String>,
    /// `peerDependenciesMeta`, only `optional` matters here
    #[serde(default)]
    pub peer_dependencies_meta: IndexMap<String, PeerDependencyMeta>,
    /// File path this was loaded from
    #[serde(skip)]
    pub path: PathBuf,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct PeerDependencyMeta {
    #[serde(default)]
    pub optional: bool,
}

impl PackageJson {
    /// Parse descriptor content that was read from `path`.
    pub fn parse(content: &str, path: &Path) -> Result<Self> {
        let mut pkg: PackageJson =
            serde_json::from_str(content).map_err(|source| GraphError::Json {
                path: path.to_path_buf(),
                source,
            })?;
        pkg.path = path.to_path_buf();
        Ok(pkg)
    }

    /// Declared dependencies with the edge kind each declaration produces.
    ///
    /// Later declarations win when a name appears in several sections, so
    /// the order is dev, peer, prod, optional (optional overrides prod, prod
    /// overrides dev).
    pub fn declared_dependencies(&self, include_dev: bool) -> Vec<(&str, &str, EdgeKind)> {
        let mut out = Vec::new();
        if include_dev {
            out.extend(
                self.dev_dependencies
                    .iter()
                    .map(|(name, spec)| (name.as_str(), spec.as_str(), EdgeKind::Dev)),
            );
        }
        out.extend(self.peer_dependencies.iter().map(|(name, spec)| {
            let optional = self
                .peer_dependencies_meta
                .get(name)
                .is_some_and(|meta| meta.optional);
            let kind = if optional {
                EdgeKind::PeerOptional
            } else {
                EdgeKind::Peer
            };
            (name.as_str(), spec.as_str(), kind)
        }));
        out.extend(
            self.dependencies
                .iter()
                .map(|(name, spec)| (name.as_str(), spec.as_str(), EdgeKind::Prod)),
        );
        out.extend(
            self.optional_dependencies
                .iter()
                .map(|(name, spec)| (name.as_str(), spec.as_str(), EdgeKind::Optional)),
        );
        out
    }
}

/// Extract the base package name from an npm import specifier.
///
/// This handles scoped packages correctly:
/// - `@foo/bar` -> `@foo/bar`
/// - `@foo/bar/baz` -> `@foo/bar`
/// - `lodash` -> `lodash`
/// - `lodash/fp` -> `lodash`
///
/// # Example
///
/// ```
/// # use stowaway_graph::extract_package_name;
/// assert_eq!(extract_package_name("@babel/core"), "@babel/core");
/// assert_eq!(extract_package_name("@babel/core/lib/index"), "@babel/core");
/// assert_eq!(extract_package_name("lodash"), "lodash");
/// assert_eq!(extract_package_name("lodash/fp"), "lodash");
/// ```
pub fn extract_package_name(specifier: &str) -> &str {
    if specifier.is_empty() {
        return specifier;
    }

    // Handle scoped packages (@org/package)
    if specifier.starts_with('@') {
        // Find the second slash (after @org/)
        if let Some(first_slash) = specifier.find('/') {
            if let Some(second_slash) = specifier[first_slash + 1..].find('/') {
                return &specifier[..first_slash + 1 + second_slash];
            }
        }
        // Return entire string if no second slash
        return specifier;
    }

    // Non-scoped packages - take up to first slash
    if let Some(slash_idx) = specifier.find('/') {
        &specifier[..slash_idx]
    } else {
        specifier
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_extract_package_name() {
        // Scoped packages
        assert_eq!(extract_package_name("@babel/core"), "@babel/core");
        assert_eq!(extract_package_name("@babel/core/lib/index"), "@babel/core");
        assert_eq!(extract_package_name("@types/node/fs"), "@types/node");

        // Regular packages
        assert_eq!(extract_package_name("lodash"), "lodash");
        assert_eq!(extract_package_name("react/jsx-runtime"), "react");

        // Edge cases
        assert_eq!(extract_package_name(""), "");
        assert_eq!(extract_package_name("@org"), "@org");
    }

    #[test]
    fn test_package_json_parse() {
        let json = r#"{
            "name": "test-package",
            "version": "1.0.0",
            "dependencies": {
                "react": "^18.0.0",
                "lodash": "^4.17.21"
            },
            "devDependencies": {
                "@types/node": "^20.0.0"
            }
        }"#;

        let pkg = PackageJson::parse(json, Path::new("package.json")).unwrap();

        assert_eq!(pkg.name.as_deref(), Some("test-package"));
        assert_eq!(pkg.version.as_deref(), Some("1.0.0"));
        assert_eq!(pkg.dependencies.len(), 2);
        assert_eq!(pkg.dev_dependencies.len(), 1);
        assert_eq!(pkg.path, PathBuf::from("package.json"));
    }

    #[test]
    fn test_descriptor_without_name() {
        // `{"type": "module"}` markers inside a package's dist folder
        let pkg = PackageJson::parse(r#"{"type": "module"}"#, Path::new("dist/package.json"))
            .unwrap();
        assert!(pkg.name.is_none());
    }

    #[test]
    fn test_declared_dependencies_kinds() {
        let json = r#"{
            "dependencies": { "a": "^1.0.0", "shared": "^1.0.0" },
            "devDependencies": { "jest": "^29.0.0", "shared": "^1.0.0" },
            "peerDependencies": { "react": "^18", "react-dom": "^18" },
            "peerDependenciesMeta": { "react-dom": { "optional": true } },
            "optionalDependencies": { "fsevents": "^2" }
        }"#;
        let pkg = PackageJson::parse(json, Path::new("package.json")).unwrap();

        let without_dev = pkg.declared_dependencies(false);
        assert!(without_dev.iter().all(|(_, _, kind)| *kind != EdgeKind::Dev));

        let all = pkg.declared_dependencies(true);
        let kind_of = |name: &str| {
            all.iter()
                .rev()
                .find(|(n, _, _)| *n == name)
                .map(|(_, _, kind)| *kind)
        };
        assert_eq!(kind_of("jest"), Some(EdgeKind::Dev));
        assert_eq!(kind_of("shared"), Some(EdgeKind::Prod));
        assert_eq!(kind_of("react"), Some(EdgeKind::Peer));
        assert_eq!(kind_of("react-dom"), Some(EdgeKind::PeerOptional));
        assert_eq!(kind_of("fsevents"), Some(EdgeKind::Optional));
    }

    #[test]
    fn test_invalid_descriptor_is_json_error() {
        let err = PackageJson::parse("{ not json", Path::new("package.json")).unwrap_err();
        assert!(matches!(err, GraphError::Json { .. }));
    }
}
