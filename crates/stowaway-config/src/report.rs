//! The externals report: a closure's root locations persisted between the
//! bundling and packaging phases.

use std::fs;
use std::path::Path;

use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::config::ExternalsConfig;
use crate::error::{ConfigError, Result};

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ExternalsReport {
    /// Always `true`; distinguishes a report from a plain config.
    pub is_report: bool,
    /// Locations of top-level imported modules relative to the main root,
    /// e.g. `node_modules/db-errors`
    pub imported_module_roots: Vec<String>,
    /// The resolved config the report was generated from
    pub config: ExternalsConfig,
    /// `node_modules` directories of every root, highest priority first
    #[serde(default)]
    pub node_modules_tree_paths: Vec<String>,
}

impl ExternalsReport {
    pub fn new(
        imported_module_roots: Vec<String>,
        config: ExternalsConfig,
        node_modules_tree_paths: Vec<String>,
    ) -> Self {
        Self {
            is_report: true,
            imported_module_roots,
            config,
            node_modules_tree_paths,
        }
    }

    /// Whether a JSON document looks like a report.
    pub fn is_report_value(value: &Value) -> bool {
        value.get("isReport").and_then(Value::as_bool) == Some(true)
    }

    pub fn from_json(content: &str, path: &Path) -> Result<Self> {
        let value: Value = serde_json::from_str(content).map_err(|source| ConfigError::Json {
            path: path.to_path_buf(),
            source,
        })?;
        if !Self::is_report_value(&value) {
            return Err(ConfigError::NotAReport(path.to_path_buf()));
        }
        serde_json::from_value(value).map_err(|source| ConfigError::Json {
            path: path.to_path_buf(),
            source,
        })
    }

    pub fn load(path: &Path) -> Result<Self> {
        let content = fs::read_to_string(path).map_err(|source| ConfigError::Read {
            path: path.to_path_buf(),
            source,
        })?;
        Self::from_json(&content, path)
    }

    pub fn to_json(&self) -> String {
        // a struct of strings and lists always serializes
        serde_json::to_string_pretty(self).unwrap_or_default()
    }

    pub fn save(&self, path: &Path) -> Result<()> {
        if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
            fs::create_dir_all(parent)?;
        }
        fs::write(path, self.to_json())?;
        tracing::debug!(path = %path.display(), "wrote externals report");
        Ok(())
    }
}
