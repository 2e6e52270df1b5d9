//! Externals configuration.

use std::fs;
use std::path::{Path, PathBuf};

use indexmap::IndexSet;
use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::error::{ConfigError, Result};

/// Report file written when `report` is `true` or unset.
pub const DEFAULT_REPORT_FILE: &str = "node-externals-report.json";

/// Which modules stay external, and how packaging treats them.
///
/// ```
/// use stowaway_config::ExternalsConfig;
///
/// let config: ExternalsConfig = serde_json::from_str(r#"{
///     "modules": ["knex", "pg@^8.0.0"],
///     "packaging": { "exclude": ["aws-sdk"] },
///     "report": "externals.json"
/// }"#).unwrap();
/// assert_eq!(config.report_file_name(), Some("externals.json"));
/// ```
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ExternalsConfig {
    /// Module specs, `name` or `name@range`
    #[serde(default)]
    pub modules: Vec<String>,

    /// JSON file with more specs (an array) or a whole config object,
    /// relative to the project root
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub file: Option<PathBuf>,

    #[serde(default)]
    pub packaging: PackagingConfig,

    /// `false` disables the report, a string overrides its file name
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub report: Option<ReportSetting>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PackagingConfig {
    /// Module names kept out of the closure even when matched
    #[serde(default)]
    pub exclude: Vec<String>,

    /// Locations always included, e.g. `node_modules/react-dom` for peers no
    /// import ever names
    #[serde(default)]
    pub force_include_module_roots: Vec<String>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum ReportSetting {
    Enabled(bool),
    File(String),
}

impl ExternalsConfig {
    pub fn with_modules<I, S>(modules: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            modules: modules.into_iter().map(Into::into).collect(),
            ..Self::default()
        }
    }

    /// Parse a config value. A bare array is shorthand for `{ "modules": [...] }`.
    pub fn from_value(value: Value) -> Result<Self> {
        serde_json::from_value(normalize_value(value)).map_err(|e| ConfigError::InvalidValue {
            field: "externals".to_string(),
            hint: e.to_string(),
        })
    }

    pub fn report_enabled(&self) -> bool {
        !matches!(self.report, Some(ReportSetting::Enabled(false)))
    }

    /// File name the report is written to, `None` when reporting is off.
    pub fn report_file_name(&self) -> Option<&str> {
        match &self.report {
            Some(ReportSetting::Enabled(false)) => None,
            Some(ReportSetting::File(name)) => Some(name),
            Some(ReportSetting::Enabled(true)) | None => Some(DEFAULT_REPORT_FILE),
        }
    }

    pub fn is_excluded(&self, name: &str) -> bool {
        self.packaging.exclude.iter().any(|excluded| excluded == name)
    }

    /// Combine with another config. Lists are concatenated without
    /// duplicates, `self` wins for scalar fields.
    pub fn merge(mut self, other: ExternalsConfig) -> Self {
        self.modules = dedup(self.modules, other.modules);
        self.packaging.exclude = dedup(self.packaging.exclude, other.packaging.exclude);
        self.packaging.force_include_module_roots = dedup(
            self.packaging.force_include_module_roots,
            other.packaging.force_include_module_roots,
        );
        self.report = self.report.or(other.report);
        self
    }
}

fn dedup(first: Vec<String>, second: Vec<String>) -> Vec<String> {
    first
        .into_iter()
        .chain(second)
        .collect::<IndexSet<_>>()
        .into_iter()
        .collect()
}

pub(crate) fn normalize_value(value: Value) -> Value {
    match value {
        Value::Array(modules) => serde_json::json!({ "modules": modules }),
        other => other,
    }
}

/// Read a JSON config file: an array of specs or a config object.
pub fn load_config_file(path: &Path) -> Result<ExternalsConfig> {
    let content = fs::read_to_string(path).map_err(|source| ConfigError::Read {
        path: path.to_path_buf(),
        source,
    })?;
    let value: Value = serde_json::from_str(&content).map_err(|source| ConfigError::Json {
        path: path.to_path_buf(),
        source,
    })?;
    ExternalsConfig::from_value(value)
}

/// Load the config's `file` (relative to `root`) and merge it in. Inline
/// values take precedence; the result has no `file` left to resolve.
pub fn resolve_config(mut config: ExternalsConfig, root: &Path) -> Result<ExternalsConfig> {
    let Some(file) = config.file.take() else {
        return Ok(config);
    };
    let path = root.join(&file);
    let mut from_file = load_config_file(&path)?;
    if from_file.file.take().is_some() {
        tracing::warn!(
            path = %path.display(),
            "nested `file` reference in externals config file is ignored"
        );
    }
    tracing::debug!(
        path = %path.display(),
        modules = from_file.modules.len(),
        "loaded externals config file"
    );
    Ok(config.merge(from_file))
}
