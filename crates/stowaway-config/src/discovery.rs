//! File-based config discovery for CLI use
//!
//! Handles finding and loading externals configuration from the filesystem.

use std::fs;
use std::path::{Path, PathBuf};

use figment::Figment;
use figment::providers::{Env, Serialized};
use serde_json::Value;

use crate::config::{ExternalsConfig, normalize_value};
use crate::error::{ConfigError, Result};

/// Config file names searched in the project root, in order.
pub const CONFIG_FILE_NAMES: &[&str] = &["stowaway.toml", "stowaway.json"];

/// Field of `package.json` holding the config.
pub const PACKAGE_JSON_FIELD: &str = "externals";

/// Prefix of environment variables overriding file values.
pub const ENV_PREFIX: &str = "STOWAWAY_";

/// File-based configuration discovery
///
/// # Example
///
/// ```no_run
/// use stowaway_config::ConfigDiscovery;
///
/// let discovery = ConfigDiscovery::new(".");
/// let config = discovery.load().unwrap();
/// ```
pub struct ConfigDiscovery {
    root: PathBuf,
    explicit: Option<PathBuf>,
}

impl ConfigDiscovery {
    pub fn new(root: impl AsRef<Path>) -> Self {
        Self {
            root: root.as_ref().to_path_buf(),
            explicit: None,
        }
    }

    /// Use this file instead of searching. Relative paths resolve against
    /// the root.
    pub fn with_file(mut self, path: impl AsRef<Path>) -> Self {
        self.explicit = Some(self.root.join(path));
        self
    }

    /// Find a config file
    ///
    /// Searches in this order:
    /// 1. The explicit file, if one was given
    /// 2. stowaway.toml, stowaway.json
    /// 3. package.json (externals field)
    pub fn find(&self) -> Option<PathBuf> {
        if let Some(explicit) = &self.explicit {
            return Some(explicit.clone());
        }

        for name in CONFIG_FILE_NAMES {
            let path = self.root.join(name);
            if path.exists() {
                return Some(path);
            }
        }

        let pkg_path = self.root.join("package.json");
        let content = fs::read_to_string(&pkg_path).ok()?;
        let parsed = serde_json::from_str::<Value>(&content).ok()?;
        parsed
            .get(PACKAGE_JSON_FIELD)
            .is_some_and(|field| !field.is_null())
            .then_some(pkg_path)
    }

    /// Load config from the discovered file, then apply `STOWAWAY_*`
    /// environment overrides.
    ///
    /// # Errors
    ///
    /// Returns `ConfigError::NotFound` if no config file is found.
    pub fn load(&self) -> Result<ExternalsConfig> {
        let path = self.find().ok_or(ConfigError::NotFound)?;
        let value = self.read_value(&path)?;

        let figment = Figment::new()
            .merge(Serialized::defaults(ExternalsConfig::default()))
            .merge(Serialized::defaults(normalize_value(value)))
            .merge(Env::prefixed(ENV_PREFIX).split("__"));

        let config: ExternalsConfig =
            figment
                .extract()
                .map_err(|e| ConfigError::InvalidValue {
                    field: "configuration".to_string(),
                    hint: e.to_string(),
                })?;

        tracing::debug!(
            path = %path.display(),
            modules = config.modules.len(),
            "loaded externals config"
        );
        Ok(config)
    }

    fn read_value(&self, path: &Path) -> Result<Value> {
        let content = fs::read_to_string(path).map_err(|source| ConfigError::Read {
            path: path.to_path_buf(),
            source,
        })?;

        let is_toml = path.extension().is_some_and(|ext| ext == "toml");
        if is_toml {
            let toml_val: toml::Value =
                toml::from_str(&content).map_err(|e| ConfigError::InvalidValue {
                    field: "toml".to_string(),
                    hint: format!("Invalid TOML syntax: {e}"),
                })?;
            return serde_json::to_value(toml_val).map_err(|e| ConfigError::InvalidValue {
                field: "toml".to_string(),
                hint: format!("TOML to JSON conversion failed: {e}"),
            });
        }

        let parsed: Value = serde_json::from_str(&content).map_err(|source| ConfigError::Json {
            path: path.to_path_buf(),
            source,
        })?;

        if path.file_name().is_some_and(|name| name == "package.json") {
            return match parsed.get(PACKAGE_JSON_FIELD) {
                Some(field) if !field.is_null() => Ok(field.clone()),
                _ => Err(ConfigError::InvalidValue {
                    field: PACKAGE_JSON_FIELD.to_string(),
                    hint: "Add an 'externals' field to your package.json".to_string(),
                }),
            };
        }
        Ok(parsed)
    }
}
