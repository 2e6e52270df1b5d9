//! # stowaway-config
//!
//! Configuration for keeping modules external: the user-facing
//! [`ExternalsConfig`], the [`ExternalsReport`] handed from the bundling phase
//! to the packaging phase, and file discovery for the CLI.

mod config;
mod discovery;
mod error;
mod report;

pub use config::{
    DEFAULT_REPORT_FILE, ExternalsConfig, PackagingConfig, ReportSetting, load_config_file,
    resolve_config,
};
pub use discovery::{CONFIG_FILE_NAMES, ConfigDiscovery, ENV_PREFIX, PACKAGE_JSON_FIELD};
pub use error::{ConfigError, Result};
pub use report::ExternalsReport;
