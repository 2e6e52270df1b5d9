//! Environment overrides. Kept in its own test binary because it mutates the
//! process environment.

use std::fs;

use stowaway_config::{ConfigDiscovery, ReportSetting};
use tempfile::TempDir;

#[test]
fn env_overrides_file_values() {
    let dir = TempDir::new().unwrap();
    fs::write(
        dir.path().join("stowaway.json"),
        r#"{ "modules": ["knex"], "report": true }"#,
    )
    .unwrap();

    // SAFETY: the only test in this binary, no other thread reads the env
    unsafe { std::env::set_var("STOWAWAY_REPORT", "custom-report.json") };
    let config = ConfigDiscovery::new(dir.path()).load().unwrap();
    unsafe { std::env::remove_var("STOWAWAY_REPORT") };

    assert_eq!(config.modules, ["knex"]);
    assert_eq!(
        config.report,
        Some(ReportSetting::File("custom-report.json".into()))
    );
    assert_eq!(config.report_file_name(), Some("custom-report.json"));
}
