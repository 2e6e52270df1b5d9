//! `stowaway check`
//!
//! Loads the config and the installed tree, computes the closure and
//! reports every spec whose range matches no installed version.

use stowaway::{ClosureBuilder, SpecSet};

use crate::cli::{CheckArgs, GlobalArgs};
use crate::commands::utils;
use crate::error::{CliError, Result};
use crate::ui;

pub async fn execute(global: &GlobalArgs, args: CheckArgs) -> Result<()> {
    ui::info("Checking configuration...");
    let workspace = utils::load_workspace(global).await?;
    let config = utils::load_config(global, workspace.main_root())?;
    let sink = utils::sink();

    let closure = ClosureBuilder::new(&workspace, &*sink).from_config(&config)?;

    let mut problems = 0;
    for spec in SpecSet::parse(&config.modules)?.iter() {
        let installed = workspace.nodes().filter(|(_, node)| spec.matches(node)).count();
        if installed == 0 {
            ui::error(&format!("No installed version of {} matches '{spec}'", spec.name()));
            problems += 1;
        }
    }

    let warnings = sink.warning_count();
    if args.strict && warnings > 0 {
        ui::error(&format!("{warnings} warning(s) with --strict"));
        problems += warnings;
    }
    if problems > 0 {
        return Err(CliError::CheckFailed { count: problems });
    }

    utils::report_warnings(&sink);
    ui::success(&format!(
        "Configuration is valid: {} root module(s), {} module(s) kept external",
        closure.roots().len(),
        closure.len()
    ));
    Ok(())
}
