//! `stowaway patterns`

use stowaway::{ExternalsReport, package_from_config, package_from_report, render};

use crate::cli::{GlobalArgs, PatternsArgs};
use crate::commands::utils;
use crate::error::Result;

pub async fn execute(global: &GlobalArgs, args: PatternsArgs) -> Result<()> {
    let workspace = utils::load_workspace(global).await?;
    let sink = utils::sink();

    let patterns = match &args.report {
        Some(path) => {
            let report = ExternalsReport::load(&utils::absolute(path)?)?;
            package_from_report(&workspace, &report, &*sink)
        }
        None => {
            let config = utils::load_config(global, workspace.main_root())?;
            package_from_config(&workspace, config, &*sink)?
        }
    };

    let lines = render(&patterns);
    if args.json {
        println!("{}", serde_json::to_string_pretty(&lines).unwrap_or_default());
    } else {
        for line in &lines {
            println!("{line}");
        }
    }

    utils::report_warnings(&sink);
    Ok(())
}
