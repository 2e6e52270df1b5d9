//! `stowaway closure`

use serde_json::json;
use stowaway::{ClosureBuilder, ClosureSummary};

use crate::cli::{ClosureArgs, GlobalArgs};
use crate::commands::utils;
use crate::error::Result;
use crate::ui;

pub async fn execute(global: &GlobalArgs, args: ClosureArgs) -> Result<()> {
    let workspace = utils::load_workspace(global).await?;
    let config = utils::load_config(global, workspace.main_root())?;
    let sink = utils::sink();

    let closure = ClosureBuilder::new(&workspace, &*sink).from_config(&config)?;
    let summary = ClosureSummary::new(&workspace, &closure);

    if args.json {
        let roots: Vec<String> = closure
            .roots()
            .iter()
            .map(|&root| workspace.relative_location(root))
            .collect();
        let output = json!({
            "roots": roots,
            "modules": summary.modules,
            "multipleVersions": summary.multiple_versions,
        });
        println!("{}", serde_json::to_string_pretty(&output).unwrap_or_default());
    } else {
        print!("{summary}");
    }

    utils::report_warnings(&sink);
    ui::success(&format!("{} modules kept external", closure.len()));
    Ok(())
}
