//! `stowaway report`

use std::path::Path;

use stowaway::generate_report;
use tokio::io::AsyncReadExt;

use crate::cli::{GlobalArgs, ReportArgs};
use crate::commands::utils;
use crate::error::{CliError, Result};
use crate::ui;

pub async fn execute(global: &GlobalArgs, args: ReportArgs) -> Result<()> {
    let imports = read_imports(&args.imports).await?;
    let workspace = utils::load_workspace(global).await?;
    let config = utils::load_config(global, workspace.main_root())?;

    let output = match &args.output {
        Some(path) => utils::absolute(path)?,
        None => match config.report_file_name() {
            Some(name) => workspace.main_root().join(name),
            None => {
                ui::warning("Report is disabled in the config (`report: false`)");
                return Ok(());
            }
        },
    };

    let sink = utils::sink();
    let report = generate_report(&workspace, &config, &imports, &*sink);
    report.save(&output)?;

    utils::report_warnings(&sink);
    ui::success(&format!(
        "Wrote {} module root(s) to {}",
        report.imported_module_roots.len(),
        output.display()
    ));
    Ok(())
}

/// One import id per line; blank lines and `#` comments are skipped.
async fn read_imports(path: &Path) -> Result<Vec<String>> {
    let content = if path == Path::new("-") {
        let mut content = String::new();
        tokio::io::stdin().read_to_string(&mut content).await?;
        content
    } else {
        tokio::fs::read_to_string(path).await.map_err(|e| match e.kind() {
            std::io::ErrorKind::NotFound => CliError::FileNotFound(path.to_path_buf()),
            _ => CliError::Io(e),
        })?
    };
    Ok(content
        .lines()
        .map(str::trim)
        .filter(|line| !line.is_empty() && !line.starts_with('#'))
        .map(str::to_string)
        .collect())
}
