use std::path::{Path, PathBuf};
use std::sync::Arc;

use stowaway::{CollectingSink, ExternalsConfig, LockfileLoader, TracingSink, Workspace};
use stowaway_config::{ConfigDiscovery, resolve_config};

use crate::cli::GlobalArgs;
use crate::error::Result;

/// Load and merge every root's installed tree.
pub(crate) async fn load_workspace(global: &GlobalArgs) -> Result<Workspace> {
    let workspace = Workspace::load(Arc::new(LockfileLoader::new()), &global.roots).await?;
    tracing::debug!(
        roots = workspace.graphs().len(),
        main_root = %workspace.main_root().display(),
        "loaded workspace"
    );
    Ok(workspace)
}

/// Discover the config for `root` and merge in its `file`.
pub(crate) fn load_config(global: &GlobalArgs, root: &Path) -> Result<ExternalsConfig> {
    let mut discovery = ConfigDiscovery::new(root);
    if let Some(file) = &global.config {
        discovery = discovery.with_file(absolute(file)?);
    }
    let config = discovery.load()?;
    Ok(resolve_config(config, root)?)
}

/// Diagnostics are logged as they happen and kept for a final count.
pub(crate) fn sink() -> Arc<CollectingSink> {
    Arc::new(CollectingSink::forwarding(TracingSink))
}

/// `path` against the current directory.
pub(crate) fn absolute(path: &Path) -> Result<PathBuf> {
    if path.is_absolute() {
        Ok(path.to_path_buf())
    } else {
        Ok(std::env::current_dir()?.join(path))
    }
}

pub(crate) fn report_warnings(sink: &CollectingSink) {
    let count = sink.warning_count();
    if count > 0 {
        crate::ui::warning(&format!("{count} warning(s) while computing the closure"));
    }
}
