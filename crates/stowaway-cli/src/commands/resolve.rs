//! `stowaway resolve`

use std::sync::Arc;

use stowaway::{ClosureBuilder, ImportResolver, Resolution};

use crate::cli::{GlobalArgs, ResolveArgs};
use crate::commands::utils;
use crate::error::Result;

pub async fn execute(global: &GlobalArgs, args: ResolveArgs) -> Result<()> {
    let workspace = utils::load_workspace(global).await?;
    let config = utils::load_config(global, workspace.main_root())?;
    let sink = utils::sink();

    let closure = ClosureBuilder::new(&workspace, &*sink).from_config(&config)?;
    let resolver = ImportResolver::new(Arc::new(workspace), Arc::new(closure), sink.clone());

    let importer = args
        .importer
        .as_deref()
        .map(utils::absolute)
        .transpose()?;
    match resolver.resolve(&args.importee, importer.as_deref())? {
        Resolution::External { id } => println!("external {id}"),
        Resolution::Default => println!("default"),
    }
    Ok(())
}
