use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::Args;
use ptv_core::manager::ParameterManager;

use crate::summary;

#[derive(Args)]
pub struct ShowArgs {
    /// Parameter-set YAML file
    pub file: PathBuf,
}

pub fn run(args: &ShowArgs) -> Result<()> {
    let mut pm = ParameterManager::new();
    pm.from_yaml(&args.file)
        .with_context(|| format!("Failed to load {}", args.file.display()))?;
    summary::print_document(&pm);
    Ok(())
}
