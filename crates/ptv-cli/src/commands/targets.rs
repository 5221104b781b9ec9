use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::Args;
use ptv_core::manager::ParameterManager;

#[derive(Args)]
pub struct TargetsArgs {
    /// Parameter-set YAML file
    pub file: PathBuf,
}

pub fn run(args: &TargetsArgs) -> Result<()> {
    let mut pm = ParameterManager::new();
    pm.from_yaml(&args.file)
        .with_context(|| format!("Failed to load {}", args.file.display()))?;

    let targets = pm.target_filenames();
    if targets.is_empty() {
        println!("No base names configured; nothing to derive.");
        return Ok(());
    }
    for target in &targets {
        println!("{}", target.display());
    }
    Ok(())
}
