use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::Args;
use ptv_core::experiment::Experiment;

use crate::summary;

#[derive(Args)]
pub struct ListArgs {
    /// Experiment directory to scan
    pub dir: PathBuf,
}

pub fn run(args: &ListArgs) -> Result<()> {
    let mut exp = Experiment::new();
    exp.populate_runs(&args.dir)
        .with_context(|| format!("Failed to scan {}", args.dir.display()))?;
    summary::print_registry(&exp);
    Ok(())
}
