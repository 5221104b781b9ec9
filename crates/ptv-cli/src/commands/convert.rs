use std::path::PathBuf;

use anyhow::{bail, Context, Result};
use clap::Args;
use ptv_core::experiment::paramset_file_name;
use ptv_core::legacy;

#[derive(Args)]
pub struct ConvertArgs {
    /// Legacy parameter directory (containing ptv.par)
    pub dir: PathBuf,

    /// Write the YAML to this path instead of the conventional sibling
    #[arg(short, long)]
    pub output: Option<PathBuf>,
}

pub fn run(args: &ConvertArgs) -> Result<()> {
    if !legacy::is_legacy_dir(&args.dir) {
        bail!(
            "{} is not a legacy parameter directory (no {})",
            args.dir.display(),
            legacy::LEGACY_MANIFEST
        );
    }

    let doc = legacy::convert_dir(&args.dir)
        .with_context(|| format!("Failed to convert {}", args.dir.display()))?;

    let output = match &args.output {
        Some(path) => path.clone(),
        None => {
            let dir_name = args
                .dir
                .file_name()
                .and_then(|n| n.to_str())
                .unwrap_or_default();
            let run_name = dir_name.strip_prefix("parameters").unwrap_or(dir_name);
            if run_name.is_empty() {
                bail!("Cannot derive a run name from {}; use --output", args.dir.display());
            }
            let parent = args.dir.parent().unwrap_or(std::path::Path::new(""));
            parent.join(paramset_file_name(run_name))
        }
    };

    doc.to_yaml(&output)
        .with_context(|| format!("Failed to write {}", output.display()))?;
    println!(
        "Converted {} -> {} ({} cameras)",
        args.dir.display(),
        output.display(),
        doc.camera_count()
    );
    Ok(())
}
