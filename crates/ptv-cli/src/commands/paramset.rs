use std::path::{Path, PathBuf};

use anyhow::{anyhow, Context, Result};
use clap::{Args, Subcommand};
use ptv_core::experiment::Experiment;

#[derive(Subcommand)]
pub enum ParamsetCommand {
    /// Create a new parameter set in an experiment directory
    Create(CreateArgs),
    /// Duplicate an existing parameter set
    Duplicate(NamedArgs),
    /// Rename a parameter set and its backing file
    Rename(RenameArgs),
    /// Delete a parameter set together with its file
    Delete(NamedArgs),
    /// Retire a parameter set, keeping a .bck backup
    Remove(NamedArgs),
}

#[derive(Args)]
pub struct CreateArgs {
    /// Experiment directory
    pub dir: PathBuf,
    /// Name for the new set
    pub name: String,
    /// Seed the new set from the active one instead of defaults
    #[arg(long)]
    pub from_active: bool,
}

#[derive(Args)]
pub struct NamedArgs {
    /// Experiment directory
    pub dir: PathBuf,
    /// Name of the target set
    pub name: String,
}

#[derive(Args)]
pub struct RenameArgs {
    /// Experiment directory
    pub dir: PathBuf,
    /// Current name
    pub old_name: String,
    /// New name
    pub new_name: String,
}

fn discovered(dir: &Path) -> Result<Experiment> {
    let mut exp = Experiment::new();
    exp.populate_runs(dir)
        .with_context(|| format!("Failed to scan {}", dir.display()))?;
    Ok(exp)
}

fn index_of(exp: &Experiment, name: &str) -> Result<usize> {
    exp.paramsets()
        .iter()
        .position(|ps| ps.name == name)
        .ok_or_else(|| anyhow!("No parameter set named '{name}'"))
}

pub fn run(cmd: &ParamsetCommand) -> Result<()> {
    match cmd {
        ParamsetCommand::Create(args) => {
            let mut exp = discovered(&args.dir)?;
            let path = exp.create_new_paramset(&args.name, &args.dir, args.from_active)?;
            println!("Created {}", path.display());
        }
        ParamsetCommand::Duplicate(args) => {
            let mut exp = discovered(&args.dir)?;
            let path = exp.duplicate_paramset(&args.name)?;
            println!("Duplicated '{}' -> {}", args.name, path.display());
        }
        ParamsetCommand::Rename(args) => {
            let mut exp = discovered(&args.dir)?;
            let (ps, path) = exp.rename_paramset(&args.old_name, &args.new_name)?;
            println!("Renamed '{}' -> '{}' ({})", args.old_name, ps.name, path.display());
        }
        ParamsetCommand::Delete(args) => {
            let mut exp = discovered(&args.dir)?;
            let index = index_of(&exp, &args.name)?;
            // Discovery activates the first run; shift activation off the
            // target so a hard delete of any set is possible from the CLI.
            if exp.active_index() == Some(index) {
                match (0..exp.n_paramsets()).find(|&i| i != index) {
                    Some(other) => exp.set_active(other)?,
                    None => anyhow::bail!(
                        "'{}' is the only parameter set; retire it with 'paramset remove' instead",
                        args.name
                    ),
                }
            }
            exp.delete_paramset(index)?;
            println!("Deleted '{}'", args.name);
        }
        ParamsetCommand::Remove(args) => {
            let mut exp = discovered(&args.dir)?;
            let index = index_of(&exp, &args.name)?;
            exp.remove_paramset(index)?;
            println!("Removed '{}' (backup kept)", args.name);
        }
    }
    Ok(())
}
