mod commands;
mod summary;

use anyhow::Result;
use clap::{Parser, Subcommand};
use tracing_subscriber::EnvFilter;

#[derive(Parser)]
#[command(name = "ptv", about = "Parameter-set manager for PTV experiments")]
#[command(version)]
struct Cli {
    /// Enable verbose output
    #[arg(short, long, global = true)]
    verbose: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// List the parameter sets in an experiment directory
    List(commands::list::ListArgs),
    /// Show the contents of one parameter-set file
    Show(commands::show::ShowArgs),
    /// Print the per-camera target paths derived from a parameter set
    Targets(commands::targets::TargetsArgs),
    /// Convert a legacy parameter directory to a YAML parameter set
    Convert(commands::convert::ConvertArgs),
    /// Create, duplicate, rename, delete or retire parameter sets
    #[command(subcommand)]
    Paramset(commands::paramset::ParamsetCommand),
}

fn main() -> Result<()> {
    let cli = Cli::parse();

    let filter = if cli.verbose {
        EnvFilter::new("debug")
    } else {
        EnvFilter::new("warn")
    };
    tracing_subscriber::fmt().with_env_filter(filter).init();

    match &cli.command {
        Commands::List(args) => commands::list::run(args),
        Commands::Show(args) => commands::show::run(args),
        Commands::Targets(args) => commands::targets::run(args),
        Commands::Convert(args) => commands::convert::run(args),
        Commands::Paramset(cmd) => commands::paramset::run(cmd),
    }
}
