//! Component schema CLI
//!
//! Generates and inspects the package schema of a component directory.

mod commands;

use clap::{Parser, Subcommand};
use std::path::PathBuf;
use tracing_subscriber::EnvFilter;

#[derive(Parser)]
#[command(name = "comphost")]
#[command(about = "Component package schema tooling", long_about = None)]
#[command(version)]
struct Cli {
    /// Verbose logging (repeat for more)
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    verbose: u8,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Write the package schema to schema.json
    Gen {
        /// Component directory
        #[arg(default_value = ".")]
        dir: PathBuf,
        /// Output file (default: <DIR>/schema.json)
        #[arg(short, long)]
        output: Option<PathBuf>,
    },

    /// Print the package schema
    Schema {
        /// Component directory
        #[arg(default_value = ".")]
        dir: PathBuf,
    },

    /// List detected components
    Components {
        /// Component directory
        #[arg(default_value = ".")]
        dir: PathBuf,
    },
}

fn init_logging(verbose: u8) {
    let default = match verbose {
        0 => "warn",
        1 => "info",
        2 => "debug",
        _ => "trace",
    };
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_target(false)
        .init();
}

fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();
    init_logging(cli.verbose);

    match cli.command {
        Commands::Gen { dir, output } => commands::generate::execute(&dir, output.as_deref()),
        Commands::Schema { dir } => commands::schema::execute(&dir),
        Commands::Components { dir } => commands::components::execute(&dir),
    }
}
