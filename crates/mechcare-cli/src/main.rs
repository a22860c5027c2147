//! MechCare CLI
//!
//! Manage machines, service logs and the dataset file without running the server.

use std::io;
use std::path::PathBuf;

use clap::{Parser, Subcommand};
use tracing::debug;

use mechcare_cli::data_cmd::{self, DataAction};
use mechcare_cli::log_cmd::{self, LogAction};
use mechcare_cli::machine_cmd::{self, MachineAction};
use mechcare_core::config::{load_config, load_config_file};
use mechcare_core::tracing_init::{LogTarget, init_tracing};
use mechcare_core::{JsonStore, Repository};

#[derive(Parser, Debug)]
#[command(name = "mechcare")]
#[command(version, about = "Machine maintenance tracker", long_about = None)]
struct Cli {
    /// Path to the JSON dataset file
    #[arg(long, global = true, env = "MECHCARE_DATA_FILE")]
    data_file: Option<PathBuf>,

    /// Config file to use instead of the global settings.json
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Manage machines
    Machine {
        #[command(subcommand)]
        action: MachineAction,
    },
    /// Record and list service logs
    Log {
        #[command(subcommand)]
        action: LogAction,
    },
    /// Export or import the whole dataset
    Data {
        #[command(subcommand)]
        action: DataAction,
    },
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    init_tracing("mechcare=warn,mechcare_core=warn", false, LogTarget::Stderr);

    let mut config = match &cli.config {
        Some(path) => load_config_file(path)?,
        None => load_config()?,
    };
    if let Some(path) = cli.data_file {
        config.storage.data_file = Some(path);
    }
    let data_file = config.storage.resolve_data_file()?;
    debug!(data_file = %data_file.display(), "Using dataset");

    let repo = Repository::open(JsonStore::new(data_file)).await?;
    let mut out = io::stdout().lock();
    match cli.command {
        Command::Machine { action } => machine_cmd::run(&repo, action, &mut out).await,
        Command::Log { action } => log_cmd::run(&repo, action, &mut out).await,
        Command::Data { action } => data_cmd::run(&repo, action, &mut out).await,
    }
}
