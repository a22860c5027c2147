//! MechCare REST server
//!
//! Serves the machine, log and dataset API over HTTP, backed by a single
//! JSON document on disk.

use std::net::SocketAddr;
use std::path::PathBuf;
use std::sync::Arc;

use clap::Parser;
use tracing::info;

use mechcare_core::config::{load_config, load_config_file};
use mechcare_core::tracing_init::{LogTarget, init_tracing};
use mechcare_core::{JsonStore, Repository};
use mechcare_server::{AppState, build_router};

#[derive(Parser, Debug)]
#[command(name = "mechcare-server")]
#[command(version, about = "MechCare REST server - machine maintenance tracking")]
struct Args {
    /// Address to listen on (overrides config).
    #[arg(long, env = "MECHCARE_ADDR")]
    addr: Option<SocketAddr>,

    /// Path to the JSON dataset file (overrides config).
    #[arg(long, env = "MECHCARE_DATA_FILE")]
    data_file: Option<PathBuf>,

    /// Config file to use instead of the global settings.json.
    #[arg(long)]
    config: Option<PathBuf>,

    /// Output logs as JSON (for structured log aggregation).
    #[arg(long)]
    log_json: bool,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let args = Args::parse();

    let mut config = match &args.config {
        Some(path) => load_config_file(path)?,
        None => load_config()?,
    };
    if let Some(addr) = args.addr {
        config.server.bind = addr.ip();
        config.server.port = addr.port();
    }
    if let Some(path) = args.data_file {
        config.storage.data_file = Some(path);
    }

    let level = &config.server.log_level;
    init_tracing(
        &format!("mechcare_server={level},mechcare_core={level},tower_http={level}"),
        args.log_json || config.server.log_json,
        LogTarget::Stdout,
    );

    let addr = config.server.addr();
    let data_file = config.storage.resolve_data_file()?;
    info!(
        version = env!("CARGO_PKG_VERSION"),
        addr = %addr,
        data_file = %data_file.display(),
        "Starting mechcare-server"
    );

    let repo = Repository::open(JsonStore::new(data_file)).await?;
    let app = build_router(AppState {
        repo: Arc::new(repo),
    });

    let listener = tokio::net::TcpListener::bind(addr).await?;
    info!(addr = %addr, "API available at http://{addr}/api");
    axum::serve(listener, app)
        .with_graceful_shutdown(async {
            let _ = tokio::signal::ctrl_c().await;
            info!("Received shutdown signal");
        })
        .await?;

    info!("Server stopped");
    Ok(())
}
