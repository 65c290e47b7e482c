mod config;
mod encoding;
mod protocol;
mod server;
mod store;

use std::fs::OpenOptions;
use std::path::PathBuf;
use std::sync::{Arc, Mutex};

use anyhow::Context;
use clap::Parser;
use tracing::{info, warn};
use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::util::SubscriberInitExt;
use tracing_subscriber::EnvFilter;

use config::{Config, LogConfig};
use encoding::snapshot;
use server::Server;
use store::WordStore;

/// Command line arguments
#[derive(Parser, Debug)]
#[command(name = "worddb", about = "Word and definition store served over RESP")]
struct Args {
    /// TOML configuration file. Built-in defaults are used when omitted.
    #[arg(short, long)]
    config: Option<String>,

    /// Listening address, overrides `server_addr`
    #[arg(short, long)]
    addr: Option<String>,

    /// Snapshot file, overrides `snapshot.path`
    #[arg(short, long)]
    snapshot: Option<PathBuf>,
}

fn init_logging(log: &LogConfig) -> anyhow::Result<()> {
    let filter = EnvFilter::try_from_default_env()
        .or_else(|_| EnvFilter::try_new(&log.level))
        .with_context(|| format!("invalid log level '{}'", log.level))?;

    let stdout = tracing_subscriber::fmt::layer()
        .with_target(true)
        .with_thread_ids(true);

    let file = match &log.file {
        Some(path) => {
            let file = OpenOptions::new()
                .create(true)
                .append(true)
                .open(path)
                .with_context(|| format!("failed to open log file '{}'", path))?;
            Some(
                tracing_subscriber::fmt::layer()
                    .with_ansi(false)
                    .with_target(true)
                    .with_writer(Mutex::new(file)),
            )
        }
        None => None,
    };

    tracing_subscriber::registry()
        .with(filter)
        .with(stdout)
        .with(file)
        .init();
    Ok(())
}

fn load_config(args: Args) -> anyhow::Result<Config> {
    let mut config = match &args.config {
        Some(path) => Config::from_file(path)?,
        None => Config::default(),
    };
    if let Some(addr) = args.addr {
        config.server_addr = addr;
    }
    if let Some(path) = args.snapshot {
        config.snapshot.path = Some(path);
    }
    Ok(config)
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let config = load_config(Args::parse())?;
    init_logging(&config.log)?;

    info!("Starting WordDB - word and definition store");
    info!("Version: {}", env!("CARGO_PKG_VERSION"));

    let store = match &config.snapshot.path {
        Some(path) => {
            let store = snapshot::load(path)
                .with_context(|| format!("failed to load snapshot '{}'", path.display()))?;
            if store.is_empty()? {
                info!("Starting with an empty dictionary, will persist to {}", path.display());
            } else {
                info!("Loaded {} entries from {}", store.len()?, path.display());
            }
            store
        }
        None => {
            warn!("No snapshot path configured, the dictionary will not be persisted");
            WordStore::new()
        }
    };

    let server = Arc::new(
        Server::bind(&config, Arc::new(store))
            .await
            .with_context(|| format!("failed to bind {}", config.server_addr))?,
    );
    info!("Server listening on: {}", server.local_addr());

    Arc::clone(&server)
        .run(async {
            if let Err(e) = tokio::signal::ctrl_c().await {
                warn!("Failed to listen for ctrl-c: {}", e);
                std::future::pending::<()>().await;
            }
        })
        .await;

    server.shutdown().await.context("failed to save snapshot")?;
    info!("Exiting WordDB with {} entries", server.store().len()?);
    Ok(())
}
