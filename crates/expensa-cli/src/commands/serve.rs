//! Serve command - run the statement upload API.

use std::net::SocketAddr;
use std::path::PathBuf;

use clap::Args;
use console::style;
use tracing::warn;

use expensa_api::state::{AppState, StoreBackend};
use expensa_core::MemoryStore;

use super::config::load_config;

/// Arguments for the serve command.
#[derive(Args)]
pub struct ServeArgs {
    /// Address to listen on (default: server.bind from config)
    #[arg(short, long)]
    bind: Option<String>,

    /// SQLite database (default: storage.database_path from config)
    #[arg(short, long, conflicts_with = "memory")]
    database: Option<PathBuf>,

    /// Keep expenses in memory only
    #[arg(long)]
    memory: bool,
}

pub async fn run(args: ServeArgs, config_path: Option<&str>) -> anyhow::Result<()> {
    let mut config = load_config(config_path)?;

    if let Some(bind) = args.bind {
        config.server.bind = bind;
    }
    if let Some(database) = args.database {
        config.storage.database_path = database;
    }

    let addr: SocketAddr = config
        .server
        .bind
        .parse()
        .map_err(|e| anyhow::anyhow!("Invalid bind address {}: {}", config.server.bind, e))?;

    if config.server.tokens.is_empty() {
        warn!("No tokens configured; every upload will be rejected. Add one with 'expensa config set server.tokens.<token> <user-id>'");
    }

    let state = if args.memory {
        AppState::new(config, StoreBackend::Memory(MemoryStore::new()))
    } else {
        AppState::from_config(config)
    };

    println!(
        "{} Listening on http://{} (POST /api/phonepe/upload/)",
        style("✓").green(),
        addr
    );

    expensa_api::serve(state, addr).await?;

    Ok(())
}
