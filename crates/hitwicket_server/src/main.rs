//! Hitwicket server binary.

#![warn(missing_docs)]

mod cli;

use anyhow::Result;
use clap::Parser;
use cli::{Cli, Command};
use hitwicket_server::{ServerConfig, start};
use std::path::PathBuf;
use tracing::{info, instrument, warn};
use tracing_subscriber::EnvFilter;

#[tokio::main]
async fn main() -> Result<()> {
    // Load .env file
    dotenvy::dotenv().ok();

    let cli = Cli::parse();

    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| EnvFilter::new("info,hitwicket_server=debug")),
        )
        .init();

    match cli.command {
        Command::Serve {
            config,
            host,
            ws_port,
            http_port,
            static_page,
        } => serve(config, host, ws_port, http_port, static_page).await,
    }
}

/// Run both listeners until interrupted.
#[instrument(skip_all, fields(config_path = %config_path.display()))]
async fn serve(
    config_path: PathBuf,
    host: Option<String>,
    ws_port: Option<u16>,
    http_port: Option<u16>,
    static_page: Option<PathBuf>,
) -> Result<()> {
    let config = ServerConfig::load_or_default(&config_path)?
        .with_overrides(host, ws_port, http_port, static_page);
    info!(?config, "Starting Hitwicket server");

    let mut handle = start(&config).await?;
    info!(
        ws = %handle.ws_addr(),
        http = %handle.http_addr(),
        "Server ready"
    );

    tokio::select! {
        result = tokio::signal::ctrl_c() => {
            result?;
            info!("Interrupt received");
        }
        result = handle.wait() => {
            warn!("Listener stopped");
            result?;
        }
    }
    handle.shutdown();
    Ok(())
}
