//! Command-line interface for the hitwicket server.

use clap::{Parser, Subcommand};
use std::path::PathBuf;

/// Hitwicket - real-time server for two-player Hitwicket matches
#[derive(Parser, Debug)]
#[command(name = "hitwicket")]
#[command(about = "WebSocket session server for Hitwicket", long_about = None)]
#[command(version)]
pub struct Cli {
    /// Subcommand to run
    #[command(subcommand)]
    pub command: Command,
}

/// Available commands
#[derive(Subcommand, Debug)]
pub enum Command {
    /// Run the WebSocket and static page listeners
    Serve {
        /// Path to the TOML config file (defaults apply if it is missing)
        #[arg(short, long, default_value = "hitwicket.toml")]
        config: PathBuf,

        /// Host to bind both listeners to
        #[arg(long)]
        host: Option<String>,

        /// WebSocket port
        #[arg(long)]
        ws_port: Option<u16>,

        /// Static page port
        #[arg(long)]
        http_port: Option<u16>,

        /// HTML file served on the static page port
        #[arg(long)]
        static_page: Option<PathBuf>,
    },
}
