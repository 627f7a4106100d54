//! Market Exchange emulator.

use std::path::PathBuf;

use anyhow::Result;
use brokerage_server::{market, Config, Shutdown};
use clap::Parser;
use tracing::info;
use tracing_subscriber::EnvFilter;

#[derive(Parser)]
#[clap(name = "market-exchange")]
#[clap(about = "Market Exchange emulator for the Brokerage House")]
struct Cli {
    /// TOML configuration file
    #[clap(short, long)]
    config: Option<PathBuf>,

    /// Port to listen on
    #[clap(short, long)]
    port: Option<u16>,

    /// Brokerage House host to send results to
    #[clap(short, long)]
    brokerage: Option<String>,

    /// Debug logging
    #[clap(short, long)]
    verbose: bool,
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    let mut config = Config::load(cli.config.as_deref())?;
    if let Some(port) = cli.port {
        config.mee_port = port;
    }
    if let Some(host) = cli.brokerage {
        config.bh_host = host;
    }

    let default = if cli.verbose || config.verbose { "debug" } else { "info" };
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default)),
        )
        .init();

    let shutdown = Shutdown::new();
    let signal = shutdown.subscribe();
    tokio::spawn(async move {
        if tokio::signal::ctrl_c().await.is_ok() {
            info!("interrupt received, shutting down");
            shutdown.trigger();
        }
    });

    market::run(&config, signal).await
}
