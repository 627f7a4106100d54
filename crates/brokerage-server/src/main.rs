//! Brokerage House server over the in-memory data set.

use std::path::PathBuf;
use std::sync::Arc;

use anyhow::{Context, Result};
use brokerage_memstore::{DatasetConfig, MemStore};
use brokerage_server::{brokerage, Config, MarketHandle, ServerContext, TxnLog};
use clap::Parser;
use tracing::info;
use tracing_subscriber::EnvFilter;

#[derive(Parser)]
#[clap(name = "brokerage-house")]
#[clap(about = "Brokerage House transaction server")]
struct Cli {
    /// TOML configuration file
    #[clap(short, long)]
    config: Option<PathBuf>,

    /// Port to listen on
    #[clap(short, long)]
    port: Option<u16>,

    /// Market Exchange address (host:port); overrides the configured one
    #[clap(short, long)]
    market: Option<String>,

    /// Run without a Market Exchange
    #[clap(long)]
    no_market: bool,

    /// Customers in the generated data set
    #[clap(long)]
    customers: Option<usize>,

    /// Debug logging, and output records in the mix log
    #[clap(short, long)]
    verbose: bool,
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    let mut config = Config::load(cli.config.as_deref())?;
    if let Some(port) = cli.port {
        config.port = port;
    }
    if let Some(customers) = cli.customers {
        config.customers = customers;
    }
    config.verbose |= cli.verbose;
    init_logging(config.verbose);

    let log = TxnLog::open(&config.error_log, &config.mix_log, config.verbose)
        .context("opening transaction logs")?;

    info!(customers = config.customers, "generating data set");
    let store = MemStore::generate(&DatasetConfig {
        customers: config.customers,
        ..DatasetConfig::default()
    });

    let market = if cli.no_market {
        None
    } else {
        let target = cli.market.clone().unwrap_or_else(|| config.mee_target());
        info!(%target, "trade requests go to market exchange");
        Some(MarketHandle::spawn(target).0)
    };

    let ctx = ServerContext::new(config, log, Arc::new(store), market);

    {
        let ctx = Arc::clone(&ctx);
        tokio::spawn(async move {
            if tokio::signal::ctrl_c().await.is_ok() {
                info!("interrupt received, shutting down");
                ctx.shutdown.trigger();
            }
        });
    }

    brokerage::run(ctx).await
}

fn init_logging(verbose: bool) {
    let default = if verbose { "debug" } else { "info" };
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default)),
        )
        .init();
}
