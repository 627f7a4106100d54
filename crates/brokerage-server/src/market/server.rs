//! TCP listener and top-level Market Exchange wiring.
//!
//! Spawns:
//! - a reader task per Brokerage House connection,
//! - a single engine task owning the `MarketExchange`,
//! - a single forwarder task submitting the exchange's transactions.

use anyhow::Context;
use tokio::sync::{mpsc, watch};
use tokio::task::JoinSet;
use tracing::{info, warn};

use crate::config::{Config, MarketSettings};
use crate::transport::Listener;
use crate::types::{MarketEventRx, MarketEventTx, TradeRequestRx, TradeRequestTx};

use super::{engine_task, forwarder, worker};

/// Bind the configured exchange address and serve until `shutdown`.
pub async fn run(config: &Config, shutdown: watch::Receiver<bool>) -> anyhow::Result<()> {
    let addr = config.mee_listen_addr();
    let listener = Listener::bind(&addr)
        .await
        .with_context(|| format!("binding {}", addr))?;
    serve(listener, config.market.clone(), config.bh_target(), shutdown).await
}

/// Serve trade requests arriving on `listener`; results and feeds go to
/// the Brokerage House at `bh_addr`.
pub async fn serve(
    listener: Listener,
    settings: MarketSettings,
    bh_addr: String,
    mut shutdown: watch::Receiver<bool>,
) -> anyhow::Result<()> {
    if let Ok(addr) = listener.local_addr() {
        info!(%addr, bh = %bh_addr, "market exchange listening");
    }

    let (engine_tx, engine_rx): (TradeRequestTx, TradeRequestRx) = mpsc::unbounded_channel();
    let (event_tx, event_rx): (MarketEventTx, MarketEventRx) = mpsc::unbounded_channel();

    let engine = tokio::spawn(engine_task::run_engine_loop(
        engine_rx,
        event_tx,
        settings.market_config(),
        settings.tick_interval(),
        shutdown.clone(),
    ));
    let forwarder = tokio::spawn(forwarder::run_forwarder(bh_addr, event_rx));

    let mut readers = JoinSet::new();
    while !*shutdown.borrow_and_update() {
        tokio::select! {
            changed = shutdown.changed() => {
                if changed.is_err() {
                    break;
                }
            }
            Some(_) = readers.join_next(), if !readers.is_empty() => {}
            accepted = listener.accept() => match accepted {
                Ok((conn, peer)) => {
                    readers.spawn(worker::run_reader(
                        conn,
                        peer,
                        engine_tx.clone(),
                        shutdown.clone(),
                    ));
                }
                Err(e) => warn!(error = %e, "accept failed"),
            },
        }
    }

    info!("market exchange stopping");
    while readers.join_next().await.is_some() {}
    drop(engine_tx);
    // The engine drops its event sender on exit, which ends the forwarder.
    engine.await.context("exchange engine task")?;
    forwarder.await.context("forwarder task")?;
    Ok(())
}
