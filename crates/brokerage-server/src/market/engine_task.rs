//! Central exchange loop.
//!
//! This task owns the `MarketExchange` instance. Trade requests from
//! every connection arrive on one channel; a timer advances the exchange
//! clock so delayed results and partial ticker batches still go out.
//! Every event the exchange produces is handed to the forwarder.

use std::time::Duration;

use brokerage_core::{MarketConfig, MarketEvent, MarketExchange};
use tokio::sync::watch;
use tokio::time::{interval, Instant, MissedTickBehavior};
use tracing::{debug, info, warn};

use crate::types::{MarketEventTx, TradeRequestRx};

pub(crate) async fn run_engine_loop(
    mut requests: TradeRequestRx,
    events: MarketEventTx,
    config: MarketConfig,
    tick_every: Duration,
    mut shutdown: watch::Receiver<bool>,
) {
    let mut exchange = MarketExchange::new(config);
    let start = Instant::now();
    let mut ticker = interval(tick_every);
    ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);

    loop {
        let produced = tokio::select! {
            _ = shutdown.changed() => break,
            maybe = requests.recv() => {
                let Some(req) = maybe else { break };
                let trade_id = req.trade_id;
                match exchange.submit_trade_request(req, start.elapsed()) {
                    Ok(events) => events,
                    Err(e) => {
                        warn!(trade_id, error = %e, "trade request rejected");
                        continue;
                    }
                }
            }
            _ = ticker.tick() => exchange.tick(start.elapsed()),
        };

        if !forward(&events, produced) {
            break;
        }
    }

    info!(
        pending_limit_orders = exchange.pending_limit_orders(),
        pending_results = exchange.pending_results(),
        "exchange engine stopped"
    );
}

/// `false` once the forwarder is gone.
fn forward(events: &MarketEventTx, produced: Vec<MarketEvent>) -> bool {
    for event in produced {
        match &event {
            MarketEvent::TradeResult(r) => {
                debug!(trade_id = r.trade_id, price = r.trade_price, "trade executed")
            }
            MarketEvent::MarketFeed(f) => debug!(entries = f.entries.len(), "market feed"),
        }
        if events.send(event).is_err() {
            return false;
        }
    }
    true
}
