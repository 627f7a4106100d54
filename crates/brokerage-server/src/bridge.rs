//! Send-To-Market bridge.
//!
//! Workers run transactions on blocking threads, so the sink they hold is
//! synchronous: [`MarketHandle::send_to_market`] queues the request for a
//! single bridge task and waits for its answer. The bridge task owns the
//! one connection to the Market Exchange, dials it on first use and after
//! every failure, and never retries a request it could not deliver.

use brokerage_core::{MarketSink, TradeRequest};
use brokerage_protocol::{encode_trade_request, TRADE_REQUEST_SIZE};
use tokio::sync::{mpsc, oneshot};
use tokio::task::JoinHandle;
use tracing::{debug, info, warn};

use crate::transport::{Connection, TransportError};

/// Requests waiting for the bridge task.
const QUEUE_DEPTH: usize = 256;

struct Pending {
    request: TradeRequest,
    delivered: oneshot::Sender<bool>,
}

/// Cloneable handle to the bridge task.
#[derive(Clone)]
pub struct MarketHandle {
    tx: mpsc::Sender<Pending>,
}

impl MarketHandle {
    /// Start the bridge task for the exchange at `addr`. The task ends
    /// once every handle is dropped.
    pub fn spawn(addr: String) -> (Self, JoinHandle<()>) {
        let (tx, rx) = mpsc::channel(QUEUE_DEPTH);
        let task = tokio::spawn(run_bridge(addr, rx));
        (MarketHandle { tx }, task)
    }
}

impl MarketSink for MarketHandle {
    /// Blocks until the bridge answers. Must not be called from an async
    /// context.
    fn send_to_market(&mut self, req: &TradeRequest) -> bool {
        let (delivered, answer) = oneshot::channel();
        let pending = Pending {
            request: req.clone(),
            delivered,
        };
        if self.tx.blocking_send(pending).is_err() {
            warn!(trade_id = req.trade_id, "market bridge is gone");
            return false;
        }
        answer.blocking_recv().unwrap_or(false)
    }
}

async fn run_bridge(addr: String, mut rx: mpsc::Receiver<Pending>) {
    let mut conn: Option<Connection> = None;

    while let Some(Pending { request, delivered }) = rx.recv().await {
        let ok = match deliver(&addr, &mut conn, &request).await {
            Ok(()) => {
                debug!(trade_id = request.trade_id, symbol = %request.symbol, "sent to market");
                true
            }
            Err(e) => {
                warn!(
                    trade_id = request.trade_id,
                    addr = %addr,
                    error = %e,
                    "send to market failed, reconnecting on next request"
                );
                if let Some(mut c) = conn.take() {
                    c.disconnect().await;
                }
                false
            }
        };
        let _ = delivered.send(ok);
    }

    if let Some(mut c) = conn.take() {
        c.disconnect().await;
    }
    info!("market bridge stopped");
}

async fn deliver(
    addr: &str,
    conn: &mut Option<Connection>,
    request: &TradeRequest,
) -> Result<(), TransportError> {
    let mut buf = Vec::with_capacity(TRADE_REQUEST_SIZE);
    encode_trade_request(request, &mut buf).map_err(|e| TransportError::Io {
        op: "encode",
        reason: e.to_string(),
    })?;

    if conn.is_none() {
        *conn = Some(Connection::connect(addr).await?);
        info!(addr = %addr, "connected to market exchange");
    }
    let c = conn.as_mut().ok_or(TransportError::NotConnected)?;
    c.send(&buf).await
}
