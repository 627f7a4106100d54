//! Reader for one Brokerage House connection: fixed-size trade requests
//! in, nothing back.

use std::net::SocketAddr;

use brokerage_protocol::{decode_trade_request, TRADE_REQUEST_SIZE};
use tokio::sync::watch;
use tracing::{debug, info, warn};

use crate::transport::{Connection, TransportError};
use crate::types::TradeRequestTx;

pub(crate) async fn run_reader(
    mut conn: Connection,
    peer: SocketAddr,
    engine_tx: TradeRequestTx,
    mut shutdown: watch::Receiver<bool>,
) {
    info!(%peer, "market connection accepted");

    loop {
        let received = tokio::select! {
            biased;
            _ = shutdown.changed() => break,
            r = conn.receive(TRADE_REQUEST_SIZE) => r,
        };
        let buf = match received {
            Ok(buf) => buf,
            Err(TransportError::Closed) => break,
            Err(e) => {
                warn!(%peer, error = %e, "market receive failed");
                break;
            }
        };

        match decode_trade_request(&buf) {
            Ok(req) => {
                debug!(trade_id = req.trade_id, symbol = %req.symbol, action = ?req.action, "trade request");
                if engine_tx.send(req).is_err() {
                    warn!("exchange engine closed");
                    break;
                }
            }
            Err(e) => {
                warn!(%peer, error = %e, "undecodable trade request, closing");
                break;
            }
        }
    }

    conn.disconnect().await;
    info!(%peer, "market connection closed");
}
