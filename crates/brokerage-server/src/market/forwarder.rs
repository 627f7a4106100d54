//! Runs the exchange's Trade Result and Market Feed transactions against
//! the Brokerage House, over one driver connection that is dialled
//! lazily and redialled after a failure.

use brokerage_core::status::SUCCESS;
use brokerage_core::{MarketEvent, TxnInput};
use tracing::{debug, info, warn};

use crate::client::BrokerageClient;
use crate::types::MarketEventRx;

pub(crate) async fn run_forwarder(bh_addr: String, mut events: MarketEventRx) {
    let mut client: Option<BrokerageClient> = None;

    while let Some(event) = events.recv().await {
        let input = match event {
            MarketEvent::TradeResult(r) => TxnInput::TradeResult(r),
            MarketEvent::MarketFeed(f) => TxnInput::MarketFeed(f),
        };
        let ty = input.txn_type();

        if client.is_none() {
            match BrokerageClient::connect(&bh_addr).await {
                Ok(c) => {
                    info!(addr = %bh_addr, "connected to brokerage house");
                    client = Some(c);
                }
                Err(e) => {
                    warn!(addr = %bh_addr, txn = %ty, error = %e, "brokerage house unreachable, dropping");
                    continue;
                }
            }
        }
        let Some(c) = client.as_mut() else { continue };

        match c.call(&input).await {
            Ok(SUCCESS) => debug!(txn = %ty, "done"),
            Ok(status) => warn!(txn = %ty, status, "brokerage house returned failure"),
            Err(e) => {
                warn!(txn = %ty, error = %e, "call failed, reconnecting on next event");
                if let Some(mut c) = client.take() {
                    c.disconnect().await;
                }
            }
        }
    }

    if let Some(mut c) = client.take() {
        c.disconnect().await;
    }
    info!("forwarder stopped");
}
