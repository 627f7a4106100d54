//! Per-worker transaction dispatch.
//!
//! A [`TxnRunner`] owns one storage session, one executor per
//! transaction type and the market sink. After every run it enforces the
//! session contract: nothing stays open, internal faults become
//! [`EXPECTED_ROLLBACK`], and trade requests only leave once their
//! transaction committed. A panic inside an executor or the storage
//! layer counts as an internal fault too.

use std::any::Any;
use std::panic::{self, AssertUnwindSafe};

use tracing::{debug, warn};

use crate::frames::{
    BrokerVolume, CustomerPosition, DataMaintenance, MarketFeed, MarketWatch, Outcome,
    SecurityDetail, TradeCleanup, TradeLookup, TradeOrder, TradeResult, TradeStatus,
    TradeUpdate, Transaction,
};
use crate::error::TxnError;
use crate::inputs::TxnInput;
use crate::outputs::TxnOutput;
use crate::session::{DbSession, SessionState};
use crate::status::{EXPECTED_ROLLBACK, SUCCESS};
use crate::storage::StorageConnection;
use crate::trade_request::TradeRequest;

/// Where committed trade requests go.
pub trait MarketSink: Send {
    /// Deliver one request. `false` means it was not delivered; the
    /// caller keeps going with the rest.
    fn send_to_market(&mut self, req: &TradeRequest) -> bool;
}

/// Sink that drops everything. For workers without a market.
#[derive(Debug, Default)]
pub struct NullMarket;

impl MarketSink for NullMarket {
    fn send_to_market(&mut self, req: &TradeRequest) -> bool {
        debug!(trade_id = req.trade_id, "no market configured, request dropped");
        false
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct TxnResult {
    pub status: i32,
    /// `None` when the executor failed with an internal fault.
    pub output: Option<TxnOutput>,
    /// Trade requests the sink refused.
    pub failed_sends: usize,
}

#[derive(Debug, Default)]
struct Executors {
    broker_volume: BrokerVolume,
    customer_position: CustomerPosition,
    market_feed: MarketFeed,
    market_watch: MarketWatch,
    security_detail: SecurityDetail,
    trade_lookup: TradeLookup,
    trade_order: TradeOrder,
    trade_result: TradeResult,
    trade_status: TradeStatus,
    trade_update: TradeUpdate,
    data_maintenance: DataMaintenance,
    trade_cleanup: TradeCleanup,
}

pub struct TxnRunner {
    db: DbSession,
    executors: Executors,
    market: Box<dyn MarketSink>,
}

impl TxnRunner {
    pub fn new(conn: Box<dyn StorageConnection>, market: Box<dyn MarketSink>) -> Self {
        TxnRunner {
            db: DbSession::new(conn),
            executors: Executors::default(),
            market,
        }
    }

    pub fn session(&self) -> &DbSession {
        &self.db
    }

    /// Run one transaction to completion.
    pub fn run(&mut self, input: &TxnInput) -> TxnResult {
        let ty = input.txn_type();
        let outcome = panic::catch_unwind(AssertUnwindSafe(|| self.execute(input)))
            .unwrap_or_else(|payload| Err(TxnError::Panicked(panic_message(payload.as_ref()))));

        let (status, output) = match outcome {
            Ok(outcome) => (outcome.status, Some(outcome.output)),
            Err(err) => {
                warn!(txn = %ty, error = %err, "transaction failed");
                (EXPECTED_ROLLBACK, None)
            }
        };

        if self.db.is_open() {
            let expected = output.is_none() || (ty.caller_rolls_back() && status != SUCCESS);
            if !expected {
                warn!(txn = %ty, status, "transaction left open, rolling back");
            }
            if let Err(err) = self.db.rollback() {
                warn!(txn = %ty, error = %err, "rollback failed");
            }
        }

        let committed = self.db.state() == SessionState::Committed;
        if let Err(err) = self.db.reset() {
            warn!(txn = %ty, error = %err, "session reset failed");
        }

        let mut failed_sends = 0;
        if committed {
            if let Some(out) = &output {
                for req in out.trade_requests() {
                    if !self.market.send_to_market(req) {
                        warn!(
                            txn = %ty,
                            trade_id = req.trade_id,
                            symbol = %req.symbol,
                            "send to market failed"
                        );
                        failed_sends += 1;
                    }
                }
            }
        }

        debug!(txn = %ty, status, failed_sends, "transaction done");
        TxnResult {
            status,
            output,
            failed_sends,
        }
    }

    fn execute(&mut self, input: &TxnInput) -> Result<Outcome<TxnOutput>, TxnError> {
        let db = &mut self.db;
        let ex = &mut self.executors;
        Ok(match input {
            TxnInput::BrokerVolume(i) => {
                ex.broker_volume.run(db, i)?.map(TxnOutput::BrokerVolume)
            }
            TxnInput::CustomerPosition(i) => {
                ex.customer_position.run(db, i)?.map(TxnOutput::CustomerPosition)
            }
            TxnInput::MarketFeed(i) => ex.market_feed.run(db, i)?.map(TxnOutput::MarketFeed),
            TxnInput::MarketWatch(i) => ex.market_watch.run(db, i)?.map(TxnOutput::MarketWatch),
            TxnInput::SecurityDetail(i) => {
                ex.security_detail.run(db, i)?.map(TxnOutput::SecurityDetail)
            }
            TxnInput::TradeLookup(i) => ex.trade_lookup.run(db, i)?.map(TxnOutput::TradeLookup),
            TxnInput::TradeOrder(i) => ex.trade_order.run(db, i)?.map(TxnOutput::TradeOrder),
            TxnInput::TradeResult(i) => ex.trade_result.run(db, i)?.map(TxnOutput::TradeResult),
            TxnInput::TradeStatus(i) => ex.trade_status.run(db, i)?.map(TxnOutput::TradeStatus),
            TxnInput::TradeUpdate(i) => ex.trade_update.run(db, i)?.map(TxnOutput::TradeUpdate),
            TxnInput::DataMaintenance(i) => {
                ex.data_maintenance.run(db, i)?.map(TxnOutput::DataMaintenance)
            }
            TxnInput::TradeCleanup(i) => {
                ex.trade_cleanup.run(db, i)?.map(TxnOutput::TradeCleanup)
            }
        })
    }
}

fn panic_message(payload: &(dyn Any + Send)) -> String {
    if let Some(msg) = payload.downcast_ref::<&str>() {
        (*msg).to_string()
    } else if let Some(msg) = payload.downcast_ref::<String>() {
        msg.clone()
    } else {
        "unknown panic".to_string()
    }
}
