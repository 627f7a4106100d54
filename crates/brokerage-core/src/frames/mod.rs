//! Transaction frame set and the per-type executors.
//!
//! Every transaction type is an ordered table of [`FrameSpec`]s. The
//! first frame opens the storage transaction under the isolation level the
//! type requires; intermediate frames reuse it; the terminal frame commits.
//! Trade Order additionally has a rollback-only frame.

pub mod broker_volume;
pub mod customer_position;
pub mod data_maintenance;
pub mod market_feed;
pub mod market_watch;
pub mod security_detail;
pub mod trade_cleanup;
pub mod trade_lookup;
pub mod trade_order;
pub mod trade_result;
pub mod trade_status;
pub mod trade_update;

pub use broker_volume::BrokerVolume;
pub use customer_position::CustomerPosition;
pub use data_maintenance::DataMaintenance;
pub use market_feed::MarketFeed;
pub use market_watch::MarketWatch;
pub use security_detail::SecurityDetail;
pub use trade_cleanup::TradeCleanup;
pub use trade_lookup::TradeLookup;
pub use trade_order::TradeOrder;
pub use trade_result::TradeResult;
pub use trade_status::TradeStatus;
pub use trade_update::TradeUpdate;

use crate::error::TxnError;
use crate::isolation::IsolationLevel;
use crate::outputs::TradeInfo;
use crate::session::DbSession;
use crate::storage::{FrameId, QueryResult, Row, Value};
use crate::txn_type::TxnType;

/// Whether a frame writes.
#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub enum FrameScope {
    ReadOnly,
    Mutating,
}

/// Where a frame sits in its transaction.
#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub enum FramePosition {
    /// Opens the transaction.
    Begin,
    Intermediate,
    /// Commits on success.
    Commit,
    /// Opens and commits: the whole transaction is this frame.
    Only,
    /// Exists only to roll back.
    RollbackOnly,
}

impl FramePosition {
    pub fn opens(self) -> bool {
        matches!(self, FramePosition::Begin | FramePosition::Only)
    }

    pub fn commits(self) -> bool {
        matches!(self, FramePosition::Commit | FramePosition::Only)
    }
}

#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub struct FrameSpec {
    pub id: FrameId,
    pub isolation: IsolationLevel,
    pub scope: FrameScope,
    pub position: FramePosition,
}

impl FrameSpec {
    pub const fn new(
        id: FrameId,
        isolation: IsolationLevel,
        scope: FrameScope,
        position: FramePosition,
    ) -> Self {
        FrameSpec {
            id,
            isolation,
            scope,
            position,
        }
    }

    pub const fn closing(id: FrameId, isolation: IsolationLevel, position: FramePosition) -> Self {
        FrameSpec {
            id,
            isolation,
            scope: FrameScope::ReadOnly,
            position,
        }
    }

    /// Open the transaction if this frame starts one, then call it.
    pub(crate) fn call(&self, db: &mut DbSession, params: Vec<Value>) -> Result<QueryResult, TxnError> {
        if self.position.opens() {
            db.begin(self.isolation)?;
        }
        db.execute(self.id, params)
    }
}

/// Status plus output of one transaction run.
#[derive(Debug, Clone, PartialEq)]
pub struct Outcome<T> {
    pub status: i32,
    pub output: T,
}

impl<T> Outcome<T> {
    pub fn new(status: i32, output: T) -> Self {
        Outcome { status, output }
    }

    pub fn map<U>(self, f: impl FnOnce(T) -> U) -> Outcome<U> {
        Outcome {
            status: self.status,
            output: f(self.output),
        }
    }
}

/// One executor per transaction type.
pub trait Transaction {
    type Input;
    type Output;

    const FRAMES: &'static [FrameSpec];

    fn run(
        &mut self,
        db: &mut DbSession,
        input: &Self::Input,
    ) -> Result<Outcome<Self::Output>, TxnError>;
}

/// The frame table of a transaction type.
pub fn frame_table(ty: TxnType) -> &'static [FrameSpec] {
    match ty {
        TxnType::BrokerVolume => BrokerVolume::FRAMES,
        TxnType::CustomerPosition => CustomerPosition::FRAMES,
        TxnType::MarketFeed => MarketFeed::FRAMES,
        TxnType::MarketWatch => MarketWatch::FRAMES,
        TxnType::SecurityDetail => SecurityDetail::FRAMES,
        TxnType::TradeLookup => TradeLookup::FRAMES,
        TxnType::TradeOrder => TradeOrder::FRAMES,
        TxnType::TradeResult => TradeResult::FRAMES,
        TxnType::TradeStatus => TradeStatus::FRAMES,
        TxnType::TradeUpdate => TradeUpdate::FRAMES,
        TxnType::DataMaintenance => DataMaintenance::FRAMES,
        TxnType::TradeCleanup => TradeCleanup::FRAMES,
    }
}

pub(crate) fn first_row(result: &QueryResult, frame: FrameId) -> Result<&Row, TxnError> {
    result.rows().first().ok_or(TxnError::MissingRow(frame))
}

/// Decode the common trade row shape:
/// `(t_id, ca_id, bid_price, exec_name, is_cash, trade_price, qty, dts, tt_id, detail)`.
pub(crate) fn trade_info(row: &Row) -> Result<TradeInfo, TxnError> {
    Ok(TradeInfo {
        trade_id: row.int(0)?,
        acct_id: row.int(1)?,
        bid_price: row.float(2)?,
        exec_name: row.text(3)?,
        is_cash: row.boolean(4)?,
        trade_price: row.float(5)?,
        trade_qty: row.int32(6)?,
        trade_dts: row.timestamp(7)?,
        trade_type: row.text(8)?,
        detail: row.opt_text(9)?,
    })
}

pub(crate) fn count(len: usize) -> i32 {
    i32::try_from(len).unwrap_or(i32::MAX)
}
