//! brokerage-core
//!
//! Pure brokerage logic:
//! - transaction types, inputs, outputs and status codes
//! - the storage boundary and the per-worker session state machine
//! - one frame-driven executor per transaction type
//! - the dispatcher enforcing the transaction contract
//! - the Market Exchange engine

pub mod dispatch;
pub mod error;
pub mod frames;
pub mod inputs;
pub mod isolation;
pub mod limits;
pub mod market;
pub mod outputs;
pub mod session;
pub mod status;
pub mod storage;
pub mod trade_request;
pub mod txn_type;

pub use dispatch::{MarketSink, NullMarket, TxnResult, TxnRunner};
pub use error::TxnError;
pub use frames::{frame_table, FramePosition, FrameScope, FrameSpec, Outcome, Transaction};
pub use inputs::*;
pub use isolation::IsolationLevel;
pub use market::{MarketConfig, MarketError, MarketEvent, MarketExchange};
pub use outputs::*;
pub use session::{DbSession, SessionError, SessionState};
pub use storage::{
    FrameCall, FrameId, QueryResult, Row, StorageConnection, StorageConnector, StorageError,
    Value,
};
pub use trade_request::{status_id, MeeAction, TradeRequest, TradeType};
pub use txn_type::TxnType;
