//! brokerage-server
//!
//! Async TCP servers for the brokerage harness:
//! - the Brokerage House, running transactions for drivers
//! - the Market Exchange emulator, feeding results and prices back
//! - the bridge carrying committed trade requests between them

pub mod bridge;
pub mod brokerage;
pub mod client;
pub mod config;
pub mod context;
pub mod market;
pub mod transport;
pub mod txn_log;
pub mod types;

pub use bridge::MarketHandle;
pub use client::{BrokerageClient, ClientError};
pub use config::{Config, ConfigError, MarketSettings};
pub use context::{ServerContext, Shutdown};
pub use transport::{Connection, Listener, TransportError};
pub use txn_log::TxnLog;
