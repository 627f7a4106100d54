//! Shared types for the servers.
//!
//! This module defines:
//! - `WorkerId`: a lightweight handle for connected workers
//! - the active-worker registry
//! - channel aliases inside the Market Exchange

use std::collections::HashMap;
use std::net::SocketAddr;
use std::sync::Arc;

use brokerage_core::{MarketEvent, TradeRequest};
use chrono::{DateTime, Local};
use tokio::sync::{mpsc, RwLock};

/// Identifier for a connected worker, unique for the life of the process.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct WorkerId(pub u64);

#[derive(Debug, Clone)]
pub struct WorkerInfo {
    pub peer: SocketAddr,
    pub connected_at: DateTime<Local>,
}

/// Workers currently serving a connection.
pub type WorkerRegistry = Arc<RwLock<HashMap<WorkerId, WorkerInfo>>>;

/// Connection tasks → exchange engine task.
pub type TradeRequestTx = mpsc::UnboundedSender<TradeRequest>;
pub type TradeRequestRx = mpsc::UnboundedReceiver<TradeRequest>;

/// Exchange engine task → Brokerage House client task.
pub type MarketEventTx = mpsc::UnboundedSender<MarketEvent>;
pub type MarketEventRx = mpsc::UnboundedReceiver<MarketEvent>;
