//! State shared by the Brokerage House listener and its workers.

use std::sync::Arc;

use brokerage_core::{MarketSink, NullMarket, StorageConnector};
use tokio::sync::watch;

use crate::bridge::MarketHandle;
use crate::config::Config;
use crate::txn_log::TxnLog;
use crate::types::WorkerRegistry;

/// Process-wide stop signal.
///
/// Listeners stop accepting and idle connections close once it fires.
#[derive(Debug)]
pub struct Shutdown {
    tx: watch::Sender<bool>,
}

impl Shutdown {
    pub fn new() -> Self {
        let (tx, _) = watch::channel(false);
        Shutdown { tx }
    }

    pub fn trigger(&self) {
        self.tx.send_replace(true);
    }

    pub fn is_triggered(&self) -> bool {
        *self.tx.borrow()
    }

    pub fn subscribe(&self) -> watch::Receiver<bool> {
        self.tx.subscribe()
    }
}

impl Default for Shutdown {
    fn default() -> Self {
        Self::new()
    }
}

pub struct ServerContext {
    pub config: Config,
    pub log: TxnLog,
    pub storage: Arc<dyn StorageConnector>,
    /// `None` runs without an exchange: trade requests are dropped.
    pub market: Option<MarketHandle>,
    pub workers: WorkerRegistry,
    pub shutdown: Shutdown,
}

impl ServerContext {
    pub fn new(
        config: Config,
        log: TxnLog,
        storage: Arc<dyn StorageConnector>,
        market: Option<MarketHandle>,
    ) -> Arc<Self> {
        Arc::new(ServerContext {
            config,
            log,
            storage,
            market,
            workers: WorkerRegistry::default(),
            shutdown: Shutdown::new(),
        })
    }

    /// The sink a new worker hands to its runner.
    pub fn market_sink(&self) -> Box<dyn MarketSink> {
        match &self.market {
            Some(handle) => Box::new(handle.clone()),
            None => Box::new(NullMarket),
        }
    }

    pub async fn active_workers(&self) -> usize {
        self.workers.read().await.len()
    }
}
