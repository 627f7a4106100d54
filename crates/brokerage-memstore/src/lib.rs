//! brokerage-memstore
//!
//! In-memory storage backend implementing every transaction frame.
//!
//! - [`tables`]    : row types and the table set
//! - [`dataset`]   : deterministic data generation
//! - [`txn_lock`]  : the store-wide transaction lock
//! - `frames`      : the frame functions
//!
//! A [`MemStore`] hands out [`MemConnection`]s. Each connection runs one
//! transaction at a time under the store-wide lock, working directly on
//! the shared tables; `begin` keeps a copy so `rollback` can restore it.

pub mod dataset;
mod frames;
pub mod tables;
pub mod txn_lock;

use std::sync::{Arc, Mutex, MutexGuard, PoisonError};
use std::time::Duration;

use chrono::{NaiveDateTime, Utc};

use brokerage_core::{
    FrameCall, IsolationLevel, QueryResult, StorageConnection, StorageConnector, StorageError,
};

pub use dataset::DatasetConfig;
pub use tables::Tables;
pub use txn_lock::TxnLock;

/// How long `begin` waits for another connection's transaction.
pub const DEFAULT_LOCK_TIMEOUT: Duration = Duration::from_secs(30);

struct Shared {
    tables: Mutex<Tables>,
    lock: TxnLock,
    lock_timeout: Duration,
}

impl Shared {
    fn tables(&self) -> MutexGuard<'_, Tables> {
        self.tables.lock().unwrap_or_else(PoisonError::into_inner)
    }
}

/// The shared in-memory database.
#[derive(Clone)]
pub struct MemStore {
    shared: Arc<Shared>,
}

impl MemStore {
    pub fn new(tables: Tables) -> Self {
        Self::with_lock_timeout(tables, DEFAULT_LOCK_TIMEOUT)
    }

    pub fn with_lock_timeout(tables: Tables, lock_timeout: Duration) -> Self {
        MemStore {
            shared: Arc::new(Shared {
                tables: Mutex::new(tables),
                lock: TxnLock::new(),
                lock_timeout,
            }),
        }
    }

    /// A store over freshly generated data.
    pub fn generate(config: &DatasetConfig) -> Self {
        Self::new(dataset::generate(config))
    }

    /// Read the current tables.
    pub fn read<R>(&self, f: impl FnOnce(&Tables) -> R) -> R {
        f(&self.shared.tables())
    }

    /// Open a connection; same as [`StorageConnector::connect`] without the
    /// boxing.
    pub fn connection(&self) -> MemConnection {
        MemConnection {
            shared: Arc::clone(&self.shared),
            open: None,
            clock: Box::new(|| Utc::now().naive_utc()),
        }
    }
}

impl StorageConnector for MemStore {
    fn connect(&self) -> Result<Box<dyn StorageConnection>, StorageError> {
        Ok(Box::new(self.connection()))
    }
}

struct OpenTxn {
    snapshot: Tables,
    isolation: Option<IsolationLevel>,
}

/// One connection to a [`MemStore`].
pub struct MemConnection {
    shared: Arc<Shared>,
    open: Option<OpenTxn>,
    clock: Box<dyn Fn() -> NaiveDateTime + Send>,
}

impl MemConnection {
    /// Stamp written rows with `clock` instead of the wall clock.
    pub fn with_clock(mut self, clock: impl Fn() -> NaiveDateTime + Send + 'static) -> Self {
        self.clock = Box::new(clock);
        self
    }

    pub fn in_transaction(&self) -> bool {
        self.open.is_some()
    }

    pub fn isolation(&self) -> Option<IsolationLevel> {
        self.open.as_ref().and_then(|t| t.isolation)
    }

    fn require_open(&mut self, what: &str) -> Result<&mut OpenTxn, StorageError> {
        self.open
            .as_mut()
            .ok_or_else(|| StorageError::Transaction(format!("{} outside a transaction", what)))
    }
}

impl StorageConnection for MemConnection {
    fn begin(&mut self) -> Result<(), StorageError> {
        if self.open.is_some() {
            return Err(StorageError::Transaction(
                "begin inside an open transaction".to_string(),
            ));
        }
        self.shared.lock.acquire(self.shared.lock_timeout)?;
        let snapshot = self.shared.tables().clone();
        self.open = Some(OpenTxn {
            snapshot,
            isolation: None,
        });
        Ok(())
    }

    fn set_isolation(&mut self, level: IsolationLevel) -> Result<(), StorageError> {
        self.require_open("set isolation")?.isolation = Some(level);
        Ok(())
    }

    fn execute(&mut self, call: &FrameCall) -> Result<QueryResult, StorageError> {
        self.require_open("execute")?;
        let now = (self.clock)();
        let mut tables = self.shared.tables();
        let result = frames::execute(&mut tables, call, now);
        if let Err(e) = &result {
            tracing::debug!(frame = %call.frame, error = %e, "frame failed");
        }
        result
    }

    fn commit(&mut self) -> Result<(), StorageError> {
        self.require_open("commit")?;
        self.open = None;
        self.shared.lock.release();
        Ok(())
    }

    fn rollback(&mut self) -> Result<(), StorageError> {
        let txn = self
            .open
            .take()
            .ok_or_else(|| StorageError::Transaction("rollback outside a transaction".to_string()))?;
        *self.shared.tables() = txn.snapshot;
        self.shared.lock.release();
        Ok(())
    }
}

impl Drop for MemConnection {
    fn drop(&mut self) {
        if self.open.is_some() {
            tracing::warn!("connection dropped inside a transaction, rolling back");
            let _ = self.rollback();
        }
    }
}
