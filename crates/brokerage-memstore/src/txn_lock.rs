//! Store-wide transaction lock.
//!
//! At most one transaction is open at a time. That is stricter than any
//! isolation level a frame asks for, so every level is honoured.

use std::sync::{Condvar, Mutex, PoisonError};
use std::time::Duration;

use brokerage_core::StorageError;

#[derive(Debug, Default)]
pub struct TxnLock {
    held: Mutex<bool>,
    released: Condvar,
}

impl TxnLock {
    pub fn new() -> Self {
        Self::default()
    }

    /// Block until the lock is free, then take it. Gives up after
    /// `timeout`.
    pub fn acquire(&self, timeout: Duration) -> Result<(), StorageError> {
        let held = self.held.lock().unwrap_or_else(PoisonError::into_inner);
        let (mut held, wait) = self
            .released
            .wait_timeout_while(held, timeout, |held| *held)
            .unwrap_or_else(PoisonError::into_inner);
        if wait.timed_out() && *held {
            return Err(StorageError::Transaction(format!(
                "timed out after {:?} waiting for the transaction lock",
                timeout
            )));
        }
        *held = true;
        Ok(())
    }

    pub fn release(&self) {
        let mut held = self.held.lock().unwrap_or_else(PoisonError::into_inner);
        *held = false;
        self.released.notify_one();
    }

    pub fn is_held(&self) -> bool {
        *self.held.lock().unwrap_or_else(PoisonError::into_inner)
    }
}
