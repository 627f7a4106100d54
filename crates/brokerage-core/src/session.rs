//! A worker's storage session and its transaction state machine.
//!
//! ```text
//! Idle ──begin──▶ Open ──commit──▶ Committed
//!                  │
//!                  └──rollback──▶ RolledBack
//! ```
//!
//! Frame calls, commit and rollback are only legal while `Open`. The
//! dispatcher calls [`DbSession::reset`] after every transaction; a
//! session still `Open` at that point is an error the dispatcher must
//! deal with (roll back) first.

use thiserror::Error;
use tracing::debug;

use crate::error::TxnError;
use crate::isolation::IsolationLevel;
use crate::storage::{FrameCall, FrameId, QueryResult, StorageConnection, Value};

#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub enum SessionState {
    Idle,
    Open(IsolationLevel),
    Committed,
    RolledBack,
}

#[derive(Debug, Error, PartialEq, Eq)]
pub enum SessionError {
    #[error("transaction already open")]
    AlreadyOpen,

    #[error("no open transaction for {0}")]
    NotOpen(&'static str),

    #[error("transaction left open")]
    LeftOpen,
}

pub struct DbSession {
    conn: Box<dyn StorageConnection>,
    state: SessionState,
}

impl DbSession {
    pub fn new(conn: Box<dyn StorageConnection>) -> Self {
        DbSession {
            conn,
            state: SessionState::Idle,
        }
    }

    pub fn state(&self) -> SessionState {
        self.state
    }

    pub fn is_open(&self) -> bool {
        matches!(self.state, SessionState::Open(_))
    }

    /// Start a transaction and set its isolation level.
    pub fn begin(&mut self, level: IsolationLevel) -> Result<(), TxnError> {
        if self.is_open() {
            return Err(SessionError::AlreadyOpen.into());
        }
        self.conn.begin()?;
        // The transaction exists from here on; make sure it gets closed
        // even if the isolation command fails.
        self.state = SessionState::Open(level);
        self.conn.set_isolation(level)?;
        debug!(isolation = %level, "transaction opened");
        Ok(())
    }

    pub fn execute(
        &mut self,
        frame: FrameId,
        params: Vec<Value>,
    ) -> Result<QueryResult, TxnError> {
        if !self.is_open() {
            return Err(SessionError::NotOpen("frame call").into());
        }
        let call = FrameCall::new(frame, params);
        Ok(self.conn.execute(&call)?)
    }

    pub fn commit(&mut self) -> Result<(), TxnError> {
        if !self.is_open() {
            return Err(SessionError::NotOpen("commit").into());
        }
        let res = self.conn.commit();
        self.state = match res {
            Ok(()) => SessionState::Committed,
            // A failed commit leaves the backend transaction aborted.
            Err(_) => SessionState::RolledBack,
        };
        Ok(res?)
    }

    pub fn rollback(&mut self) -> Result<(), TxnError> {
        if !self.is_open() {
            return Err(SessionError::NotOpen("rollback").into());
        }
        self.state = SessionState::RolledBack;
        Ok(self.conn.rollback()?)
    }

    /// Return to `Idle` for the next transaction.
    pub fn reset(&mut self) -> Result<(), SessionError> {
        if self.is_open() {
            return Err(SessionError::LeftOpen);
        }
        self.state = SessionState::Idle;
        Ok(())
    }
}
