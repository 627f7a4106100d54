//! Error type for transaction execution.
//!
//! A `TxnError` never reaches the driver: the dispatcher rolls back and
//! reports [`crate::status::EXPECTED_ROLLBACK`] instead.

use thiserror::Error;

use crate::session::SessionError;
use crate::storage::{FrameId, StorageError};

#[derive(Debug, Error)]
pub enum TxnError {
    #[error(transparent)]
    Session(#[from] SessionError),

    #[error(transparent)]
    Storage(#[from] StorageError),

    #[error("{0} returned no row")]
    MissingRow(FrameId),

    #[error("invalid input: {0}")]
    InvalidInput(String),

    #[error("panicked: {0}")]
    Panicked(String),
}
