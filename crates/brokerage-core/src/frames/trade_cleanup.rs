//! Trade Cleanup: cancels every trade at or after `start_trade_id` that a
//! previous run left pending or submitted.

use super::{FramePosition, FrameScope, FrameSpec, Outcome, Transaction};
use crate::error::TxnError;
use crate::inputs::TradeCleanupInput;
use crate::isolation::IsolationLevel;
use crate::outputs::TradeCleanupOutput;
use crate::session::DbSession;
use crate::status;
use crate::storage::{FrameId, Value};

#[derive(Debug, Default)]
pub struct TradeCleanup;

impl Transaction for TradeCleanup {
    type Input = TradeCleanupInput;
    type Output = TradeCleanupOutput;

    const FRAMES: &'static [FrameSpec] = &[FrameSpec::new(
        FrameId::TradeCleanup1,
        IsolationLevel::ReadCommitted,
        FrameScope::Mutating,
        FramePosition::Only,
    )];

    fn run(
        &mut self,
        db: &mut DbSession,
        input: &TradeCleanupInput,
    ) -> Result<Outcome<TradeCleanupOutput>, TxnError> {
        let result = Self::FRAMES[0].call(
            db,
            vec![
                Value::from(input.st_canceled_id.as_str()),
                Value::from(input.st_pending_id.as_str()),
                Value::from(input.st_submitted_id.as_str()),
                Value::from(input.start_trade_id),
            ],
        )?;

        db.commit()?;
        Ok(Outcome::new(
            status::SUCCESS,
            TradeCleanupOutput {
                canceled: i32::try_from(result.affected).unwrap_or(i32::MAX),
            },
        ))
    }
}
