//! Trade Status: the latest trades of one account.

use super::{count, first_row, FramePosition, FrameScope, FrameSpec, Outcome, Transaction};
use crate::error::TxnError;
use crate::inputs::TradeStatusInput;
use crate::isolation::IsolationLevel;
use crate::limits::MAX_TRADE_STATUS_LEN;
use crate::outputs::{StatusTrade, TradeStatusOutput};
use crate::session::DbSession;
use crate::status;
use crate::storage::{FrameId, Value};

#[derive(Debug, Default)]
pub struct TradeStatus;

impl Transaction for TradeStatus {
    type Input = TradeStatusInput;
    type Output = TradeStatusOutput;

    const FRAMES: &'static [FrameSpec] = &[FrameSpec::new(
        FrameId::TradeStatus1,
        IsolationLevel::ReadCommitted,
        FrameScope::ReadOnly,
        FramePosition::Only,
    )];

    fn run(
        &mut self,
        db: &mut DbSession,
        input: &TradeStatusInput,
    ) -> Result<Outcome<TradeStatusOutput>, TxnError> {
        let result = Self::FRAMES[0].call(db, vec![Value::from(input.acct_id)])?;

        let mut out = TradeStatusOutput::default();
        if !result.rows().is_empty() {
            let cust = first_row(&result, FrameId::TradeStatus1)?;
            out.c_l_name = cust.text(0)?;
            out.c_f_name = cust.text(1)?;
            out.broker_name = cust.text(2)?;
        }
        for row in result.set(1) {
            out.trades.push(StatusTrade {
                trade_id: row.int(0)?,
                trade_dts: row.timestamp(1)?,
                status_name: row.text(2)?,
                type_name: row.text(3)?,
                symbol: row.text(4)?,
                trade_qty: row.int32(5)?,
                exec_name: row.text(6)?,
                charge: row.float(7)?,
                s_name: row.text(8)?,
                ex_name: row.text(9)?,
            });
        }
        out.num_found = count(out.trades.len());

        if out.trades.is_empty() || out.trades.len() > MAX_TRADE_STATUS_LEN {
            db.rollback()?;
            return Ok(Outcome::new(status::TRADE_STATUS_BAD_COUNT, out));
        }

        db.commit()?;
        Ok(Outcome::new(status::SUCCESS, out))
    }
}
