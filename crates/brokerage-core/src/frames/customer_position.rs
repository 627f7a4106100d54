//! Customer Position.
//!
//! Frame 1 opens the transaction and lists the customer's accounts.
//! Frame 2 (history of one account) or frame 3 (nothing more) commits.
//! When frame 1 fails its checks the transaction is left open and the
//! dispatcher rolls it back.

use super::{count, FramePosition, FrameScope, FrameSpec, Outcome, Transaction};
use crate::error::TxnError;
use crate::inputs::CustomerPositionInput;
use crate::isolation::IsolationLevel;
use crate::limits::{MAX_ACCT_LEN, MAX_HIST_LEN, MIN_HIST_LEN};
use crate::outputs::{CustomerPositionOutput, PositionHistory};
use crate::session::DbSession;
use crate::status;
use crate::storage::{FrameId, Value};

const ISOLATION: IsolationLevel = IsolationLevel::ReadCommitted;

#[derive(Debug, Default)]
pub struct CustomerPosition;

impl Transaction for CustomerPosition {
    type Input = CustomerPositionInput;
    type Output = CustomerPositionOutput;

    const FRAMES: &'static [FrameSpec] = &[
        FrameSpec::new(
            FrameId::CustomerPosition1,
            ISOLATION,
            FrameScope::ReadOnly,
            FramePosition::Begin,
        ),
        FrameSpec::new(
            FrameId::CustomerPosition2,
            ISOLATION,
            FrameScope::ReadOnly,
            FramePosition::Commit,
        ),
        FrameSpec::closing(FrameId::CustomerPosition3, ISOLATION, FramePosition::Commit),
    ];

    fn run(
        &mut self,
        db: &mut DbSession,
        input: &CustomerPositionInput,
    ) -> Result<Outcome<CustomerPositionOutput>, TxnError> {
        let mut out = CustomerPositionOutput::default();

        // Frame 1
        let result = Self::FRAMES[0].call(
            db,
            vec![
                Value::from(input.cust_id),
                Value::from(input.tax_id.as_str()),
            ],
        )?;

        if let Some(cust) = result.set(0).first() {
            out.c_id = cust.int(0)?;
            out.c_f_name = cust.text(1)?;
            out.c_l_name = cust.text(2)?;
            out.c_tier = cust.int32(3)?;
        }
        for acct in result.set(1) {
            out.acct_id.push(acct.int(0)?);
            out.cash_bal.push(acct.float(1)?);
            out.asset_total.push(acct.float(2)?);
        }
        out.acct_len = count(out.acct_id.len());

        if out.acct_len < 1 || out.acct_len as usize > MAX_ACCT_LEN {
            return Ok(Outcome::new(status::CUSTOMER_POSITION_BAD_ACCT_LEN, out));
        }

        if !input.get_history {
            // Frame 3
            db.commit()?;
            return Ok(Outcome::new(status::SUCCESS, out));
        }

        let acct_id = match usize::try_from(input.acct_id_idx)
            .ok()
            .and_then(|idx| out.acct_id.get(idx))
        {
            Some(id) => *id,
            None => return Ok(Outcome::new(status::CUSTOMER_POSITION_BAD_ACCT_IDX, out)),
        };

        // Frame 2
        let result = Self::FRAMES[1].call(db, vec![Value::from(acct_id)])?;
        for row in result.rows() {
            out.history.push(PositionHistory {
                trade_id: row.int(0)?,
                symbol: row.text(1)?,
                qty: row.int32(2)?,
                trade_status: row.text(3)?,
                hist_dts: row.timestamp(4)?,
            });
        }
        out.hist_len = count(out.history.len());

        if (out.hist_len as usize) < MIN_HIST_LEN || out.hist_len as usize > MAX_HIST_LEN {
            return Ok(Outcome::new(status::CUSTOMER_POSITION_BAD_HIST_LEN, out));
        }

        db.commit()?;
        Ok(Outcome::new(status::SUCCESS, out))
    }
}
