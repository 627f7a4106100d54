//! Trade Result: completes a trade the exchange executed.
//!
//! Frame 1 opens the transaction as serializable: frame 2 rewrites
//! holdings based on the quantities frame 1 read and must not race a
//! concurrent result for the same account and security. Frame 3 (tax)
//! only runs for taxable accounts that realised a gain. Frame 6 settles
//! and commits.

use chrono::Duration;

use super::{first_row, FramePosition, FrameScope, FrameSpec, Outcome, Transaction};
use crate::error::TxnError;
use crate::inputs::TradeResultInput;
use crate::isolation::IsolationLevel;
use crate::outputs::TradeResultOutput;
use crate::session::DbSession;
use crate::status;
use crate::storage::{FrameId, Value};
use crate::trade_request::status_id;

const ISOLATION: IsolationLevel = IsolationLevel::Serializable;

/// Days between trade and settlement.
const SETTLEMENT_DAYS: i64 = 2;

#[derive(Debug, Default)]
pub struct TradeResult;

impl Transaction for TradeResult {
    type Input = TradeResultInput;
    type Output = TradeResultOutput;

    const FRAMES: &'static [FrameSpec] = &[
        FrameSpec::new(FrameId::TradeResult1, ISOLATION, FrameScope::ReadOnly, FramePosition::Begin),
        FrameSpec::new(
            FrameId::TradeResult2,
            ISOLATION,
            FrameScope::Mutating,
            FramePosition::Intermediate,
        ),
        FrameSpec::new(
            FrameId::TradeResult3,
            ISOLATION,
            FrameScope::Mutating,
            FramePosition::Intermediate,
        ),
        FrameSpec::new(
            FrameId::TradeResult4,
            ISOLATION,
            FrameScope::ReadOnly,
            FramePosition::Intermediate,
        ),
        FrameSpec::new(
            FrameId::TradeResult5,
            ISOLATION,
            FrameScope::Mutating,
            FramePosition::Intermediate,
        ),
        FrameSpec::new(FrameId::TradeResult6, ISOLATION, FrameScope::Mutating, FramePosition::Commit),
    ];

    fn run(
        &mut self,
        db: &mut DbSession,
        input: &TradeResultInput,
    ) -> Result<Outcome<TradeResultOutput>, TxnError> {
        let mut out = TradeResultOutput {
            trade_id: input.trade_id,
            ..TradeResultOutput::default()
        };

        // Frame 1
        let result = Self::FRAMES[0].call(db, vec![Value::from(input.trade_id)])?;
        if result.rows().len() != 1 {
            return Ok(Outcome::new(status::TRADE_RESULT_TRADE_NOT_FOUND, out));
        }
        let trade = &result.rows()[0];
        out.acct_id = trade.int(0)?;
        let type_id = trade.text(1)?;
        let symbol = trade.text(2)?;
        let trade_qty = trade.int32(3)?;
        let charge = trade.float(4)?;
        let is_lifo = trade.boolean(5)?;
        let trade_is_cash = trade.boolean(6)?;
        let type_name = trade.text(7)?;
        let type_is_sell = trade.boolean(8)?;
        let hs_qty = trade.int32(10)?;

        // Frame 2
        let result = Self::FRAMES[1].call(
            db,
            vec![
                Value::from(out.acct_id),
                Value::from(hs_qty),
                Value::from(is_lifo),
                Value::from(symbol.as_str()),
                Value::from(input.trade_id),
                Value::from(input.trade_price),
                Value::from(trade_qty),
                Value::from(type_is_sell),
            ],
        )?;
        let holding = first_row(&result, FrameId::TradeResult2)?;
        let broker_id = holding.int(0)?;
        out.buy_value = holding.float(1)?;
        out.sell_value = holding.float(2)?;
        let cust_id = holding.int(3)?;
        let tax_status = holding.int32(4)?;
        let trade_dts = holding.timestamp(5)?;

        // Frame 3
        if (tax_status == 1 || tax_status == 2) && out.sell_value > out.buy_value {
            let result = Self::FRAMES[2].call(
                db,
                vec![
                    Value::from(cust_id),
                    Value::from(input.trade_id),
                    Value::from(out.buy_value),
                    Value::from(out.sell_value),
                ],
            )?;
            out.tax_amount = first_row(&result, FrameId::TradeResult3)?.float(0)?;
            if out.tax_amount <= 0.0 {
                return Ok(Outcome::new(status::TRADE_RESULT_BAD_TAX, out));
            }
        }

        // Frame 4
        let result = Self::FRAMES[3].call(
            db,
            vec![
                Value::from(out.acct_id),
                Value::from(symbol.as_str()),
                Value::from(trade_qty),
                Value::from(type_id.as_str()),
            ],
        )?;
        let comm = first_row(&result, FrameId::TradeResult4)?;
        let comm_rate = comm.float(0)?;
        let s_name = comm.text(1)?;
        if comm_rate <= 0.0 {
            return Ok(Outcome::new(status::TRADE_RESULT_BAD_COMM_RATE, out));
        }

        let amount = f64::from(trade_qty) * input.trade_price;
        out.comm_amount = round_cents(comm_rate / 100.0 * amount);

        // Frame 5
        Self::FRAMES[4].call(
            db,
            vec![
                Value::from(broker_id),
                Value::from(out.comm_amount),
                Value::from(status_id::COMPLETED),
                Value::from(trade_dts),
                Value::from(input.trade_id),
                Value::from(input.trade_price),
            ],
        )?;

        out.se_amount = if type_is_sell {
            amount - charge - out.comm_amount
        } else {
            -(amount + charge + out.comm_amount)
        };
        if tax_status == 1 {
            out.se_amount -= out.tax_amount;
        }
        out.se_amount = round_cents(out.se_amount);
        let due_date = trade_dts.date() + Duration::days(SETTLEMENT_DAYS);

        // Frame 6
        let result = Self::FRAMES[5].call(
            db,
            vec![
                Value::from(out.acct_id),
                Value::from(due_date),
                Value::from(s_name),
                Value::from(out.se_amount),
                Value::from(trade_dts),
                Value::from(input.trade_id),
                Value::from(trade_is_cash),
                Value::from(trade_qty),
                Value::from(type_name),
            ],
        )?;
        out.acct_bal = first_row(&result, FrameId::TradeResult6)?.float(0)?;

        db.commit()?;
        Ok(Outcome::new(status::SUCCESS, out))
    }
}

fn round_cents(v: f64) -> f64 {
    (v * 100.0).round() / 100.0
}
