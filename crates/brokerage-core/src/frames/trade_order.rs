//! Trade Order.
//!
//! | Frame | Job |
//! |---|---|
//! | 1 | open (repeatable read); account, customer and broker |
//! | 2 | executor permission, only when the executor is not the owner |
//! | 3 | security, price, holdings-based buy/sell value, tax, fees |
//! | 4 | insert the trade (and the pending request for limit orders) |
//! | 5 | roll back an order the driver flagged with `roll_it_back` |
//! | 6 | commit |
//!
//! A failed check in frames 1–3 leaves the transaction open; the
//! dispatcher rolls it back. After frame 6 the order is ready to be sent
//! to the exchange: market orders for immediate processing, limit orders
//! as a trigger to watch.

use super::{first_row, FramePosition, FrameScope, FrameSpec, Outcome, Transaction};
use crate::error::TxnError;
use crate::inputs::TradeOrderInput;
use crate::isolation::IsolationLevel;
use crate::outputs::TradeOrderOutput;
use crate::session::DbSession;
use crate::status;
use crate::storage::{FrameId, Value};
use crate::trade_request::{TradeRequest, TradeType};

const ISOLATION: IsolationLevel = IsolationLevel::RepeatableRead;

#[derive(Debug, Default)]
pub struct TradeOrder;

impl Transaction for TradeOrder {
    type Input = TradeOrderInput;
    type Output = TradeOrderOutput;

    const FRAMES: &'static [FrameSpec] = &[
        FrameSpec::new(FrameId::TradeOrder1, ISOLATION, FrameScope::ReadOnly, FramePosition::Begin),
        FrameSpec::new(
            FrameId::TradeOrder2,
            ISOLATION,
            FrameScope::ReadOnly,
            FramePosition::Intermediate,
        ),
        FrameSpec::new(
            FrameId::TradeOrder3,
            ISOLATION,
            FrameScope::ReadOnly,
            FramePosition::Intermediate,
        ),
        FrameSpec::new(
            FrameId::TradeOrder4,
            ISOLATION,
            FrameScope::Mutating,
            FramePosition::Intermediate,
        ),
        FrameSpec::closing(FrameId::TradeOrder5, ISOLATION, FramePosition::RollbackOnly),
        FrameSpec::closing(FrameId::TradeOrder6, ISOLATION, FramePosition::Commit),
    ];

    fn run(
        &mut self,
        db: &mut DbSession,
        input: &TradeOrderInput,
    ) -> Result<Outcome<TradeOrderOutput>, TxnError> {
        let mut out = TradeOrderOutput::default();

        let trade_type = TradeType::from_id(&input.trade_type_id).ok_or_else(|| {
            TxnError::InvalidInput(format!("unknown trade type {:?}", input.trade_type_id))
        })?;
        if input.trade_qty <= 0 {
            return Err(TxnError::InvalidInput(format!(
                "trade quantity {}",
                input.trade_qty
            )));
        }

        // Frame 1
        let result = Self::FRAMES[0].call(db, vec![Value::from(input.acct_id)])?;
        if result.rows().len() != 1 {
            return Ok(Outcome::new(status::TRADE_ORDER_ACCOUNT_NOT_FOUND, out));
        }
        let acct = &result.rows()[0];
        let cust_id = acct.int(2)?;
        let tax_status = acct.int32(3)?;
        let cust_f_name = acct.text(4)?;
        let cust_l_name = acct.text(5)?;
        let cust_tier = acct.int32(6)?;
        let tax_id = acct.text(7)?;

        // Frame 2
        let exec_is_owner = input.exec_f_name == cust_f_name
            && input.exec_l_name == cust_l_name
            && input.exec_tax_id == tax_id;
        if !exec_is_owner {
            let result = Self::FRAMES[1].call(
                db,
                vec![
                    Value::from(input.acct_id),
                    Value::from(input.exec_f_name.as_str()),
                    Value::from(input.exec_l_name.as_str()),
                    Value::from(input.exec_tax_id.as_str()),
                ],
            )?;
            if result.rows().is_empty() {
                return Ok(Outcome::new(status::TRADE_ORDER_NOT_AUTHORIZED, out));
            }
        }

        // Frame 3
        let result = Self::FRAMES[2].call(
            db,
            vec![
                Value::from(input.acct_id),
                Value::from(cust_id),
                Value::from(cust_tier),
                Value::from(tax_status),
                Value::from(input.co_name.as_str()),
                Value::from(input.issue.as_str()),
                Value::from(input.symbol.as_str()),
                Value::from(trade_type.id()),
                Value::from(input.trade_qty),
                Value::from(input.requested_price),
                Value::from(input.type_is_margin),
                Value::from(input.is_lifo),
                Value::from(input.st_pending_id.as_str()),
                Value::from(input.st_submitted_id.as_str()),
            ],
        )?;
        let est = first_row(&result, FrameId::TradeOrder3)?;
        let symbol = est.text(0)?;
        out.type_is_market = est.boolean(4)?;
        out.requested_price = est.float(6)?;
        out.buy_value = est.float(7)?;
        out.sell_value = est.float(8)?;
        out.tax_amount = est.float(9)?;
        let comm_rate = est.float(10)?;
        out.charge_amount = est.float(11)?;
        out.status_id = est.text(12)?;

        let taxable = tax_status == 1 || tax_status == 2;
        if out.sell_value > out.buy_value && taxable && out.tax_amount <= 0.0 {
            return Ok(Outcome::new(status::TRADE_ORDER_UNTAXED_GAIN, out));
        }
        if comm_rate <= 0.0 {
            return Ok(Outcome::new(status::TRADE_ORDER_BAD_COMM_RATE, out));
        }
        if out.charge_amount <= 0.0 {
            return Ok(Outcome::new(status::TRADE_ORDER_BAD_CHARGE, out));
        }

        out.comm_amount =
            round_cents(comm_rate / 100.0 * f64::from(input.trade_qty) * out.requested_price);

        // Frame 4
        let exec_name = format!("{} {}", input.exec_f_name, input.exec_l_name);
        let is_cash = !input.type_is_margin;
        let result = Self::FRAMES[3].call(
            db,
            vec![
                Value::from(input.acct_id),
                Value::from(symbol.as_str()),
                Value::from(input.trade_qty),
                Value::from(trade_type.id()),
                Value::from(out.status_id.as_str()),
                Value::from(out.requested_price),
                Value::from(out.charge_amount),
                Value::from(out.comm_amount),
                Value::from(exec_name),
                Value::from(is_cash),
                Value::from(input.is_lifo),
                Value::from(out.type_is_market),
            ],
        )?;
        out.trade_id = first_row(&result, FrameId::TradeOrder4)?.int(0)?;

        if input.roll_it_back {
            // Frame 5
            db.rollback()?;
            out.rolled_back = true;
            return Ok(Outcome::new(status::SUCCESS, out));
        }

        // Frame 6
        db.commit()?;
        out.trade_request = Some(TradeRequest {
            price_quote: out.requested_price,
            trade_id: out.trade_id,
            trade_qty: input.trade_qty,
            action: trade_type.submit_action(),
            symbol,
            trade_type_id: trade_type.id().to_string(),
        });
        Ok(Outcome::new(status::SUCCESS, out))
    }
}

fn round_cents(v: f64) -> f64 {
    (v * 100.0).round() / 100.0
}
