//! Market Feed.
//!
//! Applies a batch of last-trade quotes and collects every pending
//! limit / stop order the quotes trigger. The triggered orders leave as
//! trade requests only after the frame's transaction committed; the
//! dispatcher hands them to the market bridge.

use std::collections::HashSet;

use super::{count, FramePosition, FrameScope, FrameSpec, Outcome, Transaction};
use crate::error::TxnError;
use crate::inputs::MarketFeedInput;
use crate::isolation::IsolationLevel;
use crate::limits::MAX_FEED_LEN;
use crate::outputs::MarketFeedOutput;
use crate::session::DbSession;
use crate::status;
use crate::storage::{FrameId, Value};
use crate::trade_request::{MeeAction, TradeRequest};

#[derive(Debug, Default)]
pub struct MarketFeed;

impl Transaction for MarketFeed {
    type Input = MarketFeedInput;
    type Output = MarketFeedOutput;

    const FRAMES: &'static [FrameSpec] = &[FrameSpec::new(
        FrameId::MarketFeed1,
        IsolationLevel::RepeatableRead,
        FrameScope::Mutating,
        FramePosition::Only,
    )];

    fn run(
        &mut self,
        db: &mut DbSession,
        input: &MarketFeedInput,
    ) -> Result<Outcome<MarketFeedOutput>, TxnError> {
        if input.entries.len() > MAX_FEED_LEN {
            return Err(TxnError::InvalidInput(format!(
                "{} ticker entries, at most {} allowed",
                input.entries.len(),
                MAX_FEED_LEN
            )));
        }

        let mut params = Vec::with_capacity(4 + 3 * input.entries.len());
        params.push(Value::from(input.status_submitted.as_str()));
        params.push(Value::from(input.type_limit_buy.as_str()));
        params.push(Value::from(input.type_limit_sell.as_str()));
        params.push(Value::from(input.type_stop_loss.as_str()));
        for entry in &input.entries {
            params.push(Value::from(entry.symbol.as_str()));
            params.push(Value::from(entry.price_quote));
            params.push(Value::from(entry.trade_qty));
        }

        let result = Self::FRAMES[0].call(db, params)?;

        let mut out = MarketFeedOutput {
            num_updated: i32::try_from(result.affected).unwrap_or(i32::MAX),
            ..MarketFeedOutput::default()
        };
        let mut triggered = Vec::with_capacity(result.rows().len());
        for row in result.rows() {
            triggered.push(TradeRequest {
                symbol: row.text(0)?,
                trade_id: row.int(1)?,
                price_quote: row.float(2)?,
                trade_qty: row.int32(3)?,
                trade_type_id: row.text(4)?,
                action: MeeAction::ProcessOrder,
            });
        }
        out.send_len = count(triggered.len());

        let unique_symbols: HashSet<&str> =
            input.entries.iter().map(|e| e.symbol.as_str()).collect();
        if (out.num_updated as usize) < unique_symbols.len() {
            db.rollback()?;
            return Ok(Outcome::new(status::MARKET_FEED_NOT_ALL_UPDATED, out));
        }

        db.commit()?;
        out.triggered = triggered;
        Ok(Outcome::new(status::SUCCESS, out))
    }
}
