//! Trade Lookup: read-only retrieval of historical trades.
//!
//! One of four independent frames runs per call, chosen by
//! `frame_to_execute`; each is a complete transaction of its own.

use super::{count, trade_info, FramePosition, FrameScope, FrameSpec, Outcome, Transaction};
use crate::error::TxnError;
use crate::inputs::TradeLookupInput;
use crate::isolation::IsolationLevel;
use crate::limits::MAX_TRADE_IDS;
use crate::outputs::{TradeHistoryRow, TradeLookupOutput};
use crate::session::DbSession;
use crate::status;
use crate::storage::{FrameId, QueryResult, Value};

const ISOLATION: IsolationLevel = IsolationLevel::ReadCommitted;

#[derive(Debug, Default)]
pub struct TradeLookup;

impl Transaction for TradeLookup {
    type Input = TradeLookupInput;
    type Output = TradeLookupOutput;

    const FRAMES: &'static [FrameSpec] = &[
        FrameSpec::new(FrameId::TradeLookup1, ISOLATION, FrameScope::ReadOnly, FramePosition::Only),
        FrameSpec::new(FrameId::TradeLookup2, ISOLATION, FrameScope::ReadOnly, FramePosition::Only),
        FrameSpec::new(FrameId::TradeLookup3, ISOLATION, FrameScope::ReadOnly, FramePosition::Only),
        FrameSpec::new(FrameId::TradeLookup4, ISOLATION, FrameScope::ReadOnly, FramePosition::Only),
    ];

    fn run(
        &mut self,
        db: &mut DbSession,
        input: &TradeLookupInput,
    ) -> Result<Outcome<TradeLookupOutput>, TxnError> {
        let max_trades = input.max_trades;

        let (result, status) = match input.frame_to_execute {
            1 => {
                if input.trade_id.len() > MAX_TRADE_IDS {
                    return Err(TxnError::InvalidInput(format!(
                        "{} trade ids, at most {} allowed",
                        input.trade_id.len(),
                        MAX_TRADE_IDS
                    )));
                }
                let mut params = vec![Value::from(max_trades)];
                params.extend(input.trade_id.iter().map(|id| Value::from(*id)));
                let result = Self::FRAMES[0].call(db, params)?;
                let found = count(result.rows().len());
                let status = if found != max_trades {
                    status::TRADE_LOOKUP_F1_BAD_COUNT
                } else {
                    status::SUCCESS
                };
                (result, status)
            }
            2 => {
                let result = Self::FRAMES[1].call(
                    db,
                    vec![
                        Value::from(input.acct_id),
                        Value::from(input.start_trade_dts),
                        Value::from(input.end_trade_dts),
                        Value::from(max_trades),
                    ],
                )?;
                let status = bounded(
                    &result,
                    max_trades,
                    status::TRADE_LOOKUP_F2_BAD_COUNT,
                    status::TRADE_LOOKUP_F2_EMPTY,
                );
                (result, status)
            }
            3 => {
                let result = Self::FRAMES[2].call(
                    db,
                    vec![
                        Value::from(input.symbol.as_str()),
                        Value::from(input.start_trade_dts),
                        Value::from(input.end_trade_dts),
                        Value::from(input.max_acct_id),
                        Value::from(max_trades),
                    ],
                )?;
                let status = bounded(
                    &result,
                    max_trades,
                    status::TRADE_LOOKUP_F3_BAD_COUNT,
                    status::TRADE_LOOKUP_F3_EMPTY,
                );
                (result, status)
            }
            4 => {
                let result = Self::FRAMES[3].call(
                    db,
                    vec![
                        Value::from(input.acct_id),
                        Value::from(input.start_trade_dts),
                    ],
                )?;
                let status = bounded(
                    &result,
                    1,
                    status::TRADE_LOOKUP_F4_BAD_COUNT,
                    status::TRADE_LOOKUP_F4_EMPTY,
                );
                (result, status)
            }
            other => {
                return Err(TxnError::InvalidInput(format!(
                    "trade lookup frame {} does not exist",
                    other
                )))
            }
        };

        let mut out = TradeLookupOutput {
            frame_executed: input.frame_to_execute,
            num_found: count(result.rows().len()),
            ..TradeLookupOutput::default()
        };
        for row in result.rows() {
            out.trades.push(trade_info(row)?);
        }
        for row in result.set(1) {
            out.history.push(TradeHistoryRow {
                trade_id: row.int(0)?,
                dts: row.timestamp(1)?,
                status_id: row.text(2)?,
            });
        }

        if status < 0 {
            db.rollback()?;
        } else {
            db.commit()?;
        }
        Ok(Outcome::new(status, out))
    }
}

/// `bad` above the bound, `empty` for nothing found, success otherwise.
fn bounded(result: &QueryResult, max: i32, bad: i32, empty: i32) -> i32 {
    let found = count(result.rows().len());
    if found > max {
        bad
    } else if found == 0 {
        empty
    } else {
        status::SUCCESS
    }
}
