//! Trade Update: like Trade Lookup, but each frame also rewrites a few
//! of the rows it reads (executor name, settlement cash type, or cash
//! transaction description).

use super::{count, trade_info, FramePosition, FrameScope, FrameSpec, Outcome, Transaction};
use crate::error::TxnError;
use crate::inputs::TradeUpdateInput;
use crate::isolation::IsolationLevel;
use crate::limits::MAX_TRADE_IDS;
use crate::outputs::TradeUpdateOutput;
use crate::session::DbSession;
use crate::status;
use crate::storage::{FrameId, Value};

const ISOLATION: IsolationLevel = IsolationLevel::RepeatableRead;

#[derive(Debug, Default)]
pub struct TradeUpdate;

impl Transaction for TradeUpdate {
    type Input = TradeUpdateInput;
    type Output = TradeUpdateOutput;

    const FRAMES: &'static [FrameSpec] = &[
        FrameSpec::new(FrameId::TradeUpdate1, ISOLATION, FrameScope::Mutating, FramePosition::Only),
        FrameSpec::new(FrameId::TradeUpdate2, ISOLATION, FrameScope::Mutating, FramePosition::Only),
        FrameSpec::new(FrameId::TradeUpdate3, ISOLATION, FrameScope::Mutating, FramePosition::Only),
    ];

    fn run(
        &mut self,
        db: &mut DbSession,
        input: &TradeUpdateInput,
    ) -> Result<Outcome<TradeUpdateOutput>, TxnError> {
        let result = match input.frame_to_execute {
            1 => {
                if input.trade_id.len() > MAX_TRADE_IDS {
                    return Err(TxnError::InvalidInput(format!(
                        "{} trade ids, at most {} allowed",
                        input.trade_id.len(),
                        MAX_TRADE_IDS
                    )));
                }
                let mut params = vec![
                    Value::from(input.max_trades),
                    Value::from(input.max_updates),
                ];
                params.extend(input.trade_id.iter().map(|id| Value::from(*id)));
                Self::FRAMES[0].call(db, params)?
            }
            2 => Self::FRAMES[1].call(
                db,
                vec![
                    Value::from(input.acct_id),
                    Value::from(input.start_trade_dts),
                    Value::from(input.end_trade_dts),
                    Value::from(input.max_trades),
                    Value::from(input.max_updates),
                ],
            )?,
            3 => Self::FRAMES[2].call(
                db,
                vec![
                    Value::from(input.symbol.as_str()),
                    Value::from(input.start_trade_dts),
                    Value::from(input.end_trade_dts),
                    Value::from(input.max_acct_id),
                    Value::from(input.max_trades),
                    Value::from(input.max_updates),
                ],
            )?,
            other => {
                return Err(TxnError::InvalidInput(format!(
                    "trade update frame {} does not exist",
                    other
                )))
            }
        };

        let mut out = TradeUpdateOutput {
            frame_executed: input.frame_to_execute,
            num_found: count(result.rows().len()),
            num_updated: i32::try_from(result.affected).unwrap_or(i32::MAX),
            ..TradeUpdateOutput::default()
        };
        for row in result.rows() {
            out.trades.push(trade_info(row)?);
        }

        let status = match input.frame_to_execute {
            1 if out.num_found != input.max_trades => status::TRADE_UPDATE_F1_BAD_COUNT,
            1 if out.num_updated != input.max_updates => status::TRADE_UPDATE_F1_BAD_UPDATES,
            2 if out.num_found > input.max_trades => status::TRADE_UPDATE_F2_BAD_COUNT,
            2 if out.num_found == 0 => status::TRADE_UPDATE_F2_EMPTY,
            3 if out.num_found > input.max_trades => status::TRADE_UPDATE_F3_BAD_COUNT,
            3 if out.num_found == 0 => status::TRADE_UPDATE_F3_EMPTY,
            _ => status::SUCCESS,
        };

        if status < 0 {
            db.rollback()?;
        } else {
            db.commit()?;
        }
        Ok(Outcome::new(status, out))
    }
}
