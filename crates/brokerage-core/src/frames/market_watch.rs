//! Market Watch: percentage change in market capitalisation since a
//! start day, over a watch list, an account's holdings or an industry.

use super::{count, FramePosition, FrameScope, FrameSpec, Outcome, Transaction};
use crate::error::TxnError;
use crate::inputs::MarketWatchInput;
use crate::isolation::IsolationLevel;
use crate::outputs::MarketWatchOutput;
use crate::session::DbSession;
use crate::status;
use crate::storage::{FrameId, Value};

#[derive(Debug, Default)]
pub struct MarketWatch;

impl Transaction for MarketWatch {
    type Input = MarketWatchInput;
    type Output = MarketWatchOutput;

    const FRAMES: &'static [FrameSpec] = &[FrameSpec::new(
        FrameId::MarketWatch1,
        IsolationLevel::ReadCommitted,
        FrameScope::ReadOnly,
        FramePosition::Only,
    )];

    fn run(
        &mut self,
        db: &mut DbSession,
        input: &MarketWatchInput,
    ) -> Result<Outcome<MarketWatchOutput>, TxnError> {
        let has_selector =
            input.c_id != 0 || input.acct_id != 0 || !input.industry_name.is_empty();
        if !has_selector {
            return Ok(Outcome::new(
                status::MARKET_WATCH_NO_SELECTOR,
                MarketWatchOutput::default(),
            ));
        }

        let result = Self::FRAMES[0].call(
            db,
            vec![
                Value::from(input.acct_id),
                Value::from(input.c_id),
                Value::from(input.ending_co_id),
                Value::from(input.starting_co_id),
                Value::from(input.industry_name.as_str()),
                Value::from(input.start_day),
            ],
        )?;

        let mut old_mkt_cap = 0.0;
        let mut new_mkt_cap = 0.0;
        for row in result.rows() {
            let new_price = row.float(1)?;
            let old_price = row.float(2)?;
            let num_out = row.int(3)? as f64;
            new_mkt_cap += new_price * num_out;
            old_mkt_cap += old_price * num_out;
        }

        let pct_change = if old_mkt_cap != 0.0 {
            100.0 * (new_mkt_cap / old_mkt_cap - 1.0)
        } else {
            0.0
        };

        db.commit()?;
        Ok(Outcome::new(
            status::SUCCESS,
            MarketWatchOutput {
                pct_change,
                stock_count: count(result.rows().len()),
            },
        ))
    }
}
