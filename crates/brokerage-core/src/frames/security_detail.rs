//! Security Detail: company, financial, daily market and news details of
//! one security.

use super::{count, first_row, FramePosition, FrameScope, FrameSpec, Outcome, Transaction};
use crate::error::TxnError;
use crate::inputs::SecurityDetailInput;
use crate::isolation::IsolationLevel;
use crate::limits::{MAX_DAY_LEN, MAX_FIN_LEN, MAX_NEWS_LEN, MIN_DAY_LEN};
use crate::outputs::{DailyRow, FinancialRow, NewsRow, SecurityDetailOutput};
use crate::session::DbSession;
use crate::status;
use crate::storage::{FrameId, Value};

#[derive(Debug, Default)]
pub struct SecurityDetail;

impl Transaction for SecurityDetail {
    type Input = SecurityDetailInput;
    type Output = SecurityDetailOutput;

    const FRAMES: &'static [FrameSpec] = &[FrameSpec::new(
        FrameId::SecurityDetail1,
        IsolationLevel::ReadCommitted,
        FrameScope::ReadOnly,
        FramePosition::Only,
    )];

    fn run(
        &mut self,
        db: &mut DbSession,
        input: &SecurityDetailInput,
    ) -> Result<Outcome<SecurityDetailOutput>, TxnError> {
        let result = Self::FRAMES[0].call(
            db,
            vec![
                Value::from(input.symbol.as_str()),
                Value::from(input.start_day),
                Value::from(input.max_rows_to_return),
                Value::from(input.access_lob_flag),
            ],
        )?;

        let sec = first_row(&result, FrameId::SecurityDetail1)?;
        let mut out = SecurityDetailOutput {
            s_name: sec.text(0)?,
            co_name: sec.text(1)?,
            ceo_name: sec.text(2)?,
            ex_name: sec.text(3)?,
            num_out: sec.int(4)?,
            pe_ratio: sec.float(5)?,
            last_price: sec.float(6)?,
            last_open: sec.float(7)?,
            last_vol: sec.int(8)?,
            ..SecurityDetailOutput::default()
        };

        for row in result.set(1) {
            out.fin.push(FinancialRow {
                year: row.int32(0)?,
                qtr: row.int32(1)?,
                revenue: row.float(2)?,
                net_earn: row.float(3)?,
            });
        }
        for row in result.set(2) {
            out.day.push(DailyRow {
                date: row.date(0)?,
                close: row.float(1)?,
                high: row.float(2)?,
                low: row.float(3)?,
                vol: row.int(4)?,
            });
        }
        for row in result.set(3) {
            out.news.push(NewsRow {
                headline: row.text(0)?,
                summary: row.text(1)?,
                item: if input.access_lob_flag {
                    row.opt_text(2)?
                } else {
                    None
                },
            });
        }
        out.fin_len = count(out.fin.len());
        out.day_len = count(out.day.len());
        out.news_len = count(out.news.len());

        let status = if out.day.len() < MIN_DAY_LEN || out.day.len() > MAX_DAY_LEN {
            status::SECURITY_DETAIL_BAD_DAY_LEN
        } else if out.fin.len() != MAX_FIN_LEN {
            status::SECURITY_DETAIL_BAD_FIN_LEN
        } else if out.news.len() != MAX_NEWS_LEN {
            status::SECURITY_DETAIL_BAD_NEWS_LEN
        } else {
            status::SUCCESS
        };

        if status == status::SUCCESS {
            db.commit()?;
        } else {
            db.rollback()?;
        }
        Ok(Outcome::new(status, out))
    }
}
