//! Data Maintenance frame.
//!
//! Every table gets a small reversible edit so repeated runs keep the
//! data set stable.

use chrono::{Datelike, Duration};

use brokerage_core::{QueryResult, StorageError};

use super::Params;
use crate::tables::Tables;

/// Params: `(acct_id, c_id, co_id, day_of_month, symbol, table_name,
/// tx_id, vol_incr)`. `affected` counts the rows changed.
pub fn data_maintenance(tables: &mut Tables, p: &Params<'_>) -> Result<QueryResult, StorageError> {
    let acct_id = p.int(0)?;
    let c_id = p.int(1)?;
    let co_id = p.int(2)?;
    let day_of_month = p.int(3)?;
    let symbol = p.text(4)?;
    let table = p.text(5)?;
    let tx_id = p.text(6)?;
    let vol_incr = p.int(7)?;

    let affected = match table {
        "ACCOUNT_PERMISSION" => tables
            .permissions
            .iter_mut()
            .find(|ap| ap.ca_id == acct_id)
            .map(|ap| {
                ap.acl = if ap.acl == "1111" { "0011" } else { "1111" }.to_string();
            })
            .map_or(0, |_| 1),
        "ADDRESS" => {
            if c_id != 0 {
                tables
                    .customers
                    .iter_mut()
                    .find(|c| c.c_id == c_id)
                    .map(|c| swap(&mut c.address_line2, "Apt. 10C", "Apt. 22"))
                    .map_or(0, |_| 1)
            } else {
                tables
                    .companies
                    .iter_mut()
                    .find(|co| co.co_id == co_id)
                    .map(|co| swap(&mut co.address_line2, "Suite 100", "Suite 250"))
                    .map_or(0, |_| 1)
            }
        }
        "COMPANY" => tables
            .companies
            .iter_mut()
            .find(|co| co.co_id == co_id)
            .map(|co| swap(&mut co.sp_rate, "AAA", "ABA"))
            .map_or(0, |_| 1),
        "CUSTOMER" => tables
            .customers
            .iter_mut()
            .find(|c| c.c_id == c_id)
            .map(|c| {
                c.email_2 = if c.email_2.contains("@mindspring.com") {
                    c.email_2.replace("@mindspring.com", "@earthlink.com")
                } else {
                    c.email_2.replace("@earthlink.com", "@mindspring.com")
                };
            })
            .map_or(0, |_| 1),
        "CUSTOMER_TAXRATE" => tables
            .customers
            .iter_mut()
            .find(|c| c.c_id == c_id)
            .and_then(|c| c.tax_rates.iter_mut().find(|id| id.starts_with("ST")))
            .map(|id| {
                let n: u32 = id[2..].parse().unwrap_or(1);
                *id = format!("ST{}", n % 5 + 1);
            })
            .map_or(0, |_| 1),
        "DAILY_MARKET" => {
            let mut n = 0;
            for dm in tables
                .daily_market
                .iter_mut()
                .filter(|dm| dm.symbol == symbol && i64::from(dm.date.day()) == day_of_month)
            {
                dm.vol += vol_incr;
                n += 1;
            }
            n
        }
        "EXCHANGE" => {
            for ex in tables.exchanges.iter_mut() {
                ex.desc = match ex.desc.strip_suffix(" LAT") {
                    Some(base) => base.to_string(),
                    None => format!("{} LAT", ex.desc),
                };
            }
            tables.exchanges.len() as u64
        }
        "FINANCIAL" => {
            let mut n = 0;
            for fin in tables.financials.iter_mut().filter(|f| f.co_id == co_id) {
                fin.qtr_start = if fin.qtr_start.day() == 1 {
                    fin.qtr_start + Duration::days(1)
                } else {
                    fin.qtr_start - Duration::days(1)
                };
                n += 1;
            }
            n
        }
        "NEWS_ITEM" => {
            let mut n = 0;
            for item in tables.news.iter_mut().filter(|i| i.co_id == co_id) {
                item.dts += Duration::days(1);
                n += 1;
            }
            n
        }
        "SECURITY" => tables
            .securities
            .iter_mut()
            .find(|s| s.symbol == symbol)
            .map(|s| s.exch_date += Duration::days(1))
            .map_or(0, |_| 1),
        "TAXRATE" => tables
            .tax_rates
            .iter_mut()
            .find(|r| r.tx_id == tx_id)
            .map(|r| {
                r.name = if r.name.contains(" Tax ") {
                    r.name.replace(" Tax ", " tax ")
                } else {
                    r.name.replace(" tax ", " Tax ")
                };
            })
            .map_or(0, |_| 1),
        "WATCH_ITEM" => {
            let all: Vec<String> = tables.securities.iter().map(|s| s.symbol.clone()).collect();
            tables
                .watch_lists
                .get_mut(&c_id)
                .filter(|list| !list.is_empty())
                .and_then(|list| {
                    let mid = list.len() / 2;
                    let replacement = all.iter().find(|s| !list.contains(*s))?;
                    list[mid] = replacement.clone();
                    Some(())
                })
                .map_or(0, |_| 1)
        }
        other => return Err(p.fail(format!("unknown table {}", other))),
    };

    Ok(QueryResult::empty().with_affected(affected))
}

fn swap(field: &mut String, a: &str, b: &str) {
    *field = if *field == a { b } else { a }.to_string();
}
