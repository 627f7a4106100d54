//! Trade Lookup and Trade Update frames.
//!
//! Both read the same trade selections; the update frames also toggle
//! one descriptive column on the first `max_updates` trades they read.

use chrono::NaiveDateTime;

use brokerage_core::{QueryResult, Row, StorageError, Value};

use super::{limit, trade_row, Params};
use crate::tables::{cash_type, Tables, Trade};

/// Trade ids of the selection, in selection order.
type Selection = Vec<i64>;

fn by_id(tables: &Tables, max_trades: usize, ids: &[i64]) -> Selection {
    ids.iter()
        .filter(|id| tables.trades.contains_key(*id))
        .take(max_trades)
        .copied()
        .collect()
}

fn in_window(t: &Trade, start: NaiveDateTime, end: NaiveDateTime) -> bool {
    t.dts >= start && t.dts <= end
}

fn sorted(mut trades: Vec<&Trade>, max_trades: usize) -> Selection {
    trades.sort_by_key(|t| (t.dts, t.t_id));
    trades.into_iter().take(max_trades).map(|t| t.t_id).collect()
}

fn by_account(
    tables: &Tables,
    acct_id: i64,
    start: NaiveDateTime,
    end: NaiveDateTime,
    max_trades: usize,
) -> Selection {
    let trades = tables
        .trades
        .values()
        .filter(|t| t.ca_id == acct_id && in_window(t, start, end))
        .collect();
    sorted(trades, max_trades)
}

fn by_symbol(
    tables: &Tables,
    symbol: &str,
    start: NaiveDateTime,
    end: NaiveDateTime,
    max_acct_id: i64,
    max_trades: usize,
) -> Selection {
    let trades = tables
        .trades
        .values()
        .filter(|t| t.symbol == symbol && t.ca_id <= max_acct_id && in_window(t, start, end))
        .collect();
    sorted(trades, max_trades)
}

#[derive(Copy, Clone)]
enum Detail {
    None,
    CashType,
    CashName,
}

/// Trade rows of `ids`, then their status history.
fn answer(tables: &Tables, ids: &[i64], detail: Detail) -> QueryResult {
    let trades: Vec<Row> = ids
        .iter()
        .filter_map(|id| tables.trades.get(id))
        .map(|t| {
            let detail = match detail {
                Detail::None => None,
                Detail::CashType => tables.settlements.get(&t.t_id).map(|s| s.cash_type.as_str()),
                Detail::CashName => tables
                    .cash_transactions
                    .get(&t.t_id)
                    .map(|c| c.name.as_str()),
            };
            trade_row(t, detail)
        })
        .collect();

    let history: Vec<Row> = tables
        .trade_history
        .iter()
        .filter(|h| ids.contains(&h.t_id))
        .map(|h| {
            Row::new(vec![
                Value::from(h.t_id),
                Value::from(h.dts),
                Value::from(h.st_id.as_str()),
            ])
        })
        .collect();

    QueryResult {
        result_sets: vec![trades, history],
        affected: 0,
    }
}

/// `(max_trades, trade ids...)`
pub fn trades_by_id(tables: &Tables, p: &Params<'_>) -> Result<QueryResult, StorageError> {
    let max_trades = limit(p.int(0)?);
    let ids = by_id(tables, max_trades, &p.ints_from(1)?);
    Ok(answer(tables, &ids, Detail::CashType))
}

/// `(acct_id, start, end, max_trades)`
pub fn account_trades(tables: &Tables, p: &Params<'_>) -> Result<QueryResult, StorageError> {
    let ids = by_account(
        tables,
        p.int(0)?,
        p.timestamp(1)?,
        p.timestamp(2)?,
        limit(p.int(3)?),
    );
    Ok(answer(tables, &ids, Detail::CashType))
}

/// `(symbol, start, end, max_acct_id, max_trades)`
pub fn symbol_trades(tables: &Tables, p: &Params<'_>) -> Result<QueryResult, StorageError> {
    let ids = by_symbol(
        tables,
        p.text(0)?,
        p.timestamp(1)?,
        p.timestamp(2)?,
        p.int(3)?,
        limit(p.int(4)?),
    );
    Ok(answer(tables, &ids, Detail::CashName))
}

/// `(acct_id, start)`: the account's first trade at or after `start`.
pub fn first_trade(tables: &Tables, p: &Params<'_>) -> Result<QueryResult, StorageError> {
    let acct_id = p.int(0)?;
    let start = p.timestamp(1)?;
    let trades = tables
        .trades
        .values()
        .filter(|t| t.ca_id == acct_id && t.dts >= start)
        .collect();
    let ids = sorted(trades, 1);
    Ok(answer(tables, &ids, Detail::None))
}

/// Swap between two spellings of the same text.
fn toggle(text: &str, a: &str, b: &str) -> String {
    if text.contains(a) {
        text.replacen(a, b, 1)
    } else {
        text.replacen(b, a, 1)
    }
}

/// `(max_trades, max_updates, trade ids...)`: toggles the executor name
/// between `First Last` and `First X Last`.
pub fn update_exec_names(tables: &mut Tables, p: &Params<'_>) -> Result<QueryResult, StorageError> {
    let max_trades = limit(p.int(0)?);
    let max_updates = limit(p.int(1)?);
    let ids = by_id(tables, max_trades, &p.ints_from(2)?);

    let mut updated = 0;
    for id in ids.iter().take(max_updates) {
        if let Some(t) = tables.trades.get_mut(id) {
            t.exec_name = toggle(&t.exec_name, " X ", " ");
            updated += 1;
        }
    }
    Ok(answer(tables, &ids, Detail::CashType).with_affected(updated))
}

/// `(acct_id, start, end, max_trades, max_updates)`: toggles the
/// settlement cash type.
pub fn update_cash_types(tables: &mut Tables, p: &Params<'_>) -> Result<QueryResult, StorageError> {
    let max_updates = limit(p.int(4)?);
    let ids = by_account(
        tables,
        p.int(0)?,
        p.timestamp(1)?,
        p.timestamp(2)?,
        limit(p.int(3)?),
    );

    let mut updated = 0;
    for id in ids.iter().take(max_updates) {
        if let Some(s) = tables.settlements.get_mut(id) {
            let cash = s.cash_type == cash_type(true);
            s.cash_type = cash_type(!cash).to_string();
            updated += 1;
        }
    }
    Ok(answer(tables, &ids, Detail::CashType).with_affected(updated))
}

/// `(symbol, start, end, max_acct_id, max_trades, max_updates)`: toggles
/// the capitalisation of the cash transaction description.
pub fn update_cash_names(tables: &mut Tables, p: &Params<'_>) -> Result<QueryResult, StorageError> {
    let max_updates = limit(p.int(5)?);
    let ids = by_symbol(
        tables,
        p.text(0)?,
        p.timestamp(1)?,
        p.timestamp(2)?,
        p.int(3)?,
        limit(p.int(4)?),
    );

    let mut updated = 0;
    for id in ids.iter().take(max_updates) {
        if let Some(c) = tables.cash_transactions.get_mut(id) {
            c.name = toggle(&c.name, " shares of ", " Shares of ");
            updated += 1;
        }
    }
    Ok(answer(tables, &ids, Detail::CashName).with_affected(updated))
}
