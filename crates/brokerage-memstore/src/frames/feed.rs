//! Market Feed and Trade Cleanup frames.

use chrono::NaiveDateTime;

use brokerage_core::{QueryResult, Row, StorageError, TradeType, Value};

use super::Params;
use crate::tables::Tables;

/// Apply ticker entries to the last-trade table and release every
/// pending request the new prices trigger.
///
/// Params: `(st_submitted, type_limit_buy, type_limit_sell,
/// type_stop_loss, (symbol, price, qty)...)`. Rows: `(symbol, t_id,
/// bid_price, qty, tt_id)` per triggered request. `affected` counts the
/// entries that found their symbol.
pub fn market_feed(
    tables: &mut Tables,
    p: &Params<'_>,
    now: NaiveDateTime,
) -> Result<QueryResult, StorageError> {
    let st_submitted = p.text(0)?;
    let watched = [p.text(1)?, p.text(2)?, p.text(3)?];

    let mut updated = 0;
    let mut rows = Vec::new();
    let mut idx = 4;
    while idx < p.len() {
        let symbol = p.text(idx)?;
        let price = p.float(idx + 1)?;
        let qty = p.int(idx + 2)?;
        idx += 3;

        let Some(last) = tables.last_trade.get_mut(symbol) else {
            continue;
        };
        last.price = price;
        last.vol += qty;
        last.dts = now;
        updated += 1;

        let (fired, waiting): (Vec<_>, Vec<_>) =
            std::mem::take(&mut tables.trade_requests)
                .into_iter()
                .partition(|req| {
                    req.symbol == symbol
                        && watched.contains(&req.tt_id.as_str())
                        && TradeType::from_id(&req.tt_id)
                            .is_some_and(|tt| tt.is_triggered(req.bid_price, price))
                });
        tables.trade_requests = waiting;

        for req in fired {
            if let Some(trade) = tables.trades.get_mut(&req.t_id) {
                trade.st_id = st_submitted.to_string();
                trade.dts = now;
            }
            tables.add_history(req.t_id, now, st_submitted);
            rows.push(Row::new(vec![
                Value::from(req.symbol.as_str()),
                Value::from(req.t_id),
                Value::from(req.bid_price),
                Value::from(req.qty),
                Value::from(req.tt_id.as_str()),
            ]));
        }
    }

    Ok(QueryResult::single(rows).with_affected(updated))
}

/// Cancel every trade from `start_trade_id` on that is still pending or
/// submitted, dropping its pending request.
///
/// Params: `(st_canceled, st_pending, st_submitted, start_trade_id)`.
pub fn trade_cleanup(
    tables: &mut Tables,
    p: &Params<'_>,
    now: NaiveDateTime,
) -> Result<QueryResult, StorageError> {
    let st_canceled = p.text(0)?;
    let st_pending = p.text(1)?;
    let st_submitted = p.text(2)?;
    let start_trade_id = p.int(3)?;

    let requested: Vec<i64> = tables
        .trade_requests
        .iter()
        .map(|r| r.t_id)
        .filter(|t_id| *t_id >= start_trade_id)
        .collect();
    tables
        .trade_requests
        .retain(|r| r.t_id < start_trade_id);

    let mut canceled = 0;
    for t_id in requested {
        tables.add_history(t_id, now, st_submitted);
        tables.add_history(t_id, now, st_canceled);
        if let Some(trade) = tables.trades.get_mut(&t_id) {
            trade.st_id = st_canceled.to_string();
            trade.dts = now;
        }
        canceled += 1;
    }

    let stale: Vec<i64> = tables
        .trades
        .range(start_trade_id..)
        .filter(|(_, t)| t.st_id == st_submitted || t.st_id == st_pending)
        .map(|(t_id, _)| *t_id)
        .collect();
    for t_id in stale {
        if let Some(trade) = tables.trades.get_mut(&t_id) {
            trade.st_id = st_canceled.to_string();
            trade.dts = now;
        }
        tables.add_history(t_id, now, st_canceled);
        canceled += 1;
    }

    Ok(QueryResult::empty().with_affected(canceled))
}
