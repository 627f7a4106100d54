//! Read-only frames: broker volume, customer position, market watch,
//! security detail and trade status.

use std::collections::BTreeMap;

use brokerage_core::limits::{
    MAX_ACCT_LEN, MAX_FIN_LEN, MAX_HIST_LEN, MAX_NEWS_LEN, MAX_TRADE_STATUS_LEN,
};
use brokerage_core::{status_id, QueryResult, Row, StorageError, TradeType, Value};

use super::{limit, Params};
use crate::tables::Tables;

/// Trades whose history customer position reports.
const POSITION_TRADES: usize = 10;

/// `(sector, broker names...)` -> `(b_name, volume)` by volume, largest
/// first.
pub fn broker_volume(tables: &Tables, p: &Params<'_>) -> Result<QueryResult, StorageError> {
    let sector = p.text(0)?;
    let names = p.texts_from(1)?;

    let mut volume: BTreeMap<&str, f64> = BTreeMap::new();
    for req in &tables.trade_requests {
        if tables.sector_of(&req.symbol) != Some(sector) {
            continue;
        }
        let Some(broker) = tables.broker(req.b_id) else {
            continue;
        };
        if !names.contains(&broker.name.as_str()) {
            continue;
        }
        *volume.entry(broker.name.as_str()).or_default() += f64::from(req.qty) * req.bid_price;
    }

    let mut rows: Vec<(&str, f64)> = volume.into_iter().filter(|(_, v)| *v > 0.0).collect();
    rows.sort_by(|a, b| b.1.total_cmp(&a.1));
    Ok(QueryResult::single(
        rows.into_iter()
            .map(|(name, v)| Row::new(vec![Value::from(name), Value::from(v)]))
            .collect(),
    ))
}

/// `(cust_id, tax_id)`: the customer, then up to ten of its accounts with
/// their cash balance and holdings value. A zero `cust_id` looks the
/// customer up by tax id.
pub fn customer_accounts(tables: &Tables, p: &Params<'_>) -> Result<QueryResult, StorageError> {
    let cust_id = p.int(0)?;
    let cust = if cust_id == 0 {
        tables.customer_by_tax_id(p.text(1)?)
    } else {
        tables.customer(cust_id)
    };
    let Some(cust) = cust else {
        return Ok(QueryResult {
            result_sets: vec![Vec::new(), Vec::new()],
            affected: 0,
        });
    };

    let customer = vec![Row::new(vec![
        Value::from(cust.c_id),
        Value::from(cust.f_name.as_str()),
        Value::from(cust.l_name.as_str()),
        Value::from(cust.tier),
    ])];

    let accounts: Vec<Row> = tables
        .accounts
        .iter()
        .filter(|a| a.c_id == cust.c_id)
        .take(MAX_ACCT_LEN)
        .map(|a| {
            let assets: f64 = tables
                .holding_summary
                .iter()
                .filter(|((ca_id, _), _)| *ca_id == a.ca_id)
                .map(|((_, symbol), qty)| {
                    let price = tables.last_trade.get(symbol).map_or(0.0, |lt| lt.price);
                    f64::from(*qty) * price
                })
                .sum();
            Row::new(vec![
                Value::from(a.ca_id),
                Value::from(a.bal),
                Value::from(assets),
            ])
        })
        .collect();

    Ok(QueryResult {
        result_sets: vec![customer, accounts],
        affected: 0,
    })
}

/// `(acct_id)`: status history of the account's latest trades, newest
/// first.
pub fn customer_history(tables: &Tables, p: &Params<'_>) -> Result<QueryResult, StorageError> {
    let acct_id = p.int(0)?;

    let mut trades: Vec<_> = tables.trades.values().filter(|t| t.ca_id == acct_id).collect();
    trades.sort_by(|a, b| b.dts.cmp(&a.dts));
    trades.truncate(POSITION_TRADES);

    let mut rows: Vec<_> = tables
        .trade_history
        .iter()
        .filter_map(|h| {
            trades
                .iter()
                .find(|t| t.t_id == h.t_id)
                .map(|t| (h, *t))
        })
        .collect();
    rows.sort_by(|a, b| b.0.dts.cmp(&a.0.dts));
    rows.truncate(MAX_HIST_LEN);

    Ok(QueryResult::single(
        rows.into_iter()
            .map(|(h, t)| {
                Row::new(vec![
                    Value::from(t.t_id),
                    Value::from(t.symbol.as_str()),
                    Value::from(t.qty),
                    Value::from(status_id::name(&h.st_id)),
                    Value::from(h.dts),
                ])
            })
            .collect(),
    ))
}

/// `(acct_id, c_id, ending_co_id, starting_co_id, industry, start_day)`
/// -> `(symbol, price now, close on start_day, shares outstanding)`.
///
/// The watch list of `c_id` wins, then the industry's companies in the
/// id range, then the account's holdings.
pub fn market_watch(tables: &Tables, p: &Params<'_>) -> Result<QueryResult, StorageError> {
    let acct_id = p.int(0)?;
    let c_id = p.int(1)?;
    let ending_co_id = p.int(2)?;
    let starting_co_id = p.int(3)?;
    let industry = p.text(4)?;
    let start_day = p.date(5)?;

    let symbols: Vec<String> = if c_id != 0 {
        tables.watch_lists.get(&c_id).cloned().unwrap_or_default()
    } else if !industry.is_empty() {
        let in_ids: Vec<&str> = tables
            .industries
            .iter()
            .filter(|i| i.name == industry)
            .map(|i| i.in_id.as_str())
            .collect();
        tables
            .securities
            .iter()
            .filter(|s| (starting_co_id..=ending_co_id).contains(&s.co_id))
            .filter(|s| {
                tables
                    .company(s.co_id)
                    .is_some_and(|co| in_ids.contains(&co.in_id.as_str()))
            })
            .map(|s| s.symbol.clone())
            .collect()
    } else if acct_id != 0 {
        tables
            .holding_summary
            .keys()
            .filter(|(ca_id, _)| *ca_id == acct_id)
            .map(|(_, symbol)| symbol.clone())
            .collect()
    } else {
        Vec::new()
    };

    let mut rows = Vec::with_capacity(symbols.len());
    for symbol in &symbols {
        let (Some(sec), Some(last)) = (tables.security(symbol), tables.last_trade.get(symbol))
        else {
            continue;
        };
        let Some(old) = tables
            .daily_market
            .iter()
            .find(|d| &d.symbol == symbol && d.date == start_day)
        else {
            continue;
        };
        rows.push(Row::new(vec![
            Value::from(symbol.as_str()),
            Value::from(last.price),
            Value::from(old.close),
            Value::from(sec.num_out),
        ]));
    }
    Ok(QueryResult::single(rows))
}

/// `(symbol, start_day, max_rows, lob_flag)`: four result sets, the
/// security summary, quarterly financials, daily market rows from
/// `start_day` and news.
pub fn security_detail(tables: &Tables, p: &Params<'_>) -> Result<QueryResult, StorageError> {
    let symbol = p.text(0)?;
    let start_day = p.date(1)?;
    let max_rows = limit(p.int(2)?);
    let lob = p.boolean(3)?;

    let Some(sec) = tables.security(symbol) else {
        return Ok(QueryResult {
            result_sets: vec![Vec::new(); 4],
            affected: 0,
        });
    };
    let co = tables
        .company(sec.co_id)
        .ok_or_else(|| p.fail(format!("no company for {}", symbol)))?;
    let ex_name = tables.exchange(&sec.ex_id).map_or("", |e| e.name.as_str());
    let last = tables.last_trade.get(symbol);

    let summary = vec![Row::new(vec![
        Value::from(sec.name.as_str()),
        Value::from(co.name.as_str()),
        Value::from(co.ceo.as_str()),
        Value::from(ex_name),
        Value::from(sec.num_out),
        Value::from(sec.pe),
        Value::from(last.map_or(0.0, |l| l.price)),
        Value::from(last.map_or(0.0, |l| l.open_price)),
        Value::from(last.map_or(0, |l| l.vol)),
    ])];

    let mut fin: Vec<_> = tables.financials.iter().filter(|f| f.co_id == co.co_id).collect();
    fin.sort_by_key(|f| (f.year, f.qtr));
    let fin: Vec<Row> = fin
        .into_iter()
        .take(MAX_FIN_LEN)
        .map(|f| {
            Row::new(vec![
                Value::from(f.year),
                Value::from(f.qtr),
                Value::from(f.revenue),
                Value::from(f.net_earn),
            ])
        })
        .collect();

    let mut days: Vec<_> = tables
        .daily_market
        .iter()
        .filter(|d| d.symbol == symbol && d.date >= start_day)
        .collect();
    days.sort_by_key(|d| d.date);
    let days: Vec<Row> = days
        .into_iter()
        .take(max_rows)
        .map(|d| {
            Row::new(vec![
                Value::from(d.date),
                Value::from(d.close),
                Value::from(d.high),
                Value::from(d.low),
                Value::from(d.vol),
            ])
        })
        .collect();

    let news: Vec<Row> = tables
        .news
        .iter()
        .filter(|n| n.co_id == co.co_id)
        .take(MAX_NEWS_LEN)
        .map(|n| {
            Row::new(vec![
                Value::from(n.headline.as_str()),
                Value::from(n.summary.as_str()),
                if lob {
                    Value::from(n.item.as_str())
                } else {
                    Value::Null
                },
            ])
        })
        .collect();

    Ok(QueryResult {
        result_sets: vec![summary, fin, days, news],
        affected: 0,
    })
}

/// `(acct_id)`: owner and broker names, then the latest fifty trades.
pub fn trade_status(tables: &Tables, p: &Params<'_>) -> Result<QueryResult, StorageError> {
    let acct_id = p.int(0)?;

    let header: Vec<Row> = tables
        .account(acct_id)
        .and_then(|a| Some((tables.customer(a.c_id)?, tables.broker(a.b_id)?)))
        .map(|(c, b)| {
            Row::new(vec![
                Value::from(c.l_name.as_str()),
                Value::from(c.f_name.as_str()),
                Value::from(b.name.as_str()),
            ])
        })
        .into_iter()
        .collect();

    let mut trades: Vec<_> = tables.trades.values().filter(|t| t.ca_id == acct_id).collect();
    trades.sort_by(|a, b| b.dts.cmp(&a.dts));
    let rows: Vec<Row> = trades
        .into_iter()
        .take(MAX_TRADE_STATUS_LEN)
        .map(|t| {
            let sec = tables.security(&t.symbol);
            let type_name = TradeType::from_id(&t.tt_id).map_or("", TradeType::name);
            Row::new(vec![
                Value::from(t.t_id),
                Value::from(t.dts),
                Value::from(status_id::name(&t.st_id)),
                Value::from(type_name),
                Value::from(t.symbol.as_str()),
                Value::from(t.qty),
                Value::from(t.exec_name.as_str()),
                Value::from(t.chrg),
                Value::from(sec.map_or("", |s| s.name.as_str())),
                Value::from(
                    sec.and_then(|s| tables.exchange(&s.ex_id))
                        .map_or("", |e| e.name.as_str()),
                ),
            ])
        })
        .collect();

    Ok(QueryResult {
        result_sets: vec![header, rows],
        affected: 0,
    })
}
