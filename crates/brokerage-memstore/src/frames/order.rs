//! Trade Order frames.

use chrono::NaiveDateTime;

use brokerage_core::{QueryResult, Row, StorageError, TradeType, Value};

use super::Params;
use crate::tables::{
    commission_rate, round_cents, trade_charge, PendingRequest, Tables, Trade,
};

/// `(acct_id)` -> `(ca_name, b_name, c_id, tax_st, f_name, l_name, tier,
/// tax_id, b_id)`, or nothing for an unknown account.
pub fn account_info(tables: &Tables, p: &Params<'_>) -> Result<QueryResult, StorageError> {
    let acct_id = p.int(0)?;
    let row = tables.account(acct_id).and_then(|a| {
        let c = tables.customer(a.c_id)?;
        let b = tables.broker(a.b_id)?;
        Some(Row::new(vec![
            Value::from(a.name.as_str()),
            Value::from(b.name.as_str()),
            Value::from(c.c_id),
            Value::from(a.tax_st),
            Value::from(c.f_name.as_str()),
            Value::from(c.l_name.as_str()),
            Value::from(c.tier),
            Value::from(c.tax_id.as_str()),
            Value::from(b.b_id),
        ]))
    });
    Ok(QueryResult::single(row.into_iter().collect()))
}

/// `(acct_id, f_name, l_name, tax_id)` -> the matching permission's acl.
pub fn permission(tables: &Tables, p: &Params<'_>) -> Result<QueryResult, StorageError> {
    let acct_id = p.int(0)?;
    let f_name = p.text(1)?;
    let l_name = p.text(2)?;
    let tax_id = p.text(3)?;
    let rows = tables
        .permissions
        .iter()
        .filter(|ap| {
            ap.ca_id == acct_id && ap.f_name == f_name && ap.l_name == l_name && ap.tax_id == tax_id
        })
        .map(|ap| Row::new(vec![Value::from(ap.acl.as_str())]))
        .collect();
    Ok(QueryResult::single(rows))
}

/// Buy and sell value of trading `qty` against the open lots at `price`:
/// a sell closes long lots, a buy covers short lots.
pub(crate) fn lot_values(
    tables: &Tables,
    acct_id: i64,
    symbol: &str,
    is_sell: bool,
    is_lifo: bool,
    qty: i32,
    price: f64,
) -> (f64, f64) {
    let held = tables.summary_qty(acct_id, symbol);
    let closes = (is_sell && held > 0) || (!is_sell && held < 0);
    if !closes {
        return (0.0, 0.0);
    }

    let mut needed = qty;
    let mut buy_value = 0.0;
    let mut sell_value = 0.0;
    for idx in tables.lots(acct_id, symbol, is_lifo) {
        if needed == 0 {
            break;
        }
        let lot = &tables.holdings[idx];
        let n = lot.qty.abs().min(needed);
        let (lot_value, trade_value) = (f64::from(n) * lot.price, f64::from(n) * price);
        if is_sell {
            buy_value += lot_value;
            sell_value += trade_value;
        } else {
            sell_value += lot_value;
            buy_value += trade_value;
        }
        needed -= n;
    }
    (buy_value, sell_value)
}

/// Estimate the order: resolve the security, price it, value it against
/// current holdings and work out tax, commission rate and charge.
///
/// Params: `(acct_id, cust_id, tier, tax_status, co_name, issue, symbol,
/// tt_id, qty, requested_price, type_is_margin, is_lifo, st_pending,
/// st_submitted)`.
///
/// Row: `(symbol, co_name, s_name, ex_id, type_is_market, type_is_sell,
/// requested_price, buy_value, sell_value, tax_amount, comm_rate,
/// charge, status_id)`.
pub fn estimate(tables: &Tables, p: &Params<'_>) -> Result<QueryResult, StorageError> {
    let acct_id = p.int(0)?;
    let cust_id = p.int(1)?;
    let tier = p.int32(2)?;
    let tax_status = p.int32(3)?;
    let co_name = p.text(4)?;
    let issue = p.text(5)?;
    let symbol = p.text(6)?;
    let tt_id = p.text(7)?;
    let qty = p.int32(8)?;
    let requested_price = p.float(9)?;
    let is_lifo = p.boolean(11)?;
    let st_pending = p.text(12)?;
    let st_submitted = p.text(13)?;

    let found = if symbol.is_empty() {
        tables
            .companies
            .iter()
            .find(|co| co.name == co_name)
            .and_then(|co| {
                tables
                    .securities
                    .iter()
                    .find(|s| s.co_id == co.co_id && s.issue == issue)
            })
    } else {
        tables.security(symbol)
    };
    let sec = found.ok_or_else(|| {
        p.fail(format!("no security for {:?} / {:?} {:?}", symbol, co_name, issue))
    })?;
    let co = tables
        .company(sec.co_id)
        .ok_or_else(|| p.fail(format!("no company for {}", sec.symbol)))?;
    let trade_type =
        TradeType::from_id(tt_id).ok_or_else(|| p.fail(format!("unknown trade type {}", tt_id)))?;

    let market_price = tables
        .last_trade
        .get(&sec.symbol)
        .map(|lt| lt.price)
        .ok_or_else(|| p.fail(format!("no last trade for {}", sec.symbol)))?;
    let price = if trade_type.is_market() {
        market_price
    } else {
        requested_price
    };

    let (buy_value, sell_value) = lot_values(
        tables,
        acct_id,
        &sec.symbol,
        trade_type.is_sell(),
        is_lifo,
        qty,
        price,
    );

    let taxable = tax_status == 1 || tax_status == 2;
    let tax_amount = if taxable && sell_value > buy_value {
        round_cents((sell_value - buy_value) * tables.customer_tax_rate(cust_id))
    } else {
        0.0
    };

    let status = if trade_type.is_market() {
        st_submitted
    } else {
        st_pending
    };

    Ok(QueryResult::single(vec![Row::new(vec![
        Value::from(sec.symbol.as_str()),
        Value::from(co.name.as_str()),
        Value::from(sec.name.as_str()),
        Value::from(sec.ex_id.as_str()),
        Value::from(trade_type.is_market()),
        Value::from(trade_type.is_sell()),
        Value::from(price),
        Value::from(buy_value),
        Value::from(sell_value),
        Value::from(tax_amount),
        Value::from(commission_rate(tier)),
        Value::from(trade_charge(trade_type.id(), tier)),
        Value::from(status),
    ])]))
}

/// Insert the trade, its first history row and, for limit orders, the
/// pending request.
///
/// Params: `(acct_id, symbol, qty, tt_id, status_id, price, charge,
/// comm, exec_name, is_cash, is_lifo, type_is_market)` -> `(t_id)`.
pub fn record_order(
    tables: &mut Tables,
    p: &Params<'_>,
    now: NaiveDateTime,
) -> Result<QueryResult, StorageError> {
    let acct_id = p.int(0)?;
    let symbol = p.text(1)?;
    let qty = p.int32(2)?;
    let tt_id = p.text(3)?;
    let st_id = p.text(4)?;
    let price = p.float(5)?;
    let chrg = p.float(6)?;
    let comm = p.float(7)?;
    let exec_name = p.text(8)?;
    let is_cash = p.boolean(9)?;
    let lifo = p.boolean(10)?;
    let type_is_market = p.boolean(11)?;

    let b_id = tables
        .account(acct_id)
        .map(|a| a.b_id)
        .ok_or_else(|| p.fail(format!("no account {}", acct_id)))?;

    let t_id = tables.allocate_trade_id();
    tables.trades.insert(
        t_id,
        Trade {
            t_id,
            dts: now,
            st_id: st_id.to_string(),
            tt_id: tt_id.to_string(),
            is_cash,
            symbol: symbol.to_string(),
            qty,
            bid_price: price,
            ca_id: acct_id,
            exec_name: exec_name.to_string(),
            trade_price: None,
            chrg,
            comm,
            tax: 0.0,
            lifo,
        },
    );
    if !type_is_market {
        tables.trade_requests.push(PendingRequest {
            t_id,
            tt_id: tt_id.to_string(),
            symbol: symbol.to_string(),
            qty,
            bid_price: price,
            b_id,
        });
    }
    tables.add_history(t_id, now, st_id);

    Ok(QueryResult::single(vec![Row::new(vec![Value::from(t_id)])]).with_affected(1))
}
