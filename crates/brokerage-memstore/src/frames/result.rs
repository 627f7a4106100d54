//! Trade Result frames: holdings, tax, commission and settlement of an
//! executed trade.

use chrono::NaiveDateTime;

use brokerage_core::{QueryResult, Row, StorageError, TradeType, Value};

use super::Params;
use crate::tables::{
    cash_transaction_name, cash_type, commission_rate, round_cents, CashTransaction, Holding,
    Settlement, Tables,
};

/// `(trade_id)` -> `(ca_id, tt_id, symbol, qty, charge, is_lifo,
/// is_cash, type_name, type_is_sell, type_is_market, held_qty)`.
pub fn trade_info(tables: &Tables, p: &Params<'_>) -> Result<QueryResult, StorageError> {
    let trade_id = p.int(0)?;
    let row = tables.trades.get(&trade_id).and_then(|t| {
        let tt = TradeType::from_id(&t.tt_id)?;
        Some(Row::new(vec![
            Value::from(t.ca_id),
            Value::from(t.tt_id.as_str()),
            Value::from(t.symbol.as_str()),
            Value::from(t.qty),
            Value::from(t.chrg),
            Value::from(t.lifo),
            Value::from(t.is_cash),
            Value::from(tt.name()),
            Value::from(tt.is_sell()),
            Value::from(tt.is_market()),
            Value::from(tables.summary_qty(t.ca_id, &t.symbol)),
        ]))
    });
    Ok(QueryResult::single(row.into_iter().collect()))
}

/// Apply the trade to the account's lots.
///
/// A sell closes long lots oldest or newest first (per `is_lifo`) and
/// opens a short lot for any remainder; a buy covers short lots and
/// opens a long lot for the remainder. Returns the lots' buy and sell
/// value.
///
/// Params: `(acct_id, held_qty, is_lifo, symbol, trade_id, price, qty,
/// type_is_sell)` -> `(b_id, buy_value, sell_value, c_id, tax_st,
/// trade_dts)`.
pub fn update_holdings(
    tables: &mut Tables,
    p: &Params<'_>,
    now: NaiveDateTime,
) -> Result<QueryResult, StorageError> {
    let acct_id = p.int(0)?;
    let held = p.int32(1)?;
    let is_lifo = p.boolean(2)?;
    let symbol = p.text(3)?;
    let trade_id = p.int(4)?;
    let price = p.float(5)?;
    let qty = p.int32(6)?;
    let is_sell = p.boolean(7)?;

    let acct = tables
        .account(acct_id)
        .ok_or_else(|| p.fail(format!("no account {}", acct_id)))?;
    let (b_id, c_id, tax_st) = (acct.b_id, acct.c_id, acct.tax_st);

    if qty <= 0 {
        return Err(p.fail(format!("trade {} has quantity {}", trade_id, qty)));
    }
    let position = if is_sell {
        held.checked_sub(qty)
    } else {
        held.checked_add(qty)
    }
    .ok_or_else(|| p.fail(format!("position in {} overflows", symbol)))?;

    // Long lots are closed by sells, short lots by buys.
    let closes = (is_sell && held > 0) || (!is_sell && held < 0);
    let mut needed = qty;
    let mut buy_value = 0.0;
    let mut sell_value = 0.0;
    if closes {
        let mut emptied = Vec::new();
        for idx in tables.lots(acct_id, symbol, is_lifo) {
            if needed == 0 {
                break;
            }
            let lot = &mut tables.holdings[idx];
            let n = lot.qty.checked_abs().unwrap_or(i32::MAX).min(needed);
            let (lot_value, trade_value) = (f64::from(n) * lot.price, f64::from(n) * price);
            let left = if is_sell {
                buy_value += lot_value;
                sell_value += trade_value;
                lot.qty.checked_sub(n)
            } else {
                sell_value += lot_value;
                buy_value += trade_value;
                lot.qty.checked_add(n)
            };
            let lot_trade = lot.t_id;
            lot.qty = left.ok_or_else(|| p.fail(format!("lot of trade {} overflows", lot_trade)))?;
            if lot.qty == 0 {
                emptied.push(idx);
            }
            needed -= n;
        }
        emptied.sort_unstable_by(|a, b| b.cmp(a));
        for idx in emptied {
            tables.holdings.remove(idx);
        }
    }

    if needed > 0 {
        tables.holdings.push(Holding {
            t_id: trade_id,
            ca_id: acct_id,
            symbol: symbol.to_string(),
            dts: now,
            price,
            qty: if is_sell { -needed } else { needed },
        });
    }
    tables.set_summary_qty(acct_id, symbol, position);

    Ok(QueryResult::single(vec![Row::new(vec![
        Value::from(b_id),
        Value::from(buy_value),
        Value::from(sell_value),
        Value::from(c_id),
        Value::from(tax_st),
        Value::from(now),
    ])])
    .with_affected(1))
}

/// `(c_id, trade_id, buy_value, sell_value)` -> `(tax_amount)`, recorded
/// on the trade.
pub fn tax(tables: &mut Tables, p: &Params<'_>) -> Result<QueryResult, StorageError> {
    let c_id = p.int(0)?;
    let trade_id = p.int(1)?;
    let buy_value = p.float(2)?;
    let sell_value = p.float(3)?;

    let amount = round_cents((sell_value - buy_value) * tables.customer_tax_rate(c_id));
    let trade = tables
        .trades
        .get_mut(&trade_id)
        .ok_or_else(|| p.fail(format!("no trade {}", trade_id)))?;
    trade.tax = amount;

    Ok(QueryResult::single(vec![Row::new(vec![Value::from(amount)])]).with_affected(1))
}

/// `(acct_id, symbol, qty, tt_id)` -> `(comm_rate, s_name)`.
pub fn commission(tables: &Tables, p: &Params<'_>) -> Result<QueryResult, StorageError> {
    let acct_id = p.int(0)?;
    let symbol = p.text(1)?;

    let tier = tables
        .account(acct_id)
        .and_then(|a| tables.customer(a.c_id))
        .map(|c| c.tier)
        .ok_or_else(|| p.fail(format!("no customer for account {}", acct_id)))?;
    let s_name = tables
        .security(symbol)
        .map(|s| s.name.as_str())
        .ok_or_else(|| p.fail(format!("no security {}", symbol)))?;

    Ok(QueryResult::single(vec![Row::new(vec![
        Value::from(commission_rate(tier)),
        Value::from(s_name),
    ])]))
}

/// Mark the trade completed and credit the broker.
///
/// Params: `(b_id, comm, st_id, trade_dts, trade_id, price)`.
pub fn complete_trade(tables: &mut Tables, p: &Params<'_>) -> Result<QueryResult, StorageError> {
    let b_id = p.int(0)?;
    let comm = p.float(1)?;
    let st_id = p.text(2)?;
    let dts = p.timestamp(3)?;
    let trade_id = p.int(4)?;
    let price = p.float(5)?;

    let trade = tables
        .trades
        .get_mut(&trade_id)
        .ok_or_else(|| p.fail(format!("no trade {}", trade_id)))?;
    trade.comm = comm;
    trade.dts = dts;
    trade.st_id = st_id.to_string();
    trade.trade_price = Some(price);
    tables.add_history(trade_id, dts, st_id);

    if let Some(broker) = tables.brokers.iter_mut().find(|b| b.b_id == b_id) {
        broker.num_trades += 1;
        broker.comm_total += comm;
    }
    Ok(QueryResult::empty().with_affected(3))
}

/// Record the settlement and, for cash trades, the cash transaction and
/// the new balance.
///
/// Params: `(acct_id, due_date, s_name, se_amount, trade_dts, trade_id,
/// is_cash, qty, type_name)` -> `(acct_bal)`.
pub fn settle(tables: &mut Tables, p: &Params<'_>) -> Result<QueryResult, StorageError> {
    let acct_id = p.int(0)?;
    let due_date = p.date(1)?;
    let s_name = p.text(2)?;
    let amount = p.float(3)?;
    let dts = p.timestamp(4)?;
    let trade_id = p.int(5)?;
    let is_cash = p.boolean(6)?;
    let qty = p.int32(7)?;
    let type_name = p.text(8)?;

    tables.settlements.insert(
        trade_id,
        Settlement {
            cash_type: cash_type(is_cash).to_string(),
            due_date,
            amt: amount,
        },
    );
    let mut affected = 1;
    if is_cash {
        tables.cash_transactions.insert(
            trade_id,
            CashTransaction {
                dts,
                amt: amount,
                name: cash_transaction_name(type_name, qty, s_name),
            },
        );
        affected += 1;
    }

    let acct = tables
        .account_mut(acct_id)
        .ok_or_else(|| p.fail(format!("no account {}", acct_id)))?;
    if is_cash {
        acct.bal = round_cents(acct.bal + amount);
        affected += 1;
    }

    Ok(QueryResult::single(vec![Row::new(vec![Value::from(acct.bal)])]).with_affected(affected))
}
