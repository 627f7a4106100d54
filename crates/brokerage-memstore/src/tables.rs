//! Row types and the table set the frames operate on.
//!
//! Everything lives in plain vectors and ordered maps; the whole set is
//! cloned when a transaction begins so a rollback can put it back.

use std::collections::BTreeMap;

use chrono::{NaiveDate, NaiveDateTime};

#[derive(Debug, Clone, PartialEq)]
pub struct Customer {
    pub c_id: i64,
    pub tax_id: String,
    pub f_name: String,
    pub l_name: String,
    pub tier: i32,
    pub email_2: String,
    pub address_line2: String,
    /// Ids into [`Tables::tax_rates`].
    pub tax_rates: Vec<String>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct TaxRate {
    pub tx_id: String,
    pub name: String,
    pub rate: f64,
}

#[derive(Debug, Clone, PartialEq)]
pub struct Broker {
    pub b_id: i64,
    pub name: String,
    pub num_trades: i64,
    pub comm_total: f64,
}

#[derive(Debug, Clone, PartialEq)]
pub struct Account {
    pub ca_id: i64,
    pub b_id: i64,
    pub c_id: i64,
    pub name: String,
    pub tax_st: i32,
    pub bal: f64,
}

#[derive(Debug, Clone, PartialEq)]
pub struct AccountPermission {
    pub ca_id: i64,
    pub acl: String,
    pub tax_id: String,
    pub f_name: String,
    pub l_name: String,
}

#[derive(Debug, Clone, PartialEq)]
pub struct Sector {
    pub sc_id: String,
    pub name: String,
}

#[derive(Debug, Clone, PartialEq)]
pub struct Industry {
    pub in_id: String,
    pub name: String,
    pub sc_id: String,
}

#[derive(Debug, Clone, PartialEq)]
pub struct Company {
    pub co_id: i64,
    pub name: String,
    pub in_id: String,
    pub ceo: String,
    pub sp_rate: String,
    pub address_line2: String,
}

#[derive(Debug, Clone, PartialEq)]
pub struct Exchange {
    pub ex_id: String,
    pub name: String,
    pub desc: String,
}

#[derive(Debug, Clone, PartialEq)]
pub struct Security {
    pub symbol: String,
    pub issue: String,
    pub name: String,
    pub co_id: i64,
    pub ex_id: String,
    pub num_out: i64,
    pub pe: f64,
    pub exch_date: NaiveDate,
}

#[derive(Debug, Clone, PartialEq)]
pub struct LastTrade {
    pub price: f64,
    pub open_price: f64,
    pub vol: i64,
    pub dts: NaiveDateTime,
}

#[derive(Debug, Clone, PartialEq)]
pub struct DailyMarket {
    pub symbol: String,
    pub date: NaiveDate,
    pub close: f64,
    pub high: f64,
    pub low: f64,
    pub vol: i64,
}

#[derive(Debug, Clone, PartialEq)]
pub struct Financial {
    pub co_id: i64,
    pub year: i32,
    pub qtr: i32,
    pub qtr_start: NaiveDate,
    pub revenue: f64,
    pub net_earn: f64,
}

#[derive(Debug, Clone, PartialEq)]
pub struct NewsItem {
    pub co_id: i64,
    pub headline: String,
    pub summary: String,
    pub item: String,
    pub dts: NaiveDateTime,
}

/// One open lot. Negative quantities are short positions.
#[derive(Debug, Clone, PartialEq)]
pub struct Holding {
    pub t_id: i64,
    pub ca_id: i64,
    pub symbol: String,
    pub dts: NaiveDateTime,
    pub price: f64,
    pub qty: i32,
}

#[derive(Debug, Clone, PartialEq)]
pub struct Trade {
    pub t_id: i64,
    pub dts: NaiveDateTime,
    pub st_id: String,
    pub tt_id: String,
    pub is_cash: bool,
    pub symbol: String,
    pub qty: i32,
    pub bid_price: f64,
    pub ca_id: i64,
    pub exec_name: String,
    pub trade_price: Option<f64>,
    pub chrg: f64,
    pub comm: f64,
    pub tax: f64,
    pub lifo: bool,
}

#[derive(Debug, Clone, PartialEq)]
pub struct TradeHistory {
    pub t_id: i64,
    pub dts: NaiveDateTime,
    pub st_id: String,
}

/// A limit or stop order waiting for its trigger price.
#[derive(Debug, Clone, PartialEq)]
pub struct PendingRequest {
    pub t_id: i64,
    pub tt_id: String,
    pub symbol: String,
    pub qty: i32,
    pub bid_price: f64,
    pub b_id: i64,
}

#[derive(Debug, Clone, PartialEq)]
pub struct Settlement {
    pub cash_type: String,
    pub due_date: NaiveDate,
    pub amt: f64,
}

#[derive(Debug, Clone, PartialEq)]
pub struct CashTransaction {
    pub dts: NaiveDateTime,
    pub amt: f64,
    pub name: String,
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct Tables {
    pub customers: Vec<Customer>,
    pub tax_rates: Vec<TaxRate>,
    pub brokers: Vec<Broker>,
    pub accounts: Vec<Account>,
    pub permissions: Vec<AccountPermission>,
    pub sectors: Vec<Sector>,
    pub industries: Vec<Industry>,
    pub companies: Vec<Company>,
    pub exchanges: Vec<Exchange>,
    pub securities: Vec<Security>,
    pub last_trade: BTreeMap<String, LastTrade>,
    pub daily_market: Vec<DailyMarket>,
    pub financials: Vec<Financial>,
    pub news: Vec<NewsItem>,
    /// Customer id to watched symbols.
    pub watch_lists: BTreeMap<i64, Vec<String>>,
    pub holdings: Vec<Holding>,
    /// Net quantity per (account, symbol).
    pub holding_summary: BTreeMap<(i64, String), i32>,
    pub trades: BTreeMap<i64, Trade>,
    pub trade_history: Vec<TradeHistory>,
    pub trade_requests: Vec<PendingRequest>,
    pub settlements: BTreeMap<i64, Settlement>,
    pub cash_transactions: BTreeMap<i64, CashTransaction>,
    pub next_trade_id: i64,
}

impl Tables {
    pub fn customer(&self, c_id: i64) -> Option<&Customer> {
        self.customers.iter().find(|c| c.c_id == c_id)
    }

    pub fn customer_by_tax_id(&self, tax_id: &str) -> Option<&Customer> {
        self.customers.iter().find(|c| c.tax_id == tax_id)
    }

    pub fn account(&self, ca_id: i64) -> Option<&Account> {
        self.accounts.iter().find(|a| a.ca_id == ca_id)
    }

    pub fn account_mut(&mut self, ca_id: i64) -> Option<&mut Account> {
        self.accounts.iter_mut().find(|a| a.ca_id == ca_id)
    }

    pub fn broker(&self, b_id: i64) -> Option<&Broker> {
        self.brokers.iter().find(|b| b.b_id == b_id)
    }

    pub fn security(&self, symbol: &str) -> Option<&Security> {
        self.securities.iter().find(|s| s.symbol == symbol)
    }

    pub fn company(&self, co_id: i64) -> Option<&Company> {
        self.companies.iter().find(|c| c.co_id == co_id)
    }

    pub fn exchange(&self, ex_id: &str) -> Option<&Exchange> {
        self.exchanges.iter().find(|e| e.ex_id == ex_id)
    }

    /// Sector name of the company issuing `symbol`.
    pub fn sector_of(&self, symbol: &str) -> Option<&str> {
        let sec = self.security(symbol)?;
        let co = self.company(sec.co_id)?;
        let ind = self.industries.iter().find(|i| i.in_id == co.in_id)?;
        self.sectors
            .iter()
            .find(|s| s.sc_id == ind.sc_id)
            .map(|s| s.name.as_str())
    }

    /// Sum of every tax rate the customer is subject to.
    pub fn customer_tax_rate(&self, c_id: i64) -> f64 {
        let Some(cust) = self.customer(c_id) else {
            return 0.0;
        };
        self.tax_rates
            .iter()
            .filter(|r| cust.tax_rates.contains(&r.tx_id))
            .map(|r| r.rate)
            .sum()
    }

    pub fn summary_qty(&self, ca_id: i64, symbol: &str) -> i32 {
        self.holding_summary
            .get(&(ca_id, symbol.to_string()))
            .copied()
            .unwrap_or(0)
    }

    pub fn set_summary_qty(&mut self, ca_id: i64, symbol: &str, qty: i32) {
        let key = (ca_id, symbol.to_string());
        if qty == 0 {
            self.holding_summary.remove(&key);
        } else {
            self.holding_summary.insert(key, qty);
        }
    }

    /// Open lots of one account and symbol, newest first when `lifo`.
    pub fn lots(&self, ca_id: i64, symbol: &str, lifo: bool) -> Vec<usize> {
        let mut idx: Vec<usize> = self
            .holdings
            .iter()
            .enumerate()
            .filter(|(_, h)| h.ca_id == ca_id && h.symbol == symbol)
            .map(|(i, _)| i)
            .collect();
        idx.sort_by(|&a, &b| {
            let (ha, hb) = (&self.holdings[a], &self.holdings[b]);
            (ha.dts, ha.t_id).cmp(&(hb.dts, hb.t_id))
        });
        if lifo {
            idx.reverse();
        }
        idx
    }

    pub fn add_history(&mut self, t_id: i64, dts: NaiveDateTime, st_id: &str) {
        self.trade_history.push(TradeHistory {
            t_id,
            dts,
            st_id: st_id.to_string(),
        });
    }

    pub fn allocate_trade_id(&mut self) -> i64 {
        let id = self.next_trade_id;
        self.next_trade_id += 1;
        id
    }
}

/// Commission rate in percent of the trade value, by customer tier.
pub fn commission_rate(tier: i32) -> f64 {
    match tier {
        1 => 0.40,
        2 => 0.30,
        _ => 0.20,
    }
}

/// Flat charge per trade, by trade type and customer tier.
pub fn trade_charge(tt_id: &str, tier: i32) -> f64 {
    let base = match tier {
        1 => 5.00,
        2 => 4.00,
        _ => 3.00,
    };
    if tt_id == "TMB" || tt_id == "TMS" {
        base
    } else {
        base + 1.50
    }
}

/// Settlement cash type for a trade paid from cash or margin.
pub fn cash_type(is_cash: bool) -> &'static str {
    if is_cash {
        "Cash Account"
    } else {
        "Margin"
    }
}

pub fn cash_transaction_name(type_name: &str, qty: i32, s_name: &str) -> String {
    format!("{} {} shares of {}", type_name, qty, s_name)
}

pub fn round_cents(v: f64) -> f64 {
    (v * 100.0).round() / 100.0
}
