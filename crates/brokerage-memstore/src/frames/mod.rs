//! Frame functions over the in-memory tables.
//!
//! Each function reads its positional parameters in the order the
//! executors pass them and answers with the result sets they decode.

mod browse;
mod feed;
mod lookup;
mod maintenance;
mod order;
mod result;

use brokerage_core::{FrameCall, FrameId, QueryResult, Row, StorageError, Value};
use chrono::{NaiveDate, NaiveDateTime};

use crate::tables::{Tables, Trade};

/// Run one frame against `tables`. `now` stamps every row it writes.
pub fn execute(
    tables: &mut Tables,
    call: &FrameCall,
    now: NaiveDateTime,
) -> Result<QueryResult, StorageError> {
    let p = Params::new(call);
    match call.frame {
        FrameId::BrokerVolume1 => browse::broker_volume(tables, &p),
        FrameId::CustomerPosition1 => browse::customer_accounts(tables, &p),
        FrameId::CustomerPosition2 => browse::customer_history(tables, &p),
        FrameId::MarketWatch1 => browse::market_watch(tables, &p),
        FrameId::SecurityDetail1 => browse::security_detail(tables, &p),
        FrameId::TradeStatus1 => browse::trade_status(tables, &p),

        FrameId::MarketFeed1 => feed::market_feed(tables, &p, now),
        FrameId::TradeCleanup1 => feed::trade_cleanup(tables, &p, now),

        FrameId::TradeLookup1 => lookup::trades_by_id(tables, &p),
        FrameId::TradeLookup2 => lookup::account_trades(tables, &p),
        FrameId::TradeLookup3 => lookup::symbol_trades(tables, &p),
        FrameId::TradeLookup4 => lookup::first_trade(tables, &p),
        FrameId::TradeUpdate1 => lookup::update_exec_names(tables, &p),
        FrameId::TradeUpdate2 => lookup::update_cash_types(tables, &p),
        FrameId::TradeUpdate3 => lookup::update_cash_names(tables, &p),

        FrameId::TradeOrder1 => order::account_info(tables, &p),
        FrameId::TradeOrder2 => order::permission(tables, &p),
        FrameId::TradeOrder3 => order::estimate(tables, &p),
        FrameId::TradeOrder4 => order::record_order(tables, &p, now),

        FrameId::TradeResult1 => result::trade_info(tables, &p),
        FrameId::TradeResult2 => result::update_holdings(tables, &p, now),
        FrameId::TradeResult3 => result::tax(tables, &p),
        FrameId::TradeResult4 => result::commission(tables, &p),
        FrameId::TradeResult5 => result::complete_trade(tables, &p),
        FrameId::TradeResult6 => result::settle(tables, &p),

        FrameId::DataMaintenance1 => maintenance::data_maintenance(tables, &p),

        // Closing frames never reach storage.
        FrameId::CustomerPosition3 | FrameId::TradeOrder5 | FrameId::TradeOrder6 => {
            Ok(QueryResult::empty())
        }
    }
}

/// Typed access to a frame call's parameters.
pub(crate) struct Params<'a> {
    call: &'a FrameCall,
}

impl<'a> Params<'a> {
    fn new(call: &'a FrameCall) -> Self {
        Params { call }
    }

    pub fn len(&self) -> usize {
        self.call.params.len()
    }

    pub fn fail(&self, reason: impl Into<String>) -> StorageError {
        StorageError::Execute {
            frame: self.call.frame,
            reason: reason.into(),
        }
    }

    fn mismatch(&self, idx: usize, expected: &str, found: &Value) -> StorageError {
        self.fail(format!(
            "parameter {} should be {}, found {}",
            idx,
            expected,
            found.kind()
        ))
    }

    pub fn int(&self, idx: usize) -> Result<i64, StorageError> {
        match self.call.param(idx)? {
            Value::Int(v) => Ok(*v),
            other => Err(self.mismatch(idx, "int", other)),
        }
    }

    pub fn int32(&self, idx: usize) -> Result<i32, StorageError> {
        let v = self.int(idx)?;
        i32::try_from(v).map_err(|_| self.fail(format!("parameter {} out of range: {}", idx, v)))
    }

    pub fn float(&self, idx: usize) -> Result<f64, StorageError> {
        match self.call.param(idx)? {
            Value::Float(v) => Ok(*v),
            Value::Int(v) => Ok(*v as f64),
            other => Err(self.mismatch(idx, "float", other)),
        }
    }

    pub fn boolean(&self, idx: usize) -> Result<bool, StorageError> {
        match self.call.param(idx)? {
            Value::Bool(v) => Ok(*v),
            other => Err(self.mismatch(idx, "bool", other)),
        }
    }

    pub fn text(&self, idx: usize) -> Result<&'a str, StorageError> {
        match self.call.param(idx)? {
            Value::Text(v) => Ok(v.as_str()),
            other => Err(self.mismatch(idx, "text", other)),
        }
    }

    pub fn date(&self, idx: usize) -> Result<NaiveDate, StorageError> {
        match self.call.param(idx)? {
            Value::Date(v) => Ok(*v),
            other => Err(self.mismatch(idx, "date", other)),
        }
    }

    pub fn timestamp(&self, idx: usize) -> Result<NaiveDateTime, StorageError> {
        match self.call.param(idx)? {
            Value::Timestamp(v) => Ok(*v),
            other => Err(self.mismatch(idx, "timestamp", other)),
        }
    }

    /// Every parameter from `start` on, as ints.
    pub fn ints_from(&self, start: usize) -> Result<Vec<i64>, StorageError> {
        (start..self.len()).map(|i| self.int(i)).collect()
    }

    pub fn texts_from(&self, start: usize) -> Result<Vec<&'a str>, StorageError> {
        (start..self.len()).map(|i| self.text(i)).collect()
    }
}

/// The shared trade row shape:
/// `(t_id, ca_id, bid_price, exec_name, is_cash, trade_price, qty, dts, tt_id, detail)`.
pub(crate) fn trade_row(t: &Trade, detail: Option<&str>) -> Row {
    Row::new(vec![
        Value::from(t.t_id),
        Value::from(t.ca_id),
        Value::from(t.bid_price),
        Value::from(t.exec_name.as_str()),
        Value::from(t.is_cash),
        Value::from(t.trade_price.unwrap_or(0.0)),
        Value::from(t.qty),
        Value::from(t.dts),
        Value::from(t.tt_id.as_str()),
        detail.map(Value::from).unwrap_or(Value::Null),
    ])
}

/// Clamp a row limit from the wire to a usable count.
pub(crate) fn limit(v: i64) -> usize {
    usize::try_from(v).unwrap_or(0)
}
