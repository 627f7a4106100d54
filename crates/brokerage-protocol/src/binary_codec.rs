//! Binary encoding/decoding of Brokerage House and Market Exchange
//! messages.
//!
//! ```text
//! Request (driver or MEE → Brokerage House), REQUEST_SIZE bytes
//! -------------------------------------------------------------
//! [0..4]  : tag (TxnType as i32 BE)
//! [4..]   : input record of that type, then zero padding
//!
//! Reply (Brokerage House → caller), REPLY_SIZE bytes
//! ----------------------------------------------------
//! [0..4]  : status (i32 BE)
//!
//! TradeRequest (Brokerage House → MEE), TRADE_REQUEST_SIZE bytes
//! ----------------------------------------------------------------
//! [0..8]   price_quote (f64 BE)
//! [8..16]  trade_id (i64 BE)
//! [16..20] trade_qty (i32 BE)
//! [20..24] action (MeeAction as i32 BE)
//! [24..39] symbol (15 bytes, NUL padded)
//! [39..42] trade_type_id (3 bytes, NUL padded)
//! ```
//!
//! Input records are laid out field by field in declaration order.
//! Variable-length lists (broker names, ticker entries, trade ids) occupy
//! their full fixed capacity; unused slots are zero and end the list.

use std::fmt;

use bytes::{Buf, BufMut};
use chrono::{DateTime, Datelike, NaiveDate, NaiveDateTime};

use brokerage_core::limits::{
    BROKER_NAME_LEN, CO_NAME_LEN, F_NAME_LEN, INDUSTRY_NAME_LEN, ISSUE_LEN, L_NAME_LEN,
    MAX_BROKER_LIST_LEN, MAX_FEED_LEN, MAX_TRADE_IDS, SECTOR_NAME_LEN, ST_ID_LEN, SYMBOL_LEN,
    TABLE_NAME_LEN, TAX_ID_LEN, TT_ID_LEN, TX_ID_LEN,
};
use brokerage_core::{
    BrokerVolumeInput, CustomerPositionInput, DataMaintenanceInput, MarketFeedInput,
    MarketWatchInput, MeeAction, SecurityDetailInput, TickerEntry, TradeCleanupInput,
    TradeLookupInput, TradeOrderInput, TradeRequest, TradeResultInput, TradeStatusInput,
    TradeUpdateInput, TxnInput, TxnType,
};

use crate::wire_types::{input_size, REQUEST_SIZE, TAG_SIZE, TRADE_REQUEST_SIZE};

/// Errors that can arise when encoding/decoding a message.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ProtocolError {
    /// Buffer too short for the expected fields.
    Truncated { needed: usize, got: usize },
    /// Request tag outside the known transaction types.
    UnknownTxnType(i32),
    /// Trade request action outside the known actions.
    UnknownAction(i32),
    /// String longer than its fixed field.
    FieldTooLong { field: &'static str, max: usize },
    /// More list elements than the fixed capacity.
    TooManyEntries { field: &'static str, max: usize },
    /// Field bytes are not valid UTF-8.
    InvalidUtf8(&'static str),
    /// Out-of-range date, timestamp or similar.
    InvalidField(&'static str),
}

impl fmt::Display for ProtocolError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ProtocolError::Truncated { needed, got } => {
                write!(f, "Buffer truncated: need {} bytes, got {}", needed, got)
            }
            ProtocolError::UnknownTxnType(t) => write!(f, "Unknown transaction type: {}", t),
            ProtocolError::UnknownAction(a) => write!(f, "Unknown market action: {}", a),
            ProtocolError::FieldTooLong { field, max } => {
                write!(f, "Field {} longer than {} bytes", field, max)
            }
            ProtocolError::TooManyEntries { field, max } => {
                write!(f, "Field {} holds more than {} entries", field, max)
            }
            ProtocolError::InvalidUtf8(field) => write!(f, "Invalid UTF-8 in field: {}", field),
            ProtocolError::InvalidField(field) => write!(f, "Invalid field: {}", field),
        }
    }
}

impl std::error::Error for ProtocolError {}

// ============================================================================
// REQUEST: caller → Brokerage House
// ============================================================================

/// Encode one request (tag + padded input) and append it to `out`.
///
/// Exactly [`REQUEST_SIZE`] bytes are appended on success; nothing is
/// appended on error.
pub fn encode_request(input: &TxnInput, out: &mut Vec<u8>) -> Result<(), ProtocolError> {
    let mut buf = Vec::with_capacity(REQUEST_SIZE);
    buf.put_i32(input.txn_type().as_i32());

    match input {
        TxnInput::BrokerVolume(i) => encode_broker_volume(i, &mut buf)?,
        TxnInput::CustomerPosition(i) => encode_customer_position(i, &mut buf)?,
        TxnInput::MarketFeed(i) => encode_market_feed(i, &mut buf)?,
        TxnInput::MarketWatch(i) => encode_market_watch(i, &mut buf)?,
        TxnInput::SecurityDetail(i) => encode_security_detail(i, &mut buf)?,
        TxnInput::TradeLookup(i) => encode_trade_lookup(i, &mut buf)?,
        TxnInput::TradeOrder(i) => encode_trade_order(i, &mut buf)?,
        TxnInput::TradeResult(i) => encode_trade_result(i, &mut buf),
        TxnInput::TradeStatus(i) => buf.put_i64(i.acct_id),
        TxnInput::TradeUpdate(i) => encode_trade_update(i, &mut buf)?,
        TxnInput::DataMaintenance(i) => encode_data_maintenance(i, &mut buf)?,
        TxnInput::TradeCleanup(i) => encode_trade_cleanup(i, &mut buf)?,
    }

    debug_assert_eq!(buf.len(), TAG_SIZE + input_size(input.txn_type()));
    buf.resize(REQUEST_SIZE, 0);
    out.extend_from_slice(&buf);
    Ok(())
}

/// Decode one request. `buf` must hold at least the tag and the input
/// record of that tag; padding is not inspected.
pub fn decode_request(buf: &[u8]) -> Result<TxnInput, ProtocolError> {
    let mut r = Reader::new(buf);
    let tag = r.i32()?;
    let ty = TxnType::from_i32(tag).ok_or(ProtocolError::UnknownTxnType(tag))?;
    r.need(input_size(ty))?;

    Ok(match ty {
        TxnType::BrokerVolume => TxnInput::BrokerVolume(decode_broker_volume(&mut r)?),
        TxnType::CustomerPosition => {
            TxnInput::CustomerPosition(decode_customer_position(&mut r)?)
        }
        TxnType::MarketFeed => TxnInput::MarketFeed(decode_market_feed(&mut r)?),
        TxnType::MarketWatch => TxnInput::MarketWatch(decode_market_watch(&mut r)?),
        TxnType::SecurityDetail => TxnInput::SecurityDetail(decode_security_detail(&mut r)?),
        TxnType::TradeLookup => TxnInput::TradeLookup(decode_trade_lookup(&mut r)?),
        TxnType::TradeOrder => TxnInput::TradeOrder(decode_trade_order(&mut r)?),
        TxnType::TradeResult => TxnInput::TradeResult(TradeResultInput {
            trade_price: r.f64()?,
            trade_id: r.i64()?,
        }),
        TxnType::TradeStatus => TxnInput::TradeStatus(TradeStatusInput { acct_id: r.i64()? }),
        TxnType::TradeUpdate => TxnInput::TradeUpdate(decode_trade_update(&mut r)?),
        TxnType::DataMaintenance => TxnInput::DataMaintenance(decode_data_maintenance(&mut r)?),
        TxnType::TradeCleanup => TxnInput::TradeCleanup(decode_trade_cleanup(&mut r)?),
    })
}

fn encode_broker_volume(i: &BrokerVolumeInput, out: &mut Vec<u8>) -> Result<(), ProtocolError> {
    if i.broker_list.len() > MAX_BROKER_LIST_LEN {
        return Err(ProtocolError::TooManyEntries {
            field: "broker_list",
            max: MAX_BROKER_LIST_LEN,
        });
    }
    for slot in 0..MAX_BROKER_LIST_LEN {
        let name = i.broker_list.get(slot).map(String::as_str).unwrap_or("");
        put_str(out, "broker_list", name, BROKER_NAME_LEN)?;
    }
    put_str(out, "sector_name", &i.sector_name, SECTOR_NAME_LEN)
}

fn decode_broker_volume(r: &mut Reader<'_>) -> Result<BrokerVolumeInput, ProtocolError> {
    let mut broker_list = Vec::new();
    for _ in 0..MAX_BROKER_LIST_LEN {
        let name = r.str("broker_list", BROKER_NAME_LEN)?;
        if !name.is_empty() {
            broker_list.push(name);
        }
    }
    Ok(BrokerVolumeInput {
        broker_list,
        sector_name: r.str("sector_name", SECTOR_NAME_LEN)?,
    })
}

fn encode_customer_position(
    i: &CustomerPositionInput,
    out: &mut Vec<u8>,
) -> Result<(), ProtocolError> {
    out.put_i32(i.acct_id_idx);
    out.put_i64(i.cust_id);
    put_bool(out, i.get_history);
    put_str(out, "tax_id", &i.tax_id, TAX_ID_LEN)
}

fn decode_customer_position(r: &mut Reader<'_>) -> Result<CustomerPositionInput, ProtocolError> {
    Ok(CustomerPositionInput {
        acct_id_idx: r.i32()?,
        cust_id: r.i64()?,
        get_history: r.bool()?,
        tax_id: r.str("tax_id", TAX_ID_LEN)?,
    })
}

fn encode_market_feed(i: &MarketFeedInput, out: &mut Vec<u8>) -> Result<(), ProtocolError> {
    if i.entries.len() > MAX_FEED_LEN {
        return Err(ProtocolError::TooManyEntries {
            field: "entries",
            max: MAX_FEED_LEN,
        });
    }
    let blank = TickerEntry::default();
    for slot in 0..MAX_FEED_LEN {
        let entry = i.entries.get(slot).unwrap_or(&blank);
        out.put_f64(entry.price_quote);
        out.put_i32(entry.trade_qty);
        put_str(out, "entries.symbol", &entry.symbol, SYMBOL_LEN)?;
    }
    put_str(out, "status_submitted", &i.status_submitted, ST_ID_LEN)?;
    put_str(out, "type_limit_buy", &i.type_limit_buy, TT_ID_LEN)?;
    put_str(out, "type_limit_sell", &i.type_limit_sell, TT_ID_LEN)?;
    put_str(out, "type_stop_loss", &i.type_stop_loss, TT_ID_LEN)
}

fn decode_market_feed(r: &mut Reader<'_>) -> Result<MarketFeedInput, ProtocolError> {
    let mut entries = Vec::new();
    for _ in 0..MAX_FEED_LEN {
        let entry = TickerEntry {
            price_quote: r.f64()?,
            trade_qty: r.i32()?,
            symbol: r.str("entries.symbol", SYMBOL_LEN)?,
        };
        if !entry.symbol.is_empty() {
            entries.push(entry);
        }
    }
    Ok(MarketFeedInput {
        entries,
        status_submitted: r.str("status_submitted", ST_ID_LEN)?,
        type_limit_buy: r.str("type_limit_buy", TT_ID_LEN)?,
        type_limit_sell: r.str("type_limit_sell", TT_ID_LEN)?,
        type_stop_loss: r.str("type_stop_loss", TT_ID_LEN)?,
    })
}

fn encode_market_watch(i: &MarketWatchInput, out: &mut Vec<u8>) -> Result<(), ProtocolError> {
    out.put_i64(i.acct_id);
    out.put_i64(i.c_id);
    out.put_i64(i.ending_co_id);
    out.put_i64(i.starting_co_id);
    put_date(out, i.start_day);
    put_str(out, "industry_name", &i.industry_name, INDUSTRY_NAME_LEN)
}

fn decode_market_watch(r: &mut Reader<'_>) -> Result<MarketWatchInput, ProtocolError> {
    Ok(MarketWatchInput {
        acct_id: r.i64()?,
        c_id: r.i64()?,
        ending_co_id: r.i64()?,
        starting_co_id: r.i64()?,
        start_day: r.date("start_day")?,
        industry_name: r.str("industry_name", INDUSTRY_NAME_LEN)?,
    })
}

fn encode_security_detail(
    i: &SecurityDetailInput,
    out: &mut Vec<u8>,
) -> Result<(), ProtocolError> {
    out.put_i32(i.max_rows_to_return);
    put_bool(out, i.access_lob_flag);
    put_date(out, i.start_day);
    put_str(out, "symbol", &i.symbol, SYMBOL_LEN)
}

fn decode_security_detail(r: &mut Reader<'_>) -> Result<SecurityDetailInput, ProtocolError> {
    Ok(SecurityDetailInput {
        max_rows_to_return: r.i32()?,
        access_lob_flag: r.bool()?,
        start_day: r.date("start_day")?,
        symbol: r.str("symbol", SYMBOL_LEN)?,
    })
}

fn put_trade_ids(out: &mut Vec<u8>, ids: &[i64]) -> Result<(), ProtocolError> {
    if ids.len() > MAX_TRADE_IDS {
        return Err(ProtocolError::TooManyEntries {
            field: "trade_id",
            max: MAX_TRADE_IDS,
        });
    }
    for slot in 0..MAX_TRADE_IDS {
        out.put_i64(ids.get(slot).copied().unwrap_or(0));
    }
    Ok(())
}

fn get_trade_ids(r: &mut Reader<'_>) -> Result<Vec<i64>, ProtocolError> {
    let mut ids = Vec::new();
    for _ in 0..MAX_TRADE_IDS {
        let id = r.i64()?;
        if id != 0 {
            ids.push(id);
        }
    }
    Ok(ids)
}

fn encode_trade_lookup(i: &TradeLookupInput, out: &mut Vec<u8>) -> Result<(), ProtocolError> {
    put_trade_ids(out, &i.trade_id)?;
    out.put_i64(i.acct_id);
    out.put_i64(i.max_acct_id);
    out.put_i32(i.frame_to_execute);
    out.put_i32(i.max_trades);
    put_timestamp(out, i.end_trade_dts);
    put_timestamp(out, i.start_trade_dts);
    put_str(out, "symbol", &i.symbol, SYMBOL_LEN)
}

fn decode_trade_lookup(r: &mut Reader<'_>) -> Result<TradeLookupInput, ProtocolError> {
    Ok(TradeLookupInput {
        trade_id: get_trade_ids(r)?,
        acct_id: r.i64()?,
        max_acct_id: r.i64()?,
        frame_to_execute: r.i32()?,
        max_trades: r.i32()?,
        end_trade_dts: r.timestamp("end_trade_dts")?,
        start_trade_dts: r.timestamp("start_trade_dts")?,
        symbol: r.str("symbol", SYMBOL_LEN)?,
    })
}

fn encode_trade_order(i: &TradeOrderInput, out: &mut Vec<u8>) -> Result<(), ProtocolError> {
    out.put_f64(i.requested_price);
    out.put_i64(i.acct_id);
    put_bool(out, i.is_lifo);
    put_bool(out, i.roll_it_back);
    out.put_i32(i.trade_qty);
    put_bool(out, i.type_is_margin);
    put_str(out, "co_name", &i.co_name, CO_NAME_LEN)?;
    put_str(out, "exec_f_name", &i.exec_f_name, F_NAME_LEN)?;
    put_str(out, "exec_l_name", &i.exec_l_name, L_NAME_LEN)?;
    put_str(out, "exec_tax_id", &i.exec_tax_id, TAX_ID_LEN)?;
    put_str(out, "issue", &i.issue, ISSUE_LEN)?;
    put_str(out, "st_pending_id", &i.st_pending_id, ST_ID_LEN)?;
    put_str(out, "st_submitted_id", &i.st_submitted_id, ST_ID_LEN)?;
    put_str(out, "symbol", &i.symbol, SYMBOL_LEN)?;
    put_str(out, "trade_type_id", &i.trade_type_id, TT_ID_LEN)
}

fn decode_trade_order(r: &mut Reader<'_>) -> Result<TradeOrderInput, ProtocolError> {
    Ok(TradeOrderInput {
        requested_price: r.f64()?,
        acct_id: r.i64()?,
        is_lifo: r.bool()?,
        roll_it_back: r.bool()?,
        trade_qty: r.i32()?,
        type_is_margin: r.bool()?,
        co_name: r.str("co_name", CO_NAME_LEN)?,
        exec_f_name: r.str("exec_f_name", F_NAME_LEN)?,
        exec_l_name: r.str("exec_l_name", L_NAME_LEN)?,
        exec_tax_id: r.str("exec_tax_id", TAX_ID_LEN)?,
        issue: r.str("issue", ISSUE_LEN)?,
        st_pending_id: r.str("st_pending_id", ST_ID_LEN)?,
        st_submitted_id: r.str("st_submitted_id", ST_ID_LEN)?,
        symbol: r.str("symbol", SYMBOL_LEN)?,
        trade_type_id: r.str("trade_type_id", TT_ID_LEN)?,
    })
}

fn encode_trade_result(i: &TradeResultInput, out: &mut Vec<u8>) {
    out.put_f64(i.trade_price);
    out.put_i64(i.trade_id);
}

fn encode_trade_update(i: &TradeUpdateInput, out: &mut Vec<u8>) -> Result<(), ProtocolError> {
    put_trade_ids(out, &i.trade_id)?;
    out.put_i64(i.acct_id);
    out.put_i64(i.max_acct_id);
    out.put_i32(i.frame_to_execute);
    out.put_i32(i.max_trades);
    out.put_i32(i.max_updates);
    put_timestamp(out, i.end_trade_dts);
    put_timestamp(out, i.start_trade_dts);
    put_str(out, "symbol", &i.symbol, SYMBOL_LEN)
}

fn decode_trade_update(r: &mut Reader<'_>) -> Result<TradeUpdateInput, ProtocolError> {
    Ok(TradeUpdateInput {
        trade_id: get_trade_ids(r)?,
        acct_id: r.i64()?,
        max_acct_id: r.i64()?,
        frame_to_execute: r.i32()?,
        max_trades: r.i32()?,
        max_updates: r.i32()?,
        end_trade_dts: r.timestamp("end_trade_dts")?,
        start_trade_dts: r.timestamp("start_trade_dts")?,
        symbol: r.str("symbol", SYMBOL_LEN)?,
    })
}

fn encode_data_maintenance(
    i: &DataMaintenanceInput,
    out: &mut Vec<u8>,
) -> Result<(), ProtocolError> {
    out.put_i64(i.acct_id);
    out.put_i64(i.c_id);
    out.put_i64(i.co_id);
    out.put_i32(i.day_of_month);
    out.put_i32(i.vol_incr);
    put_str(out, "symbol", &i.symbol, SYMBOL_LEN)?;
    put_str(out, "table_name", &i.table_name, TABLE_NAME_LEN)?;
    put_str(out, "tx_id", &i.tx_id, TX_ID_LEN)
}

fn decode_data_maintenance(r: &mut Reader<'_>) -> Result<DataMaintenanceInput, ProtocolError> {
    Ok(DataMaintenanceInput {
        acct_id: r.i64()?,
        c_id: r.i64()?,
        co_id: r.i64()?,
        day_of_month: r.i32()?,
        vol_incr: r.i32()?,
        symbol: r.str("symbol", SYMBOL_LEN)?,
        table_name: r.str("table_name", TABLE_NAME_LEN)?,
        tx_id: r.str("tx_id", TX_ID_LEN)?,
    })
}

fn encode_trade_cleanup(i: &TradeCleanupInput, out: &mut Vec<u8>) -> Result<(), ProtocolError> {
    out.put_i64(i.start_trade_id);
    put_str(out, "st_canceled_id", &i.st_canceled_id, ST_ID_LEN)?;
    put_str(out, "st_pending_id", &i.st_pending_id, ST_ID_LEN)?;
    put_str(out, "st_submitted_id", &i.st_submitted_id, ST_ID_LEN)
}

fn decode_trade_cleanup(r: &mut Reader<'_>) -> Result<TradeCleanupInput, ProtocolError> {
    Ok(TradeCleanupInput {
        start_trade_id: r.i64()?,
        st_canceled_id: r.str("st_canceled_id", ST_ID_LEN)?,
        st_pending_id: r.str("st_pending_id", ST_ID_LEN)?,
        st_submitted_id: r.str("st_submitted_id", ST_ID_LEN)?,
    })
}

// ============================================================================
// REPLY: Brokerage House → caller
// ============================================================================

pub fn encode_reply(status: i32, out: &mut Vec<u8>) {
    out.put_i32(status);
}

pub fn decode_reply(buf: &[u8]) -> Result<i32, ProtocolError> {
    Reader::new(buf).i32()
}

// ============================================================================
// TRADE REQUEST: Brokerage House → Market Exchange
// ============================================================================

pub fn encode_trade_request(req: &TradeRequest, out: &mut Vec<u8>) -> Result<(), ProtocolError> {
    let mut buf = Vec::with_capacity(TRADE_REQUEST_SIZE);
    buf.put_f64(req.price_quote);
    buf.put_i64(req.trade_id);
    buf.put_i32(req.trade_qty);
    buf.put_i32(req.action as i32);
    put_str(&mut buf, "symbol", &req.symbol, SYMBOL_LEN)?;
    put_str(&mut buf, "trade_type_id", &req.trade_type_id, TT_ID_LEN)?;
    out.extend_from_slice(&buf);
    Ok(())
}

pub fn decode_trade_request(buf: &[u8]) -> Result<TradeRequest, ProtocolError> {
    let mut r = Reader::new(buf);
    r.need(TRADE_REQUEST_SIZE)?;
    let price_quote = r.f64()?;
    let trade_id = r.i64()?;
    let trade_qty = r.i32()?;
    let raw_action = r.i32()?;
    let action = MeeAction::from_i32(raw_action).ok_or(ProtocolError::UnknownAction(raw_action))?;
    Ok(TradeRequest {
        price_quote,
        trade_id,
        trade_qty,
        action,
        symbol: r.str("symbol", SYMBOL_LEN)?,
        trade_type_id: r.str("trade_type_id", TT_ID_LEN)?,
    })
}

// -----------------------------------------------------------------------------
// Helpers
// -----------------------------------------------------------------------------

fn put_str(
    out: &mut Vec<u8>,
    field: &'static str,
    value: &str,
    width: usize,
) -> Result<(), ProtocolError> {
    let bytes = value.as_bytes();
    if bytes.len() > width {
        return Err(ProtocolError::FieldTooLong { field, max: width });
    }
    out.put_slice(bytes);
    out.put_bytes(0, width - bytes.len());
    Ok(())
}

fn put_bool(out: &mut Vec<u8>, v: bool) {
    out.put_u8(u8::from(v));
}

fn put_date(out: &mut Vec<u8>, d: NaiveDate) {
    out.put_i32(d.num_days_from_ce());
}

fn put_timestamp(out: &mut Vec<u8>, ts: NaiveDateTime) {
    out.put_i64(ts.and_utc().timestamp_millis());
}

/// Bounds-checked big-endian cursor.
struct Reader<'a> {
    buf: &'a [u8],
}

impl<'a> Reader<'a> {
    fn new(buf: &'a [u8]) -> Self {
        Reader { buf }
    }

    fn need(&self, n: usize) -> Result<(), ProtocolError> {
        if self.buf.remaining() < n {
            return Err(ProtocolError::Truncated {
                needed: n,
                got: self.buf.remaining(),
            });
        }
        Ok(())
    }

    fn i32(&mut self) -> Result<i32, ProtocolError> {
        self.need(4)?;
        Ok(self.buf.get_i32())
    }

    fn i64(&mut self) -> Result<i64, ProtocolError> {
        self.need(8)?;
        Ok(self.buf.get_i64())
    }

    fn f64(&mut self) -> Result<f64, ProtocolError> {
        self.need(8)?;
        Ok(self.buf.get_f64())
    }

    fn bool(&mut self) -> Result<bool, ProtocolError> {
        self.need(1)?;
        Ok(self.buf.get_u8() != 0)
    }

    fn str(&mut self, field: &'static str, width: usize) -> Result<String, ProtocolError> {
        self.need(width)?;
        let (raw, rest) = self.buf.split_at(width);
        self.buf = rest;
        let end = raw.iter().position(|&b| b == 0).unwrap_or(width);
        std::str::from_utf8(&raw[..end])
            .map(str::to_string)
            .map_err(|_| ProtocolError::InvalidUtf8(field))
    }

    fn date(&mut self, field: &'static str) -> Result<NaiveDate, ProtocolError> {
        let days = self.i32()?;
        NaiveDate::from_num_days_from_ce_opt(days).ok_or(ProtocolError::InvalidField(field))
    }

    fn timestamp(&mut self, field: &'static str) -> Result<NaiveDateTime, ProtocolError> {
        let ms = self.i64()?;
        DateTime::from_timestamp_millis(ms)
            .map(|dt| dt.naive_utc())
            .ok_or(ProtocolError::InvalidField(field))
    }
}
