//! Low-level wire sizes and constants.
//!
//! Every message has a fixed size known to both ends:
//! - a Brokerage House request is a 4-byte tag followed by the input
//!   record, zero-padded to the largest input ([`MAX_INPUT_SIZE`]);
//! - a reply is a single 4-byte status;
//! - a trade request to the exchange is [`TRADE_REQUEST_SIZE`] bytes.
//!
//! All integers and floats are big-endian. Strings are fixed-width,
//! NUL-padded UTF-8. The encode/decode logic lives in `binary_codec`.

use brokerage_core::limits::{
    BROKER_NAME_LEN, CO_NAME_LEN, F_NAME_LEN, INDUSTRY_NAME_LEN, ISSUE_LEN, L_NAME_LEN,
    MAX_BROKER_LIST_LEN, MAX_FEED_LEN, MAX_TRADE_IDS, SECTOR_NAME_LEN, ST_ID_LEN, SYMBOL_LEN,
    TABLE_NAME_LEN, TAX_ID_LEN, TT_ID_LEN, TX_ID_LEN,
};
use brokerage_core::TxnType;

pub const BOOL_SIZE: usize = 1;
pub const I32_SIZE: usize = 4;
pub const I64_SIZE: usize = 8;
pub const F64_SIZE: usize = 8;
/// Days from the Common Era, as `i32`.
pub const DATE_SIZE: usize = 4;
/// Milliseconds since the Unix epoch, as `i64`.
pub const TIMESTAMP_SIZE: usize = 8;

pub const TAG_SIZE: usize = I32_SIZE;
pub const REPLY_SIZE: usize = I32_SIZE;

pub const TICKER_ENTRY_SIZE: usize = F64_SIZE + I32_SIZE + SYMBOL_LEN;

pub const TRADE_REQUEST_SIZE: usize =
    F64_SIZE + I64_SIZE + I32_SIZE + I32_SIZE + SYMBOL_LEN + TT_ID_LEN;

pub const BROKER_VOLUME_SIZE: usize = MAX_BROKER_LIST_LEN * BROKER_NAME_LEN + SECTOR_NAME_LEN;

pub const CUSTOMER_POSITION_SIZE: usize = I32_SIZE + I64_SIZE + BOOL_SIZE + TAX_ID_LEN;

pub const MARKET_FEED_SIZE: usize =
    MAX_FEED_LEN * TICKER_ENTRY_SIZE + ST_ID_LEN + 3 * TT_ID_LEN;

pub const MARKET_WATCH_SIZE: usize = 4 * I64_SIZE + DATE_SIZE + INDUSTRY_NAME_LEN;

pub const SECURITY_DETAIL_SIZE: usize = I32_SIZE + BOOL_SIZE + DATE_SIZE + SYMBOL_LEN;

pub const TRADE_LOOKUP_SIZE: usize = MAX_TRADE_IDS * I64_SIZE
    + 2 * I64_SIZE
    + 2 * I32_SIZE
    + 2 * TIMESTAMP_SIZE
    + SYMBOL_LEN;

pub const TRADE_ORDER_SIZE: usize = F64_SIZE
    + I64_SIZE
    + 2 * BOOL_SIZE
    + I32_SIZE
    + BOOL_SIZE
    + CO_NAME_LEN
    + F_NAME_LEN
    + L_NAME_LEN
    + TAX_ID_LEN
    + ISSUE_LEN
    + 2 * ST_ID_LEN
    + SYMBOL_LEN
    + TT_ID_LEN;

pub const TRADE_RESULT_SIZE: usize = F64_SIZE + I64_SIZE;

pub const TRADE_STATUS_SIZE: usize = I64_SIZE;

pub const TRADE_UPDATE_SIZE: usize = TRADE_LOOKUP_SIZE + I32_SIZE;

pub const DATA_MAINTENANCE_SIZE: usize =
    3 * I64_SIZE + 2 * I32_SIZE + SYMBOL_LEN + TABLE_NAME_LEN + TX_ID_LEN;

pub const TRADE_CLEANUP_SIZE: usize = I64_SIZE + 3 * ST_ID_LEN;

/// Size of the input record of `ty`, before padding.
pub const fn input_size(ty: TxnType) -> usize {
    match ty {
        TxnType::BrokerVolume => BROKER_VOLUME_SIZE,
        TxnType::CustomerPosition => CUSTOMER_POSITION_SIZE,
        TxnType::MarketFeed => MARKET_FEED_SIZE,
        TxnType::MarketWatch => MARKET_WATCH_SIZE,
        TxnType::SecurityDetail => SECURITY_DETAIL_SIZE,
        TxnType::TradeLookup => TRADE_LOOKUP_SIZE,
        TxnType::TradeOrder => TRADE_ORDER_SIZE,
        TxnType::TradeResult => TRADE_RESULT_SIZE,
        TxnType::TradeStatus => TRADE_STATUS_SIZE,
        TxnType::TradeUpdate => TRADE_UPDATE_SIZE,
        TxnType::DataMaintenance => DATA_MAINTENANCE_SIZE,
        TxnType::TradeCleanup => TRADE_CLEANUP_SIZE,
    }
}

const fn max_input_size() -> usize {
    let mut max = 0;
    let mut i = 0;
    while i < TxnType::ALL.len() {
        let size = input_size(TxnType::ALL[i]);
        if size > max {
            max = size;
        }
        i += 1;
    }
    max
}

/// Largest input record; every request payload is padded to this.
pub const MAX_INPUT_SIZE: usize = max_input_size();

/// Size of every Brokerage House request on the wire.
pub const REQUEST_SIZE: usize = TAG_SIZE + MAX_INPUT_SIZE;
