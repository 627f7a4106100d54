//! Transaction status codes.
//!
//! - `0` is success.
//! - Negative values are business-rule violations; each transaction type
//!   owns a block (`-1xx` Broker Volume, `-2xx` Customer Position, ...).
//! - Positive values flag a benign empty result.
//! - [`EXPECTED_ROLLBACK`] is what an internal fault is reported as.

pub const SUCCESS: i32 = 0;

/// An internal fault was caught and the open transaction rolled back.
pub const EXPECTED_ROLLBACK: i32 = -1;

pub const BROKER_VOLUME_BAD_LIST_LEN: i32 = -111;

pub const CUSTOMER_POSITION_BAD_ACCT_LEN: i32 = -211;
pub const CUSTOMER_POSITION_BAD_ACCT_IDX: i32 = -212;
pub const CUSTOMER_POSITION_BAD_HIST_LEN: i32 = -221;

pub const MARKET_FEED_NOT_ALL_UPDATED: i32 = -311;

pub const MARKET_WATCH_NO_SELECTOR: i32 = -411;

pub const SECURITY_DETAIL_BAD_DAY_LEN: i32 = -511;
pub const SECURITY_DETAIL_BAD_FIN_LEN: i32 = -512;
pub const SECURITY_DETAIL_BAD_NEWS_LEN: i32 = -513;

pub const TRADE_LOOKUP_F1_BAD_COUNT: i32 = -611;
pub const TRADE_LOOKUP_F2_BAD_COUNT: i32 = -621;
pub const TRADE_LOOKUP_F2_EMPTY: i32 = 621;
pub const TRADE_LOOKUP_F3_BAD_COUNT: i32 = -631;
pub const TRADE_LOOKUP_F3_EMPTY: i32 = 631;
pub const TRADE_LOOKUP_F4_BAD_COUNT: i32 = -641;
pub const TRADE_LOOKUP_F4_EMPTY: i32 = 641;

pub const TRADE_ORDER_ACCOUNT_NOT_FOUND: i32 = -711;
pub const TRADE_ORDER_NOT_AUTHORIZED: i32 = -721;
pub const TRADE_ORDER_UNTAXED_GAIN: i32 = -731;
pub const TRADE_ORDER_BAD_COMM_RATE: i32 = -732;
pub const TRADE_ORDER_BAD_CHARGE: i32 = -733;

pub const TRADE_RESULT_TRADE_NOT_FOUND: i32 = -811;
pub const TRADE_RESULT_BAD_TAX: i32 = -831;
pub const TRADE_RESULT_BAD_COMM_RATE: i32 = -841;

pub const TRADE_STATUS_BAD_COUNT: i32 = -911;

pub const TRADE_UPDATE_F1_BAD_COUNT: i32 = -1011;
pub const TRADE_UPDATE_F1_BAD_UPDATES: i32 = -1012;
pub const TRADE_UPDATE_F2_BAD_COUNT: i32 = -1021;
pub const TRADE_UPDATE_F2_EMPTY: i32 = 1021;
pub const TRADE_UPDATE_F3_BAD_COUNT: i32 = -1031;
pub const TRADE_UPDATE_F3_EMPTY: i32 = 1031;

pub const DATA_MAINTENANCE_UNKNOWN_TABLE: i32 = -1111;

/// True for statuses an operator should see on the console.
pub fn is_console_visible(status: i32) -> bool {
    status < 0 && status != EXPECTED_ROLLBACK
}
