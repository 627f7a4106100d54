//! Input records, one per transaction type.
//!
//! These are the logical payloads carried by a Brokerage House request.
//! Fixed widths and list bounds live in [`crate::limits`]; the wire
//! layout lives in the protocol crate.

use chrono::{NaiveDate, NaiveDateTime};

use crate::txn_type::TxnType;

/// A request payload: exactly one input record, selected by its tag.
#[derive(Debug, Clone, PartialEq)]
pub enum TxnInput {
    BrokerVolume(BrokerVolumeInput),
    CustomerPosition(CustomerPositionInput),
    MarketFeed(MarketFeedInput),
    MarketWatch(MarketWatchInput),
    SecurityDetail(SecurityDetailInput),
    TradeLookup(TradeLookupInput),
    TradeOrder(TradeOrderInput),
    TradeResult(TradeResultInput),
    TradeStatus(TradeStatusInput),
    TradeUpdate(TradeUpdateInput),
    DataMaintenance(DataMaintenanceInput),
    TradeCleanup(TradeCleanupInput),
}

impl TxnInput {
    pub fn txn_type(&self) -> TxnType {
        match self {
            TxnInput::BrokerVolume(_) => TxnType::BrokerVolume,
            TxnInput::CustomerPosition(_) => TxnType::CustomerPosition,
            TxnInput::MarketFeed(_) => TxnType::MarketFeed,
            TxnInput::MarketWatch(_) => TxnType::MarketWatch,
            TxnInput::SecurityDetail(_) => TxnType::SecurityDetail,
            TxnInput::TradeLookup(_) => TxnType::TradeLookup,
            TxnInput::TradeOrder(_) => TxnType::TradeOrder,
            TxnInput::TradeResult(_) => TxnType::TradeResult,
            TxnInput::TradeStatus(_) => TxnType::TradeStatus,
            TxnInput::TradeUpdate(_) => TxnType::TradeUpdate,
            TxnInput::DataMaintenance(_) => TxnType::DataMaintenance,
            TxnInput::TradeCleanup(_) => TxnType::TradeCleanup,
        }
    }
}

/// Broker Volume: trade-request volume of a set of brokers in one sector.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct BrokerVolumeInput {
    /// Up to `MAX_BROKER_LIST_LEN` broker names.
    pub broker_list: Vec<String>,
    pub sector_name: String,
}

/// Customer Position: accounts of a customer, optionally with the
/// history of the last trades of one of them.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct CustomerPositionInput {
    /// Index into the account list returned by frame 1.
    pub acct_id_idx: i32,
    /// Customer id; `0` means "look the customer up by `tax_id`".
    pub cust_id: i64,
    pub get_history: bool,
    pub tax_id: String,
}

/// One ticker entry of a Market Feed batch.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct TickerEntry {
    pub price_quote: f64,
    pub trade_qty: i32,
    pub symbol: String,
}

/// Market Feed: a batch of last-trade prices from the exchange.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct MarketFeedInput {
    /// Up to `MAX_FEED_LEN` entries.
    pub entries: Vec<TickerEntry>,
    pub status_submitted: String,
    pub type_limit_buy: String,
    pub type_limit_sell: String,
    pub type_stop_loss: String,
}

/// Market Watch: percentage change in market capitalisation of a
/// watch list, a customer's holdings, or an industry slice.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct MarketWatchInput {
    pub acct_id: i64,
    pub c_id: i64,
    pub ending_co_id: i64,
    pub starting_co_id: i64,
    pub start_day: NaiveDate,
    pub industry_name: String,
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct SecurityDetailInput {
    pub max_rows_to_return: i32,
    pub access_lob_flag: bool,
    pub start_day: NaiveDate,
    pub symbol: String,
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct TradeLookupInput {
    /// Frame 1 only; up to `MAX_TRADE_IDS` ids.
    pub trade_id: Vec<i64>,
    pub acct_id: i64,
    pub max_acct_id: i64,
    /// Which of the four frames to run (1..=4).
    pub frame_to_execute: i32,
    pub max_trades: i32,
    pub end_trade_dts: NaiveDateTime,
    pub start_trade_dts: NaiveDateTime,
    pub symbol: String,
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct TradeOrderInput {
    pub requested_price: f64,
    pub acct_id: i64,
    pub is_lifo: bool,
    /// Set by the driver on a fixed share of orders: the order must be
    /// rolled back after it has been fully built.
    pub roll_it_back: bool,
    pub trade_qty: i32,
    pub type_is_margin: bool,
    pub co_name: String,
    pub exec_f_name: String,
    pub exec_l_name: String,
    pub exec_tax_id: String,
    pub issue: String,
    pub st_pending_id: String,
    pub st_submitted_id: String,
    pub symbol: String,
    pub trade_type_id: String,
}

/// Trade Result: completion of a trade the exchange executed.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct TradeResultInput {
    pub trade_price: f64,
    pub trade_id: i64,
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct TradeStatusInput {
    pub acct_id: i64,
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct TradeUpdateInput {
    /// Frame 1 only; up to `MAX_TRADE_IDS` ids.
    pub trade_id: Vec<i64>,
    pub acct_id: i64,
    pub max_acct_id: i64,
    /// Which of the three frames to run (1..=3).
    pub frame_to_execute: i32,
    pub max_trades: i32,
    pub max_updates: i32,
    pub end_trade_dts: NaiveDateTime,
    pub start_trade_dts: NaiveDateTime,
    pub symbol: String,
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct DataMaintenanceInput {
    pub acct_id: i64,
    pub c_id: i64,
    pub co_id: i64,
    pub day_of_month: i32,
    pub vol_incr: i32,
    pub symbol: String,
    pub table_name: String,
    pub tx_id: String,
}

/// Trade Cleanup: cancel every pending or submitted trade at or after
/// `start_trade_id`.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct TradeCleanupInput {
    pub start_trade_id: i64,
    pub st_canceled_id: String,
    pub st_pending_id: String,
    pub st_submitted_id: String,
}
