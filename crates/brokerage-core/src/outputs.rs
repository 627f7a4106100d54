//! Output records produced by the executors.
//!
//! Outputs never travel back over the Brokerage House channel (the reply
//! carries the status only); they are checked by the executors, logged in
//! verbose mode, and the market-bound trade requests they carry are handed
//! to the bridge.

use std::slice;

use chrono::{NaiveDate, NaiveDateTime};

use crate::trade_request::TradeRequest;

#[derive(Debug, Clone, PartialEq)]
pub enum TxnOutput {
    BrokerVolume(BrokerVolumeOutput),
    CustomerPosition(CustomerPositionOutput),
    MarketFeed(MarketFeedOutput),
    MarketWatch(MarketWatchOutput),
    SecurityDetail(SecurityDetailOutput),
    TradeLookup(TradeLookupOutput),
    TradeOrder(TradeOrderOutput),
    TradeResult(TradeResultOutput),
    TradeStatus(TradeStatusOutput),
    TradeUpdate(TradeUpdateOutput),
    DataMaintenance(DataMaintenanceOutput),
    TradeCleanup(TradeCleanupOutput),
}

impl TxnOutput {
    /// Requests that must go to the exchange once the transaction committed.
    pub fn trade_requests(&self) -> &[TradeRequest] {
        match self {
            TxnOutput::MarketFeed(out) => &out.triggered,
            TxnOutput::TradeOrder(out) => match &out.trade_request {
                Some(req) => slice::from_ref(req),
                None => &[],
            },
            _ => &[],
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct BrokerVolumeOutput {
    pub list_len: i32,
    pub broker_name: Vec<String>,
    pub volume: Vec<f64>,
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct PositionHistory {
    pub trade_id: i64,
    pub symbol: String,
    pub qty: i32,
    pub trade_status: String,
    pub hist_dts: NaiveDateTime,
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct CustomerPositionOutput {
    pub c_id: i64,
    pub c_f_name: String,
    pub c_l_name: String,
    pub c_tier: i32,
    pub acct_len: i32,
    pub acct_id: Vec<i64>,
    pub cash_bal: Vec<f64>,
    pub asset_total: Vec<f64>,
    pub hist_len: i32,
    pub history: Vec<PositionHistory>,
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct MarketFeedOutput {
    pub num_updated: i32,
    pub send_len: i32,
    /// Pending orders the batch triggered, ready for the exchange.
    pub triggered: Vec<TradeRequest>,
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct MarketWatchOutput {
    pub pct_change: f64,
    pub stock_count: i32,
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct FinancialRow {
    pub year: i32,
    pub qtr: i32,
    pub revenue: f64,
    pub net_earn: f64,
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct DailyRow {
    pub date: NaiveDate,
    pub close: f64,
    pub high: f64,
    pub low: f64,
    pub vol: i64,
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct NewsRow {
    pub headline: String,
    pub summary: String,
    /// Only filled when the request asked for the large object.
    pub item: Option<String>,
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct SecurityDetailOutput {
    pub s_name: String,
    pub co_name: String,
    pub ceo_name: String,
    pub ex_name: String,
    pub num_out: i64,
    pub pe_ratio: f64,
    pub last_price: f64,
    pub last_open: f64,
    pub last_vol: i64,
    pub fin_len: i32,
    pub fin: Vec<FinancialRow>,
    pub day_len: i32,
    pub day: Vec<DailyRow>,
    pub news_len: i32,
    pub news: Vec<NewsRow>,
}

/// A trade as reported by Trade Lookup and Trade Update.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct TradeInfo {
    pub trade_id: i64,
    pub acct_id: i64,
    pub bid_price: f64,
    pub exec_name: String,
    pub is_cash: bool,
    pub trade_price: f64,
    pub trade_qty: i32,
    pub trade_dts: NaiveDateTime,
    pub trade_type: String,
    /// Settlement cash type or cash-transaction name, when the frame
    /// touched one.
    pub detail: Option<String>,
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct TradeHistoryRow {
    pub trade_id: i64,
    pub dts: NaiveDateTime,
    pub status_id: String,
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct TradeLookupOutput {
    pub frame_executed: i32,
    pub num_found: i32,
    pub trades: Vec<TradeInfo>,
    pub history: Vec<TradeHistoryRow>,
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct TradeOrderOutput {
    pub trade_id: i64,
    pub status_id: String,
    pub type_is_market: bool,
    pub requested_price: f64,
    pub buy_value: f64,
    pub sell_value: f64,
    pub tax_amount: f64,
    pub comm_amount: f64,
    pub charge_amount: f64,
    /// Frame 5 ran: the order was built and then deliberately discarded.
    pub rolled_back: bool,
    /// Set once frame 6 committed.
    pub trade_request: Option<TradeRequest>,
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct TradeResultOutput {
    pub trade_id: i64,
    pub acct_id: i64,
    pub acct_bal: f64,
    pub buy_value: f64,
    pub sell_value: f64,
    pub tax_amount: f64,
    pub comm_amount: f64,
    pub se_amount: f64,
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct StatusTrade {
    pub trade_id: i64,
    pub trade_dts: NaiveDateTime,
    pub status_name: String,
    pub type_name: String,
    pub symbol: String,
    pub trade_qty: i32,
    pub exec_name: String,
    pub charge: f64,
    pub s_name: String,
    pub ex_name: String,
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct TradeStatusOutput {
    pub c_f_name: String,
    pub c_l_name: String,
    pub broker_name: String,
    pub num_found: i32,
    pub trades: Vec<StatusTrade>,
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct TradeUpdateOutput {
    pub frame_executed: i32,
    pub num_found: i32,
    pub num_updated: i32,
    pub trades: Vec<TradeInfo>,
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct DataMaintenanceOutput {
    pub rows_updated: i32,
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct TradeCleanupOutput {
    pub canceled: i32,
}
