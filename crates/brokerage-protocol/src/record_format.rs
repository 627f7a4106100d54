//! Human-readable rendering of input records for the error log.
//!
//! One `name=value` pair per field, separated by single spaces, so a
//! failed transaction can be replayed from its log line.

use std::fmt::{Display, Write};

use brokerage_core::TxnInput;

struct Fields {
    out: String,
}

impl Fields {
    fn new(kind: &str) -> Self {
        Fields {
            out: kind.to_string(),
        }
    }

    fn field(mut self, name: &str, value: impl Display) -> Self {
        // Writing into a String cannot fail.
        let _ = write!(self.out, " {}={}", name, value);
        self
    }

    fn text(self, name: &str, value: &str) -> Self {
        let quoted = format!("{:?}", value);
        self.field(name, quoted)
    }

    fn list<T: Display>(self, name: &str, values: &[T]) -> Self {
        let joined = values
            .iter()
            .map(ToString::to_string)
            .collect::<Vec<_>>()
            .join(",");
        self.field(name, format!("[{}]", joined))
    }

    fn finish(self) -> String {
        self.out
    }
}

/// Render every field of `input`, prefixed with its transaction name.
pub fn describe_input(input: &TxnInput) -> String {
    let name = input.txn_type().name();
    match input {
        TxnInput::BrokerVolume(i) => {
            let quoted: Vec<String> = i.broker_list.iter().map(|b| format!("{:?}", b)).collect();
            Fields::new(name)
                .list("broker_list", &quoted)
                .text("sector_name", &i.sector_name)
                .finish()
        }
        TxnInput::CustomerPosition(i) => Fields::new(name)
            .field("acct_id_idx", i.acct_id_idx)
            .field("cust_id", i.cust_id)
            .field("get_history", i.get_history)
            .text("tax_id", &i.tax_id)
            .finish(),
        TxnInput::MarketFeed(i) => {
            let entries: Vec<String> = i
                .entries
                .iter()
                .map(|e| format!("{}@{:.2}x{}", e.symbol, e.price_quote, e.trade_qty))
                .collect();
            Fields::new(name)
                .list("entries", &entries)
                .text("status_submitted", &i.status_submitted)
                .text("type_limit_buy", &i.type_limit_buy)
                .text("type_limit_sell", &i.type_limit_sell)
                .text("type_stop_loss", &i.type_stop_loss)
                .finish()
        }
        TxnInput::MarketWatch(i) => Fields::new(name)
            .field("acct_id", i.acct_id)
            .field("c_id", i.c_id)
            .field("ending_co_id", i.ending_co_id)
            .field("starting_co_id", i.starting_co_id)
            .field("start_day", i.start_day)
            .text("industry_name", &i.industry_name)
            .finish(),
        TxnInput::SecurityDetail(i) => Fields::new(name)
            .field("max_rows_to_return", i.max_rows_to_return)
            .field("access_lob_flag", i.access_lob_flag)
            .field("start_day", i.start_day)
            .text("symbol", &i.symbol)
            .finish(),
        TxnInput::TradeLookup(i) => Fields::new(name)
            .list("trade_id", &i.trade_id)
            .field("acct_id", i.acct_id)
            .field("max_acct_id", i.max_acct_id)
            .field("frame_to_execute", i.frame_to_execute)
            .field("max_trades", i.max_trades)
            .field("end_trade_dts", i.end_trade_dts)
            .field("start_trade_dts", i.start_trade_dts)
            .text("symbol", &i.symbol)
            .finish(),
        TxnInput::TradeOrder(i) => Fields::new(name)
            .field("requested_price", format!("{:.2}", i.requested_price))
            .field("acct_id", i.acct_id)
            .field("is_lifo", i.is_lifo)
            .field("roll_it_back", i.roll_it_back)
            .field("trade_qty", i.trade_qty)
            .field("type_is_margin", i.type_is_margin)
            .text("co_name", &i.co_name)
            .text("exec_f_name", &i.exec_f_name)
            .text("exec_l_name", &i.exec_l_name)
            .text("exec_tax_id", &i.exec_tax_id)
            .text("issue", &i.issue)
            .text("st_pending_id", &i.st_pending_id)
            .text("st_submitted_id", &i.st_submitted_id)
            .text("symbol", &i.symbol)
            .text("trade_type_id", &i.trade_type_id)
            .finish(),
        TxnInput::TradeResult(i) => Fields::new(name)
            .field("trade_price", format!("{:.2}", i.trade_price))
            .field("trade_id", i.trade_id)
            .finish(),
        TxnInput::TradeStatus(i) => Fields::new(name).field("acct_id", i.acct_id).finish(),
        TxnInput::TradeUpdate(i) => Fields::new(name)
            .list("trade_id", &i.trade_id)
            .field("acct_id", i.acct_id)
            .field("max_acct_id", i.max_acct_id)
            .field("frame_to_execute", i.frame_to_execute)
            .field("max_trades", i.max_trades)
            .field("max_updates", i.max_updates)
            .field("end_trade_dts", i.end_trade_dts)
            .field("start_trade_dts", i.start_trade_dts)
            .text("symbol", &i.symbol)
            .finish(),
        TxnInput::DataMaintenance(i) => Fields::new(name)
            .field("acct_id", i.acct_id)
            .field("c_id", i.c_id)
            .field("co_id", i.co_id)
            .field("day_of_month", i.day_of_month)
            .field("vol_incr", i.vol_incr)
            .text("symbol", &i.symbol)
            .text("table_name", &i.table_name)
            .text("tx_id", &i.tx_id)
            .finish(),
        TxnInput::TradeCleanup(i) => Fields::new(name)
            .field("start_trade_id", i.start_trade_id)
            .text("st_canceled_id", &i.st_canceled_id)
            .text("st_pending_id", &i.st_pending_id)
            .text("st_submitted_id", &i.st_submitted_id)
            .finish(),
    }
}
