use std::env;
use std::error::Error;

use brokerage_core::{
    BrokerVolumeInput, CustomerPositionInput, MarketWatchInput, SecurityDetailInput,
    TradeLookupInput, TradeOrderInput, TradeStatusInput, TxnInput,
};
use brokerage_memstore::dataset::{self, DatasetConfig};
use brokerage_server::BrokerageClient;
use chrono::Duration;

/// Runs a handful of transactions against a Brokerage House started with
/// the default data set, printing each status.
///
/// The data set is deterministic, so it is regenerated here to pick ids
/// and names the server knows.
#[tokio::main]
async fn main() -> Result<(), Box<dyn Error>> {
    // Where to connect: env override or default.
    let addr = env::var("BH_CLIENT_ADDR").unwrap_or_else(|_| "127.0.0.1:30000".to_string());

    let config = DatasetConfig::default();
    let tables = dataset::generate(&config);
    let base = config.base_date;

    let acct = &tables.accounts[0];
    let owner = tables.customer(acct.c_id).ok_or("first account has no owner")?;
    let symbol = tables.securities[0].symbol.clone();
    let sector = tables
        .sector_of(&symbol)
        .ok_or("first security has no sector")?
        .to_string();
    let trade_ids: Vec<i64> = tables.trades.keys().take(2).copied().collect();

    let requests = vec![
        TxnInput::TradeStatus(TradeStatusInput { acct_id: acct.ca_id }),
        TxnInput::CustomerPosition(CustomerPositionInput {
            acct_id_idx: 0,
            cust_id: owner.c_id,
            get_history: true,
            tax_id: String::new(),
        }),
        TxnInput::MarketWatch(MarketWatchInput {
            c_id: owner.c_id,
            start_day: base - Duration::days(5),
            ..MarketWatchInput::default()
        }),
        TxnInput::SecurityDetail(SecurityDetailInput {
            max_rows_to_return: 10,
            access_lob_flag: false,
            start_day: base - Duration::days(30),
            symbol: symbol.clone(),
        }),
        TxnInput::TradeLookup(TradeLookupInput {
            max_trades: trade_ids.len() as i32,
            trade_id: trade_ids,
            frame_to_execute: 1,
            ..TradeLookupInput::default()
        }),
        TxnInput::BrokerVolume(BrokerVolumeInput {
            broker_list: tables.brokers.iter().map(|b| b.name.clone()).collect(),
            sector_name: sector,
        }),
        TxnInput::TradeOrder(TradeOrderInput {
            acct_id: acct.ca_id,
            exec_f_name: owner.f_name.clone(),
            exec_l_name: owner.l_name.clone(),
            exec_tax_id: owner.tax_id.clone(),
            issue: "COMMON".to_string(),
            st_pending_id: "PNDG".to_string(),
            st_submitted_id: "SBMT".to_string(),
            symbol,
            trade_qty: 100,
            trade_type_id: "TMB".to_string(),
            ..TradeOrderInput::default()
        }),
    ];

    println!("Connecting to {}...", addr);
    let mut client = BrokerageClient::connect(&addr).await?;
    println!("Connected.");

    for input in &requests {
        let status = client.call(input).await?;
        println!("{:<20} -> {}", input.txn_type().to_string(), status);
    }

    client.disconnect().await;
    Ok(())
}
