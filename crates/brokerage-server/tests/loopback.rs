// crates/brokerage-server/tests/loopback.rs
//
// Brokerage House, bridge and Market Exchange wired together over
// loopback TCP on ephemeral ports.

use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::time::Duration;

use brokerage_core::status::{EXPECTED_ROLLBACK, SUCCESS, TRADE_ORDER_ACCOUNT_NOT_FOUND};
use brokerage_core::{
    FrameCall, IsolationLevel, MarketFeedInput, MarketSink, MeeAction, QueryResult,
    StorageConnection, StorageConnector, StorageError, TickerEntry, TradeOrderInput,
    TradeRequest, TradeStatusInput, TxnInput,
};
use brokerage_memstore::{DatasetConfig, MemStore};
use brokerage_protocol::{
    decode_reply, decode_trade_request, encode_request, REPLY_SIZE, REQUEST_SIZE,
    TRADE_REQUEST_SIZE,
};
use brokerage_server::{
    brokerage, market, BrokerageClient, Config, Connection, Listener, MarketHandle,
    MarketSettings, ServerContext, Shutdown, TransportError, TxnLog,
};
use tempfile::TempDir;
use tokio::sync::mpsc;
use tokio::task::JoinHandle;
use tokio::time::{sleep, timeout, Instant};

const WAIT: Duration = Duration::from_secs(5);

fn dataset() -> DatasetConfig {
    DatasetConfig {
        customers: 20,
        ..DatasetConfig::default()
    }
}

struct Harness {
    ctx: Arc<ServerContext>,
    addr: String,
    store: MemStore,
    error_log: PathBuf,
    mix_log: PathBuf,
    server: JoinHandle<anyhow::Result<()>>,
    _dir: TempDir,
}

async fn start_brokerage(market: Option<MarketHandle>) -> Harness {
    let listener = Listener::bind("127.0.0.1:0").await.unwrap();
    start_on(listener, market).await
}

async fn start_on(listener: Listener, market: Option<MarketHandle>) -> Harness {
    start_with(listener, market, Config::default()).await
}

async fn start_with(listener: Listener, market: Option<MarketHandle>, config: Config) -> Harness {
    let addr = listener.local_addr().unwrap().to_string();
    let dir = tempfile::tempdir().unwrap();
    let error_log = dir.path().join("error.log");
    let mix_log = dir.path().join("mix.log");
    let log = TxnLog::open(&error_log, &mix_log, false).unwrap();

    let store = MemStore::generate(&dataset());
    let ctx = ServerContext::new(config, log, Arc::new(store.clone()), market);
    let server = tokio::spawn(brokerage::serve(listener, Arc::clone(&ctx)));

    Harness {
        ctx,
        addr,
        store,
        error_log,
        mix_log,
        server,
        _dir: dir,
    }
}

impl Harness {
    /// Shut down, wait for every worker, return (error log, mix log).
    async fn stop(self) -> (Vec<String>, Vec<String>) {
        self.ctx.shutdown.trigger();
        timeout(WAIT, self.server)
            .await
            .expect("server did not stop")
            .unwrap()
            .unwrap();
        (lines(&self.error_log), lines(&self.mix_log))
    }
}

fn lines(path: &Path) -> Vec<String> {
    std::fs::read_to_string(path)
        .unwrap_or_default()
        .lines()
        .map(str::to_string)
        .collect()
}

/// A stand-in exchange that records every trade request it receives.
async fn fake_exchange() -> (String, mpsc::UnboundedReceiver<TradeRequest>) {
    let listener = Listener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap().to_string();
    let (tx, rx) = mpsc::unbounded_channel();
    tokio::spawn(async move {
        while let Ok((mut conn, _)) = listener.accept().await {
            let tx = tx.clone();
            tokio::spawn(async move {
                while let Ok(buf) = conn.receive(TRADE_REQUEST_SIZE).await {
                    if tx.send(decode_trade_request(&buf).unwrap()).is_err() {
                        break;
                    }
                }
            });
        }
    });
    (addr, rx)
}

fn buy(store: &MemStore, acct_idx: usize, symbol: &str, tt_id: &str, price: f64) -> TxnInput {
    let (acct_id, f_name, l_name, tax_id) = store.read(|t| {
        let acct = &t.accounts[acct_idx];
        let cust = t.customer(acct.c_id).unwrap();
        (
            acct.ca_id,
            cust.f_name.clone(),
            cust.l_name.clone(),
            cust.tax_id.clone(),
        )
    });
    TxnInput::TradeOrder(TradeOrderInput {
        requested_price: price,
        acct_id,
        is_lifo: true,
        trade_qty: 100,
        exec_f_name: f_name,
        exec_l_name: l_name,
        exec_tax_id: tax_id,
        issue: "COMMON".to_string(),
        st_pending_id: "PNDG".to_string(),
        st_submitted_id: "SBMT".to_string(),
        symbol: symbol.to_string(),
        trade_type_id: tt_id.to_string(),
        ..TradeOrderInput::default()
    })
}

/// A symbol no generated limit order waits on.
fn quiet_symbol(store: &MemStore) -> String {
    store.read(|t| {
        t.securities
            .iter()
            .map(|s| s.symbol.clone())
            .find(|sym| t.trade_requests.iter().all(|r| &r.symbol != sym))
            .unwrap()
    })
}

#[tokio::test(flavor = "multi_thread", worker_threads = 2)]
async fn trade_order_reaches_the_exchange_once() {
    let (mee_addr, mut sent) = fake_exchange().await;
    let (handle, _bridge) = MarketHandle::spawn(mee_addr);
    let bh = start_brokerage(Some(handle)).await;
    let symbol = quiet_symbol(&bh.store);

    let mut client = BrokerageClient::connect(&bh.addr).await.unwrap();
    let status = client
        .call(&buy(&bh.store, 0, &symbol, "TMB", 0.0))
        .await
        .unwrap();
    assert_eq!(status, SUCCESS);

    let req = timeout(WAIT, sent.recv()).await.unwrap().unwrap();
    assert_eq!(req.action, MeeAction::ProcessOrder);
    assert_eq!(req.symbol, symbol);
    assert_eq!(req.trade_qty, 100);
    assert!(timeout(Duration::from_millis(300), sent.recv()).await.is_err());

    client.disconnect().await;
    bh.stop().await;
}

#[tokio::test(flavor = "multi_thread", worker_threads = 2)]
async fn market_feed_sends_once_per_triggered_order() {
    let (mee_addr, mut sent) = fake_exchange().await;
    let (handle, _bridge) = MarketHandle::spawn(mee_addr);
    let bh = start_brokerage(Some(handle)).await;
    let symbol = quiet_symbol(&bh.store);

    let mut client = BrokerageClient::connect(&bh.addr).await.unwrap();
    let status = client
        .call(&buy(&bh.store, 1, &symbol, "TLB", 22.0))
        .await
        .unwrap();
    assert_eq!(status, SUCCESS);

    let trigger = timeout(WAIT, sent.recv()).await.unwrap().unwrap();
    assert_eq!(trigger.action, MeeAction::SetLimitOrderTrigger);
    let trade_id = trigger.trade_id;

    let feed = |price: f64| {
        TxnInput::MarketFeed(MarketFeedInput {
            entries: vec![TickerEntry {
                price_quote: price,
                trade_qty: 100,
                symbol: symbol.clone(),
            }],
            status_submitted: "SBMT".to_string(),
            type_limit_buy: "TLB".to_string(),
            type_limit_sell: "TLS".to_string(),
            type_stop_loss: "TSL".to_string(),
        })
    };

    assert_eq!(client.call(&feed(23.0)).await.unwrap(), SUCCESS);
    assert!(timeout(Duration::from_millis(300), sent.recv()).await.is_err());

    assert_eq!(client.call(&feed(21.0)).await.unwrap(), SUCCESS);
    let fired = timeout(WAIT, sent.recv()).await.unwrap().unwrap();
    assert_eq!(fired.trade_id, trade_id);
    assert_eq!(fired.action, MeeAction::ProcessOrder);

    // Already released: a second qualifying quote sends nothing.
    assert_eq!(client.call(&feed(20.5)).await.unwrap(), SUCCESS);
    assert!(timeout(Duration::from_millis(300), sent.recv()).await.is_err());

    client.disconnect().await;
    bh.stop().await;
}

#[tokio::test(flavor = "multi_thread", worker_threads = 2)]
async fn market_order_completes_through_the_exchange() {
    let bh_listener = Listener::bind("127.0.0.1:0").await.unwrap();
    let bh_addr = bh_listener.local_addr().unwrap().to_string();
    let mee_listener = Listener::bind("127.0.0.1:0").await.unwrap();
    let mee_addr = mee_listener.local_addr().unwrap().to_string();

    let mee_shutdown = Shutdown::new();
    let settings = MarketSettings {
        trading_floor_delay_ms: 20,
        feed_batch_size: 1,
        tick_interval_ms: 10,
        ..MarketSettings::default()
    };
    let mee = tokio::spawn(market::serve(
        mee_listener,
        settings,
        bh_addr,
        mee_shutdown.subscribe(),
    ));

    let (handle, _bridge) = MarketHandle::spawn(mee_addr);
    let bh = start_on(bh_listener, Some(handle)).await;
    let symbol = quiet_symbol(&bh.store);
    let first_new = bh.store.read(|t| t.next_trade_id);

    let mut client = BrokerageClient::connect(&bh.addr).await.unwrap();
    let status = client
        .call(&buy(&bh.store, 2, &symbol, "TMB", 0.0))
        .await
        .unwrap();
    assert_eq!(status, SUCCESS);

    let trade_id = bh
        .store
        .read(|t| t.trades.range(first_new..).map(|(id, _)| *id).next())
        .unwrap();

    let deadline = Instant::now() + WAIT;
    loop {
        let done = bh.store.read(|t| t.trades[&trade_id].st_id == "CMPT");
        if done {
            break;
        }
        assert!(Instant::now() < deadline, "trade {} never completed", trade_id);
        sleep(Duration::from_millis(20)).await;
    }

    // The execution also went out on the ticker.
    let deadline = Instant::now() + WAIT;
    while bh.store.read(|t| t.last_trade[&symbol].vol) < 100 {
        assert!(Instant::now() < deadline, "no market feed for {}", symbol);
        sleep(Duration::from_millis(20)).await;
    }

    bh.store.read(|t| {
        let completions = t
            .trade_history
            .iter()
            .filter(|h| h.t_id == trade_id && h.st_id == "CMPT")
            .count();
        assert_eq!(completions, 1);
        assert!(t.settlements.contains_key(&trade_id));
    });

    client.disconnect().await;
    mee_shutdown.trigger();
    timeout(WAIT, mee).await.unwrap().unwrap().unwrap();
    let (errors, _) = bh.stop().await;
    assert!(errors.is_empty(), "{:?}", errors);
}

#[tokio::test]
async fn disconnect_leaves_no_error_entry() {
    let bh = start_brokerage(None).await;
    let acct_id = bh.store.read(|t| t.accounts[0].ca_id);

    let mut client = BrokerageClient::connect(&bh.addr).await.unwrap();
    let status = client
        .call(&TxnInput::TradeStatus(TradeStatusInput { acct_id }))
        .await
        .unwrap();
    assert_eq!(status, SUCCESS);
    client.disconnect().await;

    let deadline = Instant::now() + WAIT;
    while bh.ctx.active_workers().await > 0 {
        assert!(Instant::now() < deadline, "worker never noticed the disconnect");
        sleep(Duration::from_millis(10)).await;
    }

    let (errors, mix) = bh.stop().await;
    assert!(errors.is_empty(), "{:?}", errors);
    assert_eq!(mix.len(), 1);
    assert!(mix[0].contains(" 0 TRADE_STATUS "));
}

#[tokio::test]
async fn unknown_tag_gets_no_reply() {
    let bh = start_brokerage(None).await;

    let mut conn = Connection::connect(&bh.addr).await.unwrap();
    let mut request = vec![0u8; REQUEST_SIZE];
    request[..4].copy_from_slice(&99i32.to_be_bytes());
    conn.send(&request).await.unwrap();

    let reply = timeout(WAIT, conn.receive(REPLY_SIZE)).await.unwrap();
    assert_eq!(reply, Err(TransportError::Closed));

    let (errors, mix) = bh.stop().await;
    assert_eq!(errors.len(), 1);
    assert!(errors[0].contains("decode request"));
    assert!(mix.is_empty());
}

#[tokio::test]
async fn pipelined_requests_are_answered_in_order() {
    let bh = start_brokerage(None).await;
    let acct_id = bh.store.read(|t| t.accounts[0].ca_id);

    let mut batch = Vec::new();
    encode_request(&TxnInput::TradeStatus(TradeStatusInput { acct_id }), &mut batch).unwrap();
    let mut bad_order = buy(&bh.store, 0, "AAAA", "TMB", 0.0);
    if let TxnInput::TradeOrder(ref mut o) = bad_order {
        o.acct_id = 1;
    }
    encode_request(&bad_order, &mut batch).unwrap();
    encode_request(&TxnInput::TradeStatus(TradeStatusInput { acct_id }), &mut batch).unwrap();

    let mut conn = Connection::connect(&bh.addr).await.unwrap();
    conn.send(&batch).await.unwrap();

    let mut statuses = Vec::new();
    for _ in 0..3 {
        let reply = timeout(WAIT, conn.receive(REPLY_SIZE)).await.unwrap().unwrap();
        statuses.push(decode_reply(&reply).unwrap());
    }
    assert_eq!(statuses, vec![SUCCESS, TRADE_ORDER_ACCOUNT_NOT_FOUND, SUCCESS]);

    conn.disconnect().await;
    let (errors, mix) = bh.stop().await;
    assert_eq!(errors.len(), 1);
    assert!(errors[0].contains(" -711 TRADE_ORDER "));
    assert!(errors[0].contains(" acct_id=1 "));
    assert_eq!(mix.len(), 3);
}

#[tokio::test]
async fn connections_beyond_max_workers_are_refused() {
    let listener = Listener::bind("127.0.0.1:0").await.unwrap();
    let config = Config {
        max_workers: 1,
        ..Config::default()
    };
    let bh = start_with(listener, None, config).await;
    let acct_id = bh.store.read(|t| t.accounts[0].ca_id);
    let request = TxnInput::TradeStatus(TradeStatusInput { acct_id });

    // Connected back to back, before either worker could register.
    let mut first = BrokerageClient::connect(&bh.addr).await.unwrap();
    let mut second = BrokerageClient::connect(&bh.addr).await.unwrap();

    assert!(timeout(WAIT, second.call(&request)).await.unwrap().is_err());
    assert_eq!(timeout(WAIT, first.call(&request)).await.unwrap().unwrap(), SUCCESS);

    first.disconnect().await;
    let (errors, mix) = bh.stop().await;
    assert!(errors.is_empty(), "{:?}", errors);
    assert_eq!(mix.len(), 1);
}

#[tokio::test]
async fn shutdown_closes_idle_connections() {
    let bh = start_brokerage(None).await;
    let mut conn = Connection::connect(&bh.addr).await.unwrap();

    // Let the worker start waiting on the connection.
    let deadline = Instant::now() + WAIT;
    while bh.ctx.active_workers().await == 0 {
        assert!(Instant::now() < deadline, "worker never started");
        sleep(Duration::from_millis(10)).await;
    }

    let (errors, _) = bh.stop().await;
    assert!(errors.is_empty());
    let reply = timeout(WAIT, conn.receive(REPLY_SIZE)).await.unwrap();
    assert_eq!(reply, Err(TransportError::Closed));
}

#[tokio::test(flavor = "multi_thread", worker_threads = 2)]
async fn bridge_reconnects_on_the_next_request() {
    // Reserve a port, then free it so the first delivery is refused.
    let addr = {
        let scratch = Listener::bind("127.0.0.1:0").await.unwrap();
        scratch.local_addr().unwrap().to_string()
    };
    let (handle, _bridge) = MarketHandle::spawn(addr.clone());

    let request = TradeRequest {
        price_quote: 25.0,
        trade_id: 7,
        trade_qty: 100,
        action: MeeAction::ProcessOrder,
        symbol: "AAAA".to_string(),
        trade_type_id: "TMB".to_string(),
    };
    let send = |mut h: MarketHandle, req: TradeRequest| {
        tokio::task::spawn_blocking(move || {
            let ok = h.send_to_market(&req);
            (h, ok)
        })
    };

    let (handle, ok) = send(handle, request.clone()).await.unwrap();
    assert!(!ok);

    let listener = Listener::bind(&addr).await.unwrap();
    let (sent, accepted) = tokio::join!(send(handle, request.clone()), listener.accept());
    let (_handle, ok) = sent.unwrap();
    assert!(ok);

    let (mut conn, _) = accepted.unwrap();
    let buf = timeout(WAIT, conn.receive(TRADE_REQUEST_SIZE))
        .await
        .unwrap()
        .unwrap();
    assert_eq!(decode_trade_request(&buf).unwrap(), request);
}

/// Storage whose frames panic.
struct Exploding;

impl StorageConnection for Exploding {
    fn begin(&mut self) -> Result<(), StorageError> {
        Ok(())
    }

    fn set_isolation(&mut self, _level: IsolationLevel) -> Result<(), StorageError> {
        Ok(())
    }

    fn execute(&mut self, call: &FrameCall) -> Result<QueryResult, StorageError> {
        panic!("{} exploded", call.frame);
    }

    fn commit(&mut self) -> Result<(), StorageError> {
        Ok(())
    }

    fn rollback(&mut self) -> Result<(), StorageError> {
        Ok(())
    }
}

impl StorageConnector for Exploding {
    fn connect(&self) -> Result<Box<dyn StorageConnection>, StorageError> {
        Ok(Box::new(Exploding))
    }
}

#[tokio::test]
async fn panicking_storage_answers_expected_rollback() {
    let listener = Listener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap().to_string();
    let dir = tempfile::tempdir().unwrap();
    let error_log = dir.path().join("error.log");
    let mix_log = dir.path().join("mix.log");
    let log = TxnLog::open(&error_log, &mix_log, false).unwrap();
    let ctx = ServerContext::new(Config::default(), log, Arc::new(Exploding), None);
    let server = tokio::spawn(brokerage::serve(listener, Arc::clone(&ctx)));

    let mut client = BrokerageClient::connect(&addr).await.unwrap();
    let request = TxnInput::TradeStatus(TradeStatusInput { acct_id: 1 });
    for _ in 0..2 {
        let status = timeout(WAIT, client.call(&request)).await.unwrap().unwrap();
        assert_eq!(status, EXPECTED_ROLLBACK);
    }
    client.disconnect().await;

    ctx.shutdown.trigger();
    timeout(WAIT, server).await.unwrap().unwrap().unwrap();
    let mix = lines(&mix_log);
    assert_eq!(mix.len(), 2);
    assert!(mix.iter().all(|l| l.contains(" -1 TRADE_STATUS ")));
    assert_eq!(lines(&error_log).len(), 2);
}
