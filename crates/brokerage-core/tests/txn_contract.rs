// crates/brokerage-core/tests/txn_contract.rs
//
// Drives the executors through `TxnRunner` against a scripted storage
// connection that records every call, and checks the transaction
// contract: isolation on open, one begin and one close per transaction,
// caller rollback, and market sends only after commit.

use std::collections::HashMap;
use std::sync::{Arc, Mutex};

use brokerage_core::status;
use brokerage_core::{
    frame_table, BrokerVolumeInput, DataMaintenanceInput, FrameCall, FrameId, FramePosition,
    IsolationLevel, MarketFeedInput, MarketSink, MeeAction, QueryResult, Row, StorageConnection,
    StorageError, TickerEntry, TradeOrderInput, TradeRequest, TradeResultInput,
    TradeStatusInput, TxnInput, TxnOutput, TxnRunner, TxnType, Value,
};
use chrono::NaiveDate;

#[derive(Debug, Clone, PartialEq)]
enum Event {
    Begin,
    Isolation(IsolationLevel),
    Execute(FrameId),
    Commit,
    Rollback,
    Send(i64),
}

type Log = Arc<Mutex<Vec<Event>>>;

/// Answers each frame with a canned result; frames without an answer fail.
struct Scripted {
    log: Log,
    answers: HashMap<FrameId, QueryResult>,
    panic_at: Option<FrameId>,
}

impl StorageConnection for Scripted {
    fn begin(&mut self) -> Result<(), StorageError> {
        self.log.lock().unwrap().push(Event::Begin);
        Ok(())
    }

    fn set_isolation(&mut self, level: IsolationLevel) -> Result<(), StorageError> {
        self.log.lock().unwrap().push(Event::Isolation(level));
        Ok(())
    }

    fn execute(&mut self, call: &FrameCall) -> Result<QueryResult, StorageError> {
        self.log.lock().unwrap().push(Event::Execute(call.frame));
        if self.panic_at == Some(call.frame) {
            panic!("storage blew up in {}", call.frame);
        }
        self.answers
            .get(&call.frame)
            .cloned()
            .ok_or_else(|| StorageError::Execute {
                frame: call.frame,
                reason: "no scripted answer".to_string(),
            })
    }

    fn commit(&mut self) -> Result<(), StorageError> {
        self.log.lock().unwrap().push(Event::Commit);
        Ok(())
    }

    fn rollback(&mut self) -> Result<(), StorageError> {
        self.log.lock().unwrap().push(Event::Rollback);
        Ok(())
    }
}

struct RecordingSink {
    log: Log,
    sent: Arc<Mutex<Vec<TradeRequest>>>,
    fail_ids: Vec<i64>,
}

impl MarketSink for RecordingSink {
    fn send_to_market(&mut self, req: &TradeRequest) -> bool {
        self.log.lock().unwrap().push(Event::Send(req.trade_id));
        if self.fail_ids.contains(&req.trade_id) {
            return false;
        }
        self.sent.lock().unwrap().push(req.clone());
        true
    }
}

struct Harness {
    log: Log,
    sent: Arc<Mutex<Vec<TradeRequest>>>,
    runner: TxnRunner,
}

fn harness(answers: Vec<(FrameId, QueryResult)>, fail_ids: Vec<i64>) -> Harness {
    build_harness(answers, fail_ids, None)
}

fn build_harness(
    answers: Vec<(FrameId, QueryResult)>,
    fail_ids: Vec<i64>,
    panic_at: Option<FrameId>,
) -> Harness {
    let log: Log = Arc::default();
    let sent = Arc::default();
    let conn = Scripted {
        log: Arc::clone(&log),
        answers: answers.into_iter().collect(),
        panic_at,
    };
    let sink = RecordingSink {
        log: Arc::clone(&log),
        sent: Arc::clone(&sent),
        fail_ids,
    };
    Harness {
        runner: TxnRunner::new(Box::new(conn), Box::new(sink)),
        log,
        sent,
    }
}

impl Harness {
    fn events(&self) -> Vec<Event> {
        self.log.lock().unwrap().clone()
    }

    fn sent(&self) -> Vec<TradeRequest> {
        self.sent.lock().unwrap().clone()
    }
}

fn row(values: Vec<Value>) -> Row {
    Row::new(values)
}

fn count_of(events: &[Event], wanted: &Event) -> usize {
    events.iter().filter(|e| *e == wanted).count()
}

// -----------------------------------------------------------------------------
// Frame tables
// -----------------------------------------------------------------------------

#[test]
fn frame_tables_open_with_required_isolation() {
    for ty in TxnType::ALL {
        let frames = frame_table(ty);
        assert!(!frames.is_empty(), "{} has no frames", ty);
        assert_eq!(frames[0].isolation, ty.required_isolation(), "{}", ty);
        for f in frames {
            assert_eq!(f.isolation, ty.required_isolation(), "{} {}", ty, f.id);
        }
    }
}

#[test]
fn multi_frame_types_open_once_and_commit_last() {
    for ty in [
        TxnType::CustomerPosition,
        TxnType::TradeOrder,
        TxnType::TradeResult,
    ] {
        let frames = frame_table(ty);
        let opens = frames.iter().filter(|f| f.position.opens()).count();
        assert_eq!(opens, 1, "{}", ty);
        assert_eq!(frames[0].position, FramePosition::Begin, "{}", ty);
        assert!(frames.last().unwrap().position.commits(), "{}", ty);
    }
}

// -----------------------------------------------------------------------------
// Broker Volume
// -----------------------------------------------------------------------------

fn broker_volume(n: usize) -> TxnInput {
    TxnInput::BrokerVolume(BrokerVolumeInput {
        broker_list: (0..n).map(|i| format!("Broker {}", i)).collect(),
        sector_name: "Technology".to_string(),
    })
}

#[test]
fn broker_volume_runs_one_frame_under_read_committed() {
    let answer = QueryResult::single(vec![
        row(vec![Value::from("Broker 1"), Value::from(900.0)]),
        row(vec![Value::from("Broker 0"), Value::from(100.0)]),
    ]);
    let mut h = harness(vec![(FrameId::BrokerVolume1, answer)], vec![]);

    let result = h.runner.run(&broker_volume(2));
    assert_eq!(result.status, status::SUCCESS);
    assert_eq!(
        h.events(),
        vec![
            Event::Begin,
            Event::Isolation(IsolationLevel::ReadCommitted),
            Event::Execute(FrameId::BrokerVolume1),
            Event::Commit,
        ]
    );
    match result.output {
        Some(TxnOutput::BrokerVolume(out)) => {
            assert_eq!(out.list_len, 2);
            assert_eq!(out.broker_name[0], "Broker 1");
        }
        other => panic!("unexpected output {:?}", other),
    }
}

#[test]
fn broker_volume_too_many_rows_rolls_back() {
    let rows = (0..41)
        .map(|i| row(vec![Value::from(format!("Broker {}", i)), Value::from(1.0)]))
        .collect();
    let answer = QueryResult::single(rows);
    let mut h = harness(vec![(FrameId::BrokerVolume1, answer)], vec![]);

    let result = h.runner.run(&broker_volume(41));
    assert_eq!(result.status, status::BROKER_VOLUME_BAD_LIST_LEN);
    let events = h.events();
    assert_eq!(count_of(&events, &Event::Commit), 0);
    assert_eq!(count_of(&events, &Event::Rollback), 1);
}

// -----------------------------------------------------------------------------
// Trade Order
// -----------------------------------------------------------------------------

fn trade_order_answers(trade_id: i64, type_is_market: bool) -> Vec<(FrameId, QueryResult)> {
    vec![
        (
            FrameId::TradeOrder1,
            QueryResult::single(vec![row(vec![
                Value::from("Joint Account"),
                Value::from(4300000001_i64),
                Value::from(4300000002_i64),
                Value::from(1),
                Value::from("Ann"),
                Value::from("Lee"),
                Value::from(1),
                Value::from("123-45-6789"),
                Value::from("Broker 1"),
            ])]),
        ),
        (
            FrameId::TradeOrder3,
            QueryResult::single(vec![row(vec![
                Value::from("IBM"),
                Value::from("IBM Common"),
                Value::from("International Business Machines"),
                Value::from(25.0),
                Value::from(type_is_market),
                Value::from(false),
                Value::from(25.0),
                Value::from(0.0),
                Value::from(0.0),
                Value::from(0.0),
                Value::from(0.5),
                Value::from(10.0),
                Value::from(if type_is_market { "SBMT" } else { "PNDG" }),
            ])]),
        ),
        (
            FrameId::TradeOrder4,
            QueryResult::single(vec![row(vec![Value::from(trade_id)])]),
        ),
    ]
}

fn trade_order(tt: &str, roll_it_back: bool) -> TxnInput {
    TxnInput::TradeOrder(TradeOrderInput {
        requested_price: 25.0,
        acct_id: 43000000001,
        is_lifo: true,
        roll_it_back,
        trade_qty: 200,
        type_is_margin: false,
        co_name: String::new(),
        exec_f_name: "Ann".to_string(),
        exec_l_name: "Lee".to_string(),
        exec_tax_id: "123-45-6789".to_string(),
        issue: "COMMON".to_string(),
        st_pending_id: "PNDG".to_string(),
        st_submitted_id: "SBMT".to_string(),
        symbol: "IBM".to_string(),
        trade_type_id: tt.to_string(),
    })
}

#[test]
fn market_trade_order_sends_once_after_commit() {
    let mut h = harness(trade_order_answers(200000000000001, true), vec![]);

    let result = h.runner.run(&trade_order("TMB", false));
    assert_eq!(result.status, status::SUCCESS);
    assert_eq!(result.failed_sends, 0);

    let events = h.events();
    assert_eq!(
        events,
        vec![
            Event::Begin,
            Event::Isolation(IsolationLevel::RepeatableRead),
            Event::Execute(FrameId::TradeOrder1),
            Event::Execute(FrameId::TradeOrder3),
            Event::Execute(FrameId::TradeOrder4),
            Event::Commit,
            Event::Send(200000000000001),
        ]
    );

    let sent = h.sent();
    assert_eq!(sent.len(), 1);
    assert_eq!(sent[0].action, MeeAction::ProcessOrder);
    assert_eq!(sent[0].trade_type_id, "TMB");
    assert_eq!(sent[0].trade_qty, 200);
}

#[test]
fn limit_trade_order_sets_trigger() {
    let mut h = harness(trade_order_answers(7, false), vec![]);

    let result = h.runner.run(&trade_order("TLS", false));
    assert_eq!(result.status, status::SUCCESS);
    let sent = h.sent();
    assert_eq!(sent.len(), 1);
    assert_eq!(sent[0].action, MeeAction::SetLimitOrderTrigger);
}

#[test]
fn roll_it_back_succeeds_without_market_send() {
    let mut h = harness(trade_order_answers(9, true), vec![]);

    let result = h.runner.run(&trade_order("TMB", true));
    assert_eq!(result.status, status::SUCCESS);
    match result.output {
        Some(TxnOutput::TradeOrder(out)) => assert!(out.rolled_back),
        other => panic!("unexpected output {:?}", other),
    }
    let events = h.events();
    assert_eq!(count_of(&events, &Event::Rollback), 1);
    assert_eq!(count_of(&events, &Event::Commit), 0);
    assert!(h.sent().is_empty());
}

#[test]
fn unknown_account_is_rolled_back_by_caller() {
    let mut answers = trade_order_answers(9, true);
    answers[0].1 = QueryResult::single(vec![]);
    let mut h = harness(answers, vec![]);

    let result = h.runner.run(&trade_order("TMB", false));
    assert_eq!(result.status, status::TRADE_ORDER_ACCOUNT_NOT_FOUND);
    let events = h.events();
    assert_eq!(events.last(), Some(&Event::Rollback));
    assert!(h.sent().is_empty());
    assert!(!h.runner.session().is_open());
}

#[test]
fn storage_fault_becomes_expected_rollback() {
    // No answer for frame 3: the scripted storage errors out mid-transaction.
    let mut answers = trade_order_answers(9, true);
    answers.remove(1);
    let mut h = harness(answers, vec![]);

    let result = h.runner.run(&trade_order("TMB", false));
    assert_eq!(result.status, status::EXPECTED_ROLLBACK);
    assert!(result.output.is_none());
    let events = h.events();
    assert_eq!(count_of(&events, &Event::Begin), 1);
    assert_eq!(events.last(), Some(&Event::Rollback));
    assert!(h.sent().is_empty());
}

#[test]
fn storage_panic_becomes_expected_rollback() {
    let mut answers = trade_order_answers(9, true);
    answers.push((FrameId::BrokerVolume1, QueryResult::single(vec![])));
    let mut h = build_harness(answers, vec![], Some(FrameId::TradeOrder3));

    let result = h.runner.run(&trade_order("TMB", false));
    assert_eq!(result.status, status::EXPECTED_ROLLBACK);
    assert!(result.output.is_none());
    let events = h.events();
    assert_eq!(count_of(&events, &Event::Begin), 1);
    assert_eq!(events.last(), Some(&Event::Rollback));
    assert!(h.sent().is_empty());
    assert!(!h.runner.session().is_open());

    // The runner keeps serving.
    assert_eq!(h.runner.run(&broker_volume(1)).status, status::SUCCESS);
}

#[test]
fn runner_is_reusable_after_a_failure() {
    let mut answers = trade_order_answers(9, true);
    answers[0].1 = QueryResult::single(vec![]);
    answers.push((
        FrameId::BrokerVolume1,
        QueryResult::single(vec![]),
    ));
    let mut h = harness(answers, vec![]);

    assert_eq!(
        h.runner.run(&trade_order("TMB", false)).status,
        status::TRADE_ORDER_ACCOUNT_NOT_FOUND
    );
    assert_eq!(h.runner.run(&broker_volume(1)).status, status::SUCCESS);
    assert_eq!(count_of(&h.events(), &Event::Begin), 2);
}

// -----------------------------------------------------------------------------
// Market Feed
// -----------------------------------------------------------------------------

fn feed(symbols: &[&str]) -> TxnInput {
    TxnInput::MarketFeed(MarketFeedInput {
        entries: symbols
            .iter()
            .map(|s| TickerEntry {
                price_quote: 24.0,
                trade_qty: 100,
                symbol: s.to_string(),
            })
            .collect(),
        status_submitted: "SBMT".to_string(),
        type_limit_buy: "TLB".to_string(),
        type_limit_sell: "TLS".to_string(),
        type_stop_loss: "TSL".to_string(),
    })
}

fn triggered(trade_id: i64) -> Row {
    row(vec![
        Value::from("IBM"),
        Value::from(trade_id),
        Value::from(24.5),
        Value::from(100),
        Value::from("TLB"),
    ])
}

#[test]
fn market_feed_sends_each_triggered_order_once() {
    let answer = QueryResult::single(vec![triggered(11), triggered(12)]).with_affected(2);
    let mut h = harness(vec![(FrameId::MarketFeed1, answer)], vec![]);

    let result = h.runner.run(&feed(&["IBM", "AAPL"]));
    assert_eq!(result.status, status::SUCCESS);
    let sent = h.sent();
    assert_eq!(sent.iter().map(|r| r.trade_id).collect::<Vec<_>>(), vec![11, 12]);
    assert!(sent.iter().all(|r| r.action == MeeAction::ProcessOrder));

    let events = h.events();
    let commit_at = events.iter().position(|e| *e == Event::Commit).unwrap();
    let first_send = events
        .iter()
        .position(|e| matches!(e, Event::Send(_)))
        .unwrap();
    assert!(commit_at < first_send);
}

#[test]
fn failed_send_does_not_stop_remaining_sends() {
    let answer = QueryResult::single(vec![triggered(11), triggered(12)]).with_affected(1);
    let mut h = harness(vec![(FrameId::MarketFeed1, answer)], vec![11]);

    let result = h.runner.run(&feed(&["IBM"]));
    assert_eq!(result.status, status::SUCCESS);
    assert_eq!(result.failed_sends, 1);
    assert_eq!(h.sent().len(), 1);
    assert_eq!(count_of(&h.events(), &Event::Send(12)), 1);
}

#[test]
fn market_feed_missing_updates_rolls_back_without_sends() {
    let answer = QueryResult::single(vec![triggered(11)]).with_affected(1);
    let mut h = harness(vec![(FrameId::MarketFeed1, answer)], vec![]);

    let result = h.runner.run(&feed(&["IBM", "AAPL"]));
    assert_eq!(result.status, status::MARKET_FEED_NOT_ALL_UPDATED);
    assert!(h.sent().is_empty());
    assert_eq!(count_of(&h.events(), &Event::Rollback), 1);
}

// -----------------------------------------------------------------------------
// Trade Result
// -----------------------------------------------------------------------------

fn trade_result_answers(tax_status: i32, tax: f64, comm_rate: f64) -> Vec<(FrameId, QueryResult)> {
    let dts = NaiveDate::from_ymd_opt(2024, 3, 1)
        .unwrap()
        .and_hms_opt(10, 0, 0)
        .unwrap();
    vec![
        (
            FrameId::TradeResult1,
            QueryResult::single(vec![row(vec![
                Value::from(43000000001_i64),
                Value::from("TMS"),
                Value::from("IBM"),
                Value::from(100),
                Value::from(5.0),
                Value::from(true),
                Value::from(true),
                Value::from("Market-Sell"),
                Value::from(true),
                Value::from(true),
                Value::from(100),
            ])]),
        ),
        (
            FrameId::TradeResult2,
            QueryResult::single(vec![row(vec![
                Value::from(4300000001_i64),
                Value::from(2000.0),
                Value::from(2500.0),
                Value::from(4300000002_i64),
                Value::from(tax_status),
                Value::from(dts),
            ])]),
        ),
        (
            FrameId::TradeResult3,
            QueryResult::single(vec![row(vec![Value::from(tax)])]),
        ),
        (
            FrameId::TradeResult4,
            QueryResult::single(vec![row(vec![Value::from(comm_rate), Value::from("IBM Common")])]),
        ),
        (FrameId::TradeResult5, QueryResult::empty()),
        (
            FrameId::TradeResult6,
            QueryResult::single(vec![row(vec![Value::from(10_000.0)])]),
        ),
    ]
}

fn trade_result() -> TxnInput {
    TxnInput::TradeResult(TradeResultInput {
        trade_price: 25.0,
        trade_id: 55,
    })
}

#[test]
fn trade_result_settles_sale() {
    let mut h = harness(trade_result_answers(1, 100.0, 0.4), vec![]);

    let result = h.runner.run(&trade_result());
    assert_eq!(result.status, status::SUCCESS);
    let out = match result.output {
        Some(TxnOutput::TradeResult(out)) => out,
        other => panic!("unexpected output {:?}", other),
    };
    // 100 x 25.00 = 2500; commission 0.4% = 10; charge 5; tax 100.
    assert_eq!(out.comm_amount, 10.0);
    assert_eq!(out.se_amount, 2500.0 - 5.0 - 10.0 - 100.0);
    assert_eq!(out.acct_bal, 10_000.0);

    let events = h.events();
    assert_eq!(events[1], Event::Isolation(IsolationLevel::Serializable));
    assert_eq!(count_of(&events, &Event::Execute(FrameId::TradeResult3)), 1);
    assert_eq!(events.last(), Some(&Event::Commit));
}

#[test]
fn trade_result_skips_tax_frame_for_untaxed_account() {
    let mut h = harness(trade_result_answers(0, 0.0, 0.4), vec![]);

    let result = h.runner.run(&trade_result());
    assert_eq!(result.status, status::SUCCESS);
    assert_eq!(count_of(&h.events(), &Event::Execute(FrameId::TradeResult3)), 0);
}

#[test]
fn trade_result_bad_tax_is_rolled_back_by_caller() {
    let mut h = harness(trade_result_answers(2, 0.0, 0.4), vec![]);

    let result = h.runner.run(&trade_result());
    assert_eq!(result.status, status::TRADE_RESULT_BAD_TAX);
    let events = h.events();
    assert_eq!(events.last(), Some(&Event::Rollback));
    assert_eq!(count_of(&events, &Event::Execute(FrameId::TradeResult4)), 0);
}

#[test]
fn trade_result_bad_comm_rate() {
    let mut h = harness(trade_result_answers(0, 0.0, 0.0), vec![]);
    assert_eq!(
        h.runner.run(&trade_result()).status,
        status::TRADE_RESULT_BAD_COMM_RATE
    );
}

// -----------------------------------------------------------------------------
// Single-frame edge cases
// -----------------------------------------------------------------------------

#[test]
fn trade_status_without_trades_fails() {
    let answer = QueryResult {
        result_sets: vec![
            vec![row(vec![
                Value::from("Lee"),
                Value::from("Ann"),
                Value::from("Broker 1"),
            ])],
            vec![],
        ],
        affected: 0,
    };
    let mut h = harness(vec![(FrameId::TradeStatus1, answer)], vec![]);

    let result = h.runner.run(&TxnInput::TradeStatus(TradeStatusInput { acct_id: 1 }));
    assert_eq!(result.status, status::TRADE_STATUS_BAD_COUNT);
    assert_eq!(count_of(&h.events(), &Event::Rollback), 1);
}

#[test]
fn data_maintenance_unknown_table_never_opens() {
    let mut h = harness(vec![], vec![]);

    let result = h.runner.run(&TxnInput::DataMaintenance(DataMaintenanceInput {
        table_name: "NOT_A_TABLE".to_string(),
        ..DataMaintenanceInput::default()
    }));
    assert_eq!(result.status, status::DATA_MAINTENANCE_UNKNOWN_TABLE);
    assert!(h.events().is_empty());
}
