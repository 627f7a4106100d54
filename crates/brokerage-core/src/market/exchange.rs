//! Market Exchange engine.
//!
//! Pure state machine: the caller passes the time elapsed since start
//! and receives the transactions the exchange wants run against the
//! Brokerage House. No I/O and no clock of its own, so every test can
//! drive it deterministically.

use std::time::Duration;

use thiserror::Error;
use tracing::debug;

use crate::inputs::{MarketFeedInput, TickerEntry, TradeResultInput};
use crate::market::price_board::PriceBoard;
use crate::market::ticker_tape::TickerTape;
use crate::trade_request::{MeeAction, TradeRequest, TradeType};

#[derive(Debug, Clone, PartialEq)]
pub struct MarketConfig {
    pub price_low: f64,
    pub price_high: f64,
    pub price_period: Duration,
    /// Time between accepting an order and reporting its result.
    pub trading_floor_delay: Duration,
    pub feed_batch_size: usize,
    pub feed_flush_interval: Duration,
}

impl Default for MarketConfig {
    fn default() -> Self {
        MarketConfig {
            price_low: 20.0,
            price_high: 30.0,
            price_period: Duration::from_secs(900),
            trading_floor_delay: Duration::from_millis(500),
            feed_batch_size: 20,
            feed_flush_interval: Duration::from_secs(1),
        }
    }
}

/// A transaction the exchange wants executed.
#[derive(Debug, Clone, PartialEq)]
pub enum MarketEvent {
    TradeResult(TradeResultInput),
    MarketFeed(MarketFeedInput),
}

#[derive(Debug, Error, PartialEq, Eq)]
pub enum MarketError {
    #[error("unknown trade type {0:?}")]
    UnknownTradeType(String),
}

#[derive(Debug)]
struct ScheduledResult {
    due: Duration,
    result: TradeResultInput,
}

#[derive(Debug)]
struct LimitOrder {
    trade_type: TradeType,
    request: TradeRequest,
}

#[derive(Debug)]
pub struct MarketExchange {
    config: MarketConfig,
    board: PriceBoard,
    tape: TickerTape,
    /// Ordered by `due`.
    scheduled: Vec<ScheduledResult>,
    limit_orders: Vec<LimitOrder>,
}

impl MarketExchange {
    pub fn new(config: MarketConfig) -> Self {
        MarketExchange {
            board: PriceBoard::new(config.price_low, config.price_high, config.price_period),
            tape: TickerTape::new(config.feed_batch_size, config.feed_flush_interval),
            scheduled: Vec::new(),
            limit_orders: Vec::new(),
            config,
        }
    }

    pub fn config(&self) -> &MarketConfig {
        &self.config
    }

    pub fn price(&self, symbol: &str, now: Duration) -> f64 {
        self.board.price(symbol, now)
    }

    /// Orders waiting for their trigger price.
    pub fn pending_limit_orders(&self) -> usize {
        self.limit_orders.len()
    }

    /// Executions not yet reported back.
    pub fn pending_results(&self) -> usize {
        self.scheduled.len()
    }

    /// Accept one request and return whatever became due.
    pub fn submit_trade_request(
        &mut self,
        req: TradeRequest,
        now: Duration,
    ) -> Result<Vec<MarketEvent>, MarketError> {
        let trade_type = TradeType::from_id(&req.trade_type_id)
            .ok_or_else(|| MarketError::UnknownTradeType(req.trade_type_id.clone()))?;

        match req.action {
            MeeAction::ProcessOrder => self.process_order(trade_type, req, now),
            MeeAction::SetLimitOrderTrigger => {
                debug!(trade_id = req.trade_id, symbol = %req.symbol, "limit order held");
                self.limit_orders.push(LimitOrder {
                    trade_type,
                    request: req,
                });
            }
        }
        Ok(self.tick(now))
    }

    /// Advance to `now`: fire triggers, release due results and feeds.
    pub fn tick(&mut self, now: Duration) -> Vec<MarketEvent> {
        self.check_triggers(now);

        let mut events = Vec::new();
        let due = self.scheduled.partition_point(|s| s.due <= now);
        events.extend(
            self.scheduled
                .drain(..due)
                .map(|s| MarketEvent::TradeResult(s.result)),
        );
        events.extend(self.tape.drain_due(now).into_iter().map(MarketEvent::MarketFeed));
        events
    }

    fn process_order(&mut self, trade_type: TradeType, req: TradeRequest, now: Duration) {
        let price = if trade_type.is_market() {
            self.board.price(&req.symbol, now)
        } else {
            req.price_quote
        };
        debug!(trade_id = req.trade_id, symbol = %req.symbol, price, "order executed");

        let due = now + self.config.trading_floor_delay;
        let at = self.scheduled.partition_point(|s| s.due <= due);
        self.scheduled.insert(
            at,
            ScheduledResult {
                due,
                result: TradeResultInput {
                    trade_price: price,
                    trade_id: req.trade_id,
                },
            },
        );

        self.tape.push(
            TickerEntry {
                price_quote: price,
                trade_qty: req.trade_qty,
                symbol: req.symbol,
            },
            now,
        );
    }

    fn check_triggers(&mut self, now: Duration) {
        let board = &self.board;
        let (fired, held): (Vec<_>, Vec<_>) = self.limit_orders.drain(..).partition(|o| {
            let quote = board.price(&o.request.symbol, now);
            o.trade_type.is_triggered(o.request.price_quote, quote)
        });
        self.limit_orders = held;

        for order in fired {
            debug!(
                trade_id = order.request.trade_id,
                symbol = %order.request.symbol,
                "limit order triggered"
            );
            // The storage-side Market Feed matches pending requests against
            // this entry and sends them back as ProcessOrder.
            self.tape.push(
                TickerEntry {
                    price_quote: order.request.price_quote,
                    trade_qty: order.request.trade_qty,
                    symbol: order.request.symbol,
                },
                now,
            );
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn config() -> MarketConfig {
        MarketConfig {
            trading_floor_delay: Duration::from_millis(100),
            feed_batch_size: 2,
            feed_flush_interval: Duration::from_secs(5),
            ..MarketConfig::default()
        }
    }

    fn request(trade_id: i64, tt: TradeType, price: f64, symbol: &str) -> TradeRequest {
        TradeRequest {
            price_quote: price,
            trade_id,
            trade_qty: 100,
            action: tt.submit_action(),
            symbol: symbol.to_string(),
            trade_type_id: tt.id().to_string(),
        }
    }

    #[test]
    fn market_order_reports_result_after_delay() {
        let mut mee = MarketExchange::new(config());
        let t0 = Duration::from_secs(10);
        let events = mee
            .submit_trade_request(request(7, TradeType::MarketBuy, 0.0, "IBM"), t0)
            .unwrap();
        assert!(events.is_empty());
        assert_eq!(mee.pending_results(), 1);

        let events = mee.tick(t0 + Duration::from_millis(100));
        assert_eq!(events.len(), 1);
        match &events[0] {
            MarketEvent::TradeResult(r) => {
                assert_eq!(r.trade_id, 7);
                assert_eq!(r.trade_price, mee.price("IBM", t0));
            }
            other => panic!("unexpected event {:?}", other),
        }
        assert!(mee.tick(t0 + Duration::from_secs(1)).is_empty());
    }

    #[test]
    fn processed_limit_order_executes_at_requested_price() {
        let mut mee = MarketExchange::new(MarketConfig {
            trading_floor_delay: Duration::ZERO,
            ..config()
        });
        let mut req = request(9, TradeType::LimitBuy, 21.5, "IBM");
        req.action = MeeAction::ProcessOrder;
        let events = mee.submit_trade_request(req, Duration::ZERO).unwrap();
        assert_eq!(
            events,
            vec![MarketEvent::TradeResult(TradeResultInput {
                trade_price: 21.5,
                trade_id: 9,
            })]
        );
    }

    #[test]
    fn limit_order_waits_for_trigger() {
        let mut mee = MarketExchange::new(config());
        // Board never exceeds 30, so a limit sell at 31 holds.
        mee.submit_trade_request(request(1, TradeType::LimitSell, 31.0, "IBM"), Duration::ZERO)
            .unwrap();
        // Board never drops below 20, so a limit buy at 35 fires at once.
        mee.submit_trade_request(request(2, TradeType::LimitBuy, 35.0, "IBM"), Duration::ZERO)
            .unwrap();
        assert_eq!(mee.pending_limit_orders(), 1);
        assert_eq!(mee.pending_results(), 0);

        let events = mee.tick(Duration::from_secs(5));
        assert_eq!(events.len(), 1);
        match &events[0] {
            MarketEvent::MarketFeed(feed) => {
                assert_eq!(feed.entries.len(), 1);
                assert_eq!(feed.entries[0].price_quote, 35.0);
                assert_eq!(feed.type_limit_buy, "TLB");
            }
            other => panic!("unexpected event {:?}", other),
        }
    }

    #[test]
    fn stop_loss_fires_at_or_above_the_stop() {
        let mut mee = MarketExchange::new(config());
        // Board stays within 20..=30.
        mee.submit_trade_request(request(1, TradeType::StopLoss, 31.0, "IBM"), Duration::ZERO)
            .unwrap();
        mee.submit_trade_request(request(2, TradeType::StopLoss, 19.0, "IBM"), Duration::ZERO)
            .unwrap();
        assert_eq!(mee.pending_limit_orders(), 1);

        let events = mee.tick(Duration::from_secs(5));
        assert_eq!(events.len(), 1);
        match &events[0] {
            MarketEvent::MarketFeed(feed) => {
                assert_eq!(feed.entries.len(), 1);
                assert_eq!(feed.entries[0].price_quote, 19.0);
            }
            other => panic!("unexpected event {:?}", other),
        }
    }

    #[test]
    fn feed_emitted_when_batch_full() {
        let mut mee = MarketExchange::new(config());
        let now = Duration::from_secs(1);
        mee.submit_trade_request(request(1, TradeType::MarketBuy, 0.0, "A"), now)
            .unwrap();
        let events = mee
            .submit_trade_request(request(2, TradeType::MarketSell, 0.0, "B"), now)
            .unwrap();
        let feeds: Vec<_> = events
            .iter()
            .filter(|e| matches!(e, MarketEvent::MarketFeed(_)))
            .collect();
        assert_eq!(feeds.len(), 1);
    }

    #[test]
    fn unknown_trade_type_is_rejected() {
        let mut mee = MarketExchange::new(config());
        let mut req = request(1, TradeType::MarketBuy, 0.0, "A");
        req.trade_type_id = "XYZ".to_string();
        assert_eq!(
            mee.submit_trade_request(req, Duration::ZERO),
            Err(MarketError::UnknownTradeType("XYZ".to_string()))
        );
    }
}
