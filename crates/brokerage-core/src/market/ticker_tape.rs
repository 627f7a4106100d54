//! Batches executions into Market Feed transactions.

use std::mem;
use std::time::Duration;

use crate::inputs::{MarketFeedInput, TickerEntry};
use crate::trade_request::{status_id, TradeType};

#[derive(Debug)]
pub struct TickerTape {
    batch_size: usize,
    flush_interval: Duration,
    entries: Vec<TickerEntry>,
    /// When the oldest unflushed entry was added.
    since: Option<Duration>,
}

impl TickerTape {
    pub fn new(batch_size: usize, flush_interval: Duration) -> Self {
        TickerTape {
            batch_size: batch_size.max(1),
            flush_interval,
            entries: Vec::new(),
            since: None,
        }
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn push(&mut self, entry: TickerEntry, now: Duration) {
        if self.entries.is_empty() {
            self.since = Some(now);
        }
        self.entries.push(entry);
    }

    /// Feeds that are due at `now`: one per full batch, plus the
    /// remainder once it has waited `flush_interval`.
    pub fn drain_due(&mut self, now: Duration) -> Vec<MarketFeedInput> {
        let mut feeds = Vec::new();
        while self.entries.len() >= self.batch_size {
            let rest = self.entries.split_off(self.batch_size);
            let batch = mem::replace(&mut self.entries, rest);
            feeds.push(feed(batch));
            self.since = if self.entries.is_empty() { None } else { Some(now) };
        }
        if let Some(since) = self.since {
            if now.saturating_sub(since) >= self.flush_interval {
                feeds.push(feed(mem::take(&mut self.entries)));
                self.since = None;
            }
        }
        feeds
    }
}

fn feed(entries: Vec<TickerEntry>) -> MarketFeedInput {
    MarketFeedInput {
        entries,
        status_submitted: status_id::SUBMITTED.to_string(),
        type_limit_buy: TradeType::LimitBuy.id().to_string(),
        type_limit_sell: TradeType::LimitSell.id().to_string(),
        type_stop_loss: TradeType::StopLoss.id().to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn entry(symbol: &str) -> TickerEntry {
        TickerEntry {
            price_quote: 25.0,
            trade_qty: 100,
            symbol: symbol.to_string(),
        }
    }

    #[test]
    fn full_batch_flushes_immediately() {
        let mut tape = TickerTape::new(3, Duration::from_secs(60));
        for s in ["A", "B", "C", "D"] {
            tape.push(entry(s), Duration::ZERO);
        }
        let feeds = tape.drain_due(Duration::ZERO);
        assert_eq!(feeds.len(), 1);
        assert_eq!(feeds[0].entries.len(), 3);
        assert_eq!(feeds[0].status_submitted, "SBMT");
        assert_eq!(tape.len(), 1);
    }

    #[test]
    fn partial_batch_waits_for_interval() {
        let mut tape = TickerTape::new(20, Duration::from_secs(1));
        tape.push(entry("A"), Duration::from_millis(100));
        assert!(tape.drain_due(Duration::from_millis(500)).is_empty());
        let feeds = tape.drain_due(Duration::from_millis(1100));
        assert_eq!(feeds.len(), 1);
        assert!(tape.is_empty());
        assert!(tape.drain_due(Duration::from_secs(10)).is_empty());
    }
}
