//! Deterministic price source for the exchange.
//!
//! Every symbol follows the same triangle wave between `low` and `high`,
//! shifted by a phase derived from the symbol so that different symbols
//! sit at different points of the cycle.

use std::time::Duration;

#[derive(Debug, Clone)]
pub struct PriceBoard {
    low: f64,
    high: f64,
    period: Duration,
}

impl PriceBoard {
    pub fn new(low: f64, high: f64, period: Duration) -> Self {
        PriceBoard { low, high, period }
    }

    /// Price of `symbol` at `now`, rounded to cents.
    pub fn price(&self, symbol: &str, now: Duration) -> f64 {
        let period_ms = self.period.as_millis().max(1);
        let pos = (now.as_millis() + u128::from(phase(symbol))) % period_ms;
        let t = pos as f64 / period_ms as f64;
        let wave = if t < 0.5 { t * 2.0 } else { 2.0 - t * 2.0 };
        let price = self.low + (self.high - self.low) * wave;
        (price * 100.0).round() / 100.0
    }
}

// FNV-1a
fn phase(symbol: &str) -> u64 {
    symbol.bytes().fold(0xcbf2_9ce4_8422_2325, |h, b| {
        (h ^ u64::from(b)).wrapping_mul(0x0100_0000_01b3)
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    fn board() -> PriceBoard {
        PriceBoard::new(20.0, 30.0, Duration::from_secs(900))
    }

    #[test]
    fn prices_stay_within_bounds() {
        let b = board();
        for secs in (0..1800).step_by(7) {
            for sym in ["AAPL", "ZION", "IBM", "MSFT"] {
                let p = b.price(sym, Duration::from_secs(secs));
                assert!((20.0..=30.0).contains(&p), "{} at {}s: {}", sym, secs, p);
            }
        }
    }

    #[test]
    fn price_is_periodic_and_deterministic() {
        let b = board();
        let t = Duration::from_secs(123);
        assert_eq!(b.price("AAPL", t), b.price("AAPL", t));
        assert_eq!(b.price("AAPL", t), b.price("AAPL", t + Duration::from_secs(900)));
    }

    #[test]
    fn price_moves_over_time() {
        let b = board();
        let prices: Vec<f64> = (0..10)
            .map(|i| b.price("IBM", Duration::from_secs(i * 90)))
            .collect();
        assert!(prices.windows(2).any(|w| w[0] != w[1]));
    }
}
