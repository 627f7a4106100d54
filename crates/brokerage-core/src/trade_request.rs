//! Trade requests exchanged between the Brokerage House and the Market
//! Exchange, and the trade types they carry.

use std::fmt;

/// What the exchange should do with a submitted request.
#[repr(i32)]
#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub enum MeeAction {
    /// Execute now (market orders and limit orders that already triggered).
    ProcessOrder = 0,
    /// Hold until the price crosses the requested limit.
    SetLimitOrderTrigger = 1,
}

impl MeeAction {
    pub fn from_i32(v: i32) -> Option<Self> {
        match v {
            0 => Some(MeeAction::ProcessOrder),
            1 => Some(MeeAction::SetLimitOrderTrigger),
            _ => None,
        }
    }
}

/// The unit submitted to the Market Exchange.
#[derive(Debug, Clone, PartialEq)]
pub struct TradeRequest {
    pub price_quote: f64,
    pub trade_id: i64,
    pub trade_qty: i32,
    pub action: MeeAction,
    pub symbol: String,
    pub trade_type_id: String,
}

/// Trade types, keyed by their three-letter id.
#[derive(Debug, Copy, Clone, PartialEq, Eq, Hash)]
pub enum TradeType {
    MarketBuy,
    MarketSell,
    LimitBuy,
    LimitSell,
    StopLoss,
}

impl TradeType {
    pub const ALL: [TradeType; 5] = [
        TradeType::MarketBuy,
        TradeType::MarketSell,
        TradeType::LimitBuy,
        TradeType::LimitSell,
        TradeType::StopLoss,
    ];

    pub fn from_id(id: &str) -> Option<Self> {
        match id {
            "TMB" => Some(TradeType::MarketBuy),
            "TMS" => Some(TradeType::MarketSell),
            "TLB" => Some(TradeType::LimitBuy),
            "TLS" => Some(TradeType::LimitSell),
            "TSL" => Some(TradeType::StopLoss),
            _ => None,
        }
    }

    pub fn id(self) -> &'static str {
        match self {
            TradeType::MarketBuy => "TMB",
            TradeType::MarketSell => "TMS",
            TradeType::LimitBuy => "TLB",
            TradeType::LimitSell => "TLS",
            TradeType::StopLoss => "TSL",
        }
    }

    pub fn name(self) -> &'static str {
        match self {
            TradeType::MarketBuy => "Market-Buy",
            TradeType::MarketSell => "Market-Sell",
            TradeType::LimitBuy => "Limit-Buy",
            TradeType::LimitSell => "Limit-Sell",
            TradeType::StopLoss => "Stop-Loss",
        }
    }

    pub fn is_market(self) -> bool {
        matches!(self, TradeType::MarketBuy | TradeType::MarketSell)
    }

    pub fn is_sell(self) -> bool {
        matches!(
            self,
            TradeType::MarketSell | TradeType::LimitSell | TradeType::StopLoss
        )
    }

    /// Whether a pending order of this type at `requested` executes
    /// against a last-trade `quote`.
    ///
    /// Market orders always qualify. A limit buy needs the quote at or
    /// below the limit; a limit sell and a stop loss need it at or above
    /// the requested price.
    pub fn is_triggered(self, requested: f64, quote: f64) -> bool {
        match self {
            TradeType::MarketBuy | TradeType::MarketSell => true,
            TradeType::LimitBuy => quote <= requested,
            TradeType::LimitSell | TradeType::StopLoss => quote >= requested,
        }
    }

    /// The action a freshly ordered trade of this type is sent with.
    pub fn submit_action(self) -> MeeAction {
        if self.is_market() {
            MeeAction::ProcessOrder
        } else {
            MeeAction::SetLimitOrderTrigger
        }
    }
}

impl fmt::Display for TradeType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.id())
    }
}

/// Trade status ids used throughout the harness.
pub mod status_id {
    pub const COMPLETED: &str = "CMPT";
    pub const ACTIVE: &str = "ACTV";
    pub const SUBMITTED: &str = "SBMT";
    pub const PENDING: &str = "PNDG";
    pub const CANCELED: &str = "CNCL";

    pub fn name(id: &str) -> &'static str {
        match id {
            COMPLETED => "Completed",
            ACTIVE => "Active",
            SUBMITTED => "Submitted",
            PENDING => "Pending",
            CANCELED => "Canceled",
            _ => "Unknown",
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn trigger_rules() {
        assert!(TradeType::LimitBuy.is_triggered(25.0, 24.5));
        assert!(!TradeType::LimitBuy.is_triggered(25.0, 25.5));
        assert!(TradeType::LimitSell.is_triggered(25.0, 25.0));
        assert!(!TradeType::LimitSell.is_triggered(25.0, 24.0));
        assert!(TradeType::StopLoss.is_triggered(20.0, 21.0));
        assert!(TradeType::StopLoss.is_triggered(20.0, 20.0));
        assert!(!TradeType::StopLoss.is_triggered(20.0, 19.0));
        assert!(TradeType::MarketSell.is_triggered(0.0, 99.0));
    }

    #[test]
    fn ids_round_trip() {
        for tt in TradeType::ALL {
            assert_eq!(TradeType::from_id(tt.id()), Some(tt));
        }
        assert_eq!(TradeType::from_id("XXX"), None);
    }
}
