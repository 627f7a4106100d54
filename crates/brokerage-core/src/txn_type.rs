//! Transaction-type tags.
//!
//! The ordinal of each variant is part of the wire protocol: the driver,
//! the Brokerage House and any test harness must agree on it.

use std::fmt;

use crate::isolation::IsolationLevel;

/// The twelve brokerage transaction types.
#[repr(i32)]
#[derive(Debug, Copy, Clone, PartialEq, Eq, Hash)]
pub enum TxnType {
    BrokerVolume = 0,
    CustomerPosition = 1,
    MarketFeed = 2,
    MarketWatch = 3,
    SecurityDetail = 4,
    TradeLookup = 5,
    TradeOrder = 6,
    TradeResult = 7,
    TradeStatus = 8,
    TradeUpdate = 9,
    DataMaintenance = 10,
    TradeCleanup = 11,
}

impl TxnType {
    /// Every type, in tag order.
    pub const ALL: [TxnType; 12] = [
        TxnType::BrokerVolume,
        TxnType::CustomerPosition,
        TxnType::MarketFeed,
        TxnType::MarketWatch,
        TxnType::SecurityDetail,
        TxnType::TradeLookup,
        TxnType::TradeOrder,
        TxnType::TradeResult,
        TxnType::TradeStatus,
        TxnType::TradeUpdate,
        TxnType::DataMaintenance,
        TxnType::TradeCleanup,
    ];

    pub fn from_i32(v: i32) -> Option<Self> {
        usize::try_from(v).ok().and_then(|i| Self::ALL.get(i).copied())
    }

    pub fn as_i32(self) -> i32 {
        self as i32
    }

    /// Short upper-case name used in log files.
    pub fn name(self) -> &'static str {
        match self {
            TxnType::BrokerVolume => "BROKER_VOLUME",
            TxnType::CustomerPosition => "CUSTOMER_POSITION",
            TxnType::MarketFeed => "MARKET_FEED",
            TxnType::MarketWatch => "MARKET_WATCH",
            TxnType::SecurityDetail => "SECURITY_DETAIL",
            TxnType::TradeLookup => "TRADE_LOOKUP",
            TxnType::TradeOrder => "TRADE_ORDER",
            TxnType::TradeResult => "TRADE_RESULT",
            TxnType::TradeStatus => "TRADE_STATUS",
            TxnType::TradeUpdate => "TRADE_UPDATE",
            TxnType::DataMaintenance => "DATA_MAINTENANCE",
            TxnType::TradeCleanup => "TRADE_CLEANUP",
        }
    }

    /// Isolation level the first frame of this type must run under.
    pub fn required_isolation(self) -> IsolationLevel {
        match self {
            TxnType::TradeResult => IsolationLevel::Serializable,
            TxnType::TradeOrder | TxnType::TradeUpdate | TxnType::MarketFeed => {
                IsolationLevel::RepeatableRead
            }
            _ => IsolationLevel::ReadCommitted,
        }
    }

    /// Types whose executors may leave a transaction open on a failure
    /// status; the dispatcher issues the rollback for them.
    pub fn caller_rolls_back(self) -> bool {
        matches!(
            self,
            TxnType::CustomerPosition | TxnType::TradeOrder | TxnType::TradeResult
        )
    }
}

impl fmt::Display for TxnType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn ordinals_are_stable() {
        for (i, ty) in TxnType::ALL.iter().enumerate() {
            assert_eq!(ty.as_i32(), i as i32);
            assert_eq!(TxnType::from_i32(i as i32), Some(*ty));
        }
        assert_eq!(TxnType::from_i32(12), None);
        assert_eq!(TxnType::from_i32(-1), None);
    }
}
