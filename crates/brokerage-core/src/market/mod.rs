//! Market Exchange emulation: prices, order handling and the ticker.

pub mod exchange;
pub mod price_board;
pub mod ticker_tape;

pub use exchange::{MarketConfig, MarketError, MarketEvent, MarketExchange};
pub use price_board::PriceBoard;
pub use ticker_tape::TickerTape;
