//! Core types used throughout PriceWatch
//!
//! Trading pairs, market keys, quote sides and price-move directions.

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use std::fmt;

/// Trading pair identifier as the exchange names it (e.g. "BTC-USDT")
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct TradingPair(String);

impl TradingPair {
    pub fn new(symbol: impl Into<String>) -> Self {
        Self(symbol.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for TradingPair {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for TradingPair {
    fn from(s: &str) -> Self {
        Self::new(s)
    }
}

/// One trading pair on one exchange
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct MarketKey {
    pub exchange: String,
    pub pair: TradingPair,
}

impl MarketKey {
    pub fn new(exchange: impl Into<String>, pair: TradingPair) -> Self {
        Self {
            exchange: exchange.into(),
            pair,
        }
    }
}

impl fmt::Display for MarketKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}@{}", self.pair, self.exchange)
    }
}

/// Book side to price against.
///
/// A buyer pays the best ask, a seller receives the best bid.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Side {
    Buy,
    Sell,
}

impl fmt::Display for Side {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Side::Buy => write!(f, "BUY"),
            Side::Sell => write!(f, "SELL"),
        }
    }
}

/// Direction of a price move
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Direction {
    Up,
    Down,
}

impl Direction {
    /// Classify a signed percentage change. A flat move has no direction.
    pub fn from_change(pct: Decimal) -> Option<Self> {
        if pct.is_sign_positive() && !pct.is_zero() {
            Some(Direction::Up)
        } else if pct.is_sign_negative() && !pct.is_zero() {
            Some(Direction::Down)
        } else {
            None
        }
    }
}

impl fmt::Display for Direction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Direction::Up => write!(f, "UP"),
            Direction::Down => write!(f, "DOWN"),
        }
    }
}

/// Top of book for one pair at one tick
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Quote {
    /// Best bid price
    pub bid: Decimal,
    /// Mid price
    pub mid: Decimal,
    /// Best ask price
    pub ask: Decimal,
}

/// Mid price observed for a market at a tick
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PriceSample {
    pub market: MarketKey,
    pub price: Decimal,
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal_macros::dec;

    #[test]
    fn test_direction_from_change() {
        assert_eq!(Direction::from_change(dec!(1.5)), Some(Direction::Up));
        assert_eq!(Direction::from_change(dec!(-2.0)), Some(Direction::Down));
        assert_eq!(Direction::from_change(dec!(0)), None);
        assert_eq!(Direction::from_change(dec!(-0.00)), None);
    }

    #[test]
    fn test_market_key_display() {
        let key = MarketKey::new("binance", TradingPair::from("BTC-USDT"));
        assert_eq!(key.to_string(), "BTC-USDT@binance");
    }
}
