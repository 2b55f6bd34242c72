//! Error taxonomy
//!
//! Per-pair faults (`FetchFailure`, `DataQualityError`) are contained inside
//! the tick that produced them. `ConfigError` is fatal and only raised before
//! the first tick.

use rust_decimal::Decimal;
use thiserror::Error;

use crate::types::MarketKey;

/// Fault raised by a connector while reading its book
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ConnectorError {
    #[error("network error: {0}")]
    Network(String),

    #[error("unknown trading pair: {0}")]
    UnknownPair(String),

    #[error("stale order book: {0}")]
    StaleBook(String),

    #[error("other: {0}")]
    Other(String),
}

/// A price could not be obtained for one market this tick
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum FetchFailure {
    #[error("{market}: price not available")]
    Unavailable { market: MarketKey },

    #[error("{market}: {source}")]
    Connector {
        market: MarketKey,
        #[source]
        source: ConnectorError,
    },

    #[error("{exchange}: no connector configured")]
    MissingConnector { exchange: String },
}

impl FetchFailure {
    /// Absent prices are routine; connector faults are not.
    pub fn is_unavailable(&self) -> bool {
        matches!(self, FetchFailure::Unavailable { .. })
    }
}

/// A sample that can be stored but not compared
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum DataQualityError {
    #[error("{market}: previous price is zero, skipping change check (current {current})")]
    ZeroBaseline { market: MarketKey, current: Decimal },

    #[error("{market}: change from {previous} to {current} overflows decimal range")]
    Overflow {
        market: MarketKey,
        previous: Decimal,
        current: Decimal,
    },
}

/// Startup configuration rejected before any tick runs
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ConfigError {
    #[error("{field} must be positive, got {value}")]
    ZeroInterval { field: &'static str, value: u64 },

    #[error("alert threshold must be positive, got {0}")]
    NonPositiveThreshold(Decimal),

    #[error("no markets configured")]
    NoMarkets,

    #[error("exchange {0} has no trading pairs")]
    EmptyExchange(String),

    #[error("exchange {0} lists an empty trading pair")]
    EmptyPair(String),

    #[error("exchange {0} has no connector")]
    MissingConnector(String),

    #[error("unknown strategy {0:?} (expected price_logger or price_monitor)")]
    UnknownStrategy(String),

    #[error("paper connector: {0}")]
    Paper(String),
}
