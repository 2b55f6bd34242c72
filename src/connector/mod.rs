//! Connector module - exchange price access
//!
//! The host owns connectors and hands them to strategies as a map keyed by
//! exchange id. Strategies only ever read prices through the `Connector`
//! trait and turn every fault into a per-pair `FetchFailure`.

mod paper;

pub use paper::{PaperConnector, PaperSettings};

use rust_decimal::Decimal;
use std::collections::BTreeMap;

use crate::error::{ConnectorError, FetchFailure};
use crate::types::{MarketKey, Quote, Side, TradingPair};

/// Read access to one exchange's order books
#[cfg_attr(test, mockall::automock)]
pub trait Connector: Send + Sync {
    /// Mid price for a pair, `Ok(None)` when the book has no price
    fn mid_price(&self, pair: &TradingPair) -> Result<Option<Decimal>, ConnectorError>;

    /// Best price a taker on `side` would trade at
    fn price(&self, pair: &TradingPair, side: Side) -> Result<Option<Decimal>, ConnectorError>;
}

/// Connectors keyed by exchange id, iterated in id order
pub type ConnectorMap = BTreeMap<String, Box<dyn Connector>>;

/// Fetch the mid price for one market
pub fn fetch_mid(connector: &dyn Connector, market: &MarketKey) -> Result<Decimal, FetchFailure> {
    match connector.mid_price(&market.pair) {
        Ok(Some(price)) => Ok(price),
        Ok(None) => Err(FetchFailure::Unavailable {
            market: market.clone(),
        }),
        Err(source) => Err(FetchFailure::Connector {
            market: market.clone(),
            source,
        }),
    }
}

/// Fetch bid, mid and ask for one market. Any missing leg fails the quote.
pub fn fetch_quote(connector: &dyn Connector, market: &MarketKey) -> Result<Quote, FetchFailure> {
    let mid = fetch_mid(connector, market)?;
    let bid = fetch_side(connector, market, Side::Sell)?;
    let ask = fetch_side(connector, market, Side::Buy)?;
    Ok(Quote { bid, mid, ask })
}

fn fetch_side(
    connector: &dyn Connector,
    market: &MarketKey,
    side: Side,
) -> Result<Decimal, FetchFailure> {
    connector
        .price(&market.pair, side)
        .map_err(|source| FetchFailure::Connector {
            market: market.clone(),
            source,
        })?
        .ok_or_else(|| FetchFailure::Unavailable {
            market: market.clone(),
        })
}

/// Look up the connector for an exchange
pub fn connector_for<'a>(
    connectors: &'a ConnectorMap,
    exchange: &str,
) -> Result<&'a dyn Connector, FetchFailure> {
    connectors
        .get(exchange)
        .map(|c| c.as_ref())
        .ok_or_else(|| FetchFailure::MissingConnector {
            exchange: exchange.to_string(),
        })
}
