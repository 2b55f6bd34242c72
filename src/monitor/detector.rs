//! Change detector - compares each mid price with the last one seen
//!
//! Every market is either unseen (no entry in the table) or tracked. The
//! first successful sample moves it to tracked without alerting; every later
//! sample is compared against the stored price and then replaces it.

use rust_decimal::Decimal;
use rust_decimal_macros::dec;
use std::collections::BTreeMap;

use crate::error::{ConfigError, DataQualityError};
use crate::types::{Direction, MarketKey};

const ONE_HUNDRED: Decimal = dec!(100);

/// Price move that met the alert threshold
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PriceAlert {
    pub market: MarketKey,
    pub direction: Direction,
    /// Signed percentage change
    pub pct: Decimal,
    pub previous: Decimal,
    pub current: Decimal,
}

/// Most recently observed mid price per market
#[derive(Debug, Clone, Default)]
pub struct LastPriceTable {
    prices: BTreeMap<MarketKey, Decimal>,
}

impl LastPriceTable {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn get(&self, market: &MarketKey) -> Option<Decimal> {
        self.prices.get(market).copied()
    }

    /// Store a price, returning the one it replaced
    pub fn record(&mut self, market: MarketKey, price: Decimal) -> Option<Decimal> {
        self.prices.insert(market, price)
    }

    pub fn len(&self) -> usize {
        self.prices.len()
    }

    pub fn is_empty(&self) -> bool {
        self.prices.is_empty()
    }

    /// Tracked markets in exchange, then pair order
    pub fn iter(&self) -> impl Iterator<Item = (&MarketKey, &Decimal)> {
        self.prices.iter()
    }
}

/// `(current - previous) / previous * 100`, `None` on overflow or a zero base
pub fn percent_change(previous: Decimal, current: Decimal) -> Option<Decimal> {
    current
        .checked_sub(previous)?
        .checked_div(previous)?
        .checked_mul(ONE_HUNDRED)
}

/// Compare a new price with the previous one for the same market
pub fn classify(
    market: &MarketKey,
    previous: Option<Decimal>,
    current: Decimal,
    threshold_pct: Decimal,
) -> Result<Option<PriceAlert>, DataQualityError> {
    let previous = match previous {
        Some(p) => p,
        None => return Ok(None),
    };

    if previous.is_zero() {
        return Err(DataQualityError::ZeroBaseline {
            market: market.clone(),
            current,
        });
    }

    let pct = percent_change(previous, current).ok_or_else(|| DataQualityError::Overflow {
        market: market.clone(),
        previous,
        current,
    })?;

    if pct.abs() < threshold_pct {
        return Ok(None);
    }

    Ok(Direction::from_change(pct).map(|direction| PriceAlert {
        market: market.clone(),
        direction,
        pct,
        previous,
        current,
    }))
}

/// Stateful detector owning the last-price table
#[derive(Debug, Clone)]
pub struct ChangeDetector {
    threshold_pct: Decimal,
    last_prices: LastPriceTable,
}

impl ChangeDetector {
    /// `threshold_pct` is in percent: 1.0 alerts on a 1% move
    pub fn new(threshold_pct: Decimal) -> Result<Self, ConfigError> {
        if threshold_pct <= Decimal::ZERO {
            return Err(ConfigError::NonPositiveThreshold(threshold_pct));
        }
        Ok(Self {
            threshold_pct,
            last_prices: LastPriceTable::new(),
        })
    }

    pub fn threshold_pct(&self) -> Decimal {
        self.threshold_pct
    }

    /// Record a successful sample and report any alert.
    ///
    /// The sample is stored even when the comparison fails with a
    /// `DataQualityError`.
    pub fn observe(
        &mut self,
        market: &MarketKey,
        current: Decimal,
    ) -> Result<Option<PriceAlert>, DataQualityError> {
        let previous = self.last_prices.get(market);
        let outcome = classify(market, previous, current, self.threshold_pct);
        self.last_prices.record(market.clone(), current);
        outcome
    }

    pub fn last_prices(&self) -> &LastPriceTable {
        &self.last_prices
    }
}
