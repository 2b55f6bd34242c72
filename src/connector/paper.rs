//! Paper connector - in-memory random-walk order book
//!
//! Stands in for an exchange when running without real funds. Every pair
//! starts at a configured mid price and moves by a bounded random step at
//! most once per wall-clock second. Pairs without a starting price have no
//! book and read as unavailable.

use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use rust_decimal::Decimal;
use serde::Deserialize;
use std::collections::{BTreeMap, HashMap};
use std::sync::Mutex;

use super::Connector;
use crate::error::{ConfigError, ConnectorError};
use crate::types::{Side, TradingPair};

/// Paper book parameters
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct PaperSettings {
    /// RNG seed, random when absent
    pub seed: Option<u64>,
    /// Largest single step of the mid price in basis points
    pub volatility_bps: u32,
    /// Quoted bid/ask spread in basis points
    pub spread_bps: u32,
    /// Probability (0.0 - 1.0) that a read fails with a simulated outage
    pub failure_rate: f64,
    /// Starting mid price per pair
    pub start_prices: BTreeMap<String, Decimal>,
}

impl Default for PaperSettings {
    fn default() -> Self {
        let mut start_prices = BTreeMap::new();
        start_prices.insert("BTC-USDT".to_string(), Decimal::new(65_000, 0));
        start_prices.insert("ETH-USDT".to_string(), Decimal::new(3_200, 0));
        Self {
            seed: None,
            volatility_bps: 25,
            spread_bps: 2,
            failure_rate: 0.0,
            start_prices,
        }
    }
}

struct PaperBook {
    rng: StdRng,
    mids: HashMap<TradingPair, Decimal>,
    last_step: Option<i64>,
}

pub struct PaperConnector {
    book: Mutex<PaperBook>,
    volatility_bps: i64,
    half_spread: Decimal,
    failure_rate: f64,
}

impl PaperConnector {
    pub fn new(settings: &PaperSettings) -> Result<Self, ConfigError> {
        if !(0.0..=1.0).contains(&settings.failure_rate) {
            return Err(ConfigError::Paper(format!(
                "failure_rate must be within 0.0..=1.0, got {}",
                settings.failure_rate
            )));
        }
        if let Some((pair, price)) = settings
            .start_prices
            .iter()
            .find(|(_, p)| **p <= Decimal::ZERO)
        {
            return Err(ConfigError::Paper(format!(
                "start price for {} must be positive, got {}",
                pair, price
            )));
        }

        let rng = match settings.seed {
            Some(seed) => StdRng::seed_from_u64(seed),
            None => StdRng::from_entropy(),
        };
        let mids = settings
            .start_prices
            .iter()
            .map(|(pair, price)| (TradingPair::new(pair.to_uppercase()), *price))
            .collect();

        Ok(Self {
            book: Mutex::new(PaperBook {
                rng,
                mids,
                last_step: None,
            }),
            volatility_bps: i64::from(settings.volatility_bps),
            // bps / 2 as a fraction of the mid
            half_spread: Decimal::new(i64::from(settings.spread_bps), 4) / Decimal::new(2, 0),
            failure_rate: settings.failure_rate,
        })
    }

    fn mid_at(&self, pair: &TradingPair, now: i64) -> Result<Option<Decimal>, ConnectorError> {
        let mut book = self
            .book
            .lock()
            .map_err(|_| ConnectorError::Other("paper book lock poisoned".into()))?;

        if self.failure_rate > 0.0 && book.rng.gen_bool(self.failure_rate) {
            return Err(ConnectorError::Network(format!(
                "simulated outage reading {}",
                pair
            )));
        }

        if book.last_step.map_or(true, |last| now > last) {
            self.step(&mut book);
            book.last_step = Some(now);
        }

        // Config sources may lowercase keys; books are keyed upper case
        Ok(book
            .mids
            .get(&TradingPair::new(pair.as_str().to_uppercase()))
            .copied())
    }

    fn price_at(
        &self,
        pair: &TradingPair,
        side: Side,
        now: i64,
    ) -> Result<Option<Decimal>, ConnectorError> {
        Ok(self.mid_at(pair, now)?.map(|mid| {
            let half = (mid * self.half_spread).round_dp(8);
            match side {
                Side::Buy => mid + half,
                Side::Sell => mid - half,
            }
        }))
    }

    fn step(&self, book: &mut PaperBook) {
        if self.volatility_bps == 0 {
            return;
        }
        let PaperBook { rng, mids, .. } = book;
        for mid in mids.values_mut() {
            let bps = rng.gen_range(-self.volatility_bps..=self.volatility_bps);
            let factor = Decimal::ONE + Decimal::new(bps, 4);
            *mid = (*mid * factor).round_dp(8);
        }
    }
}

impl Connector for PaperConnector {
    fn mid_price(&self, pair: &TradingPair) -> Result<Option<Decimal>, ConnectorError> {
        self.mid_at(pair, chrono::Utc::now().timestamp())
    }

    fn price(&self, pair: &TradingPair, side: Side) -> Result<Option<Decimal>, ConnectorError> {
        self.price_at(pair, side, chrono::Utc::now().timestamp())
    }
}
