//! Validated configuration types

use rust_decimal::Decimal;
use std::collections::{BTreeMap, BTreeSet};
use std::fmt;
use std::str::FromStr;
use std::time::Duration;

use crate::error::ConfigError;
use crate::monitor::SamplingGate;
use crate::types::{MarketKey, TradingPair};

/// Which script the binary runs
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StrategyKind {
    PriceLogger,
    PriceMonitor,
}

impl FromStr for StrategyKind {
    type Err = ConfigError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "price_logger" | "logger" => Ok(StrategyKind::PriceLogger),
            "price_monitor" | "monitor" => Ok(StrategyKind::PriceMonitor),
            other => Err(ConfigError::UnknownStrategy(other.to_string())),
        }
    }
}

impl fmt::Display for StrategyKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            StrategyKind::PriceLogger => write!(f, "price_logger"),
            StrategyKind::PriceMonitor => write!(f, "price_monitor"),
        }
    }
}

/// Trading pairs to watch, keyed by exchange id
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Markets {
    by_exchange: BTreeMap<String, BTreeSet<TradingPair>>,
}

impl Markets {
    /// Build from raw config, rejecting empty exchanges and blank pairs.
    /// Duplicate pairs collapse.
    pub fn from_raw(raw: &BTreeMap<String, Vec<String>>) -> Result<Self, ConfigError> {
        if raw.is_empty() {
            return Err(ConfigError::NoMarkets);
        }

        let mut by_exchange = BTreeMap::new();
        for (exchange, pairs) in raw {
            if pairs.is_empty() {
                return Err(ConfigError::EmptyExchange(exchange.clone()));
            }
            let mut set = BTreeSet::new();
            for pair in pairs {
                let pair = pair.trim();
                if pair.is_empty() {
                    return Err(ConfigError::EmptyPair(exchange.clone()));
                }
                set.insert(TradingPair::new(pair));
            }
            by_exchange.insert(exchange.clone(), set);
        }

        Ok(Self { by_exchange })
    }

    pub fn exchanges(&self) -> impl Iterator<Item = &str> {
        self.by_exchange.keys().map(String::as_str)
    }

    pub fn pairs(&self, exchange: &str) -> impl Iterator<Item = &TradingPair> {
        self.by_exchange.get(exchange).into_iter().flatten()
    }

    /// Every (exchange, pair) in exchange order, then pair order
    pub fn keys(&self) -> impl Iterator<Item = MarketKey> + '_ {
        self.by_exchange.iter().flat_map(|(exchange, pairs)| {
            pairs
                .iter()
                .map(move |pair| MarketKey::new(exchange.as_str(), pair.clone()))
        })
    }

    pub fn len(&self) -> usize {
        self.by_exchange.values().map(BTreeSet::len).sum()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

/// Configuration after validation, ready to build strategies from
#[derive(Debug, Clone)]
pub struct Settings {
    pub strategy: StrategyKind,
    pub markets: Markets,
    pub logger_gate: SamplingGate,
    pub monitor_gate: SamplingGate,
    /// Alert threshold in percent
    pub threshold_pct: Decimal,
    pub tick: Duration,
    pub max_ticks: Option<u64>,
}

#[cfg(test)]
mod tests {
    use super::*;

    fn raw(entries: Vec<(&str, Vec<&str>)>) -> BTreeMap<String, Vec<String>> {
        entries
            .into_iter()
            .map(|(ex, pairs)| {
                (
                    ex.to_string(),
                    pairs.iter().map(|p| p.to_string()).collect(),
                )
            })
            .collect()
    }

    #[test]
    fn test_strategy_kind_parsing() {
        assert_eq!(
            "price_monitor".parse::<StrategyKind>().unwrap(),
            StrategyKind::PriceMonitor
        );
        assert_eq!(
            " Logger ".parse::<StrategyKind>().unwrap(),
            StrategyKind::PriceLogger
        );
        assert!("arbitrage".parse::<StrategyKind>().is_err());
    }

    #[test]
    fn test_markets_dedup_and_order() {
        let markets = Markets::from_raw(&raw(vec![
            ("kraken", vec!["ETH-USD", "BTC-USD", "BTC-USD"]),
            ("binance", vec!["BTC-USDT"]),
        ]))
        .unwrap();

        assert_eq!(markets.len(), 3);
        let keys: Vec<String> = markets.keys().map(|k| k.to_string()).collect();
        assert_eq!(
            keys,
            vec!["BTC-USDT@binance", "BTC-USD@kraken", "ETH-USD@kraken"]
        );
    }

    #[test]
    fn test_markets_rejects_bad_input() {
        assert_eq!(
            Markets::from_raw(&BTreeMap::new()),
            Err(ConfigError::NoMarkets)
        );
        assert_eq!(
            Markets::from_raw(&raw(vec![("binance", vec![])])),
            Err(ConfigError::EmptyExchange("binance".into()))
        );
        assert_eq!(
            Markets::from_raw(&raw(vec![("binance", vec!["  "])])),
            Err(ConfigError::EmptyPair("binance".into()))
        );
    }
}
