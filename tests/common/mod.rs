//! Shared helpers for PriceWatch integration tests

use pricewatch::config::Markets;
use pricewatch::connector::Connector;
use pricewatch::error::ConnectorError;
use pricewatch::types::{Side, TradingPair};
use rust_decimal::Decimal;
use std::collections::{BTreeMap, HashMap, VecDeque};
use std::sync::{Arc, Mutex};

type Outcome = Result<Option<Decimal>, ConnectorError>;

/// Connector that replays queued mid-price outcomes per pair.
///
/// Clones share the same queues, so a test can keep a handle after moving
/// the connector into a strategy. An exhausted queue reads as no price.
/// Bid and ask sit one unit either side of the last mid read.
#[derive(Clone, Default)]
pub struct ScriptedConnector {
    queues: Arc<Mutex<HashMap<String, VecDeque<Outcome>>>>,
    last_mid: Arc<Mutex<HashMap<String, Decimal>>>,
}

impl ScriptedConnector {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn push(&self, pair: &str, outcome: Outcome) -> &Self {
        self.queues
            .lock()
            .unwrap()
            .entry(pair.to_string())
            .or_default()
            .push_back(outcome);
        self
    }

    pub fn push_price(&self, pair: &str, price: Decimal) -> &Self {
        self.push(pair, Ok(Some(price)))
    }

    pub fn push_error(&self, pair: &str) -> &Self {
        self.push(
            pair,
            Err(ConnectorError::Network(format!("{} feed dropped", pair))),
        )
    }
}

impl Connector for ScriptedConnector {
    fn mid_price(&self, pair: &TradingPair) -> Result<Option<Decimal>, ConnectorError> {
        let next = self
            .queues
            .lock()
            .unwrap()
            .get_mut(pair.as_str())
            .and_then(VecDeque::pop_front)
            .unwrap_or(Ok(None));
        if let Ok(Some(mid)) = &next {
            self.last_mid
                .lock()
                .unwrap()
                .insert(pair.as_str().to_string(), *mid);
        }
        next
    }

    fn price(&self, pair: &TradingPair, side: Side) -> Result<Option<Decimal>, ConnectorError> {
        let mid = self.last_mid.lock().unwrap().get(pair.as_str()).copied();
        Ok(mid.map(|m| match side {
            Side::Buy => m + Decimal::ONE,
            Side::Sell => m - Decimal::ONE,
        }))
    }
}

/// Markets from (exchange, pairs) entries
pub fn markets(entries: &[(&str, Vec<&str>)]) -> Markets {
    let raw: BTreeMap<String, Vec<String>> = entries
        .iter()
        .map(|(exchange, pairs)| {
            (
                exchange.to_string(),
                pairs.iter().map(|p| p.to_string()).collect(),
            )
        })
        .collect();
    Markets::from_raw(&raw).unwrap()
}
