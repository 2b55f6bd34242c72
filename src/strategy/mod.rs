//! Strategy module - read-only scripts driven by host ticks
//!
//! A script is constructed once with its connectors, markets and report
//! sink, receives `on_tick` once per host tick and `on_stop` once at
//! shutdown. Neither callback returns an error: every per-pair fault is
//! reported through the sink and the tick carries on.

mod price_logger;
mod price_monitor;

pub use price_logger::PriceLogger;
pub use price_monitor::PriceMonitor;

use crate::config::{Markets, Settings, StrategyKind};
use crate::connector::{connector_for, Connector, ConnectorMap};
use crate::error::{ConfigError, FetchFailure};
use crate::report::ReportSink;
use crate::types::MarketKey;

/// Host callbacks every script implements
pub trait ScriptStrategy: Send {
    fn name(&self) -> &'static str;

    /// Called once per host tick with the tick's Unix timestamp in seconds
    fn on_tick(&mut self, timestamp: i64);

    /// Called once when the host shuts down; no ticks follow
    fn on_stop(&mut self);
}

/// Reject market sets that reference exchanges without a connector
pub fn check_connectors(markets: &Markets, connectors: &ConnectorMap) -> Result<(), ConfigError> {
    match markets.exchanges().find(|ex| !connectors.contains_key(*ex)) {
        Some(missing) => Err(ConfigError::MissingConnector(missing.to_string())),
        None => Ok(()),
    }
}

/// Build the configured script
pub fn build(
    settings: &Settings,
    connectors: ConnectorMap,
    sink: Box<dyn ReportSink>,
) -> Result<Box<dyn ScriptStrategy>, ConfigError> {
    let strategy: Box<dyn ScriptStrategy> = match settings.strategy {
        StrategyKind::PriceLogger => Box::new(PriceLogger::new(
            connectors,
            settings.markets.clone(),
            settings.logger_gate,
            sink,
        )?),
        StrategyKind::PriceMonitor => Box::new(PriceMonitor::new(
            connectors,
            settings.markets.clone(),
            settings.monitor_gate,
            settings.threshold_pct,
            sink,
        )?),
    };
    Ok(strategy)
}

/// Fetch one value per market. A failure only affects its own entry.
pub(crate) fn sample_markets<T, F>(
    connectors: &ConnectorMap,
    markets: &Markets,
    exchange: &str,
    mut fetch: F,
) -> Vec<(MarketKey, Result<T, FetchFailure>)>
where
    F: FnMut(&dyn Connector, &MarketKey) -> Result<T, FetchFailure>,
{
    let connector = connector_for(connectors, exchange);
    markets
        .pairs(exchange)
        .map(|pair| {
            let market = MarketKey::new(exchange, pair.clone());
            let result = match &connector {
                Ok(connector) => fetch(*connector, &market),
                Err(failure) => Err(failure.clone()),
            };
            (market, result)
        })
        .collect()
}

/// Report a fetch failure at the level it deserves
pub(crate) fn report_failure(sink: &dyn ReportSink, failure: &FetchFailure) {
    match failure {
        FetchFailure::Unavailable { market } => {
            sink.log_warning(&format!("{}: Price not available", market.pair));
        }
        FetchFailure::Connector { market, source } => {
            sink.log_error(&format!(
                "Error fetching {} from {}: {}",
                market.pair, market.exchange, source
            ));
        }
        FetchFailure::MissingConnector { .. } => {
            sink.log_error(&failure.to_string());
        }
    }
}
