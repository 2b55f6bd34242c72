//! Price Logger - logs bid/mid/ask for every configured market

use super::{check_connectors, report_failure, sample_markets, ScriptStrategy};
use crate::config::Markets;
use crate::connector::{fetch_quote, ConnectorMap};
use crate::error::ConfigError;
use crate::monitor::SamplingGate;
use crate::report::{format_2dp, ReportSink};
use crate::types::{MarketKey, Quote};

pub struct PriceLogger {
    connectors: ConnectorMap,
    markets: Markets,
    gate: SamplingGate,
    sink: Box<dyn ReportSink>,
}

impl PriceLogger {
    pub const NAME: &'static str = "price_logger";

    pub fn new(
        connectors: ConnectorMap,
        markets: Markets,
        gate: SamplingGate,
        sink: Box<dyn ReportSink>,
    ) -> Result<Self, ConfigError> {
        check_connectors(&markets, &connectors)?;
        Ok(Self {
            connectors,
            markets,
            gate,
            sink,
        })
    }

    /// Log one quote line per market, grouped by exchange.
    /// Returns the quotes that were fetched.
    pub fn log_prices(&self) -> Vec<(MarketKey, Quote)> {
        let mut quoted = Vec::new();

        for exchange in self.markets.exchanges() {
            self.sink
                .log_info(&format!("=== {} ===", exchange.to_uppercase()));

            let samples = sample_markets(&self.connectors, &self.markets, exchange, fetch_quote);
            for (market, result) in samples {
                match result {
                    Ok(quote) => {
                        self.sink.log_info(&format!(
                            "{}: Bid: ${} | Mid: ${} | Ask: ${}",
                            market.pair,
                            format_2dp(quote.bid),
                            format_2dp(quote.mid),
                            format_2dp(quote.ask)
                        ));
                        quoted.push((market, quote));
                    }
                    Err(failure) => report_failure(self.sink.as_ref(), &failure),
                }
            }
        }

        quoted
    }
}

impl ScriptStrategy for PriceLogger {
    fn name(&self) -> &'static str {
        Self::NAME
    }

    fn on_tick(&mut self, timestamp: i64) {
        if !self.gate.is_open(timestamp) {
            return;
        }
        self.log_prices();
    }

    fn on_stop(&mut self) {
        self.sink.log_info("Price logger stopped");
    }
}
