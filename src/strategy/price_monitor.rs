//! Price Monitor - throttled mid-price sampling with change alerts
//!
//! On every tick the sampling gate opens, each market's mid price is
//! fetched, logged and fed to the change detector. Failed fetches leave the
//! last-price table untouched.

use rust_decimal::Decimal;

use super::{check_connectors, report_failure, sample_markets, ScriptStrategy};
use crate::config::Markets;
use crate::connector::{fetch_mid, ConnectorMap};
use crate::error::ConfigError;
use crate::monitor::{ChangeDetector, LastPriceTable, PriceAlert, SamplingGate};
use crate::report::{format_2dp, format_usd, ReportSink};
use crate::types::{MarketKey, PriceSample};

const BANNER: &str = "============================================================";

pub struct PriceMonitor {
    connectors: ConnectorMap,
    markets: Markets,
    gate: SamplingGate,
    detector: ChangeDetector,
    sink: Box<dyn ReportSink>,
}

impl PriceMonitor {
    pub const NAME: &'static str = "price_monitor";

    pub fn new(
        connectors: ConnectorMap,
        markets: Markets,
        gate: SamplingGate,
        threshold_pct: Decimal,
        sink: Box<dyn ReportSink>,
    ) -> Result<Self, ConfigError> {
        check_connectors(&markets, &connectors)?;
        Ok(Self {
            connectors,
            markets,
            gate,
            detector: ChangeDetector::new(threshold_pct)?,
            sink,
        })
    }

    /// Sample every market once, log prices and alerts.
    /// Returns the alerts raised this round.
    pub fn monitor_prices(&mut self) -> Vec<PriceAlert> {
        self.sink.log_info(BANNER);
        self.sink.log_info("Price Monitor Update");
        self.sink.log_info(BANNER);

        let exchanges: Vec<String> = self.markets.exchanges().map(str::to_string).collect();
        let mut alerts = Vec::new();

        for exchange in &exchanges {
            let samples = sample_markets(&self.connectors, &self.markets, exchange, fetch_mid);
            for (market, result) in samples {
                match result {
                    Ok(price) => {
                        let sample = PriceSample { market, price };
                        if let Some(alert) = self.record(&sample) {
                            alerts.push(alert);
                        }
                    }
                    Err(failure) => report_failure(self.sink.as_ref(), &failure),
                }
            }
        }

        self.sink.log_info(BANNER);
        alerts
    }

    fn record(&mut self, sample: &PriceSample) -> Option<PriceAlert> {
        self.sink.log_info(&format!(
            "{}: {}",
            self.label(&sample.market),
            format_usd(sample.price)
        ));

        match self.detector.observe(&sample.market, sample.price) {
            Ok(Some(alert)) => {
                self.sink.log_info(&format!(
                    "  {} {}% ({} → {})",
                    alert.direction,
                    format_2dp(alert.pct.abs()),
                    format_usd(alert.previous),
                    format_usd(alert.current)
                ));
                Some(alert)
            }
            Ok(None) => None,
            Err(quality) => {
                self.sink.log_warning(&quality.to_string());
                None
            }
        }
    }

    /// Pair name, qualified by exchange when more than one is watched
    fn label(&self, market: &MarketKey) -> String {
        if self.markets.exchanges().nth(1).is_some() {
            market.to_string()
        } else {
            market.pair.to_string()
        }
    }

    pub fn last_prices(&self) -> &LastPriceTable {
        self.detector.last_prices()
    }
}

impl ScriptStrategy for PriceMonitor {
    fn name(&self) -> &'static str {
        Self::NAME
    }

    fn on_tick(&mut self, timestamp: i64) {
        if !self.gate.is_open(timestamp) {
            return;
        }
        self.monitor_prices();
    }

    fn on_stop(&mut self) {
        self.sink.log_info("Price monitor stopped. Final prices:");
        for (market, price) in self.detector.last_prices().iter() {
            self.sink.log_info(&format!(
                "  {}: {}",
                self.label(market),
                format_usd(*price)
            ));
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::connector::MockConnector;
    use crate::error::ConnectorError;
    use crate::report::{Level, MemorySink};
    use crate::types::{Direction, TradingPair};
    use rust_decimal_macros::dec;
    use std::collections::BTreeMap;
    use std::num::NonZeroU64;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::sync::Arc;

    fn markets() -> Markets {
        let mut raw = BTreeMap::new();
        raw.insert(
            "paper".to_string(),
            vec!["BTC-USDT".to_string(), "ETH-USDT".to_string()],
        );
        Markets::from_raw(&raw).unwrap()
    }

    fn key(pair: &str) -> MarketKey {
        MarketKey::new("paper", TradingPair::from(pair))
    }

    /// BTC walks through `btc_prices` one read at a time; ETH always fails
    fn scripted(btc_prices: Vec<Decimal>) -> MockConnector {
        let calls = Arc::new(AtomicUsize::new(0));
        let mut mock = MockConnector::new();
        mock.expect_mid_price().returning(move |pair| match pair.as_str() {
            "BTC-USDT" => {
                let i = calls.fetch_add(1, Ordering::SeqCst);
                Ok(btc_prices.get(i).copied())
            }
            _ => Err(ConnectorError::StaleBook("no update in 30s".into())),
        });
        mock
    }

    fn monitor(mock: MockConnector, interval: u64, sink: &MemorySink) -> PriceMonitor {
        let mut connectors = ConnectorMap::new();
        connectors.insert("paper".to_string(), Box::new(mock));
        PriceMonitor::new(
            connectors,
            markets(),
            SamplingGate::new(NonZeroU64::new(interval).unwrap()),
            dec!(1.0),
            Box::new(sink.clone()),
        )
        .unwrap()
    }

    #[test]
    fn test_first_round_tracks_without_alert() {
        let sink = MemorySink::new();
        let mut m = monitor(scripted(vec![dec!(100)]), 60, &sink);

        assert!(m.monitor_prices().is_empty());
        assert_eq!(m.last_prices().get(&key("BTC-USDT")), Some(dec!(100)));
        assert!(sink.contains("BTC-USDT: $100.00"));
    }

    #[test]
    fn test_alert_line_format() {
        let sink = MemorySink::new();
        let mut m = monitor(scripted(vec![dec!(64000), dec!(65000)]), 60, &sink);

        m.monitor_prices();
        let alerts = m.monitor_prices();

        assert_eq!(alerts.len(), 1);
        assert_eq!(alerts[0].direction, Direction::Up);
        assert!(sink.contains("  UP 1.56% ($64,000.00 → $65,000.00)"));
    }

    #[test]
    fn test_failure_leaves_table_untouched() {
        let sink = MemorySink::new();
        let mut m = monitor(scripted(vec![dec!(100)]), 60, &sink);

        m.monitor_prices();
        // Second BTC read returns no price
        m.monitor_prices();

        assert_eq!(m.last_prices().get(&key("BTC-USDT")), Some(dec!(100)));
        assert_eq!(m.last_prices().get(&key("ETH-USDT")), None);
        assert_eq!(
            sink.messages(Level::Warning),
            vec!["BTC-USDT: Price not available"]
        );
        assert_eq!(sink.messages(Level::Error).len(), 2);
    }

    #[test]
    fn test_on_tick_respects_interval() {
        let sink = MemorySink::new();
        let mut m = monitor(scripted(vec![dec!(100), dec!(110)]), 60, &sink);

        for t in 1..60 {
            m.on_tick(t);
        }
        assert!(sink.lines().is_empty());

        m.on_tick(60);
        m.on_tick(120);
        assert!(sink.contains("UP 10.00%"));
    }

    #[test]
    fn test_stop_dumps_final_prices() {
        let sink = MemorySink::new();
        let mut m = monitor(scripted(vec![dec!(65432.1)]), 1, &sink);
        m.on_tick(0);
        sink.clear();

        m.on_stop();

        assert_eq!(
            sink.messages(Level::Info),
            vec!["Price monitor stopped. Final prices:", "  BTC-USDT: $65,432.10"]
        );
    }

    #[test]
    fn test_zero_threshold_rejected() {
        let result = PriceMonitor::new(
            ConnectorMap::new(),
            Markets::default(),
            SamplingGate::every_tick(),
            dec!(0),
            Box::new(MemorySink::new()),
        );
        assert!(matches!(
            result,
            Err(ConfigError::NonPositiveThreshold(_))
        ));
    }
}
