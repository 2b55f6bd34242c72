//! Configuration management for PriceWatch
//!
//! Loads from optional config files + environment variables via .env

mod types;

pub use types::*;

use anyhow::{Context, Result};
use config::{Config, Environment, File};
use rust_decimal::Decimal;
use serde::Deserialize;
use std::collections::BTreeMap;
use std::num::NonZeroU64;
use std::time::Duration;

use crate::connector::PaperSettings;
use crate::error::ConfigError;
use crate::monitor::SamplingGate;

/// Main application configuration, as read from files and environment
#[derive(Debug, Clone, Deserialize)]
pub struct AppConfig {
    pub bot: BotConfig,
    /// Exchange id -> trading pairs
    #[serde(default = "default_markets")]
    pub markets: BTreeMap<String, Vec<String>>,
    pub logger: LoggerConfig,
    pub monitor: MonitorConfig,
    pub host: HostConfig,
    #[serde(default)]
    pub paper: PaperSettings,
    pub logging: LoggingConfig,
}

#[derive(Debug, Clone, Deserialize)]
pub struct BotConfig {
    /// Version tag for the startup log
    pub tag: String,
    /// Script to run (price_logger, price_monitor)
    pub strategy: String,
}

#[derive(Debug, Clone, Deserialize)]
pub struct LoggerConfig {
    /// Log prices every N seconds (1 = every tick)
    pub interval_secs: u64,
}

#[derive(Debug, Clone, Deserialize)]
pub struct MonitorConfig {
    /// Check prices every N seconds
    pub interval_secs: u64,
    /// Alert when |change| >= this many percent
    pub threshold_pct: Decimal,
}

#[derive(Debug, Clone, Deserialize)]
pub struct HostConfig {
    /// Tick period in milliseconds
    pub tick_ms: u64,
    /// Stop after this many ticks (runs until Ctrl-C when absent)
    #[serde(default)]
    pub max_ticks: Option<u64>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct LoggingConfig {
    /// Emit JSON lines instead of human-readable text
    pub json: bool,
    /// Filter directive used when RUST_LOG is unset
    pub filter: String,
}

fn default_markets() -> BTreeMap<String, Vec<String>> {
    let mut markets = BTreeMap::new();
    markets.insert(
        "binance_perpetual_testnet".to_string(),
        vec!["BTC-USDT".to_string(), "ETH-USDT".to_string()],
    );
    markets
}

impl AppConfig {
    /// Load configuration from file and environment
    pub fn load() -> Result<Self> {
        // Load .env file first
        dotenvy::dotenv().ok();

        let config = Config::builder()
            .set_default("bot.tag", env!("CARGO_PKG_VERSION"))?
            .set_default("bot.strategy", "price_monitor")?
            // Logger defaults
            .set_default("logger.interval_secs", 1)?
            // Monitor defaults
            .set_default("monitor.interval_secs", 60)?
            .set_default("monitor.threshold_pct", "1.0")?
            // Host defaults
            .set_default("host.tick_ms", 1000)?
            // Logging defaults
            .set_default("logging.json", false)?
            .set_default("logging.filter", "info")?
            // Load config file if exists
            .add_source(File::with_name("config/default").required(false))
            .add_source(File::with_name("config/local").required(false))
            // Override with environment variables (PRICEWATCH__*)
            .add_source(Environment::with_prefix("PRICEWATCH").separator("__"))
            .build()
            .context("Failed to build configuration")?;

        let app_config: AppConfig = config
            .try_deserialize()
            .context("Failed to deserialize configuration")?;

        Ok(app_config)
    }

    /// Check every value and convert into `Settings`
    pub fn validate(&self) -> Result<Settings, ConfigError> {
        let strategy: StrategyKind = self.bot.strategy.parse()?;
        let markets = Markets::from_raw(&self.markets)?;

        let logger_interval = non_zero("logger.interval_secs", self.logger.interval_secs)?;
        let monitor_interval = non_zero("monitor.interval_secs", self.monitor.interval_secs)?;
        let tick_ms = non_zero("host.tick_ms", self.host.tick_ms)?;

        if self.monitor.threshold_pct <= Decimal::ZERO {
            return Err(ConfigError::NonPositiveThreshold(
                self.monitor.threshold_pct,
            ));
        }

        Ok(Settings {
            strategy,
            markets,
            logger_gate: SamplingGate::new(logger_interval),
            monitor_gate: SamplingGate::new(monitor_interval),
            threshold_pct: self.monitor.threshold_pct,
            tick: Duration::from_millis(tick_ms.get()),
            max_ticks: self.host.max_ticks,
        })
    }

    /// Generate a digest of the config for logging
    pub fn digest(&self) -> String {
        let markets: Vec<String> = self
            .markets
            .iter()
            .map(|(exchange, pairs)| format!("{}={}", exchange, pairs.join(",")))
            .collect();
        format!(
            "bot={} strategy={} markets=[{}] monitor_interval={}s threshold={}% tick={}ms",
            self.bot.tag,
            self.bot.strategy,
            markets.join(" "),
            self.monitor.interval_secs,
            self.monitor.threshold_pct,
            self.host.tick_ms
        )
    }
}

impl std::fmt::Display for AppConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.digest())
    }
}

fn non_zero(field: &'static str, value: u64) -> Result<NonZeroU64, ConfigError> {
    NonZeroU64::new(value).ok_or(ConfigError::ZeroInterval { field, value })
}
