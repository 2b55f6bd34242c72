//! PriceWatch - runs one read-only price script against paper connectors

use anyhow::{Context, Result};
use tracing::{info, warn};
use tracing_subscriber::EnvFilter;

use pricewatch::config::{AppConfig, StrategyKind};
use pricewatch::connector::{ConnectorMap, PaperConnector};
use pricewatch::host::TickDriver;
use pricewatch::report::TracingSink;
use pricewatch::strategy::{self, PriceLogger, PriceMonitor};

#[tokio::main]
async fn main() -> Result<()> {
    let config = AppConfig::load()?;
    init_logging(&config);

    info!("PriceWatch starting: {}", config);

    let settings = config.validate().context("Invalid configuration")?;

    // Paper trading only: every configured exchange gets a simulated book
    let mut connectors = ConnectorMap::new();
    for (i, exchange) in settings.markets.exchanges().enumerate() {
        let mut paper_settings = config.paper.clone();
        paper_settings.seed = config.paper.seed.map(|seed| seed.wrapping_add(i as u64));
        let paper = PaperConnector::new(&paper_settings)
            .with_context(|| format!("Failed to create paper connector for {}", exchange))?;
        connectors.insert(exchange.to_string(), Box::new(paper));
    }
    for key in settings.markets.keys() {
        let priced = config
            .paper
            .start_prices
            .keys()
            .any(|pair| pair.eq_ignore_ascii_case(key.pair.as_str()));
        if !priced {
            warn!(market = %key, "No paper start price; this market will read as unavailable");
        }
    }

    let sink_name = match settings.strategy {
        StrategyKind::PriceLogger => PriceLogger::NAME,
        StrategyKind::PriceMonitor => PriceMonitor::NAME,
    };
    let mut script = strategy::build(&settings, connectors, Box::new(TracingSink::new(sink_name)))
        .context("Failed to build strategy")?;

    let driver = TickDriver::new(settings.tick, settings.max_ticks);
    let shutdown = async {
        if let Err(e) = tokio::signal::ctrl_c().await {
            warn!("Failed to listen for Ctrl-C: {}", e);
            std::future::pending::<()>().await;
        }
    };
    let ticks = driver.run(script.as_mut(), shutdown).await;

    info!(ticks, "PriceWatch exited cleanly");
    Ok(())
}

fn init_logging(config: &AppConfig) {
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(config.logging.filter.as_str()));

    if config.logging.json {
        tracing_subscriber::fmt()
            .json()
            .with_env_filter(filter)
            .init();
    } else {
        tracing_subscriber::fmt().with_env_filter(filter).init();
    }
}
