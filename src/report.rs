//! Reporting sink - where strategies send their human-readable output
//!
//! Strategies never call the logger directly. They write through a
//! `ReportSink`, which in production forwards to `tracing` and in tests
//! records lines in memory. Sinks return nothing and must not panic.

use rust_decimal::Decimal;
use std::sync::{Arc, Mutex};

/// Severity of a report line
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Level {
    Info,
    Warning,
    Error,
}

/// Append-only log capability handed to a strategy
pub trait ReportSink: Send + Sync {
    fn log_info(&self, message: &str);
    fn log_warning(&self, message: &str);
    fn log_error(&self, message: &str);
}

/// Forwards report lines to `tracing`, tagged with the strategy name
#[derive(Debug, Clone)]
pub struct TracingSink {
    strategy: &'static str,
}

impl TracingSink {
    pub fn new(strategy: &'static str) -> Self {
        Self { strategy }
    }
}

impl ReportSink for TracingSink {
    fn log_info(&self, message: &str) {
        tracing::info!(strategy = self.strategy, "{}", message);
    }

    fn log_warning(&self, message: &str) {
        tracing::warn!(strategy = self.strategy, "{}", message);
    }

    fn log_error(&self, message: &str) {
        tracing::error!(strategy = self.strategy, "{}", message);
    }
}

/// Records report lines in memory. Clones share the same buffer.
#[derive(Debug, Clone, Default)]
pub struct MemorySink {
    lines: Arc<Mutex<Vec<(Level, String)>>>,
}

impl MemorySink {
    pub fn new() -> Self {
        Self::default()
    }

    fn push(&self, level: Level, message: &str) {
        // A poisoned buffer still accepts lines
        let mut lines = match self.lines.lock() {
            Ok(guard) => guard,
            Err(poisoned) => poisoned.into_inner(),
        };
        lines.push((level, message.to_string()));
    }

    /// Snapshot of every recorded line
    pub fn lines(&self) -> Vec<(Level, String)> {
        match self.lines.lock() {
            Ok(guard) => guard.clone(),
            Err(poisoned) => poisoned.into_inner().clone(),
        }
    }

    /// Messages recorded at one level
    pub fn messages(&self, level: Level) -> Vec<String> {
        self.lines()
            .into_iter()
            .filter(|(l, _)| *l == level)
            .map(|(_, m)| m)
            .collect()
    }

    pub fn contains(&self, needle: &str) -> bool {
        self.lines().iter().any(|(_, m)| m.contains(needle))
    }

    pub fn clear(&self) {
        match self.lines.lock() {
            Ok(mut guard) => guard.clear(),
            Err(poisoned) => poisoned.into_inner().clear(),
        }
    }
}

impl ReportSink for MemorySink {
    fn log_info(&self, message: &str) {
        self.push(Level::Info, message);
    }

    fn log_warning(&self, message: &str) {
        self.push(Level::Warning, message);
    }

    fn log_error(&self, message: &str) {
        self.push(Level::Error, message);
    }
}

/// Format a value with exactly 2 decimals
pub fn format_2dp(value: Decimal) -> String {
    format!("{:.2}", value.round_dp(2))
}

/// Format a price as dollars with thousands separators and 2 decimals
pub fn format_usd(value: Decimal) -> String {
    let rounded = format_2dp(value.abs());
    let (int_part, frac_part) = rounded.split_once('.').unwrap_or((rounded.as_str(), "00"));

    let mut grouped = String::with_capacity(int_part.len() + int_part.len() / 3);
    for (i, ch) in int_part.chars().enumerate() {
        if i > 0 && (int_part.len() - i) % 3 == 0 {
            grouped.push(',');
        }
        grouped.push(ch);
    }

    let sign = if value.round_dp(2).is_sign_negative() && !value.round_dp(2).is_zero() {
        "-"
    } else {
        ""
    };
    format!("{}${}.{}", sign, grouped, frac_part)
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal_macros::dec;

    #[test]
    fn test_format_2dp_rounds_half_even() {
        assert_eq!(format_2dp(dec!(1.5)), "1.50");
        assert_eq!(format_2dp(dec!(65000.125)), "65000.12");
        assert_eq!(format_2dp(dec!(-2)), "-2.00");
    }

    #[test]
    fn test_format_usd_grouping() {
        assert_eq!(format_usd(dec!(0)), "$0.00");
        assert_eq!(format_usd(dec!(999.999)), "$1,000.00");
        assert_eq!(format_usd(dec!(65123.456)), "$65,123.46");
        assert_eq!(format_usd(dec!(1234567.8)), "$1,234,567.80");
        assert_eq!(format_usd(dec!(0.004)), "$0.00");
    }

    #[test]
    fn test_format_usd_negative() {
        assert_eq!(format_usd(dec!(-1500.5)), "-$1,500.50");
        assert_eq!(format_usd(dec!(-0.001)), "$0.00");
    }

    #[test]
    fn test_memory_sink_shares_buffer_across_clones() {
        let sink = MemorySink::new();
        let handle = sink.clone();
        sink.log_info("hello");
        sink.log_error("boom");

        assert_eq!(handle.lines().len(), 2);
        assert_eq!(handle.messages(Level::Error), vec!["boom".to_string()]);
        assert!(handle.contains("hell"));

        handle.clear();
        assert!(sink.lines().is_empty());
    }
}
