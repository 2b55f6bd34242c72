//! Host tick driver
//!
//! Plays the part of the trading host: ticks a script on a fixed period,
//! passing the wall-clock Unix second, and stops it exactly once.

use std::future::Future;
use std::time::Duration;

use tokio::time::{self, Instant, MissedTickBehavior};
use tracing::info;

use crate::strategy::ScriptStrategy;

pub struct TickDriver {
    tick: Duration,
    max_ticks: Option<u64>,
    clock: fn() -> i64,
}

fn unix_now() -> i64 {
    chrono::Utc::now().timestamp()
}

impl TickDriver {
    pub fn new(tick: Duration, max_ticks: Option<u64>) -> Self {
        Self {
            tick,
            max_ticks,
            clock: unix_now,
        }
    }

    /// Replace the wall clock used to stamp ticks
    pub fn with_clock(mut self, clock: fn() -> i64) -> Self {
        self.clock = clock;
        self
    }

    /// Tick `strategy` until `shutdown` resolves or `max_ticks` is reached,
    /// then call `on_stop`. Returns the number of ticks delivered.
    pub async fn run<F>(&self, strategy: &mut dyn ScriptStrategy, shutdown: F) -> u64
    where
        F: Future<Output = ()>,
    {
        // First tick lands just after the next whole second
        let into_second = chrono::Utc::now().timestamp_subsec_millis();
        let align = Duration::from_millis(u64::from(1000 - into_second.min(999)));
        let mut interval = time::interval_at(Instant::now() + align, self.tick);
        interval.set_missed_tick_behavior(MissedTickBehavior::Skip);

        tokio::pin!(shutdown);

        info!(
            strategy = strategy.name(),
            tick_ms = self.tick.as_millis() as u64,
            max_ticks = ?self.max_ticks,
            "Starting tick loop"
        );

        let mut ticks = 0u64;
        loop {
            if self.max_ticks.is_some_and(|max| ticks >= max) {
                info!(ticks, "Tick limit reached");
                break;
            }

            tokio::select! {
                _ = &mut shutdown => {
                    info!(ticks, "Shutdown requested");
                    break;
                }
                _ = interval.tick() => {
                    strategy.on_tick((self.clock)());
                    ticks += 1;
                }
            }
        }

        strategy.on_stop();
        info!(strategy = strategy.name(), ticks, "Strategy stopped");
        ticks
    }
}
