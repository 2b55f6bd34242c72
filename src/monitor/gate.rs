//! Sampling gate - decides which host ticks do work

use std::num::NonZeroU64;

/// True when `timestamp` (Unix seconds) falls on an `interval` boundary
pub fn should_sample(timestamp: i64, interval: NonZeroU64) -> bool {
    // Intervals beyond i64::MAX never divide a real timestamp except 0
    match i64::try_from(interval.get()) {
        Ok(interval) => timestamp.rem_euclid(interval) == 0,
        Err(_) => timestamp == 0,
    }
}

/// Sampling cadence carried by a strategy
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SamplingGate {
    interval: NonZeroU64,
}

impl SamplingGate {
    pub fn new(interval: NonZeroU64) -> Self {
        Self { interval }
    }

    /// Gate that opens on every tick
    pub fn every_tick() -> Self {
        Self::new(NonZeroU64::MIN)
    }

    pub fn interval(&self) -> NonZeroU64 {
        self.interval
    }

    pub fn is_open(&self, timestamp: i64) -> bool {
        should_sample(timestamp, self.interval)
    }
}
