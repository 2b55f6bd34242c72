//! Monitor module - throttled sampling and price-change detection

mod detector;
mod gate;

pub use detector::{classify, percent_change, ChangeDetector, LastPriceTable, PriceAlert};
pub use gate::{should_sample, SamplingGate};
