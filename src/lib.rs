//! PriceWatch Library
//!
//! Read-only price logger and price-change monitor scripts for exchange
//! connectors

pub mod config;
pub mod connector;
pub mod error;
pub mod host;
pub mod monitor;
pub mod report;
pub mod strategy;
pub mod types;
