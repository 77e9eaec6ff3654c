//! P1 smart meter reader
//!
//! Reads DSMR telegrams from the P1 port of a smart meter, extracts power,
//! voltage, current and gas readings and keeps the latest values available
//! for an HTTP endpoint.

pub mod api;
pub mod config;
pub mod metrics;
pub mod obis_utils;
pub mod reader;
pub mod serial;
pub mod telegram;

// Re-export common types for easier access
pub use api::ApiManager;
pub use config::Config;
pub use metrics::{MetricsSnapshot, SnapshotStore};
pub use reader::MeterReader;
