//! gb-core: stable foundation for growbox.
//!
//! Contains:
//! - channel (measurement channel identifiers + sensor kinds)
//! - metrics (sink trait + labeled gauge registry)

pub mod channel;
pub mod metrics;

// Re-exports: nice ergonomics for downstream crates
pub use channel::{Channel, SensorKind};
pub use metrics::{GaugeRegistry, GaugeSample, MetricsSink, NullSink};
