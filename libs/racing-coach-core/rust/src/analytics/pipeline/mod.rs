//! Lap-level metrics extraction pipeline.

mod metrics;

pub use metrics::extract_lap_metrics;
