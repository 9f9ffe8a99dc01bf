//! Result types produced by the analytics pipeline.

mod braking;
mod corner;
mod lap;

pub use braking::{BrakingMetrics, BrakingMetricsBuilder};
pub use corner::{CornerMetrics, CornerMetricsBuilder};
pub use lap::LapMetrics;
