//! Telemetry analysis: braking zone and corner detection, lap metrics (C7).

mod config;
pub mod detection;
mod error;
mod frame;
mod math;
pub mod analysis;
pub mod pipeline;
pub mod results;

pub use config::AnalysisConfig;
pub use error::AnalysisError;
pub use frame::AnalysisFrame;
pub use math::wrap_distance;

pub use detection::{extract_braking_zones, extract_corners};
pub use pipeline::extract_lap_metrics;
pub use results::{BrakingMetrics, CornerMetrics, LapMetrics};
