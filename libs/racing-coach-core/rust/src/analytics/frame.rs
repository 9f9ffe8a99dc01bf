//! The slim, analysis-only frame view (C7).
//!
//! Detection is a hot loop over the fields it actually touches; this keeps
//! those fields packed together rather than pulling the full per-wheel,
//! GPS-carrying `model::TelemetryFrame` through the detectors' inner loops.
//! Fields are ordered by access frequency: hot path first, then warm, then
//! cold.

use crate::model::TelemetryFrame;

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct AnalysisFrame {
    // hot
    pub brake: f64,
    pub steering_angle: f64,
    pub throttle: f64,
    pub speed: f64,

    // warm
    pub lap_distance: f64,
    pub timestamp: f64,

    // cold
    pub lateral_acceleration: f64,
    pub longitudinal_acceleration: f64,
}

impl AnalysisFrame {
    #[allow(clippy::too_many_arguments)]
    pub fn new(
        brake: f64,
        throttle: f64,
        speed: f64,
        lap_distance: f64,
        steering_angle: f64,
        lateral_acceleration: f64,
        longitudinal_acceleration: f64,
        timestamp: f64,
    ) -> Self {
        Self {
            brake,
            steering_angle,
            throttle,
            speed,
            lap_distance,
            timestamp,
            lateral_acceleration,
            longitudinal_acceleration,
        }
    }
}

impl From<&TelemetryFrame> for AnalysisFrame {
    fn from(frame: &TelemetryFrame) -> Self {
        Self {
            brake: frame.brake as f64,
            steering_angle: frame.steering_angle as f64,
            throttle: frame.throttle as f64,
            speed: frame.speed as f64,
            lap_distance: frame.lap_distance as f64,
            timestamp: frame.session_time,
            lateral_acceleration: frame.lateral_acceleration as f64,
            longitudinal_acceleration: frame.longitudinal_acceleration as f64,
        }
    }
}
