//! Lap metrics aggregate structure.

use super::{BrakingMetrics, CornerMetrics};

/// Aggregate metrics for an entire lap.
///
/// Contains collections of braking zones and corners along with lap-wide
/// statistics.
#[derive(Debug, Clone)]
pub struct LapMetrics {
    pub lap_number: i32,
    pub lap_time: Option<f64>,

    pub braking_zones: Vec<BrakingMetrics>,
    pub corners: Vec<CornerMetrics>,

    pub total_corners: usize,
    pub total_braking_zones: usize,

    /// Average speed at corner apexes (m/s).
    pub average_corner_speed: f64,
    pub max_speed: f64,
    pub min_speed: f64,
}

impl LapMetrics {
    /// Build aggregate statistics from detected zones and corners.
    pub fn from_detection(
        lap_number: i32,
        lap_time: Option<f64>,
        braking_zones: Vec<BrakingMetrics>,
        corners: Vec<CornerMetrics>,
        max_speed: f64,
        min_speed: f64,
    ) -> Self {
        let total_braking_zones = braking_zones.len();
        let total_corners = corners.len();

        let average_corner_speed = if corners.is_empty() {
            0.0
        } else {
            corners.iter().map(|c| c.apex_speed).sum::<f64>() / corners.len() as f64
        };

        Self {
            lap_number,
            lap_time,
            braking_zones,
            corners,
            total_corners,
            total_braking_zones,
            average_corner_speed,
            max_speed,
            min_speed,
        }
    }
}
