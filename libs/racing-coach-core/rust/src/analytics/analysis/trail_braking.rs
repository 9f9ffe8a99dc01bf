//! Trail braking detection and analysis.

use crate::analytics::{wrap_distance, AnalysisConfig, AnalysisFrame};

/// Information about trail braking within a braking zone.
#[derive(Debug, Clone, Copy)]
pub struct TrailBrakingInfo {
    pub has_trail_braking: bool,
    /// Track distance (m) where both braking and steering occurred.
    pub distance: f64,
    /// Average brake pressure during the trail braking phase.
    pub percentage: f64,
}

impl Default for TrailBrakingInfo {
    fn default() -> Self {
        Self {
            has_trail_braking: false,
            distance: 0.0,
            percentage: 0.0,
        }
    }
}

/// Detect trail braking within a braking zone: brake and steering active on
/// the same frame.
pub fn detect_trail_braking(
    frames: &[AnalysisFrame],
    brake_start_idx: usize,
    brake_end_idx: usize,
    config: &AnalysisConfig,
) -> TrailBrakingInfo {
    if frames.is_empty() || brake_start_idx >= frames.len() {
        return TrailBrakingInfo::default();
    }

    let end_idx = brake_end_idx.min(frames.len() - 1);
    if brake_start_idx > end_idx {
        return TrailBrakingInfo::default();
    }

    let mut trail_distance = 0.0;
    let mut pressure_sum = 0.0;
    let mut trail_frames = 0usize;

    for i in brake_start_idx..=end_idx {
        let frame = &frames[i];

        let is_braking = frame.brake > config.brake_threshold;
        let is_steering = frame.steering_angle.abs() > config.steering_threshold;

        if is_braking && is_steering {
            trail_frames += 1;
            pressure_sum += frame.brake;

            if i + 1 < frames.len() {
                let distance_delta = frames[i + 1].lap_distance - frame.lap_distance;
                trail_distance += wrap_distance(distance_delta, config.wrap_fallback_distance);
            }
        }
    }

    TrailBrakingInfo {
        has_trail_braking: trail_frames > 0,
        distance: trail_distance,
        percentage: if trail_frames > 0 {
            pressure_sum / trail_frames as f64
        } else {
            0.0
        },
    }
}
