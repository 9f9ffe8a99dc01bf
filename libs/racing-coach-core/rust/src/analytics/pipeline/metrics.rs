//! Lap-level metrics extraction, combining braking and corner detection.

use crate::analytics::analysis::SpeedStatistics;
use crate::analytics::detection::{extract_braking_zones, extract_corners};
use crate::analytics::error::AnalysisError;
use crate::analytics::results::LapMetrics;
use crate::analytics::{AnalysisConfig, AnalysisFrame};

/// Extract comprehensive lap metrics from a lap's frames.
///
/// Fails on an empty frame slice rather than returning a hollow
/// `LapMetrics` — a lap with no frames isn't a lap that happened to be
/// quiet, it's missing data.
pub fn extract_lap_metrics(
    frames: &[AnalysisFrame],
    config: &AnalysisConfig,
    lap_number: i32,
    lap_time: Option<f64>,
) -> Result<LapMetrics, AnalysisError> {
    if frames.is_empty() {
        return Err(AnalysisError::EmptyLap);
    }

    let braking_zones = extract_braking_zones(frames, config);
    let corners = extract_corners(frames, config);

    let mut speed_stats = SpeedStatistics::new();
    for frame in frames {
        speed_stats.update(frame.speed);
    }

    Ok(LapMetrics::from_detection(
        lap_number,
        lap_time,
        braking_zones,
        corners,
        speed_stats.max(),
        speed_stats.min(),
    ))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[allow(clippy::too_many_arguments)]
    fn make_frame(
        brake: f64,
        throttle: f64,
        speed: f64,
        lap_distance: f64,
        steering: f64,
        lateral_g: f64,
        timestamp: f64,
    ) -> AnalysisFrame {
        AnalysisFrame::new(brake, throttle, speed, lap_distance, steering, lateral_g, 0.0, timestamp)
    }

    fn default_config() -> AnalysisConfig {
        AnalysisConfig::default()
    }

    #[test]
    fn empty_frames_is_an_error() {
        let frames: Vec<AnalysisFrame> = vec![];
        let result = extract_lap_metrics(&frames, &default_config(), 1, Some(90.0));
        assert!(matches!(result, Err(AnalysisError::EmptyLap)));
    }

    #[test]
    fn single_frame_lap_has_no_events() {
        let frames = vec![make_frame(0.0, 0.5, 55.0, 0.0, 0.0, 0.0, 0.0)];
        let metrics = extract_lap_metrics(&frames, &default_config(), 1, None).unwrap();

        assert!(metrics.braking_zones.is_empty());
        assert!(metrics.corners.is_empty());
        assert_eq!(metrics.max_speed, 55.0);
        assert_eq!(metrics.min_speed, 55.0);
    }

    #[test]
    fn speed_statistics_span_the_whole_lap() {
        let frames = vec![
            make_frame(0.0, 0.5, 50.0, 0.0, 0.0, 0.0, 0.0),
            make_frame(0.0, 0.5, 100.0, 10.0, 0.0, 0.0, 1.0),
            make_frame(0.0, 0.5, 30.0, 20.0, 0.0, 0.0, 2.0),
            make_frame(0.0, 0.5, 80.0, 30.0, 0.0, 0.0, 3.0),
        ];

        let metrics = extract_lap_metrics(&frames, &default_config(), 1, None).unwrap();

        assert_eq!(metrics.max_speed, 100.0);
        assert_eq!(metrics.min_speed, 30.0);
    }

    #[test]
    fn combined_braking_and_corner_in_one_lap() {
        let frames = vec![
            make_frame(0.0, 0.8, 80.0, 30.0, 0.0, 0.0, 0.0),
            make_frame(0.9, 0.0, 70.0, 35.0, 0.0, 0.0, 0.5),
            make_frame(0.7, 0.0, 55.0, 40.0, 0.3, 2.0, 1.0),
            make_frame(0.4, 0.0, 45.0, 45.0, 0.35, 2.5, 1.5),
            make_frame(0.0, 0.0, 40.0, 50.0, 0.3, 2.2, 2.0),
            make_frame(0.0, 0.3, 50.0, 55.0, 0.0, 0.5, 2.5),
            make_frame(0.0, 0.6, 65.0, 60.0, 0.0, 0.2, 3.0),
        ];

        let metrics = extract_lap_metrics(&frames, &default_config(), 5, Some(85.5)).unwrap();

        assert_eq!(metrics.lap_number, 5);
        assert_eq!(metrics.lap_time, Some(85.5));
        assert_eq!(metrics.total_braking_zones, 1);
        assert_eq!(metrics.total_corners, 1);

        let brake_zone = &metrics.braking_zones[0];
        assert!(brake_zone.max_brake_pressure >= 0.7);
        assert!(brake_zone.has_trail_braking);

        let corner = &metrics.corners[0];
        assert!(corner.max_lateral_g >= 2.0);
        assert!(corner.apex_speed <= 50.0);
    }
}
