//! A completed lap's frame sequence (C1).

use thiserror::Error;

use super::frame::TelemetryFrame;

/// Violated when constructing a `LapTelemetry` from frames that don't meet
/// its invariants.
#[derive(Debug, Error, PartialEq)]
pub enum LapTelemetryError {
    #[error("lap telemetry sequence must not be empty")]
    Empty,

    #[error("lap_number is not constant across the sequence")]
    InconsistentLapNumber,

    #[error("session_time is not non-decreasing across the sequence")]
    NonMonotonicTime,
}

/// Ordered, non-empty sequence of frames completing one timed lap.
///
/// Invariants enforced by `new`: non-empty, constant `lap_number`, and
/// non-decreasing `session_time`.
#[derive(Debug, Clone, PartialEq)]
pub struct LapTelemetry {
    frames: Vec<TelemetryFrame>,
    pub lap_time: Option<f64>,
}

impl LapTelemetry {
    pub fn new(frames: Vec<TelemetryFrame>, lap_time: Option<f64>) -> Result<Self, LapTelemetryError> {
        let first = frames.first().ok_or(LapTelemetryError::Empty)?;
        let lap_number = first.lap_number;
        let mut last_time = first.session_time;
        for frame in &frames[1..] {
            if frame.lap_number != lap_number {
                return Err(LapTelemetryError::InconsistentLapNumber);
            }
            if frame.session_time < last_time {
                return Err(LapTelemetryError::NonMonotonicTime);
            }
            last_time = frame.session_time;
        }
        Ok(Self { frames, lap_time })
    }

    pub fn frames(&self) -> &[TelemetryFrame] {
        &self.frames
    }

    pub fn lap_number(&self) -> i32 {
        self.frames[0].lap_number
    }

    pub fn len(&self) -> usize {
        self.frames.len()
    }

    pub fn is_empty(&self) -> bool {
        false
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Utc;

    fn frame(lap_number: i32, session_time: f64) -> TelemetryFrame {
        TelemetryFrame {
            timestamp: Utc::now(),
            session_time,
            lap_number,
            lap_distance_pct: 0.0,
            lap_distance: 0.0,
            current_lap_time: 0.0,
            last_lap_time: 0.0,
            best_lap_time: 0.0,
            speed: 0.0,
            rpm: 0.0,
            gear: 0,
            throttle: 0.0,
            brake: 0.0,
            clutch: 0.0,
            steering_angle: 0.0,
            lateral_acceleration: 0.0,
            longitudinal_acceleration: 0.0,
            vertical_acceleration: 0.0,
            yaw_rate: 0.0,
            roll_rate: 0.0,
            pitch_rate: 0.0,
            velocity_x: 0.0,
            velocity_y: 0.0,
            velocity_z: 0.0,
            yaw: 0.0,
            pitch: 0.0,
            roll: 0.0,
            latitude: 0.0,
            longitude: 0.0,
            altitude: 0.0,
            tire_temps: Default::default(),
            tire_wear: Default::default(),
            brake_line_pressure: Default::default(),
            track_temp: 0.0,
            track_wetness: 0,
            air_temp: 0.0,
            session_flags: 0,
            track_surface: 0,
            on_pit_road: false,
        }
    }

    #[test]
    fn rejects_empty() {
        assert_eq!(LapTelemetry::new(vec![], None).unwrap_err(), LapTelemetryError::Empty);
    }

    #[test]
    fn rejects_mixed_lap_numbers() {
        let frames = vec![frame(1, 0.0), frame(2, 0.1)];
        assert_eq!(
            LapTelemetry::new(frames, None).unwrap_err(),
            LapTelemetryError::InconsistentLapNumber
        );
    }

    #[test]
    fn rejects_non_monotonic_time() {
        let frames = vec![frame(1, 1.0), frame(1, 0.5)];
        assert_eq!(
            LapTelemetry::new(frames, None).unwrap_err(),
            LapTelemetryError::NonMonotonicTime
        );
    }

    #[test]
    fn accepts_well_formed_sequence() {
        let frames = vec![frame(1, 0.0), frame(1, 0.1), frame(1, 0.2)];
        let lap = LapTelemetry::new(frames, Some(12.3)).unwrap();
        assert_eq!(lap.lap_number(), 1);
        assert_eq!(lap.len(), 3);
    }
}
