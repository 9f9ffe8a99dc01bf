//! The per-sample telemetry record (C1).

use std::collections::HashMap;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// One 60 Hz sample of vehicle state.
///
/// Immutable once constructed; identified, outside of this struct, by
/// `(session_id, session_time)`. Per-wheel quantities use `{LF,RF,LR,RR}` as
/// the outer key, matching the iRacing SDK's wheel naming.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TelemetryFrame {
    pub timestamp: DateTime<Utc>,
    pub session_time: f64,

    pub lap_number: i32,
    pub lap_distance_pct: f32,
    pub lap_distance: f32,
    pub current_lap_time: f32,
    pub last_lap_time: f32,
    pub best_lap_time: f32,

    pub speed: f32,
    pub rpm: f32,
    pub gear: i32,

    pub throttle: f32,
    pub brake: f32,
    pub clutch: f32,
    pub steering_angle: f32,

    pub lateral_acceleration: f32,
    pub longitudinal_acceleration: f32,
    pub vertical_acceleration: f32,
    pub yaw_rate: f32,
    pub roll_rate: f32,
    pub pitch_rate: f32,
    pub velocity_x: f32,
    pub velocity_y: f32,
    pub velocity_z: f32,
    pub yaw: f32,
    pub pitch: f32,
    pub roll: f32,

    #[serde(default)]
    pub latitude: f64,
    #[serde(default)]
    pub longitude: f64,
    #[serde(default)]
    pub altitude: f64,

    /// `{LF,RF,LR,RR}` -> `{left,middle,right}` -> degrees.
    #[serde(default)]
    pub tire_temps: HashMap<String, HashMap<String, f32>>,
    /// `{LF,RF,LR,RR}` -> `{left,middle,right}` -> fraction remaining.
    #[serde(default)]
    pub tire_wear: HashMap<String, HashMap<String, f32>>,
    /// `{LF,RF,LR,RR}` -> psi/bar (SDK-unit passthrough).
    #[serde(default)]
    pub brake_line_pressure: HashMap<String, f32>,

    pub track_temp: f32,
    #[serde(default)]
    pub track_wetness: i32,
    pub air_temp: f32,

    #[serde(default)]
    pub session_flags: i64,
    #[serde(default)]
    pub track_surface: i32,
    pub on_pit_road: bool,
}

/// The four wheel keys used by `tire_temps`, `tire_wear`, and
/// `brake_line_pressure`.
pub const WHEELS: [&str; 4] = ["LF", "RF", "LR", "RR"];
