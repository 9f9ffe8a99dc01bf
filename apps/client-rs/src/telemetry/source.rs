//! Telemetry source abstraction for live and replay modes (C4).

use std::path::{Path, PathBuf};
use std::pin::Pin;
use std::time::Duration;

use futures::{Stream, StreamExt};
use racing_coach_core::model::TelemetryFrame;
use racing_coach_core::persistence::{self, PersistenceError};
use tokio::sync::mpsc;
use tokio_stream::wrappers::ReceiverStream;
use tracing::{debug, info};

use super::frame::RacingFrame;
use crate::config::TelemetryMode;

/// The subset of session metadata a source can actually observe. The
/// collector stamps on a `session_id` and timestamp when it turns this into
/// a `SessionStart` event.
#[derive(Debug, Clone)]
pub struct SessionMetadata {
    pub track_id: i32,
    pub track_name: String,
    pub track_config_name: Option<String>,
    pub track_type: String,
    pub car_id: i32,
    pub car_name: String,
    pub car_class_id: i32,
    pub series_id: i32,
    pub session_type: String,
}

/// Telemetry source configuration
#[derive(Debug, Clone)]
pub struct TelemetrySourceConfig {
    pub mode: TelemetryMode,
    pub replay_file_path: Option<PathBuf>,
    pub replay_speed: f64,
    pub replay_loop: bool,
}

/// Errors that can occur when working with telemetry sources
#[derive(Debug, thiserror::Error)]
pub enum TelemetrySourceError {
    #[error("failed to open replay file: {0}")]
    ReplayOpenError(#[from] PersistenceError),

    #[error("replay file contains no frames")]
    EmptyReplay,

    #[error("failed to connect to iRacing: {0}")]
    ConnectionError(String),

    #[error("no replay file path specified for replay mode")]
    MissingReplayFile,
}

/// Abstract telemetry source that can be either live or replay
pub enum TelemetrySource {
    /// Replay from a persisted lap file
    Replay(ReplaySource),

    /// Live connection to iRacing (Windows only)
    #[cfg(windows)]
    Live(LiveSource),
}

impl TelemetrySource {
    /// Create a new telemetry source based on configuration
    pub async fn create(config: &TelemetrySourceConfig) -> Result<Self, TelemetrySourceError> {
        match config.mode {
            TelemetryMode::Replay => {
                let path = config
                    .replay_file_path
                    .as_ref()
                    .ok_or(TelemetrySourceError::MissingReplayFile)?;
                let source = ReplaySource::open(path, config.replay_speed, config.replay_loop)?;
                Ok(TelemetrySource::Replay(source))
            }
            TelemetryMode::Live => {
                #[cfg(windows)]
                {
                    let source = LiveSource::connect().await?;
                    Ok(TelemetrySource::Live(source))
                }
                #[cfg(not(windows))]
                {
                    Err(TelemetrySourceError::ConnectionError(
                        "live mode is only available on Windows".to_string(),
                    ))
                }
            }
        }
    }

    /// Session metadata available from this source, if any yet.
    pub fn session_metadata(&self) -> Option<SessionMetadata> {
        match self {
            TelemetrySource::Replay(source) => Some(source.session_metadata()),
            #[cfg(windows)]
            TelemetrySource::Live(source) => source.session_metadata(),
        }
    }

    /// Subscribe to telemetry frames, already converted to the shared model type.
    pub fn subscribe(&self) -> Pin<Box<dyn Stream<Item = TelemetryFrame> + Send>> {
        match self {
            TelemetrySource::Replay(source) => source.subscribe(),
            #[cfg(windows)]
            TelemetrySource::Live(source) => source.subscribe(),
        }
    }

    /// Whether the frame stream ending should be treated as a terminal
    /// disconnect rather than a momentary gap worth retrying.
    ///
    /// A replay file reaching its end (non-looping) is an unambiguous stop.
    /// A live connection's stream can go idle between sessions or during a
    /// brief iRacing shared-memory gap without the connection itself being
    /// gone, so the collector should sleep and resubscribe instead of
    /// tearing the session down.
    pub fn is_terminal_disconnect(&self) -> bool {
        match self {
            TelemetrySource::Replay(_) => true,
            #[cfg(windows)]
            TelemetrySource::Live(_) => false,
        }
    }
}

/// Replay telemetry source reading a persisted lap file.
pub struct ReplaySource {
    frames: Vec<TelemetryFrame>,
    speed: f64,
    looping: bool,
    metadata: SessionMetadata,
}

impl ReplaySource {
    /// Open a persisted lap file for replay.
    pub fn open<P: AsRef<Path>>(path: P, speed: f64, looping: bool) -> Result<Self, TelemetrySourceError> {
        let path = path.as_ref();
        info!("Opening replay file: {} (speed: {}x, loop: {})", path.display(), speed, looping);

        let (frames, _lap_time) = persistence::read_lap_file(path)?;
        if frames.is_empty() {
            return Err(TelemetrySourceError::EmptyReplay);
        }

        debug!("Replay source loaded {} frames", frames.len());

        let track_name = path
            .file_stem()
            .and_then(|s| s.to_str())
            .unwrap_or("replay")
            .to_string();

        Ok(Self {
            frames,
            speed,
            looping,
            metadata: SessionMetadata {
                track_id: 0,
                track_name,
                track_config_name: None,
                track_type: "replay".to_string(),
                car_id: 0,
                car_name: "Replay".to_string(),
                car_class_id: 0,
                series_id: 0,
                session_type: "Replay".to_string(),
            },
        })
    }

    pub fn session_metadata(&self) -> SessionMetadata {
        self.metadata.clone()
    }

    /// Stream frames back out, paced by the gap between consecutive
    /// `session_time` values divided by the configured speed multiplier.
    pub fn subscribe(&self) -> Pin<Box<dyn Stream<Item = TelemetryFrame> + Send>> {
        let (tx, rx) = mpsc::channel(256);
        let frames = self.frames.clone();
        let speed = self.speed.max(f64::EPSILON);
        let looping = self.looping;

        tokio::spawn(async move {
            loop {
                let mut last_time: Option<f64> = None;
                for frame in &frames {
                    if let Some(last) = last_time {
                        let gap = (frame.session_time - last).max(0.0);
                        if gap > 0.0 {
                            tokio::time::sleep(Duration::from_secs_f64(gap / speed)).await;
                        }
                    }
                    last_time = Some(frame.session_time);

                    if tx.send(frame.clone()).await.is_err() {
                        return;
                    }
                }

                if !looping {
                    break;
                }
                debug!("replay reached end of file, looping");
            }
        });

        Box::pin(ReceiverStream::new(rx))
    }
}

/// Live telemetry source connected to iRacing (Windows only)
#[cfg(windows)]
pub struct LiveSource {
    connection: pitwall::LiveConnection,
}

#[cfg(windows)]
impl LiveSource {
    /// Connect to live iRacing telemetry
    pub async fn connect() -> Result<Self, TelemetrySourceError> {
        info!("Connecting to iRacing...");

        let connection = pitwall::LiveConnection::connect()
            .await
            .map_err(|e| TelemetrySourceError::ConnectionError(e.to_string()))?;

        info!("Connected to iRacing at {}Hz", connection.source_hz());

        Ok(Self { connection })
    }

    pub fn session_metadata(&self) -> Option<SessionMetadata> {
        self.connection.current_session().map(|s| session_info_to_metadata(&s))
    }

    pub fn subscribe(&self) -> Pin<Box<dyn Stream<Item = TelemetryFrame> + Send>> {
        let frames = self.connection.subscribe::<RacingFrame>(pitwall::UpdateRate::Native);
        Box::pin(frames.map(|f| racing_frame_to_telemetry(&f)).boxed())
    }
}

#[cfg(windows)]
fn session_info_to_metadata(session: &pitwall::SessionInfo) -> SessionMetadata {
    let weekend = &session.weekend_info;
    let driver_info = session.driver_info.as_ref();

    let (car_id, car_name, car_class_id) = driver_info
        .and_then(|di| {
            let car_idx = di.driver_car_idx.unwrap_or(0) as usize;
            di.drivers.as_ref()?.get(car_idx).map(|driver| {
                (
                    driver.car_id.unwrap_or(0),
                    driver.car_screen_name.clone().unwrap_or_default(),
                    driver.car_class_id.unwrap_or(0),
                )
            })
        })
        .unwrap_or((0, String::new(), 0));

    SessionMetadata {
        track_id: weekend.track_id.unwrap_or(0),
        track_name: weekend.track_name.clone(),
        track_config_name: weekend.track_config_name.clone(),
        track_type: weekend.track_type.clone().unwrap_or_else(|| "road course".to_string()),
        car_id,
        car_name,
        car_class_id,
        series_id: weekend.series_id.unwrap_or(0),
        session_type: "Practice".to_string(),
    }
}

/// Convert a wire-format `RacingFrame` into the shared telemetry model.
/// Per-wheel and GPS fields aren't present on the iRacing SDK variables this
/// frame maps, so they default to empty/zero.
fn racing_frame_to_telemetry(frame: &RacingFrame) -> TelemetryFrame {
    TelemetryFrame {
        timestamp: chrono::Utc::now(),
        session_time: frame.session_time,
        lap_number: frame.lap_number,
        lap_distance_pct: frame.lap_distance_pct,
        lap_distance: frame.lap_distance,
        current_lap_time: frame.current_lap_time,
        last_lap_time: frame.last_lap_time,
        best_lap_time: frame.best_lap_time,
        speed: frame.speed,
        rpm: frame.rpm,
        gear: frame.gear,
        throttle: frame.throttle,
        brake: frame.brake,
        clutch: frame.clutch,
        steering_angle: frame.steering_angle,
        lateral_acceleration: frame.lateral_acceleration,
        longitudinal_acceleration: frame.longitudinal_acceleration,
        vertical_acceleration: frame.vertical_acceleration,
        yaw_rate: frame.yaw_rate,
        roll_rate: frame.roll_rate,
        pitch_rate: frame.pitch_rate,
        velocity_x: frame.velocity_x,
        velocity_y: frame.velocity_y,
        velocity_z: frame.velocity_z,
        yaw: frame.yaw,
        pitch: frame.pitch,
        roll: frame.roll,
        latitude: 0.0,
        longitude: 0.0,
        altitude: 0.0,
        tire_temps: Default::default(),
        tire_wear: Default::default(),
        brake_line_pressure: Default::default(),
        track_temp: frame.track_temp,
        track_wetness: 0,
        air_temp: frame.air_temp,
        session_flags: 0,
        track_surface: 0,
        on_pit_road: frame.on_pit_road,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    fn write_replay_file(path: &std::path::Path) {
        let mut file = std::fs::File::create(path).unwrap();
        for i in 0..3 {
            let frame = sample_frame(i as f64 * 0.1, 1);
            let row = serde_json::json!({
                "timestamp": frame.timestamp,
                "session_time": frame.session_time,
                "lap_number": frame.lap_number,
                "lap_distance_pct": frame.lap_distance_pct,
                "lap_distance": frame.lap_distance,
                "current_lap_time": frame.current_lap_time,
                "last_lap_time": frame.last_lap_time,
                "best_lap_time": frame.best_lap_time,
                "speed": frame.speed,
                "rpm": frame.rpm,
                "gear": frame.gear,
                "throttle": frame.throttle,
                "brake": frame.brake,
                "clutch": frame.clutch,
                "steering_angle": frame.steering_angle,
                "lateral_acceleration": frame.lateral_acceleration,
                "longitudinal_acceleration": frame.longitudinal_acceleration,
                "vertical_acceleration": frame.vertical_acceleration,
                "yaw_rate": frame.yaw_rate,
                "roll_rate": frame.roll_rate,
                "pitch_rate": frame.pitch_rate,
                "velocity_x": frame.velocity_x,
                "velocity_y": frame.velocity_y,
                "velocity_z": frame.velocity_z,
                "yaw": frame.yaw,
                "pitch": frame.pitch,
                "roll": frame.roll,
                "track_temp": frame.track_temp,
                "air_temp": frame.air_temp,
                "on_pit_road": frame.on_pit_road,
                "lap_time": 92.3,
            });
            writeln!(file, "{}", row).unwrap();
        }
    }

    pub(crate) fn sample_frame(session_time: f64, lap_number: i32) -> TelemetryFrame {
        TelemetryFrame {
            timestamp: chrono::Utc::now(),
            session_time,
            lap_number,
            lap_distance_pct: 0.1,
            lap_distance: 100.0,
            current_lap_time: 0.0,
            last_lap_time: 0.0,
            best_lap_time: 0.0,
            speed: 50.0,
            rpm: 6000.0,
            gear: 3,
            throttle: 0.5,
            brake: 0.0,
            clutch: 0.0,
            steering_angle: 0.0,
            lateral_acceleration: 0.0,
            longitudinal_acceleration: 0.0,
            vertical_acceleration: 0.0,
            yaw_rate: 0.0,
            roll_rate: 0.0,
            pitch_rate: 0.0,
            velocity_x: 50.0,
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
            track_temp: 30.0,
            track_wetness: 0,
            air_temp: 25.0,
            session_flags: 0,
            track_surface: 3,
            on_pit_road: false,
        }
    }

    #[test]
    fn test_source_config() {
        let config = TelemetrySourceConfig {
            mode: TelemetryMode::Replay,
            replay_file_path: Some(std::path::PathBuf::from("test.jsonl")),
            replay_speed: 2.0,
            replay_loop: false,
        };

        assert_eq!(config.mode, TelemetryMode::Replay);
        assert_eq!(config.replay_speed, 2.0);
    }

    #[tokio::test]
    async fn replay_source_streams_frames_from_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("lap.jsonl");
        write_replay_file(&path);

        let source = ReplaySource::open(&path, 1000.0, false).unwrap();
        assert_eq!(source.session_metadata().track_name, "lap");

        let mut stream = source.subscribe();
        let mut count = 0;
        while let Some(_frame) = stream.next().await {
            count += 1;
            if count == 3 {
                break;
            }
        }
        assert_eq!(count, 3);
    }

    #[tokio::test]
    async fn replay_end_of_file_is_a_terminal_disconnect() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("lap.jsonl");
        write_replay_file(&path);

        let source = TelemetrySource::Replay(ReplaySource::open(&path, 1000.0, false).unwrap());
        assert!(source.is_terminal_disconnect());
    }

    #[test]
    fn empty_replay_file_is_rejected() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("empty.jsonl");
        std::fs::File::create(&path).unwrap();

        let err = ReplaySource::open(&path, 1.0, false).unwrap_err();
        assert!(matches!(err, TelemetrySourceError::EmptyReplay));
    }
}
