//! Configuration module for Racing Coach Client.
//!
//! Provides configuration management via environment variables, config files, and CLI arguments.

use clap::Parser;
use serde::{Deserialize, Serialize};
use std::path::PathBuf;

/// Telemetry source mode
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TelemetryMode {
    /// Live connection to iRacing (Windows only)
    #[default]
    Live,
    /// Replay from a persisted lap file
    Replay,
}

impl std::str::FromStr for TelemetryMode {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "live" => Ok(TelemetryMode::Live),
            "replay" => Ok(TelemetryMode::Replay),
            _ => Err(format!("Invalid telemetry mode: {}. Use 'live' or 'replay'", s)),
        }
    }
}

impl std::fmt::Display for TelemetryMode {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            TelemetryMode::Live => write!(f, "live"),
            TelemetryMode::Replay => write!(f, "replay"),
        }
    }
}

/// CLI arguments for Racing Coach Client
#[derive(Parser, Debug, Clone)]
#[command(name = "racing-coach")]
#[command(author = "Racing Coach Team")]
#[command(version = "0.1.0")]
#[command(about = "AI-powered sim racing coach for iRacing")]
pub struct CliArgs {
    /// Telemetry mode: 'live' for iRacing connection, 'replay' for a persisted lap file
    #[arg(short, long, env = "TELEMETRY_MODE", default_value = "live")]
    pub mode: TelemetryMode,

    /// Path to a persisted lap file (required for replay mode)
    #[arg(long, env = "REPLAY_FILE_PATH")]
    pub replay_file_path: Option<PathBuf>,

    /// Playback speed multiplier for replay mode (1.0 = real-time)
    #[arg(long, env = "REPLAY_SPEED", default_value = "1.0")]
    pub replay_speed: f64,

    /// Loop the replay file at EOF instead of disconnecting
    #[arg(long, env = "REPLAY_LOOP", default_value = "false")]
    pub replay_loop: bool,

    /// Server URL for API endpoints
    #[arg(long, env = "SERVER_URL", default_value = "http://localhost:8000")]
    pub server_url: String,

    /// Enable lap telemetry upload to server
    #[arg(long, env = "UPLOAD_ENABLED", default_value = "true")]
    pub upload: bool,

    /// Log level (trace, debug, info, warn, error)
    #[arg(long, env = "LOG_LEVEL", default_value = "info")]
    pub log_level: String,

    /// Minimum previous-frame lap-distance fraction for a lap transition to
    /// count as a completed lap rather than a reset/out-lap (0.0-1.0)
    #[arg(long, env = "LAP_COMPLETION_THRESHOLD", default_value = "0.9")]
    pub lap_completion_threshold: f32,

    /// Directory to archive completed laps to, in JSONL. Archival is
    /// disabled unless this is set.
    #[arg(long, env = "ARCHIVE_DIR")]
    pub archive_dir: Option<PathBuf>,
}

impl CliArgs {
    /// Validate the configuration
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.mode == TelemetryMode::Replay && self.replay_file_path.is_none() {
            return Err(ConfigError::MissingReplayFile);
        }

        if self.replay_speed <= 0.0 {
            return Err(ConfigError::InvalidPlaybackSpeed(self.replay_speed));
        }

        if !(0.0..=1.0).contains(&self.lap_completion_threshold) {
            return Err(ConfigError::InvalidThreshold(self.lap_completion_threshold));
        }

        if let Some(ref path) = self.replay_file_path {
            if self.mode == TelemetryMode::Replay && !path.exists() {
                return Err(ConfigError::ReplayFileNotFound(path.clone()));
            }
        }

        Ok(())
    }
}

/// Application configuration
#[derive(Debug, Clone)]
pub struct Config {
    /// Telemetry mode
    pub mode: TelemetryMode,
    /// Path to a persisted lap file (for replay mode)
    pub replay_file_path: Option<PathBuf>,
    /// Playback speed multiplier
    pub replay_speed: f64,
    /// Loop the replay file at EOF instead of disconnecting
    pub replay_loop: bool,
    /// Server base URL
    pub server_url: String,
    /// Whether to upload telemetry to server
    pub upload_enabled: bool,
    /// Log level
    pub log_level: String,
    /// Minimum previous-frame lap-distance fraction for a completed-lap transition
    pub lap_completion_threshold: f32,
    /// Directory to archive completed laps to, if local archival is enabled
    pub archive_dir: Option<PathBuf>,
}

impl Config {
    /// Create configuration from CLI arguments
    pub fn from_args(args: CliArgs) -> Result<Self, ConfigError> {
        args.validate()?;

        Ok(Self {
            mode: args.mode,
            replay_file_path: args.replay_file_path,
            replay_speed: args.replay_speed,
            replay_loop: args.replay_loop,
            server_url: args.server_url,
            upload_enabled: args.upload,
            log_level: args.log_level,
            lap_completion_threshold: args.lap_completion_threshold,
            archive_dir: args.archive_dir,
        })
    }

    /// Load configuration from environment and CLI
    pub fn load() -> Result<Self, ConfigError> {
        let _ = dotenvy::dotenv();

        let args = CliArgs::parse();
        Self::from_args(args)
    }

    /// Get the API base URL for telemetry endpoints
    pub fn telemetry_api_url(&self) -> String {
        format!("{}/api/v1/telemetry", self.server_url)
    }

    /// Get the API base URL for metrics endpoints
    pub fn metrics_api_url(&self) -> String {
        format!("{}/api/v1/metrics", self.server_url)
    }

    /// Get the API base URL for sessions endpoints
    pub fn sessions_api_url(&self) -> String {
        format!("{}/api/v1/sessions", self.server_url)
    }

    /// Get the health check URL
    pub fn health_url(&self) -> String {
        format!("{}/api/v1/health", self.server_url)
    }
}

impl Default for Config {
    fn default() -> Self {
        Self {
            mode: TelemetryMode::Live,
            replay_file_path: None,
            replay_speed: 1.0,
            replay_loop: false,
            server_url: "http://localhost:8000".to_string(),
            upload_enabled: true,
            log_level: "info".to_string(),
            lap_completion_threshold: 0.9,
            archive_dir: None,
        }
    }
}

/// Configuration errors
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("replay file path is required for replay mode")]
    MissingReplayFile,

    #[error("replay file not found: {0}")]
    ReplayFileNotFound(PathBuf),

    #[error("invalid playback speed: {0}. Must be positive")]
    InvalidPlaybackSpeed(f64),

    #[error("invalid lap completion threshold: {0}. Must be between 0.0 and 1.0")]
    InvalidThreshold(f32),

    #[error("configuration error: {0}")]
    Other(String),
}
