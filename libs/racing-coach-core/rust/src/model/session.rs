//! Session metadata snapshot (C1).

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Metadata describing a racing session. Immutable once emitted on
/// `SessionStart` until the next `SessionStart`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SessionFrame {
    pub session_id: Uuid,
    pub timestamp: DateTime<Utc>,

    pub track_id: i32,
    pub track_name: String,
    pub track_config_name: Option<String>,
    pub track_type: String,

    pub car_id: i32,
    pub car_name: String,
    pub car_class_id: i32,

    pub series_id: i32,
    #[serde(default = "default_session_type")]
    pub session_type: String,
}

fn default_session_type() -> String {
    "Practice".to_string()
}
