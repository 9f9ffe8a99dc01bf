//! The event envelope carried on the bus (C1, C2 payload contract).

use eventbus::EventLike;
use uuid::Uuid;

use super::frame::TelemetryFrame;
use super::lap::LapTelemetry;
use super::session::SessionFrame;
use crate::analytics::LapMetrics;

#[derive(Debug, Clone)]
pub struct TelemetryEventPayload {
    pub frame: TelemetryFrame,
    pub session_id: Uuid,
}

#[derive(Debug, Clone)]
pub struct LapCompletedPayload {
    pub lap: LapTelemetry,
    pub session_id: Uuid,
    pub lap_id: Uuid,
}

#[derive(Debug, Clone)]
pub struct LapMetricsPayload {
    pub metrics: LapMetrics,
    pub session_id: Uuid,
    pub lap_id: Uuid,
}

#[derive(Debug, Clone)]
pub struct LapUploadResultPayload {
    pub ok: bool,
    pub lap_number: i32,
    pub lap_id: Uuid,
    pub error_message: Option<String>,
}

#[derive(Debug, Clone)]
pub struct MetricsUploadResultPayload {
    pub ok: bool,
    pub lap_id: Uuid,
    pub error_message: Option<String>,
}

/// Tagged union of every event kind carried on the bus, per §9's "tagged
/// union with a registry keyed by variant tag" option.
#[derive(Debug, Clone)]
pub enum Event {
    SessionStart(SessionFrame),
    SessionEnd { session_id: Uuid },
    TelemetryEvent(TelemetryEventPayload),
    LapCompleted(LapCompletedPayload),
    LapMetrics(LapMetricsPayload),
    LapUploadResult(LapUploadResultPayload),
    MetricsUploadResult(MetricsUploadResultPayload),
}

/// Statically typed discriminant for `Event`. Handlers subscribe by kind and
/// only ever receive payloads matching it.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum EventKind {
    SessionStart,
    SessionEnd,
    TelemetryEvent,
    LapCompleted,
    LapMetrics,
    LapUploadResult,
    MetricsUploadResult,
}

impl EventLike for Event {
    type Kind = EventKind;

    fn kind(&self) -> Self::Kind {
        match self {
            Event::SessionStart(_) => EventKind::SessionStart,
            Event::SessionEnd { .. } => EventKind::SessionEnd,
            Event::TelemetryEvent(_) => EventKind::TelemetryEvent,
            Event::LapCompleted(_) => EventKind::LapCompleted,
            Event::LapMetrics(_) => EventKind::LapMetrics,
            Event::LapUploadResult(_) => EventKind::LapUploadResult,
            Event::MetricsUploadResult(_) => EventKind::MetricsUploadResult,
        }
    }
}
