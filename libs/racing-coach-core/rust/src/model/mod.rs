//! Telemetry data model: the immutable frame/session/lap records and the
//! event envelope that carries them across the bus (C1).

mod event;
mod frame;
mod lap;
mod session;

pub use event::{
    Event, EventKind, LapCompletedPayload, LapMetricsPayload, LapUploadResultPayload,
    MetricsUploadResultPayload, TelemetryEventPayload,
};
pub use frame::{TelemetryFrame, WHEELS};
pub use lap::{LapTelemetry, LapTelemetryError};
pub use session::SessionFrame;
