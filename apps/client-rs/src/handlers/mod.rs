//! Event handlers for processing telemetry data.
//!
//! This module contains handlers that react to events from the telemetry collector:
//! - SessionRegistryHandler: Keeps the shared session registry in sync
//! - LapHandler: Buffers frames and detects lap completion
//! - MetricsHandler: Extracts performance metrics from laps
//! - LapUploadHandler: Uploads lap telemetry to server
//! - MetricsUploadHandler: Uploads metrics to server
//! - LapArchiveHandler: Optional local archival of completed laps

pub mod archive;
pub mod lap;
pub mod lap_upload;
pub mod metrics;
pub mod metrics_upload;
pub mod session;

pub use archive::LapArchiveHandler;
pub use lap::LapHandler;
pub use lap_upload::LapUploadHandler;
pub use metrics::MetricsHandler;
pub use metrics_upload::MetricsUploadHandler;
pub use session::SessionRegistryHandler;
