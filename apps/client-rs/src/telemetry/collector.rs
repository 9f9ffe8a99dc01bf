//! Telemetry collector that bridges telemetry sources to the event bus (C5).

use std::sync::Arc;

use chrono::Utc;
use eventbus::EventPublisher;
use futures::StreamExt;
use racing_coach_core::model::{Event, SessionFrame, TelemetryEventPayload};
use tokio::sync::watch;
use tokio_util::sync::CancellationToken;
use tracing::{debug, error, info, warn};
use uuid::Uuid;

use super::source::{SessionMetadata, TelemetrySource, TelemetrySourceConfig, TelemetrySourceError};

/// Telemetry collector errors
#[derive(Debug, thiserror::Error)]
pub enum CollectorError {
    #[error("source error: {0}")]
    SourceError(#[from] TelemetrySourceError),
}

/// Telemetry collector that collects frames and publishes events
pub struct TelemetryCollector {
    config: TelemetrySourceConfig,
    cancel: CancellationToken,
    current_session_id: watch::Sender<Option<Uuid>>,
}

impl TelemetryCollector {
    /// Create a new telemetry collector
    pub fn new(config: TelemetrySourceConfig) -> Self {
        let (session_tx, _) = watch::channel(None);
        Self {
            config,
            cancel: CancellationToken::new(),
            current_session_id: session_tx,
        }
    }

    /// Get a watch receiver for the current session ID
    pub fn session_id_receiver(&self) -> watch::Receiver<Option<Uuid>> {
        self.current_session_id.subscribe()
    }

    /// Start collecting telemetry and publishing events.
    ///
    /// Connects to the configured telemetry source, publishes `SessionStart`
    /// with whatever session metadata the source can provide, streams frames
    /// as `TelemetryEvent`s, and publishes `SessionEnd` once the source's
    /// frame stream ends or collection is cancelled.
    pub async fn run(self, publisher: EventPublisher<Event>) -> Result<(), CollectorError> {
        info!("starting telemetry collector in {:?} mode", self.config.mode);

        let source = TelemetrySource::create(&self.config).await?;

        let session_metadata = self.wait_for_session_metadata(&source).await;
        let session_id = Uuid::new_v4();
        let _ = self.current_session_id.send(Some(session_id));

        if let Some(metadata) = session_metadata {
            self.publish_session_start(&publisher, &metadata, session_id).await;
        } else {
            warn!("no session metadata available, proceeding without SessionStart");
        }

        let mut frame_stream = source.subscribe();
        let mut frame_count: u64 = 0;
        info!("starting telemetry collection loop");

        loop {
            tokio::select! {
                _ = self.cancel.cancelled() => {
                    info!("collector cancelled");
                    break;
                }
                frame = frame_stream.next() => {
                    match frame {
                        Some(telemetry_frame) => {
                            frame_count += 1;
                            let lap_number = telemetry_frame.lap_number;
                            let lap_distance_pct = telemetry_frame.lap_distance_pct;

                            let event = Event::TelemetryEvent(TelemetryEventPayload {
                                frame: telemetry_frame,
                                session_id,
                            });

                            if let Err(e) = publisher.publish(event).await {
                                error!("failed to publish telemetry event: {}", e);
                            }

                            if frame_count % 1000 == 0 {
                                debug!(
                                    "collected {} frames (lap {}, {:.1}%)",
                                    frame_count,
                                    lap_number,
                                    lap_distance_pct * 100.0
                                );
                            }
                        }
                        None => {
                            if source.is_terminal_disconnect() {
                                info!("telemetry stream ended");
                                break;
                            }
                            warn!("telemetry stream ended unexpectedly, retrying in 1s");
                            tokio::time::sleep(std::time::Duration::from_secs(1)).await;
                            frame_stream = source.subscribe();
                        }
                    }
                }
            }
        }

        self.publish_session_end(&publisher, session_id).await;
        let _ = self.current_session_id.send(None);

        info!("telemetry collection complete: {} frames collected", frame_count);
        Ok(())
    }

    /// Wait briefly for session metadata to become available.
    async fn wait_for_session_metadata(&self, source: &TelemetrySource) -> Option<SessionMetadata> {
        if let Some(metadata) = source.session_metadata() {
            return Some(metadata);
        }

        info!("waiting for session info...");
        for _ in 0..50 {
            if self.cancel.is_cancelled() {
                return None;
            }
            tokio::time::sleep(std::time::Duration::from_millis(100)).await;
            if let Some(metadata) = source.session_metadata() {
                return Some(metadata);
            }
        }
        warn!("timed out waiting for session info");
        None
    }

    async fn publish_session_start(
        &self,
        publisher: &EventPublisher<Event>,
        metadata: &SessionMetadata,
        session_id: Uuid,
    ) {
        let session_frame = SessionFrame {
            session_id,
            timestamp: Utc::now(),
            track_id: metadata.track_id,
            track_name: metadata.track_name.clone(),
            track_config_name: metadata.track_config_name.clone(),
            track_type: metadata.track_type.clone(),
            car_id: metadata.car_id,
            car_name: metadata.car_name.clone(),
            car_class_id: metadata.car_class_id,
            series_id: metadata.series_id,
            session_type: metadata.session_type.clone(),
        };

        info!(
            "starting session: {} - {} ({})",
            session_frame.track_name, session_frame.car_name, session_id
        );

        if let Err(e) = publisher.publish(Event::SessionStart(session_frame)).await {
            error!("failed to publish session start event: {}", e);
        }
    }

    async fn publish_session_end(&self, publisher: &EventPublisher<Event>, session_id: Uuid) {
        info!("session ended: {}", session_id);

        if let Err(e) = publisher.publish(Event::SessionEnd { session_id }).await {
            error!("failed to publish session end event: {}", e);
        }
    }

    /// Request graceful shutdown
    pub fn shutdown(&self) {
        info!("collector shutdown requested");
        self.cancel.cancel();
    }

    /// Get cancellation token for external use
    pub fn cancel_token(&self) -> CancellationToken {
        self.cancel.clone()
    }
}
