//! Metrics handler: extracts braking/corner metrics from a completed lap (C7).
//!
//! A thin adapter over `racing_coach_core::analytics::extract_lap_metrics`;
//! all detection logic lives in that crate, shared with anything else that
//! wants to analyze a `LapTelemetry`.

use async_trait::async_trait;
use eventbus::{EventHandler, HandlerContext, HandlerError};
use racing_coach_core::analytics::{extract_lap_metrics, AnalysisConfig, AnalysisFrame};
use racing_coach_core::model::{Event, LapCompletedPayload, LapMetricsPayload};
use tracing::{info, warn};

/// Extracts lap metrics from every `LapCompleted` event and republishes the
/// result as `LapMetrics`.
pub struct MetricsHandler {
    config: AnalysisConfig,
}

impl MetricsHandler {
    pub fn new() -> Self {
        Self::with_config(AnalysisConfig::default())
    }

    pub fn with_config(config: AnalysisConfig) -> Self {
        Self { config }
    }

    async fn handle_lap_completed(
        &self,
        payload: &LapCompletedPayload,
        ctx: &HandlerContext<Event>,
    ) -> Result<(), HandlerError> {
        let lap_number = payload.lap.lap_number();
        let frames: Vec<AnalysisFrame> = payload.lap.frames().iter().map(AnalysisFrame::from).collect();

        match extract_lap_metrics(&frames, &self.config, lap_number, payload.lap.lap_time) {
            Ok(metrics) => {
                info!(
                    lap_number,
                    braking_zones = metrics.total_braking_zones,
                    corners = metrics.total_corners,
                    "lap metrics extracted"
                );
                ctx.publish(Event::LapMetrics(LapMetricsPayload {
                    metrics,
                    session_id: payload.session_id,
                    lap_id: payload.lap_id,
                }))
                .await?;
            }
            Err(e) => warn!(lap_number, error = %e, "failed to extract lap metrics"),
        }

        Ok(())
    }
}

impl Default for MetricsHandler {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl EventHandler<Event> for MetricsHandler {
    fn name(&self) -> &'static str {
        "MetricsHandler"
    }

    async fn handle(&self, event: &Event, ctx: &HandlerContext<Event>) -> Result<(), HandlerError> {
        if let Event::LapCompleted(payload) = event {
            self.handle_lap_completed(payload, ctx).await?;
        }
        Ok(())
    }
}
