//! Metrics upload handler: sends extracted lap metrics to the server (C8).

use std::sync::Arc;

use async_trait::async_trait;
use eventbus::{EventHandler, HandlerContext, HandlerError};
use racing_coach_core::analytics::{BrakingMetrics, CornerMetrics, LapMetrics};
use racing_coach_core::model::{Event, LapMetricsPayload, MetricsUploadResultPayload};
use tracing::{error, info};

use crate::api::{ApiError, BrakingMetricsApi, CornerMetricsApi, LapMetricsApi, RacingCoachClient};

/// Uploads extracted lap metrics and reports the outcome as a
/// `MetricsUploadResult` event, success or failure.
pub struct MetricsUploadHandler {
    api_client: Arc<RacingCoachClient>,
    enabled: bool,
}

impl MetricsUploadHandler {
    pub fn new(api_client: Arc<RacingCoachClient>) -> Self {
        Self {
            api_client,
            enabled: true,
        }
    }

    /// Create a disabled handler (for testing or offline mode)
    pub fn disabled() -> Self {
        Self {
            api_client: Arc::new(RacingCoachClient::new("http://localhost:8000")),
            enabled: false,
        }
    }

    fn convert_braking(metrics: &BrakingMetrics) -> BrakingMetricsApi {
        BrakingMetricsApi {
            braking_point_distance: metrics.braking_point_distance as f32,
            braking_point_speed: metrics.braking_point_speed as f32,
            end_distance: metrics.end_distance as f32,
            max_brake_pressure: metrics.max_brake_pressure as f32,
            braking_duration: metrics.braking_duration as f32,
            minimum_speed: metrics.minimum_speed as f32,
            initial_deceleration: metrics.initial_deceleration as f32,
            average_deceleration: metrics.average_deceleration as f32,
            braking_efficiency: metrics.braking_efficiency as f32,
            has_trail_braking: metrics.has_trail_braking,
            trail_brake_distance: metrics.trail_brake_distance as f32,
            trail_brake_percentage: metrics.trail_brake_percentage as f32,
        }
    }

    fn convert_corner(metrics: &CornerMetrics) -> CornerMetricsApi {
        CornerMetricsApi {
            turn_in_distance: metrics.turn_in_distance as f32,
            apex_distance: metrics.apex_distance as f32,
            exit_distance: metrics.exit_distance as f32,
            throttle_application_distance: metrics.throttle_application_distance as f32,
            turn_in_speed: metrics.turn_in_speed as f32,
            apex_speed: metrics.apex_speed as f32,
            exit_speed: metrics.exit_speed as f32,
            throttle_application_speed: metrics.throttle_application_speed as f32,
            max_lateral_g: metrics.max_lateral_g as f32,
            time_in_corner: metrics.time_in_corner as f32,
            corner_distance: metrics.corner_distance as f32,
            max_steering_angle: metrics.max_steering_angle as f32,
            speed_loss: metrics.speed_loss as f32,
            speed_gain: metrics.speed_gain as f32,
        }
    }

    fn convert_metrics(metrics: &LapMetrics) -> LapMetricsApi {
        LapMetricsApi {
            lap_number: metrics.lap_number,
            lap_time: metrics.lap_time,
            braking_zones: metrics.braking_zones.iter().map(Self::convert_braking).collect(),
            corners: metrics.corners.iter().map(Self::convert_corner).collect(),
            total_corners: metrics.total_corners as i32,
            total_braking_zones: metrics.total_braking_zones as i32,
            average_corner_speed: metrics.average_corner_speed as f32,
            max_speed: metrics.max_speed as f32,
            min_speed: metrics.min_speed as f32,
        }
    }

    async fn handle_lap_metrics(
        &self,
        payload: &LapMetricsPayload,
        ctx: &HandlerContext<Event>,
    ) -> Result<(), HandlerError> {
        if !self.enabled {
            info!(lap_id = %payload.lap_id, "metrics upload disabled, skipping");
            return Ok(());
        }

        let api_metrics = Self::convert_metrics(&payload.metrics);

        let result = match self.api_client.upload_metrics(&api_metrics, payload.lap_id).await {
            Ok(response) => {
                info!(
                    lap_id = %payload.lap_id,
                    id = response.lap_metrics_id,
                    "lap metrics uploaded successfully"
                );
                MetricsUploadResultPayload {
                    ok: true,
                    lap_id: payload.lap_id,
                    error_message: None,
                }
            }
            Err(e) => {
                error!(lap_id = %payload.lap_id, error = %e, "metrics upload failed");
                MetricsUploadResultPayload {
                    ok: false,
                    lap_id: payload.lap_id,
                    error_message: Some(format_error(&e)),
                }
            }
        };

        ctx.publish(Event::MetricsUploadResult(result)).await?;
        Ok(())
    }
}

fn format_error(e: &ApiError) -> String {
    e.to_string()
}

#[async_trait]
impl EventHandler<Event> for MetricsUploadHandler {
    fn name(&self) -> &'static str {
        "MetricsUploadHandler"
    }

    async fn handle(&self, event: &Event, ctx: &HandlerContext<Event>) -> Result<(), HandlerError> {
        match event {
            Event::LapMetrics(payload) => self.handle_lap_metrics(payload, ctx).await,
            _ => Ok(()),
        }
    }
}
