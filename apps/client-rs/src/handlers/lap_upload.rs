//! Lap upload handler: sends completed lap telemetry to the server (C8).

use std::sync::Arc;

use async_trait::async_trait;
use eventbus::{EventHandler, HandlerContext, HandlerError};
use racing_coach_core::model::{
    Event, LapCompletedPayload, LapUploadResultPayload, TelemetryFrame,
};
use tracing::{error, info, warn};

use crate::api::{ApiError, LapTelemetryApi, RacingCoachClient, SessionFrameApi, TelemetryFrameApi};

/// Uploads completed lap telemetry and reports the outcome as a
/// `LapUploadResult` event, success or failure, so the pipeline never stalls
/// on a single bad upload.
pub struct LapUploadHandler {
    api_client: Arc<RacingCoachClient>,
    enabled: bool,
}

impl LapUploadHandler {
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

    fn convert_frame(frame: &TelemetryFrame) -> TelemetryFrameApi {
        TelemetryFrameApi {
            timestamp: frame.timestamp,
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
            latitude: frame.latitude,
            longitude: frame.longitude,
            altitude: frame.altitude,
            tire_temps: frame.tire_temps.clone(),
            tire_wear: frame.tire_wear.clone(),
            brake_line_pressure: frame.brake_line_pressure.clone(),
            track_temp: frame.track_temp,
            track_wetness: frame.track_wetness,
            air_temp: frame.air_temp,
            session_flags: frame.session_flags,
            track_surface: frame.track_surface,
            on_pit_road: frame.on_pit_road,
        }
    }

    async fn handle_lap_completed(
        &self,
        payload: &LapCompletedPayload,
        ctx: &HandlerContext<Event>,
    ) -> Result<(), HandlerError> {
        let lap_number = payload.lap.lap_number();

        if !self.enabled {
            info!(lap_number, "lap upload disabled, skipping");
            return Ok(());
        }

        let api_frames: Vec<TelemetryFrameApi> =
            payload.lap.frames().iter().map(Self::convert_frame).collect();
        let api_lap = LapTelemetryApi {
            frames: api_frames,
            lap_time: payload.lap.lap_time,
        };
        // The server looks up the session by id; the client only needs to
        // echo back the subset of fields it can observe itself here.
        let api_session = SessionFrameApi {
            timestamp: chrono::Utc::now(),
            session_id: payload.session_id,
            track_id: 0,
            track_name: String::new(),
            track_config_name: None,
            track_type: String::new(),
            car_id: 0,
            car_name: String::new(),
            car_class_id: 0,
            series_id: 0,
            session_type: String::new(),
        };

        let result = match self
            .api_client
            .upload_lap(&api_lap, &api_session, payload.lap_id)
            .await
        {
            Ok(response) => {
                info!(lap_number, lap_id = %response.lap_id, "lap uploaded successfully");
                LapUploadResultPayload {
                    ok: true,
                    lap_number,
                    lap_id: payload.lap_id,
                    error_message: None,
                }
            }
            Err(e) => {
                error!(lap_number, error = %e, "lap upload failed");
                LapUploadResultPayload {
                    ok: false,
                    lap_number,
                    lap_id: payload.lap_id,
                    error_message: Some(format_error(&e)),
                }
            }
        };

        ctx.publish(Event::LapUploadResult(result)).await?;
        Ok(())
    }
}

fn format_error(e: &ApiError) -> String {
    e.to_string()
}

#[async_trait]
impl EventHandler<Event> for LapUploadHandler {
    fn name(&self) -> &'static str {
        "LapUploadHandler"
    }

    async fn handle(&self, event: &Event, ctx: &HandlerContext<Event>) -> Result<(), HandlerError> {
        match event {
            Event::LapCompleted(payload) => self.handle_lap_completed(payload, ctx).await,
            _ => Ok(()),
        }
    }
}
