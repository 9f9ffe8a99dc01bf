//! Lap segmenter: buffers telemetry frames and detects lap completion (C6).
//!
//! Watches `lap_number` transitions in the telemetry stream. A transition is
//! a *completed* lap only if the previous frame's `lap_distance_pct` had
//! already crossed the completion threshold; any other transition (a reset
//! to a lower lap number, or the very first timed lap starting from the
//! out-lap) just reseeds the buffer silently.

use async_trait::async_trait;
use eventbus::{EventHandler, HandlerContext, HandlerError};
use racing_coach_core::model::{Event, LapCompletedPayload, LapTelemetry, TelemetryFrame};
use tokio::sync::Mutex;
use tracing::{debug, info, warn};
use uuid::Uuid;

/// Tunable knobs for the segmenter.
#[derive(Debug, Clone, Copy)]
pub struct LapHandlerConfig {
    /// Minimum previous-frame `lap_distance_pct` for a lap-number increase to
    /// count as a completed lap rather than a reset.
    pub lap_completion_threshold: f32,
}

impl Default for LapHandlerConfig {
    fn default() -> Self {
        Self {
            lap_completion_threshold: 0.9,
        }
    }
}

struct SegmenterState {
    current_lap: i32,
    buffer: Vec<TelemetryFrame>,
    previous_frame: Option<TelemetryFrame>,
}

impl SegmenterState {
    fn new() -> Self {
        Self {
            current_lap: -1,
            buffer: Vec::new(),
            previous_frame: None,
        }
    }

    fn reset_to(&mut self, frame: TelemetryFrame) {
        self.current_lap = frame.lap_number;
        self.previous_frame = Some(frame.clone());
        self.buffer = vec![frame];
    }
}

/// Buffers frames for the in-progress lap and emits `LapCompleted` at the
/// forward lap-number transition, once the previous frame crossed the
/// completion threshold.
pub struct LapHandler {
    config: LapHandlerConfig,
    state: Mutex<SegmenterState>,
}

impl LapHandler {
    pub fn new() -> Self {
        Self::with_config(LapHandlerConfig::default())
    }

    pub fn with_config(config: LapHandlerConfig) -> Self {
        Self {
            config,
            state: Mutex::new(SegmenterState::new()),
        }
    }

    async fn handle_frame(
        &self,
        frame: &TelemetryFrame,
        session_id: Uuid,
        ctx: &HandlerContext<Event>,
    ) -> Result<(), HandlerError> {
        let mut state = self.state.lock().await;

        if state.current_lap == -1 {
            debug!(lap = frame.lap_number, "segmenter bootstrap");
            state.reset_to(frame.clone());
            return Ok(());
        }

        if frame.lap_number == state.current_lap {
            state.buffer.push(frame.clone());
            state.previous_frame = Some(frame.clone());
            return Ok(());
        }

        let completed = frame.lap_number > state.current_lap
            && state
                .previous_frame
                .as_ref()
                .is_some_and(|prev| prev.lap_distance_pct >= self.config.lap_completion_threshold);

        if completed {
            let lap_number = state.current_lap;
            let lap_time = lap_time_from_buffer(&state.buffer);
            let frames = std::mem::take(&mut state.buffer);
            state.reset_to(frame.clone());
            drop(state);

            match LapTelemetry::new(frames, lap_time) {
                Ok(lap) => {
                    info!(lap_number, frames = lap.len(), "lap completed");
                    ctx.publish(Event::LapCompleted(LapCompletedPayload {
                        lap,
                        session_id,
                        lap_id: Uuid::new_v4(),
                    }))
                    .await?;
                }
                Err(e) => warn!(lap_number, error = %e, "discarding invalid completed lap"),
            }
        } else {
            debug!(
                from = state.current_lap,
                to = frame.lap_number,
                "discarding incomplete lap buffer on transition"
            );
            state.reset_to(frame.clone());
        }

        Ok(())
    }
}

impl Default for LapHandler {
    fn default() -> Self {
        Self::new()
    }
}

fn lap_time_from_buffer(buffer: &[TelemetryFrame]) -> Option<f64> {
    match (buffer.first(), buffer.last()) {
        (Some(first), Some(last)) if buffer.len() > 1 => {
            Some(last.session_time - first.session_time)
        }
        _ => None,
    }
}

#[async_trait]
impl EventHandler<Event> for LapHandler {
    fn name(&self) -> &'static str {
        "LapHandler"
    }

    async fn handle(&self, event: &Event, ctx: &HandlerContext<Event>) -> Result<(), HandlerError> {
        if let Event::TelemetryEvent(payload) = event {
            self.handle_frame(&payload.frame, payload.session_id, ctx).await?;
        }
        Ok(())
    }
}
