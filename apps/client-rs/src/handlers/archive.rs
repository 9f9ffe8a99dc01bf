//! Lap archive handler: optional local persistence of completed laps (A5).
//!
//! Writes each completed lap to its own JSONL file under a configured
//! directory, using the same on-disk format the replay source reads back.
//! Purely a side channel — write failures are logged and never surface as a
//! bus event, since nothing downstream consumes archived laps at runtime.

use std::path::PathBuf;

use async_trait::async_trait;
use eventbus::{EventHandler, HandlerContext, HandlerError};
use racing_coach_core::model::{Event, LapCompletedPayload};
use racing_coach_core::persistence;
use tracing::{error, info};

pub struct LapArchiveHandler {
    dir: PathBuf,
}

impl LapArchiveHandler {
    pub fn new(dir: PathBuf) -> Self {
        Self { dir }
    }

    fn lap_path(&self, payload: &LapCompletedPayload) -> PathBuf {
        self.dir
            .join(format!("{}-lap{}.jsonl", payload.lap_id, payload.lap.lap_number()))
    }

    async fn handle_lap_completed(&self, payload: &LapCompletedPayload) {
        let path = self.lap_path(payload);
        let frames = payload.lap.frames().to_vec();
        let lap_time = payload.lap.lap_time;

        let result = tokio::task::spawn_blocking(move || -> Result<(), persistence::PersistenceError> {
            let file = std::fs::File::create(&path)?;
            persistence::write_lap(file, &frames, lap_time)
        })
        .await;

        match result {
            Ok(Ok(())) => info!(lap_id = %payload.lap_id, "lap archived to disk"),
            Ok(Err(e)) => error!(lap_id = %payload.lap_id, error = %e, "failed to archive lap"),
            Err(e) => error!(lap_id = %payload.lap_id, error = %e, "archive task panicked"),
        }
    }
}

#[async_trait]
impl EventHandler<Event> for LapArchiveHandler {
    fn name(&self) -> &'static str {
        "LapArchiveHandler"
    }

    async fn handle(&self, event: &Event, _ctx: &HandlerContext<Event>) -> Result<(), HandlerError> {
        if let Event::LapCompleted(payload) = event {
            self.handle_lap_completed(payload).await;
        }
        Ok(())
    }
}
