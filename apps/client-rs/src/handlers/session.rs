//! Session registry handler: keeps the shared `SessionRegistry` in sync with
//! `SessionStart`/`SessionEnd` events (C3).
//!
//! The registry itself has no bus awareness; this is the one place that
//! bridges the two, so every other handler can query the registry instead of
//! threading session state through its own constructor.

use std::sync::Arc;

use async_trait::async_trait;
use eventbus::{EventHandler, HandlerContext, HandlerError};
use racing_coach_core::model::Event;
use racing_coach_core::SessionRegistry;

pub struct SessionRegistryHandler {
    registry: Arc<SessionRegistry>,
}

impl SessionRegistryHandler {
    pub fn new(registry: Arc<SessionRegistry>) -> Self {
        Self { registry }
    }
}

#[async_trait]
impl EventHandler<Event> for SessionRegistryHandler {
    fn name(&self) -> &'static str {
        "SessionRegistryHandler"
    }

    async fn handle(&self, event: &Event, _ctx: &HandlerContext<Event>) -> Result<(), HandlerError> {
        match event {
            Event::SessionStart(session) => self.registry.start_session(session.clone()),
            Event::SessionEnd { session_id } => self.registry.end_session(*session_id),
            _ => {}
        }
        Ok(())
    }
}
