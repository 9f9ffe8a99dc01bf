use async_trait::async_trait;
use tokio::sync::mpsc;

use crate::bus::EventLike;
use crate::error::{EventBusError, HandlerError};

/// Passed to every handler invocation. Exposes only `publish`, so a handler
/// can emit downstream events without otherwise reaching into the bus.
///
/// Re-publishing from within a handler is expected (the lap segmenter
/// publishes a completed-lap event from inside its telemetry-frame handler).
/// This goes out over the dispatcher's unbounded republish channel rather
/// than the bounded one producers use, so it always enqueues immediately and
/// never blocks the publishing handler waiting for queue capacity — see the
/// `bus` module doc for why that distinction matters.
#[derive(Clone)]
pub struct HandlerContext<E: EventLike> {
    republish: mpsc::UnboundedSender<E>,
}

impl<E: EventLike> HandlerContext<E> {
    pub(crate) fn new(republish: mpsc::UnboundedSender<E>) -> Self {
        Self { republish }
    }

    pub async fn publish(&self, event: E) -> Result<(), HandlerError> {
        self.republish
            .send(event)
            .map_err(|_| EventBusError::ChannelClosed)?;
        Ok(())
    }
}

/// A handler registered for one or more event kinds.
#[async_trait]
pub trait EventHandler<E: EventLike>: Send + Sync {
    /// Name used for logging and fault-isolation diagnostics.
    fn name(&self) -> &'static str;

    /// Process one event. A returned `Err` is logged and swallowed by the
    /// dispatcher; it never affects sibling handlers or later events.
    async fn handle(&self, event: &E, ctx: &HandlerContext<E>) -> Result<(), HandlerError>;
}
