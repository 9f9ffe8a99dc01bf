use thiserror::Error;

/// Errors raised by the bus itself (not by handlers).
#[derive(Debug, Error)]
pub enum EventBusError {
    #[error("event bus is not running")]
    NotRunning,

    #[error("event channel closed")]
    ChannelClosed,
}

/// Errors a handler may return from `handle`.
///
/// Caught by the dispatcher, logged with the handler's name and the event
/// kind, and swallowed — they never propagate to sibling handlers or stop
/// the bus.
#[derive(Debug, Error)]
pub enum HandlerError {
    #[error("handler processing failed: {0}")]
    Processing(String),

    #[error("downstream publish failed: {0}")]
    Publish(#[from] EventBusError),
}
