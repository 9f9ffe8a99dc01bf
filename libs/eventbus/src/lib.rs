//! Generic typed pub/sub event bus.
//!
//! Producer threads publish typed events onto a bounded FIFO; a single
//! dispatcher task fans each event out to the handlers registered for its
//! kind and runs them concurrently on a bounded worker pool, awaiting all of
//! them before moving to the next event. Handlers that publish further
//! events from within `handle` go out over a separate unbounded channel the
//! same dispatcher drains, so a saturated bounded queue never deadlocks a
//! handler re-publishing into it. See [`EventBus`] for the full contract.

mod bus;
mod error;
mod handler;

pub use bus::{EventBus, EventBusConfig, EventLike, EventPublisher};
pub use error::{EventBusError, HandlerError};
pub use handler::{EventHandler, HandlerContext};
