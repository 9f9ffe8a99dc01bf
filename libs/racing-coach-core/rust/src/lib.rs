//! Shared telemetry data model, session bookkeeping, and lap analytics.
//!
//! - [`model`] - the telemetry/session/lap/event types shared across the bus
//! - [`session_registry`] - tracks the currently active session
//! - [`analytics`] - braking zone and corner detection, lap metrics
//! - [`persistence`] - the at-rest columnar lap format

pub mod analytics;
pub mod model;
pub mod persistence;
pub mod session_registry;

pub use session_registry::SessionRegistry;
