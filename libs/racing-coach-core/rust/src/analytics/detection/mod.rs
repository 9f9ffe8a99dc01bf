//! Event detection for braking zones and corners.

mod braking;
mod corner;

pub use braking::{extract_braking_zones, BrakingDetector};
pub use corner::{extract_corners, CornerDetector};

use crate::analytics::AnalysisFrame;

/// Detects driving events from a stream of frames processed one at a time.
pub trait EventDetector {
    /// Accumulates event data until the detector decides the event is complete.
    type Builder;

    /// Process a single frame, potentially completing an event.
    ///
    /// Returns `Some(builder)` on a state transition from active to idle.
    /// The caller finalizes the builder into a result using the full frame
    /// slice.
    fn process_frame(&mut self, frame: &AnalysisFrame, index: usize) -> Option<Self::Builder>;

    /// Finalize any in-progress event at the end of the sequence (a zone
    /// that never dropped back below threshold before the lap ended).
    fn finalize(&mut self) -> Option<Self::Builder>;

    /// Reset to the initial state before processing a new lap.
    fn reset(&mut self);
}
