//! Deceleration calculation functions.

use crate::analytics::AnalysisFrame;

/// Calculate average deceleration between two frame indices.
///
/// Returns the rate of speed change in m/s². Negative values indicate
/// deceleration (slowing down), positive values indicate acceleration.
/// Returns 0.0 if indices are invalid or the time delta is zero.
pub fn calculate_deceleration(frames: &[AnalysisFrame], start_idx: usize, end_idx: usize) -> f64 {
    if start_idx >= end_idx || end_idx >= frames.len() {
        return 0.0;
    }

    let start_frame = &frames[start_idx];
    let end_frame = &frames[end_idx];

    let speed_delta = end_frame.speed - start_frame.speed;
    let time_delta = end_frame.timestamp - start_frame.timestamp;

    if time_delta <= 0.0 {
        0.0
    } else {
        speed_delta / time_delta
    }
}
