//! Corner detection.

use crate::analytics::results::{CornerMetrics, CornerMetricsBuilder};
use crate::analytics::{wrap_distance, AnalysisConfig, AnalysisFrame};

use super::EventDetector;

#[derive(Debug, Clone, Copy, PartialEq)]
enum CornerState {
    Idle,
    Active,
}

/// State machine that accumulates metrics for one corner at a time.
///
/// A corner doesn't end the instant steering drops back below threshold:
/// the exit is confirmed only once steering has stayed below threshold for
/// `steering_exit_hysteresis` seconds, so a brief correction mid-corner
/// doesn't split one corner into two. The exit point recorded in the result
/// is the first sub-threshold frame of that run, not the frame where the
/// hysteresis elapsed.
pub struct CornerDetector<'a> {
    config: &'a AnalysisConfig,
    state: CornerState,
    builder: Option<CornerMetricsBuilder>,
    pending_exit_idx: usize,
}

impl<'a> CornerDetector<'a> {
    pub fn new(config: &'a AnalysisConfig) -> Self {
        Self {
            config,
            state: CornerState::Idle,
            builder: None,
            pending_exit_idx: 0,
        }
    }

    /// Frame index of the exit confirmed by the most recent `process_frame`
    /// call that returned `Some`.
    pub fn exit_index(&self) -> usize {
        self.pending_exit_idx
    }

    pub fn finalize_builder(
        &self,
        builder: CornerMetricsBuilder,
        frames: &[AnalysisFrame],
        end_idx: usize,
    ) -> CornerMetrics {
        let exit_frame = &frames[end_idx.min(frames.len() - 1)];

        let time_in_corner = exit_frame.timestamp - builder.turn_in_timestamp;
        let corner_distance = wrap_distance(
            exit_frame.lap_distance - builder.turn_in_distance,
            self.config.wrap_fallback_distance,
        );

        let speed_loss = builder.turn_in_speed - builder.min_speed;
        let speed_gain = exit_frame.speed - builder.min_speed;

        CornerMetrics::new(
            builder.turn_in_distance,
            builder.apex_distance,
            exit_frame.lap_distance,
            if builder.throttle_applied {
                builder.throttle_distance
            } else {
                exit_frame.lap_distance
            },
            builder.turn_in_speed,
            builder.min_speed, // apex_speed = min speed in corner
            exit_frame.speed,
            if builder.throttle_applied {
                builder.throttle_speed
            } else {
                exit_frame.speed
            },
            builder.max_lateral_g,
            time_in_corner,
            corner_distance,
            builder.max_steering,
            speed_loss,
            speed_gain,
        )
    }
}

impl EventDetector for CornerDetector<'_> {
    type Builder = CornerMetricsBuilder;

    fn process_frame(&mut self, frame: &AnalysisFrame, index: usize) -> Option<Self::Builder> {
        let is_turning = frame.steering_angle.abs() > self.config.steering_threshold;

        match self.state {
            CornerState::Idle => {
                if is_turning {
                    self.state = CornerState::Active;
                    self.builder = Some(CornerMetricsBuilder::new(
                        index,
                        frame.lap_distance,
                        frame.speed,
                        frame.timestamp,
                        frame.lateral_acceleration,
                        frame.steering_angle,
                    ));
                }
                None
            }
            CornerState::Active => {
                if is_turning {
                    if let Some(ref mut builder) = self.builder {
                        builder.below_threshold_since = None;
                        builder.below_threshold_idx = None;
                        builder.update(
                            index,
                            frame.lap_distance,
                            frame.speed,
                            frame.lateral_acceleration,
                            frame.steering_angle,
                            frame.throttle,
                            self.config.throttle_threshold,
                        );
                    }
                    return None;
                }

                let builder = self.builder.as_mut().expect("active state always carries a builder");
                match builder.below_threshold_since {
                    None => {
                        builder.below_threshold_since = Some(frame.timestamp);
                        builder.below_threshold_idx = Some(index);
                        builder.update(
                            index,
                            frame.lap_distance,
                            frame.speed,
                            frame.lateral_acceleration,
                            frame.steering_angle,
                            frame.throttle,
                            self.config.throttle_threshold,
                        );
                        None
                    }
                    Some(since) => {
                        if frame.timestamp - since >= self.config.steering_exit_hysteresis {
                            self.state = CornerState::Idle;
                            self.pending_exit_idx = builder.below_threshold_idx.unwrap_or(index);
                            self.builder.take()
                        } else {
                            builder.update(
                                index,
                                frame.lap_distance,
                                frame.speed,
                                frame.lateral_acceleration,
                                frame.steering_angle,
                                frame.throttle,
                                self.config.throttle_threshold,
                            );
                            None
                        }
                    }
                }
            }
        }
    }

    fn finalize(&mut self) -> Option<Self::Builder> {
        if self.state == CornerState::Active {
            self.state = CornerState::Idle;
            self.builder.take()
        } else {
            None
        }
    }

    fn reset(&mut self) {
        self.state = CornerState::Idle;
        self.builder = None;
        self.pending_exit_idx = 0;
    }
}

/// Rebuild a corner builder by scanning `frames[start_idx..=end_idx]` fresh.
/// Used after merging near-neighbor corners, since the merged apex/min-speed/
/// max-steering/throttle-point must be recomputed over the union of both
/// corners' frame ranges rather than stitched together from two builders.
fn rebuild_builder_over_range(
    frames: &[AnalysisFrame],
    config: &AnalysisConfig,
    start_idx: usize,
    end_idx: usize,
) -> CornerMetricsBuilder {
    let start_frame = &frames[start_idx];
    let mut builder = CornerMetricsBuilder::new(
        start_idx,
        start_frame.lap_distance,
        start_frame.speed,
        start_frame.timestamp,
        start_frame.lateral_acceleration,
        start_frame.steering_angle,
    );

    let end_idx = end_idx.min(frames.len() - 1);
    for idx in (start_idx + 1)..=end_idx {
        let frame = &frames[idx];
        builder.update(
            idx,
            frame.lap_distance,
            frame.speed,
            frame.lateral_acceleration,
            frame.steering_angle,
            frame.throttle,
            config.throttle_threshold,
        );
    }
    builder
}

/// Merge corners whose gap (time between one's exit and the next's turn-in)
/// is under `min_corner_gap`, treating them as a single corner.
fn merge_near_neighbors(
    raw: Vec<(usize, usize)>,
    frames: &[AnalysisFrame],
    config: &AnalysisConfig,
) -> Vec<(usize, usize)> {
    let mut merged: Vec<(usize, usize)> = Vec::with_capacity(raw.len());
    for (turn_in_idx, end_idx) in raw {
        if let Some(last) = merged.last_mut() {
            let gap = frames[turn_in_idx].timestamp - frames[last.1].timestamp;
            if gap < config.min_corner_gap {
                last.1 = end_idx;
                continue;
            }
        }
        merged.push((turn_in_idx, end_idx));
    }
    merged
}

/// Extract all corners from telemetry frames.
///
/// Near-neighbor corners (gap under `min_corner_gap`) are merged into one,
/// and corners shorter than `min_corner_duration` after merging are
/// discarded as noise.
pub fn extract_corners(frames: &[AnalysisFrame], config: &AnalysisConfig) -> Vec<CornerMetrics> {
    if frames.is_empty() {
        return vec![];
    }

    let mut detector = CornerDetector::new(config);
    let mut raw: Vec<(usize, usize)> = Vec::with_capacity(25);

    for (idx, frame) in frames.iter().enumerate() {
        if let Some(builder) = detector.process_frame(frame, idx) {
            raw.push((builder.turn_in_idx, detector.exit_index()));
        }
    }

    if let Some(builder) = detector.finalize() {
        raw.push((builder.turn_in_idx, frames.len() - 1));
    }

    merge_near_neighbors(raw, frames, config)
        .into_iter()
        .map(|(start, end)| {
            let builder = rebuild_builder_over_range(frames, config, start, end);
            detector.finalize_builder(builder, frames, end)
        })
        .filter(|corner| corner.time_in_corner >= config.min_corner_duration)
        .collect()
}
