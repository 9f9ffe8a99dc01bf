//! Braking zone detection.

use crate::analytics::analysis::{calculate_deceleration, detect_trail_braking};
use crate::analytics::results::{BrakingMetrics, BrakingMetricsBuilder};
use crate::analytics::{AnalysisConfig, AnalysisFrame};

use super::EventDetector;

#[derive(Debug, Clone, Copy, PartialEq)]
enum BrakingState {
    Idle,
    Active,
}

/// State machine that accumulates metrics for one braking zone at a time.
pub struct BrakingDetector<'a> {
    config: &'a AnalysisConfig,
    state: BrakingState,
    builder: Option<BrakingMetricsBuilder>,
}

impl<'a> BrakingDetector<'a> {
    pub fn new(config: &'a AnalysisConfig) -> Self {
        Self {
            config,
            state: BrakingState::Idle,
            builder: None,
        }
    }

    pub fn finalize_builder(
        &self,
        builder: BrakingMetricsBuilder,
        frames: &[AnalysisFrame],
        end_idx: usize,
    ) -> BrakingMetrics {
        let end_frame = &frames[end_idx.min(frames.len() - 1)];

        let initial_decel = calculate_deceleration(
            frames,
            builder.start_idx,
            (builder.start_idx + self.config.decel_window).min(end_idx),
        );
        let avg_decel = calculate_deceleration(frames, builder.start_idx, end_idx);

        let efficiency = if builder.max_pressure > 0.0 {
            avg_decel.abs() / builder.max_pressure
        } else {
            0.0
        };

        let trail_info = detect_trail_braking(frames, builder.start_idx, end_idx, self.config);
        let duration = end_frame.timestamp - builder.start_timestamp;

        BrakingMetrics::new(
            builder.start_distance,
            builder.start_speed,
            end_frame.lap_distance,
            builder.max_pressure,
            duration,
            builder.min_speed,
            initial_decel,
            avg_decel,
            efficiency,
            trail_info.has_trail_braking,
            trail_info.distance,
            trail_info.percentage,
        )
    }
}

impl EventDetector for BrakingDetector<'_> {
    type Builder = BrakingMetricsBuilder;

    fn process_frame(&mut self, frame: &AnalysisFrame, index: usize) -> Option<Self::Builder> {
        let is_braking = frame.brake > self.config.brake_threshold;

        match self.state {
            BrakingState::Idle => {
                if is_braking {
                    self.state = BrakingState::Active;
                    self.builder = Some(BrakingMetricsBuilder::new(
                        index,
                        frame.lap_distance,
                        frame.speed,
                        frame.brake,
                        frame.timestamp,
                    ));
                }
                None
            }
            BrakingState::Active => {
                if is_braking {
                    if let Some(ref mut builder) = self.builder {
                        builder.update(frame.brake, frame.speed);
                    }
                    None
                } else {
                    self.state = BrakingState::Idle;
                    self.builder.take()
                }
            }
        }
    }

    fn finalize(&mut self) -> Option<Self::Builder> {
        if self.state == BrakingState::Active {
            self.state = BrakingState::Idle;
            self.builder.take()
        } else {
            None
        }
    }

    fn reset(&mut self) {
        self.state = BrakingState::Idle;
        self.builder = None;
    }
}

/// Extract all braking zones from telemetry frames.
///
/// Zones shorter than `min_brake_duration` or peaking below
/// `min_brake_pressure` are discarded as noise after detection.
pub fn extract_braking_zones(
    frames: &[AnalysisFrame],
    config: &AnalysisConfig,
) -> Vec<BrakingMetrics> {
    if frames.is_empty() {
        return vec![];
    }

    let mut detector = BrakingDetector::new(config);
    let mut pending_builders: Vec<(BrakingMetricsBuilder, usize)> = Vec::new();

    for (idx, frame) in frames.iter().enumerate() {
        if let Some(builder) = detector.process_frame(frame, idx) {
            pending_builders.push((builder, idx.saturating_sub(1)));
        }
    }

    if let Some(builder) = detector.finalize() {
        pending_builders.push((builder, frames.len() - 1));
    }

    pending_builders
        .into_iter()
        .map(|(builder, end_idx)| detector.finalize_builder(builder, frames, end_idx))
        .filter(|zone| {
            zone.braking_duration >= config.min_brake_duration
                && zone.max_brake_pressure >= config.min_brake_pressure
        })
        .collect()
}
