//! Tunable thresholds for braking-zone and corner detection (C7).

/// All defaults match `spec.md` §4.6.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct AnalysisConfig {
    pub brake_threshold: f64,
    pub min_brake_duration: f64,
    pub min_brake_pressure: f64,

    pub steering_threshold: f64,
    pub min_corner_duration: f64,
    pub min_corner_gap: f64,
    pub steering_exit_hysteresis: f64,

    pub throttle_threshold: f64,

    /// Frames used to compute `initial_deceleration` at the start of a zone.
    pub decel_window: usize,

    /// Replaces a negative `Δlap_distance` (wrap-around at start/finish) so
    /// distance accumulations stay positive. Defaults to ~10 km, per §9's
    /// open question; override with a track's known length if known.
    pub wrap_fallback_distance: f64,
}

impl Default for AnalysisConfig {
    fn default() -> Self {
        Self {
            brake_threshold: 0.05,
            min_brake_duration: 0.20,
            min_brake_pressure: 0.10,
            steering_threshold: 0.15,
            min_corner_duration: 0.5,
            min_corner_gap: 0.4,
            steering_exit_hysteresis: 0.35,
            throttle_threshold: 0.05,
            decel_window: 5,
            wrap_fallback_distance: 10_000.0,
        }
    }
}
