//! Braking metrics result structure.

/// Comprehensive braking metrics for a single braking zone.
///
/// Contains location, performance, deceleration, and trail braking data.
#[derive(Debug, Clone)]
pub struct BrakingMetrics {
    /// Lap distance (m) where braking starts.
    pub braking_point_distance: f64,
    /// Speed when braking starts (m/s).
    pub braking_point_speed: f64,
    /// Lap distance (m) where braking ends.
    pub end_distance: f64,

    /// Maximum brake pressure applied (0-1).
    pub max_brake_pressure: f64,
    /// Duration of braking in seconds.
    pub braking_duration: f64,
    /// Minimum speed reached during braking (m/s).
    pub minimum_speed: f64,

    /// Initial deceleration rate over the configured window (m/s²), negative for decel.
    pub initial_deceleration: f64,
    /// Average deceleration during the entire braking zone (m/s²), negative for decel.
    pub average_deceleration: f64,
    /// Braking efficiency: |deceleration| / brake_pressure.
    pub braking_efficiency: f64,

    /// Whether trail braking was detected (braking while steering).
    pub has_trail_braking: bool,
    /// Track distance of trail braking overlap.
    pub trail_brake_distance: f64,
    /// Average brake pressure during the trail braking phase.
    pub trail_brake_percentage: f64,
}

impl BrakingMetrics {
    #[allow(clippy::too_many_arguments)]
    pub fn new(
        braking_point_distance: f64,
        braking_point_speed: f64,
        end_distance: f64,
        max_brake_pressure: f64,
        braking_duration: f64,
        minimum_speed: f64,
        initial_deceleration: f64,
        average_deceleration: f64,
        braking_efficiency: f64,
        has_trail_braking: bool,
        trail_brake_distance: f64,
        trail_brake_percentage: f64,
    ) -> Self {
        Self {
            braking_point_distance,
            braking_point_speed,
            end_distance,
            max_brake_pressure,
            braking_duration,
            minimum_speed,
            initial_deceleration,
            average_deceleration,
            braking_efficiency,
            has_trail_braking,
            trail_brake_distance,
            trail_brake_percentage,
        }
    }
}

/// Builder for accumulating braking metrics during detection.
#[derive(Debug)]
pub struct BrakingMetricsBuilder {
    pub start_idx: usize,
    pub start_distance: f64,
    pub start_speed: f64,
    pub start_timestamp: f64,
    pub max_pressure: f64,
    pub min_speed: f64,
}

impl BrakingMetricsBuilder {
    pub fn new(idx: usize, distance: f64, speed: f64, brake: f64, timestamp: f64) -> Self {
        Self {
            start_idx: idx,
            start_distance: distance,
            start_speed: speed,
            start_timestamp: timestamp,
            max_pressure: brake,
            min_speed: speed,
        }
    }

    pub fn update(&mut self, brake: f64, speed: f64) {
        self.max_pressure = self.max_pressure.max(brake);
        self.min_speed = self.min_speed.min(speed);
    }
}
