//! Fill simulator: stochastic fill growth and sensor drift for a single bin.
//!
//! These are plain functions over [`Bin`] state; the ECS systems in
//! [`crate::systems`] apply them to the whole fleet. The random source is
//! always passed in so seeded runs are reproducible.

use bevy_ecs::prelude::Resource;
use chrono::{DateTime, Utc};
use rand::Rng;
use serde::{Deserialize, Serialize};

use crate::ecs::{Bin, Connectivity, SensorData};

const MS_PER_HOUR: f64 = 60.0 * 60.0 * 1000.0;

/// Per-invocation sensor degradation parameters.
#[derive(Debug, Clone, Copy, PartialEq, Resource, Serialize, Deserialize)]
#[serde(default)]
pub struct SensorDriftConfig {
    /// Battery loss per invocation is uniform in `[battery_drain_min, battery_drain_max]`.
    pub battery_drain_min: f64,
    pub battery_drain_max: f64,
    /// Probability that a roll lands on `offline`.
    pub offline_probability: f64,
    /// Probability of the next band, `intermittent`.
    pub intermittent_probability: f64,
}

impl Default for SensorDriftConfig {
    fn default() -> Self {
        Self {
            battery_drain_min: 0.01,
            battery_drain_max: 0.05,
            offline_probability: 0.005,
            intermittent_probability: 0.005,
        }
    }
}

/// `1 + (2u - 1) * variability` for a uniform draw `u` in `[0, 1)`.
pub fn random_factor(u: f64, variability: f64) -> f64 {
    1.0 + (2.0 * u - 1.0) * variability
}

/// Fill increment in percentage points over `elapsed_ms` of simulated time.
pub fn fill_increment<R: Rng + ?Sized>(
    bin: &Bin,
    elapsed_ms: u64,
    scenario_multiplier: f64,
    rng: &mut R,
) -> f64 {
    let elapsed_hours = elapsed_ms as f64 / MS_PER_HOUR;
    let base = bin.base_fill_rate_pct_per_hour * elapsed_hours * scenario_multiplier;
    let u: f64 = rng.gen();
    base * random_factor(u, bin.variability_factor)
}

/// Grow the bin's fill level, capped at 100. Returns the new level.
pub fn advance_fill<R: Rng + ?Sized>(
    bin: &mut Bin,
    elapsed_ms: u64,
    scenario_multiplier: f64,
    rng: &mut R,
) -> f64 {
    let increment = fill_increment(bin, elapsed_ms, scenario_multiplier, rng);
    bin.fill_level = (bin.fill_level + increment).clamp(0.0, 100.0);
    bin.fill_level
}

/// Re-roll connectivity. Memoryless: the previous state does not matter.
pub fn roll_connectivity(roll: f64, config: &SensorDriftConfig) -> Connectivity {
    if roll < config.offline_probability {
        Connectivity::Offline
    } else if roll < config.offline_probability + config.intermittent_probability {
        Connectivity::Intermittent
    } else {
        Connectivity::Online
    }
}

/// One sensor transmission: drain the battery and re-roll connectivity.
pub fn drift_sensor<R: Rng + ?Sized>(
    sensor: &mut SensorData,
    config: &SensorDriftConfig,
    at: DateTime<Utc>,
    rng: &mut R,
) {
    let roll: f64 = rng.gen();
    sensor.connectivity = roll_connectivity(roll, config);

    let drain = if config.battery_drain_max > config.battery_drain_min {
        rng.gen_range(config.battery_drain_min..=config.battery_drain_max)
    } else {
        config.battery_drain_min
    };
    sensor.battery_level = (sensor.battery_level - drain.max(0.0)).max(0.0);
    sensor.last_transmission = at;
}
