//! Top-level simulation configuration.
//!
//! Every section has defaults, so a partial JSON document is a valid config.

use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::clock::{CadenceConfig, SimSpeed};
use crate::error::{Result, SimError};
use crate::fill::SensorDriftConfig;
use crate::geo::GeoPoint;
use crate::notifications::{AlertThresholds, NotificationConfig};
use crate::planner::PlannerConfig;
use crate::scenario::{FleetParams, Scenario, ScenarioProfile};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SimulationConfig {
    /// `None` draws the RNG seed from OS entropy.
    pub seed: Option<u64>,
    pub fleet: FleetParams,
    pub cadence: CadenceConfig,
    pub planner: PlannerConfig,
    pub scenario_profile: ScenarioProfile,
    pub alerts: AlertThresholds,
    pub sensor_drift: SensorDriftConfig,
    pub notifications: NotificationConfig,
    /// Depot used when routes are generated without an explicit one.
    pub depot: GeoPoint,
    pub initial_scenario: Scenario,
    pub initial_speed: SimSpeed,
}

impl Default for SimulationConfig {
    fn default() -> Self {
        let fleet = FleetParams::default();
        Self {
            seed: None,
            depot: fleet.center,
            fleet,
            cadence: CadenceConfig::default(),
            planner: PlannerConfig::default(),
            scenario_profile: ScenarioProfile::default(),
            alerts: AlertThresholds::default(),
            sensor_drift: SensorDriftConfig::default(),
            notifications: NotificationConfig::default(),
            initial_scenario: Scenario::default(),
            initial_speed: SimSpeed::default(),
        }
    }
}

impl SimulationConfig {
    pub fn with_seed(mut self, seed: u64) -> Self {
        self.seed = Some(seed);
        self
    }

    pub fn with_fleet(mut self, fleet: FleetParams) -> Self {
        self.fleet = fleet;
        self
    }

    pub fn with_cadence(mut self, cadence: CadenceConfig) -> Self {
        self.cadence = cadence;
        self
    }

    pub fn with_planner(mut self, planner: PlannerConfig) -> Self {
        self.planner = planner;
        self
    }

    pub fn with_alerts(mut self, alerts: AlertThresholds) -> Self {
        self.alerts = alerts;
        self
    }

    pub fn with_sensor_drift(mut self, sensor_drift: SensorDriftConfig) -> Self {
        self.sensor_drift = sensor_drift;
        self
    }

    pub fn with_depot(mut self, depot: GeoPoint) -> Self {
        self.depot = depot;
        self
    }

    pub fn with_scenario(mut self, scenario: Scenario) -> Self {
        self.initial_scenario = scenario;
        self
    }

    pub fn with_speed(mut self, speed: SimSpeed) -> Self {
        self.initial_speed = speed;
        self
    }

    pub fn from_json_str(json: &str) -> Result<Self> {
        let config: Self = serde_json::from_str(json)
            .map_err(|err| SimError::config(format!("failed to parse config: {err}")))?;
        config.validate()?;
        Ok(config)
    }

    pub fn from_json_file(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let json = std::fs::read_to_string(path).map_err(|err| {
            SimError::config(format!("failed to read {}: {err}", path.display()))
        })?;
        Self::from_json_str(&json)
    }

    pub fn to_json_string(&self) -> Result<String> {
        serde_json::to_string_pretty(self)
            .map_err(|err| SimError::config(format!("failed to serialize config: {err}")))
    }

    pub fn validate(&self) -> Result<()> {
        validate_fleet(&self.fleet)?;
        self.cadence.validate()?;
        self.planner.validate()?;
        self.alerts.validate()?;
        validate_drift(&self.sensor_drift)?;
        self.depot
            .validate()
            .map_err(|err| SimError::config(format!("depot: {err}")))?;
        let profile = &self.scenario_profile;
        for value in [
            profile.weekend_business_multiplier,
            profile.weekend_residential_multiplier,
            profile.special_event_multiplier,
        ] {
            if !(value.is_finite() && value >= 0.0) {
                return Err(SimError::config(format!(
                    "scenario multipliers must be non-negative, got {value}"
                )));
            }
        }
        Ok(())
    }
}

fn validate_fleet(fleet: &FleetParams) -> Result<()> {
    fleet
        .center
        .validate()
        .map_err(|err| SimError::config(format!("fleet centre: {err}")))?;
    let ranges = [
        ("start_fill", fleet.start_fill_min, fleet.start_fill_max, 0.0, 100.0),
        (
            "base_fill_rate",
            fleet.base_fill_rate_min,
            fleet.base_fill_rate_max,
            f64::MIN_POSITIVE,
            f64::MAX,
        ),
        ("battery", fleet.battery_min, fleet.battery_max, 0.0, 100.0),
    ];
    for (name, min, max, lo, hi) in ranges {
        if !(min.is_finite() && max.is_finite() && min <= max && min >= lo && max <= hi) {
            return Err(SimError::config(format!(
                "{name} range [{min}, {max}] is invalid"
            )));
        }
    }
    if fleet.capacity_min_liters == 0 || fleet.capacity_min_liters > fleet.capacity_max_liters {
        return Err(SimError::config(format!(
            "capacity range [{}, {}] is invalid",
            fleet.capacity_min_liters, fleet.capacity_max_liters
        )));
    }
    if !(0.0..=1.0).contains(&fleet.variability_max) {
        return Err(SimError::config(format!(
            "variability_max must be within [0, 1], got {}",
            fleet.variability_max
        )));
    }
    if !(fleet.spread_deg.is_finite() && fleet.spread_deg >= 0.0) {
        return Err(SimError::config(format!(
            "spread_deg must be non-negative, got {}",
            fleet.spread_deg
        )));
    }
    let half = fleet.spread_deg / 2.0;
    let (lat, lon) = (fleet.center.lat, fleet.center.lon);
    if lat - half < -90.0 || lat + half > 90.0 || lon - half < -180.0 || lon + half > 180.0 {
        return Err(SimError::config(format!(
            "fleet area around ({lat}, {lon}) with spread {} leaves the coordinate range",
            fleet.spread_deg
        )));
    }
    if fleet.num_bins > 0 && fleet.neighborhoods.is_empty() {
        return Err(SimError::config("fleet needs at least one neighborhood"));
    }
    Ok(())
}

fn validate_drift(drift: &SensorDriftConfig) -> Result<()> {
    let drain_ok = drift.battery_drain_min.is_finite()
        && drift.battery_drain_max.is_finite()
        && drift.battery_drain_min >= 0.0
        && drift.battery_drain_min <= drift.battery_drain_max;
    if !drain_ok {
        return Err(SimError::config(format!(
            "battery drain range [{}, {}] is invalid",
            drift.battery_drain_min, drift.battery_drain_max
        )));
    }
    let probabilities = drift.offline_probability + drift.intermittent_probability;
    if drift.offline_probability < 0.0 || drift.intermittent_probability < 0.0 || probabilities > 1.0 {
        return Err(SimError::config(format!(
            "connectivity probabilities must be non-negative and sum to at most 1, got {probabilities}"
        )));
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::ErrorKind;

    #[test]
    fn defaults_are_valid() {
        let config = SimulationConfig::default();
        config.validate().expect("default config");
        assert_eq!(config.fleet.num_bins, 40);
        assert_eq!(config.depot, config.fleet.center);
    }

    #[test]
    fn partial_json_fills_in_defaults() {
        let config = SimulationConfig::from_json_str(
            r#"{ "seed": 42, "initial_speed": 4, "initial_scenario": "special-event",
                 "fleet": { "num_bins": 5 } }"#,
        )
        .expect("config");
        assert_eq!(config.seed, Some(42));
        assert_eq!(config.initial_speed, SimSpeed::X4);
        assert_eq!(config.initial_scenario, Scenario::SpecialEvent);
        assert_eq!(config.fleet.num_bins, 5);
        assert_eq!(config.fleet.spread_deg, 0.05);
        assert_eq!(config.planner.collection_threshold_pct, 50.0);
    }

    #[test]
    fn unsupported_speed_is_a_config_error() {
        let err = SimulationConfig::from_json_str(r#"{ "initial_speed": 3 }"#).expect_err("3x");
        assert_eq!(err.kind(), ErrorKind::Config);
    }

    #[test]
    fn inverted_ranges_fail_validation() {
        let config = SimulationConfig::default()
            .with_fleet(FleetParams::default().with_start_fill_range(70.0, 20.0));
        assert_eq!(config.validate().expect_err("range").kind(), ErrorKind::Config);
    }

    #[test]
    fn fleet_area_must_stay_within_coordinate_range() {
        for center in [(89.99, 0.0), (-89.99, 0.0), (0.0, 179.99), (0.0, -179.99)] {
            let config = SimulationConfig::default()
                .with_fleet(FleetParams::default().with_center(GeoPoint::from(center)));
            assert_eq!(
                config.validate().expect_err("out of range").kind(),
                ErrorKind::Config,
                "{center:?}"
            );
        }
        let near_pole = SimulationConfig::default()
            .with_depot(GeoPoint::from((89.9, 0.0)))
            .with_fleet(FleetParams::default().with_center(GeoPoint::from((89.9, 0.0))));
        near_pole.validate().expect("fits");
    }

    #[test]
    fn fleet_without_neighborhoods_fails_validation() {
        let config = SimulationConfig::default()
            .with_fleet(FleetParams::default().with_neighborhoods(Vec::new()));
        assert_eq!(config.validate().expect_err("empty").kind(), ErrorKind::Config);

        let empty_fleet = SimulationConfig::default().with_fleet(
            FleetParams::default()
                .with_num_bins(0)
                .with_neighborhoods(Vec::new()),
        );
        empty_fleet.validate().expect("no bins, no neighborhoods");
    }

    #[test]
    fn serialized_speed_is_a_plain_multiplier() {
        let config = SimulationConfig::default().with_seed(9).with_speed(SimSpeed::X2);
        let json = config.to_json_string().expect("serialize");
        let value: serde_json::Value = serde_json::from_str(&json).expect("json");
        assert_eq!(value["initial_speed"], 2);
        assert_eq!(value["seed"], 9);
        assert_eq!(value["initial_scenario"], "normal");
    }
}
