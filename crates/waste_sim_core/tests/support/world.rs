#![allow(dead_code)]

use bevy_ecs::prelude::World;
use waste_sim_core::bins::add_bin;
use waste_sim_core::clock::{CadenceConfig, SimSpeed, SimulationClock};
use waste_sim_core::ecs::Bin;
use waste_sim_core::fill::SensorDriftConfig;
use waste_sim_core::notifications::AlertThresholds;
use waste_sim_core::planner::PlannerConfig;
use waste_sim_core::rng::SimRng;
use waste_sim_core::scenario::Scenario;
use waste_sim_core::test_helpers::{create_test_world, test_time};

/// Builder configuration for reproducible test worlds.
#[derive(Clone, Debug)]
pub struct TestWorldConfig {
    pub seed: u64,
    pub speed: SimSpeed,
    pub scenario: Scenario,
    pub cadence: CadenceConfig,
    pub planner: PlannerConfig,
    pub alerts: AlertThresholds,
    pub sensor_drift: SensorDriftConfig,
    pub running: bool,
}

impl Default for TestWorldConfig {
    fn default() -> Self {
        Self {
            seed: 42,
            speed: SimSpeed::X1,
            scenario: Scenario::Normal,
            cadence: CadenceConfig::default(),
            planner: PlannerConfig::default(),
            alerts: AlertThresholds::default(),
            sensor_drift: SensorDriftConfig::default(),
            running: true,
        }
    }
}

/// Helper that populates the ECS world with all shared resources used in integration tests.
#[derive(Debug, Default)]
pub struct TestWorldBuilder {
    config: TestWorldConfig,
    bins: Vec<Bin>,
}

impl TestWorldBuilder {
    /// Create a new builder with default configuration.
    pub fn new() -> Self {
        Self::default()
    }

    /// Override the RNG seed.
    pub fn with_seed(mut self, seed: u64) -> Self {
        self.config.seed = seed;
        self
    }

    pub fn with_speed(mut self, speed: SimSpeed) -> Self {
        self.config.speed = speed;
        self
    }

    pub fn with_scenario(mut self, scenario: Scenario) -> Self {
        self.config.scenario = scenario;
        self
    }

    pub fn with_cadence(mut self, cadence: CadenceConfig) -> Self {
        self.config.cadence = cadence;
        self
    }

    pub fn with_sensor_drift(mut self, drift: SensorDriftConfig) -> Self {
        self.config.sensor_drift = drift;
        self
    }

    /// Leave the clock stopped after building.
    pub fn paused(mut self) -> Self {
        self.config.running = false;
        self
    }

    pub fn with_bins(mut self, bins: impl IntoIterator<Item = Bin>) -> Self {
        self.bins.extend(bins);
        self
    }

    /// Build the ECS world with the configured resources and bins.
    ///
    /// # Panics
    ///
    /// Panics if a fixture bin is rejected by the registry.
    pub fn build(self) -> World {
        let TestWorldConfig {
            seed,
            speed,
            scenario,
            cadence,
            planner,
            alerts,
            sensor_drift,
            running,
        } = self.config;

        let mut world = create_test_world();
        let mut clock = SimulationClock::new(test_time(), cadence)
            .with_speed(speed)
            .with_scenario(scenario);
        if running {
            clock.start(test_time());
        }
        world.insert_resource(clock);
        world.insert_resource(SimRng::new(Some(seed)));
        world.insert_resource(planner);
        world.insert_resource(alerts);
        world.insert_resource(sensor_drift);
        for bin in self.bins {
            add_bin(&mut world, bin).expect("fixture bin should register");
        }
        world
    }
}
