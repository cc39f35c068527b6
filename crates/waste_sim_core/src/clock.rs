//! Simulation clock: real-time ticks scaled into simulated time.
//!
//! The clock owns the run state, the speed multiplier, the active scenario and
//! the two cadence accumulators. [`SimulationClock::advance`] turns one real
//! elapsed interval into a [`TickPlan`] that the runner hands to the systems.

use std::fmt;

use bevy_ecs::prelude::Resource;
use chrono::{DateTime, TimeDelta, Utc};
use serde::{Deserialize, Serialize};
use tracing::{debug, info};

use crate::error::{Result, SimError};
use crate::scenario::Scenario;

pub const ONE_SEC_MS: u64 = 1000;
pub const ONE_MIN_MS: u64 = 60 * ONE_SEC_MS;

/// Supported speed multipliers.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(try_from = "u32", into = "u32")]
pub enum SimSpeed {
    #[default]
    X1,
    X2,
    X4,
    X8,
}

impl SimSpeed {
    pub fn multiplier(self) -> u64 {
        match self {
            Self::X1 => 1,
            Self::X2 => 2,
            Self::X4 => 4,
            Self::X8 => 8,
        }
    }
}

impl TryFrom<u32> for SimSpeed {
    type Error = SimError;

    fn try_from(value: u32) -> Result<Self> {
        match value {
            1 => Ok(Self::X1),
            2 => Ok(Self::X2),
            4 => Ok(Self::X4),
            8 => Ok(Self::X8),
            other => Err(SimError::invalid(format!(
                "unsupported speed {other}x (expected 1, 2, 4 or 8)"
            ))),
        }
    }
}

impl From<SimSpeed> for u32 {
    fn from(speed: SimSpeed) -> Self {
        speed.multiplier() as u32
    }
}

impl fmt::Display for SimSpeed {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}x", self.multiplier())
    }
}

/// Tick and cadence intervals.
#[derive(Debug, Clone, Copy, PartialEq, Resource, Serialize, Deserialize)]
#[serde(default)]
pub struct CadenceConfig {
    /// Real interval per tick for `Simulation::run_for`.
    pub tick_interval_ms: u64,
    /// Fill-threshold checks run once more than this much real time has accumulated.
    pub threshold_check_interval_ms: u64,
    /// Sensor drift runs once more than this much simulated time has accumulated.
    pub sensor_drift_interval_sim_ms: u64,
    /// Route progress added per tick at 1x.
    pub route_progress_per_tick: f64,
}

impl Default for CadenceConfig {
    fn default() -> Self {
        Self {
            tick_interval_ms: ONE_SEC_MS,
            threshold_check_interval_ms: 5 * ONE_SEC_MS,
            sensor_drift_interval_sim_ms: 15 * ONE_MIN_MS,
            route_progress_per_tick: 0.02,
        }
    }
}

impl CadenceConfig {
    pub fn with_tick_interval_ms(mut self, ms: u64) -> Self {
        self.tick_interval_ms = ms;
        self
    }

    pub fn with_threshold_check_interval_ms(mut self, ms: u64) -> Self {
        self.threshold_check_interval_ms = ms;
        self
    }

    pub fn with_sensor_drift_interval_sim_ms(mut self, ms: u64) -> Self {
        self.sensor_drift_interval_sim_ms = ms;
        self
    }

    pub fn with_route_progress_per_tick(mut self, step: f64) -> Self {
        self.route_progress_per_tick = step;
        self
    }

    pub fn validate(&self) -> Result<()> {
        if self.tick_interval_ms == 0 {
            return Err(SimError::config("tick_interval_ms must be positive"));
        }
        if !(self.route_progress_per_tick.is_finite() && self.route_progress_per_tick > 0.0) {
            return Err(SimError::config(format!(
                "route_progress_per_tick must be positive, got {}",
                self.route_progress_per_tick
            )));
        }
        Ok(())
    }
}

/// What one tick should do. Computed by the clock, read by the systems.
#[derive(Debug, Clone, PartialEq)]
pub struct TickPlan {
    pub tick: u64,
    pub real_elapsed_ms: u64,
    pub simulated_elapsed_ms: u64,
    /// Simulated time after this tick.
    pub simulated_time: DateTime<Utc>,
    pub speed: SimSpeed,
    pub scenario: Scenario,
    pub check_fill_thresholds: bool,
    pub run_sensor_drift: bool,
    pub route_progress_step: f64,
}

/// The plan for the tick currently executing.
#[derive(Debug, Clone, Resource)]
pub struct CurrentTick(pub TickPlan);

#[derive(Debug, Clone, Resource)]
pub struct SimulationClock {
    is_running: bool,
    speed: SimSpeed,
    scenario: Scenario,
    simulated_time: DateTime<Utc>,
    last_real_tick: Option<DateTime<Utc>>,
    cadence: CadenceConfig,
    real_since_threshold_check_ms: u64,
    sim_since_drift_ms: u64,
    ticks: u64,
}

impl SimulationClock {
    pub fn new(start: DateTime<Utc>, cadence: CadenceConfig) -> Self {
        Self {
            is_running: false,
            speed: SimSpeed::default(),
            scenario: Scenario::default(),
            simulated_time: start,
            last_real_tick: None,
            cadence,
            real_since_threshold_check_ms: 0,
            sim_since_drift_ms: 0,
            ticks: 0,
        }
    }

    pub fn with_speed(mut self, speed: SimSpeed) -> Self {
        self.speed = speed;
        self
    }

    pub fn with_scenario(mut self, scenario: Scenario) -> Self {
        self.scenario = scenario;
        self
    }

    pub fn is_running(&self) -> bool {
        self.is_running
    }

    pub fn speed(&self) -> SimSpeed {
        self.speed
    }

    pub fn scenario(&self) -> Scenario {
        self.scenario
    }

    pub fn simulated_time(&self) -> DateTime<Utc> {
        self.simulated_time
    }

    pub fn last_real_tick(&self) -> Option<DateTime<Utc>> {
        self.last_real_tick
    }

    pub fn cadence(&self) -> &CadenceConfig {
        &self.cadence
    }

    /// Ticks executed since the last reset.
    pub fn ticks(&self) -> u64 {
        self.ticks
    }

    pub fn set_speed(&mut self, speed: SimSpeed) {
        self.speed = speed;
    }

    pub fn set_scenario(&mut self, scenario: Scenario) {
        self.scenario = scenario;
    }

    /// Start (or resume) at real instant `now`. Real deltas are measured from here.
    pub fn start(&mut self, now: DateTime<Utc>) {
        if self.is_running {
            return;
        }
        self.is_running = true;
        self.last_real_tick = Some(now);
        info!(simulated_time = %self.simulated_time, speed = %self.speed, "simulation started");
    }

    /// Freeze simulated time. The paused interval never reaches the simulation.
    pub fn pause(&mut self) {
        if !self.is_running {
            return;
        }
        self.is_running = false;
        self.last_real_tick = None;
        info!(simulated_time = %self.simulated_time, "simulation paused");
    }

    /// Stop and re-seed simulated time to `now`. Speed and scenario are kept.
    pub fn reset(&mut self, now: DateTime<Utc>) {
        self.is_running = false;
        self.simulated_time = now;
        self.last_real_tick = None;
        self.real_since_threshold_check_ms = 0;
        self.sim_since_drift_ms = 0;
        self.ticks = 0;
        info!(simulated_time = %now, "simulation reset");
    }

    /// Tick against a real wall-clock reading. Returns `None` while paused.
    pub fn advance_to(&mut self, real_now: DateTime<Utc>) -> Option<TickPlan> {
        if !self.is_running {
            return None;
        }
        let elapsed = self
            .last_real_tick
            .map(|last| (real_now - last).num_milliseconds().max(0) as u64)
            .unwrap_or(0);
        self.last_real_tick = Some(real_now);
        self.advance(elapsed)
    }

    /// Tick with an explicit real elapsed interval. Returns `None` while paused.
    pub fn advance(&mut self, real_elapsed_ms: u64) -> Option<TickPlan> {
        if !self.is_running {
            return None;
        }
        let multiplier = self.speed.multiplier();
        let simulated_elapsed_ms = real_elapsed_ms.saturating_mul(multiplier);
        let delta = i64::try_from(simulated_elapsed_ms)
            .ok()
            .and_then(TimeDelta::try_milliseconds)
            .unwrap_or(TimeDelta::zero());
        if let Some(next) = self.simulated_time.checked_add_signed(delta) {
            self.simulated_time = next;
        }

        self.real_since_threshold_check_ms =
            self.real_since_threshold_check_ms.saturating_add(real_elapsed_ms);
        let check_fill_thresholds =
            self.real_since_threshold_check_ms > self.cadence.threshold_check_interval_ms;
        if check_fill_thresholds {
            self.real_since_threshold_check_ms = 0;
        }

        self.sim_since_drift_ms = self.sim_since_drift_ms.saturating_add(simulated_elapsed_ms);
        let run_sensor_drift = self.sim_since_drift_ms > self.cadence.sensor_drift_interval_sim_ms;
        if run_sensor_drift {
            self.sim_since_drift_ms = 0;
        }

        self.ticks += 1;
        let plan = TickPlan {
            tick: self.ticks,
            real_elapsed_ms,
            simulated_elapsed_ms,
            simulated_time: self.simulated_time,
            speed: self.speed,
            scenario: self.scenario,
            check_fill_thresholds,
            run_sensor_drift,
            route_progress_step: self.cadence.route_progress_per_tick * multiplier as f64,
        };
        debug!(
            tick = plan.tick,
            simulated_elapsed_ms,
            check_fill_thresholds,
            run_sensor_drift,
            "tick planned"
        );
        Some(plan)
    }
}
