#![allow(dead_code)]

use bevy_ecs::prelude::World;
use bevy_ecs::schedule::Schedule;
use chrono::{DateTime, Utc};
use waste_sim_core::runner::{run_tick, run_tick_at, run_ticks, simulation_schedule};

/// Helper that owns a reusable `Schedule` so tests can step the simulation tick by tick.
pub struct ScheduleRunner {
    schedule: Schedule,
}

impl Default for ScheduleRunner {
    fn default() -> Self {
        Self::new()
    }
}

impl ScheduleRunner {
    /// Create a runner with the default simulation schedule.
    pub fn new() -> Self {
        Self {
            schedule: simulation_schedule(),
        }
    }

    /// Run one tick of `real_ms` (returns `false` while paused).
    pub fn run_one(&mut self, world: &mut World, real_ms: u64) -> bool {
        run_tick(world, &mut self.schedule, real_ms)
    }

    /// Run one tick measured against a wall-clock reading.
    pub fn run_at(&mut self, world: &mut World, real_now: DateTime<Utc>) -> bool {
        run_tick_at(world, &mut self.schedule, real_now)
    }

    /// Run up to `count` one-second ticks, returning the number executed.
    pub fn run_seconds(&mut self, world: &mut World, count: usize) -> usize {
        run_ticks(world, &mut self.schedule, count, 1000)
    }
}
