//! Simulation runner: advances the clock and drives the tick schedule.
//!
//! Clock progression happens here, outside systems. Each tick asks the
//! [`SimulationClock`] for a [`TickPlan`], inserts it as [`CurrentTick`], then
//! runs the schedule. Cadence-gated systems read the plan through run
//! conditions.

use bevy_ecs::prelude::{Res, Schedule, World};
use bevy_ecs::schedule::IntoSystemConfigs;
use chrono::{DateTime, Utc};

use crate::clock::{CurrentTick, SimulationClock, TickPlan};
use crate::route::RouteBook;
use crate::systems::{
    fill_level::fill_level_system,
    route_progress::route_progress_system,
    sensor_drift::sensor_drift_system,
    thresholds::{fill_threshold_system, sensor_alert_system},
};

fn is_fill_threshold_check_due(tick: Option<Res<CurrentTick>>) -> bool {
    tick.map(|t| t.0.check_fill_thresholds).unwrap_or(false)
}

fn is_sensor_drift_due(tick: Option<Res<CurrentTick>>) -> bool {
    tick.map(|t| t.0.run_sensor_drift).unwrap_or(false)
}

fn has_active_route(routes: Option<Res<RouteBook>>) -> bool {
    routes.map(|r| r.has_active()).unwrap_or(false)
}

/// Builds the tick schedule. Systems run chained:
/// fill → fill thresholds → sensor drift → sensor alerts → route progress.
pub fn simulation_schedule() -> Schedule {
    let mut schedule = Schedule::default();
    schedule.add_systems(
        (
            fill_level_system,
            fill_threshold_system.run_if(is_fill_threshold_check_due),
            sensor_drift_system.run_if(is_sensor_drift_due),
            sensor_alert_system.run_if(is_sensor_drift_due),
            route_progress_system.run_if(has_active_route),
        )
            .chain(),
    );
    schedule
}

fn run_plan(world: &mut World, schedule: &mut Schedule, plan: Option<TickPlan>) -> bool {
    let Some(plan) = plan else {
        return false;
    };
    world.insert_resource(CurrentTick(plan));
    schedule.run(world);
    true
}

/// Runs one tick with an explicit real elapsed interval.
/// Returns `false` (and changes nothing) while the clock is paused.
pub fn run_tick(world: &mut World, schedule: &mut Schedule, real_elapsed_ms: u64) -> bool {
    let plan = world
        .get_resource_mut::<SimulationClock>()
        .and_then(|mut clock| clock.advance(real_elapsed_ms));
    run_plan(world, schedule, plan)
}

/// Runs one tick, measuring real elapsed time against the clock's last reading.
pub fn run_tick_at(world: &mut World, schedule: &mut Schedule, real_now: DateTime<Utc>) -> bool {
    let plan = world
        .get_resource_mut::<SimulationClock>()
        .and_then(|mut clock| clock.advance_to(real_now));
    run_plan(world, schedule, plan)
}

/// Batch replay: runs up to `count` ticks of `real_interval_ms` each.
/// Returns the number of ticks executed.
pub fn run_ticks(
    world: &mut World,
    schedule: &mut Schedule,
    count: usize,
    real_interval_ms: u64,
) -> usize {
    let mut ticks = 0;
    while ticks < count && run_tick(world, schedule, real_interval_ms) {
        ticks += 1;
    }
    ticks
}

/// Batch replay that invokes `hook` after each tick.
pub fn run_ticks_with_hook<F>(
    world: &mut World,
    schedule: &mut Schedule,
    count: usize,
    real_interval_ms: u64,
    mut hook: F,
) -> usize
where
    F: FnMut(&World, &TickPlan),
{
    let mut ticks = 0;
    while ticks < count && run_tick(world, schedule, real_interval_ms) {
        ticks += 1;
        if let Some(current) = world.get_resource::<CurrentTick>() {
            hook(world, &current.0);
        }
    }
    ticks
}
