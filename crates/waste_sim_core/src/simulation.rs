//! Simulation context: owns the world and schedule and exposes the command surface.
//!
//! Commands and ticks both take `&mut self`, so a command is always applied
//! between two ticks and two ticks never interleave. A rejected command leaves
//! the world unchanged.

use bevy_ecs::prelude::{Mut, Schedule, World};
use chrono::{DateTime, Utc};
use tracing::info;

use crate::bins::{self, BinRegistry};
use crate::clock::{SimSpeed, SimulationClock};
use crate::config::SimulationConfig;
use crate::ecs::{Bin, BinId};
use crate::error::Result;
use crate::geo::GeoPoint;
use crate::notifications::{Notification, NotificationLog};
use crate::planner::{generate_routes, PlannerConfig, RoutePair};
use crate::route::{Route, RouteBook, RouteId};
use crate::runner::{run_tick, run_tick_at, run_ticks, simulation_schedule};
use crate::scenario::{build_simulation, populate_fleet, Scenario};
use crate::telemetry::{capture_snapshot, SimSnapshot};

pub struct Simulation {
    world: World,
    schedule: Schedule,
    config: SimulationConfig,
}

impl Simulation {
    /// Build a simulation whose simulated time starts at wall-clock now.
    pub fn new(config: SimulationConfig) -> Result<Self> {
        Self::starting_at(config, Utc::now())
    }

    /// Build a simulation whose simulated time starts at `start`.
    pub fn starting_at(config: SimulationConfig, start: DateTime<Utc>) -> Result<Self> {
        let mut world = World::new();
        build_simulation(&mut world, &config, start)?;
        Ok(Self {
            world,
            schedule: simulation_schedule(),
            config,
        })
    }

    pub fn config(&self) -> &SimulationConfig {
        &self.config
    }

    pub fn world(&self) -> &World {
        &self.world
    }

    pub fn clock(&self) -> &SimulationClock {
        self.world.resource::<SimulationClock>()
    }

    fn clock_mut(&mut self) -> Mut<'_, SimulationClock> {
        self.world.resource_mut::<SimulationClock>()
    }

    // --- bins ---

    pub fn add_bin(&mut self, bin: Bin) -> Result<()> {
        bins::add_bin(&mut self.world, bin).map(|_| ())
    }

    pub fn remove_bin(&mut self, id: &BinId) -> Result<Bin> {
        bins::remove_bin(&mut self.world, id)
    }

    /// Returns the stored (clamped) level.
    pub fn set_manual_fill_level(&mut self, id: &BinId, value: f64) -> Result<f64> {
        bins::set_manual_fill_level(&mut self.world, id, value)
    }

    /// Empty a bin at the current simulated time. Returns the liters removed.
    pub fn empty_bin(&mut self, id: &BinId) -> Result<f64> {
        let at = self.clock().simulated_time();
        bins::empty_bin(&mut self.world, id, at)
    }

    pub fn bin(&self, id: &BinId) -> Option<&Bin> {
        bins::get_bin(&self.world, id)
    }

    /// All bins ordered by id.
    pub fn bins(&self) -> Vec<Bin> {
        bins::snapshot(&self.world)
    }

    // --- routes ---

    /// Plan routes from the current bin state, replacing any previous plans.
    ///
    /// Returns `Ok(None)` when no bin qualifies. Rejected with `Conflict`
    /// while a route is in progress.
    pub fn generate_routes(&mut self, depot: GeoPoint) -> Result<Option<RoutePair>> {
        let bins = self.bins();
        let pair = generate_routes(&bins, depot, self.world.resource::<PlannerConfig>())?;
        self.world
            .resource_mut::<RouteBook>()
            .install(pair.clone())?;
        Ok(pair)
    }

    /// [`Simulation::generate_routes`] from the configured depot.
    pub fn generate_routes_from_default_depot(&mut self) -> Result<Option<RoutePair>> {
        let depot = self.config.depot;
        self.generate_routes(depot)
    }

    pub fn start_route(&mut self, id: &RouteId) -> Result<()> {
        self.world.resource_mut::<RouteBook>().start(id)
    }

    pub fn routes(&self) -> &[Route] {
        self.world.resource::<RouteBook>().routes()
    }

    pub fn route(&self, id: &RouteId) -> Option<&Route> {
        self.world.resource::<RouteBook>().get(id)
    }

    pub fn active_route(&self) -> Option<&Route> {
        self.world.resource::<RouteBook>().active_route()
    }

    // --- clock ---

    pub fn set_scenario(&mut self, scenario: Scenario) {
        self.clock_mut().set_scenario(scenario);
        info!(%scenario, "scenario changed");
    }

    /// Accepts 1, 2, 4 or 8.
    pub fn set_speed(&mut self, multiplier: u32) -> Result<()> {
        let speed = SimSpeed::try_from(multiplier)?;
        self.clock_mut().set_speed(speed);
        info!(%speed, "speed changed");
        Ok(())
    }

    pub fn start(&mut self) {
        self.start_at(Utc::now());
    }

    /// Start (or resume) measuring real time from `real_now`.
    pub fn start_at(&mut self, real_now: DateTime<Utc>) {
        self.clock_mut().start(real_now);
    }

    pub fn pause(&mut self) {
        self.clock_mut().pause();
    }

    pub fn reset(&mut self) -> Result<()> {
        self.reset_at(Utc::now())
    }

    /// Stop, clear routes and notifications, regenerate the fleet and re-seed
    /// simulated time to `now`.
    pub fn reset_at(&mut self, now: DateTime<Utc>) -> Result<()> {
        self.clock_mut().reset(now);
        self.world.resource_mut::<RouteBook>().clear();
        self.world.resource_mut::<NotificationLog>().clear();
        bins::clear_bins(&mut self.world);
        let fleet = self.config.fleet.clone();
        let count = populate_fleet(&mut self.world, &fleet, now)?;
        info!(bins = count, "fleet regenerated");
        Ok(())
    }

    // --- ticks ---

    /// One tick with an explicit real elapsed interval. `false` while paused.
    pub fn tick(&mut self, real_elapsed_ms: u64) -> bool {
        run_tick(&mut self.world, &mut self.schedule, real_elapsed_ms)
    }

    /// One tick measured against a wall-clock reading. `false` while paused.
    pub fn tick_at(&mut self, real_now: DateTime<Utc>) -> bool {
        run_tick_at(&mut self.world, &mut self.schedule, real_now)
    }

    /// Batch replay of `count` ticks at `real_interval_ms` each.
    pub fn run_ticks(&mut self, count: usize, real_interval_ms: u64) -> usize {
        run_ticks(&mut self.world, &mut self.schedule, count, real_interval_ms)
    }

    /// Batch replay of `count` ticks at the configured tick interval.
    pub fn run_for(&mut self, count: usize) -> usize {
        let interval = self.clock().cadence().tick_interval_ms;
        self.run_ticks(count, interval)
    }

    // --- notifications ---

    pub fn notifications(&self) -> &NotificationLog {
        self.world.resource::<NotificationLog>()
    }

    /// Notifications raised since the last drain, oldest first.
    pub fn drain_notifications(&mut self) -> Vec<Notification> {
        self.world.resource_mut::<NotificationLog>().take_undelivered()
    }

    pub fn mark_notification_read(&mut self, id: u64) -> Result<()> {
        self.world.resource_mut::<NotificationLog>().mark_read(id)
    }

    pub fn mark_all_notifications_read(&mut self) {
        self.world.resource_mut::<NotificationLog>().mark_all_read();
    }

    pub fn clear_notifications(&mut self) {
        self.world.resource_mut::<NotificationLog>().clear();
    }

    // --- telemetry ---

    pub fn snapshot(&self) -> SimSnapshot {
        capture_snapshot(&self.world)
    }

    pub fn bin_count(&self) -> usize {
        self.world.resource::<BinRegistry>().len()
    }
}
