//! Test helpers for common test setup and utilities.
//!
//! Shared fixtures for unit tests, integration tests and benches.

use bevy_ecs::prelude::World;
use chrono::{DateTime, TimeDelta, TimeZone, Utc};

use crate::bins::BinRegistry;
use crate::clock::{CadenceConfig, SimSpeed, SimulationClock, TickPlan};
use crate::ecs::{Bin, BinCategory, BinId, SensorData};
use crate::fill::SensorDriftConfig;
use crate::geo::GeoPoint;
use crate::notifications::{AlertThresholds, NotificationLog};
use crate::planner::{generate_routes, PlannerConfig, RouteMetrics, RoutePair};
use crate::rng::SimRng;
use crate::route::{Route, RouteBook, RouteId, RouteKind, RoutePoint, Vehicle};
use crate::scenario::{Scenario, ScenarioProfile};

/// A fixed Monday morning used as the start of simulated time in tests.
///
/// # Panics
///
/// Panics if the constant date is not representable (should never happen).
pub fn test_time() -> DateTime<Utc> {
    Utc.with_ymd_and_hms(2024, 3, 4, 8, 0, 0)
        .single()
        .expect("fixed test time should be valid")
}

/// A healthy general-waste bin: 240 L, 5 %/h base rate, variability 0.2,
/// full battery, online, in "Osu".
pub fn sample_bin(id: &str, (lat, lon): (f64, f64), fill_level: f64) -> Bin {
    Bin {
        id: BinId::from(id),
        name: format!("Test Bin {id}"),
        location: GeoPoint { lat, lon },
        fill_level,
        capacity_liters: 240.0,
        base_fill_rate_pct_per_hour: 5.0,
        variability_factor: 0.2,
        sensor: SensorData::new_at(test_time()),
        last_collection_time: test_time(),
        neighborhood: "Osu".to_owned(),
        category: BinCategory::General,
    }
}

/// A tick at 1x that runs every cadence-gated system.
pub fn tick_plan(real_elapsed_ms: u64) -> TickPlan {
    TickPlan {
        tick: 1,
        real_elapsed_ms,
        simulated_elapsed_ms: real_elapsed_ms,
        simulated_time: test_time() + TimeDelta::milliseconds(real_elapsed_ms as i64),
        speed: SimSpeed::X1,
        scenario: Scenario::Normal,
        check_fill_thresholds: true,
        run_sensor_drift: true,
        route_progress_step: CadenceConfig::default().route_progress_per_tick,
    }
}

/// A route not yet begun: depot at (0, 0), pickups `bin-1..=bin-n` due east
/// every 0.01 degrees, then back to the depot. `n + 2` points in total.
///
/// # Panics
///
/// Panics if the route cannot be built (should never happen).
pub fn straight_route(n: usize) -> Route {
    let depot = GeoPoint::default();
    let bins: Vec<Bin> = (1..=n)
        .map(|i| sample_bin(&format!("bin-{i}"), (0.0, 0.01 * i as f64), 60.0))
        .collect();

    let mut points = Vec::with_capacity(n + 2);
    points.push(RoutePoint::depot("depot-start", depot));
    points.extend(
        bins.iter()
            .map(|bin| RoutePoint::pickup(format!("stop-{}", bin.id), bin.location, bin.id.clone())),
    );
    points.push(RoutePoint::depot("depot-end", depot));

    let config = PlannerConfig::default();
    let pickups: Vec<&Bin> = bins.iter().collect();
    let metrics = RouteMetrics::compute(&points, &pickups, &config);
    let vehicle = Vehicle::parked_at(
        config.vehicle_id.clone(),
        depot,
        config.vehicle_capacity_liters,
        config.assumed_speed_kmh,
    );
    Route::new(
        RouteId::baseline(),
        "Straight Route",
        RouteKind::Baseline,
        points,
        vehicle,
        metrics,
    )
    .expect("straight route should be well formed")
}

/// Baseline and optimized routes over three bins east of a depot at (0, 0).
///
/// # Panics
///
/// Panics if planning fails (should never happen).
pub fn sample_route_pair() -> RoutePair {
    let bins = vec![
        sample_bin("bin-1", (0.0, 0.03), 70.0),
        sample_bin("bin-2", (0.0, 0.01), 80.0),
        sample_bin("bin-3", (0.0, 0.02), 90.0),
    ];
    generate_routes(&bins, GeoPoint::default(), &PlannerConfig::default())
        .expect("planner should accept sample bins")
        .expect("sample bins should qualify")
}

/// Create a basic test world with every resource the tick schedule reads,
/// no bins, and a stopped clock at [`test_time`].
///
/// For a populated world, use [`crate::scenario::build_simulation`].
pub fn create_test_world() -> World {
    let mut world = World::new();
    world.insert_resource(SimulationClock::new(test_time(), CadenceConfig::default()));
    world.insert_resource(SimRng::new(Some(42)));
    world.insert_resource(BinRegistry::default());
    world.insert_resource(RouteBook::default());
    world.insert_resource(NotificationLog::default());
    world.insert_resource(ScenarioProfile::default());
    world.insert_resource(PlannerConfig::default());
    world.insert_resource(AlertThresholds::default());
    world.insert_resource(SensorDriftConfig::default());
    world
}
