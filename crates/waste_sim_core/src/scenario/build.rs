use bevy_ecs::prelude::World;
use chrono::{DateTime, TimeDelta, Utc};
use rand::Rng;
use tracing::info;

use crate::bins::{add_bin, BinRegistry};
use crate::clock::SimulationClock;
use crate::config::SimulationConfig;
use crate::ecs::{Bin, BinCategory, BinId, Connectivity, SensorData};
use crate::error::Result;
use crate::geo::GeoPoint;
use crate::notifications::NotificationLog;
use crate::rng::SimRng;
use crate::route::RouteBook;
use crate::scenario::params::FleetParams;

const CATEGORIES: [BinCategory; 3] = [
    BinCategory::General,
    BinCategory::Recycling,
    BinCategory::Organic,
];

/// Uniform in `[min, max)`, or `min` when the range is empty.
fn sample<R: Rng + ?Sized>(rng: &mut R, min: f64, max: f64) -> f64 {
    if max > min {
        rng.gen_range(min..max)
    } else {
        min
    }
}

/// Generate a fleet of bins scattered in a square around `params.center`.
///
/// Ids are `bin-1`, `bin-2`, ... in generation order.
pub fn generate_fleet<R: Rng + ?Sized>(
    rng: &mut R,
    params: &FleetParams,
    now: DateTime<Utc>,
) -> Vec<Bin> {
    let half = params.spread_deg / 2.0;
    let window_ms = i64::from(params.last_collection_window_days) * 24 * 60 * 60 * 1000;

    (0..params.num_bins)
        .map(|i| {
            let location = GeoPoint {
                lat: params.center.lat + sample(rng, -half, half),
                lon: params.center.lon + sample(rng, -half, half),
            };
            let neighborhood = if params.neighborhoods.is_empty() {
                String::new()
            } else {
                params.neighborhoods[rng.gen_range(0..params.neighborhoods.len())].clone()
            };
            let category = CATEGORIES[rng.gen_range(0..CATEGORIES.len())];
            let capacity = if params.capacity_max_liters > params.capacity_min_liters {
                rng.gen_range(params.capacity_min_liters..params.capacity_max_liters)
            } else {
                params.capacity_min_liters
            };
            let since_collection = if window_ms > 0 {
                rng.gen_range(0..window_ms)
            } else {
                0
            };
            let last_collection_time = TimeDelta::try_milliseconds(since_collection)
                .and_then(|delta| now.checked_sub_signed(delta))
                .unwrap_or(now);

            Bin {
                id: BinId(format!("bin-{}", i + 1)),
                name: format!("{} Bin {}", neighborhood, i + 1).trim().to_owned(),
                location,
                fill_level: sample(rng, params.start_fill_min, params.start_fill_max),
                capacity_liters: f64::from(capacity),
                base_fill_rate_pct_per_hour: sample(
                    rng,
                    params.base_fill_rate_min,
                    params.base_fill_rate_max,
                ),
                variability_factor: sample(rng, 0.0, params.variability_max),
                sensor: SensorData {
                    battery_level: sample(rng, params.battery_min, params.battery_max),
                    connectivity: Connectivity::Online,
                    last_transmission: now,
                },
                last_collection_time,
                neighborhood,
                category,
            }
        })
        .collect()
}

/// Generate the configured fleet with the world's [`SimRng`] and register it.
/// Returns the number of bins added.
pub fn populate_fleet(world: &mut World, params: &FleetParams, now: DateTime<Utc>) -> Result<usize> {
    let bins = {
        let mut rng = world.get_resource_or_insert_with(SimRng::default);
        generate_fleet(rng.rng(), params, now)
    };
    let count = bins.len();
    for bin in bins {
        add_bin(world, bin)?;
    }
    Ok(count)
}

/// Insert every simulation resource into `world` and seed the initial fleet.
///
/// `now` becomes the initial simulated time.
pub fn build_simulation(
    world: &mut World,
    config: &SimulationConfig,
    now: DateTime<Utc>,
) -> Result<()> {
    config.validate()?;

    world.insert_resource(
        SimulationClock::new(now, config.cadence)
            .with_speed(config.initial_speed)
            .with_scenario(config.initial_scenario),
    );
    world.insert_resource(SimRng::new(config.seed));
    world.insert_resource(BinRegistry::default());
    world.insert_resource(RouteBook::default());
    world.insert_resource(NotificationLog::new(config.notifications));
    world.insert_resource(config.scenario_profile.clone());
    world.insert_resource(config.planner.clone());
    world.insert_resource(config.alerts);
    world.insert_resource(config.sensor_drift);

    let count = populate_fleet(world, &config.fleet, now)?;
    info!(
        bins = count,
        seed = ?config.seed,
        scenario = %config.initial_scenario,
        speed = %config.initial_speed,
        "simulation built"
    );
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::bins::snapshot;
    use crate::test_helpers::test_time;
    use rand::rngs::StdRng;
    use rand::SeedableRng;

    #[test]
    fn generated_fleet_respects_parameter_ranges() {
        let params = FleetParams::default();
        let mut rng = StdRng::seed_from_u64(1);
        let bins = generate_fleet(&mut rng, &params, test_time());
        assert_eq!(bins.len(), 40);
        for bin in &bins {
            assert!((params.center.lat - bin.location.lat).abs() <= 0.025 + 1e-9);
            assert!((params.center.lon - bin.location.lon).abs() <= 0.025 + 1e-9);
            assert!((20.0..60.0).contains(&bin.fill_level));
            assert!((100.0..200.0).contains(&bin.capacity_liters));
            assert_eq!(bin.capacity_liters.fract(), 0.0);
            assert!((2.0..5.0).contains(&bin.base_fill_rate_pct_per_hour));
            assert!((0.0..0.3).contains(&bin.variability_factor));
            assert!((70.0..100.0).contains(&bin.sensor.battery_level));
            assert!(params.neighborhoods.contains(&bin.neighborhood));
            assert!(bin.last_collection_time <= test_time());
            assert!(bin.last_collection_time > test_time() - TimeDelta::days(7));
        }
    }

    #[test]
    fn fixed_start_fill_is_used_verbatim() {
        let params = FleetParams::default().with_num_bins(5).with_start_fill(35.0);
        let mut rng = StdRng::seed_from_u64(2);
        let bins = generate_fleet(&mut rng, &params, test_time());
        assert!(bins.iter().all(|b| b.fill_level == 35.0));
    }

    #[test]
    fn same_seed_builds_same_fleet() {
        let config = SimulationConfig::default().with_seed(77);
        let mut a = World::new();
        let mut b = World::new();
        build_simulation(&mut a, &config, test_time()).expect("build a");
        build_simulation(&mut b, &config, test_time()).expect("build b");
        assert_eq!(snapshot(&a), snapshot(&b));
        assert_eq!(a.resource::<BinRegistry>().len(), 40);
    }

    #[test]
    fn build_installs_clock_at_start_time() {
        let config = SimulationConfig::default()
            .with_seed(3)
            .with_fleet(FleetParams::default().with_num_bins(0));
        let mut world = World::new();
        build_simulation(&mut world, &config, test_time()).expect("build");
        let clock = world.resource::<SimulationClock>();
        assert_eq!(clock.simulated_time(), test_time());
        assert!(!clock.is_running());
        assert!(world.resource::<BinRegistry>().is_empty());
    }
}
