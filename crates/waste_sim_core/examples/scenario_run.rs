//! Run a 40-bin fleet for a simulated afternoon, plan both routes, drive the
//! optimized one and print the outcome.
//!
//! Run with: cargo run -p waste_sim_core --example scenario_run
//! Pass a JSON config path as the first argument to override the defaults.
//! Set RUST_LOG=debug for per-tick logging.

use tracing_subscriber::EnvFilter;
use waste_sim_core::clock::CadenceConfig;
use waste_sim_core::route::RouteId;
use waste_sim_core::scenario::Scenario;
use waste_sim_core::{Simulation, SimulationConfig};

fn main() -> Result<(), Box<dyn std::error::Error>> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .with_target(false)
        .init();

    const SEED: u64 = 123;
    const WARMUP_TICKS: usize = 30;

    let config = match std::env::args().nth(1) {
        Some(path) => SimulationConfig::from_json_file(path)?,
        // One real minute per tick: each tick is eight simulated minutes at 8x.
        None => SimulationConfig::default()
            .with_seed(SEED)
            .with_cadence(CadenceConfig::default().with_tick_interval_ms(60_000)),
    };
    let mut sim = Simulation::new(config)?;
    sim.set_scenario(Scenario::SpecialEvent);
    sim.set_speed(8)?;
    sim.start();

    sim.run_for(WARMUP_TICKS);
    let stats = sim.snapshot().stats;
    println!("--- Fleet after warm-up ({} bins) ---", stats.bin_count);
    println!("Average fill: {:.1}%", stats.average_fill);
    println!(
        "Bands: low={} medium={} high={} critical={}",
        stats.distribution.low,
        stats.distribution.medium,
        stats.distribution.high,
        stats.distribution.critical
    );
    println!("Needing collection: {}", stats.needing_collection);

    let Some(pair) = sim.generate_routes_from_default_depot()? else {
        println!("\nNo bins qualify for collection.");
        return Ok(());
    };
    let comparison = pair.comparison();
    for route in [&pair.baseline, &pair.optimized] {
        let m = route.metrics();
        println!(
            "\n{}: {} bins, {:.2} km, {:.0} min, {:.2} L fuel, {:.2} kg CO2",
            route.name(),
            m.bins_collected,
            m.total_distance_km,
            m.estimated_duration_min,
            m.fuel_consumption_l,
            m.co2_emissions_kg
        );
    }
    println!(
        "\nSavings: {:.2} km ({:.1}%), {:.0} min ({:.1}%), {:.2} kg CO2",
        comparison.distance_saved_km,
        comparison.distance_saved_pct,
        comparison.time_saved_min,
        comparison.time_saved_pct,
        comparison.co2_saved_kg
    );

    sim.start_route(&RouteId::optimized())?;
    let mut ticks = 0;
    while sim.active_route().is_some() && ticks < 1_000 {
        sim.tick(1000);
        ticks += 1;
    }
    let loaded = sim
        .route(&RouteId::optimized())
        .map(|route| route.vehicle().current_load_liters)
        .unwrap_or_default();
    println!("\nOptimized route finished after {ticks} ticks, {loaded:.0} L collected.");

    let notifications = sim.drain_notifications();
    println!("\nNotifications ({}):", notifications.len());
    for n in notifications.iter().rev().take(10) {
        println!("  [{:?}] {}: {}", n.priority, n.title, n.message);
    }
    Ok(())
}
