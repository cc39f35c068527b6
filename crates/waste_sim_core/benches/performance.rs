//! Performance benchmarks for waste_sim_core using Criterion.rs.

use criterion::{black_box, criterion_group, criterion_main, BenchmarkId, Criterion};
use rand::rngs::StdRng;
use rand::SeedableRng;
use waste_sim_core::planner::{generate_routes, PlannerConfig};
use waste_sim_core::scenario::{generate_fleet, FleetParams};
use waste_sim_core::test_helpers::test_time;
use waste_sim_core::{Simulation, SimulationConfig};

fn bench_route_planning(c: &mut Criterion) {
    let mut group = c.benchmark_group("route_planning");
    for num_bins in [40usize, 200, 1000] {
        let params = FleetParams::default()
            .with_num_bins(num_bins)
            .with_start_fill_range(30.0, 100.0);
        let mut rng = StdRng::seed_from_u64(42);
        let bins = generate_fleet(&mut rng, &params, test_time());
        let config = PlannerConfig::default();

        group.bench_with_input(BenchmarkId::from_parameter(num_bins), &bins, |b, bins| {
            b.iter(|| black_box(generate_routes(bins, params.center, &config)));
        });
    }
    group.finish();
}

fn bench_tick_throughput(c: &mut Criterion) {
    let mut group = c.benchmark_group("tick_throughput");
    for num_bins in [40usize, 500] {
        group.bench_with_input(
            BenchmarkId::from_parameter(num_bins),
            &num_bins,
            |b, &num_bins| {
                b.iter(|| {
                    let config = SimulationConfig::default()
                        .with_seed(42)
                        .with_fleet(FleetParams::default().with_num_bins(num_bins));
                    let Ok(mut sim) = Simulation::starting_at(config, test_time()) else {
                        return;
                    };
                    sim.start_at(test_time());
                    // 100 real seconds; covers threshold checks and a drift pass at 8x.
                    let _ = sim.set_speed(8);
                    black_box(sim.run_for(100));
                });
            },
        );
    }
    group.finish();
}

criterion_group!(benches, bench_route_planning, bench_tick_throughput);
criterion_main!(benches);
