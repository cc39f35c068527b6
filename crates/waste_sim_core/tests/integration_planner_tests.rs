use rand::rngs::StdRng;
use rand::SeedableRng;
use waste_sim_core::geo::GeoPoint;
use waste_sim_core::planner::{generate_routes, PlannerConfig};
use waste_sim_core::scenario::{generate_fleet, FleetParams};
use waste_sim_core::test_helpers::test_time;

#[test]
fn optimized_is_no_longer_than_baseline_in_most_trials() {
    let params = FleetParams::default()
        .with_num_bins(25)
        .with_start_fill_range(40.0, 100.0);
    let config = PlannerConfig::default();
    let trials = 60;
    let mut not_worse = 0;

    for seed in 0..trials {
        let mut rng = StdRng::seed_from_u64(seed);
        let bins = generate_fleet(&mut rng, &params, test_time());
        let Some(pair) = generate_routes(&bins, params.center, &config).expect("planner") else {
            continue;
        };
        if pair.optimized.metrics().total_distance_km
            <= pair.baseline.metrics().total_distance_km + 1e-9
        {
            not_worse += 1;
        }
    }
    assert!(not_worse >= 55, "optimized not worse in only {not_worse}/{trials} trials");
}

#[test]
fn every_qualifying_bin_is_visited_exactly_once() {
    let params = FleetParams::default()
        .with_num_bins(40)
        .with_start_fill_range(0.0, 100.0);
    let config = PlannerConfig::default();
    let mut rng = StdRng::seed_from_u64(99);
    let bins = generate_fleet(&mut rng, &params, test_time());

    let mut expected: Vec<String> = bins
        .iter()
        .filter(|b| b.fill_level >= config.collection_threshold_pct)
        .map(|b| b.id.0.clone())
        .collect();
    expected.sort();

    let pair = generate_routes(&bins, params.center, &config)
        .expect("planner")
        .expect("some bins qualify");
    for route in [&pair.baseline, &pair.optimized] {
        let mut visited: Vec<String> = route.pickup_order().into_iter().map(|id| id.0).collect();
        visited.sort();
        assert_eq!(visited, expected);
        assert_eq!(route.metrics().bins_collected, expected.len());
    }
}

#[test]
fn raising_the_threshold_shrinks_the_route() {
    let params = FleetParams::default()
        .with_num_bins(30)
        .with_start_fill_range(0.0, 100.0);
    let mut rng = StdRng::seed_from_u64(7);
    let bins = generate_fleet(&mut rng, &params, test_time());
    let depot = GeoPoint::from((5.6037, -0.1870));

    let loose = generate_routes(&bins, depot, &PlannerConfig::default())
        .expect("planner")
        .expect("routes");
    let strict = generate_routes(
        &bins,
        depot,
        &PlannerConfig::default().with_collection_threshold(90.0),
    )
    .expect("planner");

    let strict_count = strict
        .as_ref()
        .map(|pair| pair.optimized.metrics().bins_collected)
        .unwrap_or(0);
    assert!(strict_count < loose.optimized.metrics().bins_collected);
}
