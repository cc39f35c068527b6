//! Route planner: turns the bins that need collection into two routes.
//!
//! The baseline visits bins in id order; the optimized route is a greedy
//! nearest-neighbor tour. Both start and end at the depot and carry the same
//! set of metrics so they can be compared directly.

pub mod baseline;
pub mod metrics;
pub mod nearest_neighbor;
pub mod strategy;

pub use baseline::IdOrder;
pub use metrics::{PlannerConfig, RouteComparison, RouteMetrics};
pub use nearest_neighbor::NearestNeighbor;
pub use strategy::RouteStrategy;

use tracing::info;

use crate::ecs::Bin;
use crate::error::Result;
use crate::geo::GeoPoint;
use crate::route::{Route, RouteId, RoutePoint, Vehicle};

/// The two plans produced for one set of bins.
#[derive(Debug, Clone, PartialEq)]
pub struct RoutePair {
    pub baseline: Route,
    pub optimized: Route,
}

impl RoutePair {
    pub fn comparison(&self) -> RouteComparison {
        RouteComparison::between(&self.baseline, &self.optimized)
    }
}

/// Build the baseline and optimized routes for every bin at or above the
/// collection threshold. Returns `Ok(None)` when no bin qualifies.
pub fn generate_routes(
    bins: &[Bin],
    depot: GeoPoint,
    config: &PlannerConfig,
) -> Result<Option<RoutePair>> {
    depot.validate()?;
    let candidates: Vec<&Bin> = bins
        .iter()
        .filter(|bin| bin.needs_collection(config.collection_threshold_pct))
        .collect();
    if candidates.is_empty() {
        info!(bins = bins.len(), "no bins above collection threshold; no routes generated");
        return Ok(None);
    }

    let baseline = build_route(&IdOrder, RouteId::baseline(), "Baseline Route", depot, &candidates, config)?;
    let optimized = build_route(
        &NearestNeighbor,
        RouteId::optimized(),
        "Optimized Route",
        depot,
        &candidates,
        config,
    )?;
    info!(
        pickups = candidates.len(),
        baseline_km = baseline.metrics().total_distance_km,
        optimized_km = optimized.metrics().total_distance_km,
        "routes generated"
    );
    Ok(Some(RoutePair { baseline, optimized }))
}

/// Order `candidates` with `strategy` and wrap the result in a depot-bracketed route.
pub fn build_route(
    strategy: &dyn RouteStrategy,
    id: RouteId,
    name: &str,
    depot: GeoPoint,
    candidates: &[&Bin],
    config: &PlannerConfig,
) -> Result<Route> {
    let order = strategy.order(depot, candidates);
    let pickups: Vec<&Bin> = order.iter().filter_map(|&i| candidates.get(i).copied()).collect();

    let mut points = Vec::with_capacity(pickups.len() + 2);
    points.push(RoutePoint::depot(format!("{id}-depot-start"), depot));
    points.extend(
        pickups
            .iter()
            .map(|bin| RoutePoint::pickup(format!("{id}-{}", bin.id), bin.location, bin.id.clone())),
    );
    points.push(RoutePoint::depot(format!("{id}-depot-end"), depot));

    let metrics = RouteMetrics::compute(&points, &pickups, config);
    let vehicle = Vehicle::parked_at(
        config.vehicle_id.clone(),
        depot,
        config.vehicle_capacity_liters,
        config.assumed_speed_kmh,
    );
    Route::new(id, name, strategy.kind(), points, vehicle, metrics)
}
