use crate::ecs::Bin;
use crate::geo::GeoPoint;
use crate::route::RouteKind;

use super::strategy::RouteStrategy;

/// Baseline ordering: visit bins by id, lexicographically.
///
/// Ignores geography entirely. It stands in for a fixed schedule and is the
/// reference the optimized route is compared against.
#[derive(Debug, Default, Clone, Copy)]
pub struct IdOrder;

impl RouteStrategy for IdOrder {
    fn kind(&self) -> RouteKind {
        RouteKind::Baseline
    }

    fn order(&self, _depot: GeoPoint, candidates: &[&Bin]) -> Vec<usize> {
        let mut order: Vec<usize> = (0..candidates.len()).collect();
        order.sort_by(|&a, &b| candidates[a].id.cmp(&candidates[b].id));
        order
    }
}
