use crate::ecs::Bin;
use crate::geo::{distance_km, GeoPoint};
use crate::route::RouteKind;

use super::strategy::RouteStrategy;

/// Greedy nearest-neighbor tour starting at the depot.
///
/// At each step the closest unvisited bin (haversine) is taken next. Ties go
/// to the candidate that appears first in the input. This is a heuristic:
/// there is no 2-opt pass and no capacity constraint, so the tour is not
/// guaranteed to be optimal.
///
/// Time complexity: O(n²) in the number of candidates.
#[derive(Debug, Default, Clone, Copy)]
pub struct NearestNeighbor;

impl RouteStrategy for NearestNeighbor {
    fn kind(&self) -> RouteKind {
        RouteKind::Optimized
    }

    fn order(&self, depot: GeoPoint, candidates: &[&Bin]) -> Vec<usize> {
        let mut visited = vec![false; candidates.len()];
        let mut order = Vec::with_capacity(candidates.len());
        let mut current = depot;

        while order.len() < candidates.len() {
            let mut best: Option<(usize, f64)> = None;
            for (index, bin) in candidates.iter().enumerate() {
                if visited[index] {
                    continue;
                }
                let d = distance_km(current, bin.location);
                if best.map_or(true, |(_, best_d)| d < best_d) {
                    best = Some((index, d));
                }
            }
            let Some((next, _)) = best else {
                break;
            };
            visited[next] = true;
            current = candidates[next].location;
            order.push(next);
        }
        order
    }
}
