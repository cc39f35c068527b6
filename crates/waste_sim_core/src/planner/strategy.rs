use crate::ecs::Bin;
use crate::geo::GeoPoint;
use crate::route::RouteKind;

/// Orders a set of pickup candidates into a visiting sequence.
///
/// Implementations return a permutation of `0..candidates.len()`: each index
/// appears exactly once. The depot is implicit at both ends.
///
/// # Examples
///
/// ```rust
/// use waste_sim_core::geo::GeoPoint;
/// use waste_sim_core::planner::{NearestNeighbor, RouteStrategy};
///
/// let order = NearestNeighbor.order(GeoPoint::default(), &[]);
/// assert!(order.is_empty());
/// ```
pub trait RouteStrategy: Send + Sync {
    fn kind(&self) -> RouteKind;

    /// Visiting order as indices into `candidates`.
    fn order(&self, depot: GeoPoint, candidates: &[&Bin]) -> Vec<usize>;
}
