//! Route executor: moves the vehicle along a route as a function of progress.
//!
//! Progress in `[0, 1]` maps onto a fractional waypoint index
//! `progress * (n - 1)`. The vehicle is interpolated along the current leg.
//! Once the leg is more than 90% done and the next stop is a pickup, the
//! vehicle is `Collecting` and that bin's collection fires.
//!
//! Collections fire exactly once per pickup over a non-decreasing progress
//! sequence. Pickups skipped over inside a single large step still fire, in
//! route order, before the vehicle moves on.

use crate::ecs::BinId;
use crate::geo::GeoPoint;
use crate::route::{Route, RouteId, VehicleStatus};

/// Leg fraction past which the vehicle counts as arriving at the next stop.
pub const ARRIVAL_FRACTION: f64 = 0.9;

#[derive(Debug, Clone, PartialEq)]
pub enum RouteEvent {
    /// The vehicle reached a pickup; the bin should be emptied.
    Collect {
        bin_id: BinId,
        location: GeoPoint,
        waypoint_index: usize,
    },
    Completed {
        route_id: RouteId,
    },
}

/// Advance `route` to `progress` and return the events this step produced.
///
/// Progress is clamped to `[0, 1]` and never moves backwards. Completed
/// routes are left untouched.
pub fn advance(route: &mut Route, progress: f64) -> Vec<RouteEvent> {
    let mut events = Vec::new();
    if route.completed || route.points.len() < 2 {
        return events;
    }

    let requested = if progress.is_finite() {
        progress.clamp(0.0, 1.0)
    } else {
        route.progress
    };
    route.progress = requested.max(route.progress);

    let last = route.points.len() - 1;
    let exact = route.progress * last as f64;
    let index = exact.floor() as usize;

    if index >= last {
        collect_through(route, last, &mut events);
        let end = route.points[last].location;
        route.vehicle.current_position = end;
        route.vehicle.current_waypoint_index = last;
        route.vehicle.status = VehicleStatus::Idle;
        route.progress = 1.0;
        route.in_progress = false;
        route.completed = true;
        events.push(RouteEvent::Completed {
            route_id: route.id.clone(),
        });
        return events;
    }

    let fraction = exact - index as f64;
    collect_through(route, index, &mut events);

    let next = index + 1;
    let from = route.points[index].location;
    let to = route.points[next].location;
    route.vehicle.current_position = from.lerp(to, fraction);
    route.vehicle.current_waypoint_index = index;

    route.vehicle.status = if fraction > ARRIVAL_FRACTION && route.points[next].is_pickup() {
        collect_through(route, next, &mut events);
        VehicleStatus::Collecting
    } else if next == last {
        VehicleStatus::Returning
    } else {
        VehicleStatus::EnRoute
    };

    events
}

/// Fire collections for every pickup up to and including `upto` that has not fired yet.
fn collect_through(route: &mut Route, upto: usize, events: &mut Vec<RouteEvent>) {
    let start = route.last_collected_index.map_or(0, |i| i + 1);
    if upto < start {
        return;
    }
    for (offset, point) in route.points[start..=upto].iter().enumerate() {
        if let Some(bin_id) = &point.bin_id {
            events.push(RouteEvent::Collect {
                bin_id: bin_id.clone(),
                location: point.location,
                waypoint_index: start + offset,
            });
        }
    }
    route.last_collected_index = Some(upto);
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_helpers::straight_route;

    fn collected(events: &[RouteEvent]) -> Vec<String> {
        events
            .iter()
            .filter_map(|e| match e {
                RouteEvent::Collect { bin_id, .. } => Some(bin_id.0.clone()),
                RouteEvent::Completed { .. } => None,
            })
            .collect()
    }

    #[test]
    fn full_progress_completes_at_depot() {
        // depot, 3 pickups, depot
        let mut route = straight_route(3);
        route.begin();
        let events = advance(&mut route, 1.0);

        assert!(route.completed());
        assert!(!route.in_progress());
        assert_eq!(route.progress(), 1.0);
        assert_eq!(route.vehicle().status, VehicleStatus::Idle);
        assert_eq!(route.vehicle().current_position, route.depot());
        assert_eq!(route.vehicle().current_waypoint_index, 4);
        assert_eq!(collected(&events), vec!["bin-1", "bin-2", "bin-3"]);
        assert!(matches!(events.last(), Some(RouteEvent::Completed { .. })));
    }

    #[test]
    fn out_of_range_progress_is_clamped() {
        let mut route = straight_route(2);
        route.begin();
        advance(&mut route, -3.0);
        assert_eq!(route.progress(), 0.0);
        assert_eq!(route.vehicle().current_position, route.depot());
        advance(&mut route, 7.0);
        assert!(route.completed());
    }

    #[test]
    fn interpolates_along_current_leg() {
        // 4 points -> 3 legs; progress 0.5 is the middle of leg 1.
        let mut route = straight_route(2);
        route.begin();
        let events = advance(&mut route, 0.5);
        let a = route.points()[1].location;
        let b = route.points()[2].location;
        let mid = a.lerp(b, 0.5);
        let pos = route.vehicle().current_position;
        assert!((pos.lat - mid.lat).abs() < 1e-12);
        assert!((pos.lon - mid.lon).abs() < 1e-12);
        assert_eq!(route.vehicle().current_waypoint_index, 1);
        assert_eq!(route.vehicle().status, VehicleStatus::EnRoute);
        // bin-1 sits at waypoint 1, which has been reached.
        assert_eq!(collected(&events), vec!["bin-1"]);
    }

    #[test]
    fn collecting_near_next_pickup_fires_once() {
        // 5 points -> 4 legs of 0.25 progress each.
        let mut route = straight_route(3);
        route.begin();

        let events = advance(&mut route, 0.24);
        assert_eq!(route.vehicle().status, VehicleStatus::Collecting);
        assert_eq!(collected(&events), vec!["bin-1"]);

        let events = advance(&mut route, 0.245);
        assert_eq!(route.vehicle().status, VehicleStatus::Collecting);
        assert!(collected(&events).is_empty());

        let events = advance(&mut route, 0.3);
        assert_eq!(route.vehicle().status, VehicleStatus::EnRoute);
        assert!(collected(&events).is_empty());
    }

    #[test]
    fn each_pickup_fires_exactly_once_over_monotone_progress() {
        let mut route = straight_route(6);
        route.begin();
        let mut all = Vec::new();
        let mut p = 0.0;
        while !route.completed() {
            p += 0.037;
            all.extend(advance(&mut route, p));
        }
        assert_eq!(
            collected(&all),
            vec!["bin-1", "bin-2", "bin-3", "bin-4", "bin-5", "bin-6"]
        );
        let completions = all
            .iter()
            .filter(|e| matches!(e, RouteEvent::Completed { .. }))
            .count();
        assert_eq!(completions, 1);
    }

    #[test]
    fn large_steps_still_collect_skipped_pickups() {
        let mut route = straight_route(6);
        route.begin();
        let events = advance(&mut route, 0.6);
        // 8 points -> exact index 4.2; pickups at waypoints 1..=4 are behind us.
        assert_eq!(collected(&events), vec!["bin-1", "bin-2", "bin-3", "bin-4"]);
    }

    #[test]
    fn progress_never_moves_backwards() {
        let mut route = straight_route(3);
        route.begin();
        advance(&mut route, 0.6);
        let events = advance(&mut route, 0.2);
        assert_eq!(route.progress(), 0.6);
        assert!(collected(&events).is_empty());
    }

    #[test]
    fn final_leg_is_returning() {
        let mut route = straight_route(1);
        route.begin();
        // 3 points -> 2 legs; 0.75 is mid second leg heading to the depot.
        advance(&mut route, 0.75);
        assert_eq!(route.vehicle().status, VehicleStatus::Returning);
    }

    #[test]
    fn completed_route_ignores_further_advances() {
        let mut route = straight_route(2);
        route.begin();
        advance(&mut route, 1.0);
        assert!(advance(&mut route, 1.0).is_empty());
    }
}
