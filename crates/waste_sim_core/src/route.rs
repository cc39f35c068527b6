//! Route data: waypoints, the collection vehicle, and the route book.
//!
//! A [`Route`] owns its [`Vehicle`]. The [`RouteBook`] resource holds the
//! generated routes and the pointer to the single active one.

use std::fmt;

use bevy_ecs::prelude::Resource;
use serde::{Deserialize, Serialize};
use tracing::info;

use crate::ecs::BinId;
use crate::error::{Result, SimError};
use crate::executor::{self, RouteEvent};
use crate::geo::GeoPoint;
use crate::planner::{RouteComparison, RouteMetrics, RoutePair};

#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct RouteId(pub String);

impl RouteId {
    pub fn baseline() -> Self {
        Self("baseline".to_owned())
    }

    pub fn optimized() -> Self {
        Self("optimized".to_owned())
    }
}

impl fmt::Display for RouteId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for RouteId {
    fn from(value: &str) -> Self {
        Self(value.to_owned())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum RouteKind {
    Baseline,
    Optimized,
}

/// One stop on a route. `bin_id` is set iff the stop is a pickup.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RoutePoint {
    pub id: String,
    pub location: GeoPoint,
    pub bin_id: Option<BinId>,
    pub is_depot: bool,
}

impl RoutePoint {
    pub fn depot(id: impl Into<String>, location: GeoPoint) -> Self {
        Self {
            id: id.into(),
            location,
            bin_id: None,
            is_depot: true,
        }
    }

    pub fn pickup(id: impl Into<String>, location: GeoPoint, bin_id: BinId) -> Self {
        Self {
            id: id.into(),
            location,
            bin_id: Some(bin_id),
            is_depot: false,
        }
    }

    pub fn is_pickup(&self) -> bool {
        self.bin_id.is_some()
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum VehicleStatus {
    #[default]
    Idle,
    EnRoute,
    Collecting,
    Returning,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Vehicle {
    pub id: String,
    pub current_position: GeoPoint,
    pub current_waypoint_index: usize,
    pub capacity_liters: f64,
    /// Always within `[0, capacity_liters]`.
    pub current_load_liters: f64,
    pub speed_kmh: f64,
    pub status: VehicleStatus,
}

impl Vehicle {
    pub fn parked_at(id: impl Into<String>, depot: GeoPoint, capacity_liters: f64, speed_kmh: f64) -> Self {
        Self {
            id: id.into(),
            current_position: depot,
            current_waypoint_index: 0,
            capacity_liters,
            current_load_liters: 0.0,
            speed_kmh,
            status: VehicleStatus::Idle,
        }
    }

    /// Add collected waste, capped at capacity. Returns the liters accepted.
    pub fn load(&mut self, liters: f64) -> f64 {
        let room = (self.capacity_liters - self.current_load_liters).max(0.0);
        let accepted = liters.max(0.0).min(room);
        self.current_load_liters += accepted;
        accepted
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Route {
    pub(crate) id: RouteId,
    pub(crate) name: String,
    pub(crate) kind: RouteKind,
    pub(crate) points: Vec<RoutePoint>,
    pub(crate) vehicle: Vehicle,
    pub(crate) metrics: RouteMetrics,
    pub(crate) progress: f64,
    pub(crate) in_progress: bool,
    pub(crate) completed: bool,
    /// Highest waypoint index whose collection has already fired.
    pub(crate) last_collected_index: Option<usize>,
}

impl Route {
    /// Build an idle route. `points` must start and end at a depot.
    pub fn new(
        id: RouteId,
        name: impl Into<String>,
        kind: RouteKind,
        points: Vec<RoutePoint>,
        vehicle: Vehicle,
        metrics: RouteMetrics,
    ) -> Result<Self> {
        let bracketed = points.len() >= 2
            && points.first().is_some_and(|p| p.is_depot)
            && points.last().is_some_and(|p| p.is_depot);
        if !bracketed {
            return Err(SimError::invalid(format!(
                "route {id} must start and end at the depot"
            )));
        }
        Ok(Self {
            id,
            name: name.into(),
            kind,
            points,
            vehicle,
            metrics,
            progress: 0.0,
            in_progress: false,
            completed: false,
            last_collected_index: None,
        })
    }

    pub fn id(&self) -> &RouteId {
        &self.id
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn kind(&self) -> RouteKind {
        self.kind
    }

    pub fn points(&self) -> &[RoutePoint] {
        &self.points
    }

    pub fn vehicle(&self) -> &Vehicle {
        &self.vehicle
    }

    pub fn metrics(&self) -> &RouteMetrics {
        &self.metrics
    }

    pub fn progress(&self) -> f64 {
        self.progress
    }

    pub fn in_progress(&self) -> bool {
        self.in_progress
    }

    pub fn completed(&self) -> bool {
        self.completed
    }

    /// Bin ids in visiting order.
    pub fn pickup_order(&self) -> Vec<BinId> {
        self.points
            .iter()
            .filter_map(|p| p.bin_id.clone())
            .collect()
    }

    pub fn depot(&self) -> GeoPoint {
        self.points
            .first()
            .map(|p| p.location)
            .unwrap_or_default()
    }

    /// Put the vehicle back at the depot and mark the route in progress.
    pub(crate) fn begin(&mut self) {
        let depot = self.depot();
        self.progress = 0.0;
        self.in_progress = true;
        self.completed = false;
        self.last_collected_index = None;
        self.vehicle.current_position = depot;
        self.vehicle.current_waypoint_index = 0;
        self.vehicle.current_load_liters = 0.0;
        self.vehicle.status = VehicleStatus::EnRoute;
    }
}

/// Generated routes plus the active-route pointer.
#[derive(Debug, Default, Resource)]
pub struct RouteBook {
    routes: Vec<Route>,
    active: Option<RouteId>,
    comparison: Option<RouteComparison>,
}

impl RouteBook {
    pub fn routes(&self) -> &[Route] {
        &self.routes
    }

    pub fn get(&self, id: &RouteId) -> Option<&Route> {
        self.routes.iter().find(|r| &r.id == id)
    }

    pub fn get_mut(&mut self, id: &RouteId) -> Option<&mut Route> {
        self.routes.iter_mut().find(|r| &r.id == id)
    }

    pub fn active_id(&self) -> Option<&RouteId> {
        self.active.as_ref()
    }

    pub fn active_route(&self) -> Option<&Route> {
        self.active.as_ref().and_then(|id| self.get(id))
    }

    pub fn has_active(&self) -> bool {
        self.active.is_some()
    }

    pub fn comparison(&self) -> Option<&RouteComparison> {
        self.comparison.as_ref()
    }

    /// Replace the generated routes. `None` clears them (no bin qualified).
    pub fn install(&mut self, pair: Option<RoutePair>) -> Result<()> {
        if let Some(active) = &self.active {
            return Err(SimError::RouteAlreadyActive {
                active: active.clone(),
            });
        }
        match pair {
            Some(pair) => {
                self.comparison = Some(RouteComparison::between(&pair.baseline, &pair.optimized));
                self.routes = vec![pair.baseline, pair.optimized];
            }
            None => {
                self.comparison = None;
                self.routes.clear();
            }
        }
        Ok(())
    }

    /// Make `id` the active route. Unknown ids are `NotFound` even while
    /// another route is active; otherwise rejected while one is active.
    pub fn start(&mut self, id: &RouteId) -> Result<()> {
        if self.get(id).is_none() {
            return Err(SimError::RouteNotFound(id.clone()));
        }
        if let Some(active) = &self.active {
            return Err(SimError::RouteAlreadyActive {
                active: active.clone(),
            });
        }
        let route = self
            .get_mut(id)
            .ok_or_else(|| SimError::RouteNotFound(id.clone()))?;
        route.begin();
        info!(route = %id, stops = route.points.len(), "route started");
        self.active = Some(id.clone());
        Ok(())
    }

    /// Push the active route forward by `step` and run the executor.
    ///
    /// Returns the route id with the executor's events, or `None` when no
    /// route is active. Clears the active pointer once the route completes.
    pub fn advance_active(&mut self, step: f64) -> Option<(RouteId, Vec<RouteEvent>)> {
        let id = self.active.clone()?;
        let Some(route) = self.get_mut(&id) else {
            self.active = None;
            return None;
        };
        let target = (route.progress + step.max(0.0)).min(1.0);
        let events = executor::advance(route, target);
        if route.completed {
            self.active = None;
        }
        Some((id, events))
    }

    pub fn clear(&mut self) {
        self.routes.clear();
        self.active = None;
        self.comparison = None;
    }
}
