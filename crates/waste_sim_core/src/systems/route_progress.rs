//! Route progress system: moves the active route forward and applies its events.
//!
//! The executor only reports what happened; this system empties the bins,
//! loads the vehicle and records notifications.

use bevy_ecs::prelude::{Query, Res, ResMut};
use tracing::{info, warn};

use crate::bins::BinRegistry;
use crate::clock::CurrentTick;
use crate::ecs::Bin;
use crate::executor::RouteEvent;
use crate::notifications::{describe, NotificationLog, SimEvent};
use crate::route::RouteBook;

pub fn route_progress_system(
    tick: Res<CurrentTick>,
    registry: Res<BinRegistry>,
    mut routes: ResMut<RouteBook>,
    mut log: ResMut<NotificationLog>,
    mut bins: Query<&mut Bin>,
) {
    let at = tick.0.simulated_time;
    let Some((route_id, events)) = routes.advance_active(tick.0.route_progress_step) else {
        return;
    };

    for event in events {
        match event {
            RouteEvent::Collect {
                bin_id, location, ..
            } => {
                let Some(entity) = registry.entity(&bin_id) else {
                    warn!(route = %route_id, bin = %bin_id, "collection skipped: bin no longer registered");
                    continue;
                };
                let Ok(mut bin) = bins.get_mut(entity) else {
                    warn!(route = %route_id, bin = %bin_id, "collection skipped: bin entity missing");
                    continue;
                };
                let liters = bin.waste_volume_liters();
                bin.empty_at(at);
                let loaded = routes
                    .get_mut(&route_id)
                    .map(|route| route.vehicle.load(liters))
                    .unwrap_or(0.0);
                let event = SimEvent::BinCollected {
                    bin_id: bin_id.clone(),
                    location,
                };
                let message = describe(&event, Some(&bin.name));
                log.push(event, message, at);
                info!(route = %route_id, bin = %bin_id, liters = loaded, "bin collected");
            }
            RouteEvent::Completed { route_id } => {
                let event = SimEvent::RouteCompleted {
                    route_id: route_id.clone(),
                };
                let route_name = routes.get(&route_id).map(|route| route.name().to_owned());
                let message = describe(&event, route_name.as_deref());
                log.push(event, message, at);
                info!(route = %route_id, "route completed");
            }
        }
    }
}
