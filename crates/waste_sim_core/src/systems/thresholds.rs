//! Alert systems: turn bin state into notifications.
//!
//! Fill alerts run on the real-time threshold cadence; sensor alerts run right
//! after sensor drift. Neither deduplicates: a bin that stays critical raises a
//! fresh notification on every check.

use bevy_ecs::prelude::{Query, Res, ResMut};
use tracing::debug;

use crate::clock::CurrentTick;
use crate::ecs::Bin;
use crate::notifications::{describe, fill_alert, sensor_alerts, AlertThresholds, NotificationLog};

pub fn fill_threshold_system(
    tick: Res<CurrentTick>,
    thresholds: Res<AlertThresholds>,
    mut log: ResMut<NotificationLog>,
    bins: Query<&Bin>,
) {
    let at = tick.0.simulated_time;
    let mut raised = 0usize;
    for bin in sorted(&bins) {
        if let Some(event) = fill_alert(bin, &thresholds) {
            let message = describe(&event, Some(&bin.name));
            log.push(event, message, at);
            raised += 1;
        }
    }
    debug!(tick = tick.0.tick, raised, "fill thresholds checked");
}

pub fn sensor_alert_system(
    tick: Res<CurrentTick>,
    thresholds: Res<AlertThresholds>,
    mut log: ResMut<NotificationLog>,
    bins: Query<&Bin>,
) {
    let at = tick.0.simulated_time;
    for bin in sorted(&bins) {
        for event in sensor_alerts(bin, &thresholds) {
            let message = describe(&event, Some(&bin.name));
            log.push(event, message, at);
        }
    }
}

/// Bins in id order, so notification order does not depend on entity layout.
fn sorted<'a>(bins: &'a Query<&Bin>) -> Vec<&'a Bin> {
    let mut sorted: Vec<&Bin> = bins.iter().collect();
    sorted.sort_by(|a, b| a.id.cmp(&b.id));
    sorted
}

#[cfg(test)]
mod tests {
    use super::*;
    use bevy_ecs::prelude::{Schedule, World};

    use crate::ecs::Connectivity;
    use crate::notifications::{Priority, SimEvent};
    use crate::test_helpers::{sample_bin, tick_plan};

    fn world_with(bins: Vec<Bin>) -> World {
        let mut world = World::new();
        world.insert_resource(AlertThresholds::default());
        world.insert_resource(NotificationLog::default());
        world.insert_resource(CurrentTick(tick_plan(1000)));
        for bin in bins {
            world.spawn(bin);
        }
        world
    }

    #[test]
    fn fill_alerts_follow_bands() {
        let mut world = world_with(vec![
            sample_bin("bin-1", (5.6, -0.18), 95.0),
            sample_bin("bin-2", (5.6, -0.17), 77.0),
            sample_bin("bin-3", (5.6, -0.16), 85.0),
            sample_bin("bin-4", (5.6, -0.15), 20.0),
        ]);
        let mut schedule = Schedule::default();
        schedule.add_systems(fill_threshold_system);
        schedule.run(&mut world);

        let log = world.resource::<NotificationLog>();
        let events: Vec<&SimEvent> = log.entries().map(|n| &n.event).collect();
        assert_eq!(events.len(), 2);
        assert!(matches!(events[0], SimEvent::CriticalFill { bin_id, .. } if bin_id.0 == "bin-1"));
        assert!(matches!(events[1], SimEvent::HighFill { bin_id, .. } if bin_id.0 == "bin-2"));
        assert_eq!(log.entries().next().map(|n| n.priority), Some(Priority::High));
    }

    #[test]
    fn repeated_checks_are_not_deduplicated() {
        let mut world = world_with(vec![sample_bin("bin-1", (5.6, -0.18), 95.0)]);
        let mut schedule = Schedule::default();
        schedule.add_systems(fill_threshold_system);
        schedule.run(&mut world);
        schedule.run(&mut world);
        assert_eq!(world.resource::<NotificationLog>().len(), 2);
    }

    #[test]
    fn sensor_alerts_cover_battery_and_links() {
        let mut weak = sample_bin("bin-1", (5.6, -0.18), 10.0);
        weak.sensor.battery_level = 15.0;
        let mut flaky = sample_bin("bin-2", (5.6, -0.17), 10.0);
        flaky.sensor.connectivity = Connectivity::Intermittent;
        let mut world = world_with(vec![weak, flaky]);

        let mut schedule = Schedule::default();
        schedule.add_systems(sensor_alert_system);
        schedule.run(&mut world);

        let log = world.resource::<NotificationLog>();
        let events: Vec<&SimEvent> = log.entries().map(|n| &n.event).collect();
        assert_eq!(events.len(), 2);
        assert!(matches!(events[0], SimEvent::LowBattery { .. }));
        assert!(matches!(
            events[1],
            SimEvent::ConnectivityIssue {
                state: Connectivity::Intermittent,
                ..
            }
        ));
    }
}
