//! Telemetry: read-only snapshots of the simulation for external consumers.

use bevy_ecs::prelude::World;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::bins::snapshot;
use crate::clock::{SimSpeed, SimulationClock};
use crate::ecs::{Bin, Connectivity};
use crate::notifications::AlertThresholds;
use crate::planner::{PlannerConfig, RouteComparison};
use crate::route::{Route, RouteBook, RouteId};
use crate::scenario::Scenario;

/// Bin counts per fill band: low < 50, medium 50-75, high 75-90, critical >= 90.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct FillDistribution {
    pub low: usize,
    pub medium: usize,
    pub high: usize,
    pub critical: usize,
}

impl FillDistribution {
    pub fn record(&mut self, fill_level: f64) {
        if fill_level >= 90.0 {
            self.critical += 1;
        } else if fill_level >= 75.0 {
            self.high += 1;
        } else if fill_level >= 50.0 {
            self.medium += 1;
        } else {
            self.low += 1;
        }
    }

    pub fn total(&self) -> usize {
        self.low + self.medium + self.high + self.critical
    }
}

/// Aggregates over the bin fleet at a point in time.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct FleetStats {
    pub bin_count: usize,
    pub average_fill: f64,
    pub distribution: FillDistribution,
    /// Bins at or above the planner's collection threshold.
    pub needing_collection: usize,
    pub low_battery: usize,
    pub not_online: usize,
}

impl FleetStats {
    pub fn from_bins(bins: &[Bin], collection_threshold_pct: f64, low_battery_pct: f64) -> Self {
        let mut stats = Self {
            bin_count: bins.len(),
            ..Self::default()
        };
        if bins.is_empty() {
            return stats;
        }
        let mut total_fill = 0.0;
        for bin in bins {
            total_fill += bin.fill_level;
            stats.distribution.record(bin.fill_level);
            if bin.needs_collection(collection_threshold_pct) {
                stats.needing_collection += 1;
            }
            if bin.sensor.battery_level < low_battery_pct {
                stats.low_battery += 1;
            }
            if bin.sensor.connectivity != Connectivity::Online {
                stats.not_online += 1;
            }
        }
        stats.average_fill = total_fill / bins.len() as f64;
        stats
    }
}

/// Everything an external collaborator needs to render one frame.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SimSnapshot {
    pub simulated_time: DateTime<Utc>,
    pub is_running: bool,
    pub speed: SimSpeed,
    pub scenario: Scenario,
    pub bins: Vec<Bin>,
    pub routes: Vec<Route>,
    pub active_route: Option<RouteId>,
    pub comparison: Option<RouteComparison>,
    pub stats: FleetStats,
}

/// Capture a snapshot of `world`. Missing resources yield empty sections.
pub fn capture_snapshot(world: &World) -> SimSnapshot {
    let bins = snapshot(world);
    let threshold = world
        .get_resource::<PlannerConfig>()
        .map(|c| c.collection_threshold_pct)
        .unwrap_or_else(|| PlannerConfig::default().collection_threshold_pct);
    let low_battery = world
        .get_resource::<AlertThresholds>()
        .copied()
        .unwrap_or_default()
        .low_battery_pct;
    let stats = FleetStats::from_bins(&bins, threshold, low_battery);

    let (simulated_time, is_running, speed, scenario) = match world.get_resource::<SimulationClock>() {
        Some(clock) => (
            clock.simulated_time(),
            clock.is_running(),
            clock.speed(),
            clock.scenario(),
        ),
        None => (Utc::now(), false, SimSpeed::default(), Scenario::default()),
    };
    let (routes, active_route, comparison) = match world.get_resource::<RouteBook>() {
        Some(book) => (
            book.routes().to_vec(),
            book.active_id().cloned(),
            book.comparison().cloned(),
        ),
        None => (Vec::new(), None, None),
    };

    SimSnapshot {
        simulated_time,
        is_running,
        speed,
        scenario,
        bins,
        routes,
        active_route,
        comparison,
        stats,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_helpers::sample_bin;

    #[test]
    fn distribution_bands() {
        let mut dist = FillDistribution::default();
        for level in [10.0, 49.9, 50.0, 74.9, 75.0, 89.9, 90.0, 100.0] {
            dist.record(level);
        }
        assert_eq!(
            dist,
            FillDistribution {
                low: 2,
                medium: 2,
                high: 2,
                critical: 2
            }
        );
        assert_eq!(dist.total(), 8);
    }

    #[test]
    fn stats_average_and_counts() {
        let mut offline = sample_bin("bin-3", (5.6, -0.16), 90.0);
        offline.sensor.connectivity = Connectivity::Offline;
        offline.sensor.battery_level = 5.0;
        let bins = vec![
            sample_bin("bin-1", (5.6, -0.18), 30.0),
            sample_bin("bin-2", (5.6, -0.17), 60.0),
            offline,
        ];
        let stats = FleetStats::from_bins(&bins, 50.0, 20.0);
        assert_eq!(stats.bin_count, 3);
        assert!((stats.average_fill - 60.0).abs() < 1e-9);
        assert_eq!(stats.needing_collection, 2);
        assert_eq!(stats.low_battery, 1);
        assert_eq!(stats.not_online, 1);
    }

    #[test]
    fn empty_world_snapshot_is_empty() {
        let world = World::new();
        let snap = capture_snapshot(&world);
        assert!(snap.bins.is_empty());
        assert!(snap.routes.is_empty());
        assert_eq!(snap.stats.bin_count, 0);
        assert!(!snap.is_running);
    }
}
