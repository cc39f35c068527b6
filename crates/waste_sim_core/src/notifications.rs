//! Simulation events, alert rules and the notification log.
//!
//! Systems push [`SimEvent`]s into the [`NotificationLog`]; an external
//! collaborator drains the undelivered ones after each tick. Alert rules are
//! plain functions so they can be tested without a world.

use std::collections::VecDeque;

use bevy_ecs::prelude::Resource;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::ecs::{Bin, BinId, Connectivity};
use crate::error::{Result, SimError};
use crate::geo::GeoPoint;
use crate::route::RouteId;

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum Priority {
    Low,
    Medium,
    High,
}

/// Display category used by the notification feed.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum NotificationKind {
    Success,
    Warning,
    Alert,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "kebab-case")]
pub enum SimEvent {
    BinCollected { bin_id: BinId, location: GeoPoint },
    RouteCompleted { route_id: RouteId },
    CriticalFill { bin_id: BinId, level: f64 },
    HighFill { bin_id: BinId, level: f64 },
    LowBattery { bin_id: BinId, level: f64 },
    ConnectivityIssue { bin_id: BinId, state: Connectivity },
}

impl SimEvent {
    pub fn priority(&self) -> Priority {
        match self {
            Self::CriticalFill { .. } => Priority::High,
            Self::HighFill { .. } | Self::ConnectivityIssue { .. } | Self::RouteCompleted { .. } => {
                Priority::Medium
            }
            Self::BinCollected { .. } | Self::LowBattery { .. } => Priority::Low,
        }
    }

    pub fn kind(&self) -> NotificationKind {
        match self {
            Self::BinCollected { .. } | Self::RouteCompleted { .. } => NotificationKind::Success,
            Self::CriticalFill { .. } => NotificationKind::Alert,
            Self::HighFill { .. } | Self::LowBattery { .. } | Self::ConnectivityIssue { .. } => {
                NotificationKind::Warning
            }
        }
    }

    pub fn title(&self) -> &'static str {
        match self {
            Self::BinCollected { .. } => "Bin Collected",
            Self::RouteCompleted { .. } => "Route Completed",
            Self::CriticalFill { .. } => "Critical Fill Level",
            Self::HighFill { .. } => "High Fill Level",
            Self::LowBattery { .. } => "Low Battery",
            Self::ConnectivityIssue { .. } => "Connectivity Issue",
        }
    }

    pub fn bin_id(&self) -> Option<&BinId> {
        match self {
            Self::BinCollected { bin_id, .. }
            | Self::CriticalFill { bin_id, .. }
            | Self::HighFill { bin_id, .. }
            | Self::LowBattery { bin_id, .. }
            | Self::ConnectivityIssue { bin_id, .. } => Some(bin_id),
            Self::RouteCompleted { .. } => None,
        }
    }
}

/// Alert bands. Fill values are percent; the high-fill band is `[high_fill_min, high_fill_max)`.
#[derive(Debug, Clone, Copy, PartialEq, Resource, Serialize, Deserialize)]
#[serde(default)]
pub struct AlertThresholds {
    pub critical_fill_pct: f64,
    pub high_fill_min_pct: f64,
    pub high_fill_max_pct: f64,
    pub low_battery_pct: f64,
}

impl Default for AlertThresholds {
    fn default() -> Self {
        // The high band stops at 80, leaving 80-90 silent.
        Self {
            critical_fill_pct: 90.0,
            high_fill_min_pct: 75.0,
            high_fill_max_pct: 80.0,
            low_battery_pct: 20.0,
        }
    }
}

impl AlertThresholds {
    pub fn validate(&self) -> Result<()> {
        if self.high_fill_min_pct > self.high_fill_max_pct {
            return Err(SimError::config(format!(
                "high fill band is empty: [{}, {})",
                self.high_fill_min_pct, self.high_fill_max_pct
            )));
        }
        Ok(())
    }
}

/// Fill-level alert for one bin, if any.
pub fn fill_alert(bin: &Bin, thresholds: &AlertThresholds) -> Option<SimEvent> {
    let level = bin.fill_level;
    if level >= thresholds.critical_fill_pct {
        Some(SimEvent::CriticalFill {
            bin_id: bin.id.clone(),
            level,
        })
    } else if level >= thresholds.high_fill_min_pct && level < thresholds.high_fill_max_pct {
        Some(SimEvent::HighFill {
            bin_id: bin.id.clone(),
            level,
        })
    } else {
        None
    }
}

/// Battery and connectivity alerts for one bin.
pub fn sensor_alerts(bin: &Bin, thresholds: &AlertThresholds) -> Vec<SimEvent> {
    let mut alerts = Vec::new();
    if bin.sensor.battery_level < thresholds.low_battery_pct {
        alerts.push(SimEvent::LowBattery {
            bin_id: bin.id.clone(),
            level: bin.sensor.battery_level,
        });
    }
    if bin.sensor.connectivity != Connectivity::Online {
        alerts.push(SimEvent::ConnectivityIssue {
            bin_id: bin.id.clone(),
            state: bin.sensor.connectivity,
        });
    }
    alerts
}

/// Human-readable message for an event, given the display name of the bin
/// or route it concerns.
pub fn describe(event: &SimEvent, subject_name: Option<&str>) -> String {
    let name = subject_name.unwrap_or("Bin");
    match event {
        SimEvent::BinCollected { location, .. } => format!(
            "{name} has been emptied at {:.4}, {:.4}.",
            location.lat, location.lon
        ),
        SimEvent::RouteCompleted { route_id } => match subject_name {
            Some(route_name) => format!("{route_name} has been completed successfully."),
            None => format!("Route {route_id} has been completed successfully."),
        },
        SimEvent::CriticalFill { level, .. } => format!(
            "{name} is at {}% capacity and requires immediate attention.",
            level.round()
        ),
        SimEvent::HighFill { level, .. } => format!(
            "{name} is at {}% capacity and should be scheduled for collection.",
            level.round()
        ),
        SimEvent::LowBattery { level, .. } => format!(
            "{name} sensor battery is at {}%. Replace soon.",
            level.round()
        ),
        SimEvent::ConnectivityIssue { state, .. } => {
            format!("{name} sensor is {state}. Data may be delayed.")
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Notification {
    pub id: u64,
    pub event: SimEvent,
    pub title: String,
    pub message: String,
    pub priority: Priority,
    pub kind: NotificationKind,
    pub bin_id: Option<BinId>,
    /// Simulated time at which the event was raised.
    pub created_at: DateTime<Utc>,
    pub read: bool,
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct NotificationConfig {
    /// Oldest notifications are dropped once the log holds this many.
    pub max_entries: usize,
}

impl Default for NotificationConfig {
    fn default() -> Self {
        Self { max_entries: 500 }
    }
}

/// Bounded, append-only notification log with a delivery cursor.
#[derive(Debug, Resource)]
pub struct NotificationLog {
    entries: VecDeque<Notification>,
    next_id: u64,
    /// Ids below this have been handed out by [`NotificationLog::take_undelivered`].
    delivered_below: u64,
    max_entries: usize,
}

impl Default for NotificationLog {
    fn default() -> Self {
        Self::new(NotificationConfig::default())
    }
}

impl NotificationLog {
    pub fn new(config: NotificationConfig) -> Self {
        Self {
            entries: VecDeque::new(),
            next_id: 1,
            delivered_below: 1,
            max_entries: config.max_entries.max(1),
        }
    }

    /// Record an event raised at simulated time `at`. Returns the notification id.
    pub fn push(&mut self, event: SimEvent, message: String, at: DateTime<Utc>) -> u64 {
        let id = self.next_id;
        self.next_id += 1;
        let notification = Notification {
            id,
            title: event.title().to_owned(),
            priority: event.priority(),
            kind: event.kind(),
            bin_id: event.bin_id().cloned(),
            event,
            message,
            created_at: at,
            read: false,
        };
        self.entries.push_back(notification);
        while self.entries.len() > self.max_entries {
            self.entries.pop_front();
        }
        id
    }

    /// Oldest first.
    pub fn entries(&self) -> impl Iterator<Item = &Notification> {
        self.entries.iter()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn unread_count(&self) -> usize {
        self.entries.iter().filter(|n| !n.read).count()
    }

    pub fn mark_read(&mut self, id: u64) -> Result<()> {
        let entry = self
            .entries
            .iter_mut()
            .find(|n| n.id == id)
            .ok_or(SimError::NotificationNotFound(id))?;
        entry.read = true;
        Ok(())
    }

    pub fn mark_all_read(&mut self) {
        for entry in &mut self.entries {
            entry.read = true;
        }
    }

    pub fn clear(&mut self) {
        self.entries.clear();
        self.delivered_below = self.next_id;
    }

    /// Notifications not yet handed out, oldest first. Each is returned once.
    pub fn take_undelivered(&mut self) -> Vec<Notification> {
        let cursor = self.delivered_below;
        self.delivered_below = self.next_id;
        self.entries
            .iter()
            .filter(|n| n.id >= cursor)
            .cloned()
            .collect()
    }
}
