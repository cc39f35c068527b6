//! ECS components for the bin fleet.
//!
//! Each registered bin is one entity carrying a [`Bin`] component. The
//! id → entity mapping lives in [`crate::bins::BinRegistry`].

use std::fmt;

use bevy_ecs::prelude::Component;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::error::{Result, SimError};
use crate::geo::GeoPoint;

#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct BinId(pub String);

impl fmt::Display for BinId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for BinId {
    fn from(value: &str) -> Self {
        Self(value.to_owned())
    }
}

impl From<String> for BinId {
    fn from(value: String) -> Self {
        Self(value)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum Connectivity {
    #[default]
    Online,
    Intermittent,
    Offline,
}

impl fmt::Display for Connectivity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let label = match self {
            Self::Online => "online",
            Self::Intermittent => "intermittent",
            Self::Offline => "offline",
        };
        f.write_str(label)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum BinCategory {
    #[default]
    General,
    Recycling,
    Organic,
}

/// Telemetry reported by the bin's fill sensor.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SensorData {
    /// Battery charge in percent, 0-100. Only ever decreases.
    pub battery_level: f64,
    pub connectivity: Connectivity,
    pub last_transmission: DateTime<Utc>,
}

impl SensorData {
    /// A freshly installed sensor: full battery, online.
    pub fn new_at(at: DateTime<Utc>) -> Self {
        Self {
            battery_level: 100.0,
            connectivity: Connectivity::Online,
            last_transmission: at,
        }
    }
}

/// A waste receptacle with a simulated fill level.
#[derive(Debug, Clone, PartialEq, Component, Serialize, Deserialize)]
pub struct Bin {
    pub id: BinId,
    pub name: String,
    pub location: GeoPoint,
    /// Fill level in percent, always within 0-100.
    pub fill_level: f64,
    pub capacity_liters: f64,
    /// Base growth in percentage points per simulated hour.
    pub base_fill_rate_pct_per_hour: f64,
    /// Amplitude of the per-update random factor, 0-1.
    pub variability_factor: f64,
    pub sensor: SensorData,
    pub last_collection_time: DateTime<Utc>,
    pub neighborhood: String,
    pub category: BinCategory,
}

impl Bin {
    /// Checks the registration invariants and clamps `fill_level` into range.
    pub fn validated(mut self) -> Result<Self> {
        if self.id.0.trim().is_empty() {
            return Err(SimError::invalid("bin id must not be empty"));
        }
        self.location.validate()?;
        if !(self.capacity_liters.is_finite() && self.capacity_liters > 0.0) {
            return Err(SimError::invalid(format!(
                "bin {}: capacity must be positive, got {}",
                self.id, self.capacity_liters
            )));
        }
        if !(self.base_fill_rate_pct_per_hour.is_finite() && self.base_fill_rate_pct_per_hour > 0.0)
        {
            return Err(SimError::invalid(format!(
                "bin {}: base fill rate must be positive, got {}",
                self.id, self.base_fill_rate_pct_per_hour
            )));
        }
        if !(0.0..=1.0).contains(&self.variability_factor) {
            return Err(SimError::invalid(format!(
                "bin {}: variability factor must be within [0, 1], got {}",
                self.id, self.variability_factor
            )));
        }
        if !(0.0..=100.0).contains(&self.sensor.battery_level) {
            return Err(SimError::invalid(format!(
                "bin {}: battery level must be within [0, 100], got {}",
                self.id, self.sensor.battery_level
            )));
        }
        self.fill_level = clamp_fill_level(self.fill_level)?;
        Ok(self)
    }

    /// True when the fields the tick depends on are usable numbers.
    pub fn is_well_formed(&self) -> bool {
        self.fill_level.is_finite()
            && self.base_fill_rate_pct_per_hour.is_finite()
            && self.variability_factor.is_finite()
            && self.sensor.battery_level.is_finite()
    }

    /// Liters of waste currently in the bin.
    pub fn waste_volume_liters(&self) -> f64 {
        self.capacity_liters * self.fill_level / 100.0
    }

    pub fn needs_collection(&self, threshold_pct: f64) -> bool {
        self.fill_level >= threshold_pct
    }

    pub(crate) fn empty_at(&mut self, at: DateTime<Utc>) {
        self.fill_level = 0.0;
        self.last_collection_time = at;
    }
}

/// Clamp a fill level into `[0, 100]`. Non-finite input is rejected.
pub fn clamp_fill_level(value: f64) -> Result<f64> {
    if !value.is_finite() {
        return Err(SimError::invalid(format!(
            "fill level must be a finite number, got {value}"
        )));
    }
    Ok(value.clamp(0.0, 100.0))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_helpers::sample_bin;

    #[test]
    fn validated_clamps_fill_level() {
        let mut bin = sample_bin("bin-1", (5.6, -0.18), 50.0);
        bin.fill_level = 130.0;
        let bin = bin.validated().expect("valid bin");
        assert_eq!(bin.fill_level, 100.0);
    }

    #[test]
    fn validated_rejects_bad_capacity_and_rates() {
        let mut bin = sample_bin("bin-1", (5.6, -0.18), 50.0);
        bin.capacity_liters = 0.0;
        assert!(bin.validated().is_err());

        let mut bin = sample_bin("bin-1", (5.6, -0.18), 50.0);
        bin.variability_factor = 1.5;
        assert!(bin.validated().is_err());

        let mut bin = sample_bin("bin-1", (5.6, -0.18), 50.0);
        bin.fill_level = f64::NAN;
        assert!(bin.validated().is_err());
    }

    #[test]
    fn waste_volume_scales_with_fill() {
        let mut bin = sample_bin("bin-1", (5.6, -0.18), 50.0);
        bin.capacity_liters = 200.0;
        assert_eq!(bin.waste_volume_liters(), 100.0);
    }

    #[test]
    fn connectivity_serializes_kebab_case() {
        let json = serde_json::to_string(&Connectivity::Intermittent).expect("json");
        assert_eq!(json, "\"intermittent\"");
    }
}
