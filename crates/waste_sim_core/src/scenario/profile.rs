use std::collections::HashMap;
use std::fmt;
use std::str::FromStr;

use bevy_ecs::prelude::Resource;
use serde::{Deserialize, Serialize};

use crate::error::SimError;

/// Named demand profile that scales fill growth per neighborhood.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum Scenario {
    #[default]
    Normal,
    Weekend,
    SpecialEvent,
}

impl fmt::Display for Scenario {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let label = match self {
            Self::Normal => "normal",
            Self::Weekend => "weekend",
            Self::SpecialEvent => "special-event",
        };
        f.write_str(label)
    }
}

impl FromStr for Scenario {
    type Err = SimError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "normal" => Ok(Self::Normal),
            "weekend" => Ok(Self::Weekend),
            "special-event" | "special_event" => Ok(Self::SpecialEvent),
            other => Err(SimError::invalid(format!("unsupported scenario: {other}"))),
        }
    }
}

/// Land-use class of a neighborhood, used to pick the scenario multiplier.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum NeighborhoodKind {
    Business,
    Residential,
    #[default]
    Mixed,
}

/// Multipliers keyed on `(scenario, neighborhood kind)`.
///
/// Unknown neighborhoods are treated as [`NeighborhoodKind::Mixed`].
#[derive(Debug, Clone, PartialEq, Resource, Serialize, Deserialize)]
#[serde(default)]
pub struct ScenarioProfile {
    pub weekend_business_multiplier: f64,
    pub weekend_residential_multiplier: f64,
    pub special_event_multiplier: f64,
    pub neighborhoods: HashMap<String, NeighborhoodKind>,
}

impl Default for ScenarioProfile {
    fn default() -> Self {
        let neighborhoods = [
            ("Cantonments", NeighborhoodKind::Business),
            ("Osu", NeighborhoodKind::Residential),
            ("Labone", NeighborhoodKind::Residential),
            ("Airport Residential", NeighborhoodKind::Mixed),
            ("Adabraka", NeighborhoodKind::Mixed),
        ]
        .into_iter()
        .map(|(name, kind)| (name.to_owned(), kind))
        .collect();
        Self {
            weekend_business_multiplier: 0.7,
            weekend_residential_multiplier: 1.2,
            special_event_multiplier: 2.0,
            neighborhoods,
        }
    }
}

impl ScenarioProfile {
    pub fn with_neighborhood(mut self, name: impl Into<String>, kind: NeighborhoodKind) -> Self {
        self.neighborhoods.insert(name.into(), kind);
        self
    }

    pub fn neighborhood_kind(&self, neighborhood: &str) -> NeighborhoodKind {
        self.neighborhoods
            .get(neighborhood)
            .copied()
            .unwrap_or_default()
    }

    pub fn multiplier(&self, scenario: Scenario, neighborhood: &str) -> f64 {
        match scenario {
            Scenario::Normal => 1.0,
            Scenario::SpecialEvent => self.special_event_multiplier,
            Scenario::Weekend => match self.neighborhood_kind(neighborhood) {
                NeighborhoodKind::Business => self.weekend_business_multiplier,
                NeighborhoodKind::Residential => self.weekend_residential_multiplier,
                NeighborhoodKind::Mixed => 1.0,
            },
        }
    }
}
