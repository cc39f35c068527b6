use bevy_ecs::prelude::Resource;
use serde::{Deserialize, Serialize};

use crate::ecs::Bin;
use crate::error::{Result, SimError};
use crate::geo::path_length_km;
use crate::route::{Route, RoutePoint};

/// Planner and vehicle parameters.
#[derive(Debug, Clone, PartialEq, Resource, Serialize, Deserialize)]
#[serde(default)]
pub struct PlannerConfig {
    /// Bins at or above this fill level (percent) are scheduled for pickup.
    pub collection_threshold_pct: f64,
    /// Average speed used for the duration estimate.
    pub assumed_speed_kmh: f64,
    pub fuel_rate_l_per_km: f64,
    pub emission_factor_kg_per_l: f64,
    pub vehicle_id: String,
    pub vehicle_capacity_liters: f64,
}

impl Default for PlannerConfig {
    fn default() -> Self {
        Self {
            collection_threshold_pct: 50.0,
            assumed_speed_kmh: 30.0,
            fuel_rate_l_per_km: 0.3,
            emission_factor_kg_per_l: 2.68,
            vehicle_id: "truck-1".to_owned(),
            vehicle_capacity_liters: 10_000.0,
        }
    }
}

impl PlannerConfig {
    pub fn with_collection_threshold(mut self, pct: f64) -> Self {
        self.collection_threshold_pct = pct;
        self
    }

    pub fn with_assumed_speed(mut self, kmh: f64) -> Self {
        self.assumed_speed_kmh = kmh;
        self
    }

    pub fn with_vehicle_capacity(mut self, liters: f64) -> Self {
        self.vehicle_capacity_liters = liters;
        self
    }

    pub fn validate(&self) -> Result<()> {
        if !(0.0..=100.0).contains(&self.collection_threshold_pct) {
            return Err(SimError::config(format!(
                "collection threshold must be within [0, 100], got {}",
                self.collection_threshold_pct
            )));
        }
        let positive = [
            ("assumed_speed_kmh", self.assumed_speed_kmh),
            ("vehicle_capacity_liters", self.vehicle_capacity_liters),
        ];
        for (name, value) in positive {
            if !(value.is_finite() && value > 0.0) {
                return Err(SimError::config(format!("{name} must be positive, got {value}")));
            }
        }
        let non_negative = [
            ("fuel_rate_l_per_km", self.fuel_rate_l_per_km),
            ("emission_factor_kg_per_l", self.emission_factor_kg_per_l),
        ];
        for (name, value) in non_negative {
            if !(value.is_finite() && value >= 0.0) {
                return Err(SimError::config(format!(
                    "{name} must be non-negative, got {value}"
                )));
            }
        }
        Ok(())
    }
}

/// Cost figures for one route. Recomputed from scratch whenever a route is built.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct RouteMetrics {
    pub total_distance_km: f64,
    pub estimated_duration_min: f64,
    pub fuel_consumption_l: f64,
    pub co2_emissions_kg: f64,
    pub bins_collected: usize,
    pub total_waste_collected_l: f64,
}

impl RouteMetrics {
    /// Metrics for `points`, where `pickups` are the bins visited.
    pub fn compute(points: &[RoutePoint], pickups: &[&Bin], config: &PlannerConfig) -> Self {
        let total_distance_km = path_length_km(points.iter().map(|p| p.location));
        let estimated_duration_min = total_distance_km / config.assumed_speed_kmh * 60.0;
        let fuel_consumption_l = total_distance_km * config.fuel_rate_l_per_km;
        Self {
            total_distance_km,
            estimated_duration_min,
            fuel_consumption_l,
            co2_emissions_kg: fuel_consumption_l * config.emission_factor_kg_per_l,
            bins_collected: points.iter().filter(|p| p.is_pickup()).count(),
            total_waste_collected_l: total_waste_liters(pickups),
        }
    }
}

/// Summed in id order so every route over the same bins reports the same total.
fn total_waste_liters(pickups: &[&Bin]) -> f64 {
    let mut sorted: Vec<&Bin> = pickups.to_vec();
    sorted.sort_by(|a, b| a.id.cmp(&b.id));
    sorted.iter().map(|b| b.waste_volume_liters()).sum()
}

/// What the optimized route saves over the baseline.
///
/// Negative values mean the optimized route is worse.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct RouteComparison {
    pub distance_saved_km: f64,
    pub fuel_saved_l: f64,
    pub co2_saved_kg: f64,
    pub time_saved_min: f64,
    pub distance_saved_pct: f64,
    pub time_saved_pct: f64,
}

impl RouteComparison {
    pub fn between(baseline: &Route, optimized: &Route) -> Self {
        let b = baseline.metrics();
        let o = optimized.metrics();
        let distance_saved_km = b.total_distance_km - o.total_distance_km;
        let time_saved_min = b.estimated_duration_min - o.estimated_duration_min;
        Self {
            distance_saved_km,
            fuel_saved_l: b.fuel_consumption_l - o.fuel_consumption_l,
            co2_saved_kg: b.co2_emissions_kg - o.co2_emissions_kg,
            time_saved_min,
            distance_saved_pct: percent_of(distance_saved_km, b.total_distance_km),
            time_saved_pct: percent_of(time_saved_min, b.estimated_duration_min),
        }
    }
}

fn percent_of(part: f64, whole: f64) -> f64 {
    if whole > 0.0 {
        part / whole * 100.0
    } else {
        0.0
    }
}
