use serde::{Deserialize, Serialize};

use crate::geo::GeoPoint;

/// Default fleet centre: Accra, Ghana.
const DEFAULT_CENTER_LAT: f64 = 5.6037;
const DEFAULT_CENTER_LON: f64 = -0.1870;

/// Parameters for generating the initial bin fleet.
///
/// Ranges are inclusive-exclusive `[min, max)` unless noted.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct FleetParams {
    pub num_bins: usize,
    pub center: GeoPoint,
    /// Full width of the square placement box, in degrees.
    pub spread_deg: f64,
    pub neighborhoods: Vec<String>,
    /// Seed range for the starting fill level, percent.
    pub start_fill_min: f64,
    pub start_fill_max: f64,
    pub capacity_min_liters: u32,
    pub capacity_max_liters: u32,
    pub base_fill_rate_min: f64,
    pub base_fill_rate_max: f64,
    pub variability_max: f64,
    pub battery_min: f64,
    pub battery_max: f64,
    /// Last collection is sampled uniformly within this many days before start.
    pub last_collection_window_days: u32,
}

impl Default for FleetParams {
    fn default() -> Self {
        Self {
            num_bins: 40,
            center: GeoPoint {
                lat: DEFAULT_CENTER_LAT,
                lon: DEFAULT_CENTER_LON,
            },
            spread_deg: 0.05,
            neighborhoods: [
                "Airport Residential",
                "Cantonments",
                "Osu",
                "Labone",
                "Adabraka",
            ]
            .into_iter()
            .map(str::to_owned)
            .collect(),
            start_fill_min: 20.0,
            start_fill_max: 60.0,
            capacity_min_liters: 100,
            capacity_max_liters: 200,
            base_fill_rate_min: 2.0,
            base_fill_rate_max: 5.0,
            variability_max: 0.3,
            battery_min: 70.0,
            battery_max: 100.0,
            last_collection_window_days: 7,
        }
    }
}

impl FleetParams {
    pub fn with_num_bins(mut self, num_bins: usize) -> Self {
        self.num_bins = num_bins;
        self
    }

    pub fn with_center(mut self, center: GeoPoint) -> Self {
        self.center = center;
        self
    }

    /// Every generated bin starts at exactly this fill level.
    pub fn with_start_fill(mut self, fill: f64) -> Self {
        self.start_fill_min = fill;
        self.start_fill_max = fill;
        self
    }

    pub fn with_start_fill_range(mut self, min: f64, max: f64) -> Self {
        self.start_fill_min = min;
        self.start_fill_max = max;
        self
    }

    pub fn with_neighborhoods(mut self, neighborhoods: Vec<String>) -> Self {
        self.neighborhoods = neighborhoods;
        self
    }
}
