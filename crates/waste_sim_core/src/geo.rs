//! Geographic helpers: validated coordinates and haversine distance.
//!
//! Distances are great-circle kilometres on a spherical Earth (radius 6371 km).
//! Routing between waypoints is straight-line; there is no road network.

use serde::{Deserialize, Serialize};

use crate::error::{Result, SimError};

const EARTH_RADIUS_KM: f64 = 6371.0;

/// A latitude/longitude pair in degrees.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct GeoPoint {
    pub lat: f64,
    pub lon: f64,
}

impl GeoPoint {
    /// Validated constructor. Rejects non-finite values and out-of-range degrees.
    pub fn new(lat: f64, lon: f64) -> Result<Self> {
        let point = Self { lat, lon };
        point.validate()?;
        Ok(point)
    }

    pub fn validate(&self) -> Result<()> {
        if !self.lat.is_finite() || !self.lon.is_finite() {
            return Err(SimError::invalid(format!(
                "coordinate ({}, {}) is not finite",
                self.lat, self.lon
            )));
        }
        if !(-90.0..=90.0).contains(&self.lat) || !(-180.0..=180.0).contains(&self.lon) {
            return Err(SimError::invalid(format!(
                "coordinate ({}, {}) is out of range",
                self.lat, self.lon
            )));
        }
        Ok(())
    }

    /// Linear interpolation in degree space; `t` is clamped to `[0, 1]`.
    pub fn lerp(self, other: GeoPoint, t: f64) -> GeoPoint {
        let t = t.clamp(0.0, 1.0);
        GeoPoint {
            lat: self.lat + (other.lat - self.lat) * t,
            lon: self.lon + (other.lon - self.lon) * t,
        }
    }
}

impl From<(f64, f64)> for GeoPoint {
    fn from((lat, lon): (f64, f64)) -> Self {
        Self { lat, lon }
    }
}

/// Haversine distance in kilometres.
pub fn distance_km(a: GeoPoint, b: GeoPoint) -> f64 {
    if a == b {
        return 0.0;
    }
    let (lat1, lon1) = (a.lat.to_radians(), a.lon.to_radians());
    let (lat2, lon2) = (b.lat.to_radians(), b.lon.to_radians());
    let dlat = lat2 - lat1;
    let dlon = lon2 - lon1;
    let sin_dlat = (dlat * 0.5).sin();
    let sin_dlon = (dlon * 0.5).sin();
    let h = sin_dlat * sin_dlat + lat1.cos() * lat2.cos() * sin_dlon * sin_dlon;
    let c = 2.0 * h.sqrt().atan2((1.0 - h).max(0.0).sqrt());
    (EARTH_RADIUS_KM * c).max(0.0)
}

/// Sum of consecutive leg distances along `points`.
pub fn path_length_km(points: impl IntoIterator<Item = GeoPoint>) -> f64 {
    let mut iter = points.into_iter();
    let Some(mut prev) = iter.next() else {
        return 0.0;
    };
    let mut total = 0.0;
    for point in iter {
        total += distance_km(prev, point);
        prev = point;
    }
    total
}
