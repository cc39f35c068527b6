#![allow(dead_code)]

use waste_sim_core::ecs::{Bin, Connectivity};
use waste_sim_core::test_helpers::sample_bin;

/// Builder for bin fixtures. Defaults come from [`sample_bin`].
#[derive(Clone, Debug)]
pub struct BinBuilder {
    bin: Bin,
}

impl BinBuilder {
    /// A bin with the given id at (0, 0), empty.
    pub fn new(id: &str) -> Self {
        Self {
            bin: sample_bin(id, (0.0, 0.0), 0.0),
        }
    }

    pub fn at(mut self, lat: f64, lon: f64) -> Self {
        self.bin.location.lat = lat;
        self.bin.location.lon = lon;
        self
    }

    pub fn fill(mut self, level: f64) -> Self {
        self.bin.fill_level = level;
        self
    }

    pub fn capacity(mut self, liters: f64) -> Self {
        self.bin.capacity_liters = liters;
        self
    }

    /// Base growth rate with the random factor switched off.
    pub fn steady_rate(mut self, pct_per_hour: f64) -> Self {
        self.bin.base_fill_rate_pct_per_hour = pct_per_hour;
        self.bin.variability_factor = 0.0;
        self
    }

    pub fn neighborhood(mut self, name: &str) -> Self {
        self.bin.neighborhood = name.to_owned();
        self
    }

    pub fn battery(mut self, level: f64) -> Self {
        self.bin.sensor.battery_level = level;
        self
    }

    pub fn connectivity(mut self, state: Connectivity) -> Self {
        self.bin.sensor.connectivity = state;
        self
    }

    pub fn build(self) -> Bin {
        self.bin
    }
}

/// Three bins strung out east of the origin, 0.01 degrees apart.
pub fn eastward_bins(fills: [f64; 3]) -> Vec<Bin> {
    fills
        .iter()
        .enumerate()
        .map(|(i, fill)| {
            BinBuilder::new(&format!("bin-{}", i + 1))
                .at(0.0, 0.01 * (i + 1) as f64)
                .fill(*fill)
                .build()
        })
        .collect()
}
