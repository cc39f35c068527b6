//! Tick systems. The runner chains them in this order:
//! fill → fill thresholds → sensor drift → sensor alerts → route progress.

pub mod fill_level;
pub mod route_progress;
pub mod sensor_drift;
pub mod thresholds;
