//! Scenario setup: demand profiles, fleet generation and world construction.

mod build;
mod params;
mod profile;

pub use build::{build_simulation, generate_fleet, populate_fleet};
pub use params::FleetParams;
pub use profile::{NeighborhoodKind, Scenario, ScenarioProfile};
