pub mod bins;
pub mod clock;
pub mod config;
pub mod ecs;
pub mod error;
pub mod executor;
pub mod fill;
pub mod geo;
pub mod notifications;
pub mod planner;
pub mod rng;
pub mod route;
pub mod runner;
pub mod scenario;
pub mod simulation;
pub mod systems;
pub mod telemetry;

#[cfg(any(test, feature = "test-helpers"))]
pub mod test_helpers;

pub use config::SimulationConfig;
pub use error::{ErrorKind, Result, SimError};
pub use simulation::Simulation;
