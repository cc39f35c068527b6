use bevy_ecs::prelude::{Query, Res, ResMut};
use tracing::{debug, warn};

use crate::clock::CurrentTick;
use crate::ecs::Bin;
use crate::fill::{drift_sensor, SensorDriftConfig};
use crate::rng::SimRng;

/// One sensor transmission for every bin: battery drain and a connectivity re-roll.
pub fn sensor_drift_system(
    tick: Res<CurrentTick>,
    config: Res<SensorDriftConfig>,
    mut rng: ResMut<SimRng>,
    mut bins: Query<&mut Bin>,
) {
    let at = tick.0.simulated_time;
    let mut drifted = 0usize;
    for mut bin in bins.iter_mut() {
        if !bin.is_well_formed() {
            warn!(bin = %bin.id, "skipping sensor drift for malformed bin");
            continue;
        }
        drift_sensor(&mut bin.sensor, &config, at, rng.rng());
        drifted += 1;
    }
    debug!(tick = tick.0.tick, drifted, "sensor drift applied");
}
