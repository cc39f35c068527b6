use bevy_ecs::prelude::{Query, Res, ResMut};
use tracing::warn;

use crate::clock::CurrentTick;
use crate::ecs::Bin;
use crate::fill::advance_fill;
use crate::rng::SimRng;
use crate::scenario::ScenarioProfile;

/// Grow every bin's fill level by this tick's simulated elapsed time.
pub fn fill_level_system(
    tick: Res<CurrentTick>,
    profile: Res<ScenarioProfile>,
    mut rng: ResMut<SimRng>,
    mut bins: Query<&mut Bin>,
) {
    let plan = &tick.0;
    if plan.simulated_elapsed_ms == 0 {
        return;
    }
    for mut bin in bins.iter_mut() {
        if !bin.is_well_formed() {
            warn!(bin = %bin.id, "skipping fill update for malformed bin");
            continue;
        }
        let multiplier = profile.multiplier(plan.scenario, &bin.neighborhood);
        advance_fill(&mut bin, plan.simulated_elapsed_ms, multiplier, rng.rng());
    }
}
