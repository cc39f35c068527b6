use bevy_ecs::prelude::Resource;
use rand::rngs::StdRng;
use rand::SeedableRng;

/// Random source shared by the fill and sensor systems.
///
/// Seeded runs are reproducible; `None` draws from OS entropy.
#[derive(Resource)]
pub struct SimRng {
    rng: StdRng,
}

impl SimRng {
    pub fn new(seed: Option<u64>) -> Self {
        let rng = match seed {
            Some(seed) => StdRng::seed_from_u64(seed),
            None => StdRng::from_entropy(),
        };
        Self { rng }
    }

    pub fn rng(&mut self) -> &mut StdRng {
        &mut self.rng
    }
}

impl Default for SimRng {
    fn default() -> Self {
        Self::new(None)
    }
}
