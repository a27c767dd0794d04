//! Seedable RNG resource.
//!
//! Wraps `ChaCha8Rng`. Every randomized value in the engine (visitor drift,
//! queue estimates, arrival suggestions) is drawn from `ResMut<SimRng>`, so a
//! configured seed reproduces a run exactly. Without a seed the generator is
//! seeded from OS entropy, which is what a live dashboard wants.

use bevy::prelude::*;
use rand::SeedableRng;
use rand_chacha::ChaCha8Rng;

/// Seed used by the default resource and the test harness.
pub const DEFAULT_SEED: u64 = 42;

/// RNG resource for all simulated randomness.
///
/// Systems take `ResMut<SimRng>` and use `rng.0`, which implements
/// `rand::Rng`.
#[derive(Resource)]
pub struct SimRng(pub ChaCha8Rng);

impl Default for SimRng {
    fn default() -> Self {
        Self(ChaCha8Rng::seed_from_u64(DEFAULT_SEED))
    }
}

impl SimRng {
    pub fn from_seed_u64(seed: u64) -> Self {
        Self(ChaCha8Rng::seed_from_u64(seed))
    }

    pub fn from_entropy() -> Self {
        Self(ChaCha8Rng::from_entropy())
    }

    /// Seeded when a seed is given, OS entropy otherwise.
    pub fn from_optional_seed(seed: Option<u64>) -> Self {
        match seed {
            Some(seed) => Self::from_seed_u64(seed),
            None => Self::from_entropy(),
        }
    }
}
