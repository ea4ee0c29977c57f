//! Bracket seeding.

use rand::{SeedableRng, rngs::SmallRng, seq::SliceRandom};

/// Shuffle source for round-1 pairings.
///
/// Backed by `SmallRng`, which is fast but not cryptographically secure.
/// Bracket order only needs to be unpredictable to players, not to attackers.
pub struct Seeder {
    /// Random number generator
    rng: SmallRng,
}

impl Seeder {
    /// Create a seeder from the thread-local RNG
    pub fn new() -> Self {
        Self {
            rng: SmallRng::from_rng(&mut rand::rng()),
        }
    }

    /// Create a reproducible seeder
    pub fn from_seed(seed: u64) -> Self {
        Self {
            rng: SmallRng::seed_from_u64(seed),
        }
    }

    /// Shuffle uniformly in place
    pub fn shuffle<T>(&mut self, items: &mut [T]) {
        items.shuffle(&mut self.rng);
    }
}

impl Default for Seeder {
    fn default() -> Self {
        Self::new()
    }
}
