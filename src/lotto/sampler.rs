use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};

use super::{PickedNumbers, PICK_COUNT, POOL_SIZE};

/// Draws six distinct numbers from the pool using an injected RNG
pub struct Sampler<R: Rng = StdRng> {
    rng: R,
}

impl Sampler<StdRng> {
    /// Deterministic sampler, same seed gives the same draws
    pub fn from_seed(seed: u64) -> Self {
        Self::new(StdRng::seed_from_u64(seed))
    }

    pub fn from_entropy() -> Self {
        Self::new(StdRng::from_os_rng())
    }
}

impl<R: Rng> Sampler<R> {
    pub fn new(rng: R) -> Self {
        Self { rng }
    }

    /// Draw without replacement: each step picks a uniform index into what is
    /// left of the pool and removes it, so every 6-combination is equally likely.
    pub fn pick(&mut self) -> PickedNumbers {
        let mut pool: Vec<u8> = (1..=POOL_SIZE).collect();
        let mut picked = [0u8; PICK_COUNT];

        for slot in picked.iter_mut() {
            let idx = self.rng.random_range(0..pool.len());
            *slot = pool.swap_remove(idx);
        }

        picked.sort_unstable();
        PickedNumbers(picked)
    }
}
