use rand::rngs::SmallRng;
use rand::{Rng, SeedableRng};

/// Seam between the simulation and its randomness so tests can substitute
/// a deterministic source.
pub trait RandomSource: Send {
    /// Uniform draw from `[low, high)`.
    fn uniform(&mut self, low: f64, high: f64) -> f64;
}

/// Production source backed by a `SmallRng` seeded from OS entropy.
#[derive(Debug)]
pub struct EntropySource {
    rng: SmallRng,
}

impl EntropySource {
    pub fn new() -> Self {
        EntropySource {
            rng: SmallRng::from_entropy(),
        }
    }

    pub fn from_seed(seed: u64) -> Self {
        EntropySource {
            rng: SmallRng::seed_from_u64(seed),
        }
    }
}

impl Default for EntropySource {
    fn default() -> Self {
        Self::new()
    }
}

impl RandomSource for EntropySource {
    fn uniform(&mut self, low: f64, high: f64) -> f64 {
        self.rng.gen_range(low..high)
    }
}

/// Deterministic source answering the midpoint of every requested range,
/// used to pin down expected tick outcomes.
#[cfg(test)]
pub struct MidpointSource;

#[cfg(test)]
impl RandomSource for MidpointSource {
    fn uniform(&mut self, low: f64, high: f64) -> f64 {
        (low + high) / 2.0
    }
}
