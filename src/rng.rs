//! Injectable randomness for the spread rule
//!
//! The engine only needs uniform draws in [0.0, 1.0); keeping that behind a
//! trait lets tests force deterministic outcomes.

use rand::{Rng, SeedableRng};
use rand_chacha::ChaCha8Rng;

pub trait InfectionRng: Send {
    /// Uniform draw in [0.0, 1.0).
    fn draw(&mut self) -> f64;
}

/// Default source: ChaCha8 seeded from a u64 for reproducible runs.
pub struct SeededRng {
    inner: ChaCha8Rng,
}

impl SeededRng {
    pub fn new(seed: u64) -> Self {
        Self {
            inner: ChaCha8Rng::seed_from_u64(seed),
        }
    }
}

impl InfectionRng for SeededRng {
    fn draw(&mut self) -> f64 {
        self.inner.gen::<f64>()
    }
}

/// Every draw lands inside the infection threshold.
pub struct AlwaysInfect;

impl InfectionRng for AlwaysInfect {
    fn draw(&mut self) -> f64 {
        0.0
    }
}

/// Every draw lands outside the infection threshold.
pub struct NeverInfect;

impl InfectionRng for NeverInfect {
    fn draw(&mut self) -> f64 {
        1.0
    }
}
