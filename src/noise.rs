use msd_common::Vec2;
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use rand_distr::StandardNormal;

/// Source of the random increments driving a particle.
///
/// Implementations must produce pairs that are independent across calls and
/// across the two coordinates. The trait exists so tests can substitute a
/// deterministic source and so every particle can own its generator when the
/// ensemble is stepped in parallel.
pub trait StepSource {
    /// Next pair of independent draws from a zero-mean, unit-variance Gaussian.
    fn next_step(&mut self) -> Vec2;
}

/// Production step source backed by a seeded `StdRng`.
pub struct GaussianStepSource {
    rng: StdRng,
}

impl GaussianStepSource {
    pub fn new(seed: u64) -> Self {
        Self {
            rng: StdRng::seed_from_u64(seed),
        }
    }
}

impl StepSource for GaussianStepSource {
    fn next_step(&mut self) -> Vec2 {
        let dx: f64 = self.rng.sample(StandardNormal);
        let dy: f64 = self.rng.sample(StandardNormal);
        Vec2::new(dx, dy)
    }
}
