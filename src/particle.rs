use crate::error::{Error, Result};
use crate::noise::StepSource;
use msd_common::Vec2;

/// One Brownian particle and its full trajectory.
///
/// The history is append-only and starts with the origin, so after `k` calls
/// to [`Particle::step`] it holds `k + 1` positions.
#[derive(Debug, Clone)]
pub struct Particle {
    position: Vec2,
    history: Vec<Vec2>,
}

impl Particle {
    /// A new particle at the origin with the origin already recorded.
    pub fn new() -> Self {
        let origin = Vec2::zero();
        Self {
            position: origin,
            history: vec![origin],
        }
    }

    /// Advances the particle by one Euler-Maruyama step:
    /// `position += sqrt(dt) * (dx, dy)` with `(dx, dy)` standard Gaussian.
    ///
    /// Appends exactly one entry to the history.
    pub fn step<S: StepSource>(&mut self, dt: f64, source: &mut S) {
        let noise = source.next_step();
        self.position = self.position.add(noise.scale(dt.sqrt()));
        self.history.push(self.position);
    }

    pub fn position(&self) -> Vec2 {
        self.position
    }

    /// The recorded position after `step_index` steps.
    pub fn position_at(&self, step_index: usize) -> Result<Vec2> {
        self.history
            .get(step_index)
            .copied()
            .ok_or(Error::IndexOutOfRange {
                index: step_index,
                len: self.history.len(),
            })
    }

    /// Squared Euclidean distance from the origin after `step_index` steps.
    pub fn squared_displacement_at(&self, step_index: usize) -> Result<f64> {
        Ok(self.position_at(step_index)?.length_squared())
    }

    /// Number of steps taken so far.
    pub fn steps_taken(&self) -> usize {
        self.history.len() - 1
    }

    /// The full recorded trajectory, origin first.
    pub fn history(&self) -> &[Vec2] {
        &self.history
    }
}

impl Default for Particle {
    fn default() -> Self {
        Self::new()
    }
}
