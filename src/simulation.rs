use crate::error::{Error, Result};
use crate::noise::GaussianStepSource;
use crate::particle::Particle;
use msd_common::RunParams;
use rayon::prelude::*;
use std::sync::atomic::{AtomicU32, Ordering};

/// Callback invoked after each particle finishes its trajectory, with
/// `(completed, total)` counts. Runs outside the stepping loop so the core
/// itself performs no I/O.
pub type ProgressObserver<'a> = &'a (dyn Fn(u32, u32) + Sync);

/// Drives a fixed-size ensemble of independent Brownian particles through a
/// fixed number of discrete time steps.
#[derive(Debug)]
pub struct EnsembleSimulation {
    params: RunParams,
    particles: Vec<Particle>,
}

impl EnsembleSimulation {
    /// Creates the ensemble described by `params` with every particle at the
    /// origin. The parameters are re-checked here so the simulation can be
    /// constructed directly, without going through the config loader.
    pub fn new(params: RunParams) -> Result<Self> {
        if params.num_particles == 0 {
            return Err(Error::InvalidConfiguration(
                "num_particles must be greater than 0".into(),
            ));
        }
        if params.dt <= 0.0 {
            return Err(Error::InvalidConfiguration("dt must be positive".into()));
        }
        if params.total_time <= 0.0 {
            return Err(Error::InvalidConfiguration(
                "total_time must be positive".into(),
            ));
        }

        let particles = (0..params.num_particles).map(|_| Particle::new()).collect();
        Ok(Self { params, particles })
    }

    /// Runs every particle to completion without progress reporting.
    pub fn run(&mut self) {
        self.run_with_observer(None);
    }

    /// Runs every particle through `steps_count` steps.
    ///
    /// Trajectories are mutually independent, so the ensemble is stepped
    /// particle-major in parallel. Each particle owns a generator seeded from
    /// the run seed and its index, which keeps the result identical for a
    /// given seed regardless of how rayon schedules the work.
    pub fn run_with_observer(&mut self, observer: Option<ProgressObserver<'_>>) {
        let dt = self.params.dt;
        let steps_count = self.params.steps_count;
        let seed = self.params.seed;
        let total = self.params.num_particles;
        let completed = AtomicU32::new(0);

        self.particles
            .par_iter_mut()
            .enumerate()
            .for_each(|(idx, particle)| {
                let mut source = GaussianStepSource::new(seed.wrapping_add(idx as u64));
                for _ in 0..steps_count {
                    particle.step(dt, &mut source);
                }

                if let Some(callback) = observer {
                    let done = completed.fetch_add(1, Ordering::Relaxed) + 1;
                    callback(done, total);
                }
            });
    }

    pub fn particle_count(&self) -> u32 {
        self.params.num_particles
    }

    pub fn particles(&self) -> &[Particle] {
        &self.particles
    }

    pub fn params(&self) -> &RunParams {
        &self.params
    }
}
