use crate::error::{Error, Result};
use crate::particle::Particle;
use crate::simulation::EnsembleSimulation;
use msd_common::EnsembleSeries;

/// Time grid for a run: `[0, dt, 2*dt, .., steps_count * dt]`.
pub fn build_time_grid(dt: f64, steps_count: usize) -> Vec<f64> {
    (0..=steps_count).map(|k| k as f64 * dt).collect()
}

/// Mean squared displacement of the ensemble at every step.
///
/// Entry `k` averages the squared displacement of all particles after `k`
/// steps; entry 0 is always 0 since every trajectory starts at the origin.
pub fn compute_msd(particles: &[Particle], steps_count: usize) -> Result<Vec<f64>> {
    if particles.is_empty() {
        return Err(Error::InvalidConfiguration(
            "MSD of an empty ensemble is undefined".into(),
        ));
    }

    let mut msd = Vec::with_capacity(steps_count + 1);
    msd.push(0.0);
    for k in 1..=steps_count {
        let mut sum = 0.0;
        for particle in particles {
            sum += particle.squared_displacement_at(k)?;
        }
        msd.push(sum / particles.len() as f64);
    }
    Ok(msd)
}

pub fn compute_mean(values: &[f64]) -> f64 {
    values.iter().sum::<f64>() / values.len() as f64
}

/// Bessel-corrected sample variance: `sum((x - mean)^2) / (n - 1)`.
///
/// Fewer than two samples leave the estimator undefined, which is reported as
/// an error rather than silently producing a NaN or infinity.
pub fn compute_variance(values: &[f64]) -> Result<f64> {
    if values.len() <= 1 {
        return Err(Error::DegenerateStatistics(values.len()));
    }
    let mean = compute_mean(values);
    let sum_sq: f64 = values.iter().map(|x| (x - mean) * (x - mean)).sum();
    Ok(sum_sq / (values.len() - 1) as f64)
}

/// Spread of the squared displacements at sampled steps.
///
/// At every step `k` with `k % interval == 0` the entry holds the square root
/// of the cross-particle variance of the squared displacement; all other
/// entries are 0, as is entry 0. Aligned with the time grid.
pub fn compute_error_series(
    particles: &[Particle],
    steps_count: usize,
    interval: usize,
) -> Result<Vec<f64>> {
    if interval == 0 {
        return Err(Error::InvalidConfiguration(
            "error bar interval must be greater than 0".into(),
        ));
    }

    let mut error = Vec::with_capacity(steps_count + 1);
    error.push(0.0);
    for k in 1..=steps_count {
        if k % interval != 0 {
            error.push(0.0);
            continue;
        }
        let displacements: Vec<f64> = particles
            .iter()
            .map(|p| p.squared_displacement_at(k))
            .collect::<Result<_>>()?;
        error.push(compute_variance(&displacements)?.sqrt());
    }
    Ok(error)
}

/// Aggregates a finished run into the exported series bundle.
pub fn aggregate(sim: &EnsembleSimulation) -> Result<EnsembleSeries> {
    let params = sim.params();
    let steps_count = params.steps_count as usize;
    let interval = params.error_bar_interval as usize;

    Ok(EnsembleSeries {
        time: build_time_grid(params.dt, steps_count),
        msd: compute_msd(sim.particles(), steps_count)?,
        error: compute_error_series(sim.particles(), steps_count, interval)?,
        error_bar_interval: params.error_bar_interval,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::noise::StepSource;
    use msd_common::Vec2;

    struct ConstantSource(Vec2);

    impl StepSource for ConstantSource {
        fn next_step(&mut self) -> Vec2 {
            self.0
        }
    }

    fn stepped_particle(steps: usize, step: Vec2) -> Particle {
        let mut particle = Particle::new();
        let mut source = ConstantSource(step);
        for _ in 0..steps {
            particle.step(1.0, &mut source);
        }
        particle
    }

    #[test]
    fn time_grid_starts_at_zero_and_is_strictly_increasing() {
        let grid = build_time_grid(0.01, 100);
        assert_eq!(grid.len(), 101);
        assert_eq!(grid[0], 0.0);
        assert!(grid.windows(2).all(|w| w[1] > w[0]));
        assert!((grid[100] - 1.0).abs() < 1e-12);
    }

    #[test]
    fn variance_matches_the_worked_example() {
        // Classic Bessel-correction example: divide by n - 1 = 7.
        let values = [2.0, 4.0, 4.0, 4.0, 5.0, 5.0, 7.0, 9.0];
        let variance = compute_variance(&values).unwrap();
        assert!((variance - 32.0 / 7.0).abs() < 1e-12);
    }

    #[test]
    fn variance_of_single_sample_is_degenerate() {
        let err = compute_variance(&[1.5]).unwrap_err();
        assert!(matches!(err, Error::DegenerateStatistics(1)));
        assert!(matches!(
            compute_variance(&[]).unwrap_err(),
            Error::DegenerateStatistics(0)
        ));
    }

    #[test]
    fn msd_starts_at_zero_and_averages_over_particles() {
        // Two deterministic walkers along x: displacements k and 2k per step.
        let particles = vec![
            stepped_particle(3, Vec2::new(1.0, 0.0)),
            stepped_particle(3, Vec2::new(2.0, 0.0)),
        ];
        let msd = compute_msd(&particles, 3).unwrap();
        assert_eq!(msd[0], 0.0);
        // At step k: (k^2 + (2k)^2) / 2 = 2.5 k^2
        for k in 1..=3 {
            let expected = 2.5 * (k * k) as f64;
            assert!((msd[k] - expected).abs() < 1e-12);
            assert!(msd[k] >= 0.0);
        }
    }

    #[test]
    fn msd_of_empty_ensemble_is_rejected() {
        assert!(matches!(
            compute_msd(&[], 5).unwrap_err(),
            Error::InvalidConfiguration(_)
        ));
    }

    #[test]
    fn error_series_is_nonzero_only_at_sampled_steps() {
        let particles = vec![
            stepped_particle(6, Vec2::new(1.0, 0.0)),
            stepped_particle(6, Vec2::new(2.0, 0.0)),
        ];
        let error = compute_error_series(&particles, 6, 3).unwrap();
        assert_eq!(error.len(), 7);
        for (k, value) in error.iter().enumerate() {
            if k > 0 && k % 3 == 0 {
                // Spread of the two squared displacements {k^2, 4k^2}.
                let a = (k * k) as f64;
                let b = 4.0 * a;
                let mean = (a + b) / 2.0;
                let var = ((a - mean).powi(2) + (b - mean).powi(2)) / 1.0;
                assert!((value - var.sqrt()).abs() < 1e-9, "step {k}");
            } else {
                assert_eq!(*value, 0.0, "step {k}");
            }
        }
    }

    #[test]
    fn error_series_with_one_particle_propagates_degeneracy() {
        let particles = vec![stepped_particle(4, Vec2::new(1.0, 0.0))];
        assert!(matches!(
            compute_error_series(&particles, 4, 2).unwrap_err(),
            Error::DegenerateStatistics(1)
        ));
    }
}
