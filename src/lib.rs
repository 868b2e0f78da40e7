pub mod error;
pub mod fit;
pub mod noise;
pub mod particle;
pub mod simulation;
pub mod stats;

pub use error::{Error, Result};
pub use fit::{fit_power_law, FitOptions, ZeroHandling};
pub use noise::{GaussianStepSource, StepSource};
pub use particle::Particle;
pub use simulation::EnsembleSimulation;
