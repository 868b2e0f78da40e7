use serde::{Deserialize, Serialize};

/// Runtime parameters derived from the configuration, fixed for the whole run.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RunParams {
    pub num_particles: u32,
    /// Delta t of the Euler stepping scheme.
    pub dt: f64,
    pub total_time: f64,
    /// Number of discrete steps; every particle history has `steps_count + 1`
    /// entries including the origin.
    pub steps_count: u32,
    /// Error bars are sampled every this many steps.
    pub error_bar_interval: u32,
    /// Base seed; each particle derives its own generator seed from it.
    pub seed: u64,
}
