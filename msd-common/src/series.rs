use crate::run_params::RunParams;
use serde::{Deserialize, Serialize};

/// Ensemble statistics aggregated over a finished run.
///
/// The three series are aligned index-for-index: entry `k` describes the
/// state after `k` steps, so `time[0] = 0`, `msd[0] = 0` and every series has
/// `steps_count + 1` entries.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EnsembleSeries {
    /// Time grid: `time[k] = k * dt`.
    pub time: Vec<f64>,
    /// Mean squared displacement of the ensemble at each step.
    pub msd: Vec<f64>,
    /// Spread of the squared displacements (square root of the Bessel-corrected
    /// cross-particle variance), nonzero only at sampled steps.
    pub error: Vec<f64>,
    /// The step interval at which `error` carries a value.
    pub error_bar_interval: u32,
}

/// Amplitude and exponent of the fitted power law `MSD(t) = A * t^n`.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct FitResult {
    pub amplitude: f64,
    pub exponent: f64,
}

/// Everything a reporting consumer needs from one run: the parameters it was
/// produced with, the aggregated series, and the fitted power law.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RunSummary {
    pub params: RunParams,
    pub series: EnsembleSeries,
    pub fit: FitResult,
}
