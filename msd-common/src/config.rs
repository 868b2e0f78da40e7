use crate::run_params::RunParams;
use anyhow::Result;
use serde::{Deserialize, Serialize};
use std::path::Path;

// Configuration for the particle ensemble
#[derive(Deserialize, Serialize, Debug, Clone)]
pub struct EnsembleConfig {
    pub num_particles: u32,
    #[serde(default = "default_seed")]
    pub seed: u64,
}

// Configuration for timing
#[derive(Deserialize, Serialize, Debug, Clone)]
pub struct TimingConfig {
    pub time_step: f64,
    pub total_time: f64,
}

// Configuration for statistics sampling and the power-law fit
#[derive(Deserialize, Serialize, Debug, Clone)]
pub struct SamplingConfig {
    /// Error bars are computed every this many steps. When absent, the
    /// interval is derived so that roughly ten error bars span the run.
    #[serde(default)]
    pub error_bar_interval: Option<u32>,
    /// Drop exactly-zero MSD samples from the log-log fit instead of
    /// substituting an origin point (the default).
    #[serde(default)]
    pub exclude_zero_samples: bool,
    /// Treat the MSD/time series as already log-transformed when fitting.
    #[serde(default)]
    pub fit_in_log_space: bool,
}

impl Default for SamplingConfig {
    fn default() -> Self {
        SamplingConfig {
            error_bar_interval: None,
            exclude_zero_samples: false,
            fit_in_log_space: false,
        }
    }
}

// Configuration for output settings
#[derive(Deserialize, Serialize, Debug, Clone)]
pub struct OutputConfig {
    pub base_filename: String,
    pub save_series: bool,
    pub save_trajectories: bool,
    /// How many particle trajectories to export (capped at the ensemble size).
    #[serde(default = "default_trajectory_count")]
    pub trajectory_count: u32,
    /// Summary format: "json", "bincode", "messagepack"
    pub format: Option<String>,
}

fn default_seed() -> u64 {
    42
}

fn default_trajectory_count() -> u32 {
    7
}

// Main configuration structure, loaded from config.toml.
#[derive(Deserialize, Serialize, Debug, Clone)]
pub struct SimulationConfig {
    pub ensemble: EnsembleConfig,
    pub timing: TimingConfig,
    #[serde(default)]
    pub sampling: SamplingConfig,
    pub output: OutputConfig,
}

impl SimulationConfig {
    /// Loads the configuration from a TOML file.
    pub fn load<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path_ref = path.as_ref();

        let config_str = std::fs::read_to_string(path_ref)
            .map_err(|e| anyhow::anyhow!("Failed to read config file '{}': {}", path_ref.display(), e))?;
        let config: SimulationConfig = toml::from_str(&config_str)
            .map_err(|e| anyhow::anyhow!("Failed to parse TOML from '{}': {}", path_ref.display(), e))?;

        config.validate()?;
        Ok(config)
    }

    /// Checks the configured values against the engine's preconditions.
    pub fn validate(&self) -> Result<()> {
        if self.ensemble.num_particles == 0 {
            anyhow::bail!("num_particles must be greater than 0.");
        }
        if self.timing.time_step <= 0.0 {
            anyhow::bail!("time_step must be positive.");
        }
        if self.timing.total_time <= 0.0 {
            anyhow::bail!("total_time must be positive.");
        }
        if let Some(interval) = self.sampling.error_bar_interval {
            if interval == 0 {
                anyhow::bail!("error_bar_interval must be greater than 0 when set.");
            }
        }
        Ok(())
    }

    /// Converts the configuration into the runtime parameters.
    ///
    /// The step count truncates: `steps_count = floor(total_time / time_step)`,
    /// so a total time that is not an exact multiple of the time step simulates
    /// slightly less than requested rather than overshooting.
    pub fn to_run_params(&self) -> RunParams {
        let dt = self.timing.time_step;
        let total_time = self.timing.total_time;
        let steps_count = (total_time / dt).floor() as u32;

        // Default sampling policy: about ten error bars across the run.
        let error_bar_interval = self
            .sampling
            .error_bar_interval
            .unwrap_or(((steps_count + 1) / 10).max(1));

        RunParams {
            num_particles: self.ensemble.num_particles,
            dt,
            total_time,
            steps_count,
            error_bar_interval,
            seed: self.ensemble.seed,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn parse(toml_str: &str) -> SimulationConfig {
        toml::from_str(toml_str).expect("config should parse")
    }

    const BASE: &str = r#"
        [ensemble]
        num_particles = 1000
        seed = 7

        [timing]
        time_step = 0.01
        total_time = 1.0

        [output]
        base_filename = "brownian_msd"
        save_series = true
        save_trajectories = false
    "#;

    #[test]
    fn parses_minimal_config_with_sampling_defaults() {
        let config = parse(BASE);
        assert!(config.validate().is_ok());
        assert_eq!(config.ensemble.seed, 7);
        assert_eq!(config.sampling.error_bar_interval, None);
        assert!(!config.sampling.exclude_zero_samples);
        assert_eq!(config.output.trajectory_count, 7);
    }

    #[test]
    fn run_params_truncate_partial_steps() {
        let mut config = parse(BASE);
        config.timing.total_time = 1.005;
        let params = config.to_run_params();
        // 1.005 / 0.01 truncates to 100 whole steps.
        assert_eq!(params.steps_count, 100);
        assert_eq!(params.error_bar_interval, 10);
    }

    #[test]
    fn derived_error_interval_never_drops_to_zero() {
        let mut config = parse(BASE);
        config.timing.total_time = 0.05; // 5 steps -> len/10 would floor to 0
        let params = config.to_run_params();
        assert_eq!(params.steps_count, 5);
        assert_eq!(params.error_bar_interval, 1);
    }

    #[test]
    fn rejects_non_positive_values() {
        let mut config = parse(BASE);
        config.ensemble.num_particles = 0;
        assert!(config.validate().is_err());

        let mut config = parse(BASE);
        config.timing.time_step = 0.0;
        assert!(config.validate().is_err());

        let mut config = parse(BASE);
        config.timing.total_time = -1.0;
        assert!(config.validate().is_err());
    }
}
