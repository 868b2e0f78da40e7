pub mod config;
pub mod run_params;
pub mod series;
pub mod vecmath;

// Re-export key types for easier use by dependent crates
pub use config::{EnsembleConfig, OutputConfig, SamplingConfig, SimulationConfig, TimingConfig};
pub use run_params::RunParams;
pub use series::{EnsembleSeries, FitResult, RunSummary};
pub use vecmath::Vec2;
