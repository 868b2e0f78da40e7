use thiserror::Error;

/// Errors raised by the simulation and estimation pipeline.
///
/// All of these are precondition violations: they abort the operation that
/// detected them and surface to the caller. Nothing in the pipeline retries.
#[derive(Debug, Error)]
pub enum Error {
    #[error("invalid configuration: {0}")]
    InvalidConfiguration(String),

    #[error("step index {index} out of range for a history of {len} entries")]
    IndexOutOfRange { index: usize, len: usize },

    #[error("sample variance needs at least two values, got {0}")]
    DegenerateStatistics(usize),

    #[error("MSD series has {msd_len} entries but time grid has {time_len}")]
    LengthMismatch { msd_len: usize, time_len: usize },

    #[error("normal equations of the power-law fit are singular beyond pseudoinverse tolerance")]
    SingularFit,
}

pub type Result<T> = std::result::Result<T, Error>;
