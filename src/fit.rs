use crate::error::{Error, Result};
use msd_common::FitResult;
use nalgebra::{DMatrix, DVector};

/// Singular values below this are treated as zero when inverting the normal
/// equations.
const PINV_EPS: f64 = 1e-12;

/// What to do with an exactly-zero MSD sample before the log transform.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ZeroHandling {
    /// Contribute a literal `(0.0, 0.0)` point to the log-space regression
    /// instead of taking `log(0)`. This drags the fit toward the log-space
    /// origin, which carries no physical meaning, but established MSD
    /// pipelines behave this way, so it stays the default for comparability.
    #[default]
    SubstituteOrigin,
    /// Corrected mode: drop zero samples from the regression entirely.
    Exclude,
}

#[derive(Debug, Clone, Copy, Default)]
pub struct FitOptions {
    /// The inputs are already log-transformed; use them as-is.
    pub already_log_space: bool,
    pub zero_handling: ZeroHandling,
}

/// Fits `MSD(t) = A * t^n` by ordinary least squares on `log(msd)` against
/// `log(time)`: the intercept is `log(A)` and the slope is `n`.
///
/// The normal equations are solved through a pseudoinverse so that
/// rank-deficient input (possible with the origin substitution above)
/// still yields the least-squares solution.
pub fn fit_power_law(msd: &[f64], time: &[f64], options: FitOptions) -> Result<FitResult> {
    if msd.len() != time.len() {
        return Err(Error::LengthMismatch {
            msd_len: msd.len(),
            time_len: time.len(),
        });
    }

    let mut log_msd = Vec::with_capacity(msd.len());
    let mut log_time = Vec::with_capacity(time.len());
    if options.already_log_space {
        log_msd.extend_from_slice(msd);
        log_time.extend_from_slice(time);
    } else {
        for (&m, &t) in msd.iter().zip(time) {
            if m == 0.0 {
                match options.zero_handling {
                    ZeroHandling::SubstituteOrigin => {
                        log_msd.push(0.0);
                        log_time.push(0.0);
                    }
                    ZeroHandling::Exclude => {}
                }
            } else {
                log_msd.push(m.ln());
                log_time.push(t.ln());
            }
        }
    }

    // Design matrix with columns [1, log(time)]; coefficients [log(A), n].
    let rows = log_time.len();
    let design = DMatrix::from_fn(rows, 2, |i, j| if j == 0 { 1.0 } else { log_time[i] });
    let observed = DVector::from_vec(log_msd);

    let normal = design.transpose() * &design;
    let pseudoinverse = normal.pseudo_inverse(PINV_EPS).map_err(|_| Error::SingularFit)?;
    let coefficients = pseudoinverse * design.transpose() * observed;

    Ok(FitResult {
        amplitude: coefficients[0].exp(),
        exponent: coefficients[1],
    })
}
