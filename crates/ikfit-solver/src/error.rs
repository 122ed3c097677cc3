//! Error types for ikfit-solver.

use thiserror::Error;

#[derive(Debug, Error)]
pub enum IkError {
    /// Bad solver setup: unknown reference name, invalid tolerance, malformed
    /// reference data.
    #[error("configuration error: {0}")]
    Configuration(String),

    /// A weight vector did not match the fixed goal-table layout.
    #[error("dimension mismatch: expected {expected} values, got {got}")]
    DimensionMismatch { expected: usize, got: usize },

    /// The iteration budget ran out before the step norm reached the
    /// configured accuracy.
    #[error(
        "failed to converge to accuracy {accuracy:e} within {iterations} \
         iterations (last step norm {step_norm:e})"
    )]
    Convergence {
        iterations: usize,
        accuracy: f64,
        step_norm: f64,
    },
}

pub type Result<T> = std::result::Result<T, IkError>;
