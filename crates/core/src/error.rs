use thiserror::Error;

/// Rejected progress inputs.
#[derive(Debug, Error, Clone, PartialEq)]
#[non_exhaustive]
pub enum ProgressError {
    #[error("quiz score must be a finite value in [0, 1], got {0}")]
    InvalidScore(f64),

    #[error("time spent must be a finite, non-negative number of seconds, got {0}")]
    InvalidDuration(f64),
}
