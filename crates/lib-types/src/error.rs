//! Error types for series construction.

use thiserror::Error;

/// Errors raised while building typed values.
#[derive(Debug, Error, PartialEq)]
pub enum TypesError {
    /// Label and sample counts disagree.
    #[error("Label count mismatch: {labels} labels for {samples} samples")]
    LabelMismatch { labels: usize, samples: usize },

    /// Sample period is zero, negative or not finite.
    #[error("Sample period must be positive and finite, got {0}")]
    InvalidPeriod(f64),

    /// Labels are not evenly spaced.
    #[error("Labels are not uniformly spaced at index {index}: step {step}, expected {expected}")]
    NonUniform { index: usize, step: f64, expected: f64 },
}

/// Result type for type construction.
pub type TypesResult<T> = Result<T, TypesError>;
