//! Error types for DSP operations.

use thiserror::Error;

/// Errors that can occur during DSP operations.
#[derive(Debug, Error, Clone, PartialEq)]
pub enum DspError {
    /// Argument outside the mathematical domain of the operation.
    #[error("Domain error: {0}")]
    Domain(String),

    /// Argument has an invalid value, shape or count.
    #[error("Invalid argument `{arg}`: {reason}")]
    InvalidArgument { arg: &'static str, reason: String },

    /// Input length mismatch.
    #[error("Input length mismatch: expected {expected}, got {actual}")]
    LengthMismatch { expected: usize, actual: usize },

    /// Insufficient data for operation.
    #[error("Insufficient data: need at least {needed}, got {got}")]
    InsufficientData { needed: usize, got: usize },

    /// Impulse response is neither symmetric nor antisymmetric.
    #[error("FIR filter is not linear phase")]
    NotLinearPhase,

    /// Convolution mode string not recognized.
    #[error("Unknown convolution mode {0:?} (choices are same, valid, or full)")]
    UnknownMode(String),

    /// Window name not recognized or given the wrong parameters.
    #[error("Unknown window {name:?}: {reason}")]
    UnknownWindow { name: String, reason: String },

    /// One-sided spectrum requested for a complex-valued input.
    #[error("One-sided spectrum requested for a signal with nonzero imaginary part")]
    ComplexOneSided,

    /// Band contains no evaluated frequency bin.
    #[error("Band {band} [{lower}, {upper}) contains no evaluated frequencies")]
    EmptyBand { band: usize, lower: f64, upper: f64 },

    /// Numerical failure inside the FFT backend.
    #[error("Numerical instability: {0}")]
    NumericalInstability(String),
}

impl DspError {
    pub(crate) fn invalid(arg: &'static str, reason: impl Into<String>) -> Self {
        Self::InvalidArgument {
            arg,
            reason: reason.into(),
        }
    }
}

/// Result type for DSP operations.
pub type DspResult<T> = Result<T, DspError>;
