//! Error types for the polar shallow-water solver.
//!
//! The solver itself only knows two failure classes: bad input detected
//! before stepping begins, and a state that stopped being physical while
//! stepping. Neither is retryable since every computation is deterministic.

use thiserror::Error;

/// Errors raised by grid construction, initialization and time stepping.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum SolverError {
    /// Bad resolution, duration string, domain or vortex specification, or a
    /// balance solve that did not converge.
    #[error("Invalid configuration: {0}")]
    InvalidConfiguration(String),

    /// Non-finite or non-physical state detected after a completed step.
    #[error("Numerical instability at step {step} in field '{field}': {detail}")]
    NumericalInstability {
        /// Index of the step that produced the bad state (1-based).
        step: usize,
        /// Name of the offending field (`h`, `u`, `v` or `dt`).
        field: &'static str,
        /// Location and value of the first violation.
        detail: String,
    },

    /// The configured step limit was hit before the target time.
    #[error("Step limit of {steps} reached before the target time")]
    StepLimit { steps: usize },

    /// A snapshot consumer refused a snapshot.
    #[error("Snapshot sink failed: {0}")]
    SnapshotSink(String),
}

impl SolverError {
    /// Create an invalid configuration error.
    pub fn invalid_config(message: impl Into<String>) -> Self {
        Self::InvalidConfiguration(message.into())
    }

    /// Create a numerical instability error.
    pub fn instability(step: usize, field: &'static str, detail: impl Into<String>) -> Self {
        Self::NumericalInstability {
            step,
            field,
            detail: detail.into(),
        }
    }

    /// Whether this error was raised before any stepping could begin.
    pub fn is_configuration(&self) -> bool {
        matches!(self, Self::InvalidConfiguration(_))
    }
}

/// Result type for solver operations.
pub type SolverResult<T> = Result<T, SolverError>;
