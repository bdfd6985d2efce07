//! Run-time health checks.
//!
//! [`find_violation`] is the fatal check applied after every step;
//! [`StabilityMonitor`] raises softer warnings against configurable
//! thresholds.

mod stability;

pub use stability::{
    StabilityMonitor, StabilityStatus, StabilityThresholds, StabilityWarning, find_violation,
};
