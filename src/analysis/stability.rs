//! Stability monitoring for polar shallow water runs.
//!
//! Two layers:
//! - [`find_violation`]: the hard check applied after every step. Any
//!   non-finite value or non-positive thickness is fatal.
//! - [`StabilityMonitor`]: soft thresholds (thickness range, speed, time step)
//!   that produce warnings while the run continues.
//!
//! # Example
//!
//! ```ignore
//! use polar_swe::analysis::{StabilityMonitor, StabilityThresholds};
//!
//! let mut monitor = StabilityMonitor::new(StabilityThresholds::for_depth(h0));
//!
//! // In time stepping loop:
//! let status = monitor.check(&state, dt);
//! if !status.is_stable {
//!     monitor.log_report(time, step);
//! }
//! ```

use std::fmt;

use ndarray::Zip;
use tracing::warn;

use crate::solver::State;
use crate::types::FieldExt;

/// First fatal defect of a state, as `(field, detail)`.
///
/// Checks `h`, `u`, `v` for non-finite values, then `h` for non-positive
/// thickness.
pub fn find_violation(state: &State) -> Option<(&'static str, String)> {
    for (name, field) in [("h", &state.h), ("u", &state.u), ("v", &state.v)] {
        if let Some(((j, i), value)) = field.first_non_finite() {
            return Some((name, format!("non-finite value {value} at ({j}, {i})")));
        }
    }
    state
        .h
        .first_non_positive()
        .map(|((j, i), value)| ("h", format!("non-positive thickness {value:.3e} at ({j}, {i})")))
}

/// Thresholds for stability monitoring.
#[derive(Debug, Clone, Copy)]
pub struct StabilityThresholds {
    /// Maximum allowed thickness (m).
    pub max_depth: f64,
    /// Minimum allowed thickness (m).
    pub min_depth: f64,
    /// Maximum face velocity magnitude (m/s).
    pub max_velocity: f64,
    /// Minimum timestep before warning (s).
    pub min_dt: f64,
    /// Maximum consecutive warnings before recommending stop.
    pub max_consecutive_warnings: usize,
}

impl Default for StabilityThresholds {
    fn default() -> Self {
        Self::relaxed()
    }
}

impl StabilityThresholds {
    /// Thresholds scaled to a resting thickness `h0`.
    ///
    /// - thickness within [0.1 h0, 3 h0]
    /// - speed below the gravity wave speed √(g h0)
    /// - dt above 1 s
    pub fn for_depth(h0: f64, g: f64) -> Self {
        Self {
            max_depth: 3.0 * h0,
            min_depth: 0.1 * h0,
            max_velocity: (g * h0).sqrt(),
            min_dt: 1.0,
            max_consecutive_warnings: 10,
        }
    }

    /// Only catches catastrophic blow-up.
    pub fn relaxed() -> Self {
        Self {
            max_depth: 1e9,
            min_depth: 0.0,
            max_velocity: 1e5,
            min_dt: 1e-6,
            max_consecutive_warnings: 100,
        }
    }

    pub fn with_max_depth(mut self, max_depth: f64) -> Self {
        self.max_depth = max_depth;
        self
    }

    pub fn with_min_depth(mut self, min_depth: f64) -> Self {
        self.min_depth = min_depth;
        self
    }

    pub fn with_max_velocity(mut self, max_velocity: f64) -> Self {
        self.max_velocity = max_velocity;
        self
    }

    pub fn with_min_dt(mut self, min_dt: f64) -> Self {
        self.min_dt = min_dt;
        self
    }
}

/// Types of stability warnings. Cells are `(j, i)` on the thickness grid.
#[derive(Debug, Clone, PartialEq)]
pub enum StabilityWarning {
    DepthExceedsMax {
        cell: (usize, usize),
        value: f64,
        threshold: f64,
    },
    DepthBelowMin {
        cell: (usize, usize),
        value: f64,
        threshold: f64,
    },
    /// Speed at a cell centre exceeds the threshold.
    VelocityExceedsMax {
        cell: (usize, usize),
        value: f64,
        threshold: f64,
    },
    TimestepBelowMin { value: f64, threshold: f64 },
    /// NaN or Inf in the named field.
    NonFiniteValue { field: &'static str },
}

impl fmt::Display for StabilityWarning {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::DepthExceedsMax {
                cell,
                value,
                threshold,
            } => write!(
                f,
                "thickness exceeds max: h={value:.1}m > {threshold:.1}m at {cell:?}"
            ),
            Self::DepthBelowMin {
                cell,
                value,
                threshold,
            } => write!(
                f,
                "thickness below min: h={value:.1}m < {threshold:.1}m at {cell:?}"
            ),
            Self::VelocityExceedsMax {
                cell,
                value,
                threshold,
            } => write!(
                f,
                "speed exceeds max: |u|={value:.2}m/s > {threshold:.2}m/s at {cell:?}"
            ),
            Self::TimestepBelowMin { value, threshold } => {
                write!(f, "timestep below min: dt={value:.2e}s < {threshold:.2e}s")
            }
            Self::NonFiniteValue { field } => write!(f, "non-finite value in {field}"),
        }
    }
}

/// Current stability status of the solution.
#[derive(Debug, Clone)]
pub struct StabilityStatus {
    /// Thickness range (min, max).
    pub h_range: (f64, f64),
    pub max_velocity: f64,
    pub dt: f64,
    pub is_stable: bool,
    pub warnings: Vec<StabilityWarning>,
}

impl StabilityStatus {
    pub fn has_warnings(&self) -> bool {
        !self.warnings.is_empty()
    }

    pub fn has_critical_warnings(&self) -> bool {
        self.warnings
            .iter()
            .any(|w| matches!(w, StabilityWarning::NonFiniteValue { .. }))
    }
}

/// Monitor for tracking solution stability.
///
/// Only the most extreme cell of each kind is reported per check.
#[derive(Debug, Clone)]
pub struct StabilityMonitor {
    thresholds: StabilityThresholds,
    consecutive_warnings: usize,
    total_checks: usize,
    total_warnings: usize,
    last_status: Option<StabilityStatus>,
}

impl StabilityMonitor {
    pub fn new(thresholds: StabilityThresholds) -> Self {
        Self {
            thresholds,
            consecutive_warnings: 0,
            total_checks: 0,
            total_warnings: 0,
            last_status: None,
        }
    }

    pub fn thresholds(&self) -> &StabilityThresholds {
        &self.thresholds
    }

    pub fn consecutive_warnings(&self) -> usize {
        self.consecutive_warnings
    }

    pub fn total_checks(&self) -> usize {
        self.total_checks
    }

    pub fn total_warnings(&self) -> usize {
        self.total_warnings
    }

    pub fn last_status(&self) -> Option<&StabilityStatus> {
        self.last_status.as_ref()
    }

    /// Check the solution for stability issues.
    pub fn check(&mut self, state: &State, dt: f64) -> StabilityStatus {
        self.total_checks += 1;
        let t = self.thresholds;
        let mut warnings = Vec::new();

        for (name, field) in [("h", &state.h), ("u", &state.u), ("v", &state.v)] {
            if field.first_non_finite().is_some() {
                warnings.push(StabilityWarning::NonFiniteValue { field: name });
            }
        }

        let h = &state.h;
        let (min_h, max_h) = (h.min(), h.max());
        if max_h > t.max_depth
            && let Some(cell) = h.argmax()
        {
            warnings.push(StabilityWarning::DepthExceedsMax {
                cell,
                value: max_h,
                threshold: t.max_depth,
            });
        }
        if min_h < t.min_depth
            && let Some(cell) = h.mapv(|x| -x).argmax()
        {
            warnings.push(StabilityWarning::DepthBelowMin {
                cell,
                value: min_h,
                threshold: t.min_depth,
            });
        }

        let (uc, vc) = state.centre_velocity();
        let speed = Zip::from(&uc).and(&vc).map_collect(|a, b| a.hypot(*b));
        let max_velocity = speed.max();
        if max_velocity > t.max_velocity
            && let Some(cell) = speed.argmax()
        {
            warnings.push(StabilityWarning::VelocityExceedsMax {
                cell,
                value: max_velocity,
                threshold: t.max_velocity,
            });
        }

        if !dt.is_finite() {
            warnings.push(StabilityWarning::NonFiniteValue { field: "dt" });
        } else if dt < t.min_dt {
            warnings.push(StabilityWarning::TimestepBelowMin {
                value: dt,
                threshold: t.min_dt,
            });
        }

        let is_stable = warnings.is_empty();
        if is_stable {
            self.consecutive_warnings = 0;
        } else {
            self.consecutive_warnings += 1;
            self.total_warnings += warnings.len();
        }

        let status = StabilityStatus {
            h_range: (min_h, max_h),
            max_velocity,
            dt,
            is_stable,
            warnings,
        };
        self.last_status = Some(status.clone());
        status
    }

    /// Whether the warning history says the run should stop.
    pub fn should_stop(&self) -> bool {
        if self.consecutive_warnings >= self.thresholds.max_consecutive_warnings {
            return true;
        }
        self.last_status
            .as_ref()
            .is_some_and(StabilityStatus::has_critical_warnings)
    }

    /// Suggested remediation for the last status's warnings.
    pub fn suggest_remediation(&self) -> Vec<String> {
        let mut suggestions: Vec<String> = self
            .last_status
            .iter()
            .flat_map(|status| &status.warnings)
            .map(|warning| {
                match warning {
                    StabilityWarning::DepthExceedsMax { .. }
                    | StabilityWarning::DepthBelowMin { .. } => {
                        "thickness far from rest: lower the Rossby number or raise the Burger number"
                    }
                    StabilityWarning::VelocityExceedsMax { .. } => {
                        "supersonic flow: lower the Rossby number or widen the sponge"
                    }
                    StabilityWarning::TimestepBelowMin { .. } => {
                        "timestep collapsing: the solution is likely blowing up"
                    }
                    StabilityWarning::NonFiniteValue { .. } => {
                        "blow-up: reduce cfl or raise numerics.hyperviscosity"
                    }
                }
                .to_string()
            })
            .collect();
        suggestions.sort();
        suggestions.dedup();
        suggestions
    }

    /// Log the last status through `tracing` if it carried warnings.
    pub fn log_report(&self, time: f64, step: usize) {
        let Some(status) = &self.last_status else {
            return;
        };
        if status.is_stable {
            return;
        }
        for warning in &status.warnings {
            warn!(
                step,
                time,
                h_min = status.h_range.0,
                h_max = status.h_range.1,
                max_velocity = status.max_velocity,
                dt = status.dt,
                "{warning}"
            );
        }
        if self.should_stop() {
            for suggestion in self.suggest_remediation() {
                warn!(step, "{suggestion}");
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use ndarray::Array2;

    fn uniform(n: usize, h: f64, u: f64) -> State {
        State::new(
            Array2::from_elem((n, n), h),
            Array2::from_elem((n, n + 1), u),
            Array2::zeros((n + 1, n)),
        )
    }

    #[test]
    fn test_find_violation() {
        let mut state = uniform(4, 100.0, 1.0);
        assert!(find_violation(&state).is_none());

        state.h[(2, 1)] = 0.0;
        let (field, detail) = find_violation(&state).unwrap();
        assert_eq!(field, "h");
        assert!(detail.contains("(2, 1)"));

        state.v[(3, 3)] = f64::NAN;
        assert_eq!(find_violation(&state).unwrap().0, "v");
    }

    #[test]
    fn test_stable_solution() {
        let state = uniform(6, 1.0e4, 10.0);
        let mut monitor = StabilityMonitor::new(StabilityThresholds::for_depth(1.0e4, 24.8));
        let status = monitor.check(&state, 100.0);
        assert!(status.is_stable, "{:?}", status.warnings);
        assert!(!monitor.should_stop());
        assert_eq!(monitor.total_checks(), 1);
    }

    #[test]
    fn test_detect_velocity_and_depth() {
        let mut state = uniform(6, 1.0e4, 1000.0);
        state.h[(1, 4)] = 5.0e4;
        let mut monitor = StabilityMonitor::new(StabilityThresholds::for_depth(1.0e4, 24.8));
        let status = monitor.check(&state, 100.0);

        assert!(!status.is_stable);
        assert!(status.warnings.iter().any(|w| matches!(
            w,
            StabilityWarning::DepthExceedsMax { cell: (1, 4), .. }
        )));
        assert!(status
            .warnings
            .iter()
            .any(|w| matches!(w, StabilityWarning::VelocityExceedsMax { .. })));
        assert!(!monitor.suggest_remediation().is_empty());
    }

    #[test]
    fn test_non_finite_stops() {
        let mut state = uniform(4, 1.0e4, 0.0);
        state.u[(0, 2)] = f64::INFINITY;
        let mut monitor = StabilityMonitor::new(StabilityThresholds::relaxed());
        let status = monitor.check(&state, 1.0);
        assert!(status.has_critical_warnings());
        assert!(monitor.should_stop());
    }

    #[test]
    fn test_consecutive_warnings() {
        let state = uniform(4, 1.0e4, 0.0);
        let thresholds = StabilityThresholds::relaxed().with_min_dt(10.0);
        let mut monitor = StabilityMonitor::new(StabilityThresholds {
            max_consecutive_warnings: 3,
            ..thresholds
        });
        for _ in 0..2 {
            monitor.check(&state, 1.0);
        }
        assert_eq!(monitor.consecutive_warnings(), 2);
        assert!(!monitor.should_stop());
        monitor.check(&state, 1.0);
        assert!(monitor.should_stop());

        monitor.check(&state, 100.0);
        assert_eq!(monitor.consecutive_warnings(), 0);
    }
}
