//! One validated SSP-RK3 step of the polar shallow water system.

use super::integrator::{SSPRK3, TimeIntegrator};
use crate::analysis::find_violation;
use crate::error::{SolverError, SolverResult};
use crate::mesh::PolarGrid;
use crate::solver::{RhsConfig, State};

/// Tendency of `state`, row-parallel when the `parallel` feature is on.
pub fn evaluate_rhs(state: &State, grid: &PolarGrid, config: &RhsConfig) -> State {
    #[cfg(feature = "parallel")]
    {
        crate::solver::compute_rhs_parallel(state, grid, config)
    }
    #[cfg(not(feature = "parallel"))]
    {
        crate::solver::compute_rhs(state, grid, config)
    }
}

/// Advance `state` by `dt` and validate the result.
///
/// `step` is the index of the step being taken and only labels errors.
///
/// # Errors
///
/// `NumericalInstability` if the new state has a non-finite value or a
/// non-positive thickness. The input state is left untouched.
pub fn advance(
    state: &State,
    grid: &PolarGrid,
    config: &RhsConfig,
    dt: f64,
    t: f64,
    step: usize,
) -> SolverResult<State> {
    if !(dt.is_finite() && dt >= 0.0) {
        return Err(SolverError::instability(
            step,
            "dt",
            format!("time step {dt} is not a finite non-negative number"),
        ));
    }

    let next = SSPRK3.step(state, dt, t, |s, _t| evaluate_rhs(s, grid, config));

    match find_violation(&next) {
        Some((field, detail)) => Err(SolverError::instability(step, field, detail)),
        None => Ok(next),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::{DomainConfig, PlanetConfig};

    fn grid() -> PolarGrid {
        PolarGrid::build(8, &PlanetConfig::jupiter(), &DomainConfig::default()).unwrap()
    }

    #[test]
    fn test_zero_dt_identity() {
        let grid = grid();
        let mut state = State::at_rest(&grid, 5.0e4);
        state.u[(3, 4)] = 12.5;
        state.h[(2, 2)] = 5.01e4;
        let next = advance(&state, &grid, &RhsConfig::new(24.8), 0.0, 0.0, 1).unwrap();
        assert_eq!(next, state);
    }

    #[test]
    fn test_instability_is_reported() {
        let grid = grid();
        let mut state = State::at_rest(&grid, 5.0e4);
        state.h[(4, 4)] = f64::NAN;
        let err = advance(&state, &grid, &RhsConfig::new(24.8), 10.0, 0.0, 7).unwrap_err();
        match err {
            SolverError::NumericalInstability { step, .. } => assert_eq!(step, 7),
            other => panic!("unexpected error {other:?}"),
        }
    }

    #[test]
    fn test_negative_dt_rejected() {
        let grid = grid();
        let state = State::at_rest(&grid, 5.0e4);
        let err = advance(&state, &grid, &RhsConfig::new(24.8), -1.0, 0.0, 3).unwrap_err();
        assert!(matches!(
            err,
            SolverError::NumericalInstability { field: "dt", .. }
        ));
    }
}
