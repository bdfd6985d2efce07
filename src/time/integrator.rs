//! Trait-based time integrator abstraction.
//!
//! Integrators are functional: `step` takes the state by reference and
//! returns the advanced state, so RK stages never alias the base state.
//!
//! # Example
//! ```
//! use polar_swe::time::{Integrable, SSPRK3, TimeIntegrator};
//!
//! #[derive(Clone)]
//! struct Scalar(f64);
//!
//! impl Integrable for Scalar {
//!     fn scale(&mut self, c: f64) { self.0 *= c; }
//!     fn axpy(&mut self, c: f64, other: &Self) { self.0 += c * other.0; }
//! }
//!
//! // du/dt = -u
//! let u = SSPRK3.step(&Scalar(1.0), 0.01, 0.0, |s, _t| Scalar(-s.0));
//! assert!((u.0 - (-0.01f64).exp()).abs() < 1e-9);
//! ```

use crate::solver::State;

// =============================================================================
// Integrable Trait
// =============================================================================

/// Trait for solution types that can be time-integrated.
///
/// This provides the vector space operations needed by explicit time integrators:
/// - `scale`: Multiply by scalar (x <- c * x)
/// - `axpy`: Add scaled vector (x <- x + c * y)
pub trait Integrable: Clone + Send + Sized {
    /// Scale the solution by a constant: self <- c * self
    fn scale(&mut self, c: f64);

    /// Add a scaled vector: self <- self + c * other
    fn axpy(&mut self, c: f64, other: &Self);

    /// Create a zero-initialized solution with the same shape.
    fn zeros_like(&self) -> Self {
        let mut result = self.clone();
        result.scale(0.0);
        result
    }
}

impl Integrable for State {
    fn scale(&mut self, c: f64) {
        State::scale(self, c);
    }

    fn axpy(&mut self, c: f64, other: &Self) {
        State::axpy(self, c, other);
    }
}

// =============================================================================
// TimeIntegrator Trait
// =============================================================================

/// Trait for explicit time integrators.
///
/// Time integrators advance the solution from time `t` to `t + dt`
/// using one or more RHS evaluations. The RHS function receives
/// the current state and time, returning the time derivative.
pub trait TimeIntegrator<S: Integrable> {
    /// Advance `state` by one step and return the new state.
    ///
    /// # Arguments
    /// * `state` - Solution at time `t` (not modified)
    /// * `dt` - Time step size; `0.0` returns an exact copy
    /// * `t` - Current time
    /// * `rhs` - Function computing the RHS: f(state, time) -> time_derivative
    fn step<F>(&self, state: &S, dt: f64, t: f64, rhs: F) -> S
    where
        F: Fn(&S, f64) -> S;
}

// =============================================================================
// SSP-RK3 Implementation
// =============================================================================

/// Strong Stability Preserving Runge-Kutta 3rd order integrator.
///
/// The Shu-Osher SSP-RK3 scheme, evaluated in increment form:
/// ```text
/// k1 = L(u, t)
/// u1 = u + dt k1
/// k2 = L(u1, t + dt)
/// u2 = u + dt/4 (k1 + k2)
/// k3 = L(u2, t + dt/2)
/// u_new = u + dt/6 (k1 + k2 + 4 k3)
/// ```
///
/// Every stage is the base state plus an increment, so a vanishing RHS or a
/// zero step leaves the state bit-for-bit unchanged.
#[derive(Clone, Copy, Debug, Default)]
pub struct SSPRK3;

impl<S: Integrable> TimeIntegrator<S> for SSPRK3 {
    fn step<F>(&self, state: &S, dt: f64, t: f64, rhs: F) -> S
    where
        F: Fn(&S, f64) -> S,
    {
        if dt == 0.0 {
            return state.clone();
        }

        let k1 = rhs(state, t);
        let mut u1 = state.clone();
        u1.axpy(dt, &k1);

        let k2 = rhs(&u1, t + dt);
        let mut u2 = state.clone();
        u2.axpy(0.25 * dt, &k1);
        u2.axpy(0.25 * dt, &k2);

        let k3 = rhs(&u2, t + 0.5 * dt);
        let mut increment = k1;
        increment.axpy(1.0, &k2);
        increment.axpy(4.0, &k3);

        let mut next = state.clone();
        next.axpy(dt / 6.0, &increment);
        next
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[derive(Clone, Debug)]
    struct Scalar(f64);

    impl Integrable for Scalar {
        fn scale(&mut self, c: f64) {
            self.0 *= c;
        }

        fn axpy(&mut self, c: f64, other: &Self) {
            self.0 += c * other.0;
        }
    }

    fn decay_error(n_steps: usize) -> f64 {
        let dt = 1.0 / n_steps as f64;
        let mut u = Scalar(1.0);
        for i in 0..n_steps {
            u = SSPRK3.step(&u, dt, i as f64 * dt, |s, _| Scalar(-s.0));
        }
        (u.0 - (-1.0f64).exp()).abs()
    }

    #[test]
    fn test_ssprk3_third_order() {
        let e1 = decay_error(10);
        let e2 = decay_error(20);
        let e3 = decay_error(40);
        let order1 = (e1 / e2).log2();
        let order2 = (e2 / e3).log2();
        assert!((order1 - 3.0).abs() < 0.15, "order {order1}");
        assert!((order2 - 3.0).abs() < 0.1, "order {order2}");
    }

    #[test]
    fn test_exact_for_quadratic_in_time() {
        // du/dt = t², u(0) = 0 → u(1) = 1/3; third order integrates it exactly
        let u = SSPRK3.step(&Scalar(0.0), 1.0, 0.0, |_, t| Scalar(t * t));
        assert!((u.0 - 1.0 / 3.0).abs() < 1e-14);
    }

    #[test]
    fn test_zero_dt_is_identity() {
        let u = Scalar(0.1 + 0.2);
        let next = SSPRK3.step(&u, 0.0, 5.0, |_, _| Scalar(f64::NAN));
        assert_eq!(next.0.to_bits(), u.0.to_bits());
    }

    #[test]
    fn test_zero_rhs_is_identity() {
        let u = Scalar(std::f64::consts::PI);
        let next = SSPRK3.step(&u, 10.0, 0.0, |s, _| s.zeros_like());
        assert_eq!(next.0.to_bits(), u.0.to_bits());
    }

}
