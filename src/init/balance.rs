//! Linearised PV inversion by successive over-relaxation.
//!
//! Solves the Helmholtz problem on the corner grid
//!
//! ∇²ψ − κ ψ = r,   ψ = 0 on the walls
//!
//! with κ = f² / (g h0) ≥ 0 varying in space. The five-point Laplacian and
//! red-black ordering make every sweep deterministic and independent of
//! thread count; the convergence check is a serial max-reduction.

use std::f64::consts::PI;

use ndarray::{Array2, s};
use tracing::debug;

use crate::config::BalanceConfig;
use crate::types::FieldExt;

/// Outcome of a bounded relaxation.
#[derive(Clone, Copy, Debug, PartialEq)]
pub enum Relaxation {
    /// Relative residual fell below the tolerance.
    Converged { iterations: usize, residual: f64 },
    /// The iteration cap was hit first.
    Exhausted { iterations: usize, residual: f64 },
}

impl Relaxation {
    pub fn is_converged(&self) -> bool {
        matches!(self, Relaxation::Converged { .. })
    }

    pub fn iterations(&self) -> usize {
        match *self {
            Relaxation::Converged { iterations, .. } | Relaxation::Exhausted { iterations, .. } => {
                iterations
            }
        }
    }

    /// Final max |residual| relative to max |r|.
    pub fn residual(&self) -> f64 {
        match *self {
            Relaxation::Converged { residual, .. } | Relaxation::Exhausted { residual, .. } => {
                residual
            }
        }
    }
}

/// Optimal SOR factor for the Poisson problem on an `intervals`-cell square.
pub fn sor_factor(intervals: usize) -> f64 {
    2.0 / (1.0 + (PI / intervals as f64).sin())
}

/// Solve ∇²ψ − κψ = r with homogeneous Dirichlet walls.
///
/// `rhs` and `kappa` live on the same square corner grid with spacing `dx`.
/// Boundary entries of `rhs` are ignored. Returns the streamfunction and the
/// relaxation outcome; an exhausted relaxation still returns its last iterate.
pub fn solve_helmholtz(
    rhs: &Array2<f64>,
    kappa: &Array2<f64>,
    dx: f64,
    config: &BalanceConfig,
) -> (Array2<f64>, Relaxation) {
    let (rows, cols) = rhs.dim();
    debug_assert_eq!(rows, cols, "balance solve needs a square grid");
    debug_assert_eq!(kappa.dim(), rhs.dim());

    let mut psi = Array2::zeros((rows, cols));
    if rows < 3 {
        return (psi, Relaxation::Converged { iterations: 0, residual: 0.0 });
    }

    let scale = interior_max_abs(rhs);
    if scale == 0.0 {
        return (psi, Relaxation::Converged { iterations: 0, residual: 0.0 });
    }

    let omega = sor_factor(rows - 1);
    let dx2 = dx * dx;
    let check_every = config.check_interval.max(1);

    let mut iterations = 0;
    let mut residual = f64::INFINITY;
    while iterations < config.max_iterations {
        for colour in 0..2 {
            sweep(&mut psi, rhs, kappa, dx2, omega, colour);
        }
        iterations += 1;

        if iterations % check_every == 0 || iterations == config.max_iterations {
            residual = max_residual(&psi, rhs, kappa, dx2) / scale;
            if residual <= config.tolerance {
                debug!(iterations, residual, "balance relaxation converged");
                return (psi, Relaxation::Converged { iterations, residual });
            }
        }
    }

    debug!(iterations, residual, "balance relaxation exhausted");
    (psi, Relaxation::Exhausted { iterations, residual })
}

/// One over-relaxed Gauss-Seidel half-sweep over interior points with
/// `(i + j) % 2 == colour`.
fn sweep(
    psi: &mut Array2<f64>,
    rhs: &Array2<f64>,
    kappa: &Array2<f64>,
    dx2: f64,
    omega: f64,
    colour: usize,
) {
    let n = psi.nrows() - 1;
    for j in 1..n {
        let start = 1 + (j + 1 + colour) % 2;
        for i in (start..n).step_by(2) {
            let neighbours =
                psi[(j, i - 1)] + psi[(j, i + 1)] + psi[(j - 1, i)] + psi[(j + 1, i)];
            let target = (neighbours - dx2 * rhs[(j, i)]) / (4.0 + kappa[(j, i)] * dx2);
            let old = psi[(j, i)];
            psi[(j, i)] = old + omega * (target - old);
        }
    }
}

/// max |∇²ψ − κψ − r| over interior points.
fn max_residual(psi: &Array2<f64>, rhs: &Array2<f64>, kappa: &Array2<f64>, dx2: f64) -> f64 {
    let n = psi.nrows() - 1;
    let mut worst = 0.0_f64;
    for j in 1..n {
        for i in 1..n {
            let p = psi[(j, i)];
            let lap =
                (psi[(j, i - 1)] + psi[(j, i + 1)] + psi[(j - 1, i)] + psi[(j + 1, i)] - 4.0 * p)
                    / dx2;
            worst = worst.max((lap - kappa[(j, i)] * p - rhs[(j, i)]).abs());
        }
    }
    worst
}

fn interior_max_abs(f: &Array2<f64>) -> f64 {
    let n = f.nrows() - 1;
    f.slice(s![1..n, 1..n]).max_abs()
}
