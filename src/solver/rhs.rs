//! Right-hand side of the rotating shallow water equations on the C-grid.
//!
//! Vector-invariant form, with ω = ζ + f the absolute vorticity at corners and
//! B = g h + |u|²/2 the Bernoulli function at centres:
//!
//!   ∂h/∂t = −[δx(h̄ˣ u) + δy(h̄ʸ v)]                      − ν4 ∇⁴h
//!   ∂u/∂t = −δx B + ω̄ʸ v̄ˣʸ             − σ u            − ν4 ∇⁴u
//!   ∂v/∂t = −δy B − ω̄ˣ ūˣʸ             − σ v            − ν4 ∇⁴v
//!
//! The ω-v̄ product carries both the Coriolis rotation and the nonlinear
//! advection; the gradient of B carries the pressure force and the kinetic
//! energy part of advection. σ is the sponge relaxation rate, ramping from
//! zero at the sponge latitude to its peak at the domain edge.
//!
//! Walls are impermeable: the mass flux through them is zero and the
//! boundary-normal velocities have zero tendency. The biharmonic term uses
//! zero-gradient edges, so Σ ∂h/∂t = 0 exactly.

use ndarray::{Array2, ArrayViewMut1, Axis};

use crate::config::RunConfig;
use crate::equations::RotatingShallowWater;
use crate::mesh::PolarGrid;
use crate::operators::{bernoulli, biharmonic_neumann, curl};
use crate::solver::State;
use crate::types::FieldExt;

/// Configuration for RHS evaluation.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct RhsConfig {
    /// Reduced gravity (m/s²)
    pub g: f64,
    /// Biharmonic viscosity ν4 (m⁴/s). Zero disables the term.
    pub viscosity: f64,
    /// Peak sponge relaxation rate σmax (1/s). Zero disables the sponge.
    pub sponge_rate: f64,
}

impl RhsConfig {
    /// Inviscid, undamped configuration.
    pub fn new(g: f64) -> Self {
        Self {
            g,
            viscosity: 0.0,
            sponge_rate: 0.0,
        }
    }

    /// Configuration used by a run: ν4 from the hyperviscosity coefficient
    /// and the grid spacing, sponge rate from the numerics section.
    pub fn for_grid(grid: &PolarGrid, config: &RunConfig) -> Self {
        let equation = RotatingShallowWater::from_config(config);
        Self {
            g: equation.g,
            viscosity: equation.biharmonic_viscosity(config.numerics.hyperviscosity, grid.dx()),
            sponge_rate: config.sponge_rate(),
        }
    }

    pub fn with_viscosity(mut self, nu: f64) -> Self {
        self.viscosity = nu;
        self
    }

    pub fn with_sponge_rate(mut self, rate: f64) -> Self {
        self.sponge_rate = rate;
        self
    }
}

/// Whole-field intermediates shared by the row kernels.
struct Terms {
    /// x mass flux h̄ˣ u on x-faces (zero at walls)
    flux_x: Array2<f64>,
    /// y mass flux h̄ʸ v on y-faces (zero at walls)
    flux_y: Array2<f64>,
    /// Absolute vorticity at corners
    omega: Array2<f64>,
    /// Bernoulli function at centres
    bernoulli: Array2<f64>,
    /// ∇⁴ of h, u, v when hyperviscosity is on
    biharmonic: Option<(Array2<f64>, Array2<f64>, Array2<f64>)>,
}

impl Terms {
    fn compute(state: &State, grid: &PolarGrid, config: &RhsConfig) -> Self {
        let n = grid.size();
        let dx = grid.dx();
        let State { h, u, v } = state;

        let flux_x = Array2::from_shape_fn((n, n + 1), |(j, i)| {
            if i == 0 || i == n {
                0.0
            } else {
                0.5 * (h[(j, i - 1)] + h[(j, i)]) * u[(j, i)]
            }
        });
        let flux_y = Array2::from_shape_fn((n + 1, n), |(j, i)| {
            if j == 0 || j == n {
                0.0
            } else {
                0.5 * (h[(j - 1, i)] + h[(j, i)]) * v[(j, i)]
            }
        });

        let mut omega = curl(u, v, dx);
        omega += grid.coriolis_corners();

        let biharmonic = (config.viscosity > 0.0).then(|| {
            (
                biharmonic_neumann(h, dx),
                biharmonic_neumann(u, dx),
                biharmonic_neumann(v, dx),
            )
        });

        Self {
            flux_x,
            flux_y,
            omega,
            bernoulli: bernoulli(h, u, v, config.g),
            biharmonic,
        }
    }
}

/// Row `j` of ∂h/∂t.
#[inline]
fn thickness_row(
    j: usize,
    terms: &Terms,
    dx: f64,
    nu: f64,
    mut out: ArrayViewMut1<'_, f64>,
) {
    let inv_dx = 1.0 / dx;
    let fx = &terms.flux_x;
    let fy = &terms.flux_y;
    for (i, o) in out.iter_mut().enumerate() {
        let div = (fx[(j, i + 1)] - fx[(j, i)]) * inv_dx + (fy[(j + 1, i)] - fy[(j, i)]) * inv_dx;
        *o = -div;
        if let Some((bh, _, _)) = &terms.biharmonic {
            *o -= nu * bh[(j, i)];
        }
    }
}

/// Row `j` of ∂u/∂t. Wall faces (i = 0, n) stay zero.
#[inline]
fn u_row(
    j: usize,
    state: &State,
    grid: &PolarGrid,
    terms: &Terms,
    config: &RhsConfig,
    mut out: ArrayViewMut1<'_, f64>,
) {
    let n = grid.size();
    let inv_dx = 1.0 / grid.dx();
    let b = &terms.bernoulli;
    let w = &terms.omega;
    let v = &state.v;
    let sponge = grid.sponge_u();

    out[0] = 0.0;
    out[n] = 0.0;
    for i in 1..n {
        let pressure = -(b[(j, i)] - b[(j, i - 1)]) * inv_dx;
        let omega_bar = 0.5 * (w[(j, i)] + w[(j + 1, i)]);
        let v_bar = 0.25 * (v[(j, i - 1)] + v[(j, i)] + v[(j + 1, i - 1)] + v[(j + 1, i)]);
        let mut du = pressure + omega_bar * v_bar
            - config.sponge_rate * sponge[(j, i)] * state.u[(j, i)];
        if let Some((_, bu, _)) = &terms.biharmonic {
            du -= config.viscosity * bu[(j, i)];
        }
        out[i] = du;
    }
}

/// Row `j` of ∂v/∂t. Wall rows (j = 0, n) stay zero.
#[inline]
fn v_row(
    j: usize,
    state: &State,
    grid: &PolarGrid,
    terms: &Terms,
    config: &RhsConfig,
    mut out: ArrayViewMut1<'_, f64>,
) {
    let n = grid.size();
    if j == 0 || j == n {
        out.fill(0.0);
        return;
    }
    let inv_dy = 1.0 / grid.dy();
    let b = &terms.bernoulli;
    let w = &terms.omega;
    let u = &state.u;
    let sponge = grid.sponge_v();

    for (i, o) in out.iter_mut().enumerate() {
        let pressure = -(b[(j, i)] - b[(j - 1, i)]) * inv_dy;
        let omega_bar = 0.5 * (w[(j, i)] + w[(j, i + 1)]);
        let u_bar = 0.25 * (u[(j - 1, i)] + u[(j - 1, i + 1)] + u[(j, i)] + u[(j, i + 1)]);
        let mut dv = pressure - omega_bar * u_bar
            - config.sponge_rate * sponge[(j, i)] * state.v[(j, i)];
        if let Some((_, _, bv)) = &terms.biharmonic {
            dv -= config.viscosity * bv[(j, i)];
        }
        *o = dv;
    }
}

/// Compute the tendency (∂h/∂t, ∂u/∂t, ∂v/∂t) of `state`.
///
/// Pure function of its inputs. The result has the shape of `state`.
///
/// # Panics
///
/// Debug builds panic if `state` does not fit `grid`.
pub fn compute_rhs(state: &State, grid: &PolarGrid, config: &RhsConfig) -> State {
    debug_assert!(state.matches(grid), "state does not fit the grid");

    let terms = Terms::compute(state, grid, config);
    let mut rhs = State::zeros(grid);

    for (j, row) in rhs.h.axis_iter_mut(Axis(0)).enumerate() {
        thickness_row(j, &terms, grid.dx(), config.viscosity, row);
    }
    for (j, row) in rhs.u.axis_iter_mut(Axis(0)).enumerate() {
        u_row(j, state, grid, &terms, config, row);
    }
    for (j, row) in rhs.v.axis_iter_mut(Axis(0)).enumerate() {
        v_row(j, state, grid, &terms, config, row);
    }

    rhs
}

/// Parallel version of [`compute_rhs`] using Rayon.
///
/// Produces bit-identical results: the intermediates are computed serially
/// and each output row is filled by the same kernel as the serial path.
#[cfg(feature = "parallel")]
pub fn compute_rhs_parallel(state: &State, grid: &PolarGrid, config: &RhsConfig) -> State {
    use ndarray::parallel::prelude::*;

    debug_assert!(state.matches(grid), "state does not fit the grid");

    let terms = Terms::compute(state, grid, config);
    let mut rhs = State::zeros(grid);

    rhs.h
        .axis_iter_mut(Axis(0))
        .into_par_iter()
        .enumerate()
        .for_each(|(j, row)| thickness_row(j, &terms, grid.dx(), config.viscosity, row));
    rhs.u
        .axis_iter_mut(Axis(0))
        .into_par_iter()
        .enumerate()
        .for_each(|(j, row)| u_row(j, state, grid, &terms, config, row));
    rhs.v
        .axis_iter_mut(Axis(0))
        .into_par_iter()
        .enumerate()
        .for_each(|(j, row)| v_row(j, state, grid, &terms, config, row));

    rhs
}

/// Compute a stable time step from the CFL condition.
///
/// dt = C Δx_min / (|v|max + √(g hmax))
///
/// with the velocity magnitude taken at cell centres. Returns a non-finite
/// value if the state has no wave speed at all (h ≤ 0 everywhere and at
/// rest) or contains non-finite values; callers treat that as instability.
pub fn compute_dt(state: &State, grid: &PolarGrid, g: f64, cfl: f64) -> f64 {
    let h_max = state.h.max().max(0.0);
    let speed = state.max_speed() + (g * h_max).sqrt();
    cfl * grid.min_spacing() / speed
}
