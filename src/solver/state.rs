//! Prognostic state of the rotating shallow water layer.
//!
//! The state is the triple (h, u, v) on the C-grid:
//! - h = total layer thickness at cell centres (must stay positive)
//! - u = x-velocity on x-faces
//! - v = y-velocity on y-faces
//!
//! Tendencies returned by the RHS use the same type, so the integrator can
//! combine states and derivatives with `axpy`.

use ndarray::{Array2, Zip};

use crate::mesh::PolarGrid;
use crate::operators::velocity_at_centres;
use crate::types::FieldExt;

/// Thickness and staggered velocity fields.
#[derive(Clone, Debug, PartialEq)]
pub struct State {
    /// Total layer thickness, `n × n`
    pub h: Array2<f64>,
    /// x-velocity on x-faces, `n × (n + 1)`
    pub u: Array2<f64>,
    /// y-velocity on y-faces, `(n + 1) × n`
    pub v: Array2<f64>,
}

impl State {
    /// Assemble a state from its fields.
    ///
    /// # Panics
    ///
    /// Panics if the three shapes are not a consistent C-grid layout.
    pub fn new(h: Array2<f64>, u: Array2<f64>, v: Array2<f64>) -> Self {
        let n = h.nrows();
        assert!(
            h.dim() == (n, n) && u.dim() == (n, n + 1) && v.dim() == (n + 1, n),
            "inconsistent C-grid shapes: h {:?}, u {:?}, v {:?}",
            h.dim(),
            u.dim(),
            v.dim()
        );
        Self { h, u, v }
    }

    /// All-zero state on `grid`. Not physical (h = 0), used for tendencies.
    pub fn zeros(grid: &PolarGrid) -> Self {
        let n = grid.size();
        Self {
            h: Array2::zeros((n, n)),
            u: Array2::zeros((n, n + 1)),
            v: Array2::zeros((n + 1, n)),
        }
    }

    /// Fluid at rest with uniform thickness `h0`.
    pub fn at_rest(grid: &PolarGrid, h0: f64) -> Self {
        let n = grid.size();
        Self {
            h: Array2::from_elem((n, n), h0),
            u: Array2::zeros((n, n + 1)),
            v: Array2::zeros((n + 1, n)),
        }
    }

    /// Cells per side.
    #[inline]
    pub fn size(&self) -> usize {
        self.h.nrows()
    }

    /// Whether this state fits `grid`.
    pub fn matches(&self, grid: &PolarGrid) -> bool {
        self.h.dim() == grid.centre_shape()
            && self.u.dim() == grid.u_shape()
            && self.v.dim() == grid.v_shape()
    }

    /// Projected volume Σ h dx dy (m³), the conserved mass of the scheme.
    pub fn total_mass(&self, grid: &PolarGrid) -> f64 {
        self.h.sum() * grid.projected_cell_area()
    }

    /// Largest velocity magnitude evaluated at cell centres.
    pub fn max_speed(&self) -> f64 {
        let (uc, vc) = velocity_at_centres(&self.u, &self.v);
        Zip::from(&uc)
            .and(&vc)
            .fold(0.0_f64, |acc, u, v| acc.max(u.hypot(*v)))
    }

    /// Largest face velocity component. Bounds `max_speed` from above.
    pub fn max_face_velocity(&self) -> f64 {
        self.u.max_abs().max(self.v.max_abs())
    }

    /// Velocity interpolated to cell centres.
    pub fn centre_velocity(&self) -> (Array2<f64>, Array2<f64>) {
        velocity_at_centres(&self.u, &self.v)
    }

    /// self <- self + c * other
    pub fn axpy(&mut self, c: f64, other: &State) {
        self.h.scaled_add(c, &other.h);
        self.u.scaled_add(c, &other.u);
        self.v.scaled_add(c, &other.v);
    }

    /// self <- c * self
    pub fn scale(&mut self, c: f64) {
        self.h *= c;
        self.u *= c;
        self.v *= c;
    }
}
