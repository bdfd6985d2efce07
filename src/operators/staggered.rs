//! Finite-difference operators on the staggered C-grid.
//!
//! All operators assume the uniform spacing of [`crate::mesh::PolarGrid`]
//! and follow the index layout documented there:
//! `h: n×n`, `u: n×(n+1)`, `v: (n+1)×n`, corners `(n+1)×(n+1)`.

use ndarray::{Array2, ArrayViewMut1, Zip};

use crate::types::FieldExt;

/// Five-point Laplacian with zero-gradient (mirrored) edges.
///
/// Out-of-range neighbours take the value of the nearest edge entry, so every
/// edge contributes zero flux and `Σ ∇²f = 0` for any `f`.
pub fn laplacian_neumann(f: &Array2<f64>, dx: f64) -> Array2<f64> {
    let mut out = Array2::zeros(f.dim());
    for (j, row) in out.rows_mut().into_iter().enumerate() {
        laplacian_neumann_row(f, j, dx, row);
    }
    out
}

/// Row `j` of [`laplacian_neumann`], written into `out`.
#[inline]
pub fn laplacian_neumann_row(
    f: &Array2<f64>,
    j: usize,
    dx: f64,
    mut out: ArrayViewMut1<'_, f64>,
) {
    let inv_dx2 = 1.0 / (dx * dx);
    let jj = j as isize;
    for (i, o) in out.iter_mut().enumerate() {
        let ii = i as isize;
        let centre = f[(j, i)];
        let sum = f.get_clamped(jj, ii - 1)
            + f.get_clamped(jj, ii + 1)
            + f.get_clamped(jj - 1, ii)
            + f.get_clamped(jj + 1, ii);
        *o = (sum - 4.0 * centre) * inv_dx2;
    }
}

/// ∇⁴f as two passes of [`laplacian_neumann`]. Sums to zero like its parts.
pub fn biharmonic_neumann(f: &Array2<f64>, dx: f64) -> Array2<f64> {
    laplacian_neumann(&laplacian_neumann(f, dx), dx)
}

/// Relative vorticity ζ = ∂v/∂x − ∂u/∂y at corners.
///
/// Each difference is taken only where both neighbours exist: the x-difference
/// of `v` on interior corner columns and the y-difference of `u` on interior
/// corner rows. Wall corners therefore carry only the along-wall shear.
pub fn curl(u: &Array2<f64>, v: &Array2<f64>, dx: f64) -> Array2<f64> {
    let n = u.nrows();
    debug_assert_eq!(u.dim(), (n, n + 1));
    debug_assert_eq!(v.dim(), (n + 1, n));

    let inv_dx = 1.0 / dx;
    Array2::from_shape_fn((n + 1, n + 1), |(j, i)| {
        let mut z = 0.0;
        if i > 0 && i < n {
            z += (v[(j, i)] - v[(j, i - 1)]) * inv_dx;
        }
        if j > 0 && j < n {
            z -= (u[(j, i)] - u[(j - 1, i)]) * inv_dx;
        }
        z
    })
}

/// Bernoulli function B = g h + ½(mean of u² over the two x-faces
/// + mean of v² over the two y-faces), at cell centres.
pub fn bernoulli(h: &Array2<f64>, u: &Array2<f64>, v: &Array2<f64>, g: f64) -> Array2<f64> {
    Array2::from_shape_fn(h.dim(), |(j, i)| {
        let ke = 0.25
            * (u[(j, i)] * u[(j, i)]
                + u[(j, i + 1)] * u[(j, i + 1)]
                + v[(j, i)] * v[(j, i)]
                + v[(j + 1, i)] * v[(j + 1, i)]);
        g * h[(j, i)] + ke
    })
}

/// Mean of the four corners surrounding each cell centre.
pub fn corners_to_centres(c: &Array2<f64>) -> Array2<f64> {
    Array2::from_shape_fn((c.nrows() - 1, c.ncols() - 1), |(j, i)| {
        0.25 * (c[(j, i)] + c[(j, i + 1)] + c[(j + 1, i)] + c[(j + 1, i + 1)])
    })
}

/// u and v interpolated to cell centres.
pub fn velocity_at_centres(u: &Array2<f64>, v: &Array2<f64>) -> (Array2<f64>, Array2<f64>) {
    let n = u.nrows();
    let mut uc = Array2::zeros((n, n));
    let mut vc = Array2::zeros((n, n));
    Zip::indexed(&mut uc)
        .and(&mut vc)
        .for_each(|(j, i), a, b| {
            *a = 0.5 * (u[(j, i)] + u[(j, i + 1)]);
            *b = 0.5 * (v[(j, i)] + v[(j + 1, i)]);
        });
    (uc, vc)
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    #[test]
    fn test_laplacian_of_quadratic() {
        // f = x² has ∇²f = 2 away from the edges
        let dx = 0.5;
        let f = Array2::from_shape_fn((6, 6), |(_, i)| (i as f64 * dx).powi(2));
        let lap = laplacian_neumann(&f, dx);
        for j in 0..6 {
            for i in 1..5 {
                assert_relative_eq!(lap[(j, i)], 2.0, epsilon = 1e-12);
            }
        }
    }

    #[test]
    fn test_neumann_operators_sum_to_zero() {
        let f = Array2::from_shape_fn((7, 8), |(j, i)| {
            ((j * 13 + i * 7) % 5) as f64 - 1.3 * j as f64
        });
        assert!(laplacian_neumann(&f, 1.0).sum().abs() < 1e-10);
        assert!(biharmonic_neumann(&f, 1.0).sum().abs() < 1e-9);
    }

    #[test]
    fn test_biharmonic_kills_constants() {
        let f = Array2::from_elem((5, 5), 3.0);
        assert_eq!(biharmonic_neumann(&f, 2.0).max_abs(), 0.0);
    }

    #[test]
    fn test_curl_of_solid_body_rotation() {
        // u = -Ωy, v = Ωx gives ζ = 2Ω at interior corners
        let n = 6;
        let dx = 1.0;
        let omega = 0.1;
        let u = Array2::from_shape_fn((n, n + 1), |(j, _)| -omega * (j as f64 + 0.5));
        let v = Array2::from_shape_fn((n + 1, n), |(_, i)| omega * (i as f64 + 0.5));
        let zeta = curl(&u, &v, dx);
        for j in 1..n {
            for i in 1..n {
                assert_relative_eq!(zeta[(j, i)], 2.0 * omega, epsilon = 1e-14);
            }
        }
        // Wall corners only see one of the two shears
        assert_relative_eq!(zeta[(0, 3)], omega, epsilon = 1e-14);
        assert_eq!(zeta[(0, 0)], 0.0);
    }

    #[test]
    fn test_bernoulli_at_rest() {
        let h = Array2::from_elem((3, 3), 2.0);
        let u = Array2::zeros((3, 4));
        let v = Array2::zeros((4, 3));
        let b = bernoulli(&h, &u, &v, 10.0);
        assert!(b.iter().all(|&x| x == 20.0));
    }

    #[test]
    fn test_corner_average() {
        let c = Array2::from_shape_fn((3, 3), |(j, i)| (j + i) as f64);
        let centres = corners_to_centres(&c);
        assert_eq!(centres.dim(), (2, 2));
        assert_relative_eq!(centres[(0, 0)], 1.0);
        assert_relative_eq!(centres[(1, 1)], 3.0);
    }
}
