//! Reductions over the staggered fields.
//!
//! Every prognostic and diagnostic quantity is an [`Array2<f64>`] indexed
//! `[(j, i)]`, row `j` along y and column `i` along x, with a shape set by its
//! staggering:
//!
//! | location     | shape               |
//! |--------------|---------------------|
//! | cell centres | `n × n`             |
//! | x-faces (u)  | `n × (n + 1)`       |
//! | y-faces (v)  | `(n + 1) × n`       |
//! | corners      | `(n + 1) × (n + 1)` |
//!
//! [`FieldExt`] adds the few float reductions ndarray leaves out.
//!
//! [`Array2<f64>`]: ndarray::Array2

use ndarray::{ArrayBase, Data, Ix2};

/// Float reductions and edge-clamped access on 2-D fields.
///
/// # Example
///
/// ```
/// use ndarray::array;
/// use polar_swe::types::FieldExt;
///
/// let f = array![[1.0, -3.0], [2.0, 0.5]];
/// assert_eq!(f.min(), -3.0);
/// assert_eq!(f.argmax(), Some((1, 0)));
/// assert_eq!(f.get_clamped(-1, 5), -3.0);
/// ```
pub trait FieldExt {
    /// Smallest entry (`+inf` for an empty field).
    fn min(&self) -> f64;

    /// Largest entry (`-inf` for an empty field).
    fn max(&self) -> f64;

    /// Largest absolute value.
    fn max_abs(&self) -> f64;

    /// Index of the largest entry. Ties resolve to the first in row-major
    /// order.
    fn argmax(&self) -> Option<(usize, usize)>;

    /// Index and value of the first non-finite entry.
    fn first_non_finite(&self) -> Option<((usize, usize), f64)>;

    /// Index and value of the first entry `<= 0` (or NaN).
    fn first_non_positive(&self) -> Option<((usize, usize), f64)>;

    /// Value at `(j, i)` with both indices clamped into range, mirroring the
    /// edge value outward.
    fn get_clamped(&self, j: isize, i: isize) -> f64;
}

impl<S> FieldExt for ArrayBase<S, Ix2>
where
    S: Data<Elem = f64>,
{
    fn min(&self) -> f64 {
        self.fold(f64::INFINITY, |acc, &v| acc.min(v))
    }

    fn max(&self) -> f64 {
        self.fold(f64::NEG_INFINITY, |acc, &v| acc.max(v))
    }

    fn max_abs(&self) -> f64 {
        self.fold(0.0_f64, |acc, v| acc.max(v.abs()))
    }

    fn argmax(&self) -> Option<(usize, usize)> {
        let mut best: Option<((usize, usize), f64)> = None;
        for (idx, &v) in self.indexed_iter() {
            match best {
                Some((_, b)) if v <= b => {}
                _ => best = Some((idx, v)),
            }
        }
        best.map(|(idx, _)| idx)
    }

    fn first_non_finite(&self) -> Option<((usize, usize), f64)> {
        self.indexed_iter()
            .find(|(_, v)| !v.is_finite())
            .map(|(idx, &v)| (idx, v))
    }

    fn first_non_positive(&self) -> Option<((usize, usize), f64)> {
        self.indexed_iter()
            .find(|(_, v)| !(**v > 0.0))
            .map(|(idx, &v)| (idx, v))
    }

    #[inline]
    fn get_clamped(&self, j: isize, i: isize) -> f64 {
        let (rows, cols) = self.dim();
        let j = j.clamp(0, rows as isize - 1) as usize;
        let i = i.clamp(0, cols as isize - 1) as usize;
        self[(j, i)]
    }
}
