//! Strongly-typed building blocks shared by the grid, solver and I/O.
//!
//! - [`FieldExt`]: float reductions on the `Array2<f64>` fields
//! - [`Latitude`] / [`Longitude`]: angular coordinates that cannot be mixed up
//!
//! # Example
//!
//! ```
//! use ndarray::Array2;
//! use polar_swe::types::{FieldExt, Latitude};
//!
//! let h = Array2::from_elem((4, 4), 1.0e4);
//! assert_eq!(h.sum(), 16.0e4);
//! assert_eq!(h.min(), 1.0e4);
//!
//! let edge = Latitude::new(61.0);
//! assert!(edge.colatitude_radians() > 0.5);
//! ```

mod field;
mod physical;

pub use field::FieldExt;
pub use physical::{Latitude, Longitude};
