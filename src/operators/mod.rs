//! Discrete operators on the staggered grid.
//!
//! This module provides:
//! - Zero-gradient Laplacian and biharmonic operators (mass-conservative
//!   hyperviscosity)
//! - Corner vorticity from face velocities
//! - Bernoulli function and grid-location averaging

mod staggered;

pub use staggered::{
    bernoulli, biharmonic_neumann, corners_to_centres, curl, laplacian_neumann,
    laplacian_neumann_row, velocity_at_centres,
};
