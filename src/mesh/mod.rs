//! Grid geometry.
//!
//! A single structured mesh: the staggered polar-cap grid on an azimuthal
//! equidistant projection, with its metric factors, Coriolis field and sponge
//! weights precomputed at every staggered location.

mod polar_grid;

pub use polar_grid::PolarGrid;
