//! Physical parameters of the governing equations.
//!
//! The single-layer rotating shallow water system on the polar f-plane,
//! with the derived scales (gravity wave speed, deformation radius) the
//! solver and initializer share.

mod rotating_shallow_water;

pub use rotating_shallow_water::RotatingShallowWater;
