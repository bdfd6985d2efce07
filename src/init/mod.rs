//! Initial conditions.
//!
//! - [`balance`]: SOR relaxation for the linearised PV inversion
//! - [`vortex`]: vortex profiles, placement and the balanced initializer

pub mod balance;
pub mod vortex;

pub use balance::{Relaxation, solve_helmholtz, sor_factor};
pub use vortex::{VortexInitializer, VortexProfile, VortexSign, VortexSpec};
