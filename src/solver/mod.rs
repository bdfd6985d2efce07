//! Spatial discretization of the rotating shallow water equations.
//!
//! # Submodules
//!
//! - [`state`]: Prognostic state (h, u, v) on the C-grid
//! - [`rhs`]: Tendency evaluation and the CFL time step
//! - [`diagnostics`]: Derived fields and conservation diagnostics

pub mod diagnostics;
pub mod rhs;
pub mod state;

pub use state::State;

pub use rhs::{RhsConfig, compute_dt, compute_rhs};

#[cfg(feature = "parallel")]
pub use rhs::compute_rhs_parallel;

pub use diagnostics::{
    DiagnosticsTracker, FieldName, GridLocation, PvPeak, SWDiagnostics, field, field_at_centres,
    potential_vorticity, pv_peak, vorticity,
};
