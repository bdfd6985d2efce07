//! Time integration.
//!
//! - integrator: the `Integrable`/`TimeIntegrator` traits and SSP-RK3
//! - stepper: one validated step of the shallow water state
//! - duration: run-length strings such as `"30 days"`

mod duration;
mod integrator;
mod stepper;

pub use duration::{format_duration, resolve_duration};
pub use integrator::{Integrable, SSPRK3, TimeIntegrator};
pub use stepper::{advance, evaluate_rhs};
