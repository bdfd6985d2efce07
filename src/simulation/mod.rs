//! Run orchestration.
//!
//! [`Simulation`] ties together the grid, the vortex initializer, the
//! validated SSP-RK3 step and snapshot output:
//!
//! ```ignore
//! use polar_swe::simulation::Simulation;
//!
//! let mut sim = Simulation::new(config);
//! sim.initialize_from_config()?;
//! let summary = sim.run_configured(&mut writer)?;
//! ```

mod runner;

pub use runner::{Clock, RunPhase, RunSummary, Simulation, Snapshot, SnapshotSink};
