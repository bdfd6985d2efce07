//! # polar-swe
//!
//! A rotating shallow water solver for arrangements of vortices around a
//! planetary pole, such as the cyclone polygons observed on Jupiter.
//!
//! This crate provides:
//! - A polar-cap grid on an azimuthal equidistant projection (Arakawa C)
//! - Staggered finite-difference operators and the vector-invariant tendency
//! - Balanced vortex initialization by potential vorticity inversion
//! - Time integration (SSP-RK3) with a CFL-limited step
//! - Run control with snapshot sinks (in-memory, channel, VTK, NetCDF)
//! - Diagnostics: relative and potential vorticity, conservation tracking
//!
//! # Example
//!
//! ```no_run
//! use polar_swe::{RunConfig, Simulation, Snapshot, VortexSpec};
//!
//! let config = RunConfig::new(64).with_output_interval("1 day");
//! let mut sim = Simulation::new(config);
//! sim.initialize(&VortexSpec::bands(vec![90.0, 84.0], vec![1, 5])?)?;
//!
//! let mut snapshots: Vec<Snapshot> = Vec::new();
//! sim.run("10 days", &mut snapshots)?;
//! # Ok::<(), polar_swe::SolverError>(())
//! ```

pub mod analysis;
pub mod config;
pub mod equations;
pub mod error;
pub mod init;
pub mod io;
pub mod mesh;
pub mod operators;
pub mod simulation;
pub mod solver;
pub mod time;
pub mod types;

// Re-export main types for convenience
pub use config::{
    BalanceConfig, ConfigError, DomainConfig, NumericsConfig, PlanetConfig, RunConfig,
    VortexConfig, VortexPlacement,
};
pub use equations::RotatingShallowWater;
pub use error::{SolverError, SolverResult};
pub use init::{Relaxation, VortexInitializer, VortexProfile, VortexSign, VortexSpec};
pub use mesh::PolarGrid;
pub use simulation::{Clock, RunPhase, RunSummary, Simulation, Snapshot, SnapshotSink};
pub use solver::{
    DiagnosticsTracker, FieldName, PvPeak, RhsConfig, SWDiagnostics, State, compute_dt,
    compute_rhs, field, potential_vorticity, pv_peak, vorticity,
};
#[cfg(feature = "parallel")]
pub use solver::compute_rhs_parallel;
pub use time::{SSPRK3, TimeIntegrator, advance, format_duration, resolve_duration};
pub use types::{FieldExt, Latitude, Longitude};

// Analysis types
pub use analysis::{StabilityMonitor, StabilityStatus, StabilityThresholds, StabilityWarning};

// I/O types
pub use io::{VtkError, VtkSeriesWriter, write_pvd_collection, write_vtk_state};
#[cfg(feature = "netcdf")]
pub use io::{NetCDFError, NetCDFWriter, NetCDFWriterConfig};
