//! Snapshot persistence.
//!
//! Both writers implement [`SnapshotSink`](crate::simulation::SnapshotSink)
//! and can be handed straight to [`Simulation::run`](crate::simulation::Simulation::run):
//!
//! - **VTK**: one `.vts` structured grid per snapshot plus a `.pvd`
//!   collection for ParaView
//! - **NetCDF**: a single file with the staggered fields along an unlimited
//!   time dimension (requires the `netcdf` feature)

#[cfg(feature = "netcdf")]
mod netcdf_io;
mod vtk;

#[cfg(feature = "netcdf")]
pub use netcdf_io::{NetCDFError, NetCDFWriter, NetCDFWriterConfig};
pub use vtk::{
    PVD_REFRESH_FRAMES, VtkError, VtkSeriesWriter, write_pvd_collection, write_vtk_state,
};
