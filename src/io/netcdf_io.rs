//! NetCDF output for polar shallow water runs.
//!
//! One file per run with the staggered C-grid kept intact:
//!
//! | dimension | size  | used by                |
//! |-----------|-------|------------------------|
//! | `time`    | unlim | every snapshot         |
//! | `y`, `x`  | n     | `h`, `pv`, `lat`       |
//! | `x_u`     | n + 1 | `u` (with `y`)         |
//! | `y_v`     | n + 1 | `v` (with `x`)         |
//!
//! Global attributes record the run parameters (`grid_size`, `f0`, `g`,
//! `planet_radius`, `duration`).
//!
//! # Example
//!
//! ```rust,ignore
//! use polar_swe::io::{NetCDFWriter, NetCDFWriterConfig};
//!
//! let config = NetCDFWriterConfig::new("output.nc").with_title("Pentagon");
//! let mut writer = NetCDFWriter::create(config, &grid, duration)?;
//! sim.run("30 days", &mut writer)?;
//! ```

use chrono::Utc;
use ndarray::Array2;
use netcdf::create;
use thiserror::Error;
use tracing::debug;

use crate::error::{SolverError, SolverResult};
use crate::mesh::PolarGrid;
use crate::simulation::{Snapshot, SnapshotSink};
use crate::solver::{FieldName, potential_vorticity};

/// Error type for NetCDF operations.
#[derive(Debug, Error)]
pub enum NetCDFError {
    /// NetCDF library error
    #[error("NetCDF error: {0}")]
    NetCDF(#[from] netcdf::Error),

    /// Missing variable
    #[error("Missing variable: {0}")]
    MissingVariable(String),

    /// Snapshot does not fit the file's grid
    #[error("snapshot of size {state} written to a file of size {grid}")]
    ShapeMismatch { state: usize, grid: usize },
}

/// Configuration for NetCDF output.
#[derive(Debug, Clone)]
pub struct NetCDFWriterConfig {
    /// Output file path
    pub path: String,
    /// Title attribute
    pub title: Option<String>,
    /// Source attribute (model name/version)
    pub source: Option<String>,
    /// Comment attribute
    pub comment: Option<String>,
    /// Whether to include potential vorticity
    pub include_pv: bool,
}

impl NetCDFWriterConfig {
    /// Create a new configuration with the given output path.
    pub fn new(path: impl Into<String>) -> Self {
        Self {
            path: path.into(),
            title: None,
            source: Some(format!("polar-swe {}", env!("CARGO_PKG_VERSION"))),
            comment: None,
            include_pv: true,
        }
    }

    pub fn with_title(mut self, title: impl Into<String>) -> Self {
        self.title = Some(title.into());
        self
    }

    pub fn with_comment(mut self, comment: impl Into<String>) -> Self {
        self.comment = Some(comment.into());
        self
    }

    /// Enable/disable PV output.
    pub fn with_pv(mut self, include: bool) -> Self {
        self.include_pv = include;
        self
    }
}

/// NetCDF writer for simulation snapshots.
pub struct NetCDFWriter {
    file: netcdf::FileMut,
    config: NetCDFWriterConfig,
    n: usize,
    time_index: usize,
}

impl NetCDFWriter {
    /// Create the file and write the grid coordinates.
    ///
    /// `duration` is the planned run length in seconds, stored as an
    /// attribute.
    pub fn create(
        config: NetCDFWriterConfig,
        grid: &PolarGrid,
        duration: f64,
    ) -> Result<Self, NetCDFError> {
        let n = grid.size();
        let mut file = create(&config.path)?;

        file.add_unlimited_dimension("time")?;
        file.add_dimension("y", n)?;
        file.add_dimension("x", n)?;
        file.add_dimension("y_v", n + 1)?;
        file.add_dimension("x_u", n + 1)?;

        {
            let mut time_var = file.add_variable::<f64>("time", &["time"])?;
            time_var.put_attribute("long_name", "elapsed simulation time")?;
            time_var.put_attribute("units", "s")?;
        }

        let centres = grid.centres().to_vec();
        let faces = grid.faces().to_vec();
        for (name, dim, values) in [
            ("x", "x", &centres),
            ("y", "y", &centres),
            ("x_u", "x_u", &faces),
            ("y_v", "y_v", &faces),
        ] {
            let mut var = file.add_variable::<f64>(name, &[dim])?;
            let standard = if name.starts_with('x') {
                "projection_x_coordinate"
            } else {
                "projection_y_coordinate"
            };
            var.put_attribute("standard_name", standard)?;
            var.put_attribute("units", "m")?;
            var.put_values(values, ..)?;
        }

        {
            let mut lat_var = file.add_variable::<f64>("lat", &["y", "x"])?;
            lat_var.put_attribute("standard_name", "latitude")?;
            lat_var.put_attribute("units", "degrees_north")?;
            lat_var.put_values(&row_major(grid.latitude_centres()), (.., ..))?;
        }

        let mut fields = vec![
            (FieldName::H, ["time", "y", "x"]),
            (FieldName::U, ["time", "y", "x_u"]),
            (FieldName::V, ["time", "y_v", "x"]),
        ];
        if config.include_pv {
            fields.push((FieldName::Pv, ["time", "y", "x"]));
        }
        for (name, dims) in fields {
            let mut var = file.add_variable::<f64>(name.as_str(), &dims)?;
            var.put_attribute("long_name", name.long_name())?;
            var.put_attribute("units", name.units())?;
        }

        let planet = grid.planet();
        file.add_attribute("grid_size", n as i32)?;
        file.add_attribute("f0", grid.f0())?;
        file.add_attribute("g", planet.gravity)?;
        file.add_attribute("planet_radius", planet.radius)?;
        file.add_attribute("rotation_period", planet.rotation_period)?;
        file.add_attribute("lat_min", grid.domain().lat_min)?;
        file.add_attribute("lat_sponge", grid.domain().lat_sponge)?;
        file.add_attribute("duration", duration)?;

        if let Some(ref title) = config.title {
            file.add_attribute("title", title.as_str())?;
        }
        if let Some(ref source) = config.source {
            file.add_attribute("source", source.as_str())?;
        }
        if let Some(ref comment) = config.comment {
            file.add_attribute("comment", comment.as_str())?;
        }

        let now = Utc::now();
        file.add_attribute(
            "history",
            format!("{}: created by polar-swe", now.format("%Y-%m-%d %H:%M:%S UTC")).as_str(),
        )?;

        Ok(Self {
            file,
            config,
            n,
            time_index: 0,
        })
    }

    /// Append one snapshot.
    pub fn write_snapshot(
        &mut self,
        grid: &PolarGrid,
        snapshot: &Snapshot,
    ) -> Result<(), NetCDFError> {
        let state = &snapshot.state;
        if state.size() != self.n || !state.matches(grid) {
            return Err(NetCDFError::ShapeMismatch {
                state: state.size(),
                grid: self.n,
            });
        }
        let t_idx = self.time_index;

        {
            let mut time_var = self
                .file
                .variable_mut("time")
                .ok_or_else(|| NetCDFError::MissingVariable("time".to_string()))?;
            time_var.put_value(snapshot.time, [t_idx])?;
        }

        let pv = self.config.include_pv.then(|| potential_vorticity(state, grid));
        let mut fields = vec![("h", &state.h), ("u", &state.u), ("v", &state.v)];
        if let Some(pv) = &pv {
            fields.push(("pv", pv));
        }
        for (name, data) in fields {
            let mut var = self
                .file
                .variable_mut(name)
                .ok_or_else(|| NetCDFError::MissingVariable(name.to_string()))?;
            var.put_values(&row_major(data), (t_idx, .., ..))?;
        }

        self.time_index += 1;
        debug!(time_index = t_idx, time = snapshot.time, "wrote NetCDF record");
        Ok(())
    }

    /// Get the number of timesteps written.
    pub fn n_timesteps(&self) -> usize {
        self.time_index
    }
}

/// Values of `field` in row-major order, the layout of a `(y, x)` variable.
fn row_major(field: &Array2<f64>) -> Vec<f64> {
    field.iter().copied().collect()
}

impl SnapshotSink for NetCDFWriter {
    fn accept(&mut self, grid: &PolarGrid, snapshot: Snapshot) -> SolverResult<()> {
        self.write_snapshot(grid, &snapshot)
            .map_err(|e| SolverError::SnapshotSink(e.to_string()))
    }
}
