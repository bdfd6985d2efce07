//! VTK output for polar grid snapshots.
//!
//! Each snapshot becomes one XML StructuredGrid file (`.vts`) whose points
//! are the cell corners of the projected domain. Cell data holds the centred
//! fields (`h`, `u`, `v`, `speed`, `pv`, `latitude`); point data holds the
//! corner `vorticity`. A ParaView collection (`.pvd`) lists the files with
//! their physical times so the series animates directly.
//!
//! # Example
//!
//! ```ignore
//! use polar_swe::io::VtkSeriesWriter;
//!
//! let mut writer = VtkSeriesWriter::new("output", "polar")?;
//! let summary = sim.run("30 days", &mut writer)?;
//! // output/polar.pvd, output/polar_0000.vts, ...
//! ```

use std::fs::{self, File};
use std::io::{BufWriter, Write};
use std::path::{Path, PathBuf};

use ndarray::Zip;
use thiserror::Error;
use tracing::{debug, warn};

use crate::error::{SolverError, SolverResult};
use crate::mesh::PolarGrid;
use crate::simulation::{Snapshot, SnapshotSink};
use crate::solver::{FieldName, State, field_at_centres, vorticity};

/// Error type for VTK operations.
#[derive(Debug, Error)]
pub enum VtkError {
    /// I/O error during file operations.
    #[error("VTK I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// State does not fit the grid it is written on.
    #[error("state of size {state} does not match grid of size {grid}")]
    ShapeMismatch { state: usize, grid: usize },
}

/// VTK XML writer helper.
struct VtkWriter<W: Write> {
    writer: BufWriter<W>,
    indent: usize,
}

impl<W: Write> VtkWriter<W> {
    fn new(writer: W) -> Self {
        Self {
            writer: BufWriter::new(writer),
            indent: 0,
        }
    }

    fn write_indent(&mut self) -> std::io::Result<()> {
        for _ in 0..self.indent {
            write!(self.writer, "  ")?;
        }
        Ok(())
    }

    fn write_header(&mut self, file_type: &str) -> std::io::Result<()> {
        writeln!(self.writer, "<?xml version=\"1.0\"?>")?;
        writeln!(
            self.writer,
            "<VTKFile type=\"{file_type}\" version=\"0.1\" byte_order=\"LittleEndian\">"
        )?;
        self.indent += 1;
        Ok(())
    }

    fn write_footer(&mut self) -> std::io::Result<()> {
        self.indent -= 1;
        writeln!(self.writer, "</VTKFile>")?;
        self.writer.flush()?;
        Ok(())
    }

    fn start_element(&mut self, name: &str, attrs: &[(&str, &str)]) -> std::io::Result<()> {
        self.write_indent()?;
        write!(self.writer, "<{name}")?;
        for (key, value) in attrs {
            write!(self.writer, " {key}=\"{value}\"")?;
        }
        writeln!(self.writer, ">")?;
        self.indent += 1;
        Ok(())
    }

    fn empty_element(&mut self, name: &str, attrs: &[(&str, &str)]) -> std::io::Result<()> {
        self.write_indent()?;
        write!(self.writer, "<{name}")?;
        for (key, value) in attrs {
            write!(self.writer, " {key}=\"{value}\"")?;
        }
        writeln!(self.writer, "/>")
    }

    fn end_element(&mut self, name: &str) -> std::io::Result<()> {
        self.indent -= 1;
        self.write_indent()?;
        writeln!(self.writer, "</{name}>")?;
        Ok(())
    }

    /// Float64 values in iteration order, `per_line` values per line.
    fn write_values<'a>(
        &mut self,
        data: impl IntoIterator<Item = &'a f64>,
        per_line: usize,
    ) -> std::io::Result<()> {
        self.indent += 1;
        let mut line: Vec<String> = Vec::with_capacity(per_line);
        for v in data {
            line.push(format!("{v:.10e}"));
            if line.len() == per_line {
                self.write_indent()?;
                writeln!(self.writer, "{}", line.join(" "))?;
                line.clear();
            }
        }
        if !line.is_empty() {
            self.write_indent()?;
            writeln!(self.writer, "{}", line.join(" "))?;
        }
        self.indent -= 1;
        Ok(())
    }

    fn write_data_array_f64<'a>(
        &mut self,
        name: &str,
        data: impl IntoIterator<Item = &'a f64>,
    ) -> std::io::Result<()> {
        self.write_indent()?;
        writeln!(
            self.writer,
            "<DataArray type=\"Float64\" Name=\"{name}\" format=\"ascii\">"
        )?;
        self.write_values(data, 6)?;
        self.write_indent()?;
        writeln!(self.writer, "</DataArray>")?;
        Ok(())
    }

    fn write_points(&mut self, points: &[f64]) -> std::io::Result<()> {
        self.start_element("Points", &[])?;
        self.write_indent()?;
        writeln!(
            self.writer,
            "<DataArray type=\"Float64\" NumberOfComponents=\"3\" format=\"ascii\">"
        )?;
        self.write_values(points, 6)?;
        self.write_indent()?;
        writeln!(self.writer, "</DataArray>")?;
        self.end_element("Points")?;
        Ok(())
    }

    fn write_field_data(&mut self, values: &[(&str, f64)]) -> std::io::Result<()> {
        self.start_element("FieldData", &[])?;
        for (name, value) in values {
            self.write_indent()?;
            writeln!(
                self.writer,
                "<DataArray type=\"Float64\" Name=\"{name}\" NumberOfTuples=\"1\" format=\"ascii\">"
            )?;
            self.write_values(&[*value], 1)?;
            self.write_indent()?;
            writeln!(self.writer, "</DataArray>")?;
        }
        self.end_element("FieldData")?;
        Ok(())
    }
}

/// Corner coordinates as VTK points (x fastest, z = 0).
fn corner_points(grid: &PolarGrid) -> Vec<f64> {
    let (rows, cols) = grid.corner_shape();
    let mut points = Vec::with_capacity(rows * cols * 3);
    for j in 0..rows {
        for i in 0..cols {
            let (x, y) = grid.corner(j, i);
            points.extend_from_slice(&[x, y, 0.0]);
        }
    }
    points
}

/// Write one state as a `.vts` structured grid.
pub fn write_vtk_state(
    path: impl AsRef<Path>,
    grid: &PolarGrid,
    state: &State,
    time: f64,
    step: usize,
) -> Result<(), VtkError> {
    if !state.matches(grid) {
        return Err(VtkError::ShapeMismatch {
            state: state.size(),
            grid: grid.size(),
        });
    }

    let n = grid.size();
    let extent = format!("0 {n} 0 {n} 0 0");
    let file = File::create(path)?;
    let mut writer = VtkWriter::new(file);

    writer.write_header("StructuredGrid")?;
    writer.start_element("StructuredGrid", &[("WholeExtent", &extent)])?;
    writer.write_field_data(&[("TimeValue", time), ("Step", step as f64)])?;
    writer.start_element("Piece", &[("Extent", &extent)])?;

    writer.start_element("PointData", &[("Scalars", "vorticity")])?;
    writer.write_data_array_f64("vorticity", &vorticity(state, grid))?;
    writer.end_element("PointData")?;

    writer.start_element("CellData", &[("Scalars", "h")])?;
    let u = field_at_centres(state, grid, FieldName::U);
    let v = field_at_centres(state, grid, FieldName::V);
    let speed = Zip::from(&u).and(&v).map_collect(|a, b| a.hypot(*b));
    writer.write_data_array_f64("h", &state.h)?;
    writer.write_data_array_f64("u", &u)?;
    writer.write_data_array_f64("v", &v)?;
    writer.write_data_array_f64("speed", &speed)?;
    writer.write_data_array_f64("pv", &field_at_centres(state, grid, FieldName::Pv))?;
    writer.write_data_array_f64("latitude", grid.latitude_centres())?;
    writer.end_element("CellData")?;

    writer.write_points(&corner_points(grid))?;
    writer.end_element("Piece")?;
    writer.end_element("StructuredGrid")?;
    writer.write_footer()?;
    Ok(())
}

/// Write a ParaView collection listing `(time, file)` entries.
pub fn write_pvd_collection(
    path: impl AsRef<Path>,
    entries: &[(f64, String)],
) -> Result<(), VtkError> {
    let file = File::create(path)?;
    let mut writer = VtkWriter::new(file);
    writer.write_header("Collection")?;
    writer.start_element("Collection", &[])?;
    for (time, name) in entries {
        writer.empty_element(
            "DataSet",
            &[
                ("timestep", &format!("{time:.6e}")),
                ("group", ""),
                ("part", "0"),
                ("file", name),
            ],
        )?;
    }
    writer.end_element("Collection")?;
    writer.write_footer()?;
    Ok(())
}

/// Frames between two rewrites of the `.pvd` collection during a run.
pub const PVD_REFRESH_FRAMES: usize = 16;

/// Writes every snapshot of a run as `<stem>_NNNN.vts` in one directory and
/// lists them in `<stem>.pvd`.
///
/// The collection is rewritten every [`PVD_REFRESH_FRAMES`] frames, when the
/// run finishes, and on drop if frames are still unlisted.
#[derive(Debug)]
pub struct VtkSeriesWriter {
    dir: PathBuf,
    stem: String,
    entries: Vec<(f64, String)>,
    refresh_every: usize,
    listed: usize,
}

impl VtkSeriesWriter {
    /// Writer into `dir`, created if missing.
    pub fn new(dir: impl AsRef<Path>, stem: impl Into<String>) -> Result<Self, VtkError> {
        let dir = dir.as_ref().to_path_buf();
        fs::create_dir_all(&dir)?;
        Ok(Self {
            dir,
            stem: stem.into(),
            entries: Vec::new(),
            refresh_every: PVD_REFRESH_FRAMES,
            listed: 0,
        })
    }

    /// Rewrite the collection every `frames` frames instead (at least 1).
    pub fn with_refresh_every(mut self, frames: usize) -> Self {
        self.refresh_every = frames.max(1);
        self
    }

    /// Path of the `.pvd` collection.
    pub fn collection_path(&self) -> PathBuf {
        self.dir.join(format!("{}.pvd", self.stem))
    }

    /// Number of frames written so far.
    pub fn frames(&self) -> usize {
        self.entries.len()
    }

    /// Write one snapshot. Returns the frame path.
    pub fn write(&mut self, grid: &PolarGrid, snapshot: &Snapshot) -> Result<PathBuf, VtkError> {
        let name = format!("{}_{:04}.vts", self.stem, self.entries.len());
        let path = self.dir.join(&name);
        write_vtk_state(&path, grid, &snapshot.state, snapshot.time, snapshot.step)?;

        self.entries.push((snapshot.time, name));
        if self.entries.len() - self.listed >= self.refresh_every {
            self.flush_collection()?;
        }
        debug!(path = %path.display(), time = snapshot.time, "wrote VTK frame");
        Ok(path)
    }

    /// Rewrite the `.pvd` collection if any frame is not yet listed.
    pub fn flush_collection(&mut self) -> Result<(), VtkError> {
        if self.listed == self.entries.len() {
            return Ok(());
        }
        write_pvd_collection(self.collection_path(), &self.entries)?;
        self.listed = self.entries.len();
        Ok(())
    }
}

impl SnapshotSink for VtkSeriesWriter {
    fn accept(&mut self, grid: &PolarGrid, snapshot: Snapshot) -> SolverResult<()> {
        self.write(grid, &snapshot)
            .map(|_| ())
            .map_err(|e| SolverError::SnapshotSink(e.to_string()))
    }

    fn finish(&mut self, _grid: &PolarGrid) -> SolverResult<()> {
        self.flush_collection()
            .map_err(|e| SolverError::SnapshotSink(e.to_string()))
    }
}

impl Drop for VtkSeriesWriter {
    fn drop(&mut self) {
        if let Err(e) = self.flush_collection() {
            warn!(
                path = %self.collection_path().display(),
                error = %e,
                "failed to write VTK collection"
            );
        }
    }
}
