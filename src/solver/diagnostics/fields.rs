//! Derived vorticity fields, addressable by name.
//!
//! Every function here is a pure function of (state, grid); nothing is cached,
//! so a derived field can never go stale relative to the state it came from.

use std::fmt;
use std::str::FromStr;

use ndarray::{Array2, Zip};

use crate::error::SolverError;
use crate::mesh::PolarGrid;
use crate::operators::{corners_to_centres, curl, velocity_at_centres};
use crate::solver::State;

/// Relative vorticity ζ = ∂v/∂x − ∂u/∂y at corners, `(n+1) × (n+1)`.
pub fn vorticity(state: &State, grid: &PolarGrid) -> Array2<f64> {
    curl(&state.u, &state.v, grid.dx())
}

/// Potential vorticity q = (ζ + f) / h at cell centres, `n × n`.
///
/// ζ is the mean of the four surrounding corners.
pub fn potential_vorticity(state: &State, grid: &PolarGrid) -> Array2<f64> {
    let zeta = corners_to_centres(&vorticity(state, grid));
    Zip::from(&zeta)
        .and(grid.coriolis_centres())
        .and(&state.h)
        .map_collect(|z, f, h| (z + f) / h)
}

/// Where a field lives on the staggered grid.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum GridLocation {
    Centre,
    XFace,
    YFace,
    Corner,
}

/// Output fields that consumers can request by name.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum FieldName {
    /// Layer thickness
    H,
    /// x-velocity
    U,
    /// y-velocity
    V,
    /// Relative vorticity
    Vorticity,
    /// Potential vorticity
    Pv,
}

impl FieldName {
    pub const ALL: [FieldName; 5] = [
        FieldName::H,
        FieldName::U,
        FieldName::V,
        FieldName::Vorticity,
        FieldName::Pv,
    ];

    /// Stable identifier used in output files.
    pub fn as_str(self) -> &'static str {
        match self {
            FieldName::H => "h",
            FieldName::U => "u",
            FieldName::V => "v",
            FieldName::Vorticity => "vorticity",
            FieldName::Pv => "pv",
        }
    }

    pub fn units(self) -> &'static str {
        match self {
            FieldName::H => "m",
            FieldName::U | FieldName::V => "m s-1",
            FieldName::Vorticity => "s-1",
            FieldName::Pv => "m-1 s-1",
        }
    }

    pub fn long_name(self) -> &'static str {
        match self {
            FieldName::H => "layer thickness",
            FieldName::U => "x velocity",
            FieldName::V => "y velocity",
            FieldName::Vorticity => "relative vorticity",
            FieldName::Pv => "potential vorticity",
        }
    }

    /// Native location of the field.
    pub fn location(self) -> GridLocation {
        match self {
            FieldName::H | FieldName::Pv => GridLocation::Centre,
            FieldName::U => GridLocation::XFace,
            FieldName::V => GridLocation::YFace,
            FieldName::Vorticity => GridLocation::Corner,
        }
    }
}

impl fmt::Display for FieldName {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for FieldName {
    type Err = SolverError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "h" | "thickness" => Ok(FieldName::H),
            "u" => Ok(FieldName::U),
            "v" => Ok(FieldName::V),
            "vorticity" | "zeta" => Ok(FieldName::Vorticity),
            "pv" | "potential_vorticity" => Ok(FieldName::Pv),
            other => Err(SolverError::invalid_config(format!(
                "unknown field '{other}', expected one of h, u, v, vorticity, pv"
            ))),
        }
    }
}

/// Field `name` at its native grid location.
pub fn field(state: &State, grid: &PolarGrid, name: FieldName) -> Array2<f64> {
    match name {
        FieldName::H => state.h.clone(),
        FieldName::U => state.u.clone(),
        FieldName::V => state.v.clone(),
        FieldName::Vorticity => vorticity(state, grid),
        FieldName::Pv => potential_vorticity(state, grid),
    }
}

/// Field `name` interpolated to cell centres, `n × n`.
pub fn field_at_centres(state: &State, grid: &PolarGrid, name: FieldName) -> Array2<f64> {
    match name {
        FieldName::H => state.h.clone(),
        FieldName::U => velocity_at_centres(&state.u, &state.v).0,
        FieldName::V => velocity_at_centres(&state.u, &state.v).1,
        FieldName::Vorticity => corners_to_centres(&vorticity(state, grid)),
        FieldName::Pv => potential_vorticity(state, grid),
    }
}

/// Extreme of the PV anomaly.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct PvPeak {
    /// Cell index (row, column)
    pub index: (usize, usize),
    /// Projected position of the cell centre (m)
    pub position: (f64, f64),
    /// PV anomaly q − f/h̄ at the peak
    pub anomaly: f64,
}

/// Locate the largest |q − f/h̄|, with h̄ the domain-mean thickness.
///
/// The background f/h̄ is removed so the planetary PV maximum at the pole
/// does not mask an off-pole vortex.
pub fn pv_peak(state: &State, grid: &PolarGrid) -> PvPeak {
    let q = potential_vorticity(state, grid);
    let h_mean = state.h.mean().unwrap_or(1.0);
    let f = grid.coriolis_centres();

    let mut best = PvPeak {
        index: (0, 0),
        position: grid.centre(0, 0),
        anomaly: 0.0,
    };
    for ((j, i), &qv) in q.indexed_iter() {
        let anomaly = qv - f[(j, i)] / h_mean;
        if anomaly.abs() > best.anomaly.abs() {
            best = PvPeak {
                index: (j, i),
                position: grid.centre(j, i),
                anomaly,
            };
        }
    }
    best
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::{DomainConfig, PlanetConfig};
    use crate::types::FieldExt;
    use approx::assert_relative_eq;

    fn grid() -> PolarGrid {
        PolarGrid::build(10, &PlanetConfig::jupiter(), &DomainConfig::default()).unwrap()
    }

    #[test]
    fn test_resting_pv_is_planetary() {
        let grid = grid();
        let state = State::at_rest(&grid, 2.0e4);
        let q = potential_vorticity(&state, &grid);
        for j in 0..10 {
            for i in 0..10 {
                assert_relative_eq!(q[(j, i)], grid.coriolis_centres()[(j, i)] / 2.0e4);
            }
        }
        assert_eq!(vorticity(&state, &grid).max_abs(), 0.0);
    }

    #[test]
    fn test_field_shapes() {
        let grid = grid();
        let state = State::at_rest(&grid, 1.0);
        assert_eq!(field(&state, &grid, FieldName::U).dim(), (10, 11));
        assert_eq!(field(&state, &grid, FieldName::Vorticity).dim(), (11, 11));
        for name in FieldName::ALL {
            assert_eq!(field_at_centres(&state, &grid, name).dim(), (10, 10));
        }
    }

    #[test]
    fn test_field_name_parsing() {
        for name in FieldName::ALL {
            assert_eq!(name.to_string().parse::<FieldName>().unwrap(), name);
        }
        assert_eq!("PV".parse::<FieldName>().unwrap(), FieldName::Pv);
        assert_eq!("zeta".parse::<FieldName>().unwrap(), FieldName::Vorticity);
        assert!("temperature".parse::<FieldName>().unwrap_err().is_configuration());
    }

    #[test]
    fn test_pv_peak_finds_local_spin() {
        let grid = grid();
        let mut state = State::at_rest(&grid, 2.0e4);
        // Counter-clockwise circulation around corner (3, 7)
        state.u[(2, 7)] = 10.0;
        state.u[(3, 7)] = -10.0;
        state.v[(3, 6)] = -10.0;
        state.v[(3, 7)] = 10.0;
        let peak = pv_peak(&state, &grid);
        assert!(peak.anomaly > 0.0);
        let (j, i) = peak.index;
        assert!((2..=3).contains(&j) && (6..=7).contains(&i), "peak at {:?}", peak.index);
    }
}
