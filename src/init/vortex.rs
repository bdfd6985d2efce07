//! Balanced vortex initial conditions.
//!
//! Vortices are specified as PV anomalies and inverted for a flow in
//! geostrophic balance:
//!
//! 1. Deposit q'(x) = Σ s A P(|x − xₖ| / r_m) at corners, A = Ro f0 / h0
//! 2. Solve ∇²ψ − f²/(g h0) ψ = h0 q' with ψ = 0 on the walls
//! 3. u = −∂ψ/∂y, v = ∂ψ/∂x on the faces, h = h0 + f ψ / g at centres
//!
//! Step 2 is the linearisation of q = (ζ + f)/h about rest, so the resulting
//! state reproduces the requested PV anomaly to first order in Ro.

use ndarray::Array2;
use serde::{Deserialize, Serialize};
use tracing::{debug, info};

use super::balance::{Relaxation, solve_helmholtz};
use crate::config::VortexConfig;
use crate::equations::RotatingShallowWater;
use crate::error::{SolverError, SolverResult};
use crate::mesh::PolarGrid;
use crate::solver::State;
use crate::types::{FieldExt, Latitude, Longitude};

// =============================================================================
// Vortex shape and sign
// =============================================================================

/// Radial shape P(ρ) of one PV anomaly, ρ = distance / r_m.
#[derive(Clone, Copy, Debug, Default, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum VortexProfile {
    /// exp(−ρ²/2), peak 1 at the centre.
    #[default]
    Gaussian,
    /// (2 − ρᵇ) exp((1 − ρᵇ)/b): the vorticity of the azimuthal velocity
    /// ρ exp((1 − ρᵇ)/b). A core of one sign wrapped in a ring of the
    /// other with zero net circulation. Peak 2 e^{1/b} at the centre.
    Shielded {
        #[serde(default = "default_steepness")]
        steepness: f64,
    },
}

fn default_steepness() -> f64 {
    1.5
}

impl VortexProfile {
    /// Shielded profile with the default steepness b = 1.5.
    pub fn shielded() -> Self {
        VortexProfile::Shielded {
            steepness: default_steepness(),
        }
    }

    /// P(ρ).
    #[inline]
    pub fn shape(&self, rho: f64) -> f64 {
        match *self {
            VortexProfile::Gaussian => (-0.5 * rho * rho).exp(),
            VortexProfile::Shielded { steepness: b } => {
                let rb = rho.powf(b);
                (2.0 - rb) * ((1.0 - rb) / b).exp()
            }
        }
    }

    pub fn validate(&self) -> SolverResult<()> {
        match *self {
            VortexProfile::Gaussian => Ok(()),
            VortexProfile::Shielded { steepness } if steepness.is_finite() && steepness > 0.0 => {
                Ok(())
            }
            VortexProfile::Shielded { steepness } => Err(SolverError::invalid_config(format!(
                "shielded profile steepness must be positive, got {steepness}"
            ))),
        }
    }
}

/// Sense of rotation of the vortices.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum VortexSign {
    /// Rotating with the planet (counter-clockwise seen from above the north
    /// pole), positive PV anomaly, low in h.
    #[default]
    Cyclonic,
    Anticyclonic,
}

impl VortexSign {
    #[inline]
    pub fn factor(self) -> f64 {
        match self {
            VortexSign::Cyclonic => 1.0,
            VortexSign::Anticyclonic => -1.0,
        }
    }
}

// =============================================================================
// Vortex placement
// =============================================================================

/// Where to put vortices.
#[derive(Clone, Debug, PartialEq)]
pub enum VortexSpec {
    /// Rings: `counts[k]` vortices evenly spaced in longitude on latitude
    /// `latitudes[k]`, the first at longitude 0.
    Bands {
        latitudes: Vec<f64>,
        counts: Vec<usize>,
    },
    /// Explicit `(latitude, longitude)` pairs in degrees.
    Points(Vec<(f64, f64)>),
}

impl VortexSpec {
    /// Rings of vortices. Fails on mismatched or empty inputs.
    pub fn bands(latitudes: Vec<f64>, counts: Vec<usize>) -> SolverResult<Self> {
        let spec = VortexSpec::Bands { latitudes, counts };
        spec.validate()?;
        Ok(spec)
    }

    /// Explicit vortex positions. Fails on an empty list.
    pub fn points(coords: Vec<(f64, f64)>) -> SolverResult<Self> {
        let spec = VortexSpec::Points(coords);
        spec.validate()?;
        Ok(spec)
    }

    /// Build from the optional inputs of an initialization call.
    ///
    /// Exactly one of {`vort_lat` + `vort_number`, `vort_coords`} must be
    /// given; supplying both forms, neither, or half of the band form is an
    /// `InvalidConfiguration`.
    pub fn from_parts(
        vort_lat: Option<&[f64]>,
        vort_number: Option<&[usize]>,
        vort_coords: Option<&[(f64, f64)]>,
    ) -> SolverResult<Self> {
        match (vort_lat, vort_number, vort_coords) {
            (Some(lat), Some(number), None) => Self::bands(lat.to_vec(), number.to_vec()),
            (None, None, Some(coords)) => Self::points(coords.to_vec()),
            (None, None, None) => Err(SolverError::invalid_config(
                "no vortex specification: give vort_lat + vort_number or vort_coords",
            )),
            (Some(_), None, None) | (None, Some(_), None) => Err(SolverError::invalid_config(
                "vort_lat and vort_number must be given together",
            )),
            _ => Err(SolverError::invalid_config(
                "give either vort_lat + vort_number or vort_coords, not both",
            )),
        }
    }

    pub fn validate(&self) -> SolverResult<()> {
        match self {
            VortexSpec::Bands { latitudes, counts } => {
                if latitudes.is_empty() {
                    return Err(SolverError::invalid_config("vort_lat is empty"));
                }
                if latitudes.len() != counts.len() {
                    return Err(SolverError::invalid_config(format!(
                        "vort_lat has {} entries but vort_number has {}",
                        latitudes.len(),
                        counts.len()
                    )));
                }
                if let Some(k) = counts.iter().position(|&c| c == 0) {
                    return Err(SolverError::invalid_config(format!(
                        "vort_number[{k}] is zero"
                    )));
                }
                for &lat in latitudes {
                    check_latitude(lat)?;
                }
            }
            VortexSpec::Points(coords) => {
                if coords.is_empty() {
                    return Err(SolverError::invalid_config("vort_coords is empty"));
                }
                for &(lat, lon) in coords {
                    check_latitude(lat)?;
                    if !lon.is_finite() {
                        return Err(SolverError::invalid_config(format!(
                            "vortex longitude must be finite, got {lon}"
                        )));
                    }
                }
            }
        }
        Ok(())
    }

    /// Number of vortices described.
    pub fn len(&self) -> usize {
        match self {
            VortexSpec::Bands { counts, .. } => counts.iter().sum(),
            VortexSpec::Points(coords) => coords.len(),
        }
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Geographic position of every vortex.
    pub fn locations(&self) -> Vec<(Latitude, Longitude)> {
        match self {
            VortexSpec::Bands { latitudes, counts } => latitudes
                .iter()
                .zip(counts)
                .flat_map(|(&lat, &count)| {
                    (0..count).map(move |k| {
                        let lon = 360.0 * k as f64 / count as f64;
                        (Latitude::new(lat), Longitude::new(lon))
                    })
                })
                .collect(),
            VortexSpec::Points(coords) => coords
                .iter()
                .map(|&(lat, lon)| {
                    (Latitude::new(lat), Longitude::new(lon).normalized())
                })
                .collect(),
        }
    }
}

fn check_latitude(lat: f64) -> SolverResult<()> {
    if Latitude::new(lat).is_valid() {
        Ok(())
    } else {
        Err(SolverError::invalid_config(format!(
            "vortex latitude must lie in [-90, 90], got {lat}"
        )))
    }
}

// =============================================================================
// Initializer
// =============================================================================

/// Builds balanced initial states on a grid.
///
/// # Example
///
/// ```no_run
/// use polar_swe::config::{DomainConfig, PlanetConfig, VortexConfig};
/// use polar_swe::init::VortexInitializer;
/// use polar_swe::mesh::PolarGrid;
/// use polar_swe::types::FieldExt;
///
/// let grid = PolarGrid::build(64, &PlanetConfig::jupiter(), &DomainConfig::default())?;
/// let vortex = VortexConfig::default();
/// let init = VortexInitializer::new(&grid, &vortex);
///
/// // A pentagon of cyclones around a polar cyclone
/// let state = init.initialize(Some(&[90.0, 84.0]), Some(&[1, 5]), None)?;
/// assert!(state.h.min() > 0.0);
/// # Ok::<(), polar_swe::SolverError>(())
/// ```
pub struct VortexInitializer<'a> {
    grid: &'a PolarGrid,
    config: &'a VortexConfig,
}

impl<'a> VortexInitializer<'a> {
    pub fn new(grid: &'a PolarGrid, config: &'a VortexConfig) -> Self {
        Self { grid, config }
    }

    /// Resting thickness h0 = Bu (f0 r_m)² / g.
    pub fn base_thickness(&self) -> f64 {
        self.config.base_thickness(self.grid.planet())
    }

    /// PV anomaly amplitude A = Ro f0 / h0.
    pub fn amplitude(&self) -> f64 {
        self.config.rossby * self.grid.f0() / self.base_thickness()
    }

    /// Initialize from the optional inputs; see [`VortexSpec::from_parts`].
    pub fn initialize(
        &self,
        vort_lat: Option<&[f64]>,
        vort_number: Option<&[usize]>,
        vort_coords: Option<&[(f64, f64)]>,
    ) -> SolverResult<State> {
        let spec = VortexSpec::from_parts(vort_lat, vort_number, vort_coords)?;
        self.initialize_spec(&spec)
    }

    /// Balanced state for `spec`.
    ///
    /// # Errors
    ///
    /// `InvalidConfiguration` if the specification or vortex parameters are
    /// invalid, a vortex lies outside the domain, the balance relaxation does
    /// not converge, or the balanced thickness is not positive everywhere.
    pub fn initialize_spec(&self, spec: &VortexSpec) -> SolverResult<State> {
        spec.validate()?;
        self.config.validate()?;

        let centres = self.vortex_centres(spec)?;
        let anomaly = self.pv_anomaly(&centres);
        let (state, relaxation) = self.invert(&anomaly)?;

        info!(
            vortices = centres.len(),
            iterations = relaxation.iterations(),
            h_min = state.h.min(),
            h_max = state.h.max(),
            "initialized balanced vortex state"
        );
        Ok(state)
    }

    /// Projected centres of every vortex in `spec`.
    pub fn vortex_centres(&self, spec: &VortexSpec) -> SolverResult<Vec<(f64, f64)>> {
        spec.locations()
            .into_iter()
            .map(|(lat, lon)| {
                let (x, y) = self.grid.project(lat, lon);
                if self.grid.contains(x, y) {
                    Ok((x, y))
                } else {
                    Err(SolverError::invalid_config(format!(
                        "vortex at {lat}, {lon} lies outside the domain"
                    )))
                }
            })
            .collect()
    }

    /// PV anomaly q' at corners for vortices centred at `centres`.
    ///
    /// Anomalies superpose additively; overlapping vortices are not merged or
    /// separated.
    pub fn pv_anomaly(&self, centres: &[(f64, f64)]) -> Array2<f64> {
        let amplitude = self.config.sign.factor() * self.amplitude();
        let inv_rm = 1.0 / self.config.radius;
        let profile = self.config.profile;

        Array2::from_shape_fn(self.grid.corner_shape(), |(j, i)| {
            let (x, y) = self.grid.corner(j, i);
            centres
                .iter()
                .map(|&(cx, cy)| profile.shape((x - cx).hypot(y - cy) * inv_rm))
                .sum::<f64>()
                * amplitude
        })
    }

    /// Invert a corner PV anomaly for a balanced state.
    pub fn invert(&self, anomaly: &Array2<f64>) -> SolverResult<(State, Relaxation)> {
        let grid = self.grid;
        let g = grid.planet().gravity;
        let h0 = self.base_thickness();
        let dx = grid.dx();
        let n = grid.size();
        let equation = RotatingShallowWater::new(g, grid.f0(), h0);

        let rhs = anomaly.mapv(|q| h0 * q);
        let kappa = grid.coriolis_corners().mapv(|f| f * f / (g * h0));
        let (psi, relaxation) = solve_helmholtz(&rhs, &kappa, dx, &self.config.balance);

        if let Relaxation::Exhausted {
            iterations,
            residual,
        } = relaxation
        {
            return Err(SolverError::invalid_config(format!(
                "balance relaxation did not converge: residual {residual:.3e} after \
                 {iterations} iterations (tolerance {:.1e})",
                self.config.balance.tolerance
            )));
        }
        debug!(iterations = relaxation.iterations(), "balance solve done");

        let inv_dx = 1.0 / dx;
        let u = Array2::from_shape_fn((n, n + 1), |(j, i)| {
            -(psi[(j + 1, i)] - psi[(j, i)]) * inv_dx
        });
        let v = Array2::from_shape_fn((n + 1, n), |(j, i)| {
            (psi[(j, i + 1)] - psi[(j, i)]) * inv_dx
        });

        let f = grid.coriolis_centres();
        let h = Array2::from_shape_fn((n, n), |(j, i)| {
            let psi_c = 0.25
                * (psi[(j, i)] + psi[(j, i + 1)] + psi[(j + 1, i)] + psi[(j + 1, i + 1)]);
            h0 + equation.balanced_anomaly(f[(j, i)], psi_c)
        });

        if let Some(((j, i), value)) = h.first_non_finite().or_else(|| h.first_non_positive()) {
            return Err(SolverError::invalid_config(format!(
                "balanced thickness is not positive at cell ({j}, {i}): {value:.3e}; \
                 reduce the Rossby number or raise the Burger number"
            )));
        }

        Ok((State::new(h, u, v), relaxation))
    }
}
