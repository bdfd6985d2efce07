//! Run configuration.
//!
//! Every tunable of a run lives in one explicit [`RunConfig`] value that is
//! handed to the grid builder, the initializer and the run controller. There is
//! no process-wide state. Defaults reproduce the Jupiter polar setup.
//!
//! Configurations can be built in code with the `with_*` setters or loaded
//! from YAML:
//!
//! ```
//! use polar_swe::config::RunConfig;
//!
//! let config = RunConfig::from_yaml(
//!     r#"
//! grid_size: 64
//! duration: "30 days"
//! vortex:
//!   rossby: 0.3
//! vortices:
//!   latitudes: [84.0]
//!   counts: [5]
//! "#,
//! )
//! .unwrap();
//!
//! assert_eq!(config.grid_size, 64);
//! assert_eq!(config.vortex.rossby, 0.3);
//! assert_eq!(config.planet.gravity, 24.8); // Jupiter default
//! ```

use std::path::Path;

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::error::{SolverError, SolverResult};
use crate::init::{VortexProfile, VortexSign, VortexSpec};
use crate::time::resolve_duration;

/// Smallest grid size that can resolve the cap.
pub const MIN_GRID_SIZE: usize = 4;

/// Errors that can occur when loading a run configuration.
#[derive(Debug, Error)]
pub enum ConfigError {
    /// Failed to read the configuration file.
    #[error("failed to read configuration file: {0}")]
    Io(#[from] std::io::Error),

    /// Failed to parse the configuration YAML.
    #[error("failed to parse configuration YAML: {0}")]
    Yaml(#[from] serde_yaml::Error),

    /// Parsed, but the values are not usable.
    #[error(transparent)]
    Invalid(#[from] SolverError),
}

// =============================================================================
// Planet
// =============================================================================

/// Planetary constants.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct PlanetConfig {
    /// Planet radius (m)
    pub radius: f64,
    /// Effective gravity of the layer (m/s²)
    pub gravity: f64,
    /// Rotation period (s)
    pub rotation_period: f64,
}

impl PlanetConfig {
    /// Jupiter: R = 66 854 km, g = 24.8 m/s², T = 9h 55m 27s.
    pub fn jupiter() -> Self {
        Self {
            radius: 66_854e3,
            gravity: 24.8,
            rotation_period: (9 * 3600 + 55 * 60 + 27) as f64,
        }
    }

    /// Polar Coriolis parameter f0 = 2Ω = 4π/T.
    #[inline]
    pub fn f0(&self) -> f64 {
        4.0 * std::f64::consts::PI / self.rotation_period
    }

    pub fn with_radius(mut self, radius: f64) -> Self {
        self.radius = radius;
        self
    }

    pub fn with_gravity(mut self, gravity: f64) -> Self {
        self.gravity = gravity;
        self
    }

    pub fn with_rotation_period(mut self, period: f64) -> Self {
        self.rotation_period = period;
        self
    }

    fn validate(&self) -> SolverResult<()> {
        for (name, value) in [
            ("planet.radius", self.radius),
            ("planet.gravity", self.gravity),
            ("planet.rotation_period", self.rotation_period),
        ] {
            if !(value.is_finite() && value > 0.0) {
                return Err(SolverError::invalid_config(format!(
                    "{name} must be positive and finite, got {value}"
                )));
            }
        }
        Ok(())
    }
}

impl Default for PlanetConfig {
    fn default() -> Self {
        Self::jupiter()
    }
}

// =============================================================================
// Domain
// =============================================================================

/// Extent of the polar cap.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct DomainConfig {
    /// Latitude of the domain edge (°N). The square domain reaches this
    /// latitude at the midpoint of each side.
    pub lat_min: f64,
    /// Latitude where the sponge layer starts (°N). Velocities are relaxed
    /// towards rest equatorward of it.
    pub lat_sponge: f64,
}

impl DomainConfig {
    pub fn new(lat_min: f64, lat_sponge: f64) -> Self {
        Self {
            lat_min,
            lat_sponge,
        }
    }

    pub fn validate(&self) -> SolverResult<()> {
        if !(self.lat_min.is_finite() && self.lat_min > 0.0 && self.lat_min < 90.0) {
            return Err(SolverError::invalid_config(format!(
                "domain.lat_min must lie in (0, 90), got {}",
                self.lat_min
            )));
        }
        if !(self.lat_sponge.is_finite()
            && self.lat_sponge >= self.lat_min
            && self.lat_sponge < 90.0)
        {
            return Err(SolverError::invalid_config(format!(
                "domain.lat_sponge must lie in [lat_min, 90), got {} with lat_min {}",
                self.lat_sponge, self.lat_min
            )));
        }
        Ok(())
    }
}

impl Default for DomainConfig {
    fn default() -> Self {
        Self::new(61.0, 65.0)
    }
}

// =============================================================================
// Vortex
// =============================================================================

/// Limits of the balance (PV inversion) relaxation.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct BalanceConfig {
    /// Stop when max |residual| ≤ tolerance · max |rhs|.
    pub tolerance: f64,
    /// Hard cap on relaxation sweeps.
    pub max_iterations: usize,
    /// Sweeps between residual evaluations.
    pub check_interval: usize,
}

impl Default for BalanceConfig {
    fn default() -> Self {
        Self {
            tolerance: 1e-8,
            max_iterations: 20_000,
            check_interval: 10,
        }
    }
}

/// Parameters shared by every vortex of an initialization.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct VortexConfig {
    /// Rossby number Ro: peak relative vorticity in units of f0.
    pub rossby: f64,
    /// Burger number Bu = (Ld / r_m)², sets the layer depth.
    pub burger: f64,
    /// Characteristic vortex radius r_m (m).
    pub radius: f64,
    pub profile: VortexProfile,
    pub sign: VortexSign,
    pub balance: BalanceConfig,
}

impl VortexConfig {
    /// Resting layer thickness h0 = Bu (f0 r_m)² / g.
    pub fn base_thickness(&self, planet: &PlanetConfig) -> f64 {
        let f0r = planet.f0() * self.radius;
        self.burger * f0r * f0r / planet.gravity
    }

    pub fn with_rossby(mut self, rossby: f64) -> Self {
        self.rossby = rossby;
        self
    }

    pub fn with_burger(mut self, burger: f64) -> Self {
        self.burger = burger;
        self
    }

    pub fn with_radius(mut self, radius: f64) -> Self {
        self.radius = radius;
        self
    }

    pub fn with_profile(mut self, profile: VortexProfile) -> Self {
        self.profile = profile;
        self
    }

    pub fn with_sign(mut self, sign: VortexSign) -> Self {
        self.sign = sign;
        self
    }

    pub fn with_balance(mut self, balance: BalanceConfig) -> Self {
        self.balance = balance;
        self
    }

    pub fn validate(&self) -> SolverResult<()> {
        for (name, value) in [
            ("vortex.rossby", self.rossby),
            ("vortex.burger", self.burger),
            ("vortex.radius", self.radius),
            ("vortex.balance.tolerance", self.balance.tolerance),
        ] {
            if !(value.is_finite() && value > 0.0) {
                return Err(SolverError::invalid_config(format!(
                    "{name} must be positive and finite, got {value}"
                )));
            }
        }
        if self.balance.max_iterations == 0 || self.balance.check_interval == 0 {
            return Err(SolverError::invalid_config(
                "vortex.balance iteration limits must be at least 1",
            ));
        }
        self.profile.validate()
    }
}

impl Default for VortexConfig {
    fn default() -> Self {
        Self {
            rossby: 0.23,
            burger: 10.0,
            radius: 1000e3,
            profile: VortexProfile::default(),
            sign: VortexSign::default(),
            balance: BalanceConfig::default(),
        }
    }
}

/// Vortex placement as written in a run file.
///
/// Either `latitudes` + `counts` (rings of evenly spaced vortices) or
/// `coords` (explicit `[lat, lon]` pairs in degrees).
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct VortexPlacement {
    pub latitudes: Option<Vec<f64>>,
    pub counts: Option<Vec<usize>>,
    pub coords: Option<Vec<(f64, f64)>>,
}

impl VortexPlacement {
    /// Resolve into a validated [`VortexSpec`].
    pub fn to_spec(&self) -> SolverResult<VortexSpec> {
        VortexSpec::from_parts(
            self.latitudes.as_deref(),
            self.counts.as_deref(),
            self.coords.as_deref(),
        )
    }
}

// =============================================================================
// Numerics
// =============================================================================

/// Time stepping and dissipation parameters.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct NumericsConfig {
    /// Courant number C in dt = C Δx / (|v|max + √(g hmax)).
    pub cfl: f64,
    /// Dimensionless biharmonic coefficient γ4 in ν4 = γ4 Δx³ √(g h0).
    pub hyperviscosity: f64,
    /// Peak sponge relaxation rate (1/s). Defaults to f0.
    pub sponge_rate: Option<f64>,
    /// Abort a run after this many steps.
    pub max_steps: Option<usize>,
}

impl NumericsConfig {
    pub fn with_cfl(mut self, cfl: f64) -> Self {
        self.cfl = cfl;
        self
    }

    pub fn with_hyperviscosity(mut self, gamma: f64) -> Self {
        self.hyperviscosity = gamma;
        self
    }

    pub fn with_sponge_rate(mut self, rate: f64) -> Self {
        self.sponge_rate = Some(rate);
        self
    }

    pub fn with_max_steps(mut self, steps: usize) -> Self {
        self.max_steps = Some(steps);
        self
    }

    pub fn validate(&self) -> SolverResult<()> {
        if !(self.cfl.is_finite() && self.cfl > 0.0 && self.cfl <= 1.0) {
            return Err(SolverError::invalid_config(format!(
                "numerics.cfl must lie in (0, 1], got {}",
                self.cfl
            )));
        }
        if !(self.hyperviscosity.is_finite() && self.hyperviscosity >= 0.0) {
            return Err(SolverError::invalid_config(format!(
                "numerics.hyperviscosity must be non-negative, got {}",
                self.hyperviscosity
            )));
        }
        if let Some(rate) = self.sponge_rate
            && !(rate.is_finite() && rate >= 0.0)
        {
            return Err(SolverError::invalid_config(format!(
                "numerics.sponge_rate must be non-negative, got {rate}"
            )));
        }
        if self.max_steps == Some(0) {
            return Err(SolverError::invalid_config(
                "numerics.max_steps must be at least 1",
            ));
        }
        Ok(())
    }
}

impl Default for NumericsConfig {
    fn default() -> Self {
        Self {
            cfl: 0.5,
            hyperviscosity: 1.0 / 256.0,
            sponge_rate: None,
            max_steps: None,
        }
    }
}

// =============================================================================
// Run
// =============================================================================

/// Complete description of one run.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct RunConfig {
    /// Cells along each side of the square domain.
    pub grid_size: usize,
    /// Simulated time, e.g. `"30 days"` or `"1y"`.
    pub duration: String,
    /// Snapshot cadence, e.g. `"1 day"`.
    pub output_interval: String,
    pub planet: PlanetConfig,
    pub domain: DomainConfig,
    pub vortex: VortexConfig,
    pub numerics: NumericsConfig,
    /// Vortex placement; only required when driving a run from a file.
    pub vortices: Option<VortexPlacement>,
}

impl RunConfig {
    pub fn new(grid_size: usize) -> Self {
        Self {
            grid_size,
            ..Self::default()
        }
    }

    /// Load a run configuration from a YAML file.
    pub fn load(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let content = std::fs::read_to_string(path)?;
        Self::from_yaml(&content)
    }

    /// Parse and validate a run configuration from a YAML string.
    pub fn from_yaml(yaml: &str) -> Result<Self, ConfigError> {
        let config: RunConfig = serde_yaml::from_str(yaml)?;
        config.validate()?;
        Ok(config)
    }

    pub fn with_grid_size(mut self, grid_size: usize) -> Self {
        self.grid_size = grid_size;
        self
    }

    pub fn with_duration(mut self, duration: impl Into<String>) -> Self {
        self.duration = duration.into();
        self
    }

    pub fn with_output_interval(mut self, interval: impl Into<String>) -> Self {
        self.output_interval = interval.into();
        self
    }

    pub fn with_planet(mut self, planet: PlanetConfig) -> Self {
        self.planet = planet;
        self
    }

    pub fn with_domain(mut self, domain: DomainConfig) -> Self {
        self.domain = domain;
        self
    }

    pub fn with_vortex(mut self, vortex: VortexConfig) -> Self {
        self.vortex = vortex;
        self
    }

    pub fn with_numerics(mut self, numerics: NumericsConfig) -> Self {
        self.numerics = numerics;
        self
    }

    pub fn with_vortices(mut self, placement: VortexPlacement) -> Self {
        self.vortices = Some(placement);
        self
    }

    /// Check every section, including that both duration strings parse and
    /// the output interval is positive.
    pub fn validate(&self) -> SolverResult<()> {
        if self.grid_size < MIN_GRID_SIZE {
            return Err(SolverError::invalid_config(format!(
                "grid_size must be at least {MIN_GRID_SIZE}, got {}",
                self.grid_size
            )));
        }
        self.planet.validate()?;
        self.domain.validate()?;
        self.vortex.validate()?;
        self.numerics.validate()?;
        resolve_duration(&self.duration)?;
        if resolve_duration(&self.output_interval)? <= 0.0 {
            return Err(SolverError::invalid_config(format!(
                "output_interval must be positive, got '{}'",
                self.output_interval
            )));
        }
        if let Some(placement) = &self.vortices {
            placement.to_spec()?;
        }
        Ok(())
    }

    /// Resting layer thickness implied by the planet and vortex parameters.
    pub fn base_thickness(&self) -> f64 {
        self.vortex.base_thickness(&self.planet)
    }

    /// Peak sponge rate, falling back to f0.
    pub fn sponge_rate(&self) -> f64 {
        self.numerics.sponge_rate.unwrap_or_else(|| self.planet.f0())
    }
}

impl Default for RunConfig {
    fn default() -> Self {
        Self {
            grid_size: 100,
            duration: "30 days".to_string(),
            output_interval: "1 day".to_string(),
            planet: PlanetConfig::default(),
            domain: DomainConfig::default(),
            vortex: VortexConfig::default(),
            numerics: NumericsConfig::default(),
            vortices: None,
        }
    }
}
