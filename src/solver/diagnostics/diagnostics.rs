//! Runtime diagnostics for polar shallow water runs.
//!
//! Provides functions and types for computing and tracking:
//! - Conservation quantities (mass, energy, potential enstrophy)
//! - CFL number
//! - Solution bounds (max speed, thickness range, Froude number)
//!
//! # Example
//!
//! ```ignore
//! use polar_swe::solver::{SWDiagnostics, DiagnosticsTracker};
//!
//! let diag = SWDiagnostics::compute(&state, &grid, g, dt);
//! let mut tracker = DiagnosticsTracker::new(diag);
//! // ... simulation loop ...
//! tracker.update(time, SWDiagnostics::compute(&state, &grid, g, dt));
//! tracker.log_summary();
//! ```

use tracing::info;

use super::fields::potential_vorticity;
use crate::mesh::PolarGrid;
use crate::solver::State;
use crate::types::FieldExt;

/// Diagnostic quantities of a state.
#[derive(Clone, Debug, PartialEq)]
pub struct SWDiagnostics {
    /// Σ h dx dy over projected cells, conserved exactly by the scheme (m³)
    pub total_mass: f64,
    /// Σ h k dx dy over true spherical cell areas (m³)
    pub spherical_mass: f64,
    /// Total energy (kinetic + potential)
    pub total_energy: f64,
    /// Σ ½ h |u|² dA
    pub kinetic_energy: f64,
    /// Σ ½ g h² dA
    pub potential_energy: f64,
    /// Σ ½ h q² dA
    pub potential_enstrophy: f64,
    /// Maximum velocity magnitude at cell centres
    pub max_velocity: f64,
    /// Minimum thickness
    pub min_depth: f64,
    /// Maximum thickness
    pub max_depth: f64,
    /// (|u|max + √(g hmax)) dt / Δx
    pub cfl_number: f64,
    /// Maximum Froude number |u| / √(g h)
    pub max_froude: f64,
}

impl SWDiagnostics {
    /// Compute all diagnostics of `state`.
    ///
    /// # Arguments
    /// * `state` - Current state
    /// * `grid` - Polar grid
    /// * `g` - Reduced gravity
    /// * `dt` - Current timestep (for the CFL number)
    pub fn compute(state: &State, grid: &PolarGrid, g: f64, dt: f64) -> Self {
        let area = grid.projected_cell_area();
        let k = grid.map_factor();
        let (uc, vc) = state.centre_velocity();
        let q = potential_vorticity(state, grid);

        let mut total_mass = 0.0;
        let mut spherical_mass = 0.0;
        let mut kinetic_energy = 0.0;
        let mut potential_energy = 0.0;
        let mut potential_enstrophy = 0.0;
        let mut max_velocity = 0.0_f64;
        let mut max_froude = 0.0_f64;

        let h = &state.h;
        for j in 0..h.nrows() {
            for i in 0..h.ncols() {
                let hh = h[(j, i)];
                let speed_sq = uc[(j, i)].powi(2) + vc[(j, i)].powi(2);
                let speed = speed_sq.sqrt();

                total_mass += hh * area;
                spherical_mass += hh * k[(j, i)] * area;
                kinetic_energy += 0.5 * hh * speed_sq * area;
                potential_energy += 0.5 * g * hh * hh * area;
                potential_enstrophy += 0.5 * hh * q[(j, i)].powi(2) * area;

                max_velocity = max_velocity.max(speed);
                if hh > 0.0 {
                    max_froude = max_froude.max(speed / (g * hh).sqrt());
                }
            }
        }

        let max_depth = h.max();
        let max_wave_speed = max_velocity + (g * max_depth.max(0.0)).sqrt();

        Self {
            total_mass,
            spherical_mass,
            total_energy: kinetic_energy + potential_energy,
            kinetic_energy,
            potential_energy,
            potential_enstrophy,
            max_velocity,
            min_depth: h.min(),
            max_depth,
            cfl_number: max_wave_speed * dt / grid.min_spacing(),
            max_froude,
        }
    }

    /// Format diagnostics as a single-line summary.
    pub fn summary_line(&self) -> String {
        format!(
            "M={:.6e} E={:.4e} Z={:.4e} |u|_max={:.2} h=[{:.1},{:.1}] CFL={:.3} Fr={:.3}",
            self.total_mass,
            self.total_energy,
            self.potential_enstrophy,
            self.max_velocity,
            self.min_depth,
            self.max_depth,
            self.cfl_number,
            self.max_froude
        )
    }
}

/// Track diagnostics over time for monitoring conservation and stability.
#[derive(Clone, Debug)]
pub struct DiagnosticsTracker {
    initial: SWDiagnostics,
    current: SWDiagnostics,
    current_time: f64,
    n_updates: usize,
    max_cfl_seen: f64,
    max_velocity_seen: f64,
    min_depth_seen: f64,
}

impl DiagnosticsTracker {
    /// Create a new tracker with initial diagnostics.
    pub fn new(initial: SWDiagnostics) -> Self {
        Self {
            max_cfl_seen: initial.cfl_number,
            max_velocity_seen: initial.max_velocity,
            min_depth_seen: initial.min_depth,
            current: initial.clone(),
            initial,
            current_time: 0.0,
            n_updates: 0,
        }
    }

    /// Update tracker with new diagnostics.
    pub fn update(&mut self, time: f64, diag: SWDiagnostics) {
        self.current_time = time;
        self.n_updates += 1;
        self.max_cfl_seen = self.max_cfl_seen.max(diag.cfl_number);
        self.max_velocity_seen = self.max_velocity_seen.max(diag.max_velocity);
        self.min_depth_seen = self.min_depth_seen.min(diag.min_depth);
        self.current = diag;
    }

    /// Relative mass conservation error.
    pub fn mass_error(&self) -> f64 {
        relative_change(self.initial.total_mass, self.current.total_mass).abs()
    }

    /// Relative energy change (negative under dissipation).
    pub fn energy_change(&self) -> f64 {
        relative_change(self.initial.total_energy, self.current.total_energy)
    }

    /// Relative potential enstrophy change.
    pub fn enstrophy_change(&self) -> f64 {
        relative_change(
            self.initial.potential_enstrophy,
            self.current.potential_enstrophy,
        )
    }

    pub fn current(&self) -> &SWDiagnostics {
        &self.current
    }

    pub fn initial(&self) -> &SWDiagnostics {
        &self.initial
    }

    pub fn max_cfl_seen(&self) -> f64 {
        self.max_cfl_seen
    }

    /// Log a summary of conservation errors and extrema.
    pub fn log_summary(&self) {
        info!(
            time = self.current_time,
            updates = self.n_updates,
            mass_error = self.mass_error(),
            energy_change = self.energy_change(),
            enstrophy_change = self.enstrophy_change(),
            max_cfl = self.max_cfl_seen,
            max_velocity = self.max_velocity_seen,
            min_depth = self.min_depth_seen,
            "diagnostics summary"
        );
    }
}

fn relative_change(initial: f64, current: f64) -> f64 {
    if initial.abs() > 1e-300 {
        (current - initial) / initial.abs()
    } else {
        0.0
    }
}
