//! Conservation properties of the discretization.
//!
//! These tests verify:
//! - Mass (Σ h over the projected grid) is conserved over many steps
//! - Lake at rest stays exactly at rest
//! - A zero time step is the identity

use polar_swe::solver::RhsConfig;
use polar_swe::{
    DomainConfig, FieldExt, PlanetConfig, PolarGrid, RunConfig, RunPhase, Simulation, Snapshot,
    State, VortexConfig, VortexSpec, advance,
};

const G: f64 = 24.8;

fn grid(n: usize) -> PolarGrid {
    PolarGrid::build(n, &PlanetConfig::jupiter(), &DomainConfig::default()).unwrap()
}

#[test]
fn test_mass_conserved_over_many_steps() {
    let config = RunConfig::new(32)
        .with_vortex(VortexConfig::default().with_rossby(0.3))
        .with_output_interval("1 day");
    let mut sim = Simulation::new(config);
    sim.initialize(&VortexSpec::bands(vec![90.0, 82.0], vec![1, 5]).unwrap())
        .unwrap();

    let grid = sim.grid().unwrap().clone();
    let initial_mass = sim.state().unwrap().total_mass(&grid);

    let mut snapshots: Vec<Snapshot> = Vec::new();
    let summary = sim.run("2 days", &mut snapshots).unwrap();
    assert_eq!(summary.outcome, RunPhase::Completed);
    assert!(summary.steps > 100, "only {} steps", summary.steps);

    for snapshot in &snapshots {
        let mass = snapshot.state.total_mass(&grid);
        let rel = (mass - initial_mass).abs() / initial_mass;
        assert!(rel < 1e-10, "mass drift {rel:e} at step {}", snapshot.step);
    }
}

#[test]
fn test_lake_at_rest_stays_at_rest() {
    let grid = grid(20);
    let run = RunConfig::new(20);
    let rhs = RhsConfig::for_grid(&grid, &run);
    let rest = State::at_rest(&grid, run.base_thickness());

    let mut state = rest.clone();
    let mut t = 0.0;
    for step in 1..=20 {
        state = advance(&state, &grid, &rhs, 600.0, t, step).unwrap();
        t += 600.0;
    }
    assert_eq!(state, rest);
}

#[test]
fn test_zero_dt_is_identity() {
    let run = RunConfig::new(24);
    let mut sim = Simulation::new(run.clone());
    sim.initialize(&VortexSpec::points(vec![(86.0, 45.0)]).unwrap())
        .unwrap();
    let grid = sim.grid().unwrap().clone();
    let state = sim.state().unwrap().clone();

    let rhs = RhsConfig::for_grid(&grid, &run);
    let next = advance(&state, &grid, &rhs, 0.0, 0.0, 1).unwrap();
    assert_eq!(next, state);
}

#[test]
fn test_hyperviscosity_conserves_mass() {
    // Σh is untouched by even a very strong biharmonic term.
    let grid = grid(16);
    let mut state = State::at_rest(&grid, 5.0e4);
    state.h[(5, 7)] += 200.0;
    state.h[(9, 3)] -= 150.0;
    let before = state.total_mass(&grid);

    let rhs = RhsConfig::new(G).with_viscosity(1e18);
    let mut t = 0.0;
    for step in 1..=10 {
        state = advance(&state, &grid, &rhs, 100.0, t, step).unwrap();
        t += 100.0;
    }
    let after = state.total_mass(&grid);
    assert!((after - before).abs() / before < 1e-12);
    assert!(state.h.max() < 5.0e4 + 200.0);
}
