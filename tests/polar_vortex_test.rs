//! End-to-end tests of the polar vortex solver.
//!
//! These tests verify:
//! - Grid geometry over several resolutions
//! - A nominal single-vortex run completes with a monotone clock
//! - The PV peak of a short run stays near the initial vortex
//! - Zero-duration runs return the initial state

use polar_swe::{
    DomainConfig, FieldExt, Latitude, Longitude, PlanetConfig, PolarGrid, RunConfig, RunPhase,
    Simulation, Snapshot, VortexSpec, compute_dt, pv_peak,
};

fn single_vortex(lat: f64) -> VortexSpec {
    VortexSpec::bands(vec![lat], vec![1]).unwrap()
}

#[test]
fn test_grid_geometry_across_resolutions() {
    let planet = PlanetConfig::jupiter();
    let domain = DomainConfig::default();

    for n in [8, 17, 32, 50, 64] {
        let grid = PolarGrid::build(n, &planet, &domain).unwrap();

        let areas = grid.cell_areas();
        assert!(areas.min() > 0.0, "non-positive cell area at n = {n}");

        // f = f0 cos(colatitude) grows towards the pole along the centre row.
        let f = grid.coriolis_centres();
        let mid = n / 2;
        for i in 1..=mid {
            assert!(
                f[(mid, i)] >= f[(mid, i - 1)],
                "Coriolis not monotone in latitude at n = {n}, column {i}"
            );
        }
        assert!(f.min() > 0.0, "Coriolis changes sign inside the cap at n = {n}");
        assert!(f.max() <= grid.f0());
    }
}

#[test]
fn test_nominal_run_completes() {
    let config = RunConfig::new(50).with_output_interval("1h");
    let mut sim = Simulation::new(config);
    sim.initialize(&single_vortex(85.0)).unwrap();

    let mut snapshots: Vec<Snapshot> = Vec::new();
    let summary = sim.run("3h", &mut snapshots).unwrap();

    assert_eq!(summary.outcome, RunPhase::Completed);
    assert_eq!(sim.phase(), RunPhase::Completed);
    assert!(summary.steps > 0);
    assert!((summary.elapsed - 3.0 * 3600.0).abs() < 1e-6);
    assert!(sim.state().unwrap().h.min() > 0.0);
}

#[test]
fn test_ten_step_scenario() {
    let config = RunConfig::new(50);
    let mut sim = Simulation::new(config.clone());
    sim.initialize(&single_vortex(85.0)).unwrap();

    let grid = sim.grid().unwrap().clone();
    let initial = sim.state().unwrap().clone();
    let dt0 = compute_dt(&initial, &grid, config.planet.gravity, config.numerics.cfl);
    assert!(dt0.is_finite() && dt0 > 0.0);

    // A snapshot at every step so the clock can be followed.
    let mut sim = Simulation::new(config.with_output_interval(format!("{}s", 0.5 * dt0)))
        .with_grid(grid.clone());
    sim.initialize_with_state(initial.clone()).unwrap();

    let mut snapshots: Vec<Snapshot> = Vec::new();
    let summary = sim.run(&format!("{}s", 10.0 * dt0), &mut snapshots).unwrap();

    assert_eq!(summary.outcome, RunPhase::Completed);
    assert!(
        (9..=12).contains(&summary.steps),
        "expected about 10 steps, took {}",
        summary.steps
    );
    assert_eq!(snapshots.len(), summary.steps + 1);
    for pair in snapshots.windows(2) {
        assert!(pair[1].time > pair[0].time);
        assert!(pair[1].step > pair[0].step);
    }
    assert!((sim.clock().time - 10.0 * dt0).abs() < 1e-6 * dt0);

    let centre = grid.project(Latitude::new(85.0), Longitude::new(0.0));
    let before = pv_peak(&initial, &grid);
    let after = pv_peak(sim.state().unwrap(), &grid);

    let distance = |p: (f64, f64), q: (f64, f64)| ((p.0 - q.0).powi(2) + (p.1 - q.1).powi(2)).sqrt();
    assert!(distance(before.position, centre) <= 2.0 * grid.dx());
    assert!(distance(after.position, before.position) <= 2.0 * grid.dx());
    assert!(after.anomaly > 0.0, "cyclone should keep a positive PV anomaly");
}

#[test]
fn test_zero_duration_returns_initial_state() {
    let mut sim = Simulation::new(RunConfig::new(24));
    sim.initialize(&single_vortex(85.0)).unwrap();
    let initial = sim.state().unwrap().clone();

    let mut snapshots: Vec<Snapshot> = Vec::new();
    let summary = sim.run("0s", &mut snapshots).unwrap();

    assert_eq!(summary.steps, 0);
    assert_eq!(snapshots.len(), 1);
    assert_eq!(snapshots[0].state, initial);
    assert_eq!(sim.state().unwrap(), &initial);
}

#[test]
fn test_ring_of_vortices_initializes() {
    let config = RunConfig::new(48);
    let mut sim = Simulation::new(config);
    sim.initialize(&VortexSpec::bands(vec![90.0, 83.0], vec![1, 8]).unwrap())
        .unwrap();

    let state = sim.state().unwrap();
    assert!(state.h.min() > 0.0);
    assert!(state.h.first_non_finite().is_none());
    assert!(state.max_speed() > 0.0);
}

#[test]
fn test_vortex_outside_domain_fails() {
    let config = RunConfig::new(24).with_domain(DomainConfig::new(80.0, 82.0));
    let mut sim = Simulation::new(config);
    let err = sim.initialize(&single_vortex(70.0)).unwrap_err();

    assert!(err.is_configuration());
    assert_eq!(sim.phase(), RunPhase::Failed);
}
