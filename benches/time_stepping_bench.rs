//! Benchmarks for time stepping and diagnostics.
//!
//! Run with: `cargo bench --bench time_stepping_bench`
//!
//! Benchmarks one SSP-RK3 step, a short run and the diagnostic pass that
//! accompanies every snapshot.

use criterion::{BenchmarkId, Criterion, black_box, criterion_group, criterion_main};
use polar_swe::config::RunConfig;
use polar_swe::init::VortexSpec;
use polar_swe::simulation::{Simulation, Snapshot};
use polar_swe::solver::{RhsConfig, SWDiagnostics, State, compute_dt, potential_vorticity};
use polar_swe::time::advance;

fn initialized(n: usize) -> Simulation {
    let mut sim = Simulation::new(RunConfig::new(n).with_output_interval("1 day"));
    sim.initialize(&VortexSpec::bands(vec![90.0, 83.0], vec![1, 8]).unwrap())
        .unwrap();
    sim
}

/// Benchmark a single SSP-RK3 step at the CFL time step.
fn bench_ssp_rk3_step(c: &mut Criterion) {
    let mut group = c.benchmark_group("ssp_rk3_step");
    group.sample_size(30);

    for n in [32, 64] {
        let sim = initialized(n);
        let grid = sim.grid().unwrap().clone();
        let state: State = sim.state().unwrap().clone();
        let rhs = RhsConfig::for_grid(&grid, sim.config());
        let dt = compute_dt(&state, &grid, 24.8, 0.5);

        group.bench_with_input(BenchmarkId::new("step", n), &n, |b, _| {
            b.iter(|| advance(black_box(&state), &grid, &rhs, black_box(dt), 0.0, 1).unwrap())
        });
    }

    group.finish();
}

/// Benchmark a short run through the controller.
fn bench_short_run(c: &mut Criterion) {
    let mut group = c.benchmark_group("short_run");
    group.sample_size(10);

    let n = 32;
    group.bench_function(BenchmarkId::new("6h", n), |b| {
        b.iter_batched(
            || initialized(n),
            |mut sim| {
                let mut snapshots: Vec<Snapshot> = Vec::new();
                sim.run("6h", &mut snapshots).unwrap()
            },
            criterion::BatchSize::LargeInput,
        )
    });

    group.finish();
}

/// Benchmark the per-snapshot diagnostics.
fn bench_diagnostics(c: &mut Criterion) {
    let mut group = c.benchmark_group("diagnostics");

    let sim = initialized(64);
    let grid = sim.grid().unwrap().clone();
    let state = sim.state().unwrap().clone();

    group.bench_function("sw_diagnostics", |b| {
        b.iter(|| SWDiagnostics::compute(black_box(&state), &grid, 24.8, 600.0))
    });
    group.bench_function("potential_vorticity", |b| {
        b.iter(|| potential_vorticity(black_box(&state), &grid))
    });

    group.finish();
}

criterion_group!(
    benches,
    bench_ssp_rk3_step,
    bench_short_run,
    bench_diagnostics
);
criterion_main!(benches);
