//! Simulation runner implementation.
//!
//! A [`Simulation`] owns one run's configuration, grid, state and clock, and
//! moves through the phases
//!
//! ```text
//! Idle ──initialize──▶ Initialized ──run──▶ Running ──▶ Completed
//!   │                      │                   ├──────▶ Aborted  (cancel flag)
//!   └──────────────────────┴───────────────────┴──────▶ Failed
//! ```
//!
//! Each loop iteration computes the CFL time step, clamps it so the run ends
//! exactly on the requested duration, advances the state and hands a
//! snapshot to the sink whenever an output boundary has been crossed.

use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::mpsc;
use std::time::Instant;

use tracing::{debug, info, warn};

use crate::analysis::{StabilityMonitor, StabilityThresholds, find_violation};
use crate::config::RunConfig;
use crate::error::{SolverError, SolverResult};
use crate::init::{VortexInitializer, VortexSpec};
use crate::mesh::PolarGrid;
use crate::solver::{DiagnosticsTracker, RhsConfig, SWDiagnostics, State, compute_dt};
use crate::time::{advance, format_duration, resolve_duration};

// =============================================================================
// Phases, clock and snapshots
// =============================================================================

/// Lifecycle phase of a [`Simulation`].
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum RunPhase {
    Idle,
    Initialized,
    Running,
    Completed,
    Failed,
    /// Stopped between steps by the cancel flag.
    Aborted,
}

/// Elapsed physical time and step count of the current run.
#[derive(Clone, Copy, Debug, Default, PartialEq)]
pub struct Clock {
    /// Seconds since the start of the run
    pub time: f64,
    /// Completed steps
    pub step: usize,
}

/// Immutable copy of the state at one instant.
#[derive(Clone, Debug, PartialEq)]
pub struct Snapshot {
    pub step: usize,
    pub time: f64,
    pub state: State,
}

/// Receiver of snapshots emitted during a run.
pub trait SnapshotSink {
    /// Take ownership of one snapshot.
    ///
    /// An error stops the run, which then ends in [`RunPhase::Failed`].
    fn accept(&mut self, grid: &PolarGrid, snapshot: Snapshot) -> SolverResult<()>;

    /// Called once after the last snapshot of a completed or aborted run.
    fn finish(&mut self, _grid: &PolarGrid) -> SolverResult<()> {
        Ok(())
    }
}

impl SnapshotSink for Vec<Snapshot> {
    fn accept(&mut self, _grid: &PolarGrid, snapshot: Snapshot) -> SolverResult<()> {
        self.push(snapshot);
        Ok(())
    }
}

impl SnapshotSink for mpsc::Sender<Snapshot> {
    fn accept(&mut self, _grid: &PolarGrid, snapshot: Snapshot) -> SolverResult<()> {
        self.send(snapshot)
            .map_err(|_| SolverError::SnapshotSink("snapshot receiver disconnected".into()))
    }
}

/// Outcome statistics of one call to [`Simulation::run`].
#[derive(Clone, Debug, PartialEq)]
pub struct RunSummary {
    /// Steps taken
    pub steps: usize,
    /// Physical time simulated (s)
    pub elapsed: f64,
    /// Smallest step used (s); infinite when no step was taken
    pub dt_min: f64,
    /// Largest step used (s)
    pub dt_max: f64,
    /// Snapshots handed to the sink, including the initial one
    pub snapshots: usize,
    /// [`RunPhase::Completed`] or [`RunPhase::Aborted`]
    pub outcome: RunPhase,
    /// Wall-clock duration of the run (s)
    pub wall_time: f64,
}

// =============================================================================
// Simulation Runner
// =============================================================================

/// Driver for one polar vortex experiment.
///
/// # Example
/// ```no_run
/// use polar_swe::config::RunConfig;
/// use polar_swe::init::VortexSpec;
/// use polar_swe::simulation::{Simulation, Snapshot};
///
/// let mut sim = Simulation::new(RunConfig::new(64));
/// sim.initialize(&VortexSpec::bands(vec![90.0, 84.0], vec![1, 5])?)?;
///
/// let mut snapshots: Vec<Snapshot> = Vec::new();
/// let summary = sim.run("10 days", &mut snapshots)?;
/// println!("{} steps, {} snapshots", summary.steps, snapshots.len());
/// # Ok::<(), polar_swe::SolverError>(())
/// ```
pub struct Simulation {
    config: RunConfig,
    phase: RunPhase,
    grid: Option<Arc<PolarGrid>>,
    state: Option<State>,
    clock: Clock,
    cancel: Arc<AtomicBool>,
}

impl Simulation {
    /// A new, idle simulation. The configuration is validated by
    /// [`initialize`](Self::initialize).
    pub fn new(config: RunConfig) -> Self {
        Self {
            config,
            phase: RunPhase::Idle,
            grid: None,
            state: None,
            clock: Clock::default(),
            cancel: Arc::new(AtomicBool::new(false)),
        }
    }

    /// Reuse an already built grid, e.g. across a parameter sweep.
    ///
    /// Ignored by `initialize` unless it was built from the same grid size,
    /// planet and domain as the run configuration.
    pub fn with_grid(mut self, grid: Arc<PolarGrid>) -> Self {
        self.grid = Some(grid);
        self
    }

    pub fn config(&self) -> &RunConfig {
        &self.config
    }

    pub fn phase(&self) -> RunPhase {
        self.phase
    }

    pub fn clock(&self) -> Clock {
        self.clock
    }

    pub fn grid(&self) -> Option<&Arc<PolarGrid>> {
        self.grid.as_ref()
    }

    pub fn state(&self) -> Option<&State> {
        self.state.as_ref()
    }

    /// Flag that stops a run between steps when set to `true`.
    ///
    /// The flag is only cleared by a successful (re-)initialization, so a
    /// flag raised before [`run`](Self::run) makes the run abort before its
    /// first step.
    pub fn cancel_handle(&self) -> Arc<AtomicBool> {
        Arc::clone(&self.cancel)
    }

    /// Build the grid and the balanced initial state for `spec`.
    ///
    /// # Errors
    ///
    /// `InvalidConfiguration` from validation, grid construction or the
    /// vortex initializer. The simulation is then [`RunPhase::Failed`].
    pub fn initialize(&mut self, spec: &VortexSpec) -> SolverResult<()> {
        let result = self.prepare_grid().and_then(|grid| {
            let state = VortexInitializer::new(&grid, &self.config.vortex).initialize_spec(spec)?;
            Ok((grid, state))
        });
        self.finish_initialize(result)
    }

    /// Initialize from the `vortices` section of the run configuration.
    pub fn initialize_from_config(&mut self) -> SolverResult<()> {
        let spec = match &self.config.vortices {
            Some(placement) => placement.to_spec(),
            None => Err(SolverError::invalid_config(
                "run configuration has no vortices section",
            )),
        };
        match spec {
            Ok(spec) => self.initialize(&spec),
            Err(e) => {
                self.phase = RunPhase::Failed;
                Err(e)
            }
        }
    }

    /// Start from a caller-supplied state instead of a vortex field.
    ///
    /// # Errors
    ///
    /// `InvalidConfiguration` if the state does not fit the grid, holds a
    /// non-finite value or has a non-positive thickness.
    pub fn initialize_with_state(&mut self, state: State) -> SolverResult<()> {
        let result = self.prepare_grid().and_then(|grid| {
            if !state.matches(&grid) {
                return Err(SolverError::invalid_config(format!(
                    "state of size {} does not match grid of size {}",
                    state.size(),
                    grid.size()
                )));
            }
            if let Some((field, detail)) = find_violation(&state) {
                return Err(SolverError::invalid_config(format!(
                    "initial state field '{field}': {detail}"
                )));
            }
            Ok((grid, state))
        });
        self.finish_initialize(result)
    }

    fn prepare_grid(&self) -> SolverResult<Arc<PolarGrid>> {
        self.config.validate()?;
        match &self.grid {
            Some(grid)
                if grid.size() == self.config.grid_size
                    && grid.planet() == &self.config.planet
                    && grid.domain() == &self.config.domain =>
            {
                Ok(Arc::clone(grid))
            }
            _ => PolarGrid::build(
                self.config.grid_size,
                &self.config.planet,
                &self.config.domain,
            )
            .map(Arc::new),
        }
    }

    fn finish_initialize(
        &mut self,
        result: SolverResult<(Arc<PolarGrid>, State)>,
    ) -> SolverResult<()> {
        match result {
            Ok((grid, state)) => {
                self.grid = Some(grid);
                self.state = Some(state);
                self.clock = Clock::default();
                self.cancel.store(false, Ordering::Relaxed);
                self.phase = RunPhase::Initialized;
                Ok(())
            }
            Err(e) => {
                self.phase = RunPhase::Failed;
                Err(e)
            }
        }
    }

    /// Run for the configured `duration`.
    pub fn run_configured(&mut self, sink: &mut impl SnapshotSink) -> SolverResult<RunSummary> {
        let duration = self.config.duration.clone();
        self.run(&duration, sink)
    }

    /// Advance the initialized state by `duration` (e.g. `"10 days"`).
    ///
    /// The initial state is emitted as snapshot 0, then one snapshot each
    /// time an `output_interval` boundary is crossed. A zero duration emits
    /// only the initial snapshot.
    ///
    /// # Errors
    ///
    /// - `InvalidConfiguration` if not initialized or `duration` is invalid
    /// - `NumericalInstability` if a step produces an invalid state
    /// - `StepLimit` if `numerics.max_steps` is exceeded
    /// - `SnapshotSink` if the sink rejects a snapshot
    ///
    /// Every error leaves the simulation in [`RunPhase::Failed`].
    pub fn run(
        &mut self,
        duration: &str,
        sink: &mut impl SnapshotSink,
    ) -> SolverResult<RunSummary> {
        if self.phase != RunPhase::Initialized {
            return Err(SolverError::invalid_config(format!(
                "run requires an initialized simulation, phase is {:?}",
                self.phase
            )));
        }
        let (Some(grid), Some(mut state)) = (self.grid.clone(), self.state.take()) else {
            return Err(SolverError::invalid_config("simulation has no state"));
        };

        self.phase = RunPhase::Running;
        self.clock = Clock::default();

        let result = self.run_loop(&grid, &mut state, duration, sink);
        self.state = Some(state);

        match result {
            Ok(summary) => {
                self.phase = summary.outcome;
                Ok(summary)
            }
            Err(e) => {
                self.phase = RunPhase::Failed;
                Err(e)
            }
        }
    }

    fn run_loop(
        &mut self,
        grid: &PolarGrid,
        state: &mut State,
        duration: &str,
        sink: &mut impl SnapshotSink,
    ) -> SolverResult<RunSummary> {
        let target = resolve_duration(duration)?;
        let interval = resolve_duration(&self.config.output_interval)?;
        let g = self.config.planet.gravity;
        let cfl = self.config.numerics.cfl;
        let rhs = RhsConfig::for_grid(grid, &self.config);
        let h0 = self.config.base_thickness();

        let mut monitor = StabilityMonitor::new(StabilityThresholds::for_depth(h0, g));
        let mut tracker = DiagnosticsTracker::new(SWDiagnostics::compute(state, grid, g, 0.0));

        info!(
            grid_size = grid.size(),
            duration = %format_duration(target),
            output_interval = %format_duration(interval),
            viscosity = rhs.viscosity,
            sponge_rate = rhs.sponge_rate,
            "starting run"
        );

        let start_wall = Instant::now();
        let mut dt_min_used = f64::INFINITY;
        let mut dt_max_used: f64 = 0.0;
        let mut snapshots = 0;
        let mut next_output = interval;
        let mut outcome = RunPhase::Completed;

        sink.accept(
            grid,
            Snapshot {
                step: 0,
                time: 0.0,
                state: state.clone(),
            },
        )?;
        snapshots += 1;

        while self.clock.time < target {
            if self.cancel.load(Ordering::Relaxed) {
                warn!(step = self.clock.step, time = self.clock.time, "run cancelled");
                outcome = RunPhase::Aborted;
                break;
            }
            if let Some(max_steps) = self.config.numerics.max_steps
                && self.clock.step >= max_steps
            {
                return Err(SolverError::StepLimit { steps: max_steps });
            }

            let step = self.clock.step + 1;
            let dt_cfl = compute_dt(state, grid, g, cfl);
            if !(dt_cfl.is_finite() && dt_cfl > 0.0) {
                return Err(SolverError::instability(
                    step,
                    "dt",
                    format!("CFL time step is {dt_cfl}"),
                ));
            }

            let remaining = target - self.clock.time;
            let dt = dt_cfl.min(remaining);
            *state = advance(state, grid, &rhs, dt, self.clock.time, step)?;

            self.clock.step = step;
            self.clock.time = if dt >= remaining {
                target
            } else {
                self.clock.time + dt
            };
            dt_min_used = dt_min_used.min(dt);
            dt_max_used = dt_max_used.max(dt);

            let status = monitor.check(state, dt_cfl);
            if !status.is_stable {
                monitor.log_report(self.clock.time, step);
            }

            if self.clock.time >= next_output * (1.0 - 1e-12) {
                next_output = next_output_after(self.clock.time, interval);
                let diag = SWDiagnostics::compute(state, grid, g, dt);
                debug!(
                    step,
                    time = %format_duration(self.clock.time),
                    "{}",
                    diag.summary_line()
                );
                tracker.update(self.clock.time, diag);
                sink.accept(
                    grid,
                    Snapshot {
                        step,
                        time: self.clock.time,
                        state: state.clone(),
                    },
                )?;
                snapshots += 1;
            }
        }

        tracker.update(
            self.clock.time,
            SWDiagnostics::compute(state, grid, g, dt_max_used),
        );
        tracker.log_summary();

        sink.finish(grid)?;

        let summary = RunSummary {
            steps: self.clock.step,
            elapsed: self.clock.time,
            dt_min: dt_min_used,
            dt_max: dt_max_used,
            snapshots,
            outcome,
            wall_time: start_wall.elapsed().as_secs_f64(),
        };
        info!(
            steps = summary.steps,
            elapsed = %format_duration(summary.elapsed),
            snapshots = summary.snapshots,
            wall_time = summary.wall_time,
            outcome = ?summary.outcome,
            "run finished"
        );
        Ok(summary)
    }
}

/// First output boundary strictly after `time` on the lattice `k * interval`.
///
/// Boundaries within a relative 1e-12 of `time` count as reached.
fn next_output_after(time: f64, interval: f64) -> f64 {
    ((time * (1.0 + 1e-12) / interval).floor() + 1.0) * interval
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::{DomainConfig, NumericsConfig};

    fn small_config() -> RunConfig {
        RunConfig::new(16)
            .with_domain(DomainConfig::new(80.0, 82.0))
            .with_output_interval("2h")
    }

    #[test]
    fn test_phases() {
        let mut sim = Simulation::new(small_config());
        assert_eq!(sim.phase(), RunPhase::Idle);

        let mut sink = Vec::new();
        assert!(sim.run("1h", &mut sink).is_err());
        assert_eq!(sim.phase(), RunPhase::Idle);

        sim.initialize(&VortexSpec::points(vec![(90.0, 0.0)]).unwrap())
            .unwrap();
        assert_eq!(sim.phase(), RunPhase::Initialized);

        let summary = sim.run("5h", &mut sink).unwrap();
        assert_eq!(sim.phase(), RunPhase::Completed);
        assert_eq!(summary.outcome, RunPhase::Completed);
        assert_eq!(summary.elapsed, 5.0 * 3600.0);
        assert_eq!(sim.clock().time, 5.0 * 3600.0);
        assert!(summary.steps > 0);
        assert!(summary.dt_min <= summary.dt_max);
        // t = 0, 2h, 4h
        assert_eq!(summary.snapshots, 3);
        assert_eq!(sink.len(), 3);
        assert!(sink.windows(2).all(|w| w[0].time < w[1].time && w[0].step < w[1].step));
    }

    #[test]
    fn test_failed_initialize() {
        let mut sim = Simulation::new(RunConfig::new(2));
        let err = sim
            .initialize(&VortexSpec::points(vec![(90.0, 0.0)]).unwrap())
            .unwrap_err();
        assert!(err.is_configuration());
        assert_eq!(sim.phase(), RunPhase::Failed);
    }

    #[test]
    fn test_initialize_from_config_requires_vortices() {
        let mut sim = Simulation::new(small_config());
        assert!(sim.initialize_from_config().is_err());
        assert_eq!(sim.phase(), RunPhase::Failed);
    }

    #[test]
    fn test_zero_duration_run() {
        let mut sim = Simulation::new(small_config());
        sim.initialize(&VortexSpec::points(vec![(90.0, 0.0)]).unwrap())
            .unwrap();
        let initial = sim.state().unwrap().clone();

        let mut sink = Vec::new();
        let summary = sim.run("0s", &mut sink).unwrap();
        assert_eq!(summary.steps, 0);
        assert_eq!(summary.elapsed, 0.0);
        assert_eq!(sink.len(), 1);
        assert_eq!(sim.state().unwrap(), &initial);
    }

    #[test]
    fn test_step_limit() {
        let config = small_config()
            .with_numerics(NumericsConfig::default().with_max_steps(3));
        let mut sim = Simulation::new(config);
        sim.initialize(&VortexSpec::points(vec![(90.0, 0.0)]).unwrap())
            .unwrap();

        let err = sim.run("30 days", &mut Vec::new()).unwrap_err();
        assert_eq!(err, SolverError::StepLimit { steps: 3 });
        assert_eq!(sim.phase(), RunPhase::Failed);
        assert_eq!(sim.clock().step, 3);
    }

    #[test]
    fn test_cancel_before_first_step() {
        let mut sim = Simulation::new(small_config());
        sim.initialize(&VortexSpec::points(vec![(90.0, 0.0)]).unwrap())
            .unwrap();

        struct CancelOnFirst(Arc<AtomicBool>, usize);
        impl SnapshotSink for CancelOnFirst {
            fn accept(&mut self, _grid: &PolarGrid, _snapshot: Snapshot) -> SolverResult<()> {
                self.0.store(true, Ordering::Relaxed);
                self.1 += 1;
                Ok(())
            }
        }

        let mut sink = CancelOnFirst(sim.cancel_handle(), 0);
        let summary = sim.run("1 day", &mut sink).unwrap();
        assert_eq!(summary.outcome, RunPhase::Aborted);
        assert_eq!(summary.steps, 0);
        assert_eq!(sim.phase(), RunPhase::Aborted);
        assert_eq!(sink.1, 1);
    }

    #[test]
    fn test_channel_sink() {
        let mut sim = Simulation::new(small_config());
        sim.initialize(&VortexSpec::points(vec![(90.0, 0.0)]).unwrap())
            .unwrap();

        let (mut tx, rx) = mpsc::channel();
        sim.run("3h", &mut tx).unwrap();
        drop(tx);
        let received: Vec<Snapshot> = rx.iter().collect();
        assert_eq!(received.len(), 2);
        assert_eq!(received[0].step, 0);

        let (mut tx, rx) = mpsc::channel::<Snapshot>();
        drop(rx);
        let mut sim = Simulation::new(small_config());
        sim.initialize(&VortexSpec::points(vec![(90.0, 0.0)]).unwrap())
            .unwrap();
        let err = sim.run("3h", &mut tx).unwrap_err();
        assert!(matches!(err, SolverError::SnapshotSink(_)));
    }

    #[test]
    fn test_shared_grid_is_reused() {
        let config = small_config();
        let grid = Arc::new(
            PolarGrid::build(config.grid_size, &config.planet, &config.domain).unwrap(),
        );
        let mut sim = Simulation::new(config).with_grid(Arc::clone(&grid));
        sim.initialize(&VortexSpec::points(vec![(90.0, 0.0)]).unwrap())
            .unwrap();
        assert!(Arc::ptr_eq(sim.grid().unwrap(), &grid));
    }

    #[test]
    fn test_next_output_after() {
        assert_eq!(next_output_after(0.0, 10.0), 10.0);
        assert_eq!(next_output_after(10.0, 10.0), 20.0);
        assert_eq!(next_output_after(10.0 - 1e-12, 10.0), 20.0);
        assert_eq!(next_output_after(35.0, 10.0), 40.0);
        // Many boundaries inside one step are skipped at once
        let next = next_output_after(3600.0, 1e-11);
        assert!(next > 3600.0 && next - 3600.0 <= 2e-11 + 3600.0 * 1e-12);
    }

    #[test]
    fn test_output_interval_shorter_than_step() {
        let config = small_config().with_output_interval("0.00000000001s");
        let mut sim = Simulation::new(config);
        sim.initialize(&VortexSpec::points(vec![(90.0, 0.0)]).unwrap())
            .unwrap();

        let mut sink = Vec::new();
        let summary = sim.run("1h", &mut sink).unwrap();
        assert_eq!(summary.outcome, RunPhase::Completed);
        assert!(summary.steps > 0);
        // One snapshot per step plus the initial one
        assert_eq!(summary.snapshots, summary.steps + 1);
        assert_eq!(sink.len(), summary.steps + 1);
        assert_eq!(sink.last().unwrap().time, 3600.0);
    }

    #[test]
    fn test_initialize_with_non_physical_state() {
        let config = small_config();
        let grid = PolarGrid::build(config.grid_size, &config.planet, &config.domain).unwrap();

        let mut state = State::at_rest(&grid, 1.0e4);
        state.h[(3, 3)] = -1.0;
        let mut sim = Simulation::new(config.clone());
        let err = sim.initialize_with_state(state).unwrap_err();
        assert!(err.is_configuration());
        assert!(err.to_string().contains("'h'"), "{err}");
        assert!(err.to_string().contains("(3, 3)"), "{err}");
        assert_eq!(sim.phase(), RunPhase::Failed);

        let mut state = State::at_rest(&grid, 1.0e4);
        state.v[(5, 2)] = f64::INFINITY;
        let mut sim = Simulation::new(config.clone());
        let err = sim.initialize_with_state(state).unwrap_err();
        assert!(err.to_string().contains("'v'"), "{err}");
        assert_eq!(sim.phase(), RunPhase::Failed);

        let mut sim = Simulation::new(config);
        sim.initialize_with_state(State::at_rest(&grid, 1.0e4)).unwrap();
        assert_eq!(sim.phase(), RunPhase::Initialized);
    }

    #[test]
    fn test_overflowing_state_fails_on_first_step() {
        // Finite but huge flow: |u|²/2 overflows in the first tendency.
        let config = small_config();
        let grid = PolarGrid::build(config.grid_size, &config.planet, &config.domain).unwrap();
        let mut state = State::at_rest(&grid, 1.0e4);
        state.u[(8, 8)] = 1.0e200;

        let mut sim = Simulation::new(config);
        sim.initialize_with_state(state).unwrap();
        let mut sink = Vec::new();
        let err = sim.run("1 day", &mut sink).unwrap_err();

        match err {
            SolverError::NumericalInstability { step, field, .. } => {
                assert_eq!(step, 1);
                assert!(["h", "u", "v"].contains(&field), "field {field}");
            }
            other => panic!("unexpected error {other:?}"),
        }
        assert_eq!(sim.phase(), RunPhase::Failed);
        assert_eq!(sim.clock().step, 0);
        assert_eq!(sink.len(), 1);
    }

    #[test]
    fn test_cancel_flag_raised_before_run() {
        let mut sim = Simulation::new(small_config());
        sim.initialize(&VortexSpec::points(vec![(90.0, 0.0)]).unwrap())
            .unwrap();
        let initial = sim.state().unwrap().clone();

        sim.cancel_handle().store(true, Ordering::Relaxed);
        let mut sink = Vec::new();
        let summary = sim.run("1 day", &mut sink).unwrap();
        assert_eq!(summary.outcome, RunPhase::Aborted);
        assert_eq!(summary.steps, 0);
        assert_eq!(summary.snapshots, 1);
        assert_eq!(sim.phase(), RunPhase::Aborted);
        assert_eq!(sim.state().unwrap(), &initial);

        // Re-initializing clears the flag
        sim.initialize(&VortexSpec::points(vec![(90.0, 0.0)]).unwrap())
            .unwrap();
        assert!(!sim.cancel_handle().load(Ordering::Relaxed));
        let summary = sim.run("1h", &mut Vec::new()).unwrap();
        assert_eq!(summary.outcome, RunPhase::Completed);
    }

    #[test]
    fn test_sink_finish_called_once() {
        #[derive(Default)]
        struct Counting {
            accepted: usize,
            finished: usize,
        }
        impl SnapshotSink for Counting {
            fn accept(&mut self, _grid: &PolarGrid, _snapshot: Snapshot) -> SolverResult<()> {
                self.accepted += 1;
                Ok(())
            }
            fn finish(&mut self, _grid: &PolarGrid) -> SolverResult<()> {
                self.finished += 1;
                Ok(())
            }
        }

        let mut sim = Simulation::new(small_config());
        sim.initialize(&VortexSpec::points(vec![(90.0, 0.0)]).unwrap())
            .unwrap();
        let mut sink = Counting::default();
        let summary = sim.run("5h", &mut sink).unwrap();
        assert_eq!(sink.accepted, summary.snapshots);
        assert_eq!(sink.finished, 1);
    }
}
