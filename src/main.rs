//! polar-swe - run a circumpolar vortex experiment from a YAML file.
//!
//! ```text
//! polar-swe configs/jupiter.yaml --output-dir out --duration "10 days"
//! ```
//!
//! Snapshots are written as a VTK series (`<stem>_NNNN.vts` + `<stem>.pvd`),
//! or to a single NetCDF file with `--netcdf` when built with that feature.

use std::path::PathBuf;
use std::process::ExitCode;

use clap::Parser;
use tracing::{error, info};
use tracing_subscriber::EnvFilter;

use polar_swe::{RunConfig, RunSummary, Simulation, SolverError, VtkSeriesWriter, format_duration};

#[derive(Parser, Debug)]
#[command(name = "polar-swe")]
#[command(about = "Rotating shallow water simulation of polar vortex arrangements")]
struct Cli {
    /// Path to the YAML run configuration
    config: PathBuf,

    /// Override the grid size
    #[arg(long)]
    grid_size: Option<usize>,

    /// Override the run duration (e.g. "30 days", "1y 2mo")
    #[arg(long)]
    duration: Option<String>,

    /// Override the snapshot interval
    #[arg(long)]
    output_interval: Option<String>,

    /// Directory for VTK output
    #[arg(long, default_value = "output")]
    output_dir: PathBuf,

    /// File name stem for VTK frames
    #[arg(long, default_value = "polar")]
    stem: String,

    /// Write a NetCDF file instead of a VTK series
    #[cfg(feature = "netcdf")]
    #[arg(long)]
    netcdf: Option<PathBuf>,
}

fn init_logging() {
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new("info,polar_swe=info"));

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .init();
}

fn load_config(cli: &Cli) -> Result<RunConfig, String> {
    let mut config = RunConfig::load(&cli.config)
        .map_err(|e| format!("failed to load {}: {e}", cli.config.display()))?;

    if let Some(n) = cli.grid_size {
        config = config.with_grid_size(n);
    }
    if let Some(duration) = &cli.duration {
        config = config.with_duration(duration.clone());
    }
    if let Some(interval) = &cli.output_interval {
        config = config.with_output_interval(interval.clone());
    }
    config.validate().map_err(|e| e.to_string())?;
    Ok(config)
}

#[cfg(feature = "netcdf")]
fn run_netcdf(sim: &mut Simulation, path: &std::path::Path) -> Result<RunSummary, SolverError> {
    use polar_swe::{NetCDFWriter, NetCDFWriterConfig, resolve_duration};

    let grid = sim
        .grid()
        .cloned()
        .ok_or_else(|| SolverError::invalid_config("simulation has no grid"))?;
    let duration = resolve_duration(&sim.config().duration)?;
    let config = NetCDFWriterConfig::new(path.to_string_lossy());
    let mut writer = NetCDFWriter::create(config, &grid, duration)
        .map_err(|e| SolverError::SnapshotSink(e.to_string()))?;
    sim.run_configured(&mut writer)
}

fn run(cli: &Cli, config: RunConfig) -> Result<RunSummary, SolverError> {
    let mut sim = Simulation::new(config);
    sim.initialize_from_config()?;

    #[cfg(feature = "netcdf")]
    if let Some(path) = &cli.netcdf {
        info!(path = %path.display(), "writing NetCDF output");
        return run_netcdf(&mut sim, path);
    }

    let mut writer = VtkSeriesWriter::new(&cli.output_dir, cli.stem.clone())
        .map_err(|e| SolverError::SnapshotSink(e.to_string()))?;
    info!(dir = %cli.output_dir.display(), "writing VTK series");
    let summary = sim.run_configured(&mut writer)?;
    info!(
        collection = %writer.collection_path().display(),
        frames = writer.frames(),
        "VTK series complete"
    );
    Ok(summary)
}

fn main() -> ExitCode {
    init_logging();
    let cli = Cli::parse();

    let config = match load_config(&cli) {
        Ok(config) => config,
        Err(e) => {
            error!("{e}");
            return ExitCode::FAILURE;
        }
    };
    info!(
        grid_size = config.grid_size,
        duration = %config.duration,
        output_interval = %config.output_interval,
        "configuration loaded"
    );

    match run(&cli, config) {
        Ok(summary) => {
            info!(
                steps = summary.steps,
                snapshots = summary.snapshots,
                outcome = ?summary.outcome,
                wall_time = summary.wall_time,
                "simulated {}",
                format_duration(summary.elapsed)
            );
            ExitCode::SUCCESS
        }
        Err(e) => {
            error!("run failed: {e}");
            ExitCode::FAILURE
        }
    }
}
