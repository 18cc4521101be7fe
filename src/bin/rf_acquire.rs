//! Command line front end: `rf-acquire <phasedArray|singleRx> <config-file>`

use std::path::{Path, PathBuf};
use std::process;

use clap::Parser;
use tracing::{error, info};
use tracing_subscriber::EnvFilter;

use rf_acquire::config::{AcquisitionMode, SettingsLoader};
use rf_acquire::hal::simulation::ProbeProfile;
use rf_acquire::hal::simulator::{PlatformSimulator, SimulatorConfig};
use rf_acquire::utils::{Delay, NoDelay, ThreadSleepDelay};
use rf_acquire::{AcqError, AcqResult, Orchestrator, SessionReport};

const EXIT_FAILURE: i32 = -1;

#[derive(clap::Parser, Debug)]
#[command(
    name = "rf-acquire",
    version,
    about = "Acquire per-channel raw RF data, one receive channel at a time, across every scanline",
    after_help = "Output files:\n  \
        LOG: probeId_<probe ID>_<acquisition type>.log\n  \
        RAW: probeId_<probe ID>_<acquisition type>_scanline_<scanline>.raw\n\n\
        Each raw file holds up to 16 frames of <channel 0 line><channel 1 line>...<channel 63 line>.\n\n\
        Configuration file: txFocusDistanceMm useCustomTxFrequency txFrequencyHz pulseShape rxAcquisitionDepthMm rxDecimation"
)]
struct Cli {
    /// Acquisition mode: phasedArray or singleRx
    mode: String,

    /// Acquisition configuration file
    config: PathBuf,

    /// Platform settings file (TOML)
    #[arg(long)]
    settings: Option<PathBuf>,

    /// Directory for the log and raw files
    #[arg(long)]
    output_dir: Option<PathBuf>,

    /// Simulated probe profile (sa4-2, l14-5, c5-2, ec9-5)
    #[arg(long)]
    sim_probe: Option<String>,

    /// Skip the hardware settle waits
    #[arg(long)]
    no_settle: bool,

    /// Print the effective platform settings and exit
    #[arg(long)]
    print_settings: bool,

    /// Debug level console output
    #[arg(short, long)]
    verbose: bool,
}

fn main() {
    let cli = match Cli::try_parse() {
        Ok(cli) => cli,
        Err(err) => {
            let code = if err.use_stderr() { EXIT_FAILURE } else { 0 };
            let _ = err.print();
            process::exit(code);
        }
    };

    init_tracing(cli.verbose);

    if let Err(err) = run(cli) {
        error!(stage = %err.stage(), "Error during {}: {}", err.stage(), err.report());
        error!("Aborting execution");
        process::exit(EXIT_FAILURE);
    }
}

fn init_tracing(verbose: bool) {
    let default_level = if verbose { "debug" } else { "info" };
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_level));
    tracing_subscriber::fmt().with_env_filter(filter).with_target(false).init();
}

fn run(cli: Cli) -> AcqResult<()> {
    let mode: AcquisitionMode = cli.mode.parse()?;

    let loader = match &cli.settings {
        Some(path) => SettingsLoader::with_path(path),
        None => SettingsLoader::new(),
    };
    let mut settings = loader.load()?;
    if let Some(dir) = cli.output_dir {
        settings.output_dir = dir;
    }
    if cli.no_settle {
        settings = settings.without_settling();
    }

    if cli.print_settings {
        print!("{}", SettingsLoader::export(&settings)?);
        return Ok(());
    }

    let probe = simulated_probe(mode, cli.sim_probe.as_deref())?;
    info!(probe = %probe.name, "using simulated platform");
    let platform = PlatformSimulator::new(SimulatorConfig {
        probe_connector: settings.connector,
        ..SimulatorConfig::with_probe(probe)
    });

    let report = if cli.no_settle {
        acquire(Orchestrator::new(platform, settings, NoDelay), mode, &cli.config)?
    } else {
        acquire(Orchestrator::new(platform, settings, ThreadSleepDelay), mode, &cli.config)?
    };
    info!(
        scanlines = report.scanlines_saved,
        log = %report.log_path.display(),
        "End of acquisition"
    );
    Ok(())
}

fn acquire<D: Delay>(
    mut orchestrator: Orchestrator<PlatformSimulator, D>,
    mode: AcquisitionMode,
    config: &Path,
) -> AcqResult<SessionReport> {
    orchestrator.run(mode, config)
}

fn simulated_probe(mode: AcquisitionMode, key: Option<&str>) -> AcqResult<ProbeProfile> {
    match key {
        Some(key) => ProbeProfile::find(key)
            .ok_or_else(|| AcqError::Settings(format!("unknown simulated probe '{}'", key))),
        None => Ok(match mode {
            AcquisitionMode::PhasedArray => ProbeProfile::phased_sa4_2(),
            AcquisitionMode::SingleChannelReceive => ProbeProfile::linear_l14_5(),
        }),
    }
}
