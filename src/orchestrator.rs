// src/orchestrator.rs
//! Session orchestration: one full acquisition from configuration to teardown
//!
//! The session is strictly sequential. Configuration is read before any
//! platform call; the platform is brought up, the probe selected and the log
//! opened once; then every scanline is built, run, stopped and saved with
//! settle waits in between. The first error aborts the session. Teardown
//! always shuts the platform down once it was initialized and closes the log
//! with an end record.

use std::path::{Path, PathBuf};
use std::sync::{Arc, Mutex};
use std::time::Duration;

use tracing::{debug, info, warn};

use crate::acquisition::{self, SequenceOptions, SessionState};
use crate::config::{AcquisitionConfig, AcquisitionMode, PlatformSettings};
use crate::error::{AcqError, AcqResult, IntoAcqError};
use crate::hal::{FrameObserver, NoopObserver, ProbeIdentity, UltrasoundPlatform};
use crate::output::{save_scanline, OutputNaming, SessionLog};
use crate::utils::{local_session_timestamp, Delay};

/// Summary of a completed session
#[derive(Debug, Clone, PartialEq)]
pub struct SessionReport {
    pub mode: AcquisitionMode,
    pub probe: ProbeIdentity,
    pub scanlines_saved: u32,
    pub raw_files: Vec<PathBuf>,
    pub log_path: PathBuf,
}

/// Drives a platform through a complete acquisition session
pub struct Orchestrator<P: UltrasoundPlatform, D: Delay> {
    platform: P,
    delay: D,
    settings: PlatformSettings,
    observer: Option<Arc<Mutex<Box<dyn FrameObserver>>>>,
}

/// Hands the orchestrator's observer to one session's platform registration
struct SharedObserver(Arc<Mutex<Box<dyn FrameObserver>>>);

impl FrameObserver for SharedObserver {
    fn on_frame(&mut self, frame: &[u8], frame_id: u32) -> bool {
        match self.0.lock() {
            Ok(mut observer) => observer.on_frame(frame, frame_id),
            Err(_) => true,
        }
    }
}

impl<P: UltrasoundPlatform, D: Delay> Orchestrator<P, D> {
    pub fn new(platform: P, settings: PlatformSettings, delay: D) -> Self {
        Self {
            platform,
            delay,
            settings,
            observer: None,
        }
    }

    /// Observer registered with the platform at the start of every session instead of the no-op default
    pub fn with_frame_observer(mut self, observer: Box<dyn FrameObserver>) -> Self {
        self.observer = Some(Arc::new(Mutex::new(observer)));
        self
    }

    pub fn platform(&self) -> &P {
        &self.platform
    }

    pub fn settings(&self) -> &PlatformSettings {
        &self.settings
    }

    pub fn into_platform(self) -> P {
        self.platform
    }

    /// Run a session with the configuration file at `config_path`
    pub fn run<Q: AsRef<Path>>(&mut self, mode: AcquisitionMode, config_path: Q) -> AcqResult<SessionReport> {
        let config = AcquisitionConfig::load(config_path.as_ref())?;
        self.execute(mode, &config)
    }

    /// Run a session with an already parsed configuration
    pub fn run_with_config(
        &mut self,
        mode: AcquisitionMode,
        config: &AcquisitionConfig,
    ) -> AcqResult<SessionReport> {
        self.execute(mode, config)
    }

    fn execute(&mut self, mode: AcquisitionMode, config: &AcquisitionConfig) -> AcqResult<SessionReport> {
        config.validate()?;
        info!(
            version = crate::VERSION,
            compound_angle_mdeg = self.settings.compound_angle_mdeg,
            "RF acquisition session starting"
        );
        if !self.settings.tx_variant.is_verified() {
            warn!(variant = ?self.settings.tx_variant, "transmit variant has not been verified on hardware");
        }

        info!(firmware = %self.settings.firmware_path.display(), "Initializing platform");
        self.platform
            .init(&self.settings.platform_init())
            .acq_err(|source| AcqError::Initialization { operation: "init", source })?;

        let mut log = None;
        let result = self.session(mode, config, &mut log);
        self.teardown(result, log)
    }

    fn session(
        &mut self,
        mode: AcquisitionMode,
        config: &AcquisitionConfig,
        log_slot: &mut Option<SessionLog>,
    ) -> AcqResult<SessionReport> {
        let observer: Box<dyn FrameObserver> = match &self.observer {
            Some(shared) => Box::new(SharedObserver(Arc::clone(shared))),
            None => Box::new(NoopObserver),
        };
        self.platform.set_frame_observer(observer);

        let power = self.settings.power;
        self.platform
            .clear_tgcs()
            .acq_err(|source| AcqError::Initialization { operation: "clear TGCs", source })?;
        self.platform
            .add_tgc_fixed(self.settings.gain)
            .acq_err(|source| AcqError::Initialization { operation: "add fixed TGC", source })?;
        self.platform
            .set_power(power, power, power)
            .acq_err(|source| AcqError::Initialization { operation: "set power", source })?;

        let mut state = SessionState::new();
        let probe = acquisition::select_probe(&mut self.platform, &mut state, self.settings.connector)?;

        let naming = OutputNaming::new(&self.settings.output_dir, probe.code, mode);
        let log = log_slot.insert(SessionLog::create(naming.log_path())?);
        log.write_header(&local_session_timestamp(), &probe, mode)?;

        let scanlines = mode.scanline_count();
        let last_scanline = scanlines - 1;
        let options = SequenceOptions::from_settings(&self.settings);
        let settle = self.settings.settle.clone();
        info!(scanlines, "{}", mode.description());

        let mut raw_files = Vec::with_capacity(scanlines as usize);
        for scanline in 0..scanlines {
            acquisition::build_sequence(&mut self.platform, &mut state, mode, scanline, config, &options, log)?;
            info!(scanline, "Setup done");
            self.settle("setup", settle.after_setup());

            acquisition::run(&mut self.platform, &mut state, log)?;
            self.settle("run", settle.after_run());

            acquisition::stop(&mut self.platform, &mut state, log)?;
            self.settle("stop", settle.after_stop());

            let saved = save_scanline(&self.platform, &naming, scanline, log)?;
            log.record(format_args!("Data of scanline #{}/{} saved\n", scanline, last_scanline))?;
            info!("Data of scanline #{}/{} saved", scanline, last_scanline);
            raw_files.push(saved.path);
            self.settle("save", settle.after_save());
        }

        Ok(SessionReport {
            mode,
            probe,
            scanlines_saved: scanlines,
            raw_files,
            log_path: naming.log_path(),
        })
    }

    fn settle(&self, step: &'static str, duration: Duration) {
        if !duration.is_zero() {
            debug!(step, wait_ms = duration.as_millis() as u64, "settling");
        }
        self.delay.wait(duration);
    }

    fn teardown(
        &mut self,
        result: AcqResult<SessionReport>,
        log: Option<SessionLog>,
    ) -> AcqResult<SessionReport> {
        self.platform.shutdown();

        let Some(mut log) = log else {
            return result;
        };
        if let Err(err) = &result {
            if let Err(log_err) = log.write_error(err) {
                warn!(error = %log_err, "could not record the error in the session log");
            }
        }
        let closed = log.write_end(&local_session_timestamp());
        match result {
            Ok(report) => closed.map(|_| report),
            Err(err) => {
                if let Err(log_err) = closed {
                    warn!(error = %log_err, "could not close the session log");
                }
                Err(err)
            }
        }
    }
}
