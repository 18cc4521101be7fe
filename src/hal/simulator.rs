//! In-process simulation of the ultrasound acquisition platform
//!
//! Implements the full [`UltrasoundPlatform`] contract: firmware init, probe
//! selection, sequence bracketing, run/stop and a cine buffer filled with
//! synthetic RF frames. Every call is recorded in a journal and any call can
//! be made to fail through a [`FaultPlan`].

use crate::hal::simulation::{FaultPlan, ProbeProfile, RfLineGenerator};
use crate::hal::{
    FrameObserver, LineInfo, NoopObserver, PlatformInit, ReceiveParams, TransmitParams,
    UltrasoundPlatform,
};
use serde::{Deserialize, Serialize};
use std::cell::RefCell;
use thiserror::Error;
use tracing::debug;

/// Simulator configuration
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct SimulatorConfig {
    pub probe: ProbeProfile,
    /// Connector the probe is plugged into
    pub probe_connector: u32,
    /// Frames collected between run and stop
    pub frames_per_run: usize,
    /// Fixed samples per line instead of the depth-derived count
    pub samples_per_line: Option<usize>,
    pub cine_capacity_bytes: usize,
    pub noise_level: f64,
    pub seed: u64,
    pub faults: FaultPlan,
}

impl Default for SimulatorConfig {
    fn default() -> Self {
        Self {
            probe: ProbeProfile::default(),
            probe_connector: 0,
            frames_per_run: 24,
            samples_per_line: None,
            cine_capacity_bytes: 256 * 1024 * 1024,
            noise_level: 0.05,
            seed: 0x5eed,
            faults: FaultPlan::none(),
        }
    }
}

impl SimulatorConfig {
    pub fn with_probe(probe: ProbeProfile) -> Self {
        Self { probe, ..Self::default() }
    }

    /// Small frames for fast tests
    pub fn compact(probe: ProbeProfile) -> Self {
        Self {
            probe,
            samples_per_line: Some(8),
            ..Self::default()
        }
    }
}

/// Simulator errors
#[derive(Debug, Clone, PartialEq, Error)]
pub enum SimulatorError {
    #[error("injected fault in {0}")]
    Injected(&'static str),
    #[error("platform is not initialized")]
    NotInitialized,
    #[error("channel count {0} exceeds the 64 receive channels")]
    InvalidChannelCount(u32),
    #[error("probe code {0} is not present")]
    UnknownProbe(i32),
    #[error("no probe on connector {0}")]
    EmptyConnector(u32),
    #[error("no probe selected")]
    NoProbeSelected,
    #[error("a sequence is already open")]
    SequenceAlreadyOpen,
    #[error("no sequence is open")]
    NoSequenceOpen,
    #[error("sequence has no lines")]
    EmptySequence,
    #[error("line {0} has an empty receive mask")]
    EmptyChannelMask(usize),
    #[error("no sequence loaded")]
    NoSequenceLoaded,
    #[error("imaging is already running")]
    AlreadyRunning,
    #[error("imaging is not running")]
    NotRunning,
}

/// One entry of the simulator's call journal
#[derive(Debug, Clone, PartialEq)]
pub enum PlatformCall {
    Init,
    Shutdown,
    SetFrameObserver,
    ClearTgcs,
    AddTgcFixed,
    SetPower,
    ProbeCode(u32),
    SelectProbe(i32),
    ActivateProbeConnector(u32),
    ProbeName(u32),
    ProbeCenterFrequency,
    ProbeElementCount,
    BeginSequence,
    AddLine,
    EndSequence,
    RunImage,
    StopImage,
    CollectedFrameCount,
    FrameSize,
    FrameRate,
    MaxFrameCount,
    CineBuffer,
}

struct LoadedLine {
    tx: TransmitParams,
    rx: ReceiveParams,
    samples: usize,
}

/// Simulated acquisition platform
pub struct PlatformSimulator {
    config: SimulatorConfig,
    generator: RfLineGenerator,
    observer: Box<dyn FrameObserver>,
    journal: RefCell<Vec<PlatformCall>>,

    initialized: bool,
    selected_probe: Option<i32>,
    active_connector: Option<u32>,
    tgc_gains: Vec<f64>,
    power: Option<(i32, i32, i32)>,

    open_sequence: Option<Vec<LoadedLine>>,
    loaded: Vec<LoadedLine>,
    submitted: Vec<(TransmitParams, ReceiveParams)>,
    frame_size: usize,
    frame_rate: f64,

    running: bool,
    collected: usize,
    cine: Vec<u8>,
    next_frame_id: u32,

    begin_calls: usize,
    line_calls: usize,
    end_calls: usize,
    run_calls: usize,
    stop_calls: usize,
}

impl PlatformSimulator {
    pub fn new(config: SimulatorConfig) -> Self {
        let generator = RfLineGenerator::new(config.seed, config.noise_level);
        Self {
            config,
            generator,
            observer: Box::new(NoopObserver),
            journal: RefCell::new(Vec::new()),
            initialized: false,
            selected_probe: None,
            active_connector: None,
            tgc_gains: Vec::new(),
            power: None,
            open_sequence: None,
            loaded: Vec::new(),
            submitted: Vec::new(),
            frame_size: 0,
            frame_rate: 0.0,
            running: false,
            collected: 0,
            cine: Vec::new(),
            next_frame_id: 0,
            begin_calls: 0,
            line_calls: 0,
            end_calls: 0,
            run_calls: 0,
            stop_calls: 0,
        }
    }

    pub fn config(&self) -> &SimulatorConfig {
        &self.config
    }

    /// Every call made so far, in order
    pub fn journal(&self) -> Vec<PlatformCall> {
        self.journal.borrow().clone()
    }

    /// Line definitions of the most recently loaded sequence
    pub fn loaded_lines(&self) -> Vec<(TransmitParams, ReceiveParams)> {
        self.loaded.iter().map(|l| (l.tx.clone(), l.rx.clone())).collect()
    }

    /// Every line ever submitted, across sequences
    pub fn submitted_lines(&self) -> &[(TransmitParams, ReceiveParams)] {
        &self.submitted
    }

    /// Drop the recorded journal and submitted lines, keeping platform state
    pub fn clear_journal(&mut self) {
        self.journal.get_mut().clear();
        self.submitted.clear();
    }

    pub fn is_initialized(&self) -> bool {
        self.initialized
    }

    pub fn is_running(&self) -> bool {
        self.running
    }

    pub fn tgc_gains(&self) -> &[f64] {
        &self.tgc_gains
    }

    pub fn power(&self) -> Option<(i32, i32, i32)> {
        self.power
    }

    fn record(&self, call: PlatformCall) {
        self.journal.borrow_mut().push(call);
    }

    fn ensure_initialized(&self) -> Result<(), SimulatorError> {
        if self.initialized {
            Ok(())
        } else {
            Err(SimulatorError::NotInitialized)
        }
    }

    fn probe_selected(&self) -> bool {
        self.selected_probe.is_some() && self.active_connector.is_some()
    }

    fn capture_frames(&mut self) -> usize {
        let capacity_frames = if self.frame_size > 0 {
            self.config.cine_capacity_bytes / self.frame_size
        } else {
            0
        };
        let frames = self.config.frames_per_run.min(capacity_frames);

        let mut captured = 0;
        for _ in 0..frames {
            let frame_id = self.next_frame_id;
            self.next_frame_id = self.next_frame_id.wrapping_add(1);

            let mut frame = Vec::with_capacity(self.frame_size);
            for (index, line) in self.loaded.iter().enumerate() {
                self.generator
                    .render_line(&mut frame, &line.tx, &line.rx, line.samples, frame_id, index);
            }

            if self.observer.on_frame(&frame, frame_id) {
                self.cine.extend_from_slice(&frame);
                captured += 1;
            }
        }
        captured
    }
}

impl Default for PlatformSimulator {
    fn default() -> Self {
        Self::new(SimulatorConfig::default())
    }
}

impl UltrasoundPlatform for PlatformSimulator {
    type Error = SimulatorError;

    fn init(&mut self, init: &PlatformInit) -> Result<(), Self::Error> {
        self.record(PlatformCall::Init);
        if self.config.faults.fail_init {
            return Err(SimulatorError::Injected("init"));
        }
        if init.channels > 64 {
            return Err(SimulatorError::InvalidChannelCount(init.channels));
        }
        debug!(firmware = %init.firmware_path.display(), pci = init.pci_slot, usm = init.usm_version, "simulated platform initialized");
        self.initialized = true;
        Ok(())
    }

    fn shutdown(&mut self) {
        self.record(PlatformCall::Shutdown);
        self.initialized = false;
        self.running = false;
        self.open_sequence = None;
    }

    fn set_frame_observer(&mut self, observer: Box<dyn FrameObserver>) {
        self.record(PlatformCall::SetFrameObserver);
        self.observer = observer;
    }

    fn clear_tgcs(&mut self) -> Result<(), Self::Error> {
        self.record(PlatformCall::ClearTgcs);
        self.ensure_initialized()?;
        self.tgc_gains.clear();
        Ok(())
    }

    fn add_tgc_fixed(&mut self, gain: f64) -> Result<(), Self::Error> {
        self.record(PlatformCall::AddTgcFixed);
        self.ensure_initialized()?;
        self.tgc_gains.push(gain);
        Ok(())
    }

    fn set_power(&mut self, power: i32, max_positive: i32, max_negative: i32) -> Result<(), Self::Error> {
        self.record(PlatformCall::SetPower);
        self.ensure_initialized()?;
        if self.config.faults.fail_power_setup {
            return Err(SimulatorError::Injected("set_power"));
        }
        self.power = Some((power, max_positive, max_negative));
        Ok(())
    }

    fn probe_code(&self, connector: u32) -> i32 {
        self.record(PlatformCall::ProbeCode(connector));
        if connector == self.config.probe_connector {
            self.config.probe.code
        } else {
            0
        }
    }

    fn select_probe(&mut self, code: i32) -> Result<(), Self::Error> {
        self.record(PlatformCall::SelectProbe(code));
        self.ensure_initialized()?;
        if self.config.faults.fail_probe_select {
            return Err(SimulatorError::Injected("select_probe"));
        }
        if code != self.config.probe.code {
            return Err(SimulatorError::UnknownProbe(code));
        }
        self.selected_probe = Some(code);
        Ok(())
    }

    fn activate_probe_connector(&mut self, connector: u32) -> Result<(), Self::Error> {
        self.record(PlatformCall::ActivateProbeConnector(connector));
        self.ensure_initialized()?;
        if self.config.faults.fail_connector_activation {
            return Err(SimulatorError::Injected("activate_probe_connector"));
        }
        if connector != self.config.probe_connector {
            return Err(SimulatorError::EmptyConnector(connector));
        }
        self.active_connector = Some(connector);
        Ok(())
    }

    fn probe_name(&self, connector: u32) -> String {
        self.record(PlatformCall::ProbeName(connector));
        if connector == self.config.probe_connector {
            self.config.probe.name.clone()
        } else {
            String::new()
        }
    }

    fn probe_center_frequency(&self) -> i32 {
        self.record(PlatformCall::ProbeCenterFrequency);
        self.config.probe.center_frequency_hz
    }

    fn probe_element_count(&self) -> u32 {
        self.record(PlatformCall::ProbeElementCount);
        self.config.probe.element_count
    }

    fn begin_sequence(&mut self) -> Result<(), Self::Error> {
        self.record(PlatformCall::BeginSequence);
        let call = self.begin_calls;
        self.begin_calls += 1;
        self.ensure_initialized()?;
        if FaultPlan::hits(self.config.faults.fail_begin_sequence_on, call) {
            return Err(SimulatorError::Injected("begin_sequence"));
        }
        if !self.probe_selected() {
            return Err(SimulatorError::NoProbeSelected);
        }
        if self.running {
            return Err(SimulatorError::AlreadyRunning);
        }
        if self.open_sequence.is_some() {
            return Err(SimulatorError::SequenceAlreadyOpen);
        }
        self.open_sequence = Some(Vec::new());
        Ok(())
    }

    fn add_line(&mut self, tx: &TransmitParams, rx: &ReceiveParams) -> Result<LineInfo, Self::Error> {
        self.record(PlatformCall::AddLine);
        let call = self.line_calls;
        self.line_calls += 1;
        if FaultPlan::hits(self.config.faults.fail_line_on, call) {
            return Err(SimulatorError::Injected("add_line"));
        }
        let samples_override = self.config.samples_per_line;
        let lines = self.open_sequence.as_mut().ok_or(SimulatorError::NoSequenceOpen)?;
        if rx.channel_mask.count_enabled() == 0 {
            return Err(SimulatorError::EmptyChannelMask(lines.len()));
        }

        let samples = RfLineGenerator::samples_per_line(rx, samples_override);
        lines.push(LoadedLine { tx: tx.clone(), rx: rx.clone(), samples });
        self.submitted.push((tx.clone(), rx.clone()));

        Ok(LineInfo {
            line_size_bytes: RfLineGenerator::line_size_bytes(samples),
            line_duration_us: RfLineGenerator::line_duration_us(rx),
        })
    }

    fn end_sequence(&mut self) -> Result<(), Self::Error> {
        self.record(PlatformCall::EndSequence);
        let call = self.end_calls;
        self.end_calls += 1;
        let lines = self.open_sequence.take().ok_or(SimulatorError::NoSequenceOpen)?;
        if FaultPlan::hits(self.config.faults.fail_end_sequence_on, call) {
            return Err(SimulatorError::Injected("end_sequence"));
        }
        if lines.is_empty() {
            return Err(SimulatorError::EmptySequence);
        }

        self.frame_size = lines
            .iter()
            .map(|l| RfLineGenerator::line_size_bytes(l.samples))
            .sum();
        let frame_duration_us: f64 = lines
            .iter()
            .map(|l| RfLineGenerator::line_duration_us(&l.rx))
            .sum();
        self.frame_rate = if frame_duration_us > 0.0 { 1e6 / frame_duration_us } else { 0.0 };
        self.loaded = lines;
        self.collected = 0;
        self.cine.clear();
        Ok(())
    }

    fn run_image(&mut self) -> Result<(), Self::Error> {
        self.record(PlatformCall::RunImage);
        let call = self.run_calls;
        self.run_calls += 1;
        self.ensure_initialized()?;
        if FaultPlan::hits(self.config.faults.fail_run_on, call) {
            return Err(SimulatorError::Injected("run_image"));
        }
        if self.loaded.is_empty() {
            return Err(SimulatorError::NoSequenceLoaded);
        }
        if self.running {
            return Err(SimulatorError::AlreadyRunning);
        }
        self.cine.clear();
        self.collected = 0;
        self.running = true;
        Ok(())
    }

    fn stop_image(&mut self) -> Result<(), Self::Error> {
        self.record(PlatformCall::StopImage);
        let call = self.stop_calls;
        self.stop_calls += 1;
        if FaultPlan::hits(self.config.faults.fail_stop_on, call) {
            return Err(SimulatorError::Injected("stop_image"));
        }
        if !self.running {
            return Err(SimulatorError::NotRunning);
        }
        self.running = false;

        self.collected = if FaultPlan::hits(self.config.faults.zero_frames_on, call) {
            0
        } else {
            self.capture_frames()
        };
        Ok(())
    }

    fn collected_frame_count(&self) -> usize {
        self.record(PlatformCall::CollectedFrameCount);
        self.collected
    }

    fn frame_size(&self) -> usize {
        self.record(PlatformCall::FrameSize);
        self.frame_size
    }

    fn frame_rate(&self) -> f64 {
        self.record(PlatformCall::FrameRate);
        self.frame_rate
    }

    fn max_frame_count(&self) -> usize {
        self.record(PlatformCall::MaxFrameCount);
        if self.frame_size == 0 {
            0
        } else {
            self.config.cine_capacity_bytes / self.frame_size
        }
    }

    fn cine_buffer(&self) -> &[u8] {
        self.record(PlatformCall::CineBuffer);
        &self.cine
    }
}
