// src/acquisition/state.rs
//! Session state shared by probe selection, sequence building and run/stop

use crate::hal::ProbeIdentity;

/// Derived phase of the acquisition state machine
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AcquisitionPhase {
    Idle,
    SequenceReady,
    Running,
}

/// Mutable state of one acquisition session
#[derive(Debug, Clone, Default, PartialEq)]
pub struct SessionState {
    pub probe: Option<ProbeIdentity>,
    pub sequence_valid: bool,
    pub running: bool,
}

impl SessionState {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn phase(&self) -> AcquisitionPhase {
        match (self.running, self.sequence_valid) {
            (true, _) => AcquisitionPhase::Running,
            (false, true) => AcquisitionPhase::SequenceReady,
            (false, false) => AcquisitionPhase::Idle,
        }
    }

    pub fn probe_selected(&self) -> bool {
        self.probe.is_some()
    }
}
