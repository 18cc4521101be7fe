//! Fault injection plan for the platform simulator
//! Location: src/hal/simulation/faults.rs

use serde::{Deserialize, Serialize};

/// Which platform calls fail. Indexed faults count calls from zero.
#[derive(Debug, Clone, Default, PartialEq, Deserialize, Serialize)]
pub struct FaultPlan {
    pub fail_init: bool,
    pub fail_power_setup: bool,
    pub fail_probe_select: bool,
    pub fail_connector_activation: bool,
    pub fail_begin_sequence_on: Option<usize>,
    /// Counted across all sequences
    pub fail_line_on: Option<usize>,
    pub fail_end_sequence_on: Option<usize>,
    pub fail_run_on: Option<usize>,
    pub fail_stop_on: Option<usize>,
    /// Stop succeeds but nothing is collected
    pub zero_frames_on: Option<usize>,
}

impl FaultPlan {
    pub fn none() -> Self {
        Self::default()
    }

    pub(crate) fn hits(slot: Option<usize>, call_index: usize) -> bool {
        slot == Some(call_index)
    }
}
