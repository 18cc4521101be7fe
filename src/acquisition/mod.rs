// src/acquisition/mod.rs
//! Acquisition components: session state, probe selection, sequence building and run/stop control

pub mod controller;
pub mod probe;
pub mod sequence;
pub mod state;

pub use controller::{run, stop};
pub use probe::select_probe;
pub use sequence::{
    build_sequence, center_element, receive_params, steering_angle_mdeg, transmit_params,
    SequenceOptions,
};
pub use state::{AcquisitionPhase, SessionState};
