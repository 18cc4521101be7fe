// src/hal/traits.rs
//! Capability traits for the acquisition platform

use crate::hal::types::{LineInfo, PlatformInit, ReceiveParams, TransmitParams};
use std::error::Error;

/// Notified by the platform whenever a frame lands in the cine buffer
pub trait FrameObserver: Send {
    /// Return `false` to ask the platform to drop the frame
    fn on_frame(&mut self, _frame: &[u8], _frame_id: u32) -> bool {
        true
    }
}

/// Observer that ignores every frame; frames are read back after stop
#[derive(Debug, Default, Clone, Copy)]
pub struct NoopObserver;

impl FrameObserver for NoopObserver {}

/// Public contract of the vendor acquisition library
///
/// Implementations own the hardware handle, its timing and the cine buffer.
/// Calls are blocking and made from a single controlling thread.
pub trait UltrasoundPlatform {
    type Error: Error + Send + Sync + 'static;

    /// Load firmware and bring the platform up
    fn init(&mut self, init: &PlatformInit) -> Result<(), Self::Error>;

    /// Release the platform, safe to call after a failed session
    fn shutdown(&mut self);

    fn set_frame_observer(&mut self, observer: Box<dyn FrameObserver>);

    fn clear_tgcs(&mut self) -> Result<(), Self::Error>;

    fn add_tgc_fixed(&mut self, gain: f64) -> Result<(), Self::Error>;

    fn set_power(&mut self, power: i32, max_positive: i32, max_negative: i32) -> Result<(), Self::Error>;

    /// Code of the probe plugged into `connector`
    fn probe_code(&self, connector: u32) -> i32;

    fn select_probe(&mut self, code: i32) -> Result<(), Self::Error>;

    fn activate_probe_connector(&mut self, connector: u32) -> Result<(), Self::Error>;

    fn probe_name(&self, connector: u32) -> String;

    /// Center frequency of the selected probe [Hz]
    fn probe_center_frequency(&self) -> i32;

    fn probe_element_count(&self) -> u32;

    fn begin_sequence(&mut self) -> Result<(), Self::Error>;

    fn add_line(&mut self, tx: &TransmitParams, rx: &ReceiveParams) -> Result<LineInfo, Self::Error>;

    fn end_sequence(&mut self) -> Result<(), Self::Error>;

    fn run_image(&mut self) -> Result<(), Self::Error>;

    fn stop_image(&mut self) -> Result<(), Self::Error>;

    fn collected_frame_count(&self) -> usize;

    /// Size of one frame of the loaded sequence [bytes]
    fn frame_size(&self) -> usize;

    fn frame_rate(&self) -> f64;

    fn max_frame_count(&self) -> usize;

    /// Cine buffer contents starting at the first buffered frame
    fn cine_buffer(&self) -> &[u8];
}
