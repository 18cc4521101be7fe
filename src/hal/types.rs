// src/hal/types.rs
//! Core types exchanged with the acquisition platform

use std::fmt;
use std::path::PathBuf;

use serde::{Deserialize, Serialize};

use crate::config::constants::{geometry, limits};

/// Receive channel mask spanning up to 64 channels in two 32-bit words
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub struct ChannelMask([u32; 2]);

impl ChannelMask {
    /// Number of channels the mask can address
    pub const CAPACITY: u32 = 64;

    /// Every channel enabled
    pub const fn all() -> Self {
        Self([u32::MAX, u32::MAX])
    }

    /// Mask isolating a single receive channel, `None` if out of capacity
    pub fn single(channel: u32) -> Option<Self> {
        match channel {
            c if c < 32 => Some(Self([1 << c, 0])),
            c if c < Self::CAPACITY => Some(Self([0, 1 << (c - 32)])),
            _ => None,
        }
    }

    pub fn words(&self) -> [u32; 2] {
        self.0
    }

    pub fn count_enabled(&self) -> u32 {
        self.0[0].count_ones() + self.0[1].count_ones()
    }

    pub fn is_enabled(&self, channel: u32) -> bool {
        match channel {
            c if c < 32 => self.0[0] & (1 << c) != 0,
            c if c < Self::CAPACITY => self.0[1] & (1 << (c - 32)) != 0,
            _ => false,
        }
    }

    /// Enabled channels in ascending order
    pub fn channels(&self) -> impl Iterator<Item = u32> + '_ {
        (0..Self::CAPACITY).filter(move |c| self.is_enabled(*c))
    }
}

/// Transmit pulse shape code, bounded to the platform's buffer size
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct PulseShape(String);

impl PulseShape {
    /// Returns `None` for empty shapes, shapes with whitespace, or shapes over the size limit
    pub fn new(shape: &str) -> Option<Self> {
        let valid = !shape.is_empty()
            && shape.len() <= limits::MAX_PULSE_SHAPE_LEN
            && !shape.chars().any(char::is_whitespace);
        valid.then(|| Self(shape.to_string()))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl TryFrom<String> for PulseShape {
    type Error = String;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        PulseShape::new(&value).ok_or_else(|| format!("invalid pulse shape '{}'", value))
    }
}

impl From<PulseShape> for String {
    fn from(shape: PulseShape) -> Self {
        shape.0
    }
}

impl fmt::Display for PulseShape {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// Transmit half of a line definition
#[derive(Debug, Clone, PartialEq)]
pub struct TransmitParams {
    pub center_element: f64,
    /// Active elements, 0 selects single element transmit
    pub aperture: u32,
    pub focus_distance_um: i32,
    pub angle_mdeg: i32,
    pub frequency_hz: i32,
    pub pulse_shape: PulseShape,
    pub tx_repeat: i32,
    pub tx_delay: i32,
    pub speed_of_sound: i32,
    pub use_manual_delays: bool,
    pub manual_delays: Option<Vec<i32>>,
    pub use_mask: bool,
    pub table_index: i32,
    pub sync: bool,
}

/// Receive aperture weighting curve
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ApertureCurve {
    pub top: u8,
    pub mid: u8,
    pub bottom: u8,
    pub vmid: u8,
}

impl Default for ApertureCurve {
    fn default() -> Self {
        Self {
            top: geometry::RX_APERTURE_CURVE_TOP,
            mid: geometry::RX_APERTURE_CURVE_MID,
            bottom: geometry::RX_APERTURE_CURVE_BOTTOM,
            vmid: geometry::RX_APERTURE_CURVE_VMID,
        }
    }
}

/// Receive half of a line definition
#[derive(Debug, Clone, PartialEq)]
pub struct ReceiveParams {
    pub center_element: f64,
    pub aperture: u32,
    pub angle_mdeg: i32,
    pub max_aperture_depth_um: i32,
    pub acquisition_depth_um: i32,
    pub save_delay: i32,
    pub speed_of_sound: i32,
    pub channel_mask: ChannelMask,
    pub apply_focus: bool,
    pub use_manual_delays: bool,
    /// 0 samples at 40 MHz, 1 at 20 MHz, 2 at 10 MHz
    pub decimation: u8,
    pub lgc_value: i32,
    pub tgc_sel: i32,
    pub table_index: i32,
    pub custom_line_duration_ns: i32,
    pub weight_type: i32,
    pub aperture_curve: ApertureCurve,
}

/// Per-line information reported back by the platform
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct LineInfo {
    pub line_size_bytes: usize,
    pub line_duration_us: f64,
}

/// Statistics of a loaded sequence
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct SequenceStats {
    pub frame_size_bytes: usize,
    pub frame_rate_hz: f64,
    pub max_frame_count: usize,
}

/// Identity of the probe selected for a session
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ProbeIdentity {
    pub code: i32,
    pub name: String,
    pub connector: u32,
    pub center_frequency_hz: i32,
    pub element_count: u32,
}

/// Parameters for bringing up the platform
#[derive(Debug, Clone, PartialEq)]
pub struct PlatformInit {
    pub firmware_path: PathBuf,
    pub pci_slot: i32,
    pub usm_version: i32,
    pub hv_mode: i32,
    pub channels: u32,
}
