// src/config/settings.rs
//! Platform settings: the hardware and session parameters that are not part
//! of the acquisition configuration file

use std::path::PathBuf;
use std::time::Duration;

use serde::{Deserialize, Serialize};

use crate::config::constants::{acquisition, paths, platform, timing};
use crate::error::{AcqError, AcqResult};
use crate::hal::PlatformInit;

/// Transmit scheme. Only `Focused` has been exercised on hardware.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TransmitVariant {
    #[default]
    Focused,
    SingleElement,
    PlaneWave,
    Flashlight,
}

impl TransmitVariant {
    pub fn is_verified(&self) -> bool {
        matches!(self, TransmitVariant::Focused)
    }
}

/// Settling waits between acquisition steps [ms]
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SettleSettings {
    #[serde(default = "defaults::after_setup_ms")]
    pub after_setup_ms: u64,
    #[serde(default = "defaults::after_run_ms")]
    pub after_run_ms: u64,
    #[serde(default = "defaults::after_stop_ms")]
    pub after_stop_ms: u64,
    #[serde(default = "defaults::after_save_ms")]
    pub after_save_ms: u64,
}

impl SettleSettings {
    pub fn after_setup(&self) -> Duration {
        Duration::from_millis(self.after_setup_ms)
    }

    pub fn after_run(&self) -> Duration {
        Duration::from_millis(self.after_run_ms)
    }

    pub fn after_stop(&self) -> Duration {
        Duration::from_millis(self.after_stop_ms)
    }

    pub fn after_save(&self) -> Duration {
        Duration::from_millis(self.after_save_ms)
    }
}

impl Default for SettleSettings {
    fn default() -> Self {
        Self {
            after_setup_ms: defaults::after_setup_ms(),
            after_run_ms: defaults::after_run_ms(),
            after_stop_ms: defaults::after_stop_ms(),
            after_save_ms: defaults::after_save_ms(),
        }
    }
}

/// Hardware and session settings with per-field defaults
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PlatformSettings {
    #[serde(default = "defaults::firmware_path")]
    pub firmware_path: PathBuf,

    #[serde(default = "defaults::pci_slot")]
    pub pci_slot: i32,

    #[serde(default = "defaults::usm_version")]
    pub usm_version: i32,

    #[serde(default = "defaults::hv_mode")]
    pub hv_mode: i32,

    #[serde(default = "defaults::connector")]
    pub connector: u32,

    #[serde(default = "defaults::power")]
    pub power: i32,

    #[serde(default = "defaults::gain")]
    pub gain: f64,

    #[serde(default = "defaults::compound_angle_mdeg")]
    pub compound_angle_mdeg: i32,

    #[serde(default)]
    pub tx_variant: TransmitVariant,

    #[serde(default = "defaults::output_dir")]
    pub output_dir: PathBuf,

    #[serde(default)]
    pub settle: SettleSettings,
}

/// Default value providers using constants
mod defaults {
    use super::*;

    pub fn firmware_path() -> PathBuf { PathBuf::from(platform::DEFAULT_FIRMWARE_PATH) }
    pub fn pci_slot() -> i32 { platform::DEFAULT_PCI_SLOT }
    pub fn usm_version() -> i32 { platform::DEFAULT_USM_VERSION }
    pub fn hv_mode() -> i32 { platform::DEFAULT_HV_CHANNEL_MODE }
    pub fn connector() -> u32 { platform::DEFAULT_CONNECTOR }
    pub fn power() -> i32 { platform::DEFAULT_POWER }
    pub fn gain() -> f64 { platform::DEFAULT_GAIN }
    pub fn compound_angle_mdeg() -> i32 { acquisition::DEFAULT_COMPOUND_ANGLE_MDEG }
    pub fn output_dir() -> PathBuf { PathBuf::from(paths::DEFAULT_OUTPUT_DIR) }

    pub fn after_setup_ms() -> u64 { timing::SETTLE_AFTER_SETUP_MS }
    pub fn after_run_ms() -> u64 { timing::SETTLE_AFTER_RUN_MS }
    pub fn after_stop_ms() -> u64 { timing::SETTLE_AFTER_STOP_MS }
    pub fn after_save_ms() -> u64 { timing::SETTLE_AFTER_SAVE_MS }
}

impl Default for PlatformSettings {
    fn default() -> Self {
        Self {
            firmware_path: defaults::firmware_path(),
            pci_slot: defaults::pci_slot(),
            usm_version: defaults::usm_version(),
            hv_mode: defaults::hv_mode(),
            connector: defaults::connector(),
            power: defaults::power(),
            gain: defaults::gain(),
            compound_angle_mdeg: defaults::compound_angle_mdeg(),
            tx_variant: TransmitVariant::default(),
            output_dir: defaults::output_dir(),
            settle: SettleSettings::default(),
        }
    }
}

impl PlatformSettings {
    /// Check values the platform would otherwise reject at runtime
    pub fn validate(&self) -> AcqResult<()> {
        if !(0.0..=1.0).contains(&self.gain) {
            return Err(AcqError::Settings(format!(
                "gain {} must be between 0.0 and 1.0",
                self.gain
            )));
        }
        if self.power < 0 {
            return Err(AcqError::Settings(format!("power {} must not be negative", self.power)));
        }
        if self.output_dir.as_os_str().is_empty() {
            return Err(AcqError::Settings("output_dir must not be empty".to_string()));
        }
        Ok(())
    }

    pub fn platform_init(&self) -> PlatformInit {
        PlatformInit {
            firmware_path: self.firmware_path.clone(),
            pci_slot: self.pci_slot,
            usm_version: self.usm_version,
            hv_mode: self.hv_mode,
            channels: platform::CHANNEL_COUNT,
        }
    }

    /// Settings with every settle wait set to zero
    pub fn without_settling(mut self) -> Self {
        self.settle = SettleSettings {
            after_setup_ms: 0,
            after_run_ms: 0,
            after_stop_ms: 0,
            after_save_ms: 0,
        };
        self
    }
}
