// src/config/mod.rs
//! Configuration: acquisition parameters, platform settings and constants

pub mod acquisition;
pub mod constants;
pub mod loader;
pub mod settings;

pub use acquisition::{AcquisitionConfig, AcquisitionMode};
pub use constants::*;
pub use loader::SettingsLoader;
pub use settings::{PlatformSettings, SettleSettings, TransmitVariant};
