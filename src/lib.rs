//! rf-acquire: per-channel raw RF acquisition for ultrasound research platforms
//!
//! The crate drives an ultrasound platform through a full acquisition
//! session, one receive channel per line and one sequence per scanline, and
//! stores up to 16 frames of raw RF data per scanline next to a text log.
//!
//! - Hardware abstraction over the platform's acquisition library
//! - In-process platform simulator with fault injection
//! - Acquisition configuration file parsing and validation
//! - Sequence geometry for phased array and single receive scans
//! - Raw data and session log output
//!
//! # Quick Start
//!
//! ```rust,no_run
//! use rf_acquire::config::{AcquisitionMode, PlatformSettings};
//! use rf_acquire::hal::simulator::{PlatformSimulator, SimulatorConfig};
//! use rf_acquire::utils::ThreadSleepDelay;
//! use rf_acquire::Orchestrator;
//!
//! fn main() -> Result<(), rf_acquire::AcqError> {
//!     let platform = PlatformSimulator::new(SimulatorConfig::default());
//!     let mut orchestrator = Orchestrator::new(platform, PlatformSettings::default(), ThreadSleepDelay);
//!
//!     let report = orchestrator.run(AcquisitionMode::PhasedArray, "config.txt")?;
//!     println!("saved {} scanlines to {}", report.scanlines_saved, report.log_path.display());
//!     Ok(())
//! }
//! ```

#![warn(missing_docs)]
#![warn(clippy::all)]
#![allow(clippy::module_inception)]

pub mod acquisition;
pub mod config;
pub mod error;
pub mod hal;
pub mod orchestrator;
pub mod output;
pub mod utils;

// Re-export commonly used types for convenience
pub use config::{AcquisitionConfig, AcquisitionMode, PlatformSettings, SettingsLoader};
pub use error::{AcqError, AcqResult, Stage};
pub use hal::{ChannelMask, FrameObserver, ProbeIdentity, UltrasoundPlatform};
pub use orchestrator::{Orchestrator, SessionReport};

/// Library version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

/// Library name
pub const NAME: &str = env!("CARGO_PKG_NAME");

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_constants() {
        assert!(!VERSION.is_empty());
        assert_eq!(NAME, "rf-acquire");
    }
}
