// src/error.rs
//! Unified error handling for the acquisition session
//!
//! Every error is terminal for a session: the orchestrator stops at the first
//! failure, tears the platform down and reports the [`Stage`] that failed.

use std::error::Error;
use std::fmt;
use std::io;
use std::path::PathBuf;

use thiserror::Error;

/// Boxed error raised by a platform capability
pub type HardwareError = Box<dyn Error + Send + Sync + 'static>;

/// Result type alias for acquisition operations
pub type AcqResult<T> = Result<T, AcqError>;

/// Session stage an error is attributed to
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Stage {
    Arguments,
    Configuration,
    Initialization,
    ProbeSelection,
    LogFile,
    Setup,
    Run,
    Stop,
    Save,
}

impl fmt::Display for Stage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Stage::Arguments => "argument parsing",
            Stage::Configuration => "configuration",
            Stage::Initialization => "initialization",
            Stage::ProbeSelection => "probe selection",
            Stage::LogFile => "log file creation",
            Stage::Setup => "setup",
            Stage::Run => "run",
            Stage::Stop => "stop",
            Stage::Save => "data save",
        };
        f.write_str(name)
    }
}

/// Acquisition error taxonomy
#[derive(Debug, Error)]
pub enum AcqError {
    /// Wrong invocation or unsupported acquisition mode
    #[error("{0}")]
    Argument(String),

    /// Platform init or init-time gain/power setup failed
    #[error("error initializing the platform ({operation})")]
    Initialization {
        operation: &'static str,
        #[source]
        source: HardwareError,
    },

    /// Probe could not be selected or its connector activated
    #[error("could not {step} on connector {connector}")]
    ProbeSelection {
        connector: u32,
        step: &'static str,
        #[source]
        source: Option<HardwareError>,
    },

    /// Session log could not be created or written
    #[error("cannot write log file {path}. Check system permissions")]
    LogFile {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    /// Configuration file missing or malformed
    #[error("cannot parse configuration file {path}: {reason}")]
    ConfigParse {
        path: PathBuf,
        reason: String,
        #[source]
        source: Option<io::Error>,
    },

    /// Configuration value outside its valid range
    #[error("invalid {field} entered ({value}). Must be in the range of {min} to {max}")]
    ConfigValidation {
        field: &'static str,
        value: String,
        min: String,
        max: String,
    },

    /// Platform settings file or override could not be used
    #[error("invalid platform settings: {0}")]
    Settings(String),

    /// Sequence could not be created for a scanline
    #[error("cannot create sequence for scanline {scanline}: {reason}")]
    SequenceBuild {
        scanline: u32,
        reason: String,
        #[source]
        source: Option<HardwareError>,
    },

    /// Platform refused to start imaging
    #[error("platform failed to start the sequence")]
    Run {
        #[source]
        source: HardwareError,
    },

    /// Run requested without a valid sequence
    #[error("cannot run, no sequence selected")]
    NotReady,

    /// Run requested while already running
    #[error("sequence is already running")]
    AlreadyRunning,

    /// Platform refused to stop imaging
    #[error("platform failed to stop the sequence")]
    Stop {
        #[source]
        source: HardwareError,
    },

    /// Stop requested while not running
    #[error("cannot stop, acquisition is not running")]
    NotRunning,

    /// Nothing was collected for a scanline
    #[error("no frames have been acquired for scanline {scanline}")]
    NoFramesCaptured { scanline: u32 },

    /// Raw data file could not be created or written
    #[error("could not store data to {path}")]
    FileWrite {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    /// Cine buffer holds fewer bytes than the frames to be saved
    #[error("cine buffer holds {available} bytes, {requested} requested")]
    FrameBuffer { requested: usize, available: usize },
}

impl AcqError {
    /// Stage the error is reported under
    pub fn stage(&self) -> Stage {
        match self {
            AcqError::Argument(_) => Stage::Arguments,
            AcqError::ConfigParse { .. }
            | AcqError::ConfigValidation { .. }
            | AcqError::Settings(_) => Stage::Configuration,
            AcqError::Initialization { .. } => Stage::Initialization,
            AcqError::ProbeSelection { .. } => Stage::ProbeSelection,
            AcqError::LogFile { .. } => Stage::LogFile,
            AcqError::SequenceBuild { .. } => Stage::Setup,
            AcqError::Run { .. } | AcqError::NotReady | AcqError::AlreadyRunning => Stage::Run,
            AcqError::Stop { .. } | AcqError::NotRunning => Stage::Stop,
            AcqError::NoFramesCaptured { .. }
            | AcqError::FileWrite { .. }
            | AcqError::FrameBuffer { .. } => Stage::Save,
        }
    }

    /// Full message including the chain of sources
    pub fn report(&self) -> String {
        let mut message = self.to_string();
        let mut source = self.source();
        while let Some(cause) = source {
            message.push_str(": ");
            message.push_str(&cause.to_string());
            source = cause.source();
        }
        message
    }
}

/// Convenience trait for lifting platform errors into [`AcqError`]
pub trait IntoAcqError<T> {
    fn acq_err(self, wrap: impl FnOnce(HardwareError) -> AcqError) -> AcqResult<T>;
}

impl<T, E> IntoAcqError<T> for Result<T, E>
where
    E: Error + Send + Sync + 'static,
{
    fn acq_err(self, wrap: impl FnOnce(HardwareError) -> AcqError) -> AcqResult<T> {
        self.map_err(|err| wrap(Box::new(err)))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[derive(Debug, Error)]
    #[error("bus timeout")]
    struct BusTimeout;

    #[test]
    fn test_stage_mapping() {
        assert_eq!(AcqError::NotReady.stage(), Stage::Run);
        assert_eq!(AcqError::AlreadyRunning.stage(), Stage::Run);
        assert_eq!(AcqError::NotRunning.stage(), Stage::Stop);
        assert_eq!(AcqError::NoFramesCaptured { scanline: 3 }.stage(), Stage::Save);
        assert_eq!(AcqError::Settings("x".into()).stage(), Stage::Configuration);
    }

    #[test]
    fn test_validation_display_names_field_and_range() {
        let err = AcqError::ConfigValidation {
            field: "TX focus distance",
            value: "5".to_string(),
            min: "10".to_string(),
            max: "300 mm".to_string(),
        };
        let display = err.to_string();
        assert!(display.contains("TX focus distance"));
        assert!(display.contains("10 to 300 mm"));
    }

    #[test]
    fn test_acq_err_wraps_source() {
        let result: Result<(), BusTimeout> = Err(BusTimeout);
        let err = result.acq_err(|source| AcqError::Run { source }).unwrap_err();

        assert_eq!(err.stage(), Stage::Run);
        assert!(err.source().is_some());
        assert_eq!(err.report(), "platform failed to start the sequence: bus timeout");
    }

    #[test]
    fn test_error_send_sync() {
        fn assert_send_sync<T: Send + Sync>() {}
        assert_send_sync::<AcqError>();
    }
}
