// src/config/acquisition.rs
//! Acquisition mode and the six-field acquisition configuration file
//!
//! The file holds whitespace-separated scalars in a fixed order:
//!
//! ```text
//! txFocusDistanceMm useCustomTxFrequency txFrequencyHz pulseShape rxAcquisitionDepthMm rxDecimation
//! 50                0                    0             +-         60                   1
//! ```

use std::fmt;
use std::path::Path;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::config::constants::{acquisition, limits};
use crate::error::{AcqError, AcqResult};
use crate::hal::PulseShape;
use crate::utils::validation::validate_range;

/// Beam geometry and scanline layout of a run
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Deserialize, Serialize)]
pub enum AcquisitionMode {
    /// Steered beams from the probe center (SA4-2/24)
    #[serde(rename = "phasedArray")]
    PhasedArray,
    /// Laterally shifted apertures, one receive channel per line
    #[serde(rename = "singleRx")]
    SingleChannelReceive,
}

impl AcquisitionMode {
    /// Keyword used on the command line and in file names
    pub fn tag(&self) -> &'static str {
        match self {
            AcquisitionMode::PhasedArray => acquisition::PHASED_ARRAY_TAG,
            AcquisitionMode::SingleChannelReceive => acquisition::SINGLE_RX_TAG,
        }
    }

    pub fn scanline_count(&self) -> u32 {
        match self {
            AcquisitionMode::PhasedArray => acquisition::PHASED_ARRAY_SCANLINES,
            AcquisitionMode::SingleChannelReceive => acquisition::SINGLE_RX_SCANLINES,
        }
    }

    pub fn description(&self) -> &'static str {
        match self {
            AcquisitionMode::PhasedArray => "Phased Array mode",
            AcquisitionMode::SingleChannelReceive => "Single Rx mode",
        }
    }
}

impl FromStr for AcquisitionMode {
    type Err = AcqError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            acquisition::PHASED_ARRAY_TAG => Ok(AcquisitionMode::PhasedArray),
            acquisition::SINGLE_RX_TAG => Ok(AcquisitionMode::SingleChannelReceive),
            other => Err(AcqError::Argument(format!(
                "unsupported acquisition mode '{}'. Options: {} or {}",
                other,
                acquisition::PHASED_ARRAY_TAG,
                acquisition::SINGLE_RX_TAG
            ))),
        }
    }
}

impl fmt::Display for AcquisitionMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.tag())
    }
}

/// Validated acquisition parameters, immutable for the whole run
///
/// Fields are public for building configurations in code; such values are
/// checked again by [`AcquisitionConfig::validate`] before a session starts.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(try_from = "ConfigFields")]
pub struct AcquisitionConfig {
    pub tx_focus_distance_mm: i32,
    pub use_custom_tx_frequency: bool,
    pub tx_frequency_hz: i32,
    pub pulse_shape: PulseShape,
    pub rx_acquisition_depth_mm: i32,
    pub rx_decimation: u8,
}

impl AcquisitionConfig {
    /// Read, parse and validate a configuration file
    pub fn load<P: AsRef<Path>>(path: P) -> AcqResult<Self> {
        let path = path.as_ref();
        let content = std::fs::read_to_string(path).map_err(|e| AcqError::ConfigParse {
            path: path.to_path_buf(),
            reason: "cannot open configuration file".to_string(),
            source: Some(e),
        })?;
        Self::parse(&content).map_err(|err| match err {
            AcqError::ConfigParse { reason, source, .. } => AcqError::ConfigParse {
                path: path.to_path_buf(),
                reason,
                source,
            },
            other => other,
        })
    }

    /// Parse and validate configuration text
    pub fn parse(content: &str) -> AcqResult<Self> {
        let tokens: Vec<&str> = content.split_whitespace().collect();
        if tokens.len() != limits::CONFIG_FIELD_COUNT {
            return Err(parse_error(format!(
                "expected {} fields, found {}",
                limits::CONFIG_FIELD_COUNT,
                tokens.len()
            )));
        }

        let tx_focus_distance_mm = parse_int(tokens[0], "txFocusDistanceMm")?;
        let use_custom_tx_frequency = match tokens[1] {
            "0" => false,
            "1" => true,
            other => {
                return Err(parse_error(format!(
                    "useCustomTxFrequency must be 0 or 1, found '{}'",
                    other
                )))
            }
        };
        let tx_frequency_hz = parse_int(tokens[2], "txFrequencyHz")?;
        let pulse_shape = PulseShape::new(tokens[3]).ok_or_else(|| AcqError::ConfigValidation {
            field: "TX pulse shape length",
            value: tokens[3].len().to_string(),
            min: "1".to_string(),
            max: format!("{} characters", limits::MAX_PULSE_SHAPE_LEN),
        })?;
        let rx_acquisition_depth_mm = parse_int(tokens[4], "rxAcquisitionDepthMm")?;
        let rx_decimation = parse_int(tokens[5], "rxDecimation")?;
        let rx_decimation = u8::try_from(rx_decimation).map_err(|_| decimation_error(rx_decimation))?;

        let config = Self {
            tx_focus_distance_mm,
            use_custom_tx_frequency,
            tx_frequency_hz,
            pulse_shape,
            rx_acquisition_depth_mm,
            rx_decimation,
        };
        config.validate()?;
        Ok(config)
    }

    /// Range checks on focus distance, acquisition depth and decimation
    pub fn validate(&self) -> AcqResult<()> {
        validate_range(
            "TX focus distance",
            self.tx_focus_distance_mm,
            limits::MIN_TX_FOCUS_DISTANCE_MM,
            limits::MAX_TX_FOCUS_DISTANCE_MM,
            "mm",
        )?;
        validate_range(
            "RX depth",
            self.rx_acquisition_depth_mm,
            limits::MIN_RX_ACQUISITION_DEPTH_MM,
            limits::MAX_RX_ACQUISITION_DEPTH_MM,
            "mm",
        )?;
        let decimation = i32::from(self.rx_decimation);
        if decimation > limits::MAX_RX_DECIMATION {
            return Err(decimation_error(decimation));
        }
        Ok(())
    }

    /// Render back to the file format
    pub fn to_file_format(&self) -> String {
        format!(
            "{} {} {} {} {} {}\n",
            self.tx_focus_distance_mm,
            u8::from(self.use_custom_tx_frequency),
            self.tx_frequency_hz,
            self.pulse_shape,
            self.rx_acquisition_depth_mm,
            self.rx_decimation
        )
    }
}

impl FromStr for AcquisitionConfig {
    type Err = AcqError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::parse(s)
    }
}

/// Serialized shape of [`AcquisitionConfig`], validated on conversion
#[derive(Deserialize)]
struct ConfigFields {
    tx_focus_distance_mm: i32,
    use_custom_tx_frequency: bool,
    tx_frequency_hz: i32,
    pulse_shape: PulseShape,
    rx_acquisition_depth_mm: i32,
    rx_decimation: u8,
}

impl TryFrom<ConfigFields> for AcquisitionConfig {
    type Error = AcqError;

    fn try_from(fields: ConfigFields) -> Result<Self, Self::Error> {
        let config = Self {
            tx_focus_distance_mm: fields.tx_focus_distance_mm,
            use_custom_tx_frequency: fields.use_custom_tx_frequency,
            tx_frequency_hz: fields.tx_frequency_hz,
            pulse_shape: fields.pulse_shape,
            rx_acquisition_depth_mm: fields.rx_acquisition_depth_mm,
            rx_decimation: fields.rx_decimation,
        };
        config.validate()?;
        Ok(config)
    }
}

fn decimation_error(value: i32) -> AcqError {
    AcqError::ConfigValidation {
        field: "RX decimation",
        value: value.to_string(),
        min: limits::MIN_RX_DECIMATION.to_string(),
        max: limits::MAX_RX_DECIMATION.to_string(),
    }
}

fn parse_error(reason: String) -> AcqError {
    AcqError::ConfigParse {
        path: Default::default(),
        reason,
        source: None,
    }
}

fn parse_int(token: &str, field: &str) -> AcqResult<i32> {
    token
        .parse::<i32>()
        .map_err(|_| parse_error(format!("{} must be an integer, found '{}'", field, token)))
}
