// src/config/constants.rs
//! System-wide acquisition constants

/// Platform defaults (SONIX TOUCH with USM v4)
pub mod platform {
    pub const DEFAULT_FIRMWARE_PATH: &str = "../texo/dat";
    pub const DEFAULT_PCI_SLOT: i32 = 3;
    pub const DEFAULT_USM_VERSION: i32 = 4;
    pub const DEFAULT_HV_CHANNEL_MODE: i32 = 0;

    /// Receive channels available on the platform, also the transmit aperture
    pub const CHANNEL_COUNT: u32 = 64;
    /// Only the first connector is used
    pub const DEFAULT_CONNECTOR: u32 = 0;

    /// Converts to the platform's voltage levels
    pub const DEFAULT_POWER: i32 = 10;
    pub const DEFAULT_GAIN: f64 = 0.80;
}

/// Acquisition session constants
pub mod acquisition {
    /// Maximum number of frames written per scanline
    pub const MAX_SAVED_FRAMES: usize = 16;

    pub const PHASED_ARRAY_SCANLINES: u32 = 64;
    pub const SINGLE_RX_SCANLINES: u32 = 65;

    /// Steer angle for spatial compound imaging [milli-degrees]
    pub const DEFAULT_COMPOUND_ANGLE_MDEG: i32 = 0;

    pub const PHASED_ARRAY_TAG: &str = "phasedArray";
    pub const SINGLE_RX_TAG: &str = "singleRx";
}

/// Beam geometry constants
pub mod geometry {
    pub const PHASED_MIN_ANGLE_MDEG: i32 = -45_000;
    pub const PHASED_MAX_ANGLE_MDEG: i32 = 45_000;

    /// Added to the center element so delays round symmetrically (apertures are even)
    pub const CENTER_ELEMENT_OFFSET: f64 = 0.5;

    pub const SPEED_OF_SOUND_M_S: i32 = 1540;
    pub const TX_DELAY: i32 = 100;
    pub const TX_REPEAT: i32 = 0;
    pub const TABLE_INDEX_NONE: i32 = -1;

    /// Long focus that nullifies delays for single element transmit [µm]
    pub const SINGLE_ELEMENT_FOCUS_UM: i32 = 300_000;
    pub const MAX_APERTURE_DEPTH_UM: i32 = 30_000;
    /// Line duration when triggering an external DAQ in flashlight mode [ns]
    pub const FLASHLIGHT_LINE_DURATION_NS: i32 = 200_000;
    pub const MANUAL_DELAY_COUNT: usize = 129;

    pub const RX_WEIGHT_TYPE: i32 = 1;
    pub const RX_APERTURE_CURVE_TOP: u8 = 10;
    pub const RX_APERTURE_CURVE_MID: u8 = 50;
    pub const RX_APERTURE_CURVE_BOTTOM: u8 = 100;
    pub const RX_APERTURE_CURVE_VMID: u8 = 50;

    pub const MICROMETERS_PER_MILLIMETER: i32 = 1000;
}

/// Acquisition parameter limits
pub mod limits {
    pub const MIN_TX_FOCUS_DISTANCE_MM: i32 = 10;
    pub const MAX_TX_FOCUS_DISTANCE_MM: i32 = 300;
    pub const MIN_RX_ACQUISITION_DEPTH_MM: i32 = 10;
    pub const MAX_RX_ACQUISITION_DEPTH_MM: i32 = 300;
    pub const MIN_RX_DECIMATION: i32 = 0;
    pub const MAX_RX_DECIMATION: i32 = 2;

    pub const MAX_PULSE_SHAPE_LEN: usize = 64;
    /// Probe name buffer of 16 bytes, one reserved for the terminator
    pub const MAX_PROBE_NAME_LEN: usize = 15;

    /// Number of scalar fields in an acquisition configuration file
    pub const CONFIG_FIELD_COUNT: usize = 6;
}

/// Settling delays between acquisition steps
pub mod timing {
    pub const SETTLE_AFTER_SETUP_MS: u64 = 1000;
    pub const SETTLE_AFTER_RUN_MS: u64 = 2000;
    pub const SETTLE_AFTER_STOP_MS: u64 = 1000;
    pub const SETTLE_AFTER_SAVE_MS: u64 = 3000;
}

/// File system locations and naming
pub mod paths {
    pub const DEFAULT_OUTPUT_DIR: &str = ".";
    pub const LOG_EXTENSION: &str = "log";
    pub const RAW_EXTENSION: &str = "raw";
    pub const ENV_PREFIX: &str = "RFACQ_";
    pub const LOCAL_SETTINGS_FILE: &str = "rf-acquire.toml";
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_limits_are_ordered() {
        assert!(limits::MIN_TX_FOCUS_DISTANCE_MM < limits::MAX_TX_FOCUS_DISTANCE_MM);
        assert!(limits::MIN_RX_ACQUISITION_DEPTH_MM < limits::MAX_RX_ACQUISITION_DEPTH_MM);
        assert!(limits::MIN_RX_DECIMATION <= limits::MAX_RX_DECIMATION);
    }

    #[test]
    fn test_channel_count_fits_mask() {
        assert!(platform::CHANNEL_COUNT <= 64);
        assert!(acquisition::MAX_SAVED_FRAMES > 0);
    }
}
