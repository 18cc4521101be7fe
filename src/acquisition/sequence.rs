// src/acquisition/sequence.rs
//! Per-scanline transmit/receive sequence construction
//!
//! Every scanline is one sequence of `channels` lines sharing the same
//! transmit and receive geometry. Line `i` receives on channel `i` only, so a
//! frame holds one RF line per receive channel.

use tracing::{debug, info};

use crate::acquisition::SessionState;
use crate::config::constants::{geometry, platform};
use crate::config::{AcquisitionConfig, AcquisitionMode, PlatformSettings, TransmitVariant};
use crate::error::{AcqError, AcqResult, HardwareError, IntoAcqError};
use crate::hal::{
    ApertureCurve, ChannelMask, ProbeIdentity, ReceiveParams, SequenceStats, TransmitParams,
    UltrasoundPlatform,
};
use crate::output::SessionLog;

/// Session-wide inputs to the sequence geometry
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SequenceOptions {
    /// Receive channels, one line each
    pub channels: u32,
    /// Steering angle used in single receive mode [mdeg]
    pub compound_angle_mdeg: i32,
    pub tx_variant: TransmitVariant,
}

impl SequenceOptions {
    pub fn from_settings(settings: &PlatformSettings) -> Self {
        Self {
            channels: platform::CHANNEL_COUNT,
            compound_angle_mdeg: settings.compound_angle_mdeg,
            tx_variant: settings.tx_variant,
        }
    }
}

impl Default for SequenceOptions {
    fn default() -> Self {
        Self::from_settings(&PlatformSettings::default())
    }
}

/// Aperture center shared by transmit and receive
///
/// Phased array keeps the aperture centered on the probe; single receive
/// walks it one element per scanline. Halving is integer division.
pub fn center_element(mode: AcquisitionMode, scanline: u32, elements: u32, channels: u32) -> f64 {
    let base = match mode {
        AcquisitionMode::PhasedArray => elements / 2,
        AcquisitionMode::SingleChannelReceive => channels / 2 + scanline,
    };
    f64::from(base) + geometry::CENTER_ELEMENT_OFFSET
}

/// Steering angle [mdeg]
///
/// Phased array sweeps linearly from -45000 at scanline 0 in integer steps of
/// `90000 / (elements - 1)`. Single receive uses the compound angle.
pub fn steering_angle_mdeg(
    mode: AcquisitionMode,
    scanline: u32,
    elements: u32,
    compound_angle_mdeg: i32,
) -> i32 {
    match mode {
        AcquisitionMode::PhasedArray => {
            let span = i64::from(geometry::PHASED_MAX_ANGLE_MDEG - geometry::PHASED_MIN_ANGLE_MDEG);
            let divisor = i64::from(elements.saturating_sub(1).max(1));
            let offset = span * i64::from(scanline) / divisor;
            geometry::PHASED_MIN_ANGLE_MDEG + offset as i32
        }
        AcquisitionMode::SingleChannelReceive => compound_angle_mdeg,
    }
}

pub fn transmit_params(
    mode: AcquisitionMode,
    scanline: u32,
    config: &AcquisitionConfig,
    probe: &ProbeIdentity,
    options: &SequenceOptions,
) -> TransmitParams {
    let single_element = options.tx_variant == TransmitVariant::SingleElement;
    let flashlight = options.tx_variant == TransmitVariant::Flashlight;

    let frequency_hz = if config.use_custom_tx_frequency {
        config.tx_frequency_hz
    } else {
        probe.center_frequency_hz
    };

    TransmitParams {
        center_element: center_element(mode, scanline, probe.element_count, options.channels),
        aperture: if single_element { 0 } else { options.channels },
        focus_distance_um: if single_element {
            geometry::SINGLE_ELEMENT_FOCUS_UM
        } else {
            geometry::MICROMETERS_PER_MILLIMETER * config.tx_focus_distance_mm
        },
        angle_mdeg: steering_angle_mdeg(mode, scanline, probe.element_count, options.compound_angle_mdeg),
        frequency_hz,
        pulse_shape: config.pulse_shape.clone(),
        tx_repeat: geometry::TX_REPEAT,
        tx_delay: geometry::TX_DELAY,
        speed_of_sound: geometry::SPEED_OF_SOUND_M_S,
        use_manual_delays: flashlight,
        manual_delays: flashlight.then(|| vec![0; geometry::MANUAL_DELAY_COUNT]),
        use_mask: false,
        table_index: geometry::TABLE_INDEX_NONE,
        sync: flashlight,
    }
}

/// Receive geometry with every channel enabled; lines narrow the mask
pub fn receive_params(
    mode: AcquisitionMode,
    scanline: u32,
    config: &AcquisitionConfig,
    probe: &ProbeIdentity,
    options: &SequenceOptions,
) -> ReceiveParams {
    let flashlight = options.tx_variant == TransmitVariant::Flashlight;

    ReceiveParams {
        center_element: center_element(mode, scanline, probe.element_count, options.channels),
        aperture: options.channels,
        angle_mdeg: steering_angle_mdeg(mode, scanline, probe.element_count, options.compound_angle_mdeg),
        max_aperture_depth_um: geometry::MAX_APERTURE_DEPTH_UM,
        acquisition_depth_um: geometry::MICROMETERS_PER_MILLIMETER * config.rx_acquisition_depth_mm,
        save_delay: 0,
        speed_of_sound: geometry::SPEED_OF_SOUND_M_S,
        channel_mask: ChannelMask::all(),
        apply_focus: true,
        use_manual_delays: false,
        decimation: config.rx_decimation,
        lgc_value: 0,
        tgc_sel: 0,
        table_index: geometry::TABLE_INDEX_NONE,
        custom_line_duration_ns: if flashlight { geometry::FLASHLIGHT_LINE_DURATION_NS } else { 0 },
        weight_type: geometry::RX_WEIGHT_TYPE,
        aperture_curve: ApertureCurve::default(),
    }
}

/// Build, load and log the sequence of one scanline
///
/// Marks the sequence valid only once the platform accepted every line.
pub fn build_sequence<P: UltrasoundPlatform>(
    platform: &mut P,
    state: &mut SessionState,
    mode: AcquisitionMode,
    scanline: u32,
    config: &AcquisitionConfig,
    options: &SequenceOptions,
    log: &mut SessionLog,
) -> AcqResult<SequenceStats> {
    let refuse = |reason: &str| AcqError::SequenceBuild {
        scanline,
        reason: reason.to_string(),
        source: None,
    };

    let probe = state.probe.clone().ok_or_else(|| refuse("no probe selected"))?;
    if state.running {
        return Err(refuse("acquisition is running"));
    }
    if options.channels == 0 || options.channels > ChannelMask::CAPACITY {
        return Err(refuse("channel count outside the receive mask"));
    }
    state.sequence_valid = false;

    let tx = transmit_params(mode, scanline, config, &probe, options);
    let rx = receive_params(mode, scanline, config, &probe, options);

    let hardware = |reason: &'static str| {
        move |source: HardwareError| AcqError::SequenceBuild {
            scanline,
            reason: reason.to_string(),
            source: Some(source),
        }
    };

    platform.begin_sequence().acq_err(hardware("platform refused to begin the sequence"))?;

    let mut masks = Vec::with_capacity(options.channels as usize);
    for channel in 0..options.channels {
        let channel_mask =
            ChannelMask::single(channel).ok_or_else(|| refuse("channel outside the receive mask"))?;
        let line_rx = ReceiveParams { channel_mask, ..rx.clone() };
        let line = platform
            .add_line(&tx, &line_rx)
            .acq_err(hardware("platform rejected a line"))?;
        debug!(scanline, channel, line_size = line.line_size_bytes, "line added");
        masks.push((channel, channel_mask));
    }

    platform.end_sequence().acq_err(hardware("platform refused to end the sequence"))?;

    let stats = SequenceStats {
        frame_size_bytes: platform.frame_size(),
        frame_rate_hz: platform.frame_rate(),
        max_frame_count: platform.max_frame_count(),
    };
    state.sequence_valid = true;

    log.write_scanline_banner(scanline, mode.scanline_count() - 1)?;
    log.write_line_parameters(&tx, &rx)?;
    for (channel, mask) in masks {
        log.write_channel_mask(channel, mask)?;
    }
    log.write_sequence_stats(&stats)?;

    info!(
        scanline,
        frame_size = stats.frame_size_bytes,
        frame_rate = stats.frame_rate_hz,
        buffer_frames = stats.max_frame_count,
        "sequence statistics"
    );
    Ok(stats)
}
