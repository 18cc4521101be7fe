//! Synthetic RF line generation for realistic simulated frames
//! Location: src/hal/simulation/rf_generator.rs

use crate::hal::types::{ReceiveParams, TransmitParams};
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};

/// Base sampling frequency before decimation [Hz]
pub const BASE_SAMPLING_FREQUENCY_HZ: f64 = 40_000_000.0;
/// Fixed per-line overhead added to the echo round trip [µs]
const LINE_OVERHEAD_US: f64 = 10.0;
const SAMPLE_BYTES: usize = std::mem::size_of::<i16>();
const ECHO_AMPLITUDE: f64 = 8000.0;

/// Renders one receive line as little-endian 16-bit samples
#[derive(Debug, Clone)]
pub struct RfLineGenerator {
    seed: u64,
    noise_level: f64,
}

impl RfLineGenerator {
    pub fn new(seed: u64, noise_level: f64) -> Self {
        Self { seed, noise_level: noise_level.clamp(0.0, 1.0) }
    }

    pub fn sampling_frequency_hz(decimation: u8) -> f64 {
        BASE_SAMPLING_FREQUENCY_HZ / f64::from(1u32 << decimation.min(2))
    }

    /// Echo round trip to the acquisition depth [µs]
    pub fn round_trip_us(rx: &ReceiveParams) -> f64 {
        let depth_m = f64::from(rx.acquisition_depth_um) * 1e-6;
        2.0 * depth_m / f64::from(rx.speed_of_sound.max(1)) * 1e6
    }

    pub fn line_duration_us(rx: &ReceiveParams) -> f64 {
        if rx.custom_line_duration_ns > 0 {
            f64::from(rx.custom_line_duration_ns) / 1000.0
        } else {
            Self::round_trip_us(rx) + LINE_OVERHEAD_US
        }
    }

    /// Samples recorded for a line, unless overridden
    pub fn samples_per_line(rx: &ReceiveParams, override_samples: Option<usize>) -> usize {
        override_samples.unwrap_or_else(|| {
            let fs = Self::sampling_frequency_hz(rx.decimation);
            (Self::round_trip_us(rx) * 1e-6 * fs).ceil() as usize
        })
    }

    pub fn line_size_bytes(samples: usize) -> usize {
        samples * SAMPLE_BYTES
    }

    /// Append one line of a frame to `out`
    pub fn render_line(
        &self,
        out: &mut Vec<u8>,
        tx: &TransmitParams,
        rx: &ReceiveParams,
        samples: usize,
        frame_id: u32,
        line_index: usize,
    ) {
        let mut rng = StdRng::seed_from_u64(
            self.seed ^ (u64::from(frame_id) << 32) ^ line_index as u64,
        );

        let fs = Self::sampling_frequency_hz(rx.decimation);
        let carrier = 2.0 * std::f64::consts::PI * f64::from(tx.frequency_hz) / fs;

        // Echo sits at the transmit focus, pushed back for channels far from the aperture center
        let channel = rx.channel_mask.channels().next().unwrap_or(0);
        let focus_ratio = if rx.acquisition_depth_um > 0 {
            (f64::from(tx.focus_distance_um) / f64::from(rx.acquisition_depth_um)).min(0.95)
        } else {
            0.5
        };
        let lateral = (f64::from(channel) - 31.5).abs() / 31.5;
        let center = samples as f64 * focus_ratio * (1.0 + 0.05 * lateral);
        let width = (samples as f64 / 16.0).max(1.0);

        out.reserve(Self::line_size_bytes(samples));
        for i in 0..samples {
            let t = i as f64 - center;
            let envelope = (-(t * t) / (2.0 * width * width)).exp();
            let noise: f64 = rng.gen_range(-1.0..1.0) * self.noise_level;
            let value = ECHO_AMPLITUDE * (envelope * (carrier * i as f64).sin() + noise);
            let sample = value.clamp(f64::from(i16::MIN), f64::from(i16::MAX)) as i16;
            out.extend_from_slice(&sample.to_le_bytes());
        }
    }
}
