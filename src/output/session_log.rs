// src/output/session_log.rs
//! Plain-text session log
//!
//! One log per session, named `probeId_<id>_<mode>.log`. Every record is
//! flushed immediately so the log survives an aborted session.

use std::fmt;
use std::fs::File;
use std::io::{self, Write};
use std::path::{Path, PathBuf};

use crate::config::AcquisitionMode;
use crate::error::{AcqError, AcqResult};
use crate::hal::{ChannelMask, ProbeIdentity, ReceiveParams, SequenceStats, TransmitParams};

const SEPARATOR_WIDTH: usize = 80;

/// Session log writer
pub struct SessionLog {
    path: PathBuf,
    sink: Box<dyn Write + Send>,
}

impl SessionLog {
    /// Create or truncate the log file at `path`
    pub fn create<P: AsRef<Path>>(path: P) -> AcqResult<Self> {
        let path = path.as_ref().to_path_buf();
        let file = File::create(&path).map_err(|source| AcqError::LogFile {
            path: path.clone(),
            source,
        })?;
        Ok(Self { path, sink: Box::new(file) })
    }

    /// Log writing into an arbitrary sink; `path` is only used in error reports
    pub fn from_writer<P: AsRef<Path>>(path: P, sink: Box<dyn Write + Send>) -> Self {
        Self { path: path.as_ref().to_path_buf(), sink }
    }

    /// Log that drops every record
    pub fn discard() -> Self {
        Self::from_writer("", Box::new(io::sink()))
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Write one formatted record and flush it
    pub fn record(&mut self, args: fmt::Arguments<'_>) -> AcqResult<()> {
        self.sink
            .write_fmt(args)
            .and_then(|_| self.sink.flush())
            .map_err(|source| AcqError::LogFile {
                path: self.path.clone(),
                source,
            })
    }

    pub fn write_header(
        &mut self,
        timestamp: &str,
        probe: &ProbeIdentity,
        mode: AcquisitionMode,
    ) -> AcqResult<()> {
        self.record(format_args!("Date and time: {}\n\n", timestamp))?;
        self.record(format_args!(
            "Probe ID: {}\nProbe name: {}\n\n",
            probe.code, probe.name
        ))?;
        self.record(format_args!("Acquisition configuration: {}\n\n", mode.tag()))
    }

    pub fn write_scanline_banner(&mut self, scanline: u32, last_scanline: u32) -> AcqResult<()> {
        self.record(format_args!(
            "{}\nParameters of scanline #{}/{}\n\n",
            "-".repeat(SEPARATOR_WIDTH),
            scanline,
            last_scanline
        ))
    }

    /// Geometry shared by every line of a scanline
    pub fn write_line_parameters(&mut self, tx: &TransmitParams, rx: &ReceiveParams) -> AcqResult<()> {
        self.record(format_args!(
            "tx.aperture = {}\n\
             tx.focusDistance = {}\n\
             tx.frequency = {}\n\
             tx.pulseShape = {}\n\
             tx.useManualDelays = {}\n\
             rx.aperture = {}\n\
             rx.acquisitionDepth = {}\n\
             rx.applyFocus = {}\n\
             rx.decimation = {}\n\
             rx.customLineDuration = {}\n\
             rx.angle = {}\n\
             tx.centerElement = {:.6}\n\
             rx.centerElement = {:.6}\n",
            tx.aperture,
            tx.focus_distance_um,
            tx.frequency_hz,
            tx.pulse_shape,
            u8::from(tx.use_manual_delays),
            rx.aperture,
            rx.acquisition_depth_um,
            u8::from(rx.apply_focus),
            rx.decimation,
            rx.custom_line_duration_ns,
            rx.angle_mdeg,
            tx.center_element,
            rx.center_element,
        ))
    }

    pub fn write_channel_mask(&mut self, channel: u32, mask: ChannelMask) -> AcqResult<()> {
        let [low, high] = mask.words();
        self.record(format_args!(
            "channel #{channel} -> rx.channelMask[0] = {low:x}\n\
             channel #{channel} -> rx.channelMask[1] = {high:x}\n"
        ))
    }

    pub fn write_sequence_stats(&mut self, stats: &SequenceStats) -> AcqResult<()> {
        self.record(format_args!(
            "\nSequence statistics:\nFrame size = {} bytes\nFrame rate = {:.1} fr/sec\nBuffer size = {} frames\n\n",
            stats.frame_size_bytes, stats.frame_rate_hz, stats.max_frame_count
        ))
    }

    /// Mirror a session error into the log
    pub fn write_error(&mut self, err: &AcqError) -> AcqResult<()> {
        self.record(format_args!("ERROR: Error during {}\nERROR: {}\n", err.stage(), err.report()))
    }

    pub fn write_end(&mut self, timestamp: &str) -> AcqResult<()> {
        self.record(format_args!("End of acquisition.\n\nDate and time: {}\n\n", timestamp))
    }
}

impl fmt::Debug for SessionLog {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("SessionLog").field("path", &self.path).finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    fn probe() -> ProbeIdentity {
        ProbeIdentity {
            code: 11,
            name: "SA4-2/24".to_string(),
            connector: 0,
            center_frequency_hz: 2_500_000,
            element_count: 64,
        }
    }

    #[test]
    fn test_header_and_end() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("probeId_11_phasedArray.log");

        let mut log = SessionLog::create(&path).unwrap();
        log.write_header("2018_3_21-8_1_5", &probe(), AcquisitionMode::PhasedArray).unwrap();
        log.write_end("2018_3_21-8_9_0").unwrap();

        let content = std::fs::read_to_string(&path).unwrap();
        assert!(content.starts_with("Date and time: 2018_3_21-8_1_5\n\nProbe ID: 11\nProbe name: SA4-2/24\n\n"));
        assert!(content.contains("Acquisition configuration: phasedArray\n\n"));
        assert!(content.ends_with("End of acquisition.\n\nDate and time: 2018_3_21-8_9_0\n\n"));
    }

    #[test]
    fn test_channel_mask_hex() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("mask.log");

        let mut log = SessionLog::create(&path).unwrap();
        log.write_channel_mask(33, ChannelMask::single(33).unwrap()).unwrap();

        let content = std::fs::read_to_string(&path).unwrap();
        assert_eq!(
            content,
            "channel #33 -> rx.channelMask[0] = 0\nchannel #33 -> rx.channelMask[1] = 2\n"
        );
    }

    #[test]
    fn test_stats_format() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("stats.log");

        let mut log = SessionLog::create(&path).unwrap();
        log.write_sequence_stats(&SequenceStats {
            frame_size_bytes: 1024,
            frame_rate_hz: 12.345,
            max_frame_count: 300,
        })
        .unwrap();

        let content = std::fs::read_to_string(&path).unwrap();
        assert!(content.contains("Frame rate = 12.3 fr/sec\n"));
        assert!(content.contains("Buffer size = 300 frames\n"));
    }

    #[test]
    fn test_create_in_missing_directory_fails() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("missing").join("session.log");

        let err = SessionLog::create(&path).unwrap_err();
        assert!(matches!(err, AcqError::LogFile { .. }));
    }

    #[test]
    fn test_error_mirror_names_stage() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("error.log");

        let mut log = SessionLog::create(&path).unwrap();
        log.write_error(&AcqError::NoFramesCaptured { scanline: 4 }).unwrap();

        let content = std::fs::read_to_string(&path).unwrap();
        assert!(content.contains("ERROR: Error during data save\n"));
        assert!(content.contains("ERROR: no frames have been acquired for scanline 4\n"));
    }
}
