// src/output/raw_writer.rs
//! Raw per-scanline data files

use std::fs::File;
use std::io::{BufWriter, Write};
use std::path::{Path, PathBuf};

use tracing::{debug, info};

use crate::config::constants::{acquisition, paths};
use crate::config::AcquisitionMode;
use crate::error::{AcqError, AcqResult};
use crate::hal::UltrasoundPlatform;
use crate::output::SessionLog;

/// File names of one session
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OutputNaming {
    dir: PathBuf,
    probe_code: i32,
    mode: AcquisitionMode,
}

impl OutputNaming {
    pub fn new<P: AsRef<Path>>(dir: P, probe_code: i32, mode: AcquisitionMode) -> Self {
        Self {
            dir: dir.as_ref().to_path_buf(),
            probe_code,
            mode,
        }
    }

    /// `probeId_<id>_<mode>.log`
    pub fn log_path(&self) -> PathBuf {
        self.dir.join(format!(
            "probeId_{}_{}.{}",
            self.probe_code,
            self.mode.tag(),
            paths::LOG_EXTENSION
        ))
    }

    /// `probeId_<id>_<mode>_scanline_<n>.raw`
    pub fn raw_path(&self, scanline: u32) -> PathBuf {
        self.dir.join(format!(
            "probeId_{}_{}_scanline_{}.{}",
            self.probe_code,
            self.mode.tag(),
            scanline,
            paths::RAW_EXTENSION
        ))
    }
}

/// Outcome of saving one scanline
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SavedScanline {
    pub path: PathBuf,
    pub frame_size: usize,
    pub frames_acquired: usize,
    pub frames_saved: usize,
    pub crc32: u32,
}

/// Write the first `min(collected, 16)` frames of the cine buffer to the scanline's raw file
pub fn save_scanline<P: UltrasoundPlatform>(
    platform: &P,
    naming: &OutputNaming,
    scanline: u32,
    log: &mut SessionLog,
) -> AcqResult<SavedScanline> {
    let frames_acquired = platform.collected_frame_count();
    if frames_acquired == 0 {
        return Err(AcqError::NoFramesCaptured { scanline });
    }

    let frame_size = platform.frame_size();
    let frames_saved = frames_acquired.min(acquisition::MAX_SAVED_FRAMES);
    let requested = frames_saved * frame_size;

    let cine = platform.cine_buffer();
    if cine.len() < requested {
        return Err(AcqError::FrameBuffer {
            requested,
            available: cine.len(),
        });
    }
    let data = &cine[..requested];

    let path = naming.raw_path(scanline);
    write_raw_file(&path, data)?;
    let crc32 = crc32fast::hash(data);

    log.record(format_args!(
        "Frame size: {}\nAcquired frames: {} Saved frames: {}\n\n",
        frame_size, frames_acquired, frames_saved
    ))?;
    log.record(format_args!("Raw data CRC-32: {:08x}\n", crc32))?;

    debug!(scanline, frames_acquired, frames_saved, crc32, "scanline frames written");
    info!(path = %path.display(), "Successfully stored data in file");

    Ok(SavedScanline {
        path,
        frame_size,
        frames_acquired,
        frames_saved,
        crc32,
    })
}

fn write_raw_file(path: &Path, data: &[u8]) -> AcqResult<()> {
    let to_write_error = |source| AcqError::FileWrite {
        path: path.to_path_buf(),
        source,
    };
    let file = File::create(path).map_err(to_write_error)?;
    let mut writer = BufWriter::new(file);
    writer.write_all(data).map_err(to_write_error)?;
    writer.flush().map_err(to_write_error)
}
