// src/acquisition/controller.rs
//! Run/stop control of a loaded sequence

use tracing::{error, info, warn};

use crate::acquisition::SessionState;
use crate::error::{AcqError, AcqResult, IntoAcqError};
use crate::hal::UltrasoundPlatform;
use crate::output::SessionLog;

/// Start imaging with the loaded sequence
pub fn run<P: UltrasoundPlatform>(
    platform: &mut P,
    state: &mut SessionState,
    log: &mut SessionLog,
) -> AcqResult<()> {
    if !state.sequence_valid {
        error!("cannot run, no sequence selected");
        return Err(AcqError::NotReady);
    }
    if state.running {
        error!("sequence is already running");
        return Err(AcqError::AlreadyRunning);
    }

    platform.run_image().acq_err(|source| AcqError::Run { source })?;
    state.running = true;

    log.record(format_args!("System running\n"))?;
    info!("System running");
    Ok(())
}

/// Stop imaging and return the number of collected frames
///
/// The loaded sequence is invalidated whether or not the platform stops
/// cleanly; the next scanline builds a new one.
pub fn stop<P: UltrasoundPlatform>(
    platform: &mut P,
    state: &mut SessionState,
    log: &mut SessionLog,
) -> AcqResult<usize> {
    if !state.running {
        warn!("stop requested while not running");
        return Err(AcqError::NotRunning);
    }

    let stopped = platform.stop_image();
    state.sequence_valid = false;
    stopped.acq_err(|source| AcqError::Stop { source })?;
    state.running = false;

    let frames = platform.collected_frame_count();
    log.record(format_args!("\nSTOP - Acquired ({}) frames\n", frames))?;
    log.record(format_args!("Acquisition stopped\n"))?;
    info!(frames, "acquisition stopped");
    Ok(frames)
}
