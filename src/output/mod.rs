// src/output/mod.rs
//! Session outputs: the text log and the raw scanline files

pub mod raw_writer;
pub mod session_log;

pub use raw_writer::{save_scanline, OutputNaming, SavedScanline};
pub use session_log::SessionLog;
