//! Common utilities for the acquisition tool
//!
//! - Settling delay strategies and session timestamps
//! - Parameter validation helpers

pub mod time;
pub mod validation;

pub use time::{
    local_session_timestamp,
    session_timestamp,
    Delay,
    MockDelay,
    NoDelay,
    ThreadSleepDelay,
};

pub use validation::{bounded_name, validate_range};
