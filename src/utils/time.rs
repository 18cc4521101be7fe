// src/utils/time.rs
//! Settle delay strategies and session timestamps

use chrono::{DateTime, Local, TimeZone};
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, Mutex};
use std::time::Duration;

/// Wait strategy for hardware settling, injectable for testing
pub trait Delay: Send + Sync {
    fn wait(&self, duration: Duration);
}

impl<D: Delay + ?Sized> Delay for Arc<D> {
    fn wait(&self, duration: Duration) {
        (**self).wait(duration)
    }
}

/// Blocks the calling thread
#[derive(Debug, Default, Clone, Copy)]
pub struct ThreadSleepDelay;

impl Delay for ThreadSleepDelay {
    fn wait(&self, duration: Duration) {
        std::thread::sleep(duration);
    }
}

/// Returns immediately
#[derive(Debug, Default, Clone, Copy)]
pub struct NoDelay;

impl Delay for NoDelay {
    fn wait(&self, _duration: Duration) {}
}

/// Records requested waits without sleeping
#[derive(Debug, Default)]
pub struct MockDelay {
    total_nanos: AtomicU64,
    waits: Mutex<Vec<Duration>>,
}

impl MockDelay {
    pub fn new() -> Self {
        Self::default()
    }

    /// Sum of all requested waits
    pub fn total(&self) -> Duration {
        Duration::from_nanos(self.total_nanos.load(Ordering::Relaxed))
    }

    /// Requested waits in call order
    pub fn waits(&self) -> Vec<Duration> {
        self.waits.lock().map(|w| w.clone()).unwrap_or_default()
    }
}

impl Delay for MockDelay {
    fn wait(&self, duration: Duration) {
        self.total_nanos
            .fetch_add(duration.as_nanos() as u64, Ordering::Relaxed);
        if let Ok(mut waits) = self.waits.lock() {
            waits.push(duration);
        }
    }
}

/// Session log timestamp, `year_month_day-hour_minute_second` without padding
pub fn session_timestamp<Tz: TimeZone>(at: &DateTime<Tz>) -> String
where
    Tz::Offset: std::fmt::Display,
{
    at.format("%Y_%-m_%-d-%-H_%-M_%-S").to_string()
}

/// Current local time as a session log timestamp
pub fn local_session_timestamp() -> String {
    session_timestamp(&Local::now())
}
