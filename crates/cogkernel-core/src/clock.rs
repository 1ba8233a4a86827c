//! Time sources
//!
//! Core decay is anchored to wall-clock time. Every component that needs
//! "now" receives a [`Clock`] instead of calling `Utc::now()` directly, so
//! tests can advance time without sleeping.

use std::sync::{Arc, Mutex};

use chrono::{DateTime, Duration, Utc};

/// A source of the current time.
pub trait Clock: Send + Sync {
    /// The current instant.
    fn now(&self) -> DateTime<Utc>;
}

/// Shared, thread-safe clock handle.
pub type SharedClock = Arc<dyn Clock>;

/// Clock backed by the system wall clock.
#[derive(Debug, Clone, Copy, Default)]
pub struct SystemClock;

impl Clock for SystemClock {
    fn now(&self) -> DateTime<Utc> {
        Utc::now()
    }
}

/// Manually driven clock for deterministic simulation.
///
/// Cloning shares the underlying instant, so a test can keep one handle and
/// hand another to the kernel.
///
/// ```rust
/// use chrono::Duration;
/// use cogkernel_core::clock::{Clock, ManualClock};
///
/// let clock = ManualClock::at_millis(1_000_000);
/// let start = clock.now();
/// clock.advance(Duration::seconds(30));
/// assert_eq!((clock.now() - start).num_seconds(), 30);
/// ```
#[derive(Debug, Clone)]
pub struct ManualClock {
    current: Arc<Mutex<DateTime<Utc>>>,
}

impl ManualClock {
    /// Start at the given instant.
    pub fn new(start: DateTime<Utc>) -> Self {
        Self {
            current: Arc::new(Mutex::new(start)),
        }
    }

    /// Start at a Unix timestamp in milliseconds.
    pub fn at_millis(millis: i64) -> Self {
        Self::new(DateTime::from_timestamp_millis(millis).unwrap_or(DateTime::UNIX_EPOCH))
    }

    /// Move time forward. Negative durations are ignored; time never runs backwards.
    pub fn advance(&self, by: Duration) {
        if by < Duration::zero() {
            return;
        }
        let mut current = self.current.lock().unwrap_or_else(|e| e.into_inner());
        *current += by;
    }

    /// Move time forward by fractional seconds.
    pub fn advance_secs(&self, secs: f64) {
        self.advance(Duration::milliseconds((secs * 1000.0).round() as i64));
    }

    /// Jump to an absolute instant (ignored if it lies in the past).
    pub fn set(&self, instant: DateTime<Utc>) {
        let mut current = self.current.lock().unwrap_or_else(|e| e.into_inner());
        if instant > *current {
            *current = instant;
        }
    }
}

impl Default for ManualClock {
    fn default() -> Self {
        Self::new(Utc::now())
    }
}

impl Clock for ManualClock {
    fn now(&self) -> DateTime<Utc> {
        *self.current.lock().unwrap_or_else(|e| e.into_inner())
    }
}

/// Seconds elapsed between two instants, never negative.
pub fn elapsed_secs(from: DateTime<Utc>, to: DateTime<Utc>) -> f64 {
    let millis = to.signed_duration_since(from).num_milliseconds().max(0);
    millis as f64 / 1000.0
}
