//! Clock abstraction for timestamps and cooldown checks
//!
//! The engine never reads wall-clock time globally; it asks an injected
//! [`Clock`]. Production wiring uses [`SystemClock`]; replay and tests use
//! [`SimClock`], which only moves when told to.

use chrono::{DateTime, Duration, Utc};
use std::fmt;
use std::sync::atomic::{AtomicI64, Ordering};

/// Source of the current instant
pub trait Clock: Send + Sync + fmt::Debug {
    /// The current instant according to this clock
    fn now(&self) -> DateTime<Utc>;
}

/// Wall-clock time
#[derive(Debug, Default, Clone, Copy)]
pub struct SystemClock;

impl Clock for SystemClock {
    fn now(&self) -> DateTime<Utc> {
        Utc::now()
    }
}

/// Manually driven clock for replay and tests
///
/// Stores the instant as epoch milliseconds in an atomic, so concurrent
/// readers always see a fully written value. Instants outside chrono's
/// representable range clamp to the epoch.
#[derive(Debug, Default)]
pub struct SimClock {
    epoch_millis: AtomicI64,
}

impl SimClock {
    /// Create a clock positioned at the Unix epoch
    pub fn new() -> Self {
        SimClock::default()
    }

    /// Create a clock positioned at the given instant
    pub fn at(instant: DateTime<Utc>) -> Self {
        SimClock {
            epoch_millis: AtomicI64::new(instant.timestamp_millis()),
        }
    }

    /// Move the clock to the given instant
    pub fn set(&self, instant: DateTime<Utc>) {
        self.epoch_millis
            .store(instant.timestamp_millis(), Ordering::SeqCst);
    }

    /// Move the clock to the given number of seconds past the epoch
    pub fn set_secs(&self, secs: i64) {
        self.epoch_millis
            .store(secs.saturating_mul(1000), Ordering::SeqCst);
    }

    /// Advance the clock by the given duration
    pub fn advance(&self, duration: Duration) {
        self.epoch_millis
            .fetch_add(duration.num_milliseconds(), Ordering::SeqCst);
    }
}

impl Clock for SimClock {
    fn now(&self) -> DateTime<Utc> {
        let millis = self.epoch_millis.load(Ordering::SeqCst);
        DateTime::from_timestamp_millis(millis).unwrap_or(DateTime::UNIX_EPOCH)
    }
}
