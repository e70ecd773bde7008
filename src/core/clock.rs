//! Clock sources for the timing engine.
//!
//! Timers never count ticks. Every elapsed or remaining value is derived
//! from a timestamp read here, so a clock that is read late simply yields
//! the correct later value.

use std::cell::Cell;
use std::rc::Rc;
use std::time::Instant;

use chrono::{DateTime, Duration, Utc};

/// Source of the current absolute time.
pub trait Clock {
    /// Returns the current time.
    fn now(&self) -> DateTime<Utc>;
}

/// Clock backed by the system time.
///
/// The wall time is sampled once at construction; later readings add the
/// monotonic time elapsed since then, so they never run backwards when the
/// system clock is adjusted.
#[derive(Debug, Clone, Copy)]
pub struct SystemClock {
    anchor_wall: DateTime<Utc>,
    anchor_instant: Instant,
}

impl SystemClock {
    /// Create a clock anchored at the current time.
    #[must_use]
    pub fn new() -> Self {
        Self {
            anchor_wall: Utc::now(),
            anchor_instant: Instant::now(),
        }
    }
}

impl Default for SystemClock {
    fn default() -> Self {
        Self::new()
    }
}

impl Clock for SystemClock {
    fn now(&self) -> DateTime<Utc> {
        let since_anchor =
            Duration::from_std(self.anchor_instant.elapsed()).unwrap_or_else(|_| Duration::zero());
        self.anchor_wall + since_anchor
    }
}

/// Manually driven clock for tests and deterministic replay.
///
/// Clones share the same underlying time, so a test can hand one clone to
/// a controller and advance it through another.
#[derive(Debug, Clone)]
pub struct ManualClock {
    current: Rc<Cell<DateTime<Utc>>>,
}

impl ManualClock {
    /// Create a clock frozen at `start`.
    #[must_use]
    pub fn at(start: DateTime<Utc>) -> Self {
        Self {
            current: Rc::new(Cell::new(start)),
        }
    }

    /// Set the current time.
    pub fn set(&self, time: DateTime<Utc>) {
        self.current.set(time);
    }

    /// Move the clock forward.
    pub fn advance(&self, by: Duration) {
        self.current.set(self.current.get() + by);
    }

    /// Move the clock forward by whole seconds.
    pub fn advance_secs(&self, seconds: i64) {
        self.advance(Duration::seconds(seconds));
    }
}

impl Clock for ManualClock {
    fn now(&self) -> DateTime<Utc> {
        self.current.get()
    }
}
