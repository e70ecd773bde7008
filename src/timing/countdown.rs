//! Single-phase countdown built on [`Stopwatch`].
//!
//! Remaining time is `total - elapsed`, where elapsed comes from the inner
//! stopwatch, so the same pause accounting applies. Expiry is only ever
//! detected by [`CountdownTimer::refresh`] and is reported exactly once.

use chrono::{DateTime, Duration, Utc};
use serde::{Deserialize, Serialize};
use tracing::trace;

use super::stopwatch::Stopwatch;
use crate::core::ceil_seconds;

/// Countdown state.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum CountdownState {
    /// Not armed
    Idle,
    /// Counting down
    Active,
    /// Paused, can be resumed
    Paused,
    /// Reached zero or was skipped
    Expired,
}

impl std::fmt::Display for CountdownState {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Idle => write!(f, "Idle"),
            Self::Active => write!(f, "Active"),
            Self::Paused => write!(f, "Paused"),
            Self::Expired => write!(f, "Expired"),
        }
    }
}

/// Why a countdown expired.
///
/// The resulting state is the same either way.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ExpiryCause {
    /// Ran down to zero
    Elapsed,
    /// Ended early by the user
    Skipped,
}

/// One-time expiry notification.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Expiry {
    /// The instant the countdown ended. For natural expiry this is when
    /// remaining time hit zero, which may be earlier than the refresh that
    /// noticed it.
    pub at: DateTime<Utc>,
    /// Why it ended
    pub cause: ExpiryCause,
}

/// A bounded countdown.
#[derive(Debug, Clone)]
pub struct CountdownTimer {
    /// Configured duration of the current countdown
    total: Duration,
    /// Measures running time of the current countdown
    stopwatch: Stopwatch,
    /// Current state
    state: CountdownState,
}

impl CountdownTimer {
    /// Create an idle countdown.
    #[must_use]
    pub const fn new() -> Self {
        Self {
            total: Duration::zero(),
            stopwatch: Stopwatch::new(),
            state: CountdownState::Idle,
        }
    }

    /// Arm and start a countdown of `duration`.
    ///
    /// Valid while idle or after a previous countdown expired.
    pub fn start(&mut self, duration: Duration, now: DateTime<Utc>) -> bool {
        match self.state {
            CountdownState::Idle | CountdownState::Expired => {
                self.total = duration.max(Duration::zero());
                self.stopwatch.reset();
                self.stopwatch.start(now);
                self.state = CountdownState::Active;
                true
            }
            CountdownState::Active | CountdownState::Paused => {
                trace!(state = %self.state, "countdown start ignored");
                false
            }
        }
    }

    /// Pause. Only valid while active with time left.
    ///
    /// A countdown that has already run out is not paused; its expiry is
    /// reported by the next [`refresh`](Self::refresh).
    pub fn pause(&mut self, now: DateTime<Utc>) -> bool {
        if self.state != CountdownState::Active || self.remaining(now) <= Duration::zero() {
            trace!(state = %self.state, "countdown pause ignored");
            return false;
        }
        self.stopwatch.pause(now);
        self.state = CountdownState::Paused;
        true
    }

    /// Resume after a pause.
    pub fn resume(&mut self, now: DateTime<Utc>) -> bool {
        if self.state != CountdownState::Paused {
            trace!(state = %self.state, "countdown resume ignored");
            return false;
        }
        self.stopwatch.resume(now);
        self.state = CountdownState::Active;
        true
    }

    /// Recompute from `now` and report expiry if the countdown just ran out.
    ///
    /// Returns `Some` exactly once per countdown, however late the call is.
    pub fn refresh(&mut self, now: DateTime<Utc>) -> Option<Expiry> {
        let expires_at = self.expires_at()?;
        if expires_at > now {
            return None;
        }
        self.stopwatch.stop(expires_at);
        self.state = CountdownState::Expired;
        Some(Expiry {
            at: expires_at,
            cause: ExpiryCause::Elapsed,
        })
    }

    /// Force the countdown to expire now.
    ///
    /// If it had already run out unnoticed, the natural expiry is reported
    /// instead.
    pub fn skip(&mut self, now: DateTime<Utc>) -> Option<Expiry> {
        if let Some(expiry) = self.refresh(now) {
            return Some(expiry);
        }
        match self.state {
            CountdownState::Active | CountdownState::Paused => {
                self.stopwatch.stop(now);
                self.state = CountdownState::Expired;
                Some(Expiry {
                    at: now,
                    cause: ExpiryCause::Skipped,
                })
            }
            CountdownState::Idle | CountdownState::Expired => {
                trace!(state = %self.state, "countdown skip ignored");
                None
            }
        }
    }

    /// Discard the countdown without expiring it.
    pub fn cancel(&mut self) {
        *self = Self::new();
    }

    /// When an active countdown will reach zero.
    #[must_use]
    pub fn expires_at(&self) -> Option<DateTime<Utc>> {
        if self.state != CountdownState::Active {
            return None;
        }
        let started_at = self.stopwatch.started_at()?;
        Some(started_at + self.stopwatch.accumulated_paused() + self.total)
    }

    /// Remaining time as of `now`, never negative.
    #[must_use]
    pub fn remaining(&self, now: DateTime<Utc>) -> Duration {
        match self.state {
            CountdownState::Idle => self.total,
            CountdownState::Expired => Duration::zero(),
            CountdownState::Active | CountdownState::Paused => {
                (self.total - self.stopwatch.elapsed(now)).max(Duration::zero())
            }
        }
    }

    /// Remaining whole seconds as of `now`, rounded up.
    #[must_use]
    pub fn remaining_seconds(&self, now: DateTime<Utc>) -> i64 {
        ceil_seconds(self.remaining(now))
    }

    /// Fraction of the countdown that has passed (0.0 - 1.0).
    #[must_use]
    #[allow(clippy::cast_precision_loss)]
    pub fn progress(&self, now: DateTime<Utc>) -> f64 {
        let total = self.total.num_milliseconds();
        if total <= 0 {
            return if self.state == CountdownState::Idle { 0.0 } else { 1.0 };
        }
        let remaining = self.remaining(now).num_milliseconds();
        1.0 - (remaining as f64 / total as f64)
    }

    /// Configured duration.
    #[must_use]
    pub const fn total(&self) -> Duration {
        self.total
    }

    /// Get the current state.
    #[must_use]
    pub const fn state(&self) -> CountdownState {
        self.state
    }
}

impl Default for CountdownTimer {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    fn at(seconds: i64) -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2024, 5, 6, 7, 0, 0).unwrap() + Duration::seconds(seconds)
    }

    fn started(seconds: i64) -> CountdownTimer {
        let mut timer = CountdownTimer::new();
        assert!(timer.start(Duration::seconds(seconds), at(0)));
        timer
    }

    #[test]
    fn test_remaining_counts_down() {
        let timer = started(60);

        assert_eq!(timer.remaining_seconds(at(0)), 60);
        assert_eq!(timer.remaining_seconds(at(45)), 15);
        assert_eq!(timer.state(), CountdownState::Active);
    }

    #[test]
    fn test_partial_second_rounds_up() {
        let timer = started(5);
        let now = at(0) + Duration::milliseconds(4300);

        assert_eq!(timer.remaining_seconds(now), 1);
    }

    #[test]
    fn test_late_refresh_expires_exactly_once() {
        let mut timer = started(5);

        assert_eq!(timer.refresh(at(3)), None);

        // First observed two seconds after it ran out.
        let expiry = timer.refresh(at(7)).unwrap();
        assert_eq!(expiry.at, at(5));
        assert_eq!(expiry.cause, ExpiryCause::Elapsed);
        assert_eq!(timer.state(), CountdownState::Expired);
        assert_eq!(timer.remaining_seconds(at(7)), 0);

        assert_eq!(timer.refresh(at(8)), None);
        assert_eq!(timer.refresh(at(60)), None);
    }

    #[test]
    fn test_remaining_never_negative_before_refresh() {
        let timer = started(5);

        assert_eq!(timer.remaining(at(7)), Duration::zero());
        assert_eq!(timer.remaining_seconds(at(700)), 0);
    }

    #[test]
    fn test_pause_resume_shifts_expiry() {
        let mut timer = started(10);
        timer.pause(at(4));
        assert_eq!(timer.remaining_seconds(at(30)), 6);
        assert_eq!(timer.refresh(at(30)), None);

        timer.resume(at(30));
        assert_eq!(timer.expires_at(), Some(at(36)));

        let expiry = timer.refresh(at(40)).unwrap();
        assert_eq!(expiry.at, at(36));
    }

    #[test]
    fn test_pause_after_running_out_is_ignored() {
        let mut timer = started(5);

        assert!(!timer.pause(at(6)));
        assert_eq!(timer.state(), CountdownState::Active);
        assert!(timer.refresh(at(6)).is_some());
    }

    #[test]
    fn test_skip_is_distinct_from_elapsed() {
        let mut timer = started(30);

        let expiry = timer.skip(at(12)).unwrap();
        assert_eq!(expiry.cause, ExpiryCause::Skipped);
        assert_eq!(expiry.at, at(12));
        assert_eq!(timer.state(), CountdownState::Expired);
        assert_eq!(timer.refresh(at(40)), None);
        assert_eq!(timer.skip(at(41)), None);
    }

    #[test]
    fn test_skip_after_running_out_reports_natural_expiry() {
        let mut timer = started(5);

        let expiry = timer.skip(at(9)).unwrap();
        assert_eq!(expiry.cause, ExpiryCause::Elapsed);
        assert_eq!(expiry.at, at(5));
    }

    #[test]
    fn test_skip_while_paused() {
        let mut timer = started(30);
        timer.pause(at(10));

        let expiry = timer.skip(at(20)).unwrap();
        assert_eq!(expiry.cause, ExpiryCause::Skipped);
        assert_eq!(timer.state(), CountdownState::Expired);
    }

    #[test]
    fn test_cancel_returns_to_idle_without_expiry() {
        let mut timer = started(30);
        timer.cancel();

        assert_eq!(timer.state(), CountdownState::Idle);
        assert_eq!(timer.refresh(at(100)), None);
        assert_eq!(timer.expires_at(), None);
    }

    #[test]
    fn test_invalid_transitions_are_noops() {
        let mut timer = CountdownTimer::new();
        assert!(!timer.pause(at(0)));
        assert!(!timer.resume(at(0)));
        assert_eq!(timer.skip(at(0)), None);

        let mut timer = started(30);
        assert!(!timer.start(Duration::seconds(99), at(1)));
        assert_eq!(timer.total(), Duration::seconds(30));
        assert!(!timer.resume(at(1)));
    }

    #[test]
    fn test_restart_after_expiry() {
        let mut timer = started(5);
        timer.refresh(at(5));

        assert!(timer.start(Duration::seconds(10), at(20)));
        assert_eq!(timer.remaining_seconds(at(22)), 8);
    }

    #[test]
    fn test_progress() {
        let timer = started(100);

        assert!((timer.progress(at(50)) - 0.5).abs() < 0.01);
        assert!((CountdownTimer::new().progress(at(0))).abs() < f64::EPSILON);
    }
}
