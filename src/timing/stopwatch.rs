//! Wall-clock stopwatch with pause/resume.
//!
//! Elapsed time is never stored. It is recomputed on every read from the
//! start timestamp, the accumulated pause time and the current pause (if
//! any), so a read that comes late still returns the right value.

use chrono::{DateTime, Duration, Utc};
use serde::{Deserialize, Serialize};
use tracing::trace;

use crate::core::floor_seconds;

/// Run state shared by stopwatches, sequencers and session snapshots.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum RunState {
    /// Not started yet
    Idle,
    /// Counting
    Running,
    /// Paused, can be resumed
    Paused,
    /// Finished; values are frozen
    Stopped,
}

impl std::fmt::Display for RunState {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Idle => write!(f, "Idle"),
            Self::Running => write!(f, "Running"),
            Self::Paused => write!(f, "Paused"),
            Self::Stopped => write!(f, "Stopped"),
        }
    }
}

/// An open-ended wall-clock measurement.
#[derive(Debug, Clone)]
pub struct Stopwatch {
    /// When the stopwatch was started
    started_at: Option<DateTime<Utc>>,
    /// Sum of all completed pauses
    accumulated_paused: Duration,
    /// When the current pause began
    pause_started_at: Option<DateTime<Utc>>,
    /// When the stopwatch was stopped
    stopped_at: Option<DateTime<Utc>>,
    /// Current state
    state: RunState,
}

impl Stopwatch {
    /// Create an idle stopwatch.
    #[must_use]
    pub const fn new() -> Self {
        Self {
            started_at: None,
            accumulated_paused: Duration::zero(),
            pause_started_at: None,
            stopped_at: None,
            state: RunState::Idle,
        }
    }

    /// Start measuring. Only valid while idle.
    pub fn start(&mut self, now: DateTime<Utc>) -> bool {
        if self.state != RunState::Idle {
            trace!(state = %self.state, "stopwatch start ignored");
            return false;
        }
        self.started_at = Some(now);
        self.state = RunState::Running;
        true
    }

    /// Pause. Only valid while running.
    pub fn pause(&mut self, now: DateTime<Utc>) -> bool {
        if self.state != RunState::Running {
            trace!(state = %self.state, "stopwatch pause ignored");
            return false;
        }
        self.pause_started_at = Some(now);
        self.state = RunState::Paused;
        true
    }

    /// Resume after a pause, folding the pause into the accumulated total.
    pub fn resume(&mut self, now: DateTime<Utc>) -> bool {
        if self.state != RunState::Paused {
            trace!(state = %self.state, "stopwatch resume ignored");
            return false;
        }
        self.fold_pause(now);
        self.state = RunState::Running;
        true
    }

    /// Stop for good. Valid while running or paused.
    ///
    /// A pause in progress is closed at `now`, so the final paused total
    /// includes it.
    pub fn stop(&mut self, now: DateTime<Utc>) -> bool {
        match self.state {
            RunState::Running | RunState::Paused => {
                self.fold_pause(now);
                self.stopped_at = Some(now);
                self.state = RunState::Stopped;
                true
            }
            RunState::Idle | RunState::Stopped => {
                trace!(state = %self.state, "stopwatch stop ignored");
                false
            }
        }
    }

    /// Return to idle, clearing every field.
    pub fn reset(&mut self) {
        *self = Self::new();
    }

    fn fold_pause(&mut self, now: DateTime<Utc>) {
        if let Some(paused_at) = self.pause_started_at.take() {
            self.accumulated_paused += non_negative(now.signed_duration_since(paused_at));
        }
    }

    /// Running time as of `now`, excluding pauses.
    #[must_use]
    pub fn elapsed(&self, now: DateTime<Utc>) -> Duration {
        let Some(started_at) = self.started_at else {
            return Duration::zero();
        };
        let end = self.stopped_at.unwrap_or(now);
        let total = end.signed_duration_since(started_at);
        non_negative(total - self.paused(end))
    }

    /// Total paused time as of `now`, including a pause in progress.
    #[must_use]
    pub fn paused(&self, now: DateTime<Utc>) -> Duration {
        let current_pause = self
            .pause_started_at
            .map_or_else(Duration::zero, |paused_at| {
                non_negative(now.signed_duration_since(paused_at))
            });
        self.accumulated_paused + current_pause
    }

    /// Whole seconds of running time as of `now`.
    #[must_use]
    pub fn elapsed_seconds(&self, now: DateTime<Utc>) -> i64 {
        floor_seconds(self.elapsed(now))
    }

    /// Whole seconds of paused time as of `now`.
    #[must_use]
    pub fn paused_seconds(&self, now: DateTime<Utc>) -> i64 {
        floor_seconds(self.paused(now))
    }

    /// Get the current state.
    #[must_use]
    pub const fn state(&self) -> RunState {
        self.state
    }

    /// When the stopwatch was started.
    #[must_use]
    pub const fn started_at(&self) -> Option<DateTime<Utc>> {
        self.started_at
    }

    /// When the stopwatch was stopped.
    #[must_use]
    pub const fn stopped_at(&self) -> Option<DateTime<Utc>> {
        self.stopped_at
    }

    /// Sum of completed pauses, not counting one in progress.
    #[must_use]
    pub const fn accumulated_paused(&self) -> Duration {
        self.accumulated_paused
    }
}

impl Default for Stopwatch {
    fn default() -> Self {
        Self::new()
    }
}

fn non_negative(d: Duration) -> Duration {
    d.max(Duration::zero())
}
