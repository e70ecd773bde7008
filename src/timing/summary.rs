//! Read models handed to callers: live snapshots, refresh reports and the
//! completion summary, plus the completion callback trait.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use super::countdown::Expiry;
use super::plan::Step;
use super::sequencer::{Phase, PhaseChange};
use super::stopwatch::RunState;

/// What kind of session a controller runs.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SessionKind {
    /// Open-ended workout with rest timer
    Workout,
    /// Open-ended free timer
    Stopwatch,
    /// Interval training plan
    Interval,
    /// Pomodoro focus cycle
    Pomodoro,
}

impl SessionKind {
    /// Get display name.
    #[must_use]
    pub const fn display_name(&self) -> &'static str {
        match self {
            Self::Workout => "Workout",
            Self::Stopwatch => "Stopwatch",
            Self::Interval => "Interval",
            Self::Pomodoro => "Pomodoro",
        }
    }
}

impl std::fmt::Display for SessionKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.display_name())
    }
}

/// Final record of a session, handed to the completion callback.
///
/// The caller decides how to persist it.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SessionSummary {
    /// Session kind
    pub kind: SessionKind,
    /// When the session started
    pub started_at: DateTime<Utc>,
    /// When the session ended
    pub ended_at: DateTime<Utc>,
    /// Running time, excluding pauses
    pub total_elapsed_seconds: i64,
    /// Time spent paused
    pub paused_seconds: i64,
    /// Rounds fully completed
    pub rounds_completed: u32,
    /// Work phases completed across all rounds
    pub steps_completed: u32,
    /// Ended by the user before the plan finished
    pub aborted: bool,
}

/// Point-in-time view of a session for display.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Snapshot {
    /// Session kind
    pub kind: SessionKind,
    /// Current phase; `None` for open-ended sessions
    pub phase: Option<Phase>,
    /// Run state
    pub state: RunState,
    /// Remaining seconds in the phase, or elapsed seconds if open-ended
    pub remaining_or_elapsed_seconds: i64,
    /// Whether `remaining_or_elapsed_seconds` counts down
    pub counts_down: bool,
    /// Running time of the whole session
    pub total_elapsed_seconds: i64,
    /// Index of the current step
    pub current_step_index: usize,
    /// The current step, for interval sessions
    pub current_step: Option<Step>,
    /// Current round, starting at 1
    pub current_round: u32,
    /// Steps per round (0 if open-ended)
    pub steps_total: usize,
    /// Rounds in the plan (0 if open-ended)
    pub rounds_total: u32,
    /// Remaining seconds of the rest timer, if one is running
    pub rest_remaining_seconds: Option<i64>,
}

/// What a refresh changed.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RefreshReport {
    /// Phase transitions since the previous refresh, in order
    pub phase_changes: Vec<PhaseChange>,
    /// The rest timer ran out
    pub rest_expired: Option<Expiry>,
    /// The session completed during this refresh
    pub completed: Option<SessionSummary>,
}

impl RefreshReport {
    /// Whether anything happened worth signalling to the user.
    #[must_use]
    pub fn is_eventful(&self) -> bool {
        !self.phase_changes.is_empty() || self.rest_expired.is_some() || self.completed.is_some()
    }
}

/// Receiver for the end-of-session summary.
///
/// Called exactly once per session, on natural completion or an explicit
/// finish. Any `FnMut(&SessionSummary)` closure works.
#[cfg_attr(test, mockall::automock)]
pub trait CompletionHandler {
    /// Handle a finished session.
    fn on_complete(&mut self, summary: &SessionSummary);
}

impl<F> CompletionHandler for F
where
    F: FnMut(&SessionSummary),
{
    fn on_complete(&mut self, summary: &SessionSummary) {
        self(summary);
    }
}
