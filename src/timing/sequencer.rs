//! Work/rest phase sequencing over an [`IntervalPlan`].
//!
//! The sequencer walks `steps × rounds` through alternating work and rest
//! phases:
//!
//! ```text
//! Countdown → Work → Rest → Work → … → Rest → Work(last) → Complete
//! ```
//!
//! A lead-in countdown precedes the first work phase and every re-entry
//! after a pause. There is no rest after the final work phase.
//!
//! Phase timing is delegated to [`CountdownTimer`]. When a refresh arrives
//! late, every phase that ended in the meantime is processed in order and
//! each following phase starts at the instant the previous one ended, so
//! the sequencer lands exactly where an uninterrupted run would be.

use chrono::{DateTime, Duration, Utc};
use serde::{Deserialize, Serialize};
use tracing::{debug, trace};

use super::countdown::{CountdownState, CountdownTimer, Expiry, ExpiryCause};
use super::plan::{IntervalPlan, PlanError, Step};
use super::stopwatch::RunState;

/// Named stage of a timed activity.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Phase {
    /// Get-ready lead-in
    Countdown,
    /// Exercise or focus interval
    Work,
    /// Break between work intervals
    Rest,
    /// Finished
    Complete,
}

impl Phase {
    /// Get display name.
    #[must_use]
    pub const fn display_name(&self) -> &'static str {
        match self {
            Self::Countdown => "Get ready",
            Self::Work => "Work",
            Self::Rest => "Rest",
            Self::Complete => "Complete",
        }
    }
}

impl std::fmt::Display for Phase {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.display_name())
    }
}

/// The two timed phases a plan alternates between.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Interval {
    Work,
    Rest,
}

impl From<Interval> for Phase {
    fn from(interval: Interval) -> Self {
        match interval {
            Interval::Work => Self::Work,
            Interval::Rest => Self::Rest,
        }
    }
}

/// Where the sequencer is.
///
/// The interval timer in [`PhaseSequencer::timer`] is `Active` in
/// `Running`, `Paused` in `Paused`, and idle or paused during a lead-in.
#[derive(Debug, Clone)]
enum Stage {
    /// Not started; reported as the first work phase
    Ready,
    /// Lead-in countdown before entering `next`
    LeadIn { timer: CountdownTimer, next: Interval },
    /// An interval is counting down
    Running(Interval),
    /// An interval is frozen
    Paused(Interval),
    /// Terminal
    Complete { progress: Progress, aborted: bool },
}

/// How much of a plan has been done.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct Progress {
    /// Work phases finished, across all rounds
    pub steps_completed: u32,
    /// Rounds whose every work phase is finished
    pub rounds_completed: u32,
}

/// A phase transition caused by a countdown ending.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PhaseChange {
    /// Phase that ended
    pub from: Phase,
    /// Phase that began
    pub to: Phase,
    /// Step index after the transition
    pub step_index: usize,
    /// Round after the transition
    pub round: u32,
    /// When the transition took effect
    pub at: DateTime<Utc>,
    /// Whether the ending phase ran out or was skipped
    pub cause: ExpiryCause,
}

/// Drives an interval plan through its phases.
#[derive(Debug, Clone)]
pub struct PhaseSequencer {
    plan: IntervalPlan,
    step_index: usize,
    round: u32,
    stage: Stage,
    timer: CountdownTimer,
}

impl PhaseSequencer {
    /// Create a sequencer for `plan`.
    ///
    /// # Errors
    ///
    /// Returns an error if the plan has no steps, zero rounds or a zero
    /// duration.
    pub fn new(plan: IntervalPlan) -> Result<Self, PlanError> {
        plan.validate()?;
        Ok(Self {
            plan,
            step_index: 0,
            round: 1,
            stage: Stage::Ready,
            timer: CountdownTimer::new(),
        })
    }

    /// Begin the plan with the lead-in countdown.
    pub fn start(&mut self, now: DateTime<Utc>) -> bool {
        if !matches!(self.stage, Stage::Ready) {
            trace!(phase = %self.phase(), "sequencer start ignored");
            return false;
        }
        debug!(
            steps = self.plan.steps.len(),
            rounds = self.plan.rounds,
            "interval plan started"
        );
        self.begin_lead_in(Interval::Work, now);
        true
    }

    /// Freeze the current phase.
    ///
    /// Pausing a lead-in discards it; the next resume starts a fresh one.
    /// Callers should [`refresh`](Self::refresh) first so a phase that has
    /// already run out is advanced rather than paused.
    pub fn pause(&mut self, now: DateTime<Utc>) -> bool {
        match self.stage {
            Stage::LeadIn { next, .. } => {
                self.stage = Stage::Paused(next);
            }
            Stage::Running(interval) => {
                if !self.timer.pause(now) {
                    return false;
                }
                self.stage = Stage::Paused(interval);
            }
            Stage::Ready | Stage::Paused(_) | Stage::Complete { .. } => {
                trace!(phase = %self.phase(), "sequencer pause ignored");
                return false;
            }
        }
        debug!(phase = %self.phase(), step = self.step_index, round = self.round, "paused");
        true
    }

    /// Resume through a fresh lead-in countdown.
    pub fn resume(&mut self, now: DateTime<Utc>) -> bool {
        let Stage::Paused(interval) = self.stage else {
            trace!(phase = %self.phase(), "sequencer resume ignored");
            return false;
        };
        debug!(phase = %Phase::from(interval), "resuming");
        self.begin_lead_in(interval, now);
        true
    }

    /// End the current phase immediately and move to the next one.
    ///
    /// If phases ran out since the last refresh, those transitions are
    /// returned instead and nothing is skipped. Ignored while not started,
    /// paused or complete.
    pub fn skip(&mut self, now: DateTime<Utc>) -> Vec<PhaseChange> {
        let pending = self.refresh(now);
        if !pending.is_empty() {
            return pending;
        }

        let change = match &mut self.stage {
            Stage::LeadIn { timer, next } => {
                let next = *next;
                timer.skip(now).map(|expiry| self.finish_lead_in(next, expiry))
            }
            Stage::Running(interval) => {
                let interval = *interval;
                self.timer
                    .skip(now)
                    .map(|expiry| self.advance(interval, expiry))
            }
            Stage::Ready | Stage::Paused(_) | Stage::Complete { .. } => None,
        };

        if change.is_none() {
            trace!(phase = %self.phase(), "sequencer skip ignored");
        }
        change.into_iter().collect()
    }

    /// Recompute from `now`, advancing through every phase that has ended.
    pub fn refresh(&mut self, now: DateTime<Utc>) -> Vec<PhaseChange> {
        let mut changes = Vec::new();
        loop {
            let change = match &mut self.stage {
                Stage::LeadIn { timer, next } => {
                    let next = *next;
                    match timer.refresh(now) {
                        Some(expiry) => self.finish_lead_in(next, expiry),
                        None => break,
                    }
                }
                Stage::Running(interval) => {
                    let interval = *interval;
                    match self.timer.refresh(now) {
                        Some(expiry) => self.advance(interval, expiry),
                        None => break,
                    }
                }
                Stage::Ready | Stage::Paused(_) | Stage::Complete { .. } => break,
            };
            changes.push(change);
        }
        changes
    }

    /// Abort the plan, keeping the progress made so far.
    ///
    /// Returns the partial progress, or `None` if the plan had not started
    /// or was already complete.
    pub fn finish_early(&mut self) -> Option<Progress> {
        if matches!(self.stage, Stage::Ready | Stage::Complete { .. }) {
            trace!(phase = %self.phase(), "sequencer finish ignored");
            return None;
        }
        let progress = self.progress();
        self.timer.cancel();
        self.stage = Stage::Complete {
            progress,
            aborted: true,
        };
        debug!(
            steps_completed = progress.steps_completed,
            rounds_completed = progress.rounds_completed,
            "plan finished early"
        );
        Some(progress)
    }

    /// Go back to the start of the same plan.
    pub fn reset(&mut self) {
        self.step_index = 0;
        self.round = 1;
        self.stage = Stage::Ready;
        self.timer = CountdownTimer::new();
    }

    fn begin_lead_in(&mut self, next: Interval, now: DateTime<Utc>) {
        if self.plan.countdown_seconds == 0 {
            self.enter(next, now);
            return;
        }
        let mut timer = CountdownTimer::new();
        timer.start(self.plan.countdown_duration(), now);
        self.stage = Stage::LeadIn { timer, next };
    }

    fn finish_lead_in(&mut self, next: Interval, expiry: Expiry) -> PhaseChange {
        self.enter(next, expiry.at);
        self.change(Phase::Countdown, expiry)
    }

    fn enter(&mut self, interval: Interval, at: DateTime<Utc>) {
        if self.timer.state() == CountdownState::Paused {
            self.timer.resume(at);
        } else {
            let duration = self.duration_of(interval);
            self.timer = CountdownTimer::new();
            self.timer.start(duration, at);
        }
        self.stage = Stage::Running(interval);
    }

    fn advance(&mut self, ended: Interval, expiry: Expiry) -> PhaseChange {
        match ended {
            Interval::Work => {
                if self.is_last_step() && self.is_last_round() {
                    self.stage = Stage::Complete {
                        progress: Progress {
                            steps_completed: self.plan.total_work_phases(),
                            rounds_completed: self.plan.rounds,
                        },
                        aborted: false,
                    };
                } else {
                    self.stage = Stage::Running(Interval::Rest);
                    let rest = self.duration_of(Interval::Rest);
                    self.timer = CountdownTimer::new();
                    self.timer.start(rest, expiry.at);
                }
            }
            Interval::Rest => {
                if self.is_last_step() {
                    self.step_index = 0;
                    self.round += 1;
                } else {
                    self.step_index += 1;
                }
                self.timer = CountdownTimer::new();
                self.timer.start(self.plan.work_duration(), expiry.at);
                self.stage = Stage::Running(Interval::Work);
            }
        }
        self.change(ended.into(), expiry)
    }

    fn change(&self, from: Phase, expiry: Expiry) -> PhaseChange {
        let change = PhaseChange {
            from,
            to: self.phase(),
            step_index: self.step_index,
            round: self.round,
            at: expiry.at,
            cause: expiry.cause,
        };
        debug!(
            from = %change.from,
            to = %change.to,
            step = change.step_index,
            round = change.round,
            cause = ?change.cause,
            "phase change"
        );
        change
    }

    fn duration_of(&self, interval: Interval) -> Duration {
        match interval {
            Interval::Work => self.plan.work_duration(),
            Interval::Rest => self.plan.rest_after(self.progress().steps_completed),
        }
    }

    fn is_last_step(&self) -> bool {
        self.step_index == self.plan.steps.len() - 1
    }

    fn is_last_round(&self) -> bool {
        self.round == self.plan.rounds
    }

    fn pending_interval(&self) -> Option<Interval> {
        match self.stage {
            Stage::Ready => Some(Interval::Work),
            Stage::LeadIn { next, .. } => Some(next),
            Stage::Running(interval) | Stage::Paused(interval) => Some(interval),
            Stage::Complete { .. } => None,
        }
    }

    /// Work phases and rounds finished so far.
    ///
    /// During a work phase the current step is not yet counted; during the
    /// rest that follows it, it is.
    #[must_use]
    #[allow(clippy::cast_possible_truncation)]
    pub fn progress(&self) -> Progress {
        if let Stage::Complete { progress, .. } = self.stage {
            return progress;
        }
        if matches!(self.stage, Stage::Ready) {
            return Progress::default();
        }

        let per_round = self.plan.steps.len() as u32;
        let before_round = (self.round - 1) * per_round;
        let step = self.step_index as u32;

        match self.pending_interval() {
            Some(Interval::Rest) => Progress {
                steps_completed: before_round + step + 1,
                rounds_completed: if self.is_last_step() {
                    self.round
                } else {
                    self.round - 1
                },
            },
            _ => Progress {
                steps_completed: before_round + step,
                rounds_completed: self.round - 1,
            },
        }
    }

    /// Current phase. Before `start` this is the first work phase.
    #[must_use]
    pub fn phase(&self) -> Phase {
        match self.stage {
            Stage::LeadIn { .. } => Phase::Countdown,
            Stage::Complete { .. } => Phase::Complete,
            Stage::Ready | Stage::Running(_) | Stage::Paused(_) => self
                .pending_interval()
                .map_or(Phase::Complete, Phase::from),
        }
    }

    /// Coarse run state.
    #[must_use]
    pub const fn run_state(&self) -> RunState {
        match self.stage {
            Stage::Ready => RunState::Idle,
            Stage::LeadIn { .. } | Stage::Running(_) => RunState::Running,
            Stage::Paused(_) => RunState::Paused,
            Stage::Complete { .. } => RunState::Stopped,
        }
    }

    /// Phase, step index and round in one read.
    #[must_use]
    pub fn position(&self) -> (Phase, usize, u32) {
        (self.phase(), self.step_index, self.round)
    }

    /// Remaining time in the current phase as of `now`.
    #[must_use]
    pub fn remaining(&self, now: DateTime<Utc>) -> Duration {
        match &self.stage {
            Stage::Ready => self.plan.work_duration(),
            Stage::LeadIn { timer, .. } => timer.remaining(now),
            // Paused during the very first lead-in: the interval never started.
            Stage::Paused(interval) if self.timer.state() == CountdownState::Idle => {
                self.duration_of(*interval)
            }
            Stage::Running(_) | Stage::Paused(_) => self.timer.remaining(now),
            Stage::Complete { .. } => Duration::zero(),
        }
    }

    /// Remaining whole seconds in the current phase, rounded up.
    #[must_use]
    pub fn remaining_seconds(&self, now: DateTime<Utc>) -> i64 {
        crate::core::ceil_seconds(self.remaining(now))
    }

    /// When the running phase or lead-in will end, if something is counting.
    #[must_use]
    pub fn next_expiry(&self) -> Option<DateTime<Utc>> {
        match &self.stage {
            Stage::LeadIn { timer, .. } => timer.expires_at(),
            Stage::Running(_) => self.timer.expires_at(),
            Stage::Ready | Stage::Paused(_) | Stage::Complete { .. } => None,
        }
    }

    /// Index of the current step.
    #[must_use]
    pub const fn step_index(&self) -> usize {
        self.step_index
    }

    /// Current round, starting at 1.
    #[must_use]
    pub const fn round(&self) -> u32 {
        self.round
    }

    /// The current step.
    #[must_use]
    pub fn current_step(&self) -> &Step {
        &self.plan.steps[self.step_index]
    }

    /// The plan being run.
    #[must_use]
    pub const fn plan(&self) -> &IntervalPlan {
        &self.plan
    }

    /// Whether the plan has finished, naturally or early.
    #[must_use]
    pub const fn is_complete(&self) -> bool {
        matches!(self.stage, Stage::Complete { .. })
    }

    /// Whether the plan was finished early.
    #[must_use]
    pub const fn is_aborted(&self) -> bool {
        matches!(self.stage, Stage::Complete { aborted: true, .. })
    }
}
