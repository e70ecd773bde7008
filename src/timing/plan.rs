//! Interval plans: the ordered steps and durations a sequencer runs.
//!
//! Plans can be built in code, from CLI flags, or loaded from YAML:
//!
//! ```yaml
//! name: Leg day
//! rounds: 3
//! work_seconds: 40
//! rest_seconds: 20
//! steps:
//!   - reference_id: squat
//!     target_value: 20
//!   - reference_id: lunge
//! ```

use chrono::{DateTime, Duration, Utc};
use serde::{Deserialize, Serialize};
use thiserror::Error;

use super::sequencer::{Phase, PhaseSequencer};

/// Default lead-in before the first work phase and after every resume.
pub const DEFAULT_COUNTDOWN_SECONDS: u32 = 5;

/// Most work phases a single plan may hold.
pub const MAX_WORK_PHASES: u64 = 10_000;

/// Longest uninterrupted run a plan may describe: one week.
pub const MAX_PLAN_SECONDS: u64 = 7 * 24 * 60 * 60;

/// One exercise within a plan.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Step {
    /// Identifier of the exercise or task, owned by the caller
    pub reference_id: String,
    /// Target reps or seconds, if any
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub target_value: Option<u32>,
}

impl Step {
    /// Create a step.
    #[must_use]
    pub fn new(reference_id: impl Into<String>, target_value: Option<u32>) -> Self {
        Self {
            reference_id: reference_id.into(),
            target_value,
        }
    }

    /// Parse `REF` or `REF:TARGET`.
    ///
    /// # Errors
    ///
    /// Returns a message if the reference is empty or the target is not a
    /// non-negative integer.
    pub fn parse(s: &str) -> Result<Self, String> {
        let (reference, target) = match s.rsplit_once(':') {
            Some((reference, target)) => {
                let target = target
                    .trim()
                    .parse::<u32>()
                    .map_err(|_| format!("invalid target in step '{s}'"))?;
                (reference, Some(target))
            }
            None => (s, None),
        };

        let reference = reference.trim();
        if reference.is_empty() {
            return Err(format!("step '{s}' has no exercise reference"));
        }
        Ok(Self::new(reference, target))
    }
}

impl std::fmt::Display for Step {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self.target_value {
            Some(target) => write!(f, "{} x{}", self.reference_id, target),
            None => write!(f, "{}", self.reference_id),
        }
    }
}

/// A longer rest taken after every `every`-th completed work phase.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct LongRest {
    /// Work phases between long rests
    pub every: u32,
    /// Length of the long rest
    pub seconds: u32,
}

/// Configuration error in an interval plan.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum PlanError {
    /// No steps to sequence through.
    #[error("a plan needs at least one step")]
    EmptySteps,
    /// Zero rounds requested.
    #[error("rounds must be at least 1")]
    ZeroRounds,
    /// Work phase of zero length.
    #[error("work duration must be positive")]
    ZeroWorkSeconds,
    /// Rest phase of zero length.
    #[error("rest duration must be positive")]
    ZeroRestSeconds,
    /// Long rest that never triggers.
    #[error("long rest interval must be at least 1 work phase")]
    ZeroLongRestEvery,
    /// Long rest of zero length.
    #[error("long rest duration must be positive")]
    ZeroLongRestSeconds,
    /// A step without a reference.
    #[error("step {0} has an empty reference")]
    EmptyReference(usize),
    /// More work phases than a session can hold.
    #[error("plan has {0} work phases, at most {MAX_WORK_PHASES} are allowed")]
    TooManyPhases(u64),
    /// A run longer than a session can last.
    #[error("plan runs for {0} seconds, at most {MAX_PLAN_SECONDS} are allowed")]
    TooLong(u64),
}

/// An ordered workout or focus plan.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct IntervalPlan {
    /// Display name
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    /// Steps run in order each round
    pub steps: Vec<Step>,
    /// Full passes through the steps
    pub rounds: u32,
    /// Length of each work phase
    pub work_seconds: u32,
    /// Length of each rest phase
    pub rest_seconds: u32,
    /// Lead-in before the first work phase and after every resume; 0 disables it
    #[serde(default = "default_countdown_seconds")]
    pub countdown_seconds: u32,
    /// Optional longer rest
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub long_rest: Option<LongRest>,
}

const fn default_countdown_seconds() -> u32 {
    DEFAULT_COUNTDOWN_SECONDS
}

impl IntervalPlan {
    /// Create a plan with the default lead-in and no long rest.
    #[must_use]
    pub fn new(steps: Vec<Step>, rounds: u32, work_seconds: u32, rest_seconds: u32) -> Self {
        Self {
            name: None,
            steps,
            rounds,
            work_seconds,
            rest_seconds,
            countdown_seconds: DEFAULT_COUNTDOWN_SECONDS,
            long_rest: None,
        }
    }

    /// Build a Pomodoro plan: one focus step repeated for `cycles` rounds,
    /// short breaks in between and a long break after every `long_every`
    /// pomodoros.
    #[must_use]
    pub fn pomodoro(
        label: impl Into<String>,
        cycles: u32,
        work: Duration,
        short_break: Duration,
        long_break: Duration,
        long_every: u32,
    ) -> Self {
        let label = label.into();
        Self {
            name: Some(format!("Pomodoro: {label}")),
            steps: vec![Step::new(label, None)],
            rounds: cycles,
            work_seconds: whole_seconds(work),
            rest_seconds: whole_seconds(short_break),
            countdown_seconds: DEFAULT_COUNTDOWN_SECONDS,
            long_rest: Some(LongRest {
                every: long_every,
                seconds: whole_seconds(long_break),
            }),
        }
    }

    /// Set the lead-in length.
    #[must_use]
    pub fn with_countdown(mut self, seconds: u32) -> Self {
        self.countdown_seconds = seconds;
        self
    }

    /// Check the plan can be run.
    ///
    /// # Errors
    ///
    /// Returns the first problem found.
    pub fn validate(&self) -> Result<(), PlanError> {
        if self.steps.is_empty() {
            return Err(PlanError::EmptySteps);
        }
        if let Some(index) = self
            .steps
            .iter()
            .position(|s| s.reference_id.trim().is_empty())
        {
            return Err(PlanError::EmptyReference(index));
        }
        if self.rounds == 0 {
            return Err(PlanError::ZeroRounds);
        }
        if self.work_seconds == 0 {
            return Err(PlanError::ZeroWorkSeconds);
        }
        if self.rest_seconds == 0 {
            return Err(PlanError::ZeroRestSeconds);
        }
        if let Some(long_rest) = self.long_rest {
            if long_rest.every == 0 {
                return Err(PlanError::ZeroLongRestEvery);
            }
            if long_rest.seconds == 0 {
                return Err(PlanError::ZeroLongRestSeconds);
            }
        }

        let work_phases = self.steps.len() as u64 * u64::from(self.rounds);
        if work_phases > MAX_WORK_PHASES {
            return Err(PlanError::TooManyPhases(work_phases));
        }
        let longest_rest = self
            .long_rest
            .map_or(self.rest_seconds, |l| l.seconds.max(self.rest_seconds));
        let upper_bound = u64::from(self.countdown_seconds)
            + work_phases * u64::from(self.work_seconds)
            + (work_phases - 1) * u64::from(longest_rest);
        if upper_bound > MAX_PLAN_SECONDS {
            return Err(PlanError::TooLong(upper_bound));
        }
        Ok(())
    }

    /// Number of work phases in a full run.
    #[must_use]
    #[allow(clippy::cast_possible_truncation)]
    pub fn total_work_phases(&self) -> u32 {
        (self.steps.len() as u32).saturating_mul(self.rounds)
    }

    /// Length of the rest that follows the `work_done`-th work phase.
    #[must_use]
    pub fn rest_after(&self, work_done: u32) -> Duration {
        let seconds = match self.long_rest {
            Some(long_rest) if long_rest.every > 0 && work_done % long_rest.every == 0 => {
                long_rest.seconds
            }
            _ => self.rest_seconds,
        };
        Duration::seconds(i64::from(seconds))
    }

    /// Length of each work phase.
    #[must_use]
    pub fn work_duration(&self) -> Duration {
        Duration::seconds(i64::from(self.work_seconds))
    }

    /// Length of the lead-in.
    #[must_use]
    pub fn countdown_duration(&self) -> Duration {
        Duration::seconds(i64::from(self.countdown_seconds))
    }

    /// Lay out every phase of an uninterrupted run.
    ///
    /// The timeline comes from driving a real [`PhaseSequencer`] through
    /// simulated time, so it matches what a live session does.
    ///
    /// # Errors
    ///
    /// Returns an error if the plan is invalid.
    pub fn schedule(&self) -> Result<Vec<ScheduledPhase>, PlanError> {
        let mut sequencer = PhaseSequencer::new(self.clone())?;
        let origin = DateTime::<Utc>::default();
        let mut phases = Vec::new();

        sequencer.start(origin);
        let mut entered_at = origin;
        let mut current = sequencer.position();

        while sequencer.phase() != Phase::Complete {
            let Some(next_expiry) = sequencer.next_expiry() else {
                break;
            };
            for change in sequencer.refresh(next_expiry) {
                phases.push(ScheduledPhase {
                    phase: current.0,
                    step_index: current.1,
                    round: current.2,
                    offset_seconds: (entered_at - origin).num_seconds(),
                    duration_seconds: (change.at - entered_at).num_seconds(),
                });
                entered_at = change.at;
                current = (change.to, change.step_index, change.round);
            }
        }

        Ok(phases)
    }
}

fn whole_seconds(d: Duration) -> u32 {
    u32::try_from(d.num_seconds().max(0)).unwrap_or(u32::MAX)
}

/// One entry in a plan's timeline.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct ScheduledPhase {
    /// Phase kind
    pub phase: Phase,
    /// Step the phase belongs to
    pub step_index: usize,
    /// Round the phase belongs to
    pub round: u32,
    /// Seconds from session start
    pub offset_seconds: i64,
    /// Length in seconds
    pub duration_seconds: i64,
}
