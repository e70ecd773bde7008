//! Per-session orchestration.
//!
//! A [`SessionController`] owns the clock and, while a session runs, one
//! [`Stopwatch`] (plus a [`PhaseSequencer`] in interval mode). It turns
//! user actions and refresh ticks into timer transitions, and hands a
//! [`SessionSummary`] to the completion handler exactly once when the
//! session ends. Timer objects are dropped at that point and never reused.

use std::time::Duration as StdDuration;

use chrono::{DateTime, Duration, Utc};
use tracing::{debug, info, trace};

use super::cadence::{RefreshCadence, RefreshToken};
use super::countdown::{CountdownState, CountdownTimer, Expiry};
use super::plan::{IntervalPlan, PlanError};
use super::sequencer::{Phase, PhaseChange, PhaseSequencer};
use super::stopwatch::{RunState, Stopwatch};
use super::summary::{CompletionHandler, RefreshReport, SessionKind, SessionSummary, Snapshot};
use crate::core::Clock;

/// Timers of the session in progress.
#[derive(Debug)]
struct ActiveSession {
    stopwatch: Stopwatch,
    sequencer: Option<PhaseSequencer>,
    rest: CountdownTimer,
}

/// Orchestrates one open-ended or phase-sequenced session at a time.
pub struct SessionController<C: Clock, H: CompletionHandler> {
    kind: SessionKind,
    clock: C,
    handler: H,
    /// Validated sequencer cloned fresh for every interval session
    template: Option<PhaseSequencer>,
    active: Option<ActiveSession>,
    cadence: RefreshCadence,
    last_summary: Option<SessionSummary>,
}

impl<C: Clock, H: CompletionHandler> SessionController<C, H> {
    /// Create a controller for open-ended sessions (workout, stopwatch).
    pub fn open_ended(kind: SessionKind, clock: C, handler: H) -> Self {
        Self {
            kind,
            clock,
            handler,
            template: None,
            active: None,
            cadence: RefreshCadence::default(),
            last_summary: None,
        }
    }

    /// Create a controller for a phase-sequenced plan.
    ///
    /// # Errors
    ///
    /// Returns an error if the plan is invalid; no session can start with a
    /// bad plan.
    pub fn interval(
        kind: SessionKind,
        plan: IntervalPlan,
        clock: C,
        handler: H,
    ) -> Result<Self, PlanError> {
        let template = PhaseSequencer::new(plan)?;
        Ok(Self {
            template: Some(template),
            ..Self::open_ended(kind, clock, handler)
        })
    }

    /// Use a different refresh interval.
    #[must_use]
    pub fn with_refresh_interval(mut self, interval: StdDuration) -> Self {
        self.cadence = RefreshCadence::new(interval);
        self
    }

    /// Start a new session and its refresh cadence.
    ///
    /// Returns the token the refresh loop must pass to
    /// [`on_refresh`](Self::on_refresh), or `None` if a session is already
    /// running.
    pub fn start(&mut self) -> Option<RefreshToken> {
        if self.active.is_some() {
            trace!(kind = %self.kind, "start ignored, session already running");
            return None;
        }

        let now = self.clock.now();
        let mut stopwatch = Stopwatch::new();
        stopwatch.start(now);

        let sequencer = self.template.clone().map(|mut sequencer| {
            sequencer.start(now);
            sequencer
        });

        self.active = Some(ActiveSession {
            stopwatch,
            sequencer,
            rest: CountdownTimer::new(),
        });
        self.last_summary = None;

        debug!(kind = %self.kind, started_at = %now, "session started");
        Some(self.cadence.start())
    }

    /// Pause the session. Transitions that were already due are applied
    /// first.
    pub fn pause(&mut self) -> bool {
        let now = self.clock.now();
        self.sync(now);

        let Some(active) = self.active.as_mut() else {
            trace!("pause ignored, no session");
            return false;
        };
        if !active.stopwatch.pause(now) {
            return false;
        }
        if let Some(sequencer) = active.sequencer.as_mut() {
            sequencer.pause(now);
        }
        active.rest.pause(now);

        debug!(kind = %self.kind, "session paused");
        true
    }

    /// Resume a paused session. Interval sessions re-enter through the
    /// lead-in countdown.
    pub fn resume(&mut self) -> bool {
        let now = self.clock.now();
        let Some(active) = self.active.as_mut() else {
            trace!("resume ignored, no session");
            return false;
        };
        if !active.stopwatch.resume(now) {
            return false;
        }
        if let Some(sequencer) = active.sequencer.as_mut() {
            sequencer.resume(now);
        }
        active.rest.resume(now);

        debug!(kind = %self.kind, "session resumed");
        true
    }

    /// Skip to the next phase of an interval session.
    ///
    /// Skipping the final work phase completes the session normally.
    pub fn skip(&mut self) -> Vec<PhaseChange> {
        let now = self.clock.now();
        let Some(sequencer) = self
            .active
            .as_mut()
            .and_then(|active| active.sequencer.as_mut())
        else {
            trace!("skip ignored, no interval session");
            return Vec::new();
        };

        let changes = sequencer.skip(now);
        if sequencer.is_complete() {
            let at = changes.last().map_or(now, |change| change.at);
            self.complete(at, false);
        }
        changes
    }

    /// End an open-ended session normally.
    ///
    /// Interval sessions end on their own or through
    /// [`finish_early`](Self::finish_early).
    pub fn finish(&mut self) -> Option<SessionSummary> {
        let open_ended = self
            .active
            .as_ref()
            .is_some_and(|active| active.sequencer.is_none());
        if !open_ended {
            trace!(kind = %self.kind, "finish ignored");
            return None;
        }
        let now = self.clock.now();
        self.complete(now, false)
    }

    /// Abort the session, reporting partial progress with `aborted = true`.
    ///
    /// If the plan had already run to its end, the natural completion is
    /// reported instead.
    pub fn finish_early(&mut self) -> Option<SessionSummary> {
        let now = self.clock.now();
        if let Some(summary) = self.sync(now).completed {
            return Some(summary);
        }

        let active = self.active.as_mut()?;
        if let Some(sequencer) = active.sequencer.as_mut() {
            sequencer.finish_early();
        }
        self.complete(now, true)
    }

    /// Discard the session without reporting it.
    pub fn reset(&mut self) {
        if self.active.take().is_some() {
            debug!(kind = %self.kind, "session discarded");
        }
        self.last_summary = None;
        self.cadence.cancel();
    }

    /// Start (or restart) the rest timer of an open-ended session.
    pub fn start_rest(&mut self, duration: Duration) -> bool {
        let now = self.clock.now();
        let Some(active) = self.active.as_mut() else {
            return false;
        };
        if active.sequencer.is_some() || active.stopwatch.state() != RunState::Running {
            trace!("rest ignored");
            return false;
        }
        active.rest.cancel();
        active.rest.start(duration, now);
        debug!(seconds = duration.num_seconds(), "rest started");
        true
    }

    /// End the rest timer early.
    pub fn skip_rest(&mut self) -> Option<Expiry> {
        let now = self.clock.now();
        self.active.as_mut()?.rest.skip(now)
    }

    /// Drop the rest timer without expiring it.
    pub fn cancel_rest(&mut self) -> bool {
        match self.active.as_mut() {
            Some(active) if active.rest.state() != CountdownState::Idle => {
                active.rest.cancel();
                true
            }
            _ => false,
        }
    }

    /// Handle a refresh tick.
    ///
    /// Returns `None` if `token` is stale, in which case nothing is touched.
    pub fn on_refresh(&mut self, token: RefreshToken) -> Option<RefreshReport> {
        if !self.cadence.is_current(token) {
            trace!(?token, "stale refresh ignored");
            return None;
        }
        let now = self.clock.now();
        Some(self.sync(now))
    }

    /// Recompute every timer from `now` and complete the session if its plan
    /// has ended.
    fn sync(&mut self, now: DateTime<Utc>) -> RefreshReport {
        let mut report = RefreshReport::default();
        let Some(active) = self.active.as_mut() else {
            return report;
        };

        report.rest_expired = active.rest.refresh(now);
        if let Some(expiry) = report.rest_expired {
            debug!(at = %expiry.at, "rest finished");
        }

        let mut completed_at = None;
        if let Some(sequencer) = active.sequencer.as_mut() {
            report.phase_changes = sequencer.refresh(now);
            if sequencer.is_complete() {
                completed_at = Some(report.phase_changes.last().map_or(now, |change| change.at));
            }
        }

        if let Some(at) = completed_at {
            report.completed = self.complete(at, false);
        }
        report
    }

    fn complete(&mut self, at: DateTime<Utc>, aborted: bool) -> Option<SessionSummary> {
        let mut active = self.active.take()?;
        self.cadence.cancel();

        active.stopwatch.stop(at);
        let progress = active
            .sequencer
            .as_ref()
            .map(PhaseSequencer::progress)
            .unwrap_or_default();

        let summary = SessionSummary {
            kind: self.kind,
            started_at: active.stopwatch.started_at().unwrap_or(at),
            ended_at: at,
            total_elapsed_seconds: active.stopwatch.elapsed_seconds(at),
            paused_seconds: active.stopwatch.paused_seconds(at),
            rounds_completed: progress.rounds_completed,
            steps_completed: progress.steps_completed,
            aborted,
        };

        info!(
            kind = %summary.kind,
            total_seconds = summary.total_elapsed_seconds,
            paused_seconds = summary.paused_seconds,
            steps = summary.steps_completed,
            rounds = summary.rounds_completed,
            aborted,
            "session complete"
        );
        self.handler.on_complete(&summary);
        self.last_summary = Some(summary.clone());
        Some(summary)
    }

    /// Current view of the session. Reads only; never advances a timer.
    #[must_use]
    pub fn snapshot(&self) -> Snapshot {
        let now = self.clock.now();
        let plan = self.template.as_ref().map(PhaseSequencer::plan);
        let mut snapshot = Snapshot {
            kind: self.kind,
            phase: self.template.as_ref().map(PhaseSequencer::phase),
            state: RunState::Idle,
            remaining_or_elapsed_seconds: self
                .template
                .as_ref()
                .map_or(0, |t| t.remaining_seconds(now)),
            counts_down: self.template.is_some(),
            total_elapsed_seconds: 0,
            current_step_index: 0,
            current_step: self.template.as_ref().map(|t| t.current_step().clone()),
            current_round: 1,
            steps_total: plan.map_or(0, |p| p.steps.len()),
            rounds_total: plan.map_or(0, |p| p.rounds),
            rest_remaining_seconds: None,
        };

        match (&self.active, &self.last_summary) {
            (Some(active), _) => {
                snapshot.state = active.stopwatch.state();
                snapshot.total_elapsed_seconds = active.stopwatch.elapsed_seconds(now);
                match &active.sequencer {
                    Some(sequencer) => {
                        snapshot.phase = Some(sequencer.phase());
                        snapshot.remaining_or_elapsed_seconds = sequencer.remaining_seconds(now);
                        snapshot.current_step_index = sequencer.step_index();
                        snapshot.current_step = Some(sequencer.current_step().clone());
                        snapshot.current_round = sequencer.round();
                    }
                    None => {
                        snapshot.remaining_or_elapsed_seconds = snapshot.total_elapsed_seconds;
                    }
                }
                if matches!(
                    active.rest.state(),
                    CountdownState::Active | CountdownState::Paused
                ) {
                    snapshot.rest_remaining_seconds = Some(active.rest.remaining_seconds(now));
                }
            }
            (None, Some(summary)) => {
                snapshot.state = RunState::Stopped;
                snapshot.total_elapsed_seconds = summary.total_elapsed_seconds;
                if self.template.is_some() {
                    snapshot.phase = Some(Phase::Complete);
                    snapshot.remaining_or_elapsed_seconds = 0;
                } else {
                    snapshot.remaining_or_elapsed_seconds = summary.total_elapsed_seconds;
                }
            }
            (None, None) => {}
        }
        snapshot
    }

    /// Token of the running refresh cadence, if a session is active.
    #[must_use]
    pub const fn refresh_token(&self) -> Option<RefreshToken> {
        self.cadence.token()
    }

    /// Time between refresh ticks.
    #[must_use]
    pub const fn refresh_interval(&self) -> StdDuration {
        self.cadence.interval()
    }

    /// Whether a session is in progress.
    #[must_use]
    pub const fn is_active(&self) -> bool {
        self.active.is_some()
    }

    /// Summary of the most recently completed session.
    #[must_use]
    pub const fn last_summary(&self) -> Option<&SessionSummary> {
        self.last_summary.as_ref()
    }

    /// Session kind.
    #[must_use]
    pub const fn kind(&self) -> SessionKind {
        self.kind
    }

    /// The interval plan, if this is an interval controller.
    #[must_use]
    pub fn plan(&self) -> Option<&IntervalPlan> {
        self.template.as_ref().map(PhaseSequencer::plan)
    }

    /// The completion handler.
    #[must_use]
    pub const fn handler(&self) -> &H {
        &self.handler
    }
}

#[cfg(test)]
mod tests {
    use std::cell::RefCell;
    use std::rc::Rc;

    use super::*;
    use crate::core::ManualClock;
    use crate::timing::summary::MockCompletionHandler;
    use crate::timing::Step;
    use chrono::TimeZone;

    fn clock() -> ManualClock {
        ManualClock::at(Utc.with_ymd_and_hms(2024, 5, 6, 7, 0, 0).unwrap())
    }

    fn plan(steps: usize, rounds: u32) -> IntervalPlan {
        let steps = (0..steps)
            .map(|i| Step::new(format!("ex{i}"), Some(12)))
            .collect();
        IntervalPlan::new(steps, rounds, 30, 10)
    }

    type Log = Rc<RefCell<Vec<SessionSummary>>>;

    fn recorder() -> (Log, impl FnMut(&SessionSummary)) {
        let log: Log = Rc::default();
        let sink = Rc::clone(&log);
        (log, move |summary: &SessionSummary| {
            sink.borrow_mut().push(summary.clone());
        })
    }

    #[test]
    fn test_invalid_plan_rejected_at_construction() {
        let result = SessionController::interval(
            SessionKind::Interval,
            plan(0, 1),
            clock(),
            |_: &SessionSummary| {},
        );
        assert!(matches!(result, Err(PlanError::EmptySteps)));
    }

    #[test]
    fn test_finish_early_is_aborted_with_partial_progress() {
        let clock = clock();
        let mut handler = MockCompletionHandler::new();
        handler
            .expect_on_complete()
            .withf(|s| s.aborted && s.steps_completed == 0 && s.rounds_completed == 0)
            .times(1)
            .return_const(());

        let mut controller =
            SessionController::interval(SessionKind::Interval, plan(5, 3), clock.clone(), handler)
                .unwrap();
        controller.start();
        clock.advance_secs(10);
        controller.on_refresh(controller.refresh_token().unwrap());
        assert_eq!(controller.snapshot().phase, Some(Phase::Work));

        let summary = controller.finish_early().unwrap();
        assert!(summary.aborted);
        assert_eq!(summary.total_elapsed_seconds, 10);

        // A second finish must not call the handler again.
        assert!(controller.finish_early().is_none());
    }

    #[test]
    fn test_natural_completion_is_not_aborted() {
        let clock = clock();
        let (log, handler) = recorder();
        let mut controller =
            SessionController::interval(SessionKind::Interval, plan(2, 1), clock.clone(), handler)
                .unwrap();
        let token = controller.start().unwrap();

        // One very late tick covers the whole plan.
        clock.advance_secs(500);
        let report = controller.on_refresh(token).unwrap();

        let summary = report.completed.unwrap();
        assert!(!summary.aborted);
        assert_eq!(summary.steps_completed, 2);
        assert_eq!(summary.rounds_completed, 1);
        assert_eq!(summary.total_elapsed_seconds, 5 + 30 + 10 + 30);
        assert_eq!(log.borrow().len(), 1);
        assert!(!controller.is_active());
        assert_eq!(controller.snapshot().phase, Some(Phase::Complete));
    }

    #[test]
    fn test_finish_early_after_plan_ran_out_reports_natural_completion() {
        let clock = clock();
        let (log, handler) = recorder();
        let mut controller =
            SessionController::interval(SessionKind::Interval, plan(1, 1), clock.clone(), handler)
                .unwrap();
        controller.start();

        // No refresh between the plan ending and the user finishing.
        clock.advance_secs(1000);
        let summary = controller.finish_early().unwrap();

        assert!(!summary.aborted);
        assert_eq!(summary.total_elapsed_seconds, 5 + 30);
        assert_eq!(summary.steps_completed, 1);
        assert_eq!(summary.rounds_completed, 1);
        assert!(controller.finish_early().is_none());
        assert_eq!(log.borrow().len(), 1);
    }

    #[test]
    fn test_stale_refresh_after_completion_is_ignored() {
        let clock = clock();
        let (log, handler) = recorder();
        let mut controller =
            SessionController::interval(SessionKind::Interval, plan(1, 1), clock.clone(), handler)
                .unwrap();
        let token = controller.start().unwrap();

        clock.advance_secs(100);
        assert!(controller.on_refresh(token).is_some());
        assert!(controller.on_refresh(token).is_none());
        assert_eq!(log.borrow().len(), 1);
    }

    #[test]
    fn test_stale_refresh_after_reset_is_ignored() {
        let clock = clock();
        let (log, handler) = recorder();
        let mut controller =
            SessionController::open_ended(SessionKind::Stopwatch, clock.clone(), handler);
        let old = controller.start().unwrap();
        controller.reset();
        let new = controller.start().unwrap();

        clock.advance_secs(5);
        assert!(controller.on_refresh(old).is_none());
        assert!(controller.on_refresh(new).is_some());
        assert!(log.borrow().is_empty());
    }

    #[test]
    fn test_open_ended_summary_tracks_pauses() {
        let clock = clock();
        let (log, handler) = recorder();
        let mut controller =
            SessionController::open_ended(SessionKind::Workout, clock.clone(), handler);
        controller.start();

        clock.advance_secs(600);
        assert!(controller.pause());
        assert!(!controller.pause());
        clock.advance_secs(120);
        assert_eq!(controller.snapshot().remaining_or_elapsed_seconds, 600);
        assert!(controller.resume());
        clock.advance_secs(300);

        let summary = controller.finish().unwrap();
        assert_eq!(summary.total_elapsed_seconds, 900);
        assert_eq!(summary.paused_seconds, 120);
        assert!(!summary.aborted);
        assert_eq!(summary.steps_completed, 0);
        assert_eq!(log.borrow().len(), 1);
    }

    #[test]
    fn test_resume_while_idle_is_noop() {
        let (_log, handler) = recorder();
        let mut controller = SessionController::open_ended(SessionKind::Stopwatch, clock(), handler);

        assert!(!controller.resume());
        assert!(!controller.pause());
        assert!(controller.finish().is_none());
        assert_eq!(controller.snapshot().state, RunState::Idle);
    }

    #[test]
    fn test_finish_is_ignored_for_interval_sessions() {
        let (log, handler) = recorder();
        let mut controller =
            SessionController::interval(SessionKind::Pomodoro, plan(1, 1), clock(), handler)
                .unwrap();
        controller.start();

        assert!(controller.finish().is_none());
        assert!(controller.is_active());
        assert!(log.borrow().is_empty());
    }

    #[test]
    fn test_interval_pause_resume_adds_lead_in() {
        let clock = clock();
        let (_log, handler) = recorder();
        let mut controller =
            SessionController::interval(SessionKind::Interval, plan(1, 1), clock.clone(), handler)
                .unwrap();
        let token = controller.start().unwrap();

        clock.advance_secs(15);
        controller.on_refresh(token);
        assert!(controller.pause());
        clock.advance_secs(60);
        assert!(controller.resume());

        let snapshot = controller.snapshot();
        assert_eq!(snapshot.phase, Some(Phase::Countdown));
        assert_eq!(snapshot.state, RunState::Running);

        clock.advance_secs(5);
        controller.on_refresh(token);
        let snapshot = controller.snapshot();
        assert_eq!(snapshot.phase, Some(Phase::Work));
        assert_eq!(snapshot.remaining_or_elapsed_seconds, 20);
    }

    #[test]
    fn test_skip_last_work_completes_session() {
        let clock = clock();
        let (log, handler) = recorder();
        let mut controller =
            SessionController::interval(SessionKind::Interval, plan(1, 1), clock.clone(), handler)
                .unwrap();
        controller.start();
        controller.skip();
        clock.advance_secs(3);

        let changes = controller.skip();
        assert_eq!(changes.last().map(|c| c.to), Some(Phase::Complete));
        assert_eq!(log.borrow().len(), 1);
        assert!(!log.borrow()[0].aborted);
        assert_eq!(log.borrow()[0].steps_completed, 1);
    }

    #[test]
    fn test_rest_timer_expires_once() {
        let clock = clock();
        let (_log, handler) = recorder();
        let mut controller =
            SessionController::open_ended(SessionKind::Workout, clock.clone(), handler);
        let token = controller.start().unwrap();

        assert!(controller.start_rest(Duration::seconds(60)));
        clock.advance_secs(30);
        assert_eq!(controller.snapshot().rest_remaining_seconds, Some(30));

        clock.advance_secs(45);
        let report = controller.on_refresh(token).unwrap();
        let expiry = report.rest_expired.unwrap();
        assert_eq!(expiry.at, Utc.with_ymd_and_hms(2024, 5, 6, 7, 1, 0).unwrap());

        let report = controller.on_refresh(token).unwrap();
        assert!(report.rest_expired.is_none());
        assert_eq!(controller.snapshot().rest_remaining_seconds, None);
    }

    #[test]
    fn test_rest_timer_pauses_with_session() {
        let clock = clock();
        let (_log, handler) = recorder();
        let mut controller =
            SessionController::open_ended(SessionKind::Workout, clock.clone(), handler);
        controller.start();
        controller.start_rest(Duration::seconds(60));

        clock.advance_secs(20);
        controller.pause();
        clock.advance_secs(100);
        controller.resume();

        assert_eq!(controller.snapshot().rest_remaining_seconds, Some(40));
        assert!(controller.cancel_rest());
        assert!(!controller.cancel_rest());
    }

    #[test]
    fn test_restart_after_completion_uses_fresh_timers() {
        let clock = clock();
        let (log, handler) = recorder();
        let mut controller =
            SessionController::interval(SessionKind::Interval, plan(1, 1), clock.clone(), handler)
                .unwrap();
        let first = controller.start().unwrap();
        clock.advance_secs(100);
        controller.on_refresh(first);

        let second = controller.start().unwrap();
        assert_ne!(first, second);
        let snapshot = controller.snapshot();
        assert_eq!(snapshot.phase, Some(Phase::Countdown));
        assert_eq!(snapshot.total_elapsed_seconds, 0);
        assert_eq!(log.borrow().len(), 1);
    }

    #[test]
    fn test_idle_snapshot_shows_plan() {
        let (_log, handler) = recorder();
        let controller =
            SessionController::interval(SessionKind::Interval, plan(3, 2), clock(), handler)
                .unwrap();
        let snapshot = controller.snapshot();

        assert_eq!(snapshot.phase, Some(Phase::Work));
        assert_eq!(snapshot.state, RunState::Idle);
        assert_eq!(snapshot.remaining_or_elapsed_seconds, 30);
        assert_eq!(snapshot.steps_total, 3);
        assert_eq!(snapshot.rounds_total, 2);
        assert!(snapshot.counts_down);
    }
}
