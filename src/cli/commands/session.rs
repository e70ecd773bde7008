//! Session command implementations.
//!
//! Builds a controller from arguments and config, then either previews the
//! plan or runs it live.

use std::cell::RefCell;
use std::path::{Path, PathBuf};
use std::rc::Rc;

use chrono::Duration;
use tracing::info;

use crate::cli::args::{IntervalArgs, OutputFormat, PomodoroArgs, WorkoutArgs};
use crate::config::{Config, Paths};
use crate::core::{parse_duration, parse_duration_secs, SystemClock};
use crate::error::TimerError;
use crate::output::{format_schedule, format_summary};
use crate::timing::{IntervalPlan, SessionController, SessionKind, SessionSummary, Step};
use crate::tui::{self, LiveOptions};

type Recorded = Rc<RefCell<Option<SessionSummary>>>;

/// Completion handler that keeps the summary for printing once the terminal
/// is restored.
fn recorder() -> (Recorded, impl FnMut(&SessionSummary)) {
    let recorded: Recorded = Rc::default();
    let sink = Rc::clone(&recorded);
    let handler = move |summary: &SessionSummary| {
        info!(
            kind = %summary.kind,
            started_at = %summary.started_at,
            ended_at = %summary.ended_at,
            "session recorded"
        );
        *sink.borrow_mut() = Some(summary.clone());
    };
    (recorded, handler)
}

/// Execute workout command
///
/// # Errors
///
/// Returns an error if the rest duration is invalid or the terminal fails.
pub fn workout(
    args: WorkoutArgs,
    config: &Config,
    format: OutputFormat,
) -> Result<String, TimerError> {
    let rest = match args.rest {
        Some(value) => parse_duration_secs(&value).ok_or_else(|| {
            TimerError::InvalidArgument(format!("invalid rest duration '{value}'"))
        })?,
        None => Duration::seconds(config.workout.default_rest_seconds.into()),
    };

    let options = LiveOptions {
        label: args.name,
        rest: Some(rest),
        bell: config.timer.bell,
    };
    run_open_ended(SessionKind::Workout, &options, config, format)
}

/// Execute stopwatch command
///
/// # Errors
///
/// Returns an error if the terminal fails.
pub fn stopwatch(config: &Config, format: OutputFormat) -> Result<String, TimerError> {
    let options = LiveOptions {
        bell: config.timer.bell,
        ..LiveOptions::default()
    };
    run_open_ended(SessionKind::Stopwatch, &options, config, format)
}

/// Execute interval command
///
/// # Errors
///
/// Returns an error if the plan cannot be loaded or is invalid, or if the
/// terminal fails.
pub fn interval(
    args: IntervalArgs,
    config: &Config,
    format: OutputFormat,
) -> Result<String, TimerError> {
    let mut plan = match &args.plan {
        Some(path) => load_plan(path)?,
        None => {
            let steps = args
                .steps
                .iter()
                .map(|s| Step::parse(s).map_err(TimerError::InvalidArgument))
                .collect::<Result<Vec<_>, _>>()?;
            config.interval.plan(steps, config.timer.countdown_seconds)
        }
    };

    if let Some(rounds) = args.rounds {
        plan.rounds = rounds;
    }
    if let Some(work) = &args.work {
        plan.work_seconds = parse_seconds(work, "work")?;
    }
    if let Some(rest) = &args.rest {
        plan.rest_seconds = parse_seconds(rest, "rest")?;
    }
    if let Some(countdown) = &args.countdown {
        plan.countdown_seconds = parse_countdown(countdown)?;
    }

    run_plan(SessionKind::Interval, plan, args.preview, config, format)
}

/// Execute pomodoro command
///
/// # Errors
///
/// Returns an error if a duration is invalid, the plan is invalid, or the
/// terminal fails.
pub fn pomodoro(
    args: PomodoroArgs,
    config: &Config,
    format: OutputFormat,
) -> Result<String, TimerError> {
    let defaults = &config.pomodoro;
    let work = parse_minutes(args.work.as_deref(), "work", defaults.work_minutes)?;
    let short_break = parse_minutes(
        args.short_break.as_deref(),
        "short break",
        defaults.short_break_minutes,
    )?;
    let long_break = parse_minutes(
        args.long_break.as_deref(),
        "long break",
        defaults.long_break_minutes,
    )?;

    let plan = IntervalPlan::pomodoro(
        args.task,
        args.cycles.unwrap_or(defaults.cycles),
        work,
        short_break,
        long_break,
        args.long_every.unwrap_or(defaults.pomodoros_until_long_break),
    )
    .with_countdown(config.timer.countdown_seconds);

    run_plan(SessionKind::Pomodoro, plan, args.preview, config, format)
}

fn run_open_ended(
    kind: SessionKind,
    options: &LiveOptions,
    config: &Config,
    format: OutputFormat,
) -> Result<String, TimerError> {
    let (recorded, handler) = recorder();
    let mut controller = SessionController::open_ended(kind, SystemClock::new(), handler)
        .with_refresh_interval(config.timer.refresh_interval());

    tui::run(&mut controller, options)?;
    report(&recorded, format)
}

fn run_plan(
    kind: SessionKind,
    plan: IntervalPlan,
    preview: bool,
    config: &Config,
    format: OutputFormat,
) -> Result<String, TimerError> {
    plan.validate()?;
    if preview {
        let schedule = plan.schedule()?;
        return format_schedule(&plan, &schedule, format);
    }

    let options = LiveOptions {
        label: plan.name.clone(),
        rest: None,
        bell: config.timer.bell,
    };
    let (recorded, handler) = recorder();
    let mut controller = SessionController::interval(kind, plan, SystemClock::new(), handler)?
        .with_refresh_interval(config.timer.refresh_interval());

    tui::run(&mut controller, &options)?;
    report(&recorded, format)
}

fn report(recorded: &Recorded, format: OutputFormat) -> Result<String, TimerError> {
    match recorded.borrow().as_ref() {
        Some(summary) => format_summary(summary, format),
        None => Ok(String::new()),
    }
}

/// Load a plan from a file, falling back to the plans directory.
fn load_plan(path: &Path) -> Result<IntervalPlan, TimerError> {
    let resolved = resolve_plan_path(path, &Paths::new()?.plans).ok_or_else(|| {
        TimerError::InvalidArgument(format!("plan '{}' not found", path.display()))
    })?;

    let contents = std::fs::read_to_string(&resolved).map_err(|e| {
        TimerError::Config(format!("Failed to read plan {}: {e}", resolved.display()))
    })?;
    Ok(serde_yaml::from_str(&contents)?)
}

fn resolve_plan_path(path: &Path, plans_dir: &Path) -> Option<PathBuf> {
    if path.is_file() {
        return Some(path.to_path_buf());
    }

    let named = plans_dir.join(path);
    [named.clone(), named.with_extension("yaml"), named.with_extension("yml")]
        .into_iter()
        .find(|candidate| candidate.is_file())
}

/// Parse a duration where bare numbers are seconds.
fn parse_seconds(value: &str, what: &str) -> Result<u32, TimerError> {
    parse_duration_secs(value)
        .and_then(|d| u32::try_from(d.num_seconds()).ok())
        .ok_or_else(|| TimerError::InvalidArgument(format!("invalid {what} duration '{value}'")))
}

/// Parse a lead-in length; "0" turns the lead-in off.
fn parse_countdown(value: &str) -> Result<u32, TimerError> {
    if value.trim() == "0" {
        return Ok(0);
    }
    parse_seconds(value, "countdown")
}

/// Parse an optional duration where bare numbers are minutes.
fn parse_minutes(
    value: Option<&str>,
    what: &str,
    default_minutes: u32,
) -> Result<Duration, TimerError> {
    match value {
        Some(value) => parse_duration(value).ok_or_else(|| {
            TimerError::InvalidArgument(format!("invalid {what} duration '{value}'"))
        }),
        None => Ok(Duration::minutes(default_minutes.into())),
    }
}
