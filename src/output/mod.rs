//! Output formatting for habit-timer.
//!
//! This module provides formatters for displaying session data in various formats.

mod json;
mod pretty;

use crate::cli::args::OutputFormat;
use crate::error::TimerError;
use crate::timing::{IntervalPlan, ScheduledPhase, SessionSummary};

pub use json::*;
pub use pretty::*;

/// Format a session summary based on output format
///
/// # Errors
///
/// Returns `TimerError::Json` if JSON serialization fails.
pub fn format_summary(summary: &SessionSummary, format: OutputFormat) -> Result<String, TimerError> {
    match format {
        OutputFormat::Pretty => Ok(format_summary_pretty(summary)),
        OutputFormat::Json => format_summary_json(summary),
    }
}

/// Format a plan timeline based on output format
///
/// # Errors
///
/// Returns `TimerError::Json` if JSON serialization fails.
pub fn format_schedule(
    plan: &IntervalPlan,
    schedule: &[ScheduledPhase],
    format: OutputFormat,
) -> Result<String, TimerError> {
    match format {
        OutputFormat::Pretty => Ok(format_schedule_pretty(plan, schedule)),
        OutputFormat::Json => format_schedule_json(plan, schedule),
    }
}
