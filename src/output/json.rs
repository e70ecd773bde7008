//! JSON output formatting for habit-timer.
//!
//! This module provides functions for formatting session data as JSON.

use serde::Serialize;
use serde_json::json;

use crate::error::TimerError;
use crate::timing::{IntervalPlan, ScheduledPhase, SessionSummary};

/// Format a session summary as JSON
///
/// # Errors
///
/// Returns `TimerError::Json` if JSON serialization fails.
pub fn format_summary_json(summary: &SessionSummary) -> Result<String, TimerError> {
    Ok(serde_json::to_string_pretty(summary)?)
}

/// Format a plan and its timeline as JSON
///
/// # Errors
///
/// Returns `TimerError::Json` if JSON serialization fails.
pub fn format_schedule_json(
    plan: &IntervalPlan,
    schedule: &[ScheduledPhase],
) -> Result<String, TimerError> {
    let total_seconds: i64 = schedule.iter().map(|p| p.duration_seconds).sum();
    let output = json!({
        "plan": plan,
        "total_seconds": total_seconds,
        "count": schedule.len(),
        "phases": schedule
    });
    Ok(serde_json::to_string_pretty(&output)?)
}

/// Generic JSON formatter for any serializable type
///
/// # Errors
///
/// Returns `TimerError::Json` if JSON serialization fails.
pub fn to_json<T: Serialize>(value: &T) -> Result<String, TimerError> {
    Ok(serde_json::to_string_pretty(value)?)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::timing::{SessionKind, Step};
    use chrono::{TimeZone, Utc};

    fn make_summary(aborted: bool) -> SessionSummary {
        SessionSummary {
            kind: SessionKind::Interval,
            started_at: Utc.with_ymd_and_hms(2024, 3, 1, 18, 0, 0).unwrap(),
            ended_at: Utc.with_ymd_and_hms(2024, 3, 1, 18, 20, 0).unwrap(),
            total_elapsed_seconds: 1080,
            paused_seconds: 120,
            rounds_completed: 2,
            steps_completed: 7,
            aborted,
        }
    }

    #[test]
    fn test_format_summary_json() {
        let result = format_summary_json(&make_summary(true)).unwrap();

        assert!(result.contains("\"kind\": \"interval\""));
        assert!(result.contains("\"total_elapsed_seconds\": 1080"));
        assert!(result.contains("\"paused_seconds\": 120"));
        assert!(result.contains("\"aborted\": true"));
        assert!(result.contains("2024-03-01T18:00:00Z"));
    }

    #[test]
    fn test_format_schedule_json() {
        let plan = IntervalPlan::new(vec![Step::new("plank", Some(60))], 2, 30, 10);
        let schedule = plan.schedule().unwrap();
        let result = format_schedule_json(&plan, &schedule).unwrap();

        // lead-in, work, rest, work
        assert!(result.contains("\"count\": 4"));
        assert!(result.contains("\"total_seconds\": 75"));
        assert!(result.contains("\"reference_id\": \"plank\""));
        assert!(result.contains("\"phase\": \"countdown\""));
    }

    #[test]
    fn test_to_json() {
        let result = to_json(&vec![1, 2, 3]).unwrap();
        assert!(result.contains('1'));
    }
}
