use chrono::Duration;
use colored::Colorize;

use crate::core::{format_duration, format_seconds_mmss, render_progress_bar};
use crate::timing::{IntervalPlan, Phase, RunState, ScheduledPhase, SessionSummary, Snapshot};

const PROGRESS_WIDTH: usize = 20;

/// Format a finished session as pretty output
pub fn format_summary_pretty(summary: &SessionSummary) -> String {
    let status = if summary.aborted {
        "ended early".yellow()
    } else {
        "complete".green()
    };

    let mut output = format!(
        "{} {} in {}\n",
        summary.kind.to_string().bold(),
        status,
        format_duration(Duration::seconds(summary.total_elapsed_seconds))
    );
    output.push_str(&format!(
        "  {}: {}\n",
        "Time".dimmed(),
        format_seconds_mmss(summary.total_elapsed_seconds)
    ));
    if summary.paused_seconds > 0 {
        output.push_str(&format!(
            "  {}: {}\n",
            "Paused".dimmed(),
            format_seconds_mmss(summary.paused_seconds)
        ));
    }
    if summary.steps_completed > 0 || summary.rounds_completed > 0 {
        output.push_str(&format!(
            "  {}: {}\n",
            "Steps".dimmed(),
            summary.steps_completed
        ));
        output.push_str(&format!(
            "  {}: {}\n",
            "Rounds".dimmed(),
            summary.rounds_completed
        ));
    }
    output.push_str(&format!(
        "  {}: {}\n",
        "Started".dimmed(),
        summary.started_at.format("%Y-%m-%d %H:%M:%S UTC")
    ));

    output
}

/// Format a plan timeline as a table
pub fn format_schedule_pretty(plan: &IntervalPlan, schedule: &[ScheduledPhase]) -> String {
    let total: i64 = schedule.iter().map(|p| p.duration_seconds).sum();
    let title = plan.name.as_deref().unwrap_or("Interval plan");

    let mut output = format!(
        "{} ({} phases, {})\n",
        title.bold(),
        schedule.len(),
        format_seconds_mmss(total)
    );
    output.push_str(&"─".repeat(60));
    output.push('\n');

    for entry in schedule {
        let label = match entry.phase {
            Phase::Work => entry.phase.display_name().green(),
            Phase::Rest => entry.phase.display_name().blue(),
            Phase::Countdown | Phase::Complete => entry.phase.display_name().yellow(),
        };

        let mut line = format!(
            "{}  {:<10} {}",
            format_seconds_mmss(entry.offset_seconds).dimmed(),
            label,
            format_seconds_mmss(entry.duration_seconds)
        );

        if entry.phase == Phase::Work {
            if let Some(step) = plan.steps.get(entry.step_index) {
                line.push_str(&format!("  {}", step.to_string().bold()));
            }
            line.push_str(&format!(
                "  {}",
                format!("round {}/{}", entry.round, plan.rounds).dimmed()
            ));
        }

        output.push_str(&line);
        output.push('\n');
    }

    output
}

/// Format the one-line live status of a session
///
/// `label` names the session (workout name or task) when there is no step
/// to show.
#[allow(clippy::cast_precision_loss, clippy::cast_possible_truncation)]
pub fn format_status_line(snapshot: &Snapshot, label: Option<&str>) -> String {
    let icon = match snapshot.state {
        RunState::Running => "▶".green(),
        RunState::Paused => "⏸".yellow(),
        RunState::Idle => "·".dimmed(),
        RunState::Stopped => "■".dimmed(),
    };

    let name = snapshot
        .phase
        .map_or_else(|| snapshot.kind.display_name(), |p| p.display_name());
    let clock = format_seconds_mmss(snapshot.remaining_or_elapsed_seconds);

    let mut line = format!("{} {:<9} {}", icon, name.bold(), clock.bold());

    if snapshot.state == RunState::Paused {
        line.push_str(&format!("  {}", "PAUSED".yellow()));
    }

    if snapshot.rounds_total > 0 {
        let per_round = snapshot.steps_total as u32;
        let done = (snapshot.current_round - 1) * per_round + snapshot.current_step_index as u32;
        let progress = f64::from(done) / f64::from(per_round * snapshot.rounds_total);
        line.push_str(&format!("  {}", render_progress_bar(progress, PROGRESS_WIDTH)));

        if let Some(step) = &snapshot.current_step {
            line.push_str(&format!("  {}", step.to_string().cyan()));
        }
        line.push_str(&format!(
            "  {}",
            format!(
                "step {}/{} round {}/{}",
                snapshot.current_step_index + 1,
                snapshot.steps_total,
                snapshot.current_round,
                snapshot.rounds_total
            )
            .dimmed()
        ));
    } else if let Some(label) = label {
        line.push_str(&format!("  {}", label.cyan()));
    }

    if let Some(rest) = snapshot.rest_remaining_seconds {
        line.push_str(&format!("  {} {}", "rest".blue(), format_seconds_mmss(rest)));
    }

    if snapshot.counts_down {
        line.push_str(&format!(
            "  {}",
            format!("total {}", format_seconds_mmss(snapshot.total_elapsed_seconds)).dimmed()
        ));
    }

    line
}
