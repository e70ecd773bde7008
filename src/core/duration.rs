//! Duration parsing, rounding and formatting.

use chrono::Duration;

/// Whole seconds in `d`, rounded toward zero.
///
/// Used for elapsed time: a stopwatch shows `4` until five full seconds
/// have passed.
#[must_use]
pub fn floor_seconds(d: Duration) -> i64 {
    d.num_seconds().max(0)
}

/// Whole seconds in `d`, rounded up.
///
/// Used for remaining time: a countdown shows `1` until it has truly run
/// out, and `0` only once it has expired.
#[must_use]
pub fn ceil_seconds(d: Duration) -> i64 {
    let millis = d.num_milliseconds();
    if millis <= 0 {
        return 0;
    }
    (millis + 999) / 1000
}

/// Format a duration as MM:SS.
///
/// Hours roll into the minutes field ("90:00" for an hour and a half).
#[must_use]
pub fn format_duration_mmss(d: Duration) -> String {
    format_seconds_mmss(d.num_seconds())
}

/// Format a number of seconds as MM:SS.
#[must_use]
pub fn format_seconds_mmss(seconds: i64) -> String {
    let total_seconds = seconds.abs();
    let minutes = total_seconds / 60;
    let seconds = total_seconds % 60;
    format!("{minutes:02}:{seconds:02}")
}

/// Format a duration as a human-readable string.
#[must_use]
pub fn format_duration(d: Duration) -> String {
    let total_minutes = d.num_minutes();

    if total_minutes < 1 {
        let seconds = d.num_seconds();
        return format!("{} second{}", seconds, plural(seconds));
    }

    let hours = total_minutes / 60;
    let minutes = total_minutes % 60;

    match (hours, minutes) {
        (0, m) => format!("{} minute{}", m, plural(m)),
        (h, 0) => format!("{} hour{}", h, plural(h)),
        (h, m) => format!("{} hour{}, {} minute{}", h, plural(h), m, plural(m)),
    }
}

const fn plural(n: i64) -> &'static str {
    if n == 1 {
        ""
    } else {
        "s"
    }
}

/// Parse a duration string like "25m", "1h30m", "90s".
///
/// A bare number is read as minutes.
#[must_use]
pub fn parse_duration(s: &str) -> Option<Duration> {
    parse_with_unit(s, 60)
}

/// Parse a duration string like "40s", "1m30s".
///
/// A bare number is read as seconds, which suits work and rest intervals.
#[must_use]
pub fn parse_duration_secs(s: &str) -> Option<Duration> {
    parse_with_unit(s, 1)
}

fn parse_with_unit(s: &str, bare_unit_seconds: i64) -> Option<Duration> {
    let s = s.trim().to_lowercase();

    let mut total_seconds: i64 = 0;
    let mut current_num = String::new();

    for c in s.chars() {
        if c.is_ascii_digit() {
            current_num.push(c);
            continue;
        }

        if current_num.is_empty() {
            return None;
        }
        let num: i64 = current_num.parse().ok()?;
        current_num.clear();

        let unit = match c {
            'h' => 3600,
            'm' => 60,
            's' => 1,
            _ => return None,
        };
        total_seconds = total_seconds.checked_add(num.checked_mul(unit)?)?;
    }

    if !current_num.is_empty() {
        let num: i64 = current_num.parse().ok()?;
        total_seconds = total_seconds.checked_add(num.checked_mul(bare_unit_seconds)?)?;
    }

    if total_seconds > 0 {
        Duration::try_seconds(total_seconds)
    } else {
        None
    }
}

/// Render a progress bar.
#[must_use]
#[allow(
    clippy::cast_possible_truncation,
    clippy::cast_sign_loss,
    clippy::cast_precision_loss
)]
pub fn render_progress_bar(progress: f64, width: usize) -> String {
    let filled = ((progress.clamp(0.0, 1.0) * width as f64) as usize).min(width);
    let empty = width.saturating_sub(filled);

    format!("[{}{}]", "█".repeat(filled), "░".repeat(empty))
}
