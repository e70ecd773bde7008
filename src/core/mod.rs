//! Core abstractions for habit-timer.
//!
//! This module provides the clock sources and duration helpers shared by
//! the timing engine and the CLI.

mod clock;
mod duration;

pub use clock::{Clock, ManualClock, SystemClock};
pub use duration::{
    ceil_seconds, floor_seconds, format_duration, format_duration_mmss, format_seconds_mmss,
    parse_duration, parse_duration_secs, render_progress_bar,
};
