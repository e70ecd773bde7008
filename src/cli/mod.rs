//! Command-line interface for habit-timer.

pub mod args;
pub mod commands;
