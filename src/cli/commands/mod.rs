//! Command implementations for habit-timer.
//!
//! This module contains the implementation of all CLI commands.

mod config;
mod session;

pub use config::config;
pub use session::{interval, pomodoro, stopwatch, workout};
