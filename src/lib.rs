//! habit-timer - Session timers for a habit and workout tracker
//!
//! This crate provides the timing engine behind workout, interval and
//! Pomodoro sessions, plus a command-line interface that runs them live.

#![deny(unsafe_code)]
#![deny(clippy::unwrap_used)]
#![deny(clippy::expect_used)]
#![warn(clippy::pedantic)]
#![warn(clippy::nursery)]
#![allow(clippy::module_name_repetitions)]
#![cfg_attr(test, allow(clippy::unwrap_used, clippy::expect_used))]

pub mod cli;
pub mod config;
pub mod core;
pub mod error;
pub mod output;
pub mod timing;
pub mod tui;

pub use cli::args::{Cli, Commands, OutputFormat};
pub use error::TimerError;
pub use timing::{
    CompletionHandler, IntervalPlan, PhaseSequencer, SessionController, SessionKind,
    SessionSummary,
};
