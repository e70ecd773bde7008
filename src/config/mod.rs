//! Configuration management for habit-timer.
//!
//! This module handles loading and saving configuration from `~/.habit-timer/`.

mod paths;
mod settings;

pub use paths::{Paths, HOME_ENV};
pub use settings::{
    ColorSetting, Config, GeneralConfig, IntervalConfig, PomodoroConfig, TimerConfig,
    WorkoutConfig,
};
