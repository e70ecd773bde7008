//! Configuration settings for habit-timer.
//!
//! Settings are loaded from `~/.habit-timer/config.yaml`.

use std::time::Duration as StdDuration;

use serde::{Deserialize, Serialize};

use crate::cli::args::OutputFormat;
use crate::error::TimerError;
use crate::timing::{IntervalPlan, Step, DEFAULT_COUNTDOWN_SECONDS};

/// Main configuration structure.
#[derive(Debug, Clone, Serialize, Deserialize, Default, PartialEq, Eq)]
#[serde(default)]
pub struct Config {
    /// General settings.
    pub general: GeneralConfig,
    /// Timer behaviour shared by every session.
    pub timer: TimerConfig,
    /// Workout session settings.
    pub workout: WorkoutConfig,
    /// Interval training defaults.
    pub interval: IntervalConfig,
    /// Pomodoro defaults.
    pub pomodoro: PomodoroConfig,
}

/// General application settings.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(default)]
pub struct GeneralConfig {
    /// Default output format.
    #[serde(default = "default_output_format")]
    pub default_output: OutputFormat,
    /// Color output setting.
    #[serde(default = "default_color")]
    pub color: ColorSetting,
}

/// Color output setting.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, Default, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum ColorSetting {
    /// Auto-detect based on terminal.
    #[default]
    Auto,
    /// Always use colors.
    Always,
    /// Never use colors.
    Never,
}

/// Timer behaviour.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(default)]
pub struct TimerConfig {
    /// Display refresh interval in milliseconds.
    #[serde(default = "default_refresh_interval_ms")]
    pub refresh_interval_ms: u64,
    /// Lead-in countdown before each work phase, in seconds. 0 disables it.
    #[serde(default = "default_countdown_seconds")]
    pub countdown_seconds: u32,
    /// Ring the terminal bell on phase changes.
    #[serde(default = "default_true")]
    pub bell: bool,
}

/// Workout session settings.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(default)]
pub struct WorkoutConfig {
    /// Rest between sets, in seconds.
    #[serde(default = "default_rest_seconds")]
    pub default_rest_seconds: u32,
}

/// Interval training defaults.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(default)]
pub struct IntervalConfig {
    /// Work phase length in seconds.
    #[serde(default = "default_work_seconds")]
    pub work_seconds: u32,
    /// Rest phase length in seconds.
    #[serde(default = "default_interval_rest_seconds")]
    pub rest_seconds: u32,
    /// Number of rounds.
    #[serde(default = "default_rounds")]
    pub rounds: u32,
}

/// Pomodoro defaults.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(default)]
pub struct PomodoroConfig {
    /// Focus block length in minutes.
    #[serde(default = "default_work_minutes")]
    pub work_minutes: u32,
    /// Short break duration in minutes.
    #[serde(default = "default_short_break")]
    pub short_break_minutes: u32,
    /// Long break duration in minutes.
    #[serde(default = "default_long_break")]
    pub long_break_minutes: u32,
    /// Number of pomodoros before a long break.
    #[serde(default = "default_pomodoros_until_long_break")]
    pub pomodoros_until_long_break: u32,
    /// Pomodoros per session.
    #[serde(default = "default_cycles")]
    pub cycles: u32,
}

// Default value functions for serde
const fn default_output_format() -> OutputFormat {
    OutputFormat::Pretty
}

const fn default_color() -> ColorSetting {
    ColorSetting::Auto
}

const fn default_refresh_interval_ms() -> u64 {
    1000
}

const fn default_countdown_seconds() -> u32 {
    DEFAULT_COUNTDOWN_SECONDS
}

const fn default_true() -> bool {
    true
}

const fn default_rest_seconds() -> u32 {
    60
}

const fn default_work_seconds() -> u32 {
    40
}

const fn default_interval_rest_seconds() -> u32 {
    20
}

const fn default_rounds() -> u32 {
    3
}

const fn default_work_minutes() -> u32 {
    25
}

const fn default_short_break() -> u32 {
    5
}

const fn default_long_break() -> u32 {
    15
}

const fn default_pomodoros_until_long_break() -> u32 {
    4
}

const fn default_cycles() -> u32 {
    4
}

impl Default for GeneralConfig {
    fn default() -> Self {
        Self {
            default_output: default_output_format(),
            color: default_color(),
        }
    }
}

impl Default for TimerConfig {
    fn default() -> Self {
        Self {
            refresh_interval_ms: default_refresh_interval_ms(),
            countdown_seconds: default_countdown_seconds(),
            bell: default_true(),
        }
    }
}

impl TimerConfig {
    /// Refresh interval as a duration.
    #[must_use]
    pub const fn refresh_interval(&self) -> StdDuration {
        StdDuration::from_millis(self.refresh_interval_ms)
    }
}

impl Default for WorkoutConfig {
    fn default() -> Self {
        Self {
            default_rest_seconds: default_rest_seconds(),
        }
    }
}

impl Default for IntervalConfig {
    fn default() -> Self {
        Self {
            work_seconds: default_work_seconds(),
            rest_seconds: default_interval_rest_seconds(),
            rounds: default_rounds(),
        }
    }
}

impl IntervalConfig {
    /// Build a plan over `steps` from these defaults.
    #[must_use]
    pub fn plan(&self, steps: Vec<Step>, countdown_seconds: u32) -> IntervalPlan {
        IntervalPlan::new(steps, self.rounds, self.work_seconds, self.rest_seconds)
            .with_countdown(countdown_seconds)
    }
}

impl Default for PomodoroConfig {
    fn default() -> Self {
        Self {
            work_minutes: default_work_minutes(),
            short_break_minutes: default_short_break(),
            long_break_minutes: default_long_break(),
            pomodoros_until_long_break: default_pomodoros_until_long_break(),
            cycles: default_cycles(),
        }
    }
}

impl Config {
    /// Load configuration from a specific path.
    ///
    /// If the config file doesn't exist, returns default configuration.
    ///
    /// # Errors
    ///
    /// Returns an error if the config file exists but cannot be parsed, or
    /// holds values no session can run with.
    pub fn load_from_path(path: &std::path::Path) -> Result<Self, TimerError> {
        if !path.exists() {
            return Ok(Self::default());
        }

        let contents = std::fs::read_to_string(path).map_err(|e| {
            TimerError::Config(format!(
                "Failed to read config file {}: {e}",
                path.display()
            ))
        })?;

        let config: Self = serde_yaml::from_str(&contents).map_err(|e| {
            TimerError::Config(format!(
                "Failed to parse config file {}: {e}",
                path.display()
            ))
        })?;
        config.validate()?;
        Ok(config)
    }

    /// Save configuration to a specific path.
    ///
    /// # Errors
    ///
    /// Returns an error if the config file cannot be written.
    pub fn save_to_path(&self, path: &std::path::Path) -> Result<(), TimerError> {
        let contents = serde_yaml::to_string(self)
            .map_err(|e| TimerError::Config(format!("Failed to serialize config: {e}")))?;

        std::fs::write(path, contents).map_err(|e| {
            TimerError::Config(format!(
                "Failed to write config file {}: {e}",
                path.display()
            ))
        })
    }

    /// Check values that would make a session impossible to run.
    ///
    /// # Errors
    ///
    /// Returns an error if the refresh interval is zero.
    pub fn validate(&self) -> Result<(), TimerError> {
        if self.timer.refresh_interval_ms == 0 {
            return Err(TimerError::Config(
                "timer.refresh_interval_ms must be greater than 0".to_string(),
            ));
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn test_default_config() {
        let config = Config::default();

        assert_eq!(config.general.default_output, OutputFormat::Pretty);
        assert_eq!(config.general.color, ColorSetting::Auto);
        assert_eq!(config.timer.refresh_interval_ms, 1000);
        assert_eq!(config.timer.countdown_seconds, 5);
        assert_eq!(config.workout.default_rest_seconds, 60);
        assert_eq!(config.interval.work_seconds, 40);
        assert_eq!(config.pomodoro.work_minutes, 25);
        assert_eq!(config.pomodoro.short_break_minutes, 5);
        assert_eq!(config.pomodoro.pomodoros_until_long_break, 4);
    }

    #[test]
    fn test_load_missing_config() {
        let temp_dir = TempDir::new().unwrap();
        let config_path = temp_dir.path().join("config.yaml");

        let config = Config::load_from_path(&config_path).unwrap();

        assert_eq!(config, Config::default());
    }

    #[test]
    fn test_save_and_load_config() {
        let temp_dir = TempDir::new().unwrap();
        let config_path = temp_dir.path().join("config.yaml");

        let mut config = Config::default();
        config.pomodoro.work_minutes = 50;
        config.timer.bell = false;

        config.save_to_path(&config_path).unwrap();

        let loaded = Config::load_from_path(&config_path).unwrap();

        assert_eq!(loaded.pomodoro.work_minutes, 50);
        assert!(!loaded.timer.bell);
    }

    #[test]
    fn test_partial_config() {
        let temp_dir = TempDir::new().unwrap();
        let config_path = temp_dir.path().join("config.yaml");

        let partial_yaml = r"
interval:
  rounds: 8
timer:
  countdown_seconds: 0
";
        std::fs::write(&config_path, partial_yaml).unwrap();

        let config = Config::load_from_path(&config_path).unwrap();

        assert_eq!(config.interval.rounds, 8);
        assert_eq!(config.timer.countdown_seconds, 0);
        // Missing fields fall back to defaults
        assert_eq!(config.interval.work_seconds, 40);
        assert_eq!(config.timer.refresh_interval_ms, 1000);
    }

    #[test]
    fn test_zero_refresh_interval_rejected() {
        let temp_dir = TempDir::new().unwrap();
        let config_path = temp_dir.path().join("config.yaml");
        std::fs::write(&config_path, "timer:\n  refresh_interval_ms: 0\n").unwrap();

        let err = Config::load_from_path(&config_path).unwrap_err();

        assert!(err.to_string().contains("refresh_interval_ms"));
    }

    #[test]
    fn test_interval_defaults_build_plan() {
        let config = Config::default();
        let plan = config
            .interval
            .plan(vec![Step::new("burpees", None)], config.timer.countdown_seconds);

        assert_eq!(plan.rounds, 3);
        assert_eq!(plan.work_seconds, 40);
        assert_eq!(plan.rest_seconds, 20);
        assert_eq!(plan.countdown_seconds, 5);
        plan.validate().unwrap();
    }
}
