//! Path resolution for habit-timer configuration files.
//!
//! All habit-timer data is stored in `~/.habit-timer/`:
//! - `config.yaml` - Main configuration file
//! - `plans/` - Saved interval plans (YAML files)
//!
//! The root can be moved with the `HABIT_TIMER_HOME` environment variable.

use std::path::PathBuf;

use crate::error::TimerError;

/// Environment variable overriding the data root.
pub const HOME_ENV: &str = "HABIT_TIMER_HOME";

/// Paths to habit-timer configuration and data directories.
#[derive(Debug, Clone)]
pub struct Paths {
    /// Root directory: `~/.habit-timer/`
    pub root: PathBuf,
    /// Config file: `~/.habit-timer/config.yaml`
    pub config_file: PathBuf,
    /// Plans directory: `~/.habit-timer/plans/`
    pub plans: PathBuf,
}

impl Paths {
    /// Resolve paths from `HABIT_TIMER_HOME`, else the user's home directory.
    ///
    /// # Errors
    ///
    /// Returns an error if neither variable is set.
    pub fn new() -> Result<Self, TimerError> {
        if let Some(root) = std::env::var_os(HOME_ENV).filter(|v| !v.is_empty()) {
            return Ok(Self::with_root(PathBuf::from(root)));
        }

        let home = std::env::var("HOME").map_err(|_| {
            TimerError::Config("Could not determine home directory".to_string())
        })?;

        Ok(Self::with_root(PathBuf::from(home).join(".habit-timer")))
    }

    /// Create paths with a custom root directory (useful for testing).
    #[must_use]
    pub fn with_root(root: PathBuf) -> Self {
        Self {
            config_file: root.join("config.yaml"),
            plans: root.join("plans"),
            root,
        }
    }

    /// Ensure all directories exist, creating them if necessary.
    ///
    /// # Errors
    ///
    /// Returns an error if directory creation fails.
    pub fn ensure_dirs(&self) -> Result<(), TimerError> {
        for dir in [&self.root, &self.plans] {
            if !dir.exists() {
                std::fs::create_dir_all(dir).map_err(|e| {
                    TimerError::Config(format!("Failed to create directory {}: {e}", dir.display()))
                })?;
            }
        }

        Ok(())
    }
}
