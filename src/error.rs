//! Error types for habit-timer.
//!
//! Only configuration problems surface as errors. Redundant user actions
//! (pausing twice, resuming an idle timer) are silently ignored by the
//! timing engine and never reach this module.

use thiserror::Error;

use crate::timing::PlanError;

/// Errors returned by habit-timer.
#[derive(Debug, Error)]
pub enum TimerError {
    /// The interval plan failed validation.
    #[error("invalid session plan: {0}")]
    Plan(#[from] PlanError),

    /// Configuration could not be read, parsed or written.
    #[error("configuration error: {0}")]
    Config(String),

    /// A command-line argument could not be interpreted.
    #[error("invalid argument: {0}")]
    InvalidArgument(String),

    /// The terminal could not be driven.
    #[error("terminal error: {0}")]
    Terminal(#[from] std::io::Error),

    /// JSON serialization failed.
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// YAML serialization failed.
    #[error("YAML error: {0}")]
    Yaml(#[from] serde_yaml::Error),
}
