//! Config command implementation.

use std::path::Path;

use colored::Colorize;

use crate::cli::args::{ConfigCommands, OutputFormat};
use crate::config::Config;
use crate::error::TimerError;
use crate::output::to_json;

/// Execute config subcommands.
///
/// `path` is the config file in effect (the default location or `--config`).
///
/// # Errors
///
/// Returns an error if the config cannot be read, written or serialized.
pub fn config(
    cmd: ConfigCommands,
    config: &Config,
    path: &Path,
    format: OutputFormat,
) -> Result<String, TimerError> {
    match cmd {
        ConfigCommands::Show => match format {
            OutputFormat::Pretty => Ok(serde_yaml::to_string(config)?),
            OutputFormat::Json => to_json(config),
        },
        ConfigCommands::Init { force } => init(path, force),
        ConfigCommands::Path => Ok(path.display().to_string()),
    }
}

fn init(path: &Path, force: bool) -> Result<String, TimerError> {
    if path.exists() && !force {
        return Err(TimerError::Config(format!(
            "{} already exists (use --force to overwrite)",
            path.display()
        )));
    }

    if let Some(parent) = path.parent() {
        std::fs::create_dir_all(parent).map_err(|e| {
            TimerError::Config(format!(
                "Failed to create directory {}: {e}",
                parent.display()
            ))
        })?;
    }
    Config::default().save_to_path(path)?;

    Ok(format!("{} {}", "Wrote".green(), path.display()))
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn test_init_writes_defaults() {
        let temp_dir = TempDir::new().unwrap();
        let path = temp_dir.path().join("nested").join("config.yaml");

        config(ConfigCommands::Init { force: false }, &Config::default(), &path, OutputFormat::Pretty)
            .unwrap();

        assert_eq!(Config::load_from_path(&path).unwrap(), Config::default());
    }

    #[test]
    fn test_init_refuses_to_overwrite() {
        let temp_dir = TempDir::new().unwrap();
        let path = temp_dir.path().join("config.yaml");
        std::fs::write(&path, "timer:\n  bell: false\n").unwrap();

        let err = init(&path, false).unwrap_err();
        assert!(err.to_string().contains("--force"));

        init(&path, true).unwrap();
        assert!(Config::load_from_path(&path).unwrap().timer.bell);
    }

    #[test]
    fn test_show_json() {
        let output = config(
            ConfigCommands::Show,
            &Config::default(),
            Path::new("config.yaml"),
            OutputFormat::Json,
        )
        .unwrap();

        assert!(output.contains("\"refresh_interval_ms\": 1000"));
        assert!(output.contains("\"default_rest_seconds\": 60"));
    }
}
