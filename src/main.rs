use anyhow::{Context, Result};
use clap::Parser;
use colored::Colorize;
use tracing_subscriber::EnvFilter;

use habit_timer::cli::args::{Cli, Commands};
use habit_timer::cli::commands;
use habit_timer::config::{ColorSetting, Config, Paths};

fn main() {
    if let Err(e) = run() {
        eprintln!("{}: {:#}", "error".red().bold(), e);
        std::process::exit(1);
    }
}

fn run() -> Result<()> {
    let cli = Cli::parse();

    // Initialize logging
    let default_level = if cli.verbose { "debug" } else { "warn" };
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_level));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_target(false)
        .init();

    let config_path = match cli.config {
        Some(path) => path,
        None => Paths::new()?.config_file,
    };
    let config = Config::load_from_path(&config_path)
        .with_context(|| format!("loading {}", config_path.display()))?;

    match config.general.color {
        ColorSetting::Always => colored::control::set_override(true),
        ColorSetting::Never => colored::control::set_override(false),
        ColorSetting::Auto => {}
    }

    let format = cli.output.unwrap_or(config.general.default_output);

    let output = match cli.command {
        Commands::Workout(args) => commands::workout(args, &config, format)?,
        Commands::Stopwatch => commands::stopwatch(&config, format)?,
        Commands::Interval(args) => commands::interval(args, &config, format)?,
        Commands::Pomodoro(args) => commands::pomodoro(args, &config, format)?,
        Commands::Config(args) => commands::config(args.command, &config, &config_path, format)?,
    };

    if !output.is_empty() {
        println!("{output}");
    }
    Ok(())
}
