use std::path::PathBuf;

use clap::{Args, Parser, Subcommand, ValueEnum};
use serde::{Deserialize, Serialize};

#[derive(Parser)]
#[command(name = "habit-timer")]
#[command(about = "Workout, interval and Pomodoro timers for the terminal")]
#[command(long_about = "habit-timer - session timers for habits and workouts

Runs open-ended workout stopwatches, interval training plans and Pomodoro
cycles. Time is always computed from absolute timestamps, so a busy or
suspended terminal never makes the timer drift.

QUICK START:
  habit-timer workout                    Open-ended workout with rest timer
  habit-timer interval --step burpees:12 --step squats --rounds 3
  habit-timer pomodoro --task \"write report\"
  habit-timer interval --plan hiit.yaml --preview

KEYS (live sessions):
  space  pause / resume      s  skip phase
  b      start rest timer    c  cancel rest timer
  f      finish              x  finish early
  R      reset               q  quit (finishes early)

OUTPUT FORMATS:
  --output pretty    Human-readable colored output (default)
  --output json      Machine-readable JSON for scripting

For more information on a specific command, run:
  habit-timer <command> --help")]
#[command(version, propagate_version = true)]
pub struct Cli {
    /// Output format for command results
    ///
    /// Use 'pretty' for human-readable colored output, or 'json' for
    /// machine-readable output suitable for scripting. Defaults to the
    /// configured `general.default_output`.
    #[arg(short, long, value_enum, global = true)]
    pub output: Option<OutputFormat>,

    /// Log engine events to stderr (overridden by RUST_LOG)
    #[arg(short, long, global = true)]
    pub verbose: bool,

    /// Use a different config file
    #[arg(long, global = true, env = "HABIT_TIMER_CONFIG")]
    pub config: Option<PathBuf>,

    #[command(subcommand)]
    pub command: Commands,
}

/// Output format for command results.
#[derive(ValueEnum, Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum OutputFormat {
    /// Human-readable colored output.
    #[default]
    Pretty,
    /// Machine-readable JSON output.
    Json,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Run an open-ended workout
    ///
    /// Counts up until you finish. Press 'b' between sets to start the
    /// rest timer; it pauses along with the workout.
    ///
    /// # Examples
    ///
    ///   habit-timer workout
    ///   habit-timer workout --name "Leg day" --rest 90s
    #[command(alias = "w")]
    Workout(WorkoutArgs),

    /// Run a free stopwatch
    ///
    /// Counts up until you finish, with pause and resume.
    #[command(alias = "sw")]
    Stopwatch,

    /// Run an interval training plan
    ///
    /// Alternates work and rest phases over each step, for a number of
    /// rounds. The session opens with a short "get ready" countdown, and
    /// so does every resume. There is no rest after the final work phase.
    ///
    /// Steps come from --step options or a YAML plan file. A bare --plan
    /// name is also looked up in ~/.habit-timer/plans/.
    ///
    /// # Examples
    ///
    ///   habit-timer interval --step burpees:12 --step squats:20 --rounds 3
    ///   habit-timer interval --step plank --work 60 --rest 30
    ///   habit-timer interval --plan hiit --preview
    #[command(alias = "i")]
    Interval(IntervalArgs),

    /// Run a Pomodoro cycle
    ///
    /// Focus blocks separated by short breaks, with a long break after
    /// every few pomodoros.
    ///
    /// # Examples
    ///
    ///   habit-timer pomodoro
    ///   habit-timer pomodoro --task "write report" --cycles 2
    ///   habit-timer pomodoro --work 50m --short-break 10m --preview
    #[command(alias = "p")]
    Pomodoro(PomodoroArgs),

    /// Manage configuration
    ///
    /// Configuration lives in ~/.habit-timer/config.yaml (or under
    /// $HABIT_TIMER_HOME).
    Config(ConfigArgs),
}

/// Arguments for the workout command.
#[derive(Args)]
pub struct WorkoutArgs {
    /// Name shown in the status line
    #[arg(long, short = 'n')]
    pub name: Option<String>,

    /// Rest timer length (e.g., 90s, 2m, 60). Bare numbers are seconds.
    #[arg(long, short = 'r')]
    pub rest: Option<String>,
}

/// Arguments for the interval command.
#[derive(Args)]
pub struct IntervalArgs {
    /// YAML plan file, or the name of a plan in the plans directory
    #[arg(long, conflicts_with = "steps")]
    pub plan: Option<PathBuf>,

    /// Step as REF or REF:TARGET (repeatable)
    #[arg(long = "step", value_name = "REF[:TARGET]")]
    pub steps: Vec<String>,

    /// Number of rounds
    #[arg(long, short = 'r')]
    pub rounds: Option<u32>,

    /// Work phase length (e.g., 40s, 1m). Bare numbers are seconds.
    #[arg(long)]
    pub work: Option<String>,

    /// Rest phase length (e.g., 20s). Bare numbers are seconds.
    #[arg(long)]
    pub rest: Option<String>,

    /// Lead-in countdown length; 0 disables it
    #[arg(long)]
    pub countdown: Option<String>,

    /// Print the timeline instead of running it
    #[arg(long)]
    pub preview: bool,
}

/// Arguments for the pomodoro command.
#[derive(Args)]
pub struct PomodoroArgs {
    /// What you are focusing on
    #[arg(long, short = 't', default_value = "Focus")]
    pub task: String,

    /// Number of pomodoros
    #[arg(long, short = 'c')]
    pub cycles: Option<u32>,

    /// Focus block length (e.g., 25m, 50). Bare numbers are minutes.
    #[arg(long)]
    pub work: Option<String>,

    /// Short break length. Bare numbers are minutes.
    #[arg(long)]
    pub short_break: Option<String>,

    /// Long break length. Bare numbers are minutes.
    #[arg(long)]
    pub long_break: Option<String>,

    /// Take a long break after this many pomodoros
    #[arg(long)]
    pub long_every: Option<u32>,

    /// Print the timeline instead of running it
    #[arg(long)]
    pub preview: bool,
}

/// Arguments for the config command.
#[derive(Args)]
pub struct ConfigArgs {
    #[command(subcommand)]
    pub command: ConfigCommands,
}

/// Config subcommands.
#[derive(Subcommand)]
pub enum ConfigCommands {
    /// Print the effective configuration
    Show,

    /// Write a default config file
    Init {
        /// Overwrite an existing file
        #[arg(long, short = 'f')]
        force: bool,
    },

    /// Print the config file location
    Path,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_cli_output_format_default() {
        let cli = Cli::try_parse_from(["habit-timer", "stopwatch"]).unwrap();
        assert!(cli.output.is_none());
        assert!(!cli.verbose);
    }

    #[test]
    fn test_cli_output_format_json() {
        let cli = Cli::try_parse_from(["habit-timer", "--output", "json", "stopwatch"]).unwrap();
        assert_eq!(cli.output, Some(OutputFormat::Json));
    }

    #[test]
    fn test_cli_output_format_short() {
        let cli = Cli::try_parse_from(["habit-timer", "sw", "-o", "json"]).unwrap();
        assert_eq!(cli.output, Some(OutputFormat::Json));
    }

    #[test]
    fn test_cli_workout() {
        let cli =
            Cli::try_parse_from(["habit-timer", "workout", "--name", "Legs", "--rest", "90s"])
                .unwrap();
        if let Commands::Workout(args) = cli.command {
            assert_eq!(args.name.as_deref(), Some("Legs"));
            assert_eq!(args.rest.as_deref(), Some("90s"));
        } else {
            panic!("Expected Workout command");
        }
    }

    #[test]
    fn test_cli_interval_steps() {
        let cli = Cli::try_parse_from([
            "habit-timer",
            "interval",
            "--step",
            "burpees:12",
            "--step",
            "squats",
            "--rounds",
            "2",
            "--preview",
        ])
        .unwrap();
        if let Commands::Interval(args) = cli.command {
            assert_eq!(args.steps, vec!["burpees:12", "squats"]);
            assert_eq!(args.rounds, Some(2));
            assert!(args.preview);
        } else {
            panic!("Expected Interval command");
        }
    }

    #[test]
    fn test_cli_interval_plan_conflicts_with_steps() {
        let result = Cli::try_parse_from([
            "habit-timer",
            "interval",
            "--plan",
            "hiit.yaml",
            "--step",
            "a",
        ]);
        assert!(result.is_err());
    }

    #[test]
    fn test_cli_pomodoro_defaults() {
        let cli = Cli::try_parse_from(["habit-timer", "p"]).unwrap();
        if let Commands::Pomodoro(args) = cli.command {
            assert_eq!(args.task, "Focus");
            assert!(args.cycles.is_none());
            assert!(!args.preview);
        } else {
            panic!("Expected Pomodoro command");
        }
    }

    #[test]
    fn test_cli_config_init_force() {
        let cli = Cli::try_parse_from(["habit-timer", "config", "init", "--force"]).unwrap();
        if let Commands::Config(args) = cli.command {
            assert!(matches!(args.command, ConfigCommands::Init { force: true }));
        } else {
            panic!("Expected Config command");
        }
    }
}
