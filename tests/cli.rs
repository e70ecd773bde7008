use assert_cmd::Command;
use predicates::prelude::*;
use tempfile::TempDir;

fn habit_timer(home: &TempDir) -> Command {
    let mut cmd = Command::cargo_bin("habit-timer").unwrap();
    cmd.env("HABIT_TIMER_HOME", home.path())
        .env_remove("HABIT_TIMER_CONFIG")
        .env_remove("RUST_LOG");
    cmd
}

#[test]
fn test_config_path_uses_home_override() {
    let home = TempDir::new().unwrap();

    habit_timer(&home)
        .args(["config", "path"])
        .assert()
        .success()
        .stdout(predicate::str::contains("config.yaml"))
        .stdout(predicate::str::contains(home.path().to_string_lossy().as_ref()));
}

#[test]
fn test_config_init_then_refuse_overwrite() {
    let home = TempDir::new().unwrap();

    habit_timer(&home).args(["config", "init"]).assert().success();
    assert!(home.path().join("config.yaml").exists());

    habit_timer(&home)
        .args(["config", "init"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("--force"));

    habit_timer(&home)
        .args(["config", "init", "--force"])
        .assert()
        .success();
}

#[test]
fn test_config_show_json() {
    let home = TempDir::new().unwrap();

    habit_timer(&home)
        .args(["--output", "json", "config", "show"])
        .assert()
        .success()
        .stdout(predicate::str::contains("\"countdown_seconds\": 5"));
}

#[test]
fn test_interval_preview() {
    let home = TempDir::new().unwrap();

    habit_timer(&home)
        .args([
            "interval", "--step", "a:10", "--step", "b", "--rounds", "1", "--work", "30",
            "--rest", "10", "--preview",
        ])
        .env("NO_COLOR", "1")
        .assert()
        .success()
        .stdout(predicate::str::contains("Get ready"))
        .stdout(predicate::str::contains("a x10"))
        .stdout(predicate::str::contains("01:15"));
}

#[test]
fn test_interval_preview_from_plans_dir() {
    let home = TempDir::new().unwrap();
    std::fs::create_dir_all(home.path().join("plans")).unwrap();
    std::fs::write(
        home.path().join("plans").join("core.yaml"),
        "name: Core\nsteps:\n  - reference_id: plank\n    target_value: 60\nrounds: 2\nwork_seconds: 45\nrest_seconds: 15\ncountdown_seconds: 0\n",
    )
    .unwrap();

    habit_timer(&home)
        .args(["-o", "json", "interval", "--plan", "core", "--preview"])
        .assert()
        .success()
        .stdout(predicate::str::contains("\"total_seconds\": 105"))
        .stdout(predicate::str::contains("\"name\": \"Core\""));
}

#[test]
fn test_interval_zero_rounds_fails() {
    let home = TempDir::new().unwrap();

    habit_timer(&home)
        .args(["interval", "--step", "a", "--rounds", "0", "--preview"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("invalid session plan"));
}

#[test]
fn test_interval_without_steps_fails() {
    let home = TempDir::new().unwrap();

    habit_timer(&home)
        .args(["interval", "--preview"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("at least one step"));
}

#[test]
fn test_pomodoro_preview_json() {
    let home = TempDir::new().unwrap();

    habit_timer(&home)
        .args([
            "-o", "json", "pomodoro", "--task", "write", "--cycles", "2", "--preview",
        ])
        .assert()
        .success()
        .stdout(predicate::str::contains("\"reference_id\": \"write\""))
        .stdout(predicate::str::contains("\"total_seconds\": 3305"));
}

#[test]
fn test_invalid_config_reports_error() {
    let home = TempDir::new().unwrap();
    std::fs::write(
        home.path().join("config.yaml"),
        "timer:\n  refresh_interval_ms: 0\n",
    )
    .unwrap();

    habit_timer(&home)
        .args(["config", "show"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("refresh_interval_ms"));
}

#[test]
fn test_out_of_range_duration_is_a_clean_error() {
    let home = TempDir::new().unwrap();

    habit_timer(&home)
        .args(["interval", "--step", "a", "--work", "9999999999999999", "--preview"])
        .assert()
        .code(1)
        .stderr(predicate::str::contains("invalid work duration"));

    habit_timer(&home)
        .args(["pomodoro", "--work", "9999999999999999", "--preview"])
        .assert()
        .code(1)
        .stderr(predicate::str::contains("invalid work duration"));
}

#[test]
fn test_oversized_plan_is_rejected() {
    let home = TempDir::new().unwrap();

    habit_timer(&home)
        .args(["interval", "--step", "a", "--rounds", "4000000000", "--preview"])
        .assert()
        .code(1)
        .stderr(predicate::str::contains("work phases"));
}
