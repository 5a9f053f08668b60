//! Basic CLI E2E tests.
//!
//! Each test runs the built binary against its own temporary data directory.

use std::path::Path;
use std::process::Command;

use tempfile::TempDir;

/// Run a CLI command and return (stdout, stderr, exit code).
fn run_cli(home: &Path, args: &[&str]) -> (String, String, i32) {
    let output = Command::new(env!("CARGO_BIN_EXE_pomoclock"))
        .args(args)
        .env("POMOCLOCK_HOME", home)
        .env_remove("POMOCLOCK_LOG")
        .output()
        .expect("Failed to execute CLI command");

    let stdout = String::from_utf8_lossy(&output.stdout).to_string();
    let stderr = String::from_utf8_lossy(&output.stderr).to_string();
    let code = output.status.code().unwrap_or(-1);

    (stdout, stderr, code)
}

fn run_json(home: &Path, args: &[&str]) -> serde_json::Value {
    let (stdout, stderr, code) = run_cli(home, args);
    assert_eq!(code, 0, "{args:?} failed: {stderr}");
    serde_json::from_str(&stdout).expect("Failed to parse JSON output")
}

#[test]
fn test_timer_status_fresh() {
    let home = TempDir::new().unwrap();
    let out = run_json(home.path(), &["timer", "status"]);
    let snap = &out["snapshot"];
    assert_eq!(snap["type"], "state_snapshot");
    assert_eq!(snap["mode"], "work");
    assert_eq!(snap["running"], false);
    assert_eq!(snap["remaining_ms"], 1_500_000);
    assert_eq!(snap["cycle_index"], 1);
}

#[test]
fn test_timer_start_then_pause_persists() {
    let home = TempDir::new().unwrap();
    let out = run_json(home.path(), &["timer", "start"]);
    assert_eq!(out["events"][0]["type"], "timer_started");
    assert_eq!(out["snapshot"]["running"], true);

    let out = run_json(home.path(), &["timer", "status"]);
    assert_eq!(out["snapshot"]["running"], true);

    let out = run_json(home.path(), &["timer", "pause"]);
    assert_eq!(out["events"][0]["type"], "timer_paused");
    assert_eq!(out["snapshot"]["running"], false);
    let remaining = out["snapshot"]["remaining_ms"].as_u64().unwrap();
    assert!(remaining > 1_400_000 && remaining <= 1_500_000);
}

#[test]
fn test_timer_skip_does_not_credit() {
    let home = TempDir::new().unwrap();
    let out = run_json(home.path(), &["timer", "skip"]);
    assert_eq!(out["events"][0]["type"], "stretch_completed");
    assert_eq!(out["events"][0]["credited"], false);
    assert_eq!(out["snapshot"]["today_completions"], 0);

    let today = run_json(home.path(), &["history", "today"]);
    assert_eq!(today["completions"], 0);
}

#[test]
fn test_timer_mode_switch() {
    let home = TempDir::new().unwrap();
    let out = run_json(home.path(), &["timer", "mode", "long"]);
    assert_eq!(out["events"][0]["type"], "mode_switched");
    assert_eq!(out["snapshot"]["mode"], "long");
    assert_eq!(out["snapshot"]["remaining_ms"], 900_000);

    let (_, _, code) = run_cli(home.path(), &["timer", "mode", "nap"]);
    assert_ne!(code, 0);
}

#[test]
fn test_timer_reset() {
    let home = TempDir::new().unwrap();
    run_json(home.path(), &["timer", "start"]);
    let out = run_json(home.path(), &["timer", "reset"]);
    assert_eq!(out["snapshot"]["running"], false);
    assert_eq!(out["snapshot"]["remaining_ms"], 1_500_000);
}

#[test]
fn test_config_set_clamps_and_resizes_timer() {
    let home = TempDir::new().unwrap();
    let (stdout, _, code) = run_cli(home.path(), &["config", "set", "schedule.work_minutes", "500"]);
    assert_eq!(code, 0);
    assert!(stdout.contains("120"));

    let (stdout, _, code) = run_cli(home.path(), &["config", "get", "schedule.work_minutes"]);
    assert_eq!(code, 0);
    assert_eq!(stdout.trim(), "120");

    let out = run_json(home.path(), &["timer", "status"]);
    assert_eq!(out["snapshot"]["remaining_ms"], 120 * 60_000);
}

#[test]
fn test_config_unknown_key_fails() {
    let home = TempDir::new().unwrap();
    let (_, stderr, code) = run_cli(home.path(), &["config", "get", "schedule.nope"]);
    assert_ne!(code, 0);
    assert!(stderr.contains("unknown key"));
}

#[test]
fn test_config_list_and_reset() {
    let home = TempDir::new().unwrap();
    run_cli(home.path(), &["config", "set", "sound.level", "loud"]);
    let list = run_json(home.path(), &["config", "list"]);
    assert_eq!(list["sound"]["level"], "loud");

    let (_, _, code) = run_cli(home.path(), &["config", "reset"]);
    assert_eq!(code, 0);
    let list = run_json(home.path(), &["config", "list"]);
    assert_eq!(list["sound"]["level"], "normal");
}

#[test]
fn test_corrupt_preferences_fall_back_to_defaults() {
    let home = TempDir::new().unwrap();
    std::fs::write(home.path().join("preferences.toml"), "[[[ nonsense").unwrap();
    let list = run_json(home.path(), &["config", "list"]);
    assert_eq!(list["schedule"]["work_minutes"], 25);
}

#[test]
fn test_history_export_empty_has_one_row() {
    let home = TempDir::new().unwrap();
    let (stdout, _, code) = run_cli(home.path(), &["history", "export"]);
    assert_eq!(code, 0);
    let lines: Vec<&str> = stdout.lines().collect();
    assert_eq!(lines.len(), 2);
    assert_eq!(lines[0], "date,completions");
    assert!(lines[1].ends_with(",0"));

    let rows = run_json(home.path(), &["history", "export", "--format", "json"]);
    assert_eq!(rows.as_array().unwrap().len(), 1);
}

#[test]
fn test_history_window_and_stats() {
    let home = TempDir::new().unwrap();
    let window = run_json(home.path(), &["history", "window", "--days", "5"]);
    assert_eq!(window.as_array().unwrap().len(), 5);

    let stats = run_json(home.path(), &["history", "stats"]);
    assert_eq!(stats["total"], 0);
    assert_eq!(stats["streak_days"], 0);
}

#[test]
fn test_history_clear_requires_confirmation() {
    let home = TempDir::new().unwrap();
    let (_, stderr, code) = run_cli(home.path(), &["history", "clear"]);
    assert_ne!(code, 0);
    assert!(stderr.contains("--yes"));

    let out = run_json(home.path(), &["history", "clear", "--yes"]);
    assert_eq!(out["type"], "history_cleared");
}

#[test]
fn test_branding_apply_and_show() {
    let home = TempDir::new().unwrap();
    let out = run_json(
        home.path(),
        &["branding", "apply", "--color", "#112233", "--logo", "https://example.com/l.png"],
    );
    assert_eq!(out["theme_color"], "#112233");

    let out = run_json(home.path(), &["branding", "show"]);
    assert_eq!(out["logo_url"], "https://example.com/l.png");
}

#[test]
fn test_completions() {
    let home = TempDir::new().unwrap();
    let (stdout, _, code) = run_cli(home.path(), &["completions", "bash"]);
    assert_eq!(code, 0);
    assert!(stdout.contains("pomoclock"));
}

#[test]
fn test_config_set_keeps_paused_stretch() {
    let home = TempDir::new().unwrap();
    run_json(home.path(), &["timer", "start"]);
    std::thread::sleep(std::time::Duration::from_millis(1_100));
    let paused = run_json(home.path(), &["timer", "pause"]);
    let remaining = paused["snapshot"]["remaining_ms"].as_u64().unwrap();
    assert!(remaining < 1_500_000);

    let (_, _, code) = run_cli(home.path(), &["config", "set", "sound.level", "quiet"]);
    assert_eq!(code, 0);
    let out = run_json(home.path(), &["timer", "status"]);
    assert_eq!(out["snapshot"]["remaining_ms"].as_u64().unwrap(), remaining);
}
