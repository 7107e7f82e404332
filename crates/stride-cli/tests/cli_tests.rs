use assert_cmd::Command;
use predicates::prelude::*;
use tempfile::TempDir;

/// Helper function to create a temporary directory for CLI tests
fn create_cli_test_environment() -> TempDir {
    TempDir::new().expect("Failed to create temporary directory")
}

/// Offline, uncolored `stride` running inside `temp_dir` with its data there
fn stride_cmd(temp_dir: &TempDir) -> Command {
    let mut cmd = Command::cargo_bin("stride").expect("Failed to find stride binary");
    cmd.current_dir(temp_dir.path())
        .env_remove("STRIDE_DATA_DIR")
        .env_remove("OPENAI_API_KEY")
        .args(["--no-color", "--offline", "--data-dir"])
        .arg(temp_dir.path().join("data"));
    cmd
}

#[test]
fn test_cli_start_and_help() {
    let temp_dir = create_cli_test_environment();

    stride_cmd(&temp_dir)
        .arg("chat")
        .write_stdin("/start\n/help\n")
        .assert()
        .success()
        .stdout(predicate::str::contains("Hi, friend!"))
        .stdout(predicate::str::contains("[📋 My goals]  [🎯 New goal]"))
        .stdout(predicate::str::contains("/newgoal - create a new goal"));
}

#[test]
fn test_cli_chat_name_flag() {
    let temp_dir = create_cli_test_environment();

    stride_cmd(&temp_dir)
        .args(["chat", "--user", "ann", "--name", "Ann"])
        .write_stdin("/start\n")
        .assert()
        .success()
        .stdout(predicate::str::contains("Hi, Ann!"));
}

#[test]
fn test_cli_offline_goal_flow() {
    let temp_dir = create_cli_test_environment();

    stride_cmd(&temp_dir)
        .write_stdin("/newgoal\nRun a marathon next spring with friends\n/next\n/done\n/status\n")
        .assert()
        .success()
        .stdout(predicate::str::contains("Goal created"))
        .stdout(predicate::str::contains("Run a marathon next spring"))
        .stdout(predicate::str::contains("First step"))
        .stdout(predicate::str::contains("Step done"))
        .stdout(predicate::str::contains("1/1 steps completed"));

    // Goals are stored under the data directory and survive the session
    stride_cmd(&temp_dir)
        .args(["goals", "--user", "local"])
        .assert()
        .success()
        .stdout(predicate::str::contains("1. Run a marathon next spring"));
}

#[test]
fn test_cli_goals_for_unknown_user() {
    let temp_dir = create_cli_test_environment();

    stride_cmd(&temp_dir)
        .args(["goals", "--user", "nobody"])
        .assert()
        .success()
        .stdout(predicate::str::contains("You have no goals yet."));
}

#[test]
fn test_cli_plain_text_gets_hint() {
    let temp_dir = create_cli_test_environment();

    stride_cmd(&temp_dir)
        .write_stdin("hello\n")
        .assert()
        .success()
        .stdout(predicate::str::contains("Use commands to talk to me"));
}

#[test]
fn test_cli_unknown_command() {
    let temp_dir = create_cli_test_environment();

    stride_cmd(&temp_dir)
        .write_stdin("/fly\n")
        .assert()
        .success()
        .stdout(predicate::str::contains("I didn't understand that"));
}

#[test]
fn test_cli_json_storage_writes_snapshots() {
    let temp_dir = create_cli_test_environment();

    stride_cmd(&temp_dir)
        .args(["--storage", "json"])
        .write_stdin("/start\n")
        .assert()
        .success();

    let data_dir = temp_dir.path().join("data");
    for file in ["users.json", "goals.json", "steps.json"] {
        assert!(data_dir.join(file).exists(), "{file} missing");
    }
}

#[test]
fn test_cli_missing_api_key_is_reported_per_message() {
    let temp_dir = create_cli_test_environment();

    Command::cargo_bin("stride")
        .expect("Failed to find stride binary")
        .current_dir(temp_dir.path())
        .env_remove("OPENAI_API_KEY")
        .args(["--no-color", "--storage", "memory", "chat"])
        .write_stdin("/newgoal\nLearn to swim\n/goals\n")
        .assert()
        .success()
        .stdout(predicate::str::contains("The assistant is unavailable"))
        .stdout(predicate::str::contains("You have no goals yet."));
}

#[test]
fn test_cli_invalid_storage_fails() {
    let temp_dir = create_cli_test_environment();

    stride_cmd(&temp_dir)
        .args(["--storage", "postgres"])
        .assert()
        .failure();
}
