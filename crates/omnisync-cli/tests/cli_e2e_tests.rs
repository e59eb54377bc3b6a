//! CLI end-to-end tests that invoke the compiled `omnisync` binary.
//!
//! Every test runs against a temporary project and a temporary settings
//! root passed through `OMNISYNC_SETTINGS_ROOT`, with the user config
//! directory pointed at an empty location.

use std::fs;

use assert_cmd::Command;
use omnisync_test_utils::TestProject;
use predicates::prelude::*;
use tempfile::TempDir;

struct Env {
    project: TestProject,
    user_config: TempDir,
}

impl Env {
    fn new() -> Self {
        Self {
            project: TestProject::new("Shooter").with_default_layout(),
            user_config: TempDir::new().unwrap(),
        }
    }

    fn cmd(&self) -> Command {
        let mut cmd = Command::cargo_bin("omnisync").expect("Failed to find omnisync binary");
        cmd.current_dir(self.project.root())
            .env("OMNISYNC_SETTINGS_ROOT", self.project.settings_root())
            .env("XDG_CONFIG_HOME", self.user_config.path())
            .env("NO_COLOR", "1")
            .env_remove("RUST_LOG");
        cmd
    }
}

#[test]
fn test_help_exits_zero() {
    Command::cargo_bin("omnisync")
        .unwrap()
        .arg("--help")
        .assert()
        .success()
        .stdout(predicate::str::contains("discover"))
        .stdout(predicate::str::contains("push"));
}

#[test]
fn test_outside_project_is_a_user_error() {
    let empty = TempDir::new().unwrap();

    Command::cargo_bin("omnisync")
        .unwrap()
        .current_dir(empty.path())
        .arg("status")
        .assert()
        .failure()
        .stderr(predicate::str::contains("No Unreal project"));
}

#[test]
fn test_discover_reports_new_files() {
    let env = Env::new();

    env.cmd()
        .arg("discover")
        .assert()
        .success()
        .stdout(predicate::str::contains("Tracking 4 new config file(s)"))
        .stdout(predicate::str::contains("DefaultGameplay.ini"));

    env.cmd()
        .arg("discover")
        .assert()
        .success()
        .stdout(predicate::str::contains("No new config files found"));

    assert!(env.project.settings_file().is_file());
}

#[test]
fn test_list_json_uses_settings_document_keys() {
    let env = Env::new();

    let output = env.cmd().args(["list", "--json"]).output().unwrap();
    assert!(output.status.success());

    let entries: serde_json::Value = serde_json::from_slice(&output.stdout).unwrap();
    let entries = entries.as_array().unwrap();
    assert_eq!(entries.len(), 4);
    assert_eq!(entries[0]["FileName"], "DefaultEngine.ini");
    assert_eq!(entries[0]["bEnabled"], false);
    assert_eq!(entries[0]["SettingsScope"], 1);
}

#[test]
fn test_enable_unknown_file_fails() {
    let env = Env::new();

    env.cmd()
        .args(["enable", "Nope.ini"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("Not tracked: Nope.ini"));
}

#[test]
fn test_enable_pushes_immediately_with_auto_sync() {
    let env = Env::new();

    env.cmd()
        .args(["enable", "DefaultEngine.ini"])
        .assert()
        .success()
        .stdout(predicate::str::contains("Enabled DefaultEngine.ini"))
        .stdout(predicate::str::contains("Saved 1 config file(s)"));

    let global = env.project.engine_dir().join("Config/DefaultEngine.ini");
    assert_eq!(
        fs::read_to_string(global).unwrap(),
        env.project.read("Config/DefaultEngine.ini")
    );
}

#[test]
fn test_scope_then_push_and_pull() {
    let env = Env::new();
    env.cmd().args(["auto", "DefaultGame.ini", "off"]).assert().success();
    env.cmd().args(["enable", "DefaultGame.ini"]).assert().success();
    env.cmd()
        .args(["scope", "DefaultGame.ini", "global"])
        .assert()
        .success();

    env.cmd()
        .arg("push")
        .assert()
        .success()
        .stdout(predicate::str::contains("Saved 1 config file(s)"));
    let global = env.project.plugin_dir().join("Global/Config/DefaultGame.ini");
    assert!(global.is_file());

    fs::write(&global, "[Changed]\nValue=1\n").unwrap();
    env.cmd()
        .arg("pull")
        .assert()
        .success()
        .stdout(predicate::str::contains("Loaded 1 config file(s)"));
    env.project
        .assert_file_content("Config/DefaultGame.ini", "[Changed]\nValue=1\n");
}

#[test]
fn test_push_with_nothing_enabled_succeeds_with_note() {
    let env = Env::new();

    env.cmd()
        .arg("push")
        .assert()
        .success()
        .stdout(predicate::str::contains("No enabled config files to sync"));
}

#[test]
fn test_pull_of_missing_global_files_fails() {
    let env = Env::new();
    env.cmd().args(["auto", "DefaultEngine.ini", "off"]).assert().success();
    env.cmd().args(["enable", "DefaultEngine.ini"]).assert().success();

    env.cmd()
        .arg("pull")
        .assert()
        .failure()
        .stderr(predicate::str::contains("Failed to load 1 config file(s)"));
}

#[test]
fn test_status_json_reports_file_state() {
    let env = Env::new();
    env.cmd().args(["enable", "DefaultEngine.ini"]).assert().success();

    let output = env.cmd().args(["status", "--json"]).output().unwrap();
    assert!(output.status.success());

    let status: serde_json::Value = serde_json::from_slice(&output.stdout).unwrap();
    assert_eq!(status["project"], "Shooter");
    assert_eq!(status["engine_version"], "5.4");
    let entry = status["entries"]
        .as_array()
        .unwrap()
        .iter()
        .find(|e| e["file_name"] == "DefaultEngine.ini")
        .unwrap();
    assert_eq!(entry["state"], "in_sync");
    assert_eq!(entry["scope"], "PerEngineVersion");
}

#[test]
fn test_project_flag_runs_from_elsewhere() {
    let env = Env::new();
    let elsewhere = TempDir::new().unwrap();

    env.cmd()
        .current_dir(elsewhere.path())
        .arg("-C")
        .arg(env.project.root().join("Config"))
        .arg("list")
        .assert()
        .success()
        .stdout(predicate::str::contains("DefaultEngine.ini"));
}

#[test]
fn test_watch_without_auto_sync_entries_exits() {
    let env = Env::new();

    env.cmd()
        .arg("watch")
        .assert()
        .success()
        .stdout(predicate::str::contains("nothing to watch"));
}

#[test]
fn test_completions_bash() {
    Command::cargo_bin("omnisync")
        .unwrap()
        .args(["completions", "bash"])
        .assert()
        .success()
        .stdout(predicate::str::contains("omnisync"));
}
