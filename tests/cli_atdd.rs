#![allow(deprecated)]

use assert_cmd::Command;
use predicates::prelude::*;
use std::fs;
use std::path::PathBuf;
use tempfile::TempDir;

struct Fixture {
    dir: TempDir,
}

impl Fixture {
    fn new(cmd_available: &str, extra: &str) -> Self {
        let dir = TempDir::new().expect("temp dir should be created");
        let config = format!(
            r#"cmd_available = '{cmd_available}'
state_file = '{state}'
criteria_dir = '{criteria}'
custom_format = "$status_text [$score] $matched_criteria_short: $available_updates"

[criteria]
available_weight = 1
count_weight = 1
count_threshold = 3
critical_weight = 1
critical_pattern = "^linux$"
lastupdate_weight = 0
{extra}
"#,
            state = dir.path().join("state/state.json").display(),
            criteria = dir.path().join("criteria").display(),
        );
        fs::write(dir.path().join("config.toml"), config).expect("config should write");
        Self { dir }
    }

    fn config_path(&self) -> PathBuf {
        self.dir.path().join("config.toml")
    }

    fn state_path(&self) -> PathBuf {
        self.dir.path().join("state/state.json")
    }

    fn check(&self) -> Command {
        let mut cmd = Command::cargo_bin("update-urgency").expect("binary should compile");
        cmd.env("HOME", self.dir.path())
            .env_remove("RUST_LOG")
            .arg("check")
            .arg("--config-path")
            .arg(self.config_path());
        cmd
    }

    fn state(&self) -> serde_json::Value {
        let raw = fs::read_to_string(self.state_path()).expect("state file should exist");
        serde_json::from_str(&raw).expect("state file should be json")
    }
}

#[test]
fn check_prints_status_text_and_persists_state() {
    let fx = Fixture::new(r#"printf "linux\nfoo\n""#, "");
    fx.check()
        .assert()
        .success()
        .stdout("Updates recommended\n");

    let state = fx.state();
    assert_eq!(state["schema_version"], 1);
    assert_eq!(state["last_update_set"], serde_json::json!(["linux", "foo"]));
    assert_eq!(state["last_score_report"]["level"], "warning");
}

#[test]
fn no_updates_prints_ok() {
    let fx = Fixture::new("true", "");
    fx.check().assert().success().stdout("Ok\n");
    assert!(fx.state()["last_upgrade_time"].is_string());
}

#[test]
fn quiet_suppresses_output_but_writes_state() {
    let fx = Fixture::new(r#"printf "foo\n""#, "");
    fx.check().arg("-q").assert().success().stdout("");
    assert!(fx.state_path().is_file());
}

#[test]
fn json_output_reports_count_text_and_score() {
    let fx = Fixture::new(r#"printf "linux\nfoo\nbar\n""#, "");
    let output = fx
        .check()
        .args(["-o", "json"])
        .output()
        .expect("binary should run");
    assert!(output.status.success());
    let value: serde_json::Value =
        serde_json::from_slice(&output.stdout).expect("stdout should be json");
    assert_eq!(value["count"], 3);
    assert_eq!(value["score"], 3);
    assert_eq!(value["text_value"], "Updates required");
}

#[test]
fn i3status_output_shows_matched_short_codes() {
    let fx = Fixture::new(r#"printf "linux\nfoo\n""#, "");
    fx.check()
        .args(["-o", "i3status"])
        .assert()
        .success()
        .stdout(predicate::str::contains(r#""state":"Warning""#))
        .stdout(predicate::str::contains(r#""text":"av,cr""#));
}

#[test]
fn custom_output_fills_template() {
    let fx = Fixture::new(r#"printf "linux\nfoo\n""#, "");
    fx.check()
        .args(["-o", "custom"])
        .assert()
        .success()
        .stdout("Updates recommended [2] av,cr: linux, foo\n");
}

#[test]
fn fancy_output_drops_color_when_piped() {
    let fx = Fixture::new(r#"printf "foo\n""#, "");
    fx.check()
        .args(["-o", "fancy"])
        .assert()
        .success()
        .stdout("Updates available\n");
}

#[test]
fn no_update_reuses_cached_list() {
    let fx = Fixture::new(r#"printf "linux\nfoo\n""#, "");
    fx.check().arg("-q").assert().success();

    // A lister that would fail proves it is not invoked.
    let config = fs::read_to_string(fx.config_path()).expect("config should read");
    let config = config.replace(r#"printf "linux\nfoo\n""#, "exit 1");
    fs::write(fx.config_path(), config).expect("config should write");

    fx.check()
        .arg("--no-update")
        .assert()
        .success()
        .stdout("Updates recommended\n");
}

#[test]
fn no_update_and_no_cache_are_mutually_exclusive() {
    let fx = Fixture::new(r#"printf "foo\n""#, "");
    fx.check()
        .args(["-U", "-n"])
        .assert()
        .code(1)
        .stderr(predicate::str::contains("mutually exclusive"));
}

#[test]
fn no_cache_leaves_no_state_file() {
    let fx = Fixture::new(r#"printf "foo\n""#, "");
    fx.check()
        .arg("--no-cache")
        .assert()
        .success()
        .stdout("Updates available\n");
    assert!(!fx.state_path().exists());
}

#[test]
fn failing_lister_is_fatal() {
    let fx = Fixture::new("echo locked >&2; exit 1", "");
    fx.check()
        .assert()
        .code(1)
        .stdout("")
        .stderr(predicate::str::contains("failed with status 1"));
    assert!(!fx.state_path().exists());
}

#[test]
fn no_updates_exit_code_means_empty_list() {
    let fx = Fixture::new("exit 2", "");
    let config = fs::read_to_string(fx.config_path()).expect("config should read");
    fs::write(
        fx.config_path(),
        format!("cmd_no_updates_exit_code = 2\n{config}"),
    )
    .expect("config should write");

    fx.check().assert().success().stdout("Ok\n");
}

#[test]
fn corrupt_state_is_replaced() {
    let fx = Fixture::new(r#"printf "foo\n""#, "");
    fs::create_dir_all(fx.dir.path().join("state")).expect("state dir should create");
    fs::write(fx.state_path(), "garbage").expect("corrupt state should write");

    fx.check().assert().success().stdout("Updates available\n");
    assert_eq!(fx.state()["schema_version"], 1);
}

#[cfg(unix)]
#[test]
fn custom_criterion_contributes_to_score() {
    use std::os::unix::fs::PermissionsExt;

    let fx = Fixture::new(r#"printf "foo\n""#, "security_weight = 2");
    let criteria = fx.dir.path().join("criteria");
    fs::create_dir_all(&criteria).expect("criteria dir should create");
    let script = criteria.join("security");
    fs::write(&script, "#!/bin/sh\ngrep -q foo\n").expect("script should write");
    fs::set_permissions(&script, fs::Permissions::from_mode(0o755))
        .expect("script should be executable");

    fx.check()
        .args(["-o", "custom"])
        .assert()
        .success()
        .stdout("Updates required [3] av,se: foo\n");
}
