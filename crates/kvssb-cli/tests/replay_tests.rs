use assert_cmd::Command;
use predicates::prelude::*;
use std::fs;
use std::path::{Path, PathBuf};
use tempfile::TempDir;

const LANDING_PAGE: &str = r##"
viewport_height = 800.0

[[sections]]
id = "home"
top = 0.0
height = 600.0

[[sections]]
id = "about"
top = 600.0
height = 800.0

[[sections]]
id = "contact"
top = 1400.0
height = 600.0

[[links]]
href = "#home"

[[links]]
href = "#about"

[[links]]
href = "#contact"

[[counters]]
target = "500"

[[counters]]
target = "4.9"

[[reveals]]
kind = "section"
top = 600.0

[[reveals]]
kind = "element"
top = 2000.0

[[events]]
scroll = 700.0

[[events]]
after_ms = 50
visible = 0.6
"##;

fn write_scenario(dir: &TempDir, contents: &str) -> PathBuf {
    let path = dir.path().join("scenario.toml");
    fs::write(&path, contents).expect("failed to write scenario");
    path
}

fn kvssb(config_dir: &Path) -> Command {
    let mut cmd = Command::cargo_bin("kvssb").expect("binary not built");
    cmd.env("KVSSB_CONFIG_DIR", config_dir).env_remove("KVSSB_LOG");
    cmd
}

#[test]
fn test_replay_prints_summary() {
    let tmp = TempDir::new().unwrap();
    let scenario = write_scenario(&tmp, LANDING_PAGE);

    kvssb(tmp.path())
        .arg("replay")
        .arg(&scenario)
        .assert()
        .success()
        .stdout(predicate::str::contains("link #about active"))
        .stdout(predicate::str::contains("back-to-top shown"))
        .stdout(predicate::str::contains("active section: about"))
        .stdout(predicate::str::contains("counters:       500+, 4.9"))
        .stdout(predicate::str::contains("1 played, 1 pending"));
}

#[test]
fn test_replay_json_lines() {
    let tmp = TempDir::new().unwrap();
    let scenario = write_scenario(&tmp, LANDING_PAGE);

    let output = kvssb(tmp.path())
        .args(["replay", "--json"])
        .arg(&scenario)
        .output()
        .unwrap();
    assert!(output.status.success());

    let stdout = String::from_utf8(output.stdout).unwrap();
    let lines: Vec<serde_json::Value> = stdout
        .lines()
        .map(|line| serde_json::from_str(line).expect("every line is JSON"))
        .collect();

    let (summary, frames) = lines.split_last().expect("at least a summary");
    let summary = &summary["summary"];
    assert_eq!(summary["active"], "about");
    assert_eq!(summary["back_to_top"], true);
    assert_eq!(summary["counters"], serde_json::json!(["500+", "4.9"]));
    assert_eq!(summary["revealed"], 1);

    let kinds: Vec<&str> = frames
        .iter()
        .map(|frame| frame["effect"].as_str().unwrap())
        .collect();
    assert_eq!(kinds.iter().filter(|k| **k == "stop_observing_counters").count(), 1);
    assert_eq!(kinds.iter().filter(|k| **k == "reveal").count(), 1);

    let reveal = frames.iter().find(|f| f["effect"] == "reveal").unwrap();
    assert_eq!(reveal["tween"]["y"], 50.0);
    assert_eq!(reveal["tween"]["opacity"], 0.0);

    // counters start after the 50ms pause
    let first_count = frames
        .iter()
        .find(|f| f["effect"] == "set_counter_text")
        .unwrap();
    assert_eq!(first_count["at_ms"], 50);
}

#[test]
fn test_replay_uses_configured_offsets() {
    let tmp = TempDir::new().unwrap();
    let scenario = write_scenario(&tmp, LANDING_PAGE);

    kvssb(tmp.path())
        .args(["config", "set", "nav-offset", "0"])
        .assert()
        .success();

    // with no look-ahead the second section only wins once scrolled past 600
    kvssb(tmp.path())
        .arg("replay")
        .arg(&scenario)
        .assert()
        .success()
        .stdout(predicate::str::contains("active section: about"));

    let early = LANDING_PAGE.replace("scroll = 700.0", "scroll = 500.0");
    let scenario = write_scenario(&tmp, &early);
    kvssb(tmp.path())
        .arg("replay")
        .arg(&scenario)
        .assert()
        .success()
        .stdout(predicate::str::contains("active section: home"));
}

#[test]
fn test_replay_tick_budget() {
    let tmp = TempDir::new().unwrap();
    let scenario = write_scenario(&tmp, LANDING_PAGE);

    kvssb(tmp.path())
        .args(["replay", "--max-ticks", "10"])
        .arg(&scenario)
        .assert()
        .failure()
        .stderr(predicate::str::contains("still pending after 10 ticks"));
}

#[test]
fn test_replay_rejects_ambiguous_event() {
    let tmp = TempDir::new().unwrap();
    let scenario = write_scenario(&tmp, "[[events]]\nscroll = 10.0\nvisible = 1.0\n");

    kvssb(tmp.path())
        .arg("replay")
        .arg(&scenario)
        .assert()
        .failure()
        .stderr(predicate::str::contains("Invalid event #1"));
}

#[test]
fn test_replay_rejects_non_numeric_counter() {
    let tmp = TempDir::new().unwrap();
    let scenario = write_scenario(&tmp, "[[counters]]\ntarget = \"lots\"\n");

    kvssb(tmp.path())
        .arg("replay")
        .arg(&scenario)
        .assert()
        .failure()
        .stderr(predicate::str::contains("non-numeric target"));
}

#[test]
fn test_replay_missing_file() {
    let tmp = TempDir::new().unwrap();

    kvssb(tmp.path())
        .arg("replay")
        .arg(tmp.path().join("missing.toml"))
        .assert()
        .failure()
        .stderr(predicate::str::contains("Failed to read scenario file"));
}
