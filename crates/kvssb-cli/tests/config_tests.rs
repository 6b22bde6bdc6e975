use std::fs;
use std::path::Path;
use std::process::{Command, Output};
use tempfile::TempDir;

fn run_kvssb(args: &[&str], config_dir: &Path) -> Output {
    Command::new(env!("CARGO_BIN_EXE_kvssb"))
        .args(args)
        .env("KVSSB_CONFIG_DIR", config_dir)
        .env_remove("KVSSB_LOG")
        .output()
        .expect("failed to execute process")
}

fn stdout(output: &Output) -> String {
    String::from_utf8_lossy(&output.stdout).into_owned()
}

#[test]
fn test_config_set_get_clear() {
    let tmp_dir = TempDir::new().expect("failed to create temp dir");
    let dir = tmp_dir.path();

    let output = run_kvssb(&["config", "get", "back-to-top-after"], dir);
    assert!(output.status.success());
    assert!(stdout(&output).contains("back-to-top-after: 300"));

    let output = run_kvssb(&["config", "set", "back_to_top_after", "450"], dir);
    assert!(output.status.success());
    assert!(dir.join("config.toml").exists());

    let output = run_kvssb(&["config", "get", "back-to-top-after"], dir);
    assert!(stdout(&output).contains("back-to-top-after: 450"));

    let output = run_kvssb(&["config", "clear", "back-to-top-after"], dir);
    assert!(output.status.success());
    let output = run_kvssb(&["config", "get", "back-to-top-after"], dir);
    assert!(stdout(&output).contains("back-to-top-after: 300"));
}

#[test]
fn test_config_rejects_invalid_values() {
    let tmp_dir = TempDir::new().expect("failed to create temp dir");
    let dir = tmp_dir.path();

    let output = run_kvssb(&["config", "set", "counter-visibility", "1.5"], dir);
    assert!(!output.status.success());
    assert!(String::from_utf8_lossy(&output.stderr).contains("counter_visibility"));

    let output = run_kvssb(&["config", "set", "colour", "blue"], dir);
    assert!(!output.status.success());
    assert!(String::from_utf8_lossy(&output.stderr).contains("Unknown config key: colour"));

    assert!(!dir.join("config.toml").exists());
}

#[test]
fn test_config_show_and_path() {
    let tmp_dir = TempDir::new().expect("failed to create temp dir");
    let dir = tmp_dir.path();

    let output = run_kvssb(&["config", "show"], dir);
    let shown = stdout(&output);
    assert!(shown.contains("nav-offset: 200"));
    assert!(shown.contains("toast-ttl-ms: 5000"));
    assert!(shown.contains("preloader-delay-ms: 1000"));

    let output = run_kvssb(&["config", "path"], dir);
    assert_eq!(stdout(&output).trim(), dir.join("config.toml").display().to_string());
}

#[test]
fn test_config_corruption_recovery_integration() {
    let tmp_dir = TempDir::new().expect("failed to create temp dir");
    let config_dir = tmp_dir.path().join("kvssb-config");
    fs::create_dir_all(&config_dir).expect("failed to create config dir");

    let config_path = config_dir.join("config.toml");
    fs::write(&config_path, "invalid toml content").expect("failed to write corrupted config");

    let output = run_kvssb(&["config", "get", "nav-offset"], &config_dir);
    let stderr = String::from_utf8_lossy(&output.stderr);

    assert!(output.status.success(), "stderr: {stderr}");
    assert!(stderr.contains("Warning:"), "stderr: {stderr}");
    assert!(stderr.contains("config.toml is corrupted"));
    assert!(stderr.contains("config.toml.bak"));
    assert!(stdout(&output).contains("nav-offset: 200"));

    assert!(config_dir.join("config.toml.bak").exists());
    assert!(!config_path.exists());
}
