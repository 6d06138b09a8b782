//! Binary smoke tests

use assert_cmd::Command;
use predicates::prelude::*;
use tempfile::TempDir;

fn ideanator(data_dir: &TempDir) -> Command {
    let mut cmd = Command::cargo_bin("ideanator").expect("binary should build");
    // Keep log files out of the real data directory
    cmd.env("XDG_DATA_HOME", data_dir.path())
        .env("XDG_CONFIG_HOME", data_dir.path().join("config"))
        .env("HOME", data_dir.path());
    cmd
}

#[test]
fn test_help_lists_subcommands() {
    let temp_dir = TempDir::new().unwrap();
    ideanator(&temp_dir)
        .arg("--help")
        .assert()
        .success()
        .stdout(predicate::str::contains("interactive"))
        .stdout(predicate::str::contains("batch"))
        .stdout(predicate::str::contains("config"));
}

#[test]
fn test_config_prints_resolved_backend() {
    let temp_dir = TempDir::new().unwrap();
    let config_path = temp_dir.path().join("ideanator.yml");
    std::fs::write(&config_path, "llm:\n  backend: ollama\nsampling:\n  scoring:\n    temperature: 0.0\n    max-tokens: 150\n").unwrap();

    ideanator(&temp_dir)
        .args(["config", "--config"])
        .arg(&config_path)
        .assert()
        .success()
        .stdout(predicate::str::contains("backend: ollama"))
        .stdout(predicate::str::contains("max-tokens: 150"))
        .stdout(predicate::str::contains("# resolved: backend=ollama model=llama3.2:3b"));
}

#[test]
fn test_config_external_backend_reports_missing_model() {
    let temp_dir = TempDir::new().unwrap();
    let config_path = temp_dir.path().join("ideanator.yml");
    std::fs::write(&config_path, "llm:\n  backend: external\n").unwrap();

    ideanator(&temp_dir)
        .args(["config", "--config"])
        .arg(&config_path)
        .assert()
        .success()
        .stdout(predicate::str::contains("# unresolved:"));
}

#[test]
fn test_batch_missing_ideas_file_fails() {
    let temp_dir = TempDir::new().unwrap();
    let config_path = temp_dir.path().join("ideanator.yml");
    std::fs::write(&config_path, "llm:\n  backend: mlx\n").unwrap();

    ideanator(&temp_dir)
        .args(["batch", "--file"])
        .arg(temp_dir.path().join("missing.json"))
        .arg("--config")
        .arg(&config_path)
        .assert()
        .failure()
        .stderr(predicate::str::contains("Failed to read ideas file"));
}

#[test]
fn test_bad_config_file_fails() {
    let temp_dir = TempDir::new().unwrap();
    let config_path = temp_dir.path().join("ideanator.yml");
    std::fs::write(&config_path, "llm: [not, a, map]\n").unwrap();

    ideanator(&temp_dir)
        .args(["config", "--config"])
        .arg(&config_path)
        .assert()
        .failure()
        .stderr(predicate::str::contains("Failed to load config"));
}

#[test]
fn test_broken_local_config_is_logged_and_skipped() {
    let temp_dir = TempDir::new().unwrap();
    let workdir = temp_dir.path().join("project");
    std::fs::create_dir_all(&workdir).unwrap();
    std::fs::write(workdir.join(".ideanator.yml"), "llm: [not, a, map]\n").unwrap();

    ideanator(&temp_dir)
        .current_dir(&workdir)
        .arg("config")
        .assert()
        .success()
        .stdout(predicate::str::contains("backend: mlx"));

    let log = std::fs::read_to_string(temp_dir.path().join("ideanator").join("logs").join("ideanator.log")).unwrap();
    assert!(log.contains("Failed to load config from .ideanator.yml"), "log was: {}", log);
    assert!(log.contains("WARN"));
}

#[test]
fn test_config_log_level_applies_to_log_file() {
    let temp_dir = TempDir::new().unwrap();
    let config_path = temp_dir.path().join("ideanator.yml");
    std::fs::write(&config_path, "log-level: debug\n").unwrap();

    ideanator(&temp_dir)
        .args(["config", "--config"])
        .arg(&config_path)
        .assert()
        .success();

    let log = std::fs::read_to_string(temp_dir.path().join("ideanator").join("logs").join("ideanator.log")).unwrap();
    assert!(log.contains("level: Level(Debug)"), "log was: {}", log);
    assert!(log.contains("cmd_config: called"));
}
