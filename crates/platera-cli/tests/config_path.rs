use std::fs;

use assert_cmd::cargo::cargo_bin_cmd;
use predicates::prelude::*;
use tempfile::tempdir;

#[test]
fn test_config_path_command() {
    let dir = tempdir().unwrap();

    cargo_bin_cmd!("platera")
        .env("PLATERA_HOME", dir.path())
        .args(["config", "path"])
        .assert()
        .success()
        .stdout(predicate::str::contains("config.toml"))
        .stdout(predicate::str::contains("session.json"));
}

#[test]
fn test_config_show_reports_url_source() {
    let dir = tempdir().unwrap();
    fs::write(
        dir.path().join("config.toml"),
        "[api]\nbase_url = \"https://pos.example.com/api\"\ntimeout_secs = 5\n",
    )
    .unwrap();

    cargo_bin_cmd!("platera")
        .env("PLATERA_HOME", dir.path())
        .env_remove("PLATERA_API_URL")
        .args(["config", "show"])
        .assert()
        .success()
        .stdout(predicate::str::contains(
            "api.base_url     = https://pos.example.com/api (config)",
        ))
        .stdout(predicate::str::contains("api.timeout_secs = 5"));

    cargo_bin_cmd!("platera")
        .env("PLATERA_HOME", dir.path())
        .env("PLATERA_API_URL", "http://10.0.0.2:8000/api")
        .args(["config", "show"])
        .assert()
        .success()
        .stdout(predicate::str::contains(
            "api.base_url     = http://10.0.0.2:8000/api (PLATERA_API_URL)",
        ));
}

#[test]
fn test_config_init_creates_file() {
    let dir = tempdir().unwrap();
    let config_path = dir.path().join("config.toml");

    cargo_bin_cmd!("platera")
        .env("PLATERA_HOME", dir.path())
        .args(["config", "init"])
        .assert()
        .success()
        .stdout(predicate::str::contains("Created config at"));

    let contents = fs::read_to_string(&config_path).unwrap();
    assert!(contents.contains("timeout_secs = 30"));
    assert!(contents.contains("# base_url ="));
}

#[test]
fn test_config_init_fails_if_exists() {
    let dir = tempdir().unwrap();
    fs::write(dir.path().join("config.toml"), "# existing config").unwrap();

    cargo_bin_cmd!("platera")
        .env("PLATERA_HOME", dir.path())
        .args(["config", "init"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("already exists"));
}

#[test]
fn test_invalid_config_is_reported() {
    let dir = tempdir().unwrap();
    fs::write(dir.path().join("config.toml"), "api = [").unwrap();

    cargo_bin_cmd!("platera")
        .env("PLATERA_HOME", dir.path())
        .arg("whoami")
        .assert()
        .failure()
        .stderr(predicate::str::contains("Failed to parse config"));
}
