//! Integration tests for the `init` command.
//!
//! These tests verify database initialization, including:
//! - Fresh initialization in an empty location
//! - Existing database handling and `--overwrite`
//! - Config file creation and preservation (`--with-config`)
//! - Dry-run mode
//! - The global `--data-dir` flag

mod common;

use common::TestEnv;
use predicates::prelude::*;
use std::fs;

#[test]
fn test_init_fresh_initialization() {
    let env = TestEnv::new();
    assert!(!env.data_dir.exists());

    env.command()
        .arg("init")
        .assert()
        .success()
        .stdout(predicate::str::contains("Initialized stockpile"))
        .stdout(predicate::str::contains("Created data directory"))
        .stdout(predicate::str::contains("Created database"));

    assert!(env.database_path().exists());
    assert!(!env.data_dir.join("config.yaml").exists());
}

/// A database created by init is immediately usable.
#[test]
fn test_init_database_is_functional() {
    let env = TestEnv::new();
    env.command().arg("init").assert().success();

    env.add_item("X", 10);
    let status = env.status_json("X");
    assert_eq!(status["quantity_available"], 10);
}

#[test]
fn test_init_existing_database_fails() {
    let env = TestEnv::new();
    env.command().arg("init").assert().success();

    env.command()
        .arg("init")
        .assert()
        .code(4)
        .stderr(predicate::str::contains("--overwrite"));
}

/// `--overwrite` starts over with an empty database.
#[test]
fn test_init_overwrite_replaces_database() {
    let env = TestEnv::new();
    env.command().arg("init").assert().success();
    env.add_item("X", 10);

    env.command()
        .args(["init", "--overwrite"])
        .assert()
        .success()
        .stdout(predicate::str::contains("Recreated database"));

    assert!(env.list_json().is_empty());
}

#[test]
fn test_init_with_config_writes_template() {
    let env = TestEnv::new();

    env.command()
        .args(["init", "--with-config"])
        .assert()
        .success()
        .stdout(predicate::str::contains("Created default configuration file"));

    let content = fs::read_to_string(env.data_dir.join("config.yaml")).unwrap();
    assert!(content.contains("max_duration_ms"));

    // The commented template changes nothing.
    env.add_item("X", 10);
    env.reserve("X", 4, 60_000);
}

#[test]
fn test_init_preserves_existing_config() {
    let env = TestEnv::new();
    fs::create_dir_all(&env.data_dir).unwrap();
    let config_path = env.data_dir.join("config.yaml");
    fs::write(&config_path, "recover_on_start: false\n").unwrap();

    env.command()
        .args(["init", "--with-config"])
        .assert()
        .success()
        .stdout(predicate::str::contains("already exists"));

    assert_eq!(
        fs::read_to_string(&config_path).unwrap(),
        "recover_on_start: false\n"
    );
}

#[test]
fn test_init_dry_run_changes_nothing() {
    let env = TestEnv::new();

    env.command()
        .args(["init", "--dry-run", "--with-config"])
        .assert()
        .success()
        .stdout(predicate::str::contains("Dry-run mode"))
        .stdout(predicate::str::contains("Create database"));

    assert!(!env.data_dir.exists());
}

/// The command's own `--dir` wins over the global `--data-dir`.
#[test]
fn test_init_dir_flag_overrides_global() {
    let env = TestEnv::new();
    let other = env.path().join("elsewhere");

    env.command()
        .arg("init")
        .arg("--dir")
        .arg(&other)
        .assert()
        .success();

    assert!(other.join("stockpile.db").exists());
    assert!(!env.data_dir.exists());
}

#[test]
fn test_quiet_init_prints_nothing() {
    let env = TestEnv::new();
    env.command()
        .args(["--quiet", "init"])
        .assert()
        .success()
        .stdout(predicate::str::is_empty());
    assert!(env.database_path().exists());
}
