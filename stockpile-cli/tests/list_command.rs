//! Integration tests for the `list` and `status` commands.
//!
//! These cover the three output formats, the `--reserved-only` filter and
//! the configured default format.

mod common;

use common::TestEnv;
use predicates::prelude::*;

#[test]
fn test_list_table_format() {
    let env = TestEnv::new();
    env.add_item("X", 10);
    env.add_item("Y", 3);
    env.reserve("X", 4, 60_000);

    let output = env.command().arg("list").output().unwrap();
    assert!(output.status.success());
    let stdout = String::from_utf8(output.stdout).unwrap();
    let lines: Vec<&str> = stdout.lines().collect();

    assert_eq!(lines.len(), 3);
    assert!(lines[0].starts_with("ID\tNAME\tLOCATION"));
    assert!(lines[1].starts_with("X\tWidget X\tAisle 4\t2.50\t6\tyes\t4\t"));
    assert_eq!(lines[2], "Y\tWidget Y\tAisle 4\t2.50\t3\tno\t0\t-");
}

#[test]
fn test_list_json_format() {
    let env = TestEnv::new();
    env.add_item("X", 10);
    env.reserve("X", 4, 60_000);

    let items = env.list_json();
    assert_eq!(items.len(), 1);
    assert_eq!(items[0]["id"], "X");
    assert_eq!(items[0]["location"], "Aisle 4");
    assert_eq!(items[0]["reserved_quantity"], 4);
    assert!(items[0]["expires_at"].is_string());
}

#[test]
fn test_list_csv_format() {
    let env = TestEnv::new();
    env.add_item("X", 10);

    env.command()
        .args(["list", "--format", "csv"])
        .assert()
        .success()
        .stdout(predicate::str::starts_with(
            "id,name,location,price,available,reserved,reserved_quantity,expires_at\n",
        ))
        .stdout(predicate::str::contains("X,Widget X,Aisle 4,2.5,10,false,0,\n"));
}

/// An empty CSV listing still carries the header row.
#[test]
fn test_list_csv_empty_has_header() {
    let env = TestEnv::new();
    env.command().arg("init").assert().success();

    env.command()
        .args(["list", "--format", "csv"])
        .assert()
        .success()
        .stdout("id,name,location,price,available,reserved,reserved_quantity,expires_at\n");
}

#[test]
fn test_list_reserved_only() {
    let env = TestEnv::new();
    env.add_item("X", 10);
    env.add_item("Y", 3);
    env.reserve("Y", 1, 60_000);

    let output = env
        .command()
        .args(["list", "--reserved-only", "--format", "json"])
        .output()
        .unwrap();
    let items: Vec<serde_json::Value> = serde_json::from_slice(&output.stdout).unwrap();
    assert_eq!(items.len(), 1);
    assert_eq!(items[0]["id"], "Y");
}

/// `output_format` in `config.yaml` applies when no flag is given.
#[test]
fn test_configured_output_format() {
    let env = TestEnv::new();
    env.command().arg("init").assert().success();
    std::fs::write(env.data_dir.join("config.yaml"), "output_format: json\n").unwrap();
    env.add_item("X", 10);

    let output = env.command().args(["status", "X"]).output().unwrap();
    assert!(output.status.success());
    let items: Vec<serde_json::Value> = serde_json::from_slice(&output.stdout).unwrap();
    assert_eq!(items[0]["quantity_available"], 10);

    // The flag still wins.
    env.command()
        .args(["status", "X", "--format", "table"])
        .assert()
        .success()
        .stdout(predicate::str::starts_with("ID\t"));
}

#[test]
fn test_status_unknown_item() {
    let env = TestEnv::new();
    env.add_item("X", 10);

    env.command()
        .args(["status", "nope"])
        .assert()
        .code(1)
        .stderr(predicate::str::contains("item not found: nope"));
}
