//! Integration tests for the medfmt binary.
//!
//! These tests verify end-to-end behavior including:
//! - Formatting of both dosage forms
//! - Plan add/list workflow
//! - CSV import/export through the encoding boundary
//! - Rejection of invalid input

use assert_cmd::Command;
use predicates::prelude::*;
use std::fs;
use std::path::Path;
use tempfile::TempDir;

/// Helper to create a test data directory
fn setup_test_dir() -> TempDir {
    tempfile::tempdir().expect("Failed to create temp dir")
}

/// Helper to get the CLI binary, isolated from any user config
fn cli(dir: &Path) -> Command {
    let mut cmd = Command::new(assert_cmd::cargo::cargo_bin!("medfmt"));
    cmd.env("MEDFMT_CONFIG", dir.join("config.toml"));
    cmd.env_remove("RUST_LOG");
    cmd
}

fn plan_file(data_dir: &Path) -> std::path::PathBuf {
    data_dir.join("plan/medications.jsonl")
}

#[test]
fn test_cli_help() {
    let temp_dir = setup_test_dir();
    cli(temp_dir.path())
        .arg("--help")
        .assert()
        .success()
        .stdout(predicate::str::contains(
            "Medication dosage formatter and plan keeper",
        ));
}

#[test]
fn test_default_command_shows_samples() {
    let temp_dir = setup_test_dir();
    cli(temp_dir.path())
        .assert()
        .success()
        .stdout("Paracetamol: 1-0-2\nInfliximab: 1.5ml/min for 2h\n");
}

#[test]
fn test_format_tablet() {
    let temp_dir = setup_test_dir();
    cli(temp_dir.path())
        .args(["format", "--name", "Aspirin", "--tablet", "0,0,0"])
        .assert()
        .success()
        .stdout("Aspirin: 0-0-0\n");
}

#[test]
fn test_format_infusion() {
    let temp_dir = setup_test_dir();
    cli(temp_dir.path())
        .args(["format", "--name", "Saline", "--infusion", "0,0"])
        .assert()
        .success()
        .stdout("Saline: 0ml/min for 0h\n");
}

#[test]
fn test_format_large_tablet_count() {
    let temp_dir = setup_test_dir();
    cli(temp_dir.path())
        .args(["format", "--name", "X", "--tablet", "999999,0,1"])
        .assert()
        .success()
        .stdout("X: 999999-0-1\n");
}

#[test]
fn test_format_requires_a_dosage() {
    let temp_dir = setup_test_dir();
    cli(temp_dir.path())
        .args(["format", "--name", "X"])
        .assert()
        .failure();
}

#[test]
fn test_format_rejects_both_dosages() {
    let temp_dir = setup_test_dir();
    cli(temp_dir.path())
        .args(["format", "--name", "X", "--tablet", "1,0,2", "--infusion", "1.5,2"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("cannot be used with"));
}

#[test]
fn test_format_rejects_empty_name() {
    let temp_dir = setup_test_dir();
    cli(temp_dir.path())
        .args(["format", "--name", "", "--tablet", "1,0,2"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("drug name must not be empty"));
}

#[test]
fn test_format_rejects_negative_speed() {
    let temp_dir = setup_test_dir();
    cli(temp_dir.path())
        .args(["format", "--name", "X", "--infusion=-1.5,2"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("must not be negative"));
}

#[test]
fn test_add_and_list() {
    let temp_dir = setup_test_dir();
    let data_dir = temp_dir.path().join("data");

    cli(temp_dir.path())
        .arg("add")
        .arg("--data-dir")
        .arg(&data_dir)
        .args(["--name", "Paracetamol", "--tablet", "1,0,2"])
        .assert()
        .success()
        .stdout(predicate::str::contains("Added Paracetamol: 1-0-2"));

    cli(temp_dir.path())
        .arg("add")
        .arg("--data-dir")
        .arg(&data_dir)
        .args(["--name", "Infliximab", "--infusion", "1.5,2"])
        .assert()
        .success();

    assert!(plan_file(&data_dir).exists());

    cli(temp_dir.path())
        .arg("list")
        .arg("--data-dir")
        .arg(&data_dir)
        .assert()
        .success()
        .stdout("Paracetamol: 1-0-2\nInfliximab: 1.5ml/min for 2h\n");
}

#[test]
fn test_list_empty_plan() {
    let temp_dir = setup_test_dir();
    cli(temp_dir.path())
        .arg("list")
        .arg("--data-dir")
        .arg(temp_dir.path().join("data"))
        .assert()
        .success()
        .stdout(predicate::str::contains("No medications in plan."));
}

#[test]
fn test_invalid_add_does_not_write() {
    let temp_dir = setup_test_dir();
    let data_dir = temp_dir.path().join("data");

    cli(temp_dir.path())
        .arg("add")
        .arg("--data-dir")
        .arg(&data_dir)
        .args(["--name", "X", "--tablet", "1,2"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("expected three tablet counts"));

    assert!(!plan_file(&data_dir).exists());
}

#[test]
fn test_import_skips_inconsistent_rows() {
    let temp_dir = setup_test_dir();
    let data_dir = temp_dir.path().join("data");
    let csv_path = temp_dir.path().join("import.csv");

    fs::write(
        &csv_path,
        "drug_name,kind,morning,midday,evening,speed,duration\n\
         Paracetamol,tablet,1,0,2,,\n\
         Confused,,1,0,1,2.5,3\n\
         Infliximab,,,,,1.5,2\n",
    )
    .unwrap();

    cli(temp_dir.path())
        .arg("import")
        .arg(&csv_path)
        .arg("--data-dir")
        .arg(&data_dir)
        .assert()
        .success()
        .stdout(predicate::str::contains("Imported 2 medications"))
        .stderr(predicate::str::contains("line 3"));

    cli(temp_dir.path())
        .arg("list")
        .arg("--data-dir")
        .arg(&data_dir)
        .assert()
        .success()
        .stdout("Paracetamol: 1-0-2\nInfliximab: 1.5ml/min for 2h\n");
}

#[test]
fn test_import_abort_on_invalid() {
    let temp_dir = setup_test_dir();
    let data_dir = temp_dir.path().join("data");
    let csv_path = temp_dir.path().join("import.csv");

    fs::write(
        &csv_path,
        "drug_name,kind,morning,midday,evening,speed,duration\n\
         Paracetamol,tablet,1,0,2,,\n\
         Empty,,,,,,\n",
    )
    .unwrap();

    cli(temp_dir.path())
        .arg("import")
        .arg(&csv_path)
        .arg("--abort-on-invalid")
        .arg("--data-dir")
        .arg(&data_dir)
        .assert()
        .failure()
        .stderr(predicate::str::contains("neither"));

    assert!(!plan_file(&data_dir).exists());
}

#[test]
fn test_config_abort_policy() {
    let temp_dir = setup_test_dir();
    let data_dir = temp_dir.path().join("data");
    let csv_path = temp_dir.path().join("import.csv");

    fs::write(
        temp_dir.path().join("config.toml"),
        "[import]\non_invalid = \"abort\"\n",
    )
    .unwrap();
    fs::write(
        &csv_path,
        "drug_name,kind,morning,midday,evening,speed,duration\nBad,patch,1,1,1,,\n",
    )
    .unwrap();

    cli(temp_dir.path())
        .arg("import")
        .arg(&csv_path)
        .arg("--data-dir")
        .arg(&data_dir)
        .assert()
        .failure()
        .stderr(predicate::str::contains("unknown dosage kind"));
}

#[test]
fn test_config_data_dir() {
    let temp_dir = setup_test_dir();
    let data_dir = temp_dir.path().join("configured");

    fs::write(
        temp_dir.path().join("config.toml"),
        format!("[data]\ndata_dir = {:?}\n", data_dir.to_string_lossy()),
    )
    .unwrap();

    cli(temp_dir.path())
        .args(["add", "--name", "Aspirin", "--tablet", "1,1,1"])
        .assert()
        .success();

    assert!(plan_file(&data_dir).exists());
}

#[test]
fn test_export_round_trip() {
    let temp_dir = setup_test_dir();
    let data_dir = temp_dir.path().join("data");
    let other_dir = temp_dir.path().join("other");
    let csv_path = temp_dir.path().join("out/plan.csv");

    for (name, flag, value) in [
        ("Paracetamol", "--tablet", "1,0,2"),
        ("Infliximab", "--infusion", "1.5,2"),
    ] {
        cli(temp_dir.path())
            .arg("add")
            .arg("--data-dir")
            .arg(&data_dir)
            .args(["--name", name, flag, value])
            .assert()
            .success();
    }

    cli(temp_dir.path())
        .arg("export")
        .arg(&csv_path)
        .arg("--data-dir")
        .arg(&data_dir)
        .assert()
        .success()
        .stdout(predicate::str::contains("Exported 2 medications"));

    let csv_content = fs::read_to_string(&csv_path).expect("Failed to read CSV");
    assert!(csv_content.starts_with("drug_name,kind,morning,midday,evening,speed,duration"));

    cli(temp_dir.path())
        .arg("import")
        .arg(&csv_path)
        .arg("--data-dir")
        .arg(&other_dir)
        .assert()
        .success()
        .stdout(predicate::str::contains("Imported 2 medications"));

    cli(temp_dir.path())
        .arg("list")
        .arg("--data-dir")
        .arg(&other_dir)
        .assert()
        .success()
        .stdout("Paracetamol: 1-0-2\nInfliximab: 1.5ml/min for 2h\n");
}

#[test]
fn test_plan_lines_are_tagged_json() {
    let temp_dir = setup_test_dir();
    let data_dir = temp_dir.path().join("data");

    cli(temp_dir.path())
        .arg("add")
        .arg("--data-dir")
        .arg(&data_dir)
        .args(["--name", "Infliximab", "--infusion", "1.5,2"])
        .assert()
        .success();

    let content = fs::read_to_string(plan_file(&data_dir)).unwrap();
    let value: serde_json::Value = serde_json::from_str(content.trim()).unwrap();
    assert_eq!(value["medication"]["drug_name"], "Infliximab");
    assert_eq!(value["medication"]["dosage"]["kind"], "infusion");
    assert!(value["medication"]["dosage"].get("morning").is_none());
}
