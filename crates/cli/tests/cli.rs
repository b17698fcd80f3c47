//! End-to-end tests running the `pv` binary against a temp database.

use std::path::{Path, PathBuf};

use assert_cmd::Command;
use assert_cmd::prelude::*;
use predicates::prelude::*;
use tempfile::TempDir;

fn pv(db: &Path) -> Command {
    let mut cmd = Command::cargo_bin("pv").unwrap();
    cmd.env_remove("PV_DB").arg("--db").arg(db);
    cmd
}

fn temp_db() -> (TempDir, PathBuf) {
    let dir = TempDir::new().unwrap();
    let db = dir.path().join("pv.db");
    (dir, db)
}

#[test]
fn init_creates_database_and_is_idempotent() {
    let (_dir, db) = temp_db();

    pv(&db)
        .arg("init")
        .assert()
        .success()
        .stdout(predicate::str::contains("initialized"));
    assert!(db.exists());

    pv(&db).arg("init").assert().success();
}

#[test]
fn version_flag_prints_name_and_semver() {
    Command::cargo_bin("pv")
        .unwrap()
        .arg("--version")
        .assert()
        .success()
        .stdout(predicate::str::contains("pv 0.1.0"));
}

#[test]
fn add_requires_content_or_file() {
    let (_dir, db) = temp_db();

    pv(&db)
        .args(["add", "p"])
        .assert()
        .failure()
        .code(1)
        .stderr(predicate::str::contains("--content or --file"));
}

#[test]
fn add_rejects_content_and_file_together() {
    let (_dir, db) = temp_db();
    let file = db.parent().unwrap().join("prompt.txt");
    std::fs::write(&file, "from file").unwrap();

    pv(&db)
        .args(["add", "p", "--content", "inline", "--file"])
        .arg(&file)
        .assert()
        .failure()
        .stderr(predicate::str::contains("not both"));
}

#[test]
fn add_reads_from_file_and_stdin() {
    let (_dir, db) = temp_db();
    let file = db.parent().unwrap().join("prompt.txt");
    std::fs::write(&file, "from file").unwrap();

    pv(&db)
        .args(["add", "p", "--file"])
        .arg(&file)
        .assert()
        .success()
        .stdout(predicate::str::contains("Added p v1"));

    pv(&db)
        .args(["add", "p", "--content", "-"])
        .write_stdin("from stdin")
        .assert()
        .success()
        .stdout(predicate::str::contains("Added p v2"));

    pv(&db)
        .args(["show", "p"])
        .assert()
        .success()
        .stdout(predicate::str::contains("from stdin"));
}

#[test]
fn list_json_reports_summaries() {
    let (_dir, db) = temp_db();
    pv(&db).args(["add", "beta", "-c", "b"]).assert().success();
    pv(&db).args(["add", "alpha", "-c", "a"]).assert().success();

    let out = pv(&db).args(["list", "--json"]).output().unwrap();
    assert!(out.status.success());
    let parsed: serde_json::Value = serde_json::from_slice(&out.stdout).unwrap();
    let names: Vec<&str> = parsed
        .as_array()
        .unwrap()
        .iter()
        .map(|p| p["name"].as_str().unwrap())
        .collect();
    assert_eq!(names, vec!["alpha", "beta"]);
    assert_eq!(parsed[0]["versions"], 1);
    assert_eq!(parsed[0]["latest"], 1);
}

#[test]
fn log_on_unknown_prompt_fails() {
    let (_dir, db) = temp_db();

    pv(&db)
        .args(["log", "ghost"])
        .assert()
        .failure()
        .code(1)
        .stderr(predicate::str::contains("not found"));
}

#[test]
fn tag_command_updates_version_tags() {
    let (_dir, db) = temp_db();
    pv(&db)
        .args(["add", "p", "-c", "v1", "--tag", "drop-me"])
        .assert()
        .success();

    pv(&db)
        .args(["tag", "p", "1", "--add", "prod", "--remove", "drop-me"])
        .assert()
        .success()
        .stdout(predicate::str::contains("Updated tags on p v1"));

    let out = pv(&db).args(["log", "p", "--json"]).output().unwrap();
    let parsed: serde_json::Value = serde_json::from_slice(&out.stdout).unwrap();
    assert_eq!(parsed[0]["tags"], serde_json::json!(["prod"]));
}

#[test]
fn tag_command_requires_add_or_remove() {
    let (_dir, db) = temp_db();
    pv(&db).args(["add", "p", "-c", "v1"]).assert().success();

    pv(&db)
        .args(["tag", "p", "1"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("--add and/or --remove"));
}

#[test]
fn export_writes_full_history_to_file() {
    let (_dir, db) = temp_db();
    let out_path = db.parent().unwrap().join("export.json");
    pv(&db)
        .args(["add", "p", "-c", "one", "--tag", "t1", "--note", "first"])
        .assert()
        .success();
    pv(&db).args(["add", "p", "-c", "two"]).assert().success();

    pv(&db)
        .args(["export", "p", "--output"])
        .arg(&out_path)
        .assert()
        .success();

    let parsed: serde_json::Value =
        serde_json::from_str(&std::fs::read_to_string(&out_path).unwrap()).unwrap();
    assert_eq!(parsed["name"], "p");
    let versions = parsed["versions"].as_array().unwrap();
    assert_eq!(versions.len(), 2);
    assert_eq!(versions[0]["version"], 1);
    assert_eq!(versions[0]["tags"], serde_json::json!(["t1"]));
    assert_eq!(versions[0]["note"], "first");
    assert_eq!(versions[1]["content"], "two");
    assert_eq!(versions[1]["hash"].as_str().unwrap().len(), 64);
}

#[test]
fn diff_of_identical_versions_reports_no_differences() {
    let (_dir, db) = temp_db();
    pv(&db).args(["add", "p", "-c", "same"]).assert().success();
    pv(&db).args(["add", "p", "-c", "same"]).assert().success();

    pv(&db)
        .args(["diff", "p", "1", "2"])
        .assert()
        .success()
        .stdout(predicate::str::contains("No differences."));
}

#[test]
fn diff_out_of_range_fails() {
    let (_dir, db) = temp_db();
    pv(&db).args(["add", "p", "-c", "v1"]).assert().success();

    pv(&db)
        .args(["diff", "p", "1", "9"])
        .assert()
        .failure()
        .code(1)
        .stderr(predicate::str::contains("out of range"));
}

// The full lifecycle: add twice, diff, rollback, log, delete.
#[test]
fn greet_scenario_end_to_end() {
    let (_dir, db) = temp_db();

    pv(&db)
        .args(["add", "greet", "-c", "Hi {{name}}"])
        .assert()
        .success()
        .stdout(predicate::str::contains("Added greet v1"));
    pv(&db)
        .args(["add", "greet", "-c", "Hello {{name}}"])
        .assert()
        .success()
        .stdout(predicate::str::contains("Added greet v2"));

    pv(&db)
        .args(["diff", "greet", "1", "2"])
        .assert()
        .success()
        .stdout(predicate::str::contains("-Hi {{name}}"))
        .stdout(predicate::str::contains("+Hello {{name}}"));

    pv(&db)
        .args(["rollback", "greet", "1"])
        .assert()
        .success()
        .stdout(predicate::str::contains("new v3"));

    pv(&db)
        .args(["show", "greet"])
        .assert()
        .success()
        .stdout(predicate::str::contains("greet v3"))
        .stdout(predicate::str::contains("Hi {{name}}"));

    let out = pv(&db).args(["log", "greet", "--json"]).output().unwrap();
    let parsed: serde_json::Value = serde_json::from_slice(&out.stdout).unwrap();
    let numbers: Vec<i64> = parsed
        .as_array()
        .unwrap()
        .iter()
        .map(|v| v["version"].as_i64().unwrap())
        .collect();
    assert_eq!(numbers, vec![1, 2, 3]);

    pv(&db)
        .args(["delete", "greet", "--yes"])
        .assert()
        .success()
        .stdout(predicate::str::contains("Deleted greet"));

    pv(&db)
        .args(["log", "greet"])
        .assert()
        .failure()
        .code(1)
        .stderr(predicate::str::contains("not found"));
}
