//! CLI integration tests for the `visfix` binary.

#![allow(deprecated)]

use assert_cmd::Command;
use predicates::prelude::*;
use pretty_assertions::assert_eq;
use std::fs;
use std::path::Path;
use tempfile::TempDir;

fn visfix() -> Command {
    Command::cargo_bin("visfix").expect("visfix binary")
}

fn write(root: &Path, rel: &str, contents: &str) {
    let path = root.join(rel);
    fs::create_dir_all(path.parent().expect("parent")).expect("mkdir");
    fs::write(path, contents).expect("write");
}

/// A one-crate repo with two private structs and one public enum.
fn create_temp_repo() -> TempDir {
    let temp = TempDir::new().expect("create temp dir");
    write(
        temp.path(),
        "Cargo.toml",
        "[package]\nname = \"demo\"\nversion = \"0.1.0\"\nedition = \"2021\"\n",
    );
    write(
        temp.path(),
        "src/lib.rs",
        "struct Config {\n    name: String,\n}\n\npub enum Mode { A }\n\nstruct Other;\n",
    );
    temp
}

fn read(root: &Path, rel: &str) -> String {
    fs::read_to_string(root.join(rel)).expect("read")
}

#[test]
fn help_lists_subcommands() {
    visfix()
        .arg("--help")
        .assert()
        .success()
        .stdout(predicate::str::contains("check"))
        .stdout(predicate::str::contains("fix"))
        .stdout(predicate::str::contains("list-fixes"));
}

#[test]
fn unknown_fix_is_rejected_by_parser() {
    let temp = create_temp_repo();
    visfix()
        .current_dir(temp.path())
        .args(["fix", "--fix", "make_private"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("make_private"));
}

#[test]
fn unknown_kind_is_rejected_by_parser() {
    visfix()
        .args(["check", "--kind", "struct,impl"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("impl"));
}

#[test]
fn list_fixes_text() {
    visfix()
        .arg("list-fixes")
        .assert()
        .success()
        .stdout(predicate::str::contains("make_pub"))
        .stdout(predicate::str::contains("make_pub_crate"))
        .stdout(predicate::str::contains("VIS001"));
}

#[test]
fn list_fixes_json() {
    let output = visfix()
        .args(["list-fixes", "--format", "json"])
        .output()
        .expect("run");
    assert!(output.status.success());

    let fixes: serde_json::Value = serde_json::from_slice(&output.stdout).expect("json");
    let ids: Vec<&str> = fixes
        .as_array()
        .expect("array")
        .iter()
        .map(|f| f["fix_id"].as_str().expect("fix_id"))
        .collect();
    assert_eq!(ids, vec!["make_pub", "make_pub_crate"]);
    assert_eq!(fixes[1]["inserts"], "pub(crate)");
}

#[test]
fn check_reports_findings_and_exits_2() {
    let temp = create_temp_repo();
    visfix()
        .current_dir(temp.path())
        .arg("check")
        .assert()
        .code(2)
        .stdout(predicate::str::contains("src/lib.rs:1:1: VIS001"))
        .stdout(predicate::str::contains("src/lib.rs:7:1: VIS001"))
        .stdout(predicate::str::contains("Mode").not());

    assert!(temp.path().join("target/visfix/report.json").exists());
    assert!(temp.path().join("target/visfix/report.md").exists());
    assert_eq!(read(temp.path(), "src/lib.rs").lines().next(), Some("struct Config {"));
}

#[test]
fn check_clean_repo_succeeds() {
    let temp = TempDir::new().expect("temp dir");
    write(temp.path(), "Cargo.toml", "[package]\nname = \"clean\"\n");
    write(temp.path(), "src/lib.rs", "pub struct A;\nfn helper() {}\n");

    visfix()
        .current_dir(temp.path())
        .arg("check")
        .assert()
        .success()
        .stdout(predicate::str::is_empty());
}

#[test]
fn check_kind_flag_widens_the_rule() {
    let temp = TempDir::new().expect("temp dir");
    write(temp.path(), "Cargo.toml", "[package]\nname = \"fns\"\n");
    write(temp.path(), "src/lib.rs", "fn helper() {}\n");

    visfix()
        .current_dir(temp.path())
        .arg("check")
        .assert()
        .success();
    visfix()
        .current_dir(temp.path())
        .args(["check", "--kind", "fn"])
        .assert()
        .code(2)
        .stdout(predicate::str::contains("VIS001"));
}

#[test]
fn fix_without_apply_leaves_files_alone() {
    let temp = create_temp_repo();
    let original = read(temp.path(), "src/lib.rs");

    visfix()
        .current_dir(temp.path())
        .arg("fix")
        .assert()
        .success()
        .stdout(predicate::str::contains("--apply"));

    assert_eq!(read(temp.path(), "src/lib.rs"), original);
    let patch = read(temp.path(), "target/visfix/patch.diff");
    assert!(patch.contains("+pub struct Config {"));
    assert!(patch.contains("+pub struct Other;"));
}

#[test]
fn fix_apply_writes_files_and_second_check_is_clean() {
    let temp = create_temp_repo();

    visfix()
        .current_dir(temp.path())
        .args(["fix", "--fix", "make_pub_crate", "--apply"])
        .assert()
        .success()
        .stdout(predicate::str::contains("applied 2 edit(s)"));

    assert_eq!(
        read(temp.path(), "src/lib.rs"),
        "pub(crate) struct Config {\n    name: String,\n}\n\npub enum Mode { A }\n\npub(crate) struct Other;\n"
    );
    visfix()
        .current_dir(temp.path())
        .arg("check")
        .assert()
        .success();
}

#[test]
fn root_and_out_dir_flags() {
    let temp = create_temp_repo();
    let out = TempDir::new().expect("out dir");

    visfix()
        .arg("fix")
        .arg("--root")
        .arg(temp.path())
        .arg("--out-dir")
        .arg(out.path())
        .assert()
        .success();

    let report: serde_json::Value =
        serde_json::from_str(&read(out.path(), "report.json")).expect("report json");
    assert_eq!(report["schema"], "visfix.report.v1");
    assert_eq!(report["fix"], "make_pub");
    assert_eq!(report["summary"]["findings"], 2);
    assert!(!temp.path().join("target/visfix").exists());
}

#[test]
fn config_file_sets_default_fix_and_exclude() {
    let temp = create_temp_repo();
    write(temp.path(), "src/generated/out.rs", "struct Generated;\n");
    write(
        temp.path(),
        "visfix.toml",
        "[fix]\ndefault = \"make_pub_crate\"\n\n[discovery]\nexclude = [\"**/generated/**\"]\n",
    );

    visfix()
        .current_dir(temp.path())
        .args(["fix", "--apply"])
        .assert()
        .success();

    assert!(read(temp.path(), "src/lib.rs").starts_with("pub(crate) struct Config"));
    assert_eq!(read(temp.path(), "src/generated/out.rs"), "struct Generated;\n");
}

#[test]
fn invalid_config_file_is_a_tool_error() {
    let temp = create_temp_repo();
    write(temp.path(), "visfix.toml", "[fix]\ndefault = 42\n");

    visfix()
        .current_dir(temp.path())
        .arg("check")
        .assert()
        .code(1);
}

#[test]
fn syntax_error_is_reported_but_other_files_are_fixed() {
    let temp = create_temp_repo();
    write(temp.path(), "src/broken.rs", "struct Broken {\n");

    visfix()
        .current_dir(temp.path())
        .args(["fix", "--apply"])
        .assert()
        .code(2)
        .stderr(predicate::str::contains("rule_evaluation_failed"));

    assert_eq!(read(temp.path(), "src/broken.rs"), "struct Broken {\n");
    assert!(read(temp.path(), "src/lib.rs").starts_with("pub struct Config"));
}

#[test]
fn unreadable_file_does_not_stop_the_pass() {
    let temp = create_temp_repo();
    fs::write(temp.path().join("src/latin1.rs"), b"struct Caf\xE9;\n").expect("write latin1");

    visfix()
        .current_dir(temp.path())
        .args(["fix", "--apply"])
        .assert()
        .success();

    assert!(read(temp.path(), "src/lib.rs").starts_with("pub struct Config"));
}
