use assert_cmd::Command;
use predicates::prelude::*;
use serde_json::Value;
use std::fs;
use std::path::Path;
use tempfile::tempdir;

fn ts2hx() -> Command {
    Command::cargo_bin("ts2hx").unwrap()
}

fn write(root: &Path, rel: &str, text: &str) {
    let path = root.join(rel);
    fs::create_dir_all(path.parent().unwrap()).unwrap();
    fs::write(path, text).unwrap();
}

fn sample_project(root: &Path) {
    write(root, "tsconfig.json", r#"{ "compilerOptions": { "rootDir": "src" } }"#);
    write(root, "src/main.ts", "import { greet } from \"./greet\";\nexport const message = greet(\"world\");\n");
    write(
        root,
        "src/greet.ts",
        "export function greet(name: string): string {\n  return \"hello \" + name;\n}\n",
    );
    write(root, "src/later.ts", "export async function later(): Promise<void> {}\n");
}

#[test]
fn test_translates_project() {
    let dir = tempdir().unwrap();
    sample_project(dir.path());

    ts2hx()
        .current_dir(dir.path())
        .args(["-b", "app", "-o", "out"])
        .assert()
        .success()
        .stdout(predicate::str::contains("main.ts -> app/Main.hx"))
        .stdout(predicate::str::contains("Done: 2 files, 0 externs, 1 abandoned"));

    let main = fs::read_to_string(dir.path().join("out/app/Main.hx")).unwrap();
    assert!(main.starts_with("package app;\n"));
    assert!(dir.path().join("out/app/Greet.hx").exists());
    assert!(!dir.path().join("out/app/Later.hx").exists());
}

#[test]
fn test_json_report() {
    let dir = tempdir().unwrap();
    sample_project(dir.path());

    let assert = ts2hx()
        .current_dir(dir.path())
        .args(["--format", "json"])
        .assert()
        .success();

    let report: Value = serde_json::from_slice(&assert.get_output().stdout).unwrap();
    assert_eq!(report["written"].as_array().unwrap().len(), 2);
    assert_eq!(report["abandoned"][0]["source"], "later.ts");
    assert_eq!(report["abandoned"][0]["reason"]["line"], 1);
    assert!(dir.path().join("hx-out/Main.hx").exists());
}

#[test]
fn test_missing_config_fails() {
    let dir = tempdir().unwrap();

    ts2hx()
        .current_dir(dir.path())
        .args(["-p", "nope.json"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("nope.json"));
    assert!(!dir.path().join("hx-out").exists());
}

#[test]
fn test_list_files_does_not_write() {
    let dir = tempdir().unwrap();
    sample_project(dir.path());

    ts2hx()
        .current_dir(dir.path())
        .args(["--list-files", "-b", "app"])
        .assert()
        .success()
        .stdout(predicate::str::contains("greet.ts app.Greet"))
        .stdout(predicate::str::contains("main.ts app.Main"));
    assert!(!dir.path().join("hx-out").exists());
}

#[test]
fn test_list_diagnostics() {
    let dir = tempdir().unwrap();
    sample_project(dir.path());

    let assert = ts2hx()
        .current_dir(dir.path())
        .args(["--list-diagnostics", "--format", "json"])
        .assert()
        .success();

    let diagnostics: Value = serde_json::from_slice(&assert.get_output().stdout).unwrap();
    let diagnostics = diagnostics.as_array().unwrap();
    assert_eq!(diagnostics.len(), 1);
    assert_eq!(diagnostics[0]["severity"], "warning");
    assert_eq!(diagnostics[0]["file"], "later.ts");
    assert!(!dir.path().join("hx-out").exists());
}

#[test]
fn test_no_color_report_is_plain() {
    let dir = tempdir().unwrap();
    sample_project(dir.path());

    ts2hx()
        .current_dir(dir.path())
        .env("CLICOLOR_FORCE", "1")
        .arg("--no-color")
        .assert()
        .success()
        .stdout(predicate::str::contains("Done: 2 files").and(predicate::str::contains("\u{1b}[").not()));
}

#[test]
fn test_forced_colors_reach_the_report() {
    let dir = tempdir().unwrap();
    sample_project(dir.path());

    ts2hx()
        .current_dir(dir.path())
        .env("CLICOLOR_FORCE", "1")
        .assert()
        .success()
        .stdout(predicate::str::contains("\u{1b}["));
}
