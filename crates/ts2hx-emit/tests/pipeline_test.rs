use pretty_assertions::assert_eq;
use std::collections::BTreeMap;
use std::fs;
use std::path::{Path, PathBuf};
use tempfile::tempdir;
use ts2hx_emit::{EmitterConfig, ProjectEmitter};
use walkdir::WalkDir;

/// Every file under `dir` with its contents, keyed by relative path.
fn snapshot(dir: &Path) -> BTreeMap<PathBuf, String> {
    WalkDir::new(dir)
        .into_iter()
        .map(|entry| entry.unwrap())
        .filter(|entry| entry.file_type().is_file())
        .map(|entry| {
            let rel = entry.path().strip_prefix(dir).unwrap().to_path_buf();
            (rel, fs::read_to_string(entry.path()).unwrap())
        })
        .collect()
}

fn write(root: &Path, rel: &str, text: &str) {
    let path = root.join(rel);
    fs::create_dir_all(path.parent().unwrap()).unwrap();
    fs::write(path, text).unwrap();
}

fn emitter(root: &Path) -> ProjectEmitter {
    let config = EmitterConfig::default()
        .with_out_dir(root.join("hx-out"))
        .with_base_package("app")
        .with_colors(false);
    ProjectEmitter::load(&root.join("tsconfig.json"), config).unwrap()
}

fn todo_project(root: &Path) {
    write(root, "tsconfig.json", r#"{ "include": ["src"] }"#);
    write(
        root,
        "src/models/todo.ts",
        r#"export interface Todo {
  id: string;
  done?: boolean;
}
export type Filter = "all" | "open" | "done";
"#,
    );
    write(
        root,
        "src/server.ts",
        r#"import express from "express";
import { v4 as uuid } from "uuid";
import type { Request } from "express";
import { Todo } from "./models/todo";

export function create(title: string): Todo {
  return { id: uuid(), done: false };
}

export function start(port: number = 3000): void {
  const server = express();
  server.listen(port);
}
"#,
    );
}

#[test]
fn test_emits_modules_and_externs() {
    let dir = tempdir().unwrap();
    todo_project(dir.path());

    let report = emitter(dir.path()).emit().unwrap();
    assert!(report.abandoned.is_empty(), "{:?}", report.abandoned);

    let files = snapshot(&dir.path().join("hx-out"));
    let paths: Vec<String> = files
        .keys()
        .map(|p| p.to_string_lossy().replace('\\', "/"))
        .collect();
    assert_eq!(
        paths,
        vec![
            "app/Server.hx",
            "app/externs/Express.hx",
            "app/externs/Uuid.hx",
            "app/models/Todo.hx",
        ]
    );

    let server = &files[Path::new("app/Server.hx")];
    assert!(server.starts_with("package app;\n\nimport app.models.Todo;\n\n"));
    assert!(server.contains("final server = app.externs.Express.__default();"));
    assert!(server.contains("id: app.externs.Uuid.v4()"));

    assert_eq!(
        files[Path::new("app/externs/Uuid.hx")],
        "package app.externs;\n\n@:jsRequire(\"uuid\") extern class Uuid {\n  static var v4: Dynamic;\n}\n"
    );
    let express = &files[Path::new("app/externs/Express.hx")];
    assert!(express.contains("@:native(\"default\") static var __default: Dynamic;"));
    assert!(!express.contains("Request"));
}

#[test]
fn test_second_run_is_byte_identical() {
    let dir = tempdir().unwrap();
    todo_project(dir.path());

    emitter(dir.path()).emit().unwrap();
    let first = snapshot(&dir.path().join("hx-out"));

    let report = emitter(dir.path()).emit().unwrap();
    let second = snapshot(&dir.path().join("hx-out"));
    assert_eq!(first, second);
    assert!(report.written.iter().all(|f| !f.changed));
    assert!(report.externs.iter().all(|f| !f.changed));
}

#[test]
fn test_abandoned_file_loses_stale_output() {
    let dir = tempdir().unwrap();
    write(dir.path(), "tsconfig.json", "{}");
    write(dir.path(), "src/main.ts", "export const answer = 42;\n");
    write(dir.path(), "src/other.ts", "export const name = \"x\";\n");

    emitter(dir.path()).emit().unwrap();
    let main_out = dir.path().join("hx-out/app/Main.hx");
    assert!(main_out.exists());

    write(
        dir.path(),
        "src/main.ts",
        "export async function load(): Promise<number> {\n  return 42;\n}\n",
    );
    let report = emitter(dir.path()).emit().unwrap();

    assert!(!main_out.exists());
    assert!(dir.path().join("hx-out/app/Other.hx").exists());
    assert_eq!(report.abandoned.len(), 1);
    let abandoned = &report.abandoned[0];
    assert_eq!(abandoned.source, Path::new("main.ts"));
    assert_eq!(abandoned.reason.line, 1);
    assert!(abandoned.removed.is_some());
}

#[test]
fn test_only_referenced_foreign_modules_get_externs() {
    let dir = tempdir().unwrap();
    write(dir.path(), "tsconfig.json", "{}");
    write(
        dir.path(),
        "main.ts",
        r#"import type { Options } from "lodash";
import * as path from "path";

export function join(o: Options): string {
  return path.join("a", path["sep"]);
}
"#,
    );

    let emitter = emitter(dir.path());
    let plan = emitter.plan();
    let specifiers: Vec<&str> = plan
        .registry
        .iter()
        .map(|(descriptor, _)| descriptor.specifier.as_str())
        .collect();
    assert_eq!(specifiers, vec!["path"]);
    let path = plan.registry.get("path").unwrap();
    assert_eq!(path.members.iter().collect::<Vec<_>>(), vec!["join", "sep"]);
    assert!(!path.requires_default);
    assert!(plan.diagnostics().is_empty());
}

#[test]
fn test_clean_removes_unrelated_files() {
    let dir = tempdir().unwrap();
    write(dir.path(), "tsconfig.json", "{}");
    write(dir.path(), "main.ts", "export const a = 1;\n");
    write(dir.path(), "hx-out/leftover.txt", "old");

    let config = EmitterConfig::default()
        .with_out_dir(dir.path().join("hx-out"))
        .with_base_package("app")
        .with_clean(true);
    ProjectEmitter::load(&dir.path().join("tsconfig.json"), config)
        .unwrap()
        .emit()
        .unwrap();

    let files = snapshot(&dir.path().join("hx-out"));
    assert_eq!(files.len(), 1);
    assert_eq!(
        files[Path::new("app/Main.hx")],
        "package app;\n\nfinal a = 1;\n"
    );
}

#[test]
fn test_file_with_one_unsupported_function_produces_nothing() {
    let dir = tempdir().unwrap();
    write(dir.path(), "tsconfig.json", "{}");
    write(
        dir.path(),
        "main.ts",
        r#"export function double(n: number): number {
  return n * 2;
}

export function* count(): Generator<number> {
  yield 1;
}
"#,
    );

    let report = emitter(dir.path()).emit().unwrap();
    assert!(report.written.is_empty());
    assert_eq!(report.abandoned.len(), 1);
    assert_eq!(report.abandoned[0].reason.line, 5);
    assert!(!dir.path().join("hx-out/app/Main.hx").exists());
}

#[test]
fn test_foreign_members_are_collected_across_files() {
    let dir = tempdir().unwrap();
    write(dir.path(), "tsconfig.json", "{}");
    write(
        dir.path(),
        "a.ts",
        "import { x } from \"fakepkg\";\nexport const first = x;\n",
    );
    write(
        dir.path(),
        "b.ts",
        "import * as ns from \"fakepkg\";\nexport const second = ns.y;\n",
    );

    let report = emitter(dir.path()).emit().unwrap();
    assert!(report.abandoned.is_empty(), "{:?}", report.abandoned);

    let files = snapshot(&dir.path().join("hx-out"));
    assert_eq!(
        files[Path::new("app/externs/Fakepkg.hx")],
        "package app.externs;\n\n@:jsRequire(\"fakepkg\") extern class Fakepkg {\n  static var x: Dynamic;\n  static var y: Dynamic;\n}\n"
    );
    assert!(files[Path::new("app/A.hx")].contains("final first = app.externs.Fakepkg.x;"));
    assert!(files[Path::new("app/B.hx")].contains("final second = app.externs.Fakepkg.y;"));
}

#[test]
fn test_extern_never_replaces_project_module() {
    let dir = tempdir().unwrap();
    write(dir.path(), "tsconfig.json", "{}");
    write(dir.path(), "externs/fakepkg.ts", "export const mine = 1;\n");
    write(
        dir.path(),
        "main.ts",
        "import { x } from \"fakepkg\";\nexport const value = x;\n",
    );

    let report = emitter(dir.path()).emit().unwrap();
    assert!(report.abandoned.is_empty(), "{:?}", report.abandoned);

    let files = snapshot(&dir.path().join("hx-out"));
    assert_eq!(
        files[Path::new("app/externs/Fakepkg.hx")],
        "package app.externs;\n\nfinal mine = 1;\n"
    );
    assert!(files[Path::new("app/externs/Fakepkg2.hx")]
        .contains("@:jsRequire(\"fakepkg\") extern class Fakepkg2 {"));
    assert!(files[Path::new("app/Main.hx")].contains("final value = app.externs.Fakepkg2.x;"));
}

#[test]
fn test_side_effect_foreign_import_abandons_file() {
    let dir = tempdir().unwrap();
    write(dir.path(), "tsconfig.json", "{}");
    write(
        dir.path(),
        "main.ts",
        "import \"reflect-metadata\";\n\nexport function f(): number {\n  return 1;\n}\n",
    );

    let report = emitter(dir.path()).emit().unwrap();
    assert!(report.written.is_empty());
    assert!(report.externs.is_empty());
    assert_eq!(report.abandoned.len(), 1);
    assert_eq!(report.abandoned[0].reason.kind, "import_statement");
    assert_eq!(report.abandoned[0].reason.line, 1);
}
