use super::*;
use pretty_assertions::assert_eq;
use std::path::PathBuf;

fn program(files: &[(&str, &str)]) -> Program {
    let sources = files
        .iter()
        .map(|(path, text)| (PathBuf::from(path), text.to_string()))
        .collect();
    Program::from_sources("/project", "app", sources).expect("program should load")
}

fn translate(program: &Program, path: &str) -> TranslationResult {
    let registry = collect_foreign_modules(program).finish("app");
    let index = program
        .find(&PathBuf::from("/project").join(path))
        .expect("file should be part of the program");
    translate_unit(program, &registry, index, &TranslateOptions::default())
}

fn emitted(source: &str) -> String {
    let program = program(&[("main.ts", source)]);
    match translate(&program, "main.ts") {
        TranslationResult::Emitted(file) => file.text,
        TranslationResult::Abandoned(reason) => panic!("file was abandoned: {:?}", reason),
    }
}

fn abandoned(source: &str) -> Unsupported {
    let program = program(&[("main.ts", source)]);
    match translate(&program, "main.ts") {
        TranslationResult::Abandoned(reason) => reason,
        TranslationResult::Emitted(file) => panic!("expected abandonment, got:\n{}", file.text),
    }
}

#[test]
fn test_default_parameter() {
    let text = emitted(
        r#"export function greet(name: string = "world"): string {
  return `Hello ${name}`;
}
"#,
    );
    assert_eq!(
        text,
        r#"package app;

function greet(?name: String): String {
  if (name == null) name = "world";
  return ("Hello " + name);
}
"#
    );
}

#[test]
fn test_string_literal_union() {
    let text = emitted(r#"export type Status = "active" | "done" | "in-progress";"#);
    insta::assert_snapshot!(text, @r###"
    package app;

    enum abstract Status(String) from String to String {
      var Active = "active";
      var Done = "done";
      var InProgress = "in-progress";
    }
    "###);
}

#[test]
fn test_numeric_enum_auto_increment() {
    let text = emitted("export enum Level { Low = 1, Mid, High = 10, Max }");
    insta::assert_snapshot!(text, @r###"
    package app;

    enum abstract Level(Float) from Float to Float {
      var Low = 1;
      var Mid = 2;
      var High = 10;
      var Max = 11;
    }
    "###);
}

#[test]
fn test_unexported_declarations_are_private() {
    let text = emitted("const limit = 3;\nexport const doubled = limit * 2;");
    assert!(text.contains("private final limit = 3;"));
    assert!(text.contains("final doubled = (limit * 2);"));
}

#[test]
fn test_destructuring_evaluates_source_once() {
    let text = emitted(
        r#"export function total(): number {
  const { a, b } = source();
  return a + b;
}
"#,
    );
    assert!(text.contains("  var __tmp0 = source();\n  final a = __tmp0.a;\n  final b = __tmp0.b;"));
    assert!(text.contains("return (a + b);"));
    assert_eq!(text.matches("source()").count(), 1);
}

#[test]
fn test_object_rest_pattern() {
    let text = emitted(
        r#"export function rest(): void {
  const { a, ...others } = source();
}
"#,
    );
    assert!(text.contains("var __tmp1 = Reflect.copy(__tmp0);"));
    assert!(text.contains("Reflect.deleteField(__tmp1, \"a\");"));
    assert!(text.contains("final others = __tmp1;"));
}

#[test]
fn test_pattern_default_and_hole() {
    let text = emitted(
        r#"export function pick(): void {
  const [, second = 5] = pair();
}
"#,
    );
    assert!(text.contains("var __tmp1 = __tmp0[1];"));
    assert!(text.contains("final second = (__tmp1 == null ? 5 : __tmp1);"));
}

#[test]
fn test_array_hole_abandons_file() {
    let reason = abandoned("export const xs = [1, , 2];");
    assert_eq!(reason.line, 1);
    assert!(reason.detail.contains("hole"));
}

#[test]
fn test_switch_grouping_and_default_last() {
    let text = emitted(
        r#"export function label(n: number): string {
  switch (n) {
    case 1:
    case 2:
      return "low";
    default:
      return "other";
    case 3:
      log(n);
      break;
  }
  return "";
}
"#,
    );
    let expected = r#"  switch (n) {
    case 1, 2:
      return "low";
    case 3:
      log(n);
    default:
      return "other";
  }"#;
    assert!(text.contains(expected), "unexpected switch:\n{}", text);
}

#[test]
fn test_switch_fallthrough_abandons_file() {
    let reason = abandoned(
        r#"export function f(n: number): void {
  switch (n) {
    case 1:
      a();
    case 2:
      b();
      break;
  }
}
"#,
    );
    assert_eq!(reason.kind, "switch_case");
    assert_eq!(reason.line, 3);
}

#[test]
fn test_break_inside_case_abandons_file() {
    let reason = abandoned(
        r#"export function f(n: number, x: boolean): void {
  switch (n) {
    case 1:
      if (x) break;
      a();
      break;
  }
}
"#,
    );
    assert_eq!(reason.kind, "break_statement");
}

#[test]
fn test_break_inside_loop_in_case_is_kept() {
    let text = emitted(
        r#"export function f(n: number, xs: number[]): void {
  switch (n) {
    case 1:
      for (const x of xs) {
        if (x > 2) break;
      }
      break;
  }
}
"#,
    );
    assert!(text.contains("for (x in xs) {"));
    assert!(text.contains("break;"));
}

#[test]
fn test_for_loop_lowering() {
    let text = emitted(
        r#"export function sum(xs: number[]): number {
  let total = 0;
  for (let i = 0; i < xs.length; i++) {
    total += xs[i];
  }
  return total;
}
"#,
    );
    let expected = r#"  {
    var i = 0;
    while (i < xs.length) {
      total += xs[i];
      i++;
    }
  }"#;
    assert!(text.contains(expected), "unexpected loop:\n{}", text);
    assert!(text.contains("function sum(xs: Array<Float>): Float {"));
}

#[test]
fn test_for_in_iterates_fields() {
    let text = emitted(
        r#"export function keys(o: any): void {
  for (const k in o) {
    log(k);
  }
}
"#,
    );
    assert!(text.contains("for (k in Reflect.fields(o)) {"));
}

#[test]
fn test_builtin_calls() {
    let text = emitted(
        r#"export function show(v: any, s: string, xs: number[]): void {
  console.log(JSON.stringify(v));
  const t = s.trim();
  const ys = xs.slice();
}
"#,
    );
    assert!(text.contains("trace(haxe.Json.stringify(v));"));
    assert!(text.contains("final t = StringTools.trim(s);"));
    assert!(text.contains("final ys = xs.slice(0);"));
}

#[test]
fn test_console_log_with_two_arguments_abandons_file() {
    let reason = abandoned("export function f(): void {\n  console.log(1, 2);\n}\n");
    assert_eq!(reason.line, 2);
}

#[test]
fn test_spread_lowering() {
    let text = emitted(
        r#"export const merged = { ...a, b: 1 };
export const joined = [1, ...xs, 2];
export const copied = [...xs];
"#,
    );
    assert!(text.contains("final merged = (js.lib.Object.assign({}, a, { b: 1 }) : Dynamic);"));
    assert!(text.contains("final joined = [1].concat(xs).concat([2]);"));
    assert!(text.contains("final copied = [].concat(xs);"));
}

#[test]
fn test_operators() {
    let text = emitted(
        r#"export function ops(a: number, b: number, o: any): void {
  const p = a ** b;
  const same = a === b;
  const has = "k" in o;
  const isList = o instanceof Array;
  const n = !same;
}
"#,
    );
    assert!(text.contains("final p = Math.pow(a, b);"));
    assert!(text.contains("final same = (a == b);"));
    assert!(text.contains("final has = Reflect.hasField(o, \"k\");"));
    assert!(text.contains("final isList = Std.isOfType(o, Array);"));
    assert!(text.contains("final n = !(same);"));
}

#[test]
fn test_interface_becomes_typedef() {
    let text = emitted(
        r#"export interface Todo {
  title: string;
  done?: boolean;
  toggle(): void;
}
"#,
    );
    let expected = r#"typedef Todo = {
  var title: String;
  @:optional var done: Bool;
  function toggle(): Void;
}"#;
    assert!(text.contains(expected), "unexpected typedef:\n{}", text);
}

#[test]
fn test_class_members() {
    let text = emitted(
        r#"export class Counter {
  private count: number = 0;
  static readonly max = 10;
  constructor(public name: string) {}
  increment(by: number = 1): number {
    this.count += by;
    return this.count;
  }
}
"#,
    );
    assert!(text.contains("class Counter {"));
    assert!(text.contains("  private var count: Float = 0;"));
    assert!(text.contains("  public static final max = 10;"));
    assert!(text.contains("  public var name: String;"));
    assert!(text.contains("  public function new(name: String) {\n    this.name = name;\n  }"));
    assert!(text.contains("  public function increment(?by: Float): Float {"));
    assert!(text.contains("    this.count += by;"));
}

#[test]
fn test_class_without_constructor_gets_one() {
    let text = emitted("export class Empty {}");
    assert!(text.contains("class Empty {\n  public function new() {}\n}"));
}

#[test]
fn test_try_catch() {
    let text = emitted(
        r#"export function guard(): void {
  try {
    risky();
  } catch {
    recover();
  }
}
"#,
    );
    assert!(text.contains("} catch (_: Dynamic) {"));
}

#[test]
fn test_finally_abandons_file() {
    let reason = abandoned("export function f(): void {\n  try { a(); } catch (e) { b(); } finally { c(); }\n}\n");
    assert_eq!(reason.line, 2);
}

#[test]
fn test_async_and_await_abandon_file() {
    abandoned("export async function load(): Promise<void> {}");
    abandoned("export function load(p: any): any {\n  return (await p);\n}\n");
}

#[test]
fn test_foreign_imports_are_rewritten() {
    let source = r#"import express from "express";
import { readFileSync } from "fs";
import * as path from "path";
import type { Request } from "express";

export function main(req: Request): void {
  const server = express();
  const text = readFileSync(path.join("a", "b"));
}
"#;
    let program = program(&[("main.ts", source)]);
    let registry = collect_foreign_modules(&program).finish("app");

    let express = registry.get("express").expect("express is referenced");
    assert!(express.requires_default);
    assert!(express.members.is_empty());
    let fs = registry.get("fs").expect("fs is referenced");
    assert_eq!(fs.members.iter().collect::<Vec<_>>(), vec!["readFileSync"]);
    let path = registry.get("path").expect("path is referenced");
    assert_eq!(path.members.iter().collect::<Vec<_>>(), vec!["join"]);

    let TranslationResult::Emitted(file) = translate(&program, "main.ts") else {
        panic!("main.ts should translate");
    };
    assert!(file.text.contains("function main(req: Dynamic): Void {"));
    assert!(file.text.contains("final server = app.externs.Express.__default();"));
    assert!(file
        .text
        .contains("final text = app.externs.Fs.readFileSync(app.externs.Path.join(\"a\", \"b\"));"));
}

#[test]
fn test_type_only_foreign_import_needs_no_binding() {
    let program = program(&[(
        "main.ts",
        "import type { Options } from \"lodash\";\nexport function f(o: Options): void {}\n",
    )]);
    let registry = collect_foreign_modules(&program).finish("app");
    assert!(registry.get("lodash").is_none());
    assert!(translate(&program, "main.ts").is_emitted());
}

#[test]
fn test_project_imports_follow_renames() {
    let program = program(&[
        (
            "util.ts",
            r#"export function add(a: number, b: number): number {
  return a + b;
}
function helper(): number {
  return 1;
}
export { helper as assist };
"#,
        ),
        (
            "main.ts",
            r#"import { add as plus, assist } from "./util";
import * as util from "./util";

export const x = plus(1, 2);
export const y = util.add(3, assist());
"#,
        ),
    ]);

    let TranslationResult::Emitted(util) = translate(&program, "util.ts") else {
        panic!("util.ts should translate");
    };
    assert!(util.text.contains("final assist = helper;"));

    let TranslationResult::Emitted(main) = translate(&program, "main.ts") else {
        panic!("main.ts should translate");
    };
    assert!(main.text.starts_with("package app;\n\nimport app.Util.add as plus;\nimport app.Util.assist;\n\n"));
    assert!(main.text.contains("final x = plus(1, 2);"));
    assert!(main.text.contains("final y = app.Util.add(3, assist());"));
}

#[test]
fn test_unknown_project_member_abandons_file() {
    let program = program(&[
        ("util.ts", "export const one = 1;\n"),
        ("main.ts", "import { two } from \"./util\";\nexport const x = two;\n"),
    ]);
    let TranslationResult::Abandoned(reason) = translate(&program, "main.ts") else {
        panic!("main.ts should be abandoned");
    };
    assert_eq!(reason.line, 1);
}

#[test]
fn test_unresolved_relative_import_abandons_file() {
    let reason = abandoned("import { a } from \"./missing\";\nexport const b = a;\n");
    assert!(reason.detail.contains("./missing"));
}

#[test]
fn test_default_export_expression() {
    let text = emitted("export default 1 + 2;");
    assert!(text.contains("final __default = (1 + 2);"));
}

#[test]
fn test_translate_file_for_standalone_source() {
    let result = translate_file(
        std::path::Path::new("/tmp/standalone/hello.ts"),
        "export const greeting = \"hi\";\n",
        "demo",
    )
    .expect("standalone file loads");
    let file = result.file().expect("file translates");
    assert_eq!(file.text, "package demo;\n\nfinal greeting = \"hi\";\n");
}

#[test]
fn test_labels_sharing_default_body() {
    let text = emitted(
        r#"export function f(n: number): void {
  switch (n) {
    default:
    case 3:
      hit(n);
      break;
    case 1:
      one();
      break;
  }
}
"#,
    );
    let expected = r#"  switch (n) {
    case 1:
      one();
    default:
      hit(n);
  }"#;
    assert!(text.contains(expected), "unexpected switch:\n{}", text);
    assert!(!text.contains("case 3"));

    let text = emitted(
        r#"export function g(n: number): void {
  switch (n) {
    case 1:
    default:
      x();
  }
}
"#,
    );
    assert!(text.contains("  switch (n) {\n    default:\n      x();\n  }"), "unexpected switch:\n{}", text);
}

#[test]
fn test_continue_in_lowered_for_is_kept() {
    let text = emitted(
        r#"export function sum(xs: number[]): number {
  let total = 0;
  for (let i = 0; i < xs.length; i++) {
    if (xs[i] < 0) continue;
    total += xs[i];
  }
  return total;
}
"#,
    );
    assert!(text.contains("continue;"), "{}", text);
    assert!(text.contains("      total += xs[i];\n      i++;\n    }\n  }"), "{}", text);
}

#[test]
fn test_temporaries_avoid_source_names() {
    let text = emitted(
        r#"export function f(__tmp0: number): number {
  const { a } = source();
  return a + __tmp0;
}
"#,
    );
    assert!(text.contains("  var __tmp1 = source();\n  final a = __tmp1.a;"), "{}", text);
    assert!(text.contains("return (a + __tmp0);"));
    assert!(!text.contains("var __tmp0"));
}

#[test]
fn test_parameter_properties_follow_super_call() {
    let text = emitted(
        r#"export class Child extends Base {
  constructor(public x: number) {
    log(x);
    super(x);
    done();
  }
}
"#,
    );
    assert!(
        text.contains("    log(x);\n    super(x);\n    this.x = x;\n    done();\n  }"),
        "unexpected constructor:\n{}",
        text
    );
}

#[test]
fn test_class_export_alias_extends_local() {
    let text = emitted("class Local {}\nexport { Local as Alias };\n");
    assert!(text.contains("class Alias extends Local {}"), "{}", text);
}

#[test]
fn test_foreign_namespace_export_alias() {
    let text = emitted(
        "import * as pkg from \"pkg\";\nexport const y = pkg.z;\nexport { pkg as other };\n",
    );
    assert!(text.contains("final other = app.externs.Pkg;"), "{}", text);
    assert!(text.contains("final y = app.externs.Pkg.z;"));
}

#[test]
fn test_project_namespace_export_alias_abandons_file() {
    let program = program(&[
        ("util.ts", "export const one = 1;\n"),
        ("main.ts", "import * as util from \"./util\";\nexport { util as tools };\n"),
    ]);
    let TranslationResult::Abandoned(reason) = translate(&program, "main.ts") else {
        panic!("main.ts should be abandoned");
    };
    assert_eq!(reason.kind, "export_specifier");
    assert_eq!(reason.line, 2);
}

#[test]
fn test_side_effect_foreign_import_abandons_file() {
    let reason = abandoned("import \"reflect-metadata\";\nexport const a = 1;\n");
    assert_eq!(reason.kind, "import_statement");
    assert_eq!(reason.line, 1);
    assert!(reason.detail.contains("reflect-metadata"));
}
