use pretty_assertions::assert_eq;
use std::path::PathBuf;
use ts2hx_parser::{DeclKind, DefaultExport, ImportedName, Program, SourceUnit};

fn load(source: &str) -> Program {
    Program::from_sources(
        "/project",
        "",
        vec![(PathBuf::from("main.ts"), source.to_string())],
    )
    .expect("program should load")
}

fn main_unit(program: &Program) -> &SourceUnit {
    &program.units()[0]
}

#[test]
fn test_import_forms() {
    let program = load(
        r#"
import greet, { add, sub as minus, type Shape } from "fakepkg";
import * as NS from "./ns";
import type { Todo } from "./todo";
import "./side-effect";
"#,
    );
    let imports = &main_unit(&program).imports;
    assert_eq!(imports.len(), 4);

    assert_eq!(imports[0].specifier, "fakepkg");
    assert_eq!(imports[0].default_name.as_deref(), Some("greet"));
    assert_eq!(
        imports[0].named,
        vec![
            ImportedName {
                imported: "add".into(),
                local: None,
                type_only: false
            },
            ImportedName {
                imported: "sub".into(),
                local: Some("minus".into()),
                type_only: false
            },
            ImportedName {
                imported: "Shape".into(),
                local: None,
                type_only: true
            },
        ]
    );

    assert_eq!(imports[1].namespace.as_deref(), Some("NS"));
    assert!(imports[2].type_only);
    assert!(imports[3].is_side_effect_only());
    assert_eq!(imports[3].line, 5);
}

#[test]
fn test_export_forms() {
    let program = load(
        r#"
export const base = 1, other = 2;
export function inc(x: number): number { return x + base; }
class Foo {}
interface Shape { id: string }
export { Foo as RenamedFoo, Shape };
export type Role = "admin" | "user";
export { x as y } from "./reexport";
export * from "./all";
export * as utils from "./utils";
export default inc;
"#,
    );
    let exports = &main_unit(&program).exports;

    let named: Vec<(&str, &str, bool)> = exports
        .named
        .iter()
        .map(|e| (e.exported.as_str(), e.local.as_str(), e.type_only))
        .collect();
    assert_eq!(
        named,
        vec![
            ("base", "base", false),
            ("other", "other", false),
            ("inc", "inc", false),
            ("RenamedFoo", "Foo", false),
            ("Shape", "Shape", false),
            ("Role", "Role", true),
        ]
    );

    assert_eq!(exports.default, Some(DefaultExport::Local("inc".into())));
    assert_eq!(exports.wildcards, vec!["./all".to_string()]);
    assert_eq!(exports.re_exports.len(), 2);
    assert_eq!(exports.re_exports[0].imported, "x");
    assert_eq!(exports.re_exports[0].exported, "y");
    assert_eq!(exports.re_exports[1].imported, "*");
    assert_eq!(exports.re_exports[1].exported, "utils");

    assert_eq!(exports.declarations.get("Foo"), Some(&DeclKind::Class));
    assert_eq!(exports.declarations.get("Shape"), Some(&DeclKind::Interface));
    assert!(exports.is_public("base"));
    assert!(!exports.is_public("Foo"));
}

#[test]
fn test_default_export_expressions() {
    let program = load("export default function (name: string) { return name; }");
    assert_eq!(
        main_unit(&program).exports.default,
        Some(DefaultExport::Expression(DeclKind::Function))
    );

    let program = load("export default { answer: 42 };");
    assert_eq!(
        main_unit(&program).exports.default,
        Some(DefaultExport::Expression(DeclKind::Variable))
    );

    let program = load("const value = 1;\nexport { value as default };");
    assert_eq!(
        main_unit(&program).exports.default,
        Some(DefaultExport::Local("value".into()))
    );
}

#[test]
fn test_destructured_declarations_are_recorded() {
    let program = load("const { a, b: { c }, ...rest } = source;\nconst [x, , y] = list;");
    let declarations = &main_unit(&program).exports.declarations;
    let names: Vec<&str> = declarations.keys().map(String::as_str).collect();
    assert_eq!(names, vec!["a", "c", "rest", "x", "y"]);
}
