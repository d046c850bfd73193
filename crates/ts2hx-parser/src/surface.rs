/*! Import bindings and export surfaces of a parsed file.
 *
 * These are extracted once, at load time, from the top-level statements of each file. The translator
 * uses them to resolve names across files without re-walking other files' syntax trees.
 */

use crate::literal::decode_string_literal;
use crate::syntax::NodeExt;
use indexmap::IndexMap;
use serde::Serialize;
use tree_sitter::Node;

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ImportedName {
    pub imported: String,
    pub local: Option<String>,
    pub type_only: bool,
}

impl ImportedName {
    pub fn local_name(&self) -> &str {
        self.local.as_deref().unwrap_or(&self.imported)
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ImportBinding {
    pub specifier: String,
    pub default_name: Option<String>,
    pub namespace: Option<String>,
    pub named: Vec<ImportedName>,
    /// `import type ...`
    pub type_only: bool,
    /// Position of the import statement, 1-based.
    pub line: usize,
    pub column: usize,
}

impl ImportBinding {
    pub fn is_side_effect_only(&self) -> bool {
        self.default_name.is_none() && self.namespace.is_none() && self.named.is_empty()
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum DeclKind {
    Class,
    Interface,
    TypeAlias,
    Enum,
    Function,
    Variable,
}

impl DeclKind {
    /// Declarations that only exist at the type level.
    pub fn is_type_only(&self) -> bool {
        matches!(self, DeclKind::Interface | DeclKind::TypeAlias)
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ExportEntry {
    pub exported: String,
    pub local: String,
    pub type_only: bool,
}

impl ExportEntry {
    pub fn is_renamed(&self) -> bool {
        self.exported != self.local
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub enum DefaultExport {
    /// `export default name`, `export { name as default }`, or a named default declaration.
    Local(String),
    /// `export default <expression>` or an anonymous default function.
    Expression(DeclKind),
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ReExport {
    pub specifier: String,
    /// `*` for `export * as ns from`.
    pub imported: String,
    pub exported: String,
    pub type_only: bool,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct ExportSurface {
    pub named: Vec<ExportEntry>,
    pub default: Option<DefaultExport>,
    pub re_exports: Vec<ReExport>,
    pub wildcards: Vec<String>,
    /// Every top-level declaration of the file, exported or not.
    pub declarations: IndexMap<String, DeclKind>,
}

impl ExportSurface {
    /// Whether a top-level declaration is visible to other modules under its own name.
    pub fn is_public(&self, local: &str) -> bool {
        self.named
            .iter()
            .any(|entry| entry.local == local && entry.exported == local)
            || self.default == Some(DefaultExport::Local(local.to_string()))
    }
}

pub fn extract_surface(root: Node<'_>, source: &str) -> (Vec<ImportBinding>, ExportSurface) {
    let mut imports = Vec::new();
    let mut surface = ExportSurface::default();

    for stmt in root.named_children_vec() {
        match stmt.kind() {
            "import_statement" => {
                if let Some(binding) = import_binding(stmt, source) {
                    imports.push(binding);
                }
            }
            "export_statement" => export_statement(stmt, source, &mut surface),
            _ => {
                record_declaration(stmt, source, &mut surface);
            }
        }
    }

    (imports, surface)
}

fn text<'s>(node: Node<'_>, source: &'s str) -> &'s str {
    &source[node.byte_range()]
}

fn import_binding(stmt: Node<'_>, source: &str) -> Option<ImportBinding> {
    let specifier = decode_string_literal(text(stmt.field("source")?, source));
    let (line, column) = stmt.line_column();
    let mut binding = ImportBinding {
        specifier,
        default_name: None,
        namespace: None,
        named: Vec::new(),
        type_only: stmt.has_token("type"),
        line,
        column,
    };

    let Some(clause) = stmt
        .named_children_vec()
        .into_iter()
        .find(|child| child.kind() == "import_clause")
    else {
        return Some(binding);
    };

    for part in clause.named_children_vec() {
        match part.kind() {
            "identifier" => binding.default_name = Some(text(part, source).to_string()),
            "namespace_import" => {
                binding.namespace = part
                    .named_children_vec()
                    .into_iter()
                    .find(|n| n.kind() == "identifier")
                    .map(|n| text(n, source).to_string());
            }
            "named_imports" => {
                for spec in part.named_children_vec() {
                    if spec.kind() != "import_specifier" {
                        continue;
                    }
                    let Some(name) = spec.field("name") else {
                        continue;
                    };
                    binding.named.push(ImportedName {
                        imported: module_export_name(name, source),
                        local: spec.field("alias").map(|a| text(a, source).to_string()),
                        type_only: spec.has_token("type") || spec.has_token("typeof"),
                    });
                }
            }
            _ => {}
        }
    }
    Some(binding)
}

fn module_export_name(node: Node<'_>, source: &str) -> String {
    if node.kind() == "string" {
        decode_string_literal(text(node, source))
    } else {
        text(node, source).to_string()
    }
}

fn export_statement(stmt: Node<'_>, source: &str, surface: &mut ExportSurface) {
    let is_default = stmt.has_token("default");
    let type_only = stmt.has_token("type");
    let from = stmt
        .field("source")
        .map(|s| decode_string_literal(text(s, source)));

    if let Some(declaration) = stmt.field("declaration") {
        let names = record_declaration(declaration, source, surface);
        if is_default {
            if let Some((name, _)) = names.first() {
                surface.default = Some(DefaultExport::Local(name.clone()));
            }
        } else {
            for (name, kind) in names {
                surface.named.push(ExportEntry {
                    exported: name.clone(),
                    local: name,
                    type_only: kind.is_type_only(),
                });
            }
        }
        return;
    }

    if is_default {
        if let Some(value) = stmt.field("value") {
            surface.default = Some(match value.kind() {
                "identifier" => DefaultExport::Local(text(value, source).to_string()),
                "function_expression" | "function" | "arrow_function" => {
                    DefaultExport::Expression(DeclKind::Function)
                }
                "class" => DefaultExport::Expression(DeclKind::Class),
                _ => DefaultExport::Expression(DeclKind::Variable),
            });
        }
        return;
    }

    let children = stmt.named_children_vec();
    if let Some(clause) = children.iter().find(|c| c.kind() == "export_clause") {
        for spec in clause.named_children_vec() {
            if spec.kind() != "export_specifier" {
                continue;
            }
            let Some(name) = spec.field("name") else {
                continue;
            };
            let local = module_export_name(name, source);
            let exported = spec
                .field("alias")
                .map(|alias| module_export_name(alias, source))
                .unwrap_or_else(|| local.clone());
            let entry_type_only = type_only || spec.has_token("type");

            match &from {
                Some(specifier) => surface.re_exports.push(ReExport {
                    specifier: specifier.clone(),
                    imported: local,
                    exported,
                    type_only: entry_type_only,
                }),
                None if exported == "default" => {
                    surface.default = Some(DefaultExport::Local(local));
                }
                None => surface.named.push(ExportEntry {
                    exported,
                    local,
                    type_only: entry_type_only,
                }),
            }
        }
        return;
    }

    if let Some(specifier) = from {
        match children.iter().find(|c| c.kind() == "namespace_export") {
            Some(ns) => {
                let exported = ns
                    .named_children_vec()
                    .into_iter()
                    .next()
                    .map(|n| module_export_name(n, source))
                    .unwrap_or_default();
                surface.re_exports.push(ReExport {
                    specifier,
                    imported: "*".to_string(),
                    exported,
                    type_only,
                });
            }
            None if stmt.has_token("*") => surface.wildcards.push(specifier),
            None => {}
        }
    }
}

/// Records the names a top-level declaration introduces and returns them.
fn record_declaration(
    node: Node<'_>,
    source: &str,
    surface: &mut ExportSurface,
) -> Vec<(String, DeclKind)> {
    let kind = match node.kind() {
        "class_declaration" | "abstract_class_declaration" => DeclKind::Class,
        "interface_declaration" => DeclKind::Interface,
        "type_alias_declaration" => DeclKind::TypeAlias,
        "enum_declaration" => DeclKind::Enum,
        "function_declaration" | "generator_function_declaration" | "function_signature" => {
            DeclKind::Function
        }
        "lexical_declaration" | "variable_declaration" => {
            let mut names = Vec::new();
            for declarator in node.named_children_vec() {
                if declarator.kind() != "variable_declarator" {
                    continue;
                }
                if let Some(name) = declarator.field("name") {
                    collect_bound_names(name, source, &mut names);
                }
            }
            let names: Vec<(String, DeclKind)> =
                names.into_iter().map(|n| (n, DeclKind::Variable)).collect();
            for (name, kind) in &names {
                surface.declarations.insert(name.clone(), *kind);
            }
            return names;
        }
        _ => return Vec::new(),
    };

    match node.field("name") {
        Some(name) => {
            let name = text(name, source).to_string();
            surface.declarations.insert(name.clone(), kind);
            vec![(name, kind)]
        }
        None => Vec::new(),
    }
}

/// Identifiers bound by a binding pattern.
pub fn collect_bound_names(pattern: Node<'_>, source: &str, out: &mut Vec<String>) {
    match pattern.kind() {
        "identifier" | "shorthand_property_identifier_pattern" => {
            out.push(text(pattern, source).to_string())
        }
        "pair_pattern" => {
            if let Some(value) = pattern.field("value") {
                collect_bound_names(value, source, out);
            }
        }
        "assignment_pattern" | "object_assignment_pattern" => {
            if let Some(left) = pattern.field("left") {
                collect_bound_names(left, source, out);
            }
        }
        "object_pattern" | "array_pattern" | "rest_pattern" => {
            for child in pattern.named_children_vec() {
                collect_bound_names(child, source, out);
            }
        }
        _ => {}
    }
}
