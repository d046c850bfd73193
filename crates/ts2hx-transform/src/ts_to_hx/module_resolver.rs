/*! Cross-file name resolution.
 *
 * An import names an export of another file, which may itself be a rename, a re-export or a wildcard
 * pass-through. Resolution follows that chain to the file and member that actually declare the value
 * (cycle-safe), so importers can reference the declaring Haxe module directly and re-exporting
 * modules never need to emit anything for pass-through exports.
 */

use super::context::{EmitContext, Rewrite};
use super::errors::Translated;
use std::collections::HashSet;
use tracing::debug;
use tree_sitter::Node;
use ts2hx_core::{sanitize_identifier, ForeignModuleDescriptor, ForeignRegistryBuilder, DEFAULT_MEMBER};
use ts2hx_parser::literal::decode_string_literal;
use ts2hx_parser::syntax::descendants;
use ts2hx_parser::{DeclKind, DefaultExport, ImportBinding, ModuleTarget, NodeExt, Program};

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ResolvedExport {
    /// A member declared (or aliased) in a project file.
    Project {
        unit: usize,
        member: String,
        kind: DeclKind,
    },
    /// `export * as ns from "./mod"`
    Namespace { unit: usize },
    /// A member of a foreign module; `None` is its default export.
    Foreign {
        specifier: String,
        member: Option<String>,
    },
    /// Declared in a `.d.ts` file, so it exists without a Haxe module.
    Ambient,
}

pub struct ModuleResolver;

impl ModuleResolver {
    /// Resolves `name` as exported by `unit`.
    pub fn resolve_export(program: &Program, unit: usize, name: &str) -> Option<ResolvedExport> {
        let mut visited = HashSet::new();
        Self::resolve_export_in(program, unit, name, &mut visited)
    }

    fn resolve_export_in(
        program: &Program,
        unit: usize,
        name: &str,
        visited: &mut HashSet<(usize, String)>,
    ) -> Option<ResolvedExport> {
        if !visited.insert((unit, name.to_string())) {
            return None;
        }
        let source = program.unit(unit);
        if !source.is_translatable() {
            return Some(ResolvedExport::Ambient);
        }
        let surface = &source.exports;

        if name == "default" {
            match &surface.default {
                Some(DefaultExport::Local(local)) => {
                    return Self::resolve_local(program, unit, local, visited)
                }
                Some(DefaultExport::Expression(kind)) => {
                    return Some(ResolvedExport::Project {
                        unit,
                        member: DEFAULT_MEMBER.to_string(),
                        kind: *kind,
                    })
                }
                None => {}
            }
        }

        if let Some(entry) = surface.named.iter().find(|e| e.exported == name) {
            if entry.is_renamed() {
                let kind = match Self::resolve_local(program, unit, &entry.local, visited) {
                    Some(ResolvedExport::Project { kind, .. }) => alias_kind(kind),
                    _ => DeclKind::Variable,
                };
                return Some(ResolvedExport::Project {
                    unit,
                    member: sanitize_identifier(name),
                    kind,
                });
            }
            return Self::resolve_local(program, unit, &entry.local, visited);
        }

        if let Some(re) = surface.re_exports.iter().find(|r| r.exported == name) {
            return match program.resolve(unit, &re.specifier) {
                ModuleTarget::Project(target) if re.imported == "*" => {
                    Some(ResolvedExport::Namespace { unit: target })
                }
                ModuleTarget::Project(target) => {
                    Self::resolve_export_in(program, target, &re.imported, visited)
                }
                ModuleTarget::External(specifier) if re.imported != "*" => {
                    Some(ResolvedExport::Foreign {
                        specifier,
                        member: (re.imported != "default").then(|| re.imported.clone()),
                    })
                }
                _ => None,
            };
        }

        if name != "default" {
            for specifier in &surface.wildcards {
                if let ModuleTarget::Project(target) = program.resolve(unit, specifier) {
                    if let Some(found) = Self::resolve_export_in(program, target, name, visited) {
                        return Some(found);
                    }
                }
            }
        }
        None
    }

    /// Resolves a name bound at the top level of `unit`, declared there or imported.
    fn resolve_local(
        program: &Program,
        unit: usize,
        local: &str,
        visited: &mut HashSet<(usize, String)>,
    ) -> Option<ResolvedExport> {
        let source = program.unit(unit);
        if let Some(kind) = source.exports.declarations.get(local) {
            return Some(ResolvedExport::Project {
                unit,
                member: sanitize_identifier(local),
                kind: *kind,
            });
        }

        for binding in &source.imports {
            let imported = if binding.default_name.as_deref() == Some(local) {
                Some("default".to_string())
            } else if binding.namespace.as_deref() == Some(local) {
                Some("*".to_string())
            } else {
                binding
                    .named
                    .iter()
                    .find(|n| n.local_name() == local)
                    .map(|n| n.imported.clone())
            };
            let Some(imported) = imported else {
                continue;
            };

            return match program.resolve(unit, &binding.specifier) {
                ModuleTarget::Project(target) if imported == "*" => {
                    Some(ResolvedExport::Namespace { unit: target })
                }
                ModuleTarget::Project(target) => {
                    Self::resolve_export_in(program, target, &imported, visited)
                }
                ModuleTarget::External(specifier) if imported != "*" => {
                    Some(ResolvedExport::Foreign {
                        specifier,
                        member: (imported != "default").then_some(imported),
                    })
                }
                _ => None,
            };
        }
        None
    }

    /// Registers rewrites for this file's imports and returns its Haxe `import` lines.
    pub fn resolve_imports<'a>(ctx: &mut EmitContext<'a>) -> Translated<Vec<String>> {
        let program = ctx.program;
        let unit = ctx.unit();
        let mut lines: Vec<String> = Vec::new();

        for binding in &unit.imports {
            match program.resolve(ctx.unit_index, &binding.specifier) {
                ModuleTarget::External(specifier) => {
                    Self::register_foreign(ctx, binding, &specifier)?
                }
                ModuleTarget::Unresolved(specifier) => {
                    return Err(ts2hx_core::Unsupported::new(
                        "import_statement",
                        binding.line,
                        binding.column,
                        format!("cannot resolve module \"{}\"", specifier),
                    ))
                }
                ModuleTarget::Project(target) => {
                    Self::register_project(ctx, binding, target, &mut lines)?
                }
            }
        }
        Ok(lines)
    }

    fn register_foreign(
        ctx: &mut EmitContext<'_>,
        binding: &ImportBinding,
        specifier: &str,
    ) -> Translated<()> {
        if binding.is_side_effect_only() && !binding.type_only {
            return Err(ts2hx_core::Unsupported::new(
                "import_statement",
                binding.line,
                binding.column,
                format!("side-effect import of \"{}\" has no Haxe require", specifier),
            ));
        }
        let registry = ctx.registry;
        let extern_path = |member: Option<&str>| {
            registry.member_path(specifier, member).ok_or_else(|| {
                ts2hx_core::Unsupported::new(
                    "import_statement",
                    binding.line,
                    binding.column,
                    format!("no extern binding for \"{}\"", specifier),
                )
            })
        };

        if let Some(local) = &binding.default_name {
            let rewrite = if binding.type_only {
                Rewrite::ForeignType
            } else {
                Rewrite::Foreign(extern_path(None)?)
            };
            ctx.add_rewrite(local.clone(), rewrite);
        }
        if let Some(alias) = &binding.namespace {
            let rewrite = match registry.address(specifier) {
                Some(address) if !binding.type_only => {
                    Rewrite::ForeignNamespace(address.qualified_name())
                }
                _ => Rewrite::ForeignType,
            };
            ctx.add_rewrite(alias.clone(), rewrite);
        }
        for name in &binding.named {
            let rewrite = if binding.type_only || name.type_only {
                Rewrite::ForeignType
            } else if name.imported == "default" {
                Rewrite::Foreign(extern_path(None)?)
            } else {
                Rewrite::Foreign(extern_path(Some(&name.imported))?)
            };
            ctx.add_rewrite(name.local_name().to_string(), rewrite);
        }
        Ok(())
    }

    fn register_project(
        ctx: &mut EmitContext<'_>,
        binding: &ImportBinding,
        target: usize,
        lines: &mut Vec<String>,
    ) -> Translated<()> {
        let program = ctx.program;
        if !program.unit(target).is_translatable() {
            if let Some(alias) = &binding.namespace {
                ctx.add_rewrite(alias.clone(), Rewrite::AmbientNamespace);
            }
            return Ok(());
        }

        if let Some(alias) = &binding.namespace {
            ctx.add_rewrite(alias.clone(), Rewrite::ProjectNamespace(target));
        }

        let mut wanted: Vec<(&str, &str)> = Vec::new();
        if let Some(local) = &binding.default_name {
            wanted.push(("default", local));
        }
        for name in &binding.named {
            wanted.push((name.imported.as_str(), name.local_name()));
        }

        for (imported, local) in wanted {
            let unknown = || {
                ts2hx_core::Unsupported::new(
                    "import_specifier",
                    binding.line,
                    binding.column,
                    format!("\"{}\" has no export named {}", binding.specifier, imported),
                )
            };
            match Self::resolve_export(program, target, imported).ok_or_else(unknown)? {
                ResolvedExport::Project { unit, member, .. } => {
                    let line = import_line(&program.unit(unit).address.member_path(&member), &member, local);
                    if !lines.contains(&line) {
                        lines.push(line);
                    }
                }
                ResolvedExport::Namespace { unit } => {
                    ctx.add_rewrite(local.to_string(), Rewrite::ProjectNamespace(unit));
                }
                ResolvedExport::Foreign { specifier, member } => {
                    let path = ctx
                        .registry
                        .member_path(&specifier, member.as_deref())
                        .ok_or_else(unknown)?;
                    ctx.add_rewrite(local.to_string(), Rewrite::Foreign(path));
                }
                ResolvedExport::Ambient => {
                    debug!(name = imported, "import resolves to a declaration file");
                }
            }
        }
        Ok(())
    }

    /// Haxe path for `alias.member` when `alias` is a namespace import; `None` otherwise.
    pub fn namespace_member<'a>(
        ctx: &EmitContext<'a>,
        alias: &str,
        member: &str,
        node: Node<'a>,
    ) -> Translated<Option<String>> {
        match ctx.rewrite(alias) {
            Some(Rewrite::ForeignNamespace(path)) => Ok(Some(format!(
                "{}.{}",
                path,
                ForeignModuleDescriptor::binding_name(member)
            ))),
            Some(Rewrite::ProjectNamespace(target)) => {
                match Self::resolve_export(ctx.program, *target, member) {
                    Some(ResolvedExport::Project { unit, member, .. }) => {
                        Ok(Some(ctx.program.unit(unit).address.member_path(&member)))
                    }
                    Some(ResolvedExport::Foreign { specifier, member }) => ctx
                        .registry
                        .member_path(&specifier, member.as_deref())
                        .map(Some)
                        .ok_or_else(|| ctx.unsupported(node, "foreign member without binding")),
                    _ => Err(ctx.unsupported(
                        node,
                        format!("namespace {} has no usable export {}", alias, member),
                    )),
                }
            }
            Some(Rewrite::AmbientNamespace) => {
                Err(ctx.unsupported(node, "member of a declaration-file namespace"))
            }
            _ => Ok(None),
        }
    }

    /// Kind of a top-level name of the current file, following imports.
    pub fn local_kind(ctx: &EmitContext<'_>, local: &str) -> Option<DeclKind> {
        let mut visited = HashSet::new();
        match Self::resolve_local(ctx.program, ctx.unit_index, local, &mut visited)? {
            ResolvedExport::Project { kind, .. } => Some(kind),
            _ => None,
        }
    }
}

fn alias_kind(kind: DeclKind) -> DeclKind {
    match kind {
        DeclKind::Class => DeclKind::Class,
        DeclKind::Interface | DeclKind::TypeAlias => DeclKind::TypeAlias,
        _ => DeclKind::Variable,
    }
}

fn import_line(path: &str, member: &str, local: &str) -> String {
    let local = sanitize_identifier(local);
    if local == member {
        format!("import {};", path)
    } else {
        format!("import {} as {};", path, local)
    }
}

/// Scans every translatable file for the foreign modules and members it references.
pub fn collect_foreign_modules(program: &Program) -> ForeignRegistryBuilder {
    let mut builder = ForeignRegistryBuilder::new();

    for (index, unit) in program.translatable_units() {
        for binding in &unit.imports {
            let ModuleTarget::External(specifier) = program.resolve(index, &binding.specifier)
            else {
                continue;
            };
            let uses_values = binding.default_name.is_some()
                || binding.namespace.is_some()
                || binding.named.iter().any(|n| !n.type_only);
            if binding.type_only || !uses_values {
                continue;
            }
            let descriptor = builder.descriptor(&specifier);
            if binding.default_name.is_some() {
                descriptor.require_default();
            }
            for name in binding.named.iter().filter(|n| !n.type_only) {
                if name.imported == "default" {
                    descriptor.require_default();
                } else {
                    descriptor.add_member(name.imported.clone());
                }
            }
            if let Some(alias) = &binding.namespace {
                for member in namespace_members(unit.root(), &unit.source, alias) {
                    descriptor.add_member(member);
                }
            }
        }

        for re in &unit.exports.re_exports {
            let ModuleTarget::External(specifier) = program.resolve(index, &re.specifier) else {
                continue;
            };
            if re.type_only || re.imported == "*" {
                continue;
            }
            let descriptor = builder.descriptor(&specifier);
            if re.imported == "default" {
                descriptor.require_default();
            } else {
                descriptor.add_member(re.imported.clone());
            }
        }
    }
    builder
}

/// Members accessed as `alias.member` or `alias["member"]` anywhere in a file.
fn namespace_members(root: Node<'_>, source: &str, alias: &str) -> Vec<String> {
    let mut members = Vec::new();
    for node in descendants(root) {
        let (object, property) = match node.kind() {
            "member_expression" => (node.field("object"), node.field("property")),
            "subscript_expression" => (node.field("object"), node.field("index")),
            _ => continue,
        };
        let (Some(object), Some(property)) = (object, property) else {
            continue;
        };
        if object.kind() != "identifier" || &source[object.byte_range()] != alias {
            continue;
        }
        let raw = &source[property.byte_range()];
        match property.kind() {
            "property_identifier" => members.push(raw.to_string()),
            "string" => members.push(decode_string_literal(raw)),
            _ => {}
        }
    }
    members
}
