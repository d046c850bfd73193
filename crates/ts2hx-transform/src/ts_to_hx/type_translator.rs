use super::context::{EmitContext, Rewrite};
use super::module_resolver::{ModuleResolver, ResolvedExport};
use tree_sitter::Node;
use ts2hx_core::is_haxe_identifier;
use ts2hx_parser::NodeExt;

const DYNAMIC: &str = "Dynamic";

/// Maps TypeScript type syntax onto Haxe types. Never fails: anything without a Haxe counterpart
/// widens to `Dynamic`.
pub struct TypeTranslator;

impl TypeTranslator {
    pub fn translate_opt<'a>(node: Option<Node<'a>>, ctx: &EmitContext<'a>) -> String {
        match node {
            Some(node) => Self::translate(node, ctx),
            None => DYNAMIC.to_string(),
        }
    }

    /// `: T` suffix for an optional annotation, empty when absent.
    pub fn annotation_suffix<'a>(node: Option<Node<'a>>, ctx: &EmitContext<'a>) -> String {
        node.map(|n| format!(": {}", Self::translate(n, ctx)))
            .unwrap_or_default()
    }

    pub fn translate<'a>(node: Node<'a>, ctx: &EmitContext<'a>) -> String {
        match node.kind() {
            "type_annotation" | "opting_type_annotation" | "omitting_type_annotation" => {
                Self::translate_opt(node.first_named(), ctx)
            }
            "type_predicate_annotation" => "Bool".to_string(),
            "asserts_annotation" => "Void".to_string(),
            "predefined_type" => Self::predefined(ctx.text(node)),
            "type_identifier" | "identifier" => Self::type_name(ctx.text(node), ctx, Vec::new()),
            "nested_type_identifier" => Self::qualified_name(node, ctx),
            "generic_type" => Self::generic(node, ctx),
            "array_type" => format!("Array<{}>", Self::translate_opt(node.first_named(), ctx)),
            "readonly_type" | "parenthesized_type" => Self::translate_opt(node.first_named(), ctx),
            "literal_type" => Self::literal(node, ctx),
            "union_type" => Self::union(node, ctx),
            "intersection_type" => {
                let parts: Vec<String> = node
                    .named_children_vec()
                    .into_iter()
                    .map(|part| Self::translate(part, ctx))
                    .collect();
                parts.join(" & ")
            }
            "function_type" => Self::function_type(node, ctx),
            "object_type" => Self::object_type(node, ctx),
            "this_type" | "tuple_type" | "conditional_type" | "lookup_type" | "index_type_query"
            | "type_query" | "infer_type" | "template_literal_type" | "constructor_type" => {
                DYNAMIC.to_string()
            }
            _ => DYNAMIC.to_string(),
        }
    }

    fn predefined(name: &str) -> String {
        match name {
            "number" => "Float",
            "string" => "String",
            "boolean" => "Bool",
            "void" => "Void",
            _ => DYNAMIC,
        }
        .to_string()
    }

    fn literal<'a>(node: Node<'a>, ctx: &EmitContext<'a>) -> String {
        match node.first_named().map(|n| n.kind()) {
            Some("string") => "String",
            Some("number") | Some("unary_expression") => "Float",
            Some("true") | Some("false") => "Bool",
            _ if matches!(ctx.text(node), "true" | "false") => "Bool",
            _ => DYNAMIC,
        }
        .to_string()
    }

    fn type_name<'a>(name: &str, ctx: &EmitContext<'a>, args: Vec<String>) -> String {
        if ctx.rewrite(name).is_some() {
            return DYNAMIC.to_string();
        }
        let with_args = |base: &str, args: &[String]| {
            if args.is_empty() {
                base.to_string()
            } else {
                format!("{}<{}>", base, args.join(", "))
            }
        };
        match name {
            "Array" | "ReadonlyArray" => {
                let elem = args.first().cloned().unwrap_or_else(|| DYNAMIC.to_string());
                format!("Array<{}>", elem)
            }
            "Record" => {
                let value = args.get(1).cloned().unwrap_or_else(|| DYNAMIC.to_string());
                format!("haxe.DynamicAccess<{}>", value)
            }
            "Promise" => with_args("js.lib.Promise", &args),
            "Error" => "js.lib.Error".to_string(),
            "String" => "String".to_string(),
            "Number" => "Float".to_string(),
            "Boolean" => "Bool".to_string(),
            "Object" | "Function" | "Partial" | "Required" | "Readonly" | "Pick" | "Omit" => {
                DYNAMIC.to_string()
            }
            _ => with_args(name, &args),
        }
    }

    fn qualified_name<'a>(node: Node<'a>, ctx: &EmitContext<'a>) -> String {
        let module = node.field("module");
        let name = node
            .field("name")
            .map(|n| ctx.text(n))
            .unwrap_or_default();

        if let Some(module) = module.filter(|m| m.kind() == "identifier") {
            match ctx.rewrite(ctx.text(module)) {
                Some(Rewrite::ProjectNamespace(target)) => {
                    return match ModuleResolver::resolve_export(ctx.program, *target, name) {
                        Some(ResolvedExport::Project { unit, member, .. }) => {
                            ctx.program.unit(unit).address.member_path(&member)
                        }
                        _ => DYNAMIC.to_string(),
                    };
                }
                Some(_) => return DYNAMIC.to_string(),
                None => {}
            }
        }
        if is_haxe_identifier(name) {
            name.to_string()
        } else {
            DYNAMIC.to_string()
        }
    }

    fn generic<'a>(node: Node<'a>, ctx: &EmitContext<'a>) -> String {
        let args = node
            .field("type_arguments")
            .map(|targs| Self::arguments(targs, ctx))
            .unwrap_or_default();
        match node.field("name") {
            Some(name) if name.kind() == "nested_type_identifier" => {
                let base = Self::qualified_name(name, ctx);
                if base == DYNAMIC || args.is_empty() {
                    base
                } else {
                    format!("{}<{}>", base, args.join(", "))
                }
            }
            Some(name) => Self::type_name(ctx.text(name), ctx, args),
            None => DYNAMIC.to_string(),
        }
    }

    pub fn arguments<'a>(node: Node<'a>, ctx: &EmitContext<'a>) -> Vec<String> {
        node.named_children_vec()
            .into_iter()
            .map(|arg| Self::translate(arg, ctx))
            .collect()
    }

    /// `<A, B>` for a `type_arguments` node, empty when there are none.
    pub fn arguments_suffix<'a>(node: Option<Node<'a>>, ctx: &EmitContext<'a>) -> String {
        match node.map(|n| Self::arguments(n, ctx)) {
            Some(args) if !args.is_empty() => format!("<{}>", args.join(", ")),
            _ => String::new(),
        }
    }

    /// `<T, U:Constraint>` for a declaration's type parameters. Defaults are dropped.
    pub fn parameters<'a>(node: Option<Node<'a>>, ctx: &EmitContext<'a>) -> String {
        let Some(node) = node else {
            return String::new();
        };
        let params: Vec<String> = node
            .named_children_vec()
            .into_iter()
            .filter(|p| p.kind() == "type_parameter")
            .filter_map(|p| {
                let name = ctx.text(p.field("name")?);
                Some(match p.field("constraint").and_then(|c| c.first_named()) {
                    Some(constraint) => format!("{}:{}", name, Self::translate(constraint, ctx)),
                    None => name.to_string(),
                })
            })
            .collect();
        if params.is_empty() {
            String::new()
        } else {
            format!("<{}>", params.join(", "))
        }
    }

    fn flatten_union<'a>(node: Node<'a>, out: &mut Vec<Node<'a>>) {
        for arm in node.named_children_vec() {
            if arm.kind() == "union_type" {
                Self::flatten_union(arm, out);
            } else {
                out.push(arm);
            }
        }
    }

    fn is_nullish<'a>(node: Node<'a>, ctx: &EmitContext<'a>) -> bool {
        matches!(node.kind(), "literal_type" | "predefined_type" | "type_identifier")
            && matches!(ctx.text(node), "null" | "undefined")
    }

    fn union<'a>(node: Node<'a>, ctx: &EmitContext<'a>) -> String {
        let mut arms = Vec::new();
        Self::flatten_union(node, &mut arms);

        let nullable = arms.iter().any(|arm| Self::is_nullish(*arm, ctx));
        let mut translated: Vec<String> = Vec::new();
        for arm in arms.iter().filter(|arm| !Self::is_nullish(**arm, ctx)) {
            let ty = Self::translate(*arm, ctx);
            if !translated.contains(&ty) {
                translated.push(ty);
            }
        }

        let base = match translated.len() {
            0 => return DYNAMIC.to_string(),
            1 => translated.remove(0),
            _ => {
                let mut iter = translated.into_iter().rev();
                let last = iter.next().unwrap_or_else(|| DYNAMIC.to_string());
                iter.fold(last, |acc, arm| {
                    format!("haxe.extern.EitherType<{}, {}>", arm, acc)
                })
            }
        };

        if nullable && base != DYNAMIC {
            format!("Null<{}>", base)
        } else {
            base
        }
    }

    fn function_type<'a>(node: Node<'a>, ctx: &EmitContext<'a>) -> String {
        let mut params = Vec::new();
        if let Some(formal) = node.field("parameters") {
            for param in formal.named_children_vec() {
                let Some(pattern) = param.field("pattern") else {
                    continue;
                };
                if pattern.kind() == "this" {
                    continue;
                }
                let ty = param.field("type");
                let rendered = if pattern.kind() == "rest_pattern" {
                    format!("haxe.Rest<{}>", Self::rest_element(ty, ctx))
                } else if param.kind() == "optional_parameter" {
                    format!("Null<{}>", Self::translate_opt(ty, ctx))
                } else {
                    Self::translate_opt(ty, ctx)
                };
                params.push(Self::wrap_function(rendered));
            }
        }

        let ret = Self::wrap_function(Self::translate_opt(node.field("return_type"), ctx));
        if params.is_empty() {
            format!("Void -> {}", ret)
        } else {
            format!("{} -> {}", params.join(" -> "), ret)
        }
    }

    fn wrap_function(ty: String) -> String {
        if ty.contains("->") && !ty.starts_with('(') {
            format!("({})", ty)
        } else {
            ty
        }
    }

    /// Element type of a rest parameter's array annotation.
    pub fn rest_element<'a>(annotation: Option<Node<'a>>, ctx: &EmitContext<'a>) -> String {
        let ty = annotation.and_then(|a| {
            if a.kind() == "type_annotation" {
                a.first_named()
            } else {
                Some(a)
            }
        });
        match ty {
            Some(t) if t.kind() == "array_type" => Self::translate_opt(t.first_named(), ctx),
            Some(t) if t.kind() == "generic_type" => {
                let is_array = t
                    .field("name")
                    .is_some_and(|n| matches!(ctx.text(n), "Array" | "ReadonlyArray"));
                match t.field("type_arguments").and_then(|a| a.first_named()) {
                    Some(elem) if is_array => Self::translate(elem, ctx),
                    _ => DYNAMIC.to_string(),
                }
            }
            _ => DYNAMIC.to_string(),
        }
    }

    fn object_type<'a>(node: Node<'a>, ctx: &EmitContext<'a>) -> String {
        if let Some(value) = Self::index_signature_only(node, ctx) {
            return format!("haxe.DynamicAccess<{}>", value);
        }
        match Self::members(node, ctx) {
            Some(members) if members.is_empty() => "{}".to_string(),
            Some(members) => format!("{{ {} }}", members.join(" ")),
            None => DYNAMIC.to_string(),
        }
    }

    fn index_signature_only<'a>(node: Node<'a>, ctx: &EmitContext<'a>) -> Option<String> {
        let members = node.named_children_vec();
        match members.as_slice() {
            [only] if only.kind() == "index_signature" => {
                let value = only
                    .field("type")
                    .or_else(|| only.named_children_vec().last().copied());
                Some(Self::translate_opt(value, ctx))
            }
            _ => None,
        }
    }

    /// Field lines for an object type or interface body; `None` when a member has no Haxe form.
    pub fn members<'a>(body: Node<'a>, ctx: &EmitContext<'a>) -> Option<Vec<String>> {
        let mut out = Vec::new();
        for member in body.named_children_vec() {
            let name_node = member.field("name");
            match member.kind() {
                "property_signature" => {
                    let name = Self::member_name(name_node?, ctx)?;
                    let optional = if member.has_token("?") { "@:optional " } else { "" };
                    let keyword = if member.has_token("readonly") { "final" } else { "var" };
                    let ty = Self::translate_opt(member.field("type"), ctx);
                    out.push(format!("{}{} {}: {};", optional, keyword, name, ty));
                }
                "method_signature" => {
                    if member.has_token("get") || member.has_token("set") {
                        return None;
                    }
                    let name = Self::member_name(name_node?, ctx)?;
                    let optional = if member.has_token("?") { "@:optional " } else { "" };
                    let params = Self::signature_params(member.field("parameters"), ctx);
                    let ret = Self::translate_opt(member.field("return_type"), ctx);
                    out.push(format!(
                        "{}function {}({}): {};",
                        optional,
                        name,
                        params.join(", "),
                        ret
                    ));
                }
                _ => return None,
            }
        }
        Some(out)
    }

    fn member_name<'a>(node: Node<'a>, ctx: &EmitContext<'a>) -> Option<String> {
        let name = ctx.text(node);
        match node.kind() {
            "property_identifier" if is_haxe_identifier(name) => Some(name.to_string()),
            "string" => {
                let decoded = ts2hx_parser::literal::decode_string_literal(name);
                is_haxe_identifier(&decoded).then_some(decoded)
            }
            _ => None,
        }
    }

    fn signature_params<'a>(node: Option<Node<'a>>, ctx: &EmitContext<'a>) -> Vec<String> {
        let Some(node) = node else {
            return Vec::new();
        };
        let mut out = Vec::new();
        for param in node.named_children_vec() {
            let Some(pattern) = param.field("pattern") else {
                continue;
            };
            let ty = param.field("type");
            match pattern.kind() {
                "identifier" => {
                    let name = ts2hx_core::sanitize_identifier(ctx.text(pattern));
                    let prefix = if param.kind() == "optional_parameter" { "?" } else { "" };
                    out.push(format!("{}{}: {}", prefix, name, Self::translate_opt(ty, ctx)));
                }
                "rest_pattern" => {
                    let name = pattern
                        .first_named()
                        .map(|n| ts2hx_core::sanitize_identifier(ctx.text(n)))
                        .unwrap_or_else(|| "rest".to_string());
                    out.push(format!("...{}: {}", name, Self::rest_element(ty, ctx)));
                }
                "this" => {}
                _ => {
                    let name = format!("arg{}", out.len());
                    out.push(format!("{}: {}", name, Self::translate_opt(ty, ctx)));
                }
            }
        }
        out
    }
}
