use super::context::{EmitContext, JumpTarget, Rewrite};
use super::destructuring::{BindingKind, Destructuring};
use super::errors::Translated;
use super::expression_translator::ExpressionTranslator;
use super::module_resolver::ModuleResolver;
use super::statement_translator::StatementTranslator;
use super::type_translator::TypeTranslator;
use std::collections::HashSet;
use tree_sitter::Node;
use ts2hx_core::{
    is_haxe_identifier, quote_string, sanitize_identifier, to_haxe_module_name, DEFAULT_MEMBER,
};
use ts2hx_parser::literal::decode_string_literal;
use ts2hx_parser::{DeclKind, NodeExt};

/// Parameters of one function, lowered to Haxe.
#[derive(Debug, Default)]
struct Parameters {
    list: Vec<String>,
    /// Statements that run before the body: defaults and destructuring.
    prelude: Vec<String>,
    /// Constructor parameter properties: `(field declaration, assignment)`.
    properties: Vec<(String, String)>,
}

/// What a function body is rendered as.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum FunctionRole {
    Plain,
    Constructor,
}

pub struct DeclarationTranslator;

impl DeclarationTranslator {
    /// Haxe items for one top-level statement. Skipped forms produce nothing.
    pub fn top_level<'a>(node: Node<'a>, ctx: &mut EmitContext<'a>) -> Translated<Vec<String>> {
        match node.kind() {
            "import_statement" => {
                if node.named_children_vec().iter().any(|c| c.kind() == "import_require_clause") {
                    return Err(ctx.unsupported(node, "import = require()"));
                }
                Ok(Vec::new())
            }
            "import_alias" => Err(ctx.unsupported(node, "import alias")),
            "export_statement" => Self::export_statement(node, ctx),
            "ambient_declaration" | "function_signature" | "empty_statement" => Ok(Vec::new()),
            "expression_statement" => Err(ctx.unsupported(node, "top-level expression statement")),
            "module" | "internal_module" => Err(ctx.unsupported(node, "namespace declaration")),
            _ => Self::declaration(node, false, ctx),
        }
    }

    fn export_statement<'a>(node: Node<'a>, ctx: &mut EmitContext<'a>) -> Translated<Vec<String>> {
        if node.has_token("=") {
            return Err(ctx.unsupported(node, "export ="));
        }
        if node.has_token("as") && node.has_token("namespace") {
            return Err(ctx.unsupported(node, "export as namespace"));
        }
        let is_default = node.has_token("default");

        if let Some(declaration) = node.field("declaration") {
            if is_default
                && declaration.kind() == "function_declaration"
                && declaration.field("name").is_none()
            {
                return Ok(vec![Self::function_declaration(declaration, DEFAULT_MEMBER, true, ctx)?]);
            }
            return Self::declaration(declaration, true, ctx);
        }

        if is_default {
            let Some(value) = node.field("value") else {
                return Ok(Vec::new());
            };
            return match value.kind() {
                "identifier" => Ok(Vec::new()),
                "function_expression" | "function" => {
                    Ok(vec![Self::function_declaration(value, DEFAULT_MEMBER, true, ctx)?])
                }
                "class" => Err(ctx.unsupported(value, "anonymous default class")),
                _ => {
                    let expr = ExpressionTranslator::translate(value, ctx)?;
                    Ok(vec![format!("final {} = {};", DEFAULT_MEMBER, expr)])
                }
            };
        }

        if node
            .named_children_vec()
            .iter()
            .any(|c| matches!(c.kind(), "import_alias" | "internal_module"))
        {
            return Err(ctx.unsupported(node, "exported namespace or import alias"));
        }
        // Export lists and re-exports only move names; aliases are rendered once per file.
        Ok(Vec::new())
    }

    fn declaration<'a>(
        node: Node<'a>,
        exported: bool,
        ctx: &mut EmitContext<'a>,
    ) -> Translated<Vec<String>> {
        let name = node.field("name").map(|n| ctx.text(n)).unwrap_or_default();
        let is_public = exported || ctx.unit().exports.is_public(name);

        match node.kind() {
            "function_declaration" => Ok(vec![Self::function_declaration(node, name, is_public, ctx)?]),
            "generator_function_declaration" => Err(ctx.unsupported(node, "generator function")),
            "class_declaration" => Ok(vec![Self::class(node, is_public, ctx)?]),
            "abstract_class_declaration" => Err(ctx.unsupported(node, "abstract class")),
            "interface_declaration" => Ok(vec![Self::interface(node, is_public, ctx)?]),
            "type_alias_declaration" => Ok(vec![Self::type_alias(node, is_public, ctx)?]),
            "enum_declaration" => Ok(vec![Self::enumeration(node, is_public, ctx)?]),
            "lexical_declaration" | "variable_declaration" => Ok(vec![Self::variables(node, exported, ctx)?]),
            "ambient_declaration" | "function_signature" => Ok(Vec::new()),
            "module" | "internal_module" => Err(ctx.unsupported(node, "namespace declaration")),
            kind => Err(ctx.unsupported(node, format!("top-level {}", kind))),
        }
    }

    /// A function declared inside a body.
    pub fn local_function<'a>(node: Node<'a>, ctx: &mut EmitContext<'a>) -> Translated<String> {
        let name = node.field("name").map(|n| ctx.text(n)).unwrap_or_default();
        Self::check_function_flavor(node, ctx)?;
        let signature = format!(
            "function {}{}",
            sanitize_identifier(name),
            TypeTranslator::parameters(node.field("type_parameters"), ctx)
        );
        Ok(Self::function_like(&signature, node, FunctionRole::Plain, ctx)?.0)
    }

    /// An arrow function, function expression or object method as a Haxe function expression.
    pub fn function_expression<'a>(node: Node<'a>, ctx: &mut EmitContext<'a>) -> Translated<String> {
        Self::check_function_flavor(node, ctx)?;
        if node.kind() == "method_definition" && (node.has_token("get") || node.has_token("set")) {
            return Err(ctx.unsupported(node, "accessor in object literal"));
        }
        Ok(Self::function_like("function", node, FunctionRole::Plain, ctx)?.0)
    }

    fn function_declaration<'a>(
        node: Node<'a>,
        name: &str,
        public: bool,
        ctx: &mut EmitContext<'a>,
    ) -> Translated<String> {
        Self::check_function_flavor(node, ctx)?;
        let signature = format!(
            "{}function {}{}",
            visibility_prefix(public),
            sanitize_identifier(name),
            TypeTranslator::parameters(node.field("type_parameters"), ctx)
        );
        Ok(Self::function_like(&signature, node, FunctionRole::Plain, ctx)?.0)
    }

    fn check_function_flavor<'a>(node: Node<'a>, ctx: &EmitContext<'a>) -> Translated<()> {
        if node.has_token("async") {
            return Err(ctx.unsupported(node, "async function"));
        }
        if node.has_token("*") {
            return Err(ctx.unsupported(node, "generator function"));
        }
        Ok(())
    }

    /// Renders `signature(params): R` with a body.
    ///
    /// For a constructor, parameter properties come back as field declarations and their
    /// assignments run right after any leading `super(...)` call.
    fn function_like<'a>(
        signature: &str,
        node: Node<'a>,
        role: FunctionRole,
        ctx: &mut EmitContext<'a>,
    ) -> Translated<(String, Vec<String>)> {
        ctx.push_scope();
        ctx.push_jump(JumpTarget::Function);
        let result = Self::render_function(signature, node, role, ctx);
        ctx.pop_jump();
        ctx.pop_scope();
        result
    }

    fn render_function<'a>(
        signature: &str,
        node: Node<'a>,
        role: FunctionRole,
        ctx: &mut EmitContext<'a>,
    ) -> Translated<(String, Vec<String>)> {
        let params = match node.field("parameter") {
            Some(single) => {
                ctx.bind_local(ctx.text(single));
                Parameters {
                    list: vec![sanitize_identifier(ctx.text(single))],
                    ..Parameters::default()
                }
            }
            None => Self::parameters(node.field("parameters"), ctx)?,
        };
        let ret = match role {
            FunctionRole::Constructor => String::new(),
            FunctionRole::Plain => TypeTranslator::annotation_suffix(node.field("return_type"), ctx),
        };
        let header = format!("{}({}){}", signature, params.list.join(", "), ret);
        let (fields, injected): (Vec<String>, Vec<String>) = match role {
            FunctionRole::Constructor => params.properties.iter().cloned().unzip(),
            FunctionRole::Plain => (Vec::new(), Vec::new()),
        };

        let Some(body) = node.field("body") else {
            return Err(ctx.unsupported(node, "function without a body"));
        };

        if body.kind() != "statement_block" {
            let value = ExpressionTranslator::translate(body, ctx)?;
            if params.prelude.is_empty() {
                return Ok((format!("{} return {}", header, value), fields));
            }
            let mut out = ctx.writer();
            out.write_block(&header, |w| -> Translated<()> {
                for line in &params.prelude {
                    w.line(line);
                }
                w.line(format!("return {};", value));
                Ok(())
            })?;
            return Ok((out.finish(), fields));
        }

        let statements = body.named_children_vec();
        if statements.is_empty() && params.prelude.is_empty() && injected.is_empty() {
            return Ok((format!("{} {{}}", header), fields));
        }

        let mut out = ctx.writer();
        out.write_block(&header, |w| -> Translated<()> {
            for line in &params.prelude {
                w.line(line);
            }
            // Parameter properties are assigned right after `super(...)`, or first without one.
            let inject_at = match role {
                FunctionRole::Constructor => Some(
                    statements
                        .iter()
                        .position(|statement| is_super_call(*statement))
                        .map_or(0, |index| index + 1),
                ),
                FunctionRole::Plain => None,
            };
            for (index, statement) in statements.iter().enumerate() {
                if inject_at == Some(index) {
                    for line in &injected {
                        w.line(line);
                    }
                }
                StatementTranslator::translate(*statement, ctx, w)?;
            }
            if inject_at == Some(statements.len()) {
                for line in &injected {
                    w.line(line);
                }
            }
            Ok(())
        })?;
        Ok((out.finish(), fields))
    }

    fn parameters<'a>(formal: Option<Node<'a>>, ctx: &mut EmitContext<'a>) -> Translated<Parameters> {
        let mut params = Parameters::default();
        let Some(formal) = formal else {
            return Ok(params);
        };

        for param in formal.named_children_vec() {
            if param.kind() == "decorator" || param.has_token("decorator") {
                return Err(ctx.unsupported(param, "parameter decorator"));
            }
            let Some(pattern) = param.field("pattern") else {
                return Err(ctx.unsupported(param, "parameter"));
            };
            let annotation = param.field("type");
            let ty = TypeTranslator::annotation_suffix(annotation, ctx);
            let default = param.field("value");
            let optional = param.kind() == "optional_parameter" || default.is_some();
            let marker = if optional { "?" } else { "" };

            match pattern.kind() {
                "this" => continue,
                "identifier" => {
                    let raw = ctx.text(pattern);
                    let name = sanitize_identifier(raw);
                    ctx.bind_local(raw);
                    params.list.push(format!("{}{}{}", marker, name, ty));
                    if let Some(default) = default {
                        let value = ExpressionTranslator::translate(default, ctx)?;
                        params.prelude.push(format!("if ({} == null) {} = {};", name, name, value));
                    }
                    if let Some(access) = parameter_property_access(param, ctx) {
                        let keyword = if param.has_token("readonly") { "final" } else { "var" };
                        let field_ty = if ty.is_empty() { ": Dynamic".to_string() } else { ty.clone() };
                        params.properties.push((
                            format!("{} {} {}{};", access, keyword, name, field_ty),
                            format!("this.{} = {};", name, name),
                        ));
                    }
                }
                "rest_pattern" => {
                    let Some(target) = pattern.first_named().filter(|t| t.kind() == "identifier") else {
                        return Err(ctx.unsupported(pattern, "destructured rest parameter"));
                    };
                    let raw = ctx.text(target);
                    ctx.bind_local(raw);
                    params.list.push(format!(
                        "...{}: {}",
                        sanitize_identifier(raw),
                        TypeTranslator::rest_element(annotation, ctx)
                    ));
                }
                "object_pattern" | "array_pattern" => {
                    let temp = ctx.fresh_temp();
                    params.list.push(format!("{}{}{}", marker, temp, ty));
                    if let Some(default) = default {
                        let value = ExpressionTranslator::translate(default, ctx)?;
                        params.prelude.push(format!("if ({} == null) {} = {};", temp, temp, value));
                    }
                    params
                        .prelude
                        .extend(Destructuring::lower_from(pattern, &temp, BindingKind::Var, ctx)?);
                }
                _ => return Err(ctx.unsupported(pattern, "parameter pattern")),
            }
        }
        Ok(params)
    }

    fn class<'a>(node: Node<'a>, public: bool, ctx: &mut EmitContext<'a>) -> Translated<String> {
        if node.has_token("decorator") {
            return Err(ctx.unsupported(node, "class decorator"));
        }
        let Some(name_node) = node.field("name") else {
            return Err(ctx.unsupported(node, "class without a name"));
        };
        let name = ctx.text(name_node);
        let type_params = TypeTranslator::parameters(node.field("type_parameters"), ctx);

        let mut header = format!("{}class {}{}", visibility_prefix(public), name, type_params);
        let heritage = node
            .named_children_vec()
            .into_iter()
            .find(|c| c.kind() == "class_heritage");
        let mut has_super = false;
        if let Some(heritage) = heritage {
            for clause in heritage.named_children_vec() {
                if clause.kind() != "extends_clause" {
                    continue;
                }
                let base = Self::base_class(clause, ctx)?;
                header.push_str(&format!(" extends {}", base));
                has_super = true;
            }
        }

        let Some(body) = node.field("body") else {
            return Err(ctx.unsupported(node, "class without a body"));
        };
        let members = body.named_children_vec();

        let mut fields: Vec<String> = Vec::new();
        let mut rendered: Vec<String> = Vec::new();
        let mut has_constructor = false;

        for member in members {
            match member.kind() {
                "public_field_definition" | "field_definition" => {
                    fields.push(Self::class_field(member, ctx)?);
                }
                "method_definition" => {
                    let is_constructor = member
                        .field("name")
                        .is_some_and(|n| ctx.text(n) == "constructor");
                    if is_constructor {
                        has_constructor = true;
                        let (field_lines, text) = Self::constructor(member, ctx)?;
                        fields.extend(field_lines);
                        rendered.push(text);
                    } else {
                        rendered.push(Self::method(member, ctx)?);
                    }
                }
                "method_signature" | "function_signature" => {}
                "abstract_method_signature" => {
                    return Err(ctx.unsupported(member, "abstract method"));
                }
                "index_signature" => return Err(ctx.unsupported(member, "index signature")),
                "class_static_block" => return Err(ctx.unsupported(member, "static block")),
                "decorator" => return Err(ctx.unsupported(member, "decorator")),
                kind => return Err(ctx.unsupported(member, format!("class member {}", kind))),
            }
        }

        if !has_constructor && !has_super {
            rendered.insert(0, "public function new() {}".to_string());
        }

        let mut out = ctx.writer();
        out.write_block(&header, |w| -> Translated<()> {
            for field in &fields {
                w.line(field);
            }
            for (index, text) in rendered.iter().enumerate() {
                if index > 0 || !fields.is_empty() {
                    w.blank();
                }
                w.line(text);
            }
            Ok(())
        })?;
        Ok(out.finish())
    }

    fn base_class<'a>(clause: Node<'a>, ctx: &mut EmitContext<'a>) -> Translated<String> {
        let Some(value) = clause.field("value") else {
            return Err(ctx.unsupported(clause, "extends without a class"));
        };
        let type_args = TypeTranslator::arguments_suffix(clause.field("type_arguments"), ctx);
        let base = match value.kind() {
            "identifier" => {
                let name = ctx.text(value);
                match ctx.rewrite(name) {
                    None => name.to_string(),
                    Some(Rewrite::ProjectNamespace(_)) | Some(Rewrite::AmbientNamespace) => {
                        return Err(ctx.unsupported(value, "namespace used as a base class"))
                    }
                    Some(_) => return Err(ctx.unsupported(value, "extending a foreign class")),
                }
            }
            "member_expression" => {
                let (Some(object), Some(property)) = (value.field("object"), value.field("property"))
                else {
                    return Err(ctx.unsupported(value, "base class"));
                };
                match ModuleResolver::namespace_member(ctx, ctx.text(object), ctx.text(property), value)? {
                    Some(path) if !matches!(ctx.rewrite(ctx.text(object)), Some(Rewrite::ForeignNamespace(_))) => {
                        path
                    }
                    _ => return Err(ctx.unsupported(value, "base class expression")),
                }
            }
            _ => return Err(ctx.unsupported(value, "base class expression")),
        };
        Ok(format!("{}{}", base, type_args))
    }

    fn member_visibility<'a>(member: Node<'a>, ctx: &EmitContext<'a>) -> &'static str {
        let restricted = member
            .named_children_vec()
            .into_iter()
            .any(|c| c.kind() == "accessibility_modifier" && ctx.text(c) != "public");
        if restricted {
            "private"
        } else {
            "public"
        }
    }

    fn member_name<'a>(member: Node<'a>, ctx: &EmitContext<'a>) -> Translated<String> {
        let Some(name) = member.field("name") else {
            return Err(ctx.unsupported(member, "member without a name"));
        };
        match name.kind() {
            "property_identifier" => Ok(sanitize_identifier(ctx.text(name))),
            "string" => {
                let decoded = decode_string_literal(ctx.text(name));
                if is_haxe_identifier(&decoded) {
                    Ok(decoded)
                } else {
                    Err(ctx.unsupported(name, "member name is not an identifier"))
                }
            }
            "private_property_identifier" => Err(ctx.unsupported(name, "private name")),
            "computed_property_name" => Err(ctx.unsupported(name, "computed member name")),
            _ => Err(ctx.unsupported(name, "member name")),
        }
    }

    fn class_field<'a>(member: Node<'a>, ctx: &mut EmitContext<'a>) -> Translated<String> {
        if member.has_token("decorator") {
            return Err(ctx.unsupported(member, "field decorator"));
        }
        if member.has_token("abstract") {
            return Err(ctx.unsupported(member, "abstract field"));
        }
        let name = Self::member_name(member, ctx)?;
        let visibility = Self::member_visibility(member, ctx);
        let is_static = if member.has_token("static") { "static " } else { "" };
        let keyword = if member.has_token("readonly") { "final" } else { "var" };

        let annotation = member.field("type");
        let value = member.field("value");
        let ty = match (annotation, value) {
            (Some(annotation), _) if member.has_token("?") => {
                format!(": Null<{}>", TypeTranslator::translate(annotation, ctx))
            }
            (Some(annotation), _) => format!(": {}", TypeTranslator::translate(annotation, ctx)),
            (None, None) => ": Dynamic".to_string(),
            (None, Some(_)) => String::new(),
        };
        let init = match value {
            Some(value) => format!(" = {}", ExpressionTranslator::translate(value, ctx)?),
            None => String::new(),
        };
        Ok(format!("{} {}{} {}{}{};", visibility, is_static, keyword, name, ty, init))
    }

    fn method<'a>(member: Node<'a>, ctx: &mut EmitContext<'a>) -> Translated<String> {
        if member.has_token("get") || member.has_token("set") {
            return Err(ctx.unsupported(member, "accessor"));
        }
        if member.has_token("decorator") {
            return Err(ctx.unsupported(member, "method decorator"));
        }
        Self::check_function_flavor(member, ctx)?;
        let name = Self::member_name(member, ctx)?;
        let signature = format!(
            "{} {}function {}{}",
            Self::member_visibility(member, ctx),
            if member.has_token("static") { "static " } else { "" },
            name,
            TypeTranslator::parameters(member.field("type_parameters"), ctx)
        );
        Ok(Self::function_like(&signature, member, FunctionRole::Plain, ctx)?.0)
    }

    /// The constructor plus the fields its parameter properties declare.
    fn constructor<'a>(
        member: Node<'a>,
        ctx: &mut EmitContext<'a>,
    ) -> Translated<(Vec<String>, String)> {
        let (text, fields) =
            Self::function_like("public function new", member, FunctionRole::Constructor, ctx)?;
        Ok((fields, text))
    }

    fn interface<'a>(node: Node<'a>, public: bool, ctx: &mut EmitContext<'a>) -> Translated<String> {
        let Some(name) = node.field("name") else {
            return Err(ctx.unsupported(node, "interface without a name"));
        };
        let name = ctx.text(name);
        let type_params = TypeTranslator::parameters(node.field("type_parameters"), ctx);

        let bases: Vec<String> = node
            .named_children_vec()
            .into_iter()
            .filter(|c| c.kind() == "extends_type_clause")
            .flat_map(|clause| clause.named_children_vec())
            .map(|base| TypeTranslator::translate(base, ctx))
            .collect();

        let Some(body) = node.field("body") else {
            return Err(ctx.unsupported(node, "interface without a body"));
        };
        let Some(members) = TypeTranslator::members(body, ctx) else {
            return Err(ctx.unsupported(body, "interface member without a Haxe form"));
        };

        let mut prefix = bases.join(" & ");
        if !prefix.is_empty() {
            prefix.push_str(" & ");
        }
        let header = format!(
            "{}typedef {}{} = {}{{",
            visibility_prefix(public),
            name,
            type_params,
            prefix
        );
        if members.is_empty() {
            return Ok(format!("{}}}", header));
        }
        let mut out = ctx.writer();
        out.line(header);
        out.indent();
        for member in members {
            out.line(member);
        }
        out.dedent();
        out.line("}");
        Ok(out.finish())
    }

    fn type_alias<'a>(node: Node<'a>, public: bool, ctx: &mut EmitContext<'a>) -> Translated<String> {
        let (Some(name), Some(value)) = (node.field("name"), node.field("value")) else {
            return Err(ctx.unsupported(node, "incomplete type alias"));
        };
        let name = ctx.text(name);

        if let Some(literals) = string_literal_union(value, ctx) {
            let mut out = ctx.writer();
            out.line(format!(
                "{}enum abstract {}(String) from String to String {{",
                visibility_prefix(public),
                name
            ));
            out.indent();
            let mut used = HashSet::new();
            for literal in literals {
                let member = unique_name(to_haxe_module_name(&literal), &mut used);
                out.line(format!("var {} = {};", member, quote_string(&literal)));
            }
            out.dedent();
            out.line("}");
            return Ok(out.finish());
        }

        Ok(format!(
            "{}typedef {}{} = {};",
            visibility_prefix(public),
            name,
            TypeTranslator::parameters(node.field("type_parameters"), ctx),
            TypeTranslator::translate(value, ctx)
        ))
    }

    fn enumeration<'a>(node: Node<'a>, public: bool, ctx: &mut EmitContext<'a>) -> Translated<String> {
        let (Some(name), Some(body)) = (node.field("name"), node.field("body")) else {
            return Err(ctx.unsupported(node, "incomplete enum"));
        };
        let name = ctx.text(name);

        let mut members: Vec<(Node<'a>, String, Option<Node<'a>>)> = Vec::new();
        for member in body.named_children_vec() {
            let (name_node, value) = match member.kind() {
                "enum_assignment" => (member.field("name"), member.field("value")),
                _ => (Some(member), None),
            };
            let Some(name_node) = name_node else {
                return Err(ctx.unsupported(member, "enum member without a name"));
            };
            let member_name = match name_node.kind() {
                "property_identifier" => ctx.text(name_node).to_string(),
                "string" => decode_string_literal(ctx.text(name_node)),
                _ => return Err(ctx.unsupported(name_node, "enum member name")),
            };
            members.push((member, sanitize_identifier(&member_name), value));
        }

        let is_string = members
            .iter()
            .any(|(_, _, value)| value.is_some_and(|v| v.kind() == "string"));
        let underlying = if is_string { "String" } else { "Float" };

        let mut lines = Vec::new();
        let mut next: Option<f64> = Some(0.0);
        for (member, member_name, value) in members {
            let rendered = match (is_string, value) {
                (true, Some(v)) if v.kind() == "string" => quote_string(&decode_string_literal(ctx.text(v))),
                (true, _) => return Err(ctx.unsupported(member, "mixed enum initializers")),
                (false, None) => {
                    let Some(current) = next else {
                        return Err(ctx.unsupported(member, "enum member after a non-numeric value"));
                    };
                    next = Some(current + 1.0);
                    format_number(current)
                }
                (false, Some(v)) => {
                    let Some(current) = numeric_value(v, ctx) else {
                        return Err(ctx.unsupported(v, "computed enum initializer"));
                    };
                    next = Some(current + 1.0);
                    format_number(current)
                }
            };
            lines.push(format!("var {} = {};", member_name, rendered));
        }

        let mut out = ctx.writer();
        out.line(format!(
            "{}enum abstract {}({}) from {} to {} {{",
            visibility_prefix(public),
            name,
            underlying,
            underlying,
            underlying
        ));
        out.indent();
        for line in lines {
            out.line(line);
        }
        out.dedent();
        out.line("}");
        Ok(out.finish())
    }

    fn variables<'a>(node: Node<'a>, exported: bool, ctx: &mut EmitContext<'a>) -> Translated<String> {
        let keyword = if node.has_token("const") { "final" } else { "var" };
        let mut lines = Vec::new();

        for declarator in node.named_children_vec() {
            if declarator.kind() != "variable_declarator" {
                continue;
            }
            let Some(name) = declarator.field("name") else {
                return Err(ctx.unsupported(declarator, "declarator without a name"));
            };
            if name.kind() != "identifier" {
                return Err(ctx.unsupported(name, "top-level destructuring"));
            }
            let raw = ctx.text(name);
            let prefix = visibility_prefix(exported || ctx.unit().exports.is_public(raw));
            let ty = TypeTranslator::annotation_suffix(declarator.field("type"), ctx);
            let line = match declarator.field("value") {
                Some(value) => format!(
                    "{}{} {}{} = {};",
                    prefix,
                    keyword,
                    sanitize_identifier(raw),
                    ty,
                    ExpressionTranslator::translate(value, ctx)?
                ),
                None if keyword == "final" => {
                    return Err(ctx.unsupported(declarator, "constant without an initializer"))
                }
                None => format!("{}var {}{};", prefix, sanitize_identifier(raw), ty),
            };
            lines.push(line);
        }
        Ok(lines.join("\n"))
    }

    /// Items giving renamed exports their public names.
    pub fn export_aliases<'a>(ctx: &mut EmitContext<'a>) -> Translated<Vec<String>> {
        let unit = ctx.unit();
        let mut items = Vec::new();
        for entry in unit.exports.named.iter().filter(|e| e.is_renamed()) {
            let alias = sanitize_identifier(&entry.exported);
            let local = sanitize_identifier(&entry.local);
            let item = match ModuleResolver::local_kind(ctx, &entry.local) {
                Some(DeclKind::Class) => format!("class {} extends {} {{}}", alias, local),
                Some(kind) if kind.is_type_only() => format!("typedef {} = {};", alias, local),
                _ => match ctx.rewrite(&entry.local) {
                    Some(Rewrite::Foreign(path)) | Some(Rewrite::ForeignNamespace(path)) => {
                        format!("final {} = {};", alias, path)
                    }
                    Some(Rewrite::ForeignType) => format!("typedef {} = Dynamic;", alias),
                    Some(Rewrite::ProjectNamespace(_)) | Some(Rewrite::AmbientNamespace) => {
                        let node = export_specifier(ctx, &entry.local)
                            .unwrap_or_else(|| ctx.unit().root());
                        return Err(ctx.unsupported(
                            node,
                            format!("re-exporting namespace {} under another name", entry.local),
                        ));
                    }
                    None => format!("final {} = {};", alias, local),
                },
            };
            items.push(item);
        }
        Ok(items)
    }
}

/// The `export { local as ... }` specifier naming `local`.
fn export_specifier<'a>(ctx: &EmitContext<'a>, local: &str) -> Option<Node<'a>> {
    ctx.unit()
        .top_level_statements()
        .into_iter()
        .filter(|statement| statement.kind() == "export_statement")
        .filter_map(|statement| {
            statement
                .named_children_vec()
                .into_iter()
                .find(|child| child.kind() == "export_clause")
        })
        .flat_map(|clause| clause.named_children_vec())
        .find(|specifier| specifier.field("name").is_some_and(|name| ctx.text(name) == local))
}

fn visibility_prefix(public: bool) -> &'static str {
    if public {
        ""
    } else {
        "private "
    }
}

/// Whether `param` declares a constructor parameter property, and with which visibility.
fn parameter_property_access<'a>(param: Node<'a>, ctx: &EmitContext<'a>) -> Option<&'static str> {
    let modifier = param
        .named_children_vec()
        .into_iter()
        .find(|c| c.kind() == "accessibility_modifier");
    match modifier {
        Some(m) if ctx.text(m) == "public" => Some("public"),
        Some(_) => Some("private"),
        None if param.has_token("readonly") => Some("public"),
        None => None,
    }
}

fn is_super_call(statement: Node<'_>) -> bool {
    statement.kind() == "expression_statement"
        && statement.first_named().is_some_and(|expr| {
            expr.kind() == "call_expression"
                && expr.field("function").is_some_and(|f| f.kind() == "super")
        })
}

/// Arms of a union made only of string literal types.
fn string_literal_union<'a>(node: Node<'a>, ctx: &EmitContext<'a>) -> Option<Vec<String>> {
    if node.kind() != "union_type" {
        return None;
    }
    let mut out = Vec::new();
    let mut stack = vec![node];
    while let Some(current) = stack.pop() {
        if current.kind() == "union_type" {
            stack.extend(current.named_children_vec().into_iter().rev());
            continue;
        }
        let literal = current
            .first_named()
            .filter(|inner| current.kind() == "literal_type" && inner.kind() == "string")?;
        let value = decode_string_literal(ctx.text(literal));
        if !out.contains(&value) {
            out.push(value);
        }
    }
    Some(out)
}

fn unique_name(base: String, used: &mut HashSet<String>) -> String {
    let mut candidate = base.clone();
    let mut suffix = 2;
    while !used.insert(candidate.clone()) {
        candidate = format!("{}{}", base, suffix);
        suffix += 1;
    }
    candidate
}

fn numeric_value<'a>(node: Node<'a>, ctx: &EmitContext<'a>) -> Option<f64> {
    match node.kind() {
        "number" => parse_number(ctx.text(node)),
        "unary_expression" if node.field("operator").is_some_and(|op| ctx.text(op) == "-") => {
            node.field("argument")
                .filter(|arg| arg.kind() == "number")
                .and_then(|arg| parse_number(ctx.text(arg)))
                .map(|value| -value)
        }
        "parenthesized_expression" => node.first_named().and_then(|inner| numeric_value(inner, ctx)),
        _ => None,
    }
}

fn parse_number(raw: &str) -> Option<f64> {
    let cleaned = raw.replace('_', "");
    let lower = cleaned.to_ascii_lowercase();
    let radix = match lower.get(..2) {
        Some("0x") => 16,
        Some("0o") => 8,
        Some("0b") => 2,
        _ => return cleaned.parse::<f64>().ok(),
    };
    i64::from_str_radix(&cleaned[2..], radix).ok().map(|v| v as f64)
}

fn format_number(value: f64) -> String {
    if value.fract() == 0.0 && value.abs() < 1e15 {
        format!("{}", value as i64)
    } else {
        format!("{}", value)
    }
}
