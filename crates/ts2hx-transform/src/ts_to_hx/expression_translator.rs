use super::builtins::{constructor_name, translate_builtin_call};
use super::context::{EmitContext, Rewrite};
use super::declaration_translator::DeclarationTranslator;
use super::destructuring::Destructuring;
use super::errors::Translated;
use super::module_resolver::ModuleResolver;
use super::type_translator::TypeTranslator;
use tree_sitter::Node;
use ts2hx_core::{is_haxe_identifier, is_reserved_word, quote_string, sanitize_identifier};
use ts2hx_parser::literal::{decode_escapes, decode_string_literal};
use ts2hx_parser::NodeExt;

pub struct ExpressionTranslator;

impl ExpressionTranslator {
    pub fn translate<'a>(node: Node<'a>, ctx: &mut EmitContext<'a>) -> Translated<String> {
        match node.kind() {
            "identifier" => Self::identifier(node, ctx),
            "undefined" | "null" => Ok("null".to_string()),
            "true" | "false" | "this" | "super" => Ok(ctx.text(node).to_string()),
            "number" => Self::number(node, ctx),
            "string" => Ok(quote_string(&decode_string_literal(ctx.text(node)))),
            "template_string" => Self::template(node, ctx),
            "member_expression" => Self::member(node, ctx),
            "subscript_expression" => Self::subscript(node, ctx),
            "call_expression" => Self::call(node, ctx),
            "new_expression" => Self::new_expression(node, ctx),
            "binary_expression" => Self::binary(node, ctx),
            "unary_expression" => Self::unary(node, ctx),
            "update_expression" => Self::update(node, ctx),
            "assignment_expression" => Self::assignment(node, ctx),
            "augmented_assignment_expression" => Self::augmented_assignment(node, ctx),
            "ternary_expression" => {
                let condition = Self::required(node, "condition", ctx)?;
                let consequence = Self::required(node, "consequence", ctx)?;
                let alternative = Self::required(node, "alternative", ctx)?;
                Ok(format!("({} ? {} : {})", condition, consequence, alternative))
            }
            "arrow_function" | "function_expression" | "function" => {
                DeclarationTranslator::function_expression(node, ctx)
            }
            "object" => Self::object(node, ctx),
            "array" => Self::array(node, ctx),
            "as_expression" | "type_assertion" => Self::cast(node, ctx),
            "satisfies_expression" => {
                let inner = Self::first_expression(node, ctx)?;
                Self::translate(inner, ctx)
            }
            "non_null_expression" => {
                let inner = Self::first_expression(node, ctx)?;
                Ok(parens(Self::translate(inner, ctx)?))
            }
            "parenthesized_expression" => {
                let inner = Self::first_expression(node, ctx)?;
                if inner.kind() == "sequence_expression" {
                    return Self::translate(inner, ctx);
                }
                Ok(parens(Self::translate(inner, ctx)?))
            }
            "sequence_expression" => {
                let mut parts = Vec::new();
                Self::flatten_sequence(node, ctx, &mut parts)?;
                Ok(format!("{{ {}; }}", parts.join("; ")))
            }
            "await_expression" => Err(ctx.unsupported(node, "await")),
            "yield_expression" => Err(ctx.unsupported(node, "yield")),
            "regex" => Err(ctx.unsupported(node, "regular expression literal")),
            "class" => Err(ctx.unsupported(node, "class expression")),
            "generator_function" => Err(ctx.unsupported(node, "generator function")),
            kind => Err(ctx.unsupported(node, format!("expression of kind {}", kind))),
        }
    }

    fn required<'a>(node: Node<'a>, field: &str, ctx: &mut EmitContext<'a>) -> Translated<String> {
        match node.field(field) {
            Some(child) => Self::translate(child, ctx),
            None => Err(ctx.unsupported(node, format!("missing {}", field))),
        }
    }

    fn first_expression<'a>(node: Node<'a>, ctx: &EmitContext<'a>) -> Translated<Node<'a>> {
        node.field("expression")
            .or_else(|| {
                node.named_children_vec()
                    .into_iter()
                    .find(|child| !child.kind().ends_with("type") && child.kind() != "type_arguments")
            })
            .ok_or_else(|| ctx.unsupported(node, "empty expression"))
    }

    /// An identifier read as a value, honoring import rewrites unless a local shadows it.
    pub fn identifier<'a>(node: Node<'a>, ctx: &mut EmitContext<'a>) -> Translated<String> {
        let name = ctx.text(node);
        if name == "undefined" {
            return Ok("null".to_string());
        }
        match ctx.rewrite(name) {
            Some(Rewrite::Foreign(path)) => Ok(path.clone()),
            Some(Rewrite::ForeignNamespace(path)) => Ok(path.clone()),
            Some(Rewrite::ForeignType) => Err(ctx.unsupported(node, "type-only import used as a value")),
            Some(Rewrite::ProjectNamespace(_)) | Some(Rewrite::AmbientNamespace) => {
                Err(ctx.unsupported(node, format!("namespace {} used as a value", name)))
            }
            None => Ok(sanitize_identifier(name)),
        }
    }

    fn number<'a>(node: Node<'a>, ctx: &EmitContext<'a>) -> Translated<String> {
        let raw = ctx.text(node).replace('_', "");
        if raw.ends_with('n') {
            return Err(ctx.unsupported(node, "BigInt literal"));
        }

        let lower = raw.to_ascii_lowercase();
        let radix = if lower.starts_with("0b") {
            Some(2)
        } else if lower.starts_with("0o") {
            Some(8)
        } else {
            None
        };
        if let Some(radix) = radix {
            return u128::from_str_radix(&raw[2..], radix)
                .map(|value| value.to_string())
                .map_err(|_| ctx.unsupported(node, format!("numeric literal {}", raw)));
        }

        if lower.starts_with("0x") {
            return Ok(raw);
        }
        let mut out = raw;
        if out.starts_with('.') {
            out.insert(0, '0');
        }
        if let Some(dot) = out.find('.') {
            let after = &out[dot + 1..];
            if after.is_empty() || after.starts_with(['e', 'E']) {
                out.insert(dot + 1, '0');
            }
        }
        Ok(out)
    }

    /// `` `a${b}c` `` becomes `("a" + b + "c")`; the first operand is always a string.
    fn template<'a>(node: Node<'a>, ctx: &mut EmitContext<'a>) -> Translated<String> {
        let source = ctx.source;
        let inner_start = node.start_byte() + 1;
        let inner_end = node.end_byte().saturating_sub(1).max(inner_start);

        let mut parts: Vec<String> = Vec::new();
        let mut cursor = inner_start;
        for child in node.named_children_vec() {
            if child.kind() != "template_substitution" {
                continue;
            }
            let chunk = &source[cursor..child.start_byte()];
            if !chunk.is_empty() {
                parts.push(quote_string(&decode_escapes(chunk)));
            }
            let Some(expr) = child.first_named() else {
                return Err(ctx.unsupported(child, "empty substitution"));
            };
            parts.push(Self::translate(expr, ctx)?);
            cursor = child.end_byte();
        }
        let tail = &source[cursor..inner_end];
        if !tail.is_empty() {
            parts.push(quote_string(&decode_escapes(tail)));
        }

        if !parts.first().is_some_and(|first| first.starts_with('"')) {
            parts.insert(0, "\"\"".to_string());
        }
        if parts.len() == 1 {
            return Ok(parts.remove(0));
        }
        Ok(format!("({})", parts.join(" + ")))
    }

    fn property_name<'a>(property: Node<'a>, ctx: &EmitContext<'a>) -> Translated<&'a str> {
        let name = ctx.text(property);
        match property.kind() {
            "private_property_identifier" => Err(ctx.unsupported(property, "private name")),
            _ if is_reserved_word(name) => Err(ctx.unsupported(
                property,
                format!("property {} is a Haxe keyword", name),
            )),
            _ => Ok(name),
        }
    }

    fn member<'a>(node: Node<'a>, ctx: &mut EmitContext<'a>) -> Translated<String> {
        let (Some(object), Some(property)) = (node.field("object"), node.field("property")) else {
            return Err(ctx.unsupported(node, "incomplete member access"));
        };
        let optional = node.has_token("optional_chain");

        if object.kind() == "identifier" && !optional {
            let name = ctx.text(property);
            if let Some(path) = ModuleResolver::namespace_member(ctx, ctx.text(object), name, node)? {
                return Ok(path);
            }
        }

        let name = Self::property_name(property, ctx)?;
        let target = Self::translate(object, ctx)?;
        let dot = if optional { "?." } else { "." };
        Ok(format!("{}{}{}", target, dot, name))
    }

    fn subscript<'a>(node: Node<'a>, ctx: &mut EmitContext<'a>) -> Translated<String> {
        if node.has_token("optional_chain") {
            return Err(ctx.unsupported(node, "optional subscript"));
        }
        let (Some(object), Some(index)) = (node.field("object"), node.field("index")) else {
            return Err(ctx.unsupported(node, "incomplete subscript"));
        };

        if object.kind() == "identifier" && index.kind() == "string" {
            let member = decode_string_literal(ctx.text(index));
            if let Some(path) = ModuleResolver::namespace_member(ctx, ctx.text(object), &member, node)? {
                return Ok(path);
            }
        }

        let target = Self::translate(object, ctx)?;
        let index = Self::translate(index, ctx)?;
        Ok(format!("{}[{}]", target, index))
    }

    fn call<'a>(node: Node<'a>, ctx: &mut EmitContext<'a>) -> Translated<String> {
        let Some(callee) = node.field("function") else {
            return Err(ctx.unsupported(node, "call without callee"));
        };
        if callee.kind() == "import" {
            return Err(ctx.unsupported(node, "dynamic import"));
        }
        let arguments = match node.field("arguments") {
            Some(args) if args.kind() == "arguments" => args.named_children_vec(),
            Some(args) => return Err(ctx.unsupported(args, "tagged template")),
            None => Vec::new(),
        };
        if let Some(spread) = arguments.iter().find(|a| a.kind() == "spread_element") {
            return Err(ctx.unsupported(*spread, "spread argument"));
        }

        if let Some(rewritten) = translate_builtin_call(callee, &arguments, ctx)? {
            return Ok(rewritten);
        }

        let mut args = Vec::with_capacity(arguments.len());
        for arg in arguments {
            args.push(Self::translate(arg, ctx)?);
        }
        let args = args.join(", ");

        if node.has_token("optional_chain") {
            if callee.kind() != "identifier" {
                return Err(ctx.unsupported(node, "optional call on a non-identifier"));
            }
            let function = Self::identifier(callee, ctx)?;
            return Ok(format!("({} != null ? {}({}) : null)", function, function, args));
        }

        let function = Self::translate(callee, ctx)?;
        Ok(format!("{}({})", function, args))
    }

    fn new_expression<'a>(node: Node<'a>, ctx: &mut EmitContext<'a>) -> Translated<String> {
        let Some(constructor) = node.field("constructor") else {
            return Err(ctx.unsupported(node, "new without constructor"));
        };
        let class = match constructor_name(ctx.text(constructor)) {
            Some(builtin) if constructor.kind() == "identifier" && !ctx.is_local(ctx.text(constructor)) => {
                builtin.to_string()
            }
            _ => Self::translate(constructor, ctx)?,
        };
        let type_args = TypeTranslator::arguments_suffix(node.field("type_arguments"), ctx);

        let mut args = Vec::new();
        if let Some(arguments) = node.field("arguments") {
            for arg in arguments.named_children_vec() {
                if arg.kind() == "spread_element" {
                    return Err(ctx.unsupported(arg, "spread argument"));
                }
                args.push(Self::translate(arg, ctx)?);
            }
        }
        Ok(format!("new {}{}({})", class, type_args, args.join(", ")))
    }

    fn binary<'a>(node: Node<'a>, ctx: &mut EmitContext<'a>) -> Translated<String> {
        let (Some(left), Some(operator), Some(right)) =
            (node.field("left"), node.field("operator"), node.field("right"))
        else {
            return Err(ctx.unsupported(node, "incomplete binary expression"));
        };
        if left.kind() == "private_property_identifier" {
            return Err(ctx.unsupported(left, "private name test"));
        }
        let lhs = Self::translate(left, ctx)?;
        let rhs = Self::translate(right, ctx)?;

        Ok(match ctx.text(operator) {
            "===" | "==" => format!("({} == {})", lhs, rhs),
            "!==" | "!=" => format!("({} != {})", lhs, rhs),
            "**" => format!("Math.pow({}, {})", lhs, rhs),
            "instanceof" => format!("Std.isOfType({}, {})", lhs, rhs),
            "in" => format!("Reflect.hasField({}, {})", rhs, lhs),
            op @ ("+" | "-" | "*" | "/" | "%" | "<" | ">" | "<=" | ">=" | "&&" | "||" | "??"
            | "&" | "|" | "^" | "<<" | ">>" | ">>>") => format!("({} {} {})", lhs, op, rhs),
            op => return Err(ctx.unsupported(operator, format!("operator {}", op))),
        })
    }

    fn unary<'a>(node: Node<'a>, ctx: &mut EmitContext<'a>) -> Translated<String> {
        let (Some(operator), Some(argument)) = (node.field("operator"), node.field("argument")) else {
            return Err(ctx.unsupported(node, "incomplete unary expression"));
        };
        match ctx.text(operator) {
            op @ ("!" | "-" | "~") => Ok(format!("{}{}", op, parens(Self::translate(argument, ctx)?))),
            "delete" => Self::delete(argument, ctx),
            op => Err(ctx.unsupported(node, format!("unary {}", op))),
        }
    }

    fn delete<'a>(target: Node<'a>, ctx: &mut EmitContext<'a>) -> Translated<String> {
        let Some(object) = target.field("object") else {
            return Err(ctx.unsupported(target, "delete of a non-member"));
        };
        let key = match target.kind() {
            "member_expression" if !target.has_token("optional_chain") => {
                let Some(property) = target.field("property") else {
                    return Err(ctx.unsupported(target, "incomplete member access"));
                };
                quote_string(ctx.text(property))
            }
            "subscript_expression" => {
                let Some(index) = target.field("index") else {
                    return Err(ctx.unsupported(target, "incomplete subscript"));
                };
                Self::translate(index, ctx)?
            }
            _ => return Err(ctx.unsupported(target, "delete of a non-member")),
        };
        let object = Self::translate(object, ctx)?;
        Ok(format!("Reflect.deleteField({}, {})", object, key))
    }

    fn update<'a>(node: Node<'a>, ctx: &mut EmitContext<'a>) -> Translated<String> {
        let (Some(operator), Some(argument)) = (node.field("operator"), node.field("argument")) else {
            return Err(ctx.unsupported(node, "incomplete update expression"));
        };
        let op = ctx.text(operator);
        let target = Self::translate(argument, ctx)?;
        if operator.start_byte() < argument.start_byte() {
            Ok(format!("{}{}", op, target))
        } else {
            Ok(format!("{}{}", target, op))
        }
    }

    fn assignment<'a>(node: Node<'a>, ctx: &mut EmitContext<'a>) -> Translated<String> {
        let (Some(left), Some(right)) = (node.field("left"), node.field("right")) else {
            return Err(ctx.unsupported(node, "incomplete assignment"));
        };
        if matches!(left.kind(), "object_pattern" | "array_pattern") {
            return Destructuring::assignment_expression(left, right, ctx);
        }
        let target = Self::translate(left, ctx)?;
        let value = Self::translate(right, ctx)?;
        Ok(format!("{} = {}", target, value))
    }

    fn augmented_assignment<'a>(node: Node<'a>, ctx: &mut EmitContext<'a>) -> Translated<String> {
        let (Some(left), Some(operator), Some(right)) =
            (node.field("left"), node.field("operator"), node.field("right"))
        else {
            return Err(ctx.unsupported(node, "incomplete assignment"));
        };
        let op = ctx.text(operator);
        let target = Self::translate(left, ctx)?;
        let value = Self::translate(right, ctx)?;

        let expanded = match op {
            "??=" => Some(format!("({} ?? {})", target, value)),
            "||=" => Some(format!("({} || {})", target, value)),
            "&&=" => Some(format!("({} && {})", target, value)),
            "**=" => Some(format!("Math.pow({}, {})", target, value)),
            _ => None,
        };
        match expanded {
            Some(_) if left.kind() != "identifier" => Err(ctx.unsupported(
                node,
                format!("{} on a non-identifier target", op),
            )),
            Some(expanded) => Ok(format!("{} = {}", target, expanded)),
            None => Ok(format!("{} {} {}", target, op, value)),
        }
    }

    fn cast<'a>(node: Node<'a>, ctx: &mut EmitContext<'a>) -> Translated<String> {
        let children = node.named_children_vec();
        let (expr, ty) = if node.kind() == "type_assertion" {
            (children.get(1).copied(), children.first().and_then(|t| t.first_named()))
        } else {
            (children.first().copied(), children.get(1).copied())
        };
        let Some(expr) = expr else {
            return Err(ctx.unsupported(node, "empty cast"));
        };
        let value = Self::translate(expr, ctx)?;
        if ty.is_none() || node.has_token("const") {
            return Ok(value);
        }
        Ok(format!("(cast {} : {})", value, TypeTranslator::translate_opt(ty, ctx)))
    }

    fn flatten_sequence<'a>(
        node: Node<'a>,
        ctx: &mut EmitContext<'a>,
        out: &mut Vec<String>,
    ) -> Translated<()> {
        for child in node.named_children_vec() {
            if child.kind() == "sequence_expression" {
                Self::flatten_sequence(child, ctx, out)?;
            } else {
                out.push(Self::translate(child, ctx)?);
            }
        }
        Ok(())
    }

    fn object<'a>(node: Node<'a>, ctx: &mut EmitContext<'a>) -> Translated<String> {
        let mut pieces: Vec<String> = Vec::new();
        let mut fields: Vec<String> = Vec::new();
        let mut spread = false;

        for member in node.named_children_vec() {
            match member.kind() {
                "pair" => {
                    let (Some(key), Some(value)) = (member.field("key"), member.field("value")) else {
                        return Err(ctx.unsupported(member, "incomplete property"));
                    };
                    let key = Self::object_key(key, ctx)?;
                    let value = Self::translate(value, ctx)?;
                    fields.push(format!("{}: {}", key, value));
                }
                "shorthand_property_identifier" => {
                    let name = ctx.text(member);
                    let value = Self::identifier(member, ctx)?;
                    fields.push(format!("{}: {}", Self::key_text(name), value));
                }
                "method_definition" => {
                    let Some(name) = member.field("name") else {
                        return Err(ctx.unsupported(member, "method without a name"));
                    };
                    let key = Self::object_key(name, ctx)?;
                    let value = DeclarationTranslator::function_expression(member, ctx)?;
                    fields.push(format!("{}: {}", key, value));
                }
                "spread_element" => {
                    let Some(inner) = member.first_named() else {
                        return Err(ctx.unsupported(member, "empty spread"));
                    };
                    spread = true;
                    if !fields.is_empty() {
                        pieces.push(object_literal(&fields));
                        fields.clear();
                    }
                    pieces.push(Self::translate(inner, ctx)?);
                }
                _ => return Err(ctx.unsupported(member, "object literal member")),
            }
        }

        if !spread {
            return Ok(object_literal(&fields));
        }
        if !fields.is_empty() {
            pieces.push(object_literal(&fields));
        }
        Ok(format!("(js.lib.Object.assign({{}}, {}) : Dynamic)", pieces.join(", ")))
    }

    fn object_key<'a>(key: Node<'a>, ctx: &EmitContext<'a>) -> Translated<String> {
        match key.kind() {
            "property_identifier" => Ok(Self::key_text(ctx.text(key))),
            "string" => Ok(Self::key_text(&decode_string_literal(ctx.text(key)))),
            "number" => Ok(quote_string(ctx.text(key))),
            "computed_property_name" => Err(ctx.unsupported(key, "computed property key")),
            _ => Err(ctx.unsupported(key, "property key")),
        }
    }

    fn key_text(name: &str) -> String {
        if is_haxe_identifier(name) {
            name.to_string()
        } else {
            quote_string(name)
        }
    }

    fn array<'a>(node: Node<'a>, ctx: &mut EmitContext<'a>) -> Translated<String> {
        let mut segments: Vec<String> = Vec::new();
        let mut elements: Vec<String> = Vec::new();
        let mut spread = false;
        let mut expect_element = true;

        for child in node.children_vec() {
            match child.kind() {
                "[" | "]" => {}
                "," => {
                    if expect_element {
                        return Err(ctx.unsupported(child, "array hole"));
                    }
                    expect_element = true;
                }
                "spread_element" => {
                    let Some(inner) = child.first_named() else {
                        return Err(ctx.unsupported(child, "empty spread"));
                    };
                    if !elements.is_empty() || segments.is_empty() {
                        segments.push(format!("[{}]", elements.join(", ")));
                        elements.clear();
                    }
                    spread = true;
                    segments.push(Self::translate(inner, ctx)?);
                    expect_element = false;
                }
                _ => {
                    elements.push(Self::translate(child, ctx)?);
                    expect_element = false;
                }
            }
        }

        if !spread {
            return Ok(format!("[{}]", elements.join(", ")));
        }
        if !elements.is_empty() {
            segments.push(format!("[{}]", elements.join(", ")));
        }
        let mut iter = segments.into_iter();
        let head = iter.next().unwrap_or_else(|| "[]".to_string());
        Ok(iter.fold(head, |acc, next| format!("{}.concat({})", acc, next)))
    }
}

fn object_literal(fields: &[String]) -> String {
    if fields.is_empty() {
        "{}".to_string()
    } else {
        format!("{{ {} }}", fields.join(", "))
    }
}

/// Wraps `expr` in parentheses unless one balanced pair already encloses all of it.
pub fn parens(expr: String) -> String {
    if is_wrapped(&expr) {
        expr
    } else {
        format!("({})", expr)
    }
}

fn is_wrapped(expr: &str) -> bool {
    if !expr.starts_with('(') || !expr.ends_with(')') {
        return false;
    }
    let mut depth = 0usize;
    let mut quote: Option<char> = None;
    let mut escaped = false;
    for (i, c) in expr.char_indices() {
        if let Some(q) = quote {
            if escaped {
                escaped = false;
            } else if c == '\\' {
                escaped = true;
            } else if c == q {
                quote = None;
            }
            continue;
        }
        match c {
            '"' | '\'' => quote = Some(c),
            '(' => depth += 1,
            ')' => {
                depth = depth.saturating_sub(1);
                if depth == 0 && i != expr.len() - 1 {
                    return false;
                }
            }
            _ => {}
        }
    }
    depth == 0
}

#[cfg(test)]
mod tests {
    use super::parens;

    #[test]
    fn parens_are_not_doubled() {
        assert_eq!(parens("(a && b)".to_string()), "(a && b)");
        assert_eq!(parens("a".to_string()), "(a)");
        assert_eq!(parens("(a) + (b)".to_string()), "((a) + (b))");
        assert_eq!(parens("(\")\" + a)".to_string()), "(\")\" + a)");
    }
}
