/*! Lowering of destructuring patterns.
 *
 * Haxe has no destructuring, so a pattern becomes a run of plain statements reading from a temporary
 * that holds the source value. The source is evaluated exactly once; every later read goes through
 * the temporary. Nested patterns and defaults get a fresh temporary per level.
 */

use super::context::EmitContext;
use super::errors::Translated;
use super::expression_translator::ExpressionTranslator;
use tree_sitter::Node;
use ts2hx_core::{is_haxe_identifier, quote_string, sanitize_identifier};
use ts2hx_parser::literal::decode_string_literal;
use ts2hx_parser::NodeExt;

/// How the names a pattern introduces are bound.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BindingKind {
    /// `var x = ...;`
    Var,
    /// `final x = ...;`
    Final,
    /// `x = ...;` on existing targets.
    Assign,
}

pub struct Destructuring;

impl Destructuring {
    /// Statements binding `pattern` from the expression `source`.
    pub fn lower<'a>(
        pattern: Node<'a>,
        source: Node<'a>,
        kind: BindingKind,
        ctx: &mut EmitContext<'a>,
    ) -> Translated<Vec<String>> {
        let value = ExpressionTranslator::translate(source, ctx)?;
        let temp = ctx.fresh_temp();
        let mut out = vec![format!("var {} = {};", temp, value)];
        out.extend(Self::lower_from(pattern, &temp, kind, ctx)?);
        Ok(out)
    }

    /// Statements binding `pattern` from a value already held in `temp`.
    pub fn lower_from<'a>(
        pattern: Node<'a>,
        temp: &str,
        kind: BindingKind,
        ctx: &mut EmitContext<'a>,
    ) -> Translated<Vec<String>> {
        let mut out = Vec::new();
        match pattern.kind() {
            "object_pattern" => Self::object_pattern(pattern, temp, kind, ctx, &mut out)?,
            "array_pattern" => Self::array_pattern(pattern, temp, kind, ctx, &mut out)?,
            _ => Self::bind(pattern, temp.to_string(), kind, ctx, &mut out)?,
        }
        Ok(out)
    }

    /// `({ a, b } = value)` in expression position: a block expression yielding the source.
    pub fn assignment_expression<'a>(
        pattern: Node<'a>,
        source: Node<'a>,
        ctx: &mut EmitContext<'a>,
    ) -> Translated<String> {
        let value = ExpressionTranslator::translate(source, ctx)?;
        let temp = ctx.fresh_temp();
        let mut parts = vec![format!("var {} = {};", temp, value)];
        parts.extend(Self::lower_from(pattern, &temp, BindingKind::Assign, ctx)?);
        parts.push(format!("{};", temp));
        Ok(format!("{{ {} }}", parts.join(" ")))
    }

    fn object_pattern<'a>(
        pattern: Node<'a>,
        temp: &str,
        kind: BindingKind,
        ctx: &mut EmitContext<'a>,
        out: &mut Vec<String>,
    ) -> Translated<()> {
        let mut claimed: Vec<String> = Vec::new();

        for property in pattern.named_children_vec() {
            match property.kind() {
                "shorthand_property_identifier_pattern" => {
                    let key = ctx.text(property).to_string();
                    let access = field_access(temp, &key);
                    claimed.push(key);
                    Self::bind(property, access, kind, ctx, out)?;
                }
                "object_assignment_pattern" => {
                    let (Some(left), Some(default)) = (property.field("left"), property.field("right"))
                    else {
                        return Err(ctx.unsupported(property, "incomplete default in pattern"));
                    };
                    let key = ctx.text(left).to_string();
                    let access = field_access(temp, &key);
                    claimed.push(key);
                    Self::bind_with_default(left, access, default, kind, ctx, out)?;
                }
                "pair_pattern" => {
                    let (Some(key_node), Some(value)) = (property.field("key"), property.field("value"))
                    else {
                        return Err(ctx.unsupported(property, "incomplete property pattern"));
                    };
                    let key = Self::pattern_key(key_node, ctx)?;
                    let access = field_access(temp, &key);
                    claimed.push(key);
                    if value.kind() == "assignment_pattern" {
                        let (Some(left), Some(default)) = (value.field("left"), value.field("right"))
                        else {
                            return Err(ctx.unsupported(value, "incomplete default in pattern"));
                        };
                        Self::bind_with_default(left, access, default, kind, ctx, out)?;
                    } else {
                        Self::bind(value, access, kind, ctx, out)?;
                    }
                }
                "rest_pattern" => {
                    let Some(target) = property.first_named() else {
                        return Err(ctx.unsupported(property, "rest without a name"));
                    };
                    let rest = ctx.fresh_temp();
                    out.push(format!("var {} = Reflect.copy({});", rest, temp));
                    for key in &claimed {
                        out.push(format!("Reflect.deleteField({}, {});", rest, quote_string(key)));
                    }
                    Self::bind(target, rest, kind, ctx, out)?;
                }
                _ => return Err(ctx.unsupported(property, "object pattern member")),
            }
        }
        Ok(())
    }

    fn pattern_key<'a>(key: Node<'a>, ctx: &EmitContext<'a>) -> Translated<String> {
        match key.kind() {
            "property_identifier" | "number" => Ok(ctx.text(key).to_string()),
            "string" => Ok(decode_string_literal(ctx.text(key))),
            "computed_property_name" => Err(ctx.unsupported(key, "computed key in pattern")),
            _ => Err(ctx.unsupported(key, "pattern key")),
        }
    }

    fn array_pattern<'a>(
        pattern: Node<'a>,
        temp: &str,
        kind: BindingKind,
        ctx: &mut EmitContext<'a>,
        out: &mut Vec<String>,
    ) -> Translated<()> {
        let mut index = 0usize;
        for child in pattern.children_vec() {
            match child.kind() {
                "[" | "]" => {}
                "," => index += 1,
                "rest_pattern" => {
                    let Some(target) = child.first_named() else {
                        return Err(ctx.unsupported(child, "rest without a name"));
                    };
                    let access = format!("{}.slice({})", temp, index);
                    Self::bind(target, access, kind, ctx, out)?;
                }
                "assignment_pattern" => {
                    let (Some(left), Some(default)) = (child.field("left"), child.field("right"))
                    else {
                        return Err(ctx.unsupported(child, "incomplete default in pattern"));
                    };
                    let access = format!("{}[{}]", temp, index);
                    Self::bind_with_default(left, access, default, kind, ctx, out)?;
                }
                _ if child.is_named() => {
                    let access = format!("{}[{}]", temp, index);
                    Self::bind(child, access, kind, ctx, out)?;
                }
                _ => return Err(ctx.unsupported(child, "array pattern element")),
            }
        }
        Ok(())
    }

    fn bind_with_default<'a>(
        target: Node<'a>,
        access: String,
        default: Node<'a>,
        kind: BindingKind,
        ctx: &mut EmitContext<'a>,
        out: &mut Vec<String>,
    ) -> Translated<()> {
        let temp = ctx.fresh_temp();
        out.push(format!("var {} = {};", temp, access));
        let fallback = ExpressionTranslator::translate(default, ctx)?;
        let value = format!("({} == null ? {} : {})", temp, fallback, temp);

        if matches!(target.kind(), "object_pattern" | "array_pattern") {
            out.push(format!("{} = {};", temp, value));
            out.extend(Self::lower_from(target, &temp, kind, ctx)?);
            return Ok(());
        }
        Self::bind(target, value, kind, ctx, out)
    }

    /// Binds a single target (a name, a nested pattern or, for assignments, an lvalue).
    fn bind<'a>(
        target: Node<'a>,
        value: String,
        kind: BindingKind,
        ctx: &mut EmitContext<'a>,
        out: &mut Vec<String>,
    ) -> Translated<()> {
        match target.kind() {
            "identifier" | "shorthand_property_identifier_pattern" => {
                let raw = ctx.text(target);
                match kind {
                    BindingKind::Var | BindingKind::Final => {
                        let keyword = if kind == BindingKind::Var { "var" } else { "final" };
                        ctx.bind_local(raw);
                        out.push(format!("{} {} = {};", keyword, sanitize_identifier(raw), value));
                    }
                    BindingKind::Assign => {
                        let lhs = ExpressionTranslator::identifier(target, ctx)?;
                        out.push(format!("{} = {};", lhs, value));
                    }
                }
                Ok(())
            }
            "member_expression" | "subscript_expression" if kind == BindingKind::Assign => {
                let lhs = ExpressionTranslator::translate(target, ctx)?;
                out.push(format!("{} = {};", lhs, value));
                Ok(())
            }
            "object_pattern" | "array_pattern" => {
                let temp = ctx.fresh_temp();
                out.push(format!("var {} = {};", temp, value));
                out.extend(Self::lower_from(target, &temp, kind, ctx)?);
                Ok(())
            }
            _ => Err(ctx.unsupported(target, "destructuring target")),
        }
    }
}

/// Reads `key` from the value in `temp`.
fn field_access(temp: &str, key: &str) -> String {
    if is_haxe_identifier(key) {
        format!("{}.{}", temp, key)
    } else {
        format!("Reflect.field({}, {})", temp, quote_string(key))
    }
}

#[cfg(test)]
mod tests {
    use super::field_access;

    #[test]
    fn field_access_quotes_non_identifiers() {
        assert_eq!(field_access("__tmp0", "name"), "__tmp0.name");
        assert_eq!(field_access("__tmp0", "content-type"), "Reflect.field(__tmp0, \"content-type\")");
        assert_eq!(field_access("__tmp0", "class"), "Reflect.field(__tmp0, \"class\")");
    }
}
