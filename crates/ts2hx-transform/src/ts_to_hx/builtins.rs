use super::context::EmitContext;
use super::errors::Translated;
use super::expression_translator::ExpressionTranslator;
use tree_sitter::Node;
use ts2hx_parser::NodeExt;

/// Global calls with a fixed Haxe spelling: `(object, method, arity, template)`.
/// `$0` stands for the first argument.
const GLOBAL_CALLS: &[(&str, &str, usize, &str)] = &[
    ("JSON", "stringify", 1, "haxe.Json.stringify($0)"),
    ("JSON", "parse", 1, "haxe.Json.parse($0)"),
    ("console", "log", 1, "trace($0)"),
];

/// Zero-argument methods rewritten on any receiver. `$r` is the receiver.
const METHOD_CALLS: &[(&str, &str)] = &[("trim", "StringTools.trim($r)"), ("slice", "$r.slice(0)")];

/// Rewrites calls into the runtime library that Haxe spells differently.
///
/// Returns `None` when `callee` is not a known builtin, leaving it to the generic call path.
pub fn translate_builtin_call<'a>(
    callee: Node<'a>,
    args: &[Node<'a>],
    ctx: &mut EmitContext<'a>,
) -> Translated<Option<String>> {
    if callee.kind() != "member_expression" || callee.has_token("optional_chain") {
        return Ok(None);
    }
    let (Some(object), Some(property)) = (callee.field("object"), callee.field("property")) else {
        return Ok(None);
    };
    let method = ctx.text(property);

    if object.kind() == "identifier" && !ctx.is_local(ctx.text(object)) {
        let receiver = ctx.text(object);
        let known: Vec<&(&str, &str, usize, &str)> = GLOBAL_CALLS
            .iter()
            .filter(|(obj, name, _, _)| *obj == receiver && *name == method)
            .collect();
        if !known.is_empty() {
            let Some((_, _, _, template)) = known.iter().find(|(_, _, arity, _)| *arity == args.len())
            else {
                return Err(ctx.unsupported(
                    callee,
                    format!("{}.{} with {} arguments", receiver, method, args.len()),
                ));
            };
            let first = match args.first() {
                Some(arg) => ExpressionTranslator::translate(*arg, ctx)?,
                None => String::new(),
            };
            return Ok(Some(template.replace("$0", &first)));
        }
    }

    if args.is_empty() {
        if let Some((_, template)) = METHOD_CALLS.iter().find(|(name, _)| *name == method) {
            let receiver = ExpressionTranslator::translate(object, ctx)?;
            return Ok(Some(template.replace("$r", &receiver)));
        }
    }
    Ok(None)
}

/// Haxe spelling of a global constructor.
pub fn constructor_name(name: &str) -> Option<&'static str> {
    match name {
        "Error" => Some("js.lib.Error"),
        "Promise" => Some("js.lib.Promise"),
        _ => None,
    }
}
