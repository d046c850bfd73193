use super::context::{EmitContext, JumpTarget};
use super::declaration_translator::DeclarationTranslator;
use super::destructuring::{BindingKind, Destructuring};
use super::errors::Translated;
use super::expression_translator::{parens, ExpressionTranslator};
use super::type_translator::TypeTranslator;
use tracing::warn;
use tree_sitter::Node;
use ts2hx_core::{sanitize_identifier, SourceWriter};
use ts2hx_parser::NodeExt;

pub struct StatementTranslator;

impl StatementTranslator {
    pub fn translate<'a>(
        node: Node<'a>,
        ctx: &mut EmitContext<'a>,
        out: &mut SourceWriter,
    ) -> Translated<()> {
        match node.kind() {
            "statement_block" => {
                out.line("{");
                out.indent();
                let result = Self::translate_block(node, ctx, out);
                out.dedent();
                out.line("}");
                result
            }
            "expression_statement" => Self::expression_statement(node, ctx, out),
            "lexical_declaration" | "variable_declaration" => Self::declaration(node, ctx, out),
            "if_statement" => Self::if_statement(node, ctx, out),
            "while_statement" => {
                let condition = Self::condition(node, ctx)?;
                out.line(format!("while {} {{", condition));
                Self::loop_body(node.field("body"), JumpTarget::Loop { lowered_for: false }, &[], ctx, out)?;
                out.line("}");
                Ok(())
            }
            "do_statement" => {
                out.line("do {");
                Self::loop_body(node.field("body"), JumpTarget::Loop { lowered_for: false }, &[], ctx, out)?;
                let condition = Self::condition(node, ctx)?;
                out.line(format!("}} while {};", condition));
                Ok(())
            }
            "for_statement" => Self::for_statement(node, ctx, out),
            "for_in_statement" => Self::for_in_statement(node, ctx, out),
            "break_statement" => {
                if node.field("label").is_some() {
                    return Err(ctx.unsupported(node, "labeled break"));
                }
                match ctx.break_target() {
                    Some(JumpTarget::Switch) => {
                        Err(ctx.unsupported(node, "break before the end of a switch case"))
                    }
                    Some(_) => {
                        out.line("break;");
                        Ok(())
                    }
                    None => Err(ctx.unsupported(node, "break outside a loop")),
                }
            }
            "continue_statement" => {
                if node.field("label").is_some() {
                    return Err(ctx.unsupported(node, "labeled continue"));
                }
                if ctx.continue_target() == Some(JumpTarget::Loop { lowered_for: true }) {
                    let (line, column) = node.line_column();
                    warn!(
                        file = %ctx.path_display(),
                        line,
                        column,
                        "continue inside a lowered for loop skips its increment"
                    );
                }
                out.line("continue;");
                Ok(())
            }
            "return_statement" => {
                match node.first_named() {
                    Some(value) => {
                        let value = ExpressionTranslator::translate(value, ctx)?;
                        out.line(format!("return {};", value));
                    }
                    None => out.line("return;"),
                }
                Ok(())
            }
            "throw_statement" => {
                let Some(value) = node.first_named() else {
                    return Err(ctx.unsupported(node, "throw without a value"));
                };
                let value = ExpressionTranslator::translate(value, ctx)?;
                out.line(format!("throw {};", value));
                Ok(())
            }
            "empty_statement" => Ok(()),
            "function_declaration" => {
                if let Some(name) = node.field("name") {
                    ctx.bind_local(ctx.text(name));
                }
                let text = DeclarationTranslator::local_function(node, ctx)?;
                out.line(text);
                Ok(())
            }
            "switch_statement" => Self::switch_statement(node, ctx, out),
            "try_statement" => Self::try_statement(node, ctx, out),
            "labeled_statement" => Err(ctx.unsupported(node, "labeled statement")),
            "class_declaration" | "abstract_class_declaration" => {
                Err(ctx.unsupported(node, "class declared inside a body"))
            }
            "interface_declaration" | "type_alias_declaration" | "enum_declaration" => {
                Err(ctx.unsupported(node, "type declared inside a body"))
            }
            kind => Err(ctx.unsupported(node, format!("statement of kind {}", kind))),
        }
    }

    /// Statements of a block in a fresh lexical scope, without the braces.
    pub fn translate_block<'a>(
        block: Node<'a>,
        ctx: &mut EmitContext<'a>,
        out: &mut SourceWriter,
    ) -> Translated<()> {
        ctx.push_scope();
        let result = Self::translate_statements(&block.named_children_vec(), ctx, out);
        ctx.pop_scope();
        result
    }

    fn translate_statements<'a>(
        statements: &[Node<'a>],
        ctx: &mut EmitContext<'a>,
        out: &mut SourceWriter,
    ) -> Translated<()> {
        for statement in statements {
            Self::translate(*statement, ctx, out)?;
        }
        Ok(())
    }

    /// A statement used as a body: blocks are unwrapped, anything else becomes the single statement.
    fn body<'a>(
        node: Option<Node<'a>>,
        ctx: &mut EmitContext<'a>,
        out: &mut SourceWriter,
    ) -> Translated<()> {
        match node {
            Some(block) if block.kind() == "statement_block" => Self::translate_block(block, ctx, out),
            Some(statement) => {
                ctx.push_scope();
                let result = Self::translate(statement, ctx, out);
                ctx.pop_scope();
                result
            }
            None => Ok(()),
        }
    }

    fn loop_body<'a>(
        body: Option<Node<'a>>,
        target: JumpTarget,
        prelude: &[String],
        ctx: &mut EmitContext<'a>,
        out: &mut SourceWriter,
    ) -> Translated<()> {
        out.indent();
        for line in prelude {
            out.line(line);
        }
        ctx.push_jump(target);
        let result = Self::body(body, ctx, out);
        ctx.pop_jump();
        out.dedent();
        result
    }

    fn condition<'a>(node: Node<'a>, ctx: &mut EmitContext<'a>) -> Translated<String> {
        let Some(condition) = node.field("condition") else {
            return Err(ctx.unsupported(node, "missing condition"));
        };
        Ok(parens(ExpressionTranslator::translate(condition, ctx)?))
    }

    fn expression_statement<'a>(
        node: Node<'a>,
        ctx: &mut EmitContext<'a>,
        out: &mut SourceWriter,
    ) -> Translated<()> {
        let Some(expr) = node.first_named() else {
            return Ok(());
        };
        match expr.kind() {
            "sequence_expression" => {
                for part in expr.named_children_vec() {
                    Self::expression_line(part, ctx, out)?;
                }
                Ok(())
            }
            _ => Self::expression_line(expr, ctx, out),
        }
    }

    fn expression_line<'a>(
        expr: Node<'a>,
        ctx: &mut EmitContext<'a>,
        out: &mut SourceWriter,
    ) -> Translated<()> {
        if expr.kind() == "assignment_expression" {
            if let (Some(left), Some(right)) = (expr.field("left"), expr.field("right")) {
                if matches!(left.kind(), "object_pattern" | "array_pattern") {
                    for line in Destructuring::lower(left, right, BindingKind::Assign, ctx)? {
                        out.line(line);
                    }
                    return Ok(());
                }
            }
        }
        let text = ExpressionTranslator::translate(expr, ctx)?;
        out.line(format!("{};", text));
        Ok(())
    }

    /// `var`/`let` become `var`, `const` becomes `final`.
    fn declaration<'a>(
        node: Node<'a>,
        ctx: &mut EmitContext<'a>,
        out: &mut SourceWriter,
    ) -> Translated<()> {
        let kind = if node.has_token("const") {
            BindingKind::Final
        } else {
            BindingKind::Var
        };
        let keyword = if kind == BindingKind::Final { "final" } else { "var" };

        for declarator in node.named_children_vec() {
            if declarator.kind() != "variable_declarator" {
                continue;
            }
            let Some(name) = declarator.field("name") else {
                return Err(ctx.unsupported(declarator, "declarator without a name"));
            };
            let value = declarator.field("value");

            if name.kind() != "identifier" {
                let Some(value) = value else {
                    return Err(ctx.unsupported(declarator, "destructuring without an initializer"));
                };
                for line in Destructuring::lower(name, value, kind, ctx)? {
                    out.line(line);
                }
                continue;
            }

            ctx.bind_local(ctx.text(name));
            let ty = TypeTranslator::annotation_suffix(declarator.field("type"), ctx);
            let ident = sanitize_identifier(ctx.text(name));
            match value {
                Some(value) => {
                    let value = ExpressionTranslator::translate(value, ctx)?;
                    out.line(format!("{} {}{} = {};", keyword, ident, ty, value));
                }
                None => out.line(format!("{} {}{};", keyword, ident, ty)),
            }
        }
        Ok(())
    }

    fn if_statement<'a>(
        node: Node<'a>,
        ctx: &mut EmitContext<'a>,
        out: &mut SourceWriter,
    ) -> Translated<()> {
        let mut current = node;
        let mut header = format!("if {} {{", Self::condition(current, ctx)?);
        loop {
            out.line(&header);
            out.indent();
            Self::body(current.field("consequence"), ctx, out)?;
            out.dedent();

            let Some(alternative) = current.field("alternative") else {
                break;
            };
            let Some(next) = alternative.first_named() else {
                break;
            };
            if next.kind() == "if_statement" {
                current = next;
                header = format!("}} else if {} {{", Self::condition(current, ctx)?);
                continue;
            }
            out.line("} else {");
            out.indent();
            Self::body(Some(next), ctx, out)?;
            out.dedent();
            break;
        }
        out.line("}");
        Ok(())
    }

    /// `for (init; cond; inc) body` becomes `{ init; while (cond) { body; inc; } }`.
    fn for_statement<'a>(
        node: Node<'a>,
        ctx: &mut EmitContext<'a>,
        out: &mut SourceWriter,
    ) -> Translated<()> {
        ctx.push_scope();
        let result = Self::lower_for(node, ctx, out);
        ctx.pop_scope();
        result
    }

    fn lower_for<'a>(
        node: Node<'a>,
        ctx: &mut EmitContext<'a>,
        out: &mut SourceWriter,
    ) -> Translated<()> {
        out.line("{");
        out.indent();

        if let Some(init) = node.field("initializer") {
            match init.kind() {
                "lexical_declaration" | "variable_declaration" | "expression_statement" => {
                    Self::translate(init, ctx, out)?
                }
                "empty_statement" | ";" => {}
                _ => Self::expression_line(init, ctx, out)?,
            }
        }

        let condition = match node.field("condition") {
            Some(cond) if cond.kind() == "expression_statement" => match cond.first_named() {
                Some(expr) => ExpressionTranslator::translate(expr, ctx)?,
                None => "true".to_string(),
            },
            Some(cond) if cond.is_named() && cond.kind() != "empty_statement" => {
                ExpressionTranslator::translate(cond, ctx)?
            }
            _ => "true".to_string(),
        };

        out.line(format!("while {} {{", parens(condition)));
        Self::loop_body(node.field("body"), JumpTarget::Loop { lowered_for: true }, &[], ctx, out)?;
        if let Some(increment) = node.field("increment") {
            out.indent();
            Self::expression_line(increment, ctx, out)?;
            out.dedent();
        }
        out.line("}");

        out.dedent();
        out.line("}");
        Ok(())
    }

    /// `for..of` and `for..in` both become Haxe `for (x in ...)`.
    fn for_in_statement<'a>(
        node: Node<'a>,
        ctx: &mut EmitContext<'a>,
        out: &mut SourceWriter,
    ) -> Translated<()> {
        if node.has_token("await") {
            return Err(ctx.unsupported(node, "for await"));
        }
        let (Some(left), Some(right)) = (node.field("left"), node.field("right")) else {
            return Err(ctx.unsupported(node, "incomplete for header"));
        };
        let operator = node.field("operator").map(|op| ctx.text(op)).unwrap_or("of");

        let iterable = ExpressionTranslator::translate(right, ctx)?;
        let iterable = if operator == "in" {
            format!("Reflect.fields({})", iterable)
        } else {
            iterable
        };

        ctx.push_scope();
        let result = Self::for_in_loop(node, left, &iterable, ctx, out);
        ctx.pop_scope();
        result
    }

    fn for_in_loop<'a>(
        node: Node<'a>,
        left: Node<'a>,
        iterable: &str,
        ctx: &mut EmitContext<'a>,
        out: &mut SourceWriter,
    ) -> Translated<()> {
        let kind = if node.field("kind").is_some_and(|k| ctx.text(k) == "const") {
            BindingKind::Final
        } else {
            BindingKind::Var
        };
        let (variable, prelude) = match left.kind() {
            "identifier" => {
                ctx.bind_local(ctx.text(left));
                (sanitize_identifier(ctx.text(left)), Vec::new())
            }
            "object_pattern" | "array_pattern" => {
                let temp = ctx.fresh_temp();
                let prelude = Destructuring::lower_from(left, &temp, kind, ctx)?;
                (temp, prelude)
            }
            _ => return Err(ctx.unsupported(left, "for loop target")),
        };

        out.line(format!("for ({} in {}) {{", variable, iterable));
        Self::loop_body(
            node.field("body"),
            JumpTarget::Loop { lowered_for: false },
            &prelude,
            ctx,
            out,
        )?;
        out.line("}");
        Ok(())
    }

    fn switch_statement<'a>(
        node: Node<'a>,
        ctx: &mut EmitContext<'a>,
        out: &mut SourceWriter,
    ) -> Translated<()> {
        let (Some(value), Some(body)) = (node.field("value"), node.field("body")) else {
            return Err(ctx.unsupported(node, "incomplete switch"));
        };
        let subject = parens(ExpressionTranslator::translate(value, ctx)?);

        let mut groups: Vec<CaseGroup<'a>> = Vec::new();
        let mut labels: Vec<String> = Vec::new();
        let mut has_default = false;
        let mut first: Option<Node<'a>> = None;

        for case in body.named_children_vec() {
            first.get_or_insert(case);
            match case.kind() {
                "switch_case" => {
                    let Some(label) = case.field("value") else {
                        return Err(ctx.unsupported(case, "case without a value"));
                    };
                    labels.push(Self::case_label(label, ctx)?);
                }
                "switch_default" => has_default = true,
                _ => return Err(ctx.unsupported(case, "switch member")),
            }

            let statements = case.fields("body");
            if statements.is_empty() {
                continue;
            }
            groups.push(CaseGroup {
                node: first.take().unwrap_or(case),
                labels: std::mem::take(&mut labels),
                is_default: std::mem::take(&mut has_default),
                statements: flatten_case_body(statements),
            });
        }
        if let Some(node) = first {
            groups.push(CaseGroup {
                node,
                labels,
                is_default: has_default,
                statements: Vec::new(),
            });
        }

        for (index, group) in groups.iter().enumerate() {
            let is_last = index + 1 == groups.len();
            let terminated = group.statements.last().is_some_and(|last| terminates(*last));
            if !terminated && !is_last && !group.statements.is_empty() {
                return Err(ctx.unsupported(group.node, "case falls through into the next case"));
            }
        }

        out.line(format!("switch {} {{", subject));
        out.indent();
        let mut default_group: Option<&CaseGroup<'a>> = None;
        for group in &groups {
            if group.is_default {
                // Labels sharing the default body are already covered by `default:`.
                default_group = Some(group);
                continue;
            }
            out.line(format!("case {}:", group.labels.join(", ")));
            Self::case_body(group, ctx, out)?;
        }
        if let Some(group) = default_group {
            out.line("default:");
            Self::case_body(group, ctx, out)?;
        }
        out.dedent();
        out.line("}");
        Ok(())
    }

    fn case_body<'a>(
        group: &CaseGroup<'a>,
        ctx: &mut EmitContext<'a>,
        out: &mut SourceWriter,
    ) -> Translated<()> {
        let mut statements = group.statements.as_slice();
        if let Some((last, rest)) = statements.split_last() {
            if last.kind() == "break_statement" && last.field("label").is_none() {
                statements = rest;
            }
        }
        out.indent();
        ctx.push_scope();
        ctx.push_jump(JumpTarget::Switch);
        let result = Self::translate_statements(statements, ctx, out);
        ctx.pop_jump();
        ctx.pop_scope();
        out.dedent();
        result
    }

    /// Case values Haxe can match on: literals, negative numbers and dotted constant names.
    fn case_label<'a>(label: Node<'a>, ctx: &mut EmitContext<'a>) -> Translated<String> {
        match label.kind() {
            "number" | "string" | "true" | "false" | "null" => {
                ExpressionTranslator::translate(label, ctx)
            }
            "unary_expression"
                if label.field("operator").is_some_and(|op| ctx.text(op) == "-")
                    && label.field("argument").is_some_and(|arg| arg.kind() == "number") =>
            {
                Ok(ctx.text(label).replace(' ', ""))
            }
            "member_expression" if is_dotted_name(label) => ExpressionTranslator::translate(label, ctx),
            "parenthesized_expression" => match label.first_named() {
                Some(inner) => Self::case_label(inner, ctx),
                None => Err(ctx.unsupported(label, "empty case value")),
            },
            _ => Err(ctx.unsupported(label, "case value must be a literal or a dotted name")),
        }
    }

    fn try_statement<'a>(
        node: Node<'a>,
        ctx: &mut EmitContext<'a>,
        out: &mut SourceWriter,
    ) -> Translated<()> {
        if let Some(finalizer) = node.field("finalizer") {
            return Err(ctx.unsupported(finalizer, "finally"));
        }
        let Some(handler) = node.field("handler") else {
            return Err(ctx.unsupported(node, "try without catch"));
        };

        out.line("try {");
        out.indent();
        Self::body(node.field("body"), ctx, out)?;
        out.dedent();

        ctx.push_scope();
        let binding = match handler.field("parameter") {
            Some(param) if param.kind() == "identifier" => {
                ctx.bind_local(ctx.text(param));
                sanitize_identifier(ctx.text(param))
            }
            Some(param) => {
                ctx.pop_scope();
                return Err(ctx.unsupported(param, "destructured catch binding"));
            }
            None => "_".to_string(),
        };
        out.line(format!("}} catch ({}: Dynamic) {{", binding));
        out.indent();
        let result = Self::body(handler.field("body"), ctx, out);
        out.dedent();
        ctx.pop_scope();
        result?;
        out.line("}");
        Ok(())
    }
}

/// Cases sharing one body.
struct CaseGroup<'a> {
    node: Node<'a>,
    labels: Vec<String>,
    is_default: bool,
    statements: Vec<Node<'a>>,
}

fn flatten_case_body(statements: Vec<Node<'_>>) -> Vec<Node<'_>> {
    match statements.as_slice() {
        [only] if only.kind() == "statement_block" => only.named_children_vec(),
        _ => statements,
    }
}

fn terminates(statement: Node<'_>) -> bool {
    match statement.kind() {
        "break_statement" | "return_statement" | "throw_statement" | "continue_statement" => true,
        "statement_block" => statement
            .named_children_vec()
            .last()
            .is_some_and(|last| terminates(*last)),
        _ => false,
    }
}

fn is_dotted_name(node: Node<'_>) -> bool {
    match node.kind() {
        "identifier" | "property_identifier" => true,
        "member_expression" if !node.has_token("optional_chain") => {
            node.field("object").is_some_and(is_dotted_name)
                && node.field("property").is_some_and(is_dotted_name)
        }
        _ => false,
    }
}
