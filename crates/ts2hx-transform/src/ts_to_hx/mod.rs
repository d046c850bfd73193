/*! Translate one TypeScript file into one Haxe module.
 *
 * The walk is split the way the languages are: types, expressions, statements and top-level
 * declarations each get a translator, and the module resolver decides how names that cross file
 * boundaries are spelled. Every translator returns `Result<_, Unsupported>`, so the first construct
 * without a Haxe rendering unwinds the whole file and nothing partial is ever produced.
 */

mod builtins;
mod context;
mod declaration_translator;
mod destructuring;
mod errors;
mod expression_translator;
mod module_resolver;
mod statement_translator;
mod type_translator;

use anyhow::Result;
use context::EmitContext;
use declaration_translator::DeclarationTranslator;
use errors::Translated;
use module_resolver::ModuleResolver;
use std::path::Path;
use tracing::{debug, warn};
use ts2hx_core::{ForeignRegistry, HaxeFile, IndentStyle, TranslationResult};
use ts2hx_parser::Program;

pub use errors::Unsupported;
pub use module_resolver::collect_foreign_modules;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TranslateOptions {
    pub indent_unit: String,
}

impl TranslateOptions {
    pub fn new(indent: &IndentStyle) -> Self {
        Self {
            indent_unit: indent.unit(),
        }
    }
}

impl Default for TranslateOptions {
    fn default() -> Self {
        Self::new(&IndentStyle::default())
    }
}

/// Translates the file at `index`. The registry must already hold every foreign module the
/// program references.
pub fn translate_unit(
    program: &Program,
    registry: &ForeignRegistry,
    index: usize,
    options: &TranslateOptions,
) -> TranslationResult {
    let unit = program.unit(index);
    let mut ctx = EmitContext::new(program, registry, index, options.indent_unit.clone());

    match render_module(&mut ctx) {
        Ok(text) => {
            debug!(
                file = %unit.relative_path.display(),
                module = %unit.address,
                "translated"
            );
            TranslationResult::Emitted(HaxeFile::new(unit.address.clone(), text))
        }
        Err(reason) => {
            warn!(
                file = %unit.relative_path.display(),
                kind = %reason.kind,
                line = reason.line,
                column = reason.column,
                "file abandoned: {}",
                reason.detail
            );
            TranslationResult::Abandoned(reason)
        }
    }
}

/// Translates a single standalone file, mostly useful for tests and quick experiments.
/// Relative imports must resolve to files of the same one-file program, so they abandon it.
pub fn translate_file(path: &Path, source: &str, base_package: &str) -> Result<TranslationResult> {
    let root = path.parent().unwrap_or_else(|| Path::new(""));
    let file_name = path.file_name().map(Path::new).unwrap_or(path);
    let program = Program::from_sources(
        root,
        base_package,
        vec![(file_name.to_path_buf(), source.to_string())],
    )?;
    let registry = collect_foreign_modules(&program)
        .finish_around(base_package, program.units().iter().map(|unit| &unit.address));

    let (index, _) = program
        .translatable_units()
        .next()
        .ok_or_else(|| anyhow::anyhow!("{} is not a translatable source file", path.display()))?;
    Ok(translate_unit(
        &program,
        &registry,
        index,
        &TranslateOptions::default(),
    ))
}

fn render_module(ctx: &mut EmitContext<'_>) -> Translated<String> {
    let imports = ModuleResolver::resolve_imports(ctx)?;

    let mut items = Vec::new();
    for statement in ctx.unit().top_level_statements() {
        items.extend(DeclarationTranslator::top_level(statement, ctx)?);
    }
    items.extend(DeclarationTranslator::export_aliases(ctx)?);

    let mut text = ctx.unit().address.package_declaration();
    text.push_str("\n\n");
    if !imports.is_empty() {
        text.push_str(&imports.join("\n"));
        text.push_str("\n\n");
    }
    text.push_str(&items.join("\n\n"));

    let trimmed = text.trim_end().len();
    text.truncate(trimmed);
    text.push('\n');
    Ok(text)
}

#[cfg(test)]
mod tests;
