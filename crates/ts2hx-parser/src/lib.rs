/*! Load a TypeScript project into a program model.
 *
 * Translation needs more than one syntax tree: it needs to know which files make up the project, where
 * each lands in the Haxe package tree, and what each imports and exports. This crate reads
 * `tsconfig.json` (comments and trailing commas included), discovers and parses the sources with the
 * tree-sitter TypeScript grammars, and resolves module specifiers between them.
 */

pub mod errors;
pub mod jsonc;
pub mod literal;
pub mod program;
pub mod source_unit;
pub mod surface;
pub mod syntax;
pub mod tsconfig;

pub use errors::ProjectError;
pub use program::{is_relative_specifier, normalize_path, ModuleTarget, Program};
pub use source_unit::{SourceKind, SourceUnit};
pub use surface::{
    DeclKind, DefaultExport, ExportEntry, ExportSurface, ImportBinding, ImportedName, ReExport,
};
pub use syntax::NodeExt;
pub use tsconfig::{ResolvedConfig, TsConfig};
