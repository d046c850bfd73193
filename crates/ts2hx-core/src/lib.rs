/*! Core data model for translating TypeScript projects into Haxe.
 *
 * Every file in a project needs to agree on where every other file lands in the Haxe package tree,
 * and on how foreign npm modules are bound. This crate holds those pure pieces: naming and module
 * addressing, the foreign-module registry, translation results, diagnostics and the indentation-aware
 * writer the translators render through.
 */

pub mod address;
pub mod diagnostics;
pub mod foreign;
pub mod format;
pub mod naming;
pub mod translation;

pub use address::{module_address, ModuleAddress};
pub use diagnostics::{Diagnostic, Severity};
pub use foreign::{
    ForeignModuleDescriptor, ForeignRegistry, ForeignRegistryBuilder, DEFAULT_MEMBER,
    EXTERN_PACKAGE,
};
pub use format::{quote_string, IndentStyle, SourceWriter};
pub use naming::{
    is_haxe_identifier, is_reserved_word, sanitize_identifier, strip_source_extension,
    to_haxe_module_name, to_haxe_package_path,
};
pub use translation::{HaxeFile, TranslationResult, Unsupported};
