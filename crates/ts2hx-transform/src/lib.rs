/*! Translate TypeScript source files into Haxe modules.
 *
 * TypeScript is structurally and gradually typed with ES modules; Haxe is nominal, class based and
 * package scoped. This crate walks each file's syntax tree and renders Haxe source text, lowering the
 * constructs Haxe cannot say directly (destructuring, default parameters, C-style `for`, `switch`
 * fallthrough, string-literal unions, dual type and value exports). A file that uses anything it
 * cannot express is abandoned as a whole rather than emitted partially.
 */

pub mod ts_to_hx;

pub use ts_to_hx::{
    collect_foreign_modules, translate_file, translate_unit, TranslateOptions, Unsupported,
};
