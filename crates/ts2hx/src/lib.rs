/*! TypeScript to Haxe, from one import.
 *
 * Loading a project, translating its files, binding its npm dependencies and writing the Haxe tree are
 * spread over four crates; this one re-exports the pieces most callers need.
 */

pub use ts2hx_core as core;
pub use ts2hx_emit as emit;
pub use ts2hx_parser as parser;
pub use ts2hx_transform as transform;

pub use ts2hx_core::{
    module_address, Diagnostic, ForeignRegistry, HaxeFile, IndentStyle, ModuleAddress, Severity,
    TranslationResult, Unsupported,
};

pub use ts2hx_emit::{EmitReport, EmitterConfig, OutputFormat, ProjectEmitter};

pub use ts2hx_parser::{Program, ProjectError};

pub use ts2hx_transform::{translate_file, translate_unit, TranslateOptions};

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use std::path::Path;

    #[test]
    fn test_single_file_translation() {
        let result = translate_file(
            Path::new("/tmp/scratch/shapes.ts"),
            "export const sides: number[] = [3, 4];\n",
            "geo",
        )
        .unwrap();
        let file = result.file().unwrap();
        assert_eq!(file.address, module_address(Path::new("shapes.ts"), "geo"));
        assert_eq!(file.address.qualified_name(), "geo.Shapes");
        assert_eq!(file.text, "package geo;\n\nfinal sides: Array<Float> = [3, 4];\n");
    }
}
