//! Extern classes binding foreign npm modules.

use ts2hx_core::{
    quote_string, ForeignModuleDescriptor, HaxeFile, ModuleAddress, SourceWriter, DEFAULT_MEMBER,
};

/// Renders the `@:jsRequire` extern class for one foreign module.
///
/// Only what the project actually references is declared: the default export when some file imports
/// it, and one static per named member. Members whose JavaScript name is not a Haxe identifier keep
/// it through `@:native`.
pub fn render_extern(
    descriptor: &ForeignModuleDescriptor,
    address: &ModuleAddress,
    indent_unit: &str,
) -> HaxeFile {
    let mut out = SourceWriter::new(indent_unit);
    out.line(address.package_declaration());
    out.blank();
    out.line(format!(
        "@:jsRequire({}) extern class {} {{",
        quote_string(&descriptor.specifier),
        address.module_name
    ));
    out.indent();
    if descriptor.requires_default {
        out.line(format!("@:native(\"default\") static var {}: Dynamic;", DEFAULT_MEMBER));
    }
    for member in &descriptor.members {
        let name = ForeignModuleDescriptor::binding_name(member);
        if &name == member {
            out.line(format!("static var {}: Dynamic;", name));
        } else {
            out.line(format!("@:native({}) static var {}: Dynamic;", quote_string(member), name));
        }
    }
    out.dedent();
    out.line("}");

    let mut text = out.finish();
    text.push('\n');
    HaxeFile::new(address.clone(), text)
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn test_default_and_members() {
        let mut descriptor = ForeignModuleDescriptor::new("express");
        descriptor.require_default();
        descriptor.add_member("json");
        descriptor.add_member("static");

        let file = render_extern(
            &descriptor,
            &ModuleAddress::new("app.externs", "Express"),
            "  ",
        );
        assert_eq!(
            file.text,
            r#"package app.externs;

@:jsRequire("express") extern class Express {
  @:native("default") static var __default: Dynamic;
  static var json: Dynamic;
  @:native("static") static var static_: Dynamic;
}
"#
        );
        assert_eq!(
            file.output_path,
            std::path::PathBuf::from("app/externs/Express.hx")
        );
    }

    #[test]
    fn test_root_package_externs() {
        let mut descriptor = ForeignModuleDescriptor::new("@scope/some-lib");
        descriptor.add_member("content-type");

        let file = render_extern(&descriptor, &ModuleAddress::new("externs", "ScopeSomeLib"), "\t");
        assert_eq!(
            file.text,
            "package externs;\n\n@:jsRequire(\"@scope/some-lib\") extern class ScopeSomeLib {\n\t@:native(\"content-type\") static var content_type: Dynamic;\n}\n"
        );
    }
}
