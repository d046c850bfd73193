//! Identifier and module-name rules for generated Haxe code.

/// Haxe keywords that cannot be used as identifiers.
pub const RESERVED_WORDS: &[&str] = &[
    "abstract",
    "break",
    "case",
    "cast",
    "catch",
    "class",
    "continue",
    "default",
    "do",
    "dynamic",
    "else",
    "enum",
    "extends",
    "extern",
    "false",
    "final",
    "for",
    "function",
    "if",
    "implements",
    "import",
    "in",
    "inline",
    "interface",
    "macro",
    "new",
    "null",
    "operator",
    "overload",
    "override",
    "package",
    "private",
    "public",
    "return",
    "static",
    "switch",
    "this",
    "throw",
    "true",
    "try",
    "typedef",
    "untyped",
    "using",
    "var",
    "while",
];

const SOURCE_EXTENSIONS: &[&str] = &[
    ".d.ts", ".d.mts", ".d.cts", ".tsx", ".ts", ".mts", ".cts", ".jsx", ".js", ".mjs", ".cjs",
];

pub fn is_reserved_word(name: &str) -> bool {
    RESERVED_WORDS.contains(&name)
}

/// True when `name` can be emitted verbatim as a Haxe field or variable name.
pub fn is_haxe_identifier(name: &str) -> bool {
    let mut chars = name.chars();
    match chars.next() {
        Some(c) if c.is_ascii_alphabetic() || c == '_' => {}
        _ => return false,
    }
    chars.all(|c| c.is_ascii_alphanumeric() || c == '_') && !is_reserved_word(name)
}

/// Maps any string onto a legal Haxe identifier.
///
/// Illegal characters become `_`, a leading digit gets a `_` prefix and reserved words get a `_`
/// suffix. Legal identifiers come back unchanged, so the mapping is stable across files.
pub fn sanitize_identifier(name: &str) -> String {
    let mut out: String = name
        .chars()
        .map(|c| {
            if c.is_ascii_alphanumeric() || c == '_' {
                c
            } else {
                '_'
            }
        })
        .collect();

    if out.is_empty() {
        return "_".to_string();
    }
    if out.starts_with(|c: char| c.is_ascii_digit()) {
        out.insert(0, '_');
    }
    if is_reserved_word(&out) {
        out.push('_');
    }
    out
}

/// Turns a file basename (or any string) into a Haxe module name.
///
/// Words are split on anything that is not an ASCII letter or digit, title-cased and joined. Leading
/// digits are dropped since Haxe type names must start with a letter. The result is never empty.
pub fn to_haxe_module_name(file_base: &str) -> String {
    let joined: String = file_base
        .split(|c: char| !c.is_ascii_alphanumeric())
        .filter(|word| !word.is_empty())
        .map(capitalize)
        .collect();

    let stripped = joined.trim_start_matches(|c: char| c.is_ascii_digit());
    if stripped.is_empty() {
        return "Module".to_string();
    }
    capitalize(stripped)
}

/// Joins non-empty, trimmed segments into a dotted package path.
pub fn to_haxe_package_path<S: AsRef<str>>(segments: &[S]) -> String {
    segments
        .iter()
        .map(|segment| segment.as_ref().trim())
        .filter(|segment| !segment.is_empty())
        .collect::<Vec<_>>()
        .join(".")
}

/// Removes a TypeScript or JavaScript source extension, `.d.ts` included.
pub fn strip_source_extension(file_name: &str) -> &str {
    let lower = file_name.to_ascii_lowercase();
    for ext in SOURCE_EXTENSIONS {
        if lower.ends_with(ext) && lower.len() > ext.len() {
            return &file_name[..file_name.len() - ext.len()];
        }
    }
    file_name
}

fn capitalize(word: &str) -> String {
    let mut chars = word.chars();
    match chars.next() {
        Some(first) => first.to_ascii_uppercase().to_string() + chars.as_str(),
        None => String::new(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn test_module_name_title_cases_words() {
        assert_eq!(to_haxe_module_name("todo"), "Todo");
        assert_eq!(to_haxe_module_name("my-file"), "MyFile");
        assert_eq!(to_haxe_module_name("snake_case name"), "SnakeCaseName");
        assert_eq!(to_haxe_module_name("GET"), "GET");
    }

    #[test]
    fn test_module_name_edge_cases() {
        assert_eq!(to_haxe_module_name(""), "Module");
        assert_eq!(to_haxe_module_name("---"), "Module");
        assert_eq!(to_haxe_module_name("123"), "Module");
        assert_eq!(to_haxe_module_name("1abc"), "Abc");
        assert_eq!(to_haxe_module_name("@scope/pkg"), "ScopePkg");
    }

    #[test]
    fn test_sanitize_identifier() {
        assert_eq!(sanitize_identifier("value"), "value");
        assert_eq!(sanitize_identifier("with-dash"), "with_dash");
        assert_eq!(sanitize_identifier("$el"), "_el");
        assert_eq!(sanitize_identifier("9lives"), "_9lives");
        assert_eq!(sanitize_identifier("dynamic"), "dynamic_");
        assert_eq!(sanitize_identifier(""), "_");
    }

    #[test]
    fn test_identifier_checks() {
        assert!(is_haxe_identifier("ok_name1"));
        assert!(!is_haxe_identifier("cast"));
        assert!(!is_haxe_identifier("1x"));
        assert!(!is_haxe_identifier("my-key"));
        assert!(is_reserved_word("untyped"));
    }

    #[test]
    fn test_package_path_drops_empty_segments() {
        assert_eq!(to_haxe_package_path(&["app", "", " models "]), "app.models");
        assert_eq!(to_haxe_package_path::<&str>(&[]), "");
    }

    #[test]
    fn test_strip_source_extension() {
        assert_eq!(strip_source_extension("todo.ts"), "todo");
        assert_eq!(strip_source_extension("view.tsx"), "view");
        assert_eq!(strip_source_extension("globals.d.ts"), "globals");
        assert_eq!(strip_source_extension("legacy.JS"), "legacy");
        assert_eq!(strip_source_extension("README"), "README");
    }
}
