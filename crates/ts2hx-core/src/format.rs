use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum IndentStyle {
    Spaces(usize),
    Tabs,
}

impl IndentStyle {
    pub fn unit(&self) -> String {
        match self {
            IndentStyle::Spaces(n) => " ".repeat(*n),
            IndentStyle::Tabs => "\t".to_string(),
        }
    }
}

impl Default for IndentStyle {
    fn default() -> Self {
        IndentStyle::Spaces(2)
    }
}

/// Quotes a decoded string as a Haxe double-quoted literal.
pub fn quote_string(value: &str) -> String {
    let json =
        serde_json::to_string(value).unwrap_or_else(|_| format!("\"{}\"", value.escape_default()));
    // JSON's `\b` and `\f` have no Haxe spelling.
    let mut out = String::with_capacity(json.len());
    let mut chars = json.chars();
    while let Some(c) = chars.next() {
        if c != '\\' {
            out.push(c);
            continue;
        }
        match chars.next() {
            Some('b') => out.push_str("\\x08"),
            Some('f') => out.push_str("\\x0C"),
            Some(escaped) => {
                out.push('\\');
                out.push(escaped);
            }
            None => out.push('\\'),
        }
    }
    out
}

/// Line-oriented writer for generated source.
///
/// Text handed to [`SourceWriter::line`] may span several lines; each one is placed at the current
/// indentation, which is how nested function bodies rendered elsewhere are spliced in.
#[derive(Debug, Clone)]
pub struct SourceWriter {
    indent_unit: String,
    indent_level: usize,
    lines: Vec<String>,
}

impl SourceWriter {
    pub fn new(indent_unit: impl Into<String>) -> Self {
        Self {
            indent_unit: indent_unit.into(),
            indent_level: 0,
            lines: Vec::new(),
        }
    }

    pub fn indent_unit(&self) -> &str {
        &self.indent_unit
    }

    pub fn indent(&mut self) {
        self.indent_level += 1;
    }

    pub fn dedent(&mut self) {
        if self.indent_level > 0 {
            self.indent_level -= 1;
        }
    }

    pub fn get_indent(&self) -> String {
        self.indent_unit.repeat(self.indent_level)
    }

    pub fn line(&mut self, text: impl AsRef<str>) {
        let indent = self.get_indent();
        for part in text.as_ref().split('\n') {
            if part.is_empty() {
                self.lines.push(String::new());
            } else {
                self.lines.push(format!("{}{}", indent, part));
            }
        }
    }

    pub fn blank(&mut self) {
        self.lines.push(String::new());
    }

    /// Writes `header {`, the indented body, then `}`.
    pub fn write_block<E, F>(&mut self, header: &str, body: F) -> Result<(), E>
    where
        F: FnOnce(&mut Self) -> Result<(), E>,
    {
        self.line(format!("{} {{", header));
        self.indent();
        let result = body(self);
        self.dedent();
        self.line("}");
        result
    }

    pub fn lines(&self) -> &[String] {
        &self.lines
    }

    pub fn is_empty(&self) -> bool {
        self.lines.is_empty()
    }

    pub fn finish(self) -> String {
        self.lines.join("\n")
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn test_writer_indentation() {
        let mut w = SourceWriter::new("  ");
        assert_eq!(w.get_indent(), "");

        w.indent();
        assert_eq!(w.get_indent(), "  ");
        w.indent();
        assert_eq!(w.get_indent(), "    ");

        w.dedent();
        w.dedent();
        w.dedent();
        assert_eq!(w.get_indent(), "");
    }

    #[test]
    fn test_multi_line_text_is_reindented() {
        let mut w = SourceWriter::new("  ");
        w.indent();
        w.line("var f = function() {\n  return 1;\n};");
        assert_eq!(w.finish(), "  var f = function() {\n    return 1;\n  };");
    }

    #[test]
    fn test_write_block() {
        let mut w = SourceWriter::new("\t");
        let result: Result<(), ()> = w.write_block("while (true)", |w| {
            w.line("break;");
            Ok(())
        });
        assert!(result.is_ok());
        assert_eq!(w.finish(), "while (true) {\n\tbreak;\n}");
    }

    #[test]
    fn test_indent_style_units() {
        assert_eq!(IndentStyle::default().unit(), "  ");
        assert_eq!(IndentStyle::Spaces(4).unit(), "    ");
        assert_eq!(IndentStyle::Tabs.unit(), "\t");
    }

    #[test]
    fn test_quote_string_escapes() {
        assert_eq!(quote_string("plain"), "\"plain\"");
        assert_eq!(quote_string("a\"b\\c\nd"), "\"a\\\"b\\\\c\\nd\"");
        assert_eq!(quote_string("$name"), "\"$name\"");
        assert_eq!(quote_string("a\u{8}b\u{c}c"), "\"a\\x08b\\x0Cc\"");
        assert_eq!(quote_string("\\b"), "\"\\\\b\"");
    }
}
