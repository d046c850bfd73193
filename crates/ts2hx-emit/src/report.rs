use crate::output::{JsonFormatter, OutputFormat, OutputFormatter, Status, TextFormatter};
use anyhow::Result;
use serde::Serialize;
use std::path::PathBuf;
use ts2hx_core::{Diagnostic, Unsupported};

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct WrittenFile {
    /// Root-relative source path; `None` for extern classes.
    pub source: Option<PathBuf>,
    /// Relative to the output directory.
    pub output: PathBuf,
    pub module: String,
    /// `false` when the file on disk already had these contents.
    pub changed: bool,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct AbandonedFile {
    pub source: PathBuf,
    pub reason: Unsupported,
    /// A previous run's output that was removed.
    pub removed: Option<PathBuf>,
}

/// What one run produced.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct EmitReport {
    pub out_dir: PathBuf,
    pub written: Vec<WrittenFile>,
    pub abandoned: Vec<AbandonedFile>,
    pub externs: Vec<WrittenFile>,
}

impl EmitReport {
    pub fn new(out_dir: impl Into<PathBuf>) -> Self {
        Self {
            out_dir: out_dir.into(),
            ..Self::default()
        }
    }

    pub fn diagnostics(&self) -> Vec<Diagnostic> {
        abandonment_diagnostics(self.abandoned.iter().map(|a| (&a.source, &a.reason)))
    }

    pub fn render(&self, format: OutputFormat, use_colors: bool) -> Result<String> {
        match format {
            OutputFormat::Json => JsonFormatter::to_string(self),
            OutputFormat::Text => Ok(self.render_text(&TextFormatter::new(use_colors))),
        }
    }

    fn render_text(&self, formatter: &TextFormatter) -> String {
        let mut sections = Vec::new();

        let written: Vec<String> = self
            .written
            .iter()
            .map(|file| {
                let source = file
                    .source
                    .as_ref()
                    .map(|s| s.display().to_string())
                    .unwrap_or_default();
                format!("{} -> {}", source, file.output.display())
            })
            .collect();
        if !written.is_empty() {
            sections.push(format!(
                "{}\n{}",
                formatter.format_section("Translated"),
                formatter.format_list(&written)
            ));
        }

        if !self.externs.is_empty() {
            let externs: Vec<String> = self
                .externs
                .iter()
                .map(|file| format!("{} ({})", file.module, file.output.display()))
                .collect();
            sections.push(format!(
                "{}\n{}",
                formatter.format_section("Extern bindings"),
                formatter.format_list(&externs)
            ));
        }

        if !self.abandoned.is_empty() {
            let abandoned: Vec<String> = self
                .abandoned
                .iter()
                .map(|file| {
                    format!(
                        "{}:{}:{} {}",
                        file.source.display(),
                        file.reason.line,
                        file.reason.column,
                        formatter.paint(&file.reason.to_string(), Status::Warning)
                    )
                })
                .collect();
            sections.push(format!(
                "{}\n{}",
                formatter.format_section("Abandoned"),
                formatter.format_list(&abandoned)
            ));
        }

        let summary = format!(
            "{} {}, {} {}, {} {}",
            self.written.len(),
            plural(self.written.len(), "file", "files"),
            self.externs.len(),
            plural(self.externs.len(), "extern", "externs"),
            self.abandoned.len(),
            "abandoned"
        );
        let status = if self.abandoned.is_empty() {
            Status::Ok
        } else {
            Status::Warning
        };
        sections.push(formatter.format_pair(
            &formatter.paint("Done", status),
            &format!("{} in {}", summary, self.out_dir.display()),
        ));
        let mut text = sections.join("\n\n");
        text.push('\n');
        text
    }
}

/// One warning per abandoned file, positioned at the construct that stopped it.
pub fn abandonment_diagnostics<'a>(
    files: impl Iterator<Item = (&'a PathBuf, &'a Unsupported)>,
) -> Vec<Diagnostic> {
    files
        .map(|(source, reason)| {
            Diagnostic::warning(format!("file abandoned: {}", reason))
                .with_file(source)
                .at(reason.line, reason.column)
        })
        .collect()
}

fn plural(count: usize, one: &'static str, many: &'static str) -> &'static str {
    if count == 1 {
        one
    } else {
        many
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    fn sample() -> EmitReport {
        let mut report = EmitReport::new("hx-out");
        report.written.push(WrittenFile {
            source: Some(PathBuf::from("main.ts")),
            output: PathBuf::from("app/Main.hx"),
            module: "app.Main".to_string(),
            changed: true,
        });
        report.abandoned.push(AbandonedFile {
            source: PathBuf::from("util.ts"),
            reason: Unsupported::new("await_expression", 3, 10, "await"),
            removed: None,
        });
        report
    }

    #[test]
    fn test_plain_text_report() {
        let text = sample().render(OutputFormat::Text, false).unwrap();
        assert_eq!(
            text,
            "Translated\n  - main.ts -> app/Main.hx\n\n\
             Abandoned\n  - util.ts:3:10 unsupported await_expression at line 3, column 10: await\n\n\
             Done: 1 file, 0 externs, 1 abandoned in hx-out\n"
        );
    }

    #[test]
    fn test_json_report() {
        let text = sample().render(OutputFormat::Json, false).unwrap();
        let value: serde_json::Value = serde_json::from_str(&text).unwrap();
        assert_eq!(value["written"][0]["module"], "app.Main");
        assert_eq!(value["abandoned"][0]["reason"]["kind"], "await_expression");
        assert_eq!(value["abandoned"][0]["reason"]["line"], 3);
    }

    #[test]
    fn test_abandonment_diagnostics() {
        let diagnostics = sample().diagnostics();
        assert_eq!(diagnostics.len(), 1);
        assert_eq!(
            diagnostics[0].to_string(),
            "warning: util.ts:3:10: file abandoned: unsupported await_expression at line 3, column 10: await"
        );
    }
}
