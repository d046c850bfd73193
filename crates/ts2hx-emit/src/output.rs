//! Whole-file writes and report formatting.

use anyhow::{anyhow, Context, Result};
use colored::Colorize;
use serde::Serialize;
use std::fs;
use std::io::Write;
use std::path::Path;
use tempfile::NamedTempFile;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum OutputFormat {
    #[default]
    Text,
    Json,
}

/// Writes `text` to `path` through a temporary file in the same directory and an atomic rename, so
/// readers only ever see the previous contents or the new ones. Returns `false` when the file already
/// held exactly `text` and was left untouched.
pub fn write_atomic(path: &Path, text: &str) -> Result<bool> {
    if fs::read(path).is_ok_and(|existing| existing == text.as_bytes()) {
        return Ok(false);
    }
    let dir = path
        .parent()
        .ok_or_else(|| anyhow!("{} has no parent directory", path.display()))?;
    fs::create_dir_all(dir).with_context(|| format!("Failed to create {}", dir.display()))?;

    let mut temp = NamedTempFile::new_in(dir)
        .with_context(|| format!("Failed to create a temporary file in {}", dir.display()))?;
    temp.write_all(text.as_bytes())
        .with_context(|| format!("Failed to write {}", path.display()))?;
    temp.persist(path)
        .map_err(|err| err.error)
        .with_context(|| format!("Failed to replace {}", path.display()))?;
    Ok(true)
}

/// Removes a previous run's output for a file that produced none this run.
pub fn remove_stale(path: &Path) -> Result<bool> {
    match fs::remove_file(path) {
        Ok(()) => Ok(true),
        Err(err) if err.kind() == std::io::ErrorKind::NotFound => Ok(false),
        Err(err) => Err(err).with_context(|| format!("Failed to remove {}", path.display())),
    }
}

pub fn clean_dir(dir: &Path) -> Result<()> {
    match fs::remove_dir_all(dir) {
        Ok(()) => Ok(()),
        Err(err) if err.kind() == std::io::ErrorKind::NotFound => Ok(()),
        Err(err) => Err(err).with_context(|| format!("Failed to clean {}", dir.display())),
    }
}

pub trait OutputFormatter {
    fn format_section(&self, title: &str) -> String;

    fn format_pair(&self, key: &str, value: &str) -> String;

    fn format_list(&self, items: &[String]) -> String;
}

pub struct TextFormatter {
    pub use_colors: bool,
}

impl TextFormatter {
    pub fn new(use_colors: bool) -> Self {
        Self { use_colors }
    }

    /// Paints `text` when colors are on; `status` picks the palette.
    pub fn paint(&self, text: &str, status: Status) -> String {
        if !self.use_colors {
            return text.to_string();
        }
        match status {
            Status::Ok => text.bright_green().to_string(),
            Status::Warning => text.yellow().to_string(),
            Status::Error => text.bright_red().bold().to_string(),
            Status::Heading => text.bright_blue().bold().to_string(),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Status {
    Ok,
    Warning,
    Error,
    Heading,
}

impl OutputFormatter for TextFormatter {
    fn format_section(&self, title: &str) -> String {
        self.paint(title, Status::Heading)
    }

    fn format_pair(&self, key: &str, value: &str) -> String {
        format!("{}: {}", key, value)
    }

    fn format_list(&self, items: &[String]) -> String {
        items
            .iter()
            .map(|item| format!("  - {}", item))
            .collect::<Vec<_>>()
            .join("\n")
    }
}

pub struct JsonFormatter;

impl JsonFormatter {
    pub fn format_object<W: Write, T: Serialize>(writer: &mut W, value: &T) -> Result<()> {
        serde_json::to_writer_pretty(writer, value)?;
        Ok(())
    }

    pub fn to_string<T: Serialize>(value: &T) -> Result<String> {
        let mut buffer = Vec::new();
        Self::format_object(&mut buffer, value)?;
        buffer.push(b'\n');
        Ok(String::from_utf8(buffer)?)
    }
}
