use crate::address::ModuleAddress;
use serde::Serialize;
use std::path::PathBuf;
use thiserror::Error;

/// A construct the translator cannot express in Haxe. Returning one abandons the whole file.
#[derive(Error, Debug, Clone, PartialEq, Eq, Serialize)]
#[error("unsupported {kind} at line {line}, column {column}: {detail}")]
pub struct Unsupported {
    pub kind: String,
    pub line: usize,
    pub column: usize,
    pub detail: String,
}

impl Unsupported {
    pub fn new(kind: impl Into<String>, line: usize, column: usize, detail: impl Into<String>) -> Self {
        Self {
            kind: kind.into(),
            line,
            column,
            detail: detail.into(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct HaxeFile {
    pub address: ModuleAddress,
    /// Relative to the output directory.
    pub output_path: PathBuf,
    pub text: String,
}

impl HaxeFile {
    pub fn new(address: ModuleAddress, text: String) -> Self {
        Self {
            output_path: address.output_relative_path(),
            address,
            text,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TranslationResult {
    Emitted(HaxeFile),
    Abandoned(Unsupported),
}

impl TranslationResult {
    pub fn is_emitted(&self) -> bool {
        matches!(self, TranslationResult::Emitted(_))
    }

    pub fn file(&self) -> Option<&HaxeFile> {
        match self {
            TranslationResult::Emitted(file) => Some(file),
            TranslationResult::Abandoned(_) => None,
        }
    }

    pub fn abandonment(&self) -> Option<&Unsupported> {
        match self {
            TranslationResult::Emitted(_) => None,
            TranslationResult::Abandoned(reason) => Some(reason),
        }
    }
}

impl From<Result<HaxeFile, Unsupported>> for TranslationResult {
    fn from(result: Result<HaxeFile, Unsupported>) -> Self {
        match result {
            Ok(file) => TranslationResult::Emitted(file),
            Err(reason) => TranslationResult::Abandoned(reason),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_unsupported_display() {
        let err = Unsupported::new("await_expression", 3, 5, "async code");
        assert_eq!(
            err.to_string(),
            "unsupported await_expression at line 3, column 5: async code"
        );
    }

    #[test]
    fn test_result_conversion() {
        let file = HaxeFile::new(ModuleAddress::new("app", "Main"), "package app;\n".into());
        assert_eq!(file.output_path, PathBuf::from("app/Main.hx"));

        let emitted: TranslationResult = Ok(file).into();
        assert!(emitted.is_emitted());

        let abandoned: TranslationResult = Err(Unsupported::new("regex", 1, 1, "")).into();
        assert_eq!(abandoned.abandonment().map(|u| u.kind.as_str()), Some("regex"));
        assert!(abandoned.file().is_none());
    }
}
