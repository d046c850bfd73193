use std::path::PathBuf;
use thiserror::Error;
use ts2hx_core::{Diagnostic, ModuleAddress};

/// Fatal problems loading a project. Nothing is translated when one of these is returned.
#[derive(Error, Debug)]
pub enum ProjectError {
    #[error("Failed to read {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Malformed config {path}: {message}")]
    MalformedConfig { path: PathBuf, message: String },

    #[error("Config {path} extends {extends}, which could not be found")]
    MissingBaseConfig { path: PathBuf, extends: String },

    #[error("Config extends chain loops back to {0}")]
    CircularExtends(PathBuf),

    #[error("Invalid pattern {pattern}: {message}")]
    InvalidPattern { pattern: String, message: String },

    #[error("No inputs were found in config file {0}")]
    NoInputs(PathBuf),

    #[error("Failed to load TypeScript grammar: {0}")]
    Grammar(String),

    #[error("Syntax error in {path} at line {line}, column {column}")]
    Syntax {
        path: PathBuf,
        line: usize,
        column: usize,
    },

    #[error("File {path} is not under rootDir {root_dir}")]
    OutsideRootDir { path: PathBuf, root_dir: PathBuf },

    #[error("{first} and {second} both map to Haxe module {address}")]
    AddressCollision {
        first: PathBuf,
        second: PathBuf,
        address: ModuleAddress,
    },
}

impl ProjectError {
    pub fn diagnostic(&self) -> Diagnostic {
        match self {
            ProjectError::Io { path, .. }
            | ProjectError::MalformedConfig { path, .. }
            | ProjectError::MissingBaseConfig { path, .. }
            | ProjectError::OutsideRootDir { path, .. } => {
                Diagnostic::error(self.to_string()).with_file(path)
            }
            ProjectError::Syntax { path, line, column } => {
                Diagnostic::error("syntax error").with_file(path).at(*line, *column)
            }
            ProjectError::AddressCollision { second, .. } => {
                Diagnostic::error(self.to_string()).with_file(second)
            }
            _ => Diagnostic::error(self.to_string()),
        }
    }
}
