use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use ts2hx_core::IndentStyle;

pub const DEFAULT_OUT_DIR: &str = "hx-out";

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct EmitterConfig {
    pub out_dir: PathBuf,
    /// Dotted package every generated module lives under; empty means the root package.
    pub base_package: String,
    pub indent_style: IndentStyle,
    /// Remove the whole output directory before writing.
    pub clean: bool,
    pub use_colors: bool,
}

impl Default for EmitterConfig {
    fn default() -> Self {
        Self {
            out_dir: PathBuf::from(DEFAULT_OUT_DIR),
            base_package: String::new(),
            indent_style: IndentStyle::default(),
            clean: false,
            use_colors: true,
        }
    }
}

impl EmitterConfig {
    pub fn with_out_dir(mut self, out_dir: impl AsRef<Path>) -> Self {
        self.out_dir = out_dir.as_ref().to_path_buf();
        self
    }

    pub fn with_base_package(mut self, base_package: impl Into<String>) -> Self {
        self.base_package = base_package.into();
        self
    }

    pub fn with_clean(mut self, clean: bool) -> Self {
        self.clean = clean;
        self
    }

    pub fn with_colors(mut self, use_colors: bool) -> Self {
        self.use_colors = use_colors;
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_partial_config_uses_defaults() {
        let config: EmitterConfig =
            serde_json::from_str(r#"{ "base_package": "app", "clean": true }"#).unwrap();
        assert_eq!(config.base_package, "app");
        assert!(config.clean);
        assert_eq!(config.out_dir, PathBuf::from("hx-out"));
        assert_eq!(config.indent_style, IndentStyle::Spaces(2));
    }
}
