use crate::naming::{strip_source_extension, to_haxe_module_name, to_haxe_package_path};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::path::{Component, Path, PathBuf};

/// Where a source file lands in the Haxe package tree.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct ModuleAddress {
    pub package_path: String,
    pub module_name: String,
}

impl ModuleAddress {
    pub fn new(package_path: impl Into<String>, module_name: impl Into<String>) -> Self {
        Self {
            package_path: package_path.into(),
            module_name: module_name.into(),
        }
    }

    /// `pkg.sub.Module`, or just `Module` in the root package.
    pub fn qualified_name(&self) -> String {
        if self.package_path.is_empty() {
            self.module_name.clone()
        } else {
            format!("{}.{}", self.package_path, self.module_name)
        }
    }

    /// Path to a member of this module. A member named like the module is its primary type.
    pub fn member_path(&self, member: &str) -> String {
        if member == self.module_name {
            self.qualified_name()
        } else {
            format!("{}.{}", self.qualified_name(), member)
        }
    }

    pub fn package_declaration(&self) -> String {
        if self.package_path.is_empty() {
            "package;".to_string()
        } else {
            format!("package {};", self.package_path)
        }
    }

    /// `<package segments>/<Module>.hx`, relative to the output directory.
    pub fn output_relative_path(&self) -> PathBuf {
        let mut path = PathBuf::new();
        for segment in self.package_path.split('.').filter(|s| !s.is_empty()) {
            path.push(segment);
        }
        path.push(format!("{}.hx", self.module_name));
        path
    }
}

impl fmt::Display for ModuleAddress {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.qualified_name())
    }
}

/// Computes the address of a file from its root-relative path.
///
/// This is a pure function of its inputs, so an importer and the imported file always agree on the
/// imported file's address.
pub fn module_address(relative_path: &Path, base_package: &str) -> ModuleAddress {
    let mut segments: Vec<String> = relative_path
        .components()
        .filter_map(|component| match component {
            Component::Normal(part) => Some(part.to_string_lossy().into_owned()),
            _ => None,
        })
        .collect();

    let file_name = segments.pop().unwrap_or_default();
    let module_name = to_haxe_module_name(strip_source_extension(&file_name));

    let mut package: Vec<String> = base_package
        .split('.')
        .filter(|part| !part.trim().is_empty())
        .map(str::to_string)
        .collect();
    package.extend(segments);

    ModuleAddress {
        package_path: to_haxe_package_path(&package),
        module_name,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use std::collections::HashSet;

    #[test]
    fn test_address_with_base_package() {
        let address = module_address(Path::new("models/todo.ts"), "app");
        assert_eq!(address.package_path, "app.models");
        assert_eq!(address.module_name, "Todo");
        assert_eq!(address.qualified_name(), "app.models.Todo");
        assert_eq!(address.package_declaration(), "package app.models;");
    }

    #[test]
    fn test_address_in_root_package() {
        let address = module_address(Path::new("main.ts"), "");
        assert_eq!(address.package_path, "");
        assert_eq!(address.qualified_name(), "Main");
        assert_eq!(address.package_declaration(), "package;");
        assert_eq!(address.output_relative_path(), PathBuf::from("Main.hx"));
    }

    #[test]
    fn test_base_package_drops_empty_parts() {
        let address = module_address(Path::new("util/string-helpers.tsx"), "com..example.");
        assert_eq!(address.qualified_name(), "com.example.util.StringHelpers");
        assert_eq!(
            address.output_relative_path(),
            PathBuf::from("com/example/util/StringHelpers.hx")
        );
    }

    #[test]
    fn test_member_path_uses_module_for_primary_type() {
        let address = module_address(Path::new("models/todo.ts"), "app");
        assert_eq!(address.member_path("Todo"), "app.models.Todo");
        assert_eq!(address.member_path("createTodo"), "app.models.Todo.createTodo");
    }

    #[test]
    fn test_distinct_paths_get_distinct_addresses() {
        let paths = ["main.ts", "models/todo.ts", "models/user.ts", "views/todo.ts"];
        let addresses: HashSet<_> = paths
            .iter()
            .map(|p| module_address(Path::new(p), "app"))
            .collect();
        assert_eq!(addresses.len(), paths.len());
    }

    #[test]
    fn test_address_is_independent_of_caller() {
        let first = module_address(Path::new("a/b.ts"), "x.y");
        let second = module_address(Path::new("a/b.ts"), "x.y");
        assert_eq!(first, second);
    }
}
