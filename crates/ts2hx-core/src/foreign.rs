/*! Foreign (npm) module bindings.
 *
 * Every bare import specifier gets one synthesized extern class. The registry is built in two steps so
 * the ordering is enforced by the types: a [`ForeignRegistryBuilder`] only grows while the whole project
 * is scanned, then [`ForeignRegistryBuilder::finish`] assigns module names and freezes it. Translation
 * only ever sees the frozen [`ForeignRegistry`].
 */

use crate::address::ModuleAddress;
use crate::naming::{sanitize_identifier, to_haxe_module_name, to_haxe_package_path};
use serde::Serialize;
use std::collections::{BTreeMap, BTreeSet, HashSet};

/// Subpackage of the base package holding extern classes.
pub const EXTERN_PACKAGE: &str = "externs";

/// Haxe-side name of a foreign module's default export.
pub const DEFAULT_MEMBER: &str = "__default";

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct ForeignModuleDescriptor {
    pub specifier: String,
    pub requires_default: bool,
    pub members: BTreeSet<String>,
}

impl ForeignModuleDescriptor {
    pub fn new(specifier: impl Into<String>) -> Self {
        Self {
            specifier: specifier.into(),
            requires_default: false,
            members: BTreeSet::new(),
        }
    }

    pub fn require_default(&mut self) {
        self.requires_default = true;
    }

    pub fn add_member(&mut self, member: impl Into<String>) {
        self.members.insert(member.into());
    }

    /// Haxe field name used for a JavaScript member.
    pub fn binding_name(member: &str) -> String {
        sanitize_identifier(member)
    }
}

#[derive(Debug, Default)]
pub struct ForeignRegistryBuilder {
    modules: BTreeMap<String, ForeignModuleDescriptor>,
}

impl ForeignRegistryBuilder {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn descriptor(&mut self, specifier: &str) -> &mut ForeignModuleDescriptor {
        self.modules
            .entry(specifier.to_string())
            .or_insert_with(|| ForeignModuleDescriptor::new(specifier))
    }

    /// Assigns each specifier its extern address, in sorted specifier order.
    pub fn finish(self, base_package: &str) -> ForeignRegistry {
        self.finish_around(base_package, std::iter::empty())
    }

    /// Like [`finish`](Self::finish), but extern names skip any module a project file already
    /// occupies in the extern package.
    pub fn finish_around<'a>(
        self,
        base_package: &str,
        claimed: impl IntoIterator<Item = &'a ModuleAddress>,
    ) -> ForeignRegistry {
        let mut segments: Vec<&str> = base_package.split('.').collect();
        segments.push(EXTERN_PACKAGE);
        let package_path = to_haxe_package_path(&segments);

        let mut taken: HashSet<String> = claimed
            .into_iter()
            .filter(|address| address.package_path == package_path)
            .map(|address| address.module_name.clone())
            .collect();
        let mut addresses = BTreeMap::new();
        for specifier in self.modules.keys() {
            let base = to_haxe_module_name(specifier);
            let mut name = base.clone();
            let mut suffix = 2;
            while !taken.insert(name.clone()) {
                name = format!("{}{}", base, suffix);
                suffix += 1;
            }
            addresses.insert(specifier.clone(), ModuleAddress::new(&package_path, name));
        }

        ForeignRegistry {
            modules: self.modules,
            addresses,
        }
    }
}

#[derive(Debug, Clone, Default)]
pub struct ForeignRegistry {
    modules: BTreeMap<String, ForeignModuleDescriptor>,
    addresses: BTreeMap<String, ModuleAddress>,
}

impl ForeignRegistry {
    pub fn get(&self, specifier: &str) -> Option<&ForeignModuleDescriptor> {
        self.modules.get(specifier)
    }

    pub fn address(&self, specifier: &str) -> Option<&ModuleAddress> {
        self.addresses.get(specifier)
    }

    /// Haxe expression for a member of a foreign module; `None` selects the default export.
    pub fn member_path(&self, specifier: &str, member: Option<&str>) -> Option<String> {
        let address = self.address(specifier)?;
        let field = match member {
            Some(name) => ForeignModuleDescriptor::binding_name(name),
            None => DEFAULT_MEMBER.to_string(),
        };
        Some(format!("{}.{}", address.qualified_name(), field))
    }

    pub fn iter(&self) -> impl Iterator<Item = (&ForeignModuleDescriptor, &ModuleAddress)> {
        self.modules
            .iter()
            .filter_map(|(spec, desc)| self.addresses.get(spec).map(|addr| (desc, addr)))
    }

    pub fn len(&self) -> usize {
        self.modules.len()
    }

    pub fn is_empty(&self) -> bool {
        self.modules.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn test_descriptor_accumulates_members() {
        let mut builder = ForeignRegistryBuilder::new();
        builder.descriptor("fakepkg").add_member("y");
        builder.descriptor("fakepkg").add_member("x");
        builder.descriptor("fakepkg").add_member("x");
        let registry = builder.finish("app");

        let desc = registry.get("fakepkg").unwrap();
        assert!(!desc.requires_default);
        assert_eq!(desc.members.iter().collect::<Vec<_>>(), vec!["x", "y"]);
    }

    #[test]
    fn test_addresses_live_under_externs() {
        let mut builder = ForeignRegistryBuilder::new();
        builder.descriptor("left-pad").require_default();
        let registry = builder.finish("app");

        let address = registry.address("left-pad").unwrap();
        assert_eq!(address.qualified_name(), "app.externs.LeftPad");
        assert_eq!(
            registry.member_path("left-pad", None).unwrap(),
            "app.externs.LeftPad.__default"
        );
    }

    #[test]
    fn test_root_base_package() {
        let mut builder = ForeignRegistryBuilder::new();
        builder.descriptor("react");
        let registry = builder.finish("");
        assert_eq!(registry.address("react").unwrap().qualified_name(), "externs.React");
    }

    #[test]
    fn test_colliding_names_get_suffixes_in_sorted_order() {
        let mut builder = ForeignRegistryBuilder::new();
        builder.descriptor("foo_bar");
        builder.descriptor("foo-bar");
        builder.descriptor("@foo/bar");
        let registry = builder.finish("app");

        assert_eq!(registry.address("@foo/bar").unwrap().module_name, "FooBar");
        assert_eq!(registry.address("foo-bar").unwrap().module_name, "FooBar2");
        assert_eq!(registry.address("foo_bar").unwrap().module_name, "FooBar3");
    }

    #[test]
    fn test_project_modules_in_extern_package_are_skipped() {
        let mut builder = ForeignRegistryBuilder::new();
        builder.descriptor("fakepkg").add_member("x");
        builder.descriptor("other");
        let claimed = [
            ModuleAddress::new("app.externs", "Fakepkg"),
            ModuleAddress::new("app", "Other"),
        ];
        let registry = builder.finish_around("app", &claimed);

        assert_eq!(registry.address("fakepkg").unwrap().module_name, "Fakepkg2");
        assert_eq!(registry.address("other").unwrap().module_name, "Other");
    }

    #[test]
    fn test_member_path_sanitizes_names() {
        let mut builder = ForeignRegistryBuilder::new();
        builder.descriptor("pkg").add_member("default-export");
        let registry = builder.finish("app");
        assert_eq!(
            registry.member_path("pkg", Some("default-export")).unwrap(),
            "app.externs.Pkg.default_export"
        );
    }
}
