/*! The program model: every source file of a project, parsed and addressed.
 *
 * A [`Program`] is built from a `tsconfig.json` (or from in-memory sources in tests). Loading is
 * all-or-nothing: malformed configuration, unreadable or unparsable sources and two files claiming the
 * same Haxe module address are all fatal [`ProjectError`]s.
 */

use crate::errors::ProjectError;
use crate::source_unit::{SourceKind, SourceUnit};
use crate::tsconfig::{PatternSet, ResolvedConfig, TsConfig};
use globset::{Glob, GlobBuilder, GlobSet, GlobSetBuilder};
use std::collections::{BTreeSet, HashMap};
use std::path::{Component, Path, PathBuf};
use tracing::{debug, info};
use ts2hx_core::{module_address, ModuleAddress};
use walkdir::WalkDir;

const DEFAULT_EXCLUDES: &[&str] = &["node_modules", "bower_components", "jspm_packages"];

/// What a module specifier refers to, seen from a particular importing file.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ModuleTarget {
    Project(usize),
    External(String),
    Unresolved(String),
}

#[derive(Debug)]
pub struct Program {
    pub config_path: Option<PathBuf>,
    pub root_dir: PathBuf,
    pub base_package: String,
    units: Vec<SourceUnit>,
    by_path: HashMap<PathBuf, usize>,
}

impl Program {
    pub fn load(config_path: &Path, base_package: &str) -> Result<Program, ProjectError> {
        let config = TsConfig::load(config_path)?;
        let paths = discover_files(&config)?;
        if !paths.iter().any(|p| SourceKind::from_path(p) != Some(SourceKind::Declaration)) {
            return Err(ProjectError::NoInputs(config.config_path.clone()));
        }

        let root_dir = match &config.root_dir {
            Some(dir) => dir.clone(),
            None => common_directory(
                paths
                    .iter()
                    .filter(|p| SourceKind::from_path(p) != Some(SourceKind::Declaration)),
            ),
        };
        info!(files = paths.len(), root = %root_dir.display(), "discovered project sources");

        let mut sources = Vec::with_capacity(paths.len());
        for path in paths {
            let text = std::fs::read_to_string(&path).map_err(|source| ProjectError::Io {
                path: path.clone(),
                source,
            })?;
            sources.push((path, text));
        }

        let mut program = Self::assemble(root_dir, base_package, sources)?;
        program.config_path = Some(config.config_path);
        Ok(program)
    }

    /// Builds a program from in-memory sources; relative paths are taken relative to `root_dir`.
    pub fn from_sources<P: AsRef<Path>>(
        root_dir: P,
        base_package: &str,
        sources: Vec<(PathBuf, String)>,
    ) -> Result<Program, ProjectError> {
        let root_dir = normalize_path(root_dir.as_ref());
        let sources = sources
            .into_iter()
            .map(|(path, text)| (normalize_path(&root_dir.join(path)), text))
            .collect();
        Self::assemble(root_dir, base_package, sources)
    }

    fn assemble(
        root_dir: PathBuf,
        base_package: &str,
        mut sources: Vec<(PathBuf, String)>,
    ) -> Result<Program, ProjectError> {
        sources.sort_by(|a, b| a.0.cmp(&b.0));

        let mut units = Vec::with_capacity(sources.len());
        let mut by_path = HashMap::new();
        let mut claimed: HashMap<ModuleAddress, PathBuf> = HashMap::new();

        for (path, text) in sources {
            let Some(kind) = SourceKind::from_path(&path) else {
                continue;
            };
            let relative_path = match path.strip_prefix(&root_dir) {
                Ok(rel) => rel.to_path_buf(),
                Err(_) if kind == SourceKind::Declaration => {
                    PathBuf::from(path.file_name().unwrap_or_default())
                }
                Err(_) => {
                    return Err(ProjectError::OutsideRootDir {
                        path,
                        root_dir: root_dir.clone(),
                    })
                }
            };
            let address = module_address(&relative_path, base_package);

            if kind != SourceKind::Declaration {
                if let Some(first) = claimed.get(&address) {
                    return Err(ProjectError::AddressCollision {
                        first: first.clone(),
                        second: path,
                        address,
                    });
                }
                claimed.insert(address.clone(), path.clone());
            }

            debug!(file = %relative_path.display(), module = %address, "parsing source");
            let unit = SourceUnit::parse(path.clone(), relative_path, kind, text, address)?;
            by_path.insert(path, units.len());
            units.push(unit);
        }

        Ok(Program {
            config_path: None,
            root_dir,
            base_package: base_package.to_string(),
            units,
            by_path,
        })
    }

    pub fn units(&self) -> &[SourceUnit] {
        &self.units
    }

    pub fn unit(&self, index: usize) -> &SourceUnit {
        &self.units[index]
    }

    /// Files that produce Haxe output, in path order.
    pub fn translatable_units(&self) -> impl Iterator<Item = (usize, &SourceUnit)> {
        self.units
            .iter()
            .enumerate()
            .filter(|(_, unit)| unit.is_translatable())
    }

    pub fn find(&self, path: &Path) -> Option<usize> {
        self.by_path.get(&normalize_path(path)).copied()
    }

    pub fn resolve(&self, from: usize, specifier: &str) -> ModuleTarget {
        if !is_relative_specifier(specifier) {
            return ModuleTarget::External(specifier.to_string());
        }

        let base = self.units[from]
            .path
            .parent()
            .map(Path::to_path_buf)
            .unwrap_or_default();
        let joined = normalize_path(&base.join(specifier));

        resolution_candidates(&joined)
            .iter()
            .find_map(|candidate| self.by_path.get(candidate).copied())
            .map(ModuleTarget::Project)
            .unwrap_or_else(|| ModuleTarget::Unresolved(specifier.to_string()))
    }
}

pub fn is_relative_specifier(specifier: &str) -> bool {
    specifier.starts_with("./")
        || specifier.starts_with("../")
        || specifier == "."
        || specifier == ".."
        || specifier.starts_with('/')
}

fn resolution_candidates(joined: &Path) -> Vec<PathBuf> {
    let raw = joined.to_string_lossy().to_string();
    let swap = |from: &str, to: &[&str]| -> Vec<PathBuf> {
        let stem = &raw[..raw.len() - from.len()];
        to.iter().map(|ext| PathBuf::from(format!("{}{}", stem, ext))).collect()
    };

    if raw.ends_with(".js") {
        return swap(".js", &[".ts", ".tsx", ".d.ts"]);
    }
    if raw.ends_with(".jsx") {
        return swap(".jsx", &[".tsx"]);
    }
    if raw.ends_with(".mjs") {
        return swap(".mjs", &[".mts", ".d.mts"]);
    }
    if raw.ends_with(".cjs") {
        return swap(".cjs", &[".cts", ".d.cts"]);
    }
    if SourceKind::from_path(joined).is_some() {
        return vec![joined.to_path_buf()];
    }

    let mut out: Vec<PathBuf> = [".ts", ".tsx", ".d.ts"]
        .iter()
        .map(|ext| PathBuf::from(format!("{}{}", raw, ext)))
        .collect();
    for index in ["index.ts", "index.tsx", "index.d.ts"] {
        out.push(joined.join(index));
    }
    out
}

/// Lexically resolves `.` and `..` components.
pub fn normalize_path(path: &Path) -> PathBuf {
    let mut out = PathBuf::new();
    for component in path.components() {
        match component {
            Component::CurDir => {}
            Component::ParentDir => {
                if !out.pop() {
                    out.push("..");
                }
            }
            other => out.push(other.as_os_str()),
        }
    }
    out
}

fn common_directory<'p>(mut paths: impl Iterator<Item = &'p PathBuf>) -> PathBuf {
    let Some(first) = paths.next() else {
        return PathBuf::new();
    };
    let mut common = first.parent().map(Path::to_path_buf).unwrap_or_default();
    for path in paths {
        while !path.starts_with(&common) {
            if !common.pop() {
                break;
            }
        }
    }
    common
}

fn discover_files(config: &ResolvedConfig) -> Result<BTreeSet<PathBuf>, ProjectError> {
    let mut found = BTreeSet::new();

    if let Some(files) = &config.files {
        for file in &files.patterns {
            let path = normalize_path(&files.base_dir.join(file));
            if !path.is_file() {
                return Err(ProjectError::Io {
                    path: path.clone(),
                    source: std::io::Error::new(std::io::ErrorKind::NotFound, "listed in files"),
                });
            }
            found.insert(path);
        }
    }

    let include = match (&config.include, &config.files) {
        (Some(include), _) => Some(include.clone()),
        (None, Some(_)) => None,
        (None, None) => Some(PatternSet {
            base_dir: config.config_dir.clone(),
            patterns: vec!["**/*".to_string()],
        }),
    };
    let Some(include) = include else {
        return Ok(found);
    };

    let include_set = build_globset(&include.patterns, false)?;
    let mut exclude_patterns: Vec<String> = match &config.exclude {
        Some(exclude) => exclude
            .patterns
            .iter()
            .map(|p| rebase(&exclude.base_dir, p, &include.base_dir))
            .collect(),
        None => DEFAULT_EXCLUDES.iter().map(|s| s.to_string()).collect(),
    };
    if config.exclude.is_none() {
        if let Some(out_dir) = &config.out_dir {
            if let Ok(rel) = out_dir.strip_prefix(&include.base_dir) {
                exclude_patterns.push(rel.to_string_lossy().to_string());
            }
        }
    }
    let exclude_set = build_globset(&exclude_patterns, true)?;

    let walker = WalkDir::new(&include.base_dir)
        .sort_by_file_name()
        .into_iter()
        .filter_entry(|entry| {
            let rel = entry
                .path()
                .strip_prefix(&include.base_dir)
                .unwrap_or(entry.path());
            rel.as_os_str().is_empty() || !exclude_set.is_match(rel)
        });

    for entry in walker {
        let entry = entry.map_err(|e| ProjectError::Io {
            path: e.path().map(Path::to_path_buf).unwrap_or_default(),
            source: e
                .into_io_error()
                .unwrap_or_else(|| std::io::Error::other("directory walk failed")),
        })?;
        if !entry.file_type().is_file() || SourceKind::from_path(entry.path()).is_none() {
            continue;
        }
        let rel = entry
            .path()
            .strip_prefix(&include.base_dir)
            .unwrap_or(entry.path());
        if include_set.is_match(rel) {
            found.insert(normalize_path(entry.path()));
        }
    }

    Ok(found)
}

/// Re-expresses a pattern relative to another base directory when it lives below it.
fn rebase(pattern_base: &Path, pattern: &str, target_base: &Path) -> String {
    let absolute = normalize_path(&pattern_base.join(pattern));
    match absolute.strip_prefix(target_base) {
        Ok(rel) => rel.to_string_lossy().to_string(),
        Err(_) => pattern.to_string(),
    }
}

/// Compiles tsconfig-style patterns. A pattern without wildcards or extension names a directory.
fn build_globset(patterns: &[String], directories_match_self: bool) -> Result<GlobSet, ProjectError> {
    let mut builder = GlobSetBuilder::new();
    for raw in patterns {
        let pattern = raw.trim_start_matches("./").trim_end_matches('/');
        if pattern.is_empty() {
            continue;
        }
        let has_wildcard = pattern.contains(['*', '?', '[']);
        let last = pattern.rsplit('/').next().unwrap_or(pattern);
        let mut expanded = vec![pattern.to_string()];
        if !has_wildcard && !last.contains('.') {
            expanded = vec![format!("{}/**/*", pattern)];
            if directories_match_self {
                expanded.push(pattern.to_string());
            }
        } else if directories_match_self {
            expanded.push(format!("{}/**", pattern));
        }
        for glob in expanded {
            builder.add(compile_glob(&glob)?);
        }
    }
    builder.build().map_err(|e| ProjectError::InvalidPattern {
        pattern: patterns.join(", "),
        message: e.to_string(),
    })
}

fn compile_glob(pattern: &str) -> Result<Glob, ProjectError> {
    GlobBuilder::new(pattern)
        .literal_separator(true)
        .build()
        .map_err(|e| ProjectError::InvalidPattern {
            pattern: pattern.to_string(),
            message: e.to_string(),
        })
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    fn program(files: &[(&str, &str)]) -> Program {
        Program::from_sources(
            "/project",
            "app",
            files
                .iter()
                .map(|(p, s)| (PathBuf::from(p), s.to_string()))
                .collect(),
        )
        .unwrap()
    }

    #[test]
    fn test_units_are_sorted_and_addressed() {
        let program = program(&[("b.ts", ""), ("a/c.ts", ""), ("a.ts", "")]);
        let names: Vec<String> = program
            .units()
            .iter()
            .map(|u| u.address.qualified_name())
            .collect();
        assert_eq!(names, vec!["app.a.C", "app.A", "app.B"]);
    }

    #[test]
    fn test_resolve_relative_specifiers() {
        let program = program(&[
            ("main.ts", ""),
            ("util.ts", ""),
            ("models/index.ts", ""),
            ("types.d.ts", ""),
        ]);
        let main = program.find(Path::new("/project/main.ts")).unwrap();
        let util = program.find(Path::new("/project/util.ts")).unwrap();
        let models = program.find(Path::new("/project/models/index.ts")).unwrap();
        let types = program.find(Path::new("/project/types.d.ts")).unwrap();

        assert_eq!(program.resolve(main, "./util"), ModuleTarget::Project(util));
        assert_eq!(program.resolve(main, "./util.js"), ModuleTarget::Project(util));
        assert_eq!(program.resolve(main, "./models"), ModuleTarget::Project(models));
        assert_eq!(program.resolve(models, "../util"), ModuleTarget::Project(util));
        assert_eq!(program.resolve(main, "./types"), ModuleTarget::Project(types));
        assert_eq!(
            program.resolve(main, "./missing"),
            ModuleTarget::Unresolved("./missing".into())
        );
        assert_eq!(
            program.resolve(main, "fakepkg"),
            ModuleTarget::External("fakepkg".into())
        );
    }

    #[test]
    fn test_address_collision_is_fatal() {
        let result = Program::from_sources(
            "/project",
            "",
            vec![
                (PathBuf::from("my-file.ts"), String::new()),
                (PathBuf::from("my_file.ts"), String::new()),
            ],
        );
        assert!(matches!(result, Err(ProjectError::AddressCollision { .. })));
    }

    #[test]
    fn test_declaration_files_do_not_collide() {
        let program = program(&[("todo.ts", ""), ("todo.d.ts", "")]);
        assert_eq!(program.units().len(), 2);
        assert_eq!(program.translatable_units().count(), 1);
    }

    #[test]
    fn test_normalize_path() {
        assert_eq!(normalize_path(Path::new("/a/b/../c/./d.ts")), PathBuf::from("/a/c/d.ts"));
        assert_eq!(normalize_path(Path::new("../x")), PathBuf::from("../x"));
    }

    #[test]
    fn test_common_directory() {
        let paths = vec![
            PathBuf::from("/p/src/a.ts"),
            PathBuf::from("/p/src/deep/b.ts"),
            PathBuf::from("/p/src/other/c.ts"),
        ];
        assert_eq!(common_directory(paths.iter()), PathBuf::from("/p/src"));
    }

    #[test]
    fn test_directory_patterns_expand() {
        let set = build_globset(&["src".to_string()], false).unwrap();
        assert!(set.is_match("src/a.ts"));
        assert!(set.is_match("src/deep/b.ts"));
        assert!(!set.is_match("lib/a.ts"));

        let excludes = build_globset(&["node_modules".to_string()], true).unwrap();
        assert!(excludes.is_match("node_modules"));
        assert!(excludes.is_match("node_modules/pkg/index.d.ts"));
    }
}
