/*! `tsconfig.json` loading.
 *
 * Only the options that decide which files form the program and where the root directory is are read.
 * Everything else in the file is accepted and ignored.
 */

use crate::errors::ProjectError;
use crate::jsonc;
use serde::Deserialize;
use std::collections::HashSet;
use std::path::{Path, PathBuf};

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TsConfig {
    #[serde(default)]
    pub extends: Option<Extends>,
    #[serde(default)]
    pub files: Option<Vec<String>>,
    #[serde(default)]
    pub include: Option<Vec<String>>,
    #[serde(default)]
    pub exclude: Option<Vec<String>>,
    #[serde(default)]
    pub compiler_options: CompilerOptions,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(untagged)]
pub enum Extends {
    One(String),
    Many(Vec<String>),
}

impl Extends {
    fn specifiers(&self) -> Vec<&str> {
        match self {
            Extends::One(spec) => vec![spec.as_str()],
            Extends::Many(specs) => specs.iter().map(String::as_str).collect(),
        }
    }
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CompilerOptions {
    pub root_dir: Option<String>,
    pub out_dir: Option<String>,
    pub jsx: Option<String>,
}

/// A list of patterns together with the directory they are relative to.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PatternSet {
    pub base_dir: PathBuf,
    pub patterns: Vec<String>,
}

/// A config with its `extends` chain applied and every path made absolute.
#[derive(Debug, Clone)]
pub struct ResolvedConfig {
    pub config_path: PathBuf,
    pub config_dir: PathBuf,
    pub files: Option<PatternSet>,
    pub include: Option<PatternSet>,
    pub exclude: Option<PatternSet>,
    pub root_dir: Option<PathBuf>,
    pub out_dir: Option<PathBuf>,
    pub jsx: Option<String>,
}

impl TsConfig {
    pub fn parse(path: &Path, text: &str) -> Result<TsConfig, ProjectError> {
        let value = jsonc::parse_value(text).map_err(|e| ProjectError::MalformedConfig {
            path: path.to_path_buf(),
            message: e.to_string(),
        })?;
        serde_json::from_value(value).map_err(|e| ProjectError::MalformedConfig {
            path: path.to_path_buf(),
            message: e.to_string(),
        })
    }

    pub fn load(path: &Path) -> Result<ResolvedConfig, ProjectError> {
        let mut visiting = HashSet::new();
        load_resolved(path, &mut visiting)
    }
}

fn load_resolved(path: &Path, visiting: &mut HashSet<PathBuf>) -> Result<ResolvedConfig, ProjectError> {
    let config_path = crate::program::normalize_path(&absolute(path));
    if !visiting.insert(config_path.clone()) {
        return Err(ProjectError::CircularExtends(config_path));
    }

    let text = std::fs::read_to_string(&config_path).map_err(|source| ProjectError::Io {
        path: config_path.clone(),
        source,
    })?;
    let config = TsConfig::parse(&config_path, &text)?;
    let config_dir = config_path
        .parent()
        .map(Path::to_path_buf)
        .unwrap_or_default();

    let mut resolved = ResolvedConfig {
        config_path: config_path.clone(),
        config_dir: config_dir.clone(),
        files: None,
        include: None,
        exclude: None,
        root_dir: None,
        out_dir: None,
        jsx: None,
    };

    if let Some(extends) = &config.extends {
        for spec in extends.specifiers() {
            let base_path = locate_base_config(&config_path, &config_dir, spec)?;
            let base = load_resolved(&base_path, visiting)?;
            resolved.files = base.files.or(resolved.files);
            resolved.include = base.include.or(resolved.include);
            resolved.exclude = base.exclude.or(resolved.exclude);
            resolved.root_dir = base.root_dir.or(resolved.root_dir);
            resolved.out_dir = base.out_dir.or(resolved.out_dir);
            resolved.jsx = base.jsx.or(resolved.jsx);
        }
    }

    let here = |patterns: &Vec<String>| PatternSet {
        base_dir: config_dir.clone(),
        patterns: patterns.clone(),
    };
    if let Some(files) = &config.files {
        resolved.files = Some(here(files));
    }
    if let Some(include) = &config.include {
        resolved.include = Some(here(include));
    }
    if let Some(exclude) = &config.exclude {
        resolved.exclude = Some(here(exclude));
    }
    let options = &config.compiler_options;
    if let Some(root_dir) = &options.root_dir {
        resolved.root_dir = Some(crate::program::normalize_path(&config_dir.join(root_dir)));
    }
    if let Some(out_dir) = &options.out_dir {
        resolved.out_dir = Some(crate::program::normalize_path(&config_dir.join(out_dir)));
    }
    if options.jsx.is_some() {
        resolved.jsx = options.jsx.clone();
    }

    visiting.remove(&config_path);
    Ok(resolved)
}

fn locate_base_config(config_path: &Path, config_dir: &Path, spec: &str) -> Result<PathBuf, ProjectError> {
    let relative = spec.starts_with('.') || Path::new(spec).is_absolute();
    let candidate = if relative {
        config_dir.join(spec)
    } else {
        config_dir.join("node_modules").join(spec)
    };

    let mut candidates = vec![candidate.clone()];
    if candidate.extension().is_none() {
        candidates.push(candidate.with_extension("json"));
        candidates.push(candidate.join("tsconfig.json"));
    }

    candidates
        .into_iter()
        .find(|path| path.is_file())
        .ok_or_else(|| ProjectError::MissingBaseConfig {
            path: config_path.to_path_buf(),
            extends: spec.to_string(),
        })
}

fn absolute(path: &Path) -> PathBuf {
    if path.is_absolute() {
        path.to_path_buf()
    } else {
        std::env::current_dir()
            .map(|dir| dir.join(path))
            .unwrap_or_else(|_| path.to_path_buf())
    }
}
