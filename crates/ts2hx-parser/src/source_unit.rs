use crate::errors::ProjectError;
use crate::surface::{extract_surface, ExportSurface, ImportBinding};
use crate::syntax::{first_syntax_error, NodeExt};
use std::path::{Path, PathBuf};
use tree_sitter::{Language, Node, Parser, Tree};
use ts2hx_core::ModuleAddress;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SourceKind {
    TypeScript,
    Tsx,
    /// `.d.ts`: loaded for resolution, never translated.
    Declaration,
}

impl SourceKind {
    pub fn from_path(path: &Path) -> Option<SourceKind> {
        let name = path.file_name()?.to_string_lossy().to_ascii_lowercase();
        if name.ends_with(".d.ts") || name.ends_with(".d.mts") || name.ends_with(".d.cts") {
            Some(SourceKind::Declaration)
        } else if name.ends_with(".tsx") {
            Some(SourceKind::Tsx)
        } else if name.ends_with(".ts") || name.ends_with(".mts") || name.ends_with(".cts") {
            Some(SourceKind::TypeScript)
        } else {
            None
        }
    }

    fn language(&self) -> Language {
        match self {
            SourceKind::Tsx => tree_sitter_typescript::LANGUAGE_TSX.into(),
            SourceKind::TypeScript | SourceKind::Declaration => {
                tree_sitter_typescript::LANGUAGE_TYPESCRIPT.into()
            }
        }
    }
}

/// One parsed input file. Immutable once loaded.
#[derive(Debug)]
pub struct SourceUnit {
    pub path: PathBuf,
    pub relative_path: PathBuf,
    pub kind: SourceKind,
    pub source: String,
    pub tree: Tree,
    pub address: ModuleAddress,
    pub imports: Vec<ImportBinding>,
    pub exports: ExportSurface,
}

impl SourceUnit {
    pub fn parse(
        path: PathBuf,
        relative_path: PathBuf,
        kind: SourceKind,
        source: String,
        address: ModuleAddress,
    ) -> Result<SourceUnit, ProjectError> {
        let tree = parse_tree(&path, kind, &source)?;
        let (imports, exports) = extract_surface(tree.root_node(), &source);

        Ok(SourceUnit {
            path,
            relative_path,
            kind,
            source,
            tree,
            address,
            imports,
            exports,
        })
    }

    pub fn root(&self) -> Node<'_> {
        self.tree.root_node()
    }

    pub fn text(&self, node: Node<'_>) -> &str {
        &self.source[node.byte_range()]
    }

    pub fn is_translatable(&self) -> bool {
        self.kind != SourceKind::Declaration
    }

    pub fn top_level_statements(&self) -> Vec<Node<'_>> {
        self.root().named_children_vec()
    }
}

fn parse_tree(path: &Path, kind: SourceKind, source: &str) -> Result<Tree, ProjectError> {
    let mut parser = Parser::new();
    let language = kind.language();
    parser
        .set_language(&language)
        .map_err(|e| ProjectError::Grammar(e.to_string()))?;

    let tree = parser
        .parse(source, None)
        .ok_or_else(|| ProjectError::Grammar(format!("parser produced no tree for {}", path.display())))?;

    if let Some(error) = first_syntax_error(tree.root_node()) {
        let (line, column) = error.line_column();
        return Err(ProjectError::Syntax {
            path: path.to_path_buf(),
            line,
            column,
        });
    }
    Ok(tree)
}
