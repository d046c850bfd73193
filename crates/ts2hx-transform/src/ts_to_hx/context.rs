use super::errors::Unsupported;
use std::collections::{HashMap, HashSet};
use tree_sitter::Node;
use ts2hx_core::{ForeignRegistry, SourceWriter};
use ts2hx_parser::{NodeExt, Program, SourceUnit};

/// How a module-level name imported by this file is spelled in Haxe.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Rewrite {
    /// A value living in an extern class.
    Foreign(String),
    /// A type-only import from a foreign module.
    ForeignType,
    /// `import * as X from "pkg"`
    ForeignNamespace(String),
    /// `import * as X from "./mod"`
    ProjectNamespace(usize),
    /// A namespace import of a declaration file.
    AmbientNamespace,
}

const TEMP_PREFIX: &str = "__tmp";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum JumpTarget {
    Function,
    Loop { lowered_for: bool },
    Switch,
}

/// Per-file translation state. Dropped once the file is rendered.
pub struct EmitContext<'a> {
    pub program: &'a Program,
    pub registry: &'a ForeignRegistry,
    pub unit_index: usize,
    pub source: &'a str,
    indent_unit: String,
    rewrites: HashMap<String, Rewrite>,
    scopes: Vec<HashSet<String>>,
    jumps: Vec<JumpTarget>,
    next_temp: usize,
    /// Temp-shaped identifiers the source already uses.
    taken_temps: HashSet<String>,
}

impl<'a> EmitContext<'a> {
    pub fn new(
        program: &'a Program,
        registry: &'a ForeignRegistry,
        unit_index: usize,
        indent_unit: impl Into<String>,
    ) -> Self {
        let source = &program.unit(unit_index).source;
        Self {
            program,
            registry,
            unit_index,
            source,
            indent_unit: indent_unit.into(),
            rewrites: HashMap::new(),
            scopes: Vec::new(),
            jumps: Vec::new(),
            next_temp: 0,
            taken_temps: temp_names_in(source),
        }
    }

    pub fn unit(&self) -> &'a SourceUnit {
        self.program.unit(self.unit_index)
    }

    pub fn text(&self, node: Node<'a>) -> &'a str {
        &self.source[node.byte_range()]
    }

    pub fn writer(&self) -> SourceWriter {
        SourceWriter::new(self.indent_unit.clone())
    }

    pub fn add_rewrite(&mut self, name: impl Into<String>, rewrite: Rewrite) {
        self.rewrites.insert(name.into(), rewrite);
    }

    /// The rewrite for `name`, unless a local binding shadows it.
    pub fn rewrite(&self, name: &str) -> Option<&Rewrite> {
        if self.is_local(name) {
            return None;
        }
        self.rewrites.get(name)
    }

    pub fn is_local(&self, name: &str) -> bool {
        self.scopes.iter().any(|scope| scope.contains(name))
    }

    pub fn push_scope(&mut self) {
        self.scopes.push(HashSet::new());
    }

    pub fn pop_scope(&mut self) {
        self.scopes.pop();
    }

    pub fn bind_local(&mut self, name: impl Into<String>) {
        if let Some(scope) = self.scopes.last_mut() {
            scope.insert(name.into());
        }
    }

    pub fn push_jump(&mut self, target: JumpTarget) {
        self.jumps.push(target);
    }

    pub fn pop_jump(&mut self) {
        self.jumps.pop();
    }

    /// What an unlabeled `break` would leave.
    pub fn break_target(&self) -> Option<JumpTarget> {
        self.jumps
            .last()
            .copied()
            .filter(|target| *target != JumpTarget::Function)
    }

    /// The loop an unlabeled `continue` would restart.
    pub fn continue_target(&self) -> Option<JumpTarget> {
        self.jumps
            .iter()
            .rev()
            .take_while(|target| **target != JumpTarget::Function)
            .find(|target| matches!(target, JumpTarget::Loop { .. }))
            .copied()
    }

    pub fn fresh_temp(&mut self) -> String {
        loop {
            let name = format!("{}{}", TEMP_PREFIX, self.next_temp);
            self.next_temp += 1;
            if !self.taken_temps.contains(&name) {
                return name;
            }
        }
    }

    pub fn unsupported(&self, node: Node<'a>, detail: impl Into<String>) -> Unsupported {
        let (line, column) = node.line_column();
        Unsupported::new(node.kind(), line, column, detail)
    }

    pub fn path_display(&self) -> String {
        self.unit().relative_path.display().to_string()
    }
}

/// Every `__tmpN` identifier spelled anywhere in `source`.
fn temp_names_in(source: &str) -> HashSet<String> {
    let is_ident = |c: char| c.is_ascii_alphanumeric() || c == '_' || c == '$';
    let mut names = HashSet::new();
    for (start, _) in source.match_indices(TEMP_PREFIX) {
        if source[..start].chars().next_back().is_some_and(is_ident) {
            continue;
        }
        let rest = &source[start + TEMP_PREFIX.len()..];
        let digits = rest.len() - rest.trim_start_matches(|c: char| c.is_ascii_digit()).len();
        if digits == 0 || rest[digits..].chars().next().is_some_and(is_ident) {
            continue;
        }
        names.insert(source[start..start + TEMP_PREFIX.len() + digits].to_string());
    }
    names
}

#[cfg(test)]
mod tests {
    use super::temp_names_in;

    #[test]
    fn test_temp_names_in_source() {
        let names = temp_names_in("f(__tmp0, x__tmp1, __tmp2a, __tmp12) + __tmp");
        let mut names: Vec<String> = names.into_iter().collect();
        names.sort();
        assert_eq!(names, vec!["__tmp0", "__tmp12"]);
    }
}
