//! Small conveniences over tree-sitter nodes.

use tree_sitter::Node;

pub trait NodeExt<'t> {
    /// Named children, comments excluded.
    fn named_children_vec(&self) -> Vec<Node<'t>>;
    /// Every child including anonymous tokens, comments excluded.
    fn children_vec(&self) -> Vec<Node<'t>>;
    fn first_named(&self) -> Option<Node<'t>>;
    fn field(&self, name: &str) -> Option<Node<'t>>;
    /// Named children carrying the given field, comments excluded.
    fn fields(&self, name: &str) -> Vec<Node<'t>>;
    /// True when a direct child (token or node) has this kind.
    fn has_token(&self, kind: &str) -> bool;
    /// 1-based line and column of the node start.
    fn line_column(&self) -> (usize, usize);
}

impl<'t> NodeExt<'t> for Node<'t> {
    fn named_children_vec(&self) -> Vec<Node<'t>> {
        let mut cursor = self.walk();
        self.named_children(&mut cursor)
            .filter(|child| child.kind() != "comment")
            .collect()
    }

    fn children_vec(&self) -> Vec<Node<'t>> {
        let mut cursor = self.walk();
        self.children(&mut cursor)
            .filter(|child| child.kind() != "comment")
            .collect()
    }

    fn first_named(&self) -> Option<Node<'t>> {
        self.named_children_vec().into_iter().next()
    }

    fn field(&self, name: &str) -> Option<Node<'t>> {
        self.child_by_field_name(name)
    }

    fn fields(&self, name: &str) -> Vec<Node<'t>> {
        let mut cursor = self.walk();
        self.children_by_field_name(name, &mut cursor)
            .filter(|child| child.is_named() && child.kind() != "comment")
            .collect()
    }

    fn has_token(&self, kind: &str) -> bool {
        let mut cursor = self.walk();
        let found = self.children(&mut cursor).any(|child| child.kind() == kind);
        found
    }

    fn line_column(&self) -> (usize, usize) {
        let point = self.start_position();
        (point.row + 1, point.column + 1)
    }
}

/// All nodes below `root` in document order, `root` included.
pub fn descendants(root: Node<'_>) -> Vec<Node<'_>> {
    let mut out = Vec::new();
    let mut cursor = root.walk();
    loop {
        out.push(cursor.node());
        if cursor.goto_first_child() {
            continue;
        }
        loop {
            if cursor.node() == root {
                return out;
            }
            if cursor.goto_next_sibling() {
                break;
            }
            if !cursor.goto_parent() {
                return out;
            }
        }
    }
}

/// First node under `root` that is an error or a missing token.
pub fn first_syntax_error(root: Node<'_>) -> Option<Node<'_>> {
    if !root.has_error() {
        return None;
    }
    descendants(root)
        .into_iter()
        .find(|node| node.is_error() || node.is_missing())
}
