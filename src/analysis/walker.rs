//! Pre-order traversal of a syntax tree.

use tree_sitter::{Node, Tree, TreeCursor};

/// Iterator over the nodes of a tree in document order.
///
/// Parents are yielded before their children and siblings in source order,
/// so a definition nested in a class or another function is produced exactly
/// once, at the point where it textually appears. Anonymous tokens are
/// skipped unless `with_anonymous` is set.
pub struct DocumentOrder<'tree> {
    cursor: TreeCursor<'tree>,
    named_only: bool,
    done: bool,
}

impl<'tree> DocumentOrder<'tree> {
    /// Walk a whole tree, starting at its root.
    pub fn new(tree: &'tree Tree) -> Self {
        Self::from_node(tree.root_node())
    }

    /// Walk the subtree rooted at `node`.
    pub fn from_node(node: Node<'tree>) -> Self {
        Self {
            cursor: node.walk(),
            named_only: true,
            done: false,
        }
    }

    /// Also yield anonymous tokens (punctuation, keywords, MISSING tokens).
    pub fn with_anonymous(mut self) -> Self {
        self.named_only = false;
        self
    }

    fn advance(&mut self) {
        if self.cursor.goto_first_child() {
            return;
        }
        loop {
            if self.cursor.goto_next_sibling() {
                return;
            }
            if !self.cursor.goto_parent() {
                self.done = true;
                return;
            }
        }
    }
}

impl<'tree> Iterator for DocumentOrder<'tree> {
    type Item = Node<'tree>;

    fn next(&mut self) -> Option<Self::Item> {
        while !self.done {
            let node = self.cursor.node();
            self.advance();
            if node.is_named() || !self.named_only {
                return Some(node);
            }
        }
        None
    }
}
