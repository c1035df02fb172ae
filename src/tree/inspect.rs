use std::fmt;

use super::{NodeId, Tree};
use crate::error::{EditError, EditResult};

/// Rough classification of a node's content, used for display and to decide
/// which nodes may hold children.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum NodeKind {
    Comment,
    Assignment,
    Statement,
}

impl NodeKind {
    pub fn classify(content: &str) -> Self {
        if content.starts_with("//") || content.starts_with("/*") {
            return NodeKind::Comment;
        }
        let mut depth = 0usize;
        for ch in content.chars() {
            match ch {
                '(' | '[' => depth += 1,
                ')' | ']' => depth = depth.saturating_sub(1),
                '=' if depth == 0 => return NodeKind::Assignment,
                _ => {}
            }
        }
        NodeKind::Statement
    }

    /// Whether a node of this kind can be written with a braced body.
    /// Comments and assignments stay leaves; the parser never nests under them.
    pub fn takes_body(self) -> bool {
        self == NodeKind::Statement
    }
}

impl Tree {
    /// Checks the cached descendant count of every node against its children.
    pub fn verify_descendants(&self) -> EditResult<()> {
        for id in self.iter() {
            let node = &self[id];
            let expected: usize = node
                .children
                .iter()
                .map(|&child| self[child].descendants + 1)
                .sum();
            if node.descendants != expected {
                return Err(EditError::InvariantViolated {
                    node: id,
                    cached: node.descendants,
                    expected,
                });
            }
        }
        Ok(())
    }

    /// `(depth, content)` for every node below the root, in document order.
    pub fn outline(&self) -> Vec<(usize, &str)> {
        let mut entries = Vec::with_capacity(self.len().saturating_sub(1));
        self.collect_outline(self.root, 0, &mut entries);
        entries
    }

    fn collect_outline<'a>(&'a self, id: NodeId, depth: usize, entries: &mut Vec<(usize, &'a str)>) {
        for &child in &self[id].children {
            entries.push((depth, self[child].content.as_str()));
            self.collect_outline(child, depth + 1, entries);
        }
    }

    /// One-line description of a node: its content, with ` {...}` appended
    /// when it has children.
    pub fn summary(&self, id: NodeId) -> String {
        match self.get(id) {
            Some(node) if node.has_children() => format!("{} {{...}}", node.content),
            Some(node) => node.content.clone(),
            None => String::new(),
        }
    }
}

/// Trees compare by content and shape; arena handles and the root's own
/// content do not take part.
impl PartialEq for Tree {
    fn eq(&self, other: &Self) -> bool {
        self.len() == other.len() && self.outline() == other.outline()
    }
}

impl Eq for Tree {}

impl fmt::Display for Tree {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for id in self.iter() {
            let node = &self[id];
            writeln!(
                f,
                "{:indent$}({}) {}",
                "",
                node.descendants,
                node.content,
                indent = self.depth(id) * 2
            )?;
        }
        Ok(())
    }
}
