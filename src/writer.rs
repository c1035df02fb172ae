use std::{fs, io, path::Path};

use crate::tree::{NodeId, NodeKind, Tree};

pub const DEFAULT_INDENT: usize = 2;

/// Serializes a document tree back into source text.
///
/// Nodes with children open a brace block, leaves end with `;` and comments
/// are written verbatim on their own line. Brace nesting mirrors tree
/// nesting exactly; whitespace inside a statement is whatever the node holds.
#[derive(Clone, Debug)]
pub struct Writer {
    indent: usize,
}

impl Writer {
    pub fn new() -> Self {
        Self {
            indent: DEFAULT_INDENT,
        }
    }

    pub fn with_indent(mut self, indent: usize) -> Self {
        self.indent = indent;
        self
    }

    pub fn write_to_string(&self, tree: &Tree) -> String {
        let mut out = String::new();
        let mut open: Vec<NodeId> = Vec::new();
        let mut cursor = tree.depth_first_walk(tree.root());

        while let Some(id) = cursor {
            let node = &tree[id];
            while let Some(&top) = open.last() {
                if node.parent() == Some(top) {
                    break;
                }
                open.pop();
                self.close_block(&mut out, open.len());
            }

            self.push_indent(&mut out, open.len());
            out.push_str(node.content());
            if node.has_children() {
                out.push_str(" {\n");
                open.push(id);
            } else if node.kind() == NodeKind::Comment {
                out.push('\n');
            } else {
                out.push_str(";\n");
            }

            cursor = tree.depth_first_walk(id);
        }

        while open.pop().is_some() {
            self.close_block(&mut out, open.len());
        }
        out
    }

    pub fn write(&self, tree: &Tree, mut target: impl io::Write) -> io::Result<()> {
        target.write_all(self.write_to_string(tree).as_bytes())
    }

    /// Writes `tree` to `path`, replacing any existing file.
    pub fn write_file(&self, path: impl AsRef<Path>, tree: &Tree) -> io::Result<()> {
        fs::write(path, self.write_to_string(tree))
    }

    fn close_block(&self, out: &mut String, level: usize) {
        self.push_indent(out, level);
        out.push_str("}\n");
    }

    fn push_indent(&self, out: &mut String, level: usize) {
        out.extend(std::iter::repeat_n(' ', level * self.indent));
    }
}

impl Default for Writer {
    fn default() -> Self {
        Self::new()
    }
}

/// Writes `tree` to `path` with the default layout.
pub fn export_file(path: impl AsRef<Path>, tree: &Tree) -> io::Result<()> {
    Writer::new().write_file(path, tree)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample() -> Tree {
        let mut tree = Tree::document();
        let root = tree.root();
        tree.push_child(root, "// shape").unwrap();
        tree.push_child(root, "size = 10").unwrap();
        let diff = tree.push_child(root, "difference()").unwrap();
        let moved = tree.push_child(diff, "translate([0,0,1])").unwrap();
        tree.push_child(moved, "cube(size)").unwrap();
        tree.push_child(diff, "sphere(size / 2)").unwrap();
        tree.push_child(root, "echo(size)").unwrap();
        tree
    }

    #[test]
    fn writes_blocks_leaves_and_comments() {
        let text = Writer::new().write_to_string(&sample());
        assert_eq!(
            text,
            "// shape\n\
             size = 10;\n\
             difference() {\n\
             \x20 translate([0,0,1]) {\n\
             \x20   cube(size);\n\
             \x20 }\n\
             \x20 sphere(size / 2);\n\
             }\n\
             echo(size);\n"
        );
    }

    #[test]
    fn closes_all_open_blocks_at_end() {
        let mut tree = Tree::document();
        let root = tree.root();
        let a = tree.push_child(root, "a()").unwrap();
        let b = tree.push_child(a, "b()").unwrap();
        tree.push_child(b, "c()").unwrap();

        let text = Writer::new().with_indent(4).write_to_string(&tree);
        assert_eq!(
            text,
            "a() {\n    b() {\n        c();\n    }\n}\n"
        );
    }

    #[test]
    fn empty_document_writes_nothing() {
        assert_eq!(Writer::new().write_to_string(&Tree::document()), "");
    }

    #[test]
    fn write_streams_into_target() {
        let mut buffer = Vec::new();
        Writer::new().write(&sample(), &mut buffer).unwrap();
        assert_eq!(
            String::from_utf8(buffer).unwrap(),
            Writer::new().write_to_string(&sample())
        );
    }
}
