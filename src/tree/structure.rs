use std::mem;

use tracing::debug;

use super::{Node, NodeId, Tree};
use crate::error::{EditError, EditResult};

impl Tree {
    /// Splices every child of the detached `source` into `parent`'s children,
    /// in order, starting at `index`.
    ///
    /// `parent` and all of its ancestors grow by the size of the inserted
    /// material. `source` is consumed. Returns the handles of the inserted
    /// top-level nodes; an empty `source` inserts nothing.
    pub fn merge(&mut self, parent: NodeId, index: usize, source: Tree) -> EditResult<Vec<NodeId>> {
        let len = self.checked(parent)?.children.len();
        if index > len {
            return Err(EditError::IndexOutOfBounds { index, len });
        }

        let tops = source[source.root].children.clone();
        let mut inserted = Vec::with_capacity(tops.len());
        let mut added = 0;
        for (i, top) in tops.into_iter().enumerate() {
            let id = self.copy_from(&source, top, parent);
            added += self[id].descendants + 1;
            self[parent].children.insert(index + i, id);
            inserted.push(id);
        }
        if added > 0 {
            self.grow(parent, added);
            debug!(nodes = added, index, "merged detached subtree");
        }
        Ok(inserted)
    }

    /// Cuts `id` together with its whole subtree out of the tree and returns
    /// it wrapped in a detached root.
    ///
    /// Applied to the root itself, every child of the root is cut instead and
    /// the root stays in place with no children. Every ancestor of the cut
    /// material shrinks by its size.
    #[doc(alias = "pop")]
    pub fn split(&mut self, id: NodeId) -> EditResult<Tree> {
        let node = self.checked(id)?;
        let mut detached = Tree::detached();
        let detached_root = detached.root;

        match node.parent {
            None => {
                let children = mem::take(&mut self[id].children);
                let mut moved = 0;
                for child in children {
                    let copy = detached.copy_from(self, child, detached_root);
                    moved += detached[copy].descendants + 1;
                    detached[detached_root].children.push(copy);
                    self.release_subtree(child);
                }
                detached[detached_root].descendants = moved;
                self[id].descendants = 0;
                debug!(nodes = moved, "split all children off the root");
            }
            Some(parent) => {
                let size = node.descendants + 1;
                let position = self.position_in(parent, id)?;
                self[parent].children.remove(position);
                self.shrink(parent, size);
                let copy = detached.copy_from(self, id, detached_root);
                detached[detached_root].children.push(copy);
                detached[detached_root].descendants = size;
                self.release_subtree(id);
                debug!(nodes = size, position, "split subtree");
            }
        }
        Ok(detached)
    }

    /// Removes exactly `id`, moving its children up into its former place
    /// under its parent. Every ancestor shrinks by one.
    ///
    /// Returns the removed node as a childless leaf under a detached root.
    pub fn detach(&mut self, id: NodeId) -> EditResult<Tree> {
        let Some(parent) = self.checked(id)?.parent else {
            return Err(EditError::RootNotDetachable);
        };
        let position = self.position_in(parent, id)?;
        let Some(Node {
            content, children, ..
        }) = self.release(id)
        else {
            return Err(EditError::StaleNode(id));
        };

        for &child in &children {
            self[child].parent = Some(parent);
        }
        let promoted = children.len();
        self[parent]
            .children
            .splice(position..position + 1, children);
        self.shrink(parent, 1);
        debug!(promoted, position, "detached single node");

        let mut detached = Tree::detached();
        let detached_root = detached.root;
        detached.push_child(detached_root, content)?;
        Ok(detached)
    }

    /// Deep copy of `id`'s subtree wrapped in a detached root, leaving this
    /// tree untouched. For the root, the copy holds the root's children.
    pub fn subtree(&self, id: NodeId) -> EditResult<Tree> {
        let node = self.checked(id)?;
        let mut detached = Tree::detached();
        let detached_root = detached.root;
        let tops = match node.parent {
            None => node.children.clone(),
            Some(_) => vec![id],
        };
        let mut copied = 0;
        for top in tops {
            let copy = detached.copy_from(self, top, detached_root);
            copied += detached[copy].descendants + 1;
            detached[detached_root].children.push(copy);
        }
        detached[detached_root].descendants = copied;
        Ok(detached)
    }

    fn position_in(&self, parent: NodeId, child: NodeId) -> EditResult<usize> {
        self[parent]
            .children
            .iter()
            .position(|&candidate| candidate == child)
            .ok_or(EditError::StaleNode(child))
    }

    /// Copies `from`'s subtree out of `source` into this tree as a new child
    /// of `parent`, without linking it into `parent`'s children list.
    ///
    /// Descendant counts of the copy are computed while copying; counts of
    /// `parent` and its ancestors are left to the caller.
    fn copy_from(&mut self, source: &Tree, from: NodeId, parent: NodeId) -> NodeId {
        let original = &source[from];
        let id = self.alloc(Node::new(original.content.clone(), Some(parent)));
        let mut descendants = 0;
        let mut children = Vec::with_capacity(original.children.len());
        for &child in &original.children {
            let copy = self.copy_from(source, child, id);
            descendants += self[copy].descendants + 1;
            children.push(copy);
        }
        let node = &mut self[id];
        node.children = children;
        node.descendants = descendants;
        id
    }

    /// Frees `id` and everything below it.
    fn release_subtree(&mut self, id: NodeId) {
        let mut pending = vec![id];
        while let Some(next) = pending.pop() {
            if let Some(node) = self.release(next) {
                pending.extend(node.children);
            }
        }
    }
}
