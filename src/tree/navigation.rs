use super::{NodeId, Tree};

impl Tree {
    /// Pre-order position of `target` within the whole document.
    pub fn offset(&self, target: NodeId) -> Option<usize> {
        self.offset_within(self.root, target)
    }

    /// Pre-order position of `target` relative to `base`, or `None` when
    /// `target` is not inside `base`'s subtree.
    pub fn offset_within(&self, base: NodeId, target: NodeId) -> Option<usize> {
        self.get(base)?;
        let mut offset = 0;
        let mut current = target;
        while current != base {
            let parent = self.get(current)?.parent?;
            for &sibling in &self[parent].children {
                if sibling == current {
                    break;
                }
                offset += self[sibling].descendants + 1;
            }
            offset += 1;
            current = parent;
        }
        Some(offset)
    }

    /// The node at pre-order position `index` of the document.
    ///
    /// Positions past the end clamp to the last node.
    pub fn node_at_offset(&self, index: usize) -> NodeId {
        self.node_at_offset_within(self.root, index)
    }

    pub fn node_at_offset_within(&self, base: NodeId, index: usize) -> NodeId {
        let mut current = base;
        let mut index = index;
        loop {
            let node = &self[current];
            if index == 0 || node.children.is_empty() {
                return current;
            }
            let mut passed = 1;
            let mut found = None;
            for &child in &node.children {
                let size = self[child].descendants;
                if passed + size >= index {
                    found = Some((child, index - passed));
                    break;
                }
                passed += size + 1;
            }
            match found {
                Some((child, rest)) => {
                    current = child;
                    index = rest;
                }
                None => {
                    let last = node.children[node.children.len() - 1];
                    return self.left(last);
                }
            }
        }
    }

    /// Next node in pre-order, or `None` once the walk is exhausted.
    pub fn depth_first_walk(&self, id: NodeId) -> Option<NodeId> {
        self.walk_within(self.root, id)
    }

    fn walk_within(&self, base: NodeId, id: NodeId) -> Option<NodeId> {
        if let Some(&first) = self.get(id)?.children.first() {
            return Some(first);
        }
        let mut current = id;
        while current != base {
            let parent = self[current].parent?;
            if let Some(next) = self.sibling_after(parent, current) {
                return Some(next);
            }
            current = parent;
        }
        None
    }

    /// First node after `id`'s whole subtree in pre-order: its next sibling,
    /// or the next sibling of its nearest ancestor that has one.
    pub fn next_after_subtree(&self, id: NodeId) -> Option<NodeId> {
        let mut current = id;
        while let Some(parent) = self.get(current)?.parent {
            if let Some(next) = self.sibling_after(parent, current) {
                return Some(next);
            }
            current = parent;
        }
        None
    }

    fn sibling_after(&self, parent: NodeId, child: NodeId) -> Option<NodeId> {
        let siblings = &self[parent].children;
        let position = siblings.iter().position(|&sibling| sibling == child)?;
        siblings.get(position + 1).copied()
    }

    /// Last node of `id`'s subtree in pre-order (its deepest rightmost
    /// descendant, or `id` itself for a leaf).
    pub fn left(&self, id: NodeId) -> NodeId {
        let mut current = id;
        while let Some(&last) = self.get(current).and_then(|node| node.children.last()) {
            current = last;
        }
        current
    }

    /// One step forward in pre-order; stays put on the last node.
    pub fn next(&self, id: NodeId) -> NodeId {
        self.depth_first_walk(id).unwrap_or(id)
    }

    /// One step backward in pre-order; stays put on the root.
    pub fn prev(&self, id: NodeId) -> NodeId {
        let Some(parent) = self.get(id).and_then(|node| node.parent) else {
            return id;
        };
        match self.index_in_parent(id) {
            Some(0) | None => parent,
            Some(position) => self.left(self[parent].children[position - 1]),
        }
    }

    /// True when `candidate` is `ancestor` or lies anywhere below it.
    pub fn is_subnode(&self, ancestor: NodeId, candidate: NodeId) -> bool {
        let mut cursor = Some(candidate);
        while let Some(id) = cursor {
            if id == ancestor {
                return true;
            }
            cursor = self.get(id).and_then(|node| node.parent);
        }
        false
    }

    pub fn index_in_parent(&self, id: NodeId) -> Option<usize> {
        let parent = self.get(id)?.parent?;
        self[parent].children.iter().position(|&child| child == id)
    }

    /// Number of edges between `id` and the root.
    pub fn depth(&self, id: NodeId) -> usize {
        let mut depth = 0;
        let mut cursor = self.get(id).and_then(|node| node.parent);
        while let Some(parent) = cursor {
            depth += 1;
            cursor = self[parent].parent;
        }
        depth
    }

    /// Pre-order iterator over the whole document, root first.
    pub fn iter(&self) -> PreOrder<'_> {
        self.iter_subtree(self.root)
    }

    /// Pre-order iterator over `id` and everything below it.
    pub fn iter_subtree(&self, id: NodeId) -> PreOrder<'_> {
        PreOrder {
            tree: self,
            base: id,
            next: self.get(id).map(|_| id),
        }
    }
}

pub struct PreOrder<'a> {
    tree: &'a Tree,
    base: NodeId,
    next: Option<NodeId>,
}

impl Iterator for PreOrder<'_> {
    type Item = NodeId;

    fn next(&mut self) -> Option<NodeId> {
        let current = self.next?;
        self.next = self.tree.walk_within(self.base, current);
        Some(current)
    }
}
