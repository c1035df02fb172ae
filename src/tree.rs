use std::ops::{Index, IndexMut};

use crate::error::{EditError, EditResult};

mod inspect;
mod navigation;
mod structure;

pub use inspect::NodeKind;
pub use navigation::PreOrder;

/// Content of the synthetic root wrapping a detached subtree.
pub const DETACHED_ROOT: &str = "Root";

/// Content of the root of a freshly imported or created document.
pub const DOCUMENT_ROOT: &str = "Document Root";

/// Handle to a node inside a [`Tree`].
///
/// Handles carry a generation so that a handle to a removed node never aliases
/// a node allocated later in the same slot.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct NodeId {
    index: u32,
    generation: u32,
}

#[derive(Clone, Debug)]
pub struct Node {
    content: String,
    parent: Option<NodeId>,
    children: Vec<NodeId>,
    descendants: usize,
}

impl Node {
    fn new(content: impl Into<String>, parent: Option<NodeId>) -> Self {
        Self {
            content: content.into(),
            parent,
            children: Vec::new(),
            descendants: 0,
        }
    }

    pub fn content(&self) -> &str {
        &self.content
    }

    pub fn parent(&self) -> Option<NodeId> {
        self.parent
    }

    pub fn children(&self) -> &[NodeId] {
        &self.children
    }

    /// Number of nodes transitively owned by this one, not counting itself.
    pub fn descendants(&self) -> usize {
        self.descendants
    }

    pub fn has_children(&self) -> bool {
        !self.children.is_empty()
    }

    pub fn kind(&self) -> NodeKind {
        NodeKind::classify(&self.content)
    }
}

#[derive(Clone, Debug)]
struct Slot {
    generation: u32,
    node: Option<Node>,
}

/// An ordered tree with cached subtree sizes.
///
/// Nodes live in an arena owned by the tree; parents own their children
/// through the `children` lists and children refer back through plain
/// handles. Cloning a tree is a deep copy.
#[derive(Clone, Debug)]
pub struct Tree {
    slots: Vec<Slot>,
    free: Vec<u32>,
    root: NodeId,
}

impl Tree {
    pub fn new(root_content: impl Into<String>) -> Self {
        let root = NodeId {
            index: 0,
            generation: 0,
        };
        Self {
            slots: vec![Slot {
                generation: 0,
                node: Some(Node::new(root_content, None)),
            }],
            free: Vec::new(),
            root,
        }
    }

    /// An empty document.
    pub fn document() -> Self {
        Self::new(DOCUMENT_ROOT)
    }

    /// An empty detached subtree.
    pub fn detached() -> Self {
        Self::new(DETACHED_ROOT)
    }

    pub fn root(&self) -> NodeId {
        self.root
    }

    pub fn get(&self, id: NodeId) -> Option<&Node> {
        self.slots
            .get(id.index as usize)
            .filter(|slot| slot.generation == id.generation)
            .and_then(|slot| slot.node.as_ref())
    }

    fn get_mut(&mut self, id: NodeId) -> Option<&mut Node> {
        self.slots
            .get_mut(id.index as usize)
            .filter(|slot| slot.generation == id.generation)
            .and_then(|slot| slot.node.as_mut())
    }

    pub fn contains(&self, id: NodeId) -> bool {
        self.get(id).is_some()
    }

    pub(crate) fn checked(&self, id: NodeId) -> EditResult<&Node> {
        self.get(id).ok_or(EditError::StaleNode(id))
    }

    /// Number of nodes in the tree, including the root.
    pub fn len(&self) -> usize {
        self[self.root].descendants + 1
    }

    /// True when the root has no children.
    pub fn is_empty(&self) -> bool {
        self[self.root].children.is_empty()
    }

    pub fn content(&self, id: NodeId) -> Option<&str> {
        self.get(id).map(Node::content)
    }

    pub fn set_content(&mut self, id: NodeId, content: impl Into<String>) -> EditResult<()> {
        let node = self.get_mut(id).ok_or(EditError::StaleNode(id))?;
        node.content = content.into();
        Ok(())
    }

    /// Inserts a new leaf at `index` among `parent`'s children.
    pub fn add_child(
        &mut self,
        parent: NodeId,
        index: usize,
        content: impl Into<String>,
    ) -> EditResult<NodeId> {
        let len = self.checked(parent)?.children.len();
        if index > len {
            return Err(EditError::IndexOutOfBounds { index, len });
        }
        let id = self.alloc(Node::new(content, Some(parent)));
        self[parent].children.insert(index, id);
        self.grow(parent, 1);
        Ok(id)
    }

    /// Appends a new leaf after `parent`'s last child.
    pub fn push_child(&mut self, parent: NodeId, content: impl Into<String>) -> EditResult<NodeId> {
        let len = self.checked(parent)?.children.len();
        self.add_child(parent, len, content)
    }

    /// Appends a leaf without touching any descendant count.
    ///
    /// Used by bulk builders, which must call [`Tree::fix_descendants`] once
    /// they are done.
    pub(crate) fn attach_unsized(&mut self, parent: NodeId, content: impl Into<String>) -> NodeId {
        let id = self.alloc(Node::new(content, Some(parent)));
        self[parent].children.push(id);
        id
    }

    pub(crate) fn map_contents(&mut self, mut f: impl FnMut(&str) -> String) {
        for slot in &mut self.slots {
            if let Some(node) = slot.node.as_mut() {
                node.content = f(&node.content);
            }
        }
    }

    /// Recomputes every cached descendant count bottom-up and returns the
    /// root's count.
    pub fn fix_descendants(&mut self) -> usize {
        let order: Vec<NodeId> = self.iter().collect();
        for &id in order.iter().rev() {
            let total = self[id]
                .children
                .iter()
                .map(|&child| self[child].descendants + 1)
                .sum();
            self[id].descendants = total;
        }
        self[self.root].descendants
    }

    fn alloc(&mut self, node: Node) -> NodeId {
        if let Some(index) = self.free.pop() {
            let slot = &mut self.slots[index as usize];
            slot.node = Some(node);
            NodeId {
                index,
                generation: slot.generation,
            }
        } else {
            let index = self.slots.len() as u32;
            self.slots.push(Slot {
                generation: 0,
                node: Some(node),
            });
            NodeId {
                index,
                generation: 0,
            }
        }
    }

    fn release(&mut self, id: NodeId) -> Option<Node> {
        let slot = self.slots.get_mut(id.index as usize)?;
        if slot.generation != id.generation {
            return None;
        }
        let node = slot.node.take()?;
        slot.generation = slot.generation.wrapping_add(1);
        self.free.push(id.index);
        Some(node)
    }

    /// Adds `amount` to `from` and to every ancestor of `from`.
    fn grow(&mut self, from: NodeId, amount: usize) {
        let mut cursor = Some(from);
        while let Some(id) = cursor {
            let node = &mut self[id];
            node.descendants += amount;
            cursor = node.parent;
        }
    }

    /// Subtracts `amount` from `from` and from every ancestor of `from`.
    fn shrink(&mut self, from: NodeId, amount: usize) {
        let mut cursor = Some(from);
        while let Some(id) = cursor {
            let node = &mut self[id];
            debug_assert!(node.descendants >= amount);
            node.descendants = node.descendants.saturating_sub(amount);
            cursor = node.parent;
        }
    }
}

impl Default for Tree {
    fn default() -> Self {
        Self::document()
    }
}

impl Index<NodeId> for Tree {
    type Output = Node;

    fn index(&self, id: NodeId) -> &Node {
        match self.get(id) {
            Some(node) => node,
            None => panic!("node {id:?} is not part of this tree"),
        }
    }
}

impl IndexMut<NodeId> for Tree {
    fn index_mut(&mut self, id: NodeId) -> &mut Node {
        match self.get_mut(id) {
            Some(node) => node,
            None => panic!("node {id:?} is not part of this tree"),
        }
    }
}

#[cfg(test)]
#[path = "tree_tests.rs"]
mod tree_tests;
