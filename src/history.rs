//! # Undo/Redo History
//!
//! A bounded, linear list of whole-document snapshots with a single cursor.
//!
//! ## Design
//!
//! - `store` records a copy of the document after an edit
//! - Storing while the cursor is behind the newest entry drops the redo tail
//! - `undo` / `redo` move the cursor and hand back a copy of that snapshot
//! - The oldest snapshot is evicted once capacity is exceeded
//!
//! Snapshots are never shared with the live document: everything going in or
//! coming out is a deep copy.

use std::collections::VecDeque;

use tracing::debug;

use crate::tree::Tree;

pub const DEFAULT_CAPACITY: usize = 100;

#[derive(Clone, Debug)]
pub struct History {
    snapshots: VecDeque<Tree>,
    cursor: usize,
    capacity: usize,
}

impl History {
    pub fn new() -> Self {
        Self::with_capacity(DEFAULT_CAPACITY)
    }

    /// A history keeping at most `capacity` snapshots (at least one).
    pub fn with_capacity(capacity: usize) -> Self {
        let capacity = capacity.max(1);
        Self {
            snapshots: VecDeque::with_capacity(capacity),
            cursor: 0,
            capacity,
        }
    }

    /// Records a copy of `tree` as the newest snapshot.
    pub fn store(&mut self, tree: &Tree) {
        if !self.snapshots.is_empty() {
            self.snapshots.truncate(self.cursor + 1);
        }
        self.snapshots.push_back(tree.clone());
        if self.snapshots.len() > self.capacity {
            self.snapshots.pop_front();
        }
        self.cursor = self.snapshots.len() - 1;
        debug!(
            snapshots = self.snapshots.len(),
            cursor = self.cursor,
            "stored snapshot"
        );
    }

    /// Steps back one snapshot. Returns `None`, leaving the history as it
    /// was, when already at the oldest one.
    pub fn undo(&mut self) -> Option<Tree> {
        if !self.can_undo() {
            return None;
        }
        self.cursor -= 1;
        self.snapshots.get(self.cursor).cloned()
    }

    /// Steps forward one snapshot. Returns `None`, leaving the history as it
    /// was, when already at the newest one.
    pub fn redo(&mut self) -> Option<Tree> {
        if !self.can_redo() {
            return None;
        }
        self.cursor += 1;
        self.snapshots.get(self.cursor).cloned()
    }

    pub fn can_undo(&self) -> bool {
        self.cursor > 0
    }

    pub fn can_redo(&self) -> bool {
        self.cursor + 1 < self.snapshots.len()
    }

    /// Number of snapshots currently held.
    pub fn len(&self) -> usize {
        self.snapshots.len()
    }

    pub fn is_empty(&self) -> bool {
        self.snapshots.is_empty()
    }

    pub fn capacity(&self) -> usize {
        self.capacity
    }

    pub fn clear(&mut self) {
        self.snapshots.clear();
        self.cursor = 0;
    }
}

impl Default for History {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn doc(items: &[&str]) -> Tree {
        let mut tree = Tree::document();
        let root = tree.root();
        for item in items {
            tree.push_child(root, *item).unwrap();
        }
        tree
    }

    #[test]
    fn test_empty_history_cannot_move() {
        let mut history = History::new();
        assert!(history.is_empty());
        assert!(history.undo().is_none());
        assert!(history.redo().is_none());
    }

    #[test]
    fn test_undo_and_redo_walk_snapshots() {
        let mut history = History::new();
        history.store(&doc(&["a"]));
        history.store(&doc(&["a", "b"]));
        history.store(&doc(&["a", "b", "c"]));

        assert_eq!(history.undo(), Some(doc(&["a", "b"])));
        assert_eq!(history.undo(), Some(doc(&["a"])));
        assert_eq!(history.undo(), None);
        assert_eq!(history.redo(), Some(doc(&["a", "b"])));
        assert_eq!(history.redo(), Some(doc(&["a", "b", "c"])));
        assert_eq!(history.redo(), None);
    }

    #[test]
    fn test_store_drops_redo_tail() {
        let mut history = History::new();
        history.store(&doc(&["a"]));
        history.store(&doc(&["a", "b"]));
        history.undo();
        assert!(history.can_redo());

        history.store(&doc(&["a", "x"]));
        assert!(!history.can_redo());
        assert_eq!(history.len(), 2);
        assert_eq!(history.undo(), Some(doc(&["a"])));
        assert_eq!(history.redo(), Some(doc(&["a", "x"])));
    }

    #[test]
    fn test_capacity_keeps_most_recent() {
        let mut history = History::with_capacity(3);
        for i in 0..5 {
            let items: Vec<String> = (0..=i).map(|n| format!("n{n}")).collect();
            let refs: Vec<&str> = items.iter().map(String::as_str).collect();
            history.store(&doc(&refs));
        }
        assert_eq!(history.len(), 3);

        assert_eq!(history.undo().map(|tree| tree.len()), Some(5));
        assert_eq!(history.undo().map(|tree| tree.len()), Some(4));
        assert!(history.undo().is_none());
        assert!(history.undo().is_none());
        assert_eq!(history.redo().map(|tree| tree.len()), Some(5));
        assert_eq!(history.redo().map(|tree| tree.len()), Some(6));
    }

    #[test]
    fn test_failed_undo_leaves_state_alone() {
        let mut history = History::with_capacity(2);
        history.store(&doc(&["a"]));
        history.store(&doc(&["a", "b"]));
        assert!(history.undo().is_some());
        assert!(history.undo().is_none());
        assert_eq!(history.redo(), Some(doc(&["a", "b"])));
    }

    #[test]
    fn test_snapshots_are_isolated() {
        let mut history = History::new();
        let mut live = doc(&["a"]);
        history.store(&live);
        let root = live.root();
        live.push_child(root, "b").unwrap();
        history.store(&live);
        live.push_child(root, "c").unwrap();

        let mut restored = history.undo().unwrap();
        assert_eq!(restored, doc(&["a"]));
        let restored_root = restored.root();
        restored.push_child(restored_root, "mutated").unwrap();

        assert_eq!(history.redo(), Some(doc(&["a", "b"])));
        assert_eq!(history.undo(), Some(doc(&["a"])));
    }

    #[test]
    fn test_zero_capacity_is_clamped() {
        let mut history = History::with_capacity(0);
        history.store(&doc(&["a"]));
        history.store(&doc(&["b"]));
        assert_eq!(history.capacity(), 1);
        assert_eq!(history.len(), 1);
        assert!(!history.can_undo());
    }
}
