use std::{
    path::{Path, PathBuf},
    time::{Duration, Instant},
};

use crate::clipboard::Clipboard;
use crate::config::EditorConfig;
use crate::error::EditResult;
use crate::history::History;
use crate::tree::{NodeId, Tree};
use crate::writer::Writer;

/// Everything the editor knows about one open document.
///
/// The selection always names a live node of `tree`; every operation that
/// replaces or reshapes the tree re-resolves it by pre-order offset.
#[derive(Debug)]
pub struct EditorSession {
    tree: Tree,
    selection: NodeId,
    clipboard: Clipboard,
    history: History,
    writer: Writer,
    path: Option<PathBuf>,
    dirty: bool,
    status: Option<(String, Instant)>,
    prompt: Option<String>,
    page_size: usize,
    quit_armed: bool,
    should_quit: bool,
}

impl EditorSession {
    pub fn new(tree: Tree, config: &EditorConfig) -> Self {
        let mut history = History::with_capacity(config.history_capacity);
        history.store(&tree);
        let selection = tree.root();
        Self {
            tree,
            selection,
            clipboard: Clipboard::new(),
            history,
            writer: Writer::new().with_indent(config.writer_indent),
            path: None,
            dirty: false,
            status: None,
            prompt: None,
            page_size: config.page_size.max(1),
            quit_armed: false,
            should_quit: false,
        }
    }

    pub fn with_path(mut self, path: impl Into<PathBuf>) -> Self {
        self.path = Some(path.into());
        self
    }

    pub fn tree(&self) -> &Tree {
        &self.tree
    }

    pub(crate) fn tree_mut(&mut self) -> &mut Tree {
        &mut self.tree
    }

    pub fn selection(&self) -> NodeId {
        self.selection
    }

    pub fn select(&mut self, id: NodeId) -> EditResult<()> {
        self.tree.checked(id)?;
        self.selection = id;
        Ok(())
    }

    /// Selects the node at pre-order `offset`, clamped to the last node.
    pub fn select_offset(&mut self, offset: usize) {
        self.selection = self.tree.node_at_offset(offset);
    }

    /// Pre-order offset of the selection.
    pub fn selection_offset(&self) -> usize {
        self.tree.offset(self.selection).unwrap_or(0)
    }

    pub fn clipboard(&self) -> &Clipboard {
        &self.clipboard
    }

    pub(crate) fn clipboard_mut(&mut self) -> &mut Clipboard {
        &mut self.clipboard
    }

    pub fn history(&self) -> &History {
        &self.history
    }

    pub(crate) fn history_mut(&mut self) -> &mut History {
        &mut self.history
    }

    pub fn writer(&self) -> &Writer {
        &self.writer
    }

    pub fn path(&self) -> Option<&Path> {
        self.path.as_deref()
    }

    pub fn is_dirty(&self) -> bool {
        self.dirty
    }

    pub(crate) fn mark_clean(&mut self) {
        self.dirty = false;
    }

    pub(crate) fn mark_dirty(&mut self) {
        self.dirty = true;
    }

    /// Records the current tree as a new undo step and marks it modified.
    pub(crate) fn commit(&mut self) {
        self.history.store(&self.tree);
        self.dirty = true;
    }

    /// Swaps in `tree` (an undo/redo snapshot or a reloaded file), keeping the
    /// selection at the same pre-order offset where possible.
    pub(crate) fn replace_tree(&mut self, tree: Tree) {
        let offset = self.selection_offset();
        self.tree = tree;
        self.select_offset(offset);
    }

    pub fn status(&self) -> Option<&str> {
        self.status.as_ref().map(|(message, _)| message.as_str())
    }

    pub fn set_status(&mut self, message: impl Into<String>) {
        self.status = Some((message.into(), Instant::now()));
    }

    /// Drops the status message once it is older than `timeout`.
    pub fn prune_status(&mut self, timeout: Duration) {
        if self
            .status
            .as_ref()
            .is_some_and(|(_, shown)| shown.elapsed() > timeout)
        {
            self.status = None;
        }
    }

    /// Text typed so far for a new node, while the input prompt is open.
    pub fn prompt(&self) -> Option<&str> {
        self.prompt.as_deref()
    }

    pub fn begin_prompt(&mut self) {
        self.prompt = Some(String::new());
    }

    pub fn prompt_push(&mut self, ch: char) {
        if let Some(prompt) = self.prompt.as_mut() {
            prompt.push(ch);
        }
    }

    pub fn prompt_backspace(&mut self) {
        if let Some(prompt) = self.prompt.as_mut() {
            prompt.pop();
        }
    }

    /// Closes the prompt and returns what was typed.
    pub fn take_prompt(&mut self) -> Option<String> {
        self.prompt.take()
    }

    /// Rows moved by page up/down.
    pub fn page_size(&self) -> usize {
        self.page_size
    }

    pub fn set_page_size(&mut self, rows: usize) {
        self.page_size = rows.max(1);
    }

    pub fn should_quit(&self) -> bool {
        self.should_quit
    }

    /// Quits at once when everything is saved. With unsaved changes the
    /// first request only arms the quit and a second one confirms it.
    pub fn request_quit(&mut self) {
        if !self.dirty || self.quit_armed {
            self.should_quit = true;
        } else {
            self.quit_armed = true;
            self.set_status("Unsaved changes, press q again to quit");
        }
    }

    pub(crate) fn disarm_quit(&mut self) {
        self.quit_armed = false;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::parser::parse;

    fn session(source: &str) -> EditorSession {
        EditorSession::new(parse(source).unwrap(), &EditorConfig::default())
    }

    #[test]
    fn starts_on_root_with_one_snapshot() {
        let session = session("cube(1); sphere(2);");
        assert_eq!(session.selection(), session.tree().root());
        assert_eq!(session.history().len(), 1);
        assert!(!session.is_dirty());
        assert!(session.path().is_none());
    }

    #[test]
    fn select_offset_clamps_to_last_node() {
        let mut session = session("a(){b();} c();");
        session.select_offset(2);
        assert_eq!(session.tree().content(session.selection()), Some("b()"));
        session.select_offset(99);
        assert_eq!(session.tree().content(session.selection()), Some("c()"));
        assert_eq!(session.selection_offset(), 3);
    }

    #[test]
    fn select_rejects_foreign_handles() {
        let mut session = session("a();");
        let mut other = Tree::document();
        let root = other.root();
        let mut stale = other.push_child(root, "x").unwrap();
        for _ in 0..3 {
            stale = other.push_child(stale, "y").unwrap();
        }
        assert!(session.select(stale).is_err());
        assert_eq!(session.selection(), session.tree().root());
    }

    #[test]
    fn replace_tree_keeps_selection_offset() {
        let mut session = session("a(); b(); c();");
        session.select_offset(2);
        session.replace_tree(parse("x(); y(); z();").unwrap());
        assert_eq!(session.tree().content(session.selection()), Some("y()"));

        session.replace_tree(parse("only();").unwrap());
        assert_eq!(session.tree().content(session.selection()), Some("only()"));
    }

    #[test]
    fn prompt_collects_text() {
        let mut session = session("");
        assert!(session.prompt().is_none());
        session.prompt_push('x');
        assert!(session.prompt().is_none());

        session.begin_prompt();
        for ch in "cubex".chars() {
            session.prompt_push(ch);
        }
        session.prompt_backspace();
        assert_eq!(session.prompt(), Some("cube"));
        assert_eq!(session.take_prompt().as_deref(), Some("cube"));
        assert!(session.prompt().is_none());
    }

    #[test]
    fn quit_needs_confirmation_when_dirty() {
        let mut clean = session("a();");
        clean.request_quit();
        assert!(clean.should_quit());

        let mut dirty = session("a();");
        dirty.commit();
        dirty.request_quit();
        assert!(!dirty.should_quit());
        assert!(dirty.status().is_some());
        dirty.disarm_quit();
        dirty.request_quit();
        assert!(!dirty.should_quit());
        dirty.request_quit();
        assert!(dirty.should_quit());
    }

    #[test]
    fn status_expires() {
        let mut session = session("");
        session.set_status("Saved");
        session.prune_status(Duration::from_secs(60));
        assert_eq!(session.status(), Some("Saved"));
        session.prune_status(Duration::ZERO);
        std::thread::sleep(Duration::from_millis(2));
        session.prune_status(Duration::ZERO);
        assert!(session.status().is_none());
    }
}
