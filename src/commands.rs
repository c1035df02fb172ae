//! Editor commands and the key table that dispatches them.
//!
//! Every command has the same shape, `fn(&mut EditorSession) -> EditResult<bool>`,
//! returning whether the document changed. Commands that change the document
//! record an undo snapshot themselves.

use tracing::{debug, warn};

use crate::error::EditResult;
use crate::parser::import_file;
use crate::session::EditorSession;
use crate::tree::Tree;

pub type Command = fn(&mut EditorSession) -> EditResult<bool>;

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum Key {
    Char(char),
    Up,
    Down,
    PageUp,
    PageDown,
    Home,
    End,
}

pub struct Binding {
    pub key: Key,
    pub label: &'static str,
    pub run: Command,
}

impl Binding {
    const fn new(key: Key, label: &'static str, run: Command) -> Self {
        Self { key, label, run }
    }
}

pub static BINDINGS: &[Binding] = &[
    Binding::new(Key::Char('n'), "New child", new_child),
    Binding::new(Key::Char('Y'), "Cut subtree", cut_subtree),
    Binding::new(Key::Char('y'), "Cut node", cut_node),
    Binding::new(Key::Char('X'), "Delete subtree", delete_subtree),
    Binding::new(Key::Char('x'), "Delete node", delete_node),
    Binding::new(Key::Char('P'), "Paste before", paste_before),
    Binding::new(Key::Char('p'), "Paste after", paste_after),
    Binding::new(Key::Char('c'), "Copy subtree", copy_subtree),
    Binding::new(Key::Char('u'), "Undo", undo),
    Binding::new(Key::Char('r'), "Redo", redo),
    Binding::new(Key::Char('s'), "Save", save),
    Binding::new(Key::Char('i'), "Reload", reload),
    Binding::new(Key::Char('q'), "Quit", quit),
    Binding::new(Key::Up, "Previous", move_up),
    Binding::new(Key::Down, "Next", move_down),
    Binding::new(Key::PageUp, "Page up", page_up),
    Binding::new(Key::PageDown, "Page down", page_down),
    Binding::new(Key::Home, "First", move_first),
    Binding::new(Key::End, "Last", move_last),
];

/// One-line key summary for the status bar.
pub const HELP: &str = "n yYxX pP c ur s i q";

pub fn binding(key: Key) -> Option<&'static Binding> {
    BINDINGS.iter().find(|binding| binding.key == key)
}

/// Runs the command bound to `key`. Unbound keys do nothing.
pub fn dispatch(session: &mut EditorSession, key: Key) -> EditResult<bool> {
    let Some(binding) = binding(key) else {
        return Ok(false);
    };
    if key != Key::Char('q') {
        session.disarm_quit();
    }
    debug!(command = binding.label, "dispatch");
    let result = (binding.run)(session);
    if let Err(err) = &result {
        warn!(command = binding.label, %err, "command rejected");
    }
    result
}

const NO_CHILDREN: &str = "Comments and assignments cannot have children";

/// Opens the input prompt; [`insert_child`] finishes the command.
pub fn new_child(session: &mut EditorSession) -> EditResult<bool> {
    if !selection_takes_children(session) {
        session.set_status(NO_CHILDREN);
        return Ok(false);
    }
    session.begin_prompt();
    Ok(false)
}

/// Adds `content` as the first child of the selection and selects it.
/// Blank input, or a comment or assignment selection, adds nothing.
pub fn insert_child(session: &mut EditorSession, content: &str) -> EditResult<bool> {
    let content = content.trim();
    if content.is_empty() {
        return Ok(false);
    }
    if !selection_takes_children(session) {
        session.set_status(NO_CHILDREN);
        return Ok(false);
    }
    let parent = session.selection();
    let id = session.tree_mut().add_child(parent, 0, content)?;
    session.select(id)?;
    session.commit();
    Ok(true)
}

fn selection_takes_children(session: &EditorSession) -> bool {
    let node = &session.tree()[session.selection()];
    node.parent().is_none() || node.kind().takes_body()
}

pub fn cut_subtree(session: &mut EditorSession) -> EditResult<bool> {
    let Some(cut) = remove_subtree(session)? else {
        return Ok(false);
    };
    session.set_status(format!("Cut {}", summarize(&cut)));
    session.clipboard_mut().store(cut);
    Ok(true)
}

pub fn delete_subtree(session: &mut EditorSession) -> EditResult<bool> {
    Ok(remove_subtree(session)?.is_some())
}

pub fn cut_node(session: &mut EditorSession) -> EditResult<bool> {
    let Some(cut) = remove_node(session)? else {
        return Ok(false);
    };
    session.set_status(format!("Cut {}", summarize(&cut)));
    session.clipboard_mut().store(cut);
    Ok(true)
}

pub fn delete_node(session: &mut EditorSession) -> EditResult<bool> {
    Ok(remove_node(session)?.is_some())
}

/// Splits off the selected subtree. The selection moves to whatever now
/// occupies its offset: the next node after the subtree, or the last node.
fn remove_subtree(session: &mut EditorSession) -> EditResult<Option<Tree>> {
    let selection = session.selection();
    if selection == session.tree().root() && session.tree().is_empty() {
        return Ok(None);
    }
    let offset = session.selection_offset();
    let cut = session.tree_mut().split(selection)?;
    session.select_offset(offset);
    session.commit();
    Ok(Some(cut))
}

/// Detaches the selected node alone. Its first child, when it had one, takes
/// over the selection. The root stays put.
fn remove_node(session: &mut EditorSession) -> EditResult<Option<Tree>> {
    let selection = session.selection();
    if selection == session.tree().root() {
        return Ok(None);
    }
    let offset = session.selection_offset();
    let cut = session.tree_mut().detach(selection)?;
    session.select_offset(offset);
    session.commit();
    Ok(Some(cut))
}

pub fn paste_before(session: &mut EditorSession) -> EditResult<bool> {
    paste(session, Placement::Before)
}

pub fn paste_after(session: &mut EditorSession) -> EditResult<bool> {
    paste(session, Placement::After)
}

#[derive(Clone, Copy)]
enum Placement {
    Before,
    After,
}

/// Inserts a copy of the clipboard next to the selection and selects the
/// first inserted node. With the root selected, before/after mean the start
/// and end of the document.
fn paste(session: &mut EditorSession, placement: Placement) -> EditResult<bool> {
    let Some(piece) = session.clipboard().load() else {
        session.set_status("Buffer empty");
        return Ok(false);
    };
    let tree = session.tree();
    let selection = session.selection();
    let (parent, index) = match (tree[selection].parent(), placement) {
        (None, Placement::Before) => (selection, 0),
        (None, Placement::After) => (selection, tree[selection].children().len()),
        (Some(parent), placement) => {
            let position = tree.index_in_parent(selection).unwrap_or_default();
            match placement {
                Placement::Before => (parent, position),
                Placement::After => (parent, position + 1),
            }
        }
    };

    let inserted = session.tree_mut().merge(parent, index, piece)?;
    let Some(&first) = inserted.first() else {
        return Ok(false);
    };
    session.select(first)?;
    session.commit();
    Ok(true)
}

pub fn copy_subtree(session: &mut EditorSession) -> EditResult<bool> {
    let selection = session.selection();
    if selection == session.tree().root() && session.tree().is_empty() {
        return Ok(false);
    }
    let copy = session.tree().subtree(selection)?;
    session.set_status(format!("Copied {}", summarize(&copy)));
    session.clipboard_mut().store(copy);
    Ok(false)
}

pub fn undo(session: &mut EditorSession) -> EditResult<bool> {
    match session.history_mut().undo() {
        Some(snapshot) => {
            session.replace_tree(snapshot);
            session.mark_dirty();
            session.set_status("Undo");
            Ok(true)
        }
        None => {
            session.set_status("Nothing to undo");
            Ok(false)
        }
    }
}

pub fn redo(session: &mut EditorSession) -> EditResult<bool> {
    match session.history_mut().redo() {
        Some(snapshot) => {
            session.replace_tree(snapshot);
            session.mark_dirty();
            session.set_status("Redo");
            Ok(true)
        }
        None => {
            session.set_status("Nothing to redo");
            Ok(false)
        }
    }
}

pub fn move_up(session: &mut EditorSession) -> EditResult<bool> {
    let prev = session.tree().prev(session.selection());
    session.select(prev)?;
    Ok(false)
}

pub fn move_down(session: &mut EditorSession) -> EditResult<bool> {
    let next = session.tree().next(session.selection());
    session.select(next)?;
    Ok(false)
}

pub fn page_up(session: &mut EditorSession) -> EditResult<bool> {
    let offset = session.selection_offset().saturating_sub(session.page_size());
    session.select_offset(offset);
    Ok(false)
}

pub fn page_down(session: &mut EditorSession) -> EditResult<bool> {
    let offset = session.selection_offset().saturating_add(session.page_size());
    session.select_offset(offset);
    Ok(false)
}

pub fn move_first(session: &mut EditorSession) -> EditResult<bool> {
    let root = session.tree().root();
    session.select(root)?;
    Ok(false)
}

pub fn move_last(session: &mut EditorSession) -> EditResult<bool> {
    let tree = session.tree();
    let last = tree.left(tree.root());
    session.select(last)?;
    Ok(false)
}

/// Writes the document to its file. File errors end up in the status line.
pub fn save(session: &mut EditorSession) -> EditResult<bool> {
    let Some(path) = session.path().map(ToOwned::to_owned) else {
        session.set_status("No file name");
        return Ok(false);
    };
    match session.writer().write_file(&path, session.tree()) {
        Ok(()) => {
            session.mark_clean();
            session.set_status(format!("Saved {}", path.display()));
        }
        Err(err) => {
            warn!(path = %path.display(), %err, "save failed");
            session.set_status(format!("Save failed: {err}"));
        }
    }
    Ok(false)
}

/// Re-reads the document from its file as an undoable step.
pub fn reload(session: &mut EditorSession) -> EditResult<bool> {
    let Some(path) = session.path().map(ToOwned::to_owned) else {
        session.set_status("No file name");
        return Ok(false);
    };
    match import_file(&path) {
        Ok(tree) => {
            let nodes = tree.len() - 1;
            session.replace_tree(tree);
            session.commit();
            session.mark_clean();
            session.set_status(format!("Loaded {nodes} nodes from {}", path.display()));
            Ok(true)
        }
        Err(err) => {
            warn!(path = %path.display(), %err, "reload failed");
            session.set_status(format!("Reload failed: {err}"));
            Ok(false)
        }
    }
}

pub fn quit(session: &mut EditorSession) -> EditResult<bool> {
    session.request_quit();
    Ok(false)
}

fn summarize(piece: &Tree) -> String {
    piece[piece.root()]
        .children()
        .first()
        .map(|&top| piece.summary(top))
        .unwrap_or_default()
}

#[cfg(test)]
#[path = "commands_tests.rs"]
mod commands_tests;
