use crate::tree::Tree;

/// Single-slot holder for a detached subtree.
///
/// Loading hands out a copy, so pasting the same contents twice gives two
/// unrelated subtrees.
#[derive(Clone, Debug, Default)]
pub struct Clipboard {
    held: Option<Tree>,
}

impl Clipboard {
    pub fn new() -> Self {
        Self::default()
    }

    /// Replaces whatever was held before.
    pub fn store(&mut self, subtree: Tree) {
        self.held = Some(subtree);
    }

    pub fn load(&self) -> Option<Tree> {
        self.held.clone()
    }

    pub fn peek(&self) -> Option<&Tree> {
        self.held.as_ref()
    }

    pub fn is_empty(&self) -> bool {
        self.held.is_none()
    }

    pub fn clear(&mut self) {
        self.held = None;
    }

    /// Status-bar description of the held contents.
    pub fn describe(&self) -> String {
        let Some(held) = &self.held else {
            return "Buffer empty".to_string();
        };
        let tops = held[held.root()].children();
        match tops {
            [] => "Buffer empty".to_string(),
            [only] => format!("Buffer: {}", held.summary(*only)),
            [first, rest @ ..] => format!("Buffer: {} (+{})", held.summary(*first), rest.len()),
        }
    }
}
