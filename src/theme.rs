use ratatui::style::{Color, Modifier, Style};

use crate::tree::NodeKind;

/// Theme configuration for the tree view
#[derive(Clone, Debug)]
pub struct Theme {
    /// Foreground (text) color for the status bar
    pub status_bar_fg: Color,

    /// Background color for the status bar
    pub status_bar_bg: Color,

    /// Color for the current file name in the status bar
    pub filename_color: Color,

    /// Foreground color for the selected node's row
    pub selection_fg: Color,

    /// Background color for the selected node's row and its subtree gutter
    pub selection_bg: Color,

    /// Color for comment nodes
    pub comment_color: Color,

    /// Color for assignment nodes
    pub assignment_color: Color,

    /// Color for the document root row
    pub root_color: Color,

    /// Foreground color for the new-node prompt
    pub prompt_fg: Color,

    /// Background color for the new-node prompt
    pub prompt_bg: Color,
}

impl Default for Theme {
    fn default() -> Self {
        Self {
            status_bar_fg: Color::Black,
            status_bar_bg: Color::White,
            filename_color: Color::Blue,
            selection_fg: Color::White,
            selection_bg: Color::Blue,
            comment_color: Color::DarkGray,
            assignment_color: Color::Yellow,
            root_color: Color::Cyan,
            prompt_fg: Color::White,
            prompt_bg: Color::DarkGray,
        }
    }
}

impl Theme {
    /// Create a new theme with default colors
    pub fn new() -> Self {
        Self::default()
    }

    /// Get the style for the status bar
    pub fn status_bar_style(&self) -> Style {
        Style::default()
            .fg(self.status_bar_fg)
            .bg(self.status_bar_bg)
    }

    /// Get the style for the filename in the status bar
    pub fn filename_style(&self) -> Style {
        self.status_bar_style().fg(self.filename_color)
    }

    /// Get the style for the selected row
    pub fn selection_style(&self) -> Style {
        Style::default()
            .fg(self.selection_fg)
            .bg(self.selection_bg)
            .add_modifier(Modifier::BOLD)
    }

    /// Get the style for the gutter marking rows inside the selected subtree
    pub fn gutter_style(&self) -> Style {
        Style::default().bg(self.selection_bg)
    }

    pub fn root_style(&self) -> Style {
        Style::default()
            .fg(self.root_color)
            .add_modifier(Modifier::BOLD)
    }

    /// Get the style for a node of the given kind
    pub fn kind_style(&self, kind: NodeKind) -> Style {
        match kind {
            NodeKind::Comment => Style::default()
                .fg(self.comment_color)
                .add_modifier(Modifier::ITALIC),
            NodeKind::Assignment => Style::default().fg(self.assignment_color),
            NodeKind::Statement => Style::default(),
        }
    }

    /// Get the style for the new-node prompt
    pub fn prompt_style(&self) -> Style {
        Style::default().fg(self.prompt_fg).bg(self.prompt_bg)
    }
}
