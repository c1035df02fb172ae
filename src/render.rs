use ratatui::{
    style::Style,
    text::{Line, Span},
};
use unicode_width::UnicodeWidthChar;

use crate::theme::Theme;
use crate::tree::{NodeId, Tree};

/// One row per node, in pre-order, so a node's row number is its offset.
#[derive(Debug)]
pub struct RenderResult {
    pub lines: Vec<Line<'static>>,
    pub total_lines: usize,
    /// Row of the selection within `lines`, when it is in view.
    pub selected_line: Option<usize>,
}

#[derive(Clone, Copy, Debug)]
pub struct Viewport {
    pub scroll_top: usize,
    pub height: usize,
    pub width: usize,
    /// Columns per nesting level.
    pub indent: usize,
}

/// Renders the rows of `tree` visible through `viewport`.
///
/// Only visible nodes are visited: the first row is found with an offset
/// lookup and the rest by walking forward in pre-order.
pub fn render_tree(tree: &Tree, selection: NodeId, viewport: Viewport, theme: &Theme) -> RenderResult {
    let mut renderer = Renderer::new(tree, selection, viewport, theme);
    renderer.render();
    renderer.finish()
}

struct Renderer<'a> {
    tree: &'a Tree,
    selection: NodeId,
    selection_depth: usize,
    viewport: Viewport,
    theme: &'a Theme,
    lines: Vec<Line<'static>>,
    selected_line: Option<usize>,
}

impl<'a> Renderer<'a> {
    fn new(tree: &'a Tree, selection: NodeId, viewport: Viewport, theme: &'a Theme) -> Self {
        Self {
            tree,
            selection,
            selection_depth: tree.depth(selection),
            viewport,
            theme,
            lines: Vec::with_capacity(viewport.height),
            selected_line: None,
        }
    }

    fn render(&mut self) {
        if self.viewport.scroll_top >= self.tree.len() {
            return;
        }
        let mut cursor = Some(self.tree.node_at_offset(self.viewport.scroll_top));
        while let Some(id) = cursor {
            if self.lines.len() >= self.viewport.height {
                break;
            }
            self.render_row(id);
            cursor = self.tree.depth_first_walk(id);
        }
    }

    fn render_row(&mut self, id: NodeId) {
        let node = &self.tree[id];
        let depth = self.tree.depth(id);
        let indent = self.viewport.indent;
        let mut row = RowBuilder::new(self.viewport.width);

        if id == self.selection {
            self.selected_line = Some(self.lines.len());
            let style = self.theme.selection_style();
            row.push(" ".repeat(depth * indent), style);
            row.push(node.content().to_string(), style);
            row.fill(style);
        } else {
            let in_selection = self.tree.is_subnode(self.selection, id);
            let gutter_start = self.selection_depth * indent;
            if in_selection && depth > self.selection_depth {
                row.push(" ".repeat(gutter_start), Style::default());
                row.push(" ".repeat(indent), self.theme.gutter_style());
                row.push(" ".repeat(depth * indent - gutter_start - indent), Style::default());
            } else {
                row.push(" ".repeat(depth * indent), Style::default());
            }
            let style = match node.parent() {
                None => self.theme.root_style(),
                Some(_) => self.theme.kind_style(node.kind()),
            };
            row.push(node.content().to_string(), style);
        }

        self.lines.push(row.build());
    }

    fn finish(self) -> RenderResult {
        RenderResult {
            lines: self.lines,
            total_lines: self.tree.len(),
            selected_line: self.selected_line,
        }
    }
}

/// Collects styled spans, clipping everything past the row width.
struct RowBuilder {
    spans: Vec<Span<'static>>,
    remaining: usize,
}

impl RowBuilder {
    fn new(width: usize) -> Self {
        Self {
            spans: Vec::new(),
            remaining: width,
        }
    }

    fn push(&mut self, text: String, style: Style) {
        if text.is_empty() || self.remaining == 0 {
            return;
        }
        let (clipped, used) = clip_to_width(&text, self.remaining);
        self.remaining -= used;
        if !clipped.is_empty() {
            self.spans.push(Span::styled(clipped, style));
        }
    }

    /// Pads the rest of the row with `style`.
    fn fill(&mut self, style: Style) {
        let padding = " ".repeat(self.remaining);
        self.push(padding, style);
    }

    fn build(self) -> Line<'static> {
        Line::from(self.spans)
    }
}

/// Longest prefix of `text` at most `width` columns wide, and its width.
fn clip_to_width(text: &str, width: usize) -> (String, usize) {
    let mut used = 0;
    let mut clipped = String::new();
    for ch in text.chars() {
        let ch_width = UnicodeWidthChar::width(ch).unwrap_or(0);
        if used + ch_width > width {
            break;
        }
        used += ch_width;
        clipped.push(ch);
    }
    (clipped, used)
}

/// New scroll position keeping the selection in view.
///
/// `selected_row` is the selection's offset and `selected_height` the number
/// of rows its subtree takes. Leaving the viewport scrolls by half a page;
/// a selected subtree that would fit but is cut off at the bottom is scrolled
/// just enough to show it whole.
pub fn adjust_scroll(
    scroll_top: usize,
    selected_row: usize,
    selected_height: usize,
    viewport_height: usize,
    total_lines: usize,
) -> usize {
    let viewport = viewport_height.max(1);
    let half = (viewport / 2).max(1);
    let mut scroll = scroll_top;

    if selected_row < scroll {
        scroll = scroll.saturating_sub(half).min(selected_row);
    } else if selected_row - scroll >= viewport {
        scroll = (scroll + half).max(selected_row + 1 - viewport);
    } else if selected_row - scroll + selected_height > viewport && selected_height < viewport {
        scroll = selected_row + selected_height - viewport;
    }

    scroll.min(total_lines.saturating_sub(viewport))
}
