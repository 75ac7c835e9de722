//! Terminal mind-map pane.
//!
//! [`MindMapView`] is the [`TreeRenderer`] the sync controller drives. It
//! lays the outline out as a connector diagram, one node per row:
//!
//! ```text
//! Markdown Mind Map
//! ├─ Features
//! │  ├─ Real-time visualization
//! │  └─ Markdown editing
//! └─ Benefits
//! ```
//!
//! Layout happens in [`TreeRenderer::render`]; drawing into a frame only
//! reads the prepared rows.

use ratatui::prelude::*;
use ratatui::widgets::{Block, Borders, Paragraph};
use unicode_width::{UnicodeWidthChar, UnicodeWidthStr};

use crate::outline::{NodeKind, OutlineNode};
use crate::sync::{RenderError, TreeRenderer};

use super::style;
use super::viewport::Viewport;

/// One laid-out node.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MapRow {
    /// Connector glyphs drawn before the label.
    pub prefix: String,
    pub label: String,
    pub kind: NodeKind,
    /// Source line of the node, if any.
    pub line: Option<usize>,
}

#[derive(Debug, Default)]
pub struct MindMapView {
    /// Tree behind the current rows
    tree: Option<OutlineNode>,
    /// Set but not yet laid out
    staged: Option<OutlineNode>,
    rows: Vec<MapRow>,
    viewport: Viewport,
    selected: usize,
    renders: u64,
}

impl MindMapView {
    pub fn new() -> Self {
        Self::default()
    }

    /// Tree the displayed rows were laid out from.
    pub const fn tree(&self) -> Option<&OutlineNode> {
        self.tree.as_ref()
    }

    /// Rows produced by the last successful render.
    pub fn rows(&self) -> &[MapRow] {
        &self.rows
    }

    pub const fn viewport(&self) -> &Viewport {
        &self.viewport
    }

    /// How many times the tree has been laid out.
    pub const fn render_count(&self) -> u64 {
        self.renders
    }

    pub const fn selected(&self) -> usize {
        self.selected
    }

    pub fn selected_row(&self) -> Option<&MapRow> {
        self.rows.get(self.selected)
    }

    /// Source line of the selected node.
    pub fn selected_line(&self) -> Option<usize> {
        self.selected_row().and_then(|row| row.line)
    }

    /// Set the drawable area (inside the pane border).
    pub fn resize(&mut self, width: u16, height: u16) {
        self.viewport.resize(width, height);
    }

    pub fn select_next(&mut self) {
        if self.selected + 1 < self.rows.len() {
            self.selected += 1;
        }
        self.viewport.ensure_visible(self.selected);
    }

    pub fn select_prev(&mut self) {
        self.selected = self.selected.saturating_sub(1);
        self.viewport.ensure_visible(self.selected);
    }

    pub fn select_first(&mut self) {
        self.selected = 0;
        self.viewport.go_to_top();
    }

    pub fn select_last(&mut self) {
        self.selected = self.rows.len().saturating_sub(1);
        self.viewport.ensure_visible(self.selected);
    }

    pub fn page_down(&mut self) {
        self.viewport.page_down();
        self.selected = self
            .selected
            .max(self.viewport.offset())
            .min(self.rows.len().saturating_sub(1));
    }

    pub fn page_up(&mut self) {
        self.viewport.page_up();
        let last_visible = self.viewport.visible_range().end.saturating_sub(1);
        self.selected = self.selected.min(last_visible);
    }

    /// Select the node that starts closest above (or at) a source line.
    pub fn select_line(&mut self, line: usize) {
        let best = self
            .rows
            .iter()
            .enumerate()
            .filter_map(|(i, row)| row.line.filter(|l| *l <= line).map(|l| (l, i)))
            .max_by_key(|(l, _)| *l);
        if let Some((_, idx)) = best {
            self.selected = idx;
            self.viewport.ensure_visible(idx);
        }
    }
}

impl TreeRenderer for MindMapView {
    fn set_data(&mut self, tree: OutlineNode) -> Result<(), RenderError> {
        self.staged = Some(tree);
        Ok(())
    }

    fn render(&mut self) -> Result<(), RenderError> {
        let tree = self
            .staged
            .take()
            .or_else(|| self.tree.take())
            .ok_or_else(|| RenderError::Degenerate("no tree set".to_string()))?;
        self.rows = layout(&tree);
        self.tree = Some(tree);
        self.viewport.set_total_rows(self.rows.len());
        self.selected = self.selected.min(self.rows.len().saturating_sub(1));
        self.renders += 1;
        Ok(())
    }

    fn fit_to_view(&mut self) -> Result<(), RenderError> {
        if self.viewport.is_empty() {
            return Err(RenderError::EmptyViewport);
        }
        self.viewport.go_to_top();
        if !self.viewport.visible_range().contains(&self.selected) {
            self.selected = 0;
        }
        Ok(())
    }
}

/// Flatten a tree into connector rows, pre-order.
pub fn layout(tree: &OutlineNode) -> Vec<MapRow> {
    let mut rows = Vec::with_capacity(tree.node_count());
    // (node, connector for this row, indent inherited by its children)
    let mut stack: Vec<(&OutlineNode, String, String)> =
        vec![(tree, String::new(), String::new())];
    while let Some((node, prefix, indent)) = stack.pop() {
        rows.push(MapRow {
            prefix,
            label: node.label.clone(),
            kind: node.kind,
            line: node.line,
        });
        let last = node.children.len().saturating_sub(1);
        for (i, child) in node.children.iter().enumerate().rev() {
            let (branch, rest) = if i == last {
                ("└─ ", "   ")
            } else {
                ("├─ ", "│  ")
            };
            stack.push((child, format!("{indent}{branch}"), format!("{indent}{rest}")));
        }
    }
    rows
}

/// Cut `text` to at most `max_width` columns, marking the cut with `…`.
pub fn truncate_to_width(text: &str, max_width: usize) -> String {
    if text.width() <= max_width {
        return text.to_string();
    }
    if max_width == 0 {
        return String::new();
    }
    let mut out = String::new();
    let mut used = 0;
    for ch in text.chars() {
        let w = ch.width().unwrap_or(0);
        if used + w > max_width - 1 {
            break;
        }
        out.push(ch);
        used += w;
    }
    out.push('…');
    out
}

/// Draw the pane. `focused` highlights the border and the selection.
pub fn render_mindmap(view: &MindMapView, frame: &mut Frame, area: Rect, focused: bool) {
    let title = view
        .tree
        .as_ref()
        .map_or_else(|| " Mind Map ".to_string(), |t| format!(" Mind Map ({}) ", t.node_count()));
    let block = Block::default()
        .title(title)
        .borders(Borders::ALL)
        .border_style(style::border_style(focused));
    let inner = block.inner(area);
    let width = inner.width as usize;

    let visible = view.rows.get(view.viewport.visible_range()).unwrap_or(&[]);
    let lines: Vec<Line> = visible
        .iter()
        .enumerate()
        .map(|(i, row)| {
            let prefix = truncate_to_width(&row.prefix, width);
            let room = width.saturating_sub(prefix.width());
            let label = if row.label.is_empty() { " " } else { row.label.as_str() };
            let mut label_style = style::style_for_node(row.kind);
            if focused && view.viewport.offset() + i == view.selected {
                label_style = label_style.reversed();
            }
            Line::from(vec![
                Span::styled(prefix, style::connector_style()),
                Span::styled(truncate_to_width(label, room), label_style),
            ])
        })
        .collect();

    frame.render_widget(Paragraph::new(lines).block(block), area);
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::outline::parse;
    use ratatui::Terminal;
    use ratatui::backend::TestBackend;

    fn rendered(text: &str, width: u16, height: u16) -> MindMapView {
        let mut view = MindMapView::new();
        view.resize(width, height);
        view.set_data(parse(text)).unwrap();
        view.render().unwrap();
        view
    }

    #[test]
    fn test_tree_changes_only_once_laid_out() {
        let mut view = rendered("# A\n- x", 40, 10);
        view.set_data(parse("# B\n- y\n- z")).unwrap();
        assert_eq!(view.tree().map(OutlineNode::node_count), Some(2));
        assert_eq!(view.rows().len(), 2);

        view.render().unwrap();
        assert_eq!(view.tree().map(|t| t.label.as_str()), Some("B"));
        assert_eq!(view.rows().len(), 3);
    }

    #[test]
    fn test_render_without_data_fails() {
        let mut view = MindMapView::new();
        assert!(view.render().is_err());
        assert!(view.tree().is_none());
        assert!(view.rows().is_empty());
    }

    fn row_text(row: &MapRow) -> String {
        format!("{}{}", row.prefix, row.label)
    }

    #[test]
    fn test_layout_draws_connectors() {
        let view = rendered("# Title\n## A\n- a1\n- a2\n## B", 40, 10);
        let rows: Vec<String> = view.rows().iter().map(row_text).collect();
        assert_eq!(rows, vec![
            "Title",
            "├─ A",
            "│  ├─ a1",
            "│  └─ a2",
            "└─ B",
        ]);
    }

    #[test]
    fn test_rows_keep_source_lines() {
        let view = rendered("# T\n\n- item", 40, 10);
        assert_eq!(view.rows()[0].line, Some(0));
        assert_eq!(view.rows()[1].line, Some(2));
    }

    #[test]
    fn test_render_without_data_is_degenerate() {
        let mut view = MindMapView::new();
        assert!(matches!(view.render(), Err(RenderError::Degenerate(_))));
    }

    #[test]
    fn test_fit_on_zero_sized_viewport_errors() {
        let mut view = rendered("# T", 0, 0);
        assert_eq!(view.fit_to_view(), Err(RenderError::EmptyViewport));
    }

    #[test]
    fn test_fit_scrolls_back_to_root() {
        let text = (0..30).fold("# Root".to_string(), |acc, i| format!("{acc}\n- item {i}"));
        let mut view = rendered(&text, 40, 5);
        view.select_last();
        assert!(view.viewport().offset() > 0);
        view.select_first();
        view.page_down();
        assert_eq!(view.selected(), 5);
        view.fit_to_view().unwrap();
        assert_eq!(view.viewport().offset(), 0);
        assert_eq!(view.selected(), 0);
    }

    #[test]
    fn test_selection_clamped_when_tree_shrinks() {
        let mut view = rendered("# T\n- a\n- b\n- c", 40, 10);
        view.select_last();
        assert_eq!(view.selected(), 3);
        view.set_data(parse("# T")).unwrap();
        view.render().unwrap();
        assert_eq!(view.selected(), 0);
        assert_eq!(view.selected_line(), Some(0));
    }

    #[test]
    fn test_select_line_picks_nearest_node_above() {
        let mut view = rendered("# T\n\n## A\nprose\n- x", 40, 10);
        view.select_line(3);
        assert_eq!(view.selected_row().map(|r| r.label.as_str()), Some("A"));
    }

    #[test]
    fn test_truncate_to_width_handles_wide_chars() {
        assert_eq!(truncate_to_width("hello", 10), "hello");
        assert_eq!(truncate_to_width("hello", 4), "hel…");
        assert_eq!(truncate_to_width("日本語", 4), "日…");
        assert_eq!(truncate_to_width("abc", 0), "");
    }

    #[test]
    fn test_render_mindmap_draws_into_buffer() {
        let view = rendered("# Plan\n- one\n- two", 20, 6);
        let backend = TestBackend::new(22, 8);
        let mut terminal = Terminal::new(backend).unwrap();
        terminal
            .draw(|frame| render_mindmap(&view, frame, frame.area(), true))
            .unwrap();
        let buffer = terminal.backend().buffer();
        let row = |y: u16| -> String {
            (0..buffer.area.width)
                .map(|x| buffer[(x, y)].symbol().to_string())
                .collect()
        };
        assert!(row(0).contains("Mind Map (3)"));
        assert!(row(1).contains("Plan"));
        assert!(row(2).contains("├─ one"));
        assert!(row(3).contains("└─ two"));
    }
}
