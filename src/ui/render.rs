use ratatui::prelude::*;
use ratatui::widgets::{Block, Borders, Clear, Paragraph};

use crate::app::{Focus, Model};
use crate::config::ViewMode;

use super::{EDITOR_WIDTH_PERCENT, MINDMAP_WIDTH_PERCENT, mindmap, overlays, status, style};

/// Where each pane goes for a view mode. Hidden panes are `None`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PaneLayout {
    pub editor: Option<Rect>,
    pub mindmap: Option<Rect>,
    /// Bottom row for the status bar.
    pub status: Rect,
}

pub fn split_main_columns(area: Rect) -> std::rc::Rc<[Rect]> {
    Layout::default()
        .direction(Direction::Horizontal)
        .constraints([
            Constraint::Percentage(EDITOR_WIDTH_PERCENT),
            Constraint::Percentage(MINDMAP_WIDTH_PERCENT),
        ])
        .split(area)
}

pub fn pane_layout(area: Rect, mode: ViewMode) -> PaneLayout {
    let body = Rect {
        height: area.height.saturating_sub(1),
        ..area
    };
    let status = Rect {
        y: area.y + area.height.saturating_sub(1),
        height: area.height.min(1),
        ..area
    };
    match mode {
        ViewMode::Split => {
            let cols = split_main_columns(body);
            PaneLayout {
                editor: Some(cols[0]),
                mindmap: Some(cols[1]),
                status,
            }
        }
        ViewMode::Editor => PaneLayout {
            editor: Some(body),
            mindmap: None,
            status,
        },
        ViewMode::Mindmap => PaneLayout {
            editor: None,
            mindmap: Some(body),
            status,
        },
    }
}

/// Render the complete UI.
pub fn render(model: &Model, frame: &mut Frame) {
    let area = frame.area();
    let panes = pane_layout(area, model.view_mode);

    if let Some(rect) = panes.editor {
        render_editor(model, frame, rect);
    }
    if let Some(rect) = panes.mindmap {
        mindmap::render_mindmap(
            model.sync.renderer(),
            frame,
            rect,
            model.focus == Focus::MindMap,
        );
    }

    // Prompt and toast sit just above the status bar, over the panes.
    let mut footer_y = panes.status.y;
    if model.prompt.is_some() && footer_y > area.y {
        footer_y -= 1;
        status::render_prompt_bar(model, frame, Rect { y: footer_y, ..panes.status });
    }
    if model.active_toast().is_some() && footer_y > area.y {
        footer_y -= 1;
        status::render_toast_bar(model, frame, Rect { y: footer_y, ..panes.status });
    }
    status::render_status_bar(model, frame, panes.status);

    if model.help_visible {
        overlays::render_help_overlay(model, frame, area);
    }
}

fn render_editor(model: &Model, frame: &mut Frame, area: Rect) {
    let buf = model.document.buffer();
    let focused = model.focus == Focus::Editor;
    let dirty = if buf.is_dirty() { " [+]" } else { "" };
    let block = Block::default()
        .title(format!(" {}{dirty} ", model.document.name()))
        .borders(Borders::ALL)
        .border_style(style::border_style(focused));
    let inner = block.inner(area);

    let total_lines = buf.line_count();
    let gutter_width = line_number_width(total_lines) as usize;
    let cursor = buf.cursor();

    let content: Vec<Line> = model
        .editor_viewport
        .visible_range()
        .map(|line_idx| {
            let line_text = buf.line_at(line_idx).unwrap_or_default();
            let start = byte_at_column(&line_text, model.editor_col_offset);
            let visible = &line_text[start..];
            let line_num = format!("{:>gutter_width$} ", line_idx + 1);
            let mut spans = vec![Span::styled(line_num, style::gutter_style())];
            if focused && line_idx == cursor.line {
                spans.extend(cursor_spans(visible, cursor.col.saturating_sub(start)));
            } else {
                spans.push(Span::raw(visible.to_string()));
            }
            Line::from(spans)
        })
        .collect();

    frame.render_widget(Clear, area);
    frame.render_widget(block, area);
    frame.render_widget(Paragraph::new(content), inner);
}

/// Byte offset of the first character starting at or after display
/// column `skip`. A wide character cut by the edge is dropped.
fn byte_at_column(line: &str, skip: usize) -> usize {
    use unicode_width::UnicodeWidthChar;
    let mut used = 0;
    for (idx, ch) in line.char_indices() {
        if used >= skip {
            return idx;
        }
        used += ch.width().unwrap_or(0);
    }
    line.len()
}

/// Split a line around the cursor so the cursor cell can be highlighted.
fn cursor_spans(line: &str, col: usize) -> Vec<Span<'static>> {
    let col = col.min(line.len());
    let (before, rest) = line.split_at(col);
    let mut chars = rest.chars();
    let under = chars.next().map_or_else(|| " ".to_string(), String::from);
    let after = chars.as_str();

    let mut spans = Vec::with_capacity(3);
    if !before.is_empty() {
        spans.push(Span::raw(before.to_string()));
    }
    spans.push(Span::styled(under, style::cursor_style()));
    if !after.is_empty() {
        spans.push(Span::raw(after.to_string()));
    }
    spans
}

/// Calculate the width needed for line numbers.
pub const fn line_number_width(total_lines: usize) -> u16 {
    if total_lines < 10 {
        1
    } else if total_lines < 100 {
        2
    } else if total_lines < 1_000 {
        3
    } else if total_lines < 10_000 {
        4
    } else if total_lines < 100_000 {
        5
    } else {
        6
    }
}
