use ratatui::prelude::*;
use ratatui::widgets::{Block, Borders, Clear, Padding, Paragraph};

use crate::app::Model;

fn help_lines(model: &Model) -> Vec<Line<'static>> {
    let global_cfg = model
        .config_global_path
        .as_ref()
        .map_or_else(|| "<unknown>".to_string(), |p| p.display().to_string());
    let local_cfg = model
        .config_local_path
        .as_ref()
        .map_or_else(|| "<none>".to_string(), |p| p.display().to_string());

    let section_style = Style::default()
        .fg(Color::Yellow)
        .add_modifier(Modifier::BOLD);

    let mut lines: Vec<Line> = Vec::new();
    let mut section = |title: &'static str, rows: &[&'static str]| {
        lines.push(Line::styled(title, section_style));
        lines.extend(rows.iter().map(|row| Line::raw(*row)));
        lines.push(Line::raw(""));
    };

    section(
        "Editor",
        &[
            "  Arrows, Home/End    Move cursor",
            "  Ctrl+Left/Right     Word movement",
            "  Ctrl+Home/End       Buffer start / end",
            "  PageUp/PageDown     Scroll editor",
            "  Tab                 Indent (nests list items)",
            "  Esc                 Focus mind map",
        ],
    );
    section(
        "Formatting",
        &[
            "  Alt-b / Alt-i       Bold / italic",
            "  Alt-1/2/3           Heading level",
            "  Alt-l / Alt-n       Bullet / numbered item",
        ],
    );
    section(
        "Mind map",
        &[
            "  j/k or Up/Down      Select node",
            "  Space / b           Page down / up",
            "  g / G               First / last node",
            "  Enter               Jump to source line",
            "  f                   Fit to view",
            "  Tab / Esc / e       Focus editor",
        ],
    );
    section(
        "Document",
        &[
            "  Ctrl-s              Save",
            "  Ctrl-o              Open file",
            "  Ctrl-n              New document",
            "  Ctrl-r / F6         Rename",
            "  Ctrl-l              Clear document",
            "  Ctrl-w              Toggle watch",
            "  F5                  Reload from disk",
        ],
    );
    section(
        "Other",
        &[
            "  F2                  Cycle split / editor / mind map",
            "  F1                  Toggle help",
            "  Ctrl-q / Ctrl-c     Quit",
        ],
    );

    lines.push(Line::styled("Config", section_style));
    lines.push(Line::raw(format!("  Global: {global_cfg}")));
    lines.push(Line::raw(format!("  Local override: {local_cfg}")));
    lines
}

pub fn render_help_overlay(model: &Model, frame: &mut Frame, area: Rect) {
    let popup_width = area.width.saturating_sub(12).max(48);
    let popup_height = area.height.saturating_sub(6).max(12);
    let popup = centered_popup_rect(popup_width, popup_height, area);
    let all_lines = help_lines(model);

    let block = Block::default()
        .title("Help")
        .borders(Borders::ALL)
        .padding(Padding::uniform(1))
        .style(Style::default().bg(Color::Black).fg(Color::White));
    let inner = block.inner(popup);

    frame.render_widget(Clear, popup);
    frame.render_widget(block, popup);

    // Last row is the footer hint
    let content_height = inner.height.saturating_sub(1);
    let max_scroll = all_lines.len().saturating_sub(usize::from(content_height));
    let scroll = model.help_scroll_offset.min(max_scroll);
    let visible: Vec<Line> = all_lines
        .into_iter()
        .skip(scroll)
        .take(usize::from(content_height))
        .collect();

    let content_area = Rect::new(inner.x, inner.y, inner.width, content_height);
    frame.render_widget(Paragraph::new(visible), content_area);

    let footer_area = Rect::new(inner.x, inner.y + content_height, inner.width, 1);
    let footer = Line::styled(
        "j/k scroll \u{2502} Esc closes",
        Style::default().fg(Color::Indexed(245)),
    );
    frame.render_widget(Paragraph::new(footer), footer_area);
}

pub fn centered_popup_rect(width: u16, height: u16, area: Rect) -> Rect {
    let w = width.min(area.width);
    let h = height.min(area.height);
    let x = area.x + (area.width.saturating_sub(w) / 2);
    let y = area.y + (area.height.saturating_sub(h) / 2);
    Rect::new(x, y, w, h)
}
