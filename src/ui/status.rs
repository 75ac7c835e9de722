use ratatui::prelude::*;
use ratatui::widgets::Paragraph;

use crate::app::{Model, ToastLevel};

pub fn render_prompt_bar(model: &Model, frame: &mut Frame, area: Rect) {
    let Some(prompt) = &model.prompt else {
        return;
    };
    let text = format!(
        "{}: {}\u{2588}  Enter: confirm  Esc: cancel",
        prompt.title(),
        prompt.input
    );
    let bar = Paragraph::new(text).style(Style::default().bg(Color::Blue).fg(Color::White));
    frame.render_widget(bar, area);
}

pub fn status_text(model: &Model) -> String {
    let buf = model.document.buffer();
    let cursor = buf.cursor();
    let line_text = buf.line_at(cursor.line).unwrap_or_default();
    let col = line_text
        .get(..cursor.col)
        .map_or(cursor.col, |before| before.chars().count());

    let dirty = if model.is_dirty() { " [+]" } else { "" };
    let nodes = model
        .sync
        .renderer()
        .tree()
        .map_or(0, crate::outline::OutlineNode::node_count);
    let pending = if model.sync.is_pending() { " *" } else { "" };
    let watch_indicator = if model.watch_enabled {
        " [watching]"
    } else {
        ""
    };

    format!(
        " {}{}  Ln {}, Col {}  [{}]  nodes {}{}{}  F1:help",
        model.document.name(),
        dirty,
        cursor.line + 1,
        col + 1,
        model.view_mode.as_str(),
        nodes,
        pending,
        watch_indicator
    )
}

pub fn render_status_bar(model: &Model, frame: &mut Frame, area: Rect) {
    let status_bar = Paragraph::new(status_text(model))
        .style(Style::default().bg(Color::DarkGray).fg(Color::White));
    frame.render_widget(status_bar, area);
}

pub fn render_toast_bar(model: &Model, frame: &mut Frame, area: Rect) {
    let Some((message, level)) = model.active_toast() else {
        return;
    };
    let (prefix, style) = match level {
        ToastLevel::Info => (
            "[info]",
            Style::default().bg(Color::DarkGray).fg(Color::White),
        ),
        ToastLevel::Warning => (
            "[warn]",
            Style::default().bg(Color::Yellow).fg(Color::Black),
        ),
        ToastLevel::Error => ("[error]", Style::default().bg(Color::Red).fg(Color::White)),
    };
    let toast = Paragraph::new(format!("{prefix} {message}")).style(style);
    frame.render_widget(toast, area);
}
