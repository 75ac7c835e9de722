//! Colors for the editor and mind-map panes.
//!
//! Plain ANSI colors so the terminal theme decides the actual shades.

use ratatui::style::{Color, Modifier, Style};

use crate::outline::NodeKind;

/// Style for a mind-map node label.
pub fn style_for_node(kind: NodeKind) -> Style {
    match kind {
        NodeKind::Root => Style::default()
            .fg(Color::Cyan)
            .add_modifier(Modifier::BOLD | Modifier::UNDERLINED),
        NodeKind::Heading { level } => heading_style(level),
        NodeKind::ListItem { .. } => Style::default(),
        NodeKind::Text => Style::default()
            .fg(Color::Indexed(245))
            .add_modifier(Modifier::ITALIC),
    }
}

fn heading_style(level: u8) -> Style {
    let fg = match level {
        1 => Color::Cyan,
        2 => Color::Green,
        3 => Color::Yellow,
        4 => Color::Blue,
        5 => Color::Magenta,
        _ => Color::Red,
    };
    let style = Style::default().fg(fg).add_modifier(Modifier::BOLD);
    if level == 1 {
        style.add_modifier(Modifier::UNDERLINED)
    } else {
        style
    }
}

/// Tree connectors drawn between nodes.
pub fn connector_style() -> Style {
    Style::default().fg(Color::DarkGray)
}

pub fn gutter_style() -> Style {
    Style::default().fg(Color::DarkGray)
}

pub fn cursor_style() -> Style {
    Style::default().bg(Color::White).fg(Color::Black)
}

/// Pane border; focused panes are highlighted.
pub fn border_style(focused: bool) -> Style {
    if focused {
        Style::default().fg(Color::Yellow)
    } else {
        Style::default().fg(Color::DarkGray)
    }
}
