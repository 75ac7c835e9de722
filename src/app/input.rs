use crossterm::event::{
    Event, KeyCode, KeyEvent, KeyEventKind, KeyModifiers, MouseButton, MouseEvent, MouseEventKind,
};
use ratatui::layout::Rect;

use crate::app::model::{Focus, PromptKind};
use crate::app::{App, Message, Model};
use crate::editor::{Direction, Format};

use super::event_loop::ResizeDebouncer;

/// Spaces inserted by Tab; deeper indentation nests list items.
const TAB_INSERT: &str = "  ";
const WHEEL_LINES: usize = 3;

impl App {
    pub(super) fn handle_event(
        event: &Event,
        model: &Model,
        now_ms: u64,
        resize_debouncer: &mut ResizeDebouncer,
    ) -> Option<Message> {
        match event {
            Event::Key(key) if key.kind != KeyEventKind::Release => Self::handle_key(*key, model),
            Event::Mouse(mouse) => Self::handle_mouse(*mouse, model),
            Event::Resize(w, h) => {
                crate::perf::log_event("event.resize.queue", format!("width={w} height={h}"));
                resize_debouncer.queue(*w, *h, now_ms);
                None
            }
            Event::Paste(text) if model.prompt.is_none() && model.focus == Focus::Editor => {
                Some(Message::EditorInsertStr(text.replace("\r\n", "\n").replace('\r', "\n")))
            }
            _ => None,
        }
    }

    pub(super) fn handle_key(key: KeyEvent, model: &Model) -> Option<Message> {
        let ctrl = key.modifiers.contains(KeyModifiers::CONTROL);
        let alt = key.modifiers.contains(KeyModifiers::ALT);

        if model.help_visible {
            return match key.code {
                KeyCode::Esc | KeyCode::F(1) | KeyCode::Char('q' | '?') => Some(Message::HideHelp),
                KeyCode::Char('j') | KeyCode::Down => Some(Message::HelpScrollDown),
                KeyCode::Char('k') | KeyCode::Up => Some(Message::HelpScrollUp),
                _ => None,
            };
        }

        if let Some(prompt) = &model.prompt {
            return match key.code {
                KeyCode::Esc => Some(Message::PromptCancel),
                KeyCode::Enter => Some(match prompt.kind {
                    PromptKind::Open => Message::OpenFile(prompt.input.trim().into()),
                    PromptKind::Rename => Message::RenameDocument(prompt.input.clone()),
                }),
                KeyCode::Backspace => Some(Message::PromptBackspace),
                KeyCode::Char(c) if !ctrl && !alt => Some(Message::PromptInput(c)),
                _ => None,
            };
        }

        // Global shortcuts, regardless of focus
        let global = match key.code {
            KeyCode::Char('q' | 'c') if ctrl => Some(Message::Quit),
            KeyCode::Char('s') if ctrl => Some(Message::Save),
            KeyCode::Char('o') if ctrl => Some(Message::StartOpen),
            KeyCode::Char('n') if ctrl => Some(Message::NewDocument),
            KeyCode::Char('r') if ctrl => Some(Message::StartRename),
            KeyCode::Char('l') if ctrl => Some(Message::ClearDocument),
            KeyCode::Char('w') if ctrl => Some(Message::ToggleWatch),
            KeyCode::F(1) => Some(Message::ToggleHelp),
            KeyCode::F(2) => Some(Message::CycleView),
            KeyCode::F(5) => Some(Message::ForceReload),
            KeyCode::F(6) => Some(Message::StartRename),
            _ => None,
        };
        if global.is_some() {
            return global;
        }

        match model.focus {
            Focus::Editor => Self::handle_editor_key(key, ctrl, alt),
            Focus::MindMap => Self::handle_mindmap_key(key),
        }
    }

    fn handle_editor_key(key: KeyEvent, ctrl: bool, alt: bool) -> Option<Message> {
        if alt {
            let format = match key.code {
                KeyCode::Char('b') => Format::Bold,
                KeyCode::Char('i') => Format::Italic,
                KeyCode::Char('1') => Format::Heading(1),
                KeyCode::Char('2') => Format::Heading(2),
                KeyCode::Char('3') => Format::Heading(3),
                KeyCode::Char('l') => Format::Bullet,
                KeyCode::Char('n') => Format::Numbered,
                _ => return None,
            };
            return Some(Message::ApplyFormat(format));
        }
        match key.code {
            KeyCode::Esc => Some(Message::SwitchFocus),
            KeyCode::Char(c) if !ctrl => Some(Message::EditorInsertChar(c)),
            KeyCode::Tab => Some(Message::EditorInsertStr(TAB_INSERT.to_string())),
            KeyCode::Enter => Some(Message::EditorSplitLine),
            KeyCode::Backspace => Some(Message::EditorDeleteBack),
            KeyCode::Delete => Some(Message::EditorDeleteForward),
            KeyCode::Left if ctrl => Some(Message::EditorMoveWordLeft),
            KeyCode::Right if ctrl => Some(Message::EditorMoveWordRight),
            KeyCode::Left => Some(Message::EditorMoveCursor(Direction::Left)),
            KeyCode::Right => Some(Message::EditorMoveCursor(Direction::Right)),
            KeyCode::Up => Some(Message::EditorMoveCursor(Direction::Up)),
            KeyCode::Down => Some(Message::EditorMoveCursor(Direction::Down)),
            KeyCode::Home if ctrl => Some(Message::EditorMoveToStart),
            KeyCode::End if ctrl => Some(Message::EditorMoveToEnd),
            KeyCode::Home => Some(Message::EditorMoveHome),
            KeyCode::End => Some(Message::EditorMoveEnd),
            KeyCode::PageUp => Some(Message::EditorPageUp),
            KeyCode::PageDown => Some(Message::EditorPageDown),
            _ => None,
        }
    }

    fn handle_mindmap_key(key: KeyEvent) -> Option<Message> {
        match key.code {
            KeyCode::Char('j') | KeyCode::Down => Some(Message::MapDown),
            KeyCode::Char('k') | KeyCode::Up => Some(Message::MapUp),
            KeyCode::Char(' ') | KeyCode::PageDown => Some(Message::MapPageDown),
            KeyCode::Char('b') | KeyCode::PageUp => Some(Message::MapPageUp),
            KeyCode::Char('g') | KeyCode::Home => Some(Message::MapTop),
            KeyCode::Char('G') | KeyCode::End => Some(Message::MapBottom),
            KeyCode::Enter => Some(Message::MapJumpToSource),
            KeyCode::Char('f') => Some(Message::MapFit),
            KeyCode::Char('?') => Some(Message::ToggleHelp),
            KeyCode::Char('q') => Some(Message::Quit),
            KeyCode::Tab | KeyCode::Esc | KeyCode::Char('e') => Some(Message::SwitchFocus),
            _ => None,
        }
    }

    pub(super) fn handle_mouse(mouse: MouseEvent, model: &Model) -> Option<Message> {
        if model.help_visible || model.prompt.is_some() {
            return None;
        }
        let (width, height) = model.terminal_size;
        let panes = crate::ui::pane_layout(Rect::new(0, 0, width, height), model.view_mode);
        let editor = panes.editor.map(inner_rect);
        let mindmap = panes.mindmap.map(inner_rect);
        let in_editor = editor.is_some_and(|r| point_in_rect(mouse.column, mouse.row, r));
        let in_mindmap = mindmap.is_some_and(|r| point_in_rect(mouse.column, mouse.row, r));

        match mouse.kind {
            MouseEventKind::ScrollUp if in_editor => Some(Message::EditorScrollUp(WHEEL_LINES)),
            MouseEventKind::ScrollDown if in_editor => {
                Some(Message::EditorScrollDown(WHEEL_LINES))
            }
            MouseEventKind::ScrollUp if in_mindmap => Some(Message::MapUp),
            MouseEventKind::ScrollDown if in_mindmap => Some(Message::MapDown),
            MouseEventKind::Down(MouseButton::Left) => {
                if let Some(area) = editor.filter(|_| in_editor) {
                    let line = model.editor_viewport.offset() + usize::from(mouse.row - area.y);
                    let gutter = editor_gutter_width(model);
                    let col = usize::from(mouse.column.saturating_sub(area.x + gutter))
                        + model.editor_col_offset;
                    let text = model.document.buffer().line_at(line).unwrap_or_default();
                    return Some(Message::EditorMoveTo(line, byte_col_for_column(&text, col)));
                }
                let area = mindmap.filter(|_| in_mindmap)?;
                Some(Message::MapSelectRow(usize::from(mouse.row - area.y)))
            }
            _ => None,
        }
    }
}

/// Columns taken by the editor line-number gutter, including its space.
pub(super) fn editor_gutter_width(model: &Model) -> u16 {
    crate::ui::line_number_width(model.document.buffer().line_count()) + 1
}

/// Byte offset in `text` of the character drawn at display column `col`.
fn byte_col_for_column(text: &str, col: usize) -> usize {
    use unicode_width::UnicodeWidthChar;
    let mut used = 0;
    for (idx, ch) in text.char_indices() {
        let w = ch.width().unwrap_or(0);
        if used + w > col {
            return idx;
        }
        used += w;
    }
    text.len()
}

fn inner_rect(pane: Rect) -> Rect {
    Rect::new(
        pane.x.saturating_add(1),
        pane.y.saturating_add(1),
        pane.width.saturating_sub(2),
        pane.height.saturating_sub(2),
    )
}

const fn point_in_rect(x: u16, y: u16, rect: Rect) -> bool {
    x >= rect.x && x < rect.x + rect.width && y >= rect.y && y < rect.y + rect.height
}
