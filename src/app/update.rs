use std::path::PathBuf;

use crate::app::Model;
use crate::app::model::{Focus, Prompt, PromptKind, TextChange, ToastLevel};
use crate::document::{NEW_DOCUMENT_TEXT, UNTITLED_NAME};
use crate::editor::{Direction, Format};
use crate::sync::TreeRenderer;

/// All possible events and actions in the application.
///
/// These represent user input, system events, and internal actions.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Message {
    // Editor
    /// Insert a character at the cursor
    EditorInsertChar(char),
    /// Insert text at the cursor (e.g. Tab indentation)
    EditorInsertStr(String),
    /// Delete character before cursor (Backspace)
    EditorDeleteBack,
    /// Delete character at cursor (Delete)
    EditorDeleteForward,
    /// Split line at cursor (Enter)
    EditorSplitLine,
    EditorMoveCursor(Direction),
    EditorMoveHome,
    EditorMoveEnd,
    EditorMoveWordLeft,
    EditorMoveWordRight,
    /// Move cursor to start of buffer (Ctrl+Home)
    EditorMoveToStart,
    /// Move cursor to end of buffer (Ctrl+End)
    EditorMoveToEnd,
    /// Move cursor to absolute position (line, col), e.g. from a mouse click
    EditorMoveTo(usize, usize),
    EditorPageUp,
    EditorPageDown,
    /// Scroll editor viewport without moving the cursor
    EditorScrollUp(usize),
    EditorScrollDown(usize),
    /// Apply a markdown formatting shortcut at the cursor
    ApplyFormat(Format),

    // Mind map
    MapUp,
    MapDown,
    MapPageUp,
    MapPageDown,
    MapTop,
    MapBottom,
    /// Select a visible mind-map row (mouse)
    MapSelectRow(usize),
    /// Move the editor cursor to the selected node's source line
    MapJumpToSource,
    /// Fit the mind map to its pane again
    MapFit,

    // Document
    /// Start over with a fresh document (confirmed when dirty)
    NewDocument,
    /// Empty the editor (always confirmed)
    ClearDocument,
    Save,
    StartOpen,
    StartRename,
    PromptInput(char),
    PromptBackspace,
    PromptCancel,
    /// Open the given file (prompt submitted)
    OpenFile(PathBuf),
    /// Rename the document (prompt submitted)
    RenameDocument(String),

    // Layout
    /// Cycle split / editor / mind map
    CycleView,
    /// Move key focus to the other visible pane
    SwitchFocus,
    ToggleHelp,
    HideHelp,
    HelpScrollUp,
    HelpScrollDown,

    // File watching
    ToggleWatch,
    /// File changed externally, reload
    FileChanged,
    /// Force reload file
    ForceReload,

    // Window
    /// Terminal resized
    Resize(u16, u16),

    // Application
    /// Quit the application
    Quit,
}

/// Pure state transition. I/O for messages such as [`Message::Save`] happens
/// afterwards in the event loop's side-effect step.
pub fn update(mut model: Model, msg: Message) -> Model {
    if !matches!(msg, Message::Quit | Message::Save) {
        model.quit_confirmed = false;
    }
    if !matches!(msg, Message::NewDocument) {
        model.new_confirmed = false;
    }
    if !matches!(msg, Message::ClearDocument) {
        model.clear_confirmed = false;
    }

    match msg {
        Message::EditorInsertChar(ch) => edit(&mut model, |buf| buf.insert_char(ch)),
        Message::EditorInsertStr(s) => edit(&mut model, |buf| buf.insert_str(&s)),
        Message::EditorDeleteBack => edit(&mut model, |buf| {
            buf.delete_back();
        }),
        Message::EditorDeleteForward => edit(&mut model, |buf| {
            buf.delete_forward();
        }),
        Message::EditorSplitLine => edit(&mut model, |buf| buf.split_line()),
        Message::ApplyFormat(format) => edit(&mut model, |buf| format.apply(buf)),
        Message::EditorMoveCursor(dir) => navigate(&mut model, |buf| buf.move_cursor(dir)),
        Message::EditorMoveHome => navigate(&mut model, |buf| buf.move_home()),
        Message::EditorMoveEnd => navigate(&mut model, |buf| buf.move_end()),
        Message::EditorMoveWordLeft => navigate(&mut model, |buf| buf.move_word_left()),
        Message::EditorMoveWordRight => navigate(&mut model, |buf| buf.move_word_right()),
        Message::EditorMoveToStart => navigate(&mut model, |buf| buf.move_to_start()),
        Message::EditorMoveToEnd => navigate(&mut model, |buf| buf.move_to_end()),
        Message::EditorMoveTo(line, col) => {
            model.focus = Focus::Editor;
            navigate(&mut model, |buf| buf.move_to(line, col));
        }
        Message::EditorPageUp => editor_page(&mut model, false),
        Message::EditorPageDown => editor_page(&mut model, true),
        Message::EditorScrollUp(n) => model.editor_viewport.scroll_up(n),
        Message::EditorScrollDown(n) => model.editor_viewport.scroll_down(n),

        Message::MapUp => model.sync.renderer_mut().select_prev(),
        Message::MapDown => model.sync.renderer_mut().select_next(),
        Message::MapPageUp => model.sync.renderer_mut().page_up(),
        Message::MapPageDown => model.sync.renderer_mut().page_down(),
        Message::MapTop => model.sync.renderer_mut().select_first(),
        Message::MapBottom => model.sync.renderer_mut().select_last(),
        Message::MapSelectRow(visible_row) => {
            model.focus = Focus::MindMap;
            let view = model.sync.renderer_mut();
            let row = view.viewport().offset() + visible_row;
            if row < view.rows().len() {
                while view.selected() < row {
                    view.select_next();
                }
                while view.selected() > row {
                    view.select_prev();
                }
            }
        }
        Message::MapJumpToSource => {
            if let Some(line) = model.sync.renderer().selected_line() {
                if !model.view_mode.shows_editor() {
                    model.set_view_mode(crate::config::ViewMode::Split);
                }
                model.focus = Focus::Editor;
                navigate(&mut model, |buf| buf.move_to(line, 0));
            }
        }
        Message::MapFit => {
            if let Err(err) = model.sync.renderer_mut().fit_to_view() {
                tracing::debug!(%err, "manual fit skipped");
            }
        }

        Message::NewDocument => {
            if model.is_dirty() && !model.new_confirmed {
                model.show_toast(
                    ToastLevel::Warning,
                    "Unsaved changes! Press Ctrl+N again to discard them",
                );
                model.new_confirmed = true;
            } else {
                model.new_confirmed = false;
                model.document.reset(NEW_DOCUMENT_TEXT, UNTITLED_NAME);
                model.editor_viewport.go_to_top();
                model.note_text_change(TextChange::Replaced);
                model.relayout();
            }
        }
        Message::ClearDocument => {
            if model.clear_confirmed {
                model.clear_confirmed = false;
                edit(&mut model, |buf| buf.replace_all(""));
                model.show_toast(ToastLevel::Info, "Cleared");
            } else {
                model.show_toast(ToastLevel::Warning, "Press Ctrl+L again to clear the editor");
                model.clear_confirmed = true;
            }
        }
        Message::StartOpen => {
            model.prompt = Some(Prompt {
                kind: PromptKind::Open,
                input: String::new(),
            });
        }
        Message::StartRename => {
            model.prompt = Some(Prompt {
                kind: PromptKind::Rename,
                input: model.document.name().to_string(),
            });
        }
        Message::PromptInput(ch) => {
            if let Some(prompt) = model.prompt.as_mut() {
                prompt.input.push(ch);
            }
        }
        Message::PromptBackspace => {
            if let Some(prompt) = model.prompt.as_mut() {
                prompt.input.pop();
            }
        }
        Message::PromptCancel | Message::OpenFile(_) => model.prompt = None,
        Message::RenameDocument(name) => match model.document.rename(&name) {
            Ok(()) => {
                model.prompt = None;
                model.show_toast(
                    ToastLevel::Info,
                    format!("Renamed to {}", model.document.name()),
                );
            }
            // Keep the prompt open so the name can be corrected.
            Err(err) => model.show_toast(ToastLevel::Warning, err.to_string()),
        },

        Message::CycleView => {
            let next = model.view_mode.next();
            model.set_view_mode(next);
        }
        Message::SwitchFocus => {
            if model.view_mode == crate::config::ViewMode::Split {
                model.focus = match model.focus {
                    Focus::Editor => Focus::MindMap,
                    Focus::MindMap => Focus::Editor,
                };
            }
        }
        Message::ToggleHelp => {
            model.help_visible = !model.help_visible;
            model.help_scroll_offset = 0;
        }
        Message::HideHelp => model.help_visible = false,
        Message::HelpScrollUp => {
            model.help_scroll_offset = model.help_scroll_offset.saturating_sub(1);
        }
        Message::HelpScrollDown => model.help_scroll_offset += 1,

        Message::ToggleWatch => model.watch_enabled = !model.watch_enabled,
        Message::Save | Message::FileChanged | Message::ForceReload => {}

        Message::Resize(width, height) => {
            model.terminal_size = (width, height);
            model.relayout();
        }
        Message::Quit => {
            if model.is_dirty() && !model.quit_confirmed {
                model.show_toast(
                    ToastLevel::Warning,
                    "Unsaved changes! Press Ctrl+Q again to quit, or Ctrl+S to save",
                );
                model.quit_confirmed = true;
            } else {
                model.should_quit = true;
            }
        }
    }
    model
}

/// Run a text edit, then record the change and keep the cursor visible.
fn edit(model: &mut Model, f: impl FnOnce(&mut crate::editor::EditorBuffer)) {
    let before = model.document.buffer().revision();
    f(model.document.buffer_mut());
    if model.document.buffer().revision() != before {
        model.note_text_change(TextChange::Edited);
    }
    editor_ensure_cursor_visible(model);
}

/// Run a cursor movement and keep the cursor visible.
fn navigate(model: &mut Model, f: impl FnOnce(&mut crate::editor::EditorBuffer)) {
    f(model.document.buffer_mut());
    editor_ensure_cursor_visible(model);
}

/// Move the cursor a viewport height up or down, keeping its column.
fn editor_page(model: &mut Model, down: bool) {
    let page = usize::from(model.editor_viewport.height().max(1));
    let cursor = model.document.buffer().cursor();
    let line = if down {
        cursor.line + page
    } else {
        cursor.line.saturating_sub(page)
    };
    navigate(model, |buf| buf.move_to(line, cursor.col));
}

/// Ensure the editor cursor is visible in the viewport.
fn editor_ensure_cursor_visible(model: &mut Model) {
    let line_count = model.document.buffer().line_count();
    model.editor_viewport.set_total_rows(line_count);
    let cursor_line = model.document.buffer().cursor().line;
    model.editor_viewport.ensure_visible(cursor_line);
    model.follow_cursor_column();
}
