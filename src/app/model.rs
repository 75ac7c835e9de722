use std::path::PathBuf;
use std::time::{Duration, Instant};

use ratatui::layout::Rect;
use unicode_width::UnicodeWidthStr;

use crate::config::ViewMode;
use crate::document::Document;
use crate::outline::ParseOptions;
use crate::sync::{SyncController, SyncTiming};
use crate::ui::mindmap::MindMapView;
use crate::ui::viewport::Viewport;

const TOAST_DURATION: Duration = Duration::from_secs(3);

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ToastLevel {
    Info,
    Warning,
    Error,
}

#[derive(Debug, Clone)]
struct Toast {
    level: ToastLevel,
    message: String,
    expires_at: Instant,
}

/// Which pane receives keys.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum Focus {
    #[default]
    Editor,
    MindMap,
}

/// What a one-line prompt is asking for.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PromptKind {
    Open,
    Rename,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Prompt {
    pub kind: PromptKind,
    pub input: String,
}

impl Prompt {
    pub const fn title(&self) -> &'static str {
        match self.kind {
            PromptKind::Open => "Open file",
            PromptKind::Rename => "Rename",
        }
    }
}

/// How the text changed during the last update, so the event loop knows
/// whether to debounce the redraw or flush it.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TextChange {
    /// Typed edits; debounced.
    Edited,
    /// Whole document swapped (new, open, reload); drawn immediately.
    Replaced,
}

/// The complete application state.
///
/// All state lives here - no global or scattered state.
pub struct Model {
    pub document: Document,
    /// Debounced outline derivation feeding the mind-map pane
    pub sync: SyncController<MindMapView>,
    pub view_mode: ViewMode,
    pub focus: Focus,
    /// Editor scroll window; rows are buffer lines
    pub editor_viewport: Viewport,
    /// Display columns scrolled off the left of the editor text area
    pub editor_col_offset: usize,
    pub terminal_size: (u16, u16),
    pub watch_enabled: bool,
    /// Global config path shown in help
    pub config_global_path: Option<PathBuf>,
    /// Local override path shown in help
    pub config_local_path: Option<PathBuf>,
    pub help_visible: bool,
    pub help_scroll_offset: usize,
    pub prompt: Option<Prompt>,
    toast: Option<Toast>,
    text_change: Option<TextChange>,
    pub should_quit: bool,
    /// Set after first quit attempt with unsaved changes; a second quit proceeds
    pub quit_confirmed: bool,
    /// Set after first new-document request with unsaved changes
    pub new_confirmed: bool,
    /// Set after first clear request
    pub clear_confirmed: bool,
}

impl std::fmt::Debug for Model {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Model")
            .field("document", &self.document)
            .field("view_mode", &self.view_mode)
            .field("focus", &self.focus)
            .field("sync", &self.sync)
            .finish_non_exhaustive()
    }
}

impl Model {
    pub fn new(
        document: Document,
        terminal_size: (u16, u16),
        options: ParseOptions,
        timing: SyncTiming,
    ) -> Self {
        let mut model = Self {
            document,
            sync: SyncController::new(MindMapView::new(), options, timing),
            view_mode: ViewMode::default(),
            focus: Focus::Editor,
            editor_viewport: Viewport::default(),
            editor_col_offset: 0,
            terminal_size,
            watch_enabled: false,
            config_global_path: None,
            config_local_path: None,
            help_visible: false,
            help_scroll_offset: 0,
            prompt: None,
            toast: None,
            text_change: Some(TextChange::Replaced),
            should_quit: false,
            quit_confirmed: false,
            new_confirmed: false,
            clear_confirmed: false,
        };
        model.relayout();
        model
    }

    #[must_use]
    pub fn with_view_mode(mut self, mode: ViewMode) -> Self {
        self.set_view_mode(mode);
        self
    }

    /// Switch panes and move focus to one that is on screen.
    pub(super) fn set_view_mode(&mut self, mode: ViewMode) {
        self.view_mode = mode;
        self.focus = match (mode, self.focus) {
            (ViewMode::Editor, _) => Focus::Editor,
            (ViewMode::Mindmap, _) => Focus::MindMap,
            (ViewMode::Split, focus) => focus,
        };
        self.relayout();
    }

    /// Recompute pane sizes for the current terminal size and view mode.
    pub(super) fn relayout(&mut self) {
        let (width, height) = self.terminal_size;
        let panes = crate::ui::pane_layout(Rect::new(0, 0, width, height), self.view_mode);
        let (ew, eh) = panes.editor.map_or((0, 0), inner_size);
        let (mw, mh) = panes.mindmap.map_or((0, 0), inner_size);
        self.editor_viewport.resize(ew, eh);
        self.editor_viewport
            .set_total_rows(self.document.buffer().line_count());
        self.sync.renderer_mut().resize(mw, mh);
        self.follow_cursor_column();
    }

    /// Scroll the editor sideways so the cursor cell stays on screen.
    pub(super) fn follow_cursor_column(&mut self) {
        let buf = self.document.buffer();
        let cursor = buf.cursor();
        let line = buf.line_at(cursor.line).unwrap_or_default();
        let cursor_x = line.get(..cursor.col).map_or(0, UnicodeWidthStr::width);
        let gutter = super::input::editor_gutter_width(self);
        let text_width = usize::from(self.editor_viewport.width().saturating_sub(gutter));

        if cursor_x < self.editor_col_offset || text_width == 0 {
            self.editor_col_offset = cursor_x;
        } else if cursor_x >= self.editor_col_offset + text_width {
            self.editor_col_offset = cursor_x + 1 - text_width;
        }
    }

    pub fn is_dirty(&self) -> bool {
        self.document.is_dirty()
    }

    pub(super) fn note_text_change(&mut self, change: TextChange) {
        self.text_change = match (self.text_change, change) {
            (Some(TextChange::Replaced), _) => Some(TextChange::Replaced),
            _ => Some(change),
        };
    }

    /// The text change recorded since the last call, if any.
    pub fn take_text_change(&mut self) -> Option<TextChange> {
        self.text_change.take()
    }

    pub(super) fn show_toast(&mut self, level: ToastLevel, message: impl Into<String>) {
        self.toast = Some(Toast {
            level,
            message: message.into(),
            expires_at: Instant::now() + TOAST_DURATION,
        });
    }

    pub(super) fn expire_toast(&mut self, now: Instant) -> bool {
        if self
            .toast
            .as_ref()
            .is_some_and(|toast| toast.expires_at <= now)
        {
            self.toast = None;
            return true;
        }
        false
    }

    pub fn active_toast(&self) -> Option<(&str, ToastLevel)> {
        self.toast
            .as_ref()
            .map(|toast| (toast.message.as_str(), toast.level))
    }

    /// Load a file in place of the current document.
    pub(super) fn open_document(&mut self, path: &std::path::Path) -> anyhow::Result<()> {
        self.document = Document::open(path)?;
        self.editor_viewport.go_to_top();
        self.editor_col_offset = 0;
        self.note_text_change(TextChange::Replaced);
        self.relayout();
        Ok(())
    }

    /// Re-read the backing file, keeping the cursor where possible.
    ///
    /// Returns false when the disk content matches the buffer (e.g. the
    /// event came from our own save) and nothing was replaced.
    pub(super) fn reload_from_disk(&mut self) -> anyhow::Result<bool> {
        let before = self.document.text();
        let cursor = self.document.buffer().cursor();
        self.document.reload()?;
        if self.document.text() == before {
            self.document.buffer_mut().move_to(cursor.line, cursor.col);
            return Ok(false);
        }
        self.document.buffer_mut().move_to(cursor.line, cursor.col);
        self.note_text_change(TextChange::Replaced);
        self.relayout();
        Ok(true)
    }
}

fn inner_size(pane: Rect) -> (u16, u16) {
    (pane.width.saturating_sub(2), pane.height.saturating_sub(2))
}

impl Default for Model {
    fn default() -> Self {
        Self::new(
            Document::default(),
            (80, 24),
            ParseOptions::default(),
            SyncTiming::default(),
        )
    }
}
