use std::path::Path;
use std::time::Duration;

use crate::app::model::TextChange;
use crate::app::{App, Message, Model, ToastLevel};
use crate::watcher::FileWatcher;

impl App {
    pub(super) fn make_file_watcher(path: &Path) -> notify::Result<FileWatcher> {
        FileWatcher::new(path, Duration::from_millis(200))
    }

    /// Perform the I/O a message asks for after `update` has run.
    pub(super) fn handle_message_side_effects(
        model: &mut Model,
        file_watcher: &mut Option<FileWatcher>,
        msg: &Message,
    ) {
        match msg {
            Message::Save => match model.document.save() {
                Ok(path) => {
                    model.show_toast(ToastLevel::Info, format!("Saved {}", path.display()));
                    crate::perf::log_event("document.save", format!("path={}", path.display()));
                }
                Err(err) => {
                    model.show_toast(ToastLevel::Error, format!("Save failed: {err:#}"));
                    tracing::warn!(error = %format!("{err:#}"), "save failed");
                }
            },
            Message::OpenFile(path) => match model.open_document(path) {
                Ok(()) => {
                    model.show_toast(ToastLevel::Info, format!("Opened {}", path.display()));
                }
                Err(err) => {
                    model.show_toast(ToastLevel::Error, format!("Open failed: {err:#}"));
                }
            },
            // The event loop owns watcher creation; it follows the document path.
            Message::ToggleWatch => {
                if !model.watch_enabled {
                    *file_watcher = None;
                    model.show_toast(ToastLevel::Info, "Watch disabled");
                } else if model.document.path().is_some() {
                    model.show_toast(ToastLevel::Info, "Watching file changes");
                } else {
                    model.show_toast(
                        ToastLevel::Info,
                        "Watching once the document is saved or opened",
                    );
                }
            }
            Message::FileChanged if model.is_dirty() => {
                model.show_toast(
                    ToastLevel::Warning,
                    "File changed on disk; keeping your unsaved edits (F5 reloads)",
                );
            }
            Message::ForceReload | Message::FileChanged => {
                if model.document.path().is_none() {
                    model.show_toast(ToastLevel::Info, "Nothing to reload");
                    return;
                }
                match model.reload_from_disk() {
                    Err(err) => {
                        model.show_toast(ToastLevel::Error, format!("Reload failed: {err:#}"));
                        crate::perf::log_event("reload.error", format!("err={err:#}"));
                    }
                    Ok(changed) => {
                        crate::perf::log_event("reload", format!("changed={changed}"));
                        if matches!(msg, Message::ForceReload) {
                            model.show_toast(ToastLevel::Info, "Reloaded");
                        }
                    }
                }
            }
            _ => {}
        }
    }

    /// Hand new text to the sync controller. Replaced documents are drawn
    /// right away; typed edits wait for the debounce window.
    pub(super) fn sync_text(model: &mut Model, now_ms: u64) -> bool {
        let Some(change) = model.take_text_change() else {
            return false;
        };
        let text = model.document.text();
        model.sync.on_text_changed(text, now_ms);
        match change {
            TextChange::Edited => false,
            TextChange::Replaced => model.sync.flush(now_ms),
        }
    }
}
