use std::io::stdout;
use std::path::PathBuf;
use std::time::{Duration, Instant};

use anyhow::{Context, Result};
use crossterm::event::{
    self, DisableBracketedPaste, DisableMouseCapture, EnableBracketedPaste, EnableMouseCapture,
};
use crossterm::execute;
use ratatui::DefaultTerminal;

use crate::app::{App, Message, Model, ToastLevel, update};
use crate::document::Document;
use crate::watcher::FileWatcher;

/// Longest the loop sleeps when nothing is scheduled.
const IDLE_POLL_MS: u64 = 250;

pub(super) struct ResizeDebouncer {
    delay_ms: u64,
    pending: Option<(u16, u16, u64)>,
}

impl ResizeDebouncer {
    pub(super) const fn new(delay_ms: u64) -> Self {
        Self {
            delay_ms,
            pending: None,
        }
    }

    pub(super) const fn queue(&mut self, width: u16, height: u16, now_ms: u64) {
        self.pending = Some((width, height, now_ms));
    }

    pub(super) fn take_ready(&mut self, now_ms: u64) -> Option<(u16, u16)> {
        let (width, height, queued_at) = self.pending?;
        if now_ms.saturating_sub(queued_at) >= self.delay_ms {
            self.pending = None;
            Some((width, height))
        } else {
            None
        }
    }

    pub(super) const fn is_pending(&self) -> bool {
        self.pending.is_some()
    }
}

impl App {
    /// Load the starting document: the given file, an empty document named
    /// after a file that does not exist yet, or the welcome outline.
    pub(super) fn initial_document(&self) -> Result<Document> {
        match &self.file_path {
            Some(path) if path.exists() => Document::open(path),
            Some(path) => Ok(Document::empty_at(path)),
            None => Ok(Document::welcome()),
        }
    }

    /// Run the main event loop.
    ///
    /// # Errors
    ///
    /// Returns an error if the starting file cannot be read, the terminal
    /// cannot be initialized, or terminal I/O fails while running.
    pub fn run(&mut self) -> Result<()> {
        let _run_scope = crate::perf::scope("app.run.total");

        // Read the file before touching the terminal so errors print cleanly.
        let document = self.initial_document()?;

        let init_scope = crate::perf::scope("app.ratatui_init");
        let mut terminal = ratatui::try_init()
            .context("Failed to initialize terminal - mindmark requires an interactive terminal")?;
        let size = terminal.size()?;
        drop(init_scope);

        let mut model = Model::new(
            document,
            (size.width, size.height),
            self.parse_options.clone(),
            self.timing,
        )
        .with_view_mode(self.view_mode);
        model.watch_enabled = self.watch_enabled;
        model
            .config_global_path
            .clone_from(&self.config_global_path);
        model.config_local_path.clone_from(&self.config_local_path);

        let result = Self::event_loop(&mut terminal, &mut model);

        let _ = execute!(stdout(), DisableMouseCapture, DisableBracketedPaste);
        ratatui::restore();

        result
    }

    fn event_loop(terminal: &mut DefaultTerminal, model: &mut Model) -> Result<()> {
        let start = Instant::now();
        let mut resize_debouncer = ResizeDebouncer::new(100);
        let mut file_watcher: Option<FileWatcher> = None;
        let mut watched_path: Option<PathBuf> = None;
        let mut frame_idx: u64 = 0;
        let mut needs_render = true;

        execute!(stdout(), EnableMouseCapture, EnableBracketedPaste)?;

        // Draw the outline of the starting document before the first frame.
        Self::sync_text(model, 0);

        loop {
            // (Re)create the watcher when the backing file changes (open, save-as)
            let current_path = model.document.path().map(std::path::Path::to_path_buf);
            if !model.watch_enabled {
                file_watcher = None;
                watched_path = None;
            } else if current_path != watched_path {
                file_watcher = current_path.as_deref().and_then(|path| {
                    Self::make_file_watcher(path)
                        .inspect_err(|err| {
                            tracing::warn!(path = %path.display(), %err, "watch unavailable");
                            crate::perf::log_event(
                                "watcher.error",
                                format!("failed path={} err={err}", path.display()),
                            );
                        })
                        .ok()
                });
                if current_path.is_some() && file_watcher.is_none() {
                    model.watch_enabled = false;
                    model.show_toast(ToastLevel::Warning, "Watch unavailable");
                }
                watched_path = current_path;
            }

            if model.expire_toast(Instant::now()) {
                needs_render = true;
            }

            let now_ms = elapsed_ms(start);

            if let Some((width, height)) = resize_debouncer.take_ready(now_ms) {
                crate::perf::log_event(
                    "event.resize.apply",
                    format!("frame={frame_idx} width={width} height={height}"),
                );
                *model = update(std::mem::take(model), Message::Resize(width, height));
                needs_render = true;
            }

            if model.watch_enabled
                && file_watcher
                    .as_mut()
                    .is_some_and(FileWatcher::take_change_ready)
            {
                Self::dispatch(model, &mut file_watcher, Message::FileChanged, now_ms);
                needs_render = true;
            }

            if model.sync.tick(now_ms) {
                needs_render = true;
            }

            if needs_render {
                frame_idx += 1;
                let draw_start = Instant::now();
                terminal.draw(|frame| crate::ui::render(model, frame))?;
                crate::perf::log_event(
                    "frame.draw",
                    format!(
                        "frame={} draw_ms={:.3}",
                        frame_idx,
                        draw_start.elapsed().as_secs_f64() * 1000.0
                    ),
                );
                needs_render = false;
            }

            if model.should_quit {
                model.sync.shutdown();
                break;
            }

            // Sleep until input arrives or the next scheduled sync work is due.
            let now_ms = elapsed_ms(start);
            let poll_ms = if resize_debouncer.is_pending() {
                10
            } else {
                model
                    .sync
                    .next_deadline()
                    .map_or(IDLE_POLL_MS, |due| due.saturating_sub(now_ms))
                    .min(IDLE_POLL_MS)
            };
            if event::poll(Duration::from_millis(poll_ms))? {
                let event_ms = elapsed_ms(start);
                if let Some(msg) =
                    Self::handle_event(&event::read()?, model, event_ms, &mut resize_debouncer)
                {
                    crate::perf::log_event(
                        "event.message",
                        format!("frame={frame_idx} msg={msg:?}"),
                    );
                    Self::dispatch(model, &mut file_watcher, msg, event_ms);
                    needs_render = true;
                }

                // Coalesce key repeat bursts into a single render.
                let mut drained = 0_u32;
                while event::poll(Duration::from_millis(0))? {
                    let drain_ms = elapsed_ms(start);
                    if let Some(msg) =
                        Self::handle_event(&event::read()?, model, drain_ms, &mut resize_debouncer)
                    {
                        drained += 1;
                        Self::dispatch(model, &mut file_watcher, msg, drain_ms);
                        needs_render = true;
                    }
                }
                if drained > 0 {
                    crate::perf::log_event(
                        "event.drain",
                        format!("frame={frame_idx} drained={drained}"),
                    );
                }
            }
        }

        let _ = execute!(stdout(), DisableMouseCapture, DisableBracketedPaste);
        Ok(())
    }

    /// Update, run side effects, and forward text changes to the sync
    /// controller.
    fn dispatch(
        model: &mut Model,
        file_watcher: &mut Option<FileWatcher>,
        msg: Message,
        now_ms: u64,
    ) {
        let side_msg = msg.clone();
        *model = update(std::mem::take(model), msg);
        Self::handle_message_side_effects(model, file_watcher, &side_msg);
        Self::sync_text(model, now_ms);
    }
}

fn elapsed_ms(start: Instant) -> u64 {
    u64::try_from(start.elapsed().as_millis()).unwrap_or(u64::MAX)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_resize_debouncer_waits_for_delay() {
        let mut debouncer = ResizeDebouncer::new(100);
        debouncer.queue(80, 24, 0);
        assert!(debouncer.is_pending());
        assert_eq!(debouncer.take_ready(50), None);
        debouncer.queue(100, 30, 60);
        assert_eq!(debouncer.take_ready(120), None);
        assert_eq!(debouncer.take_ready(160), Some((100, 30)));
        assert!(!debouncer.is_pending());
    }
}
