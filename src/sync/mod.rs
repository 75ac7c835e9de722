//! Debounced synchronization between the editor text and the mind map.
//!
//! Keystrokes arrive far faster than a tree is worth rebuilding. The
//! [`SyncController`] records the newest text, waits for the edit burst to
//! quiet down, then derives the outline once and hands it to a
//! [`TreeRenderer`]. A short settle delay later it asks the renderer to fit
//! the tree to its viewport.
//!
//! Time is passed in as milliseconds since session start, the same clock the
//! event loop uses for its other debouncers, so the controller never sleeps
//! and can be driven deterministically in tests.

use std::panic::{self, AssertUnwindSafe};

use thiserror::Error;

use crate::outline::{OutlineNode, ParseOptions, parse_with_options};

/// Quiet period after the last edit before the tree is rebuilt.
pub const DEFAULT_DEBOUNCE_MS: u64 = 300;
/// Delay between a redraw and the fit pass (roughly one frame).
pub const DEFAULT_SETTLE_MS: u64 = 16;

/// Errors a renderer may report; the controller logs them and moves on.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum RenderError {
    #[error("viewport has zero size")]
    EmptyViewport,
    #[error("cannot draw tree: {0}")]
    Degenerate(String),
}

/// Something that can display an outline tree.
pub trait TreeRenderer {
    /// Replace the tree being displayed.
    ///
    /// # Errors
    /// Returns an error if the renderer cannot accept the tree.
    fn set_data(&mut self, tree: OutlineNode) -> Result<(), RenderError>;

    /// Redraw with the current tree.
    ///
    /// # Errors
    /// Returns an error if the redraw could not be performed.
    fn render(&mut self) -> Result<(), RenderError>;

    /// Adjust the view so the tree fits its bounds.
    ///
    /// # Errors
    /// Returns an error if there is nothing to fit into (e.g. zero-sized area).
    fn fit_to_view(&mut self) -> Result<(), RenderError>;
}

/// Debounce and settle delays, in milliseconds.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SyncTiming {
    pub debounce_ms: u64,
    pub settle_ms: u64,
}

impl Default for SyncTiming {
    fn default() -> Self {
        Self {
            debounce_ms: DEFAULT_DEBOUNCE_MS,
            settle_ms: DEFAULT_SETTLE_MS,
        }
    }
}

/// Function used to turn text into a tree.
pub type DeriveFn = fn(&str, &ParseOptions) -> OutlineNode;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
struct Scheduled {
    version: u64,
    due_ms: u64,
}

/// Counters exposed for the status bar and tests.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub struct SyncStats {
    pub derivations: u64,
    pub parse_failures: u64,
    pub render_failures: u64,
}

/// Owns the timing contract between text edits and tree redraws.
pub struct SyncController<R> {
    renderer: R,
    options: ParseOptions,
    timing: SyncTiming,
    derive: DeriveFn,
    text: String,
    version: u64,
    rendered_version: Option<u64>,
    pending_derive: Option<Scheduled>,
    pending_fit: Option<Scheduled>,
    stats: SyncStats,
    shut_down: bool,
}

impl<R: TreeRenderer> SyncController<R> {
    pub fn new(renderer: R, options: ParseOptions, timing: SyncTiming) -> Self {
        Self {
            renderer,
            options,
            timing,
            derive: parse_with_options,
            text: String::new(),
            version: 0,
            rendered_version: None,
            pending_derive: None,
            pending_fit: None,
            stats: SyncStats::default(),
            shut_down: false,
        }
    }

    /// Swap the derivation step (tests use this to simulate a failing parser).
    #[must_use]
    pub fn with_derive(mut self, derive: DeriveFn) -> Self {
        self.derive = derive;
        self
    }

    pub const fn renderer(&self) -> &R {
        &self.renderer
    }

    pub const fn renderer_mut(&mut self) -> &mut R {
        &mut self.renderer
    }

    pub const fn timing(&self) -> SyncTiming {
        self.timing
    }

    pub const fn stats(&self) -> SyncStats {
        self.stats
    }

    /// Version of the most recent text handed to the controller.
    pub const fn version(&self) -> u64 {
        self.version
    }

    /// Version whose tree is currently displayed, if any.
    pub const fn rendered_version(&self) -> Option<u64> {
        self.rendered_version
    }

    /// Whether a rebuild is waiting for its debounce window to pass.
    pub const fn is_pending(&self) -> bool {
        self.pending_derive.is_some()
    }

    pub const fn is_shut_down(&self) -> bool {
        self.shut_down
    }

    /// Record new text and (re)start the debounce window.
    ///
    /// A rebuild already waiting for older text is replaced, not queued, and
    /// a fit still due for the previous tree is dropped.
    pub fn on_text_changed(&mut self, text: impl Into<String>, now_ms: u64) {
        if self.shut_down {
            return;
        }
        self.text = text.into();
        self.version += 1;
        let superseded = self.pending_derive.replace(Scheduled {
            version: self.version,
            due_ms: now_ms.saturating_add(self.timing.debounce_ms),
        });
        if let Some(old) = superseded {
            crate::perf::log_event(
                "sync.superseded",
                format!("old_version={} new_version={}", old.version, self.version),
            );
        }
        // The next redraw schedules its own fit.
        if let Some(stale) = self.pending_fit.take() {
            crate::perf::log_event(
                "sync.fit_cancelled",
                format!("old_version={} new_version={}", stale.version, self.version),
            );
        }
    }

    /// Run whatever work is due at `now_ms`.
    ///
    /// Returns true when the renderer was touched and a repaint is needed.
    pub fn tick(&mut self, now_ms: u64) -> bool {
        if self.shut_down {
            return false;
        }
        let mut changed = false;
        if self
            .pending_derive
            .is_some_and(|scheduled| scheduled.due_ms <= now_ms)
        {
            self.pending_derive = None;
            changed |= self.derive_and_render(now_ms);
        }
        if self
            .pending_fit
            .is_some_and(|scheduled| scheduled.due_ms <= now_ms)
        {
            self.pending_fit = None;
            changed |= self.fit();
        }
        changed
    }

    /// Rebuild immediately, skipping the debounce window.
    pub fn flush(&mut self, now_ms: u64) -> bool {
        if self.shut_down {
            return false;
        }
        self.pending_derive = None;
        let changed = self.derive_and_render(now_ms);
        changed | self.tick(now_ms)
    }

    /// Earliest time at which [`Self::tick`] has something to do.
    pub fn next_deadline(&self) -> Option<u64> {
        [self.pending_derive, self.pending_fit]
            .into_iter()
            .flatten()
            .map(|scheduled| scheduled.due_ms)
            .min()
    }

    /// Cancel all outstanding work; later calls become no-ops.
    pub fn shutdown(&mut self) {
        self.pending_derive = None;
        self.pending_fit = None;
        self.shut_down = true;
    }

    fn derive_and_render(&mut self, now_ms: u64) -> bool {
        let _scope = crate::perf::scope("sync.derive");
        let derive = self.derive;
        let text = &self.text;
        let options = &self.options;
        let tree = match panic::catch_unwind(AssertUnwindSafe(|| derive(text, options))) {
            Ok(tree) => tree,
            Err(payload) => {
                self.stats.parse_failures += 1;
                let reason = panic_message(payload.as_ref());
                tracing::warn!(version = self.version, %reason, "outline derivation failed; keeping previous tree");
                crate::perf::log_event(
                    "sync.parse_error",
                    format!("version={} reason={reason}", self.version),
                );
                return false;
            }
        };
        self.stats.derivations += 1;
        crate::perf::log_event(
            "sync.derive",
            format!("version={} nodes={}", self.version, tree.node_count()),
        );

        let drawn = self
            .renderer
            .set_data(tree)
            .and_then(|()| self.renderer.render());
        if let Err(err) = drawn {
            self.stats.render_failures += 1;
            tracing::warn!(version = self.version, %err, "tree redraw skipped");
            return false;
        }

        self.rendered_version = Some(self.version);
        self.pending_fit = Some(Scheduled {
            version: self.version,
            due_ms: now_ms.saturating_add(self.timing.settle_ms),
        });
        true
    }

    fn fit(&mut self) -> bool {
        match self.renderer.fit_to_view() {
            Ok(()) => true,
            Err(err) => {
                self.stats.render_failures += 1;
                tracing::debug!(%err, "fit to view skipped");
                false
            }
        }
    }
}

impl<R> std::fmt::Debug for SyncController<R> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SyncController")
            .field("version", &self.version)
            .field("rendered_version", &self.rendered_version)
            .field("pending_derive", &self.pending_derive)
            .field("pending_fit", &self.pending_fit)
            .field("shut_down", &self.shut_down)
            .finish_non_exhaustive()
    }
}

fn panic_message(payload: &(dyn std::any::Any + Send)) -> String {
    if let Some(s) = payload.downcast_ref::<&str>() {
        (*s).to_string()
    } else if let Some(s) = payload.downcast_ref::<String>() {
        s.clone()
    } else {
        "unknown panic".to_string()
    }
}
