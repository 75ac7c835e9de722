//! Reload notifications for the open document.
//!
//! Editors often save by writing a temp file and renaming it over the
//! original, so the parent directory is watched and events are matched back
//! to the document by path or file name. Bursts of events collapse into one
//! notification once the file has been quiet for the debounce period.

use std::ffi::OsString;
use std::path::{Path, PathBuf};
use std::sync::mpsc::{self, Receiver};
use std::time::{Duration, Instant};

use notify::{Event, RecommendedWatcher, RecursiveMode, Watcher};

/// The file a watcher reports on.
#[derive(Debug, Clone, PartialEq, Eq)]
struct WatchTarget {
    dir: PathBuf,
    path: PathBuf,
    name: Option<OsString>,
}

impl WatchTarget {
    fn new(path: &Path) -> Self {
        // OS events carry canonical paths.
        let path = path.canonicalize().unwrap_or_else(|_| path.to_path_buf());
        let dir = path
            .parent()
            .filter(|p| !p.as_os_str().is_empty())
            .map_or_else(|| PathBuf::from("."), Path::to_path_buf);
        Self {
            name: path.file_name().map(std::ffi::OsStr::to_os_string),
            dir,
            path,
        }
    }

    /// Directory-level events count too: some backends only report those.
    fn is_touched_by(&self, event: &Event) -> bool {
        event.paths.iter().any(|p| {
            p == &self.dir
                || p == &self.path
                || self
                    .name
                    .as_deref()
                    .is_some_and(|name| p.file_name() == Some(name))
        })
    }
}

/// Trailing-edge debounce: fires once the last event is `delay` old.
#[derive(Debug, Clone, Copy)]
struct QuietPeriod {
    delay: Duration,
    last_event: Option<Instant>,
}

impl QuietPeriod {
    const fn new(delay: Duration) -> Self {
        Self {
            delay,
            last_event: None,
        }
    }

    const fn note(&mut self, at: Instant) {
        self.last_event = Some(at);
    }

    fn take_elapsed(&mut self, now: Instant) -> bool {
        match self.last_event {
            Some(at) if now.saturating_duration_since(at) >= self.delay => {
                self.last_event = None;
                true
            }
            _ => false,
        }
    }
}

/// Watches the document file and reports debounced external changes.
pub struct FileWatcher {
    _watcher: RecommendedWatcher,
    rx: Receiver<notify::Result<Event>>,
    target: WatchTarget,
    quiet: QuietPeriod,
}

impl FileWatcher {
    /// Start watching `path`.
    ///
    /// # Errors
    /// Returns an error if the platform watcher cannot be created or the
    /// file's directory cannot be watched.
    pub fn new(path: impl AsRef<Path>, debounce: Duration) -> notify::Result<Self> {
        let target = WatchTarget::new(path.as_ref());
        let (tx, rx) = mpsc::channel();
        let mut watcher = notify::recommended_watcher(move |res| {
            let _ = tx.send(res);
        })?;
        watcher.watch(&target.dir, RecursiveMode::NonRecursive)?;
        tracing::debug!(path = %target.path.display(), "watching document");

        Ok(Self {
            _watcher: watcher,
            rx,
            target,
            quiet: QuietPeriod::new(debounce),
        })
    }

    /// Canonical path of the watched document.
    pub fn target_path(&self) -> &Path {
        &self.target.path
    }

    /// Drain pending events; true once a change has settled.
    pub fn take_change_ready(&mut self) -> bool {
        let now = Instant::now();
        let mut relevant = 0u32;
        let mut ignored = 0u32;
        while let Ok(event) = self.rx.try_recv() {
            match event {
                Ok(ev) if self.target.is_touched_by(&ev) => relevant += 1,
                Ok(_) => ignored += 1,
                Err(err) => {
                    tracing::debug!(%err, "watch backend error");
                    crate::perf::log_event("watcher.error", format!("{err}"));
                }
            }
        }
        if relevant + ignored > 0 {
            crate::perf::log_event(
                "watcher.poll",
                format!(
                    "relevant={relevant} ignored={ignored} target={}",
                    self.target.path.display()
                ),
            );
        }
        if relevant > 0 {
            self.quiet.note(now);
        }
        self.quiet.take_elapsed(now)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use notify::EventKind;
    use tempfile::tempdir;

    fn event_at(path: PathBuf) -> Event {
        Event {
            kind: EventKind::Any,
            paths: vec![path],
            attrs: notify::event::EventAttributes::new(),
        }
    }

    #[test]
    fn test_relative_target_watches_current_dir() {
        let target = WatchTarget::new(Path::new("does-not-exist-notes.md"));
        assert_eq!(target.dir, PathBuf::from("."));
        assert_eq!(target.name.as_deref(), Some(std::ffi::OsStr::new("does-not-exist-notes.md")));
    }

    #[test]
    fn test_target_matches_file_dir_and_rename_events() {
        let dir = tempdir().expect("tempdir");
        let path = dir.path().join("map.md");
        std::fs::write(&path, "# Map").expect("write");
        let target = WatchTarget::new(&path);
        let canonical_dir = dir.path().canonicalize().expect("canonicalize");

        assert!(target.is_touched_by(&event_at(canonical_dir.clone())));
        assert!(target.is_touched_by(&event_at(canonical_dir.join("map.md"))));
        // Same name reported under another prefix (e.g. symlinked tmp dirs)
        assert!(target.is_touched_by(&event_at(PathBuf::from("/elsewhere/map.md"))));
        assert!(!target.is_touched_by(&event_at(canonical_dir.join("other.md"))));
    }

    #[test]
    fn test_quiet_period_waits_for_last_event() {
        let start = Instant::now();
        let mut quiet = QuietPeriod::new(Duration::from_millis(200));
        assert!(!quiet.take_elapsed(start));

        quiet.note(start);
        quiet.note(start + Duration::from_millis(150));
        assert!(!quiet.take_elapsed(start + Duration::from_millis(250)));
        assert!(quiet.take_elapsed(start + Duration::from_millis(350)));
        assert!(!quiet.take_elapsed(start + Duration::from_millis(600)));
    }

    #[test]
    fn test_real_file_modification_detected() {
        let dir = tempdir().expect("tempdir");
        let path = dir.path().canonicalize().expect("canonicalize").join("live.md");
        std::fs::write(&path, "# Before").expect("write");

        let mut watcher = FileWatcher::new(&path, Duration::from_millis(50)).expect("watcher");
        assert_eq!(watcher.target_path(), path.as_path());

        // Give the backend time to register the watch
        std::thread::sleep(Duration::from_millis(500));
        std::fs::write(&path, "# After").expect("write");

        let deadline = Instant::now() + Duration::from_secs(5);
        let mut detected = false;
        while Instant::now() < deadline {
            if watcher.take_change_ready() {
                detected = true;
                break;
            }
            std::thread::sleep(Duration::from_millis(50));
        }
        assert!(detected, "external write should be reported within 5 seconds");
    }
}
