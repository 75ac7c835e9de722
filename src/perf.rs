//! Timing and event tracing for the edit → derive → draw pipeline.
//!
//! `--perf` collects per-scope timings (derive, frame, startup) and prints a
//! summary once the terminal has been restored. `--render-debug-log` streams
//! timestamped events (edits, superseded derivations, watcher polls) to a
//! file as they happen.

use std::collections::BTreeMap;
use std::fs::File;
use std::io::{BufWriter, Write};
use std::path::Path;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{LazyLock, Mutex, MutexGuard, PoisonError};
use std::time::{Duration, Instant};

static ENABLED: AtomicBool = AtomicBool::new(false);
static TIMINGS: LazyLock<Mutex<BTreeMap<&'static str, ScopeStats>>> =
    LazyLock::new(|| Mutex::new(BTreeMap::new()));
static EVENT_LOG: LazyLock<Mutex<EventLog>> = LazyLock::new(|| Mutex::new(EventLog::idle()));

fn lock<T>(mutex: &Mutex<T>) -> MutexGuard<'_, T> {
    mutex.lock().unwrap_or_else(PoisonError::into_inner)
}

/// Aggregate timings for one named scope.
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct ScopeStats {
    pub count: u64,
    pub total: Duration,
    pub max: Duration,
}

impl ScopeStats {
    fn record(&mut self, elapsed: Duration) {
        self.count += 1;
        self.total += elapsed;
        self.max = self.max.max(elapsed);
    }

    pub fn mean(&self) -> Duration {
        u32::try_from(self.count)
            .ok()
            .filter(|&n| n > 0)
            .map_or(Duration::ZERO, |n| self.total / n)
    }
}

/// Guard returned by [`scope`]; records the elapsed time when dropped.
#[derive(Debug)]
pub struct Scope {
    name: &'static str,
    start: Instant,
}

impl Drop for Scope {
    fn drop(&mut self) {
        if !is_enabled() {
            return;
        }
        let elapsed = self.start.elapsed();
        lock(&TIMINGS).entry(self.name).or_default().record(elapsed);
        log_event(
            "perf",
            format!("{} {:.3} ms", self.name, elapsed.as_secs_f64() * 1000.0),
        );
    }
}

struct EventLog {
    start: Instant,
    sink: Option<Box<dyn Write + Send>>,
}

impl EventLog {
    fn idle() -> Self {
        Self {
            start: Instant::now(),
            sink: None,
        }
    }

    fn write(&mut self, name: &str, detail: &str) {
        let elapsed_ms = self.start.elapsed().as_secs_f64() * 1000.0;
        if let Some(sink) = self.sink.as_mut() {
            let written = writeln!(sink, "[{elapsed_ms:>10.3} ms] {name}: {detail}")
                .and_then(|()| sink.flush());
            if written.is_err() {
                // Stop logging after the first write error.
                self.sink = None;
            }
        }
    }
}

pub fn set_enabled(enabled: bool) {
    ENABLED.store(enabled, Ordering::Relaxed);
}

pub fn is_enabled() -> bool {
    ENABLED.load(Ordering::Relaxed)
}

/// Time the enclosing block under `name`.
pub fn scope(name: &'static str) -> Scope {
    Scope {
        name,
        start: Instant::now(),
    }
}

/// Timings collected so far, by scope name.
pub fn timings() -> BTreeMap<&'static str, ScopeStats> {
    lock(&TIMINGS).clone()
}

/// One line per scope, slowest mean first.
pub fn summary_lines() -> Vec<String> {
    let mut stats: Vec<_> = timings().into_iter().collect();
    stats.sort_by(|a, b| b.1.mean().cmp(&a.1.mean()));
    stats
        .into_iter()
        .map(|(name, s)| {
            format!(
                "[perf] {name}: {} calls, mean {:.2} ms, max {:.2} ms",
                s.count,
                s.mean().as_secs_f64() * 1000.0,
                s.max.as_secs_f64() * 1000.0
            )
        })
        .collect()
}

/// Start (or stop, with `None`) writing the event log to a file.
///
/// # Errors
/// Returns an error if the log file cannot be created or written.
pub fn set_debug_log_path(path: Option<&Path>) -> std::io::Result<()> {
    let sink = match path {
        Some(path) => Some(Box::new(BufWriter::new(File::create(path)?)) as Box<dyn Write + Send>),
        None => None,
    };
    set_debug_log_sink(sink)
}

/// Route the event log to any writer.
///
/// # Errors
/// Returns an error if the header line cannot be written.
pub fn set_debug_log_sink(sink: Option<Box<dyn Write + Send>>) -> std::io::Result<()> {
    let mut log = lock(&EVENT_LOG);
    log.sink = match sink {
        Some(mut sink) => {
            writeln!(sink, "mindmark debug log start")?;
            sink.flush()?;
            Some(sink)
        }
        None => None,
    };
    log.start = Instant::now();
    Ok(())
}

pub fn is_debug_log_enabled() -> bool {
    lock(&EVENT_LOG).sink.is_some()
}

pub fn log_event(name: &str, detail: impl AsRef<str>) {
    lock(&EVENT_LOG).write(name, detail.as_ref());
}
