use std::fs;
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};

use crate::outline::ParseOptions;
use crate::sync::{DEFAULT_DEBOUNCE_MS, DEFAULT_SETTLE_MS, SyncTiming};

/// Which panes are on screen.
#[derive(clap::ValueEnum, Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum ViewMode {
    /// Editor and mind map side by side
    #[default]
    Split,
    /// Editor only
    Editor,
    /// Mind map only
    Mindmap,
}

impl ViewMode {
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Split => "split",
            Self::Editor => "editor",
            Self::Mindmap => "mindmap",
        }
    }

    /// Next mode in the Split -> Editor -> Mindmap cycle.
    pub const fn next(self) -> Self {
        match self {
            Self::Split => Self::Editor,
            Self::Editor => Self::Mindmap,
            Self::Mindmap => Self::Split,
        }
    }

    pub const fn shows_editor(self) -> bool {
        matches!(self, Self::Split | Self::Editor)
    }

    pub const fn shows_mindmap(self) -> bool {
        matches!(self, Self::Split | Self::Mindmap)
    }
}

#[derive(Debug, Default, Clone, PartialEq, Eq)]
pub struct ConfigFlags {
    pub watch: bool,
    pub keep_markup: bool,
    pub prose: bool,
    pub perf: bool,
    pub view: Option<ViewMode>,
    pub debounce_ms: Option<u64>,
    pub settle_ms: Option<u64>,
    pub render_debug_log: Option<PathBuf>,
}

impl ConfigFlags {
    pub fn union(&self, other: &Self) -> Self {
        Self {
            watch: self.watch || other.watch,
            keep_markup: self.keep_markup || other.keep_markup,
            prose: self.prose || other.prose,
            perf: self.perf || other.perf,
            view: other.view.or(self.view),
            debounce_ms: other.debounce_ms.or(self.debounce_ms),
            settle_ms: other.settle_ms.or(self.settle_ms),
            render_debug_log: other
                .render_debug_log
                .clone()
                .or_else(|| self.render_debug_log.clone()),
        }
    }

    pub fn parse_options(&self) -> ParseOptions {
        ParseOptions {
            strip_markup: !self.keep_markup,
            include_prose: self.prose,
            ..ParseOptions::default()
        }
    }

    pub fn sync_timing(&self) -> SyncTiming {
        SyncTiming {
            debounce_ms: self.debounce_ms.unwrap_or(DEFAULT_DEBOUNCE_MS),
            settle_ms: self.settle_ms.unwrap_or(DEFAULT_SETTLE_MS),
        }
    }
}

pub fn global_config_path() -> PathBuf {
    #[cfg(target_os = "windows")]
    {
        if let Some(appdata) = std::env::var_os("APPDATA") {
            return PathBuf::from(appdata).join("mindmark").join("config");
        }
    }

    #[cfg(target_os = "macos")]
    {
        if let Some(home) = std::env::var_os("HOME") {
            return PathBuf::from(home)
                .join("Library")
                .join("Application Support")
                .join("mindmark")
                .join("config");
        }
    }

    #[cfg(not(any(target_os = "windows", target_os = "macos")))]
    {
        if let Some(xdg) = std::env::var_os("XDG_CONFIG_HOME") {
            return PathBuf::from(xdg).join("mindmark").join("config");
        }
        if let Some(home) = std::env::var_os("HOME") {
            return PathBuf::from(home)
                .join(".config")
                .join("mindmark")
                .join("config");
        }
    }

    local_override_path()
}

pub fn local_override_path() -> PathBuf {
    PathBuf::from(".mindmarkrc")
}

/// Read saved flags; a missing file yields defaults.
///
/// # Errors
/// Returns an error if the file exists but cannot be read.
pub fn load_config_flags(path: &Path) -> Result<ConfigFlags> {
    if !path.exists() {
        return Ok(ConfigFlags::default());
    }
    let content = fs::read_to_string(path)
        .with_context(|| format!("Failed to read config {}", path.display()))?;
    let tokens = content
        .lines()
        .map(str::trim)
        .filter(|line| !line.is_empty() && !line.starts_with('#'))
        .flat_map(|line| line.split_whitespace().map(ToOwned::to_owned))
        .collect::<Vec<_>>();
    Ok(parse_flag_tokens(&tokens))
}

/// Persist flags in the same `--flag value` form the CLI accepts.
///
/// # Errors
/// Returns an error if the directory or file cannot be written.
pub fn save_config_flags(path: &Path, flags: &ConfigFlags) -> Result<()> {
    let mut lines = vec!["# mindmark defaults (saved with --save)".to_string()];
    if flags.watch {
        lines.push("--watch".to_string());
    }
    if flags.keep_markup {
        lines.push("--keep-markup".to_string());
    }
    if flags.prose {
        lines.push("--prose".to_string());
    }
    if flags.perf {
        lines.push("--perf".to_string());
    }
    if let Some(view) = flags.view {
        lines.push(format!("--view {}", view.as_str()));
    }
    if let Some(ms) = flags.debounce_ms {
        lines.push(format!("--debounce-ms {ms}"));
    }
    if let Some(ms) = flags.settle_ms {
        lines.push(format!("--settle-ms {ms}"));
    }
    if let Some(path) = &flags.render_debug_log {
        lines.push(format!("--render-debug-log {}", path.display()));
    }
    if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
        fs::create_dir_all(parent)
            .with_context(|| format!("Failed to create config dir {}", parent.display()))?;
    }
    fs::write(path, format!("{}\n", lines.join("\n")))
        .with_context(|| format!("Failed to write config {}", path.display()))
}

/// # Errors
/// Returns an error if the file exists but cannot be removed.
pub fn clear_config_flags(path: &Path) -> Result<()> {
    if path.exists() {
        fs::remove_file(path).with_context(|| format!("Failed to remove {}", path.display()))?;
    }
    Ok(())
}

/// Pick known flags out of a token list; unknown tokens are ignored.
pub fn parse_flag_tokens(tokens: &[String]) -> ConfigFlags {
    let mut flags = ConfigFlags::default();
    let mut i = 0;
    while i < tokens.len() {
        let token = tokens[i].as_str();
        let (name, inline) = match token.split_once('=') {
            Some((name, value)) if name.starts_with("--") => (name, Some(value)),
            _ => (token, None),
        };
        let takes_value = matches!(
            name,
            "--view" | "--debounce-ms" | "--settle-ms" | "--render-debug-log"
        );
        let value = if takes_value && inline.is_none() {
            i += 1;
            tokens.get(i).map(String::as_str)
        } else {
            inline
        };

        match name {
            "--watch" | "-w" => flags.watch = true,
            "--keep-markup" => flags.keep_markup = true,
            "--prose" => flags.prose = true,
            "--perf" => flags.perf = true,
            "--view" => flags.view = value.and_then(parse_view),
            "--debounce-ms" => flags.debounce_ms = value.and_then(|v| v.parse().ok()),
            "--settle-ms" => flags.settle_ms = value.and_then(|v| v.parse().ok()),
            "--render-debug-log" => flags.render_debug_log = value.map(PathBuf::from),
            _ => {}
        }
        i += 1;
    }
    flags
}

fn parse_view(s: &str) -> Option<ViewMode> {
    match s {
        "split" => Some(ViewMode::Split),
        "editor" => Some(ViewMode::Editor),
        "mindmap" => Some(ViewMode::Mindmap),
        _ => None,
    }
}
