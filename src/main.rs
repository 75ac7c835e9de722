//! Mindmark - a terminal markdown editor with a live mind-map view.
//!
//! # Usage
//!
//! ```bash
//! mindmark                      # welcome outline
//! mindmark notes.md
//! mindmark --watch --view mindmap notes.md
//! mindmark --dump-outline notes.md
//! ```

use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::Parser;

use mindmark::app::App;
use mindmark::config::{
    ConfigFlags, ViewMode, clear_config_flags, global_config_path, load_config_flags,
    local_override_path, parse_flag_tokens, save_config_flags,
};
use mindmark::outline::parse_with_options;
use mindmark::perf;

/// A terminal markdown editor with a live mind-map view
#[derive(Parser, Debug)]
#[command(name = "mindmark", version, about, long_about = None)]
struct Cli {
    /// Markdown file to edit (created on first save if missing)
    #[arg(value_name = "FILE")]
    file: Option<PathBuf>,

    /// Reload the file when it changes on disk
    #[arg(short, long)]
    watch: bool,

    /// Starting layout
    #[arg(long, value_enum)]
    view: Option<ViewMode>,

    /// Quiet period after typing before the mind map is rebuilt
    #[arg(long, value_name = "MS")]
    debounce_ms: Option<u64>,

    /// Delay between a rebuild and fitting the map to its pane
    #[arg(long, value_name = "MS")]
    settle_ms: Option<u64>,

    /// Keep inline markdown (emphasis, links, code) in node labels
    #[arg(long)]
    keep_markup: bool,

    /// Show plain prose lines as leaf nodes
    #[arg(long)]
    prose: bool,

    /// Enable performance logging
    #[arg(long)]
    perf: bool,

    /// Write detailed sync/render debug events to a file
    #[arg(long, value_name = "PATH")]
    render_debug_log: Option<PathBuf>,

    /// Print the outline of FILE as JSON and exit
    #[arg(long, requires = "file")]
    dump_outline: bool,

    /// Save current command-line flags as defaults
    #[arg(long)]
    save: bool,

    /// Clear saved defaults
    #[arg(long)]
    clear: bool,
}

fn dump_outline(path: &std::path::Path, flags: &ConfigFlags) -> Result<()> {
    let bytes = std::fs::read(path).with_context(|| format!("Failed to read {}", path.display()))?;
    let tree = parse_with_options(&String::from_utf8_lossy(&bytes), &flags.parse_options());
    let json = serde_json::to_string_pretty(&tree).context("Failed to serialize outline")?;
    println!("{json}");
    Ok(())
}

fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_writer(std::io::stderr)
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("warn")),
        )
        .init();

    let raw_args = std::env::args().collect::<Vec<_>>();
    let cli = Cli::parse();
    let global_path = global_config_path();
    let local_path = local_override_path();
    let cli_flags = parse_flag_tokens(&raw_args);

    if cli.clear {
        clear_config_flags(&global_path)?;
    }
    if cli.save {
        save_config_flags(&global_path, &cli_flags)?;
    }

    let file_flags = if cli.clear {
        ConfigFlags::default()
    } else {
        let global_flags = load_config_flags(&global_path)?;
        let local_flags = load_config_flags(&local_path)?;
        global_flags.union(&local_flags)
    };
    let effective = file_flags.union(&cli_flags);
    tracing::debug!(?effective, "effective flags");

    perf::set_enabled(effective.perf);
    let render_debug_log_path = effective
        .render_debug_log
        .clone()
        .or_else(|| std::env::var_os("MINDMARK_RENDER_DEBUG_LOG").map(PathBuf::from));
    if let Err(err) = perf::set_debug_log_path(render_debug_log_path.as_deref()) {
        eprintln!(
            "[warn] Failed to initialize render debug log {}: {}",
            render_debug_log_path
                .as_ref()
                .map_or_else(|| "<unset>".to_string(), |p| p.display().to_string()),
            err
        );
    }

    if cli.dump_outline {
        if let Some(path) = &cli.file {
            return dump_outline(path, &effective);
        }
    }

    let mut app = App::new(cli.file)
        .with_watch(effective.watch)
        .with_view_mode(effective.view.unwrap_or_default())
        .with_parse_options(effective.parse_options())
        .with_timing(effective.sync_timing())
        .with_config_paths(
            Some(global_path.clone()),
            if local_path.exists() {
                Some(local_path.clone())
            } else {
                None
            },
        );

    let result = app.run().context("Application error");
    if perf::is_enabled() {
        for line in perf::summary_lines() {
            eprintln!("{line}");
        }
    }
    result
}
