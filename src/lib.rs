// Only allow lints that are either transitive-dependency noise or
// genuinely opinionated style choices that don't indicate real issues.
#![allow(
    // Transitive dependency version mismatches we can't control
    clippy::multiple_crate_versions,
    // module_name_repetitions is pure style preference (e.g. outline::OutlineNode)
    clippy::module_name_repetitions
)]

//! # Mindmark
//!
//! A terminal markdown editor with a live mind-map view.
//!
//! Mindmark shows the markdown source next to a tree derived from it:
//! - Headings and list items become mind-map nodes
//! - The map redraws shortly after typing stops
//! - Formatting shortcuts, save/open/rename, and file watching
//!
//! ## Architecture
//!
//! Mindmark uses The Elm Architecture (TEA) pattern:
//! - **Model**: Application state
//! - **Message**: Events and actions
//! - **Update**: Pure state transitions
//! - **View**: Render to terminal
//!
//! ## Modules
//!
//! - [`app`]: Main application loop and state
//! - [`outline`]: Markdown to outline tree derivation
//! - [`sync`]: Debounced editor-to-map synchronization
//! - [`editor`]: Text buffer and formatting shortcuts
//! - [`document`]: The edited document and its file
//! - [`ui`]: Terminal UI components
//! - [`watcher`]: File watching
//! - [`config`]: Saved flags and defaults

pub mod app;
pub mod config;
pub mod document;
pub mod editor;
pub mod outline;
pub mod perf;
pub mod sync;
pub mod ui;
pub mod watcher;

/// Re-export commonly used types
pub mod prelude {
    pub use crate::app::{App, Message, Model};
    pub use crate::document::Document;
    pub use crate::outline::{OutlineNode, ParseOptions, parse};
    pub use crate::sync::{SyncController, TreeRenderer};
    pub use crate::ui::viewport::Viewport;
}
