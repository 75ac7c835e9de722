//! Markdown text editing.
//!
//! A rope-backed buffer with cursor management plus the formatting
//! shortcuts, driven by the app's `update` function.

mod buffer;
mod format;

pub use buffer::{Cursor, Direction, EditorBuffer};
pub use format::Format;
