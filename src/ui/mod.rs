//! Terminal UI components.
//!
//! This module contains all UI-related code including:
//! - [`viewport`]: Scroll position and visible range management
//! - [`mindmap`]: Outline tree layout and the mind-map pane
//! - [`style`]: Theming and colors

pub mod mindmap;
pub mod style;
pub mod viewport;

mod overlays;
mod render;
mod status;

pub use render::{PaneLayout, line_number_width, pane_layout, render, split_main_columns};
pub use status::status_text;

pub const EDITOR_WIDTH_PERCENT: u16 = 50;
pub const MINDMAP_WIDTH_PERCENT: u16 = 50;
