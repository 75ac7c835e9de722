//! Markdown outline extraction.
//!
//! Turns the heading and list structure of a markdown string into the tree
//! that drives the mind-map pane. Parsing is total: every input, however
//! malformed, produces a tree with a root.

mod markup;
mod parser;
mod types;

pub use markup::strip_inline;
pub use parser::{parse, parse_with_options};
pub use types::{DEFAULT_ROOT_LABEL, Iter, NodeKind, OutlineNode, ParseOptions};
