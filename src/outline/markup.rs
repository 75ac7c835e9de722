//! Inline markup stripping for node labels.

use comrak::nodes::{AstNode, NodeValue};
use comrak::{Arena, Options, parse_document};

/// Render a label's inline markdown down to its visible text.
///
/// `**bold**` becomes `bold`, `[text](url)` becomes `text`, code spans
/// lose their backticks. Labels that would vanish entirely (a bare `---`,
/// say) come back unchanged.
pub fn strip_inline(label: &str) -> String {
    if !label.contains(['*', '_', '`', '[', '~', '<', '\\', '!', '&']) {
        return label.to_string();
    }

    let arena = Arena::new();
    let options = create_options();
    let source = escape_block_start(label);
    let root = parse_document(&arena, &source, &options);

    let mut text = String::new();
    extract_text_recursive(root, &mut text);
    let text = text.trim();
    if text.is_empty() {
        label.to_string()
    } else {
        text.to_string()
    }
}

fn create_options() -> Options {
    let mut options = Options::default();
    options.extension.strikethrough = true;
    options.extension.autolink = true;
    options
}

/// Keep comrak from reading the label as a block construct (heading,
/// quote, list) so only inline syntax gets interpreted.
fn escape_block_start(label: &str) -> String {
    let mut chars = label.chars();
    let first = chars.next();
    let second = chars.next();
    let needs_escape = match first {
        Some('>') => true,
        Some('#' | '-' | '+' | '*') => second.is_none_or(char::is_whitespace),
        Some(c) if c.is_ascii_digit() => {
            let digits = label.chars().take_while(char::is_ascii_digit).count();
            matches!(label[digits..].chars().next(), Some('.' | ')'))
        }
        _ => false,
    };
    if !needs_escape {
        return label.to_string();
    }
    if first.is_some_and(|c| c.is_ascii_digit()) {
        let digits = label.chars().take_while(char::is_ascii_digit).count();
        return format!("{}\\{}", &label[..digits], &label[digits..]);
    }
    format!("\\{label}")
}

fn extract_text_recursive<'a>(node: &'a AstNode<'a>, text: &mut String) {
    match &node.data.borrow().value {
        NodeValue::Text(t) => text.push_str(t),
        NodeValue::Code(c) => text.push_str(&c.literal),
        NodeValue::SoftBreak | NodeValue::LineBreak => text.push(' '),
        NodeValue::HtmlInline(_) => {}
        _ => {
            for child in node.children() {
                extract_text_recursive(child, text);
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_plain_label_passes_through() {
        assert_eq!(strip_inline("Real-time visualization"), "Real-time visualization");
    }

    #[test]
    fn test_strips_emphasis_and_strong() {
        assert_eq!(strip_inline("**Bold** and *italic*"), "Bold and italic");
    }

    #[test]
    fn test_link_keeps_text_only() {
        assert_eq!(strip_inline("See [the docs](https://example.com)"), "See the docs");
    }

    #[test]
    fn test_code_span_loses_backticks() {
        assert_eq!(strip_inline("Run `cargo test`"), "Run cargo test");
    }

    #[test]
    fn test_strikethrough_is_stripped() {
        assert_eq!(strip_inline("~~old~~ new"), "old new");
    }

    #[test]
    fn test_inline_html_is_dropped() {
        assert_eq!(strip_inline("<b>loud</b>"), "loud");
    }

    #[test]
    fn test_label_that_looks_like_a_list_is_kept_literal() {
        assert_eq!(strip_inline("- *dash*"), "- dash");
    }

    #[test]
    fn test_label_that_looks_like_ordered_item_is_kept_literal() {
        assert_eq!(strip_inline("2024. a *good* year"), "2024. a good year");
    }

    #[test]
    fn test_label_that_would_vanish_is_returned_raw() {
        assert_eq!(strip_inline("***"), "***");
    }
}
