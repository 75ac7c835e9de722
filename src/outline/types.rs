//! Core outline types.

use serde::Serialize;

/// Label used for the synthetic root when a document has no single title.
pub const DEFAULT_ROOT_LABEL: &str = "Untitled";

/// What produced a node in the outline.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum NodeKind {
    /// Placeholder root; not backed by any source line.
    Root,
    /// ATX heading with its marker count (1-6).
    Heading { level: u8 },
    /// Bullet (`-`, `*`, `+`) or ordered (`1.`, `1)`) list item.
    ListItem { ordered: bool },
    /// Plain prose line, only produced when prose is enabled.
    Text,
}

impl NodeKind {
    pub const fn is_heading(self) -> bool {
        matches!(self, Self::Heading { .. })
    }
}

/// One node in the derived mind-map tree.
///
/// Trees are rebuilt from scratch on every parse. `depth` is the distance
/// from the root, so every child sits exactly one level below its parent.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct OutlineNode {
    pub kind: NodeKind,
    pub label: String,
    pub depth: usize,
    /// Zero-based source line, `None` for a synthetic root.
    pub line: Option<usize>,
    pub children: Vec<OutlineNode>,
}

impl OutlineNode {
    /// A synthetic root with no children.
    pub fn placeholder(label: impl Into<String>) -> Self {
        Self {
            kind: NodeKind::Root,
            label: label.into(),
            depth: 0,
            line: None,
            children: Vec::new(),
        }
    }

    pub const fn is_leaf(&self) -> bool {
        self.children.is_empty()
    }

    /// Pre-order traversal starting at this node.
    pub fn iter(&self) -> Iter<'_> {
        Iter { stack: vec![self] }
    }

    /// Total number of nodes in this subtree, including itself.
    pub fn node_count(&self) -> usize {
        self.iter().count()
    }

    /// Deepest `depth` value found in this subtree.
    pub fn max_depth(&self) -> usize {
        self.iter().map(|node| node.depth).max().unwrap_or(self.depth)
    }

    /// The node that starts on the given source line, if any.
    pub fn find_by_line(&self, line: usize) -> Option<&Self> {
        self.iter().find(|node| node.line == Some(line))
    }

    /// Labels of the direct children, in order.
    pub fn child_labels(&self) -> Vec<&str> {
        self.children.iter().map(|c| c.label.as_str()).collect()
    }
}

/// Pre-order iterator over an outline subtree.
#[derive(Debug)]
pub struct Iter<'a> {
    stack: Vec<&'a OutlineNode>,
}

impl<'a> Iterator for Iter<'a> {
    type Item = &'a OutlineNode;

    fn next(&mut self) -> Option<Self::Item> {
        let node = self.stack.pop()?;
        self.stack.extend(node.children.iter().rev());
        Some(node)
    }
}

/// Knobs for [`super::parse_with_options`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ParseOptions {
    /// Strip inline markdown (emphasis, links, code) from labels.
    pub strip_markup: bool,
    /// Keep plain prose lines as `Text` leaves instead of dropping them.
    pub include_prose: bool,
    /// Label for the synthetic root.
    pub root_label: String,
}

impl Default for ParseOptions {
    fn default() -> Self {
        Self {
            strip_markup: true,
            include_prose: false,
            root_label: DEFAULT_ROOT_LABEL.to_string(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn leaf(label: &str, depth: usize) -> OutlineNode {
        OutlineNode {
            kind: NodeKind::ListItem { ordered: false },
            label: label.to_string(),
            depth,
            line: Some(depth),
            children: Vec::new(),
        }
    }

    #[test]
    fn test_iter_is_preorder() {
        let mut root = OutlineNode::placeholder("root");
        let mut a = leaf("a", 1);
        a.children.push(leaf("a1", 2));
        root.children.push(a);
        root.children.push(leaf("b", 1));

        let labels: Vec<_> = root.iter().map(|n| n.label.as_str()).collect();
        assert_eq!(labels, vec!["root", "a", "a1", "b"]);
        assert_eq!(root.node_count(), 4);
        assert_eq!(root.max_depth(), 2);
    }

    #[test]
    fn test_placeholder_has_no_line() {
        let root = OutlineNode::placeholder(DEFAULT_ROOT_LABEL);
        assert_eq!(root.kind, NodeKind::Root);
        assert!(root.line.is_none());
        assert!(root.is_leaf());
    }

    #[test]
    fn test_serializes_kind_as_tagged_object() {
        let node = leaf("item", 1);
        let json = serde_json::to_value(&node).unwrap();
        assert_eq!(json["kind"]["type"], "list_item");
        assert_eq!(json["kind"]["ordered"], false);
        assert_eq!(json["label"], "item");
    }
}
