//! Line-oriented outline extraction.
//!
//! The scan is deliberately shallow: only ATX/setext headings and list
//! items shape the tree. Everything else is skipped, or kept as `Text`
//! leaves when prose is enabled.

use std::sync::LazyLock;

use regex::Regex;

use super::markup::strip_inline;
use super::types::{NodeKind, OutlineNode, ParseOptions};

static HEADING: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^ {0,3}(#{1,6})(?:[ \t]+(.*))?$").expect("heading pattern is valid")
});
static CLOSING_HASHES: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?:^|[ \t]+)#+[ \t]*$").expect("closing pattern is valid"));
static LIST_ITEM: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^([ \t]*)([-*+]|[0-9]{1,9}[.)])(?:[ \t]+(.*))?$").expect("list pattern is valid")
});

/// Parse markdown into an outline with default options.
///
/// # Example
///
/// ```
/// use mindmark::outline::parse;
///
/// let root = parse("# Title\n## Sub\n- item1\n- item2");
/// assert_eq!(root.label, "Title");
/// assert_eq!(root.children[0].child_labels(), vec!["item1", "item2"]);
/// ```
pub fn parse(text: &str) -> OutlineNode {
    parse_with_options(text, &ParseOptions::default())
}

/// Parse markdown into an outline.
///
/// Never fails: any string yields a tree with at least a root.
pub fn parse_with_options(text: &str, options: &ParseOptions) -> OutlineNode {
    let lines = split_lines(text);
    let mut builder = TreeBuilder::new();
    let mut fence: Option<Fence> = None;
    let mut idx = front_matter_end(&lines).map_or(0, |end| end + 1);

    while idx < lines.len() {
        let line = lines[idx];

        if let Some(open) = fence {
            if open.is_closed_by(line) {
                fence = None;
            }
            idx += 1;
            continue;
        }
        if let Some(open) = Fence::opening(line) {
            fence = Some(open);
            idx += 1;
            continue;
        }

        match classify(line, lines.get(idx + 1).copied()) {
            LineKind::Heading { level, label } => {
                builder.push_heading(level, make_label(label, options), idx);
            }
            LineKind::SetextHeading { level, label } => {
                builder.push_heading(level, make_label(label, options), idx);
                // The underline belongs to this heading.
                idx += 1;
            }
            LineKind::ListItem {
                indent,
                ordered,
                label,
            } => {
                builder.push_list_item(indent, ordered, make_label(label, options), idx);
            }
            LineKind::Prose { indent, text } => {
                builder.note_prose(indent);
                if options.include_prose {
                    builder.push_text(indent, make_label(text, options), idx);
                }
            }
            LineKind::Blank | LineKind::ThematicBreak => {}
        }
        idx += 1;
    }

    builder.finish(&options.root_label)
}

/// Split on LF, CRLF and lone CR, matching the editor's line model.
///
/// Like `str::lines`, a trailing break does not produce an empty last line.
fn split_lines(text: &str) -> Vec<&str> {
    let bytes = text.as_bytes();
    let mut lines = Vec::new();
    let mut start = 0;
    let mut idx = 0;
    while idx < bytes.len() {
        match bytes[idx] {
            b'\n' => {
                lines.push(&text[start..idx]);
                idx += 1;
                start = idx;
            }
            b'\r' => {
                lines.push(&text[start..idx]);
                idx += if bytes.get(idx + 1) == Some(&b'\n') { 2 } else { 1 };
                start = idx;
            }
            _ => idx += 1,
        }
    }
    if start < text.len() {
        lines.push(&text[start..]);
    }
    lines
}

fn make_label(raw: &str, options: &ParseOptions) -> String {
    let raw = raw.trim();
    if options.strip_markup {
        strip_inline(raw)
    } else {
        raw.to_string()
    }
}

#[derive(Debug, PartialEq, Eq)]
enum LineKind<'a> {
    Blank,
    ThematicBreak,
    Heading {
        level: u8,
        label: &'a str,
    },
    SetextHeading {
        level: u8,
        label: &'a str,
    },
    ListItem {
        indent: usize,
        ordered: bool,
        label: &'a str,
    },
    Prose {
        indent: usize,
        text: &'a str,
    },
}

fn classify<'a>(line: &'a str, next: Option<&str>) -> LineKind<'a> {
    if line.trim().is_empty() {
        return LineKind::Blank;
    }
    if let Some(caps) = HEADING.captures(line) {
        let level = u8::try_from(caps[1].len()).unwrap_or(6);
        let content = caps.get(2).map_or("", |m| m.as_str());
        let label = CLOSING_HASHES
            .find(content)
            .map_or(content, |m| &content[..m.start()]);
        return LineKind::Heading { level, label };
    }
    if is_thematic_break(line) {
        return LineKind::ThematicBreak;
    }
    if let Some(caps) = LIST_ITEM.captures(line) {
        let marker = &caps[2];
        return LineKind::ListItem {
            indent: calculate_indent(&caps[1]),
            ordered: marker.starts_with(|c: char| c.is_ascii_digit()),
            label: caps.get(3).map_or("", |m| m.as_str()),
        };
    }
    let indent = calculate_indent(line);
    if indent < 4
        && let Some(level) = next.and_then(setext_level)
    {
        return LineKind::SetextHeading {
            level,
            label: line.trim(),
        };
    }
    LineKind::Prose {
        indent,
        text: line.trim(),
    }
}

/// Leading indentation width, tabs counting as four columns.
fn calculate_indent(line: &str) -> usize {
    line.chars()
        .take_while(|c| *c == ' ' || *c == '\t')
        .map(|c| if c == '\t' { 4 } else { 1 })
        .sum()
}

/// Three or more `-`, `*`, or `_` (optionally spaced) on a line by themselves.
fn is_thematic_break(line: &str) -> bool {
    if calculate_indent(line) >= 4 {
        return false;
    }
    let mut marker = None;
    let mut count = 0;
    for c in line.chars().filter(|c| !c.is_whitespace()) {
        match (marker, c) {
            (None, '-' | '*' | '_') => marker = Some(c),
            (Some(m), _) if m == c => {}
            _ => return false,
        }
        count += 1;
    }
    count >= 3
}

fn setext_level(underline: &str) -> Option<u8> {
    if calculate_indent(underline) >= 4 {
        return None;
    }
    let trimmed = underline.trim();
    if trimmed.is_empty() {
        return None;
    }
    if trimmed.chars().all(|c| c == '=') {
        Some(1)
    } else if trimmed.chars().all(|c| c == '-') {
        Some(2)
    } else {
        None
    }
}

/// Index of the closing `---`/`...` of a leading YAML block, if present.
fn front_matter_end(lines: &[&str]) -> Option<usize> {
    if lines.first().map(|l| l.trim_end()) != Some("---") {
        return None;
    }
    lines
        .iter()
        .enumerate()
        .skip(1)
        .find(|(_, l)| matches!(l.trim_end(), "---" | "..."))
        .map(|(i, _)| i)
}

#[derive(Debug, Clone, Copy)]
struct Fence {
    marker: char,
    len: usize,
}

impl Fence {
    fn opening(line: &str) -> Option<Self> {
        if calculate_indent(line) >= 4 {
            return None;
        }
        let trimmed = line.trim_start();
        let marker = trimmed.chars().next().filter(|c| matches!(c, '`' | '~'))?;
        let len = trimmed.chars().take_while(|c| *c == marker).count();
        // Backtick fences may not carry backticks in their info string.
        if len < 3 || (marker == '`' && trimmed[len..].contains('`')) {
            return None;
        }
        Some(Self { marker, len })
    }

    fn is_closed_by(self, line: &str) -> bool {
        if calculate_indent(line) >= 4 {
            return false;
        }
        let trimmed = line.trim();
        trimmed.len() >= self.len && trimmed.chars().all(|c| c == self.marker)
    }
}

struct Draft {
    kind: NodeKind,
    label: String,
    line: Option<usize>,
    parent: Option<usize>,
    children: Vec<usize>,
}

/// Arena-backed builder; index 0 is the synthetic root.
struct TreeBuilder {
    nodes: Vec<Draft>,
    /// Open headings as (level, node index), shallowest first.
    headings: Vec<(u8, usize)>,
    /// Open list items as (indent, node index), outermost first.
    lists: Vec<(usize, usize)>,
}

impl TreeBuilder {
    fn new() -> Self {
        Self {
            nodes: vec![Draft {
                kind: NodeKind::Root,
                label: String::new(),
                line: None,
                parent: None,
                children: Vec::new(),
            }],
            headings: Vec::new(),
            lists: Vec::new(),
        }
    }

    fn current_heading(&self) -> usize {
        self.headings.last().map_or(0, |&(_, idx)| idx)
    }

    fn add(&mut self, parent: usize, kind: NodeKind, label: String, line: usize) -> usize {
        let idx = self.nodes.len();
        self.nodes.push(Draft {
            kind,
            label,
            line: Some(line),
            parent: Some(parent),
            children: Vec::new(),
        });
        self.nodes[parent].children.push(idx);
        idx
    }

    fn push_heading(&mut self, level: u8, label: String, line: usize) {
        while self.headings.last().is_some_and(|&(open, _)| open >= level) {
            self.headings.pop();
        }
        self.lists.clear();
        let parent = self.current_heading();
        let idx = self.add(parent, NodeKind::Heading { level }, label, line);
        self.headings.push((level, idx));
    }

    fn push_list_item(&mut self, indent: usize, ordered: bool, label: String, line: usize) {
        while self.lists.last().is_some_and(|&(open, _)| open >= indent) {
            self.lists.pop();
        }
        let parent = self
            .lists
            .last()
            .map_or_else(|| self.current_heading(), |&(_, idx)| idx);
        let idx = self.add(parent, NodeKind::ListItem { ordered }, label, line);
        self.lists.push((indent, idx));
    }

    /// An unindented paragraph ends any open list.
    fn note_prose(&mut self, indent: usize) {
        if indent == 0 {
            self.lists.clear();
        }
    }

    fn push_text(&mut self, indent: usize, label: String, line: usize) {
        let parent = match self.lists.last() {
            Some(&(_, idx)) if indent > 0 => idx,
            _ => self.current_heading(),
        };
        self.add(parent, NodeKind::Text, label, line);
    }

    fn finish(mut self, root_label: &str) -> OutlineNode {
        let promoted = match self.nodes[0].children.as_slice() {
            [only] if self.nodes[*only].kind.is_heading() => Some(*only),
            _ => None,
        };

        // Parents always precede children in the arena, so one forward pass
        // settles depths and one backward pass assembles owned subtrees.
        let mut depths = vec![0usize; self.nodes.len()];
        for i in 1..self.nodes.len() {
            if let Some(parent) = self.nodes[i].parent {
                depths[i] = depths[parent] + 1;
            }
        }
        let shift = usize::from(promoted.is_some());
        let stop = promoted.unwrap_or(0);

        let mut built: Vec<Option<OutlineNode>> = (0..self.nodes.len()).map(|_| None).collect();
        for i in (stop..self.nodes.len()).rev() {
            let draft = &mut self.nodes[i];
            let children = std::mem::take(&mut draft.children)
                .into_iter()
                .filter_map(|c| built[c].take())
                .collect();
            built[i] = Some(OutlineNode {
                kind: draft.kind,
                label: std::mem::take(&mut draft.label),
                depth: depths[i].saturating_sub(shift),
                line: draft.line,
                children,
            });
        }

        let mut root = built[stop]
            .take()
            .unwrap_or_else(|| OutlineNode::placeholder(root_label));
        if root.kind == NodeKind::Root {
            root.label = root_label.to_string();
        }
        root
    }
}
