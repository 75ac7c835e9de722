//! Property tests for outline derivation.

use mindmark::outline::{NodeKind, OutlineNode, ParseOptions, parse, parse_with_options};
use proptest::prelude::*;

fn depths_are_consistent(node: &OutlineNode) -> bool {
    node.children
        .iter()
        .all(|child| child.depth == node.depth + 1 && depths_are_consistent(child))
}

fn lines_increase_in_preorder(root: &OutlineNode) -> bool {
    let lines: Vec<usize> = root.iter().filter_map(|n| n.line).collect();
    lines.windows(2).all(|w| w[0] < w[1])
}

/// Lines that look like markdown outlines, mixed with noise.
fn markdown_line() -> impl Strategy<Value = String> {
    prop_oneof![
        (1usize..=6, "[a-zA-Z ]{0,12}").prop_map(|(n, t)| format!("{} {t}", "#".repeat(n))),
        (0usize..8, "[-*+]", "[a-z ]{0,10}").prop_map(|(i, m, t)| format!("{}{m} {t}", " ".repeat(i))),
        (0usize..6, 1u32..20, "[a-z]{0,8}").prop_map(|(i, n, t)| format!("{}{n}. {t}", " ".repeat(i))),
        Just("```".to_string()),
        Just("---".to_string()),
        Just(String::new()),
        "\\PC{0,20}",
    ]
}

fn markdown_doc() -> impl Strategy<Value = String> {
    (
        prop::collection::vec(markdown_line(), 0..40),
        prop_oneof![Just("\n"), Just("\r\n"), Just("\r")],
    )
        .prop_map(|(lines, newline)| lines.join(newline))
}

proptest! {
    #[test]
    fn parse_never_panics_on_arbitrary_text(text in "\\PC{0,400}") {
        let root = parse(&text);
        prop_assert_eq!(root.depth, 0);
    }

    #[test]
    fn parse_is_deterministic(text in markdown_doc()) {
        prop_assert_eq!(parse(&text), parse(&text));
    }

    #[test]
    fn children_sit_one_level_below_parents(text in markdown_doc()) {
        let root = parse(&text);
        prop_assert!(depths_are_consistent(&root));
    }

    #[test]
    fn nodes_appear_in_source_order(text in markdown_doc()) {
        let root = parse_with_options(&text, &ParseOptions {
            include_prose: true,
            ..ParseOptions::default()
        });
        prop_assert!(lines_increase_in_preorder(&root));
    }

    #[test]
    fn only_the_root_may_be_synthetic(text in markdown_doc()) {
        let root = parse(&text);
        for node in root.iter().skip(1) {
            prop_assert!(node.kind != NodeKind::Root);
            prop_assert!(node.line.is_some());
        }
    }

    #[test]
    fn labels_are_single_line(text in markdown_doc()) {
        let root = parse(&text);
        prop_assert!(root.iter().all(|n| !n.label.contains(['\n', '\r'])));
    }
}
