//! Benchmarks for outline derivation and map layout.

use criterion::{Criterion, black_box, criterion_group, criterion_main};
use mindmark::document::WELCOME_TEXT;
use mindmark::outline::parse;
use mindmark::ui::mindmap::layout;

fn large_outline() -> String {
    let mut md = String::from("# Project\n");
    for section in 0..50 {
        md.push_str(&format!("## Section {section}\n"));
        for item in 0..20 {
            md.push_str(&format!("- **item** {item}\n  - detail with `code`\n"));
        }
        md.push_str("Some prose that is skipped.\n\n");
    }
    md
}

fn bench_parse_welcome(c: &mut Criterion) {
    c.bench_function("parse_welcome", |b| b.iter(|| parse(black_box(WELCOME_TEXT))));
}

fn bench_parse_large(c: &mut Criterion) {
    let md = large_outline();
    c.bench_function("parse_large", |b| b.iter(|| parse(black_box(&md))));
}

fn bench_layout_large(c: &mut Criterion) {
    let tree = parse(&large_outline());
    c.bench_function("layout_large", |b| b.iter(|| layout(black_box(&tree))));
}

criterion_group!(benches, bench_parse_welcome, bench_parse_large, bench_layout_large);
criterion_main!(benches);
