//! Benchmarks for fallback validation.
//!
//! Run with: cargo bench

use std::hint::black_box;

use criterion::{Criterion, criterion_group, criterion_main};

use varguard::{Options, PropertyTable, Validator, extract};

/// Build a stylesheet with `rules` rules, half of them with wrong fallbacks.
fn sample_css(rules: usize) -> String {
    let mut css = String::new();
    for i in 0..rules {
        let fallback = if i % 2 == 0 { "4px" } else { "5px" };
        css.push_str(&format!(
            ".rule-{i} {{\n  border-radius: var(--border-radius, {fallback});\n  color: var(--color-red, #FF0000);\n  margin: 0 auto;\n}}\n"
        ));
    }
    css
}

fn properties() -> PropertyTable {
    [("--border-radius", "4px"), ("--color-red", "#FF0000")]
        .into_iter()
        .collect()
}

fn bench_extract(c: &mut Criterion) {
    c.bench_function("extract_nested", |b| {
        b.iter(|| {
            extract(black_box(
                "var(--custom-border, var(--border-radius, 5px) solid var(--color-red, #FA0000))",
            ))
        })
    });
}

fn bench_process(c: &mut Criterion) {
    let css = sample_css(500);
    let mut validator = Validator::new(Options::new(properties())).unwrap();

    c.bench_function("process_500_rules", |b| {
        b.iter(|| validator.process(black_box(&css), None))
    });
}

criterion_group!(benches, bench_extract, bench_process);
criterion_main!(benches);
