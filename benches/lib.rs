// Copyright (c) Microsoft Corporation.
// Licensed under the MIT License.

use std::hint::black_box;

use criterion::{Criterion, criterion_group, criterion_main};
use replace_rules::highlight::scan;
use replace_rules::{HighlightEngine, PreviewPattern, ReplaceRule, replace};

fn sample_document() -> String {
    let line = "let value = compute(alpha, beta) + 42; // TODO: tidy up\n";
    line.repeat(20_000)
}

fn sample_rules() -> Vec<ReplaceRule> {
    vec![
        ReplaceRule::new(r"\b(alpha|beta)\b", "$1_renamed"),
        ReplaceRule::new(r"\d+", "<$&>"),
        ReplaceRule::new("TODO", "FIXME").with_flags("gi"),
        ReplaceRule::new("x*", ""),
    ]
}

fn bench_scanner(c: &mut Criterion) {
    let document = sample_document();

    c.bench_function("scan/words", |b| {
        b.iter(|| {
            let matches = scan(black_box(&document), r"\w+", "g", usize::MAX).unwrap();
            black_box(matches.count())
        })
    });

    c.bench_function("scan/zero_length", |b| {
        b.iter(|| {
            let matches = scan(black_box(&document[..100_000]), "x*", "g", usize::MAX).unwrap();
            black_box(matches.count())
        })
    });
}

fn bench_highlight(c: &mut Criterion) {
    let document = sample_document();
    let rules = sample_rules();
    let engine = HighlightEngine::default();
    let preview = PreviewPattern::new("value", "g");
    let middle = document.len() / 2;

    c.bench_function("highlight/visible_window", |b| {
        b.iter(|| {
            black_box(engine.recompute(
                black_box(&document),
                &rules,
                Some(&preview),
                &[middle..middle + 4000],
            ))
        })
    });
}

fn bench_replace(c: &mut Criterion) {
    let document = sample_document();
    let rules = sample_rules();

    c.bench_function("replace/cascade", |b| {
        b.iter(|| black_box(replace::apply(black_box(&document), &rules).unwrap()))
    });
}

criterion_group!(benches, bench_scanner, bench_highlight, bench_replace);
criterion_main!(benches);
