use attrdown_engine::{HtmlGenerator, Outline, RenderOptions, normalize};
use criterion::{Criterion, criterion_group, criterion_main};
mod common;

fn bench_normalize(c: &mut Criterion) {
    let mut group = c.benchmark_group("normalize");
    group.sample_size(10);

    let content = common::generate_markdown_content(100);
    group.bench_function("pipeline", |b| {
        b.iter(|| std::hint::black_box(normalize(std::hint::black_box(&content))));
    });

    group.finish();
}

fn bench_generate(c: &mut Criterion) {
    let mut group = c.benchmark_group("generate");
    group.sample_size(10);

    let content = common::generate_markdown_content(100);
    let plain = HtmlGenerator::new(RenderOptions {
        highlight: false,
        ..RenderOptions::default()
    });
    let highlighted = HtmlGenerator::default();

    group.bench_function("without_highlighting", |b| {
        b.iter(|| {
            let mut outline = Outline::new();
            let rendered = plain
                .generate(std::hint::black_box(&content), &mut [&mut outline])
                .unwrap();
            std::hint::black_box((rendered, outline));
        });
    });
    group.bench_function("with_syntect", |b| {
        b.iter(|| {
            let rendered = highlighted
                .generate(std::hint::black_box(&content), &mut [])
                .unwrap();
            std::hint::black_box(rendered);
        });
    });

    group.finish();
}

criterion_group!(benches, bench_normalize, bench_generate);
criterion_main!(benches);
