//! Benchmarks for the load / render / annotate pipeline.
//!
//! Run with: cargo bench

use std::hint::black_box;

use criterion::{Criterion, criterion_group, criterion_main};

use lexipub::{Annotator, Document, Lexicon, ReaderOptions, ReadingContext};

#[path = "../tests/common/mod.rs"]
mod common;

use common::EpubBuilder;

const PARAGRAPH: &str = "<p>私は毎朝図書館で本を読みます。昨日は友達と一緒に日本語を勉強して、\
    晩ご飯を食べました。<img src=\"../images/fig.png\"/>明日も行きたいです。</p>";

fn build_book(chapters: usize, paragraphs: usize) -> Vec<u8> {
    let body = PARAGRAPH.repeat(paragraphs);
    let mut builder = EpubBuilder::new("Bench").item(
        "fig",
        "images/fig.png",
        "image/png",
        b"\x89PNG\r\n\x1a\n".to_vec(),
    );
    for i in 0..chapters {
        builder = builder.chapter(&format!("ch{i}"), &format!("text/ch{i}.xhtml"), &body);
    }
    builder.build()
}

fn lexicon() -> Lexicon {
    [
        ("私", "N5"),
        ("本", "N5"),
        ("読む", "N5"),
        ("食べる", "N5"),
        ("行く", "N5"),
        ("友達", "N5"),
        ("図書館", "N5"),
        ("勉強", "N5"),
        ("一緒", "N4"),
        ("晩ご飯", "N4"),
    ]
    .into_iter()
    .collect()
}

// ============================================================================
// Loading
// ============================================================================

fn bench_load(c: &mut Criterion) {
    let bytes = build_book(50, 4);
    c.bench_function("load_document", |b| {
        b.iter(|| Document::from_bytes(black_box(bytes.clone())).unwrap());
    });
}

// ============================================================================
// Rendering
// ============================================================================

fn bench_render(c: &mut Criterion) {
    let doc = Document::from_bytes(build_book(1, 200)).unwrap();
    let context = ReadingContext::new(ReaderOptions::default());

    c.bench_function("render_unit", |b| {
        b.iter(|| context.render_page(&doc, black_box(0)).unwrap());
    });
}

fn bench_annotate(c: &mut Criterion) {
    let doc = Document::from_bytes(build_book(1, 200)).unwrap();
    let options = ReaderOptions {
        annotate: true,
        ..ReaderOptions::default()
    };
    let context = ReadingContext::new(options).with_lexicon(lexicon());
    let markup = doc.render_unit(0, &|p| p.to_string()).unwrap();
    let annotator = Annotator::new(lexicon());

    let mut group = c.benchmark_group("annotate");
    group.bench_function("markup", |b| {
        b.iter(|| annotator.try_annotate(black_box(&markup)).unwrap());
    });
    group.bench_function("page", |b| {
        b.iter(|| context.render_page(&doc, black_box(0)).unwrap());
    });
    group.finish();
}

criterion_group!(benches, bench_load, bench_render, bench_annotate);
criterion_main!(benches);
