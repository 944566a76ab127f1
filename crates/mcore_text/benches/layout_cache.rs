//! Layout cache benchmarks
//!
//! Run with: cargo bench -p mcore_text

use std::sync::Arc;

use criterion::{black_box, criterion_group, criterion_main, BenchmarkId, Criterion};
use mcore_text::{layout_text, FixedPitchFace, TextSystem};

const PARAGRAPH: &str = "The quick brown fox jumps over the lazy dog. \
    Pack my box with five dozen liquor jugs. \
    Sphinx of black quartz, judge my vow.";

fn bench_layout_uncached(c: &mut Criterion) {
    let mut group = c.benchmark_group("layout_uncached");
    for wrap in [None, Some(120.0), Some(40.0)] {
        let label = wrap.map_or("none".to_string(), |w: f32| w.to_string());
        group.bench_with_input(BenchmarkId::from_parameter(label), &wrap, |b, wrap| {
            b.iter(|| layout_text(&FixedPitchFace, black_box(PARAGRAPH), 14.0, *wrap))
        });
    }
    group.finish();
}

fn bench_layout_cached(c: &mut Criterion) {
    let mut text = TextSystem::new(64);
    let font = text.register_face(Arc::new(FixedPitchFace), None);
    text.layout(PARAGRAPH, Some(120.0), 14.0, font);

    c.bench_function("layout_cached_hit", |b| {
        b.iter(|| text.layout(black_box(PARAGRAPH), Some(120.0), 14.0, font))
    });
}

fn bench_caret_queries(c: &mut Criterion) {
    let mut text = TextSystem::new(64);
    text.register_face(Arc::new(FixedPitchFace), None);

    c.bench_function("measure_to_byte_offset_sweep", |b| {
        b.iter(|| {
            let mut x = 0.0;
            for offset in (0..PARAGRAPH.len()).step_by(7) {
                x += text.measure_to_byte_offset(PARAGRAPH, 14.0, black_box(offset));
            }
            x
        })
    });
}

criterion_group!(
    benches,
    bench_layout_uncached,
    bench_layout_cached,
    bench_caret_queries
);
criterion_main!(benches);
