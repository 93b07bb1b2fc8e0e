//! Benchmarks for decoding, validating and linting unit documents.
//!
//! Run with: cargo bench
//!
//! Documents are generated with a fixed shape per unit (two pitch segments,
//! three loudness segments) so throughput scales with the unit count.

use std::hint::black_box;

use criterion::{criterion_group, criterion_main, BenchmarkId, Criterion, Throughput};
use saavy_units::{
    codec,
    lint::{lint, LintConfig},
    validate::validate_str,
    Data, F0Segment, LoudnessSegment, Note, Unit,
};

/// Unit counts per generated document.
const DOCUMENT_SIZES: &[usize] = &[16, 256, 4096];

fn document(units: usize) -> Data {
    (0..units)
        .map(|i| {
            let t = i as f64 * 0.5;
            let midi = 48 + (i % 24) as u8;
            Unit::builder(["a", "e", "i", "o", "u"][i % 5])
                .f0(F0Segment::new("f0_transition", t, t + 0.1)
                    .start_frequency(200.0)
                    .end_frequency(220.0))
                .f0(F0Segment::new("f0_vibrato", t + 0.1, t + 0.5)
                    .frequency(220.0)
                    .vib_frequency(5.5)
                    .vib_amplitude(0.25))
                .loudness(LoudnessSegment::new("loudness_attack", t, t + 0.05).attack_duration(0.05))
                .loudness(LoudnessSegment::new("loudness_sustain", t + 0.05, t + 0.4).scale_factor(0.9))
                .loudness(LoudnessSegment::new("loudness_release", t + 0.4, t + 0.5).release_duration(0.1))
                .note(Note::new(midi, 4, 120.0, 90.0))
                .build()
                .expect("generated unit has a note")
        })
        .collect()
}

fn bench_codec(c: &mut Criterion) {
    let mut group = c.benchmark_group("codec");

    for &size in DOCUMENT_SIZES {
        let data = document(size);
        let text = codec::to_string(&data).expect("generated document encodes");
        group.throughput(Throughput::Bytes(text.len() as u64));

        group.bench_with_input(BenchmarkId::new("decode", size), &text, |b, text| {
            b.iter(|| codec::from_str(black_box(text)).expect("valid document"))
        });
        group.bench_with_input(BenchmarkId::new("encode", size), &data, |b, data| {
            b.iter(|| codec::to_string(black_box(data)).expect("encodes"))
        });
    }

    group.finish();
}

fn bench_checks(c: &mut Criterion) {
    let mut group = c.benchmark_group("checks");
    let config = LintConfig::default();

    for &size in DOCUMENT_SIZES {
        let data = document(size);
        let text = codec::to_string(&data).expect("generated document encodes");

        group.bench_with_input(BenchmarkId::new("validate", size), &text, |b, text| {
            b.iter(|| validate_str(black_box(text)).expect("well-formed JSON"))
        });
        group.bench_with_input(BenchmarkId::new("lint", size), &data, |b, data| {
            b.iter(|| lint(black_box(data), &config))
        });
    }

    group.finish();
}

criterion_group!(benches, bench_codec, bench_checks);
criterion_main!(benches);
