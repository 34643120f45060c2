//! Frame codec benchmarks.
//!
//! Measures parsing of well-formed and malformed frames, and outbound
//! encoding with validation.
//!
//! Run with: cargo bench --bench frame_codec
//! Results saved to: target/criterion/

use std::hint::black_box;

use bracket_broker::{Dispatcher, OutboundFrame, parse_frame};
use criterion::{BenchmarkId, Criterion, criterion_group, criterion_main};

// ============================================================================
// Inputs
// ============================================================================

const FRAMES: &[(&str, &str)] = &[
    ("short", "[move][X5]"),
    ("board", "[update][game-1,X,O,-,-,X,-,-,-,O,X,?,1]"),
    ("leading_garbage", "topic not accepted: watchlist"),
    ("trailing", "[stock_price][187.300000][ignored][also ignored]"),
    ("unterminated", "[connections][Client-1, Client-2, Client-3"),
];

// ============================================================================
// Benchmark: Parse
// ============================================================================

fn bench_parse(c: &mut Criterion) {
    let mut group = c.benchmark_group("parse_frame");

    for &(name, raw) in FRAMES {
        group.bench_with_input(BenchmarkId::from_parameter(name), raw, |b, raw| {
            b.iter(|| parse_frame(black_box(raw)));
        });
    }

    let long_payload = format!("[bulk][{}]", "x".repeat(64 * 1024));
    group.bench_function("64k_payload", |b| {
        b.iter(|| parse_frame(black_box(long_payload.as_str())));
    });

    group.finish();
}

// ============================================================================
// Benchmark: Encode
// ============================================================================

fn bench_encode(c: &mut Criterion) {
    c.bench_function("outbound_frame_encode", |b| {
        b.iter(|| {
            OutboundFrame::new(black_box("move"), black_box("X5"))
                .map(|frame| frame.encode())
        });
    });
}

// ============================================================================
// Benchmark: Parse + Dispatch
// ============================================================================

fn bench_dispatch(c: &mut Criterion) {
    let mut group = c.benchmark_group("dispatch");

    for subscribers in [1_usize, 16, 128] {
        let dispatcher = Dispatcher::default();
        for i in 0..subscribers {
            let topic = if i % 2 == 0 { "update" } else { "other" };
            dispatcher
                .subscribe(topic, |_, payload| {
                    black_box(payload);
                })
                .expect("subscribe");
        }

        group.bench_with_input(
            BenchmarkId::from_parameter(subscribers),
            &dispatcher,
            |b, dispatcher| {
                b.iter(|| {
                    let raw = black_box("[update][game-1,X,-,-,-,-,-,-,-,-,O,?,1]");
                    let frame = parse_frame(raw);
                    dispatcher.deliver(frame.topic(), frame.payload())
                });
            },
        );
    }

    group.finish();
}

criterion_group!(benches, bench_parse, bench_encode, bench_dispatch);
criterion_main!(benches);
