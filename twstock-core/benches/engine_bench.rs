//! Criterion benchmarks for the dashboard hot paths.
//!
//! Benchmarks:
//! 1. Batch enrichment (full indicator stack over one history)
//! 2. Single indicators (SMA, RSI, MACD)
//! 3. Streaming enrichment (one bar appended to a warm enricher)
//! 4. Classification of a watchlist's worth of enriched series

use criterion::{black_box, criterion_group, criterion_main, BenchmarkId, Criterion};

use twstock_core::domain::PriceBar;
use twstock_core::engine::{compute, IndicatorSettings, StreamingEnricher};
use twstock_core::indicators::{Indicator, Macd, Rsi, Sma};
use twstock_core::strategy::classify;

// ── Helpers ──────────────────────────────────────────────────────────

fn make_bars(n: usize) -> Vec<PriceBar> {
    let base_date = chrono::NaiveDate::from_ymd_opt(2020, 1, 2).unwrap();
    (0..n)
        .map(|i| {
            let close = 100.0 + (i as f64 * 0.1).sin() * 10.0;
            let open = close - 0.3;
            PriceBar::new(
                base_date + chrono::Duration::days(i as i64),
                open,
                close + 1.5,
                close - 1.5,
                close,
            )
        })
        .collect()
}

// ── 1. Batch Enrichment ──────────────────────────────────────────────

fn bench_compute(c: &mut Criterion) {
    let mut group = c.benchmark_group("compute");

    // One year, five years, ten years of sessions.
    for &bar_count in &[252, 1260, 2520] {
        let bars = make_bars(bar_count);
        group.bench_with_input(BenchmarkId::new("full_stack", bar_count), &bars, |b, bars| {
            b.iter(|| compute(black_box(bars)));
        });
    }

    group.finish();
}

// ── 2. Single Indicators ─────────────────────────────────────────────

fn bench_indicators(c: &mut Criterion) {
    let mut group = c.benchmark_group("indicator");
    let bars = make_bars(1260);

    let indicators: Vec<Box<dyn Indicator>> = vec![
        Box::new(Sma::new(20)),
        Box::new(Sma::new(60)),
        Box::new(Rsi::new(14)),
        Box::new(Macd::histogram(12, 26, 9)),
    ];
    for indicator in &indicators {
        group.bench_function(indicator.name(), |b| {
            b.iter(|| indicator.compute(black_box(&bars)));
        });
    }

    group.finish();
}

// ── 3. Streaming ─────────────────────────────────────────────────────

fn bench_streaming(c: &mut Criterion) {
    let mut group = c.benchmark_group("streaming");
    let bars = make_bars(1261);
    let (history, next) = bars.split_at(1260);

    let mut warm = StreamingEnricher::new(IndicatorSettings::default()).unwrap();
    warm.extend(history).unwrap();

    group.bench_function("push_one_warm", |b| {
        b.iter_batched(
            || warm.clone(),
            |mut enricher| enricher.push(black_box(next[0])).unwrap(),
            criterion::BatchSize::SmallInput,
        );
    });

    group.bench_function("extend_1260", |b| {
        b.iter(|| {
            let mut enricher = StreamingEnricher::new(IndicatorSettings::default()).unwrap();
            enricher.extend(black_box(history)).unwrap()
        });
    });

    group.finish();
}

// ── 4. Classification ────────────────────────────────────────────────

fn bench_classify(c: &mut Criterion) {
    let mut group = c.benchmark_group("classify");
    let series: Vec<_> = (0..30).map(|k| compute(&make_bars(240 + k))).collect();

    group.bench_function("watchlist_30", |b| {
        b.iter(|| {
            series
                .iter()
                .map(|rows| classify(black_box(rows)).label)
                .collect::<Vec<_>>()
        });
    });

    group.finish();
}

criterion_group!(
    benches,
    bench_compute,
    bench_indicators,
    bench_streaming,
    bench_classify,
);
criterion_main!(benches);
