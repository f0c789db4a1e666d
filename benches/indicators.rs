//! Benchmarks for indicator computation and alert evaluation.

use chrono::{Duration, TimeZone, Utc};
use criterion::{black_box, criterion_group, criterion_main, BenchmarkId, Criterion};
use yatia::prelude::*;

/// Generate deterministic daily bars
fn generate_series(ticker: &str, n: usize) -> TimeSeries {
  let start = Utc.with_ymd_and_hms(2020, 1, 1, 0, 0, 0).unwrap();
  let mut bars = Vec::with_capacity(n);
  let mut price = 100.0;

  for i in 0..n {
    let change = ((i * 7 + 13) % 100) as f64 / 50.0 - 1.0; // Deterministic "random"
    let volatility = 2.0 + ((i * 3) % 10) as f64 / 5.0;

    let open = price;
    let close = price + change;
    bars.push(Observation {
      timestamp: start + Duration::days(i as i64),
      open,
      high: open.max(close) + volatility * 0.5,
      low: open.min(close) - volatility * 0.5,
      close,
      volume: 1_000.0 + (i % 17) as f64 * 10.0,
    });
    price = close;
  }

  TimeSeries::from_bars(ticker, &bars).unwrap()
}

fn all_indicators(ticker: &str) -> AlertEngine {
  AlertEngine::new(AlertConfig::new(ticker).with_indicators(IndicatorKind::ALL)).unwrap()
}

fn bench_single_indicator(c: &mut Criterion) {
  let series = generate_series("AAPL", 1000);
  let close = series.close().unwrap();
  let window = Window::new(20).unwrap();

  c.bench_function("sma_20_1000_bars", |b| {
    b.iter(|| black_box(yatia::indicators::sma(black_box(close), window)))
  });
  c.bench_function("rsi_14_1000_bars", |b| {
    b.iter(|| black_box(yatia::indicators::rsi(black_box(close), Window::new(14).unwrap())))
  });
}

fn bench_scaling(c: &mut Criterion) {
  let engine = all_indicators("AAPL");
  let mut group = c.benchmark_group("scaling");

  for size in [100, 500, 1000, 5000].iter() {
    let series = generate_series("AAPL", *size);

    group.bench_with_input(BenchmarkId::new("evaluate_display", size), size, |b, _| {
      b.iter(|| black_box(engine.evaluate_display(black_box(&series))))
    });
  }

  group.finish();
}

fn bench_parallel(c: &mut Criterion) {
  let tickers = ["SYM1", "SYM2", "SYM3", "SYM4"];
  let engines: Vec<AlertEngine> = tickers.iter().map(|t| all_indicators(t)).collect();
  let display: Vec<TimeSeries> = tickers.iter().map(|t| generate_series(t, 250)).collect();
  let long: Vec<TimeSeries> = tickers.iter().map(|t| generate_series(t, 500)).collect();

  c.bench_function("evaluate_parallel_4_tickers", |b| {
    b.iter(|| {
      let requests: Vec<_> = engines.iter().zip(&display).zip(&long).map(|((e, d), l)| (e, d, l)).collect();
      black_box(evaluate_parallel(requests))
    })
  });
}

fn bench_records(c: &mut Criterion) {
  let series = generate_series("AAPL", 1000);
  let requested = RecordIndicator::parse_list("sma20,ema20,rsi").unwrap();

  c.bench_function("bar_records_1000_bars", |b| {
    b.iter(|| black_box(bar_records(black_box(&series), &requested, PatternConfig::default())))
  });
}

criterion_group!(benches, bench_single_indicator, bench_scaling, bench_parallel, bench_records);

criterion_main!(benches);
