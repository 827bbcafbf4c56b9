//! Timing harness for candidate training and recursive prediction.
//!
//! Run with: cargo bench --bench training_perf

use agrifcst_core::{
    add_months, build_features, ModelKind, PredictorOptions, PricePredictor, TimeSeriesRecord,
};
use chrono::NaiveDate;
use std::time::{Duration, Instant};

fn generate_price_series(n: usize, seed: usize) -> Vec<TimeSeriesRecord> {
    let start = NaiveDate::from_ymd_opt(2000, 1, 1).unwrap_or_default();
    (0..n)
        .map(|i| {
            let trend = 300.0 + 0.8 * i as f64;
            let seasonal = 25.0 * (2.0 * std::f64::consts::PI * i as f64 / 12.0).sin();
            let noise = ((i * 31 + seed * 17) % 11) as f64 - 5.0;
            let date = add_months(start, i as u32).unwrap_or(start);
            TimeSeriesRecord::new(date, trend + seasonal + noise)
        })
        .collect()
}

fn benchmark_fn<F, R>(name: &str, iterations: usize, mut f: F) -> Duration
where
    F: FnMut() -> R,
{
    // Warmup
    let _ = f();

    let start = Instant::now();
    for _ in 0..iterations {
        let _ = std::hint::black_box(f());
    }
    let elapsed = start.elapsed();
    let per_iter = elapsed / iterations as u32;
    println!(
        "{}: total={:?}, per_iter={:?}, iters={}",
        name, elapsed, per_iter, iterations
    );
    elapsed
}

fn main() {
    println!("=== Crop Price Training Benchmark ===\n");

    let series_lengths = [36, 60, 120, 240];

    println!("--- 1. Feature Building ---\n");

    for &n in &series_lengths {
        let mut p = PricePredictor::default();
        let _ = p.load_series("bench", generate_price_series(n, 0));
        let Some(series) = p.series("bench") else {
            continue;
        };
        benchmark_fn(&format!("build_features(n={})", n), 200, || {
            build_features(series)
        });
    }

    println!("\n--- 2. Single Candidate Training ---\n");

    for &n in &series_lengths {
        for kind in ModelKind::ALL {
            let opts = PredictorOptions {
                candidates: vec![kind],
                ..PredictorOptions::default()
            };
            let Ok(mut p) = PricePredictor::new(opts) else {
                continue;
            };
            let _ = p.load_series("bench", generate_price_series(n, 1));
            let iters = if n <= 60 { 10 } else { 3 };
            benchmark_fn(&format!("  train({}, n={})", kind, n), iters, || {
                p.train("bench")
            });
        }
        println!();
    }

    println!("--- 3. Full Selection + Forecast ---\n");

    for &n in &series_lengths {
        let mut p = PricePredictor::default();
        let _ = p.load_series("bench", generate_price_series(n, 2));

        benchmark_fn(&format!("train(all candidates, n={})", n), 3, || {
            p.train("bench")
        });
        benchmark_fn(&format!("predict(12 months, n={})", n), 100, || {
            p.predict("bench", 12)
        });
    }

    println!("\n--- 4. Many Crops ---\n");

    for &n_crops in &[5, 20, 50] {
        let mut p = PricePredictor::default();
        for c in 0..n_crops {
            let _ = p.load_series(&format!("crop_{}", c), generate_price_series(60, c));
        }
        benchmark_fn(&format!("  train_all x{}", n_crops), 1, || p.train_all());
    }

    println!("\n=== Benchmark Complete ===");
}
