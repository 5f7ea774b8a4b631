//! Pure Rust benchmarks for the redistribution engine.
//!
//! Uses std::time::Instant for timing, a deterministic LCG PRNG for terrain
//! generation, and std::hint::black_box to prevent dead-code elimination.

use std::hint::black_box;
use std::time::{Duration, Instant};

use ndarray::Array2;
use snowslide_core::params::{RetentionParams, RoutingMethod, RoutingParams, SimulationParams};
use snowslide_core::{engine, routing::RoutingTable, terrain};

const REPEATS: usize = 7;

/// Synthetic mountainside: a sloping plane plus deterministic LCG noise.
fn make_dem(nrows: usize, ncols: usize, seed: u64) -> Array2<f64> {
    let mut state = seed;
    let mut next_f64 = || -> f64 {
        state = state
            .wrapping_mul(6364136223846793005)
            .wrapping_add(1442695040888963407);
        (state >> 33) as f64 / (1u64 << 31) as f64
    };

    Array2::from_shape_fn((nrows, ncols), |(r, c)| {
        2000.0 - 8.0 * r as f64 - 5.0 * c as f64 + next_f64() * 15.0
    })
}

/// Run a closure `REPEATS` times, return the median duration.
fn median_time<F: FnMut()>(mut f: F) -> Duration {
    let mut times: Vec<Duration> = (0..REPEATS)
        .map(|_| {
            let start = Instant::now();
            f();
            start.elapsed()
        })
        .collect();
    times.sort();
    times[REPEATS / 2]
}

fn bench_slope(sizes: &[usize]) -> Vec<(&'static str, usize, Duration)> {
    let mut results = Vec::new();
    for &n in sizes {
        let dem = make_dem(n, n, 42);
        black_box(terrain::slope(&dem, 30.0, 30.0));
        let dur = median_time(|| {
            black_box(terrain::slope(&dem, 30.0, 30.0));
        });
        results.push(("slope", n, dur));
    }
    results
}

fn bench_routing(sizes: &[usize]) -> Vec<(&'static str, usize, Duration)> {
    let mut results = Vec::new();
    for &n in sizes {
        let dem = make_dem(n, n, 42);
        for (name, method) in [("routing/d8", RoutingMethod::D8), ("routing/mfd", RoutingMethod::Mfd)] {
            let params = RoutingParams {
                method,
                ..RoutingParams::default()
            };
            black_box(RoutingTable::build(&dem, 30.0, 30.0, &params));
            let dur = median_time(|| {
                black_box(RoutingTable::build(&dem, 30.0, 30.0, &params));
            });
            results.push((name, n, dur));
        }
    }
    results
}

fn bench_engine(sizes: &[usize]) -> Vec<(&'static str, usize, Duration)> {
    let mut results = Vec::new();
    for &n in sizes {
        let dem = make_dem(n, n, 42);
        let snd = Array2::from_elem((n, n), 1.0);
        let mut params = SimulationParams::new(RoutingParams::default(), RetentionParams::default());
        params.max_iterations = 50;
        black_box(engine::run(&dem, &snd, (30.0, 30.0), &params).unwrap());
        let dur = median_time(|| {
            black_box(engine::run(&dem, &snd, (30.0, 30.0), &params).unwrap());
        });
        results.push(("engine/50-iter", n, dur));
    }
    results
}

fn main() {
    let sizes = [64, 128, 256];

    let mut all = Vec::new();
    all.extend(bench_slope(&sizes));
    all.extend(bench_routing(&sizes));
    all.extend(bench_engine(&sizes));

    println!("{:<16} {:>6} {:>12}", "benchmark", "n", "median");
    println!("{:-<16} {:->6} {:->12}", "", "", "");
    for (name, n, dur) in all {
        println!("{:<16} {:>6} {:>9.3?}", name, format!("{n}x{n}"), dur);
    }
}
