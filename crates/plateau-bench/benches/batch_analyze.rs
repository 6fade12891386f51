// SPDX-License-Identifier: MIT OR Apache-2.0

#![forbid(unsafe_code)]

use criterion::{Criterion, black_box, criterion_group, criterion_main};
use plateau_batch::{BatchConfig, BenchmarkResultSet, OutlierData, OutlierSelection, analyze};
use plateau_bench::{spaced_outliers, warmup_series};
use std::collections::BTreeMap;

const BENCHMARKS: usize = 16;
const EXECUTIONS: usize = 10;
const SAMPLES: usize = 2_000;

fn result_set() -> BenchmarkResultSet {
    let mut data = BTreeMap::new();
    let mut all: OutlierData = BTreeMap::new();
    for b in 0..BENCHMARKS {
        let key = format!("bench{b}:vm:default");
        let seed = b as u64;
        data.insert(
            key.clone(),
            (0..EXECUTIONS)
                .map(|e| warmup_series(SAMPLES, seed * 1_000 + e as u64))
                .collect(),
        );
        all.insert(
            key,
            (0..EXECUTIONS)
                .map(|e| spaced_outliers(SAMPLES, 100, seed + e as u64))
                .collect(),
        );
    }
    BenchmarkResultSet::new(data).with_outliers(OutlierSelection::All, all)
}

fn benchmark_batch_analyze(c: &mut Criterion) {
    let results = result_set();
    for threads in [1usize, 4] {
        let config = BatchConfig {
            threads: Some(threads),
            ..BatchConfig::default()
        };
        c.bench_function(&format!("batch_analyze_threads{threads}"), |b| {
            b.iter(|| {
                analyze(black_box(&results), black_box(&config))
                    .expect("batch benchmark should succeed");
            })
        });
    }
}

criterion_group!(benches, benchmark_batch_analyze);
criterion_main!(benches);
