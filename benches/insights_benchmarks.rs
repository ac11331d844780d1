//! # Muse Insights Performance Benchmarks
//!
//! Benchmarks for the analyzers on synthetic listener data.
//!
//! ## Benchmark Categories
//!
//! - **Feature Table**: Building the table from raw collector records
//! - **Clustering**: k-means over growing track counts
//! - **Report**: A full listener report from one snapshot
//!
//! ## Running Benchmarks
//!
//! ```bash
//! # Run all benchmarks
//! cargo bench
//!
//! # Run specific benchmark group
//! cargo bench clustering
//! ```

use chrono::{TimeZone, Utc};
use criterion::{criterion_group, criterion_main, BenchmarkId, Criterion};
use muse_insights::cluster;
use muse_insights::config::AnalysisConfig;
use muse_insights::demo::DemoData;
use muse_insights::features::{self, RawAudioFeatures};
use muse_insights::report::ListenerReport;
use rand::rngs::StdRng;
use rand::SeedableRng;
use std::hint::black_box;

/// Raw records from `batches` independently seeded demo runs.
fn demo_records(batches: u64) -> Vec<Option<RawAudioFeatures>> {
    let now = Utc.with_ymd_and_hms(2024, 6, 1, 12, 0, 0).unwrap();
    (0..batches)
        .flat_map(|seed| DemoData::generate(&mut StdRng::seed_from_u64(seed), now).audio_features)
        .map(Some)
        .collect()
}

fn bench_feature_table(c: &mut Criterion) {
    let mut group = c.benchmark_group("feature_table");

    for batches in [1u64, 10, 50] {
        let records = demo_records(batches);
        group.bench_with_input(BenchmarkId::new("build", records.len()), &records, |b, records| {
            b.iter(|| features::build_feature_table(black_box(Some(records.as_slice()))));
        });
    }

    group.finish();
}

fn bench_clustering(c: &mut Criterion) {
    let mut group = c.benchmark_group("clustering");
    let config = AnalysisConfig::default();

    for batches in [1u64, 10, 50] {
        let records = demo_records(batches);
        let table = features::build_feature_table(Some(records.as_slice())).into_value();
        group.bench_with_input(BenchmarkId::new("kmeans", table.len()), &table, |b, table| {
            b.iter(|| cluster::cluster_tracks(black_box(table), &config));
        });
    }

    group.finish();
}

fn bench_report(c: &mut Criterion) {
    let mut group = c.benchmark_group("report");
    let now = Utc.with_ymd_and_hms(2024, 6, 1, 12, 0, 0).unwrap();
    let activity = DemoData::generate(&mut StdRng::seed_from_u64(42), now).into_activity();
    let config = AnalysisConfig::default();

    group.bench_function("full_report", |b| {
        b.iter(|| ListenerReport::build(black_box(&activity), &config));
    });

    group.finish();
}

criterion_group!(benches, bench_feature_table, bench_clustering, bench_report);
criterion_main!(benches);
