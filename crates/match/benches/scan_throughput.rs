//! crates/match/benches/scan_throughput.rs
//!
//! Benchmarks for scanning local data against a digest table.
//!
//! Run with: `cargo bench -p matching`

use criterion::{BenchmarkId, Criterion, Throughput, black_box, criterion_group, criterion_main};
use rand::Rng;

use matching::{DiscardSink, MatchEngine};
use signature::{BlockDigestTable, DigestLayout, generate_digest_table};

const TARGET_LEN: usize = 4 * 1024 * 1024;

fn generate_random_data(size: usize) -> Vec<u8> {
    let mut rng = rand::thread_rng();
    let mut data = vec![0u8; size];
    rng.fill(&mut data[..]);
    data
}

fn table_for(target: &[u8], block_size: usize) -> BlockDigestTable {
    let layout = DigestLayout::new(block_size, target.len() as u64, 32, 16);
    generate_digest_table(target, layout).expect("digest table")
}

/// Unrelated data: every byte is a fresh window that must miss.
fn bench_unrelated_scan(c: &mut Criterion) {
    let mut group = c.benchmark_group("scan_unrelated");
    let target = generate_random_data(TARGET_LEN);
    let source = generate_random_data(TARGET_LEN);

    for block_size in [1000, 2048, 4096] {
        let table = table_for(&target, block_size);
        group.throughput(Throughput::Bytes(source.len() as u64));
        group.bench_with_input(
            BenchmarkId::new("block_size", block_size),
            &table,
            |b, table| {
                b.iter(|| {
                    let mut engine = MatchEngine::new(table.clone()).expect("engine");
                    engine
                        .submit(black_box(&source), &mut DiscardSink)
                        .expect("submit");
                    black_box(engine.stats())
                });
            },
        );
    }

    group.finish();
}

/// Identical data: matches chain through the hint.
fn bench_sequential_scan(c: &mut Criterion) {
    let mut group = c.benchmark_group("scan_sequential");
    let target = generate_random_data(TARGET_LEN);
    let table = table_for(&target, 2048);

    group.throughput(Throughput::Bytes(target.len() as u64));
    group.bench_function("identical", |b| {
        b.iter(|| {
            let mut engine = MatchEngine::new(table.clone()).expect("engine");
            engine
                .submit(black_box(&target), &mut DiscardSink)
                .expect("submit");
            black_box(engine.blocks_todo())
        });
    });

    group.finish();
}

/// Index construction for growing block counts.
fn bench_index_build(c: &mut Criterion) {
    let mut group = c.benchmark_group("index_build");

    for blocks in [1_000usize, 10_000, 100_000] {
        let target = generate_random_data(blocks * 64);
        let table = table_for(&target, 64);
        group.bench_with_input(BenchmarkId::new("blocks", blocks), &table, |b, table| {
            b.iter(|| black_box(MatchEngine::new(table.clone()).expect("engine")));
        });
    }

    group.finish();
}

criterion_group!(
    benches,
    bench_unrelated_scan,
    bench_sequential_scan,
    bench_index_build
);
criterion_main!(benches);
