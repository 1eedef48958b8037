//! Micro-operation benchmarks for `FlatBst`.
//!
//! Run with: `cargo bench --bench ops`
//!
//! Measures per-operation latency for find, insert, erase and rebuilds,
//! with `std::collections::BTreeSet` run under identical conditions as a
//! baseline.

use std::collections::BTreeSet;
use std::hint::black_box;
use std::time::{Duration, Instant};

use criterion::{BatchSize, Criterion, Throughput, criterion_group, criterion_main};
use flatbst::FlatBst;
use rand::rngs::SmallRng;
use rand::seq::SliceRandom;
use rand::{Rng, SeedableRng};

const SIZE: usize = 16_384;
const OPS: u64 = 100_000;
const SEED: u64 = 0x0b57;

fn shuffled_keys(n: usize) -> Vec<u64> {
    let mut keys: Vec<u64> = (0..n as u64).collect();
    keys.shuffle(&mut SmallRng::seed_from_u64(SEED));
    keys
}

fn probe_keys(ops: u64, bound: u64) -> Vec<u64> {
    let mut rng = SmallRng::seed_from_u64(SEED ^ 0xffff);
    (0..ops).map(|_| rng.gen_range(0..bound)).collect()
}

// ============================================================================
// Find Latency (ns/op)
// ============================================================================

fn bench_find(c: &mut Criterion) {
    let mut group = c.benchmark_group("find_ns");
    group.throughput(Throughput::Elements(OPS));
    let probes = probe_keys(OPS, 2 * SIZE as u64);

    // Random insertion order
    group.bench_function("flat_bst_random", |b| {
        let mut tree: FlatBst<u64> = FlatBst::new();
        tree.insert_iter(shuffled_keys(SIZE));
        b.iter(|| {
            for key in &probes {
                black_box(tree.find(key));
            }
        })
    });

    // Bulk-built, minimum height
    group.bench_function("flat_bst_balanced", |b| {
        let tree: FlatBst<u64> = (0..SIZE as u64).collect();
        b.iter(|| {
            for key in &probes {
                black_box(tree.find(key));
            }
        })
    });

    group.bench_function("btree_set", |b| {
        let set: BTreeSet<u64> = shuffled_keys(SIZE).into_iter().collect();
        b.iter(|| {
            for key in &probes {
                black_box(set.get(key));
            }
        })
    });

    group.finish();
}

// ============================================================================
// Bounds Latency (ns/op)
// ============================================================================

fn bench_bounds(c: &mut Criterion) {
    let mut group = c.benchmark_group("lower_bound_ns");
    group.throughput(Throughput::Elements(OPS));
    let probes = probe_keys(OPS, 2 * SIZE as u64);
    let evens: Vec<u64> = (0..SIZE as u64).map(|k| k * 2).collect();

    group.bench_function("flat_bst", |b| {
        let tree: FlatBst<u64> = evens.iter().copied().collect();
        b.iter(|| {
            for key in &probes {
                black_box(tree.get(tree.lower_bound(key)));
            }
        })
    });

    group.bench_function("btree_set", |b| {
        let set: BTreeSet<u64> = evens.iter().copied().collect();
        b.iter(|| {
            for key in &probes {
                black_box(set.range(key..).next());
            }
        })
    });

    group.finish();
}

// ============================================================================
// Insert Latency (ns/op)
// ============================================================================

fn bench_insert(c: &mut Criterion) {
    let mut group = c.benchmark_group("insert_ns");
    group.throughput(Throughput::Elements(SIZE as u64));
    let keys = shuffled_keys(SIZE);

    group.bench_function("flat_bst", |b| {
        b.iter_custom(|iters| {
            let mut total = Duration::ZERO;
            for _ in 0..iters {
                let mut tree: FlatBst<u64> = FlatBst::with_capacity(SIZE);
                let start = Instant::now();
                for &k in &keys {
                    black_box(tree.insert(k));
                }
                total += start.elapsed();
            }
            total
        })
    });

    group.bench_function("flat_bst_u16_handles", |b| {
        b.iter_custom(|iters| {
            let mut total = Duration::ZERO;
            for _ in 0..iters {
                let mut tree: FlatBst<u64, flatbst::Less, u16> = FlatBst::default();
                tree.reserve(SIZE.min(FlatBst::<u64, flatbst::Less, u16>::max_slots()));
                let start = Instant::now();
                for &k in keys.iter().take(FlatBst::<u64, flatbst::Less, u16>::max_slots()) {
                    black_box(tree.insert(k));
                }
                total += start.elapsed();
            }
            total
        })
    });

    group.bench_function("btree_set", |b| {
        b.iter_custom(|iters| {
            let mut total = Duration::ZERO;
            for _ in 0..iters {
                let mut set = BTreeSet::new();
                let start = Instant::now();
                for &k in &keys {
                    black_box(set.insert(k));
                }
                total += start.elapsed();
            }
            total
        })
    });

    group.finish();
}

// ============================================================================
// Mixed Churn (ns/op)
// ============================================================================
//
// 50% find, 25% insert, 25% erase over a key space twice the resident size.

fn bench_churn(c: &mut Criterion) {
    let mut group = c.benchmark_group("churn_ns");
    group.throughput(Throughput::Elements(OPS));
    let mut rng = SmallRng::seed_from_u64(SEED);
    let ops: Vec<(u8, u64)> = (0..OPS)
        .map(|_| (rng.gen_range(0..4), rng.gen_range(0..2 * SIZE as u64)))
        .collect();

    group.bench_function("flat_bst", |b| {
        b.iter_batched(
            || shuffled_keys(SIZE).into_iter().collect::<FlatBst<u64>>(),
            |mut tree| {
                for &(op, key) in &ops {
                    match op {
                        0 => {
                            tree.insert(key);
                        },
                        1 => {
                            tree.erase(&key);
                        },
                        _ => {
                            black_box(tree.contains(&key));
                        },
                    }
                }
                tree
            },
            BatchSize::LargeInput,
        )
    });

    group.bench_function("btree_set", |b| {
        b.iter_batched(
            || shuffled_keys(SIZE).into_iter().collect::<BTreeSet<u64>>(),
            |mut set| {
                for &(op, key) in &ops {
                    match op {
                        0 => {
                            set.insert(key);
                        },
                        1 => {
                            set.remove(&key);
                        },
                        _ => {
                            black_box(set.contains(&key));
                        },
                    }
                }
                set
            },
            BatchSize::LargeInput,
        )
    });

    group.finish();
}

// ============================================================================
// Rebuilds
// ============================================================================

fn bench_rebuild(c: &mut Criterion) {
    let mut group = c.benchmark_group("rebuild");
    group.throughput(Throughput::Elements(SIZE as u64));
    let keys = shuffled_keys(SIZE);

    group.bench_function("collect_unsorted", |b| {
        b.iter(|| black_box(keys.iter().copied().collect::<FlatBst<u64>>()))
    });

    group.bench_function("collect_sorted", |b| {
        b.iter(|| black_box((0..SIZE as u64).collect::<FlatBst<u64>>()))
    });

    group.bench_function("rebalance_after_random_inserts", |b| {
        b.iter_batched(
            || {
                let mut tree: FlatBst<u64> = FlatBst::new();
                tree.insert_iter(keys.iter().copied());
                tree
            },
            |mut tree| {
                tree.rebalance();
                tree
            },
            BatchSize::LargeInput,
        )
    });

    group.finish();
}

criterion_group!(
    benches,
    bench_find,
    bench_bounds,
    bench_insert,
    bench_churn,
    bench_rebuild
);
criterion_main!(benches);
