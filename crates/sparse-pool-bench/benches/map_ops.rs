//! Criterion micro-benchmarks for handle map lookup, insert and removal.

use std::hint::black_box;

use criterion::{criterion_group, criterion_main, BenchmarkId, Criterion};
use sparse_pool::{Handle, SparseMap};
use sparse_pool_bench::{filled_map, filled_registry, handle_keys, RECORD_SIZE};

const SIZES: [usize; 3] = [1_000, 10_000, 100_000];

/// Successful lookups across all keys at a range of table sizes.
fn bench_lookup_hit(c: &mut Criterion) {
    let mut group = c.benchmark_group("map_lookup_hit");
    for n in SIZES {
        let keys = handle_keys(n, 1);
        let map = filled_map(&keys);
        group.bench_with_input(BenchmarkId::from_parameter(n), &keys, |b, keys| {
            b.iter(|| {
                for &k in keys {
                    black_box(map.get(k));
                }
            });
        });
    }
    group.finish();
}

/// Lookups for keys that were never inserted.
fn bench_lookup_miss(c: &mut Criterion) {
    let keys = handle_keys(20_000, 2);
    let (present, absent) = keys.split_at(10_000);
    let map = filled_map(present);

    c.bench_function("map_lookup_miss_10k", |b| {
        b.iter(|| {
            for &k in absent {
                black_box(map.get(k));
            }
        });
    });
}

/// Insert 10K keys into an empty map, including every rehash.
fn bench_insert_with_growth(c: &mut Criterion) {
    let keys = handle_keys(10_000, 3);
    c.bench_function("map_insert_10k_with_growth", |b| {
        b.iter(|| {
            let mut map = SparseMap::with_capacity(1).unwrap();
            for (i, &k) in keys.iter().enumerate() {
                map.insert(k, i as u32).unwrap();
            }
            map
        });
    });
}

/// Remove then re-insert a quarter of the keys, exercising backward shift.
fn bench_remove_reinsert(c: &mut Criterion) {
    let keys = handle_keys(10_000, 4);
    let mut map = filled_map(&keys);

    c.bench_function("map_remove_reinsert_2500", |b| {
        b.iter(|| {
            for (i, &k) in keys.iter().enumerate().step_by(4) {
                black_box(map.remove(k));
                map.insert(k, i as u32).unwrap();
            }
        });
    });
}

/// Registry lookup: map probe plus pool record borrow.
fn bench_registry_get(c: &mut Criterion) {
    let keys = handle_keys(10_000, 5);
    let reg = filled_registry(&keys);

    c.bench_function("registry_get_10k", |b| {
        b.iter(|| {
            let mut acc = 0usize;
            for &k in &keys {
                acc += reg.get(Handle(k)).map_or(0, |r| r.len());
            }
            assert_eq!(acc, keys.len() * RECORD_SIZE as usize);
            black_box(acc)
        });
    });
}

criterion_group!(
    benches,
    bench_lookup_hit,
    bench_lookup_miss,
    bench_insert_with_growth,
    bench_remove_reinsert,
    bench_registry_get,
);
criterion_main!(benches);
