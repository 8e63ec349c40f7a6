//! # Slot Allocator Benchmark
//!
//! Allocation, churn, lookup and fixed replay on the single-threaded stores.
//!
//! Run with: `cargo bench --package handlebox_core --bench slot_benchmark`

// Benchmarks don't need docs
#![allow(missing_docs)]

use criterion::{black_box, criterion_group, criterion_main, BenchmarkId, Criterion};
use handlebox_core::{ComponentStore, DenseComponentArray, Handle, SlotAllocator, StandardLayout};

/// Live entries used by the steady-state benchmarks.
const ENTRY_COUNT: usize = 100_000;

type Slots = SlotAllocator<StandardLayout, u64>;

fn filled(count: usize) -> (Slots, Vec<Handle>) {
    let mut slots = Slots::with_capacity(count);
    let handles = (0..count as u64).map(|i| slots.add(i, 1)).collect();
    (slots, handles)
}

/// Benchmark: Fill an empty allocator.
fn bench_add(c: &mut Criterion) {
    let mut group = c.benchmark_group("slot_add");

    for count in [1_000, 10_000, ENTRY_COUNT] {
        group.bench_with_input(BenchmarkId::from_parameter(count), &count, |b, &count| {
            b.iter(|| {
                let mut slots = Slots::new();
                for i in 0..count as u64 {
                    black_box(slots.add(i, 1));
                }
                slots.len()
            });
        });
    }

    group.finish();
}

/// Benchmark: Remove and re-add every entry, recycling through the free list.
fn bench_churn(c: &mut Criterion) {
    let (mut slots, mut handles) = filled(ENTRY_COUNT);

    c.bench_function("slot_churn_100K", |b| {
        b.iter(|| {
            for h in &handles {
                slots.remove(*h);
            }
            for (i, h) in handles.iter_mut().enumerate() {
                *h = slots.add(i as u64, 1);
            }
            black_box(slots.len())
        });
    });
}

/// Benchmark: Lookups by live and stale handle.
fn bench_get(c: &mut Criterion) {
    let (mut slots, handles) = filled(ENTRY_COUNT);
    let mut group = c.benchmark_group("slot_get");

    group.bench_function("live_100K", |b| {
        b.iter(|| {
            let mut sum = 0u64;
            for h in &handles {
                sum = sum.wrapping_add(*slots.get(*h).unwrap_or(&0));
            }
            black_box(sum)
        });
    });

    let stale: Vec<Handle> = handles.iter().step_by(2).copied().collect();
    for h in &stale {
        slots.remove(*h);
    }
    group.bench_function("stale_50K", |b| {
        b.iter(|| stale.iter().filter(|h| slots.is_live(**h)).count());
    });

    group.finish();
}

/// Benchmark: Replay a snapshot into an empty allocator.
fn bench_restore(c: &mut Criterion) {
    let (mut slots, handles) = filled(ENTRY_COUNT);
    for h in handles.iter().step_by(3) {
        slots.remove(*h);
    }
    let snapshot = slots.snapshot();

    c.bench_function("slot_restore_66K", |b| {
        let mut target = Slots::new();
        b.iter(|| black_box(target.restore(&snapshot)));
    });
}

/// Benchmark: Component lookups through the reverse map versus the dense array.
fn bench_components(c: &mut Criterion) {
    let entities: Vec<Handle> = (0..ENTRY_COUNT)
        .map(|i| StandardLayout::make(i, 1, 1))
        .collect();

    let mut store: ComponentStore<StandardLayout, u64> = ComponentStore::new();
    let mut dense: DenseComponentArray<StandardLayout, u64> = DenseComponentArray::new();
    for (i, e) in entities.iter().enumerate() {
        store.add(*e, i as u64, 2, true);
        dense.add(*e, i as u64);
    }

    let mut group = c.benchmark_group("component_get_by_entity");
    group.bench_function("associative_100K", |b| {
        b.iter(|| entities.iter().filter_map(|e| store.get_by_entity(*e)).sum::<u64>());
    });
    group.bench_function("dense_100K", |b| {
        b.iter(|| entities.iter().filter_map(|e| dense.get(*e)).sum::<u64>());
    });
    group.finish();
}

criterion_group!(
    benches,
    bench_add,
    bench_churn,
    bench_get,
    bench_restore,
    bench_components,
);

criterion_main!(benches);
