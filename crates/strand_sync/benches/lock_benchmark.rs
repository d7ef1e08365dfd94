//! # Lock Benchmark
//!
//! Uncontended acquire/release cost of each lock kind, plus the re-entrant
//! fast path of the tagged mutex (thread-local only, no host lock).

#![allow(missing_docs)]

use std::hint::black_box;

use criterion::{criterion_group, criterion_main, Criterion};
use strand_sync::{BinaryLock, Guard, RecursiveLock, TaggedRecursiveMutex, WaitSignal};

const BENCH_TAG: usize = 900;

fn bench_binary_lock(c: &mut Criterion) {
    let lock = BinaryLock::new();
    c.bench_function("binary_lock_unlock", |b| {
        b.iter(|| {
            lock.lock();
            lock.unlock();
        });
    });
}

fn bench_recursive_nested(c: &mut Criterion) {
    let lock = RecursiveLock::new();
    c.bench_function("recursive_lock_depth_4", |b| {
        b.iter(|| {
            for _ in 0..4 {
                lock.lock();
            }
            black_box(lock.depth());
            for _ in 0..4 {
                lock.unlock();
            }
        });
    });
}

fn bench_tagged_lock(c: &mut Criterion) {
    let mutex = TaggedRecursiveMutex::<BENCH_TAG>::new();
    c.bench_function("tagged_lock_unlock", |b| {
        b.iter(|| {
            mutex.lock();
            mutex.unlock();
        });
    });
}

fn bench_tagged_reentry(c: &mut Criterion) {
    let mutex = TaggedRecursiveMutex::<BENCH_TAG>::new();
    mutex.lock();
    c.bench_function("tagged_reentry_while_held", |b| {
        b.iter(|| {
            mutex.lock();
            mutex.unlock();
        });
    });
    mutex.unlock();
}

fn bench_guard(c: &mut Criterion) {
    let lock = BinaryLock::new();
    let signal = WaitSignal::new();
    c.bench_function("guard_scope_with_notify", |b| {
        b.iter(|| {
            let guard = Guard::new(&lock);
            signal.notify_one();
            black_box(guard.is_locked())
        });
    });
}

criterion_group!(
    benches,
    bench_binary_lock,
    bench_recursive_nested,
    bench_tagged_lock,
    bench_tagged_reentry,
    bench_guard,
);
criterion_main!(benches);
