//! Criterion micro-benchmarks for arena push, pop/re-push, and carving.

use criterion::{black_box, criterion_group, criterion_main, BatchSize, Criterion};

use bedrock_arena::Arena;
use bedrock_array::VmVec;
use bedrock_bench::fill;
use bedrock_vm::align::{kib, mib};

/// Steady-state push throughput at several allocation sizes. The arena is
/// rolled back between iterations, so after warm-up every push lands in
/// already-committed pages.
fn bench_push(c: &mut Criterion) {
    let mut group = c.benchmark_group("push_1000");
    for size in [16usize, 128, 1024] {
        let mut arena = Arena::reserve(mib(64));
        group.bench_function(format!("{size}B"), |b| {
            b.iter(|| {
                arena.pop_to(0);
                black_box(fill(&mut arena, 1000, size));
            });
        });
    }
    group.finish();
}

/// First-touch pushes: every iteration gets a fresh reservation, so each
/// push pays the lazy commit.
fn bench_push_first_touch(c: &mut Criterion) {
    c.bench_function("push_first_touch_64x4KiB", |b| {
        b.iter_batched(
            || Arena::reserve(mib(64)),
            |mut arena| black_box(fill(&mut arena, 64, kib(4))),
            BatchSize::LargeInput,
        );
    });
}

/// The snapshot/speculate/rollback cycle: push, pop (which zeroes), push
/// again into the same bytes.
fn bench_pop_repush(c: &mut Criterion) {
    let mut arena = Arena::reserve(mib(4));
    c.bench_function("pop_repush_4KiB", |b| {
        b.iter(|| {
            let mark = arena.pos();
            let (offset, _) = arena.push(kib(4));
            arena.pop_to(mark);
            black_box(offset);
        });
    });
}

/// Sub-arena carving cost: header commit plus bookkeeping, no data pages.
fn bench_subarena_carve(c: &mut Criterion) {
    c.bench_function("carve_64x64KiB", |b| {
        b.iter_batched(
            || Arena::reserve(mib(64)),
            |mut root| {
                for _ in 0..64 {
                    black_box(root.subarena(kib(64)).capacity());
                }
            },
            BatchSize::LargeInput,
        );
    });
}

/// Chunked-commit growth of the no-relocation array.
fn bench_vmvec_push(c: &mut Criterion) {
    c.bench_function("vmvec_push_10k_i32", |b| {
        b.iter_batched(
            VmVec::<i32>::new,
            |mut vals| {
                for i in 0..10_000 {
                    vals.push(i);
                }
                black_box(vals.len())
            },
            BatchSize::LargeInput,
        );
    });
}

criterion_group!(
    benches,
    bench_push,
    bench_push_first_touch,
    bench_pop_repush,
    bench_subarena_carve,
    bench_vmvec_push
);
criterion_main!(benches);
