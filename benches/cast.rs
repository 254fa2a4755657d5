//! Cast benchmarks
//!
//! Cross-casts through a four-root hierarchy against the compiler's own
//! upcasts and `Any` downcasts.

use criterion::{black_box, criterion_group, criterion_main, BenchmarkId, Criterion};
use std::any::Any;

use rttimeta::{fnv1a_32, rtti_meta, Class, Registry, Rtti, RttiExt};

pub trait A1: Rtti {}
pub trait A2: Rtti {}
pub trait A3: Rtti {}
pub trait A4: Rtti {}
pub trait B1: A1 {}
pub trait B2: A2 {}
pub trait B3: A3 {}
pub trait B4: A4 {}
pub trait C1: B1 + B2 {}
pub trait C2: B3 + B4 {}

rtti_meta!(dyn A1);
rtti_meta!(dyn A2);
rtti_meta!(dyn A3);
rtti_meta!(dyn A4);
rtti_meta!(dyn B1: dyn A1);
rtti_meta!(dyn B2: dyn A2);
rtti_meta!(dyn B3: dyn A3);
rtti_meta!(dyn B4: dyn A4);
rtti_meta!(dyn C1: dyn B1, dyn B2);
rtti_meta!(dyn C2: dyn B3, dyn B4);

pub struct D1(u64);
impl A1 for D1 {}
impl A2 for D1 {}
impl A3 for D1 {}
impl A4 for D1 {}
impl B1 for D1 {}
impl B2 for D1 {}
impl B3 for D1 {}
impl B4 for D1 {}
impl C1 for D1 {}
impl C2 for D1 {}
rtti_meta!(D1: dyn C1, dyn C2);

fn bench_cross_cast(c: &mut Criterion) {
    let d1 = D1(7);
    let a1: &dyn A1 = &d1;

    // Warm-up builds every descriptor before measuring
    black_box(a1.cast::<dyn A4>());

    let mut group = c.benchmark_group("cross_cast");

    group.bench_function("rttimeta", |b| {
        b.iter(|| {
            let a1 = black_box(a1);
            black_box(a1.cast::<dyn A4>());
            black_box(a1.cast::<dyn B4>());
            black_box(a1.cast::<dyn C2>());
        })
    });

    group.bench_function("native_upcast", |b| {
        let d1 = black_box(&d1);
        b.iter(|| {
            black_box(d1 as &dyn A4);
            black_box(d1 as &dyn B4);
            black_box(d1 as &dyn C2);
        })
    });

    group.finish();
}

fn bench_downcast(c: &mut Criterion) {
    let d1 = D1(7);
    let a2: &dyn A2 = &d1;
    let any: &dyn Any = &d1;

    let mut group = c.benchmark_group("downcast");

    group.bench_function("rttimeta", |b| {
        b.iter(|| black_box(black_box(a2).cast::<D1>().map(|d| d.0)))
    });

    group.bench_function("any", |b| {
        b.iter(|| black_box(black_box(any).downcast_ref::<D1>().map(|d| d.0)))
    });

    group.bench_function("miss", |b| {
        b.iter(|| black_box(black_box(a2).cast::<dyn A4>().is_none()))
    });

    group.finish();
}

fn bench_queries(c: &mut Criterion) {
    let d1 = D1(7);
    let a1: &dyn A1 = &d1;
    let target = <dyn A4 as Class>::class_id();

    let mut group = c.benchmark_group("queries");

    group.bench_function("is", |b| b.iter(|| black_box(black_box(a1).is(target))));

    for len in [8usize, 32, 128].iter() {
        let name = "x".repeat(*len);
        group.bench_with_input(BenchmarkId::new("fnv1a_32", len), &name, |b, name| {
            b.iter(|| black_box(fnv1a_32(black_box(name))))
        });
    }

    let registry = Registry::new();
    let _ = registry.register::<D1>();
    group.bench_function("registry_is_subtype", |b| {
        b.iter(|| black_box(registry.is_subtype(D1::class_id(), black_box(target))))
    });

    group.finish();
}

criterion_group!(benches, bench_cross_cast, bench_downcast, bench_queries);
criterion_main!(benches);
