//! Microbenchmarks for the `dispatch()` path.
//!
//! Measures per-query generation latency across shapes and population sizes.
//!
//! Run with: `cargo bench -p devops-querygen -- dispatch`

#![allow(missing_docs)]

use std::time::Duration;

use criterion::{BenchmarkId, Criterion, black_box, criterion_group, criterion_main};
use querygen::{DevopsGenerator, DialectKind, Shape};
use rand::SeedableRng;
use rand::rngs::StdRng;

const START: u64 = 1_451_606_400_000_000_000; // 2016-01-01T00:00:00Z
const DAY_NS: u64 = 86_400_000_000_000;

/// Creates a generator over a three-day horizon.
fn setup_generator() -> DevopsGenerator<DialectKind> {
    DevopsGenerator::new(
        START,
        START + 3 * DAY_NS,
        DialectKind::Cassandra,
        StdRng::seed_from_u64(42),
    )
    .unwrap()
}

fn bench_dispatch_catalog(c: &mut Criterion) {
    let mut group = c.benchmark_group("dispatch/shape");

    for shape in Shape::catalog() {
        let mut generator = setup_generator();
        group.bench_with_input(BenchmarkId::from_parameter(&shape), &shape, |b, shape| {
            b.iter(|| {
                let q = generator.dispatch(black_box(shape), black_box(100)).unwrap();
                generator.recycle(q);
            });
        });
    }

    group.finish();
}

fn bench_dispatch_scale_var(c: &mut Criterion) {
    let mut group = c.benchmark_group("dispatch/scale_var");
    let shape = Shape::MaxCpuByMinute {
        hosts: 8,
        range: Duration::from_secs(3600),
    };

    for scale_var in [100, 1_000, 10_000, 100_000] {
        let mut generator = setup_generator();
        group.bench_with_input(
            BenchmarkId::from_parameter(scale_var),
            &scale_var,
            |b, &scale_var| {
                b.iter(|| {
                    let q = generator.dispatch(&shape, black_box(scale_var)).unwrap();
                    generator.recycle(q);
                });
            },
        );
    }

    group.finish();
}

fn bench_dispatch_without_recycle(c: &mut Criterion) {
    let mut generator = setup_generator();
    let shape = Shape::MaxAllCpu { hosts: 8 };

    c.bench_function("dispatch/no_recycle", |b| {
        b.iter(|| black_box(generator.dispatch(&shape, 100).unwrap()));
    });
}

criterion_group!(
    benches,
    bench_dispatch_catalog,
    bench_dispatch_scale_var,
    bench_dispatch_without_recycle,
);
criterion_main!(benches);
