//! CPU-side costs of the harness: fixture generation, blob packing, and a
//! full sweep against the in-process store.

use criterion::{BatchSize, Criterion, Throughput, criterion_group, criterion_main};
use pgingest_benchmarks::ingest::{RunConfig, Runner};
use pgingest_core::{FixtureGenerator, PackedBlob, Point, codec, memory::MemoryStore};
use std::hint::black_box;
use tokio::runtime::Runtime;

const POINTS: u64 = 10_000;
const ATTRS: usize = 8;

fn generation(c: &mut Criterion) {
    let generator = FixtureGenerator::new(ATTRS);
    let mut group = c.benchmark_group("generation");
    group.throughput(Throughput::Elements(POINTS));

    group.bench_function("collect", |b| b.iter(|| generator.points(0..POINTS).collect::<Vec<Point>>()));
    group.bench_function("fill_reused", |b| {
        let mut point = generator.point(0);
        b.iter(|| {
            for index in 0..POINTS {
                generator.fill(index, &mut point);
                black_box(&point);
            }
        })
    });
    group.finish();
}

fn packing(c: &mut Criterion) {
    let points: Vec<Point> = FixtureGenerator::new(ATTRS).points(0..POINTS).collect();
    let mut group = c.benchmark_group("packing");
    group.throughput(Throughput::Bytes(codec::encode(&points).len() as u64));

    group.bench_function("encode", |b| b.iter(|| codec::encode(black_box(&points))));
    group.bench_function("pack_100", |b| {
        b.iter(|| {
            for chunk in points.chunks(100) {
                black_box(PackedBlob::pack(chunk, ATTRS).unwrap());
            }
        })
    });
    let blob = PackedBlob::pack(&points, ATTRS).unwrap();
    group.bench_function("unpack", |b| b.iter(|| blob.unpack().unwrap()));
    group.finish();
}

fn memory_sweep(c: &mut Criterion) {
    let rt = Runtime::new().unwrap();
    let config = RunConfig::builder().total_points(POINTS).attribute_count(ATTRS).batch_sizes([100, 1000]).group_sizes([100]).build().unwrap();

    c.bench_function("memory_sweep", |b| {
        b.to_async(&rt).iter_batched(
            || Runner::new(MemoryStore::new(), config.clone()),
            async |runner| {
                runner.run().await.unwrap();
            },
            BatchSize::SmallInput,
        )
    });
}

criterion_group!(benches, generation, packing, memory_sweep);
criterion_main!(benches);
