use criterion::{criterion_group, criterion_main, BenchmarkId, Criterion, Throughput};
use lfu_engine::LfuCache;

fn criterion_benchmark(c: &mut Criterion) {
    let mut group = c.benchmark_group("set without eviction");
    for size in (1000..=10000).step_by(1000) {
        group.throughput(Throughput::Elements(size));
        group.bench_with_input(BenchmarkId::from_parameter(size), &size, |b, &size| {
            let mut cache = LfuCache::new(size as usize).unwrap();
            b.iter(|| {
                for i in 0..size {
                    cache.set(i, i);
                }
            });
        });
    }
    group.finish();

    let mut group = c.benchmark_group("set with eviction");
    for size in (1000..=10000).step_by(1000) {
        group.throughput(Throughput::Elements(size));
        group.bench_with_input(BenchmarkId::from_parameter(size), &size, |b, &size| {
            let mut cache = LfuCache::new((size / 4) as usize).unwrap();
            b.iter(|| {
                for i in 0..size {
                    cache.set(i, i);
                }
            });
        });
    }
    group.finish();

    let mut group = c.benchmark_group("get hits");
    for size in (1000..=10000).step_by(1000) {
        group.throughput(Throughput::Elements(size));
        group.bench_with_input(BenchmarkId::from_parameter(size), &size, |b, &size| {
            let mut cache = LfuCache::new(size as usize).unwrap();
            cache.extend((0..size).map(|i| (i, i)));
            b.iter(|| {
                for i in 0..size {
                    let _ = cache.get(&i);
                }
            });
        });
    }
    group.finish();
}

criterion_group!(benches, criterion_benchmark);
criterion_main!(benches);
