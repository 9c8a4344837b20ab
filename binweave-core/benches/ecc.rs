use binweave_core::ecc::EccScheme;
use criterion::{black_box, criterion_group, criterion_main, BenchmarkId, Criterion, Throughput};

fn bench_schemes(c: &mut Criterion) {
    for (name, scheme) in [
        ("nibble", EccScheme::NibbleParity),
        ("majority", EccScheme::MajorityRule),
        ("secded", EccScheme::Secded),
    ] {
        let mut group = c.benchmark_group(name);
        for size in [256usize, 1024, 4096, 16384] {
            let data = vec![0x42u8; size];

            group.throughput(Throughput::Bytes(size as u64));
            group.bench_with_input(BenchmarkId::from_parameter(size), &data, |b, data| {
                b.iter(|| scheme.encode(black_box(data)).unwrap());
            });
        }
        group.finish();
    }
}

fn bench_10bit(c: &mut Criterion) {
    c.bench_function("10_bits_majority", |b| {
        let raw = 0x155u16.to_le_bytes();
        b.iter(|| EccScheme::MajorityRule10Bit.encode(black_box(&raw)).unwrap());
    });
}

criterion_group!(benches, bench_schemes, bench_10bit);
criterion_main!(benches);
