use criterion::{black_box, criterion_group, criterion_main, Criterion};
use mixpak::{decode, encode, Archive, DecodeOptions, Entry};

fn build_archive(entries: usize, size: usize) -> Archive {
    let mut ar = Archive::new();
    for i in 0..entries {
        ar.add(Entry::new(format!("file_{i:04}.dat"), vec![(i % 251) as u8; size]));
    }
    ar
}

fn bench_encode(c: &mut Criterion) {
    let ar = build_archive(256, 4096);
    c.bench_function("encode_256x4k", |b| b.iter(|| encode(black_box(&ar)).unwrap()));

    let big = build_archive(4, 1024 * 1024);
    c.bench_function("encode_4x1mb", |b| b.iter(|| encode(black_box(&big)).unwrap()));
}

fn bench_decode(c: &mut Criterion) {
    let bytes = encode(&build_archive(256, 4096)).unwrap();
    c.bench_function("decode_256x4k", |b| {
        b.iter(|| decode(black_box(&bytes), DecodeOptions::default()).unwrap())
    });
}

fn bench_checksum(c: &mut Criterion) {
    let data = vec![0x5Au8; 1024 * 1024];
    c.bench_function("checksum_1mb", |b| b.iter(|| mixpak::crc::checksum(black_box(&data))));
}

criterion_group!(benches, bench_encode, bench_decode, bench_checksum);
criterion_main!(benches);
