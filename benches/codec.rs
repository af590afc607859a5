//! Build, encode and decode benchmarks.

use std::io::Cursor;

use criterion::{black_box, criterion_group, criterion_main, Criterion, Throughput};
use entuple::{Decoder, Encoder, Field, FieldType, Registry, TupleBuilder, Tuple, TupleType};

fn person_type() -> TupleType {
    let mut person = TupleType::new("bench", "person");
    person
        .add_version(vec![
            Field::new("name", true, FieldType::String),
            Field::new("born", true, FieldType::Timestamp),
            Field::new("phone", true, FieldType::String),
            Field::new("siblings", true, FieldType::Uint8),
            Field::new("balance", true, FieldType::Float32),
        ])
        .unwrap();
    person
}

fn fill(builder: &mut TupleBuilder<'_>) -> Tuple {
    builder.put_string("name", "Daffy Moduck").unwrap();
    builder.put_timestamp("born", 819_118_800_000_000_000).unwrap();
    builder.put_string("phone", "555-555-5555").unwrap();
    builder.put_uint8("siblings", 3).unwrap();
    builder.put_float32("balance", 1_000_000.25).unwrap();
    builder.build().unwrap()
}

fn bench_build(c: &mut Criterion) {
    let mut group = c.benchmark_group("build");
    group.throughput(Throughput::Elements(1));
    group.bench_function("five_fields", |b| {
        let person = person_type();
        let mut buffer = vec![0u8; 1024];
        let mut builder = TupleBuilder::new(person, &mut buffer);
        b.iter(|| black_box(fill(&mut builder)));
    });
    group.finish();
}

fn bench_encode(c: &mut Criterion) {
    let person = person_type();
    let mut buffer = vec![0u8; 1024];
    let mut builder = TupleBuilder::new(person, &mut buffer);
    let tuple = fill(&mut builder);
    let frame_len = {
        let mut encoder = Encoder::new(Vec::new());
        encoder.encode(&tuple).unwrap() as u64
    };

    let mut group = c.benchmark_group("encode");
    group.throughput(Throughput::Bytes(frame_len));
    group.bench_function("five_fields", |b| {
        b.iter(|| {
            let mut encoder = Encoder::new(Vec::with_capacity(256));
            black_box(encoder.encode(&tuple).unwrap());
        });
    });
    group.finish();
}

fn bench_decode(c: &mut Criterion) {
    let registry = Registry::new();
    registry.register(person_type());

    let mut buffer = vec![0u8; 1024];
    let mut builder = TupleBuilder::new(person_type(), &mut buffer);
    let tuple = fill(&mut builder);
    let mut encoder = Encoder::new(Vec::new());
    encoder.encode(&tuple).unwrap();
    let frame = encoder.into_inner().unwrap();

    let mut group = c.benchmark_group("decode");
    group.throughput(Throughput::Bytes(frame.len() as u64));
    group.bench_function("five_fields", |b| {
        b.iter(|| {
            let mut decoder =
                Decoder::new(registry.clone(), 4096, Cursor::new(frame.as_slice()));
            black_box(decoder.decode().unwrap());
        });
    });
    group.finish();
}

criterion_group!(benches, bench_build, bench_encode, bench_decode);
criterion_main!(benches);
