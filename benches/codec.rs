//! Codec throughput benchmarks.

use criterion::{criterion_group, criterion_main, Criterion};
use std::hint::black_box;
use std::sync::Arc;
use xsdbind::{compile_schema, parse_schema, DocumentProfile, ModelCodec};

const MINI_POM_XSD: &str = include_str!("../tests/fixtures/mini-pom.xsd");
const POM_XML: &str = include_str!("../tests/fixtures/pom.xml");

fn pom_codec() -> ModelCodec {
    let registry = compile_schema(&parse_schema(MINI_POM_XSD).unwrap()).unwrap();
    ModelCodec::new(Arc::new(registry))
        .unwrap()
        .with_profile(DocumentProfile::pom())
}

fn benchmark_compile(c: &mut Criterion) {
    let schema = parse_schema(MINI_POM_XSD).unwrap();

    c.bench_function("compile_schema", |b| {
        b.iter(|| compile_schema(black_box(&schema)).unwrap())
    });
}

fn benchmark_decode(c: &mut Criterion) {
    let codec = pom_codec();

    c.bench_function("decode_pom", |b| {
        b.iter(|| codec.decode(black_box(POM_XML.as_bytes())).unwrap())
    });
}

fn benchmark_encode(c: &mut Criterion) {
    let codec = pom_codec();
    let model = codec.decode(POM_XML.as_bytes()).unwrap();

    c.bench_function("encode_pom", |b| {
        b.iter(|| codec.encode(black_box(&model)).unwrap())
    });
}

criterion_group!(benches, benchmark_compile, benchmark_decode, benchmark_encode);
criterion_main!(benches);
