//! Throughput benchmarks for pipelines
//!
//! Run with: cargo bench -p fieldguard-policy

use criterion::{black_box, criterion_group, criterion_main, BenchmarkId, Criterion};
use fieldguard_audit::MemorySink;
use fieldguard_core::Record;
use fieldguard_policy::{Pipeline, PipelineBuilder};
use fieldguard_transform::{generate_aes_key, CharClass, MaskStrategy, Tokenizer};
use std::sync::Arc;

fn sample_record() -> Record {
    [
        ("email", "user@example.com"),
        ("name", "maskingUser"),
        ("phone", "010-1234-5678"),
        ("ssn", "123-45-6789"),
        ("card", "4111-1111-1111-1111"),
    ]
    .into_iter()
    .map(|(k, v)| (k.to_string(), Some(v.to_string())))
    .collect()
}

fn mask_only() -> Pipeline {
    PipelineBuilder::new()
        .mask("email", MaskStrategy::regex(r"^.(?P<mask>[^@]*).@", '*').unwrap())
        .mask("name", MaskStrategy::partial(2, 2, '*'))
        .mask("phone", MaskStrategy::char_class([CharClass::Digit], '*'))
        .build()
        .unwrap()
}

fn full() -> Pipeline {
    let key = generate_aes_key(256).unwrap();
    PipelineBuilder::new()
        .mask("email", MaskStrategy::regex(r"^.(?P<mask>[^@]*).@", '*').unwrap())
        .mask("name", MaskStrategy::partial(2, 2, '*'))
        .tokenize("ssn", Tokenizer::hash("bench-salt"))
        .encrypt_symmetric("card", &key)
        .build()
        .unwrap()
}

fn full_audited() -> Pipeline {
    let sink = Arc::new(MemorySink::with_capacity_limit(1024));
    let key = generate_aes_key(256).unwrap();
    PipelineBuilder::new()
        .mask_with_audit("email", MaskStrategy::regex(r"^.(?P<mask>[^@]*).@", '*').unwrap(), sink.clone())
        .mask_with_audit("name", MaskStrategy::partial(2, 2, '*'), sink.clone())
        .tokenize_with_audit("ssn", Tokenizer::hash("bench-salt"), sink.clone())
        .encrypt_symmetric_with_audit("card", &key, sink)
        .build()
        .unwrap()
}

fn benchmark_pipelines(c: &mut Criterion) {
    let cases = vec![
        ("mask_only", mask_only()),
        ("full", full()),
        ("full_audited", full_audited()),
    ];

    let mut group = c.benchmark_group("Pipeline_Apply");
    group.sample_size(100);

    for (name, pipeline) in &cases {
        group.bench_with_input(BenchmarkId::new("apply", name), pipeline, |b, pipeline| {
            b.iter_batched(
                sample_record,
                |mut record| {
                    pipeline.apply(black_box(&mut record)).unwrap();
                    record
                },
                criterion::BatchSize::SmallInput,
            );
        });
    }

    group.finish();
}

criterion_group!(benches, benchmark_pipelines);
criterion_main!(benches);
