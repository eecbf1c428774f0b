//! 변환기 벤치마크
//!
//! 형식별 변환과 페이로드 직렬화 성능을 측정합니다.

use chrono::{TimeZone, Utc};
use criterion::{black_box, criterion_group, criterion_main, BenchmarkId, Criterion, Throughput};
use sidekick_core::{FalcoEvent, Priority};
use sidekick_outputs::{OutputKind, OutputSettings, TransformerRegistry};

fn create_event(extra_fields: usize) -> FalcoEvent {
    let mut event = FalcoEvent::new(
        "Terminal shell in container (user=root shell=bash parent=runc cmdline=bash)",
        Priority::Notice,
        "Terminal shell in container",
        Utc.with_ymd_and_hms(2024, 3, 1, 12, 0, 0).unwrap(),
    )
    .with_field("proc.name", "bash")
    .with_field("proc.tty", 34816_i64)
    .with_field("container.id", "3f8a1c2b9e7d")
    .with_field("k8s.pod.name", "web-5d8f7c9b4-x2k8p")
    .with_field("evt.arg.flags", serde_json::Value::Null)
    .with_field("fd.num", 3.0_f64);
    for i in 0..extra_fields {
        event = event.with_field(format!("custom.field[{i}]"), format!("value {i}"));
    }
    event
}

fn bench_transform(c: &mut Criterion) {
    let registry = TransformerRegistry::with_defaults();
    let settings = OutputSettings::default();
    let event = create_event(0);

    let mut group = c.benchmark_group("transform");
    group.throughput(Throughput::Elements(1));
    for kind in OutputKind::ALL {
        let Some(transformer) = registry.get(kind) else {
            continue;
        };
        group.bench_function(kind.as_str(), |b| {
            b.iter(|| transformer.transform(black_box(&event), black_box(&settings)))
        });
    }
    group.finish();
}

fn bench_transform_and_encode(c: &mut Criterion) {
    let registry = TransformerRegistry::with_defaults();
    let settings = OutputSettings::default();

    let mut group = c.benchmark_group("transform_encode");
    for fields in [0_usize, 16, 64] {
        let event = create_event(fields);
        for kind in [OutputKind::Alertmanager, OutputKind::Loki] {
            let Some(transformer) = registry.get(kind) else {
                continue;
            };
            group.bench_with_input(
                BenchmarkId::new(kind.as_str(), fields),
                &event,
                |b, event| {
                    b.iter(|| {
                        transformer
                            .transform(black_box(event), &settings)
                            .encode()
                    })
                },
            );
        }
    }
    group.finish();
}

criterion_group!(benches, bench_transform, bench_transform_and_encode);
criterion_main!(benches);
