use criterion::{black_box, criterion_group, criterion_main, Criterion};
use std::sync::Arc;
use windfield::{ObservationStore, RawObservation, ReferenceSet, Session, ThresholdBounds, ViewName};

fn synthetic_rows(count: usize) -> Vec<RawObservation> {
    (0..count)
        .map(|i| {
            let day = 1 + (i % 7);
            let hour = i % 24;
            let lat = 19.0 + (i % 300) as f64 * 0.01;
            let lon = -160.0 + (i % 500) as f64 * 0.01;
            RawObservation::new(
                format!("2024-01-{day:02}T{hour:02}:00:00Z"),
                lat,
                lon,
                70.0 + (i % 15) as f64,
                (i % 30) as f64,
            )
        })
        .collect()
}

fn bench_classify(c: &mut Criterion) {
    let references = ReferenceSet::hawaii_airfields();
    c.bench_function("assign", |b| {
        b.iter(|| references.assign(black_box(21.30), black_box(-157.90)))
    });
    let rows = synthetic_rows(10_000);
    c.bench_function("load_10k", |b| {
        b.iter(|| ObservationStore::load(black_box(rows.clone()), &references))
    });
}

fn bench_views(c: &mut Criterion) {
    let references = ReferenceSet::hawaii_airfields();
    let store = Arc::new(ObservationStore::load(synthetic_rows(10_000), &references).into_store());
    let mut session = Session::new(store, ThresholdBounds::default());

    c.bench_function("recompute_all_views", |b| {
        b.iter(|| {
            let _ = session.set_threshold(black_box(10.0));
            for view in ViewName::ALL {
                black_box(session.read(view).ok());
            }
        })
    });

    let _ = session.read(ViewName::AboveThreshold);
    c.bench_function("memoized_read", |b| {
        b.iter(|| black_box(session.read(ViewName::AboveThreshold).ok()))
    });
}

criterion_group!(benches, bench_classify, bench_views);
criterion_main!(benches);
