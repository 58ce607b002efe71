use chrono::NaiveDate;
use criterion::{black_box, criterion_group, criterion_main, Criterion};
use kma_weather::{scalar, BaseTimeResolver, ColumnOp, FrameTransformExt, Transform};
use polars::prelude::*;

fn bench_scalar(c: &mut Criterion) {
    let resolver = BaseTimeResolver::default();
    let now = NaiveDate::from_ymd_opt(2019, 5, 10)
        .unwrap()
        .and_hms_opt(14, 47, 0)
        .unwrap();

    c.bench_function("last_base", |b| b.iter(|| resolver.last_base(black_box(now))));
    c.bench_function("classify_pm10", |b| b.iter(|| scalar::classify_pm10(black_box(95.0))));
    c.bench_function("floor_10min", |b| b.iter(|| scalar::floor_10min(black_box("14:47"))));
    c.bench_function("is_clean_day", |b| b.iter(|| scalar::is_clean_day(black_box("2019-05-22"))));
}

fn bench_columns(c: &mut Criterion) {
    let n = 10_000;
    let df = df!(
        "date" => (0..n).map(|i| format!("2019-{:02}-{:02}", i % 12 + 1, i % 28 + 1)).collect::<Vec<_>>(),
        "pm10" => (0..n).map(|i| (i % 200) as f64).collect::<Vec<_>>(),
    )
    .unwrap();
    let ops = [
        ColumnOp::map(Transform::DateSeason, "date", "season"),
        ColumnOp::map(Transform::CleanDay, "date", "clean"),
        ColumnOp::map(Transform::ClassifyPm10, "pm10", "pm10_class"),
    ];

    c.bench_function("apply_ops_10k", |b| {
        b.iter(|| df.clone().apply_ops(black_box(&ops)).unwrap())
    });
}

criterion_group!(benches, bench_scalar, bench_columns);
criterion_main!(benches);
