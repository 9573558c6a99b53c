use bench_chart::{
    baseline::annotation_baseline, geometry::BarLayout, matrix, render, sanitize::sanitize,
    timeout::classify, BenchmarkRecord, ChartConfig,
};
use criterion::{black_box, criterion_group, criterion_main, Criterion};

fn synthetic_records(datasets: usize, algorithms: usize) -> Vec<BenchmarkRecord> {
    let mut records = Vec::with_capacity(datasets * algorithms);
    for d in 0..datasets {
        for a in 0..algorithms {
            // Every seventh run is a timeout.
            let time = if (d + a) % 7 == 0 { -1.0 } else { 1e-4 * ((d * algorithms + a) as f64 + 1.0) };
            records.push(BenchmarkRecord::new(&(d + 1).to_string(), &format!("Algorithm {}", a), time));
        }
    }
    records
}

fn plan_chart(c: &mut Criterion) {
    let records = synthetic_records(200, 8);
    let config = ChartConfig::default();

    c.bench_function("pivot, mask and plan 200x8", |b| {
        b.iter(|| {
            let matrix = matrix::build(black_box(&records)).unwrap();
            let mask = classify(&matrix);
            let sanitized = sanitize(&matrix, &mask);
            let (groups, items) = sanitized.shape();
            let layout = BarLayout::new(groups, items, config.group_width);
            let baseline = annotation_baseline(&sanitized);
            render::plan(&sanitized, &mask, &layout, baseline, &config)
        })
    });
}

criterion_group!(benches, plan_chart);
criterion_main!(benches);
