//! Metrics Benchmarks
//!
//! Benchmarks for confusion-matrix construction and metric aggregation.

use criterion::{criterion_group, criterion_main, BenchmarkId, Criterion};
use foldscore::{all_metrics, binary_confusion_matrix};

/// Create synthetic (y_pred, y_true) label sequences
fn create_label_pairs(n_samples: usize, n_classes: u32) -> (Vec<u32>, Vec<u32>) {
    // Simple LCG random generator for reproducibility
    let mut rng_state: u64 = 42;
    let next_label = |state: &mut u64| -> u32 {
        *state = state.wrapping_mul(6364136223846793005).wrapping_add(1);
        ((*state >> 33) % n_classes as u64) as u32
    };

    let y_true: Vec<u32> = (0..n_samples).map(|_| next_label(&mut rng_state)).collect();
    let y_pred: Vec<u32> = y_true
        .iter()
        .map(|&t| {
            if next_label(&mut rng_state) == 0 {
                (t + 1) % n_classes
            } else {
                t
            }
        })
        .collect();
    (y_pred, y_true)
}

fn bench_binary_confusion_matrix(c: &mut Criterion) {
    let mut group = c.benchmark_group("Binary Confusion Matrix");

    for n_samples in [1_000, 10_000, 100_000].iter() {
        let (y_pred, y_true) = create_label_pairs(*n_samples, 2);

        group.bench_with_input(
            BenchmarkId::new("build", n_samples),
            &(&y_pred, &y_true),
            |b, (y_pred, y_true)| {
                b.iter(|| {
                    binary_confusion_matrix(
                        std::hint::black_box(y_pred.as_slice()),
                        y_true.as_slice(),
                        &1,
                    )
                    .unwrap();
                });
            },
        );
    }

    group.finish();
}

fn bench_all_metrics(c: &mut Criterion) {
    let mut group = c.benchmark_group("All Metrics");

    for n_classes in [2u32, 5, 10].iter() {
        let (y_pred, y_true) = create_label_pairs(10_000, *n_classes);
        let labels: Vec<u32> = (0..*n_classes).collect();

        group.bench_with_input(
            BenchmarkId::new("classes", n_classes),
            &(&y_pred, &y_true, &labels),
            |b, (y_pred, y_true, labels)| {
                b.iter(|| {
                    all_metrics(
                        std::hint::black_box(y_pred.as_slice()),
                        y_true.as_slice(),
                        labels.as_slice(),
                    )
                    .unwrap();
                });
            },
        );
    }

    group.finish();
}

criterion_group!(benches, bench_binary_confusion_matrix, bench_all_metrics);

criterion_main!(benches);
