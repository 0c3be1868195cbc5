use crnai::assignment;
use crnai::cluster::{Affinity, AffinityPropagation, Preference, Scale, SpectralClustering};
use crnai::matrix::{distance_matrix, euclidean, SquareMatrix};
use crnai::outlier::{lof, IterativeKnn};
use crnai::search::find_path;
use criterion::{black_box, criterion_group, criterion_main, Criterion};
use rand::prelude::*;

fn points(n: usize, d: usize, seed: u64) -> Vec<Vec<f64>> {
    let mut rng = StdRng::seed_from_u64(seed);
    (0..n)
        .map(|_| (0..d).map(|_| rng.random::<f64>()).collect())
        .collect()
}

#[allow(clippy::ptr_arg)]
fn dist(a: &Vec<f64>, b: &Vec<f64>) -> f64 {
    euclidean(a, b)
}

fn bench_hungarian(c: &mut Criterion) {
    let mut group = c.benchmark_group("hungarian");
    let mut rng = StdRng::seed_from_u64(42);
    let n = 100;
    let cost = SquareMatrix::from_fn(n, |_, _| rng.random_range(0.0..100.0));

    group.bench_function("solve_n100", |b| {
        b.iter(|| assignment::solve(black_box(&cost)).unwrap())
    });
    group.finish();
}

fn bench_clustering(c: &mut Criterion) {
    let mut group = c.benchmark_group("clustering");
    let data = points(200, 8, 42);
    let d = distance_matrix(&data, dist);

    group.bench_function("affinity_propagation_n200", |b| {
        b.iter(|| {
            AffinityPropagation::new(Preference::Medium)
                .fit(black_box(&d))
                .unwrap()
        })
    });

    let affinity = Affinity::new(Scale::Local { neighborhood: 7 });
    group.bench_function("spectral_n200", |b| {
        b.iter(|| SpectralClustering::from_distances(black_box(&d), &affinity).unwrap())
    });
    group.finish();
}

fn bench_outliers(c: &mut Criterion) {
    let mut group = c.benchmark_group("outlier");
    let data = points(1000, 4, 7);
    let d = distance_matrix(&data, dist);

    group.bench_function("lof_n1000_k10", |b| {
        b.iter(|| lof(black_box(&d), 10).unwrap())
    });

    group.bench_function("iterative_add_n1000_k10", |b| {
        b.iter(|| {
            let mut knn = IterativeKnn::new(10, dist).unwrap();
            for p in &data {
                let _ = knn.add(p.clone());
            }
            knn
        })
    });

    group.bench_function("iterative_fast_add_n1000_k10", |b| {
        b.iter(|| {
            let mut knn = IterativeKnn::new(10, dist).unwrap();
            for p in &data {
                let _ = knn.fast_add(p.clone());
            }
            knn
        })
    });
    group.finish();
}

fn bench_search(c: &mut Criterion) {
    let mut group = c.benchmark_group("search");
    let size = 60i32;
    let neighbors = |&(r, c): &(i32, i32)| {
        [(r - 1, c), (r + 1, c), (r, c - 1), (r, c + 1)]
            .into_iter()
            .filter(|&(r, c)| (0..size).contains(&r) && (0..size).contains(&c))
            .filter(|&(r, c)| !(c == size / 2 && r > 0))
            .collect::<Vec<_>>()
    };

    group.bench_function("astar_grid_60", |b| {
        b.iter(|| {
            find_path(
                black_box((size - 1, 0)),
                (size - 1, size - 1),
                |_, _| 1.0,
                |a, b| f64::from((a.0 - b.0).abs() + (a.1 - b.1).abs()),
                neighbors,
            )
            .unwrap()
        })
    });
    group.finish();
}

criterion_group!(
    benches,
    bench_hungarian,
    bench_clustering,
    bench_outliers,
    bench_search
);
criterion_main!(benches);
