use crnai::assignment;
use crnai::cluster::{Affinity, AffinityPropagation, Preference, Scale, SpectralClustering};
use crnai::genetic::{GenerationStrategy, Genetic};
use crnai::matrix::{distance_matrix, SquareMatrix};
use crnai::outlier::{lof, neighborhoods, IterativeKnn};
use crnai::search::{find_path, find_path_by_scan, find_path_in_graph};
use petgraph::graph::{NodeIndex, UnGraph};
use proptest::prelude::*;
use rand::prelude::*;
use rand::Rng;

fn permutations(n: usize) -> Vec<Vec<usize>> {
    if n == 0 {
        return vec![Vec::new()];
    }
    let mut out = Vec::new();
    for p in permutations(n - 1) {
        for pos in 0..=p.len() {
            let mut q = p.clone();
            q.insert(pos, n - 1);
            out.push(q);
        }
    }
    out
}

fn square(n: usize) -> impl Strategy<Value = Vec<Vec<f64>>> {
    prop::collection::vec(prop::collection::vec(0.0f64..100.0, n), n)
}

fn abs_diff(a: &f64, b: &f64) -> f64 {
    (a - b).abs()
}

proptest! {
    #[test]
    fn prop_hungarian_is_optimal_bijection(cost in (1usize..6).prop_flat_map(square)) {
        let n = cost.len();
        let a = assignment::solve_rows(&cost).unwrap();

        prop_assert_eq!(a.pairs.len(), n);
        let mut rows: Vec<usize> = a.pairs.iter().map(|&(r, _)| r).collect();
        let mut cols = a.columns();
        rows.sort_unstable();
        cols.sort_unstable();
        prop_assert_eq!(&rows, &(0..n).collect::<Vec<_>>());
        prop_assert_eq!(&cols, &(0..n).collect::<Vec<_>>());

        let selected: f64 = a.pairs.iter().map(|&(r, c)| cost[r][c]).sum();
        prop_assert!((selected - a.cost).abs() < 1e-9);

        let best = permutations(n)
            .iter()
            .map(|p| p.iter().enumerate().map(|(r, &c)| cost[r][c]).sum::<f64>())
            .fold(f64::INFINITY, f64::min);
        prop_assert!((a.cost - best).abs() < 1e-6, "{} vs brute force {}", a.cost, best);
    }

    #[test]
    fn prop_hungarian_is_deterministic(cost in (1usize..8).prop_flat_map(square)) {
        let m = SquareMatrix::from_rows(&cost).unwrap();
        prop_assert_eq!(assignment::solve(&m).unwrap(), assignment::solve(&m).unwrap());
    }

    #[test]
    fn prop_affinity_propagation_labels_are_prototypes(
        xs in prop::collection::vec(-50.0f64..50.0, 2..25),
        low in any::<bool>(),
    ) {
        let d = distance_matrix(&xs, abs_diff);
        let preference = if low { Preference::Low } else { Preference::Medium };
        let fit = AffinityPropagation::new(preference).fit(&d).unwrap();

        prop_assert_eq!(fit.labels.len(), xs.len());
        prop_assert!(!fit.prototypes.is_empty());
        for &l in &fit.labels {
            prop_assert_eq!(fit.labels[l], l);
            prop_assert!(fit.prototypes.contains(&l));
        }
    }

    #[test]
    fn prop_spectral_eigenvalues_non_increasing(
        xs in prop::collection::vec(-10.0f64..10.0, 1..20),
        sigma in 0.1f64..5.0,
    ) {
        let d = distance_matrix(&xs, abs_diff);
        let w = Affinity::new(Scale::Fixed { sigma }).build(&d).unwrap();
        let sc = SpectralClustering::new(&w).unwrap();
        let values = sc.eigenvalues();
        prop_assert_eq!(values.len(), xs.len());
        for pair in values.windows(2) {
            prop_assert!(pair[0] >= pair[1]);
        }
    }

    #[test]
    fn prop_incremental_knn_matches_batch(
        xs in prop::collection::vec(-100.0f64..100.0, 5..30),
        k in 2usize..5,
    ) {
        let mut knn = IterativeKnn::new(k, abs_diff).unwrap();
        for &x in &xs {
            let _ = knn.add(x);
        }
        let d = distance_matrix(&xs, abs_diff);
        let batch = neighborhoods(&d, k);
        for (i, expected) in batch.iter().enumerate() {
            prop_assert_eq!(knn.neighbors(i).unwrap(), expected);
        }
        if xs.len() > k {
            prop_assert_eq!(knn.lof().unwrap(), lof(&d, k).unwrap());
        }
    }

    #[test]
    fn prop_lof_never_nan(
        xs in prop::collection::vec(prop::sample::select(vec![0.0f64, 1.0, 2.0, 5.0]), 4..20),
        k in 2usize..4,
    ) {
        let d = distance_matrix(&xs, abs_diff);
        let scores = lof(&d, k).unwrap();
        prop_assert!(scores.iter().all(|s| !s.is_nan()));
    }

    #[test]
    fn prop_astar_finds_cheapest_path(
        n in 2usize..12,
        edges in prop::collection::vec((0usize..12, 0usize..12, 0.1f64..10.0), 0..40),
    ) {
        let mut g: UnGraph<(), f64> = UnGraph::new_undirected();
        let nodes: Vec<NodeIndex> = (0..n).map(|_| g.add_node(())).collect();
        for &(a, b, w) in &edges {
            if a < n && b < n && a != b {
                let _ = g.add_edge(nodes[a], nodes[b], w);
            }
        }
        let (start, goal) = (nodes[0], nodes[n - 1]);
        let costs = petgraph::algo::dijkstra(&g, start, Some(goal), |e| *e.weight());

        match find_path_in_graph(&g, start, goal, |w| *w, |_, _| 0.0) {
            Ok(path) => {
                prop_assert_eq!(path.first(), Some(&start));
                prop_assert_eq!(path.last(), Some(&goal));
                let total: f64 = path
                    .windows(2)
                    .map(|p| {
                        g.edges_connecting(p[0], p[1])
                            .map(|e| *e.weight())
                            .fold(f64::INFINITY, f64::min)
                    })
                    .sum();
                let expected = costs.get(&goal).copied().unwrap_or(f64::INFINITY);
                prop_assert!((total - expected).abs() < 1e-9, "{} vs {}", total, expected);
            }
            Err(_) => prop_assert!(!costs.contains_key(&goal)),
        }
    }

    #[test]
    fn prop_astar_variants_agree(
        walls in prop::collection::vec(any::<bool>(), 49),
    ) {
        let open = |(r, c): (i32, i32)| {
            (0..7).contains(&r) && (0..7).contains(&c)
                && ((r, c) == (0, 0) || (r, c) == (6, 6) || !walls[(r * 7 + c) as usize])
        };
        let neighbors = |&(r, c): &(i32, i32)| {
            [(r - 1, c), (r + 1, c), (r, c - 1), (r, c + 1)]
                .into_iter()
                .filter(|&p| open(p))
                .collect::<Vec<_>>()
        };
        let unit = |_: &(i32, i32), _: &(i32, i32)| 1.0;
        let manhattan =
            |a: &(i32, i32), b: &(i32, i32)| f64::from((a.0 - b.0).abs() + (a.1 - b.1).abs());

        let ordered = find_path((0, 0), (6, 6), unit, manhattan, neighbors);
        let scanned = find_path_by_scan((0, 0), (6, 6), unit, manhattan, neighbors);
        prop_assert_eq!(ordered, scanned);
    }

    #[test]
    fn prop_genetic_population_size_constant(
        n in 2usize..12,
        seed in any::<u64>(),
        keep_best_parent in any::<bool>(),
    ) {
        let strategy = if keep_best_parent {
            GenerationStrategy::KeepBestParent
        } else {
            GenerationStrategy::KeepBestParentsAndChildren
        };
        let mut rng = StdRng::seed_from_u64(seed);
        let initial: Vec<f64> = (0..n).map(|_| rng.random_range(-5.0..5.0)).collect();
        let mut best = Vec::new();
        let population = Genetic::new(strategy)
            .run(
                initial,
                |a: &f64, b: &f64, rng: &mut StdRng| {
                    ((a + b) / 2.0, b + rng.random_range(-1.0..1.0))
                },
                |x: &f64| x * x,
                |p| {
                    best.push(p.best().map(|(f, _)| f).unwrap_or(f64::INFINITY));
                    p.generation() >= 10
                },
                &mut rng,
            )
            .unwrap();
        prop_assert_eq!(population.len(), n);
        for pair in best.windows(2) {
            prop_assert!(pair[1] <= pair[0]);
        }
    }
}
