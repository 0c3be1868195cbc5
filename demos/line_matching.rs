use crnai::assignment;
use crnai::genetic::{GenerationStrategy, Genetic};
use crnai::matrix::SquareMatrix;
use crnai::search::find_path_in_graph;
use petgraph::graph::UnGraph;
use rand::prelude::*;
use tracing_subscriber::EnvFilter;

/// A text line on a scanned page: vertical position and width, in mm.
#[derive(Debug, Clone, Copy)]
struct Line {
    y: f64,
    width: f64,
}

fn line_distance(a: &Line, b: &Line) -> f64 {
    (a.y - b.y).abs() + 0.5 * (a.width - b.width).abs()
}

fn main() -> Result<(), Box<dyn std::error::Error>> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .with_target(false)
        .without_time()
        .with_writer(std::io::stderr)
        .try_init()
        .ok();

    // The same page scanned twice; the second scan is shifted and the line
    // order reported by the segmenter is scrambled.
    let first = [
        Line { y: 20.0, width: 150.0 },
        Line { y: 32.0, width: 148.0 },
        Line { y: 44.0, width: 90.0 },
        Line { y: 70.0, width: 151.0 },
        Line { y: 82.0, width: 120.0 },
    ];
    let shift = 3.5;
    let order = [3, 0, 4, 1, 2];
    let second: Vec<Line> = order
        .iter()
        .map(|&i| Line {
            y: first[i].y + shift,
            width: first[i].width - 1.0,
        })
        .collect();

    // 1. Pair lines across scans.
    let cost = SquareMatrix::from_fn(first.len(), |i, j| line_distance(&first[i], &second[j]));
    let matching = assignment::solve(&cost)?;
    println!("matching cost {:.1}", matching.cost);
    for &(i, j) in &matching.pairs {
        println!("  line {i} -> scan line {j} (y {:.1} -> {:.1})", first[i].y, second[j].y);
    }

    // 2. Recover the scan offset with the genetic driver.
    let mut rng = StdRng::seed_from_u64(7);
    let candidates: Vec<f64> = (0..10).map(|_| rng.random_range(-10.0..10.0)).collect();
    let pairs = matching.pairs.clone();
    let misfit = |offset: &f64| -> f64 {
        pairs
            .iter()
            .map(|&(i, j)| (first[i].y + offset - second[j].y).powi(2))
            .sum()
    };
    let population = Genetic::new(GenerationStrategy::KeepBestParentsAndChildren).run(
        candidates,
        |a: &f64, b: &f64, rng: &mut StdRng| {
            let mid = (a + b) / 2.0;
            (mid, mid + rng.random_range(-0.5..0.5))
        },
        misfit,
        |p| p.generation() >= 60 || p.best().is_some_and(|(f, _)| f < 1e-6),
        &mut rng,
    )?;
    if let Some((fitness, offset)) = population.best() {
        println!(
            "estimated shift {:.3} mm (true {shift}), misfit {:.2e}, {} generations",
            offset,
            fitness,
            population.generation()
        );
    }

    // 3. Reading order as a graph: cheapest route from the first to the last line.
    let mut graph: UnGraph<usize, f64> = UnGraph::new_undirected();
    let nodes: Vec<_> = (0..first.len()).map(|i| graph.add_node(i)).collect();
    for i in 0..first.len() {
        for j in i + 1..first.len() {
            let gap = first[j].y - first[i].y;
            if gap <= 30.0 {
                let _ = graph.add_edge(nodes[i], nodes[j], gap * gap);
            }
        }
    }
    let route = find_path_in_graph(
        &graph,
        nodes[0],
        nodes[first.len() - 1],
        |w| *w,
        |a, b| (first[graph[a]].y - first[graph[b]].y).abs(),
    )?;
    let labels: Vec<String> = route.iter().map(|&n| graph[n].to_string()).collect();
    println!("reading order: {}", labels.join(" -> "));

    Ok(())
}
