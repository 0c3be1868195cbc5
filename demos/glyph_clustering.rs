use crnai::cluster::{Affinity, AffinityPropagation, Preference, Scale, SpectralClustering};
use crnai::matrix::{distance_matrix, euclidean};
use crnai::outlier::{loop_scores, IterativeKnn};
use rand::prelude::*;
use rand_distr::Normal;
use tracing_subscriber::EnvFilter;

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

    // Stand-in shape descriptors for three glyph classes, plus one smudge.
    let mut rng = StdRng::seed_from_u64(2024);
    let noise = Normal::new(0.0, 0.15)?;
    let prototypes = [
        ("a", [1.0, 0.2, 0.6, 0.1]),
        ("e", [0.9, 0.8, 0.1, 0.4]),
        ("o", [0.2, 0.9, 0.9, 0.9]),
    ];
    let mut glyphs: Vec<(String, Vec<f64>)> = Vec::new();
    for i in 0..12 {
        for (name, shape) in &prototypes {
            let features = shape.iter().map(|v| v + noise.sample(&mut rng)).collect();
            glyphs.push((format!("{name}{i}"), features));
        }
    }
    glyphs.push(("smudge".to_string(), vec![4.0, -2.0, 3.0, 5.0]));

    let features: Vec<Vec<f64>> = glyphs.iter().map(|(_, f)| f.clone()).collect();
    let d = distance_matrix(&features, |a: &Vec<f64>, b: &Vec<f64>| euclidean(a, b));

    // 1. Outliers first, so they do not become prototypes of their own.
    let scores = loop_scores(&d, 8, 3.0)?;
    let keep: Vec<usize> = (0..glyphs.len()).filter(|&i| scores[i] < 0.8).collect();
    for (i, s) in scores.iter().enumerate() {
        if *s >= 0.8 {
            println!("outlier {:<8} LoOP = {:.3}", glyphs[i].0, s);
        }
    }

    let clean = distance_matrix(&keep, |&a: &usize, &b: &usize| d[(a, b)]);

    // 2. Exemplars.
    let fit = AffinityPropagation::new(Preference::Medium)
        .with_damping(0.7)
        .with_max_iter(200)
        .fit(&clean)?;
    println!(
        "affinity propagation: {} prototypes after {} iterations (converged: {})",
        fit.prototypes.len(),
        fit.iterations,
        fit.converged
    );
    for &p in &fit.prototypes {
        let members: Vec<&str> = keep
            .iter()
            .zip(&fit.labels)
            .filter(|(_, &l)| l == p)
            .map(|(&g, _)| glyphs[g].0.as_str())
            .collect();
        println!("  {:<6} <- {}", glyphs[keep[p]].0, members.join(" "));
    }

    // 3. Spectral view of the same data.
    let sc = SpectralClustering::from_distances(&clean, &Affinity::new(Scale::Local { neighborhood: 5 }))?;
    let top: Vec<String> = sc.eigenvalues().iter().take(5).map(|v| format!("{v:.3}")).collect();
    println!("leading eigenvalues: {}", top.join(", "));
    println!("estimated groups at 0.8: {}", sc.estimate_cluster_count(0.8)?);
    let embedding = sc.project(3, true)?;
    println!("embedding shape: {:?}", embedding.dim());

    // 4. Glyphs arriving one by one.
    let mut knn = IterativeKnn::new(5, |a: &Vec<f64>, b: &Vec<f64>| euclidean(a, b))?;
    for f in &features {
        let _ = knn.fast_add(f.clone());
    }
    let lof = knn.lof()?;
    let (worst, score) = lof
        .iter()
        .enumerate()
        .max_by(|a, b| a.1.total_cmp(b.1))
        .ok_or("no glyphs")?;
    println!("incremental LOF: most isolated is {} ({:.2})", glyphs[worst].0, score);

    Ok(())
}
