//! Generational genetic optimisation driver.
//!
//! The driver owns no knowledge of the genotype: callers provide how two
//! parents breed two children, how a genotype is scored (lower fitness is
//! better), and when to stop. Randomness comes from the caller's generator,
//! so a seeded `StdRng` replays a run exactly.
//!
//! Each generation:
//!
//! 1. Shuffle the population into random pairs. With an odd size the
//!    shuffled order is walked in chained triples instead: the two fittest of
//!    each triple breed and the least fit is carried into the next triple.
//!    The member carried out of the last triple does not breed.
//! 2. Breed every pair and score both children.
//! 3. Select the next generation according to [`GenerationStrategy`].
//!
//! The population size never changes, and the best fitness never gets worse
//! from one generation to the next.
//!
//! ```rust
//! use crnai::genetic::{GenerationStrategy, Genetic};
//! use rand::prelude::*;
//!
//! let mut rng = StdRng::seed_from_u64(1);
//! let initial: Vec<f64> = (0..8).map(|i| i as f64 * 4.0 - 16.0).collect();
//!
//! let population = Genetic::new(GenerationStrategy::KeepBestParentsAndChildren)
//!     .run(
//!         initial,
//!         |a: &f64, b: &f64, rng: &mut StdRng| {
//!             let mid = (a + b) / 2.0;
//!             (mid + rng.random_range(-0.5..0.5), mid)
//!         },
//!         |x: &f64| (x - 3.0).abs(),
//!         |p| p.generation() >= 50,
//!         &mut rng,
//!     )
//!     .unwrap();
//!
//! let (fitness, _) = population.best().unwrap();
//! assert!(fitness < 0.5);
//! ```

use std::cmp::Ordering;

use rand::prelude::*;
use tracing::debug;

use crate::error::{Error, Result};

/// How the next generation is selected.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum GenerationStrategy {
    /// The single fittest parent survives, the children fill the rest.
    KeepBestParent,
    /// The fittest members of parents and children together survive.
    #[default]
    KeepBestParentsAndChildren,
}

/// Scored genotypes, fittest (lowest fitness) first.
#[derive(Debug, Clone)]
pub struct Population<G> {
    members: Vec<(f64, G)>,
    generation: usize,
}

impl<G> Population<G> {
    fn new(mut members: Vec<(f64, G)>, generation: usize) -> Self {
        sort_by_fitness(&mut members);
        Self {
            members,
            generation,
        }
    }

    /// Number of individuals.
    pub fn len(&self) -> usize {
        self.members.len()
    }

    /// `true` if there are no individuals.
    pub fn is_empty(&self) -> bool {
        self.members.is_empty()
    }

    /// Generations bred so far (0 for the initial population).
    pub fn generation(&self) -> usize {
        self.generation
    }

    /// Fittest individual and its fitness.
    pub fn best(&self) -> Option<(f64, &G)> {
        self.members.first().map(|(f, g)| (*f, g))
    }

    /// `(fitness, genotype)` pairs, fittest first.
    pub fn iter(&self) -> impl Iterator<Item = (f64, &G)> + '_ {
        self.members.iter().map(|(f, g)| (*f, g))
    }

    /// Fitness values, fittest first.
    pub fn fitness(&self) -> Vec<f64> {
        self.members.iter().map(|(f, _)| *f).collect()
    }

    /// Consume into `(fitness, genotype)` pairs, fittest first.
    pub fn into_members(self) -> Vec<(f64, G)> {
        self.members
    }
}

fn by_fitness<G>(a: &(f64, G), b: &(f64, G)) -> Ordering {
    a.0.total_cmp(&b.0)
}

fn sort_by_fitness<G>(members: &mut [(f64, G)]) {
    members.sort_by(by_fitness);
}

/// Genetic algorithm driver.
#[derive(Debug, Clone, Default)]
pub struct Genetic {
    strategy: GenerationStrategy,
}

impl Genetic {
    /// Driver with the given selection strategy.
    pub fn new(strategy: GenerationStrategy) -> Self {
        Self { strategy }
    }

    /// Set the selection strategy.
    pub fn with_strategy(mut self, strategy: GenerationStrategy) -> Self {
        self.strategy = strategy;
        self
    }

    /// Selection strategy.
    pub fn strategy(&self) -> GenerationStrategy {
        self.strategy
    }

    /// Evolve `initial` until `stop` accepts the population.
    ///
    /// `stop` sees the scored population before every generation, starting
    /// with the initial one, so it doubles as a per-generation observer.
    /// The driver itself has no generation cap.
    ///
    /// Fails with [`Error::TooFewItems`] if `initial` has fewer than two
    /// individuals.
    pub fn run<G, R, B, E, S>(
        &self,
        initial: Vec<G>,
        mut breed: B,
        mut evaluate: E,
        mut stop: S,
        rng: &mut R,
    ) -> Result<Population<G>>
    where
        G: Clone,
        R: Rng + ?Sized,
        B: FnMut(&G, &G, &mut R) -> (G, G),
        E: FnMut(&G) -> f64,
        S: FnMut(&Population<G>) -> bool,
    {
        if initial.len() < 2 {
            return Err(Error::TooFewItems {
                required: 2,
                found: initial.len(),
            });
        }

        let scored = initial.into_iter().map(|g| (evaluate(&g), g)).collect();
        let mut population = Population::new(scored, 0);

        while !stop(&population) {
            population = self.next_generation(population, &mut breed, &mut evaluate, rng);
            debug!(
                generation = population.generation,
                best = population.members[0].0,
                "generation bred"
            );
        }

        debug!(
            generations = population.generation,
            size = population.len(),
            "genetic run finished"
        );
        Ok(population)
    }

    fn next_generation<G, R, B, E>(
        &self,
        population: Population<G>,
        breed: &mut B,
        evaluate: &mut E,
        rng: &mut R,
    ) -> Population<G>
    where
        G: Clone,
        R: Rng + ?Sized,
        B: FnMut(&G, &G, &mut R) -> (G, G),
        E: FnMut(&G) -> f64,
    {
        let Population {
            members: parents,
            generation,
        } = population;
        let n = parents.len();

        let mut order: Vec<usize> = (0..n).collect();
        order.shuffle(rng);

        let mut children: Vec<(f64, G)> = Vec::with_capacity(n);
        if n % 2 == 1 {
            // Chained triples: the two fittest breed, the least fit moves on.
            let mut carried = order[0];
            for next in order[1..].chunks_exact(2) {
                let mut triple = [carried, next[0], next[1]];
                // Parents are sorted, so a lower index is at least as fit.
                triple.sort_unstable();
                breed_pair(&parents, triple[0], triple[1], breed, evaluate, rng, &mut children);
                carried = triple[2];
            }
        } else {
            for pair in order.chunks_exact(2) {
                breed_pair(&parents, pair[0], pair[1], breed, evaluate, rng, &mut children);
            }
        }

        let members = match self.strategy {
            GenerationStrategy::KeepBestParent => {
                sort_by_fitness(&mut children);
                children.truncate(n - 1);
                let mut parents = parents;
                parents.truncate(1);
                children.extend(parents);
                children
            }
            GenerationStrategy::KeepBestParentsAndChildren => {
                let mut all = parents;
                all.extend(children);
                sort_by_fitness(&mut all);
                all.truncate(n);
                all
            }
        };
        Population::new(members, generation + 1)
    }
}

fn breed_pair<G, R, B, E>(
    parents: &[(f64, G)],
    a: usize,
    b: usize,
    breed: &mut B,
    evaluate: &mut E,
    rng: &mut R,
    children: &mut Vec<(f64, G)>,
) where
    R: Rng + ?Sized,
    B: FnMut(&G, &G, &mut R) -> (G, G),
    E: FnMut(&G) -> f64,
{
    let (c1, c2) = breed(&parents[a].1, &parents[b].1, rng);
    children.push((evaluate(&c1), c1));
    children.push((evaluate(&c2), c2));
}
