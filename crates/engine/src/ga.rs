//! Genetic algorithm over pass configurations.

use passtune_core::{Individual, Pass, Population};
use rand::Rng;

/// Parameters and operators of the evolutionary search.
///
/// All randomness flows through the caller-provided [`Rng`], so a seeded
/// generator makes the whole search reproducible.
#[derive(Debug, Clone)]
pub struct GeneticAlgorithm {
    /// Number of individuals per generation.
    pub population_size: usize,

    /// Top-ranked individuals copied unchanged into the next generation.
    /// Must be smaller than `population_size`.
    pub elitism_count: usize,

    /// Probability that a non-elite offspring mutates.
    pub mutation_rate: f64,

    /// Individuals drawn (with replacement) per tournament.
    pub tournament_size: usize,

    /// Passes the search may toggle.
    pub available_passes: Vec<Pass>,
}

impl Default for GeneticAlgorithm {
    fn default() -> Self {
        Self {
            population_size: 20,
            elitism_count: 2,
            mutation_rate: 0.1,
            tournament_size: 5,
            available_passes: Pass::ALL.to_vec(),
        }
    }
}

impl GeneticAlgorithm {
    /// A genetic algorithm with the default parameters.
    pub fn new() -> Self {
        Self::default()
    }

    /// A starting population: each available pass enabled independently with
    /// probability 0.5, fitness unset.
    pub fn create_initial_population(&self, rng: &mut impl Rng) -> Population {
        (0..self.population_size)
            .map(|_| {
                let chromosome = self
                    .available_passes
                    .iter()
                    .copied()
                    .filter(|_| rng.gen_bool(0.5))
                    .collect();
                Individual::new(chromosome)
            })
            .collect()
    }

    /// Produce the next generation from `pop`, which must already be sorted
    /// descending by fitness.
    ///
    /// Elites keep chromosome and evaluated fitness; every other slot is
    /// filled by tournament selection, whole-chromosome crossover, and
    /// (with probability `mutation_rate`) a single-bit mutation. The caller
    /// must re-evaluate and re-sort before the next ranking.
    pub fn evolve(&self, pop: &Population, rng: &mut impl Rng) -> Population {
        let mut next = Vec::with_capacity(self.population_size);
        next.extend(pop.iter().take(self.elitism_count).cloned());

        while next.len() < self.population_size {
            let parent1 = self.tournament(pop, rng);
            let parent2 = self.tournament(pop, rng);
            let mut child = Self::crossover(parent1, parent2, rng);
            self.mutate(&mut child, rng);
            next.push(child);
        }

        Population(next)
    }

    fn tournament<'a>(&self, pop: &'a Population, rng: &mut impl Rng) -> &'a Individual {
        let mut best = &pop[rng.gen_range(0..pop.len())];
        for _ in 1..self.tournament_size {
            let contender = &pop[rng.gen_range(0..pop.len())];
            if contender.rank_fitness() > best.rank_fitness() {
                best = contender;
            }
        }
        best
    }

    // Whole-chromosome crossover: configurations are a handful of bits, so
    // bit-level mixing buys nothing over picking one parent outright.
    fn crossover(p1: &Individual, p2: &Individual, rng: &mut impl Rng) -> Individual {
        let chromosome = if rng.gen_bool(0.5) {
            p1.chromosome
        } else {
            p2.chromosome
        };
        Individual::new(chromosome)
    }

    fn mutate(&self, child: &mut Individual, rng: &mut impl Rng) {
        if self.available_passes.is_empty() {
            return;
        }
        if rng.gen_bool(self.mutation_rate) {
            let pass = self.available_passes[rng.gen_range(0..self.available_passes.len())];
            child.chromosome = child.chromosome.toggled(pass);
        }
    }
}
