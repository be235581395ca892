//! Genetic-algorithm data model.

use serde::{Deserialize, Serialize};
use std::cmp::Ordering;

use crate::pass::PassSet;

/// One candidate configuration in the evolutionary search.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Individual {
    /// Enabled-pass chromosome.
    pub chromosome: PassSet,

    /// Score from the most recent evaluation; `None` until evaluated.
    ///
    /// Fitness is never trusted across a chromosome change: offspring start
    /// unset and must be re-evaluated before the next ranking.
    #[serde(default)]
    pub fitness: Option<f64>,
}

impl Individual {
    /// Create an unevaluated individual.
    pub fn new(chromosome: PassSet) -> Self {
        Self {
            chromosome,
            fitness: None,
        }
    }

    /// Fitness for ranking purposes; unevaluated individuals rank below any
    /// evaluated one.
    pub fn rank_fitness(&self) -> f64 {
        self.fitness.unwrap_or(f64::NEG_INFINITY)
    }

    /// Names of the passes this individual enables.
    pub fn pass_names(&self) -> Vec<&'static str> {
        self.chromosome.pass_names()
    }
}

/// An ordered collection of individuals.
///
/// "Sorted" always means descending by fitness; that order defines selection
/// rank and the elitism cutoff.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Population(
    /// The individuals, in ranking order once sorted.
    pub Vec<Individual>,
);

impl Population {
    /// Sort descending by fitness. The sort is stable, so equally fit
    /// individuals keep their relative order.
    pub fn sort_by_fitness(&mut self) {
        self.0.sort_by(|a, b| {
            b.rank_fitness()
                .partial_cmp(&a.rank_fitness())
                .unwrap_or(Ordering::Equal)
        });
    }

    /// The fittest individual, assuming the population is sorted.
    pub fn best(&self) -> Option<&Individual> {
        self.0.first()
    }
}

impl std::ops::Deref for Population {
    type Target = Vec<Individual>;

    fn deref(&self) -> &Self::Target {
        &self.0
    }
}

impl std::ops::DerefMut for Population {
    fn deref_mut(&mut self) -> &mut Self::Target {
        &mut self.0
    }
}

impl FromIterator<Individual> for Population {
    fn from_iter<I: IntoIterator<Item = Individual>>(iter: I) -> Self {
        Population(iter.into_iter().collect())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::pass::{Pass, PassSet};

    fn evaluated(chromosome: PassSet, fitness: f64) -> Individual {
        Individual {
            chromosome,
            fitness: Some(fitness),
        }
    }

    #[test]
    fn test_sort_is_descending() {
        let mut pop = Population(vec![
            evaluated(PassSet::empty(), 0.1),
            evaluated(PassSet::all(), 0.9),
            evaluated(PassSet::empty().with(Pass::ConstantFolding), 0.5),
        ]);
        pop.sort_by_fitness();
        assert_eq!(pop[0].fitness, Some(0.9));
        assert_eq!(pop[1].fitness, Some(0.5));
        assert_eq!(pop[2].fitness, Some(0.1));
    }

    #[test]
    fn test_unevaluated_ranks_last() {
        let mut pop = Population(vec![
            Individual::new(PassSet::all()),
            evaluated(PassSet::empty(), 0.0),
        ]);
        pop.sort_by_fitness();
        assert_eq!(pop[0].fitness, Some(0.0));
        assert_eq!(pop[1].fitness, None);
    }

    #[test]
    fn test_checkpoint_shape_round_trips() {
        let pop = Population(vec![
            evaluated(PassSet::all(), 0.25),
            Individual::new(PassSet::empty()),
        ]);
        let json = serde_json::to_string(&pop).unwrap();
        let back: Population = serde_json::from_str(&json).unwrap();
        assert_eq!(back, pop);
    }
}
