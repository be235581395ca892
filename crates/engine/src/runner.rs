//! Generation-loop orchestration.

use rand::Rng;
use std::path::{Path, PathBuf};
use tokio::fs;

use passtune_core::{Individual, Metrics, PassSet, Population};
use passtune_profiler::ProfileSource;

use crate::checkpoint::CheckpointStore;
use crate::error::EvolveError;
use crate::ga::GeneticAlgorithm;

/// Weights of the inverse-cost fitness function. Runtime dominates.
#[derive(Debug, Clone, Copy)]
pub struct FitnessWeights {
    /// Weight on run time (milliseconds).
    pub run_time: f64,
    /// Weight on peak memory (bytes).
    pub memory: f64,
    /// Weight on binary size (bytes).
    pub binary_size: f64,
}

impl Default for FitnessWeights {
    fn default() -> Self {
        Self {
            run_time: 10.0,
            memory: 1.0,
            binary_size: 0.5,
        }
    }
}

/// Per-file fitness contribution: the inverse of the weighted cost, offset
/// by one so a zero-cost run cannot divide by zero. Strictly decreasing in
/// every metric.
pub(crate) fn score(metrics: &Metrics, weights: FitnessWeights) -> f64 {
    1.0 / (weights.run_time * metrics.run_time_ms
        + weights.memory * metrics.memory_usage_bytes as f64
        + weights.binary_size * metrics.binary_size_bytes as f64
        + 1.0)
}

/// Runner knobs that are not genetic-algorithm parameters.
#[derive(Debug, Clone)]
pub struct RunnerConfig {
    /// Extension of corpus source files.
    pub source_extension: String,

    /// Persist a checkpoint every this many generations.
    pub checkpoint_interval: u32,

    /// Fitness weights.
    pub weights: FitnessWeights,
}

impl Default for RunnerConfig {
    fn default() -> Self {
        Self {
            source_extension: "gl".to_string(),
            checkpoint_interval: 5,
            weights: FitnessWeights::default(),
        }
    }
}

/// Orchestrates the evolution loop: evaluate, rank, report, evolve,
/// checkpoint.
pub struct Runner<P: ProfileSource> {
    profiler: P,
    ga: GeneticAlgorithm,
    checkpoints: CheckpointStore,
    config: RunnerConfig,
}

impl<P: ProfileSource> Runner<P> {
    /// Create a runner with the default [`RunnerConfig`].
    pub fn new(profiler: P, ga: GeneticAlgorithm, checkpoints: CheckpointStore) -> Self {
        Self {
            profiler,
            ga,
            checkpoints,
            config: RunnerConfig::default(),
        }
    }

    /// Override the runner configuration.
    pub fn with_config(mut self, config: RunnerConfig) -> Self {
        self.config = config;
        self
    }

    /// Run `generations` generations over the corpus under `corpus_dir` and
    /// return the best individual observed across the whole run.
    ///
    /// Resumes from a usable checkpoint when one exists; the requested
    /// generation count is always run in full regardless of how far the
    /// checkpointed search had progressed.
    pub async fn run(
        &self,
        corpus_dir: &Path,
        generations: u32,
        rng: &mut impl Rng,
    ) -> Result<Individual, EvolveError> {
        let corpus = collect_corpus(corpus_dir, &self.config.source_extension)
            .await
            .map_err(|e| EvolveError::Corpus(format!("{}: {}", corpus_dir.display(), e)))?;
        if corpus.is_empty() {
            return Err(EvolveError::Corpus(format!(
                "no .{} files under {}",
                self.config.source_extension,
                corpus_dir.display()
            )));
        }
        tracing::info!(files = corpus.len(), "corpus collected");

        let mut pop = match self.checkpoints.load().await {
            Some(state) => {
                tracing::info!(
                    generation = state.generation,
                    "resuming population from checkpoint"
                );
                state.population
            }
            None => {
                tracing::info!("no usable checkpoint, creating initial population");
                self.ga.create_initial_population(rng)
            }
        };

        let mut best_overall: Option<Individual> = None;

        for generation in 1..=generations {
            for individual in pop.iter_mut() {
                individual.fitness = Some(self.evaluate(individual.chromosome, &corpus).await);
            }

            pop.sort_by_fitness();
            if let Some(current_best) = pop.best() {
                let improved = best_overall
                    .as_ref()
                    .map_or(true, |best| current_best.rank_fitness() > best.rank_fitness());
                if improved {
                    best_overall = Some(current_best.clone());
                }
                tracing::info!(
                    generation,
                    of = generations,
                    best_fitness = current_best.rank_fitness(),
                    best_passes = %current_best.chromosome,
                    "generation evaluated"
                );
            }

            pop = self.ga.evolve(&pop, rng);

            if generation % self.config.checkpoint_interval == 0 {
                if let Err(e) = self.checkpoints.save(generation, &pop).await {
                    tracing::warn!(error = %e, "could not save checkpoint");
                }
            }
        }

        best_overall.ok_or(EvolveError::NoGenerations)
    }

    /// Aggregate fitness of one configuration: the mean per-file score, or
    /// exactly zero if profiling fails for any corpus file.
    async fn evaluate(&self, chromosome: PassSet, corpus: &[PathBuf]) -> f64 {
        let mut total = 0.0;
        for file in corpus {
            match self.profiler.run(file, chromosome).await {
                Ok(metrics) => total += score(&metrics, self.config.weights),
                Err(e) => {
                    tracing::warn!(
                        file = %file.display(),
                        passes = %chromosome,
                        error = %e,
                        "profiling failed, fitness forced to zero for this generation"
                    );
                    return 0.0;
                }
            }
        }
        total / corpus.len() as f64
    }
}

/// Recursively collect corpus files with the given extension. Order is
/// normalized by sorting; traversal order carries no meaning.
async fn collect_corpus(root: &Path, extension: &str) -> std::io::Result<Vec<PathBuf>> {
    let mut files = Vec::new();
    let mut stack = vec![root.to_path_buf()];

    while let Some(dir) = stack.pop() {
        let mut entries = fs::read_dir(&dir).await?;
        while let Some(entry) = entries.next_entry().await? {
            let path = entry.path();
            if entry.file_type().await?.is_dir() {
                stack.push(path);
            } else if path.extension().and_then(|e| e.to_str()) == Some(extension) {
                files.push(path);
            }
        }
    }

    files.sort();
    Ok(files)
}
