//! Evolutionary search engine.
//!
//! Evolves a population of pass configurations toward higher measured
//! fitness: the genetic algorithm itself, checkpoint persistence, and the
//! runner that orchestrates generations over a corpus of source files.

#![warn(missing_docs)]

mod checkpoint;
mod error;
mod ga;
mod runner;

pub use checkpoint::{CheckpointError, CheckpointStore, EvolutionState, DEFAULT_CHECKPOINT_PATH};
pub use error::EvolveError;
pub use ga::GeneticAlgorithm;
pub use runner::{FitnessWeights, Runner, RunnerConfig};
