//! Checkpoint persistence.
//!
//! One JSON document at a fixed path, overwritten wholesale every few
//! generations and read at most once at startup. A malformed checkpoint is
//! treated as absent so the run can always make forward progress, but the
//! fallback is logged so the operator is not silently misled.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use tokio::fs;

use passtune_core::Population;

/// Default checkpoint location, relative to the working directory.
pub const DEFAULT_CHECKPOINT_PATH: &str = "evolution_checkpoint.json";

/// Snapshot of the evolution loop between generations.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EvolutionState {
    /// Generation the snapshot was taken at.
    pub generation: u32,

    /// When the snapshot was written.
    pub saved_at: DateTime<Utc>,

    /// The population as evolved for `generation + 1`.
    pub population: Population,
}

/// Errors persisting a checkpoint.
#[derive(Debug, thiserror::Error)]
pub enum CheckpointError {
    /// I/O error
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// Serialization error
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

/// Reads and writes the checkpoint document.
pub struct CheckpointStore {
    path: PathBuf,
}

impl CheckpointStore {
    /// A store backed by the given path.
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    /// The backing path.
    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Overwrite the checkpoint with the current state.
    pub async fn save(
        &self,
        generation: u32,
        population: &Population,
    ) -> Result<(), CheckpointError> {
        let state = EvolutionState {
            generation,
            saved_at: Utc::now(),
            population: population.clone(),
        };
        let data = serde_json::to_string_pretty(&state)?;
        fs::write(&self.path, data).await?;
        tracing::debug!(path = %self.path.display(), generation, "checkpoint saved");
        Ok(())
    }

    /// Load the persisted state, if any. Missing and malformed checkpoints
    /// both load as `None`; malformed ones are logged.
    pub async fn load(&self) -> Option<EvolutionState> {
        let data = match fs::read_to_string(&self.path).await {
            Ok(data) => data,
            Err(_) => return None,
        };
        match serde_json::from_str(&data) {
            Ok(state) => Some(state),
            Err(e) => {
                tracing::warn!(
                    path = %self.path.display(),
                    error = %e,
                    "ignoring malformed checkpoint, starting fresh"
                );
                None
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use passtune_core::{Individual, PassSet};

    fn sample_population() -> Population {
        Population(vec![
            Individual {
                chromosome: PassSet::all(),
                fitness: Some(0.75),
            },
            Individual::new(PassSet::empty()),
        ])
    }

    #[tokio::test]
    async fn test_round_trip_preserves_chromosomes_and_fitness() {
        let dir = tempfile::tempdir().unwrap();
        let store = CheckpointStore::new(dir.path().join("checkpoint.json"));
        let pop = sample_population();

        store.save(7, &pop).await.unwrap();
        let state = store.load().await.unwrap();

        assert_eq!(state.generation, 7);
        assert_eq!(state.population, pop);
    }

    #[tokio::test]
    async fn test_missing_checkpoint_loads_as_none() {
        let dir = tempfile::tempdir().unwrap();
        let store = CheckpointStore::new(dir.path().join("absent.json"));
        assert!(store.load().await.is_none());
    }

    #[tokio::test]
    async fn test_malformed_checkpoint_loads_as_none() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("checkpoint.json");
        fs::write(&path, "{ definitely not json").await.unwrap();

        let store = CheckpointStore::new(&path);
        assert!(store.load().await.is_none());
    }

    #[tokio::test]
    async fn test_save_overwrites_wholesale() {
        let dir = tempfile::tempdir().unwrap();
        let store = CheckpointStore::new(dir.path().join("checkpoint.json"));

        store.save(5, &sample_population()).await.unwrap();
        store.save(10, &Population(vec![])).await.unwrap();

        let state = store.load().await.unwrap();
        assert_eq!(state.generation, 10);
        assert!(state.population.is_empty());
    }
}
