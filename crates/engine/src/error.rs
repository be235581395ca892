//! Fatal evolution-run errors.
//!
//! Only startup preconditions are fatal: per-individual profiling failures
//! become zero fitness and checkpoint problems become warnings.

/// Errors that abort an evolution run.
#[derive(Debug, thiserror::Error)]
pub enum EvolveError {
    /// Corpus directory is empty or unreadable.
    #[error("corpus error: {0}")]
    Corpus(String),

    /// A run of zero generations has no best individual to return.
    #[error("no generations requested")]
    NoGenerations,
}
