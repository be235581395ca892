//! passtune core data models.
//!
//! This crate defines the shared types of the pass-tuning system: the
//! optimization-pass set that a candidate enables, the metrics produced by
//! one profiling run, and the individual/population model of the
//! evolutionary search.

#![warn(missing_docs)]

// Pass and configuration model
mod pass;

// Profiling results
mod metrics;

// Genetic-algorithm data model
mod individual;

pub use pass::{Pass, PassParseError, PassSet};
pub use metrics::Metrics;
pub use individual::{Individual, Population};
