//! Profiling pipeline for candidate pass configurations.
//!
//! Drives the external compile -> native-build -> measure cycle for one
//! source file under one [`passtune_core::PassSet`] and turns the
//! measurement utility's report into numeric [`passtune_core::Metrics`].

#![warn(missing_docs)]

mod dialect;
mod error;
mod executor;
mod profiler;

pub use dialect::{BsdDialect, GnuDialect, ReportDialect, ResourceSample};
pub use error::ProfileError;
pub use executor::{CommandExecutor, SystemExecutor};
pub use profiler::{ProfileSource, Profiler};
