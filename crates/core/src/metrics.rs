//! Profiling results.

use serde::{Deserialize, Serialize};

/// Performance measurements for one (source file, pass set) profiling run.
///
/// Produced only when the whole compile/build/measure pipeline succeeds; a
/// failed measurement is an error, never a zero-filled `Metrics`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Metrics {
    /// Base name of the profiled source file.
    pub source_file: String,

    /// Combined compile + native-build wall time, in milliseconds.
    pub build_time_ms: f64,

    /// Size of the produced executable, in bytes.
    pub binary_size_bytes: u64,

    /// User + system CPU time of the measured run, in milliseconds.
    pub run_time_ms: f64,

    /// Peak resident set size of the measured run, in bytes.
    pub memory_usage_bytes: u64,
}
