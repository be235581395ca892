//! Profiling error taxonomy.

use std::path::PathBuf;

/// Errors produced by one profiling run.
///
/// Captured subprocess diagnostics are preserved verbatim so the operator
/// sees exactly what the external tool printed.
#[derive(Debug, thiserror::Error)]
pub enum ProfileError {
    /// Source file missing or unreadable.
    #[error("failed to read source file {path}: {source}")]
    Read {
        /// Path that could not be read.
        path: PathBuf,
        /// Underlying I/O error.
        #[source]
        source: std::io::Error,
    },

    /// The compiler under test rejected the source.
    #[error("compiler under test failed on {path}:\n{diagnostics}")]
    Compile {
        /// Source file that failed to compile.
        path: PathBuf,
        /// Captured compiler diagnostics.
        diagnostics: String,
    },

    /// The native toolchain failed to build the intermediate artifact.
    #[error("native toolchain failed:\n{output}")]
    Toolchain {
        /// Captured toolchain output.
        output: String,
    },

    /// An expected artifact is missing or another I/O operation failed.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// No measurement utility exists at any of the probed paths.
    #[error("no measurement utility found (probed /usr/bin/time and /bin/time)")]
    Environment,

    /// The measurement utility's report matched no known dialect.
    #[error("unrecognized measurement report:\n{output}")]
    Parse {
        /// The verbatim report that failed to parse.
        output: String,
    },
}
