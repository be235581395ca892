//! Subprocess execution seam.

use async_trait::async_trait;
use std::process::Output;
use std::time::Duration;
use tokio::process::Command;

/// Runs external commands on behalf of the profiler.
///
/// Abstracted so tests can script subprocess behavior without spawning
/// anything.
#[async_trait]
pub trait CommandExecutor: Send + Sync {
    /// Run the command to completion, returning its exit status and captured
    /// stdout/stderr. Implementations must give up after `timeout`.
    async fn output(&self, cmd: Command, timeout: Duration) -> std::io::Result<Output>;
}

/// Executor that spawns real processes.
pub struct SystemExecutor;

#[async_trait]
impl CommandExecutor for SystemExecutor {
    async fn output(&self, mut cmd: Command, timeout: Duration) -> std::io::Result<Output> {
        tracing::debug!(command = ?cmd.as_std(), "spawning subprocess");
        match tokio::time::timeout(timeout, cmd.output()).await {
            Ok(result) => result,
            Err(_) => Err(std::io::Error::new(
                std::io::ErrorKind::TimedOut,
                format!("command timed out after {:?}", timeout),
            )),
        }
    }
}

/// Captured stdout followed by stderr, lossily decoded.
pub(crate) fn combined_output(output: &Output) -> String {
    let mut text = String::from_utf8_lossy(&output.stdout).into_owned();
    text.push_str(&String::from_utf8_lossy(&output.stderr));
    text
}
