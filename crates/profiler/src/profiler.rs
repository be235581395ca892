//! The build -> run -> measure pipeline.

use async_trait::async_trait;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::time::{Duration, Instant};
use tokio::fs;
use tokio::process::Command;

use passtune_core::{Metrics, PassSet};

use crate::dialect::parse_report;
use crate::error::ProfileError;
use crate::executor::{combined_output, CommandExecutor};

/// Fixed artifact file names inside a profiling working directory. Two
/// concurrent runs must therefore never share a working directory.
const ARTIFACT_NAME: &str = "output.c";
const BINARY_NAME: &str = "program";

/// Well-known locations of the system measurement utility.
const TIME_TOOL_PATHS: [&str; 2] = ["/usr/bin/time", "/bin/time"];

/// Default bound on any single subprocess invocation.
const DEFAULT_TIMEOUT: Duration = Duration::from_secs(120);

/// A source of profiling measurements.
///
/// The runner consumes profiling through this trait so tests can substitute
/// fixed-metric stubs for the real pipeline.
#[async_trait]
pub trait ProfileSource: Send + Sync {
    /// Profile `source` with the given passes enabled.
    async fn run(&self, source: &Path, passes: PassSet) -> Result<Metrics, ProfileError>;
}

/// Drives the compile/build/measure pipeline for one working directory.
pub struct Profiler {
    executor: Arc<dyn CommandExecutor>,
    compiler: PathBuf,
    work_dir: PathBuf,
    timeout: Duration,
    time_tool_paths: Vec<PathBuf>,
}

impl Profiler {
    /// Create a profiler invoking `compiler` and scratching in `work_dir`.
    pub fn new(
        executor: Arc<dyn CommandExecutor>,
        compiler: impl Into<PathBuf>,
        work_dir: impl Into<PathBuf>,
    ) -> Self {
        Self {
            executor,
            compiler: compiler.into(),
            work_dir: work_dir.into(),
            timeout: DEFAULT_TIMEOUT,
            time_tool_paths: TIME_TOOL_PATHS.iter().map(PathBuf::from).collect(),
        }
    }

    /// Override the per-subprocess timeout.
    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    /// Override the probed measurement-utility locations.
    pub fn with_time_tool_paths(mut self, paths: Vec<PathBuf>) -> Self {
        self.time_tool_paths = paths;
        self
    }

    /// `--passes` argument for the compiler under test.
    fn passes_arg(passes: PassSet) -> String {
        if passes.is_empty() {
            "none".to_string()
        } else {
            passes
                .passes()
                .map(|p| p.name())
                .collect::<Vec<_>>()
                .join(",")
        }
    }

    async fn locate_time_tool(&self) -> Result<TimeTool, ProfileError> {
        let mut found = None;
        for candidate in &self.time_tool_paths {
            if fs::try_exists(candidate).await.unwrap_or(false) {
                found = Some(candidate.clone());
                break;
            }
        }
        let path = found.ok_or(ProfileError::Environment)?;

        // BSD time has no --version and exits non-zero; any failure here
        // just means "not GNU".
        let mut cmd = Command::new(&path);
        cmd.arg("--version").kill_on_drop(true);
        let flag = match self.executor.output(cmd, self.timeout).await {
            Ok(out) if combined_output(&out).contains("GNU time") => "-v",
            _ => "-l",
        };

        Ok(TimeTool { path, flag })
    }
}

struct TimeTool {
    path: PathBuf,
    flag: &'static str,
}

#[async_trait]
impl ProfileSource for Profiler {
    async fn run(&self, source: &Path, passes: PassSet) -> Result<Metrics, ProfileError> {
        fs::read(source).await.map_err(|e| ProfileError::Read {
            path: source.to_path_buf(),
            source: e,
        })?;

        let artifact = self.work_dir.join(ARTIFACT_NAME);
        let binary = self.work_dir.join(BINARY_NAME);

        let build_start = Instant::now();

        let mut compile = Command::new(&self.compiler);
        compile
            .arg("build")
            .arg("--passes")
            .arg(Self::passes_arg(passes))
            .arg("-o")
            .arg(&artifact)
            .arg(source)
            .kill_on_drop(true);
        let out = self
            .executor
            .output(compile, self.timeout)
            .await
            .map_err(|e| ProfileError::Compile {
                path: source.to_path_buf(),
                diagnostics: e.to_string(),
            })?;
        if !out.status.success() {
            return Err(ProfileError::Compile {
                path: source.to_path_buf(),
                diagnostics: combined_output(&out),
            });
        }

        let mut link = Command::new("clang");
        link.arg(&artifact).arg("-o").arg(&binary).kill_on_drop(true);
        let out = self
            .executor
            .output(link, self.timeout)
            .await
            .map_err(|e| ProfileError::Toolchain {
                output: e.to_string(),
            })?;
        if !out.status.success() {
            return Err(ProfileError::Toolchain {
                output: combined_output(&out),
            });
        }

        let build_time_ms = build_start.elapsed().as_secs_f64() * 1000.0;

        let binary_size_bytes = fs::metadata(&binary).await?.len();

        let tool = self.locate_time_tool().await?;

        // The measured binary's stdout is discarded so it cannot corrupt the
        // utility's report on stderr. The binary's own exit code is ignored:
        // `time` propagates it, and a non-zero measured program is still a
        // valid measurement.
        let shell_line = format!(
            "{} {} {} > /dev/null",
            tool.path.display(),
            tool.flag,
            binary.display()
        );
        let mut measure = Command::new("sh");
        measure.arg("-c").arg(shell_line).kill_on_drop(true);
        let out = self.executor.output(measure, self.timeout).await?;
        let report = combined_output(&out);

        let sample = parse_report(&report).ok_or(ProfileError::Parse { output: report })?;

        Ok(Metrics {
            source_file: source
                .file_name()
                .map(|n| n.to_string_lossy().into_owned())
                .unwrap_or_default(),
            build_time_ms,
            binary_size_bytes,
            run_time_ms: (sample.user_secs + sample.sys_secs) * 1000.0,
            memory_usage_bytes: sample.max_rss_bytes,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::os::unix::process::ExitStatusExt;
    use std::process::{ExitStatus, Output};

    const GNU_VERSION: &str = "GNU time 1.9\n";
    const GNU_REPORT: &str = "\
\tUser time (seconds): 0.500
\tSystem time (seconds): 0.100
\tMaximum resident set size (kbytes): 2048
";

    /// Scripted executor: fakes the compiler, clang, the time probe, and the
    /// measured run, writing the expected artifacts as a side effect.
    struct ScriptedExecutor {
        compile_diagnostics: Option<String>,
        report: String,
        measured_exit: i32,
    }

    impl ScriptedExecutor {
        fn happy(report: &str) -> Self {
            Self {
                compile_diagnostics: None,
                report: report.to_string(),
                measured_exit: 0,
            }
        }

        fn ok(stdout: &str) -> Output {
            Output {
                status: ExitStatus::from_raw(0),
                stdout: stdout.as_bytes().to_vec(),
                stderr: Vec::new(),
            }
        }

        fn failed(stderr: &str, code: i32) -> Output {
            Output {
                status: ExitStatus::from_raw(code << 8),
                stdout: Vec::new(),
                stderr: stderr.as_bytes().to_vec(),
            }
        }
    }

    #[async_trait]
    impl CommandExecutor for ScriptedExecutor {
        async fn output(&self, cmd: Command, _timeout: Duration) -> std::io::Result<Output> {
            let std_cmd = cmd.as_std();
            let program = std_cmd.get_program().to_string_lossy().into_owned();
            let args: Vec<String> = std_cmd
                .get_args()
                .map(|a| a.to_string_lossy().into_owned())
                .collect();

            if program == "clang" {
                // clang <artifact> -o <binary>
                std::fs::write(&args[2], b"fake binary, sixty-four bytes of padding...............")?;
                return Ok(Self::ok(""));
            }
            if program.ends_with("time") {
                return Ok(Self::ok(GNU_VERSION));
            }
            if program == "sh" {
                let out = if self.measured_exit == 0 {
                    Self::ok(&self.report)
                } else {
                    Self::failed(&self.report, self.measured_exit)
                };
                return Ok(out);
            }

            // Anything else is the compiler under test.
            if let Some(diag) = &self.compile_diagnostics {
                return Ok(Self::failed(diag, 1));
            }
            let emit = args
                .iter()
                .position(|a| a == "-o")
                .map(|i| args[i + 1].clone())
                .expect("compile command carries -o");
            std::fs::write(emit, b"int main(void) { return 0; }\n")?;
            Ok(Self::ok(""))
        }
    }

    fn profiler_with(executor: ScriptedExecutor, work_dir: &Path) -> Profiler {
        // A stand-in measurement utility so the probe does not depend on the
        // host having /usr/bin/time installed.
        let fake_time = work_dir.join("time");
        std::fs::write(&fake_time, b"#!/bin/sh\n").unwrap();
        Profiler::new(Arc::new(executor), "/opt/toyc/bin/toyc", work_dir)
            .with_time_tool_paths(vec![fake_time])
    }

    async fn write_source(dir: &Path) -> PathBuf {
        let source = dir.join("sample.gl");
        fs::write(&source, "func main() {}\n").await.unwrap();
        source
    }

    #[tokio::test]
    async fn test_pipeline_produces_metrics() {
        let dir = tempfile::tempdir().unwrap();
        let source = write_source(dir.path()).await;
        let profiler = profiler_with(ScriptedExecutor::happy(GNU_REPORT), dir.path());

        let metrics = profiler.run(&source, PassSet::all()).await.unwrap();
        assert_eq!(metrics.source_file, "sample.gl");
        assert_eq!(metrics.run_time_ms, 600.0);
        assert_eq!(metrics.memory_usage_bytes, 2048 * 1024);
        assert!(metrics.binary_size_bytes > 0);
        assert!(metrics.build_time_ms >= 0.0);
    }

    #[tokio::test]
    async fn test_missing_source_is_read_error() {
        let dir = tempfile::tempdir().unwrap();
        let profiler = profiler_with(ScriptedExecutor::happy(GNU_REPORT), dir.path());

        let err = profiler
            .run(&dir.path().join("missing.gl"), PassSet::empty())
            .await
            .unwrap_err();
        assert!(matches!(err, ProfileError::Read { .. }));
    }

    #[tokio::test]
    async fn test_compile_failure_preserves_diagnostics() {
        let dir = tempfile::tempdir().unwrap();
        let source = write_source(dir.path()).await;
        let executor = ScriptedExecutor {
            compile_diagnostics: Some("sample.gl:1: syntax error near 'func'".to_string()),
            report: GNU_REPORT.to_string(),
            measured_exit: 0,
        };
        let profiler = profiler_with(executor, dir.path());

        let err = profiler.run(&source, PassSet::empty()).await.unwrap_err();
        match err {
            ProfileError::Compile { diagnostics, .. } => {
                assert!(diagnostics.contains("syntax error near 'func'"));
            }
            other => panic!("expected Compile error, got {other:?}"),
        }
    }

    #[tokio::test]
    async fn test_unrecognized_report_is_parse_error() {
        let dir = tempfile::tempdir().unwrap();
        let source = write_source(dir.path()).await;
        let profiler = profiler_with(
            ScriptedExecutor::happy("segmentation fault (core dumped)"),
            dir.path(),
        );

        let err = profiler.run(&source, PassSet::all()).await.unwrap_err();
        match err {
            ProfileError::Parse { output } => {
                assert!(output.contains("segmentation fault"));
            }
            other => panic!("expected Parse error, got {other:?}"),
        }
    }

    #[tokio::test]
    async fn test_measured_program_exit_code_is_ignored() {
        let dir = tempfile::tempdir().unwrap();
        let source = write_source(dir.path()).await;
        let executor = ScriptedExecutor {
            compile_diagnostics: None,
            report: GNU_REPORT.to_string(),
            measured_exit: 3,
        };
        let profiler = profiler_with(executor, dir.path());

        let metrics = profiler.run(&source, PassSet::all()).await.unwrap();
        assert_eq!(metrics.run_time_ms, 600.0);
    }

    #[tokio::test]
    async fn test_missing_time_tool_is_environment_error() {
        let dir = tempfile::tempdir().unwrap();
        let source = write_source(dir.path()).await;
        let profiler = Profiler::new(
            Arc::new(ScriptedExecutor::happy(GNU_REPORT)),
            "/opt/toyc/bin/toyc",
            dir.path(),
        )
        .with_time_tool_paths(vec![dir.path().join("no-such-time")]);

        let err = profiler.run(&source, PassSet::all()).await.unwrap_err();
        assert!(matches!(err, ProfileError::Environment));
    }

    #[test]
    fn test_passes_arg_spelling() {
        assert_eq!(Profiler::passes_arg(PassSet::empty()), "none");
        assert_eq!(
            Profiler::passes_arg(PassSet::all()),
            "ConstantFolding,DeadCodeElimination"
        );
    }
}
