//! Measurement-utility output dialects.
//!
//! The system `time` utility prints resource figures in one of two formats:
//! the BSD compact trailing-suffix form (`0.50 user ... 2048 maximum resident
//! set size`, memory in bytes) and the GNU verbose labeled form
//! (`User time (seconds): 0.50 ... Maximum resident set size (kbytes): 2`,
//! memory in kilobytes). Each dialect is a small independent matcher; the
//! profiler tries them in the fixed order of [`known_dialects`].

use regex::Regex;

/// Raw resource figures extracted from one measurement report.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ResourceSample {
    /// User CPU time, in seconds.
    pub user_secs: f64,
    /// System CPU time, in seconds.
    pub sys_secs: f64,
    /// Peak resident set size, normalized to bytes.
    pub max_rss_bytes: u64,
}

/// One supported output format of the measurement utility.
pub trait ReportDialect: Send + Sync {
    /// Dialect name, for diagnostics.
    fn name(&self) -> &'static str;

    /// Extract the resource figures from `report`, or `None` if the report
    /// is not in this dialect.
    fn parse(&self, report: &str) -> Option<ResourceSample>;
}

fn capture_f64(report: &str, pattern: &str) -> Option<f64> {
    let re = Regex::new(pattern).ok()?;
    re.captures(report)?.get(1)?.as_str().parse().ok()
}

/// BSD `time -l`: compact fields with trailing labels, memory in bytes.
pub struct BsdDialect;

impl ReportDialect for BsdDialect {
    fn name(&self) -> &'static str {
        "bsd"
    }

    fn parse(&self, report: &str) -> Option<ResourceSample> {
        let mem = capture_f64(report, r"(\d+)\s+maximum resident set size")?;
        let user = capture_f64(report, r"(\d+\.\d+)\s+user")?;
        let sys = capture_f64(report, r"(\d+\.\d+)\s+sys")?;
        Some(ResourceSample {
            user_secs: user,
            sys_secs: sys,
            max_rss_bytes: mem as u64,
        })
    }
}

/// GNU `time -v`: verbose labeled fields, memory in kilobytes.
pub struct GnuDialect;

impl ReportDialect for GnuDialect {
    fn name(&self) -> &'static str {
        "gnu"
    }

    fn parse(&self, report: &str) -> Option<ResourceSample> {
        let mem = capture_f64(report, r"Maximum resident set size \(kbytes\):\s+(\d+)")?;
        let user = capture_f64(report, r"User time \(seconds\):\s+(\d+\.\d+)")?;
        let sys = capture_f64(report, r"System time \(seconds\):\s+(\d+\.\d+)")?;
        Some(ResourceSample {
            user_secs: user,
            sys_secs: sys,
            max_rss_bytes: (mem as u64) * 1024,
        })
    }
}

/// All supported dialects, in the priority order parsing tries them.
pub fn known_dialects() -> [&'static dyn ReportDialect; 2] {
    [&BsdDialect, &GnuDialect]
}

/// Try every known dialect against `report` in priority order.
pub(crate) fn parse_report(report: &str) -> Option<ResourceSample> {
    for dialect in known_dialects() {
        if let Some(sample) = dialect.parse(report) {
            tracing::debug!(dialect = dialect.name(), "parsed measurement report");
            return Some(sample);
        }
    }
    None
}
