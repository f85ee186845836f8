//! Environment health checks.
//!
//! `py2win doctor` reports whether this machine can build a distribution:
//! the operating system, the host interpreter and a C toolchain for the
//! launchers. It only reports; a failing check never makes the command fail.

use std::collections::HashMap;
use std::path::{Path, PathBuf};
use std::time::{Duration, Instant};

use crate::builder::toolchain::detect_toolchain;
use crate::core::host::{check_os, HostPython, SUPPORTED_MAJOR};
use crate::util::config::ToolchainSettings;
use crate::util::process::CommandRunner;

/// Result of a single health check.
#[derive(Debug, Clone)]
pub struct CheckResult {
    pub name: String,
    pub passed: bool,
    /// Human-readable status message
    pub message: String,
    pub path: Option<PathBuf>,
    pub version: Option<String>,
    pub duration: Duration,
}

impl CheckResult {
    pub fn pass(name: impl Into<String>, message: impl Into<String>) -> Self {
        CheckResult {
            name: name.into(),
            passed: true,
            message: message.into(),
            path: None,
            version: None,
            duration: Duration::ZERO,
        }
    }

    pub fn fail(name: impl Into<String>, message: impl Into<String>) -> Self {
        CheckResult {
            passed: false,
            ..CheckResult::pass(name, message)
        }
    }

    pub fn with_path(mut self, path: PathBuf) -> Self {
        self.path = Some(path);
        self
    }

    pub fn with_version(mut self, version: impl Into<String>) -> Self {
        self.version = Some(version.into());
        self
    }

    pub fn with_duration(mut self, duration: Duration) -> Self {
        self.duration = duration;
        self
    }
}

/// Summary of all health checks.
#[derive(Debug, Clone, Default)]
pub struct DoctorReport {
    pub checks: Vec<CheckResult>,
    pub total_duration: Duration,
    pub environment: HashMap<String, String>,
}

impl DoctorReport {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn add(&mut self, check: CheckResult) {
        self.checks.push(check);
    }

    pub fn all_passed(&self) -> bool {
        self.checks.iter().all(|c| c.passed)
    }

    pub fn passed_count(&self) -> usize {
        self.checks.iter().filter(|c| c.passed).count()
    }

    pub fn failed_count(&self) -> usize {
        self.checks.iter().filter(|c| !c.passed).count()
    }
}

/// Options for the doctor command.
#[derive(Debug, Clone)]
pub struct DoctorOptions {
    /// Host interpreter to probe.
    pub python: PathBuf,
    pub toolchain: ToolchainSettings,
}

/// Run every check.
pub fn doctor(options: &DoctorOptions, runner: &mut dyn CommandRunner) -> DoctorReport {
    let start = Instant::now();
    let mut report = DoctorReport::new();

    report
        .environment
        .insert("os".to_string(), std::env::consts::OS.to_string());
    report
        .environment
        .insert("arch".to_string(), std::env::consts::ARCH.to_string());

    report.add(check_platform(std::env::consts::OS));
    report.add(check_interpreter(runner, &options.python));
    report.add(check_toolchain(&options.toolchain));

    report.total_duration = start.elapsed();
    report
}

fn check_platform(os: &str) -> CheckResult {
    match check_os(os) {
        Ok(()) => CheckResult::pass("Platform", format!("Running on {}", os)),
        Err(e) => CheckResult::fail("Platform", e.to_string()),
    }
}

fn check_interpreter(runner: &mut dyn CommandRunner, python: &Path) -> CheckResult {
    let start = Instant::now();

    let host = match HostPython::probe(runner, python) {
        Ok(host) => host,
        Err(e) => {
            return CheckResult::fail("Python", format!("{:#}", e))
                .with_path(python.to_path_buf())
                .with_duration(start.elapsed());
        }
    };

    let result = if host.version.major == SUPPORTED_MAJOR {
        CheckResult::pass(
            "Python",
            format!("CPython {} ({})", host.version, host.arch()),
        )
    } else {
        CheckResult::fail(
            "Python",
            format!("Python {} found, Python {} is required", host.version, SUPPORTED_MAJOR),
        )
    };

    result
        .with_path(host.executable)
        .with_version(host.version.to_string())
        .with_duration(start.elapsed())
}

fn check_toolchain(settings: &ToolchainSettings) -> CheckResult {
    let start = Instant::now();

    match detect_toolchain(settings) {
        Ok(toolchain) => CheckResult::pass(
            "C Compiler",
            format!("Found {} toolchain", toolchain.platform().as_str()),
        )
        .with_path(toolchain.compiler_path().to_path_buf())
        .with_duration(start.elapsed()),
        Err(e) => CheckResult::fail("C Compiler", format!("{:#}", e))
            .with_duration(start.elapsed()),
    }
}

/// Format the doctor report for display.
pub fn format_report(report: &DoctorReport, verbose: bool) -> String {
    use std::fmt::Write;

    let mut output = String::new();

    writeln!(output, "py2win doctor").unwrap();
    writeln!(output, "=============\n").unwrap();

    if verbose {
        let unknown = "unknown".to_string();
        writeln!(output, "Environment:").unwrap();
        writeln!(
            output,
            "  OS: {} ({})",
            report.environment.get("os").unwrap_or(&unknown),
            report.environment.get("arch").unwrap_or(&unknown)
        )
        .unwrap();
        writeln!(output).unwrap();
    }

    writeln!(output, "Checks:").unwrap();
    for check in &report.checks {
        let status = if check.passed { "[OK]" } else { "[!!]" };
        writeln!(output, "  {} {}", status, check.name).unwrap();

        // Failures always explain themselves
        if verbose || !check.passed {
            writeln!(output, "      {}", check.message).unwrap();
        }
        if verbose {
            if let Some(path) = &check.path {
                writeln!(output, "      Path: {}", path.display()).unwrap();
            }
            if let Some(version) = &check.version {
                writeln!(output, "      Version: {}", version).unwrap();
            }
        }
    }

    writeln!(output).unwrap();
    writeln!(
        output,
        "Summary: {} passed, {} failed",
        report.passed_count(),
        report.failed_count()
    )
    .unwrap();

    if report.all_passed() {
        writeln!(output, "\nThis machine can build distributions.").unwrap();
    } else {
        writeln!(output, "\n`py2win bdist` will not work until the failed checks are fixed.").unwrap();
    }

    output
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_support::{MockExecutor, MockProcessOutput};

    const PROBE: &str = r#"{"version": [3, 12, 1], "pointer_bits": 64, "machine": "AMD64",
        "platform": "win32", "include": "C:/Python312/Include",
        "platinclude": "C:/Python312/Include", "base_exec_prefix": "C:/Python312",
        "executable": "C:/Python312/python.exe"}"#;

    #[test]
    fn test_platform_check() {
        assert!(check_platform("windows").passed);

        let result = check_platform("linux");
        assert!(!result.passed);
        assert!(result.message.contains("only the Windows platform"));
    }

    #[test]
    fn test_interpreter_check_passes() {
        let mut exec = MockExecutor::new();
        exec.set_default(MockProcessOutput::success(PROBE));

        let result = check_interpreter(&mut exec, Path::new("python"));

        assert!(result.passed, "{}", result.message);
        assert_eq!(result.version.as_deref(), Some("3.12.1"));
        assert_eq!(result.path, Some(PathBuf::from("C:/Python312/python.exe")));
    }

    #[test]
    fn test_interpreter_check_rejects_python2() {
        let mut exec = MockExecutor::new();
        exec.set_default(MockProcessOutput::success(PROBE.replace("[3, 12, 1]", "[2, 7, 18]")));

        let result = check_interpreter(&mut exec, Path::new("python"));

        assert!(!result.passed);
        assert!(result.message.contains("Python 3 is required"));
    }

    #[test]
    fn test_interpreter_check_reports_missing_python() {
        let mut exec = MockExecutor::new();
        exec.set_default(MockProcessOutput::failure(9009, "python was not found"));

        let result = check_interpreter(&mut exec, Path::new("python"));

        assert!(!result.passed);
        assert!(result.message.contains("failed to query host interpreter"));
    }

    #[test]
    fn test_report_counts() {
        let mut report = DoctorReport::new();
        report.add(CheckResult::pass("Platform", "ok"));
        report.add(CheckResult::fail("C Compiler", "no compiler"));

        assert!(!report.all_passed());
        assert_eq!(report.passed_count(), 1);
        assert_eq!(report.failed_count(), 1);
    }

    #[test]
    fn test_format_report_shows_failures() {
        let mut report = DoctorReport::new();
        report.add(CheckResult::pass("Platform", "Running on windows"));
        report.add(CheckResult::fail("C Compiler", "no C compiler found"));

        let output = format_report(&report, false);

        assert!(output.contains("[OK] Platform"));
        assert!(!output.contains("Running on windows"));
        assert!(output.contains("[!!] C Compiler"));
        assert!(output.contains("no C compiler found"));
        assert!(output.contains("Summary: 1 passed, 1 failed"));
    }
}
