//! Host platform and interpreter introspection.
//!
//! Launchers are compiled against the headers and import library of the
//! host CPython installation, and the embedded runtime is downloaded for the
//! exact same version and architecture. Both facts are read from the host
//! interpreter by running a short probe script.

use std::fmt;
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use serde::Deserialize;

use crate::core::errors::BuildError;
use crate::util::process::{CommandRunner, ProcessBuilder};

/// The only operating system py2win builds on.
pub const TARGET_OS: &str = "windows";

/// The only interpreter major version py2win supports.
pub const SUPPORTED_MAJOR: u32 = 3;

/// Printed as one JSON object. Kept compatible with Python 2 so that an old
/// interpreter reports its version instead of a syntax error.
const PROBE_SCRIPT: &str = "import json, platform, struct, sys, sysconfig; \
print(json.dumps({\
\"version\": list(sys.version_info[:3]), \
\"pointer_bits\": struct.calcsize(\"P\") * 8, \
\"machine\": platform.machine(), \
\"platform\": sys.platform, \
\"include\": sysconfig.get_path(\"include\"), \
\"platinclude\": sysconfig.get_path(\"platinclude\"), \
\"base_exec_prefix\": sys.base_exec_prefix if hasattr(sys, \"base_exec_prefix\") else sys.exec_prefix, \
\"executable\": sys.executable}))";

/// A CPython version triple.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct PythonVersion {
    pub major: u32,
    pub minor: u32,
    pub micro: u32,
}

impl PythonVersion {
    pub fn new(major: u32, minor: u32, micro: u32) -> Self {
        PythonVersion {
            major,
            minor,
            micro,
        }
    }

    /// Whether the standard library still ships `lib2to3` (removed in 3.13).
    pub fn has_lib2to3(&self) -> bool {
        (self.major, self.minor) < (3, 13)
    }
}

impl fmt::Display for PythonVersion {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}.{}.{}", self.major, self.minor, self.micro)
    }
}

/// Architecture tag used in embeddable distribution file names.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Arch {
    Amd64,
    Win32,
    Arm64,
}

impl Arch {
    pub fn as_str(&self) -> &'static str {
        match self {
            Arch::Amd64 => "amd64",
            Arch::Win32 => "win32",
            Arch::Arm64 => "arm64",
        }
    }
}

impl fmt::Display for Arch {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Deserialize)]
struct ProbeOutput {
    version: Vec<u32>,
    pointer_bits: u32,
    machine: String,
    platform: String,
    include: PathBuf,
    platinclude: PathBuf,
    base_exec_prefix: PathBuf,
    executable: PathBuf,
}

/// Facts about the host CPython installation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HostPython {
    pub executable: PathBuf,
    pub version: PythonVersion,
    pub pointer_bits: u32,
    pub machine: String,
    /// `sys.platform`, `win32` on every Windows build.
    pub platform: String,
    pub include: PathBuf,
    pub platinclude: PathBuf,
    pub base_exec_prefix: PathBuf,
}

impl HostPython {
    /// Run `python` with the probe script and parse what it reports.
    pub fn probe(runner: &mut dyn CommandRunner, python: &Path) -> Result<Self> {
        let cmd = ProcessBuilder::new(python).args(["-c", PROBE_SCRIPT]);
        let output = runner
            .exec_and_check(&cmd)
            .with_context(|| format!("failed to query host interpreter `{}`", python.display()))?;

        Self::from_probe_json(&output.stdout_lossy())
            .with_context(|| format!("unexpected output from `{}`", python.display()))
    }

    fn from_probe_json(stdout: &str) -> Result<Self> {
        let probe: ProbeOutput =
            serde_json::from_str(stdout.trim()).context("failed to parse interpreter probe")?;

        let version = match probe.version.as_slice() {
            [major, minor, micro, ..] => PythonVersion::new(*major, *minor, *micro),
            other => anyhow::bail!("invalid version triple {:?}", other),
        };

        Ok(HostPython {
            executable: probe.executable,
            version,
            pointer_bits: probe.pointer_bits,
            machine: probe.machine,
            platform: probe.platform,
            include: probe.include,
            platinclude: probe.platinclude,
            base_exec_prefix: probe.base_exec_prefix,
        })
    }

    /// Architecture of the embeddable distribution matching this interpreter.
    pub fn arch(&self) -> Arch {
        let machine = self.machine.to_ascii_lowercase();
        if machine == "arm64" || machine == "aarch64" {
            Arch::Arm64
        } else if self.pointer_bits > 32 {
            Arch::Amd64
        } else {
            Arch::Win32
        }
    }

    /// Header search path: `include`, then `platinclude` when it differs.
    pub fn include_dirs(&self) -> Vec<PathBuf> {
        let mut dirs = vec![self.include.clone()];
        if self.platinclude != self.include {
            dirs.push(self.platinclude.clone());
        }
        dirs
    }

    /// Directory holding `pythonXY.lib`.
    pub fn library_dir(&self) -> PathBuf {
        self.base_exec_prefix.join("libs")
    }

    /// Import library name without extension, e.g. `python311`.
    pub fn import_library(&self) -> String {
        format!("python{}{}", self.version.major, self.version.minor)
    }
}

/// The machine py2win runs on.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Host {
    /// `std::env::consts::OS` of the build machine.
    pub os: String,
    pub python: HostPython,
}

impl Host {
    /// Detect the host. The operating system is checked before the
    /// interpreter is spawned.
    pub fn detect(runner: &mut dyn CommandRunner, python: &Path) -> Result<Self> {
        let os = std::env::consts::OS.to_string();
        check_os(&os)?;

        let python = HostPython::probe(runner, python)?;
        let host = Host { os, python };
        host.ensure_supported()?;
        Ok(host)
    }

    /// Check that the host can produce a distribution.
    pub fn ensure_supported(&self) -> Result<(), BuildError> {
        check_os(&self.os)?;

        if self.python.version.major != SUPPORTED_MAJOR {
            return Err(BuildError::UnsupportedPython {
                version: self.python.version.to_string(),
            });
        }
        Ok(())
    }
}

/// Fail unless `os` is the target operating system.
pub fn check_os(os: &str) -> Result<(), BuildError> {
    if os != TARGET_OS {
        return Err(BuildError::UnsupportedPlatform { os: os.to_string() });
    }
    Ok(())
}

/// Default host interpreter when none is configured.
pub fn default_python() -> PathBuf {
    crate::util::process::find_executable("python")
        .or_else(|| crate::util::process::find_executable("python3"))
        .unwrap_or_else(|| PathBuf::from("python"))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_support::{sample_host_python, MockExecutor, MockProcessOutput};

    const PROBE_JSON: &str = r#"{"version": [3, 11, 4], "pointer_bits": 64, "machine": "AMD64", "platform": "win32", "include": "C:\\Python311\\Include", "platinclude": "C:\\Python311\\Include", "base_exec_prefix": "C:\\Python311", "executable": "C:\\Python311\\python.exe"}"#;

    #[test]
    fn test_parse_probe() {
        let host = HostPython::from_probe_json(PROBE_JSON).unwrap();
        assert_eq!(host.version, PythonVersion::new(3, 11, 4));
        assert_eq!(host.arch(), Arch::Amd64);
        assert_eq!(host.platform, "win32");
        assert_eq!(host.include_dirs().len(), 1);
        assert_eq!(host.import_library(), "python311");
    }

    #[test]
    fn test_probe_runs_interpreter() {
        let mut exec = MockExecutor::new();
        exec.expect_prefix("python -c", MockProcessOutput::success(PROBE_JSON));

        let host = HostPython::probe(&mut exec, Path::new("python")).unwrap();
        assert_eq!(host.version.to_string(), "3.11.4");
        assert_eq!(exec.calls().len(), 1);
    }

    #[test]
    fn test_probe_failure_is_reported() {
        let mut exec = MockExecutor::new();
        exec.set_default(MockProcessOutput::failure(9009, "not found"));

        let err = HostPython::probe(&mut exec, Path::new("python")).unwrap_err();
        assert!(format!("{:#}", err).contains("failed to query host interpreter"));
    }

    #[test]
    fn test_arch_selection() {
        let mut host = sample_host_python();
        host.pointer_bits = 32;
        host.machine = "x86".into();
        assert_eq!(host.arch(), Arch::Win32);

        host.pointer_bits = 64;
        host.machine = "ARM64".into();
        assert_eq!(host.arch(), Arch::Arm64);
    }

    #[test]
    fn test_include_dirs_dedup() {
        let mut host = sample_host_python();
        host.platinclude = PathBuf::from("C:/Python311/PlatInclude");
        assert_eq!(
            host.include_dirs(),
            vec![host.include.clone(), PathBuf::from("C:/Python311/PlatInclude")]
        );
    }

    #[test]
    fn test_unsupported_os() {
        let host = Host {
            os: "linux".into(),
            python: sample_host_python(),
        };
        assert!(matches!(
            host.ensure_supported(),
            Err(BuildError::UnsupportedPlatform { .. })
        ));
    }

    #[test]
    fn test_unsupported_major_version() {
        let mut python = sample_host_python();
        python.version = PythonVersion::new(2, 7, 18);
        let host = Host {
            os: TARGET_OS.into(),
            python,
        };
        let err = host.ensure_supported().unwrap_err();
        assert!(err.to_string().contains("2.7.18"));
    }

    #[test]
    #[cfg(not(windows))]
    fn test_detect_fails_before_spawning_on_other_os() {
        let mut exec = MockExecutor::new();
        let err = Host::detect(&mut exec, Path::new("python")).unwrap_err();

        assert!(matches!(
            err.downcast_ref::<BuildError>(),
            Some(BuildError::UnsupportedPlatform { .. })
        ));
        assert!(exec.calls().is_empty());
    }

    #[test]
    fn test_lib2to3_availability() {
        assert!(PythonVersion::new(3, 12, 1).has_lib2to3());
        assert!(!PythonVersion::new(3, 13, 0).has_lib2to3());
    }
}
