//! C toolchain abstraction for launcher compilation.
//!
//! A launcher is a single C translation unit linked against the host
//! interpreter's import library, so a toolchain only needs to know how to
//! compile one source file and link one executable.
//!
//! Toolchain detection priority:
//! 1. `[toolchain]` in the py2win config (`cc`, optional `link`)
//! 2. MSVC from an already configured developer prompt
//! 3. MSVC auto-detected via `vswhere.exe` + `vcvarsall.bat`
//! 4. MinGW `gcc` on `PATH`

use std::path::{Path, PathBuf};

use crate::core::entry_point::LauncherKind;
use crate::util::process::ProcessBuilder;

mod detect;
mod gcc;
mod msvc;

pub use detect::detect_toolchain;
pub use gcc::GccToolchain;
pub use msvc::MsvcToolchain;

/// A command to execute, with program, arguments, and environment.
#[derive(Debug, Clone)]
pub struct CommandSpec {
    /// The program to run (e.g., "gcc", "cl.exe")
    pub program: PathBuf,
    /// Command arguments
    pub args: Vec<String>,
    /// Environment variables to set
    pub env: Vec<(String, String)>,
}

impl CommandSpec {
    /// Create a new command spec.
    pub fn new(program: impl Into<PathBuf>) -> Self {
        CommandSpec {
            program: program.into(),
            args: Vec::new(),
            env: Vec::new(),
        }
    }

    /// Add an argument.
    pub fn arg(mut self, arg: impl Into<String>) -> Self {
        self.args.push(arg.into());
        self
    }

    /// Add multiple arguments.
    pub fn args(mut self, args: impl IntoIterator<Item = impl Into<String>>) -> Self {
        self.args.extend(args.into_iter().map(|a| a.into()));
        self
    }

    /// Add an environment variable.
    pub fn env(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.env.push((key.into(), value.into()));
        self
    }

    /// Build a process for a [`CommandRunner`] to execute, run from `cwd`.
    ///
    /// [`CommandRunner`]: crate::util::process::CommandRunner
    pub fn into_process(self, cwd: &Path) -> ProcessBuilder {
        let mut pb = ProcessBuilder::new(&self.program).args(&self.args).cwd(cwd);
        for (key, value) in &self.env {
            pb = pb.env(key, value);
        }
        pb
    }
}

/// Windows subsystem of the linked executable.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Subsystem {
    /// Attached to a console; entry point `main`.
    Console,
    /// No console window; entry point `wWinMain`.
    Windows,
}

impl From<LauncherKind> for Subsystem {
    fn from(kind: LauncherKind) -> Self {
        match kind {
            LauncherKind::Console => Subsystem::Console,
            LauncherKind::Gui => Subsystem::Windows,
        }
    }
}

/// Input for a compile step.
#[derive(Debug, Clone)]
pub struct CompileInput {
    /// Source file to compile
    pub source: PathBuf,
    /// Output object file
    pub output: PathBuf,
    /// Include directories
    pub include_dirs: Vec<PathBuf>,
    /// Additional compiler flags
    pub cflags: Vec<String>,
}

/// Input for a link step.
#[derive(Debug, Clone)]
pub struct LinkInput {
    /// Object files to link
    pub objects: Vec<PathBuf>,
    /// Output executable
    pub output: PathBuf,
    /// Library search paths
    pub lib_dirs: Vec<PathBuf>,
    /// Libraries to link, without prefix or extension
    pub libs: Vec<String>,
    pub subsystem: Subsystem,
    /// Application manifest to embed, for toolchains that can
    pub manifest: Option<PathBuf>,
    /// Additional linker flags
    pub ldflags: Vec<String>,
}

/// The family of a toolchain.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ToolchainPlatform {
    /// Microsoft Visual C++
    Msvc,
    /// GCC targeting Windows (MinGW-w64)
    Gcc,
}

impl ToolchainPlatform {
    /// Get the platform name as a string.
    pub fn as_str(&self) -> &'static str {
        match self {
            ToolchainPlatform::Msvc => "msvc",
            ToolchainPlatform::Gcc => "gcc",
        }
    }
}

/// Trait for toolchain implementations.
///
/// Each toolchain knows how to generate commands for its specific compiler.
pub trait Toolchain {
    /// Get the toolchain platform.
    fn platform(&self) -> ToolchainPlatform;

    /// Get the C compiler path.
    fn compiler_path(&self) -> &Path;

    /// Generate a compile command.
    fn compile_command(&self, input: &CompileInput) -> CommandSpec;

    /// Generate a link command for an executable.
    fn link_exe_command(&self, input: &LinkInput) -> CommandSpec;

    /// Whether [`LinkInput::manifest`] is embedded into the executable.
    fn embeds_manifest(&self) -> bool;

    /// Get the object file extension.
    fn object_extension(&self) -> &str;
}

/// A generic wrapper that injects environment variables into all commands.
///
/// Used for an MSVC installation found through `vcvarsall.bat`: the
/// captured `PATH`, `INCLUDE` and `LIB` are passed to every invocation.
#[derive(Debug, Clone)]
pub struct EnvWrapper<T> {
    inner: T,
    env_vars: Vec<(String, String)>,
}

impl<T> EnvWrapper<T> {
    /// Create a new environment wrapper.
    pub fn new(inner: T, env_vars: Vec<(String, String)>) -> Self {
        EnvWrapper { inner, env_vars }
    }

    fn inject_env(&self, mut cmd: CommandSpec) -> CommandSpec {
        for (key, value) in &self.env_vars {
            cmd = cmd.env(key, value);
        }
        cmd
    }
}

impl<T: Toolchain> Toolchain for EnvWrapper<T> {
    fn platform(&self) -> ToolchainPlatform {
        self.inner.platform()
    }

    fn compiler_path(&self) -> &Path {
        self.inner.compiler_path()
    }

    fn compile_command(&self, input: &CompileInput) -> CommandSpec {
        self.inject_env(self.inner.compile_command(input))
    }

    fn link_exe_command(&self, input: &LinkInput) -> CommandSpec {
        self.inject_env(self.inner.link_exe_command(input))
    }

    fn embeds_manifest(&self) -> bool {
        self.inner.embeds_manifest()
    }

    fn object_extension(&self) -> &str {
        self.inner.object_extension()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn link_input(subsystem: Subsystem) -> LinkInput {
        LinkInput {
            objects: vec![PathBuf::from("sample.obj")],
            output: PathBuf::from("sample.exe"),
            lib_dirs: vec![PathBuf::from("C:/Python311/libs")],
            libs: vec!["python311".to_string()],
            subsystem,
            manifest: Some(PathBuf::from("sample.exe.manifest")),
            ldflags: vec![],
        }
    }

    #[test]
    fn test_env_wrapper_injects_env() {
        let msvc = MsvcToolchain::new(PathBuf::from("cl"), PathBuf::from("link"));
        let wrapped = EnvWrapper::new(
            msvc,
            vec![("INCLUDE".to_string(), "C:/VC/include".to_string())],
        );

        let cmd = wrapped.link_exe_command(&link_input(Subsystem::Console));
        assert_eq!(cmd.program, PathBuf::from("link"));
        assert_eq!(
            cmd.env,
            vec![("INCLUDE".to_string(), "C:/VC/include".to_string())]
        );
        assert!(wrapped.embeds_manifest());
        assert_eq!(wrapped.platform(), ToolchainPlatform::Msvc);
    }

    #[test]
    fn test_into_process_carries_env_and_cwd() {
        let pb = CommandSpec::new("cl")
            .args(["/nologo", "/c"])
            .env("LIB", "C:/VC/lib")
            .into_process(Path::new("dist/sample-1.0"));

        assert_eq!(pb.display_command(), "cl /nologo /c");
        assert_eq!(pb.get_env("LIB"), Some("C:/VC/lib"));
        assert_eq!(pb.get_cwd(), Some(Path::new("dist/sample-1.0")));
    }

    #[test]
    fn test_subsystem_from_kind() {
        assert_eq!(Subsystem::from(LauncherKind::Console), Subsystem::Console);
        assert_eq!(Subsystem::from(LauncherKind::Gui), Subsystem::Windows);
    }
}
