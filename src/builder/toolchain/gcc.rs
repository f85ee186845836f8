//! MinGW-w64 GCC toolchain implementation.

use std::path::{Path, PathBuf};

use super::{CommandSpec, CompileInput, LinkInput, Subsystem, Toolchain, ToolchainPlatform};

/// GCC targeting Windows. The same driver compiles and links.
#[derive(Debug, Clone)]
pub struct GccToolchain {
    /// Path to the C compiler
    pub cc: PathBuf,
}

impl GccToolchain {
    /// Create a new GCC toolchain.
    pub fn new(cc: PathBuf) -> Self {
        GccToolchain { cc }
    }
}

impl Toolchain for GccToolchain {
    fn platform(&self) -> ToolchainPlatform {
        ToolchainPlatform::Gcc
    }

    fn compiler_path(&self) -> &Path {
        &self.cc
    }

    fn compile_command(&self, input: &CompileInput) -> CommandSpec {
        let mut cmd = CommandSpec::new(&self.cc);

        // Compile only
        cmd = cmd.arg("-c");

        for dir in &input.include_dirs {
            cmd = cmd.arg(format!("-I{}", dir.display()));
        }

        cmd = cmd.args(input.cflags.iter().cloned());

        cmd = cmd.arg(input.source.display().to_string());
        cmd = cmd.arg("-o");
        cmd = cmd.arg(input.output.display().to_string());

        cmd
    }

    fn link_exe_command(&self, input: &LinkInput) -> CommandSpec {
        let mut cmd = CommandSpec::new(&self.cc);

        // wWinMain needs the unicode CRT startup
        if input.subsystem == Subsystem::Windows {
            cmd = cmd.arg("-mwindows");
            cmd = cmd.arg("-municode");
        }

        cmd = cmd.arg("-o");
        cmd = cmd.arg(input.output.display().to_string());

        for obj in &input.objects {
            cmd = cmd.arg(obj.display().to_string());
        }

        for dir in &input.lib_dirs {
            cmd = cmd.arg(format!("-L{}", dir.display()));
        }

        // Libraries come after the objects that reference them
        for lib in &input.libs {
            cmd = cmd.arg(format!("-l{}", lib));
        }

        cmd = cmd.args(input.ldflags.iter().cloned());

        cmd
    }

    fn embeds_manifest(&self) -> bool {
        false
    }

    fn object_extension(&self) -> &str {
        "o"
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_gcc_compile_command() {
        let toolchain = GccToolchain::new(PathBuf::from("gcc"));
        let input = CompileInput {
            source: PathBuf::from("sample.c"),
            output: PathBuf::from("sample.o"),
            include_dirs: vec![PathBuf::from("C:/Python311/Include")],
            cflags: vec!["-O2".to_string()],
        };

        let cmd = toolchain.compile_command(&input);
        assert_eq!(
            cmd.args,
            vec!["-c", "-IC:/Python311/Include", "-O2", "sample.c", "-o", "sample.o"]
        );
    }

    #[test]
    fn test_gcc_link_gui() {
        let toolchain = GccToolchain::new(PathBuf::from("gcc"));
        let input = LinkInput {
            objects: vec![PathBuf::from("sample-gui.o")],
            output: PathBuf::from("sample-gui.exe"),
            lib_dirs: vec![PathBuf::from("C:/Python311/libs")],
            libs: vec!["python311".to_string()],
            subsystem: Subsystem::Windows,
            manifest: Some(PathBuf::from("sample-gui.exe.manifest")),
            ldflags: vec![],
        };

        let cmd = toolchain.link_exe_command(&input);
        assert_eq!(
            cmd.args,
            vec![
                "-mwindows",
                "-municode",
                "-o",
                "sample-gui.exe",
                "sample-gui.o",
                "-LC:/Python311/libs",
                "-lpython311"
            ]
        );
        assert!(!toolchain.embeds_manifest());
    }

    #[test]
    fn test_gcc_link_console() {
        let toolchain = GccToolchain::new(PathBuf::from("gcc"));
        let input = LinkInput {
            objects: vec![PathBuf::from("sample.o")],
            output: PathBuf::from("sample.exe"),
            lib_dirs: vec![],
            libs: vec!["python311".to_string()],
            subsystem: Subsystem::Console,
            manifest: None,
            ldflags: vec!["-s".to_string()],
        };

        let cmd = toolchain.link_exe_command(&input);
        assert!(!cmd.args.contains(&"-mwindows".to_string()));
        assert_eq!(cmd.args.last().map(String::as_str), Some("-s"));
    }
}
