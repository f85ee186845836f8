//! Native launcher generation.
//!
//! Each entry point becomes a small executable that boots the embedded
//! interpreter in isolated mode and calls `module.callable()`. Console
//! launchers forward their command-line arguments; GUI launchers use the
//! windowed subsystem and forward nothing.

use std::path::{Path, PathBuf};

use anyhow::{bail, Context, Result};

use crate::builder::toolchain::{CompileInput, LinkInput, Subsystem, Toolchain};
use crate::core::entry_point::{EntryPoint, LauncherKind};
use crate::core::host::HostPython;
use crate::sources::download::Downloader;
use crate::util::config::ToolchainSettings;
use crate::util::fs::{remove_file_if_exists, write_string, ScratchFile};
use crate::util::process::CommandRunner;
use crate::util::shell::{Shell, Status};

const CONSOLE_TEMPLATE: &str = include_str!("templates/console.c");
const GUI_TEMPLATE: &str = include_str!("templates/gui.c");
const INVOCATION_MARKER: &str = "@INVOCATION@";

/// C source of the launcher for `entry`.
pub fn render_source(entry: &EntryPoint) -> String {
    let template = match entry.kind() {
        LauncherKind::Console => CONSOLE_TEMPLATE,
        LauncherKind::Gui => GUI_TEMPLATE,
    };
    template.replace(INVOCATION_MARKER, &entry.invocation())
}

/// Everything launcher compilation needs besides the entry point.
pub struct LauncherBuilder<'a> {
    pub workdir: &'a Path,
    pub python: &'a HostPython,
    pub toolchain: &'a dyn Toolchain,
    pub settings: &'a ToolchainSettings,
    pub manifest_url: &'a str,
}

impl LauncherBuilder<'_> {
    /// Where the executable for `entry` is written.
    pub fn executable_path(&self, entry: &EntryPoint) -> PathBuf {
        self.workdir.join(format!("{}.exe", entry.executable_name()))
    }

    /// Compile and link the launcher for `entry`.
    ///
    /// The rendered source, manifest and object file are removed whatever
    /// happens. On failure no executable is left behind either.
    pub fn build(
        &self,
        entry: &EntryPoint,
        downloader: &mut Downloader,
        runner: &mut dyn CommandRunner,
        shell: &Shell,
    ) -> Result<PathBuf> {
        shell.status(Status::Compiling, entry);
        self.build_inner(entry, downloader, runner)
            .with_context(|| format!("failed to build launcher `{}`", entry.executable_name()))
    }

    fn build_inner(
        &self,
        entry: &EntryPoint,
        downloader: &mut Downloader,
        runner: &mut dyn CommandRunner,
    ) -> Result<PathBuf> {
        let name = entry.executable_name();
        let exe = self.executable_path(entry);
        remove_file_if_exists(&exe)?;

        let source = ScratchFile::new(self.workdir.join(format!("{}.c", name)))?;
        write_string(source.path(), &render_source(entry))?;

        let manifest = if self.toolchain.embeds_manifest() {
            let manifest =
                ScratchFile::new(self.workdir.join(format!("{}.exe.manifest", name)))?;
            downloader.download(self.manifest_url, manifest.path())?;
            Some(manifest)
        } else {
            None
        };

        let object = ScratchFile::new(self.workdir.join(format!(
            "{}.{}",
            name,
            self.toolchain.object_extension()
        )))?;

        let compile = CompileInput {
            source: source.path().to_path_buf(),
            output: object.path().to_path_buf(),
            include_dirs: self.python.include_dirs(),
            cflags: self.settings.cflags.clone(),
        };
        let cmd = self
            .toolchain
            .compile_command(&compile)
            .into_process(self.workdir);
        runner.exec_and_check(&cmd)?;

        let link = LinkInput {
            objects: vec![object.path().to_path_buf()],
            output: exe.clone(),
            lib_dirs: vec![self.python.library_dir()],
            libs: vec![self.python.import_library()],
            subsystem: Subsystem::from(entry.kind()),
            manifest: manifest.as_ref().map(|m| m.path().to_path_buf()),
            ldflags: self.settings.ldflags.clone(),
        };
        let cmd = self
            .toolchain
            .link_exe_command(&link)
            .into_process(self.workdir);

        if let Err(e) = runner.exec_and_check(&cmd) {
            if let Err(cleanup) = remove_file_if_exists(&exe) {
                tracing::warn!("{:#}", cleanup);
            }
            return Err(e);
        }

        if !exe.is_file() {
            bail!("linker reported success but did not write {}", exe.display());
        }

        source.remove()?;
        if let Some(manifest) = manifest {
            manifest.remove()?;
        }
        object.remove()?;

        tracing::info!("built {}", exe.display());
        Ok(exe)
    }
}
