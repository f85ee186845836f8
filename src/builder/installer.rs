//! pip bootstrap and dependency installation into the embedded runtime.

use std::path::{Path, PathBuf};

use anyhow::{Context, Result};

use crate::builder::runtime::python_exe;
use crate::sources::download::Downloader;
use crate::util::fs::{glob_files, ScratchFile};
use crate::util::process::{CommandRunner, ProcessBuilder};
use crate::util::shell::{Shell, Status};

/// Scratch name of the pip bootstrap script.
pub const GET_PIP: &str = "get-pip.py";

/// Download `get-pip.py` next to the interpreter and run it.
pub fn install_pip(
    workdir: &Path,
    get_pip_url: &str,
    downloader: &mut Downloader,
    runner: &mut dyn CommandRunner,
    shell: &Shell,
) -> Result<()> {
    let script = ScratchFile::new(workdir.join(GET_PIP))?;
    downloader.download(get_pip_url, script.path())?;

    shell.status(Status::Installing, "pip");
    let cmd = ProcessBuilder::new(python_exe(workdir))
        .arg(script.path())
        .cwd(workdir);
    runner
        .exec_and_check(&cmd)
        .context("failed to bootstrap pip")?;

    script.remove()
}

/// One `pip install` invocation over a set of items.
#[derive(Debug)]
pub struct InstallPass<'a> {
    /// What is being installed, for messages (`wheels`, `requirements`, ...).
    pub label: &'a str,
    pub items: Vec<String>,
}

impl<'a> InstallPass<'a> {
    pub fn new(label: &'a str, items: impl IntoIterator<Item = impl Into<String>>) -> Self {
        InstallPass {
            label,
            items: items.into_iter().map(Into::into).collect(),
        }
    }

    pub fn wheels(wheels: &[PathBuf]) -> Self {
        InstallPass::new("wheels", wheels.iter().map(|w| w.display().to_string()))
    }
}

/// Build the `pip install` command for `items`.
///
/// With an extra wheel directory, pip may resolve from it (`--find-links`)
/// and every wheel in it is installed as well.
pub fn pip_install_command(
    workdir: &Path,
    items: &[String],
    extra_wheel_dir: Option<&Path>,
) -> Result<ProcessBuilder> {
    let mut cmd = ProcessBuilder::new(python_exe(workdir))
        .args(["-m", "pip", "install", "-U", "--no-warn-script-location"])
        .cwd(workdir);

    if let Some(dir) = extra_wheel_dir {
        cmd = cmd.arg("--find-links").arg(dir);
    }

    cmd = cmd.args(items);

    if let Some(dir) = extra_wheel_dir {
        cmd = cmd.args(glob_files(dir, &["*.whl"])?);
    }

    Ok(cmd)
}

/// Run one install pass. An empty pass spawns nothing and returns `false`.
pub fn install(
    workdir: &Path,
    pass: &InstallPass<'_>,
    extra_wheel_dir: Option<&Path>,
    runner: &mut dyn CommandRunner,
    shell: &Shell,
) -> Result<bool> {
    if pass.items.is_empty() {
        tracing::debug!("no {} to install", pass.label);
        return Ok(false);
    }

    shell.status(
        Status::Installing,
        format!("{} {}", pass.items.len(), pass.label),
    );
    let cmd = pip_install_command(workdir, &pass.items, extra_wheel_dir)?;
    runner
        .exec_and_check(&cmd)
        .with_context(|| format!("failed to install {}", pass.label))?;
    Ok(true)
}
