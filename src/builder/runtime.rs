//! Embedded runtime provisioning.
//!
//! Turns an empty working directory into a usable CPython runtime:
//!
//! 1. download and extract the embeddable distribution,
//! 2. unpack the nested standard-library zip into `Lib`,
//! 3. delete the `._pth` files, which would otherwise pin `sys.path` and
//!    keep pip-installed packages out of reach,
//! 4. optionally copy the `lib2to3` fixers and `pgen2` modules from the full
//!    source tarball (the embeddable distribution ships them without sources).

use std::path::{Path, PathBuf};

use anyhow::{Context, Result};

use crate::core::host::HostPython;
use crate::sources::archive::{self, ExtractOptions};
use crate::sources::download::Downloader;
use crate::sources::urls;
use crate::util::config::NetConfig;
use crate::util::fs::{glob_files, remove_file_if_exists, ScratchFile};
use crate::util::shell::{Shell, Status};

/// Scratch name of the downloaded embeddable distribution.
pub const EMBED_ARCHIVE: &str = "python_embed.zip";

/// Scratch name of the downloaded source tarball.
pub const SOURCE_ARCHIVE: &str = "python_source.tgz";

/// Source tarball members copied by the lib2to3 patch.
const LIB2TO3_MEMBERS: &[&str] = &[
    "Python-*/Lib/lib2to3/fixes/*.py",
    "Python-*/Lib/lib2to3/pgen2/*.py",
];

/// The interpreter inside a working directory.
pub fn python_exe(workdir: &Path) -> PathBuf {
    workdir.join("python.exe")
}

/// Whether a runtime has already been provisioned into `workdir`.
pub fn is_provisioned(workdir: &Path) -> bool {
    python_exe(workdir).is_file()
}

/// What to provision and from where.
#[derive(Debug, Clone, Copy)]
pub struct RuntimeSpec<'a> {
    pub python: &'a HostPython,
    pub net: &'a NetConfig,
    pub patch_lib2to3: bool,
}

/// Provision the embedded runtime into `workdir`.
pub fn provision(
    workdir: &Path,
    spec: RuntimeSpec<'_>,
    downloader: &mut Downloader,
    shell: &Shell,
) -> Result<()> {
    let version = spec.python.version;
    let arch = spec.python.arch();
    let url = urls::embed_url(spec.net.python_mirror(), version, arch);

    shell.status(
        Status::Fetching,
        format!("Python {} embeddable distribution ({})", version, arch),
    );
    let embed = ScratchFile::new(workdir.join(EMBED_ARCHIVE))?;
    downloader.download(&url, embed.path())?;

    shell.status(Status::Extracting, format!("runtime into {}", workdir.display()));
    archive::extract_zip(embed.path(), workdir, &ExtractOptions::new())?;
    embed.remove()?;

    let stdlib = unpack_stdlib(workdir)?;
    tracing::debug!("unpacked {} standard library archive(s)", stdlib);

    let removed = remove_path_files(workdir)?;
    tracing::debug!("removed {} ._pth file(s)", removed);

    if spec.patch_lib2to3 {
        let url = urls::source_url(spec.net.python_mirror(), version);
        shell.status(Status::Fetching, format!("Python {} sources for lib2to3", version));
        let copied = patch_lib2to3(workdir, &url, downloader)?;
        tracing::info!("patched {} lib2to3 module(s) into {}", copied, workdir.display());
    } else {
        tracing::debug!("skipping lib2to3 patch for Python {}", version);
    }

    Ok(())
}

/// Extract every `python*.zip` at the top of `workdir` into `workdir/Lib`
/// and delete the archive.
fn unpack_stdlib(workdir: &Path) -> Result<usize> {
    let lib_dir = workdir.join("Lib");
    let archives = glob_files(workdir, &["python*.zip"])?;

    for zip in &archives {
        archive::extract_zip(zip, &lib_dir, &ExtractOptions::new())
            .with_context(|| format!("failed to unpack standard library {}", zip.display()))?;
        remove_file_if_exists(zip)?;
    }

    Ok(archives.len())
}

/// Delete every `*._pth` file at the top of `workdir`.
fn remove_path_files(workdir: &Path) -> Result<usize> {
    let files = glob_files(workdir, &["*._pth"])?;
    for file in &files {
        remove_file_if_exists(file)?;
    }
    Ok(files.len())
}

/// Copy the `lib2to3` fixer and `pgen2` sources from the tarball at `url`.
fn patch_lib2to3(workdir: &Path, url: &str, downloader: &mut Downloader) -> Result<usize> {
    let tarball = ScratchFile::new(workdir.join(SOURCE_ARCHIVE))?;
    downloader.download(url, tarball.path())?;

    let mut opts = ExtractOptions::new().strip_components(1);
    for pattern in LIB2TO3_MEMBERS {
        opts = opts.include(pattern)?;
    }

    let copied = archive::extract_tar_gz(tarball.path(), workdir, &opts)?;
    tarball.remove()?;
    Ok(copied)
}
