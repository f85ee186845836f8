//! Archive extraction.
//!
//! Supports `.zip` and gzip-compressed tarballs (`.tgz`, `.tar.gz`).
//! Members can be filtered by glob patterns matched against the full member
//! name, and leading path components can be stripped, so that
//! `Python-3.11.4/Lib/lib2to3/fixes/fix_print.py` lands at
//! `Lib/lib2to3/fixes/fix_print.py`.

use std::fs::{self, File};
use std::io::{self, Read};
use std::path::{Path, PathBuf};

use anyhow::{bail, Context, Result};
use glob::Pattern;

/// Member selection and path rewriting.
#[derive(Debug, Clone, Default)]
pub struct ExtractOptions {
    include: Vec<Pattern>,
    strip_components: usize,
}

impl ExtractOptions {
    /// Extract every member unchanged.
    pub fn new() -> Self {
        ExtractOptions::default()
    }

    /// Only extract members matching `pattern`. Patterns accumulate; a
    /// member matching any of them is extracted. `*` also matches `/`.
    pub fn include(mut self, pattern: &str) -> Result<Self> {
        let pattern = Pattern::new(pattern)
            .with_context(|| format!("invalid member pattern: {}", pattern))?;
        self.include.push(pattern);
        Ok(self)
    }

    /// Drop the first `n` path components of each member.
    pub fn strip_components(mut self, n: usize) -> Self {
        self.strip_components = n;
        self
    }

    fn selects(&self, name: &str) -> bool {
        self.include.is_empty() || self.include.iter().any(|p| p.matches(name))
    }

    /// Where a member named `name` goes, relative to the destination.
    ///
    /// `None` means the member is filtered out or nothing is left after
    /// stripping. Names that would escape the destination are an error.
    fn target(&self, name: &str) -> Result<Option<PathBuf>> {
        let name = name.replace('\\', "/");
        if !self.selects(&name) {
            return Ok(None);
        }

        let mut parts = Vec::new();
        for part in name.split('/') {
            match part {
                "" | "." => continue,
                ".." => bail!("archive member escapes destination directory: {}", name),
                p if p.contains(':') => {
                    bail!("archive member has an absolute path: {}", name)
                }
                p => parts.push(p),
            }
        }

        if name.starts_with('/') {
            bail!("archive member has an absolute path: {}", name);
        }

        if parts.len() <= self.strip_components {
            return Ok(None);
        }

        Ok(Some(parts[self.strip_components..].iter().collect()))
    }
}

/// Extract a zip archive.
pub fn extract_zip(archive: &Path, dest: &Path, opts: &ExtractOptions) -> Result<usize> {
    let file = File::open(archive)
        .with_context(|| format!("failed to open archive: {}", archive.display()))?;
    let mut zip = zip::ZipArchive::new(file)
        .with_context(|| format!("failed to read zip archive: {}", archive.display()))?;

    fs::create_dir_all(dest)
        .with_context(|| format!("failed to create directory: {}", dest.display()))?;

    let mut count = 0;
    for i in 0..zip.len() {
        let mut member = zip
            .by_index(i)
            .with_context(|| format!("failed to read entry {} of {}", i, archive.display()))?;

        let Some(relative) = opts.target(member.name())? else {
            continue;
        };
        let output_path = dest.join(relative);

        if member.is_dir() {
            fs::create_dir_all(&output_path).with_context(|| {
                format!("failed to create directory: {}", output_path.display())
            })?;
            continue;
        }

        write_member(&mut member, &output_path)?;
        count += 1;
    }

    tracing::debug!(
        "extracted {} file(s) from {} into {}",
        count,
        archive.display(),
        dest.display()
    );
    Ok(count)
}

/// Extract a gzip-compressed tarball.
pub fn extract_tar_gz(archive: &Path, dest: &Path, opts: &ExtractOptions) -> Result<usize> {
    use flate2::read::GzDecoder;

    let file = File::open(archive)
        .with_context(|| format!("failed to open archive: {}", archive.display()))?;
    let mut tar = tar::Archive::new(GzDecoder::new(file));

    fs::create_dir_all(dest)
        .with_context(|| format!("failed to create directory: {}", dest.display()))?;

    let mut count = 0;
    for entry in tar.entries().context("failed to read tarball entries")? {
        let mut entry = entry.context("failed to read tarball entry")?;
        let name = entry
            .path()
            .context("failed to get entry path")?
            .to_string_lossy()
            .into_owned();

        let Some(relative) = opts.target(&name)? else {
            continue;
        };
        let output_path = dest.join(relative);

        match entry.header().entry_type() {
            tar::EntryType::Directory => {
                fs::create_dir_all(&output_path).with_context(|| {
                    format!("failed to create directory: {}", output_path.display())
                })?;
            }
            tar::EntryType::Regular | tar::EntryType::Continuous => {
                tracing::trace!("extracting {}", name);
                write_member(&mut entry, &output_path)?;
                count += 1;
            }
            other => {
                tracing::debug!("skipping {:?} entry: {}", other, name);
            }
        }
    }

    tracing::debug!(
        "extracted {} file(s) from {} into {}",
        count,
        archive.display(),
        dest.display()
    );
    Ok(count)
}

fn write_member(reader: &mut impl Read, output_path: &Path) -> Result<()> {
    if let Some(parent) = output_path.parent() {
        fs::create_dir_all(parent)
            .with_context(|| format!("failed to create directory: {}", parent.display()))?;
    }

    let mut out = File::create(output_path)
        .with_context(|| format!("failed to create file: {}", output_path.display()))?;
    io::copy(reader, &mut out)
        .with_context(|| format!("failed to extract file: {}", output_path.display()))?;
    Ok(())
}
