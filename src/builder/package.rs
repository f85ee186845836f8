//! Zip packaging of a finished distribution.

use std::fs::File;
use std::io;
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use walkdir::WalkDir;
use zip::write::SimpleFileOptions;
use zip::{CompressionMethod, ZipWriter};

/// Archive the contents of `workdir` as `{dist_dir}/{fullname}.zip`.
///
/// Entries are rooted at `{fullname}/`, so extracting the archive anywhere
/// recreates the working directory. Directories get their own entries.
pub fn create_zip(workdir: &Path, dist_dir: &Path, fullname: &str) -> Result<PathBuf> {
    let archive_path = dist_dir.join(format!("{}.zip", fullname));
    let file = File::create(&archive_path)
        .with_context(|| format!("failed to create {}", archive_path.display()))?;

    let mut zip = ZipWriter::new(file);
    let options = SimpleFileOptions::default()
        .compression_method(CompressionMethod::Deflated)
        .large_file(true);

    let mut count = 0usize;
    for entry in WalkDir::new(workdir).min_depth(1).sort_by_file_name() {
        let entry = entry.with_context(|| format!("failed to walk {}", workdir.display()))?;
        let relative = entry
            .path()
            .strip_prefix(workdir)
            .with_context(|| format!("{} is outside the working directory", entry.path().display()))?;
        let name = entry_name(fullname, relative);

        if entry.file_type().is_dir() {
            zip.add_directory(name, options)
                .with_context(|| format!("failed to add directory {}", relative.display()))?;
            continue;
        }

        zip.start_file(name, options)
            .with_context(|| format!("failed to add {}", relative.display()))?;
        let mut input = File::open(entry.path())
            .with_context(|| format!("failed to open {}", entry.path().display()))?;
        io::copy(&mut input, &mut zip)
            .with_context(|| format!("failed to compress {}", entry.path().display()))?;
        count += 1;
    }

    zip.finish()
        .with_context(|| format!("failed to finish {}", archive_path.display()))?;

    tracing::info!("packaged {} file(s) into {}", count, archive_path.display());
    Ok(archive_path)
}

/// Archive member name: `/`-separated regardless of host.
fn entry_name(fullname: &str, relative: &Path) -> String {
    let mut name = fullname.to_string();
    for component in relative.components() {
        name.push('/');
        name.push_str(&component.as_os_str().to_string_lossy());
    }
    name
}
