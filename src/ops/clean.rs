//! Implementation of `py2win clean`.

use std::path::{Path, PathBuf};

use anyhow::Result;

use crate::core::identity::DistributionId;
use crate::util::fs::{remove_dir_all_if_exists, remove_file_if_exists};

/// What to remove.
#[derive(Debug, Clone)]
pub struct CleanOptions {
    pub dist_dir: PathBuf,
    /// The project's working directory and archive, when known.
    pub id: Option<DistributionId>,
    /// Remove the whole dist directory.
    pub all: bool,
}

/// Remove build outputs and return the paths that existed.
///
/// Without `all`, only the outputs named after `id` are touched; with no
/// identity nothing is removed.
pub fn clean(opts: &CleanOptions) -> Result<Vec<PathBuf>> {
    if opts.all {
        return remove_existing(&[opts.dist_dir.clone()]);
    }

    let Some(id) = &opts.id else {
        tracing::debug!("no distribution identity, leaving {}", opts.dist_dir.display());
        return Ok(Vec::new());
    };

    let fullname = id.fullname();
    remove_existing(&[
        opts.dist_dir.join(&fullname),
        opts.dist_dir.join(format!("{}.zip", fullname)),
    ])
}

fn remove_existing(paths: &[PathBuf]) -> Result<Vec<PathBuf>> {
    let mut removed = Vec::new();
    for path in paths {
        if !path.exists() {
            continue;
        }
        remove_path(path)?;
        removed.push(path.clone());
    }
    Ok(removed)
}

fn remove_path(path: &Path) -> Result<()> {
    if path.is_dir() {
        remove_dir_all_if_exists(path)
    } else {
        remove_file_if_exists(path)
    }
}
