//! Command implementations

pub mod bdist;
pub mod clean;
pub mod completions;
pub mod doctor;

use std::path::PathBuf;

use anyhow::Result;

use py2win::core::PyProject;
use py2win::util::config::Config;
use py2win::util::GlobalContext;

/// The project found from `start` (or cwd) and its merged configuration.
/// Without a project, only the global configuration applies.
pub(crate) fn load_project(
    ctx: &GlobalContext,
    start: Option<&std::path::Path>,
) -> Result<(Option<PyProject>, Config)> {
    match ctx.find_manifest(start) {
        Ok(manifest) => {
            let project = PyProject::load(&manifest)?;
            let config = ctx.load_config(&project.root)?;
            Ok((Some(project), config))
        }
        Err(e) => {
            tracing::debug!("{:#}", e);
            Ok((None, ctx.load_config(ctx.cwd())?))
        }
    }
}

/// `--dist-dir`, then `[build] dist-dir`, then `dist`.
pub(crate) fn dist_dir(arg: Option<PathBuf>, config: &Config) -> PathBuf {
    arg.or_else(|| config.build.dist_dir.clone())
        .unwrap_or_else(|| PathBuf::from("dist"))
}
