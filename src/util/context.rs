//! Global context for py2win operations.
//!
//! Provides centralized access to the working directory, the project root
//! and configuration file locations.

use std::path::{Path, PathBuf};

use anyhow::{bail, Context, Result};

use crate::util::config::{global_config_path, load_config, project_config_path, Config};

/// Name of the project manifest py2win looks for.
pub const PROJECT_MANIFEST: &str = "pyproject.toml";

/// Global context shared by all commands.
#[derive(Debug, Clone)]
pub struct GlobalContext {
    cwd: PathBuf,
    global_config: Option<PathBuf>,
}

impl GlobalContext {
    /// Create a context rooted at the current directory.
    pub fn new() -> Result<Self> {
        let cwd = std::env::current_dir().context("failed to get current directory")?;
        Self::with_cwd(cwd)
    }

    /// Create a context rooted at `cwd`.
    pub fn with_cwd(cwd: PathBuf) -> Result<Self> {
        if !cwd.is_absolute() {
            bail!("working directory must be absolute: {}", cwd.display());
        }

        Ok(GlobalContext {
            cwd,
            global_config: global_config_path(),
        })
    }

    /// Override the global config location.
    pub fn with_global_config(mut self, path: Option<PathBuf>) -> Self {
        self.global_config = path;
        self
    }

    pub fn cwd(&self) -> &Path {
        &self.cwd
    }

    /// Get the global configuration file path, if a home directory exists.
    pub fn global_config_path(&self) -> Option<&Path> {
        self.global_config.as_deref()
    }

    /// Find `pyproject.toml` starting from `start` (or cwd) and searching
    /// upward.
    pub fn find_manifest(&self, start: Option<&Path>) -> Result<PathBuf> {
        let origin = match start {
            Some(dir) => crate::util::fs::absolute_path(&self.cwd, dir),
            None => self.cwd.clone(),
        };

        let mut current = origin.clone();
        loop {
            let candidate = current.join(PROJECT_MANIFEST);
            if candidate.is_file() {
                return Ok(candidate);
            }
            if !current.pop() {
                bail!(
                    "could not find `{}` in `{}` or any parent directory",
                    PROJECT_MANIFEST,
                    origin.display()
                );
            }
        }
    }

    /// Load configuration for a project rooted at `project_root`.
    pub fn load_config(&self, project_root: &Path) -> Result<Config> {
        load_config(
            self.global_config_path(),
            &project_config_path(project_root),
        )
    }
}
