//! Configuration file support for py2win.
//!
//! py2win reads two configuration files:
//! - Global: `~/.py2win/config.toml` - User-wide defaults
//! - Project: `.py2win/config.toml` - Project-specific overrides
//!
//! Project config takes precedence over global config, key by key.
//!
//! ```toml
//! [net]
//! python-mirror = "https://mirror.example.com/python"
//!
//! [build]
//! python = "C:/Python311/python.exe"
//! patch-lib2to3 = false
//!
//! [toolchain]
//! cc = "C:/mingw64/bin/gcc.exe"
//! ldflags = ["-static-libgcc"]
//! ```

use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};

/// Default location of the CPython release files.
pub const DEFAULT_PYTHON_MIRROR: &str = "https://www.python.org/ftp/python";

/// Default location of the pip bootstrap script.
pub const DEFAULT_GET_PIP_URL: &str = "https://bootstrap.pypa.io/get-pip.py";

/// Default location of the application manifest embedded in launchers.
pub const DEFAULT_MANIFEST_URL: &str =
    "https://raw.githubusercontent.com/python/cpython/main/PC/python.manifest";

/// py2win configuration.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    /// Network settings
    pub net: NetConfig,

    /// Build settings
    pub build: BuildConfig,

    /// Compiler overrides
    pub toolchain: ToolchainSettings,
}

/// Where downloads come from.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default, rename_all = "kebab-case")]
pub struct NetConfig {
    /// Base URL for `{version}/python-{version}-embed-{arch}.zip` and
    /// `{version}/Python-{version}.tgz`
    pub python_mirror: Option<String>,

    /// URL of `get-pip.py`
    pub get_pip_url: Option<String>,

    /// URL of the launcher application manifest
    pub manifest_url: Option<String>,
}

impl NetConfig {
    pub fn python_mirror(&self) -> &str {
        self.python_mirror
            .as_deref()
            .unwrap_or(DEFAULT_PYTHON_MIRROR)
            .trim_end_matches('/')
    }

    pub fn get_pip_url(&self) -> &str {
        self.get_pip_url.as_deref().unwrap_or(DEFAULT_GET_PIP_URL)
    }

    pub fn manifest_url(&self) -> &str {
        self.manifest_url.as_deref().unwrap_or(DEFAULT_MANIFEST_URL)
    }

    fn merge(&mut self, other: NetConfig) {
        if other.python_mirror.is_some() {
            self.python_mirror = other.python_mirror;
        }
        if other.get_pip_url.is_some() {
            self.get_pip_url = other.get_pip_url;
        }
        if other.manifest_url.is_some() {
            self.manifest_url = other.manifest_url;
        }
    }
}

/// Build-related configuration.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default, rename_all = "kebab-case")]
pub struct BuildConfig {
    /// Host interpreter used to probe the version and headers
    pub python: Option<PathBuf>,

    /// Patch the lib2to3 sources into the runtime (default: on for <= 3.12)
    pub patch_lib2to3: Option<bool>,

    /// Default output directory
    pub dist_dir: Option<PathBuf>,
}

impl BuildConfig {
    fn merge(&mut self, other: BuildConfig) {
        if other.python.is_some() {
            self.python = other.python;
        }
        if other.patch_lib2to3.is_some() {
            self.patch_lib2to3 = other.patch_lib2to3;
        }
        if other.dist_dir.is_some() {
            self.dist_dir = other.dist_dir;
        }
    }
}

/// Toolchain settings for launcher compilation.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct ToolchainSettings {
    /// Path to the C compiler (`cl.exe` or `gcc.exe`)
    pub cc: Option<PathBuf>,

    /// Path to the linker (`link.exe`); ignored for gcc
    pub link: Option<PathBuf>,

    /// Additional compiler flags
    pub cflags: Vec<String>,

    /// Additional linker flags
    pub ldflags: Vec<String>,
}

impl ToolchainSettings {
    /// Check if any toolchain settings are configured.
    pub fn has_overrides(&self) -> bool {
        self.cc.is_some() || self.link.is_some()
    }

    fn merge(&mut self, other: ToolchainSettings) {
        if other.cc.is_some() {
            self.cc = other.cc;
        }
        if other.link.is_some() {
            self.link = other.link;
        }
        if !other.cflags.is_empty() {
            self.cflags = other.cflags;
        }
        if !other.ldflags.is_empty() {
            self.ldflags = other.ldflags;
        }
    }
}

impl Config {
    /// Load configuration from a file.
    pub fn load(path: &Path) -> Result<Self> {
        let contents = std::fs::read_to_string(path)
            .with_context(|| format!("failed to read config: {}", path.display()))?;

        toml::from_str(&contents)
            .with_context(|| format!("failed to parse config: {}", path.display()))
    }

    /// Merge another config into this one (other takes precedence).
    pub fn merge(&mut self, other: Config) {
        self.net.merge(other.net);
        self.build.merge(other.build);
        self.toolchain.merge(other.toolchain);
    }
}

/// Load merged configuration from global and project locations.
///
/// A file that does not exist is skipped; a file that exists but does not
/// parse is an error.
pub fn load_config(global_path: Option<&Path>, project_path: &Path) -> Result<Config> {
    let mut config = Config::default();

    if let Some(global) = global_path.filter(|p| p.exists()) {
        tracing::debug!("loading config {}", global.display());
        config.merge(Config::load(global)?);
    }

    if project_path.exists() {
        tracing::debug!("loading config {}", project_path.display());
        config.merge(Config::load(project_path)?);
    }

    Ok(config)
}

/// Get the global py2win config directory (~/.py2win).
pub fn global_config_dir() -> Option<PathBuf> {
    directories::BaseDirs::new().map(|b| b.home_dir().join(".py2win"))
}

/// Get the global config path (~/.py2win/config.toml).
pub fn global_config_path() -> Option<PathBuf> {
    global_config_dir().map(|dir| dir.join("config.toml"))
}

/// Get the project config path (.py2win/config.toml).
pub fn project_config_path(project_root: &Path) -> PathBuf {
    project_root.join(".py2win").join("config.toml")
}
