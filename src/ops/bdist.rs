//! Implementation of `py2win bdist`.
//!
//! An [`EmbedDistribution`] collects what goes into the distribution; [`run`]
//! executes the pipeline against a [`BuildEnv`]:
//!
//! 1. check host and registrations,
//! 2. prepare `{dist_dir}/{name}-{version}`,
//! 3. provision the embedded runtime unless `python.exe` is already there,
//! 4. bootstrap pip,
//! 5. install wheels, then requirements, then packages,
//! 6. build one launcher per entry point,
//! 7. optionally zip the working directory.

use std::collections::HashSet;
use std::path::{Path, PathBuf};
use std::sync::Arc;

use anyhow::{Context, Result};

use crate::builder::installer::{self, InstallPass};
use crate::builder::launcher::LauncherBuilder;
use crate::builder::package;
use crate::builder::runtime::{self, RuntimeSpec};
use crate::builder::toolchain::Toolchain;
use crate::core::entry_point::EntryPoint;
use crate::core::errors::BuildError;
use crate::core::host::Host;
use crate::core::identity::DistributionId;
use crate::sources::download::Downloader;
use crate::util::config::Config;
use crate::util::fs::{absolute_path, ensure_dir, remove_dir_all_if_exists};
use crate::util::process::CommandRunner;
use crate::util::shell::{Shell, Status};

/// A distribution to build, assembled by chained registration calls.
#[derive(Debug, Clone)]
pub struct EmbedDistribution {
    id: DistributionId,
    extra_wheel_dir: Option<PathBuf>,
    wheels: Vec<PathBuf>,
    requirements: Vec<String>,
    packages: Vec<String>,
    entry_points: Vec<EntryPoint>,
}

impl EmbedDistribution {
    pub fn new(id: DistributionId) -> Self {
        EmbedDistribution {
            id,
            extra_wheel_dir: None,
            wheels: Vec::new(),
            requirements: Vec::new(),
            packages: Vec::new(),
            entry_points: Vec::new(),
        }
    }

    /// Directory of additional wheels offered to every install pass.
    pub fn with_extra_wheel_dir(mut self, dir: impl Into<PathBuf>) -> Self {
        self.extra_wheel_dir = Some(dir.into());
        self
    }

    pub fn add_wheel(mut self, wheel: impl Into<PathBuf>) -> Self {
        self.wheels.push(wheel.into());
        self
    }

    /// A PEP 508 requirement string, e.g. `requests>=2.31`.
    pub fn add_requirement(mut self, requirement: impl Into<String>) -> Self {
        self.requirements.push(requirement.into());
        self
    }

    pub fn add_package(mut self, package: impl Into<String>) -> Self {
        self.packages.push(package.into());
        self
    }

    pub fn add_entry_point(mut self, entry_point: EntryPoint) -> Self {
        self.entry_points.push(entry_point);
        self
    }

    pub fn id(&self) -> &DistributionId {
        &self.id
    }

    pub fn extra_wheel_dir(&self) -> Option<&Path> {
        self.extra_wheel_dir.as_deref()
    }

    pub fn wheels(&self) -> &[PathBuf] {
        &self.wheels
    }

    pub fn requirements(&self) -> &[String] {
        &self.requirements
    }

    pub fn packages(&self) -> &[String] {
        &self.packages
    }

    pub fn entry_points(&self) -> &[EntryPoint] {
        &self.entry_points
    }

    /// Reject two entry points that would write the same executable.
    /// Windows file names are case-insensitive.
    pub fn check_entry_points(&self) -> Result<(), BuildError> {
        let mut seen = HashSet::new();
        for entry in &self.entry_points {
            if !seen.insert(entry.executable_name().to_lowercase()) {
                return Err(BuildError::DuplicateExecutable {
                    name: entry.executable_name().to_string(),
                });
            }
        }
        Ok(())
    }
}

/// How to build.
#[derive(Debug, Clone)]
pub struct BuildOptions {
    /// Parent of the working directory and the archive.
    pub dist_dir: PathBuf,
    /// Remove an existing working directory first.
    pub clean: bool,
    /// Produce `{dist_dir}/{name}-{version}.zip`.
    pub zip: bool,
}

impl Default for BuildOptions {
    fn default() -> Self {
        BuildOptions {
            dist_dir: PathBuf::from("dist"),
            clean: true,
            zip: false,
        }
    }
}

/// The collaborators a build runs against.
pub struct BuildEnv<'a> {
    pub host: &'a Host,
    pub config: &'a Config,
    pub runner: &'a mut dyn CommandRunner,
    /// Per-build download cache.
    pub downloader: &'a mut Downloader,
    /// Only needed when there are entry points.
    pub toolchain: Option<&'a dyn Toolchain>,
    pub shell: Arc<Shell>,
    /// Base for a relative `dist_dir`.
    pub cwd: &'a Path,
}

/// What a build produced.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BuildOutput {
    pub workdir: PathBuf,
    /// One executable per entry point, in registration order.
    pub executables: Vec<PathBuf>,
    pub archive: Option<PathBuf>,
    /// Whether the runtime was downloaded during this build.
    pub provisioned: bool,
}

/// Build `dist` into `{dist_dir}/{name}-{version}`.
pub fn run(
    dist: &EmbedDistribution,
    opts: &BuildOptions,
    env: &mut BuildEnv<'_>,
) -> Result<BuildOutput> {
    env.host.ensure_supported()?;
    dist.check_entry_points()?;
    if !dist.entry_points.is_empty() && env.toolchain.is_none() {
        anyhow::bail!("a C compiler is required to build launchers for {}", dist.id);
    }

    let span = env.shell.span(format!("{}", dist.id));
    let fullname = dist.id.fullname();
    let dist_dir = absolute_path(env.cwd, &opts.dist_dir);
    let workdir = dist_dir.join(&fullname);

    if opts.clean && workdir.exists() {
        env.shell
            .status(Status::Removed, format!("previous build {}", workdir.display()));
        remove_dir_all_if_exists(&workdir)?;
    }
    ensure_dir(&workdir)?;

    let provisioned = if runtime::is_provisioned(&workdir) {
        env.shell.status(
            Status::Skipped,
            format!("runtime already present in {}", workdir.display()),
        );
        false
    } else {
        let python = &env.host.python;
        let spec = RuntimeSpec {
            python,
            net: &env.config.net,
            patch_lib2to3: env
                .config
                .build
                .patch_lib2to3
                .unwrap_or_else(|| python.version.has_lib2to3()),
        };
        runtime::provision(&workdir, spec, env.downloader, &env.shell)
            .context("failed to provision the embedded runtime")?;
        true
    };

    installer::install_pip(
        &workdir,
        env.config.net.get_pip_url(),
        env.downloader,
        env.runner,
        &env.shell,
    )?;

    let extra_wheel_dir = dist
        .extra_wheel_dir
        .as_deref()
        .map(|dir| absolute_path(env.cwd, dir));
    let wheels: Vec<PathBuf> = dist
        .wheels
        .iter()
        .map(|wheel| absolute_path(env.cwd, wheel))
        .collect();

    let passes = [
        InstallPass::wheels(&wheels),
        InstallPass::new("requirements", dist.requirements.iter().cloned()),
        InstallPass::new("packages", dist.packages.iter().cloned()),
    ];
    for pass in &passes {
        installer::install(
            &workdir,
            pass,
            extra_wheel_dir.as_deref(),
            env.runner,
            &env.shell,
        )?;
    }

    let mut executables = Vec::with_capacity(dist.entry_points.len());
    if let Some(toolchain) = env.toolchain {
        let launchers = LauncherBuilder {
            workdir: &workdir,
            python: &env.host.python,
            toolchain,
            settings: &env.config.toolchain,
            manifest_url: env.config.net.manifest_url(),
        };
        for entry in &dist.entry_points {
            executables.push(launchers.build(entry, env.downloader, env.runner, &env.shell)?);
        }
    }

    let archive = if opts.zip {
        env.shell
            .status(Status::Packaging, format!("{}.zip", fullname));
        Some(package::create_zip(&workdir, &dist_dir, &fullname)?)
    } else {
        None
    };

    span.finish();
    Ok(BuildOutput {
        workdir,
        executables,
        archive,
        provisioned,
    })
}
