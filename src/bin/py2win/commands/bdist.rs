//! `py2win bdist` command

use std::sync::Arc;

use anyhow::{bail, Context, Result};

use crate::cli::BdistArgs;
use py2win::builder::toolchain::{detect_toolchain, Toolchain};
use py2win::core::host::{check_os, default_python, Host};
use py2win::core::{DistributionId, EntryPoint, LauncherKind};
use py2win::ops::bdist::{run, BuildEnv, BuildOptions, EmbedDistribution};
use py2win::ops::wheel::build_project_wheel;
use py2win::sources::{Downloader, HttpFetcher};
use py2win::util::fs::absolute_path;
use py2win::util::shell::{Shell, Status};
use py2win::util::{GlobalContext, SystemRunner};

pub fn execute(args: BdistArgs, shell: Arc<Shell>) -> Result<()> {
    // Nothing below makes sense on another OS
    check_os(std::env::consts::OS)?;

    let ctx = GlobalContext::new()?;
    let (project, config) = super::load_project(&ctx, args.project.as_deref())?;

    let name = args
        .name
        .clone()
        .or_else(|| project.as_ref().and_then(|p| p.name.clone()));
    let version = args
        .dist_version
        .clone()
        .or_else(|| project.as_ref().and_then(|p| p.version.clone()));
    let (name, version) = match (name, version, &project) {
        (Some(name), Some(version), _) => (name, version),
        (_, _, None) => bail!(
            "could not find `pyproject.toml` in `{}` or any parent directory; \
             pass --name and --version to build without one",
            ctx.cwd().display()
        ),
        _ => bail!("the project has no static name and version; pass --name and --version"),
    };
    let id = DistributionId::new(name, version)?;

    // Paths given on the command line are relative to cwd, paths from the
    // project relative to its root
    let base = project
        .as_ref()
        .map(|p| p.root.clone())
        .unwrap_or_else(|| ctx.cwd().to_path_buf());

    let mut dist = EmbedDistribution::new(id.clone());

    let extra_wheel_dir = match &args.extra_wheel_dir {
        Some(dir) => Some(absolute_path(ctx.cwd(), dir)),
        None => project.as_ref().and_then(|p| p.extra_wheel_dir.clone()),
    };
    if let Some(dir) = extra_wheel_dir {
        dist = dist.with_extra_wheel_dir(dir);
    }

    for requirement in project
        .iter()
        .flat_map(|p| p.requirements.iter())
        .chain(&args.requirement)
    {
        dist = dist.add_requirement(requirement);
    }
    for package in project
        .iter()
        .flat_map(|p| p.packages.iter())
        .chain(&args.package)
    {
        dist = dist.add_package(package);
    }

    for entry in project.iter().flat_map(|p| p.entry_points.iter()) {
        dist = dist.add_entry_point(entry.clone());
    }
    for spec in &args.console_script {
        dist = dist.add_entry_point(EntryPoint::parse(spec, LauncherKind::Console)?);
    }
    for spec in &args.gui_script {
        dist = dist.add_entry_point(EntryPoint::parse(spec, LauncherKind::Gui)?);
    }
    dist.check_entry_points()?;

    let mut runner = SystemRunner;
    let python = args
        .python
        .clone()
        .or_else(|| config.build.python.clone())
        .unwrap_or_else(default_python);
    let host = Host::detect(&mut runner, &python)?;
    tracing::debug!(
        "host interpreter {} ({}, {})",
        host.python.executable.display(),
        host.python.version,
        host.python.arch()
    );

    let toolchain: Option<Box<dyn Toolchain>> = if dist.entry_points().is_empty() {
        None
    } else {
        Some(detect_toolchain(&config.toolchain)?)
    };

    // Keeps the project wheel alive until the build is done
    let wheel_dir = tempfile::Builder::new()
        .prefix("py2win-wheel")
        .tempdir()
        .context("failed to create a temporary wheel directory")?;

    if args.wheel.is_empty() {
        match &project {
            Some(project) => {
                shell.status(Status::Compiling, format!("wheel for {}", id));
                let wheel = build_project_wheel(
                    &mut runner,
                    &host.python.executable,
                    &project.root,
                    id.name(),
                    wheel_dir.path(),
                )?;
                dist = dist.add_wheel(wheel);
            }
            None => tracing::debug!("no project and no --wheel, installing requirements only"),
        }
    } else {
        for wheel in &args.wheel {
            dist = dist.add_wheel(absolute_path(ctx.cwd(), wheel));
        }
    }

    let opts = BuildOptions {
        dist_dir: super::dist_dir(
            args.dist_dir.as_deref().map(|dir| absolute_path(ctx.cwd(), dir)),
            &config,
        ),
        clean: !args.no_clean,
        zip: args.zip,
    };

    let fetcher = HttpFetcher::new(Arc::clone(&shell))?;
    let mut downloader = Downloader::new(Box::new(fetcher));

    let mut env = BuildEnv {
        host: &host,
        config: &config,
        runner: &mut runner,
        downloader: &mut downloader,
        toolchain: toolchain.as_deref(),
        shell: Arc::clone(&shell),
        cwd: &base,
    };
    let output = run(&dist, &opts, &mut env)?;

    for exe in &output.executables {
        shell.status(Status::Created, exe.display());
    }
    if let Some(archive) = &output.archive {
        shell.status(Status::Created, archive.display());
    }
    shell.status(
        Status::Info,
        format!("distribution in {}", output.workdir.display()),
    );

    Ok(())
}
