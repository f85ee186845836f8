//! `py2win clean` command

use anyhow::Result;

use crate::cli::CleanArgs;
use py2win::core::DistributionId;
use py2win::ops::{clean, CleanOptions};
use py2win::util::fs::absolute_path;
use py2win::util::shell::{Shell, Status};
use py2win::util::GlobalContext;

pub fn execute(args: CleanArgs, shell: &Shell) -> Result<()> {
    let ctx = GlobalContext::new()?;
    let (project, config) = super::load_project(&ctx, None)?;

    let base = project
        .as_ref()
        .map(|p| p.root.clone())
        .unwrap_or_else(|| ctx.cwd().to_path_buf());
    let dist_dir = absolute_path(&base, &super::dist_dir(args.dist_dir, &config));

    let id = match &project {
        Some(p) => match (&p.name, &p.version) {
            (Some(name), Some(version)) => Some(DistributionId::new(name, version)?),
            _ => None,
        },
        None => None,
    };

    if id.is_none() && !args.all {
        shell.status(
            Status::Skipped,
            format!(
                "no project name and version; pass --all to remove {}",
                dist_dir.display()
            ),
        );
        return Ok(());
    }

    let removed = clean(&CleanOptions {
        dist_dir,
        id,
        all: args.all,
    })?;

    if removed.is_empty() {
        shell.status(Status::Info, "nothing to clean");
    }
    for path in &removed {
        shell.status(Status::Removed, path.display());
    }

    Ok(())
}
