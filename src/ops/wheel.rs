//! Building the project's own wheel with the host interpreter.

use std::path::{Path, PathBuf};

use anyhow::{bail, Context, Result};

use crate::util::fs::{ensure_dir, glob_files};
use crate::util::process::{CommandRunner, ProcessBuilder};

/// Wheel file names use `_` where project names use `-` or `.`.
fn wheel_prefix(name: &str) -> String {
    let normalized: String = name
        .chars()
        .map(|c| if c == '-' || c == '.' { '_' } else { c })
        .collect();
    format!("{}-", normalized.to_lowercase())
}

/// Run `python -m pip wheel --no-deps -w out_dir project_root` and return
/// the wheel that was produced for `name`.
pub fn build_project_wheel(
    runner: &mut dyn CommandRunner,
    python: &Path,
    project_root: &Path,
    name: &str,
    out_dir: &Path,
) -> Result<PathBuf> {
    ensure_dir(out_dir)?;

    let cmd = ProcessBuilder::new(python)
        .args(["-m", "pip", "wheel", "--no-deps", "-w"])
        .arg(out_dir)
        .arg(project_root)
        .cwd(project_root);
    runner
        .exec_and_check(&cmd)
        .with_context(|| format!("failed to build a wheel for {}", project_root.display()))?;

    let prefix = wheel_prefix(name);
    let wheels = glob_files(out_dir, &["*.whl"])?;
    let found = wheels.into_iter().find(|wheel| {
        wheel
            .file_name()
            .map(|f| f.to_string_lossy().to_lowercase().starts_with(&prefix))
            .unwrap_or(false)
    });

    match found {
        Some(wheel) => {
            tracing::debug!("built project wheel {}", wheel.display());
            Ok(wheel)
        }
        None => bail!(
            "pip did not produce a wheel for `{}` in {}",
            name,
            out_dir.display()
        ),
    }
}
