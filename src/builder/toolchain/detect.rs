//! Toolchain detection functions.

use std::collections::HashMap;
use std::path::{Path, PathBuf};

use anyhow::{bail, Result};

use crate::util::config::ToolchainSettings;

use super::{GccToolchain, MsvcToolchain, Toolchain};

/// Detect the available toolchain.
///
/// Tries to find a C compiler and linker with the following priority:
/// 1. Configured `toolchain.cc` (and `toolchain.link` for MSVC)
/// 2. `cl.exe` in an already configured Developer Command Prompt
/// 3. Visual Studio located with `vswhere.exe`, environment from `vcvarsall.bat`
/// 4. MinGW `gcc` on `PATH`
pub fn detect_toolchain(settings: &ToolchainSettings) -> Result<Box<dyn Toolchain>> {
    if settings.has_overrides() {
        if let Some(toolchain) = try_detect_from_config(settings)? {
            return Ok(toolchain);
        }
    }

    if let Some(toolchain) = try_detect_msvc()? {
        return Ok(toolchain);
    }

    if let Some(toolchain) = try_detect_gcc() {
        return Ok(toolchain);
    }

    bail!(
        "no C compiler found\n\
         \n\
         py2win compiles launchers with MSVC (cl + link) or MinGW gcc.\n\
         Install the Visual Studio Build Tools, run from a Developer Command Prompt,\n\
         or set `cc` under [toolchain] in the py2win config."
    )
}

/// Whether `cc` names the MSVC compiler driver.
fn is_msvc_compiler(cc: &Path) -> bool {
    cc.file_stem()
        .and_then(|s| s.to_str())
        .map(|s| s.eq_ignore_ascii_case("cl"))
        .unwrap_or(false)
}

/// Try to create a toolchain from config file settings.
fn try_detect_from_config(settings: &ToolchainSettings) -> Result<Option<Box<dyn Toolchain>>> {
    let Some(cc) = &settings.cc else {
        return Ok(None);
    };

    let cc = match resolve_tool(cc) {
        Some(cc) => cc,
        None => {
            tracing::warn!("configured C compiler not found: {}", cc.display());
            return Ok(None);
        }
    };

    if is_msvc_compiler(&cc) {
        let link = settings
            .link
            .clone()
            .or_else(|| cc.parent().map(|dir| dir.join("link.exe")).filter(|p| p.exists()))
            .or_else(|| which::which("link").ok());

        let Some(link) = link else {
            bail!(
                "configured compiler `{}` is MSVC but no linker was found\n\
                 set `link` under [toolchain] in the py2win config",
                cc.display()
            );
        };

        tracing::info!(
            "using toolchain from config: cl={}, link={}",
            cc.display(),
            link.display()
        );
        return Ok(Some(Box::new(MsvcToolchain::new(cc, link))));
    }

    tracing::info!("using toolchain from config: cc={}", cc.display());
    Ok(Some(Box::new(GccToolchain::new(cc))))
}

/// An absolute path that exists, or a program name found on `PATH`.
fn resolve_tool(tool: &Path) -> Option<PathBuf> {
    if tool.exists() {
        return Some(tool.to_path_buf());
    }
    if tool.components().count() == 1 {
        return which::which(tool).ok();
    }
    None
}

/// Try to detect MSVC toolchain.
#[cfg(target_os = "windows")]
fn try_detect_msvc() -> Result<Option<Box<dyn Toolchain>>> {
    use which::which;

    // Already inside a Developer Command Prompt
    if let Ok(cl) = which("cl") {
        if std::env::var("INCLUDE").is_ok() && std::env::var("LIB").is_ok() {
            let link = which("link")
                .map_err(|_| anyhow::anyhow!("MSVC cl.exe found but link.exe not in PATH"))?;
            return Ok(Some(Box::new(MsvcToolchain::new(cl, link))));
        }
    }

    try_auto_detect_msvc()
}

#[cfg(not(target_os = "windows"))]
fn try_detect_msvc() -> Result<Option<Box<dyn Toolchain>>> {
    Ok(None)
}

/// Try to auto-detect MSVC using vswhere.exe and vcvarsall.bat.
#[cfg(target_os = "windows")]
fn try_auto_detect_msvc() -> Result<Option<Box<dyn Toolchain>>> {
    use std::io::Write;

    use super::EnvWrapper;
    use crate::util::process::ProcessBuilder;

    let Some(vswhere) = find_vswhere() else {
        tracing::debug!("vswhere.exe not found, cannot auto-detect MSVC");
        return Ok(None);
    };

    tracing::debug!("found vswhere at: {}", vswhere.display());

    let output = ProcessBuilder::new(&vswhere)
        .args([
            "-latest",
            "-requires",
            "Microsoft.VisualStudio.Component.VC.Tools.x86.x64",
            "-property",
            "installationPath",
            "-format",
            "value",
        ])
        .exec();

    let vs_path = match output {
        Ok(out) if out.success() => {
            let path = out.stdout_lossy().trim().to_string();
            if path.is_empty() {
                tracing::debug!("vswhere returned empty path");
                return Ok(None);
            }
            PathBuf::from(path)
        }
        Ok(out) => {
            tracing::debug!("vswhere failed: {}", out.stderr_lossy());
            return Ok(None);
        }
        Err(e) => {
            tracing::debug!("failed to run vswhere: {:#}", e);
            return Ok(None);
        }
    };

    let vcvarsall = vs_path
        .join("VC")
        .join("Auxiliary")
        .join("Build")
        .join("vcvarsall.bat");
    if !vcvarsall.exists() {
        tracing::debug!("vcvarsall.bat not found at: {}", vcvarsall.display());
        return Ok(None);
    }

    let Some(arch) = vcvars_arch(std::env::consts::ARCH) else {
        tracing::debug!(
            "unsupported architecture for MSVC auto-detection: {}",
            std::env::consts::ARCH
        );
        return Ok(None);
    };

    tracing::info!(
        "auto-detecting MSVC environment via {}",
        vcvarsall.display()
    );

    // A batch file sidesteps cmd.exe quoting of the vcvarsall path
    let mut batch = tempfile::Builder::new()
        .prefix("py2win_vcvars")
        .suffix(".bat")
        .tempfile()?;
    write!(
        batch,
        "@echo off\r\ncall \"{}\" {} >nul 2>&1\r\nif errorlevel 1 exit /b 1\r\nset\r\n",
        vcvarsall.display(),
        arch
    )?;
    batch.flush()?;

    let output = ProcessBuilder::new("cmd")
        .arg("/c")
        .arg(batch.path())
        .exec();

    let env_output = match output {
        Ok(out) if out.success() => out.stdout_lossy(),
        Ok(out) => {
            tracing::warn!("vcvarsall.bat failed: {}", out.stderr_lossy());
            return Ok(None);
        }
        Err(e) => {
            tracing::warn!("failed to run vcvarsall.bat: {:#}", e);
            return Ok(None);
        }
    };

    let env_vars = parse_env_dump(&env_output);

    let path_value = env_vars.get("PATH").cloned().unwrap_or_default();
    if path_value.is_empty() {
        tracing::warn!(
            "vcvarsall.bat produced empty PATH - MSVC environment may not be properly configured"
        );
        return Ok(None);
    }

    let Some((cl, link)) = find_msvc_tools_in_path(&path_value) else {
        tracing::debug!("could not find MSVC tools in captured PATH");
        return Ok(None);
    };

    tracing::info!("auto-detected MSVC: cl={}", cl.display());

    Ok(Some(Box::new(EnvWrapper::new(
        MsvcToolchain::new(cl, link),
        captured_env(&env_vars),
    ))))
}

/// `vcvarsall.bat` argument for a Rust target architecture.
#[cfg_attr(not(target_os = "windows"), allow(dead_code))]
fn vcvars_arch(arch: &str) -> Option<&'static str> {
    match arch {
        "x86_64" => Some("x64"),
        "x86" => Some("x86"),
        "aarch64" => Some("arm64"),
        _ => None,
    }
}

/// Parse the output of `set` into upper-cased variable names.
#[cfg_attr(not(target_os = "windows"), allow(dead_code))]
fn parse_env_dump(output: &str) -> HashMap<String, String> {
    output
        .lines()
        .filter_map(|line| line.split_once('='))
        .map(|(key, value)| (key.to_uppercase(), value.to_string()))
        .collect()
}

/// The variables compiler and linker need from a captured environment.
#[cfg_attr(not(target_os = "windows"), allow(dead_code))]
fn captured_env(env_vars: &HashMap<String, String>) -> Vec<(String, String)> {
    ["PATH", "INCLUDE", "LIB", "LIBPATH", "VSCMD_ARG_TGT_ARCH"]
        .iter()
        .filter_map(|&key| env_vars.get(key).map(|v| (key.to_string(), v.clone())))
        .collect()
}

/// Find vswhere.exe in standard locations.
#[cfg(target_os = "windows")]
fn find_vswhere() -> Option<PathBuf> {
    let program_files_x86 = std::env::var("ProgramFiles(x86)")
        .unwrap_or_else(|_| "C:\\Program Files (x86)".to_string());

    let standard_path = PathBuf::from(&program_files_x86)
        .join("Microsoft Visual Studio")
        .join("Installer")
        .join("vswhere.exe");

    if standard_path.exists() {
        return Some(standard_path);
    }

    which::which("vswhere").ok()
}

/// Find `cl.exe` and `link.exe` in a `;`-separated PATH string.
#[cfg_attr(not(target_os = "windows"), allow(dead_code))]
fn find_msvc_tools_in_path(path: &str) -> Option<(PathBuf, PathBuf)> {
    let mut cl = None;
    let mut link = None;

    for dir in path.split(';').filter(|d| !d.is_empty()) {
        let dir = PathBuf::from(dir);

        if cl.is_none() {
            let cl_path = dir.join("cl.exe");
            if cl_path.exists() {
                cl = Some(cl_path);
            }
        }

        if link.is_none() {
            let link_path = dir.join("link.exe");
            if link_path.exists() {
                link = Some(link_path);
            }
        }

        if cl.is_some() && link.is_some() {
            break;
        }
    }

    cl.zip(link)
}

/// Try to detect a MinGW GCC on `PATH`.
fn try_detect_gcc() -> Option<Box<dyn Toolchain>> {
    let cc = which::which("gcc").ok()?;
    tracing::debug!("found gcc at: {}", cc.display());
    Some(Box::new(GccToolchain::new(cc)))
}
