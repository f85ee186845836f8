//! `pyproject.toml` reading.
//!
//! Only the parts py2win needs are read: the project identity, the script
//! tables that become launchers and a `[tool.py2win]` table:
//!
//! ```toml
//! [project]
//! name = "sample"
//! version = "1.2.0"
//!
//! [project.scripts]
//! sample-console = "sample.console:main"
//!
//! [project.gui-scripts]
//! sample-gui = "sample.gui:main"
//!
//! [tool.py2win]
//! requirements = ["requests>=2.31"]
//! packages = ["pywin32"]
//! extra-wheel-dir = "wheels"
//! ```

use std::collections::BTreeMap;
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use serde::Deserialize;

use crate::core::entry_point::{EntryPoint, LauncherKind};

#[derive(Debug, Default, Deserialize)]
struct PyProjectFile {
    #[serde(default)]
    project: ProjectTable,
    #[serde(default)]
    tool: ToolTable,
}

#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "kebab-case")]
struct ProjectTable {
    name: Option<String>,
    version: Option<String>,
    #[serde(default)]
    scripts: BTreeMap<String, String>,
    #[serde(default)]
    gui_scripts: BTreeMap<String, String>,
}

#[derive(Debug, Default, Deserialize)]
struct ToolTable {
    #[serde(default)]
    py2win: Py2WinTable,
}

#[derive(Debug, Default, Deserialize)]
#[serde(default, rename_all = "kebab-case")]
struct Py2WinTable {
    requirements: Vec<String>,
    packages: Vec<String>,
    extra_wheel_dir: Option<PathBuf>,
}

/// A Python project as described by its `pyproject.toml`.
#[derive(Debug, Clone)]
pub struct PyProject {
    /// Directory containing `pyproject.toml`.
    pub root: PathBuf,
    pub name: Option<String>,
    /// `None` when the version is dynamic or absent.
    pub version: Option<String>,
    /// Console scripts first, then GUI scripts.
    pub entry_points: Vec<EntryPoint>,
    pub requirements: Vec<String>,
    pub packages: Vec<String>,
    /// Resolved against `root`.
    pub extra_wheel_dir: Option<PathBuf>,
}

impl PyProject {
    /// Load and validate a `pyproject.toml`.
    pub fn load(manifest_path: &Path) -> Result<Self> {
        let contents = std::fs::read_to_string(manifest_path)
            .with_context(|| format!("failed to read {}", manifest_path.display()))?;
        let root = manifest_path
            .parent()
            .map(Path::to_path_buf)
            .unwrap_or_default();

        Self::parse(&contents, root)
            .with_context(|| format!("failed to parse {}", manifest_path.display()))
    }

    fn parse(contents: &str, root: PathBuf) -> Result<Self> {
        let file: PyProjectFile = toml::from_str(contents)?;

        let mut entry_points = Vec::new();
        for (name, value) in &file.project.scripts {
            entry_points.push(EntryPoint::from_script(name, value, LauncherKind::Console)?);
        }
        for (name, value) in &file.project.gui_scripts {
            entry_points.push(EntryPoint::from_script(name, value, LauncherKind::Gui)?);
        }

        let extra_wheel_dir = file
            .tool
            .py2win
            .extra_wheel_dir
            .map(|dir| crate::util::fs::absolute_path(&root, &dir));

        Ok(PyProject {
            root,
            name: file.project.name,
            version: file.project.version,
            entry_points,
            requirements: file.tool.py2win.requirements,
            packages: file.tool.py2win.packages,
            extra_wheel_dir,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const SAMPLE: &str = r#"
[project]
name = "sample"
version = "1.2.0"
dependencies = ["peppercorn"]

[project.scripts]
sample-console = "sample.console:main"

[project.gui-scripts]
sample-gui = "sample.gui:main"

[tool.py2win]
requirements = ["requests>=2.31"]
packages = ["pywin32"]
extra-wheel-dir = "wheels"
"#;

    #[test]
    fn test_parse_sample_project() {
        let project = PyProject::parse(SAMPLE, PathBuf::from("/src/sample")).unwrap();

        assert_eq!(project.name.as_deref(), Some("sample"));
        assert_eq!(project.version.as_deref(), Some("1.2.0"));
        assert_eq!(project.entry_points.len(), 2);
        assert_eq!(project.entry_points[0].executable_name(), "sample-console");
        assert_eq!(project.entry_points[0].kind(), LauncherKind::Console);
        assert_eq!(project.entry_points[1].executable_name(), "sample-gui");
        assert_eq!(project.entry_points[1].kind(), LauncherKind::Gui);
        assert_eq!(project.requirements, vec!["requests>=2.31"]);
        assert_eq!(project.packages, vec!["pywin32"]);
        assert_eq!(
            project.extra_wheel_dir,
            Some(PathBuf::from("/src/sample").join("wheels"))
        );
    }

    #[test]
    fn test_dynamic_version_is_none() {
        let project = PyProject::parse(
            "[project]\nname = \"sample\"\ndynamic = [\"version\"]\n",
            PathBuf::new(),
        )
        .unwrap();
        assert!(project.version.is_none());
        assert!(project.entry_points.is_empty());
    }

    #[test]
    fn test_invalid_script_is_an_error() {
        let err = PyProject::parse(
            "[project.scripts]\nbroken = \"no_colon_here\"\n",
            PathBuf::new(),
        )
        .unwrap_err();
        assert!(err.to_string().contains("module:callable"));
    }

    #[test]
    fn test_load_from_disk() {
        let tmp = tempfile::TempDir::new().unwrap();
        let path = tmp.path().join("pyproject.toml");
        std::fs::write(&path, crate::test_support::sample_pyproject("my-app", "0.3")).unwrap();

        let project = PyProject::load(&path).unwrap();

        assert_eq!(project.root, tmp.path());
        assert_eq!(project.name.as_deref(), Some("my-app"));
        assert_eq!(project.entry_points[0].module(), "my_app.cli");
        assert_eq!(project.entry_points[1].executable_name(), "my-app-gui");
        assert!(project.extra_wheel_dir.is_none());
    }

    #[test]
    fn test_load_reports_path() {
        let tmp = tempfile::TempDir::new().unwrap();
        let path = tmp.path().join("pyproject.toml");
        std::fs::write(&path, "[project\n").unwrap();

        let err = PyProject::load(&path).unwrap_err();
        assert!(err.to_string().contains("pyproject.toml"));
    }
}
