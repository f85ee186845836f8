//! Entry points turned into launcher executables.

use std::fmt;
use std::sync::LazyLock;

use regex::Regex;

use crate::core::errors::BuildError;

/// Dotted Python identifier path, e.g. `sample.console` or `App.run`.
static DOTTED_NAME: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^[A-Za-z_][A-Za-z0-9_]*(\.[A-Za-z_][A-Za-z0-9_]*)*$")
        .expect("dotted name pattern is valid")
});

/// Characters Windows does not allow in file names.
const INVALID_FILENAME_CHARS: &[char] = &['<', '>', ':', '"', '/', '\\', '|', '?', '*'];

/// Executables shipped with the embedded runtime. A launcher must not
/// overwrite them.
const RUNTIME_EXECUTABLES: &[&str] = &["python", "pythonw"];

/// Which executable subsystem the launcher targets.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum LauncherKind {
    /// Attached to a console; forwards command-line arguments.
    Console,
    /// Windowed subsystem; no console and no arguments.
    Gui,
}

impl LauncherKind {
    pub fn is_console(self) -> bool {
        self == LauncherKind::Console
    }
}

impl fmt::Display for LauncherKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            LauncherKind::Console => write!(f, "console"),
            LauncherKind::Gui => write!(f, "gui"),
        }
    }
}

/// A `(module, callable)` pair exposed as a standalone executable.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EntryPoint {
    module: String,
    callable: String,
    executable_name: String,
    kind: LauncherKind,
}

impl EntryPoint {
    /// Create an entry point.
    ///
    /// `module` and `callable` end up inside generated C source, so both must
    /// be plain dotted Python names.
    pub fn new(
        module: impl Into<String>,
        callable: impl Into<String>,
        executable_name: impl Into<String>,
        kind: LauncherKind,
    ) -> Result<Self, BuildError> {
        let module = module.into().trim().to_string();
        let callable = callable.into().trim().to_string();
        let executable_name = executable_name.into().trim().to_string();
        let spec = format!("{} = {}:{}", executable_name, module, callable);

        if !DOTTED_NAME.is_match(&module) {
            return Err(BuildError::InvalidEntryPoint {
                spec,
                reason: format!("`{}` is not a valid module name", module),
            });
        }
        if !DOTTED_NAME.is_match(&callable) {
            return Err(BuildError::InvalidEntryPoint {
                spec,
                reason: format!("`{}` is not a valid callable name", callable),
            });
        }
        if executable_name.is_empty()
            || executable_name.contains(INVALID_FILENAME_CHARS)
            || executable_name.chars().any(char::is_control)
        {
            return Err(BuildError::InvalidEntryPoint {
                spec,
                reason: format!("`{}` is not a valid executable name", executable_name),
            });
        }
        if RUNTIME_EXECUTABLES
            .iter()
            .any(|reserved| executable_name.eq_ignore_ascii_case(reserved))
        {
            return Err(BuildError::InvalidEntryPoint {
                spec,
                reason: format!(
                    "`{}.exe` belongs to the embedded runtime",
                    executable_name
                ),
            });
        }

        Ok(EntryPoint {
            module,
            callable,
            executable_name,
            kind,
        })
    }

    /// Parse a `console_scripts` style line: `name = module:callable [extras]`.
    pub fn parse(spec: &str, kind: LauncherKind) -> Result<Self, BuildError> {
        let (name, value) = spec.split_once('=').ok_or_else(|| BuildError::InvalidEntryPoint {
            spec: spec.to_string(),
            reason: "expected `name = module:callable`".to_string(),
        })?;

        Self::from_script(name, value, kind)
    }

    /// Build an entry point from a `[project.scripts]` key and value.
    pub fn from_script(name: &str, value: &str, kind: LauncherKind) -> Result<Self, BuildError> {
        // Extras (`module:func [cli]`) only matter to installers.
        let target = match value.find('[') {
            Some(idx) => &value[..idx],
            None => value,
        };

        let (module, callable) =
            target
                .split_once(':')
                .ok_or_else(|| BuildError::InvalidEntryPoint {
                    spec: format!("{} = {}", name.trim(), value.trim()),
                    reason: "expected `module:callable`".to_string(),
                })?;

        Self::new(module, callable, name, kind)
    }

    pub fn module(&self) -> &str {
        &self.module
    }

    pub fn callable(&self) -> &str {
        &self.callable
    }

    pub fn executable_name(&self) -> &str {
        &self.executable_name
    }

    pub fn kind(&self) -> LauncherKind {
        self.kind
    }

    /// Python statement that imports the module and calls the callable.
    pub fn invocation(&self) -> String {
        format!(
            "import {module}; {module}.{callable}()",
            module = self.module,
            callable = self.callable
        )
    }
}

impl fmt::Display for EntryPoint {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{} = {}:{} ({})",
            self.executable_name, self.module, self.callable, self.kind
        )
    }
}
