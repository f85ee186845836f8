//! Typed build errors.
//!
//! Most failures travel as `anyhow::Error` with context attached. The
//! variants here are the ones callers (and tests) need to tell apart.

use thiserror::Error;

/// Error raised by the distribution pipeline.
#[derive(Debug, Error)]
pub enum BuildError {
    #[error("only the Windows platform is supported (host is `{os}`)")]
    UnsupportedPlatform { os: String },

    #[error("only Python 3 is supported (host interpreter is {version})")]
    UnsupportedPython { version: String },

    #[error("invalid distribution identity `{name}-{version}`: {reason}")]
    InvalidIdentity {
        name: String,
        version: String,
        reason: String,
    },

    #[error("invalid entry point `{spec}`: {reason}")]
    InvalidEntryPoint { spec: String, reason: String },

    #[error("executable `{name}` is registered by more than one entry point")]
    DuplicateExecutable { name: String },

    #[error("cannot download {url}: HTTP {status}")]
    DownloadFailed { url: String, status: u16 },

    #[error("`{command}` failed with exit code {code:?}\n{stderr}")]
    ProcessFailed {
        command: String,
        code: Option<i32>,
        stderr: String,
    },
}

impl BuildError {
    /// Whether the error comes from checking host or registration
    /// preconditions rather than from doing work.
    pub fn is_configuration(&self) -> bool {
        matches!(
            self,
            BuildError::UnsupportedPlatform { .. }
                | BuildError::UnsupportedPython { .. }
                | BuildError::InvalidIdentity { .. }
                | BuildError::InvalidEntryPoint { .. }
                | BuildError::DuplicateExecutable { .. }
        )
    }
}
