//! Core data types: what is being distributed and where it is built.

pub mod entry_point;
pub mod errors;
pub mod host;
pub mod identity;
pub mod project;

pub use entry_point::{EntryPoint, LauncherKind};
pub use errors::BuildError;
pub use host::{Arch, Host, HostPython, PythonVersion};
pub use identity::DistributionId;
pub use project::PyProject;
