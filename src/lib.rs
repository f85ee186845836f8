//! py2win - stand-alone Windows distributions of Python programs
//!
//! A distribution is a directory holding the official embeddable CPython
//! runtime, the program and its dependencies installed with pip, and one
//! native launcher executable per entry point. See [`ops::bdist`].

pub mod builder;
pub mod core;
pub mod ops;
pub mod sources;
pub mod util;

/// Test utilities and mocks for py2win unit tests.
///
/// Only compiled for tests. Provides mock implementations for process
/// execution and HTTP, plus archive and interpreter fixtures.
#[cfg(test)]
pub mod test_support;

pub use core::{BuildError, DistributionId, EntryPoint, LauncherKind};
pub use ops::{BuildOptions, EmbedDistribution};
pub use util::context::GlobalContext;
