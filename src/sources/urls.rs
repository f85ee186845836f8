//! Download locations of the CPython release artifacts.

use crate::core::host::{Arch, PythonVersion};

/// Embeddable distribution: `{mirror}/{v}/python-{v}-embed-{arch}.zip`.
pub fn embed_url(mirror: &str, version: PythonVersion, arch: Arch) -> String {
    format!(
        "{}/{v}/python-{v}-embed-{}.zip",
        mirror.trim_end_matches('/'),
        arch,
        v = version
    )
}

/// Full source tarball: `{mirror}/{v}/Python-{v}.tgz`.
pub fn source_url(mirror: &str, version: PythonVersion) -> String {
    format!(
        "{}/{v}/Python-{v}.tgz",
        mirror.trim_end_matches('/'),
        v = version
    )
}
