//! Distribution identity.

use std::fmt;

use crate::core::errors::BuildError;

/// Name and version of the distribution being built.
///
/// The canonical `{name}-{version}` string names both the working
/// directory and the zip archive.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct DistributionId {
    name: String,
    version: String,
}

impl DistributionId {
    /// Create an identity, rejecting parts that are empty or would escape
    /// the destination directory.
    pub fn new(name: impl Into<String>, version: impl Into<String>) -> Result<Self, BuildError> {
        let name = name.into().trim().to_string();
        let version = version.into().trim().to_string();

        let invalid = |reason: &str| BuildError::InvalidIdentity {
            name: name.clone(),
            version: version.clone(),
            reason: reason.to_string(),
        };

        if name.is_empty() {
            return Err(invalid("name is empty"));
        }
        if version.is_empty() {
            return Err(invalid("version is empty"));
        }
        for part in [&name, &version] {
            if part.contains(['/', '\\']) || part == ".." || part == "." {
                return Err(invalid("must not contain path separators"));
            }
        }

        Ok(DistributionId { name, version })
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn version(&self) -> &str {
        &self.version
    }

    /// `{name}-{version}`
    pub fn fullname(&self) -> String {
        format!("{}-{}", self.name, self.version)
    }
}

impl fmt::Display for DistributionId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} v{}", self.name, self.version)
    }
}
