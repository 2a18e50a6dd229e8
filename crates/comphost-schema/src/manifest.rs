//! Package descriptor parsing (package.json)
//!
//! Only the fields the schema needs are read: `name`, `version` and
//! `description`. Everything else in the descriptor is ignored.

use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use thiserror::Error;
use tracing::warn;

/// File name of the package descriptor inside a component directory
pub const DESCRIPTOR_FILE: &str = "package.json";

/// Errors that can occur while reading a package descriptor
#[derive(Debug, Error)]
pub enum ManifestError {
    /// Failed to read the descriptor file
    #[error("Failed to read package descriptor {}: {source}", .path.display())]
    IoError {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// Failed to parse JSON
    #[error("Failed to parse package descriptor: {0}")]
    ParseError(#[from] serde_json::Error),

    /// Validation error
    #[error("Invalid package descriptor: {0}")]
    ValidationError(String),

    /// Missing required field
    #[error("Missing required field: {0}")]
    MissingField(String),
}

/// Package descriptor (package.json)
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Default)]
pub struct PackageDescriptor {
    /// Package name, used as the schema namespace in type tokens
    #[serde(default)]
    pub name: String,

    /// Semver version
    #[serde(default)]
    pub version: String,

    /// Optional description, used as the schema display name
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
}

impl PackageDescriptor {
    pub fn new(name: impl Into<String>, version: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            version: version.into(),
            description: None,
        }
    }

    pub fn with_description(mut self, description: impl Into<String>) -> Self {
        self.description = Some(description.into());
        self
    }

    /// Read `package.json` from a component directory
    pub fn from_dir(dir: &Path) -> Result<Self, ManifestError> {
        Self::from_file(&dir.join(DESCRIPTOR_FILE))
    }

    /// Parse a descriptor from a file
    pub fn from_file(path: &Path) -> Result<Self, ManifestError> {
        let content = std::fs::read_to_string(path).map_err(|e| ManifestError::IoError {
            path: path.to_path_buf(),
            source: e,
        })?;
        Self::parse(&content)
    }

    /// Parse a descriptor from a string
    pub fn parse(content: &str) -> Result<Self, ManifestError> {
        let descriptor: PackageDescriptor = serde_json::from_str(content)?;
        descriptor.validate()?;
        Ok(descriptor)
    }

    /// Validate the descriptor
    pub fn validate(&self) -> Result<(), ManifestError> {
        if self.name.is_empty() {
            return Err(ManifestError::MissingField("name".to_string()));
        }
        if !is_valid_package_name(&self.name) {
            return Err(ManifestError::ValidationError(format!(
                "Invalid package name: {}. Must contain only alphanumeric characters, hyphens, underscores, dots, and an optional @scope/ prefix",
                self.name
            )));
        }

        if self.version.is_empty() {
            return Err(ManifestError::MissingField("version".to_string()));
        }
        // Non-semver versions are passed through unchanged
        if let Err(e) = semver::Version::parse(&self.version) {
            warn!(
                package = %self.name,
                version = %self.version,
                error = %e,
                "package version is not valid semver"
            );
        }

        Ok(())
    }

    /// Human-readable name: the description, or the package name when the
    /// descriptor has none.
    pub fn display_name(&self) -> &str {
        match self.description.as_deref() {
            Some(description) if !description.is_empty() => description,
            _ => &self.name,
        }
    }
}

/// Validate a package name
fn is_valid_package_name(name: &str) -> bool {
    if let Some(scoped) = name.strip_prefix('@') {
        return match scoped.split_once('/') {
            Some((scope, package)) => is_valid_name_part(scope) && is_valid_name_part(package),
            None => false,
        };
    }
    is_valid_name_part(name)
}

/// Validate a name part (alphanumeric, hyphens, underscores, dots)
fn is_valid_name_part(name: &str) -> bool {
    !name.is_empty()
        && name
            .chars()
            .all(|c| c.is_alphanumeric() || c == '-' || c == '_' || c == '.')
}
