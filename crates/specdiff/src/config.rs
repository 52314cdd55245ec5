//! Project manifest (`specdiff.yaml`) parser.
//!
//! The manifest lists the shared documents that references may point into
//! and the severity that makes a comparison fail.

use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};
use specdiff_compare::Level;
use thiserror::Error;

/// Manifest loading errors.
#[derive(Debug, Error)]
pub enum ConfigError {
    /// The manifest file could not be read.
    #[error("failed to read {path}: {source}")]
    Read {
        path: String,
        #[source]
        source: std::io::Error,
    },

    /// The manifest is not valid YAML or has the wrong shape.
    #[error("failed to parse {path}: {message}")]
    Parse { path: String, message: String },

    /// A field holds a value outside its allowed set.
    #[error("invalid value '{value}' for {field} (expected {expected})")]
    InvalidValue {
        field: &'static str,
        value: String,
        expected: &'static str,
    },
}

/// A project manifest (`specdiff.yaml`).
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ProjectManifest {
    /// Shared documents (relative to the manifest or absolute).
    #[serde(default)]
    pub common_types: Vec<String>,

    /// Lowest severity that fails the comparison (`error` or `warning`).
    #[serde(default)]
    pub fail_on: Option<String>,
}

impl ProjectManifest {
    /// Load a manifest from a YAML file.
    pub fn load(path: &Path) -> Result<Self, ConfigError> {
        let content = std::fs::read_to_string(path).map_err(|source| ConfigError::Read {
            path: path.display().to_string(),
            source,
        })?;

        Self::parse(&content, path)
    }

    /// Parse a manifest from YAML content.
    pub fn parse(content: &str, path: &Path) -> Result<Self, ConfigError> {
        let manifest: Self = serde_yaml::from_str(content).map_err(|e| ConfigError::Parse {
            path: path.display().to_string(),
            message: e.to_string(),
        })?;
        // fail_on is validated at load time
        manifest.fail_on_level()?;
        Ok(manifest)
    }

    /// Common-type document paths, with relative entries resolved against
    /// the directory containing `manifest_path`.
    pub fn common_type_paths(&self, manifest_path: &Path) -> Vec<PathBuf> {
        let base = manifest_path.parent().unwrap_or_else(|| Path::new(""));
        self.common_types
            .iter()
            .map(|entry| {
                let path = Path::new(entry);
                if path.is_absolute() {
                    path.to_path_buf()
                } else {
                    base.join(path)
                }
            })
            .collect()
    }

    /// The configured failure threshold, if any.
    pub fn fail_on_level(&self) -> Result<Option<Level>, ConfigError> {
        self.fail_on.as_deref().map(parse_fail_on).transpose()
    }
}

/// Parse a `fail_on` value.
pub fn parse_fail_on(value: &str) -> Result<Level, ConfigError> {
    Level::parse(value).ok_or_else(|| ConfigError::InvalidValue {
        field: "fail_on",
        value: value.to_string(),
        expected: "error or warning",
    })
}
