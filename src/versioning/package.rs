//! The `version` field of `package.json`.

use std::fs;
use std::path::{Path, PathBuf};

use serde_json::Value;

use crate::error::{J3nError, Result};
use crate::version::Version;

use super::strategy::VersionStrategy;

/// File name looked up in the project root.
pub const PACKAGE_FILE: &str = "package.json";

/// Keeps the version in `package.json`.
///
/// The manifest is edited in place; key order is preserved and the other
/// fields are left untouched.
#[derive(Debug, Clone)]
pub struct PackageJsonStrategy {
    path: PathBuf,
}

impl PackageJsonStrategy {
    /// Strategy for the `package.json` in `directory`.
    pub fn new(directory: &Path) -> Self {
        Self {
            path: directory.join(PACKAGE_FILE),
        }
    }

    fn read(&self) -> Result<Value> {
        let content = fs::read_to_string(&self.path)?;
        serde_json::from_str(&content).map_err(|e| J3nError::ConfigParseError {
            path: self.path.clone(),
            message: e.to_string(),
        })
    }

    fn not_found(&self) -> J3nError {
        J3nError::VersionNotFound {
            location: self.path.display().to_string(),
        }
    }
}

impl VersionStrategy for PackageJsonStrategy {
    fn name(&self) -> String {
        PACKAGE_FILE.to_string()
    }

    fn get(&self) -> Result<Vec<Version>> {
        let manifest = self.read()?;
        let version = manifest
            .get("version")
            .and_then(Value::as_str)
            .ok_or_else(|| self.not_found())?;
        Ok(vec![Version::parse(version)?])
    }

    fn set(&self, version: &Version) -> Result<()> {
        let mut manifest = self.read()?;
        let fields = manifest.as_object_mut().ok_or_else(|| self.not_found())?;
        fields.insert("version".to_string(), Value::String(version.to_string()));

        let mut output = serde_json::to_string_pretty(&manifest).map_err(anyhow::Error::from)?;
        output.push('\n');
        fs::write(&self.path, output)?;
        Ok(())
    }
}
