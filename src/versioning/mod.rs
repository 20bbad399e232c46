//! Version bookkeeping.
//!
//! A project's version lives in one or more places: the `version.current`
//! field of the action document, the `version` field of `package.json`,
//! and any files matched by configured expression strategies. Each place
//! is a [`VersionStrategy`]; [`VersionSources`] reads and writes all of
//! them together.
//!
//! ```json
//! {
//!   "version": {
//!     "current": "1.4.0-DEV",
//!     "strategies": [
//!       {
//!         "type": "expression",
//!         "directories": ["src"],
//!         "pattern": "*.rs",
//!         "expression": "VERSION: &str = \"{{VERSION}}\"",
//!         "replacement": "VERSION: &str = \"{{VERSION}}\""
//!       }
//!     ]
//!   },
//!   "actions": {}
//! }
//! ```
//!
//! # Example
//!
//! ```
//! use j3n::versioning::{VersionSources, VersioningConfig};
//! use j3n::version::Version;
//! use std::fs;
//! use tempfile::TempDir;
//!
//! let temp = TempDir::new().unwrap();
//! fs::write(temp.path().join("package.json"), r#"{"name": "app", "version": "1.0.0"}"#).unwrap();
//!
//! let sources = VersionSources::discover(
//!     temp.path(),
//!     &temp.path().join("actions.json"),
//!     &VersioningConfig::default(),
//! );
//! assert_eq!(sources.current().unwrap().to_string(), "1.0.0");
//!
//! sources.set(&Version::parse("1.1.0").unwrap()).unwrap();
//! assert_eq!(sources.current().unwrap().to_string(), "1.1.0");
//! ```

pub mod document;
pub mod expression;
pub mod package;
pub mod strategy;

pub use document::DocumentStrategy;
pub use expression::{ExpressionConfig, ExpressionStrategy};
pub use package::PackageJsonStrategy;
pub use strategy::VersionStrategy;

use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::error::{J3nError, Result};
use crate::version::Version;

/// The `version` section of an action document.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct VersioningConfig {
    /// Version tracked in the document itself.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub current: Option<Version>,

    /// Additional places the version is written to.
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub strategies: Vec<StrategyConfig>,
}

/// A configured version strategy, tagged by `type`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "lowercase")]
pub enum StrategyConfig {
    Expression(ExpressionConfig),
}

/// Versions read from one source.
#[derive(Debug, Clone, PartialEq)]
pub struct SourceVersions {
    pub source: String,
    pub versions: Vec<Version>,
}

/// All version sources of a project.
#[derive(Default)]
pub struct VersionSources {
    strategies: Vec<Box<dyn VersionStrategy>>,
}

impl VersionSources {
    /// Use the given strategies.
    pub fn new(strategies: Vec<Box<dyn VersionStrategy>>) -> Self {
        Self { strategies }
    }

    /// Find the version sources of the project at `project_root`.
    ///
    /// - the action document at `document`, when it sets `version.current`
    /// - `package.json` in the project root, when present
    /// - every configured expression strategy
    pub fn discover(project_root: &Path, document: &Path, config: &VersioningConfig) -> Self {
        let mut strategies: Vec<Box<dyn VersionStrategy>> = Vec::new();

        if config.current.is_some() {
            strategies.push(Box::new(DocumentStrategy::new(document)));
        }
        if project_root.join(package::PACKAGE_FILE).is_file() {
            strategies.push(Box::new(PackageJsonStrategy::new(project_root)));
        }
        for strategy in &config.strategies {
            match strategy {
                StrategyConfig::Expression(expression) => strategies.push(Box::new(
                    ExpressionStrategy::new(project_root, expression.clone()),
                )),
            }
        }

        tracing::debug!("Discovered {} version source(s)", strategies.len());
        Self { strategies }
    }

    /// Check if no source was found.
    pub fn is_empty(&self) -> bool {
        self.strategies.is_empty()
    }

    /// Number of sources.
    pub fn len(&self) -> usize {
        self.strategies.len()
    }

    /// Source names, in discovery order.
    pub fn names(&self) -> Vec<String> {
        self.strategies.iter().map(|s| s.name()).collect()
    }

    /// Read every source.
    pub fn get(&self) -> Result<Vec<SourceVersions>> {
        self.strategies
            .iter()
            .map(|strategy| {
                Ok(SourceVersions {
                    source: strategy.name(),
                    versions: strategy.get()?,
                })
            })
            .collect()
    }

    /// The single version all sources agree on.
    ///
    /// Fails with `NoVersionSource` when no source yields a version and
    /// with `VersionMismatch` when sources disagree.
    pub fn current(&self) -> Result<Version> {
        let found = self.get()?;
        let mut versions = found.iter().flat_map(|s| s.versions.iter());

        let first = versions.next().ok_or(J3nError::NoVersionSource)?;
        if versions.all(|v| v == first) {
            return Ok(first.clone());
        }

        let listed: Vec<String> = found
            .iter()
            .flat_map(|s| s.versions.iter().map(move |v| format!("{}: {}", s.source, v)))
            .collect();
        Err(J3nError::VersionMismatch {
            versions: listed.join(", "),
        })
    }

    /// Write `version` to every source. Returns the updated source names.
    pub fn set(&self, version: &Version) -> Result<Vec<String>> {
        if self.strategies.is_empty() {
            return Err(J3nError::NoVersionSource);
        }

        tracing::info!("Setting version to {}", version);
        let mut updated = Vec::with_capacity(self.strategies.len());
        for strategy in &self.strategies {
            strategy.set(version)?;
            tracing::debug!("Set version {} in {}", version, strategy.name());
            updated.push(strategy.name());
        }
        Ok(updated)
    }
}
