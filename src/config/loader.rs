//! Action document discovery and loading.
//!
//! The document is JSON or YAML, chosen by file extension:
//!
//! ```yaml
//! actions:
//!   build:
//!     steps:
//!       compile:
//!         type: exec
//!         params:
//!           command: cargo
//!           args: [build]
//! ```

use std::fs;
use std::path::{Path, PathBuf};

use serde::de::DeserializeOwned;
use serde::Deserialize;

use crate::action::ActionCollection;
use crate::error::{J3nError, Result};
use crate::versioning::VersioningConfig;

/// Candidate document names, in lookup order.
pub const DEFAULT_CONFIG_FILES: &[&str] = &["actions.json", "actions.yml", "actions.yaml"];

/// Serialization format of an action document.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ConfigFormat {
    Json,
    Yaml,
}

impl ConfigFormat {
    /// Format implied by a file's extension. Unknown extensions are JSON.
    pub fn from_path(path: &Path) -> Self {
        match path.extension().and_then(|e| e.to_str()) {
            Some(ext) if ext.eq_ignore_ascii_case("yml") || ext.eq_ignore_ascii_case("yaml") => {
                ConfigFormat::Yaml
            }
            _ => ConfigFormat::Json,
        }
    }
}

/// Find the project root by walking up from `start`.
///
/// Looks for:
/// 1. An action document (`actions.json`, `actions.yml`, `actions.yaml`)
/// 2. `.git` directory (fallback)
pub fn find_project_root(start: &Path) -> Option<PathBuf> {
    let mut current = start.to_path_buf();

    loop {
        if DEFAULT_CONFIG_FILES
            .iter()
            .any(|name| current.join(name).is_file())
        {
            return Some(current);
        }

        if current.join(".git").exists() {
            return Some(current);
        }

        if !current.pop() {
            return None;
        }
    }
}

/// Path of the action document to load.
///
/// An override is used as given, relative to `project_root` when not
/// absolute. Otherwise the first existing default document in
/// `project_root` is used, falling back to `actions.json`.
pub fn resolve_config_path(project_root: &Path, config_override: Option<&Path>) -> PathBuf {
    if let Some(path) = config_override {
        return if path.is_absolute() {
            path.to_path_buf()
        } else {
            project_root.join(path)
        };
    }

    DEFAULT_CONFIG_FILES
        .iter()
        .map(|name| project_root.join(name))
        .find(|path| path.is_file())
        .unwrap_or_else(|| project_root.join(DEFAULT_CONFIG_FILES[0]))
}

/// Parse document content.
///
/// # Arguments
///
/// * `content` - The document text
/// * `format` - How to parse it
/// * `source_path` - Path for error reporting
pub fn parse_actions(
    content: &str,
    format: ConfigFormat,
    source_path: &Path,
) -> Result<ActionCollection> {
    parse_document(content, format, source_path)
}

/// Parse the `version` section of a document.
///
/// A document without one yields the default (empty) configuration.
pub fn parse_versioning(
    content: &str,
    format: ConfigFormat,
    source_path: &Path,
) -> Result<VersioningConfig> {
    parse_document::<VersioningSection>(content, format, source_path).map(|s| s.version)
}

#[derive(Deserialize)]
struct VersioningSection {
    #[serde(default)]
    version: VersioningConfig,
}

fn parse_document<T: DeserializeOwned>(
    content: &str,
    format: ConfigFormat,
    source_path: &Path,
) -> Result<T> {
    let parsed = match format {
        ConfigFormat::Json => serde_json::from_str(content).map_err(|e| e.to_string()),
        ConfigFormat::Yaml => serde_yaml::from_str(content).map_err(|e| e.to_string()),
    };

    parsed.map_err(|message| J3nError::ConfigParseError {
        path: source_path.to_path_buf(),
        message,
    })
}

/// Read a document, mapping a missing file to `ConfigNotFound`.
pub fn read_document(path: &Path) -> Result<String> {
    fs::read_to_string(path).map_err(|e| {
        if e.kind() == std::io::ErrorKind::NotFound {
            J3nError::ConfigNotFound {
                path: path.to_path_buf(),
            }
        } else {
            J3nError::Io(e)
        }
    })
}

/// Load an action document.
///
/// # Errors
///
/// Returns `ConfigNotFound` if the file doesn't exist.
/// Returns `ConfigParseError` if the content is invalid.
pub fn load_actions(path: &Path) -> Result<ActionCollection> {
    let content = read_document(path)?;

    let actions = parse_actions(&content, ConfigFormat::from_path(path), path)?;
    tracing::debug!(
        "Loaded {} actions from {}",
        actions.actions.len(),
        path.display()
    );
    Ok(actions)
}

/// Load the version bookkeeping settings of a document.
pub fn load_versioning(path: &Path) -> Result<VersioningConfig> {
    let content = read_document(path)?;
    parse_versioning(&content, ConfigFormat::from_path(path), path)
}

/// Resolve and load the action document for a project.
pub fn load_config(project_root: &Path, config_override: Option<&Path>) -> Result<ActionCollection> {
    load_actions(&resolve_config_path(project_root, config_override))
}
