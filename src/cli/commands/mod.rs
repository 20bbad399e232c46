//! CLI command implementations.
//!
//! Each command implements the [`Command`] trait, which provides a uniform
//! interface for executing commands and reporting results.
//!
//! # Architecture
//!
//! Commands are dispatched via [`CommandDispatcher`], which routes CLI
//! subcommands to their implementations. This allows:
//! - Single binary with subcommands (`j3n action`, `j3n plan`)
//! - Shared config loading
//! - Consistent global flag handling

pub mod action;
pub mod completions;
pub mod dispatcher;
pub mod list;
pub mod plan;
pub mod version;

pub use dispatcher::{Command, CommandDispatcher, CommandResult};

use std::path::{Path, PathBuf};

use crate::action::ActionCollection;
use crate::config::{load_config, load_versioning, resolve_config_path};
use crate::error::{J3nError, Result};
use crate::ui::UserInterface;
use crate::versioning::{VersionSources, VersioningConfig};

/// Exit code used when the action document cannot be loaded.
pub const CONFIG_ERROR_EXIT_CODE: i32 = 2;

/// Where a command finds its action document.
#[derive(Debug, Clone)]
pub struct ConfigSource {
    pub project_root: PathBuf,
    pub config: Option<PathBuf>,
}

impl ConfigSource {
    pub fn new(project_root: &Path, config: Option<&Path>) -> Self {
        Self {
            project_root: project_root.to_path_buf(),
            config: config.map(Path::to_path_buf),
        }
    }

    /// Load the document, reporting load failures through the UI.
    ///
    /// Returns `None` when the document is missing or unreadable; the
    /// caller should exit with [`CONFIG_ERROR_EXIT_CODE`].
    pub fn load(&self, ui: &mut dyn UserInterface) -> Result<Option<ActionCollection>> {
        match load_config(&self.project_root, self.config.as_deref()) {
            Ok(actions) => Ok(Some(actions)),
            Err(J3nError::ConfigNotFound { path }) => {
                ui.error(&format!("No action document found at {}", path.display()));
                Ok(None)
            }
            Err(e @ J3nError::ConfigParseError { .. }) => {
                ui.error(&e.to_string());
                Ok(None)
            }
            Err(e) => Err(e),
        }
    }

    /// Discover the project's version sources.
    ///
    /// A project without an action document still has sources such as
    /// `package.json`; an explicit `--config` that is missing or a document
    /// that fails to parse is reported and yields `None`.
    pub fn version_sources(&self, ui: &mut dyn UserInterface) -> Result<Option<VersionSources>> {
        let document = resolve_config_path(&self.project_root, self.config.as_deref());

        let config = if document.is_file() || self.config.is_some() {
            match load_versioning(&document) {
                Ok(config) => config,
                Err(J3nError::ConfigNotFound { path }) => {
                    ui.error(&format!("No action document found at {}", path.display()));
                    return Ok(None);
                }
                Err(e @ J3nError::ConfigParseError { .. }) => {
                    ui.error(&e.to_string());
                    return Ok(None);
                }
                Err(e) => return Err(e),
            }
        } else {
            VersioningConfig::default()
        };

        Ok(Some(VersionSources::discover(
            &self.project_root,
            &document,
            &config,
        )))
    }
}
