//! Version command implementation.
//!
//! `j3n version parse|compare|next|render` exposes the semantic version
//! helpers used for release automation. `j3n version get|set` reads and
//! writes the project's own version across all of its version sources.

use std::cmp::Ordering;

use serde_json::json;

use crate::cli::args::{VersionArgs, VersionCommands};
use crate::error::{J3nError, Result};
use crate::ui::theme::J3nTheme;
use crate::ui::UserInterface;
use crate::version::Version;
use crate::versioning::VersionSources;

use super::dispatcher::{Command, CommandResult};
use super::{ConfigSource, CONFIG_ERROR_EXIT_CODE};

/// The version command implementation.
pub struct VersionCommand {
    source: ConfigSource,
    args: VersionArgs,
}

impl VersionCommand {
    /// Create a new version command.
    pub fn new(source: ConfigSource, args: VersionArgs) -> Self {
        Self { source, args }
    }

    fn get(&self, ui: &mut dyn UserInterface) -> Result<CommandResult> {
        let Some(sources) = self.source.version_sources(ui)? else {
            return Ok(CommandResult::failure(CONFIG_ERROR_EXIT_CODE));
        };

        match read_current(&sources, ui) {
            Ok(version) => {
                ui.message(&version.to_string());
                Ok(CommandResult::success())
            }
            Err(e) => report_source_error(e, ui),
        }
    }

    fn set(&self, version: &str, ui: &mut dyn UserInterface) -> Result<CommandResult> {
        let version = Version::parse(version)?;
        let Some(sources) = self.source.version_sources(ui)? else {
            return Ok(CommandResult::failure(CONFIG_ERROR_EXIT_CODE));
        };

        match sources.set(&version) {
            Ok(updated) => {
                for source in updated {
                    ui.success(&format!("Set version {} in {}", version, source));
                }
                Ok(CommandResult::success())
            }
            Err(e) => report_source_error(e, ui),
        }
    }
}

fn read_current(sources: &VersionSources, ui: &mut dyn UserInterface) -> Result<Version> {
    if ui.output_mode().shows_details() {
        for found in sources.get()? {
            let versions: Vec<String> = found.versions.iter().map(Version::to_string).collect();
            ui.message(&format!("{}: {}", found.source, versions.join(", ")));
        }
    }
    sources.current()
}

/// Report errors caused by the project's version sources and fail with
/// exit code 1; anything else propagates.
fn report_source_error(error: J3nError, ui: &mut dyn UserInterface) -> Result<CommandResult> {
    match error {
        J3nError::NoVersionSource
        | J3nError::VersionNotFound { .. }
        | J3nError::VersionMismatch { .. }
        | J3nError::InvalidPattern { .. }
        | J3nError::InvalidVersion { .. }
        | J3nError::ConfigParseError { .. } => {
            ui.error(&error.to_string());
            Ok(CommandResult::failure(1))
        }
        other => Err(other),
    }
}

impl Command for VersionCommand {
    fn execute(&self, ui: &mut dyn UserInterface) -> Result<CommandResult> {
        match &self.args.command {
            VersionCommands::Parse { version, json } => {
                let version = Version::parse(version)?;
                if *json {
                    let value = json!({
                        "major": version.major,
                        "minor": version.minor,
                        "patch": version.patch,
                        "prerelease": version.prerelease,
                        "build": version.build,
                        "branch": version.release_branch(),
                    });
                    let text = serde_json::to_string_pretty(&value)
                        .map_err(|e| J3nError::Other(e.into()))?;
                    ui.message(&text);
                } else {
                    let theme = J3nTheme::new();
                    let rows = [
                        ("version", version.to_string()),
                        ("major", version.major.to_string()),
                        ("minor", version.minor.to_string()),
                        ("patch", version.patch.to_string()),
                        ("prerelease", version.prerelease.join(".")),
                        ("build", version.build.join(".")),
                        ("branch", version.release_branch()),
                    ];
                    for (key, value) in rows {
                        ui.message(&format!(
                            "{} {}",
                            theme.key.apply_to(format!("{:<11}", format!("{key}:"))),
                            value
                        ));
                    }
                }
            }
            VersionCommands::Compare { left, right } => {
                let left = Version::parse(left)?;
                let right = Version::parse(right)?;
                let symbol = match left.compare(&right) {
                    Ordering::Less => "<",
                    Ordering::Equal => "=",
                    Ordering::Greater => ">",
                };
                ui.message(&format!("{} {} {}", left, symbol, right));
            }
            VersionCommands::Next { version, kind } => {
                let version = Version::parse(version)?;
                ui.message(&version.next(*kind).to_string());
            }
            VersionCommands::Render { version, template } => {
                let version = Version::parse(version)?;
                ui.message(&version.render(template));
            }
            VersionCommands::Get => return self.get(ui),
            VersionCommands::Set { version } => return self.set(version, ui),
        }

        Ok(CommandResult::success())
    }
}
