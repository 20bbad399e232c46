//! CLI argument definitions.
//!
//! This module defines all CLI arguments using clap's derive macros.
//! The main entry point is the [`Cli`] struct.

use clap::{Parser, Subcommand};
use clap_complete::Shell;
use std::path::PathBuf;

use crate::version::ReleaseKind;

/// j3n - Run dependent build actions from a declarative document.
#[derive(Debug, Parser)]
#[command(name = "j3n")]
#[command(author, version, about, long_about = None)]
#[command(propagate_version = true)]
pub struct Cli {
    /// Path to the action document (default: actions.json in the project root)
    #[arg(short, long, global = true)]
    pub config: Option<PathBuf>,

    /// Path to project root (overrides current directory)
    #[arg(short, long, global = true)]
    pub project: Option<PathBuf>,

    /// Show verbose output
    #[arg(short, long, global = true)]
    pub verbose: bool,

    /// Minimal output
    #[arg(short, long, global = true)]
    pub quiet: bool,

    /// Disable colored output
    #[arg(long, global = true)]
    pub no_color: bool,

    /// Enable debug logging
    #[arg(long, global = true)]
    pub debug: bool,

    #[command(subcommand)]
    pub command: Commands,
}

/// Available subcommands.
#[derive(Debug, Subcommand)]
pub enum Commands {
    /// Execute an action and everything it depends on
    Action(ActionArgs),

    /// Show the execution plan of an action without running it
    Plan(PlanArgs),

    /// List actions and their steps
    List(ListArgs),

    /// Semantic version utilities
    Version(VersionArgs),

    /// Generate shell completions
    Completions(CompletionsArgs),
}

/// Arguments for the `action` command.
#[derive(Debug, Clone, clap::Args)]
pub struct ActionArgs {
    /// Action to execute
    pub name: String,

    /// Run steps one at a time and stop at the first failure
    #[arg(long)]
    pub linear: bool,
}

/// Arguments for the `plan` command.
#[derive(Debug, Clone, clap::Args)]
pub struct PlanArgs {
    /// Action to plan
    pub name: String,
}

/// Arguments for the `list` command.
#[derive(Debug, Clone, Default, clap::Args)]
pub struct ListArgs {
    /// Output as JSON
    #[arg(long)]
    pub json: bool,
}

/// Arguments for the `version` command.
#[derive(Debug, Clone, clap::Args)]
pub struct VersionArgs {
    #[command(subcommand)]
    pub command: VersionCommands,
}

/// Version subcommands.
#[derive(Debug, Clone, Subcommand)]
pub enum VersionCommands {
    /// Validate a version and show its parts
    Parse {
        #[arg(id = "version_value", value_name = "VERSION")]
        version: String,

        /// Output as JSON
        #[arg(long)]
        json: bool,
    },

    /// Compare two versions by precedence
    Compare { left: String, right: String },

    /// Show the next development version
    Next {
        #[arg(id = "version_value", value_name = "VERSION")]
        version: String,

        /// Part to bump
        #[arg(short, long, value_enum, default_value = "minor")]
        kind: ReleaseKind,
    },

    /// Substitute version and time placeholders in a template
    Render {
        #[arg(id = "version_value", value_name = "VERSION")]
        version: String,
        template: String,
    },

    /// Show the project's current version
    Get,

    /// Write a new version to every version source of the project
    Set {
        #[arg(id = "version_value", value_name = "VERSION")]
        version: String,
    },
}

/// Arguments for the `completions` command.
#[derive(Debug, Clone, clap::Args)]
pub struct CompletionsArgs {
    /// Shell to generate completions for
    #[arg(value_enum)]
    pub shell: Shell,
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::CommandFactory;

    #[test]
    fn cli_definition_is_valid() {
        Cli::command().debug_assert();
    }

    #[test]
    fn parses_action_with_global_flags() {
        let cli = Cli::parse_from(["j3n", "-c", "ci.yml", "action", "build", "--linear", "-v"]);
        assert_eq!(cli.config, Some(PathBuf::from("ci.yml")));
        assert!(cli.verbose);
        match cli.command {
            Commands::Action(args) => {
                assert_eq!(args.name, "build");
                assert!(args.linear);
            }
            other => panic!("unexpected command: {other:?}"),
        }
    }

    #[test]
    fn parses_version_next_kind() {
        let cli = Cli::parse_from(["j3n", "version", "next", "1.2.3", "--kind", "major"]);
        match cli.command {
            Commands::Version(VersionArgs {
                command: VersionCommands::Next { version, kind },
            }) => {
                assert_eq!(version, "1.2.3");
                assert_eq!(kind, ReleaseKind::Major);
            }
            other => panic!("unexpected command: {other:?}"),
        }
    }

    #[test]
    fn version_next_defaults_to_minor() {
        let cli = Cli::parse_from(["j3n", "version", "next", "1.2.3"]);
        assert!(matches!(
            cli.command,
            Commands::Version(VersionArgs {
                command: VersionCommands::Next {
                    kind: ReleaseKind::Minor,
                    ..
                }
            })
        ));
    }

    #[test]
    fn version_set_takes_version() {
        let cli = Cli::parse_from(["j3n", "version", "set", "2.0.0-DEV"]);
        match cli.command {
            Commands::Version(VersionArgs {
                command: VersionCommands::Set { version },
            }) => assert_eq!(version, "2.0.0-DEV"),
            other => panic!("unexpected command: {other:?}"),
        }
        assert!(Cli::try_parse_from(["j3n", "version", "set"]).is_err());
    }

    #[test]
    fn version_get_takes_no_arguments() {
        let cli = Cli::parse_from(["j3n", "version", "get"]);
        assert!(matches!(
            cli.command,
            Commands::Version(VersionArgs {
                command: VersionCommands::Get
            })
        ));
    }

    #[test]
    fn subcommand_is_required() {
        assert!(Cli::try_parse_from(["j3n"]).is_err());
    }
}
