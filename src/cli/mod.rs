//! Command-line interface for j3n.
//!
//! This module provides the CLI argument parsing using clap's derive macros
//! and command implementations.
//!
//! # Architecture
//!
//! - [`args`] - Argument definitions using clap derive macros
//! - [`commands`] - Command implementations

pub mod args;
pub mod commands;

pub use args::{
    ActionArgs, Cli, Commands, CompletionsArgs, ListArgs, PlanArgs, VersionArgs, VersionCommands,
};
pub use commands::{Command, CommandDispatcher, CommandResult};
